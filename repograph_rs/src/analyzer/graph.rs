//! Directed dependency graph over internal edges.
//!
//! Nodes live in an arena indexed by [`FileId`]; adjacency is a pair of id
//! lists per node, so traversals never need back-references.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{EdgeKind, FileId, FileRecord, Language};

use super::metrics::NodeMetrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: FileId,
    pub path: String,
    pub language: Language,
    #[serde(flatten)]
    pub metrics: NodeMetrics,
}

/// An internal edge. Only one edge exists per (source, target) pair; `line`
/// is the first import that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: FileId,
    pub target: FileId,
    pub line: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphParts")]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(skip)]
    outgoing: Vec<Vec<FileId>>,
    #[serde(skip)]
    incoming: Vec<Vec<FileId>>,
}

/// Wire form of [`DependencyGraph`]; adjacency is rebuilt from the edges.
#[derive(Deserialize)]
struct GraphParts {
    #[serde(default)]
    nodes: Vec<GraphNode>,
    #[serde(default)]
    edges: Vec<GraphEdge>,
}

impl From<GraphParts> for DependencyGraph {
    fn from(parts: GraphParts) -> Self {
        let node_count = parts.nodes.len();
        let mut outgoing: Vec<Vec<FileId>> = vec![Vec::new(); node_count];
        let mut incoming: Vec<Vec<FileId>> = vec![Vec::new(); node_count];
        let mut seen: HashSet<(FileId, FileId)> = HashSet::new();
        let edges = parts
            .edges
            .into_iter()
            .filter(|e| e.source < node_count && e.target < node_count)
            .filter(|e| seen.insert((e.source, e.target)))
            .inspect(|e| {
                outgoing[e.source].push(e.target);
                incoming[e.target].push(e.source);
            })
            .collect();
        Self {
            nodes: parts.nodes,
            edges,
            outgoing,
            incoming,
        }
    }
}

impl DependencyGraph {
    /// Build from per-file records. `records[i].id` must equal `i`.
    pub fn build(records: &[FileRecord]) -> Self {
        let node_count = records.len();
        let mut outgoing: Vec<Vec<FileId>> = vec![Vec::new(); node_count];
        let mut incoming: Vec<Vec<FileId>> = vec![Vec::new(); node_count];
        let mut edges = Vec::new();
        let mut seen: HashSet<(FileId, FileId)> = HashSet::new();

        for record in records {
            for dep in record.edges_of(EdgeKind::Internal) {
                let Some(target) = dep.internal_target() else {
                    continue;
                };
                if target >= node_count || !seen.insert((record.id, target)) {
                    continue;
                }
                outgoing[record.id].push(target);
                incoming[target].push(record.id);
                edges.push(GraphEdge {
                    source: record.id,
                    target,
                    line: dep.line,
                });
            }
        }

        let nodes = records
            .iter()
            .map(|record| GraphNode {
                id: record.id,
                path: record.path.clone(),
                language: record.language,
                metrics: NodeMetrics::from_fans(incoming[record.id].len(), outgoing[record.id].len()),
            })
            .collect();

        Self {
            nodes,
            edges,
            outgoing,
            incoming,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn successors(&self, id: FileId) -> &[FileId] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn predecessors(&self, id: FileId) -> &[FileId] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn path_of(&self, id: FileId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.path.as_str())
    }

    pub fn has_self_loop(&self, id: FileId) -> bool {
        self.successors(id).contains(&id)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{DependencyEdge, EdgeTarget, FileRecord, FileStatus, Language};

    /// Records for `paths` with internal edges `(from, to)` by index.
    pub(crate) fn records(paths: &[&str], edges: &[(usize, usize)]) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> = paths
            .iter()
            .enumerate()
            .map(|(id, path)| FileRecord {
                id,
                path: path.to_string(),
                language: Language::from_path(path),
                size: 0,
                loc: 0,
                status: FileStatus::Parsed,
                imports: Vec::new(),
                exports: Vec::new(),
                dependencies: Vec::new(),
            })
            .collect();
        for (line, &(from, to)) in edges.iter().enumerate() {
            records[from].dependencies.push(DependencyEdge {
                source: from,
                specifier: format!("./{}", paths[to]),
                line: line + 1,
                target: EdgeTarget::Internal { target: to },
            });
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::records;
    use super::*;
    use crate::types::{DependencyEdge, EdgeTarget};

    #[test]
    fn fan_sums_match_edge_count() {
        let graph = DependencyGraph::build(&records(
            &["a.ts", "b.ts", "c.ts", "d.ts"],
            &[(0, 1), (0, 2), (1, 2), (2, 0)],
        ));
        let fan_in: usize = graph.nodes.iter().map(|n| n.metrics.fan_in).sum();
        let fan_out: usize = graph.nodes.iter().map(|n| n.metrics.fan_out).sum();
        assert_eq!(fan_in, graph.edge_count());
        assert_eq!(fan_out, graph.edge_count());
        assert_eq!(graph.nodes[3].metrics.fan_in, 0);
        assert_eq!(graph.nodes[3].metrics.fan_out, 0);
    }

    #[test]
    fn duplicate_imports_collapse_to_one_edge() {
        let mut recs = records(&["a.ts", "b.ts"], &[(0, 1), (0, 1)]);
        recs[0].dependencies.push(DependencyEdge {
            source: 0,
            specifier: "pkg".into(),
            line: 9,
            target: EdgeTarget::External {
                package: "pkg".into(),
            },
        });
        let graph = DependencyGraph::build(&recs);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].line, 1);
        assert_eq!(graph.successors(0), &[1]);
        assert_eq!(graph.predecessors(1), &[0]);
    }

    #[test]
    fn self_import_is_a_loop() {
        let graph = DependencyGraph::build(&records(&["a.ts"], &[(0, 0)]));
        assert!(graph.has_self_loop(0));
        assert_eq!(graph.nodes[0].metrics.fan_in, 1);
        assert_eq!(graph.nodes[0].metrics.fan_out, 1);
    }

    #[test]
    fn adjacency_is_not_serialized() {
        let graph = DependencyGraph::build(&records(&["a.ts", "b.ts"], &[(0, 1)]));
        let json = serde_json::to_value(&graph).unwrap();
        assert!(json.get("outgoing").is_none());
        assert_eq!(json["nodes"][0]["fan_out"], 1);
        assert_eq!(json["edges"][0]["target"], 1);
    }

    #[test]
    fn deserialized_graph_rebuilds_adjacency() {
        let graph = DependencyGraph::build(&records(&["a.ts", "b.ts", "c.ts"], &[(0, 1), (1, 0), (2, 2)]));
        let json = serde_json::to_string(&graph).unwrap();
        let restored: DependencyGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.edge_count(), 3);
        assert_eq!(restored.successors(0), &[1]);
        assert_eq!(restored.predecessors(0), &[1]);
        assert!(restored.has_self_loop(2));
        assert_eq!(restored.nodes[1].metrics.fan_in, 1);
        assert_eq!(
            crate::analyzer::cycles::find_cycles(&restored).len(),
            crate::analyzer::cycles::find_cycles(&graph).len()
        );
    }

    #[test]
    fn deserialized_graph_drops_dangling_edges() {
        let json = r#"{"nodes": [{"id": 0, "path": "a.ts", "language": "typescript", "fan_in": 0, "fan_out": 0, "instability": 0.0}],
                       "edges": [{"source": 0, "target": 4, "line": 1}]}"#;
        let graph: DependencyGraph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.successors(0).is_empty());
    }
}
