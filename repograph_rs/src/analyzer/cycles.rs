//! Circular import detection.
//!
//! One iterative depth-first pass over internal edges. Every node is a DFS
//! root at most once; a back edge to a node still on the stack closes a cycle
//! made of the path segment from that node to the current one. Search resumes
//! where the cycle was found, so the pass is O(nodes + edges).
//!
//! Cycles are reported in a canonical rotation starting at the
//! lexicographically smallest path, and each rotation is reported once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{FileId, Severity};

use super::graph::DependencyGraph;

/// Cycles longer than this are `high` severity.
pub const SHORT_CYCLE_MAX: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub nodes: Vec<FileId>,
    pub files: Vec<String>,
    pub length: usize,
    pub severity: Severity,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Unvisited,
    OnStack,
    Visited,
}

pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let n = graph.node_count();
    let mut state = vec![State::Unvisited; n];
    // position of an on-stack node inside `path`
    let mut position = vec![usize::MAX; n];
    let mut path: Vec<FileId> = Vec::new();
    // (node, index of the next successor to visit)
    let mut frames: Vec<(FileId, usize)> = Vec::new();
    let mut seen: HashSet<Vec<FileId>> = HashSet::new();
    let mut cycles = Vec::new();

    for root in 0..n {
        if state[root] != State::Unvisited {
            continue;
        }
        state[root] = State::OnStack;
        position[root] = 0;
        path.push(root);
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let successors = graph.successors(node);
            if next == successors.len() {
                frames.pop();
                path.pop();
                state[node] = State::Visited;
                position[node] = usize::MAX;
                continue;
            }
            frame.1 += 1;

            let succ = successors[next];
            match state[succ] {
                State::Unvisited => {
                    state[succ] = State::OnStack;
                    position[succ] = path.len();
                    path.push(succ);
                    frames.push((succ, 0));
                }
                State::OnStack => {
                    let members = canonical_rotation(graph, &path[position[succ]..]);
                    if seen.insert(members.clone()) {
                        cycles.push(make_cycle(graph, members));
                    }
                }
                State::Visited => {}
            }
        }
    }

    cycles
}

fn canonical_rotation(graph: &DependencyGraph, members: &[FileId]) -> Vec<FileId> {
    let start = (0..members.len())
        .min_by_key(|&i| graph.path_of(members[i]).unwrap_or_default())
        .unwrap_or(0);
    members[start..]
        .iter()
        .chain(&members[..start])
        .copied()
        .collect()
}

fn make_cycle(graph: &DependencyGraph, nodes: Vec<FileId>) -> Cycle {
    let length = nodes.len();
    Cycle {
        files: nodes
            .iter()
            .map(|&id| graph.path_of(id).unwrap_or_default().to_string())
            .collect(),
        nodes,
        length,
        severity: if length > SHORT_CYCLE_MAX {
            Severity::High
        } else {
            Severity::Medium
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::graph::test_support::records;

    fn cycles(paths: &[&str], edges: &[(usize, usize)]) -> Vec<Cycle> {
        find_cycles(&DependencyGraph::build(&records(paths, edges)))
    }

    #[test]
    fn detects_simple_cycle() {
        let found = cycles(&["a.ts", "b.ts"], &[(0, 1), (1, 0)]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].files, vec!["a.ts", "b.ts"]);
        assert_eq!(found[0].length, 2);
        assert_eq!(found[0].severity, Severity::Medium);
    }

    #[test]
    fn no_cycles_in_dag() {
        let found = cycles(
            &["a.ts", "b.ts", "c.ts", "d.ts"],
            &[(0, 1), (0, 2), (1, 3), (2, 3)],
        );
        assert!(found.is_empty());
    }

    #[test]
    fn rotation_starts_at_smallest_path() {
        // z -> a -> m -> z, discovered from z
        let found = cycles(&["z.ts", "a.ts", "m.ts"], &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].files, vec!["a.ts", "m.ts", "z.ts"]);
        assert_eq!(found[0].nodes, vec![1, 2, 0]);
    }

    #[test]
    fn independent_cycles_are_all_found() {
        let found = cycles(
            &["a.ts", "b.ts", "c.ts", "d.ts", "e.ts"],
            &[(0, 1), (1, 0), (2, 3), (3, 4), (4, 2)],
        );
        let files: Vec<Vec<String>> = found.iter().map(|c| c.files.clone()).collect();
        assert_eq!(
            files,
            vec![
                vec!["a.ts".to_string(), "b.ts".to_string()],
                vec!["c.ts".to_string(), "d.ts".to_string(), "e.ts".to_string()],
            ]
        );
    }

    #[test]
    fn long_cycle_is_high_severity() {
        let found = cycles(
            &["a.ts", "b.ts", "c.ts", "d.ts"],
            &[(0, 1), (1, 2), (2, 3), (3, 0)],
        );
        assert_eq!(found[0].length, 4);
        assert_eq!(found[0].severity, Severity::High);
    }

    #[test]
    fn self_import_is_length_one() {
        let found = cycles(&["a.ts", "b.ts"], &[(0, 0), (0, 1)]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nodes, vec![0]);
        assert_eq!(found[0].length, 1);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let paths: Vec<String> = (0..20_000).map(|i| format!("m{i:05}.ts")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut edges: Vec<(usize, usize)> = (0..refs.len() - 1).map(|i| (i, i + 1)).collect();
        edges.push((refs.len() - 1, 0));
        let found = cycles(&refs, &edges);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].length, 20_000);
    }
}
