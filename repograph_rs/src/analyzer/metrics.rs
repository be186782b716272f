//! Coupling and structural metrics.
//!
//! Per-node numbers are computed when the graph is built; graph-level numbers
//! are derived here from the finished graph. Every formula is defined for the
//! empty graph and for isolated nodes.

use serde::{Deserialize, Serialize};

use crate::types::FileId;

use super::graph::DependencyGraph;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub fan_in: usize,
    pub fan_out: usize,
    /// `fan_out / (fan_in + fan_out + 1)`; the `+ 1` keeps isolated nodes at 0.
    pub instability: f64,
}

impl NodeMetrics {
    pub fn from_fans(fan_in: usize, fan_out: usize) -> Self {
        Self {
            fan_in,
            fan_out,
            instability: fan_out as f64 / (fan_in + fan_out + 1) as f64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    /// Mean fan-out over all nodes.
    pub average_coupling: f64,
    pub max_fan_in: usize,
    pub max_fan_out: usize,
    pub average_instability: f64,
    pub connected_components: usize,
    /// `edges - nodes + 2 * components`, floored at zero.
    pub structural_complexity: usize,
    /// `edges / (nodes * (nodes - 1))`; 0 for fewer than two nodes.
    pub density: f64,
    pub isolated_nodes: usize,
}

impl GraphMetrics {
    pub fn compute(graph: &DependencyGraph) -> Self {
        let nodes = graph.node_count();
        let edges = graph.edge_count();
        if nodes == 0 {
            return Self::default();
        }

        let fan_out_total: usize = graph.nodes.iter().map(|n| n.metrics.fan_out).sum();
        let instability_total: f64 = graph.nodes.iter().map(|n| n.metrics.instability).sum();
        let components = connected_components(graph);

        Self {
            node_count: nodes,
            edge_count: edges,
            average_coupling: fan_out_total as f64 / nodes as f64,
            max_fan_in: graph.nodes.iter().map(|n| n.metrics.fan_in).max().unwrap_or(0),
            max_fan_out: graph.nodes.iter().map(|n| n.metrics.fan_out).max().unwrap_or(0),
            average_instability: instability_total / nodes as f64,
            connected_components: components,
            // a component of k nodes holds at least k - 1 edges, so E + 2C >= N
            structural_complexity: edges + 2 * components - nodes,
            density: if nodes > 1 {
                edges as f64 / (nodes * (nodes - 1)) as f64
            } else {
                0.0
            },
            isolated_nodes: graph
                .nodes
                .iter()
                .filter(|n| n.metrics.fan_in == 0 && n.metrics.fan_out == 0)
                .count(),
        }
    }
}

/// Count weakly connected components: edges are walked in both directions.
pub fn connected_components(graph: &DependencyGraph) -> usize {
    let mut visited = vec![false; graph.node_count()];
    let mut stack: Vec<FileId> = Vec::new();
    let mut components = 0;

    for start in 0..graph.node_count() {
        if visited[start] {
            continue;
        }
        components += 1;
        visited[start] = true;
        stack.push(start);
        while let Some(node) = stack.pop() {
            for &next in graph.successors(node).iter().chain(graph.predecessors(node)) {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
    }
    components
}
