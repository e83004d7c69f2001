//! Navigation shape metrics: breadth, depth, hubs and connectors.
//!
//! Degrees here count connections, not distinct neighbours: two triggers
//! on the same pair of screens are two ways in (or out).

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::budget::WorkBudget;
use crate::graph::build::FlowGraph;

/// A node above a degree threshold with the neighbours behind that degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLinks {
    pub node_id: String,
    pub degree: usize,
    /// Distinct neighbour ids, sorted.
    pub neighbors: Vec<String>,
}

/// Navigation metrics for one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationMetrics {
    /// Largest outgoing connection count of any node.
    pub breadth: usize,
    /// Longest non-repeating walk, in steps.
    pub depth: usize,
    pub hubs: Vec<NodeLinks>,
    pub connectors: Vec<NodeLinks>,
    /// The depth walk ran out of work budget; `depth` is a lower bound.
    #[serde(default)]
    pub truncated: bool,
}

/// Degree thresholds and the depth ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationLimits {
    /// In-degree strictly above this makes a hub.
    pub hub_threshold: usize,
    /// Out-degree strictly above this makes a connector.
    pub connector_threshold: usize,
    pub max_depth: usize,
}

impl Default for NavigationLimits {
    fn default() -> Self {
        Self {
            hub_threshold: 2,
            connector_threshold: 2,
            max_depth: 10,
        }
    }
}

/// Compute breadth, depth, hubs and connectors.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn navigation_metrics(
    graph: &FlowGraph<'_>,
    limits: NavigationLimits,
    budget: &mut WorkBudget,
) -> NavigationMetrics {
    let breadth = graph
        .source_ids()
        .iter()
        .map(|id| graph.outgoing(id).len())
        .max()
        .unwrap_or(0);

    let depth = max_depth(graph, limits.max_depth, budget);
    let truncated = budget.is_exhausted();
    let hubs = hubs(graph, limits.hub_threshold);
    let connectors = connectors(graph, limits.connector_threshold);

    debug!(
        breadth,
        depth,
        hubs = hubs.len(),
        connectors = connectors.len(),
        truncated,
        "navigation metrics computed"
    );

    NavigationMetrics {
        breadth,
        depth,
        hubs,
        connectors,
        truncated,
    }
}

/// Nodes whose incoming connection count exceeds `threshold`.
#[must_use]
pub fn hubs(graph: &FlowGraph<'_>, threshold: usize) -> Vec<NodeLinks> {
    graph
        .destination_ids()
        .iter()
        .filter_map(|id| {
            let incoming = graph.incoming(id);
            (incoming.len() > threshold).then(|| NodeLinks {
                node_id: (*id).to_string(),
                degree: incoming.len(),
                neighbors: incoming
                    .iter()
                    .map(|conn| conn.source_node_id.clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect(),
            })
        })
        .collect()
}

/// Nodes whose outgoing connection count exceeds `threshold`.
#[must_use]
pub fn connectors(graph: &FlowGraph<'_>, threshold: usize) -> Vec<NodeLinks> {
    graph
        .source_ids()
        .iter()
        .filter_map(|id| {
            let outgoing = graph.outgoing(id);
            (outgoing.len() > threshold).then(|| {
                let mut neighbors: Vec<String> = graph
                    .successors(id)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                neighbors.sort_unstable();
                NodeLinks {
                    node_id: (*id).to_string(),
                    degree: outgoing.len(),
                    neighbors,
                }
            })
        })
        .collect()
}

/// Longest non-repeating walk from any root, capped at `max_depth` steps.
///
/// Roots are sources that are never destinations; a graph where every source
/// is also a destination (fully cyclic) uses every source instead.
#[must_use]
pub fn max_depth(graph: &FlowGraph<'_>, max_depth: usize, budget: &mut WorkBudget) -> usize {
    let mut roots: Vec<&str> = graph
        .source_ids()
        .iter()
        .copied()
        .filter(|id| !graph.destination_ids().contains(id))
        .collect();
    if roots.is_empty() {
        roots = graph.source_ids().iter().copied().collect();
    }

    let mut deepest = 0;
    for root in roots {
        if deepest >= max_depth || budget.is_exhausted() {
            break;
        }
        let mut visited = HashSet::new();
        deepest = deepest.max(walk(graph, root, max_depth, &mut visited, budget));
    }

    if budget.is_exhausted() {
        warn!(depth = deepest, "depth walk truncated by work budget");
    }
    deepest
}

fn walk<'a>(
    graph: &FlowGraph<'a>,
    node: &'a str,
    depth_left: usize,
    visited: &mut HashSet<&'a str>,
    budget: &mut WorkBudget,
) -> usize {
    if depth_left == 0 || !budget.try_spend() {
        return 0;
    }

    visited.insert(node);
    let mut best = 0;
    for next in graph.successors(node) {
        if best == depth_left {
            break;
        }
        if !visited.contains(next) {
            best = best.max(1 + walk(graph, next, depth_left - 1, visited, budget));
        }
    }
    visited.remove(node);
    best
}
