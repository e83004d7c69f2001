//! Return-path cycle detection over interaction edges.
//!
//! # Edge Direction
//!
//! For every traversable connection `u → v`, the detector searches for a
//! path from `v` back to `u`. A hit closes a loop `u → v → … → w → u`,
//! recorded as `nodes = [u, v, …, w]`.
//!
//! # Bounds
//!
//! Each search keeps one visited set for the whole search (not per branch)
//! and may expand at most `loop_detection_limit` nodes. All searches in one
//! run also share a [`WorkBudget`].
//!
//! # Deduplication
//!
//! The same loop is found once per edge on it. [`loop_key`] maps each loop
//! to a key under the configured [`CycleKeyPolicy`]; only the first loop
//! per key is kept.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use flowlens_core::config::CycleKeyPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::budget::WorkBudget;
use crate::graph::build::FlowGraph;

/// `direct` for a two-node back-and-forth, `indirect` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopKind {
    Direct,
    Indirect,
}

/// A detected navigation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loop {
    /// Node ids in traversal order; the last node links back to the first.
    pub nodes: Vec<String>,
    pub length: usize,
    #[serde(rename = "type")]
    pub kind: LoopKind,
}

impl Loop {
    fn from_nodes(nodes: Vec<String>) -> Self {
        let length = nodes.len();
        let kind = if length == 2 {
            LoopKind::Direct
        } else {
            LoopKind::Indirect
        };
        Self {
            nodes,
            length,
            kind,
        }
    }
}

/// Loops found by [`detect_loops`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoopDetection {
    pub loops: Vec<Loop>,
    /// The shared budget ran out before every edge was searched.
    pub truncated: bool,
}

/// Search every traversable edge for a return path and deduplicate.
#[instrument(skip_all, fields(edges = graph.edges().len(), limit = loop_detection_limit))]
pub fn detect_loops(
    graph: &FlowGraph<'_>,
    loop_detection_limit: usize,
    policy: CycleKeyPolicy,
    budget: &mut WorkBudget,
) -> LoopDetection {
    let mut searched: HashSet<(&str, &str)> = HashSet::new();
    let mut seen_keys: HashSet<Vec<String>> = HashSet::new();
    let mut loops = Vec::new();

    for conn in graph.edges() {
        let Some(destination) = conn.destination() else {
            continue;
        };
        let origin = conn.source_node_id.as_str();

        // Parallel connections share the same answer.
        if !searched.insert((origin, destination)) {
            continue;
        }

        if budget.is_exhausted() {
            break;
        }

        let Some(path) =
            find_return_path(graph, origin, destination, loop_detection_limit, budget)
        else {
            continue;
        };

        let nodes: Vec<String> = path.into_iter().map(str::to_string).collect();
        if seen_keys.insert(loop_key(&nodes, policy)) {
            loops.push(Loop::from_nodes(nodes));
        }
    }

    let truncated = budget.is_exhausted();
    if truncated {
        warn!(loops = loops.len(), "loop detection truncated by work budget");
    } else {
        debug!(loops = loops.len(), "loop detection complete");
    }

    LoopDetection { loops, truncated }
}

/// Find a path from `start` back to `origin`, bounded by `limit` expansions.
///
/// Returns `[origin, start, …, w]` where `w → origin` closes the loop, or
/// `None` when no return path exists within the bound. A self-loop
/// (`start == origin`) is never reported.
#[must_use]
pub fn find_return_path<'a>(
    graph: &FlowGraph<'a>,
    origin: &'a str,
    start: &'a str,
    limit: usize,
    budget: &mut WorkBudget,
) -> Option<Vec<&'a str>> {
    if start == origin {
        return None;
    }

    let mut search = ReturnSearch {
        graph,
        origin,
        limit,
        iterations: 0,
        visited: HashSet::from([start]),
        path: vec![origin],
        budget,
    };

    search.visit(start).then_some(search.path)
}

struct ReturnSearch<'g, 'a> {
    graph: &'g FlowGraph<'a>,
    origin: &'a str,
    limit: usize,
    iterations: usize,
    visited: HashSet<&'a str>,
    path: Vec<&'a str>,
    budget: &'g mut WorkBudget,
}

impl<'a> ReturnSearch<'_, 'a> {
    fn visit(&mut self, node: &'a str) -> bool {
        if self.iterations >= self.limit || !self.budget.try_spend() {
            return false;
        }
        self.iterations += 1;
        self.path.push(node);

        for next in self.graph.successors(node) {
            if next == self.origin {
                return true;
            }
            if self.visited.insert(next) && self.visit(next) {
                return true;
            }
        }

        self.path.pop();
        false
    }
}

/// Deduplication key for a loop under `policy`.
#[must_use]
pub fn loop_key(nodes: &[String], policy: CycleKeyPolicy) -> Vec<String> {
    let mut key = nodes.to_vec();
    match policy {
        CycleKeyPolicy::NodeSet => key.sort_unstable(),
        CycleKeyPolicy::DirectedRotation => {
            if let Some(min_pos) = key
                .iter()
                .enumerate()
                .min_by_key(|(_, id)| *id)
                .map(|(idx, _)| idx)
            {
                key.rotate_left(min_pos);
            }
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowlens_core::model::Connection;

    fn detect(conns: &[Connection], policy: CycleKeyPolicy) -> Vec<Loop> {
        let graph = FlowGraph::from_connections(conns);
        let mut budget = WorkBudget::new(10_000);
        detect_loops(&graph, 100, policy, &mut budget).loops
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    #[test]
    fn mutual_pair_is_one_direct_loop() {
        let conns = vec![Connection::click("c1", "A", "B"), Connection::click("c2", "B", "A")];
        for policy in [CycleKeyPolicy::NodeSet, CycleKeyPolicy::DirectedRotation] {
            let loops = detect(&conns, policy);
            assert_eq!(
                loops,
                vec![Loop {
                    nodes: strings(&["A", "B"]),
                    length: 2,
                    kind: LoopKind::Direct,
                }]
            );
        }
    }

    #[test]
    fn triangle_is_one_indirect_loop() {
        let conns = vec![
            Connection::click("c1", "A", "B"),
            Connection::click("c2", "B", "C"),
            Connection::click("c3", "C", "A"),
        ];
        let loops = detect(&conns, CycleKeyPolicy::NodeSet);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].nodes, strings(&["A", "B", "C"]));
        assert_eq!(loops[0].kind, LoopKind::Indirect);
    }

    #[test]
    fn acyclic_graph_has_no_loops() {
        let conns = vec![
            Connection::click("c1", "A", "B"),
            Connection::click("c2", "B", "C"),
            Connection::click("c3", "A", "C"),
        ];
        assert!(detect(&conns, CycleKeyPolicy::NodeSet).is_empty());
    }

    #[test]
    fn self_loop_is_excluded() {
        let conns = vec![Connection::click("c1", "A", "A")];
        assert!(detect(&conns, CycleKeyPolicy::NodeSet).is_empty());
    }

    #[test]
    fn node_set_key_collapses_opposite_directions() {
        // A→B→C→A and A→C→B→A share a node set but differ in direction.
        // C→B precedes C→A so the search from C back to A goes through B.
        let conns = vec![
            Connection::click("c1", "A", "B"),
            Connection::click("c2", "B", "C"),
            Connection::click("c5", "C", "B"),
            Connection::click("c3", "C", "A"),
            Connection::click("c4", "A", "C"),
            Connection::click("c6", "B", "A"),
        ];

        let triangles = |loops: Vec<Loop>| -> Vec<Vec<String>> {
            loops
                .into_iter()
                .filter(|l| l.length == 3)
                .map(|l| l.nodes)
                .collect()
        };

        let by_set = detect(&conns, CycleKeyPolicy::NodeSet);
        assert_eq!(triangles(by_set), vec![strings(&["A", "B", "C"])]);

        let by_rotation = detect(&conns, CycleKeyPolicy::DirectedRotation);
        assert_eq!(
            triangles(by_rotation),
            vec![strings(&["A", "B", "C"]), strings(&["A", "C", "B"])]
        );
    }

    #[test]
    fn opposite_triangles_keep_their_pairs() {
        let conns = vec![
            Connection::click("c1", "A", "B"),
            Connection::click("c2", "B", "C"),
            Connection::click("c5", "C", "B"),
            Connection::click("c3", "C", "A"),
            Connection::click("c4", "A", "C"),
            Connection::click("c6", "B", "A"),
        ];
        let nodes = |policy| -> Vec<Vec<String>> {
            detect(&conns, policy).into_iter().map(|l| l.nodes).collect()
        };

        assert_eq!(
            nodes(CycleKeyPolicy::NodeSet),
            vec![
                strings(&["A", "B", "C"]),
                strings(&["B", "C"]),
                strings(&["B", "A"]),
            ]
        );
        assert_eq!(
            nodes(CycleKeyPolicy::DirectedRotation),
            vec![
                strings(&["A", "B", "C"]),
                strings(&["B", "C"]),
                strings(&["A", "C", "B"]),
                strings(&["B", "A"]),
            ]
        );
    }

    #[test]
    fn iteration_limit_bounds_search() {
        // Return path A→n1→…→n5→A needs 5 expansions.
        let mut conns = vec![Connection::click("c0", "A", "n1")];
        for i in 1..5 {
            conns.push(Connection::click(
                format!("c{i}"),
                format!("n{i}"),
                format!("n{}", i + 1),
            ));
        }
        conns.push(Connection::click("back", "n5", "A"));
        let graph = FlowGraph::from_connections(&conns);

        let mut budget = WorkBudget::new(10_000);
        assert!(find_return_path(&graph, "A", "n1", 3, &mut budget).is_none());
        let mut budget = WorkBudget::new(10_000);
        let path = find_return_path(&graph, "A", "n1", 5, &mut budget).expect("return path");
        assert_eq!(path, vec!["A", "n1", "n2", "n3", "n4", "n5"]);
    }

    #[test]
    fn loop_key_policies() {
        let nodes = strings(&["C", "A", "B"]);
        assert_eq!(loop_key(&nodes, CycleKeyPolicy::NodeSet), strings(&["A", "B", "C"]));
        assert_eq!(
            loop_key(&nodes, CycleKeyPolicy::DirectedRotation),
            strings(&["A", "B", "C"])
        );
        let reversed = strings(&["C", "B", "A"]);
        assert_eq!(
            loop_key(&reversed, CycleKeyPolicy::DirectedRotation),
            strings(&["A", "C", "B"])
        );
    }
}
