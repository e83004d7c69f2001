//! Bounded flow-path enumeration.
//!
//! # Algorithm
//!
//! Recursive depth-first expansion from each start node. A branch ends when
//! the depth budget is spent or when every outgoing destination is already
//! on the current path (the node is then a leaf). The ended path is kept if
//! it has at least `min_length` steps.
//!
//! The visited set is per path, not global: the same node may appear in many
//! paths, and several start nodes may share sub-paths. Branches restore the
//! path state on return so siblings never see each other's nodes.
//!
//! # Termination
//!
//! Work is exponential in branching factor within the depth bound, so each
//! enumeration also draws from a [`WorkBudget`] and stops at `max_paths`.
//! Either ceiling stops further expansion; paths found so far are kept and
//! the result is flagged `truncated`.

use std::collections::HashSet;

use flowlens_core::model::{ActionType, Connection, TriggerType};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::budget::WorkBudget;
use crate::graph::build::FlowGraph;

/// One traversed connection within a [`FlowPath`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub from: String,
    pub to: String,
    pub connection_id: String,
    pub trigger: TriggerType,
    pub action: ActionType,
}

impl Step {
    fn from_connection(conn: &Connection, to: &str) -> Self {
        Self {
            from: conn.source_node_id.clone(),
            to: to.to_string(),
            connection_id: conn.id.clone(),
            trigger: conn.trigger.kind,
            action: conn.action.kind,
        }
    }
}

/// Ordered, non-repeating walk through the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPath {
    pub start: String,
    pub steps: Vec<Step>,
}

impl FlowPath {
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Node ids in visiting order, start included.
    #[must_use]
    pub fn nodes(&self) -> Vec<&str> {
        std::iter::once(self.start.as_str())
            .chain(self.steps.iter().map(|step| step.to.as_str()))
            .collect()
    }
}

/// Bounds for one enumeration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathLimits {
    /// Maximum steps per path.
    pub max_depth: usize,
    /// Minimum steps for a path to be kept.
    pub min_length: usize,
    /// Stop once this many paths were kept.
    pub max_paths: usize,
}

impl Default for PathLimits {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_length: 2,
            max_paths: 1000,
        }
    }
}

/// Paths found by [`enumerate_paths`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathEnumeration {
    pub paths: Vec<FlowPath>,
    /// A budget or path ceiling stopped expansion early.
    pub truncated: bool,
}

/// Start nodes for enumeration: every node with an outgoing edge.
#[must_use]
pub fn path_starts<'a>(graph: &FlowGraph<'a>) -> Vec<&'a str> {
    graph.source_ids().iter().copied().collect()
}

/// Enumerate bounded paths from every node in `starts`, sharing one budget.
#[instrument(skip_all, fields(starts = starts.len(), max_depth = limits.max_depth))]
pub fn enumerate_paths(
    graph: &FlowGraph<'_>,
    starts: &[&str],
    limits: PathLimits,
    budget: &mut WorkBudget,
) -> PathEnumeration {
    let mut walker = Walker::new(graph, limits, budget);
    for start in starts {
        if walker.stopped {
            break;
        }
        walker.walk_from(start);
    }

    let result = walker.finish();
    if result.truncated {
        warn!(paths = result.paths.len(), "path enumeration truncated");
    } else {
        debug!(paths = result.paths.len(), "path enumeration complete");
    }
    result
}

/// Enumerate bounded paths from a single start node.
#[must_use]
pub fn enumerate_from(
    graph: &FlowGraph<'_>,
    start: &str,
    limits: PathLimits,
    budget: &mut WorkBudget,
) -> Vec<FlowPath> {
    let mut walker = Walker::new(graph, limits, budget);
    walker.walk_from(start);
    walker.finish().paths
}

struct Walker<'g, 'a> {
    graph: &'g FlowGraph<'a>,
    limits: PathLimits,
    budget: &'g mut WorkBudget,
    paths: Vec<FlowPath>,
    stopped: bool,
}

impl<'g, 'a> Walker<'g, 'a> {
    const fn new(graph: &'g FlowGraph<'a>, limits: PathLimits, budget: &'g mut WorkBudget) -> Self {
        Self {
            graph,
            limits,
            budget,
            paths: Vec::new(),
            stopped: false,
        }
    }

    fn walk_from(&mut self, start: &str) {
        let mut visited = HashSet::new();
        let mut steps = Vec::new();
        self.expand(start, start, self.limits.max_depth, &mut visited, &mut steps);
    }

    fn expand<'s>(
        &mut self,
        start: &str,
        node: &'s str,
        depth_left: usize,
        visited: &mut HashSet<&'s str>,
        steps: &mut Vec<Step>,
    ) where
        'a: 's,
    {
        if depth_left == 0 || visited.contains(node) {
            self.emit(start, steps);
            return;
        }

        if !self.budget.try_spend() {
            self.stopped = true;
            return;
        }

        visited.insert(node);

        let graph = self.graph;
        let next: Vec<(&'a Connection, &'a str)> = graph
            .outgoing(node)
            .iter()
            .copied()
            .filter_map(|conn| conn.destination().map(|dest| (conn, dest)))
            .filter(|(_, dest)| !visited.contains(dest))
            .collect();

        if next.is_empty() {
            self.emit(start, steps);
        } else {
            for (conn, dest) in next {
                if self.stopped {
                    break;
                }
                steps.push(Step::from_connection(conn, dest));
                self.expand(start, dest, depth_left - 1, visited, steps);
                steps.pop();
            }
        }

        visited.remove(node);
    }

    fn emit(&mut self, start: &str, steps: &[Step]) {
        if steps.len() < self.limits.min_length {
            return;
        }
        if self.paths.len() >= self.limits.max_paths {
            self.stopped = true;
            return;
        }
        self.paths.push(FlowPath {
            start: start.to_string(),
            steps: steps.to_vec(),
        });
    }

    fn finish(self) -> PathEnumeration {
        PathEnumeration {
            paths: self.paths,
            truncated: self.stopped,
        }
    }
}
