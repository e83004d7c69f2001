//! Flow pattern classification.
//!
//! # Rules
//!
//! - **linear**: a path of at most [`LINEAR_MAX_STEPS`] steps.
//! - **branching**: a longer path touching fewer distinct nodes than it has
//!   steps. Enumerated paths never repeat a node, so this only fires for
//!   paths built elsewhere.
//! - **circular**: one per detected loop.
//! - **hub_spoke**: one per node whose traversable out-degree is at least
//!   [`HUB_SPOKE_MIN_DEGREE`] and at least `multiplier` times the mean
//!   out-degree over all source nodes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::build::FlowGraph;
use crate::graph::paths::FlowPath;

pub const LINEAR_MAX_STEPS: usize = 3;
pub const HUB_SPOKE_MIN_DEGREE: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PatternCounts {
    pub linear: usize,
    pub branching: usize,
    pub circular: usize,
    pub hub_spoke: usize,
}

/// Classify every path, count loops, and count hub-and-spoke centres.
#[must_use]
pub fn classify_patterns(
    graph: &FlowGraph<'_>,
    paths: &[FlowPath],
    loop_count: usize,
    hub_spoke_multiplier: f64,
) -> PatternCounts {
    let mut counts = PatternCounts {
        circular: loop_count,
        hub_spoke: hub_spoke_count(graph, hub_spoke_multiplier),
        ..PatternCounts::default()
    };

    for path in paths {
        if path.len() <= LINEAR_MAX_STEPS {
            counts.linear += 1;
        } else if distinct_nodes(path) < path.len() {
            counts.branching += 1;
        }
    }

    counts
}

/// Nodes whose fan-out dominates the graph's mean fan-out.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hub_spoke_count(graph: &FlowGraph<'_>, multiplier: f64) -> usize {
    let degrees: Vec<usize> = graph
        .source_ids()
        .iter()
        .map(|id| graph.outgoing(id).len())
        .collect();
    if degrees.is_empty() {
        return 0;
    }

    let mean = degrees.iter().sum::<usize>() as f64 / degrees.len() as f64;
    degrees
        .into_iter()
        .filter(|&degree| degree >= HUB_SPOKE_MIN_DEGREE && degree as f64 >= multiplier * mean)
        .count()
}

fn distinct_nodes(path: &FlowPath) -> usize {
    path.nodes().into_iter().collect::<HashSet<_>>().len()
}
