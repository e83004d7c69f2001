//! Aggregate statistics over enumerated flow paths.
//!
//! # Statistics Provided
//!
//! - **totalPaths**: number of enumerated paths.
//! - **averagePathLength**: mean step count.
//! - **maxPathLength**: largest step count.
//! - **branchingFactor**: mean, over every distinct `from` node seen in any
//!   path step, of the number of distinct `to` nodes observed from it. This
//!   is local fan-out within the sampled paths, not the full graph.
//! - **truncated**: enumeration stopped early on a budget or path ceiling.
//!
//! Every average is `0.0` when there are no paths.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::graph::paths::FlowPath;

/// Summary of a path enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStatistics {
    pub total_paths: usize,
    pub average_path_length: f64,
    pub max_path_length: usize,
    pub branching_factor: f64,
    pub truncated: bool,
}

impl PathStatistics {
    /// Aggregate `paths`; `truncated` is carried through from the enumerator.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_paths(paths: &[FlowPath], truncated: bool) -> Self {
        if paths.is_empty() {
            return Self {
                truncated,
                ..Self::default()
            };
        }

        let total_steps: usize = paths.iter().map(FlowPath::len).sum();
        let max_path_length = paths.iter().map(FlowPath::len).max().unwrap_or(0);

        let mut fan_out: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for step in paths.iter().flat_map(|path| path.steps.iter()) {
            fan_out
                .entry(step.from.as_str())
                .or_default()
                .insert(step.to.as_str());
        }

        let branching_factor = if fan_out.is_empty() {
            0.0
        } else {
            let distinct: usize = fan_out.values().map(BTreeSet::len).sum();
            distinct as f64 / fan_out.len() as f64
        };

        Self {
            total_paths: paths.len(),
            average_path_length: total_steps as f64 / paths.len() as f64,
            max_path_length,
            branching_factor,
            truncated,
        }
    }
}
