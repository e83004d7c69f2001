//! Flow graph construction and traversal.
//!
//! ## Pipeline
//!
//! ```text
//! [Connection]
//!        ↓  build::FlowGraph::from_connections()
//! FlowGraph (adjacency by source, reachability DiGraph, content hash)
//!        ├─ paths::enumerate_paths()   bounded simple paths
//!        ├─ cycles::detect_loops()     return-path loops, deduplicated
//!        ↓
//! stats::PathStatistics::from_paths()
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use flowlens_graph::budget::WorkBudget;
//! use flowlens_graph::graph::{build::FlowGraph, paths};
//!
//! let graph = FlowGraph::from_connections(&connections);
//! let mut budget = WorkBudget::new(50_000);
//! let found = paths::enumerate_paths(
//!     &graph,
//!     &paths::path_starts(&graph),
//!     paths::PathLimits::default(),
//!     &mut budget,
//! );
//! ```

pub mod build;
pub mod cycles;
pub mod paths;
pub mod stats;
