#![forbid(unsafe_code)]
//! flowlens-graph library.
//!
//! Flow-graph construction and navigation analytics over interaction
//! records. Every stage is a pure function of the borrowed connection list
//! and the [`AnalysisConfig`](flowlens_core::AnalysisConfig); nothing is
//! cached between runs.
//!
//! # Conventions
//!
//! - **Errors**: The analysis entry point is infallible; stage failures are
//!   recovered and reported inside [`AnalysisResult`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Bounds**: Recursive traversals take a depth ceiling and a [`budget::WorkBudget`].

pub mod analyze;
pub mod budget;
pub mod graph;
pub mod metrics;
pub mod result;
pub mod score;

pub use analyze::FlowAnalyzer;
pub use graph::build::FlowGraph;
pub use result::AnalysisResult;
