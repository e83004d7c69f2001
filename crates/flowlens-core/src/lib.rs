#![forbid(unsafe_code)]
//! flowlens-core library.
//!
//! Shared vocabulary for the flowlens workspace: the interaction record
//! model read from design documents, analysis configuration, and error codes.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for I/O-facing helpers and
//!   [`error::FlowError`] where callers need to branch on the failure.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;

pub use config::AnalysisConfig;
pub use error::{ErrorCode, FlowError};
pub use model::Connection;
