//! The analysis result record handed to downstream consumers.
//!
//! Field names serialize camelCase. Section layout is fixed: consumers key
//! on `connections`, `flows`, `interactions`, `navigation`, `transitions`,
//! `overlays`, `validation`, `patterns` and `metadata`.

use chrono::{DateTime, Utc};
use flowlens_core::error::{ErrorCode, FlowError};
use flowlens_core::model::ConnectionView;
use serde::{Deserialize, Serialize};

use crate::graph::cycles::Loop;
use crate::graph::paths::FlowPath;
use crate::graph::stats::PathStatistics;
use crate::metrics::navigation::NavigationMetrics;
use crate::metrics::tallies::{InteractionTally, OverlayTally, TransitionTally};
use crate::score::confidence::CONFIDENCE_FLOOR;
use crate::score::patterns::PatternCounts;
use crate::score::validate::ValidationReport;

/// Names of the guarded analysis stages, as recorded in `stageErrors`.
pub const STAGES: [&str; 8] = [
    "paths",
    "cycles",
    "navigation",
    "tallies",
    "statistics",
    "patterns",
    "validation",
    "confidence",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSection {
    pub paths: Vec<FlowPath>,
    pub entry_points: Vec<String>,
    pub exit_points: Vec<String>,
    pub loops: Vec<Loop>,
    /// Loop detection ran out of work budget; `loops` is partial.
    #[serde(default)]
    pub loops_truncated: bool,
    pub dead_ends: Vec<String>,
    pub statistics: PathStatistics,
}

/// A stage that panicked and was replaced by its default output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageError {
    pub stage: String,
    pub error_code: String,
    pub message: String,
}

impl StageError {
    #[must_use]
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage: stage.to_string(),
            error_code: ErrorCode::StageFailed.code().to_string(),
            message: message.into(),
        }
    }

    /// Render as the matching [`FlowError`].
    #[must_use]
    pub fn to_error(&self) -> FlowError {
        FlowError::StageFailed {
            stage: stage_name(&self.stage),
            message: self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub total_connections: usize,
    pub unique_screens: usize,
    pub analysis_timestamp: DateTime<Utc>,
    /// Wall time in milliseconds.
    pub processing_time: f64,
    pub confidence: f64,
    /// `blake3:` hash of the distinct edge set; empty without edges.
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stage_errors: Vec<StageError>,
}

impl Metadata {
    #[must_use]
    pub const fn empty(analysis_timestamp: DateTime<Utc>) -> Self {
        Self {
            total_connections: 0,
            unique_screens: 0,
            analysis_timestamp,
            processing_time: 0.0,
            confidence: 0.0,
            content_hash: String::new(),
            stage_errors: Vec::new(),
        }
    }
}

/// Full analysis output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub connections: Vec<ConnectionView>,
    pub flows: FlowSection,
    pub interactions: InteractionTally,
    pub navigation: NavigationMetrics,
    pub transitions: TransitionTally,
    pub overlays: OverlayTally,
    pub validation: ValidationReport,
    pub patterns: PatternCounts,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Canonical result for zero connections.
    #[must_use]
    pub fn empty(analysis_timestamp: DateTime<Utc>) -> Self {
        Self {
            connections: Vec::new(),
            flows: FlowSection::default(),
            interactions: InteractionTally::default(),
            navigation: NavigationMetrics::default(),
            transitions: TransitionTally::default(),
            overlays: OverlayTally::default(),
            validation: ValidationReport::default(),
            patterns: PatternCounts::default(),
            metadata: Metadata::empty(analysis_timestamp),
            error: None,
        }
    }

    /// Result for a run that failed outside every stage guard.
    #[must_use]
    pub fn fallback(
        total_connections: usize,
        message: impl Into<String>,
        analysis_timestamp: DateTime<Utc>,
    ) -> Self {
        let mut result = Self::empty(analysis_timestamp);
        result.metadata.total_connections = total_connections;
        result.metadata.confidence = CONFIDENCE_FLOOR;
        result.error = Some(message.into());
        result
    }

    /// True when any stage fell back to its default, or the run aborted.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.error.is_some() || !self.metadata.stage_errors.is_empty()
    }
}

fn stage_name(stage: &str) -> &'static str {
    STAGES
        .iter()
        .copied()
        .find(|known| *known == stage)
        .unwrap_or("unknown")
}
