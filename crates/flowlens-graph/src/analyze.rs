//! End-to-end flow analysis.
//!
//! # Stages
//!
//! ```text
//! FlowGraph::from_connections
//!   ├─ paths        ┐
//!   ├─ cycles       │ rayon::join, each with its own WorkBudget
//!   ├─ navigation   │
//!   └─ tallies      ┘
//!        ↓ fan-in
//! statistics → patterns → validation → confidence
//! ```
//!
//! # Failure Containment
//!
//! Every stage runs under `catch_unwind`. A panicking stage is logged,
//! recorded in `metadata.stageErrors`, and replaced by its default output;
//! the run continues and the final confidence is capped at the floor. The
//! whole pipeline is wrapped once more so [`FlowAnalyzer::analyze`] always
//! returns a result.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::{DateTime, Utc};
use flowlens_core::config::AnalysisConfig;
use flowlens_core::error::ErrorCode;
use flowlens_core::model::{Connection, ConnectionView};
use tracing::{debug, error, info, instrument, warn};

use crate::budget::WorkBudget;
use crate::graph::build::FlowGraph;
use crate::graph::cycles::{LoopDetection, detect_loops};
use crate::graph::paths::{PathEnumeration, PathLimits, enumerate_paths, path_starts};
use crate::graph::stats::PathStatistics;
use crate::metrics::navigation::{NavigationLimits, NavigationMetrics, navigation_metrics};
use crate::metrics::tallies::{Tallies, distinct_triggers, tally};
use crate::result::{AnalysisResult, FlowSection, Metadata, StageError};
use crate::score::confidence::{
    CONFIDENCE_FLOOR, ConfidenceInputs, ConfidenceWeights, confidence_score,
};
use crate::score::patterns::{PatternCounts, classify_patterns};
use crate::score::validate::{ValidationReport, validate_flows};

/// Stateless analyzer: configuration in, fresh [`AnalysisResult`] out.
#[derive(Debug, Clone, Default)]
pub struct FlowAnalyzer {
    config: AnalysisConfig,
    weights: ConfidenceWeights,
}

impl FlowAnalyzer {
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            weights: ConfidenceWeights::default(),
        }
    }

    #[must_use]
    pub const fn with_confidence_weights(mut self, weights: ConfidenceWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `connections`, stamping the result with the current time.
    #[must_use]
    pub fn analyze(&self, connections: &[Connection]) -> AnalysisResult {
        self.analyze_at(connections, Utc::now())
    }

    /// Analyze `connections` with an explicit timestamp.
    ///
    /// Never panics: stage failures degrade the result, and a failure outside
    /// every stage yields [`AnalysisResult::fallback`].
    #[must_use]
    #[instrument(skip_all, fields(connections = connections.len()))]
    pub fn analyze_at(&self, connections: &[Connection], timestamp: DateTime<Utc>) -> AnalysisResult {
        if connections.is_empty() {
            debug!("no connections; returning empty result");
            return AnalysisResult::empty(timestamp);
        }

        let started = Instant::now();
        let mut result = contain(connections.len(), timestamp, || {
            self.run(connections, timestamp)
        });
        result.metadata.processing_time = started.elapsed().as_secs_f64() * 1000.0;

        info!(
            paths = result.flows.paths.len(),
            loops = result.flows.loops.len(),
            confidence = result.metadata.confidence,
            elapsed_ms = result.metadata.processing_time,
            degraded = result.is_degraded(),
            "flow analysis complete"
        );
        result
    }

    const fn path_limits(&self) -> PathLimits {
        PathLimits {
            max_depth: self.config.max_flow_depth,
            min_length: self.config.min_path_length,
            max_paths: self.config.max_paths,
        }
    }

    const fn navigation_limits(&self) -> NavigationLimits {
        NavigationLimits {
            hub_threshold: self.config.hub_threshold,
            connector_threshold: self.config.connector_threshold,
            max_depth: self.config.max_flow_depth,
        }
    }

    fn run(&self, connections: &[Connection], timestamp: DateTime<Utc>) -> AnalysisResult {
        let cfg = &self.config;
        let graph = FlowGraph::from_connections(connections);
        let mut stage_errors = Vec::new();

        let (((paths, paths_err), (loops, cycles_err)), ((navigation, nav_err), (tallies, tally_err))) =
            rayon::join(
                || {
                    rayon::join(
                        || {
                            guarded("paths", PathEnumeration::default(), || {
                                let mut budget = WorkBudget::new(cfg.max_work_units);
                                enumerate_paths(
                                    &graph,
                                    &path_starts(&graph),
                                    self.path_limits(),
                                    &mut budget,
                                )
                            })
                        },
                        || {
                            guarded("cycles", LoopDetection::default(), || {
                                let mut budget = WorkBudget::new(cfg.max_work_units);
                                detect_loops(
                                    &graph,
                                    cfg.loop_detection_limit,
                                    cfg.cycle_key_policy,
                                    &mut budget,
                                )
                            })
                        },
                    )
                },
                || {
                    rayon::join(
                        || {
                            guarded("navigation", NavigationMetrics::default(), || {
                                let mut budget = WorkBudget::new(cfg.max_work_units);
                                navigation_metrics(&graph, self.navigation_limits(), &mut budget)
                            })
                        },
                        || {
                            guarded("tallies", Tallies::default(), || {
                                tally(connections, cfg.duration_unit)
                            })
                        },
                    )
                },
            );
        stage_errors.extend([paths_err, cycles_err, nav_err, tally_err].into_iter().flatten());

        let (statistics, err) = guarded("statistics", PathStatistics::default(), || {
            PathStatistics::from_paths(&paths.paths, paths.truncated)
        });
        stage_errors.extend(err);

        let (patterns, err) = guarded("patterns", PatternCounts::default(), || {
            classify_patterns(&graph, &paths.paths, loops.loops.len(), cfg.hub_spoke_multiplier)
        });
        stage_errors.extend(err);

        let dead_ends = graph.dead_ends();

        let (validation, err) = guarded("validation", ValidationReport::default(), || {
            validate_flows(
                &dead_ends,
                &loops.loops,
                connections.len(),
                cfg.dead_end_ratio_threshold,
            )
        });
        stage_errors.extend(err);

        let (mut confidence, err) = guarded("confidence", CONFIDENCE_FLOOR, || {
            let inputs = ConfidenceInputs {
                total_connections: connections.len(),
                path_count: paths.paths.len(),
                distinct_triggers: distinct_triggers(connections),
                max_path_length: statistics.max_path_length,
            };
            confidence_score(&inputs, &self.weights)
        });
        stage_errors.extend(err);

        let error = if stage_errors.is_empty() {
            None
        } else {
            confidence = confidence.min(CONFIDENCE_FLOOR);
            Some(
                stage_errors
                    .iter()
                    .map(|stage| stage.to_error().to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        };

        let Tallies {
            interactions,
            transitions,
            overlays,
        } = tallies;

        AnalysisResult {
            connections: connections.iter().map(ConnectionView::from).collect(),
            flows: FlowSection {
                entry_points: graph.entry_points(cfg.entry_point_policy),
                exit_points: graph.exit_points(),
                dead_ends,
                loops: loops.loops,
                loops_truncated: loops.truncated,
                paths: paths.paths,
                statistics,
            },
            interactions,
            navigation,
            transitions,
            overlays,
            validation,
            patterns,
            metadata: Metadata {
                total_connections: connections.len(),
                unique_screens: graph.unique_screens(),
                analysis_timestamp: timestamp,
                processing_time: 0.0,
                confidence,
                content_hash: graph.content_hash.clone(),
                stage_errors,
            },
            error,
        }
    }
}

/// Run `f`, turning a panic into `default` plus a recorded [`StageError`].
pub(crate) fn guarded<T>(
    stage: &'static str,
    default: T,
    f: impl FnOnce() -> T,
) -> (T, Option<StageError>) {
    let started = Instant::now();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => {
            debug!(
                stage,
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                "stage complete"
            );
            (value, None)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(stage, %message, "analysis stage failed; substituting default");
            (default, Some(StageError::new(stage, message)))
        }
    }
}

/// Last-resort boundary around a whole run.
pub(crate) fn contain(
    total_connections: usize,
    timestamp: DateTime<Utc>,
    run: impl FnOnce() -> AnalysisResult,
) -> AnalysisResult {
    panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        error!(
            code = ErrorCode::AnalysisAborted.code(),
            %message,
            "flow analysis aborted"
        );
        AnalysisResult::fallback(
            total_connections,
            format!("{}: {message}", ErrorCode::AnalysisAborted.message()),
            timestamp,
        )
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
