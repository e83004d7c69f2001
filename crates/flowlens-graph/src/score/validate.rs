//! Flow validation: issues that lower the score and warnings that do not.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::cycles::Loop;

const DEAD_END_PENALTY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    ExcessiveDeadEnds,
    UnreachableScreens,
    LoopsDetected,
}

impl FindingKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExcessiveDeadEnds => "excessive_dead_ends",
            Self::UnreachableScreens => "unreachable_screens",
            Self::LoopsDetected => "loops_detected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<Finding>,
    pub warnings: Vec<Finding>,
    /// `1.0` minus deductions, clamped to `[0, 1]`.
    pub score: f64,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            issues: Vec::new(),
            warnings: Vec::new(),
            score: 1.0,
        }
    }
}

/// Validate the flow structure.
///
/// `dead_ends` doubles as the unreachable set: a source never targeted by
/// any connection cannot be navigated to.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn validate_flows(
    dead_ends: &[String],
    loops: &[Loop],
    total_connections: usize,
    dead_end_ratio_threshold: f64,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if total_connections > 0 && !dead_ends.is_empty() {
        let ratio = dead_ends.len() as f64 / total_connections as f64;
        if ratio > dead_end_ratio_threshold {
            report.score -= DEAD_END_PENALTY;
            report.issues.push(Finding {
                kind: FindingKind::ExcessiveDeadEnds,
                severity: Severity::Medium,
                message: format!(
                    "{} dead ends across {total_connections} connections ({:.0}% > {:.0}%)",
                    dead_ends.len(),
                    ratio * 100.0,
                    dead_end_ratio_threshold * 100.0,
                ),
                nodes: dead_ends.to_vec(),
            });
        }
    }

    if !dead_ends.is_empty() {
        report.warnings.push(Finding {
            kind: FindingKind::UnreachableScreens,
            severity: Severity::Low,
            message: format!("{} screens are never navigated to", dead_ends.len()),
            nodes: dead_ends.to_vec(),
        });
    }

    if !loops.is_empty() {
        let nodes: BTreeSet<&str> = loops
            .iter()
            .flat_map(|l| l.nodes.iter().map(String::as_str))
            .collect();
        report.warnings.push(Finding {
            kind: FindingKind::LoopsDetected,
            severity: Severity::Low,
            message: format!("{} navigation loops detected", loops.len()),
            nodes: nodes.into_iter().map(str::to_string).collect(),
        });
    }

    report.score = report.score.clamp(0.0, 1.0);
    report
}
