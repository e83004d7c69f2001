//! Per-type counts over every connection, terminal ones included.
//!
//! Maps are `BTreeMap` so serialized output is stable across runs.

use std::collections::{BTreeMap, BTreeSet};

use flowlens_core::config::DurationUnit;
use flowlens_core::model::{ActionType, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const SMART_ANIMATE: &str = "SMART_ANIMATE";
const DEFAULT_POSITION: &str = "CENTER";
const DEFAULT_BACKGROUND: &str = "NONE";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionTally {
    pub by_trigger: BTreeMap<String, usize>,
    pub by_action: BTreeMap<String, usize>,
    /// Keyed `"TRIGGER->ACTION"`.
    pub combinations: BTreeMap<String, usize>,
    /// `distinct triggers × distinct actions / total connections`.
    pub complexity: f64,
}

/// Transition durations bucketed in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DurationBuckets {
    pub instant: usize,
    pub fast: usize,
    pub medium: usize,
    pub slow: usize,
    pub very_slow: usize,
}

impl DurationBuckets {
    fn record(&mut self, millis: f64) {
        let bucket = if millis <= 0.0 {
            &mut self.instant
        } else if millis <= 200.0 {
            &mut self.fast
        } else if millis <= 500.0 {
            &mut self.medium
        } else if millis <= 1000.0 {
            &mut self.slow
        } else {
            &mut self.very_slow
        };
        *bucket += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionTally {
    pub by_type: BTreeMap<String, usize>,
    pub by_duration: DurationBuckets,
    /// Milliseconds; `0.0` without transitions.
    pub average_duration: f64,
    pub smart_animate_usage: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DismissalPatterns {
    pub click_outside: usize,
    pub close_action: usize,
    pub back_action: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayTally {
    pub total: usize,
    pub by_position: BTreeMap<String, usize>,
    pub dismissal_patterns: DismissalPatterns,
    pub background_interaction: BTreeMap<String, usize>,
}

/// The three tally sections of an analysis result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tallies {
    pub interactions: InteractionTally,
    pub transitions: TransitionTally,
    pub overlays: OverlayTally,
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

/// Tally triggers, actions, transitions and overlays in one pass.
#[must_use]
#[instrument(skip_all, fields(connections = connections.len()))]
pub fn tally(connections: &[Connection], unit: DurationUnit) -> Tallies {
    let tallies = Tallies {
        interactions: interaction_tally(connections),
        transitions: transition_tally(connections, unit),
        overlays: overlay_tally(connections),
    };
    debug!(
        triggers = tallies.interactions.by_trigger.len(),
        transitions = tallies.transitions.by_type.values().sum::<usize>(),
        overlays = tallies.overlays.total,
        "interaction tallies computed"
    );
    tallies
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn interaction_tally(connections: &[Connection]) -> InteractionTally {
    let mut tally = InteractionTally::default();
    if connections.is_empty() {
        return tally;
    }

    for conn in connections {
        let trigger = conn.trigger.kind.as_str();
        let action = conn.action.kind.as_str();
        *tally.by_trigger.entry(trigger.to_string()).or_default() += 1;
        *tally.by_action.entry(action.to_string()).or_default() += 1;
        *tally
            .combinations
            .entry(format!("{trigger}->{action}"))
            .or_default() += 1;
    }

    let distinct = tally.by_trigger.len() * tally.by_action.len();
    tally.complexity = distinct as f64 / connections.len() as f64;
    tally
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn transition_tally(connections: &[Connection], unit: DurationUnit) -> TransitionTally {
    let mut tally = TransitionTally::default();
    let mut total_millis = 0.0;
    let mut count = 0_usize;

    for transition in connections
        .iter()
        .filter_map(|conn| conn.action.transition.as_ref())
    {
        let millis = unit.to_millis(transition.duration);
        *tally.by_type.entry(transition.kind.clone()).or_default() += 1;
        tally.by_duration.record(millis);
        if transition.kind == SMART_ANIMATE {
            tally.smart_animate_usage += 1;
        }
        total_millis += millis;
        count += 1;
    }

    if count > 0 {
        tally.average_duration = total_millis / count as f64;
    }
    tally
}

#[must_use]
pub fn overlay_tally(connections: &[Connection]) -> OverlayTally {
    let mut tally = OverlayTally::default();

    for conn in connections {
        match conn.action.kind {
            ActionType::Close => tally.dismissal_patterns.close_action += 1,
            ActionType::Back => tally.dismissal_patterns.back_action += 1,
            ActionType::Overlay => {
                tally.total += 1;
                let settings = conn.action.overlay.as_ref();
                let position = settings
                    .and_then(|s| s.position.as_deref())
                    .unwrap_or(DEFAULT_POSITION);
                let background = settings
                    .and_then(|s| s.background_interaction.as_deref())
                    .unwrap_or(DEFAULT_BACKGROUND);
                *tally.by_position.entry(position.to_string()).or_default() += 1;
                *tally
                    .background_interaction
                    .entry(background.to_string())
                    .or_default() += 1;
                if settings.and_then(|s| s.close_on_click_outside) == Some(true) {
                    tally.dismissal_patterns.click_outside += 1;
                }
            }
            ActionType::Node | ActionType::Url | ActionType::Other => {}
        }
    }

    tally
}

/// Distinct trigger types across `connections`.
#[must_use]
pub fn distinct_triggers(connections: &[Connection]) -> usize {
    connections
        .iter()
        .map(|conn| conn.trigger.kind)
        .collect::<BTreeSet<_>>()
        .len()
}
