use serde::{Deserialize, Serialize};

/// Confidence returned when no factor contributes.
pub const CONFIDENCE_FLOOR: f64 = 0.1;

/// Connection count at which the volume term saturates.
const VOLUME_SATURATION: f64 = 10.0;

/// Observed facts the confidence formula reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfidenceInputs {
    pub total_connections: usize,
    pub path_count: usize,
    pub distinct_triggers: usize,
    /// Longest enumerated path, in steps.
    pub max_path_length: usize,
}

/// Weights for the confidence formula:
///
/// `C = volume*min(n/10, 1) + paths*[any path] + diversity*[>1 trigger] + depth*[path > 2 steps]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub volume: f64,
    pub paths: f64,
    pub diversity: f64,
    pub depth: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            volume: 0.3,
            paths: 0.3,
            diversity: 0.2,
            depth: 0.2,
        }
    }
}

/// Confidence in `[0, 1]`; [`CONFIDENCE_FLOOR`] when nothing contributes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn confidence_score(inputs: &ConfidenceInputs, weights: &ConfidenceWeights) -> f64 {
    let volume = (inputs.total_connections as f64 / VOLUME_SATURATION).min(1.0);

    let mut score = weights.volume * volume;
    if inputs.path_count > 0 {
        score += weights.paths;
    }
    if inputs.distinct_triggers > 1 {
        score += weights.diversity;
    }
    if inputs.max_path_length > 2 {
        score += weights.depth;
    }

    if score <= 0.0 {
        return CONFIDENCE_FLOOR;
    }
    score.clamp(0.0, 1.0)
}
