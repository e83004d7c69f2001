use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::FlowError;

/// Project-level config file, `.flowlens/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Which nodes count as flow entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPointPolicy {
    /// Nodes reached as a destination but never a source. Compatibility
    /// rule of the downstream pipeline.
    #[default]
    TargetsNeverSources,
    /// Nodes that are a source but never a destination.
    SourcesNeverTargets,
}

/// Key used to deduplicate detected loops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleKeyPolicy {
    /// Sorted node ids. Loses direction: two cycles over the same node set
    /// collapse into one.
    #[default]
    NodeSet,
    /// Directed node sequence rotated to start at its smallest id.
    DirectedRotation,
}

/// Unit of `transition.duration` in the input records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    #[default]
    Milliseconds,
    Seconds,
}

impl DurationUnit {
    #[must_use]
    pub fn to_millis(self, value: f64) -> f64 {
        match self {
            Self::Milliseconds => value,
            Self::Seconds => value * 1000.0,
        }
    }
}

/// Tunables for a single analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Step ceiling for path enumeration and navigation depth walks.
    #[serde(default = "default_max_flow_depth")]
    pub max_flow_depth: usize,
    /// Paths shorter than this many steps are discarded.
    #[serde(default = "default_min_path_length")]
    pub min_path_length: usize,
    /// Enumeration stops once this many paths were found.
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
    /// Node expansions allowed per return-path search.
    #[serde(default = "default_loop_detection_limit")]
    pub loop_detection_limit: usize,
    /// Node expansions allowed per traversal stage.
    #[serde(default = "default_max_work_units")]
    pub max_work_units: usize,
    #[serde(default = "default_dead_end_ratio_threshold")]
    pub dead_end_ratio_threshold: f64,
    /// A node with in-degree above this is a hub.
    #[serde(default = "default_degree_threshold")]
    pub hub_threshold: usize,
    /// A node with out-degree above this is a connector.
    #[serde(default = "default_degree_threshold")]
    pub connector_threshold: usize,
    #[serde(default = "default_hub_spoke_multiplier")]
    pub hub_spoke_multiplier: f64,
    #[serde(default)]
    pub entry_point_policy: EntryPointPolicy,
    #[serde(default)]
    pub cycle_key_policy: CycleKeyPolicy,
    #[serde(default)]
    pub duration_unit: DurationUnit,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_flow_depth: default_max_flow_depth(),
            min_path_length: default_min_path_length(),
            max_paths: default_max_paths(),
            loop_detection_limit: default_loop_detection_limit(),
            max_work_units: default_max_work_units(),
            dead_end_ratio_threshold: default_dead_end_ratio_threshold(),
            hub_threshold: default_degree_threshold(),
            connector_threshold: default_degree_threshold(),
            hub_spoke_multiplier: default_hub_spoke_multiplier(),
            entry_point_policy: EntryPointPolicy::default(),
            cycle_key_policy: CycleKeyPolicy::default(),
            duration_unit: DurationUnit::default(),
        }
    }
}

impl AnalysisConfig {
    /// Reject settings that would make a traversal meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), FlowError> {
        let positive = [
            ("max_flow_depth", self.max_flow_depth),
            ("max_paths", self.max_paths),
            ("loop_detection_limit", self.loop_detection_limit),
            ("max_work_units", self.max_work_units),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(FlowError::InvalidConfig {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if self.min_path_length > self.max_flow_depth {
            return Err(FlowError::InvalidConfig {
                field: "min_path_length",
                reason: format!(
                    "{} exceeds max_flow_depth {}",
                    self.min_path_length, self.max_flow_depth
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.dead_end_ratio_threshold) {
            return Err(FlowError::InvalidConfig {
                field: "dead_end_ratio_threshold",
                reason: format!("{} is outside [0, 1]", self.dead_end_ratio_threshold),
            });
        }

        if !self.hub_spoke_multiplier.is_finite() || self.hub_spoke_multiplier <= 0.0 {
            return Err(FlowError::InvalidConfig {
                field: "hub_spoke_multiplier",
                reason: format!("{} must be a positive number", self.hub_spoke_multiplier),
            });
        }

        Ok(())
    }
}

/// Load `.flowlens/config.toml` under `project_root`, or defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".flowlens/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }
    load_config_file(&path)
}

/// Load a config file from an explicit path.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<ProjectConfig>(&content).map_err(|source| {
        FlowError::ConfigParse {
            path: path.display().to_string(),
            source,
        }
    })?;

    config
        .analysis
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded analysis config");
    Ok(config)
}

const fn default_max_flow_depth() -> usize {
    10
}

const fn default_min_path_length() -> usize {
    2
}

const fn default_max_paths() -> usize {
    1000
}

const fn default_loop_detection_limit() -> usize {
    100
}

const fn default_max_work_units() -> usize {
    50_000
}

const fn default_dead_end_ratio_threshold() -> f64 {
    0.1
}

const fn default_degree_threshold() -> usize {
    2
}

const fn default_hub_spoke_multiplier() -> f64 {
    2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = TempDir::new().expect("temp dir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg.analysis, AnalysisConfig::default());
        assert_eq!(cfg.analysis.max_flow_depth, 10);
        assert_eq!(cfg.analysis.min_path_length, 2);
        assert_eq!(cfg.analysis.loop_detection_limit, 100);
        assert_eq!(
            cfg.analysis.entry_point_policy,
            EntryPointPolicy::TargetsNeverSources
        );
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let root = TempDir::new().expect("temp dir");
        let dir = root.path().join(".flowlens");
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(
            dir.join("config.toml"),
            r#"
[analysis]
max_flow_depth = 6
entry_point_policy = "sources_never_targets"
cycle_key_policy = "directed_rotation"
duration_unit = "seconds"
"#,
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg.analysis.max_flow_depth, 6);
        assert_eq!(cfg.analysis.min_path_length, 2);
        assert_eq!(
            cfg.analysis.entry_point_policy,
            EntryPointPolicy::SourcesNeverTargets
        );
        assert_eq!(cfg.analysis.cycle_key_policy, CycleKeyPolicy::DirectedRotation);
        assert_eq!(cfg.analysis.duration_unit, DurationUnit::Seconds);
    }

    #[test]
    fn malformed_config_reports_path() {
        let root = TempDir::new().expect("temp dir");
        let path = root.path().join("broken.toml");
        std::fs::write(&path, "[analysis\nmax_flow_depth = ").expect("write config");

        let err = load_config_file(&path).expect_err("parse must fail");
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn zero_depth_is_rejected() {
        let cfg = AnalysisConfig {
            max_flow_depth: 0,
            min_path_length: 0,
            ..AnalysisConfig::default()
        };
        let err = cfg.validate().expect_err("zero depth must be rejected");
        assert!(err.to_string().contains("max_flow_depth"));
    }

    #[test]
    fn min_length_above_depth_is_rejected() {
        let cfg = AnalysisConfig {
            max_flow_depth: 3,
            min_path_length: 4,
            ..AnalysisConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn ratio_out_of_range_is_rejected() {
        let cfg = AnalysisConfig {
            dead_end_ratio_threshold: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn seconds_convert_to_millis() {
        assert!((DurationUnit::Seconds.to_millis(0.3) - 300.0).abs() < 1e-9);
        assert!((DurationUnit::Milliseconds.to_millis(300.0) - 300.0).abs() < f64::EPSILON);
    }
}
