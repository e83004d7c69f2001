use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputNotFound,
    InputParseError,
    ConfigParseError,
    InvalidConfig,
    StageFailed,
    AnalysisAborted,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InputNotFound => "E1001",
            Self::InputParseError => "E1002",
            Self::ConfigParseError => "E2001",
            Self::InvalidConfig => "E2002",
            Self::StageFailed => "E3001",
            Self::AnalysisAborted => "E3002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InputNotFound => "Interaction input not found",
            Self::InputParseError => "Interaction input parse error",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidConfig => "Invalid analysis configuration",
            Self::StageFailed => "Analysis stage failed",
            Self::AnalysisAborted => "Analysis aborted",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InputNotFound => Some("Pass a readable JSON file, or `-` to read stdin."),
            Self::InputParseError => Some(
                "Provide a JSON array of connections or an object with a `connections` array.",
            ),
            Self::ConfigParseError => Some("Fix syntax in .flowlens/config.toml and retry."),
            Self::InvalidConfig => {
                Some("Depth and limit settings must be positive; ratios must lie in [0, 1].")
            }
            Self::StageFailed => Some("Partial results were returned. Report a bug with logs."),
            Self::AnalysisAborted => Some("Retry with FLOWLENS_LOG=debug and report a bug."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised at the edges of the engine: input decoding and configuration.
///
/// The analysis pipeline itself never returns these to callers; stage
/// failures are recovered and reported inside the result instead.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("failed to parse interaction input: {0}")]
    InputParse(#[from] serde_json::Error),

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("analysis stage `{stage}` failed: {message}")]
    StageFailed { stage: &'static str, message: String },
}

impl FlowError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InputParse(_) => ErrorCode::InputParseError,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::StageFailed { .. } => ErrorCode::StageFailed,
        }
    }

    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code()
            .hint()
            .unwrap_or_else(|| self.error_code().message())
            .to_string()
    }
}
