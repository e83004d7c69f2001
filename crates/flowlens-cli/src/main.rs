#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use std::env;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use flowlens_core::config::{AnalysisConfig, EntryPointPolicy, load_config_file, load_project_config};
use flowlens_core::error::{ErrorCode, FlowError};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "flowlens: prototype interaction flow analysis",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Read analysis settings from this TOML file instead of `.flowlens/config.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the maximum steps per path.
    #[arg(long, global = true, value_name = "N")]
    max_depth: Option<usize>,

    /// Override the minimum steps for a path to be kept.
    #[arg(long, global = true, value_name = "N")]
    min_length: Option<usize>,

    /// Override how entry points are chosen.
    #[arg(long, global = true, value_enum)]
    entry_policy: Option<EntryPolicyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EntryPolicyArg {
    /// Screens navigated to but never navigated from.
    Targets,
    /// Screens navigated from but never navigated to.
    Sources,
}

impl From<EntryPolicyArg> for EntryPointPolicy {
    fn from(arg: EntryPolicyArg) -> Self {
        match arg {
            EntryPolicyArg::Targets => Self::TargetsNeverSources,
            EntryPolicyArg::Sources => Self::SourcesNeverTargets,
        }
    }
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }

    /// Layer command-line overrides onto the loaded config.
    fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(depth) = self.max_depth {
            config.max_flow_depth = depth;
        }
        if let Some(min) = self.min_length {
            config.min_path_length = min;
        }
        if let Some(policy) = self.entry_policy {
            config.entry_point_policy = policy.into();
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyze interaction flows",
        long_about = "Run the full analysis over a list of prototype connections: paths, \
                      loops, navigation metrics, interaction tallies, validation and confidence.",
        after_help = "EXAMPLES:\n    # Analyze an exported connection list\n    flowlens analyze connections.json\n\n    # Read from stdin\n    cat connections.json | flowlens analyze -\n\n    # Emit the machine-readable result record\n    flowlens analyze connections.json --format json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "List user paths",
        long_about = "Enumerate bounded, non-repeating navigation paths.",
        after_help = "EXAMPLES:\n    # Every path of at least two steps\n    flowlens paths connections.json\n\n    # Paths starting at one screen\n    flowlens paths connections.json --from home\n\n    # Shorter paths too\n    flowlens paths connections.json --min-length 1"
    )]
    Paths(cmd::paths::PathsArgs),

    #[command(
        about = "List navigation loops",
        long_about = "Detect cycles in the navigation graph.",
        after_help = "EXAMPLES:\n    # Report loops\n    flowlens cycles connections.json\n\n    # Emit machine-readable output\n    flowlens cycles connections.json --json"
    )]
    Cycles(cmd::cycles::CyclesArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FLOWLENS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "flowlens=debug,info"
        } else {
            "flowlens=info,warn"
        })
    });

    let format = env::var("FLOWLENS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Load the explicit or project config, apply overrides and validate.
fn resolve_config(cli: &Cli, project_root: &Path) -> anyhow::Result<AnalysisConfig> {
    let project = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_project_config(project_root)?,
    };
    let mut config = project.analysis;
    cli.apply_overrides(&mut config);
    config.validate()?;
    debug!(?config, "resolved analysis config");
    Ok(config)
}

fn config_error(err: &anyhow::Error) -> CliError {
    err.downcast_ref::<FlowError>().map_or_else(
        || CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
        CliError::from,
    )
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let output = cli.output_mode();

    let config = match resolve_config(&cli, &project_root) {
        Ok(config) => config,
        Err(err) => {
            render_error(output, &config_error(&err))?;
            return Err(err);
        }
    };

    match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, &config, output),
        Commands::Paths(args) => cmd::paths::run_paths(args, &config, output),
        Commands::Cycles(args) => cmd::cycles::run_cycles(args, &config, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_subcommands_parse() {
        let subcommands = [
            vec!["flowlens", "analyze", "flows.json"],
            vec!["flowlens", "analyze"],
            vec!["flowlens", "paths", "flows.json", "--from", "home"],
            vec!["flowlens", "cycles", "-"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse: {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from([
            "flowlens",
            "analyze",
            "flows.json",
            "--format",
            "json",
            "--max-depth",
            "4",
            "--entry-policy",
            "sources",
        ]);
        assert_eq!(cli.format, Some(OutputMode::Json));
        assert_eq!(cli.max_depth, Some(4));
        assert_eq!(cli.entry_policy, Some(EntryPolicyArg::Sources));
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "flowlens",
            "paths",
            "--max-depth",
            "3",
            "--min-length",
            "1",
            "--entry-policy",
            "sources",
        ]);
        let mut config = AnalysisConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.max_flow_depth, 3);
        assert_eq!(config.min_path_length, 1);
        assert_eq!(config.entry_point_policy, EntryPointPolicy::SourcesNeverTargets);
    }

    #[test]
    fn zero_depth_override_fails_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = Cli::parse_from(["flowlens", "analyze", "--max-depth", "0"]);
        let err = resolve_config(&cli, dir.path()).expect_err("must fail");
        let cli_err = config_error(&err);
        assert_eq!(cli_err.error_code.as_deref(), Some("E2002"));
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = Cli::parse_from(["flowlens", "analyze"]);
        let config = resolve_config(&cli, dir.path()).expect("config");
        assert_eq!(config, AnalysisConfig::default());
    }
}
