//! `flowlens paths`: enumerate bounded user paths without the full report.

use std::io::{self, Write};

use clap::Args;
use flowlens_core::config::AnalysisConfig;
use flowlens_graph::FlowGraph;
use flowlens_graph::budget::WorkBudget;
use flowlens_graph::graph::paths::{FlowPath, PathLimits, enumerate_paths, path_starts};
use flowlens_graph::graph::stats::PathStatistics;
use serde::Serialize;

use crate::cmd::{InputArgs, load_connections};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct PathsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only enumerate paths starting at this screen.
    #[arg(long, value_name = "NODE")]
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PathsOutput {
    pub paths: Vec<FlowPath>,
    pub statistics: PathStatistics,
}

/// Execute `flowlens paths`.
pub fn run_paths(args: &PathsArgs, config: &AnalysisConfig, output: OutputMode) -> anyhow::Result<()> {
    let connections = load_connections(&args.input, output)?;
    let report = collect_paths(&connections, args.from.as_deref(), config);
    render_mode(output, &report, render_paths_text, render_paths_pretty)
}

fn collect_paths(
    connections: &[flowlens_core::model::Connection],
    from: Option<&str>,
    config: &AnalysisConfig,
) -> PathsOutput {
    let graph = FlowGraph::from_connections(connections);
    let starts = from.map_or_else(|| path_starts(&graph), |node| vec![node]);
    let limits = PathLimits {
        max_depth: config.max_flow_depth,
        min_length: config.min_path_length,
        max_paths: config.max_paths,
    };
    let mut budget = WorkBudget::new(config.max_work_units);
    let found = enumerate_paths(&graph, &starts, limits, &mut budget);
    let statistics = PathStatistics::from_paths(&found.paths, found.truncated);
    PathsOutput {
        paths: found.paths,
        statistics,
    }
}

fn render_paths_text(report: &PathsOutput, w: &mut dyn Write) -> io::Result<()> {
    for path in &report.paths {
        writeln!(w, "{}", path.nodes().join(" "))?;
    }
    let stats = &report.statistics;
    writeln!(
        w,
        "total {}  avg {:.2}  max {}  truncated {}",
        stats.total_paths, stats.average_path_length, stats.max_path_length, stats.truncated
    )
}

fn render_paths_pretty(report: &PathsOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Paths")?;
    if report.paths.is_empty() {
        writeln!(w, "No paths found.")?;
    }
    for path in &report.paths {
        writeln!(w, "  {}", path.nodes().join(" → "))?;
    }
    writeln!(w)?;
    let stats = &report.statistics;
    pretty_kv(w, "Total", stats.total_paths.to_string())?;
    pretty_kv(w, "Average", format!("{:.2} steps", stats.average_path_length))?;
    pretty_kv(w, "Longest", format!("{} steps", stats.max_path_length))?;
    if stats.truncated {
        pretty_kv(w, "Truncated", "yes (raise max_paths or max_work_units)")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowlens_core::model::Connection;

    fn chain() -> Vec<Connection> {
        vec![
            Connection::click("c1", "A", "B"),
            Connection::click("c2", "B", "C"),
        ]
    }

    #[test]
    fn collects_paths_from_every_source() {
        let report = collect_paths(&chain(), None, &AnalysisConfig::default());
        assert_eq!(report.statistics.total_paths, report.paths.len());
        assert!(report.paths.iter().any(|p| p.nodes() == ["A", "B", "C"]));
        assert!(!report.statistics.truncated);
    }

    #[test]
    fn from_restricts_start() {
        let report = collect_paths(&chain(), Some("B"), &AnalysisConfig::default());
        assert!(report.paths.iter().all(|p| p.start == "B"));
    }

    #[test]
    fn unknown_start_yields_nothing() {
        let report = collect_paths(&chain(), Some("Z"), &AnalysisConfig::default());
        assert!(report.paths.is_empty());
        assert_eq!(report.statistics.total_paths, 0);
    }

    #[test]
    fn text_lists_one_path_per_line() {
        let report = collect_paths(&chain(), Some("A"), &AnalysisConfig::default());
        let mut out = Vec::new();
        render_paths_text(&report, &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.starts_with("A B C\n"));
        assert!(rendered.contains("total 1"));
    }
}
