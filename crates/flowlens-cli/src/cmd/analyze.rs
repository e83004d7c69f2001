//! `flowlens analyze`: full flow analysis of a connection list.

use std::io::{self, Write};

use chrono::SecondsFormat;
use clap::Args;
use flowlens_core::config::AnalysisConfig;
use flowlens_graph::FlowAnalyzer;
use flowlens_graph::metrics::navigation::NodeLinks;
use flowlens_graph::result::AnalysisResult;
use flowlens_graph::score::validate::Finding;
use tracing::debug;

use crate::cmd::{InputArgs, load_connections};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `flowlens analyze`.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Execute `flowlens analyze`.
pub fn run_analyze(
    args: &AnalyzeArgs,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let connections = load_connections(&args.input, output)?;
    debug!(connections = connections.len(), "running flow analysis");

    let result = FlowAnalyzer::new(config.clone()).analyze(&connections);
    render_mode(output, &result, render_analysis_text, render_analysis_pretty)
}

fn join_or_dash(ids: &[String]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(",")
    }
}

fn link_ids(links: &[NodeLinks]) -> Vec<String> {
    links
        .iter()
        .map(|link| format!("{}({})", link.node_id, link.degree))
        .collect()
}

fn render_analysis_text(result: &AnalysisResult, w: &mut dyn Write) -> io::Result<()> {
    let meta = &result.metadata;
    let flows = &result.flows;
    let stats = &flows.statistics;

    writeln!(
        w,
        "connections {}  screens {}  confidence {:.2}  score {:.2}",
        meta.total_connections, meta.unique_screens, meta.confidence, result.validation.score
    )?;
    writeln!(w, "entry {}", join_or_dash(&flows.entry_points))?;
    writeln!(w, "exit {}", join_or_dash(&flows.exit_points))?;
    writeln!(w, "dead_ends {}", join_or_dash(&flows.dead_ends))?;
    writeln!(
        w,
        "paths {}  avg {:.2}  max {}  branching {:.2}  truncated {}",
        stats.total_paths,
        stats.average_path_length,
        stats.max_path_length,
        stats.branching_factor,
        stats.truncated
    )?;
    for found in &flows.loops {
        writeln!(w, "loop {} {}", found.nodes.join("->"), found.length)?;
    }
    if flows.loops_truncated {
        writeln!(w, "loops truncated")?;
    }
    writeln!(
        w,
        "breadth {}  depth {}  hubs {}  connectors {}  truncated {}",
        result.navigation.breadth,
        result.navigation.depth,
        join_or_dash(&link_ids(&result.navigation.hubs)),
        join_or_dash(&link_ids(&result.navigation.connectors)),
        result.navigation.truncated,
    )?;
    writeln!(
        w,
        "patterns linear={} branching={} circular={} hub_spoke={}",
        result.patterns.linear,
        result.patterns.branching,
        result.patterns.circular,
        result.patterns.hub_spoke
    )?;
    for issue in &result.validation.issues {
        writeln!(w, "issue {}", finding_line(issue))?;
    }
    for warning in &result.validation.warnings {
        writeln!(w, "warning {}", finding_line(warning))?;
    }
    if let Some(error) = &result.error {
        writeln!(w, "error {error}")?;
    }
    Ok(())
}

fn finding_line(finding: &Finding) -> String {
    format!(
        "{} {}: {}",
        finding.kind.as_str(),
        finding.severity.as_str(),
        finding.message
    )
}

fn render_analysis_pretty(result: &AnalysisResult, w: &mut dyn Write) -> io::Result<()> {
    let meta = &result.metadata;
    let flows = &result.flows;

    pretty_section(w, "Flow analysis")?;
    pretty_kv(w, "Connections", meta.total_connections.to_string())?;
    pretty_kv(w, "Screens", meta.unique_screens.to_string())?;
    pretty_kv(w, "Confidence", format!("{:.2}", meta.confidence))?;
    pretty_kv(w, "Score", format!("{:.2}", result.validation.score))?;
    pretty_kv(
        w,
        "Analyzed",
        meta.analysis_timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;
    pretty_kv(w, "Took", format!("{:.1} ms", meta.processing_time))?;

    writeln!(w)?;
    pretty_section(w, "Structure")?;
    pretty_kv(w, "Entry points", join_or_dash(&flows.entry_points))?;
    pretty_kv(w, "Exit points", join_or_dash(&flows.exit_points))?;
    pretty_kv(w, "Dead ends", join_or_dash(&flows.dead_ends))?;
    pretty_kv(w, "Breadth", result.navigation.breadth.to_string())?;
    let depth = if result.navigation.truncated {
        format!("{} (truncated)", result.navigation.depth)
    } else {
        result.navigation.depth.to_string()
    };
    pretty_kv(w, "Depth", depth)?;
    pretty_kv(w, "Hubs", join_or_dash(&link_ids(&result.navigation.hubs)))?;
    pretty_kv(
        w,
        "Connectors",
        join_or_dash(&link_ids(&result.navigation.connectors)),
    )?;

    writeln!(w)?;
    pretty_section(w, "Paths")?;
    let stats = &flows.statistics;
    let total = if stats.truncated {
        format!("{} (truncated)", stats.total_paths)
    } else {
        stats.total_paths.to_string()
    };
    pretty_kv(w, "Total", total)?;
    pretty_kv(w, "Average", format!("{:.2} steps", stats.average_path_length))?;
    pretty_kv(w, "Longest", format!("{} steps", stats.max_path_length))?;
    pretty_kv(w, "Branching", format!("{:.2}", stats.branching_factor))?;
    if flows.loops.is_empty() {
        pretty_kv(w, "Loops", "none")?;
    } else {
        for found in &flows.loops {
            pretty_kv(
                w,
                "Loop",
                format!("{} ↺ ({:?})", found.nodes.join(" → "), found.kind),
            )?;
        }
    }
    if flows.loops_truncated {
        pretty_kv(w, "Loop search", "stopped early (raise max_work_units)")?;
    }

    if !result.validation.issues.is_empty() || !result.validation.warnings.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Findings")?;
        for issue in &result.validation.issues {
            writeln!(w, "  ✗ {}", finding_line(issue))?;
        }
        for warning in &result.validation.warnings {
            writeln!(w, "  ! {}", finding_line(warning))?;
        }
    }

    if let Some(error) = &result.error {
        writeln!(w)?;
        writeln!(w, "Analysis degraded: {error}")?;
    }
    Ok(())
}
