//! `flowlens cycles`: report navigation loops only.

use std::io::{self, Write};

use clap::Args;
use flowlens_core::config::AnalysisConfig;
use flowlens_core::model::Connection;
use flowlens_graph::FlowGraph;
use flowlens_graph::budget::WorkBudget;
use flowlens_graph::graph::cycles::{LoopDetection, detect_loops};

use crate::cmd::{InputArgs, load_connections};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct CyclesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Execute `flowlens cycles`.
pub fn run_cycles(
    args: &CyclesArgs,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let connections = load_connections(&args.input, output)?;
    let found = find_loops(&connections, config);
    render_mode(output, &found, render_cycles_text, render_cycles_pretty)
}

fn find_loops(connections: &[Connection], config: &AnalysisConfig) -> LoopDetection {
    let graph = FlowGraph::from_connections(connections);
    let mut budget = WorkBudget::new(config.max_work_units);
    detect_loops(
        &graph,
        config.loop_detection_limit,
        config.cycle_key_policy,
        &mut budget,
    )
}

fn render_cycles_text(found: &LoopDetection, w: &mut dyn Write) -> io::Result<()> {
    for entry in &found.loops {
        writeln!(w, "{} {}", entry.length, entry.nodes.join(" "))?;
    }
    if found.truncated {
        writeln!(w, "truncated")?;
    }
    Ok(())
}

fn render_cycles_pretty(found: &LoopDetection, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Navigation loops")?;
    if found.loops.is_empty() {
        writeln!(w, "No navigation loops found.")?;
    } else {
        for entry in &found.loops {
            let mut ring = entry.nodes.join(" → ");
            if let Some(first) = entry.nodes.first() {
                ring.push_str(" → ");
                ring.push_str(first);
            }
            pretty_kv(w, &format!("{:?}", entry.kind), ring)?;
        }
    }
    if found.truncated {
        writeln!(w)?;
        writeln!(w, "Search stopped early; raise max_work_units to see more.")?;
    }
    Ok(())
}
