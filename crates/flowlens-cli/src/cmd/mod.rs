pub mod analyze;
pub mod cycles;
pub mod paths;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use flowlens_core::error::ErrorCode;
use flowlens_core::model::Connection;

use crate::input::{InputSource, parse_connections, read_source};
use crate::output::{CliError, OutputMode, render_error};

/// Input argument shared by every analysis command.
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// Connection records as JSON. Omit or pass `-` to read stdin.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,
}

/// Read and decode connection records, rendering user-facing failures.
pub fn load_connections(args: &InputArgs, output: OutputMode) -> anyhow::Result<Vec<Connection>> {
    let source = InputSource::from_arg(args.input.as_deref());

    if let InputSource::File(path) = source
        && !path.exists()
    {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::InputNotFound,
                format!("{} not found", path.display()),
            ),
        )?;
        anyhow::bail!("input not found: {}", path.display());
    }

    let raw = read_source(&source)?;
    match parse_connections(&raw) {
        Ok(connections) => Ok(connections),
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            Err(err).with_context(|| format!("Invalid input in {}", source.describe()))
        }
    }
}
