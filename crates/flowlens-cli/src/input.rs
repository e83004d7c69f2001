//! Reading connection records from a file or stdin.
//!
//! Accepted shapes: a bare JSON array of connections, or an object with a
//! `connections` array (the shape the document walker exports).

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use flowlens_core::error::FlowError;
use flowlens_core::model::Connection;
use serde_json::Value;
use tracing::debug;

/// Where connection records are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource<'a> {
    Stdin,
    File(&'a Path),
}

impl<'a> InputSource<'a> {
    /// `None` or `-` reads stdin; anything else is a file path.
    pub fn from_arg(arg: Option<&'a Path>) -> Self {
        match arg {
            Some(path) if path.as_os_str() != "-" => Self::File(path),
            _ => Self::Stdin,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Decode connection records from JSON text.
///
/// # Errors
///
/// Returns [`FlowError::InputParse`] when the text is not valid JSON or does
/// not match either accepted shape.
pub fn parse_connections(raw: &str) -> Result<Vec<Connection>, FlowError> {
    let mut value: Value = serde_json::from_str(raw)?;
    if let Some(inner) = value.get_mut("connections").map(Value::take) {
        value = inner;
    }
    Ok(serde_json::from_value(value)?)
}

/// Read raw input text from `source`.
///
/// # Errors
///
/// Returns an error if the file or stdin cannot be read.
pub fn read_source(source: &InputSource<'_>) -> anyhow::Result<String> {
    let raw = match source {
        InputSource::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read connections from stdin")?;
            buf
        }
        InputSource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
    };
    debug!(source = %source.describe(), bytes = raw.len(), "read interaction input");
    Ok(raw)
}
