//! Subcommand implementations.

pub mod branch;
pub mod config;
pub mod conflicts;
pub mod preflight;
pub mod repo;

use anyhow::{Context, Result};
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
