//! # crickscore-cli
//!
//! Command-line interface for Crickscore.
//!
//! ## Commands
//!
//! - `crickscore replay <script.json>` - Replay a scoring script and print
//!   the final match snapshots, standings and bracket as JSON
//!
//! ## Configuration
//!
//! - `--config <file>` - `ServiceConfig` JSON; missing fields take defaults
//! - `--json-logs` - emit logs as JSON lines on stderr
//! - `RUST_LOG` - log filter (default `warn`)

// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]

pub mod commands;
pub mod script;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crickscore_types::ServiceConfig;

/// Crickscore CLI - live cricket scoring operator tool.
#[derive(Debug, Parser)]
#[command(name = "crickscore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Service configuration file (JSON).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load the service configuration, or the defaults without `--config`.
    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let Some(path) = &self.config else {
            return Ok(ServiceConfig::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        ServiceConfig::from_json_str(&raw)
            .with_context(|| format!("loading config {}", path.display()))
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSON scoring script through a fresh scoring service.
    Replay(commands::replay::ReplayArgs),
}
