//! Replay command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use crickscore_types::ServiceConfig;

use crate::script::{Replay, Script};

/// Arguments for the replay command.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to the scoring script (JSON).
    pub script: PathBuf,

    /// Record rejected steps in the report instead of stopping at the first one.
    #[arg(long)]
    pub keep_going: bool,
}

/// Execute the replay command.
pub fn execute(args: &ReplayArgs, config: ServiceConfig) -> Result<()> {
    let raw = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&raw)
        .with_context(|| format!("parsing script {}", args.script.display()))?;

    let report = Replay::new(&script, config)?.run(&script.steps, args.keep_going)?;
    tracing::info!(
        steps = script.steps.len(),
        rejected = report.rejected.len(),
        "replay finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
