//! `aesgcm` — command-line entry point.
//!
//! Startup sequence:
//! 1. Parse the subcommand from the first argument.
//! 2. Load and validate [`Config`] from `AESGCM_*` environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the subcommand over stdin / stdout.

mod commands;
mod config;
mod telemetry;

use std::io;

use anyhow::{Context, Result};

use commands::Command;
use config::Config;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Subcommand
    // -----------------------------------------------------------------------
    let command: Command = std::env::args()
        .nth(1)
        .unwrap_or_default()
        .parse()
        .context("usage: aesgcm <keygen|encrypt|decrypt>")?;

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: aesgcm configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    commands::run(command, &cfg, io::stdin().lock(), io::stdout().lock())
}
