// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::ConsumptionMode;

/// Command-line arguments for `inwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "inwatch",
    version,
    about = "Watch paths with inotify and print the events they produce.",
    long_about = None
)]
pub struct CliArgs {
    /// Paths to watch, in addition to any `[[watch]]` entries from `--config`.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Events to watch for on PATHs, comma separated
    /// (e.g. `create,delete,close_write`).
    #[arg(long, value_name = "LIST", default_value = "create,delete,modify,attrib,move")]
    pub events: String,

    /// Path to a config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Milliseconds one poll waits for events. Overrides the config file.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u32>,

    /// Dispatch events to handlers, or drain and print them directly.
    /// Overrides the config file.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ConsumptionMode>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `INWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the watch list without opening a channel.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
