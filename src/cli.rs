//! CLI arguments for herakles-user-cpu.
//!
//! This module defines the command-line interface structure using the clap
//! library. The only required input is the observation window; the flags
//! exist for diagnostics and testing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Output format for the final ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-user-cpu",
    about = "Per-user CPU time accounting over a fixed observation window",
    long_about = "Per-user CPU time accounting over a fixed observation window.\n\n\
                  Samples the process table once per second for the given number of \
                  seconds, attributes CPU time deltas to the owning user, and prints \
                  a ranking of users by CPU milliseconds consumed during the window.",
    author = "Michael Moll <usercpu@herakles.io> - Herakles",
    version = "0.1.0",
    after_help = "Project: https://github.com/herakles-io/herakles-user-cpu — Support: usercpu@herakles.io"
)]
pub struct Args {
    /// Observation window in seconds (positive integer)
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub duration_secs: u64,

    /// Log level (logs go to stderr, stdout carries only the ranking)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Process table root, overridable for containers and tests
    #[arg(long, default_value = "/proc")]
    pub proc_root: PathBuf,

    /// Output format for the final ranking
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}
