// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `autotest`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "autotest",
    version,
    about = "Watch Go source trees and re-run tests for changed packages and their dependents.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Autotest.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Source root to scan and watch. May be repeated.
    ///
    /// Overrides `[config].roots` and `$GOPATH`.
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Package (import path or directory) to build once at startup.
    /// May be repeated.
    #[arg(long = "package", value_name = "PKG")]
    pub packages: Vec<String>,

    /// Build the `--package` targets, wait until idle and exit. No watching.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AUTOTEST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Scan, print the dependents map and import cycles, but don't build.
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
