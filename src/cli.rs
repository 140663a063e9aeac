// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `mergewatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mergewatch",
    version,
    about = "Merge asset files into concatenated bundles and rebuild them on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the build file (TOML).
    ///
    /// Default: `Mergewatch.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Mergewatch.toml")]
    pub build_file: String,

    /// Run every task once and exit; no file watching.
    #[arg(long)]
    pub once: bool,

    /// Force production mode (minify every merged unit), regardless of the
    /// build file.
    #[arg(long)]
    pub production: bool,

    /// Force source-map emission, regardless of the build file.
    #[arg(long)]
    pub sourcemaps: bool,

    /// Construct and run only the named task.
    #[arg(long, value_name = "NAME")]
    pub task: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MERGEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the tasks, but don't merge anything.
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
