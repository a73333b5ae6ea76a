//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dualsync - keep a secondary media timeline locked to a primary one
#[derive(Parser, Debug)]
#[command(
    name = "dualsync",
    author,
    version,
    about = "Dual-timeline playback synchronization",
    long_about = "Drives two simulated media timelines from a session file and keeps the\n\
                  secondary locked to the primary through an affine time mapping,\n\
                  continuous drift correction and re-anchoring on seeks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DUALSYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "DUALSYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scripted sync session
    Run(RunArgs),

    /// Validate a session file without running it
    Validate(ValidateArgs),

    /// Display session information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to session file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "session.toml",
        env = "DUALSYNC_CONFIG"
    )]
    pub config: PathBuf,

    /// Pace virtual ticks against wall-clock time instead of running flat out
    #[arg(long, env = "DUALSYNC_REALTIME")]
    pub realtime: bool,

    /// Wall-clock speed multiplier for --realtime
    #[arg(long, default_value = "1.0", env = "DUALSYNC_SPEED")]
    pub speed: f64,

    /// Override simulation.run_for_s from the session file (seconds)
    #[arg(long, env = "DUALSYNC_RUN_FOR")]
    pub run_for: Option<f64>,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "DUALSYNC_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print the session report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to session file to validate
    #[arg(short, long, default_value = "session.toml", env = "DUALSYNC_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to session file
    #[arg(short, long, default_value = "session.toml", env = "DUALSYNC_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List the scenario steps
    #[arg(long)]
    pub scenario: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
