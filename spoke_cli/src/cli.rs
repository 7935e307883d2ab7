//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "spokelink", version, about = "Gauge, contact and scale sensor link")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/spoke_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample every configured sensor and stream events to stdout
    Run {
        /// Also write every event line to this file or device (e.g. a serial port)
        #[arg(long, value_name = "PATH")]
        mirror: Option<PathBuf>,
        /// Stop after this many milliseconds instead of waiting for Ctrl-C
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
    },
    /// Interpret one raw 24-bit gauge packet given in hex (e.g. 0x900064)
    Decode {
        #[arg(value_name = "HEX")]
        packet: String,
    },
    /// Validate the config and take one reading from each sensor
    SelfCheck,
}

impl Commands {
    /// Commands that work without a config file.
    pub fn needs_config(&self) -> bool {
        !matches!(self, Commands::Decode { .. })
    }
}
