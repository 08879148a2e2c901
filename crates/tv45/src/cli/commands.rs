//! CLI command definitions.

use std::path::PathBuf;

use chrono::Weekday;
use clap::{Args, Subcommand};

use crate::schedule::ShowTime;

/// Assemble command arguments.
#[derive(Debug, Args)]
pub struct AssembleCommand {
    /// Write the assembled page here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// On-air command arguments.
#[derive(Debug, Args)]
pub struct OnAirCommand {
    /// Station time to resolve (HH:MM); defaults to now
    #[arg(long, value_name = "HH:MM")]
    pub at: Option<ShowTime>,

    /// Day of the week (e.g. "fri", "saturday"); defaults to today
    #[arg(long)]
    pub day: Option<Weekday>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Live command arguments.
#[derive(Debug, Args)]
pub struct LiveCommand {
    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long, value_name = "N")]
    pub seconds: Option<u64>,

    /// Print the final page to stdout on exit
    #[arg(long)]
    pub dump: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_air_command_debug() {
        let cmd = OnAirCommand {
            at: ShowTime::from_hm(13, 0),
            day: Some(Weekday::Tue),
            json: true,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Tue"));
        assert!(debug_str.contains("json"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Validate { file: None };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Validate"));
    }
}
