//! Command-line interface for the `tv45` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{AssembleCommand, ConfigCommand, LiveCommand, OnAirCommand};

/// tv45 - Headless engine for the TV45 Nicaragua page
///
/// Assembles the station page from its fragments and data files, resolves
/// what is on air, and runs the page's live loop against events on stdin.
#[derive(Debug, Parser)]
#[command(name = "tv45")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Site root: a directory or an http(s) base URL
    #[arg(short, long, global = true, value_name = "DIR|URL")]
    pub source: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load every fragment and print the finished page
    Assemble(AssembleCommand),

    /// Show the program on air and the one after it
    OnAir(OnAirCommand),

    /// Boot the page and keep it live, reading events from stdin
    Live(LiveCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
