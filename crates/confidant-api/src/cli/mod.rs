//! CLI command definitions for the `confidant` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod history;
pub mod model;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Local AI counselor served as a web chat.
#[derive(Parser)]
#[command(name = "confidant", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file. Missing file means built-in defaults.
    #[arg(long, global = true, default_value = "confidant.toml")]
    pub config: PathBuf,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the inference engine and the web chat server.
    Serve {
        /// Bind address (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides config).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the most recent conversation turns, oldest first.
    History {
        /// Number of turns to show (defaults to the configured history limit).
        #[arg(long, short = 'n')]
        limit: Option<u32>,

        /// Output machine-readable JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Download the quantized model file from Hugging Face.
    #[command(name = "download-model")]
    DownloadModel {
        /// Repository id (overrides config).
        #[arg(long)]
        repo: Option<String>,

        /// File name inside the repository (overrides config).
        #[arg(long)]
        file: Option<String>,

        /// Download even if the model file already exists.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
