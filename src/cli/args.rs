//! CLI argument definitions using clap
//!
//! Every command reads one JSON request from stdin and writes one JSON
//! response to stdout:
//! - covercanon classify --config <path>
//! - covercanon recall --config <path>
//! - covercanon type-evidence --config <path>
//! - covercanon decide --config <path>
//! - covercanon compare --config <path>
//! - covercanon check-config --config <path> (no stdin)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Evidence-backed coverage decisions and comparison states
#[derive(Parser, Debug)]
#[command(name = "covercanon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify extracted proposal rows as coverage or metadata
    Classify {
        /// Path to configuration file
        #[arg(long, default_value = "./covercanon.json")]
        config: PathBuf,
    },

    /// Recall canonical candidates for a coverage name
    Recall {
        /// Path to configuration file
        #[arg(long, default_value = "./covercanon.json")]
        config: PathBuf,
    },

    /// Type policy evidence spans
    TypeEvidence {
        /// Path to configuration file
        #[arg(long, default_value = "./covercanon.json")]
        config: PathBuf,
    },

    /// Decide canonical codes for one insurer
    Decide {
        /// Path to configuration file
        #[arg(long, default_value = "./covercanon.json")]
        config: PathBuf,
    },

    /// Resolve a comparison across insurers
    Compare {
        /// Path to configuration file
        #[arg(long, default_value = "./covercanon.json")]
        config: PathBuf,
    },

    /// Validate configuration, catalog, and alias table
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./covercanon.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
