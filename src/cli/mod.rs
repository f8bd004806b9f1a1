//! CLI Module
//!
//! Command-line interface for the frqkit toolkit.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// frqkit - UTAU frequency-track toolkit
#[derive(Parser, Debug)]
#[command(name = "frqkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show frq header and voicing statistics
    Info {
        /// Path to the frq file
        path: PathBuf,
    },

    /// Run the auto-correction pipeline on an frq file
    Correct {
        /// Path to the frq file
        path: PathBuf,

        /// Output path (defaults to rewriting in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate missing frq files for a voicebank directory
    Gen {
        /// Voicebank directory to scan for .wav files
        dir: PathBuf,

        /// Engine command to spawn (overrides the config file)
        #[arg(long)]
        engine: Option<String>,

        /// Concurrent analysis workers (overrides the config file)
        #[arg(long)]
        pool_size: Option<usize>,

        /// Waveform-sample stride between analysis points
        #[arg(long)]
        samples_per_point: Option<u32>,

        /// Regenerate even when an frq file already exists
        #[arg(long)]
        force: bool,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
