//! CLI Module
//!
//! Command-line front end: decode a WAV file, run one operation, and write
//! the result next to the input.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Audiomark - PCM watermarking and band activity analysis
#[derive(Parser, Debug)]
#[command(name = "audiomark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file (pattern and segmentation settings)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepend the watermark to a WAV file
    #[command(name = "embed")]
    Embed {
        /// Input WAV file
        input: PathBuf,

        /// Output path (default: <input>--WM.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify and remove the watermark from a WAV file
    #[command(name = "strip")]
    Strip {
        /// Input WAV file
        input: PathBuf,

        /// Output path (default: <input>--NWM.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report whether a WAV file carries the watermark
    #[command(name = "check")]
    Check {
        /// Input WAV file
        input: PathBuf,
    },

    /// Write per-band activity metadata as JSON
    #[command(name = "segment")]
    Segment {
        /// Input WAV file
        input: PathBuf,

        /// Output JSON path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the 2000 Hz mid/treble boundary instead of 4000 Hz
        #[arg(long)]
        legacy_bands: bool,
    },

    /// Print the container header of a WAV file
    #[command(name = "info")]
    Info {
        /// Input WAV file
        input: PathBuf,
    },

    /// Print the effective configuration as JSON
    #[command(name = "print-config")]
    PrintConfig,
}
