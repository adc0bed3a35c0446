//! Command-line interface for dictofon
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Transcription of long audio recordings
#[derive(Parser, Debug)]
#[command(
    name = "dictofon",
    version,
    about = "Offline-first transcription of long audio recordings"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: run phases + segment summary)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a chunk length string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`300`, `5m`), and compound (`1h30m`).
fn parse_chunk_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe an audio file to text
    Transcribe {
        /// Audio file to transcribe (mp3, wav, m4a, ogg, flac)
        input: PathBuf,

        /// Write the transcript to a file instead of stdout
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Transcription backend override (whisper, vosk, remote)
        #[arg(long, value_name = "BACKEND")]
        backend: Option<String>,

        /// Model override (e.g., base, small, large-v3)
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Language code for transcription (e.g., ru, en, auto)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Splitting strategy override (auto, fixed, silence)
        #[arg(long, value_name = "STRATEGY")]
        strategy: Option<String>,

        /// Window length for fixed splitting. Examples: 300, 5m, 1h30m
        #[arg(long, short = 'c', value_name = "DURATION", value_parser = parse_chunk_secs)]
        chunk_length: Option<u64>,
    },

    /// Check external tools, compiled backends and model presence
    Check,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
