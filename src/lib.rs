//! dictofon - Transcription of long audio recordings
//!
//! Offline-first audio-to-text. Files too long for a single inference pass
//! are split into bounded segments (fixed time windows or silence gaps),
//! each segment is transcribed independently, and the results are
//! concatenated into one transcript.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod codec;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod segment;
pub mod stt;

// Core seams (normalize → segment → transcribe → aggregate)
pub use codec::{CommandExecutor, FfmpegCodec, SystemCommandExecutor};
pub use pipeline::sink::{CollectorSink, FileSink, StdoutSink, TranscriptSink};
pub use stt::{RetryPolicy, RetryingTranscriber, Transcriber, create_transcriber};

// Pipeline
pub use pipeline::progress::{NullObserver, ProgressObserver, RunState, StderrMeter};
pub use pipeline::{PipelineRunner, RunReport, aggregate};

// Error handling
pub use error::{DictofonError, Result};

// Config
pub use config::{Backend, Config, SplitStrategy};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
