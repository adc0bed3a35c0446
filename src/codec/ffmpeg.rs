//! ffmpeg/ffprobe wrapper: normalization, duration probing, window extraction.
//!
//! All outputs land in scoped temporary files (`tempfile::TempPath`) so that
//! dropping the handle deletes the file, on success and failure paths alike.

use crate::codec::executor::{CommandExecutor, SystemCommandExecutor};
use crate::config::CodecConfig;
use crate::defaults;
use crate::error::{DictofonError, Result};
use std::path::Path;
use tempfile::TempPath;

/// Codec layer over external ffmpeg/ffprobe invocations.
pub struct FfmpegCodec<E: CommandExecutor> {
    executor: E,
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegCodec<SystemCommandExecutor> {
    /// Create a codec using the system ffmpeg/ffprobe binaries (production use).
    pub fn system(config: &CodecConfig) -> Self {
        Self::new(SystemCommandExecutor::new(), config)
    }
}

impl<E: CommandExecutor> FfmpegCodec<E> {
    /// Create a codec with a custom executor (testing/library use).
    pub fn new(executor: E, config: &CodecConfig) -> Self {
        Self {
            executor,
            ffmpeg: config.ffmpeg.clone(),
            ffprobe: config.ffprobe.clone(),
        }
    }

    /// Decode and resample any supported input into canonical PCM:
    /// 16kHz, mono, signed 16-bit WAV.
    ///
    /// The returned `TempPath` owns the file; dropping it deletes it.
    /// Idempotent for a given input, but not byte-for-byte deterministic.
    pub fn normalize(&self, input: &Path) -> Result<TempPath> {
        let output = wav_temp_path()?;
        let sample_rate = defaults::SAMPLE_RATE.to_string();
        self.executor.execute(
            &self.ffmpeg,
            &[
                "-y",
                "-i",
                path_str(input)?,
                "-ar",
                &sample_rate,
                "-ac",
                "1",
                "-sample_fmt",
                "s16",
                path_str(&output)?,
            ],
        )?;
        Ok(output)
    }

    /// Query the stream duration in whole seconds, rounded up.
    ///
    /// Fails with a probe error when ffprobe reports no duration or
    /// something that does not parse as a number.
    pub fn probe_duration(&self, input: &Path) -> Result<u64> {
        let stdout = self.executor.execute(
            &self.ffprobe,
            &[
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                path_str(input)?,
            ],
        )?;

        let raw = stdout.trim();
        let secs: f64 = raw.parse().map_err(|_| DictofonError::DurationProbe {
            message: format!("ffprobe returned non-numeric duration {:?}", raw),
        })?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(DictofonError::DurationProbe {
                message: format!("ffprobe returned invalid duration {:?}", raw),
            });
        }
        Ok(secs.ceil() as u64)
    }

    /// Extract the window `[start, start+length)` (seconds) into a fresh
    /// temporary WAV file.
    pub fn extract_window(&self, input: &Path, start_secs: u64, length_secs: u64) -> Result<TempPath> {
        let output = wav_temp_path()?;
        let start = start_secs.to_string();
        let length = length_secs.to_string();
        self.executor.execute(
            &self.ffmpeg,
            &[
                "-y",
                "-i",
                path_str(input)?,
                "-ss",
                &start,
                "-t",
                &length,
                path_str(&output)?,
            ],
        )?;
        Ok(output)
    }
}

/// Allocate an empty temporary .wav path for ffmpeg to write into.
fn wav_temp_path() -> Result<TempPath> {
    let file = tempfile::Builder::new()
        .prefix("dictofon-")
        .suffix(".wav")
        .tempfile()?;
    Ok(file.into_temp_path())
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| DictofonError::CodecFailed {
        message: format!("path is not valid UTF-8: {}", path.display()),
    })
}
