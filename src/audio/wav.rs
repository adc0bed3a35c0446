//! WAV reading and writing for pipeline segments.
//!
//! Normalization goes through ffmpeg, so files read here are expected to be
//! 16kHz mono s16 already. Stereo and off-rate files are still handled
//! (downmix + linear resample) so the reader also accepts WAVs that bypassed
//! normalization, e.g. in tests.

use crate::defaults::SAMPLE_RATE;
use crate::error::{DictofonError, Result};
use std::io::Cursor;
use std::path::Path;

/// Read a WAV file into 16kHz mono PCM samples.
pub fn read_samples(path: &Path) -> Result<Vec<i16>> {
    let mut reader = hound::WavReader::open(path).map_err(|e| DictofonError::CodecFailed {
        message: format!("Failed to open WAV file {}: {}", path.display(), e),
    })?;

    let spec = reader.spec();
    let raw: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| DictofonError::CodecFailed {
            message: format!("Failed to read WAV samples from {}: {}", path.display(), e),
        })?;

    let mono = downmix(raw, spec.channels);
    if spec.sample_rate == SAMPLE_RATE {
        Ok(mono)
    } else {
        Ok(resample(&mono, spec.sample_rate, SAMPLE_RATE))
    }
}

/// Encode PCM samples as an in-memory 16-bit mono WAV file.
///
/// Used by backends that take audio bytes rather than a sample slice.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| DictofonError::Other(format!(
            "Failed to create WAV writer: {}",
            e
        )))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| DictofonError::Other(format!("Failed to encode WAV sample: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| DictofonError::Other(format!("Failed to finalize WAV data: {}", e)))?;

    Ok(cursor.into_inner())
}

fn downmix(samples: Vec<i16>, channels: u16) -> Vec<i16> {
    match channels {
        0 | 1 => samples,
        n => samples
            .chunks_exact(n as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / n as i32) as i16
            })
            .collect(),
    }
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
