//! Vosk-based transcription backend.
//!
//! Offline acoustic-model recognizer. The PCM buffer is fed as a stream of
//! waveform chunks; the recognizer's final result carries the recognized
//! text. Requires the `vosk` feature and libvosk at runtime.

use crate::error::{DictofonError, Result};
use crate::stt::transcriber::Transcriber;
use std::path::PathBuf;
use std::sync::Mutex;
use vosk::{Model, Recognizer};

/// Samples per waveform chunk fed to the recognizer (0.5s at 16kHz).
const WAVEFORM_CHUNK: usize = 8000;

/// Configuration for the Vosk backend.
#[derive(Debug, Clone)]
pub struct VoskConfig {
    /// Directory containing the unpacked Vosk model
    pub model_dir: PathBuf,
    /// Sample rate of the audio fed to the recognizer
    pub sample_rate: u32,
}

/// Vosk-based transcriber implementation.
///
/// The acoustic model is loaded once at construction; a fresh recognizer is
/// created per segment. The model is guarded by a Mutex — it is a single
/// shared, non-reentrant resource.
pub struct VoskTranscriber {
    model: Mutex<Model>,
    sample_rate: u32,
    backend_name: String,
}

impl VoskTranscriber {
    /// Load the model directory and create a transcriber.
    ///
    /// # Errors
    /// Returns `DictofonError::ModelNotFound` if the model directory doesn't
    /// exist or libvosk rejects it.
    pub fn new(config: VoskConfig) -> Result<Self> {
        if !config.model_dir.is_dir() {
            return Err(DictofonError::ModelNotFound {
                path: config.model_dir.to_string_lossy().to_string(),
            });
        }

        let model_str =
            config
                .model_dir
                .to_str()
                .ok_or_else(|| DictofonError::Transcription {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?;

        let model = Model::new(model_str).ok_or_else(|| DictofonError::ModelNotFound {
            path: config.model_dir.to_string_lossy().to_string(),
        })?;

        let backend_name = config
            .model_dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| format!("vosk-{}", n))
            .unwrap_or_else(|| "vosk".to_string());

        Ok(Self {
            model: Mutex::new(model),
            sample_rate: config.sample_rate,
            backend_name,
        })
    }
}

impl Transcriber for VoskTranscriber {
    fn transcribe(&self, audio: &[i16]) -> Result<String> {
        let model = self.model.lock().map_err(|e| DictofonError::Transcription {
            message: format!("Failed to acquire model lock: {}", e),
        })?;

        let mut recognizer = Recognizer::new(&model, self.sample_rate as f32).ok_or_else(|| {
            DictofonError::Transcription {
                message: "Failed to create Vosk recognizer".to_string(),
            }
        })?;

        for chunk in audio.chunks(WAVEFORM_CHUNK) {
            recognizer
                .accept_waveform(chunk)
                .map_err(|e| DictofonError::Transcription {
                    message: format!("Vosk rejected waveform: {}", e),
                })?;
        }

        let result = recognizer.final_result();
        let text = result
            .single()
            .map(|r| r.text.trim().to_string())
            .unwrap_or_default();

        // An empty final result is the recognizer's explicit verdict that
        // there was nothing to recognize
        if text.is_empty() {
            return Err(DictofonError::NoSpeechDetected);
        }

        Ok(text)
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}
