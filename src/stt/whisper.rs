//! Whisper-based transcription backend.
//!
//! Local neural-model inference via whisper-rs. Requires the `whisper`
//! feature (and cmake at build time):
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::defaults;
use crate::error::{DictofonError, Result};
use crate::stt::transcriber::Transcriber;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for the Whisper backend.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Model name, e.g. "base" or "large-v3"
    pub model: String,
    /// Directory holding ggml model files
    pub model_dir: PathBuf,
    /// Language code (e.g., "ru", "en") or "auto"
    pub language: String,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            model_dir: PathBuf::from("models"),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl WhisperConfig {
    /// Resolve the ggml model file this configuration points at.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(format!("ggml-{}.bin", self.model))
    }
}

/// Whisper-based transcriber implementation.
///
/// The model is loaded once at construction and reused for every segment.
/// The WhisperContext is wrapped in a Mutex: the loaded model is a single
/// shared, non-reentrant resource.
pub struct WhisperTranscriber {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    backend_name: String,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("config", &self.config)
            .field("backend_name", &self.backend_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

impl WhisperTranscriber {
    /// Load the configured model and create a transcriber.
    ///
    /// # Errors
    /// Returns `DictofonError::ModelNotFound` if the model file doesn't exist
    /// Returns `DictofonError::Transcription` if model loading fails
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        let model_path = config.model_path();
        if !model_path.exists() {
            return Err(DictofonError::ModelNotFound {
                path: model_path.to_string_lossy().to_string(),
            });
        }

        let backend_name = format!("whisper-{}", config.model);

        let context = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| DictofonError::Transcription {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| DictofonError::Transcription {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            backend_name,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// Whisper expects audio in f32 format normalized to the range
    /// [-1.0, 1.0]. Input is 16-bit PCM.
    fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &[i16]) -> Result<String> {
        let audio_f32 = Self::convert_audio(audio);

        let context = self
            .context
            .lock()
            .map_err(|e| DictofonError::Transcription {
                message: format!("Failed to acquire context lock: {}", e),
            })?;

        let mut state = context
            .create_state()
            .map_err(|e| DictofonError::Transcription {
                message: format!("Failed to create Whisper state: {}", e),
            })?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        if self.config.language == defaults::AUTO_LANGUAGE {
            params.set_language(None);
        } else {
            params.set_language(Some(&self.config.language));
        }

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        // Keep whisper.cpp quiet; the pipeline owns stderr
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio_f32)
            .map_err(|e| DictofonError::Transcription {
                message: format!("Whisper inference failed: {}", e),
            })?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| DictofonError::Transcription {
                message: format!("Failed to read Whisper segments: {}", e),
            })?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment_text =
                state
                    .full_get_segment_text(i)
                    .map_err(|e| DictofonError::Transcription {
                        message: format!("Failed to read Whisper segment text: {}", e),
                    })?;
            if !text.is_empty() && !segment_text.starts_with(' ') {
                text.push(' ');
            }
            text.push_str(&segment_text);
        }

        Ok(text.trim().to_string())
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

/// Check whether the configured model file is present on disk.
pub fn model_installed(model: &str, model_dir: &Path) -> bool {
    model_dir.join(format!("ggml-{}.bin", model)).exists()
}
