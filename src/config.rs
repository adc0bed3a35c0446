use crate::defaults;
use crate::error::{DictofonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stt: SttConfig,
    pub codec: CodecConfig,
    pub segmentation: SegmentationConfig,
    pub retry: RetryConfig,
    pub remote: RemoteApiConfig,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub backend: Backend,
    pub language: String,
    pub model: String,
    pub model_dir: PathBuf,
}

/// External codec tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CodecConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

/// Segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmentationConfig {
    pub strategy: SplitStrategy,
    pub chunk_length_secs: u64,
    pub large_file_threshold_mb: u64,
    pub min_silence_ms: u32,
    pub silence_threshold_db: f32,
    pub keep_silence_ms: u32,
}

/// Retry policy for the remote backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

/// Remote speech API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteApiConfig {
    pub endpoint: String,
    pub api_key_env: String,
}

/// Transcription backend selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Whisper,
    Vosk,
    Remote,
}

impl FromStr for Backend {
    type Err = DictofonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "whisper" => Ok(Backend::Whisper),
            "vosk" => Ok(Backend::Vosk),
            "remote" => Ok(Backend::Remote),
            other => Err(DictofonError::ConfigInvalidValue {
                key: "stt.backend".to_string(),
                message: format!("unknown backend {:?} (expected whisper, vosk or remote)", other),
            }),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Whisper => write!(f, "whisper"),
            Backend::Vosk => write!(f, "vosk"),
            Backend::Remote => write!(f, "remote"),
        }
    }
}

/// Segmentation strategy selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    /// Legacy heuristic: fixed windows for large files under whisper,
    /// silence splitting under vosk and remote.
    #[default]
    Auto,
    Fixed,
    Silence,
}

impl FromStr for SplitStrategy {
    type Err = DictofonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(SplitStrategy::Auto),
            "fixed" => Ok(SplitStrategy::Fixed),
            "silence" => Ok(SplitStrategy::Silence),
            other => Err(DictofonError::ConfigInvalidValue {
                key: "segmentation.strategy".to_string(),
                message: format!("unknown strategy {:?} (expected auto, fixed or silence)", other),
            }),
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Whisper,
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            model: defaults::DEFAULT_MODEL.to_string(),
            model_dir: PathBuf::from("models"),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            ffmpeg: defaults::FFMPEG_BIN.to_string(),
            ffprobe: defaults::FFPROBE_BIN.to_string(),
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::Auto,
            chunk_length_secs: defaults::CHUNK_LENGTH_SECS,
            large_file_threshold_mb: defaults::LARGE_FILE_THRESHOLD_MB,
            min_silence_ms: defaults::MIN_SILENCE_MS,
            silence_threshold_db: defaults::SILENCE_THRESHOLD_DB,
            keep_silence_ms: defaults::KEEP_SILENCE_MS,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_ATTEMPTS,
            backoff_ms: defaults::RETRY_BACKOFF_MS,
        }
    }
}

impl Default for RemoteApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key_env: "DICTOFON_API_KEY".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - DICTOFON_BACKEND → stt.backend
    /// - DICTOFON_MODEL → stt.model
    /// - DICTOFON_LANGUAGE → stt.language
    /// - DICTOFON_MODEL_DIR → stt.model_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(backend) = std::env::var("DICTOFON_BACKEND")
            && let Ok(backend) = backend.parse()
        {
            self.stt.backend = backend;
        }

        if let Ok(model) = std::env::var("DICTOFON_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("DICTOFON_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(dir) = std::env::var("DICTOFON_MODEL_DIR")
            && !dir.is_empty()
        {
            self.stt.model_dir = PathBuf::from(dir);
        }

        self
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.segmentation.chunk_length_secs == 0 {
            return Err(DictofonError::ConfigInvalidValue {
                key: "segmentation.chunk_length_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.segmentation.min_silence_ms == 0 {
            return Err(DictofonError::ConfigInvalidValue {
                key: "segmentation.min_silence_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.segmentation.silence_threshold_db >= 0.0 {
            return Err(DictofonError::ConfigInvalidValue {
                key: "segmentation.silence_threshold_db".to_string(),
                message: "must be negative (dBFS relative to full scale)".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(DictofonError::ConfigInvalidValue {
                key: "retry.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/dictofon/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("dictofon")
            .join("config.toml")
    }
}
