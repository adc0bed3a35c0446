//! Speech-to-text backends.
//!
//! One `Transcriber` implementation is active per run, selected by
//! configuration: local whisper inference, an offline Vosk recognizer, or a
//! remote HTTP API. The remote backend is wrapped in a bounded retry policy.

pub mod retry;
pub mod transcriber;

#[cfg(feature = "remote")]
pub mod remote;
#[cfg(feature = "vosk")]
pub mod vosk;
#[cfg(feature = "whisper")]
pub mod whisper;

pub use retry::{RetryPolicy, RetryingTranscriber};
pub use transcriber::Transcriber;

use crate::config::{Backend, Config};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

#[cfg(not(all(feature = "whisper", feature = "vosk", feature = "remote")))]
use crate::error::DictofonError;

/// Build the configured transcription backend.
///
/// Selecting a backend this build was compiled without is a configuration
/// error, reported with the feature flag that would enable it.
pub fn create_transcriber(config: &Config) -> Result<Arc<dyn Transcriber>> {
    match config.stt.backend {
        Backend::Whisper => {
            #[cfg(feature = "whisper")]
            {
                let backend = whisper::WhisperTranscriber::new(whisper::WhisperConfig {
                    model: config.stt.model.clone(),
                    model_dir: config.stt.model_dir.clone(),
                    language: config.stt.language.clone(),
                    threads: None,
                })?;
                Ok(Arc::new(backend))
            }
            #[cfg(not(feature = "whisper"))]
            {
                Err(missing_feature("whisper"))
            }
        }
        Backend::Vosk => {
            #[cfg(feature = "vosk")]
            {
                let backend = vosk::VoskTranscriber::new(vosk::VoskConfig {
                    model_dir: config.stt.model_dir.join(&config.stt.model),
                    sample_rate: crate::defaults::SAMPLE_RATE,
                })?;
                Ok(Arc::new(backend))
            }
            #[cfg(not(feature = "vosk"))]
            {
                Err(missing_feature("vosk"))
            }
        }
        Backend::Remote => {
            #[cfg(feature = "remote")]
            {
                let api_key = std::env::var(&config.remote.api_key_env)
                    .ok()
                    .filter(|key| !key.is_empty());
                let backend = remote::RemoteTranscriber::new(remote::RemoteConfig {
                    endpoint: config.remote.endpoint.clone(),
                    api_key,
                    language: config.stt.language.clone(),
                    sample_rate: crate::defaults::SAMPLE_RATE,
                })?;
                let policy = RetryPolicy {
                    max_attempts: config.retry.max_attempts,
                    backoff: Duration::from_millis(config.retry.backoff_ms),
                };
                Ok(Arc::new(RetryingTranscriber::new(Arc::new(backend), policy)))
            }
            #[cfg(not(feature = "remote"))]
            {
                Err(missing_feature("remote"))
            }
        }
    }
}

#[cfg(not(all(feature = "whisper", feature = "vosk", feature = "remote")))]
fn missing_feature(feature: &str) -> DictofonError {
    DictofonError::ConfigInvalidValue {
        key: "stt.backend".to_string(),
        message: format!(
            "this build has no {feature} support (rebuild with --features {feature})"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_transcriber_reports_unusable_backend() {
        // Whichever way the build is configured, an unconfigured default
        // setup cannot produce a working whisper backend: either the feature
        // is missing or the model file is.
        let config = Config::default();
        assert!(create_transcriber(&config).is_err());
    }

    #[cfg(feature = "remote")]
    #[test]
    fn test_remote_backend_without_endpoint_is_config_error() {
        let mut config = Config::default();
        config.stt.backend = Backend::Remote;

        let result = create_transcriber(&config);
        assert!(matches!(
            result,
            Err(crate::error::DictofonError::ConfigInvalidValue { .. })
        ));
    }
}
