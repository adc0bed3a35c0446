//! Remote speech API transcription backend.
//!
//! Posts WAV bytes to a configured HTTP endpoint and reads the recognized
//! text from the JSON response. Transport failures, rate limiting and server
//! errors are transient (the retry wrapper may try again); a response without
//! text is the service's definitive no-speech verdict.

use crate::audio::wav;
use crate::error::{DictofonError, Result};
use crate::stt::transcriber::Transcriber;
use serde::Deserialize;

/// Configuration for the remote backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Recognition endpoint, e.g. "https://speech.example.com/v1/recognize"
    pub endpoint: String,
    /// Bearer token, if the service requires one
    pub api_key: Option<String>,
    /// Language code sent with each request
    pub language: String,
    /// Sample rate of the PCM handed to `transcribe`
    pub sample_rate: u32,
}

/// Response shape of the recognition endpoint.
///
/// A missing or null `text` field means the service found no speech.
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    text: Option<String>,
}

/// Remote API transcriber implementation.
pub struct RemoteTranscriber {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    config: RemoteConfig,
}

impl RemoteTranscriber {
    /// Create a transcriber for the configured endpoint.
    ///
    /// # Errors
    /// Returns `DictofonError::ConfigInvalidValue` when no endpoint is
    /// configured, `DictofonError::Other` if the async runtime cannot start.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(DictofonError::ConfigInvalidValue {
                key: "remote.endpoint".to_string(),
                message: "remote backend selected but no endpoint configured".to_string(),
            });
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DictofonError::Other(format!("Failed to start async runtime: {}", e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            runtime,
            config,
        })
    }

    async fn recognize(&self, body: Vec<u8>) -> Result<String> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .query(&[("language", self.config.language.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(body);

        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        // Connection resets and timeouts are transient
        let response = request
            .send()
            .await
            .map_err(|e| DictofonError::Transcription {
                message: format!("Speech API request failed: {}", e),
            })?;

        let status = response.status();
        // Rate limiting and server errors may clear up; other client
        // errors will not change on retry
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(DictofonError::Transcription {
                message: format!("Speech API returned status {}", status),
            });
        }
        if !status.is_success() {
            return Err(DictofonError::Other(format!(
                "Speech API rejected the request: {}",
                status
            )));
        }

        // A truncated or malformed body is transient as well — the next
        // attempt may read a complete response
        let parsed: RecognizeResponse =
            response
                .json()
                .await
                .map_err(|e| DictofonError::Transcription {
                    message: format!("Malformed speech API response: {}", e),
                })?;

        match parsed.text {
            Some(text) => Ok(text),
            None => Err(DictofonError::NoSpeechDetected),
        }
    }
}

impl Transcriber for RemoteTranscriber {
    fn transcribe(&self, audio: &[i16]) -> Result<String> {
        let body = wav::encode_wav(audio, self.config.sample_rate)?;
        self.runtime.block_on(self.recognize(body))
    }

    fn backend_name(&self) -> &str {
        "remote"
    }

    fn is_ready(&self) -> bool {
        !self.config.endpoint.is_empty()
    }
}
