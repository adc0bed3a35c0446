//! Speech-to-text abstraction.

use crate::error::{DictofonError, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for speech-to-text transcription.
///
/// Exactly one backend implementation is active per run; the trait allows
/// swapping implementations (whisper, vosk, remote API, or a mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples to text.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono
    ///
    /// # Returns
    /// Transcribed text (possibly empty), or an error. A definitive
    /// "nothing to recognize" verdict is `DictofonError::NoSpeechDetected`,
    /// distinct from transient failures.
    fn transcribe(&self, audio: &[i16]) -> Result<String>;

    /// Get the name of the active backend
    fn backend_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across runs.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[i16]) -> Result<String> {
        (**self).transcribe(audio)
    }

    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Scripted outcome for the mock transcriber.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return this text.
    Text(String),
    /// Fail with a transient transcription error.
    Fail,
    /// Report a definitive no-speech verdict.
    NoSpeech,
}

/// Mock transcriber for testing.
///
/// Plays back a script of outcomes, one per call, then falls back to the
/// default response. Counts calls so retry behavior can be asserted.
pub struct MockTranscriber {
    backend_name: String,
    default: MockOutcome,
    script: Mutex<VecDeque<MockOutcome>>,
    calls: AtomicUsize,
}

impl MockTranscriber {
    /// Create a new mock transcriber that returns "mock transcription".
    pub fn new(backend_name: &str) -> Self {
        Self {
            backend_name: backend_name.to_string(),
            default: MockOutcome::Text("mock transcription".to_string()),
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to return a specific response by default
    pub fn with_response(mut self, response: &str) -> Self {
        self.default = MockOutcome::Text(response.to_string());
        self
    }

    /// Configure the mock to fail on every transcribe call
    pub fn with_failure(mut self) -> Self {
        self.default = MockOutcome::Fail;
        self
    }

    /// Configure the mock to report no speech on every transcribe call
    pub fn with_no_speech(mut self) -> Self {
        self.default = MockOutcome::NoSpeech;
        self
    }

    /// Play back these outcomes (in order) before the default kicks in
    pub fn with_script(self, outcomes: Vec<MockOutcome>) -> Self {
        *self.script.lock().unwrap() = outcomes.into();
        self
    }

    /// Number of transcribe calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> MockOutcome {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[i16]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_outcome() {
            MockOutcome::Text(text) => Ok(text),
            MockOutcome::Fail => Err(DictofonError::Transcription {
                message: "mock transcription failure".to_string(),
            }),
            MockOutcome::NoSpeech => Err(DictofonError::NoSpeechDetected),
        }
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    fn is_ready(&self) -> bool {
        !matches!(self.default, MockOutcome::Fail)
    }
}
