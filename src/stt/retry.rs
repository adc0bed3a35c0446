//! Bounded retry for transient backend failures.
//!
//! The remote speech API fails in two distinct ways: transiently (connection
//! reset, truncated response, rate limiting), where another attempt may
//! succeed, and definitively ("no speech recognized"), where it cannot. Only
//! the former is retried, with a fixed pause between attempts.

use crate::error::Result;
use crate::stt::transcriber::Transcriber;
use std::sync::Arc;
use std::time::Duration;

/// Trait for pausing between attempts, allowing instant time in tests.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real sleeper using `std::thread::sleep`.
///
/// Blocks only the calling segment's thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Retry policy for a wrapped transcriber.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::defaults::MAX_ATTEMPTS,
            backoff: Duration::from_millis(crate::defaults::RETRY_BACKOFF_MS),
        }
    }
}

/// Transcriber wrapper that retries transient failures.
pub struct RetryingTranscriber<S: Sleeper = ThreadSleeper> {
    inner: Arc<dyn Transcriber>,
    policy: RetryPolicy,
    sleeper: S,
}

impl RetryingTranscriber<ThreadSleeper> {
    /// Wrap a transcriber with the given policy (production use).
    pub fn new(inner: Arc<dyn Transcriber>, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, ThreadSleeper)
    }
}

impl<S: Sleeper> RetryingTranscriber<S> {
    /// Wrap a transcriber with a custom sleeper (testing use).
    pub fn with_sleeper(inner: Arc<dyn Transcriber>, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }
}

impl<S: Sleeper> Transcriber for RetryingTranscriber<S> {
    fn transcribe(&self, audio: &[i16]) -> Result<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.transcribe(audio) {
                Ok(text) => return Ok(text),
                // No-speech verdicts and anything else non-transient are
                // final on the first occurrence
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= max_attempts => return Err(e),
                Err(_) => {
                    self.sleeper.sleep(self.policy.backoff);
                    attempt += 1;
                }
            }
        }
    }

    fn backend_name(&self) -> &str {
        self.inner.backend_name()
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DictofonError;
    use crate::stt::transcriber::{MockOutcome, MockTranscriber};
    use std::sync::Mutex;

    /// Sleeper that records requested pauses instead of waiting.
    #[derive(Default)]
    struct RecordingSleeper {
        pauses: Mutex<Vec<Duration>>,
    }

    impl Sleeper for &RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.pauses.lock().unwrap().push(duration);
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_success_on_first_attempt_makes_one_call() {
        let mock = Arc::new(MockTranscriber::new("mock").with_response("hello"));
        let sleeper = RecordingSleeper::default();
        let client = RetryingTranscriber::with_sleeper(mock.clone(), policy(3), &sleeper);

        assert_eq!(client.transcribe(&[0i16; 10]).unwrap(), "hello");
        assert_eq!(mock.calls(), 1);
        assert!(sleeper.pauses.lock().unwrap().is_empty());
    }

    #[test]
    fn test_transient_failures_then_success() {
        // Fails twice (k=2 < max=3), then succeeds → k+1 calls
        let mock = Arc::new(
            MockTranscriber::new("mock")
                .with_response("recovered")
                .with_script(vec![MockOutcome::Fail, MockOutcome::Fail]),
        );
        let sleeper = RecordingSleeper::default();
        let client = RetryingTranscriber::with_sleeper(mock.clone(), policy(3), &sleeper);

        assert_eq!(client.transcribe(&[0i16; 10]).unwrap(), "recovered");
        assert_eq!(mock.calls(), 3);
        assert_eq!(
            *sleeper.pauses.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(1)]
        );
    }

    #[test]
    fn test_always_failing_backend_makes_exactly_max_attempts() {
        let mock = Arc::new(MockTranscriber::new("mock").with_failure());
        let sleeper = RecordingSleeper::default();
        let client = RetryingTranscriber::with_sleeper(mock.clone(), policy(3), &sleeper);

        let result = client.transcribe(&[0i16; 10]);
        assert!(matches!(result, Err(DictofonError::Transcription { .. })));
        assert_eq!(mock.calls(), 3);
        // No pause after the final attempt
        assert_eq!(sleeper.pauses.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_no_speech_is_returned_immediately_without_retry() {
        let mock = Arc::new(MockTranscriber::new("mock").with_no_speech());
        let sleeper = RecordingSleeper::default();
        let client = RetryingTranscriber::with_sleeper(mock.clone(), policy(3), &sleeper);

        let result = client.transcribe(&[0i16; 10]);
        assert!(matches!(result, Err(DictofonError::NoSpeechDetected)));
        assert_eq!(mock.calls(), 1);
        assert!(sleeper.pauses.lock().unwrap().is_empty());
    }

    #[test]
    fn test_zero_max_attempts_still_calls_once() {
        let mock = Arc::new(MockTranscriber::new("mock").with_failure());
        let sleeper = RecordingSleeper::default();
        let client = RetryingTranscriber::with_sleeper(mock.clone(), policy(0), &sleeper);

        assert!(client.transcribe(&[0i16; 10]).is_err());
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_wrapper_delegates_metadata() {
        let mock = Arc::new(MockTranscriber::new("remote"));
        let client = RetryingTranscriber::new(mock, RetryPolicy::default());

        assert_eq!(client.backend_name(), "remote");
        assert!(client.is_ready());
    }
}
