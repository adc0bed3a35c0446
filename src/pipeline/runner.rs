//! Pipeline orchestration.
//!
//! One run moves through `Normalizing → Segmenting → Transcribing →
//! Aggregating`. Normalization and segmentation failures abort the run;
//! a failure while transcribing segment *i* records an empty partial and
//! the run continues with segment *i+1*. Segments are processed strictly
//! sequentially in start order — the loaded model (or HTTP client) is a
//! single non-reentrant resource, and aggregation order depends on it.

use crate::audio::wav;
use crate::codec::{CommandExecutor, FfmpegCodec};
use crate::config::{Backend, SegmentationConfig, SplitStrategy};
use crate::defaults;
use crate::error::{DictofonError, Result};
use crate::pipeline::aggregate::aggregate;
use crate::pipeline::progress::{NullObserver, ProgressObserver, RunState};
use crate::segment::{Segment, SilenceParams, plan_windows, split_on_silence};
use crate::stt::Transcriber;
use std::path::Path;
use std::sync::Arc;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Final transcript, never empty (the no-speech sentinel covers the
    /// nothing-recognized case).
    pub transcript: String,
    /// Segments the run processed.
    pub segments_total: usize,
    /// Segments that failed transcription or extraction.
    pub segments_failed: usize,
    /// Segments the backend explicitly found no speech in.
    pub segments_no_speech: usize,
}

/// Splitting policy after `Auto` resolution.
enum Policy {
    Windows { window_secs: u64 },
    Silence,
}

/// Orchestrates one transcription run per `run` call.
pub struct PipelineRunner<E: CommandExecutor> {
    codec: FfmpegCodec<E>,
    transcriber: Arc<dyn Transcriber>,
    segmentation: SegmentationConfig,
    backend: Backend,
    observer: Arc<dyn ProgressObserver>,
}

impl<E: CommandExecutor> PipelineRunner<E> {
    pub fn new(
        codec: FfmpegCodec<E>,
        transcriber: Arc<dyn Transcriber>,
        segmentation: SegmentationConfig,
        backend: Backend,
    ) -> Self {
        Self {
            codec,
            transcriber,
            segmentation,
            backend,
            observer: Arc::new(NullObserver),
        }
    }

    /// Attach a progress observer. The runner works unobserved by default.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Transcribe `input` end to end.
    ///
    /// Fatal errors (undecodable input, unreadable duration, zero-length
    /// audio) abort the run; per-segment failures are contained and counted
    /// in the report. All temporary files are removed before this returns,
    /// on success and failure paths alike.
    pub fn run(&self, input: &Path) -> Result<RunReport> {
        match self.run_inner(input) {
            Ok(report) => {
                self.observer.on_state(RunState::Done);
                Ok(report)
            }
            Err(e) => {
                self.observer.on_state(RunState::Failed);
                Err(e)
            }
        }
    }

    fn run_inner(&self, input: &Path) -> Result<RunReport> {
        self.observer.on_state(RunState::Normalizing);
        let normalized = self.codec.normalize(input)?;

        let result = self.process_normalized(&normalized);
        if let Err(e) = normalized.close() {
            eprintln!("dictofon: failed to remove temporary file: {}", e);
        }
        result
    }

    fn process_normalized(&self, normalized: &Path) -> Result<RunReport> {
        self.observer.on_state(RunState::Segmenting);
        let segments = self.plan_segments(normalized)?;

        self.observer.on_state(RunState::Transcribing);
        let total = segments.len();
        let mut partials = Vec::with_capacity(total);
        let mut failed = 0;
        let mut no_speech = 0;

        for (index, segment) in segments.into_iter().enumerate() {
            match self.transcribe_segment(normalized, &segment) {
                Ok(text) => partials.push(text),
                Err(DictofonError::NoSpeechDetected) => {
                    no_speech += 1;
                    partials.push(String::new());
                }
                Err(e) => {
                    failed += 1;
                    self.observer.on_segment_failed(index, &e);
                    partials.push(String::new());
                }
            }
            self.observer.on_segment_done(index + 1, total);
        }

        self.observer.on_state(RunState::Aggregating);
        Ok(RunReport {
            transcript: aggregate(&partials),
            segments_total: total,
            segments_failed: failed,
            segments_no_speech: no_speech,
        })
    }

    /// Probe the normalized audio and produce the run's segment sequence.
    fn plan_segments(&self, normalized: &Path) -> Result<Vec<Segment>> {
        let total_secs = self.codec.probe_duration(normalized)?;
        if total_secs == 0 {
            return Err(DictofonError::Segmentation {
                message: "audio stream has zero duration".to_string(),
            });
        }

        match self.resolve_policy(normalized, total_secs)? {
            Policy::Windows { window_secs } => Ok(plan_windows(total_secs, window_secs)?
                .into_iter()
                .map(Segment::Window)
                .collect()),
            Policy::Silence => {
                let samples = wav::read_samples(normalized)?;
                let params = SilenceParams {
                    min_silence_ms: self.segmentation.min_silence_ms,
                    threshold_db: self.segmentation.silence_threshold_db,
                    keep_silence_ms: self.segmentation.keep_silence_ms,
                    sample_rate: defaults::SAMPLE_RATE,
                };
                Ok(split_on_silence(&samples, &params)
                    .into_iter()
                    .map(Segment::Samples)
                    .collect())
            }
        }
    }

    fn resolve_policy(&self, normalized: &Path, total_secs: u64) -> Result<Policy> {
        match self.segmentation.strategy {
            SplitStrategy::Fixed => Ok(Policy::Windows {
                window_secs: self.segmentation.chunk_length_secs,
            }),
            SplitStrategy::Silence => Ok(Policy::Silence),
            SplitStrategy::Auto => match self.backend {
                // Legacy heuristic: chunk large files, one whole-file pass
                // otherwise
                Backend::Whisper => {
                    let size = std::fs::metadata(normalized)
                        .map_err(|e| DictofonError::Segmentation {
                            message: format!("cannot stat normalized audio: {}", e),
                        })?
                        .len();
                    let threshold = self.segmentation.large_file_threshold_mb * 1024 * 1024;
                    if size > threshold {
                        Ok(Policy::Windows {
                            window_secs: self.segmentation.chunk_length_secs,
                        })
                    } else {
                        Ok(Policy::Windows {
                            window_secs: total_secs,
                        })
                    }
                }
                Backend::Vosk | Backend::Remote => Ok(Policy::Silence),
            },
        }
    }

    /// Process one segment. Any error here is contained by the caller.
    fn transcribe_segment(&self, normalized: &Path, segment: &Segment) -> Result<String> {
        match segment {
            Segment::Window(window) => {
                let extracted = self.codec.extract_window(
                    normalized,
                    window.start_secs,
                    window.length_secs,
                )?;
                let result = wav::read_samples(&extracted)
                    .and_then(|samples| self.transcriber.transcribe(&samples));
                // The extraction is released before the next segment starts
                if let Err(e) = extracted.close() {
                    eprintln!("dictofon: failed to remove temporary file: {}", e);
                }
                result
            }
            Segment::Samples(samples) => self.transcriber.transcribe(samples),
        }
    }
}
