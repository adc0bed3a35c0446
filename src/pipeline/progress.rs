//! Progress reporting for pipeline runs.
//!
//! The runner emits state transitions and a per-segment completion count
//! through an observer. The pipeline is fully functional with no observer
//! attached; the CLI installs a stderr meter.

use crate::error::DictofonError;
use std::fmt;
use std::io::{self, Write};

/// Phase of a transcription run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Normalizing,
    Segmenting,
    Transcribing,
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Idle => "idle",
            RunState::Normalizing => "normalizing",
            RunState::Segmenting => "segmenting",
            RunState::Transcribing => "transcribing",
            RunState::Aggregating => "aggregating",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// Observer for run progress. All methods default to no-ops.
pub trait ProgressObserver: Send + Sync {
    /// The run entered a new phase.
    fn on_state(&self, _state: RunState) {}

    /// Segment `completed` of `total` finished (successfully or not).
    ///
    /// Called once per segment in ascending order, so `completed / total`
    /// is a monotonically increasing fraction.
    fn on_segment_done(&self, _completed: usize, _total: usize) {}

    /// Segment `index` failed and will contribute an empty partial.
    fn on_segment_failed(&self, _index: usize, _error: &DictofonError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

/// Stderr progress meter for interactive use.
///
/// Renders a `\r`-updated bar while transcribing and a warning line per
/// failed segment.
#[derive(Debug, Clone, Copy)]
pub struct StderrMeter {
    quiet: bool,
    verbosity: u8,
}

impl StderrMeter {
    pub fn new(quiet: bool, verbosity: u8) -> Self {
        Self { quiet, verbosity }
    }

    fn clear_line(&self) {
        eprint!("\r{:60}\r", "");
        let _ = io::stderr().flush();
    }
}

impl ProgressObserver for StderrMeter {
    fn on_state(&self, state: RunState) {
        if self.quiet {
            return;
        }
        match state {
            RunState::Normalizing | RunState::Segmenting => {
                if self.verbosity >= 1 {
                    eprintln!("[{}]", state);
                }
            }
            RunState::Done | RunState::Failed => {
                self.clear_line();
                if self.verbosity >= 1 {
                    eprintln!("[{}]", state);
                }
            }
            _ => {}
        }
    }

    fn on_segment_done(&self, completed: usize, total: usize) {
        if self.quiet || total == 0 {
            return;
        }
        let bar_width = 20;
        let filled = completed * bar_width / total;
        let mut bar = String::with_capacity(bar_width);
        for i in 0..bar_width {
            bar.push(if i < filled { '█' } else { '░' });
        }
        eprint!("\r[{}] {}/{} ", bar, completed, total);
        let _ = io::stderr().flush();
    }

    fn on_segment_failed(&self, index: usize, error: &DictofonError) {
        if self.quiet {
            return;
        }
        self.clear_line();
        eprintln!("dictofon: segment {} failed: {}", index + 1, error);
    }
}

/// Observer that records everything it sees, for runner tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingObserver {
    pub states: std::sync::Mutex<Vec<RunState>>,
    pub progress: std::sync::Mutex<Vec<(usize, usize)>>,
    pub failures: std::sync::Mutex<Vec<usize>>,
}

#[cfg(test)]
impl ProgressObserver for RecordingObserver {
    fn on_state(&self, state: RunState) {
        self.states.lock().unwrap().push(state);
    }

    fn on_segment_done(&self, completed: usize, total: usize) {
        self.progress.lock().unwrap().push((completed, total));
    }

    fn on_segment_failed(&self, index: usize, _error: &DictofonError) {
        self.failures.lock().unwrap().push(index);
    }
}
