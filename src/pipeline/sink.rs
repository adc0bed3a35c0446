//! Transcript output sinks.
//!
//! A run produces exactly one final transcript; the sink decides where it
//! goes. The CLI writes to stdout or a `.txt` file, library callers and
//! tests collect in memory.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Pluggable destination for a run's final transcript.
pub trait TranscriptSink {
    /// Deliver the final transcript.
    fn write(&mut self, text: &str) -> Result<()>;

    /// Name for diagnostics.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Prints the transcript to stdout.
pub struct StdoutSink;

impl TranscriptSink for StdoutSink {
    fn write(&mut self, text: &str) -> Result<()> {
        println!("{}", text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Writes the transcript to a plain-text file.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptSink for FileSink {
    fn write(&mut self, text: &str) -> Result<()> {
        fs::write(&self.path, format!("{}\n", text))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Collects transcripts for library and test use.
#[derive(Default)]
pub struct CollectorSink {
    collected: Vec<String>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcripts received so far, in order.
    pub fn collected(&self) -> &[String] {
        &self.collected
    }

    /// Accumulated text, or `None` if nothing was written.
    pub fn finish(&mut self) -> Option<String> {
        if self.collected.is_empty() {
            None
        } else {
            Some(self.collected.join(" "))
        }
    }
}

impl TranscriptSink for CollectorSink {
    fn write(&mut self, text: &str) -> Result<()> {
        self.collected.push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
