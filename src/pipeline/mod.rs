//! The transcription pipeline.
//!
//! `PipelineRunner` drives one run: normalize → segment → transcribe each
//! segment in order → aggregate. Data flows strictly one way; no segment
//! output feeds back into segmentation. A single segment's failure is
//! contained at its boundary and never aborts the run.

pub mod aggregate;
pub mod progress;
pub mod runner;
pub mod sink;

pub use aggregate::aggregate;
pub use progress::{NullObserver, ProgressObserver, RunState, StderrMeter};
pub use runner::{PipelineRunner, RunReport};
pub use sink::{CollectorSink, FileSink, StdoutSink, TranscriptSink};
