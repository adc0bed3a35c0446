//! End-to-end pipeline tests against the public API.
//!
//! ffmpeg/ffprobe are replaced by a fake executor that writes real WAV
//! files, the backend by the scriptable mock transcriber. Nothing here
//! touches the network or spawns subprocesses.

use dictofon::codec::{CommandExecutor, FfmpegCodec};
use dictofon::config::{Backend, CodecConfig, SegmentationConfig, SplitStrategy};
use dictofon::error::{DictofonError, Result};
use dictofon::pipeline::{PipelineRunner, ProgressObserver, RunState};
use dictofon::stt::transcriber::{MockOutcome, MockTranscriber};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const SAMPLE_RATE: u32 = 16000;
const NO_SPEECH: &str = "(не удалось распознать речь)";

/// Stands in for ffmpeg/ffprobe: probe calls replay a scripted duration,
/// conversion calls write a real WAV to the output path. Records every
/// file it creates so tests can assert cleanup.
struct FakeCodecTool {
    probe_stdout: String,
    normalized_samples: Vec<i16>,
    written: Mutex<Vec<PathBuf>>,
}

impl FakeCodecTool {
    fn new(probe_stdout: &str) -> Self {
        Self {
            probe_stdout: probe_stdout.to_string(),
            normalized_samples: vec![3000i16; SAMPLE_RATE as usize],
            written: Mutex::new(Vec::new()),
        }
    }

    fn with_normalized_samples(mut self, samples: Vec<i16>) -> Self {
        self.normalized_samples = samples;
        self
    }

    fn write_wav(&self, path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        self.written.lock().unwrap().push(path.to_path_buf());
    }

    fn leftover_files(&self) -> Vec<PathBuf> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.exists())
            .cloned()
            .collect()
    }
}

impl CommandExecutor for FakeCodecTool {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        if command == "ffprobe" {
            return Ok(self.probe_stdout.clone());
        }
        let output = Path::new(args.last().unwrap());
        if args.contains(&"-ss") {
            self.write_wav(output, &vec![3000i16; 1600]);
        } else {
            self.write_wav(output, &self.normalized_samples);
        }
        Ok(String::new())
    }
}

/// Orphan-rule-friendly handle: `CommandExecutor` and `Arc` are both
/// foreign to this test crate, so the trait is implemented on the
/// local `FakeCodecTool` above and this newtype just delegates to it.
#[derive(Clone)]
struct ToolHandle(Arc<FakeCodecTool>);

impl CommandExecutor for ToolHandle {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        self.0.execute(command, args)
    }
}

/// Records state transitions and progress fractions.
#[derive(Default)]
struct ProgressProbe {
    states: Mutex<Vec<RunState>>,
    progress: Mutex<Vec<(usize, usize)>>,
}

impl ProgressObserver for ProgressProbe {
    fn on_state(&self, state: RunState) {
        self.states.lock().unwrap().push(state);
    }

    fn on_segment_done(&self, completed: usize, total: usize) {
        self.progress.lock().unwrap().push((completed, total));
    }
}

fn runner(
    tool: &Arc<FakeCodecTool>,
    transcriber: Arc<dyn dictofon::Transcriber>,
    strategy: SplitStrategy,
    backend: Backend,
) -> PipelineRunner<ToolHandle> {
    let segmentation = SegmentationConfig {
        strategy,
        ..SegmentationConfig::default()
    };
    PipelineRunner::new(
        FfmpegCodec::new(ToolHandle(tool.clone()), &CodecConfig::default()),
        transcriber,
        segmentation,
        backend,
    )
}

#[test]
fn a_620_second_input_becomes_three_segments_surviving_a_middle_failure() {
    let tool = Arc::new(FakeCodecTool::new("620.000000\n"));
    let mock = Arc::new(MockTranscriber::new("mock").with_script(vec![
        MockOutcome::Text("hello".to_string()),
        MockOutcome::Fail,
        MockOutcome::Text("world".to_string()),
    ]));
    let probe = Arc::new(ProgressProbe::default());

    let report = runner(&tool, mock.clone(), SplitStrategy::Fixed, Backend::Whisper)
        .with_observer(probe.clone())
        .run(Path::new("/tmp/recording.mp3"))
        .unwrap();

    assert_eq!(report.transcript, "hello world");
    assert_eq!(report.segments_total, 3);
    assert_eq!(report.segments_failed, 1);
    assert_eq!(mock.calls(), 3);

    // Progress is a monotonically increasing fraction, one tick per segment
    assert_eq!(*probe.progress.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(
        probe.states.lock().unwrap().last(),
        Some(&RunState::Done)
    );
}

#[test]
fn all_segments_failing_yields_the_no_speech_sentinel() {
    let tool = Arc::new(FakeCodecTool::new("620.0"));
    let mock = Arc::new(MockTranscriber::new("mock").with_failure());

    let report = runner(&tool, mock, SplitStrategy::Fixed, Backend::Whisper)
        .run(Path::new("/tmp/recording.mp3"))
        .unwrap();

    assert_eq!(report.transcript, NO_SPEECH);
    assert_eq!(report.segments_failed, 3);
}

#[test]
fn no_speech_everywhere_yields_the_sentinel_without_counting_failures() {
    let tool = Arc::new(FakeCodecTool::new("620.0"));
    let mock = Arc::new(MockTranscriber::new("mock").with_no_speech());

    let report = runner(&tool, mock, SplitStrategy::Fixed, Backend::Whisper)
        .run(Path::new("/tmp/recording.mp3"))
        .unwrap();

    assert_eq!(report.transcript, NO_SPEECH);
    assert_eq!(report.segments_failed, 0);
    assert_eq!(report.segments_no_speech, 3);
}

#[test]
fn silence_splitting_transcribes_speech_intervals_in_order() {
    // 1s speech / 1s silence / 1s speech / 1s silence / 1s speech
    let second = SAMPLE_RATE as usize;
    let mut samples = Vec::new();
    for block in [3000i16, 0, 3000, 0, 3000] {
        samples.extend(std::iter::repeat_n(block, second));
    }
    let tool = Arc::new(FakeCodecTool::new("5.0").with_normalized_samples(samples));
    let mock = Arc::new(MockTranscriber::new("mock").with_script(vec![
        MockOutcome::Text("раз".to_string()),
        MockOutcome::Text("два".to_string()),
        MockOutcome::Text("три".to_string()),
    ]));

    let report = runner(&tool, mock, SplitStrategy::Silence, Backend::Remote)
        .run(Path::new("/tmp/recording.ogg"))
        .unwrap();

    assert_eq!(report.transcript, "раз два три");
    assert_eq!(report.segments_total, 3);
}

#[test]
fn no_temporary_files_remain_after_a_successful_run() {
    let tool = Arc::new(FakeCodecTool::new("620.0"));
    let mock = Arc::new(MockTranscriber::new("mock").with_response("text"));

    runner(&tool, mock, SplitStrategy::Fixed, Backend::Whisper)
        .run(Path::new("/tmp/recording.mp3"))
        .unwrap();

    assert_eq!(tool.leftover_files(), Vec::<PathBuf>::new());
}

#[test]
fn no_temporary_files_remain_after_a_fatal_failure() {
    // Probe returns garbage → fatal after normalization already wrote a file
    let tool = Arc::new(FakeCodecTool::new("N/A"));
    let mock = Arc::new(MockTranscriber::new("mock"));
    let probe = Arc::new(ProgressProbe::default());

    let result = runner(&tool, mock, SplitStrategy::Fixed, Backend::Whisper)
        .with_observer(probe.clone())
        .run(Path::new("/tmp/recording.mp3"));

    assert!(matches!(result, Err(DictofonError::DurationProbe { .. })));
    assert_eq!(tool.leftover_files(), Vec::<PathBuf>::new());
    assert_eq!(
        probe.states.lock().unwrap().last(),
        Some(&RunState::Failed)
    );
}

#[test]
fn runner_works_with_no_observer_attached() {
    let tool = Arc::new(FakeCodecTool::new("300.0"));
    let mock = Arc::new(MockTranscriber::new("mock").with_response("quiet run"));

    let report = runner(&tool, mock, SplitStrategy::Fixed, Backend::Whisper)
        .run(Path::new("/tmp/recording.wav"))
        .unwrap();

    assert_eq!(report.transcript, "quiet run");
}
