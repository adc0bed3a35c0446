//! Silence-gap detection and splitting.
//!
//! Audio is scanned in 10ms frames; a frame whose RMS stays below the
//! configured dBFS threshold is silent. Runs of silent frames lasting at
//! least `min_silence_ms` become cut points, and the speech intervals
//! between them are emitted as segments, each padded by up to
//! `keep_silence_ms` of retained silence so word boundaries survive.

use crate::defaults;

/// Frame granularity for silence classification.
const FRAME_MS: u32 = 10;

/// Parameters for silence-based splitting.
#[derive(Debug, Clone, Copy)]
pub struct SilenceParams {
    /// Minimum duration of quiet audio that counts as a cut point (ms).
    pub min_silence_ms: u32,
    /// Amplitude below which a frame is silent, in dBFS.
    pub threshold_db: f32,
    /// Silence retained at each segment boundary (ms).
    pub keep_silence_ms: u32,
    /// Sample rate of the input buffer.
    pub sample_rate: u32,
}

impl Default for SilenceParams {
    fn default() -> Self {
        Self {
            min_silence_ms: defaults::MIN_SILENCE_MS,
            threshold_db: defaults::SILENCE_THRESHOLD_DB,
            keep_silence_ms: defaults::KEEP_SILENCE_MS,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

/// A maximal run of silent frames, in sample indices.
#[derive(Debug, Clone, Copy)]
struct SilenceRun {
    start: usize,
    end: usize,
}

impl SilenceRun {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Split PCM audio at silence gaps.
///
/// Returns the speech segments in input order. An input with no qualifying
/// silence run comes back as a single segment equal to the whole buffer;
/// entirely silent input produces no segments. Adjacent segments overlap by
/// at most `keep_silence_ms` of shared padding.
pub fn split_on_silence(samples: &[i16], params: &SilenceParams) -> Vec<Vec<i16>> {
    if samples.is_empty() {
        return Vec::new();
    }

    let runs = find_silence_runs(samples, params);
    if runs.is_empty() {
        return vec![samples.to_vec()];
    }

    let keep = (params.sample_rate as u64 * params.keep_silence_ms as u64 / 1000) as usize;
    let mut segments = Vec::new();

    // Speech intervals are the gaps between qualifying silence runs, plus
    // whatever precedes the first run and follows the last.
    let mut intervals: Vec<(usize, usize, Option<SilenceRun>, Option<SilenceRun>)> = Vec::new();
    let mut cursor = 0;
    let mut previous: Option<SilenceRun> = None;
    for run in &runs {
        if run.start > cursor {
            intervals.push((cursor, run.start, previous, Some(*run)));
        }
        cursor = run.end;
        previous = Some(*run);
    }
    if cursor < samples.len() {
        intervals.push((cursor, samples.len(), previous, None));
    }

    for (start, end, before, after) in intervals {
        // Padding extends only into the adjacent silence run, never past
        // the file edges — which bounds overlap between neighbours at the
        // padding amount.
        let pad_left = before.map_or(0, |run| keep.min(run.len()));
        let pad_right = after.map_or(0, |run| keep.min(run.len()));
        let padded = &samples[start - pad_left..end + pad_right];
        if !padded.is_empty() {
            segments.push(padded.to_vec());
        }
    }

    segments
}

/// Find maximal silent-frame runs of at least `min_silence_ms`.
fn find_silence_runs(samples: &[i16], params: &SilenceParams) -> Vec<SilenceRun> {
    let frame_len = ((params.sample_rate / 1000 * FRAME_MS) as usize).max(1);
    let threshold = db_to_amplitude(params.threshold_db);
    let min_frames = params.min_silence_ms.div_ceil(FRAME_MS).max(1) as usize;

    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut frames = 0usize;

    let mut frame_index = 0;
    while frame_index * frame_len < samples.len() {
        let start = frame_index * frame_len;
        let end = (start + frame_len).min(samples.len());
        let silent = rms(&samples[start..end]) < threshold;

        if silent {
            if run_start.is_none() {
                run_start = Some(start);
            }
            frames += 1;
        } else if let Some(begin) = run_start.take() {
            if frames >= min_frames {
                runs.push(SilenceRun { start: begin, end: start });
            }
            frames = 0;
        }
        frame_index += 1;
    }

    if let Some(begin) = run_start
        && frames >= min_frames
    {
        runs.push(SilenceRun {
            start: begin,
            end: samples.len(),
        });
    }

    runs
}

/// Convert a dBFS threshold to linear amplitude relative to full scale.
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// Returns a normalized value where 0.0 is silence and 1.0 is maximum
/// amplitude.
pub fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 16000;

    fn params(min_silence_ms: u32, keep_silence_ms: u32) -> SilenceParams {
        SilenceParams {
            min_silence_ms,
            threshold_db: -40.0,
            keep_silence_ms,
            sample_rate: RATE,
        }
    }

    fn silence(ms: u32) -> Vec<i16> {
        vec![0i16; (RATE / 1000 * ms) as usize]
    }

    fn speech(ms: u32) -> Vec<i16> {
        // Constant 3000 amplitude — RMS ~0.09, well above the -40dBFS (~0.01)
        // threshold
        vec![3000i16; (RATE / 1000 * ms) as usize]
    }

    fn concat(parts: &[Vec<i16>]) -> Vec<i16> {
        parts.iter().flatten().copied().collect()
    }

    #[test]
    fn test_db_to_amplitude() {
        assert!((db_to_amplitude(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_amplitude(-20.0) - 0.1).abs() < 1e-6);
        assert!((db_to_amplitude(-40.0) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_rms_silence_is_zero() {
        assert_eq!(rms(&silence(100)), 0.0);
    }

    #[test]
    fn test_rms_max_amplitude() {
        let max_signal = vec![i16::MAX; 1000];
        let value = rms(&max_signal);
        assert!((value - 1.0).abs() < 0.001, "RMS should be ~1.0, got {value}");
    }

    #[test]
    fn test_rms_empty_samples() {
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_empty_input_yields_no_segments() {
        let segments = split_on_silence(&[], &params(500, 300));
        assert!(segments.is_empty());
    }

    #[test]
    fn test_no_silence_yields_whole_input_as_one_segment() {
        let audio = speech(2000);
        let segments = split_on_silence(&audio, &params(500, 300));

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], audio);
    }

    #[test]
    fn test_entirely_silent_input_yields_no_segments() {
        let audio = silence(3000);
        let segments = split_on_silence(&audio, &params(500, 300));
        assert!(segments.is_empty());
    }

    #[test]
    fn test_splits_on_qualifying_gap() {
        let audio = concat(&[speech(1000), silence(1000), speech(1000)]);
        let segments = split_on_silence(&audio, &params(500, 300));

        assert_eq!(segments.len(), 2);
        // 1s speech + 300ms retained silence on the gap side
        let keep = (RATE as usize / 1000) * 300;
        let second = (RATE as usize / 1000) * 1000;
        assert_eq!(segments[0].len(), second + keep);
        assert_eq!(segments[1].len(), second + keep);
    }

    #[test]
    fn test_short_gap_does_not_split() {
        let audio = concat(&[speech(1000), silence(300), speech(1000)]);
        let segments = split_on_silence(&audio, &params(500, 300));

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], audio);
    }

    #[test]
    fn test_leading_and_trailing_silence_becomes_padding_only() {
        let audio = concat(&[silence(1000), speech(1000), silence(1000)]);
        let segments = split_on_silence(&audio, &params(500, 300));

        assert_eq!(segments.len(), 1);
        // Padding never crosses the file edges and never exceeds keep_silence
        let keep = (RATE as usize / 1000) * 300;
        let second = (RATE as usize / 1000) * 1000;
        assert_eq!(segments[0].len(), second + 2 * keep);
    }

    #[test]
    fn test_padding_clamped_to_available_silence() {
        // Gap of 250ms qualifies (min 200ms) but is shorter than the 300ms
        // padding, so each side retains only the 250ms that exist.
        let audio = concat(&[speech(1000), silence(250), speech(1000)]);
        let segments = split_on_silence(&audio, &params(200, 300));

        assert_eq!(segments.len(), 2);
        let gap = (RATE as usize / 1000) * 250;
        let second = (RATE as usize / 1000) * 1000;
        assert_eq!(segments[0].len(), second + gap);
        assert_eq!(segments[1].len(), second + gap);
    }

    #[test]
    fn test_neighbour_overlap_never_exceeds_keep_silence() {
        let keep_ms = 300u32;
        let keep = (RATE as usize / 1000) * keep_ms as usize;
        let speech_len = (RATE as usize / 1000) * 1000;

        for gap_ms in [200u32, 300, 400, 500, 700, 1000] {
            let audio = concat(&[speech(1000), silence(gap_ms), speech(1000)]);
            let segments = split_on_silence(&audio, &params(200, keep_ms));
            assert_eq!(segments.len(), 2, "gap_ms={gap_ms}");

            let gap = (RATE as usize / 1000) * gap_ms as usize;
            // First segment ends at speech_len + pad_right, second starts at
            // speech_len + gap - pad_left.
            let first_end = segments[0].len();
            let second_start = speech_len + gap - (segments[1].len() - speech_len);
            let overlap = first_end.saturating_sub(second_start);
            assert!(
                overlap <= keep,
                "gap_ms={gap_ms}: overlap {overlap} exceeds keep {keep}"
            );
        }
    }

    #[test]
    fn test_segments_reconstruct_a_subset_of_input() {
        let audio = concat(&[
            speech(700),
            silence(600),
            speech(500),
            silence(800),
            speech(900),
        ]);
        let segments = split_on_silence(&audio, &params(500, 0));

        assert_eq!(segments.len(), 3);
        // With zero padding the segments are exactly the speech intervals,
        // so their concatenation is a subsequence of the input.
        let total: usize = segments.iter().map(|s| s.len()).sum();
        assert!(total <= audio.len());
        for segment in &segments {
            assert!(segment.iter().all(|&s| s == 3000));
        }
    }

    #[test]
    fn test_three_gaps_yield_ordered_segments() {
        let audio = concat(&[speech(400), silence(600), speech(400), silence(600), speech(400)]);
        let segments = split_on_silence(&audio, &params(500, 100));

        assert_eq!(segments.len(), 3);
        for segment in &segments {
            // Every segment contains its speech interval
            assert!(segment.iter().any(|&s| s == 3000));
        }
    }
}
