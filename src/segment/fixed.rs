//! Fixed-duration window planning.

use crate::error::{DictofonError, Result};
use crate::segment::TimeWindow;

/// Plan windows of `window_secs` covering `[0, total_secs)` exactly once.
///
/// Produces `ceil(total / window)` windows; the last one is shortened to
/// whatever remains. Zero total duration yields an empty plan.
pub fn plan_windows(total_secs: u64, window_secs: u64) -> Result<Vec<TimeWindow>> {
    if window_secs == 0 {
        return Err(DictofonError::Segmentation {
            message: "window length must be positive".to_string(),
        });
    }

    let mut windows = Vec::with_capacity(total_secs.div_ceil(window_secs) as usize);
    let mut start = 0;
    while start < total_secs {
        windows.push(TimeWindow {
            start_secs: start,
            length_secs: window_secs.min(total_secs - start),
        });
        start += window_secs;
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_count_is_ceiling_of_division() {
        for (total, window, expected) in [
            (620u64, 300u64, 3usize),
            (600, 300, 2),
            (601, 300, 3),
            (299, 300, 1),
            (300, 300, 1),
            (1, 300, 1),
        ] {
            let windows = plan_windows(total, window).unwrap();
            assert_eq!(
                windows.len(),
                expected,
                "total={total} window={window}"
            );
            assert_eq!(windows.len() as u64, total.div_ceil(window));
        }
    }

    #[test]
    fn test_windows_cover_duration_without_gaps_or_overlaps() {
        for (total, window) in [(620u64, 300u64), (1000, 7), (86400, 300), (5, 5)] {
            let windows = plan_windows(total, window).unwrap();

            let mut expected_start = 0;
            for w in &windows {
                assert_eq!(w.start_secs, expected_start, "gap or overlap at {expected_start}");
                assert!(w.length_secs > 0);
                assert!(w.length_secs <= window, "window longer than configured");
                expected_start = w.end_secs();
            }
            assert_eq!(expected_start, total, "plan does not end at total duration");
        }
    }

    #[test]
    fn test_620_seconds_at_300_gives_expected_plan() {
        let windows = plan_windows(620, 300).unwrap();
        assert_eq!(
            windows,
            vec![
                TimeWindow {
                    start_secs: 0,
                    length_secs: 300
                },
                TimeWindow {
                    start_secs: 300,
                    length_secs: 300
                },
                TimeWindow {
                    start_secs: 600,
                    length_secs: 20
                },
            ]
        );
    }

    #[test]
    fn test_zero_duration_yields_empty_plan() {
        assert!(plan_windows(0, 300).unwrap().is_empty());
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let result = plan_windows(620, 0);
        assert!(matches!(result, Err(DictofonError::Segmentation { .. })));
    }
}
