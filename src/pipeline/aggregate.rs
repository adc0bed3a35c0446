//! Transcript aggregation.
//!
//! The last pipeline stage and the only one that cannot fail: it only ever
//! sees complete (possibly empty) per-segment strings.

use crate::defaults;

/// Join ordered per-segment texts into the final transcript.
///
/// Each partial is trimmed, empty ones are dropped, and the rest are joined
/// by single spaces in segment order. When nothing remains — every segment
/// failed, was silent, or the run produced no segments at all — the fixed
/// no-speech sentinel is returned instead of an empty string.
pub fn aggregate(partials: &[String]) -> String {
    let joined = partials
        .iter()
        .map(|partial| partial.trim())
        .filter(|partial| !partial.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        defaults::NO_SPEECH_PLACEHOLDER.to_string()
    } else {
        joined
    }
}
