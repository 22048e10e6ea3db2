/*!
 * Allocation of caption segments onto a fixed media duration.
 *
 * Each segment gets `word_count * seconds_per_word` seconds on a running
 * clock. A segment that would run past the end is cut at the total duration
 * and everything after it is dropped; when the segments run out early the
 * last line is stretched to the end so the timeline always covers the media.
 */

use log::debug;

use crate::lyrics::LyricLine;
use super::segmenter::word_count;

/// Assumed speech rate used to time lines
pub const DEFAULT_WORDS_PER_MINUTE: f64 = 150.0;

/// Seconds per word for a given speech rate
pub fn seconds_per_word(words_per_minute: f64) -> f64 {
    60.0 / words_per_minute
}

/// Time `segments` against `total_duration` seconds.
///
/// For a non-empty result the first line starts at 0, the last line ends at
/// exactly `total_duration`, and every line has a positive duration. Returns
/// no lines when there are no segments or the duration is not positive.
pub fn allocate(segments: &[String], total_duration: f64, seconds_per_word: f64) -> Vec<LyricLine> {
    let mut lines: Vec<LyricLine> = Vec::with_capacity(segments.len());
    if segments.is_empty() || !total_duration.is_finite() || total_duration <= 0.0 {
        return lines;
    }

    let mut clock = 0.0_f64;
    for segment in segments {
        let tentative = word_count(segment) as f64 * seconds_per_word;

        if clock + tentative > total_duration {
            if total_duration - clock > 0.0 {
                lines.push(LyricLine::new(segment.clone(), clock, total_duration));
            }
            debug!(
                "Timeline full at {:.2}s, dropped {} trailing segment(s)",
                total_duration,
                segments.len() - lines.len()
            );
            break;
        }

        lines.push(LyricLine::new(segment.clone(), clock, clock + tentative));
        clock += tentative;
    }

    // Absorb the remainder (or float drift) into the last line
    if let Some(last) = lines.last_mut() {
        last.set_end(total_duration);
    }

    lines
}
