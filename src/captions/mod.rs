/*!
 * Caption timeline synchronization.
 *
 * This module turns raw model text into bilingual, time-coded lyric lines:
 *
 * - `reasoning`: separates reasoning blocks from the translated text
 * - `segmenter`: splits a flat transcript into displayable segments
 * - `allocator`: times segments against the media duration
 * - `remapper`: lays a translation over the original timing
 */

pub mod allocator;
pub mod reasoning;
pub mod remapper;
pub mod segmenter;

pub use self::reasoning::{extract, ExtractionResult, ExtractionRule, ReasoningTag};
pub use self::remapper::{placeholder_for, remap};

use crate::app_config::TimelineConfig;
use crate::lyrics::LyricLine;

/// Segmenter and allocator configured with one set of timing rules
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    max_words_per_line: usize,
    seconds_per_word: f64,
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new(segmenter::DEFAULT_MAX_WORDS_PER_LINE, allocator::DEFAULT_WORDS_PER_MINUTE)
    }
}

impl TimelineBuilder {
    pub fn new(max_words_per_line: usize, words_per_minute: f64) -> Self {
        Self {
            max_words_per_line: max_words_per_line.max(1),
            seconds_per_word: allocator::seconds_per_word(words_per_minute),
        }
    }

    pub fn from_config(config: &TimelineConfig) -> Self {
        Self::new(config.max_words_per_line, config.words_per_minute)
    }

    pub fn max_words_per_line(&self) -> usize {
        self.max_words_per_line
    }

    /// Split text into segments no longer than the configured word limit
    pub fn segment(&self, text: &str) -> Vec<String> {
        segmenter::segment(text, self.max_words_per_line)
    }

    /// Segment and time a transcript against `total_duration` seconds
    pub fn build(&self, transcript: &str, total_duration: f64) -> Vec<LyricLine> {
        let segments = self.segment(transcript);
        allocator::allocate(&segments, total_duration, self.seconds_per_word)
    }

    /// Segment a translation and lay it over the original timing
    pub fn build_translated(&self, translation: &str, original: &[LyricLine], target_language: &str) -> Vec<LyricLine> {
        let sentences = self.segment(translation);
        remap(&sentences, original, target_language)
    }
}
