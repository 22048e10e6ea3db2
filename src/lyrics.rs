use std::fmt;
use std::fmt::Write as _;
use serde::{Deserialize, Serialize};

// @module: Time-coded lyric lines and the processing result handed to callers

// @struct: Single time-coded caption entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    // @field: Caption text
    pub text: String,

    // @field: Start time in seconds
    #[serde(alias = "startTime")]
    pub start: f64,

    // @field: End time in seconds
    #[serde(alias = "endTime")]
    pub end: f64,

    // @field: end - start, in seconds
    #[serde(default)]
    pub duration: f64,
}

impl LyricLine {
    /// Creates a new line; `duration` is derived from the bounds
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        LyricLine {
            text: text.into(),
            start,
            end,
            duration: end - start,
        }
    }

    /// Move the end of the line and keep `duration` consistent
    pub fn set_end(&mut self, end: f64) {
        self.end = end;
        self.duration = end - self.start;
    }

    /// Recompute `duration` after deserializing a line from a service
    pub fn normalized(mut self) -> Self {
        self.duration = self.end - self.start;
        self
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether playback time `t` falls inside this line (start inclusive, end exclusive)
    pub fn is_active_at(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    /// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
    pub fn format_srt_timestamp(seconds: f64) -> String {
        let ms = seconds_to_ms(seconds);
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let secs = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
    }

    /// Format seconds as an LRC timestamp (mm:ss.xx)
    pub fn format_lrc_timestamp(seconds: f64) -> String {
        let centis = seconds_to_ms(seconds) / 10;
        let minutes = centis / 6_000;
        let secs = (centis % 6_000) / 100;
        let hundredths = centis % 100;

        format!("{:02}:{:02}.{:02}", minutes, secs, hundredths)
    }
}

impl fmt::Display for LyricLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:.2} - {:.2}] {}", self.start, self.end, self.text)
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}

/// Find the line that is active at playback time `t`
pub fn line_at(lines: &[LyricLine], t: f64) -> Option<&LyricLine> {
    lines.iter().find(|line| line.is_active_at(t))
}

/// Result of one processing job.
///
/// Serialized as camelCase JSON so it can be cached and replayed as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// Language of the original track
    pub detected_language: String,

    /// Time-coded lines in the original language
    pub original_lyrics: Vec<LyricLine>,

    /// Translated lines sharing the timing of `original_lyrics`
    pub translated_lyrics: Vec<LyricLine>,

    /// Reasoning returned by the translation model, or diagnostic detail
    #[serde(default)]
    pub analysis_text: String,

    /// Reference to the separated vocals stem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocals_ref: Option<String>,

    /// Reference to the separated instrumental stem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_ref: Option<String>,
}

impl ProcessingResult {
    /// End of the last original line, zero when there are no lines
    pub fn total_duration(&self) -> f64 {
        self.original_lyrics.last().map(|l| l.end).unwrap_or(0.0)
    }

    /// Render both tracks as one SRT file, original text above the translation
    pub fn to_srt(&self) -> String {
        let mut output = String::new();
        for (i, line) in self.original_lyrics.iter().enumerate() {
            let _ = writeln!(output, "{}", i + 1);
            let _ = writeln!(
                output,
                "{} --> {}",
                LyricLine::format_srt_timestamp(line.start),
                LyricLine::format_srt_timestamp(line.end)
            );
            let _ = writeln!(output, "{}", line.text);
            if let Some(translated) = self.translated_lyrics.get(i) {
                if translated.text != line.text {
                    let _ = writeln!(output, "{}", translated.text);
                }
            }
            let _ = writeln!(output);
        }
        output
    }

    /// Render both tracks as LRC, one `original / translation` entry per line
    pub fn to_lrc(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "[la:{}]", self.detected_language);
        for (i, line) in self.original_lyrics.iter().enumerate() {
            let stamp = LyricLine::format_lrc_timestamp(line.start);
            match self.translated_lyrics.get(i) {
                Some(translated) if translated.text != line.text => {
                    let _ = writeln!(output, "[{}]{} / {}", stamp, line.text, translated.text);
                }
                _ => {
                    let _ = writeln!(output, "[{}]{}", stamp, line.text);
                }
            }
        }
        if let Some(last) = self.original_lyrics.last() {
            let _ = writeln!(output, "[{}]", LyricLine::format_lrc_timestamp(last.end));
        }
        output
    }
}
