/*!
 * Sentence segmentation of flat transcripts.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest line, in words, the segmenter will emit by default
pub const DEFAULT_MAX_WORDS_PER_LINE: usize = 12;

static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());

/// Collapse newline runs to single spaces and trim
pub fn normalize_transcript(text: &str) -> String {
    NEWLINE_RUNS.replace_all(text, " ").trim().to_string()
}

/// Split text into sentences after `.`, `!` or `?` followed by whitespace.
///
/// Pieces are trimmed and empty pieces dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = normalize_transcript(text);
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = normalized.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|next| next.is_whitespace());
        if at_boundary {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Break one over-long sentence into parts of at most `max_words` words.
///
/// Comma boundaries are preferred; when any comma part is still too long the
/// sentence is chunked into groups of exactly `max_words` words instead.
pub fn split_long_sentence(sentence: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    if word_count(sentence) <= max_words {
        return vec![sentence.to_string()];
    }

    let comma_parts: Vec<String> = sentence
        .split(", ")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();

    if comma_parts.iter().all(|part| word_count(part) <= max_words) {
        return comma_parts;
    }

    let words: Vec<&str> = sentence.split_whitespace().collect();
    words.chunks(max_words).map(|chunk| chunk.join(" ")).collect()
}

/// Full segmentation: sentences, then long sentences broken down
pub fn segment(text: &str, max_words: usize) -> Vec<String> {
    split_sentences(text)
        .iter()
        .flat_map(|sentence| split_long_sentence(sentence, max_words))
        .collect()
}
