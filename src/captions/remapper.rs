use crate::lyrics::LyricLine;

/// Text shown for an original line that has no translated counterpart
pub fn placeholder_for(target_language: &str) -> String {
    format!("[{} translation unavailable]", target_language)
}

/// Lay translated sentences over the timing of the original lines.
///
/// Line `i` of the result copies the bounds of `original[i]` and takes
/// `translated[i]` as text, or the placeholder when the translation ran out.
/// Translated sentences beyond `original.len()` have no slot and are dropped.
pub fn remap(translated: &[String], original: &[LyricLine], target_language: &str) -> Vec<LyricLine> {
    original
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let text = translated
                .get(i)
                .cloned()
                .unwrap_or_else(|| placeholder_for(target_language));
            LyricLine {
                text,
                start: line.start,
                end: line.end,
                duration: line.duration,
            }
        })
        .collect()
}
