/*!
 * Separation of model "reasoning" from the translated text.
 *
 * Thinking-style models wrap their deliberation in a delimiter tag
 * (`<think>`, `<reasoning>`, ...) before the actual answer. The tags may be
 * mismatched or unterminated, so extraction follows an ordered set of rules:
 *
 * 1. Open and close tag with the same name: reasoning is the content between
 *    them, the clean text is everything after the close tag.
 * 2. Recognized tags that do not pair up by name (including a close tag with
 *    no opening tag): same extraction, using whatever follows the close tag.
 * 3. Open tag without any close tag: everything after the open tag is the
 *    clean text and the reasoning is left empty.
 * 4. No recognized tag: the whole input is the clean text.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Tag names recognized as reasoning delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningTag {
    Think,
    Thinking,
    Thought,
    Reasoning,
    RedactedReasoning,
}

impl ReasoningTag {
    pub const ALL: [ReasoningTag; 5] = [
        ReasoningTag::Think,
        ReasoningTag::Thinking,
        ReasoningTag::Thought,
        ReasoningTag::Reasoning,
        ReasoningTag::RedactedReasoning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReasoningTag::Think => "think",
            ReasoningTag::Thinking => "thinking",
            ReasoningTag::Thought => "thought",
            ReasoningTag::Reasoning => "reasoning",
            ReasoningTag::RedactedReasoning => "redacted_reasoning",
        }
    }

    /// Case-insensitive lookup of a tag name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

// @const: Alternation of all recognized tag names, matched ASCII case-insensitively
static TAG_NAMES: Lazy<String> = Lazy::new(|| {
    ReasoningTag::ALL
        .iter()
        .map(|tag| tag.name())
        .collect::<Vec<_>>()
        .join("|")
});

static OPEN_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"<\s*((?i-u:{}))\s*>", *TAG_NAMES)).unwrap()
});

static CLOSE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"<\s*/\s*((?i-u:{}))\s*>", *TAG_NAMES)).unwrap()
});

/// Which extraction rule produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionRule {
    MatchedPair,
    MismatchedPair,
    Unterminated,
    Untagged,
}

/// Clean text and reasoning separated from one raw model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub clean_text: String,
    pub reasoning: String,
    pub rule: ExtractionRule,
}

#[derive(Debug, Clone, Copy)]
struct TagMatch {
    tag: ReasoningTag,
    start: usize,
    end: usize,
}

fn find_tag(regex: &Regex, haystack: &str, from: usize) -> Option<TagMatch> {
    let caps = regex.captures_at(haystack, from)?;
    let whole = caps.get(0)?;
    let tag = ReasoningTag::from_name(caps.get(1)?.as_str())?;
    Some(TagMatch {
        tag,
        start: whole.start(),
        end: whole.end(),
    })
}

fn close_tags_after(haystack: &str, from: usize) -> Vec<TagMatch> {
    let mut matches = Vec::new();
    let mut cursor = from;
    while let Some(found) = find_tag(&CLOSE_TAG_REGEX, haystack, cursor) {
        cursor = found.end;
        matches.push(found);
    }
    matches
}

fn split_at_close(raw: &str, reasoning_start: usize, close: TagMatch, rule: ExtractionRule) -> ExtractionResult {
    ExtractionResult {
        clean_text: raw[close.end..].trim().to_string(),
        reasoning: raw[reasoning_start..close.start].trim().to_string(),
        rule,
    }
}

/// Split a raw model output into clean text and reasoning.
///
/// Never fails; `clean_text` is always trimmed and may be empty.
pub fn extract(raw: &str) -> ExtractionResult {
    if let Some(open) = find_tag(&OPEN_TAG_REGEX, raw, 0) {
        let closes = close_tags_after(raw, open.end);

        if let Some(close) = closes.iter().find(|c| c.tag == open.tag) {
            return split_at_close(raw, open.end, *close, ExtractionRule::MatchedPair);
        }

        if let Some(close) = closes.first() {
            return split_at_close(raw, open.end, *close, ExtractionRule::MismatchedPair);
        }

        return ExtractionResult {
            clean_text: raw[open.end..].trim().to_string(),
            reasoning: String::new(),
            rule: ExtractionRule::Unterminated,
        };
    }

    // Opening tag left in the prompt: the prefix is reasoning
    if let Some(close) = find_tag(&CLOSE_TAG_REGEX, raw, 0) {
        return split_at_close(raw, 0, close, ExtractionRule::MismatchedPair);
    }

    ExtractionResult {
        clean_text: raw.trim().to_string(),
        reasoning: String::new(),
        rule: ExtractionRule::Untagged,
    }
}
