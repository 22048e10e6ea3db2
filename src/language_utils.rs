use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for language hints
///
/// Hints arrive either as English names ("Spanish", "Chinese (Mandarin)") or as
/// ISO 639-1 / ISO 639-2 codes ("es", "spa", "ger"). This module resolves both
/// forms to one `isolang::Language` so hints can be compared and displayed.
/// ISO 639-2/B codes that differ from their ISO 639-2/T form
const BIBLIOGRAPHIC_CODES: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Resolve a language name or code to an ISO language
pub fn resolve_language(hint: &str) -> Result<Language> {
    let trimmed = hint.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty language hint"));
    }
    let lowered = trimmed.to_lowercase();

    if lowered.len() == 2 {
        if let Some(lang) = Language::from_639_1(&lowered) {
            return Ok(lang);
        }
    } else if lowered.len() == 3 {
        let part2t = BIBLIOGRAPHIC_CODES
            .iter()
            .find(|(b, _)| *b == lowered)
            .map(|(_, t)| *t)
            .unwrap_or(&lowered);
        if let Some(lang) = Language::from_639_3(part2t) {
            return Ok(lang);
        }
    }

    // Names, with qualifiers such as "Chinese (Mandarin)" reduced to the base name
    let base_name = trimmed.split('(').next().unwrap_or(trimmed).trim();
    Language::from_name(base_name)
        .or_else(|| Language::from_name(&capitalize(base_name)))
        .ok_or_else(|| anyhow!("Unknown language: {}", hint))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Check if a language hint can be resolved
pub fn validate_language(hint: &str) -> Result<()> {
    resolve_language(hint).map(|_| ())
}

/// Check if two hints name the same language
pub fn languages_match(hint1: &str, hint2: &str) -> bool {
    match (resolve_language(hint1), resolve_language(hint2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => hint1.trim().eq_ignore_ascii_case(hint2.trim()),
    }
}

/// English display name for a hint, or the hint itself when it is not resolvable
pub fn display_name(hint: &str) -> String {
    match resolve_language(hint) {
        Ok(lang) => lang.to_name().to_string(),
        Err(_) => hint.trim().to_string(),
    }
}

/// ISO 639-1 code when one exists, ISO 639-3 otherwise
pub fn short_code(hint: &str) -> Result<String> {
    let lang = resolve_language(hint)?;
    Ok(lang
        .to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}
