/*!
 * Tests for language hint resolution
 */

use bilyric::language_utils::{display_name, languages_match, resolve_language, short_code, validate_language};

#[test]
fn test_resolve_language_withCodesAndNames_shouldAgree() {
    let from_name = resolve_language("Spanish").unwrap();
    assert_eq!(resolve_language("es").unwrap(), from_name);
    assert_eq!(resolve_language("spa").unwrap(), from_name);
    assert_eq!(resolve_language("ES").unwrap(), from_name);
}

#[test]
fn test_resolve_language_withBibliographicCode_shouldMapToTerminologyCode() {
    assert_eq!(resolve_language("ger").unwrap(), resolve_language("deu").unwrap());
    assert_eq!(resolve_language("fre").unwrap(), resolve_language("fr").unwrap());
}

#[test]
fn test_resolve_language_withQualifiedName_shouldUseBaseName() {
    assert_eq!(resolve_language("Chinese (Mandarin)").unwrap(), resolve_language("zh").unwrap());
}

#[test]
fn test_resolve_language_withLowercaseName_shouldCapitalize() {
    assert_eq!(resolve_language("french").unwrap(), resolve_language("fr").unwrap());
}

#[test]
fn test_validate_language_withGarbage_shouldFail() {
    assert!(validate_language("").is_err());
    assert!(validate_language("not a language").is_err());
    assert!(validate_language("Japanese").is_ok());
}

#[test]
fn test_languages_match_withEquivalentHints_shouldMatch() {
    assert!(languages_match("English", "en"));
    assert!(languages_match("eng", "English"));
    assert!(!languages_match("English", "Spanish"));
    // Unresolvable hints fall back to a plain comparison
    assert!(languages_match("Klingon-ish", "klingon-ish"));
}

#[test]
fn test_display_name_shouldPreferEnglishName() {
    assert_eq!(display_name("de"), "German");
    assert_eq!(display_name("Elvish"), "Elvish");
}

#[test]
fn test_short_code_shouldPreferTwoLetterCode() {
    assert_eq!(short_code("Spanish").unwrap(), "es");
    assert_eq!(short_code("deu").unwrap(), "de");
    assert!(short_code("not a language").is_err());
}
