/*!
 * Tests for language code utilities
 */

use exbtsv::app_config::LanguageCodeStyle;
use exbtsv::language_utils::{format_language_code, normalize_to_part1_or_part2t, normalize_to_part2t};

/// Test normalisation to three-letter codes
#[test]
fn test_normalize_to_part2t_withMixedCodes_shouldReturnTerminologicalCode() {
    assert_eq!(normalize_to_part2t("de").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t(" ENG ").unwrap(), "eng");
    assert!(normalize_to_part2t("xx").is_err());
}

/// Test normalisation to two-letter codes
#[test]
fn test_normalize_to_part1_withMixedCodes_shouldPreferTwoLetters() {
    assert_eq!(normalize_to_part1_or_part2t("deu").unwrap(), "de");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("en").unwrap(), "en");
    assert!(normalize_to_part1_or_part2t("german").is_err());
}

/// Test output formatting keeps unknown codes as declared
#[test]
fn test_format_language_code_withStyles_shouldFallBackToDeclared() {
    assert_eq!(format_language_code("ger", LanguageCodeStyle::AsDeclared), "ger");
    assert_eq!(format_language_code("ger", LanguageCodeStyle::Part1), "de");
    assert_eq!(format_language_code("de", LanguageCodeStyle::Part2t), "deu");
    assert_eq!(format_language_code("Kiezdeutsch", LanguageCodeStyle::Part2t), "Kiezdeutsch");
}
