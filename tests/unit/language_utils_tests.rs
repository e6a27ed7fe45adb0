/*!
 * Tests for language code utilities
 */

use dualsub::language_utils::{
    LanguageCodeType, get_language_name, language_codes_match, normalize_to_part1_or_part2t,
    normalize_to_part2t, primary_subtag, validate_language_code,
};

#[test]
fn test_validate_language_code_withKnownCodes_shouldReportType() {
    assert_eq!(validate_language_code("en").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("FR").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("deu").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B);
    assert_eq!(validate_language_code("pt-BR").unwrap(), LanguageCodeType::Part1);
}

#[test]
fn test_validate_language_code_withInvalidCodes_shouldFail() {
    assert!(validate_language_code("").is_err());
    assert!(validate_language_code("zz").is_err());
    assert!(validate_language_code("english").is_err());
}

#[test]
fn test_primary_subtag_shouldStripRegion() {
    assert_eq!(primary_subtag("pt-BR"), "pt");
    assert_eq!(primary_subtag("zh_Hant"), "zh");
    assert_eq!(primary_subtag(" es "), "es");
}

#[test]
fn test_normalize_withVariousForms_shouldConverge() {
    assert_eq!(normalize_to_part2t("es").unwrap(), "spa");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("pt-BR").unwrap(), "por");
    assert_eq!(normalize_to_part1_or_part2t("fra").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert!(normalize_to_part2t("xx").is_err());
}

#[test]
fn test_language_codes_match_shouldCompareNormalizedForms() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("de", "ger"));
    assert!(language_codes_match("pt-BR", "pt"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "xx"));
}

#[test]
fn test_get_language_name_shouldReturnEnglishName() {
    assert_eq!(get_language_name("es").unwrap(), "Spanish");
    assert_eq!(get_language_name("jpn").unwrap(), "Japanese");
    assert!(get_language_name("qq").is_err());
}
