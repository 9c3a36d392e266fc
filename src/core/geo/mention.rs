//! Literal brand-mention detection.
//!
//! This is the only ground-truth signal in the pipeline: a brand counts as
//! mentioned when its normalized name occurs inside the normalized answer.
//! Normalization keeps ASCII letters, ASCII digits and precomposed Hangul
//! syllables, then lower-cases.

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| is_kept(*c))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// True iff the normalized brand is a contiguous substring of the normalized
/// text. Empty input on either side never matches, including a brand that
/// normalizes to nothing (e.g. only punctuation).
pub fn detect(text: &str, brand: &str) -> bool {
    if text.is_empty() || brand.is_empty() {
        return false;
    }
    let brand = normalize(brand);
    if brand.is_empty() {
        return false;
    }
    normalize(text).contains(&brand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_punctuation_whitespace_and_case() {
        assert_eq!(normalize("Toss-Bank 2.0!"), "tossbank20");
        assert_eq!(normalize("토스 뱅크"), "토스뱅크");
    }

    #[test]
    fn drops_non_hangul_scripts_and_jamo() {
        assert_eq!(normalize("Café 日本 ㅋㅋ"), "caf");
    }

    #[test]
    fn detects_mixed_case_brand_in_korean_answer() {
        assert!(detect("TOSS 앱을 이용하세요", "Toss"));
        assert!(detect("간편송금은 토스가 좋아요", "토스"));
    }

    #[test]
    fn brand_spacing_is_ignored() {
        assert!(detect("카카오페이로 보내세요", "카카오 페이"));
        assert!(detect("Use Kakao-Pay today", "kakaopay"));
    }

    #[test]
    fn absent_brand_is_not_detected() {
        assert!(!detect("은행 앱으로 송금하세요", "Toss"));
    }

    #[test]
    fn empty_inputs_never_match() {
        assert!(!detect("", "Toss"));
        assert!(!detect("TOSS", ""));
        assert!(!detect("anything at all", "!!!"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(text in "\\PC*") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn embedded_brand_is_always_detected(
            prefix in "\\PC{0,20}",
            brand in "[a-zA-Z0-9가-힣]{1,8}",
            suffix in "\\PC{0,20}",
        ) {
            let text = format!("{prefix}{brand}{suffix}");
            prop_assert!(detect(&text, &brand));
        }

        #[test]
        fn detection_matches_normalized_containment(
            text in "[a-zA-Z0-9가-힣 .,!-]{0,30}",
            brand in "[a-zA-Z0-9가-힣 ]{1,6}",
        ) {
            let expected = {
                let b = normalize(&brand);
                !text.is_empty() && !b.is_empty() && normalize(&text).contains(&b)
            };
            prop_assert_eq!(detect(&text, &brand), expected);
        }
    }
}
