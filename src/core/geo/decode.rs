//! Typed decoding of structured model output.

use serde::de::DeserializeOwned;

use crate::core::error::{GeoError, GeoResult};

/// Locate the JSON object in model output. Fenced blocks win (with or
/// without a language tag); otherwise the span from the first `{` to the last
/// `}` is taken, so prose around the object is ignored.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    fenced_blocks(text)
        .find(|block| block.starts_with('{'))
        .or_else(|| brace_span(text))
}

fn fenced_blocks(text: &str) -> impl Iterator<Item = &str> {
    text.split("```").skip(1).step_by(2).map(|block| {
        let body = match block.split_once('\n') {
            Some((tag, rest)) if !tag.trim_start().starts_with('{') => rest,
            _ => block,
        };
        body.trim()
    })
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Decode `text` into `T`, failing with `MalformedResponse` tagged by `stage`
/// when no JSON is present or required keys/types are wrong.
pub(crate) fn decode_json<T: DeserializeOwned>(stage: &'static str, text: &str) -> GeoResult<T> {
    let block = extract_json_object(text)
        .ok_or_else(|| GeoError::malformed(stage, "no JSON object in response"))?;
    serde_json::from_str::<T>(block).map_err(|e| GeoError::malformed(stage, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Scored {
        value: u32,
    }

    #[test]
    fn tagged_fence_wins_over_surrounding_prose() {
        let out = "Sure {see below}:\n```json\n{\"value\": 3}\n```\nbye";
        assert_eq!(extract_json_object(out), Some("{\"value\": 3}"));
    }

    #[test]
    fn bare_fence_is_accepted() {
        let out = "```\n{\"value\": 4}\n```";
        assert_eq!(extract_json_object(out), Some("{\"value\": 4}"));
    }

    #[test]
    fn non_json_fence_is_skipped() {
        let out = "```text\nnotes\n```\n```JSON\n{\"value\": 5}\n```";
        assert_eq!(extract_json_object(out), Some("{\"value\": 5}"));
    }

    #[test]
    fn object_inside_prose_is_found() {
        let out = "분석 결과입니다: {\"value\": 1} 참고하세요.";
        assert_eq!(extract_json_object(out), Some("{\"value\": 1}"));
        assert_eq!(extract_json_object("  {\"value\": 2} "), Some("{\"value\": 2}"));
    }

    #[test]
    fn plain_text_has_no_object() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(extract_json_object("").is_none());
    }

    #[test]
    fn decode_reports_stage_on_missing_key() {
        let err = decode_json::<Scored>("scenario", "{\"other\": 1}").unwrap_err();
        match err {
            GeoError::MalformedResponse { stage, message } => {
                assert_eq!(stage, "scenario");
                assert!(message.contains("value"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_accepts_valid_payload() {
        let scored: Scored = decode_json("fit", "```json\n{\"value\": 7}\n```").unwrap();
        assert_eq!(scored.value, 7);
    }
}
