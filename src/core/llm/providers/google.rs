use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{GeoError, GeoResult};
use crate::core::llm::{EngineId, LlmProvider};

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResContent>,
}

#[derive(Deserialize)]
struct GeminiResContent {
    #[serde(default)]
    parts: Vec<GeminiResPart>,
}

#[derive(Deserialize)]
struct GeminiResPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// Text of the first candidate with all of its parts joined.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Generative-content backend. Optional: without a credential it reports
/// itself unavailable instead of failing construction.
pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    model: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> GeoResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeoError::transport(EngineId::Gemini, e))?;
        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    /// The key goes in the `x-goog-api-key` header, never in the URL.
    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn engine(&self) -> EngineId {
        EngineId::Gemini
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> GeoResult<String> {
        let api_key = self.api_key.as_deref().ok_or(GeoError::CredentialMissing {
            engine: EngineId::Gemini,
            var: "GOOGLE_API_KEY",
        })?;

        let req = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
        };
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| GeoError::transport(EngineId::Gemini, e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(GeoError::generation(
                EngineId::Gemini,
                format!(
                    "Google Gemini API error {}: {}",
                    status,
                    res.text().await.unwrap_or_default()
                ),
            ));
        }

        let parsed: GeminiResponse = res
            .json()
            .await
            .map_err(|e| GeoError::transport(EngineId::Gemini, e))?;
        parsed
            .into_text()
            .ok_or_else(|| GeoError::generation(EngineId::Gemini, "response contained no text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(key: Option<&str>) -> GeminiProvider {
        GeminiProvider::new(
            key.map(str::to_string),
            "https://example.test/v1beta/",
            "gemini-3-flash-preview",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn availability_follows_credential() {
        assert!(provider(Some("g-key")).is_available());
        assert!(!provider(None).is_available());
        assert!(!provider(Some("   ")).is_available());
    }

    #[tokio::test]
    async fn generate_without_credential_reports_missing_key() {
        let err = provider(None).generate("hello").await.unwrap_err();
        assert!(matches!(
            err,
            GeoError::CredentialMissing {
                engine: EngineId::Gemini,
                ..
            }
        ));
    }

    #[test]
    fn endpoint_strips_trailing_slash_and_carries_no_key() {
        assert_eq!(
            provider(Some("k")).endpoint(),
            "https://example.test/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_api_key() {
        let provider = GeminiProvider::new(
            Some("SECRET-GOOGLE-KEY".to_string()),
            "http://127.0.0.1:1/v1beta",
            "m",
            Duration::from_secs(5),
        )
        .unwrap();

        let err = provider.generate("hello").await.unwrap_err();
        assert!(matches!(err, GeoError::GenerationFailure { .. }));
        assert!(!err.to_string().contains("SECRET-GOOGLE-KEY"), "{err}");
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let parsed: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"TOSS "},{"text":"앱"}]}},{"content":{"parts":[{"text":"other"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("TOSS 앱"));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let parsed: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(parsed.into_text().is_none());
    }
}
