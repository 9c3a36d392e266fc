use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{GeoError, GeoResult};
use crate::core::llm::{EngineId, LlmProvider, ResponseFormat, StructuredLlm};

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAiResponseFormat>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAiResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessageOwned,
}

#[derive(Deserialize)]
struct OpenAiMessageOwned {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion backend. Serves both as the GPT answer engine and as the
/// analyst for every structured call.
pub struct OpenAiProvider {
    api_key: String,
    endpoint: String,
    model: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: &str, model: &str, timeout: Duration) -> GeoResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeoError::transport(EngineId::Gpt, e))?;
        Ok(Self {
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            client,
        })
    }

    async fn complete(
        &self,
        role: &str,
        content: &str,
        format: ResponseFormat,
    ) -> GeoResult<String> {
        let req = OpenAiRequest {
            model: &self.model,
            messages: vec![OpenAiMessage { role, content }],
            response_format: match format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(OpenAiResponseFormat {
                    kind: "json_object",
                }),
            },
        };

        let res = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await
            .map_err(|e| GeoError::transport(EngineId::Gpt, e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(GeoError::generation(
                EngineId::Gpt,
                format!(
                    "OpenAI API error {}: {}",
                    status,
                    res.text().await.unwrap_or_default()
                ),
            ));
        }

        let parsed: OpenAiResponse = res
            .json()
            .await
            .map_err(|e| GeoError::transport(EngineId::Gpt, e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GeoError::generation(EngineId::Gpt, "response contained no choices"))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn engine(&self) -> EngineId {
        EngineId::Gpt
    }

    async fn generate(&self, prompt: &str) -> GeoResult<String> {
        self.complete("user", prompt, ResponseFormat::Text).await
    }
}

#[async_trait]
impl StructuredLlm for OpenAiProvider {
    async fn instruct(&self, instruction: &str, format: ResponseFormat) -> GeoResult<String> {
        self.complete("system", instruction, format).await
    }
}
