pub mod providers;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::core::config::GeoConfig;
use crate::core::error::{GeoError, GeoResult};
use providers::{GeminiProvider, OpenAiProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EngineId {
    #[serde(rename = "GPT")]
    Gpt,
    #[serde(rename = "Gemini")]
    Gemini,
}

impl EngineId {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineId::Gpt => "GPT",
            EngineId::Gemini => "Gemini",
        }
    }

    /// Human-facing name used by the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            EngineId::Gpt => "ChatGPT",
            EngineId::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// A model backend that answers a searcher-style question.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn engine(&self) -> EngineId;

    /// False when the backend cannot be called at all (e.g. no credential).
    /// Callers check this before `generate` and treat `false` as a skip.
    fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> GeoResult<String>;
}

/// The analyst backend: single-shot instruction calls used for scenario
/// design, fit scoring and report writing.
#[async_trait]
pub trait StructuredLlm: Send + Sync {
    async fn instruct(&self, instruction: &str, format: ResponseFormat) -> GeoResult<String>;
}

/// Registered answer engines in display order. Read-only once built and
/// shared by every analysis task.
pub struct EngineRegistry {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) {
        info!(
            "Registered answer engine: {} (available: {})",
            provider.engine(),
            provider.is_available()
        );
        self.providers.push(provider);
    }

    pub fn get(&self, engine: EngineId) -> Option<&Arc<dyn LlmProvider>> {
        self.providers.iter().find(|p| p.engine() == engine)
    }

    pub fn engines(&self) -> Vec<EngineId> {
        self.providers.iter().map(|p| p.engine()).collect()
    }

    pub fn available_engines(&self) -> Vec<EngineId> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.engine())
            .collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Backends resolved from configuration: the answer engines plus the analyst
/// used for every structured call.
pub struct Backends {
    pub engines: Arc<EngineRegistry>,
    pub analyst: Arc<dyn StructuredLlm>,
}

/// Build both adapters. A missing chat credential is fatal; a missing content
/// credential only marks that engine unavailable.
pub fn build_backends(config: &GeoConfig) -> GeoResult<Backends> {
    let chat_key = config
        .chat
        .api_key
        .clone()
        .ok_or(GeoError::CredentialMissing {
            engine: EngineId::Gpt,
            var: "OPENAI_API_KEY",
        })?;

    let openai = Arc::new(OpenAiProvider::new(
        chat_key,
        &config.chat.base_url,
        &config.chat.model,
        config.request_timeout(),
    )?);
    let gemini = Arc::new(GeminiProvider::new(
        config.content.api_key.clone(),
        &config.content.base_url,
        &config.content.model,
        config.request_timeout(),
    )?);

    let mut registry = EngineRegistry::new();
    registry.register(openai.clone());
    registry.register(gemini);

    Ok(Backends {
        engines: Arc::new(registry),
        analyst: openai,
    })
}
