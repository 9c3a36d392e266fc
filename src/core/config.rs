//! Process configuration: optional TOML file, then environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CONTENT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CONTENT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_MAX_CONCURRENCY: usize = 6;
pub const DEFAULT_QUERY_COUNT: usize = 3;

/// Chat-completion engine. `base_url` is the API root, without
/// `/chat/completions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

/// Generative-content engine. `base_url` is the API root the model path is
/// appended to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_CONTENT_BASE_URL.to_string(),
            model: DEFAULT_CONTENT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub chat: ChatConfig,
    pub content: ContentConfig,
    pub max_concurrency: usize,
    pub query_count: usize,
    pub request_timeout_secs: u64,
    /// Extra attempts for scenario generation and report synthesis.
    pub retries: u32,
    pub database_path: PathBuf,
    pub log_level: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            chat: ChatConfig::default(),
            content: ContentConfig::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            query_count: DEFAULT_QUERY_COUNT,
            request_timeout_secs: 60,
            retries: 0,
            database_path: data_dir().join("inquiries.db"),
            log_level: "info".to_string(),
        }
    }
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("geoprobe")
}

impl GeoConfig {
    /// Resolve configuration for this process. `.env` is loaded first so its
    /// values take part in the environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let default_path = data_dir().join("geoprobe.toml");
        let path = match explicit_path {
            Some(p) => Some(p.to_path_buf()),
            None if default_path.exists() => Some(default_path),
            None => None,
        };

        let mut config = match path {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config.normalized())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: GeoConfig = toml::from_str(raw)?;
        Ok(config.normalized())
    }

    /// Apply environment overrides through `lookup` so tests can supply a map
    /// instead of touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPENAI_API_KEY") {
            self.chat.api_key = Some(v);
        }
        if let Some(v) = get("GOOGLE_API_KEY") {
            self.content.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.chat.base_url = v;
        }
        if let Some(v) = get("GEMINI_BASE_URL") {
            self.content.base_url = v;
        }
        if let Some(v) = get("GEOPROBE_CHAT_MODEL") {
            self.chat.model = v;
        }
        if let Some(v) = get("GEOPROBE_CONTENT_MODEL") {
            self.content.model = v;
        }
        if let Some(v) = get("GEOPROBE_MAX_CONCURRENCY").and_then(|v| v.parse().ok()) {
            self.max_concurrency = v;
        }
        if let Some(v) = get("GEOPROBE_QUERY_COUNT").and_then(|v| v.parse().ok()) {
            self.query_count = v;
        }
        if let Some(v) = get("GEOPROBE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = v;
        }
        if let Some(v) = get("GEOPROBE_RETRIES").and_then(|v| v.parse().ok()) {
            self.retries = v;
        }
        if let Some(v) = get("GEOPROBE_DB") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = get("GEOPROBE_LOG") {
            self.log_level = v;
        }
    }

    fn normalized(mut self) -> Self {
        self.chat.api_key = self.chat.api_key.filter(|k| !k.trim().is_empty());
        self.content.api_key = self.content.api_key.filter(|k| !k.trim().is_empty());
        self.max_concurrency = self.max_concurrency.max(1);
        self.query_count = self.query_count.max(1);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
