//! Error taxonomy for the diagnostic core.

use crate::core::llm::EngineId;

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// A backend credential was not configured. Fatal for the chat engine,
    /// surfaced as an availability flag for the content engine.
    #[error("{engine} credential missing: set {var}")]
    CredentialMissing { engine: EngineId, var: &'static str },

    /// A structured-output call returned content that does not decode into the
    /// expected shape.
    #[error("malformed {stage} response: {message}")]
    MalformedResponse { stage: &'static str, message: String },

    /// Transport, quota or timeout error from a model call.
    #[error("{engine} generation failed: {message}")]
    GenerationFailure { engine: EngineId, message: String },

    #[error("failed to persist inquiry: {0}")]
    PersistenceFailure(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl GeoError {
    pub fn malformed(stage: &'static str, message: impl Into<String>) -> Self {
        GeoError::MalformedResponse {
            stage,
            message: message.into(),
        }
    }

    pub fn generation(engine: EngineId, message: impl Into<String>) -> Self {
        GeoError::GenerationFailure {
            engine,
            message: message.into(),
        }
    }

    /// Map a reqwest error onto the taxonomy. The request URL is dropped
    /// before formatting; timeouts keep their own wording.
    pub fn transport(engine: EngineId, err: reqwest::Error) -> Self {
        let err = err.without_url();
        let message = if err.is_timeout() {
            format!("request timed out ({})", err)
        } else {
            err.to_string()
        };
        GeoError::GenerationFailure { engine, message }
    }
}

impl From<rusqlite::Error> for GeoError {
    fn from(err: rusqlite::Error) -> Self {
        GeoError::PersistenceFailure(err.to_string())
    }
}

pub type GeoResult<T> = Result<T, GeoError>;
