//! One (engine, question) unit of work: ask the engine, check the answer for
//! the brand, score topical fit.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::core::error::GeoResult;
use crate::core::geo::decode::decode_json;
use crate::core::geo::{mention, prompts};
use crate::core::llm::{EngineId, EngineRegistry, ResponseFormat, StructuredLlm};

const STAGE: &str = "fit";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisTask {
    pub engine: EngineId,
    pub question_index: usize,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionAnalysis {
    /// Always the deterministic detector's verdict.
    pub mentioned: bool,
    pub solution_fit: u8,
    pub fit_reason: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Answered {
        raw_text: String,
        mention: MentionAnalysis,
    },
    /// The engine was unavailable before any call was made.
    Skipped,
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub question_index: usize,
    pub engine: EngineId,
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
}

impl AnalysisResult {
    pub fn failed(engine: EngineId, question_index: usize, error: impl Into<String>) -> Self {
        Self {
            question_index,
            engine,
            outcome: AnalysisOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, AnalysisOutcome::Skipped)
    }

    pub fn mention(&self) -> Option<&MentionAnalysis> {
        match &self.outcome {
            AnalysisOutcome::Answered { mention, .. } => Some(mention),
            _ => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match &self.outcome {
            AnalysisOutcome::Answered { raw_text, .. } => Some(raw_text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            AnalysisOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Fit score as proposed by the analyst. `mentioned` is advisory and never
/// reaches the result.
#[derive(Debug, Deserialize)]
pub(crate) struct FitScore {
    #[serde(default)]
    pub mentioned: Option<bool>,
    #[serde(deserialize_with = "fit_in_range")]
    pub solution_fit: u8,
    pub fit_reason: String,
    pub summary: String,
}

/// Accepts `7`, `7.0` or `"7"`; rejects anything outside 1..=10.
fn fit_in_range<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match &value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match number {
        Some(n @ 1..=10) => Ok(n as u8),
        _ => Err(D::Error::custom(format!(
            "solution_fit must be an integer 1..=10, got {}",
            value
        ))),
    }
}

pub(crate) fn parse_fit(raw: &str) -> GeoResult<FitScore> {
    decode_json(STAGE, raw)
}

impl AnalysisTask {
    pub fn new(engine: EngineId, question_index: usize, question: impl Into<String>) -> Self {
        Self {
            engine,
            question_index,
            question: question.into(),
        }
    }

    /// Run the task to a typed outcome. Never returns an error: every failure
    /// becomes `AnalysisOutcome::Failed` so sibling tasks are unaffected.
    pub async fn run(
        self,
        engines: &EngineRegistry,
        analyst: &dyn StructuredLlm,
        brand: &str,
    ) -> AnalysisResult {
        let outcome = match self.execute(engines, analyst, brand).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    "Analysis failed for {} question {}: {}",
                    self.engine,
                    self.question_index + 1,
                    e
                );
                AnalysisOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        AnalysisResult {
            question_index: self.question_index,
            engine: self.engine,
            outcome,
        }
    }

    async fn execute(
        &self,
        engines: &EngineRegistry,
        analyst: &dyn StructuredLlm,
        brand: &str,
    ) -> GeoResult<AnalysisOutcome> {
        let Some(provider) = engines.get(self.engine).filter(|p| p.is_available()) else {
            debug!(
                "Skipping {} question {}: engine unavailable",
                self.engine,
                self.question_index + 1
            );
            return Ok(AnalysisOutcome::Skipped);
        };

        let raw_text = provider.generate(&self.question).await?;
        let mentioned = mention::detect(&raw_text, brand);

        let prompt = prompts::fit_prompt(brand, &raw_text, mentioned);
        let scored = analyst.instruct(&prompt, ResponseFormat::JsonObject).await?;
        let fit = parse_fit(&scored)?;

        if let Some(proposed) = fit.mentioned
            && proposed != mentioned
        {
            debug!(
                "Analyst proposed mentioned={} for {} question {}, detector says {}",
                proposed,
                self.engine,
                self.question_index + 1,
                mentioned
            );
        }

        Ok(AnalysisOutcome::Answered {
            raw_text,
            mention: MentionAnalysis {
                mentioned,
                solution_fit: fit.solution_fit,
                fit_reason: fit.fit_reason,
                summary: fit.summary,
            },
        })
    }
}
