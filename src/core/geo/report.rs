use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{GeoError, GeoResult};
use crate::core::geo::analysis::AnalysisResult;
use crate::core::geo::prompts;
use crate::core::llm::{ResponseFormat, StructuredLlm};

const STAGE: &str = "report";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub markdown: String,
}

pub struct ReportSynthesizer {
    analyst: Arc<dyn StructuredLlm>,
}

impl ReportSynthesizer {
    pub fn new(analyst: Arc<dyn StructuredLlm>) -> Self {
        Self { analyst }
    }

    /// Reduce the whole result set, failures included, into a markdown report.
    /// The returned prose is passed through verbatim apart from trimming.
    pub async fn synthesize(&self, brand: &str, results: &[AnalysisResult]) -> GeoResult<Report> {
        info!("Synthesizing report for [{}] from {} results", brand, results.len());
        let data = serde_json::to_string(results)
            .map_err(|e| GeoError::malformed(STAGE, format!("cannot encode results: {}", e)))?;
        let text = self
            .analyst
            .instruct(&prompts::report_prompt(brand, &data), ResponseFormat::Text)
            .await?;
        let markdown = text.trim();
        if markdown.is_empty() {
            return Err(GeoError::malformed(STAGE, "report text is empty"));
        }
        Ok(Report {
            markdown: markdown.to_string(),
        })
    }
}
