use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{GeoError, GeoResult};
use crate::core::geo::decode::decode_json;
use crate::core::geo::mention;
use crate::core::geo::prompts;
use crate::core::llm::{ResponseFormat, StructuredLlm};

const STAGE: &str = "scenario";

/// Strategy rationale plus the test questions for one diagnostic run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub strategy: String,
    pub queries: Vec<String>,
}

pub struct ScenarioGenerator {
    analyst: Arc<dyn StructuredLlm>,
    query_count: usize,
}

impl ScenarioGenerator {
    pub fn new(analyst: Arc<dyn StructuredLlm>, query_count: usize) -> Self {
        Self {
            analyst,
            query_count: query_count.max(1),
        }
    }

    pub async fn generate(&self, brand: &str, keyword: &str) -> GeoResult<ScenarioSet> {
        info!("Designing {} test questions for [{}]", self.query_count, brand);
        let prompt = prompts::scenario_prompt(brand, keyword, self.query_count);
        let raw = self
            .analyst
            .instruct(&prompt, ResponseFormat::JsonObject)
            .await?;
        let scenario = parse_scenario(&raw, brand)?;
        if scenario.queries.len() != self.query_count {
            warn!(
                "Scenario returned {} questions, requested {}",
                scenario.queries.len(),
                self.query_count
            );
        }
        Ok(scenario)
    }
}

/// Decode and validate a scenario payload. Questions must be non-blank and
/// must not name the brand.
pub(crate) fn parse_scenario(raw: &str, brand: &str) -> GeoResult<ScenarioSet> {
    let mut scenario: ScenarioSet = decode_json(STAGE, raw)?;
    scenario.strategy = scenario.strategy.trim().to_string();
    scenario.queries = scenario
        .queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .collect();

    if scenario.queries.is_empty() {
        return Err(GeoError::malformed(STAGE, "queries is empty"));
    }
    if let Some(i) = scenario.queries.iter().position(|q| q.is_empty()) {
        return Err(GeoError::malformed(STAGE, format!("query {} is blank", i + 1)));
    }
    if let Some(i) = scenario
        .queries
        .iter()
        .position(|q| mention::detect(q, brand))
    {
        return Err(GeoError::malformed(
            STAGE,
            format!("query {} names the brand", i + 1),
        ));
    }
    Ok(scenario)
}
