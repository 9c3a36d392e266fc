//! End-to-end diagnostic run: scenario → batch → report, returned as an
//! explicit value. Nothing is retained between runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::info;
use uuid::Uuid;

use crate::core::config::GeoConfig;
use crate::core::error::{GeoError, GeoResult};
use crate::core::geo::analysis::{AnalysisResult, AnalysisTask};
use crate::core::geo::report::{Report, ReportSynthesizer};
use crate::core::geo::retry::with_retry;
use crate::core::geo::scenario::{ScenarioGenerator, ScenarioSet};
use crate::core::geo::scheduler::Scheduler;
use crate::core::llm::{Backends, EngineId, EngineRegistry, StructuredLlm};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRequest {
    pub brand: String,
    pub keyword: String,
}

impl DiagnosticRequest {
    pub fn new(brand: &str, keyword: &str) -> GeoResult<Self> {
        let brand = brand.trim();
        let keyword = keyword.trim();
        if brand.is_empty() {
            return Err(GeoError::InvalidInput("brand is required".into()));
        }
        if keyword.is_empty() {
            return Err(GeoError::InvalidInput("keyword is required".into()));
        }
        Ok(Self {
            brand: brand.to_string(),
            keyword: keyword.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSummary {
    pub engine: EngineId,
    pub answered: usize,
    pub failed: usize,
    pub mentioned: usize,
    /// Mean solution fit over answered slots; absent when nothing answered.
    pub mean_fit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub engines: Vec<EngineSummary>,
    /// Mentioned / answered across all engines, 0.0 when nothing answered.
    pub mention_rate: f64,
}

impl RunSummary {
    pub fn from_results(engines: &[EngineId], results: &[AnalysisResult]) -> Self {
        let per_engine: Vec<EngineSummary> = engines
            .iter()
            .map(|&engine| {
                let mine = results.iter().filter(|r| r.engine == engine);
                let mut summary = EngineSummary {
                    engine,
                    answered: 0,
                    failed: 0,
                    mentioned: 0,
                    mean_fit: None,
                };
                let mut fit_total = 0u32;
                for r in mine {
                    if let Some(m) = r.mention() {
                        summary.answered += 1;
                        fit_total += u32::from(m.solution_fit);
                        if m.mentioned {
                            summary.mentioned += 1;
                        }
                    } else if r.error().is_some() {
                        summary.failed += 1;
                    }
                }
                if summary.answered > 0 {
                    summary.mean_fit = Some(f64::from(fit_total) / summary.answered as f64);
                }
                summary
            })
            .collect();

        let answered: usize = per_engine.iter().map(|e| e.answered).sum();
        let mentioned: usize = per_engine.iter().map(|e| e.mentioned).sum();
        let mention_rate = if answered == 0 {
            0.0
        } else {
            mentioned as f64 / answered as f64
        };
        Self {
            engines: per_engine,
            mention_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRun {
    pub run_id: Uuid,
    pub brand: String,
    pub keyword: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scenario: ScenarioSet,
    /// Slots expected to produce a result, in matrix order.
    pub slots: Vec<AnalysisTask>,
    /// Results in completion order.
    pub results: Vec<AnalysisResult>,
    pub summary: RunSummary,
    pub report: Report,
}

impl DiagnosticRun {
    /// Results keyed back into slot order for display.
    pub fn ordered_results(&self) -> Vec<&AnalysisResult> {
        let mut ordered: Vec<&AnalysisResult> = self.results.iter().collect();
        ordered.sort_by_key(|r| (r.question_index, r.engine.as_str()));
        ordered
    }
}

/// Incremental progress for presentation layers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Scenario {
        run_id: Uuid,
        scenario: ScenarioSet,
        slots: Vec<AnalysisTask>,
    },
    Result {
        result: AnalysisResult,
    },
    Report {
        report: Report,
    },
}

pub struct Diagnostician {
    engines: Arc<EngineRegistry>,
    scenario: ScenarioGenerator,
    scheduler: Scheduler,
    reporter: ReportSynthesizer,
    retries: u32,
}

impl Diagnostician {
    pub fn new(
        engines: Arc<EngineRegistry>,
        analyst: Arc<dyn StructuredLlm>,
        query_count: usize,
        max_concurrency: usize,
        retries: u32,
    ) -> Self {
        Self {
            scenario: ScenarioGenerator::new(analyst.clone(), query_count),
            scheduler: Scheduler::new(engines.clone(), analyst.clone(), max_concurrency),
            reporter: ReportSynthesizer::new(analyst),
            engines,
            retries,
        }
    }

    pub fn from_config(backends: Backends, config: &GeoConfig) -> Self {
        Self::new(
            backends.engines,
            backends.analyst,
            config.query_count,
            config.max_concurrency,
            config.retries,
        )
    }

    /// Run one diagnosis. Scenario and report failures abort the run; per-slot
    /// failures are carried inside `results`.
    pub async fn run(
        &self,
        request: &DiagnosticRequest,
        events: Option<mpsc::Sender<RunEvent>>,
    ) -> GeoResult<DiagnosticRun> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let brand = request.brand.as_str();
        info!("Run {} started for [{}] / [{}]", run_id, brand, request.keyword);

        let scenario = with_retry(self.retries, "scenario generation", || {
            self.scenario.generate(brand, &request.keyword)
        })
        .await?;
        let slots = self.scheduler.slots(&scenario);
        emit(
            &events,
            RunEvent::Scenario {
                run_id,
                scenario: scenario.clone(),
                slots: slots.clone(),
            },
        )
        .await;

        let mut stream = self.scheduler.run_batch(&scenario, brand);
        let mut results = Vec::with_capacity(slots.len());
        while let Some(result) = stream.next().await {
            emit(
                &events,
                RunEvent::Result {
                    result: result.clone(),
                },
            )
            .await;
            results.push(result);
        }
        info!("Run {} collected {}/{} results", run_id, results.len(), slots.len());

        let report = with_retry(self.retries, "report synthesis", || {
            self.reporter.synthesize(brand, &results)
        })
        .await?;
        emit(
            &events,
            RunEvent::Report {
                report: report.clone(),
            },
        )
        .await;

        let summary = RunSummary::from_results(&self.engines.available_engines(), &results);
        Ok(DiagnosticRun {
            run_id,
            brand: request.brand.clone(),
            keyword: request.keyword.clone(),
            started_at,
            finished_at: Utc::now(),
            scenario,
            slots,
            results,
            summary,
            report,
        })
    }
}

async fn emit(events: &Option<mpsc::Sender<RunEvent>>, event: RunEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is watching anymore.
        let _ = tx.send(event).await;
    }
}
