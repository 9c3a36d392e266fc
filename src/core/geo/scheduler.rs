//! Bounded fan-out of analysis tasks over engines × questions.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::core::geo::analysis::{AnalysisResult, AnalysisTask};
use crate::core::geo::scenario::ScenarioSet;
use crate::core::llm::{EngineRegistry, StructuredLlm};

pub struct Scheduler {
    engines: Arc<EngineRegistry>,
    analyst: Arc<dyn StructuredLlm>,
    max_concurrency: usize,
}

impl Scheduler {
    pub fn new(
        engines: Arc<EngineRegistry>,
        analyst: Arc<dyn StructuredLlm>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            engines,
            analyst,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Full task matrix: one task per registered engine and question, engines
    /// outermost in registry order.
    pub fn tasks(&self, scenario: &ScenarioSet) -> Vec<AnalysisTask> {
        self.engines
            .engines()
            .into_iter()
            .flat_map(|engine| {
                scenario
                    .queries
                    .iter()
                    .enumerate()
                    .map(move |(i, q)| AnalysisTask::new(engine, i, q.clone()))
            })
            .collect()
    }

    /// Slots that will actually produce a result: tasks on available engines.
    pub fn slots(&self, scenario: &ScenarioSet) -> Vec<AnalysisTask> {
        let available = self.engines.available_engines();
        self.tasks(scenario)
            .into_iter()
            .filter(|t| available.contains(&t.engine))
            .collect()
    }

    /// Run every task with at most `max_concurrency` in flight. Results are
    /// yielded in completion order; skipped tasks are dropped so the stream
    /// carries exactly one item per slot.
    pub fn run_batch(&self, scenario: &ScenarioSet, brand: &str) -> ReceiverStream<AnalysisResult> {
        let tasks = self.tasks(scenario);
        let (tx, rx) = mpsc::channel(tasks.len().max(1));
        info!(
            "Dispatching {} analysis tasks (max {} in flight)",
            tasks.len(),
            self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let brand: Arc<str> = Arc::from(brand);
        let mut set = JoinSet::new();

        for task in tasks {
            let semaphore = semaphore.clone();
            let engines = self.engines.clone();
            let analyst = self.analyst.clone();
            let brand = brand.clone();
            set.spawn(async move {
                let (engine, index) = (task.engine, task.question_index);
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return AnalysisResult::failed(engine, index, "scheduler shut down");
                };
                // Inner spawn so a panic inside one task becomes that slot's error.
                let handle = tokio::spawn(async move {
                    task.run(&engines, analyst.as_ref(), &brand).await
                });
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("Analysis task {} #{} aborted: {}", engine, index + 1, e);
                        AnalysisResult::failed(engine, index, format!("task aborted: {}", e))
                    }
                }
            });
        }

        tokio::spawn(async move {
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(result) if result.is_skipped() => continue,
                    Ok(result) => {
                        if tx.send(result).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Analysis worker join error: {}", e),
                }
            }
        });

        ReceiverStream::new(rx)
    }

    /// Drain `run_batch` into a vector, still in completion order.
    #[cfg(test)]
    pub async fn collect(&self, scenario: &ScenarioSet, brand: &str) -> Vec<AnalysisResult> {
        use tokio_stream::StreamExt;
        self.run_batch(scenario, brand).collect().await
    }
}
