//! Cross-engine visibility pipeline.
//!
//! `ScenarioGenerator` designs brand-free test questions, the `Scheduler` fans
//! them out to every answer engine as `AnalysisTask`s, and the
//! `ReportSynthesizer` turns the collected results into a markdown report.
//! `Diagnostician` wires the three together into a `DiagnosticRun`.

pub mod analysis;
mod decode;
pub mod mention;
pub mod prompts;
pub mod report;
pub mod retry;
pub mod run;
pub mod scenario;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod tests;

pub use analysis::{AnalysisOutcome, AnalysisResult, AnalysisTask, MentionAnalysis};
pub use report::{Report, ReportSynthesizer};
pub use run::{DiagnosticRequest, DiagnosticRun, Diagnostician, RunEvent, RunSummary};
pub use scenario::{ScenarioGenerator, ScenarioSet};
pub use scheduler::Scheduler;
