use std::sync::Arc;

use super::{FakeAnalyst, REPORT_MD};
use crate::core::error::GeoError;
use crate::core::geo::analysis::AnalysisResult;
use crate::core::geo::report::ReportSynthesizer;
use crate::core::llm::{EngineId, ResponseFormat};

#[tokio::test]
async fn all_error_result_set_still_yields_a_report() {
    let analyst = Arc::new(FakeAnalyst::scripted(false, 5));
    let results = vec![
        AnalysisResult::failed(EngineId::Gpt, 0, "GPT generation failed: HTTP 500"),
        AnalysisResult::failed(EngineId::Gpt, 1, "GPT generation failed: HTTP 500"),
    ];

    let report = ReportSynthesizer::new(analyst.clone())
        .synthesize("Toss", &results)
        .await
        .unwrap();

    assert_eq!(report.markdown, REPORT_MD);
    assert_eq!(analyst.seen("HTTP 500"), 1);
}

#[tokio::test]
async fn report_is_requested_as_plain_text_and_trimmed() {
    let analyst = Arc::new(FakeAnalyst::new(|instruction, format| {
        assert_eq!(format, ResponseFormat::Text);
        assert!(instruction.contains("'Toss'"));
        Ok("\n\n# 진단\n본문\n  ".to_string())
    }));
    let report = ReportSynthesizer::new(analyst)
        .synthesize("Toss", &[])
        .await
        .unwrap();
    assert_eq!(report.markdown, "# 진단\n본문");
}

#[tokio::test]
async fn blank_report_is_malformed() {
    let analyst = Arc::new(FakeAnalyst::new(|_, _| Ok("   ".to_string())));
    let err = ReportSynthesizer::new(analyst)
        .synthesize("Toss", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GeoError::MalformedResponse { stage: "report", .. }));
}

#[tokio::test]
async fn transport_failure_propagates() {
    let analyst = Arc::new(FakeAnalyst::new(|_, _| {
        Err(GeoError::generation(EngineId::Gpt, "timed out"))
    }));
    let err = ReportSynthesizer::new(analyst)
        .synthesize("Toss", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GeoError::GenerationFailure { .. }));
}
