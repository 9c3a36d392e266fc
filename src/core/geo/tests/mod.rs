//! Pipeline tests against in-process fake engines and analyst.

mod report;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::error::{GeoError, GeoResult};
use crate::core::llm::{EngineId, EngineRegistry, LlmProvider, ResponseFormat, StructuredLlm};

type Answer = Box<dyn Fn(&str) -> GeoResult<String> + Send + Sync>;

pub(crate) struct FakeEngine {
    engine: EngineId,
    available: bool,
    answer: Answer,
    pub calls: AtomicUsize,
}

impl FakeEngine {
    pub fn answering(
        engine: EngineId,
        answer: impl Fn(&str) -> GeoResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            engine,
            available: true,
            answer: Box::new(answer),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fixed(engine: EngineId, text: &str) -> Self {
        let text = text.to_string();
        Self::answering(engine, move |_| Ok(text.clone()))
    }

    pub fn unavailable(engine: EngineId) -> Self {
        Self {
            available: false,
            ..Self::fixed(engine, "should never be asked")
        }
    }
}

#[async_trait]
impl LlmProvider for FakeEngine {
    fn engine(&self) -> EngineId {
        self.engine
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn generate(&self, prompt: &str) -> GeoResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.answer)(prompt)
    }
}

type Responder = Box<dyn Fn(&str, ResponseFormat) -> GeoResult<String> + Send + Sync>;

/// Analyst that answers by recognizing which template it was handed.
pub(crate) struct FakeAnalyst {
    responder: Responder,
    pub instructions: Mutex<Vec<String>>,
}

pub(crate) const SCENARIO_JSON: &str = r#"{"strategy": "송금 수수료에 민감한 사용자를 겨냥합니다.", "queries": ["수수료 없이 친구에게 돈 보내는 앱 추천해줘", "더치페이 정산이 편한 앱은?", "해외 송금이 간편한 서비스 알려줘"]}"#;

pub(crate) fn fit_json(mentioned: bool, fit: u8) -> String {
    format!(
        r#"{{"mentioned": {mentioned}, "solution_fit": {fit}, "fit_reason": "송금 니즈와 일치", "summary": "간편 송금 앱을 안내함"}}"#
    )
}

pub(crate) const REPORT_MD: &str = "## 노출 실태\n\nChatGPT에서 일부 노출되었습니다.";

impl FakeAnalyst {
    pub fn new(
        responder: impl Fn(&str, ResponseFormat) -> GeoResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            instructions: Mutex::new(Vec::new()),
        }
    }

    /// Canned scenario, a fixed fit score and a short report.
    pub fn scripted(proposed_mentioned: bool, fit: u8) -> Self {
        Self::new(move |instruction, _| {
            if instruction.contains("GEO 테스트 질문") {
                Ok(SCENARIO_JSON.to_string())
            } else if instruction.contains("물리적 노출 여부") {
                Ok(fit_json(proposed_mentioned, fit))
            } else if instruction.contains("심층 진단 보고서") {
                Ok(REPORT_MD.to_string())
            } else {
                Err(GeoError::malformed("test", "unexpected instruction"))
            }
        })
    }

    pub fn seen(&self, marker: &str) -> usize {
        self.instructions
            .lock()
            .map(|v| v.iter().filter(|i| i.contains(marker)).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl StructuredLlm for FakeAnalyst {
    async fn instruct(&self, instruction: &str, format: ResponseFormat) -> GeoResult<String> {
        if let Ok(mut seen) = self.instructions.lock() {
            seen.push(instruction.to_string());
        }
        (self.responder)(instruction, format)
    }
}

pub(crate) fn registry(engines: Vec<Arc<FakeEngine>>) -> Arc<EngineRegistry> {
    let mut registry = EngineRegistry::new();
    for engine in engines {
        registry.register(engine);
    }
    Arc::new(registry)
}
