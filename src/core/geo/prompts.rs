//! Instruction templates for the analyst backend. Output language is Korean.

pub fn scenario_prompt(brand: &str, keyword: &str, query_count: usize) -> String {
    format!(
        "당신은 전문 GEO(Generative Engine Optimization) 전략가입니다.\n\
         브랜드: {brand}, 서비스: {keyword}\n\n\
         이 브랜드가 AI 답변에서 노출될 수밖에 없는 'GEO 테스트 질문' {query_count}개를 한국어로 생성하세요.\n\
         지침:\n\
         1. 질문자는 자신의 문제를 해결해줄 곳을 찾는 관점이어야 합니다.\n\
         2. 질문에 브랜드명({brand})은 절대 포함하지 마십시오.\n\
         3. strategy에는 이 질문들을 고른 타겟팅 전략을 한 문단으로 설명하십시오.\n\n\
         JSON 형식: {{\"strategy\": \"타겟팅 전략 설명\", \"queries\": [\"질문1\", \"질문2\", \"질문3\"]}}"
    )
}

pub fn fit_prompt(brand: &str, raw_text: &str, mentioned: bool) -> String {
    format!(
        "AI 답변을 한국어로 진단하십시오.\n\
         브랜드: {brand}\n\
         답변: {raw_text}\n\
         물리적 노출 여부: {mentioned}\n\n\
         solution_fit은 이 브랜드가 답변의 해결책으로 제시되었다면 질문자의 필요를 얼마나 잘 충족했을지를 1~10 정수로 평가하십시오.\n\
         JSON 형식: {{\"mentioned\": true 또는 false, \"solution_fit\": 1~10, \"fit_reason\": \"한국어 근거\", \"summary\": \"한국어 요약\"}}"
    )
}

pub fn report_prompt(brand: &str, results_json: &str) -> String {
    format!(
        "당신은 전문 GEO 컨설턴트입니다. 진단 데이터({results_json})를 바탕으로 브랜드 '{brand}'을(를) 위한 심층 진단 보고서를 한국어 마크다운으로 작성하십시오.\n\
         다음 내용을 반드시 포함하십시오:\n\
         1. 현재 AI 검색 엔진별 노출 실태\n\
         2. GEO의 정의와 이 최적화가 필요한 이유\n\
         3. AI 답변에 노출되지 않을 때의 비즈니스 리스크와 경쟁력 분석\n\
         4. 구체적인 최적화 제언\n\
         오류로 수집되지 못한 항목은 데이터 부족으로 명시하십시오."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_prompt_forbids_brand_and_requests_count() {
        let prompt = scenario_prompt("Toss", "간편 송금 서비스", 4);
        assert!(prompt.contains("'GEO 테스트 질문' 4개"));
        assert!(prompt.contains("브랜드명(Toss)은 절대 포함하지"));
        assert!(prompt.contains("\"queries\""));
    }

    #[test]
    fn fit_prompt_carries_ground_truth_flag() {
        let prompt = fit_prompt("Toss", "TOSS 앱을 이용하세요", true);
        assert!(prompt.contains("물리적 노출 여부: true"));
        assert!(prompt.contains("\"solution_fit\""));
    }
}
