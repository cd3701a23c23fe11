//! 분석 결과 질의 (순수 함수).

use guiagent_core::models::analysis::{AnalysisResult, Element};

/// 클릭 가능한 요소(button, icon)만 탐지 순서대로 반환
pub fn clickable_elements(result: &AnalysisResult) -> Vec<&Element> {
    result
        .elements
        .iter()
        .filter(|e| e.kind.is_clickable())
        .collect()
}

/// 라벨에 `query`가 포함된(대소문자 무시) 첫 번째 요소
pub fn find_by_text<'a>(result: &'a AnalysisResult, query: &str) -> Option<&'a Element> {
    let query = query.to_lowercase();
    result
        .elements
        .iter()
        .find(|e| e.label.to_lowercase().contains(&query))
}
