//! 분석 결과 텍스트 요약 (사이드바/CLI 출력용).

use std::fmt::Write;

use guiagent_core::models::analysis::AnalysisResult;

/// 실패한 분석 결과의 요약 문구
pub const NO_ANALYSIS_DATA: &str = "분석 데이터 없음";

/// 분석 결과를 사람이 읽는 여러 줄 텍스트로 요약
pub fn summarize(result: &AnalysisResult) -> String {
    if !result.success {
        return match &result.error {
            Some(error) => format!("{NO_ANALYSIS_DATA} ({error})"),
            None => NO_ANALYSIS_DATA.to_string(),
        };
    }

    let mut out = String::new();

    let _ = writeln!(out, "인식된 요소: {}", result.elements.len());
    if result.elements.is_empty() {
        let _ = writeln!(out, "  인식된 요소 없음");
    }
    for (i, el) in result.elements.iter().enumerate() {
        let label = if el.label.is_empty() { "N/A" } else { el.label.as_str() };
        let _ = writeln!(
            out,
            "  {}. [{}] {}, 신뢰도 {:.0}%, 위치 ({}, {}), {}",
            i + 1,
            el.kind,
            label,
            el.confidence * 100.0,
            el.center.0,
            el.center.1,
            el.description
        );
    }

    let _ = writeln!(out, "인식된 텍스트: {}", result.text_blocks.len());
    if result.text_blocks.is_empty() {
        let _ = writeln!(out, "  인식된 텍스트 없음");
    }
    for (i, block) in result.text_blocks.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} (신뢰도 {:.0}%)",
            i + 1,
            block.text,
            block.confidence * 100.0
        );
    }

    let _ = write!(out, "분석 시간: {:.3}초", result.analysis_time);
    out
}
