//! 의도 해석기.
//!
//! 정해진 의도(`Intent`) → 라벨 동의어 목록 테이블을 기준으로
//! 분석 결과에서 대상 요소를 찾아 `CLICK:{cx},{cy}` 명령으로 변환한다.
//! 같은 입력에 대해 항상 같은 결과를 낸다 (난수/내부 상태 없음).

use tracing::debug;

use guiagent_core::models::analysis::{AnalysisResult, Element};
use guiagent_core::models::command::Command;
use guiagent_core::models::intent::Intent;

// ============================================================
// SynonymTable: 의도 → 라벨 동의어
// ============================================================

/// 의도별 라벨 동의어 테이블 (순서 유지)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    entries: Vec<(Intent, Vec<String>)>,
}

impl SynonymTable {
    /// 기본 동의어 테이블 (한국어 + 영어)
    pub fn builtin() -> Self {
        let entry = |intent: Intent, words: &[&str]| {
            (intent, words.iter().map(|w| w.to_lowercase()).collect())
        };
        Self {
            entries: vec![
                entry(Intent::Submit, &["신청", "accept", "submit", "확인"]),
                entry(Intent::Cancel, &["취소", "cancel", "close", "돌아가기"]),
                entry(Intent::Confirm, &["확인", "ok", "yes"]),
                entry(Intent::Next, &["다음", "next", "계속"]),
            ],
        }
    }

    /// 의도의 동의어 목록 (소문자)
    pub fn synonyms(&self, intent: Intent) -> &[String] {
        self.entries
            .iter()
            .find(|(i, _)| *i == intent)
            .map(|(_, words)| words.as_slice())
            .unwrap_or(&[])
    }

    /// 의도에 동의어 추가 (기존 목록 뒤에 붙음)
    pub fn with_synonym(mut self, intent: Intent, word: &str) -> Self {
        let word = word.to_lowercase();
        match self.entries.iter_mut().find(|(i, _)| *i == intent) {
            Some((_, words)) => words.push(word),
            None => self.entries.push((intent, vec![word])),
        }
        self
    }

    /// 라벨이 의도의 동의어 중 하나를 포함하는지
    pub fn matches(&self, intent: Intent, label: &str) -> bool {
        let label = label.to_lowercase();
        self.synonyms(intent)
            .iter()
            .any(|word| label.contains(word.as_str()))
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================
// IntentResolver
// ============================================================

/// 의도 해석기: 분석 결과 + 의도 → 명령
#[derive(Debug, Clone, Default)]
pub struct IntentResolver {
    table: SynonymTable,
}

impl IntentResolver {
    /// 기본 동의어 테이블로 생성
    pub fn new() -> Self {
        Self::with_table(SynonymTable::builtin())
    }

    pub fn with_table(table: SynonymTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SynonymTable {
        &self.table
    }

    /// 의도 문자열 해석: 인식되지 않는 의도, 실패한 분석, 일치 요소 없음은 모두 `None`
    pub fn resolve(&self, result: &AnalysisResult, intent: &str) -> Option<Command> {
        let Some(parsed) = Intent::parse(intent) else {
            debug!(intent, "알 수 없는 의도");
            return None;
        };
        self.resolve_intent(result, parsed)
    }

    /// 의도 해석 → `Command::ClickAt` (요소 중심)
    pub fn resolve_intent(&self, result: &AnalysisResult, intent: Intent) -> Option<Command> {
        let element = self.resolve_element(result, intent)?;
        let (x, y) = element.center;
        debug!(%intent, label = %element.label, x, y, "의도 해석 완료");
        Some(Command::ClickAt { x, y })
    }

    /// 의도에 해당하는 첫 번째 상호작용 가능 요소 (탐지 순서)
    pub fn resolve_element<'a>(
        &self,
        result: &'a AnalysisResult,
        intent: Intent,
    ) -> Option<&'a Element> {
        if !result.success {
            return None;
        }
        result
            .elements
            .iter()
            .filter(|e| e.interactable)
            .find(|e| self.table.matches(intent, &e.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guiagent_core::models::analysis::{BoundingBox, ElementKind};

    fn button(label: &str, cx: i32, cy: i32) -> Element {
        Element::new(
            ElementKind::Button,
            label,
            BoundingBox::new(cx - 50, cy - 20, cx + 50, cy + 20),
            0.9,
            format!("버튼: {label}"),
        )
    }

    fn analysis(elements: Vec<Element>) -> AnalysisResult {
        AnalysisResult::succeeded(elements, Vec::new())
    }

    #[test]
    fn resolves_korean_button_to_click_at_center() {
        let result = analysis(vec![button("신청 (Apply)", 400, 300)]);
        let resolver = IntentResolver::new();

        let by_korean = resolver.resolve(&result, "신청");
        let by_english = resolver.resolve(&result, "submit");
        assert_eq!(by_korean, Some(Command::ClickAt { x: 400, y: 300 }));
        assert_eq!(by_english, by_korean);
        assert_eq!(by_korean.map(|c| c.to_string()).as_deref(), Some("CLICK:400,300"));
    }

    #[test]
    fn english_synonyms_match_case_insensitively() {
        let result = analysis(vec![button("Cancel Order", 10 + 50, 10 + 20)]);
        let resolver = IntentResolver::new();
        assert_eq!(
            resolver.resolve(&result, "cancel"),
            Some(Command::ClickAt { x: 60, y: 30 })
        );
        assert_eq!(
            resolver.resolve(&result, "  CANCEL "),
            Some(Command::ClickAt { x: 60, y: 30 })
        );
    }

    #[test]
    fn first_match_in_detection_order_wins() {
        let result = analysis(vec![
            button("돌아가기", 100, 100),
            button("취소", 200, 200),
        ]);
        assert_eq!(
            IntentResolver::new().resolve(&result, "취소"),
            Some(Command::ClickAt { x: 100, y: 100 })
        );
    }

    #[test]
    fn unknown_intent_returns_none() {
        let result = analysis(vec![button("신청", 100, 100)]);
        assert_eq!(IntentResolver::new().resolve(&result, "delete"), None);
    }

    #[test]
    fn failed_analysis_returns_none() {
        let result = AnalysisResult::failed("모델 없음");
        assert_eq!(IntentResolver::new().resolve(&result, "신청"), None);
    }

    #[test]
    fn no_matching_element_returns_none() {
        let result = analysis(vec![button("저장", 100, 100)]);
        assert_eq!(IntentResolver::new().resolve(&result, "다음"), None);
    }

    #[test]
    fn non_interactable_elements_are_never_targets() {
        let title = Element::new(
            ElementKind::Text,
            "유연근무 신청",
            BoundingBox::new(0, 0, 100, 20),
            0.95,
            "",
        );
        let result = analysis(vec![title.clone()]);
        assert_eq!(IntentResolver::new().resolve(&result, "신청"), None);

        let result = analysis(vec![title, button("신청", 300, 300)]);
        assert_eq!(
            IntentResolver::new().resolve(&result, "신청"),
            Some(Command::ClickAt { x: 300, y: 300 })
        );
    }

    #[test]
    fn submit_and_confirm_share_the_confirm_label() {
        let result = analysis(vec![button("확인", 50, 50)]);
        let resolver = IntentResolver::new();
        assert!(resolver.resolve(&result, "신청").is_some());
        assert!(resolver.resolve(&result, "확인").is_some());
        assert!(resolver.resolve(&result, "취소").is_none());
    }

    #[test]
    fn resolution_is_deterministic() {
        let result = analysis(vec![button("Next", 10 + 50, 10 + 20), button("계속", 500, 500)]);
        let resolver = IntentResolver::new();
        for intent in ["next", "다음", "cancel", "unknown"] {
            assert_eq!(resolver.resolve(&result, intent), resolver.resolve(&result, intent));
        }
    }

    #[test]
    fn every_intent_has_synonyms() {
        let table = SynonymTable::builtin();
        for intent in Intent::ALL {
            assert!(!table.synonyms(intent).is_empty());
            assert!(table.matches(intent, intent.korean()));
        }
    }

    #[test]
    fn custom_synonym_extends_table() {
        let resolver =
            IntentResolver::with_table(SynonymTable::builtin().with_synonym(Intent::Submit, "Apply"));
        let result = analysis(vec![button("APPLY NOW", 70, 40)]);
        assert_eq!(
            resolver.resolve(&result, "submit"),
            Some(Command::ClickAt { x: 70, y: 40 })
        );
        assert_eq!(resolver.table().synonyms(Intent::Submit).last().map(String::as_str), Some("apply"));
    }
}
