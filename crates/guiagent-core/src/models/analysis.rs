//! 화면 분석 결과 모델.
//!
//! 분석기 1회 호출의 원자적 출력(`AnalysisResult`)과
//! 그 안에 담기는 UI 요소(`Element`), 텍스트 영역(`TextBlock`)을 정의한다.

use serde::{Deserialize, Serialize};

// ============================================================
// ElementKind: 요소 유형
// ============================================================

/// 인식된 요소 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Button,
    Text,
    Icon,
    Image,
}

impl ElementKind {
    /// 해석기가 클릭 대상으로 삼을 수 있는 유형인지 여부
    pub fn is_clickable(self) -> bool {
        matches!(self, ElementKind::Button | ElementKind::Icon)
    }

    /// 소문자 이름 (로그/요약 표시용)
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Button => "button",
            ElementKind::Text => "text",
            ElementKind::Icon => "icon",
            ElementKind::Image => "image",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// BoundingBox: 픽셀 좌표 경계 영역
// ============================================================

/// 요소 경계 영역 (x1, y1, x2, y2), 정수 픽셀 좌표.
///
/// 생성 시 x1 ≤ x2, y1 ≤ y2가 되도록 정렬된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    /// 좌표 순서를 정렬하여 경계 영역 생성
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// 너비 (픽셀)
    pub fn width(&self) -> u32 {
        self.x2.abs_diff(self.x1)
    }

    /// 높이 (픽셀)
    pub fn height(&self) -> u32 {
        self.y2.abs_diff(self.y1)
    }

    /// 경계 영역의 중심 좌표 (내림)
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x1 + self.x2).div_euclid(2),
            (self.y1 + self.y2).div_euclid(2),
        )
    }

    /// 지정 좌표가 경계 영역 내에 있는지 확인 (경계 포함)
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x1 && px <= self.x2 && py >= self.y1 && py <= self.y2
    }

    /// 좌표를 경계 영역 안으로 끌어당김
    pub fn clamp_point(&self, px: i32, py: i32) -> (i32, i32) {
        (px.clamp(self.x1, self.x2), py.clamp(self.y1, self.y2))
    }

    /// 프레임 크기(width × height) 안으로 잘라낸 경계 영역
    pub fn clamp_to_frame(&self, width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_y = height.saturating_sub(1).min(i32::MAX as u32) as i32;
        Self::new(
            self.x1.clamp(0, max_x),
            self.y1.clamp(0, max_y),
            self.x2.clamp(0, max_x),
            self.y2.clamp(0, max_y),
        )
    }
}

// ============================================================
// Element: 인식된 UI 요소
// ============================================================

/// 인식된 상호작용/정보 영역 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// 요소 유형
    pub kind: ElementKind,
    /// 식별 라벨 (빈 문자열 가능)
    pub label: String,
    /// 경계 영역
    pub bounding_box: BoundingBox,
    /// 중심 좌표: 항상 `bounding_box` 안에 위치
    pub center: (i32, i32),
    /// 인식 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 사람이 읽는 설명
    pub description: String,
    /// 해석기가 대상으로 삼을 수 있는지 여부 (button, icon만 true)
    pub interactable: bool,
}

impl Element {
    /// 경계 영역 중심을 중심점으로 하는 요소 생성
    pub fn new(
        kind: ElementKind,
        label: impl Into<String>,
        bounding_box: BoundingBox,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            center: bounding_box.center(),
            bounding_box,
            confidence: clamp_confidence(confidence),
            description: description.into(),
            interactable: kind.is_clickable(),
        }
    }

    /// 중심점 지정 (경계 영역 밖이면 안쪽으로 보정)
    pub fn with_center(mut self, cx: i32, cy: i32) -> Self {
        self.center = self.bounding_box.clamp_point(cx, cy);
        self
    }

    /// 상호작용 가능 여부 지정: text/image 유형은 항상 false
    pub fn with_interactable(mut self, interactable: bool) -> Self {
        self.interactable = interactable && self.kind.is_clickable();
        self
    }

    /// 라벨에 `query`가 포함되는지 (대소문자 무시)
    pub fn label_contains(&self, query: &str) -> bool {
        self.label.to_lowercase().contains(&query.to_lowercase())
    }
}

// ============================================================
// TextBlock: 인식된 텍스트 영역
// ============================================================

/// 인식된 텍스트 영역
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// 인식된 텍스트
    pub text: String,
    /// 경계 영역
    pub bounding_box: BoundingBox,
    /// 인식 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, bounding_box: BoundingBox, confidence: f64) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            confidence: clamp_confidence(confidence),
        }
    }
}

// ============================================================
// AnalysisResult: 분석 1회의 원자적 출력
// ============================================================

/// 화면 분석 결과
///
/// `success`가 false이면 `elements`, `text_blocks`는 항상 비어 있고
/// `error`에 사유가 담긴다. 생성자를 통해서만 만들면 이 불변식이 유지된다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 분석 성공 여부
    pub success: bool,
    /// 인식된 요소 (탐지 순서 유지)
    pub elements: Vec<Element>,
    /// 인식된 텍스트 영역 (탐지 순서 유지)
    pub text_blocks: Vec<TextBlock>,
    /// 분석 소요 시간 (초, 호출 진입부터 반환까지)
    pub analysis_time: f64,
    /// 실패 사유 (`success == false`일 때만)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// 성공 결과 생성
    pub fn succeeded(elements: Vec<Element>, text_blocks: Vec<TextBlock>) -> Self {
        Self {
            success: true,
            elements,
            text_blocks,
            analysis_time: 0.0,
            error: None,
        }
    }

    /// 실패 결과 생성 (요소/텍스트 없음)
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            elements: Vec::new(),
            text_blocks: Vec::new(),
            analysis_time: 0.0,
            error: Some(error.into()),
        }
    }

    /// 분석 소요 시간 지정 (음수/NaN은 0으로)
    pub fn with_analysis_time(mut self, seconds: f64) -> Self {
        self.analysis_time = if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            0.0
        };
        self
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

// ============================================================
// 테스트
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_normalizes_order() {
        let bbox = BoundingBox::new(90, 40, 10, 10);
        assert_eq!(bbox, BoundingBox::new(10, 10, 90, 40));
        assert_eq!(bbox.width(), 80);
        assert_eq!(bbox.height(), 30);
    }

    #[test]
    fn bounding_box_center_and_contains() {
        let bbox = BoundingBox::new(100, 200, 180, 240);
        assert_eq!(bbox.center(), (140, 220));
        assert!(bbox.contains(100, 200));
        assert!(bbox.contains(180, 240));
        assert!(!bbox.contains(181, 220));
        assert!(!bbox.contains(140, 199));
    }

    #[test]
    fn bounding_box_zero_size_contains_its_center() {
        let bbox = BoundingBox::new(5, 5, 5, 5);
        assert!(bbox.contains(bbox.center().0, bbox.center().1));
    }

    #[test]
    fn clamp_to_frame_limits_coordinates() {
        let bbox = BoundingBox::new(-20, 10, 2000, 50).clamp_to_frame(1920, 1080);
        assert_eq!(bbox, BoundingBox::new(0, 10, 1919, 50));
    }

    #[test]
    fn element_center_clamped_into_box() {
        let elem = Element::new(
            ElementKind::Button,
            "확인",
            BoundingBox::new(10, 10, 20, 20),
            0.9,
            "",
        )
        .with_center(50, 0);
        assert_eq!(elem.center, (20, 10));
    }

    #[test]
    fn element_interactable_follows_kind() {
        let bbox = BoundingBox::new(0, 0, 10, 10);
        assert!(Element::new(ElementKind::Button, "a", bbox, 0.5, "").interactable);
        assert!(Element::new(ElementKind::Icon, "a", bbox, 0.5, "").interactable);
        assert!(!Element::new(ElementKind::Text, "a", bbox, 0.5, "").interactable);
        assert!(
            !Element::new(ElementKind::Image, "a", bbox, 0.5, "")
                .with_interactable(true)
                .interactable
        );
    }

    #[test]
    fn element_confidence_clamped() {
        let bbox = BoundingBox::new(0, 0, 10, 10);
        assert_eq!(Element::new(ElementKind::Text, "", bbox, 1.7, "").confidence, 1.0);
        assert_eq!(Element::new(ElementKind::Text, "", bbox, -0.2, "").confidence, 0.0);
        assert_eq!(Element::new(ElementKind::Text, "", bbox, f64::NAN, "").confidence, 0.0);
    }

    #[test]
    fn label_contains_is_case_insensitive() {
        let elem = Element::new(
            ElementKind::Button,
            "Submit Form",
            BoundingBox::new(0, 0, 10, 10),
            0.9,
            "",
        );
        assert!(elem.label_contains("submit"));
        assert!(elem.label_contains("FORM"));
        assert!(!elem.label_contains("cancel"));
    }

    #[test]
    fn failed_result_is_empty() {
        let result = AnalysisResult::failed("모델 없음").with_analysis_time(0.01);
        assert!(!result.success);
        assert!(result.elements.is_empty());
        assert!(result.text_blocks.is_empty());
        assert_eq!(result.error.as_deref(), Some("모델 없음"));
        assert!(result.analysis_time > 0.0);
    }

    #[test]
    fn analysis_time_never_negative() {
        let result = AnalysisResult::succeeded(vec![], vec![]).with_analysis_time(-1.0);
        assert_eq!(result.analysis_time, 0.0);
        let result = AnalysisResult::succeeded(vec![], vec![]).with_analysis_time(f64::NAN);
        assert_eq!(result.analysis_time, 0.0);
    }

    #[test]
    fn element_kind_serde_snake_case() {
        let json = serde_json::to_string(&ElementKind::Button).unwrap();
        assert_eq!(json, "\"button\"");
        let kind: ElementKind = serde_json::from_str("\"icon\"").unwrap();
        assert_eq!(kind, ElementKind::Icon);
    }
}
