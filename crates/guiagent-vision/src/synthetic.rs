//! 합성 레이아웃.
//!
//! 실제 모델이 없을 때 사용하는 결정적 분석 결과.
//! 모든 좌표는 프레임 크기에 대한 비율(천분율)로 정의되며 난수를 쓰지 않는다.

use guiagent_core::models::analysis::{BoundingBox, Element, ElementKind, TextBlock};

use crate::detector::Detection;

/// 천분율 좌표 (x1, y1, x2, y2)
type Permille = (u32, u32, u32, u32);

struct SyntheticElement {
    kind: ElementKind,
    label: &'static str,
    bbox: Permille,
    center: (u32, u32),
    confidence: f64,
    description: &'static str,
}

struct SyntheticText {
    text: &'static str,
    bbox: Permille,
    confidence: f64,
}

const ELEMENTS: [SyntheticElement; 4] = [
    SyntheticElement {
        kind: ElementKind::Button,
        label: "신청",
        bbox: (300, 300, 500, 400),
        center: (400, 350),
        confidence: 0.92,
        description: "버튼: 신청",
    },
    SyntheticElement {
        kind: ElementKind::Button,
        label: "취소",
        bbox: (550, 300, 750, 400),
        center: (650, 350),
        confidence: 0.89,
        description: "버튼: 취소",
    },
    SyntheticElement {
        kind: ElementKind::Text,
        label: "유연근무 신청",
        bbox: (200, 100, 800, 200),
        center: (500, 150),
        confidence: 0.95,
        description: "제목 텍스트",
    },
    SyntheticElement {
        kind: ElementKind::Icon,
        label: "사용자 아이콘",
        bbox: (50, 50, 150, 150),
        center: (100, 100),
        confidence: 0.88,
        description: "아이콘: 사용자",
    },
];

const TEXT_BLOCKS: [SyntheticText; 2] = [
    SyntheticText {
        text: "유연근무 신청",
        bbox: (200, 100, 800, 200),
        confidence: 0.95,
    },
    SyntheticText {
        text: "신청 버튼을 클릭하세요",
        bbox: (200, 450, 800, 550),
        confidence: 0.88,
    },
];

/// `floor(extent * permille / 1000)` (정수 연산)
fn scale(extent: u32, permille: u32) -> i32 {
    let scaled = u64::from(extent) * u64::from(permille) / 1000;
    i32::try_from(scaled).unwrap_or(i32::MAX)
}

fn scale_box(width: u32, height: u32, (x1, y1, x2, y2): Permille) -> BoundingBox {
    BoundingBox::new(
        scale(width, x1),
        scale(height, y1),
        scale(width, x2),
        scale(height, y2),
    )
}

/// 프레임 크기(width × height)에 대한 합성 레이아웃
///
/// 같은 크기에 대해서는 항상 같은 결과를 반환한다.
pub fn synthetic_layout(width: u32, height: u32) -> Detection {
    let elements = ELEMENTS
        .iter()
        .map(|entry| {
            Element::new(
                entry.kind,
                entry.label,
                scale_box(width, height, entry.bbox),
                entry.confidence,
                entry.description,
            )
            .with_center(scale(width, entry.center.0), scale(height, entry.center.1))
        })
        .collect();

    let text_blocks = TEXT_BLOCKS
        .iter()
        .map(|entry| {
            TextBlock::new(
                entry.text,
                scale_box(width, height, entry.bbox),
                entry.confidence,
            )
        })
        .collect();

    Detection {
        elements,
        text_blocks,
    }
}
