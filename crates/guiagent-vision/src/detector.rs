//! 요소 탐지기 계약.
//!
//! 실제 모델(탐지기/캡셔너)은 이 trait을 구현하는 교체 가능한 어댑터다.
//! 탐지기 출력은 [`normalize_detection`]을 거쳐 분석 결과 불변식을 만족하도록 보정된다.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use guiagent_core::error::CoreError;
use guiagent_core::models::analysis::{Element, TextBlock};

/// 탐지기 1회 출력 (정규화 전)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
}

/// 요소 탐지기: 프레임에서 UI 요소와 텍스트 영역을 찾는다
///
/// 구현체는 동기 호출이며 CPU/GPU 추론을 직접 수행한다고 가정한다.
pub trait ElementDetector: Send + Sync {
    /// 프레임 분석
    fn detect(&self, frame: &RgbaImage) -> Result<Detection, CoreError>;

    /// 탐지기 이름 (로그 표시용)
    fn name(&self) -> &str;
}

/// 탐지기 출력을 프레임 기준으로 정규화
///
/// - 경계 영역을 프레임 안으로 자름
/// - 중심점을 경계 영역 안으로 보정
/// - 신뢰도를 [0, 1]로 제한
/// - text/image 유형은 상호작용 불가로 고정
pub fn normalize_detection(detection: Detection, width: u32, height: u32) -> Detection {
    let elements = detection
        .elements
        .into_iter()
        .map(|raw| {
            let bounding_box = raw.bounding_box.clamp_to_frame(width, height);
            let (cx, cy) = raw.center;
            let interactable = raw.interactable;
            Element::new(
                raw.kind,
                raw.label,
                bounding_box,
                raw.confidence,
                raw.description,
            )
            .with_center(cx, cy)
            .with_interactable(interactable)
        })
        .collect();

    let text_blocks = detection
        .text_blocks
        .into_iter()
        .map(|raw| {
            TextBlock::new(
                raw.text,
                raw.bounding_box.clamp_to_frame(width, height),
                raw.confidence,
            )
        })
        .collect();

    Detection {
        elements,
        text_blocks,
    }
}

// ============================================================
// RecordedDetector: 기록된 탐지 결과 재생
// ============================================================

/// 기록된 탐지 결과 파일 이름 (모델 디렉토리 기준)
pub const RECORDED_DETECTION_FILE: &str = "detections.json";

/// 미리 기록된 탐지 결과(JSON)를 매 프레임 그대로 돌려주는 탐지기
///
/// 오프라인 모델 실행 결과를 파이프라인에 연결하거나
/// 실제 화면 없이 해석기 동작을 재현할 때 사용한다.
#[derive(Debug, Clone)]
pub struct RecordedDetector {
    detection: Detection,
    source: PathBuf,
}

impl RecordedDetector {
    /// 모델 디렉토리의 `detections.json` 로드
    pub fn from_model_dir(model_dir: &Path) -> Result<Self, CoreError> {
        Self::load(&model_dir.join(RECORDED_DETECTION_FILE))
    }

    /// JSON 파일에서 탐지 결과 로드
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Analysis(format!("탐지 결과 파일 읽기 실패: {}: {}", path.display(), e))
        })?;
        let detection: Detection = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            elements = detection.elements.len(),
            text_blocks = detection.text_blocks.len(),
            "기록된 탐지 결과 로드"
        );
        Ok(Self {
            detection,
            source: path.to_path_buf(),
        })
    }

    /// 메모리 내 탐지 결과로 생성
    pub fn new(detection: Detection) -> Self {
        Self {
            detection,
            source: PathBuf::new(),
        }
    }

    /// 원본 파일 경로 (메모리 생성 시 빈 경로)
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl ElementDetector for RecordedDetector {
    fn detect(&self, _frame: &RgbaImage) -> Result<Detection, CoreError> {
        Ok(self.detection.clone())
    }

    fn name(&self) -> &str {
        "recorded"
    }
}
