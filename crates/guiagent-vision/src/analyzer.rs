//! 화면 분석기.
//!
//! `analyze(frame) -> AnalysisResult` 계약을 구현한다.
//! 어떤 내부 실패도 호출자에게 전파되지 않으며
//! `success = false` 결과로 변환된다. `analysis_time`은 항상 채워진다.
//!
//! - [`ModelBackedAnalyzer`]: 교체 가능한 탐지기에 위임, 첫 실패 이후 합성 레이아웃으로 전환
//! - [`SyntheticAnalyzer`]: 프레임 크기만으로 결정되는 합성 레이아웃
//! - [`create_screen_analyzer`]: 데모 모드/탐지기 로드 결과에 따라 구현체 선택

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use image::RgbaImage;
use tracing::{debug, info, warn};

use guiagent_core::config::AnalyzerConfig;
use guiagent_core::error::CoreError;
use guiagent_core::models::analysis::AnalysisResult;

use crate::cache::CachingAnalyzer;
use crate::detector::{normalize_detection, Detection, ElementDetector};
use crate::synthetic::synthetic_layout;

/// 분석기 동작 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerMode {
    /// 탐지기 위임
    ModelBacked,
    /// 합성 레이아웃
    SyntheticFallback,
}

impl std::fmt::Display for AnalyzerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerMode::ModelBacked => f.write_str("model"),
            AnalyzerMode::SyntheticFallback => f.write_str("synthetic"),
        }
    }
}

/// 화면 분석기
pub trait ScreenAnalyzer: Send + Sync {
    /// 프레임 분석: 실패는 `success = false` 결과로 반환
    fn analyze(&self, frame: &RgbaImage) -> AnalysisResult;

    /// 현재 동작 모드
    fn mode(&self) -> AnalyzerMode;

    /// 탐지기 실패로 합성 레이아웃으로 전환되었는지 여부
    fn is_degraded(&self) -> bool {
        false
    }
}

fn elapsed_secs(started: Instant) -> f64 {
    started.elapsed().as_secs_f64()
}

fn empty_frame_error(frame: &RgbaImage) -> Option<String> {
    let (w, h) = frame.dimensions();
    (w == 0 || h == 0).then(|| format!("빈 프레임: {}x{}", w, h))
}

fn into_result(detection: Detection) -> AnalysisResult {
    AnalysisResult::succeeded(detection.elements, detection.text_blocks)
}

// ============================================================
// SyntheticAnalyzer
// ============================================================

/// 합성 레이아웃 분석기 (데모/폴백 모드)
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticAnalyzer;

impl SyntheticAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl ScreenAnalyzer for SyntheticAnalyzer {
    fn analyze(&self, frame: &RgbaImage) -> AnalysisResult {
        let started = Instant::now();
        if let Some(reason) = empty_frame_error(frame) {
            return AnalysisResult::failed(reason).with_analysis_time(elapsed_secs(started));
        }
        let (w, h) = frame.dimensions();
        into_result(synthetic_layout(w, h)).with_analysis_time(elapsed_secs(started))
    }

    fn mode(&self) -> AnalyzerMode {
        AnalyzerMode::SyntheticFallback
    }
}

// ============================================================
// ModelBackedAnalyzer
// ============================================================

/// 탐지기 위임 분석기
///
/// 탐지기가 에러를 반환하거나 패닉하면 해당 호출은 실패 결과를 돌려주고,
/// 이후 호출부터는 합성 레이아웃을 사용한다.
pub struct ModelBackedAnalyzer {
    detector: Box<dyn ElementDetector>,
    degraded: AtomicBool,
}

impl ModelBackedAnalyzer {
    pub fn new(detector: Box<dyn ElementDetector>) -> Self {
        Self {
            detector,
            degraded: AtomicBool::new(false),
        }
    }

    /// 탐지기 이름
    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    fn run_detector(&self, frame: &RgbaImage) -> Result<Detection, CoreError> {
        match catch_unwind(AssertUnwindSafe(|| self.detector.detect(frame))) {
            Ok(result) => result,
            Err(_) => Err(CoreError::Analysis(format!(
                "탐지기 패닉: {}",
                self.detector.name()
            ))),
        }
    }
}

impl ScreenAnalyzer for ModelBackedAnalyzer {
    fn analyze(&self, frame: &RgbaImage) -> AnalysisResult {
        let started = Instant::now();
        if let Some(reason) = empty_frame_error(frame) {
            return AnalysisResult::failed(reason).with_analysis_time(elapsed_secs(started));
        }
        let (w, h) = frame.dimensions();

        if self.degraded.load(Ordering::Acquire) {
            return into_result(synthetic_layout(w, h)).with_analysis_time(elapsed_secs(started));
        }

        match self.run_detector(frame) {
            Ok(detection) => {
                let detection = normalize_detection(detection, w, h);
                debug!(
                    detector = self.detector.name(),
                    elements = detection.elements.len(),
                    text_blocks = detection.text_blocks.len(),
                    "프레임 분석 완료"
                );
                into_result(detection).with_analysis_time(elapsed_secs(started))
            }
            Err(e) => {
                self.degraded.store(true, Ordering::Release);
                warn!(
                    detector = self.detector.name(),
                    error = %e,
                    "탐지기 실패, 합성 레이아웃으로 전환"
                );
                AnalysisResult::failed(e.to_string()).with_analysis_time(elapsed_secs(started))
            }
        }
    }

    fn mode(&self) -> AnalyzerMode {
        if self.is_degraded() {
            AnalyzerMode::SyntheticFallback
        } else {
            AnalyzerMode::ModelBacked
        }
    }

    fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }
}

// ============================================================
// 팩토리
// ============================================================

/// 분석기 생성
///
/// `demo_mode`이거나 탐지기 로드가 실패하면 합성 분석기를 반환한다.
/// 로드 실패는 에러로 전파하지 않고 로그로만 남긴다.
pub fn create_screen_analyzer<L>(demo_mode: bool, loader: L) -> Box<dyn ScreenAnalyzer>
where
    L: FnOnce() -> Result<Box<dyn ElementDetector>, CoreError>,
{
    if demo_mode {
        info!("데모 모드: 합성 분석기 사용");
        return Box::new(SyntheticAnalyzer::new());
    }

    match loader() {
        Ok(detector) => {
            info!(detector = detector.name(), "탐지기 로드 완료");
            Box::new(ModelBackedAnalyzer::new(detector))
        }
        Err(e) => {
            warn!(error = %e, "탐지기 로드 실패, 합성 분석기로 전환");
            Box::new(SyntheticAnalyzer::new())
        }
    }
}

/// 설정 기반 분석기 생성 (`cache_capacity > 0`이면 캐시 적용)
pub fn create_from_config<L>(config: &AnalyzerConfig, loader: L) -> Box<dyn ScreenAnalyzer>
where
    L: FnOnce() -> Result<Box<dyn ElementDetector>, CoreError>,
{
    let analyzer = create_screen_analyzer(config.demo_mode, loader);
    match CachingAnalyzer::wrap(analyzer, config.cache_capacity) {
        Ok(cached) => Box::new(cached),
        Err(analyzer) => analyzer,
    }
}
