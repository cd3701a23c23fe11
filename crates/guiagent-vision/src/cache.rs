//! 분석 결과 캐시.
//!
//! 프레임 지문(SHA-256: 크기 + 전체 픽셀) → 분석 결과 LRU 캐시.
//! 캐시 적중 시에도 `analysis_time`은 이번 호출에서 새로 측정한 값이다.

use std::num::NonZeroUsize;
use std::time::Instant;

use image::RgbaImage;
use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::debug;

use guiagent_core::models::analysis::AnalysisResult;

use crate::analyzer::{AnalyzerMode, ScreenAnalyzer};

/// 프레임 지문 (SHA-256)
pub type FrameFingerprint = [u8; 32];

/// 프레임 지문 계산: 크기와 모든 픽셀을 해싱
pub fn frame_fingerprint(frame: &RgbaImage) -> FrameFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(frame.width().to_le_bytes());
    hasher.update(frame.height().to_le_bytes());
    hasher.update(frame.as_raw());
    hasher.finalize().into()
}

/// 캐시 적용 분석기
///
/// 성공한 결과만 저장한다. 실패 결과는 다음 호출에서 다시 분석되어야 하므로 저장하지 않는다.
pub struct CachingAnalyzer {
    inner: Box<dyn ScreenAnalyzer>,
    cache: Mutex<LruCache<FrameFingerprint, AnalysisResult>>,
}

impl CachingAnalyzer {
    /// 분석기에 캐시 적용. `capacity == 0`이면 원래 분석기를 `Err`로 돌려준다.
    pub fn wrap(
        inner: Box<dyn ScreenAnalyzer>,
        capacity: usize,
    ) -> Result<Self, Box<dyn ScreenAnalyzer>> {
        match NonZeroUsize::new(capacity) {
            Some(capacity) => Ok(Self {
                inner,
                cache: Mutex::new(LruCache::new(capacity)),
            }),
            None => Err(inner),
        }
    }

    /// 현재 캐시 항목 수
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// 캐시 비우기
    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

impl ScreenAnalyzer for CachingAnalyzer {
    fn analyze(&self, frame: &RgbaImage) -> AnalysisResult {
        let started = Instant::now();
        let key = frame_fingerprint(frame);

        if let Some(hit) = self.cache.lock().get(&key).cloned() {
            debug!("분석 캐시 적중");
            return hit.with_analysis_time(started.elapsed().as_secs_f64());
        }

        let result = self.inner.analyze(frame);
        if result.success {
            self.cache.lock().put(key, result.clone());
        }
        result.with_analysis_time(started.elapsed().as_secs_f64())
    }

    fn mode(&self) -> AnalyzerMode {
        self.inner.mode()
    }

    fn is_degraded(&self) -> bool {
        self.inner.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::SyntheticAnalyzer;
    use crate::detector::{Detection, ElementDetector};
    use guiagent_core::error::CoreError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingDetector {
        calls: Arc<AtomicUsize>,
    }

    impl ElementDetector for CountingDetector {
        fn detect(&self, frame: &RgbaImage) -> Result<Detection, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (w, h) = frame.dimensions();
            Ok(crate::synthetic::synthetic_layout(w, h))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting_analyzer(capacity: usize) -> (CachingAnalyzer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = crate::analyzer::ModelBackedAnalyzer::new(Box::new(CountingDetector {
            calls: calls.clone(),
        }));
        let cached = CachingAnalyzer::wrap(Box::new(inner), capacity)
            .unwrap_or_else(|_| panic!("capacity > 0"));
        (cached, calls)
    }

    #[test]
    fn fingerprint_distinguishes_pixels_and_size() {
        let a = RgbaImage::new(4, 4);
        let mut b = RgbaImage::new(4, 4);
        b.put_pixel(1, 1, image::Rgba([1, 0, 0, 255]));
        let c = RgbaImage::new(2, 8);

        assert_eq!(frame_fingerprint(&a), frame_fingerprint(&RgbaImage::new(4, 4)));
        assert_ne!(frame_fingerprint(&a), frame_fingerprint(&b));
        assert_ne!(frame_fingerprint(&a), frame_fingerprint(&c));
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let result = CachingAnalyzer::wrap(Box::new(SyntheticAnalyzer::new()), 0);
        assert!(result.is_err());
    }

    #[test]
    fn repeated_frame_hits_cache() {
        let (analyzer, calls) = counting_analyzer(4);
        let frame = RgbaImage::new(320, 240);

        let first = analyzer.analyze(&frame);
        let second = analyzer.analyze(&frame);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.elements, second.elements);
        assert!(second.analysis_time >= 0.0);
        assert_eq!(analyzer.len(), 1);
    }

    #[test]
    fn lru_evicts_oldest_frame() {
        let (analyzer, calls) = counting_analyzer(1);
        analyzer.analyze(&RgbaImage::new(10, 10));
        analyzer.analyze(&RgbaImage::new(20, 20));
        analyzer.analyze(&RgbaImage::new(10, 10));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(analyzer.len(), 1);

        analyzer.clear();
        assert!(analyzer.is_empty());
    }

    #[test]
    fn failed_results_are_not_cached() {
        let (analyzer, _) = counting_analyzer(4);
        let result = analyzer.analyze(&RgbaImage::new(0, 0));
        assert!(!result.success);
        assert!(analyzer.is_empty());
    }
}
