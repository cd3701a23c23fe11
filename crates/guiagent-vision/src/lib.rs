//! # guiagent-vision
//!
//! 화면 분석 크레이트.
//! 캡처된 프레임을 구조화된 분석 결과(요소 + 텍스트 영역)로 변환하고,
//! 분석 결과에 대한 질의, 오버레이 시각화, 텍스트 요약을 제공한다.
//!
//! ## 구조
//!
//! - [`detector`]: 교체 가능한 요소 탐지기 계약 (`ElementDetector`) + 출력 정규화
//! - [`synthetic`]: 프레임 크기만으로 결정되는 합성 레이아웃
//! - [`analyzer`]: `ModelBackedAnalyzer` / `SyntheticAnalyzer` + 팩토리
//! - [`cache`]: 프레임 지문 기반 분석 결과 LRU 캐시
//! - [`query`]: 클릭 가능 요소 필터, 라벨 검색
//! - [`overlay`]: 분석 결과 오버레이 렌더링
//! - [`summary`]: 분석 결과 텍스트 요약

pub mod analyzer;
pub mod cache;
pub mod detector;
pub mod overlay;
pub mod query;
pub mod summary;
pub mod synthetic;
