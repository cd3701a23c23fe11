//! # guiagent-automation
//!
//! 자동화 크레이트.
//! 분석 결과 + 사용자 의도 → 명령 해석, 선언적 워크플로우 → 명령열 컴파일,
//! 입력 주입 백엔드 어댑터를 제공한다.
//!
//! ## 구조
//!
//! - [`intent_resolver`]: 의도 + 분석 결과 → `CLICK:x,y` (동의어 테이블 기반)
//! - [`workflow`]: 워크플로우 단계 → `;` 구분 명령 문자열
//! - [`input_driver`]: `NoOpInputDriver`, `RecordingInputDriver`, `EnigoInputDriver` (feature `enigo`)

pub mod input_driver;
pub mod intent_resolver;
pub mod workflow;
