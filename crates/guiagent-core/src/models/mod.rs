//! GUI Agent 도메인 모델.
//!
//! 화면 분석 결과, 명령, 의도, 워크플로우 단계 등
//! 파이프라인 단계 사이를 흐르는 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod analysis;
pub mod command;
pub mod intent;
pub mod workflow;
