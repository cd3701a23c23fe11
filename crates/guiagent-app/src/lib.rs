//! # guiagent-app
//!
//! GUI Agent 바이너리의 라이브러리 부분.
//! 캡처 → 분석 → 해석 → 전송 루프를 이끄는 명시적 세션 컨텍스트와
//! 종료 신호 관리를 제공한다.

pub mod lifecycle;
pub mod session;
