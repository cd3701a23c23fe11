//! GUI Agent 핵심 에러 타입.
//!
//! 어댑터 crate는 자체 에러 타입을 두더라도 `From<_> for CoreError`를 제공하여
//! 컴포넌트 경계에서 이 타입으로 수렴시킨다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 네트워크 에러 (연결 거부, 리셋, 쓰기 실패)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 연결 타임아웃
    #[error("연결 타임아웃: {timeout_ms}ms 초과")]
    ConnectTimeout {
        /// 초과된 타임아웃 시간 (밀리초)
        timeout_ms: u64,
    },

    /// 명령 프로토콜 에러 (파싱 실패, 전송 불가 명령)
    #[error("프로토콜 에러: {0}")]
    Protocol(String),

    /// 화면 분석 실패 (모델 미가용, 추론 실패)
    #[error("화면 분석 실패: {0}")]
    Analysis(String),

    /// 입력 주입 백엔드 실패
    #[error("입력 주입 실패: {0}")]
    InputInjection(String),

    /// 잘못된 인자
    #[error("잘못된 인자: {0}")]
    InvalidArguments(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}
