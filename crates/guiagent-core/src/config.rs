//! 애플리케이션 설정 구조체.
//!
//! 수신 서버 바인드/타임아웃, 송신 엔드포인트, 분석기 모드, 입력 백엔드 등
//! 런타임 설정을 정의한다. `ConfigManager`를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 원격 명령 서버(수신 측) 설정
    #[serde(default)]
    pub receiver: ReceiverConfig,
    /// 명령 전송기(송신 측) 설정
    #[serde(default)]
    pub sender: SenderConfig,
    /// 화면 분석기 설정
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// 입력 주입 백엔드 설정
    #[serde(default)]
    pub input: InputConfig,
}

// ============================================================
// 수신 서버 설정
// ============================================================

/// 원격 명령 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// 바인드 주소 (기본: 모든 인터페이스)
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// 수신 포트
    #[serde(default = "default_port")]
    pub port: u16,
    /// 연결 유휴 타임아웃 (초): 바이트 없이 이 시간이 지나면 서버가 연결 종료
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// 연결 직후 보내는 2바이트 확인 응답
    #[serde(default = "default_handshake")]
    pub handshake: String,
    /// 한 줄 최대 길이 (바이트): 초과 줄은 잘못된 명령으로 취급
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            idle_timeout_secs: default_idle_timeout_secs(),
            handshake: default_handshake(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl ReceiverConfig {
    /// 유휴 타임아웃을 Duration으로 반환
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// "host:port" 바인드 주소
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

// ============================================================
// 송신 설정
// ============================================================

/// 명령 전송기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// 대상 호스트
    #[serde(default = "default_sender_host")]
    pub host: String,
    /// 대상 포트
    #[serde(default = "default_port")]
    pub port: u16,
    /// 연결/쓰기 타임아웃 (밀리초)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// 전송 전에 2바이트 확인 응답을 읽을지 여부
    ///
    /// 읽지 않은 응답을 남긴 채 닫으면 일부 OS는 FIN 대신 RST를 보낸다.
    #[serde(default = "default_true")]
    pub await_handshake: bool,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            host: default_sender_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            await_handshake: true,
        }
    }
}

impl SenderConfig {
    /// 연결 타임아웃을 Duration으로 반환
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// "host:port" 대상 주소
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================
// 분석기 설정
// ============================================================

/// 화면 분석기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// 데모 모드: 모델 로드 없이 합성 레이아웃 사용
    #[serde(default = "default_true")]
    pub demo_mode: bool,
    /// 모델 가중치 디렉토리 (None이면 모델 모드 불가)
    #[serde(default)]
    pub model_dir: Option<PathBuf>,
    /// 프레임 지문 캐시 용량 (0이면 비활성화)
    #[serde(default)]
    pub cache_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            demo_mode: true,
            model_dir: None,
            cache_capacity: 0,
        }
    }
}

// ============================================================
// 입력 백엔드 설정
// ============================================================

/// 입력 주입 백엔드 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputBackend {
    /// 로깅만 수행
    #[default]
    Noop,
    /// enigo 기반 실제 입력 (`enigo` feature 필요)
    Enigo,
}

/// 입력 주입 백엔드 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub backend: InputBackend,
}

// ============================================================
// AppConfig
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            receiver: ReceiverConfig::default(),
            sender: SenderConfig::default(),
            analyzer: AnalyzerConfig::default(),
            input: InputConfig::default(),
        }
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.receiver.port == 0 {
            return Err(validation("receiver.port", "0번 포트는 사용할 수 없음"));
        }
        if self.receiver.idle_timeout_secs == 0 {
            return Err(validation(
                "receiver.idle_timeout_secs",
                "유휴 타임아웃은 1초 이상이어야 함",
            ));
        }
        if self.receiver.handshake.len() != 2 {
            return Err(validation(
                "receiver.handshake",
                "확인 응답은 정확히 2바이트여야 함",
            ));
        }
        if self.receiver.max_line_bytes == 0 {
            return Err(validation("receiver.max_line_bytes", "0보다 커야 함"));
        }
        if self.sender.port == 0 {
            return Err(validation("sender.port", "0번 포트는 사용할 수 없음"));
        }
        if self.sender.connect_timeout_ms == 0 {
            return Err(validation(
                "sender.connect_timeout_ms",
                "연결 타임아웃은 0보다 커야 함",
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn validation(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_sender_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_idle_timeout_secs() -> u64 {
    5
}

fn default_handshake() -> String {
    "OK".to_string()
}

fn default_max_line_bytes() -> usize {
    4096
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}
