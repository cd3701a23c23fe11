//! 명령 모델.
//!
//! 2계층 명령 모델: `Command` (해석기/컴파일러 출력) → `WireCommand` (네트워크 전송 단위).
//! 와이어 문법 파싱과 `Command` → `WireCommand` 변환은 `guiagent-network::protocol`이 담당한다.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================
// Command: 해석기/컴파일러가 생성하는 명령
// ============================================================

/// 단일 명령
///
/// `Wait`, `Screenshot`, `ClickOn`은 로컬 표현 전용이며 와이어로 전송할 수 없다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 포인터를 절대 좌표로 이동
    Move { x: i32, y: i32 },
    /// 현재 포인터 위치에서 클릭
    Click,
    /// 지정 좌표로 이동 후 클릭 (`CLICK:x,y`)
    ClickAt { x: i32, y: i32 },
    /// 라벨로 지정한 대상 클릭 (워크플로우 표현, 좌표 미해석)
    ClickOn { target: String },
    /// 텍스트 입력
    Type { text: String },
    /// 대기 (초)
    Wait { seconds: f64 },
    /// 스크린샷 (예약)
    Screenshot,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { x, y } => write!(f, "MOVE:{x},{y}"),
            Command::Click => f.write_str("CLICK"),
            Command::ClickAt { x, y } => write!(f, "CLICK:{x},{y}"),
            Command::ClickOn { target } => write!(f, "CLICK:{target}"),
            Command::Type { text } => write!(f, "TYPE:{text}"),
            Command::Wait { seconds } => write!(f, "WAIT:{seconds}"),
            Command::Screenshot => f.write_str("SCREENSHOT"),
        }
    }
}

// ============================================================
// WireCommand: 와이어 프로토콜 명령
// ============================================================

/// 와이어로 전송 가능한 명령 (한 줄 = 한 메시지)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireCommand {
    /// `MOVE:<int>,<int>`
    Move { x: i32, y: i32 },
    /// `CLICK`
    Click,
    /// `TYPE:<text>`: 첫 번째 콜론 이후 전체가 텍스트
    Type { text: String },
}

impl WireCommand {
    /// 명령 이름 (로그 표시용)
    pub fn name(&self) -> &'static str {
        match self {
            WireCommand::Move { .. } => "MOVE",
            WireCommand::Click => "CLICK",
            WireCommand::Type { .. } => "TYPE",
        }
    }
}

impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireCommand::Move { x, y } => write!(f, "MOVE:{x},{y}"),
            WireCommand::Click => f.write_str("CLICK"),
            WireCommand::Type { text } => write!(f, "TYPE:{text}"),
        }
    }
}

impl From<WireCommand> for Command {
    fn from(wire: WireCommand) -> Self {
        match wire {
            WireCommand::Move { x, y } => Command::Move { x, y },
            WireCommand::Click => Command::Click,
            WireCommand::Type { text } => Command::Type { text },
        }
    }
}
