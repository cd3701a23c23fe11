//! 명령 프로토콜.
//!
//! 줄 단위 UTF-8 텍스트 프로토콜. 한 줄이 하나의 완결된 메시지다.
//!
//! | 명령 | 문법 | 동작 |
//! |---|---|---|
//! | Move | `MOVE:<int>,<int>` | 포인터를 절대 좌표로 이동 |
//! | Click | `CLICK` | 현재 위치에서 클릭 |
//! | Type | `TYPE:<text>` | 첫 번째 콜론 이후 전체를 키 입력 |

use thiserror::Error;

use guiagent_core::error::CoreError;
use guiagent_core::models::command::{Command, WireCommand};

/// 명령 이름과 인자 구분자 (첫 번째만 유효)
pub const NAME_DELIMITER: char = ':';

/// 좌표 구분자
pub const COORD_DELIMITER: char = ',';

/// 프로토콜 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// 빈 줄
    #[error("빈 명령")]
    Empty,

    /// 알 수 없는 명령 이름
    #[error("알 수 없는 명령: {0}")]
    Unknown(String),

    /// 인자 형식 오류
    #[error("잘못된 {command} 명령: {reason}")]
    Malformed {
        command: &'static str,
        reason: String,
    },

    /// 와이어로 보낼 수 없는 명령 (WAIT, SCREENSHOT, 라벨 대상 CLICK)
    #[error("전송할 수 없는 명령: {0}")]
    NotTransmittable(String),
}

impl From<ProtocolError> for CoreError {
    fn from(err: ProtocolError) -> Self {
        CoreError::Protocol(err.to_string())
    }
}

fn malformed(command: &'static str, reason: impl Into<String>) -> ProtocolError {
    ProtocolError::Malformed {
        command,
        reason: reason.into(),
    }
}

fn split_name(line: &str) -> (&str, Option<&str>) {
    match line.split_once(NAME_DELIMITER) {
        Some((name, rest)) => (name, Some(rest)),
        None => (line, None),
    }
}

fn parse_coords(command: &'static str, payload: &str) -> Result<(i32, i32), ProtocolError> {
    let (x, y) = payload
        .split_once(COORD_DELIMITER)
        .ok_or_else(|| malformed(command, format!("좌표 구분자 없음: {payload:?}")))?;
    let parse = |raw: &str| {
        raw.trim()
            .parse::<i32>()
            .map_err(|_| malformed(command, format!("정수 좌표가 아님: {raw:?}")))
    };
    Ok((parse(x)?, parse(y)?))
}

/// 와이어 한 줄 파싱 (줄 끝 `\n`, `\r`은 호출자가 제거)
///
/// 명령 이름은 대소문자를 구분한다. `TYPE`의 텍스트는 가공하지 않는다.
pub fn parse_line(line: &str) -> Result<WireCommand, ProtocolError> {
    if line.trim().is_empty() {
        return Err(ProtocolError::Empty);
    }

    let (name, payload) = split_name(line);
    match (name.trim(), payload) {
        ("MOVE", Some(payload)) => {
            let (x, y) = parse_coords("MOVE", payload)?;
            Ok(WireCommand::Move { x, y })
        }
        ("MOVE", None) => Err(malformed("MOVE", "좌표 없음")),
        ("CLICK", None) => Ok(WireCommand::Click),
        ("CLICK", Some(_)) => Err(malformed("CLICK", "인자를 받지 않음")),
        ("TYPE", Some(text)) => Ok(WireCommand::Type {
            text: text.to_string(),
        }),
        ("TYPE", None) => Err(malformed("TYPE", "텍스트 구분자 없음")),
        (other, _) => Err(ProtocolError::Unknown(other.to_string())),
    }
}

/// 와이어 명령이 한 줄로 표현 가능한지 검사
///
/// `TYPE` 텍스트에 `\n`이 있으면 수신 측에서 여러 명령으로 나뉘고,
/// `\r`은 줄 끝 처리에서 사라지므로 둘 다 거부한다.
pub fn check_wire(command: &WireCommand) -> Result<(), ProtocolError> {
    match command {
        WireCommand::Type { text } if text.contains(['\n', '\r']) => {
            Err(malformed("TYPE", "텍스트에 줄바꿈 문자 포함"))
        }
        _ => Ok(()),
    }
}

/// 와이어 명령 → 전송용 한 줄 (`\n` 포함)
///
/// 한 줄로 표현할 수 없는 명령은 [`check_wire`] 에러를 반환한다.
pub fn encode_line(command: &WireCommand) -> Result<String, ProtocolError> {
    check_wire(command)?;
    Ok(format!("{command}\n"))
}

/// 명령 표시 형식 전체 파싱 (`CLICK:x,y`, `CLICK:<label>`, `WAIT:<secs>`, `SCREENSHOT` 포함)
///
/// CLI 입력처럼 해석기/컴파일러 출력 형식을 그대로 받는 곳에서 쓴다.
pub fn parse_command(input: &str) -> Result<Command, ProtocolError> {
    let input = input.trim_end_matches(['\r', '\n']);
    if input.trim().is_empty() {
        return Err(ProtocolError::Empty);
    }

    let (name, payload) = split_name(input);
    match (name.trim(), payload) {
        ("CLICK", Some(payload)) => match parse_coords("CLICK", payload) {
            Ok((x, y)) => Ok(Command::ClickAt { x, y }),
            Err(_) => Ok(Command::ClickOn {
                target: payload.to_string(),
            }),
        },
        ("WAIT", Some(payload)) => {
            let seconds = payload
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|s| s.is_finite() && *s >= 0.0)
                .ok_or_else(|| malformed("WAIT", format!("대기 시간이 아님: {payload:?}")))?;
            Ok(Command::Wait { seconds })
        }
        ("WAIT", None) => Err(malformed("WAIT", "대기 시간 없음")),
        ("SCREENSHOT", None) => Ok(Command::Screenshot),
        ("SCREENSHOT", Some(_)) => Err(malformed("SCREENSHOT", "인자를 받지 않음")),
        _ => parse_line(input).map(Command::from),
    }
}

/// `Command` → 와이어 명령 목록 변환
pub trait ToWire {
    fn to_wire(&self) -> Result<Vec<WireCommand>, ProtocolError>;
}

impl ToWire for Command {
    /// `ClickAt`은 `MOVE` + `CLICK` 두 줄이 된다.
    fn to_wire(&self) -> Result<Vec<WireCommand>, ProtocolError> {
        match self {
            Command::Move { x, y } => Ok(vec![WireCommand::Move { x: *x, y: *y }]),
            Command::Click => Ok(vec![WireCommand::Click]),
            Command::ClickAt { x, y } => {
                Ok(vec![WireCommand::Move { x: *x, y: *y }, WireCommand::Click])
            }
            Command::Type { text } => {
                let wire = WireCommand::Type { text: text.clone() };
                check_wire(&wire)?;
                Ok(vec![wire])
            }
            Command::ClickOn { .. } | Command::Wait { .. } | Command::Screenshot => {
                Err(ProtocolError::NotTransmittable(self.to_string()))
            }
        }
    }
}
