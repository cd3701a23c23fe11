//! 워크플로우 컴파일러.
//!
//! 선언적 단계 목록을 `;`로 구분된 하나의 명령 문자열로 변환한다.
//! 결과 문자열은 표시/로그용 로컬 표현이며 와이어 메시지가 아니다.
//! 전송하려면 [`split_workflow`]로 나눈 뒤 명령 단위로 보내야 한다.

use tracing::warn;

use guiagent_core::error::CoreError;
use guiagent_core::models::command::Command;
use guiagent_core::models::workflow::WorkflowStep;

/// 명령 구분자
pub const WORKFLOW_DELIMITER: char = ';';

/// `wait` 단계의 기본 대기 시간 (초)
pub const DEFAULT_WAIT_SECS: f64 = 1.0;

/// 단계 하나를 명령으로 변환. 알 수 없는 액션은 `InvalidArguments`.
pub fn step_to_command(step: &WorkflowStep) -> Result<Command, CoreError> {
    match step.action.as_str() {
        "click" => Ok(match &step.target {
            Some(target) => Command::ClickOn {
                target: target.clone(),
            },
            None => Command::Click,
        }),
        "type" => Ok(Command::Type {
            text: step.text.clone().unwrap_or_default(),
        }),
        "wait" => Ok(Command::Wait {
            seconds: step.duration.unwrap_or(DEFAULT_WAIT_SECS),
        }),
        "screenshot" => Ok(Command::Screenshot),
        other => Err(CoreError::InvalidArguments(format!(
            "알 수 없는 워크플로우 액션: {other}"
        ))),
    }
}

/// 단계 목록 → 명령 목록 (알 수 없는 액션은 경고 로그 후 건너뜀)
pub fn compile_commands(steps: &[WorkflowStep]) -> Vec<Command> {
    steps
        .iter()
        .enumerate()
        .filter_map(|(index, step)| match step_to_command(step) {
            Ok(command) => Some(command),
            Err(_) => {
                warn!(index, action = %step.action, "알 수 없는 워크플로우 액션, 건너뜀");
                None
            }
        })
        .collect()
}

/// 단계 목록 → `;` 구분 명령 문자열 (관대 모드)
pub fn compile(steps: &[WorkflowStep]) -> String {
    join(&compile_commands(steps))
}

/// 단계 목록 → `;` 구분 명령 문자열 (엄격 모드: 첫 번째 알 수 없는 액션에서 에러)
pub fn compile_strict(steps: &[WorkflowStep]) -> Result<String, CoreError> {
    let commands = steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            step_to_command(step).map_err(|_| {
                CoreError::InvalidArguments(format!(
                    "단계 {index}: 알 수 없는 워크플로우 액션: {}",
                    step.action
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(join(&commands))
}

/// 컴파일된 워크플로우 문자열을 명령 단위로 분리 (빈 조각 제외)
///
/// 구분자는 이스케이프되지 않는다. 텍스트나 대상 라벨에 `;`가 있으면 그 자리에서도 나뉜다.
/// 명령을 잃지 않으려면 문자열 대신 [`compile_commands`] 결과를 쓴다.
pub fn split_workflow(compiled: &str) -> Vec<&str> {
    compiled
        .split(WORKFLOW_DELIMITER)
        .filter(|part| !part.is_empty())
        .collect()
}

fn join(commands: &[Command]) -> String {
    commands
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(&WORKFLOW_DELIMITER.to_string())
}
