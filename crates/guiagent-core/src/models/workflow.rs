//! 워크플로우 단계 모델.
//!
//! 선언적 다단계 계획의 한 단계. `action`은 문자열로 유지하여
//! 알 수 없는 액션도 역직렬화 단계에서 버려지지 않게 한다.

use serde::{Deserialize, Serialize};

/// 워크플로우 단계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// 액션 이름 ("click", "type", "wait", "screenshot")
    pub action: String,
    /// 클릭 대상 라벨
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// 입력할 텍스트
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// 대기 시간 (초)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl WorkflowStep {
    fn bare(action: &str) -> Self {
        Self {
            action: action.to_string(),
            target: None,
            text: None,
            duration: None,
        }
    }

    /// 라벨 대상 클릭 단계
    pub fn click(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::bare("click")
        }
    }

    /// 텍스트 입력 단계
    pub fn type_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::bare("type")
        }
    }

    /// 대기 단계
    pub fn wait(seconds: f64) -> Self {
        Self {
            duration: Some(seconds),
            ..Self::bare("wait")
        }
    }

    /// 스크린샷 단계
    pub fn screenshot() -> Self {
        Self::bare("screenshot")
    }

    /// 임의 액션 이름의 단계 (알 수 없는 액션 포함)
    pub fn custom(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target: None,
            text: None,
            duration: None,
        }
    }
}
