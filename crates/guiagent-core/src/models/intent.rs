//! 사용자 의도 모델.
//!
//! 자유 문자열 대신 유한한 의도 열거형을 사용하여
//! 해석기의 매칭 알고리즘을 전수 테스트할 수 있게 한다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 정규 사용자 의도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// 신청 / 제출
    Submit,
    /// 취소
    Cancel,
    /// 확인
    Confirm,
    /// 다음
    Next,
}

impl Intent {
    /// 모든 의도 (선언 순서)
    pub const ALL: [Intent; 4] = [Intent::Submit, Intent::Cancel, Intent::Confirm, Intent::Next];

    /// 영문 정규 이름
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Submit => "submit",
            Intent::Cancel => "cancel",
            Intent::Confirm => "confirm",
            Intent::Next => "next",
        }
    }

    /// 한국어 이름 (운영자 입력 기준)
    pub fn korean(self) -> &'static str {
        match self {
            Intent::Submit => "신청",
            Intent::Cancel => "취소",
            Intent::Confirm => "확인",
            Intent::Next => "다음",
        }
    }

    /// 의도 문자열 해석 (영문 이름 또는 한국어 이름, 대소문자/공백 무시)
    ///
    /// 인식할 수 없으면 `None`.
    pub fn parse(input: &str) -> Option<Intent> {
        let needle = input.trim().to_lowercase();
        Intent::ALL
            .into_iter()
            .find(|intent| needle == intent.as_str() || needle == intent.korean())
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
