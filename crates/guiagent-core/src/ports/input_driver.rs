//! 입력 주입 백엔드 포트.
//!
//! 원격 호스트에서 포인터 이동, 클릭, 키 입력을 물리적으로 수행하는 인터페이스.
//! 프로세스 전역의 배타 자원이지만 연결 간 직렬화는 하지 않는다
//! (동시 클라이언트 간 물리 입력 순서는 정의되지 않음, 단일 운영자 배포 가정).

use async_trait::async_trait;

use crate::error::CoreError;

/// 입력 드라이버: 마우스/키보드 시뮬레이션 인터페이스
///
/// 구현체: `EnigoInputDriver` (실제 입력), `NoOpInputDriver`, `RecordingInputDriver`
#[async_trait]
pub trait InputDriver: Send + Sync {
    /// 포인터를 절대 좌표로 이동
    async fn mouse_move(&self, x: i32, y: i32) -> Result<(), CoreError>;

    /// 현재 포인터 위치에서 왼쪽 클릭
    async fn click(&self) -> Result<(), CoreError>;

    /// 텍스트를 키 입력으로 주입
    async fn type_text(&self, text: &str) -> Result<(), CoreError>;

    /// 플랫폼 이름 (예: "macos", "windows", "linux", "noop")
    fn platform(&self) -> &str;
}
