//! 명령 전송기 포트.
//!
//! 송신 측은 fire-and-forget: 연결 → 쓰기 → 종료.
//! 네트워크 실패는 전파하지 않고 bool 결과 + 로그로 보고한다.
//! 재시도 정책은 호출자가 결정한다.

use async_trait::async_trait;

use crate::models::command::WireCommand;

/// 명령 전송기: 원격 명령 서버로 와이어 명령을 보냄
///
/// 구현체: `TcpCommandSender`
#[async_trait]
pub trait CommandSender: Send + Sync {
    /// 명령 1개를 새 연결로 전송. 성공 여부 반환.
    async fn send(&self, command: &WireCommand) -> bool;

    /// 여러 명령을 한 연결에서 순서대로 전송 (줄 단위). 성공 여부 반환.
    async fn send_batch(&self, commands: &[WireCommand]) -> bool;

    /// 대상 엔드포인트 (로그 표시용, 예: "127.0.0.1:9999")
    fn endpoint(&self) -> String;
}
