//! # guiagent-network
//!
//! 명령 프로토콜 크레이트.
//! 송신 측과 수신 측이 공유하는 줄 단위 텍스트 프로토콜과
//! 원격 명령 서버, TCP 명령 전송기를 제공한다.
//!
//! ## 구조
//!
//! - [`protocol`]: 와이어 문법 파싱/직렬화, `Command` → `WireCommand` 변환
//! - [`server`]: 연결당 독립 태스크로 명령을 읽고 입력 드라이버로 실행하는 서버
//! - [`client`]: `CommandSender` 포트의 TCP 구현 (fire-and-forget)

pub mod client;
pub mod protocol;
pub mod server;
