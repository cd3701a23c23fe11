//! TCP 명령 전송기.
//!
//! fire-and-forget: 연결 → (선택) 핸드셰이크 수신 → 명령 쓰기 → 종료.
//! 연결/쓰기는 연결 타임아웃으로 제한하며, 네트워크 실패는 bool 결과와 로그로만 보고한다.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use guiagent_core::config::SenderConfig;
use guiagent_core::error::CoreError;
use guiagent_core::models::command::{Command, WireCommand};
use guiagent_core::ports::command_sender::CommandSender;

use crate::protocol::{encode_line, ToWire};

/// TCP 명령 전송기
#[derive(Debug, Clone)]
pub struct TcpCommandSender {
    config: SenderConfig,
    handshake_len: usize,
}

impl TcpCommandSender {
    pub fn new(config: SenderConfig) -> Self {
        Self {
            config,
            handshake_len: 2,
        }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// 명령 1개를 와이어 명령으로 변환하여 한 연결로 전송
    ///
    /// 전송할 수 없는 명령(WAIT, SCREENSHOT, 라벨 대상 CLICK)은 `false`.
    pub async fn send_command(&self, command: &Command) -> bool {
        match command.to_wire() {
            Ok(wire) => self.send_batch(&wire).await,
            Err(e) => {
                warn!(command = %command, error = %e, "명령 전송 불가");
                false
            }
        }
    }

    /// 한 연결에서 명령들을 순서대로 전송. 실패 원인을 에러로 반환.
    pub async fn deliver(&self, commands: &[WireCommand]) -> Result<(), CoreError> {
        // 한 줄로 표현할 수 없는 명령이 있으면 연결 전에 거부
        let payload = commands
            .iter()
            .map(encode_line)
            .collect::<Result<String, _>>()?;

        let limit = self.config.connect_timeout();
        let timeout_ms = self.config.connect_timeout_ms;
        let endpoint = self.config.endpoint();

        let mut stream = timeout(limit, TcpStream::connect(&endpoint))
            .await
            .map_err(|_| CoreError::ConnectTimeout { timeout_ms })?
            .map_err(|e| CoreError::Network(format!("연결 실패: {endpoint}: {e}")))?;

        if self.config.await_handshake {
            let mut handshake = vec![0u8; self.handshake_len];
            timeout(limit, stream.read_exact(&mut handshake))
                .await
                .map_err(|_| CoreError::ConnectTimeout { timeout_ms })?
                .map_err(|e| CoreError::Network(format!("핸드셰이크 수신 실패: {e}")))?;
            debug!(handshake = %String::from_utf8_lossy(&handshake), "핸드셰이크 수신");
        }

        timeout(limit, async {
            stream.write_all(payload.as_bytes()).await?;
            stream.shutdown().await
        })
        .await
        .map_err(|_| CoreError::ConnectTimeout { timeout_ms })?
        .map_err(|e| CoreError::Network(format!("전송 실패: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl CommandSender for TcpCommandSender {
    async fn send(&self, command: &WireCommand) -> bool {
        self.send_batch(std::slice::from_ref(command)).await
    }

    async fn send_batch(&self, commands: &[WireCommand]) -> bool {
        if commands.is_empty() {
            debug!("보낼 명령 없음");
            return true;
        }

        match self.deliver(commands).await {
            Ok(()) => {
                info!(
                    endpoint = %self.config.endpoint(),
                    count = commands.len(),
                    first = %commands[0],
                    "명령 전송 완료"
                );
                true
            }
            Err(e) => {
                warn!(endpoint = %self.config.endpoint(), error = %e, "명령 전송 실패");
                false
            }
        }
    }

    fn endpoint(&self) -> String {
        self.config.endpoint()
    }
}
