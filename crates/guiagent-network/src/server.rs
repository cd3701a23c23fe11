//! 원격 명령 서버.
//!
//! 연결마다 독립 태스크를 띄워 줄 단위 명령을 읽고 입력 드라이버로 실행한다.
//!
//! 연결 상태: `CONNECTED → (READING ⇄ DISPATCHING) → CLOSED`
//! - 수락 직후 2바이트 핸드셰이크 전송
//! - 파싱/실행 실패는 로그만 남기고 같은 연결에서 계속 읽는다
//! - 빈 읽기(상대 종료), 유휴 타임아웃, UTF-8 디코딩 실패 시 연결 종료
//!
//! 입력 드라이버는 연결 간 직렬화하지 않는다. 동시 연결의 물리 입력 순서는 정의되지 않는다.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use guiagent_core::config::ReceiverConfig;
use guiagent_core::error::CoreError;
use guiagent_core::models::command::WireCommand;
use guiagent_core::ports::input_driver::InputDriver;

use crate::protocol::{parse_line, ProtocolError};

/// accept 실패 후 재시도 대기
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

// ============================================================
// 연결 설정 / 요약
// ============================================================

/// 연결 1개 처리 설정
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// 유휴 타임아웃 (읽기 1회 기준)
    pub idle_timeout: Duration,
    /// 수락 직후 보내는 핸드셰이크
    pub handshake: Vec<u8>,
    /// 한 줄 최대 바이트 (줄바꿈 제외)
    pub max_line_bytes: usize,
}

impl From<&ReceiverConfig> for ConnectionSettings {
    fn from(config: &ReceiverConfig) -> Self {
        Self {
            idle_timeout: config.idle_timeout(),
            handshake: config.handshake.as_bytes().to_vec(),
            max_line_bytes: config.max_line_bytes,
        }
    }
}

/// 연결 종료 사유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// 상대가 연결을 닫음 (빈 읽기)
    PeerClosed,
    /// 상대가 연결을 리셋함
    PeerReset,
    /// 유휴 타임아웃
    IdleTimeout,
    /// UTF-8 디코딩 실패
    InvalidUtf8,
    /// 핸드셰이크 전송 실패
    HandshakeFailed(String),
    /// 그 외 I/O 에러
    Io(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => f.write_str("peer_closed"),
            CloseReason::PeerReset => f.write_str("peer_reset"),
            CloseReason::IdleTimeout => f.write_str("idle_timeout"),
            CloseReason::InvalidUtf8 => f.write_str("invalid_utf8"),
            CloseReason::HandshakeFailed(e) => write!(f, "handshake_failed: {e}"),
            CloseReason::Io(e) => write!(f, "io: {e}"),
        }
    }
}

/// 연결 1개의 처리 결과 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    /// 실행 성공한 명령 수
    pub dispatched: usize,
    /// 입력 드라이버 실행 실패 수
    pub failed: usize,
    /// 파싱 실패로 무시한 줄 수 (알 수 없는 명령, 형식 오류, 최대 길이 초과)
    pub ignored: usize,
    /// 종료 사유
    pub close_reason: CloseReason,
}

impl ConnectionSummary {
    fn new() -> Self {
        Self {
            dispatched: 0,
            failed: 0,
            ignored: 0,
            close_reason: CloseReason::PeerClosed,
        }
    }
}

// ============================================================
// 연결 처리
// ============================================================

enum ReadOutcome {
    Line(Vec<u8>),
    TooLong,
    Closed(CloseReason),
}

fn close_reason_for(err: &std::io::Error) -> CloseReason {
    match err.kind() {
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted
        | std::io::ErrorKind::BrokenPipe => CloseReason::PeerReset,
        _ => CloseReason::Io(err.to_string()),
    }
}

/// 한 줄 읽기 (최대 길이 초과 시 줄 끝까지 버림)
///
/// 유휴 타임아웃은 읽기 1회마다 새로 시작한다. 바이트가 도착하는 동안은 줄이 느리게 와도 끊지 않는다.
/// 줄 끝 `\n`과 그 앞의 `\r`은 길이에 포함하지 않는다.
/// 줄바꿈 없이 연결이 끝난 마지막 조각도 한 줄로 취급한다.
async fn read_line<R>(reader: &mut R, settings: &ConnectionSettings) -> ReadOutcome
where
    R: AsyncBufRead + Unpin,
{
    // `\r` 한 바이트까지는 줄 끝 처리 전에 허용
    let hold_limit = settings.max_line_bytes + 1;
    let mut buf = Vec::new();
    let mut too_long = false;
    let mut received_any = false;

    loop {
        let available = match timeout(settings.idle_timeout, reader.fill_buf()).await {
            Err(_) => return ReadOutcome::Closed(CloseReason::IdleTimeout),
            Ok(Err(e)) => return ReadOutcome::Closed(close_reason_for(&e)),
            Ok(Ok(bytes)) => bytes,
        };
        if available.is_empty() {
            if !received_any {
                return ReadOutcome::Closed(CloseReason::PeerClosed);
            }
            break;
        }
        received_any = true;

        let newline = available.iter().position(|&b| b == b'\n');
        let chunk = &available[..newline.unwrap_or(available.len())];
        if !too_long {
            buf.extend_from_slice(chunk);
            if buf.len() > hold_limit {
                too_long = true;
                buf = Vec::new();
            }
        }
        let used = chunk.len() + usize::from(newline.is_some());
        reader.consume(used);

        if newline.is_some() {
            break;
        }
    }

    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    if too_long || buf.len() > settings.max_line_bytes {
        return ReadOutcome::TooLong;
    }
    ReadOutcome::Line(buf)
}

/// 와이어 명령 1개를 입력 드라이버로 실행
pub async fn dispatch(driver: &dyn InputDriver, command: &WireCommand) -> Result<(), CoreError> {
    match command {
        WireCommand::Move { x, y } => driver.mouse_move(*x, *y).await,
        WireCommand::Click => driver.click().await,
        WireCommand::Type { text } => driver.type_text(text).await,
    }
}

/// 연결 1개 처리: 종료될 때까지 읽고 실행한 뒤 요약 반환
///
/// 명령 실행 중에는 취소되지 않는다. 실행이 끝난 뒤에만 다음 읽기로 넘어간다.
pub async fn handle_connection<S>(
    stream: S,
    settings: &ConnectionSettings,
    driver: &dyn InputDriver,
) -> ConnectionSummary
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut summary = ConnectionSummary::new();
    let (read_half, mut write_half) = tokio::io::split(stream);

    if let Err(e) = async {
        write_half.write_all(&settings.handshake).await?;
        write_half.flush().await
    }
    .await
    {
        summary.close_reason = CloseReason::HandshakeFailed(e.to_string());
        log_summary(&summary);
        return summary;
    }

    let mut reader = BufReader::new(read_half);

    loop {
        let raw = match read_line(&mut reader, settings).await {
            ReadOutcome::Line(raw) => raw,
            ReadOutcome::TooLong => {
                summary.ignored += 1;
                warn!(max_line_bytes = settings.max_line_bytes, "최대 길이 초과 줄 무시");
                continue;
            }
            ReadOutcome::Closed(reason) => {
                summary.close_reason = reason;
                break;
            }
        };

        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "UTF-8 디코딩 실패, 연결 종료");
                summary.close_reason = CloseReason::InvalidUtf8;
                break;
            }
        };
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(ProtocolError::Empty) => continue,
            Err(e) => {
                summary.ignored += 1;
                warn!(line = %line, error = %e, "명령 무시");
                continue;
            }
        };

        match dispatch(driver, &command).await {
            Ok(()) => {
                summary.dispatched += 1;
                info!(command = %command, "명령 실행");
            }
            Err(e) => {
                summary.failed += 1;
                error!(command = %command, error = %e, "명령 실행 실패");
            }
        }
    }

    log_summary(&summary);
    summary
}

fn log_summary(summary: &ConnectionSummary) {
    info!(
        dispatched = summary.dispatched,
        failed = summary.failed,
        ignored = summary.ignored,
        close_reason = %summary.close_reason,
        "연결 종료"
    );
}

// ============================================================
// RemoteCommandServer
// ============================================================

/// 원격 명령 서버
pub struct RemoteCommandServer {
    listener: TcpListener,
    settings: Arc<ConnectionSettings>,
    driver: Arc<dyn InputDriver>,
}

impl RemoteCommandServer {
    /// 설정된 주소에 바인드
    pub async fn bind(
        config: &ReceiverConfig,
        driver: Arc<dyn InputDriver>,
    ) -> Result<Self, CoreError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| CoreError::Network(format!("바인드 실패: {addr}: {e}")))?;
        info!(
            addr = %addr,
            backend = driver.platform(),
            idle_timeout_secs = config.idle_timeout_secs,
            "원격 명령 서버 바인드"
        );
        Ok(Self {
            listener,
            settings: Arc::new(ConnectionSettings::from(config)),
            driver,
        })
    }

    /// 실제 바인드된 주소 (포트 0 바인드 시 할당된 포트 확인용)
    pub fn local_addr(&self) -> Result<SocketAddr, CoreError> {
        Ok(self.listener.local_addr()?)
    }

    /// 종료 없이 계속 수락
    pub async fn run(self) -> Result<(), CoreError> {
        let (_keep_alive, shutdown_rx) = watch::channel(false);
        self.run_until(shutdown_rx).await
    }

    /// 종료 신호까지 수락
    ///
    /// 종료 신호 이후 새 연결은 받지 않는다. 진행 중인 연결은 기다리지 않는다.
    pub async fn run_until(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), CoreError> {
        info!(addr = ?self.listener.local_addr().ok(), "원격 명령 서버 시작");

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(e) => {
                        warn!(error = %e, "연결 수락 실패");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("원격 명령 서버 종료");
        Ok(())
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        let conn_id = Uuid::new_v4();
        let span = info_span!("connection", %conn_id, %peer);
        let settings = Arc::clone(&self.settings);
        let driver = Arc::clone(&self.driver);

        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "TCP_NODELAY 설정 실패");
        }

        tokio::spawn(
            async move {
                info!("연결 수락");
                handle_connection(stream, &settings, driver.as_ref()).await;
            }
            .instrument(span),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use guiagent_automation::input_driver::{InputEvent, RecordingInputDriver};
    use tokio::io::{duplex, AsyncReadExt};

    fn settings(idle_ms: u64) -> ConnectionSettings {
        ConnectionSettings {
            idle_timeout: Duration::from_millis(idle_ms),
            handshake: b"OK".to_vec(),
            max_line_bytes: 32,
        }
    }

    /// 클라이언트 측에서 바이트를 보내고 닫은 뒤 서버 처리 결과 반환
    async fn run_session(
        input: &[u8],
        settings: &ConnectionSettings,
        driver: &dyn InputDriver,
    ) -> (ConnectionSummary, Vec<u8>) {
        let (mut client, server) = duplex(1024);
        client.write_all(input).await.unwrap();
        client.shutdown().await.unwrap();
        let summary = handle_connection(server, settings, driver).await;
        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        (summary, received)
    }

    struct FailingTypeDriver {
        inner: RecordingInputDriver,
    }

    #[async_trait]
    impl InputDriver for FailingTypeDriver {
        async fn mouse_move(&self, x: i32, y: i32) -> Result<(), CoreError> {
            self.inner.mouse_move(x, y).await
        }
        async fn click(&self) -> Result<(), CoreError> {
            self.inner.click().await
        }
        async fn type_text(&self, _text: &str) -> Result<(), CoreError> {
            Err(CoreError::InputInjection("키보드 없음".to_string()))
        }
        fn platform(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn sends_handshake_and_dispatches_in_order() {
        let driver = RecordingInputDriver::new();
        let (summary, received) = run_session(
            b"MOVE:120,340\nCLICK\nTYPE:hello:world\n",
            &settings(1000),
            &driver,
        )
        .await;

        assert_eq!(received, b"OK");
        assert_eq!(summary.dispatched, 3);
        assert_eq!(summary.close_reason, CloseReason::PeerClosed);
        assert_eq!(
            driver.events(),
            vec![
                InputEvent::Move { x: 120, y: 340 },
                InputEvent::Click,
                InputEvent::Type {
                    text: "hello:world".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn malformed_line_does_not_stop_connection() {
        let driver = RecordingInputDriver::new();
        let (summary, _) =
            run_session(b"MOVE:abc,def\nCLICK\n", &settings(1000), &driver).await;

        assert_eq!(driver.events(), vec![InputEvent::Click]);
        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.ignored, 1);
    }

    #[tokio::test]
    async fn unknown_command_is_ignored() {
        let driver = RecordingInputDriver::new();
        let (summary, _) =
            run_session(b"SCREENSHOT\nWAIT:1\nCLICK\n", &settings(1000), &driver).await;
        assert_eq!(summary.ignored, 2);
        assert_eq!(summary.dispatched, 1);
    }

    #[tokio::test]
    async fn backend_failure_does_not_stop_connection() {
        let driver = FailingTypeDriver {
            inner: RecordingInputDriver::new(),
        };
        let (summary, _) =
            run_session(b"TYPE:abc\nCLICK\n", &settings(1000), &driver).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.dispatched, 1);
        assert_eq!(driver.inner.events(), vec![InputEvent::Click]);
    }

    #[tokio::test]
    async fn crlf_blank_lines_and_unterminated_last_line() {
        let driver = RecordingInputDriver::new();
        let (summary, _) =
            run_session(b"\r\n\nMOVE:1,2\r\n   \nCLICK", &settings(1000), &driver).await;
        assert_eq!(
            driver.events(),
            vec![InputEvent::Move { x: 1, y: 2 }, InputEvent::Click]
        );
        assert_eq!(summary.ignored, 0);
    }

    #[tokio::test]
    async fn over_long_line_is_skipped() {
        let driver = RecordingInputDriver::new();
        let mut input = b"TYPE:".to_vec();
        input.extend(std::iter::repeat(b'x').take(200));
        input.extend_from_slice(b"\nCLICK\n");

        let (summary, _) = run_session(&input, &settings(1000), &driver).await;
        assert_eq!(summary.ignored, 1);
        assert_eq!(driver.events(), vec![InputEvent::Click]);
    }

    #[tokio::test]
    async fn line_at_exact_limit_is_accepted() {
        let driver = RecordingInputDriver::new();
        let mut input = b"TYPE:".to_vec();
        input.extend(std::iter::repeat(b'y').take(27));
        assert_eq!(input.len(), 32);
        input.push(b'\n');

        let (summary, _) = run_session(&input, &settings(1000), &driver).await;
        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.ignored, 0);
    }

    #[tokio::test]
    async fn crlf_line_at_exact_limit_is_accepted() {
        let driver = RecordingInputDriver::new();
        let mut input = b"TYPE:".to_vec();
        input.extend(std::iter::repeat(b'y').take(27));
        input.extend_from_slice(b"\r\n");

        let (summary, _) = run_session(&input, &settings(1000), &driver).await;
        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.ignored, 0);
        assert_eq!(
            driver.events(),
            vec![InputEvent::Type {
                text: "y".repeat(27)
            }]
        );
    }

    #[tokio::test]
    async fn line_one_byte_over_limit_with_cr_is_skipped() {
        let driver = RecordingInputDriver::new();
        let mut input = b"TYPE:".to_vec();
        input.extend(std::iter::repeat(b'z').take(28));
        input.extend_from_slice(b"\r\nCLICK\n");

        let (summary, _) = run_session(&input, &settings(1000), &driver).await;
        assert_eq!(summary.ignored, 1);
        assert_eq!(driver.events(), vec![InputEvent::Click]);
    }

    #[tokio::test]
    async fn slowly_arriving_line_is_not_cut_off() {
        let driver = RecordingInputDriver::new();
        let (mut client, server) = duplex(1024);

        let writer = async move {
            for piece in [&b"MO"[..], b"VE:5", b",6", b"\n"] {
                tokio::time::sleep(Duration::from_millis(60)).await;
                client.write_all(piece).await.unwrap();
            }
            client.shutdown().await.unwrap();
            client
        };
        // 조각 간격(60ms)은 타임아웃보다 짧고 전체 시간(240ms)은 더 길다
        let cfg = settings(150);
        let (summary, _client) =
            tokio::join!(handle_connection(server, &cfg, &driver), writer);

        assert_eq!(summary.close_reason, CloseReason::PeerClosed);
        assert_eq!(driver.events(), vec![InputEvent::Move { x: 5, y: 6 }]);
    }

    #[tokio::test]
    async fn connection_stays_open_after_malformed_line() {
        let driver = RecordingInputDriver::new();
        let (mut client, server) = duplex(1024);

        let conversation = async {
            let mut handshake = [0u8; 2];
            client.read_exact(&mut handshake).await.unwrap();
            client.write_all(b"MOVE:abc,def\nCLICK\n").await.unwrap();
            while driver.len() < 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }

            // 같은 연결에서 다음 명령도 실행됨
            client.write_all(b"CLICK\n").await.unwrap();
            while driver.len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            client.shutdown().await.unwrap();
        };
        let cfg = settings(1000);
        let (summary, ()) =
            tokio::join!(handle_connection(server, &cfg, &driver), conversation);

        assert_eq!(driver.events(), vec![InputEvent::Click, InputEvent::Click]);
        assert_eq!(summary.dispatched, 2);
        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.close_reason, CloseReason::PeerClosed);
    }

    #[tokio::test]
    async fn invalid_utf8_closes_connection() {
        let driver = RecordingInputDriver::new();
        let (summary, _) =
            run_session(b"TYPE:\xff\xfe\nCLICK\n", &settings(1000), &driver).await;
        assert_eq!(summary.close_reason, CloseReason::InvalidUtf8);
        assert!(driver.is_empty());
    }

    #[tokio::test]
    async fn idle_connection_times_out() {
        let driver = RecordingInputDriver::new();
        let (mut client, server) = duplex(1024);
        client.write_all(b"CLICK\n").await.unwrap();

        let summary = handle_connection(server, &settings(100), &driver).await;
        assert_eq!(summary.close_reason, CloseReason::IdleTimeout);
        assert_eq!(summary.dispatched, 1);
        drop(client);
    }

    #[test]
    fn settings_from_receiver_config() {
        let config = ReceiverConfig::default();
        let settings = ConnectionSettings::from(&config);
        assert_eq!(settings.idle_timeout, Duration::from_secs(5));
        assert_eq!(settings.handshake, b"OK");
        assert_eq!(settings.max_line_bytes, 4096);
    }
}
