//! 입력 드라이버 구현.
//!
//! `NoOpInputDriver` (로깅 전용), `RecordingInputDriver` (이벤트 기록, 드라이런/테스트용),
//! `EnigoInputDriver` (실제 입력, feature `enigo`)를 제공한다.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use guiagent_core::config::InputBackend;
use guiagent_core::error::CoreError;
use guiagent_core::ports::input_driver::InputDriver;

// ============================================================
// NoOpInputDriver: 로깅 전용
// ============================================================

/// No-Op 입력 드라이버: 모든 입력을 로깅만 하고 실행하지 않음
pub struct NoOpInputDriver;

#[async_trait]
impl InputDriver for NoOpInputDriver {
    async fn mouse_move(&self, x: i32, y: i32) -> Result<(), CoreError> {
        debug!(x, y, "[NoOp] 마우스 이동");
        Ok(())
    }

    async fn click(&self) -> Result<(), CoreError> {
        debug!("[NoOp] 마우스 클릭");
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), CoreError> {
        debug!(text_len = text.len(), "[NoOp] 텍스트 입력");
        Ok(())
    }

    fn platform(&self) -> &str {
        "noop"
    }
}

// ============================================================
// RecordingInputDriver: 이벤트 기록
// ============================================================

/// 기록된 입력 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    Move { x: i32, y: i32 },
    Click,
    Type { text: String },
}

impl std::fmt::Display for InputEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputEvent::Move { x, y } => write!(f, "move({x}, {y})"),
            InputEvent::Click => f.write_str("click"),
            InputEvent::Type { text } => write!(f, "type({text:?})"),
        }
    }
}

/// 입력을 실행하지 않고 순서대로 기록하는 드라이버
///
/// 여러 연결이 동시에 호출하면 기록 순서는 실제 호출 도착 순서를 따른다.
#[derive(Debug, Default, Clone)]
pub struct RecordingInputDriver {
    events: Arc<Mutex<Vec<InputEvent>>>,
}

impl RecordingInputDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 기록된 이벤트 (복제본)
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().clone()
    }

    /// 기록된 이벤트 수
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// 기록을 비우고 기존 이벤트 반환
    pub fn take(&self) -> Vec<InputEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn record(&self, event: InputEvent) {
        debug!(%event, "[Recording] 입력 기록");
        self.events.lock().push(event);
    }
}

#[async_trait]
impl InputDriver for RecordingInputDriver {
    async fn mouse_move(&self, x: i32, y: i32) -> Result<(), CoreError> {
        self.record(InputEvent::Move { x, y });
        Ok(())
    }

    async fn click(&self) -> Result<(), CoreError> {
        self.record(InputEvent::Click);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), CoreError> {
        self.record(InputEvent::Type {
            text: text.to_string(),
        });
        Ok(())
    }

    fn platform(&self) -> &str {
        "recording"
    }
}

// ============================================================
// EnigoInputDriver: 실제 마우스/키보드 입력
// ============================================================

/// 실제 마우스/키보드 입력 드라이버 (enigo 기반)
///
/// macOS: Accessibility 권한 필요
/// Windows: UIAccess 또는 관리자 권한 필요
/// Linux: X11 또는 Wayland + uinput 권한 필요
#[cfg(feature = "enigo")]
pub struct EnigoInputDriver {
    /// enigo 인스턴스 (Send지만 !Sync → tokio::sync::Mutex 사용)
    enigo: tokio::sync::Mutex<enigo::Enigo>,
}

#[cfg(feature = "enigo")]
impl EnigoInputDriver {
    pub fn new() -> Result<Self, CoreError> {
        let settings = enigo::Settings::default();
        let enigo = enigo::Enigo::new(&settings)
            .map_err(|e| CoreError::InputInjection(format!("입력 드라이버 초기화 실패: {e}")))?;
        Ok(Self {
            enigo: tokio::sync::Mutex::new(enigo),
        })
    }
}

#[cfg(feature = "enigo")]
#[async_trait]
impl InputDriver for EnigoInputDriver {
    async fn mouse_move(&self, x: i32, y: i32) -> Result<(), CoreError> {
        use enigo::Mouse;
        debug!(x, y, "[Enigo] 마우스 이동");
        let mut enigo = self.enigo.lock().await;
        enigo
            .move_mouse(x, y, enigo::Coordinate::Abs)
            .map_err(|e| CoreError::InputInjection(format!("마우스 이동 실패: {e}")))
    }

    async fn click(&self) -> Result<(), CoreError> {
        use enigo::Mouse;
        debug!("[Enigo] 마우스 클릭");
        let mut enigo = self.enigo.lock().await;
        enigo
            .button(enigo::Button::Left, enigo::Direction::Click)
            .map_err(|e| CoreError::InputInjection(format!("마우스 클릭 실패: {e}")))
    }

    async fn type_text(&self, text: &str) -> Result<(), CoreError> {
        use enigo::Keyboard;
        debug!(text_len = text.len(), "[Enigo] 텍스트 입력");
        let mut enigo = self.enigo.lock().await;
        enigo
            .text(text)
            .map_err(|e| CoreError::InputInjection(format!("텍스트 입력 실패: {e}")))
    }

    fn platform(&self) -> &str {
        #[cfg(target_os = "macos")]
        {
            "macos"
        }
        #[cfg(target_os = "windows")]
        {
            "windows"
        }
        #[cfg(target_os = "linux")]
        {
            "linux"
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            "unknown"
        }
    }
}

// ============================================================
// 팩토리
// ============================================================

/// 설정된 백엔드로 입력 드라이버 생성
///
/// `Enigo` 백엔드는 `enigo` feature가 켜져 있고 초기화에 성공할 때만 사용되며,
/// 그 외에는 NoOp 드라이버로 폴백한다.
pub fn create_input_driver(backend: InputBackend) -> Arc<dyn InputDriver> {
    match backend {
        InputBackend::Noop => Arc::new(NoOpInputDriver),
        InputBackend::Enigo => create_enigo_or_noop(),
    }
}

#[cfg(feature = "enigo")]
fn create_enigo_or_noop() -> Arc<dyn InputDriver> {
    match EnigoInputDriver::new() {
        Ok(driver) => {
            tracing::info!("실제 입력 드라이버 (enigo) 초기화 완료");
            Arc::new(driver)
        }
        Err(e) => {
            tracing::warn!("enigo 초기화 실패, NoOp 폴백: {e}");
            Arc::new(NoOpInputDriver)
        }
    }
}

#[cfg(not(feature = "enigo"))]
fn create_enigo_or_noop() -> Arc<dyn InputDriver> {
    tracing::warn!("enigo feature 비활성화 상태, NoOp 폴백");
    Arc::new(NoOpInputDriver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_driver_all_methods_ok() {
        let driver = NoOpInputDriver;
        assert!(driver.mouse_move(100, 200).await.is_ok());
        assert!(driver.click().await.is_ok());
        assert!(driver.type_text("hello").await.is_ok());
        assert_eq!(driver.platform(), "noop");
    }

    #[tokio::test]
    async fn recording_driver_keeps_call_order() {
        let driver = RecordingInputDriver::new();
        driver.mouse_move(120, 340).await.unwrap();
        driver.click().await.unwrap();
        driver.type_text("hello:world").await.unwrap();

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
        assert_eq!(driver.len(), 3);
        assert_eq!(driver.platform(), "recording");
    }

    #[tokio::test]
    async fn recording_driver_clones_share_log() {
        let driver = RecordingInputDriver::new();
        let clone = driver.clone();
        clone.click().await.unwrap();
        assert_eq!(driver.len(), 1);

        let taken = driver.take();
        assert_eq!(taken, vec![InputEvent::Click]);
        assert!(clone.is_empty());
    }

    #[test]
    fn input_event_display_and_serde() {
        assert_eq!(InputEvent::Move { x: 1, y: 2 }.to_string(), "move(1, 2)");
        assert_eq!(InputEvent::Click.to_string(), "click");
        let json = serde_json::to_string(&InputEvent::Click).unwrap();
        assert_eq!(json, r#"{"event":"click"}"#);
    }

    #[test]
    fn factory_noop_backend() {
        let driver = create_input_driver(InputBackend::Noop);
        assert_eq!(driver.platform(), "noop");
    }

    #[cfg(not(feature = "enigo"))]
    #[test]
    fn factory_enigo_without_feature_falls_back() {
        let driver = create_input_driver(InputBackend::Enigo);
        assert_eq!(driver.platform(), "noop");
    }
}
