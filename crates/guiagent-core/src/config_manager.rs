//! 설정 파일 관리.
//!
//! 설정은 JSON 파일 하나에 저장된다. 경로 결정 순서:
//! 1. `GUIAGENT_CONFIG` 환경 변수
//! 2. 플랫폼 설정 디렉토리의 `guiagent/config.json`
//!
//! 저장은 임시 파일에 쓴 뒤 교체하므로 중간에 끊겨도 기존 파일이 깨지지 않는다.
//! 모든 로드/갱신은 [`AppConfig::validate`]를 통과해야 반영된다.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::CoreError;

/// 설정 파일 경로를 직접 지정하는 환경 변수
pub const CONFIG_PATH_ENV: &str = "GUIAGENT_CONFIG";

const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "guiagent";

/// 설정 관리자
///
/// 복제본끼리 같은 설정을 공유한다. 서버/전송기는 시작 시점의 [`get`](Self::get) 스냅샷을 쓴다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// 환경 변수 또는 플랫폼 기본 경로의 설정 로드 (없으면 기본 설정 생성)
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(default_config_path(|key| std::env::var(key).ok())?)
    }

    /// 지정 경로의 설정 로드 (없으면 기본 설정 생성)
    pub fn with_path(config_path: PathBuf) -> Result<Self, CoreError> {
        let config = if config_path.exists() {
            read_config(&config_path)?
        } else {
            let config = AppConfig::default_config();
            write_config(&config_path, &config)?;
            info!(path = %config_path.display(), "기본 설정 파일 생성");
            config
        };

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// 현재 설정 스냅샷
    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 설정 교체. 검증 실패 시 파일과 메모리 모두 그대로 둔다.
    pub fn update(&self, new_config: AppConfig) -> Result<(), CoreError> {
        new_config.validate()?;
        write_config(&self.config_path, &new_config)?;
        self.replace(new_config);
        debug!(path = %self.config_path.display(), "설정 저장");
        Ok(())
    }

    /// 현재 설정을 복제해 수정한 뒤 [`update`](Self::update)
    pub fn update_with<F>(&self, updater: F) -> Result<AppConfig, CoreError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.get();
        updater(&mut config);
        self.update(config.clone())?;
        Ok(config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 파일에서 다시 읽기. 실패 시 메모리의 설정을 유지한다.
    pub fn reload(&self) -> Result<(), CoreError> {
        let config = read_config(&self.config_path)?;
        self.replace(config);
        info!(path = %self.config_path.display(), "설정 다시 로드");
        Ok(())
    }

    /// 플랫폼별 설정 디렉토리 (`.../guiagent`)
    pub fn config_dir() -> Result<PathBuf, CoreError> {
        platform_config_dir(|key| std::env::var(key).ok())
    }

    fn replace(&self, config: AppConfig) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }
}

// ============================================================
// 경로 결정
// ============================================================

fn default_config_path<E>(env: E) -> Result<PathBuf, CoreError>
where
    E: Fn(&str) -> Option<String>,
{
    if let Some(path) = env(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(platform_config_dir(env)?.join(CONFIG_FILE_NAME))
}

fn platform_config_dir<E>(env: E) -> Result<PathBuf, CoreError>
where
    E: Fn(&str) -> Option<String>,
{
    let var = |key: &str| {
        env(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CoreError::Config(format!("환경 변수 {key} 없음")))
    };

    if cfg!(target_os = "macos") {
        Ok(PathBuf::from(var("HOME")?)
            .join("Library")
            .join("Application Support")
            .join(APP_DIR_NAME))
    } else if cfg!(target_os = "windows") {
        Ok(PathBuf::from(var("APPDATA")?).join(APP_DIR_NAME))
    } else if cfg!(unix) {
        match var("XDG_CONFIG_HOME") {
            Ok(xdg) => Ok(PathBuf::from(xdg).join(APP_DIR_NAME)),
            Err(_) => Ok(PathBuf::from(var("HOME")?).join(".config").join(APP_DIR_NAME)),
        }
    } else {
        warn!("지원되지 않는 플랫폼, 현재 디렉토리 사용");
        Ok(PathBuf::from(".").join(APP_DIR_NAME))
    }
}

// ============================================================
// 파일 I/O
// ============================================================

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let content = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{}: 읽기 실패: {e}", path.display())))?;
    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| CoreError::Config(format!("{}: 파싱 실패: {e}", path.display())))?;
    config.validate()?;
    debug!(path = %path.display(), "설정 파일 로드");
    Ok(config)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            CoreError::Config(format!("{}: 디렉토리 생성 실패: {e}", parent.display()))
        })?;
    }

    let content = serde_json::to_string_pretty(config)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, content)
        .and_then(|()| fs::rename(&staging, path))
        .map_err(|e| CoreError::Config(format!("{}: 저장 실패: {e}", path.display())))
}
