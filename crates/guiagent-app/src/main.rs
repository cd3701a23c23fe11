//! # guiagent
//!
//! GUI Agent 바이너리 진입점.
//! 설정 로드, 트레이싱 초기화, 어댑터 와이어링 후 서브커맨드를 실행한다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use image::RgbaImage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use guiagent_app::lifecycle::LifecycleManager;
use guiagent_app::session::AgentSession;
use guiagent_automation::input_driver::{create_input_driver, RecordingInputDriver};
use guiagent_automation::intent_resolver::IntentResolver;
use guiagent_automation::workflow::{compile, compile_strict, split_workflow};
use guiagent_core::config::AppConfig;
use guiagent_core::config_manager::ConfigManager;
use guiagent_core::error::CoreError;
use guiagent_core::models::command::WireCommand;
use guiagent_core::models::workflow::WorkflowStep;
use guiagent_core::ports::command_sender::CommandSender;
use guiagent_core::ports::input_driver::InputDriver;
use guiagent_network::client::TcpCommandSender;
use guiagent_network::protocol::{parse_command, ToWire};
use guiagent_network::server::RemoteCommandServer;
use guiagent_vision::analyzer::{create_from_config, ScreenAnalyzer};
use guiagent_vision::detector::{ElementDetector, RecordedDetector};
use guiagent_vision::overlay::render_overlay;
use guiagent_vision::summary::summarize;

/// GUI Agent
///
/// 화면 분석 결과와 사용자 의도로 원격 입력 명령을 만들고 전송/실행한다.
#[derive(Parser, Debug)]
#[command(name = "guiagent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// 원격 명령 서버 실행
    Serve {
        /// 수신 포트
        #[arg(long)]
        port: Option<u16>,
        /// 바인드 주소
        #[arg(long)]
        bind: Option<String>,
        /// 유휴 타임아웃 (초)
        #[arg(long)]
        idle_timeout: Option<u64>,
        /// 입력을 실행하지 않고 기록만 함
        #[arg(long)]
        dry_run: bool,
    },

    /// 명령을 한 연결로 전송 (예: MOVE:100,200 CLICK "TYPE:hello")
    Send {
        /// 보낼 명령 (CLICK:x,y는 MOVE + CLICK으로 변환)
        #[arg(required = true)]
        commands: Vec<String>,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// 프레임 분석 결과 출력
    Analyze {
        #[command(flatten)]
        frame: FrameArgs,
        /// 오버레이 PNG 저장 경로
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 의도를 명령으로 해석
    Resolve {
        /// 의도 (submit, cancel, confirm, next 또는 신청, 취소, 확인, 다음)
        intent: String,
        #[command(flatten)]
        frame: FrameArgs,
        /// 해석된 명령을 전송
        #[arg(long)]
        send: bool,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// 워크플로우 JSON을 명령 문자열로 컴파일
    Compile {
        /// 단계 목록 JSON 파일 ([{"action":"click","target":"신청"}, ...])
        steps: PathBuf,
        /// 알 수 없는 액션을 에러로 처리
        #[arg(long)]
        strict: bool,
        /// 명령을 한 줄에 하나씩 출력
        #[arg(long)]
        split: bool,
    },
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// 빈 프레임 너비
    #[arg(long, default_value_t = 1920)]
    width: u32,
    /// 빈 프레임 높이
    #[arg(long, default_value_t = 1080)]
    height: u32,
    /// 분석할 이미지 파일 (지정 시 width/height 무시)
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// 대상 호스트
    #[arg(long)]
    host: Option<String>,
    /// 대상 포트
    #[arg(long)]
    port: Option<u16>,
    /// 핸드셰이크를 읽지 않음
    #[arg(long)]
    no_handshake: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!(
        "guiagent={level},guiagent_app={level},guiagent_core={level},guiagent_vision={level},guiagent_automation={level},guiagent_network={level}",
        level = cli.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Cmd::Serve {
            port,
            bind,
            idle_timeout,
            dry_run,
        } => {
            let mut config = config;
            if let Some(port) = port {
                config.receiver.port = port;
            }
            if let Some(bind) = bind {
                config.receiver.bind_host = bind;
            }
            if let Some(secs) = idle_timeout {
                config.receiver.idle_timeout_secs = secs;
            }
            config.validate()?;
            serve(&config, dry_run).await
        }
        Cmd::Send { commands, target } => {
            let sender = build_sender(&config, &target);
            let wire = parse_wire_commands(&commands)?;
            if !sender.send_batch(&wire).await {
                bail!("전송 실패: {}", CommandSender::endpoint(&sender));
            }
            println!("전송 완료: {} ({}개 명령)", CommandSender::endpoint(&sender), wire.len());
            Ok(())
        }
        Cmd::Analyze {
            frame,
            overlay,
            json,
        } => {
            let image = load_frame(&frame)?;
            let analyzer = build_analyzer(&config);
            let result = analyzer.analyze(&image);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", summarize(&result));
            }

            if let Some(path) = overlay {
                render_overlay(&image, &result)
                    .save(&path)
                    .with_context(|| format!("오버레이 저장 실패: {}", path.display()))?;
                info!("오버레이 저장: {}", path.display());
            }
            Ok(())
        }
        Cmd::Resolve {
            intent,
            frame,
            send,
            target,
        } => {
            let image = load_frame(&frame)?;
            let mut session = AgentSession::new(build_analyzer(&config), IntentResolver::new());
            if send {
                session = session.with_sender(Arc::new(build_sender(&config, &target)));
            }

            let outcome = session.step(&image, &intent).await;
            if !outcome.analysis.success {
                warn!(error = ?outcome.analysis.error, "분석 실패");
            }
            match (&outcome.command, outcome.sent) {
                (Some(command), Some(false)) => bail!("전송 실패: {command}"),
                (Some(command), _) => println!("{command}"),
                (None, _) => println!("일치하는 요소 없음: {intent}"),
            }
            Ok(())
        }
        Cmd::Compile {
            steps,
            strict,
            split,
        } => {
            let content = std::fs::read_to_string(&steps)
                .with_context(|| format!("워크플로우 파일 읽기 실패: {}", steps.display()))?;
            let steps: Vec<WorkflowStep> = serde_json::from_str(&content)?;
            let compiled = if strict {
                compile_strict(&steps)?
            } else {
                compile(&steps)
            };

            if split {
                for part in split_workflow(&compiled) {
                    println!("{part}");
                }
            } else {
                println!("{compiled}");
            }
            Ok(())
        }
    }
}

/// 설정 로드: 경로 지정 시 해당 파일, 아니면 플랫폼 기본 경로 (실패 시 기본값)
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let manager = ConfigManager::with_path(path.to_path_buf())?;
            info!("설정 파일: {}", manager.config_path().display());
            Ok(manager.get())
        }
        None => match ConfigManager::new() {
            Ok(manager) => {
                info!("설정 파일: {}", manager.config_path().display());
                Ok(manager.get())
            }
            Err(e) => {
                warn!("설정 관리자 초기화 실패, 기본 설정 사용: {e}");
                Ok(AppConfig::default_config())
            }
        },
    }
}

fn build_analyzer(config: &AppConfig) -> Box<dyn ScreenAnalyzer> {
    let model_dir = config.analyzer.model_dir.clone();
    create_from_config(&config.analyzer, move || {
        let dir = model_dir
            .ok_or_else(|| CoreError::Analysis("모델 디렉토리가 설정되지 않음".to_string()))?;
        Ok(Box::new(RecordedDetector::from_model_dir(&dir)?) as Box<dyn ElementDetector>)
    })
}

fn build_sender(config: &AppConfig, target: &TargetArgs) -> TcpCommandSender {
    let mut sender_config = config.sender.clone();
    if let Some(host) = &target.host {
        sender_config.host = host.clone();
    }
    if let Some(port) = target.port {
        sender_config.port = port;
    }
    if target.no_handshake {
        sender_config.await_handshake = false;
    }
    TcpCommandSender::new(sender_config)
}

fn parse_wire_commands(inputs: &[String]) -> Result<Vec<WireCommand>> {
    let mut wire = Vec::new();
    for input in inputs {
        let command = parse_command(input).map_err(|e| anyhow!("{input}: {e}"))?;
        wire.extend(command.to_wire().map_err(|e| anyhow!("{input}: {e}"))?);
    }
    Ok(wire)
}

fn load_frame(args: &FrameArgs) -> Result<RgbaImage> {
    match &args.image {
        Some(path) => Ok(image::open(path)
            .with_context(|| format!("이미지 열기 실패: {}", path.display()))?
            .to_rgba8()),
        None => {
            if args.width == 0 || args.height == 0 {
                bail!("프레임 크기는 0보다 커야 함: {}x{}", args.width, args.height);
            }
            Ok(RgbaImage::from_pixel(
                args.width,
                args.height,
                image::Rgba([255, 255, 255, 255]),
            ))
        }
    }
}

async fn serve(config: &AppConfig, dry_run: bool) -> Result<()> {
    let recorder = dry_run.then(RecordingInputDriver::new);
    let driver: Arc<dyn InputDriver> = match &recorder {
        Some(recorder) => Arc::new(recorder.clone()),
        None => create_input_driver(config.input.backend),
    };

    let server = RemoteCommandServer::bind(&config.receiver, driver).await?;
    info!("수신 대기: {}", server.local_addr()?);

    let lifecycle = Arc::new(LifecycleManager::new());
    let shutdown_rx = lifecycle.subscribe();
    let signal_lifecycle = Arc::clone(&lifecycle);
    tokio::spawn(async move { signal_lifecycle.wait_for_signal().await });

    server.run_until(shutdown_rx).await?;

    if let Some(recorder) = recorder {
        let events = recorder.take();
        info!(count = events.len(), "드라이런 기록된 입력");
        for event in events {
            println!("{event}");
        }
    }
    Ok(())
}
