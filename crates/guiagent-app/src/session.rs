//! 에이전트 세션.
//!
//! 캡처 장치/분석기를 세션 전역 상태로 두지 않고,
//! 루프를 이끄는 쪽이 소유하는 명시적 컨텍스트 객체로 묶는다.
//! 세션은 분석기, 의도 해석기, 명령 전송기, 마지막 분석 결과, 단계 이력을 가진다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::Serialize;
use tracing::{debug, info, warn};

use guiagent_automation::intent_resolver::IntentResolver;
use guiagent_core::models::analysis::AnalysisResult;
use guiagent_core::models::command::Command;
use guiagent_core::ports::command_sender::CommandSender;
use guiagent_network::protocol::ToWire;
use guiagent_vision::analyzer::ScreenAnalyzer;

/// 세션 1단계 기록
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStep {
    /// 기록 시각
    pub at: DateTime<Utc>,
    /// 요청된 의도 원문
    pub intent: String,
    /// 분석 성공 여부
    pub analysis_success: bool,
    /// 분석 요소 수
    pub element_count: usize,
    /// 해석된 명령 (없으면 일치 요소 없음)
    pub command: Option<String>,
    /// 전송 결과 (전송 시도 안 했으면 `None`)
    pub sent: Option<bool>,
}

/// 한 단계의 결과
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub analysis: AnalysisResult,
    pub command: Option<Command>,
    pub sent: Option<bool>,
}

/// 에이전트 세션 컨텍스트
pub struct AgentSession {
    analyzer: Box<dyn ScreenAnalyzer>,
    resolver: IntentResolver,
    sender: Option<Arc<dyn CommandSender>>,
    last_analysis: Option<AnalysisResult>,
    history: Vec<SessionStep>,
}

impl AgentSession {
    /// 전송기 없는 세션 (해석만)
    pub fn new(analyzer: Box<dyn ScreenAnalyzer>, resolver: IntentResolver) -> Self {
        Self {
            analyzer,
            resolver,
            sender: None,
            last_analysis: None,
            history: Vec::new(),
        }
    }

    /// 명령 전송기 연결
    pub fn with_sender(mut self, sender: Arc<dyn CommandSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// 프레임 분석 후 마지막 분석 결과로 보관
    pub fn analyze(&mut self, frame: &RgbaImage) -> &AnalysisResult {
        let result = self.analyzer.analyze(frame);
        debug!(
            success = result.success,
            elements = result.elements.len(),
            analysis_time = result.analysis_time,
            mode = %self.analyzer.mode(),
            "세션 분석"
        );
        self.last_analysis.insert(result)
    }

    /// 마지막 분석 결과
    pub fn last_analysis(&self) -> Option<&AnalysisResult> {
        self.last_analysis.as_ref()
    }

    /// 마지막 분석 결과 기준으로 의도 해석 (분석 전이면 `None`)
    pub fn resolve(&self, intent: &str) -> Option<Command> {
        self.last_analysis
            .as_ref()
            .and_then(|analysis| self.resolver.resolve(analysis, intent))
    }

    /// 분석 → 해석 → (전송기가 있으면) 전송, 이력에 기록
    pub async fn step(&mut self, frame: &RgbaImage, intent: &str) -> StepOutcome {
        let analysis = self.analyze(frame).clone();
        let command = self.resolver.resolve(&analysis, intent);

        let sent = match (&command, &self.sender) {
            (Some(command), Some(sender)) => Some(send_via(sender.as_ref(), command).await),
            _ => None,
        };

        match &command {
            Some(command) => info!(intent, command = %command, ?sent, "의도 해석 완료"),
            None => info!(intent, "일치하는 요소 없음"),
        }

        self.history.push(SessionStep {
            at: Utc::now(),
            intent: intent.to_string(),
            analysis_success: analysis.success,
            element_count: analysis.elements.len(),
            command: command.as_ref().map(|c| c.to_string()),
            sent,
        });

        StepOutcome {
            analysis,
            command,
            sent,
        }
    }

    /// 단계 이력 (시간 순)
    pub fn history(&self) -> &[SessionStep] {
        &self.history
    }

    /// 분석기가 탐지기 실패로 합성 레이아웃에 머무르는지
    pub fn is_degraded(&self) -> bool {
        self.analyzer.is_degraded()
    }
}

/// 명령을 와이어 명령으로 변환하여 한 연결로 전송
pub async fn send_via(sender: &dyn CommandSender, command: &Command) -> bool {
    match command.to_wire() {
        Ok(wire) => sender.send_batch(&wire).await,
        Err(e) => {
            warn!(command = %command, error = %e, "명령 전송 불가");
            false
        }
    }
}
