//! Session state: lifecycle phase, the UI-facing projection and derived stage view.

use serde::{Deserialize, Serialize};

use crate::session::event::ProgressStatus;
use crate::types::{GenerationRequest, GenerationResult};

pub const CONNECTING_STEP: &str = "Connecting to server...";
pub const CONNECTING_PROGRESS: u8 = 5;
pub const REQUEST_SENT_PROGRESS: u8 = 10;
pub const COMPLETED_STEP: &str = "Generation completed!";

/// Lifecycle of one generation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "step")]
pub enum SessionPhase {
    Idle,
    Connecting,
    AwaitingSend,
    Running(ProgressStatus),
    Completed,
    Failed,
}

impl SessionPhase {
    /// True while a session owns a connection and has not reached a terminal phase.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SessionPhase::Connecting | SessionPhase::AwaitingSend | SessionPhase::Running(_)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }
}

/// What the UI renders. Only the reducer produces new values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationState {
    pub is_generating: bool,
    pub current_step: Option<String>,
    pub progress: u8,
    pub error: Option<String>,
    pub result: Option<GenerationResult>,
}

/// The three agent phases shown in the step indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStage {
    Research,
    Content,
    Image,
}

impl AgentStage {
    pub const ALL: [AgentStage; 3] = [AgentStage::Research, AgentStage::Content, AgentStage::Image];

    pub fn from_status(status: ProgressStatus) -> Option<Self> {
        match status {
            ProgressStatus::Research => Some(AgentStage::Research),
            ProgressStatus::Content => Some(AgentStage::Content),
            ProgressStatus::Image => Some(AgentStage::Image),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            AgentStage::Research => 0,
            AgentStage::Content => 1,
            AgentStage::Image => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentStage::Research => "Research",
            AgentStage::Content => "Content",
            AgentStage::Image => "Image",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AgentStage::Research => "Gathering information and creating bullet points",
            AgentStage::Content => "Writing platform-optimized content",
            AgentStage::Image => "Generating visual content",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Current,
    Completed,
    Failed,
}

/// One-slot buffer holding the request until the channel reports readiness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequest(Option<GenerationRequest>);

impl PendingRequest {
    /// Store a request, replacing whatever was queued before.
    pub fn put(&mut self, request: GenerationRequest) {
        self.0 = Some(request);
    }

    pub fn take(&mut self) -> Option<GenerationRequest> {
        self.0.take()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn peek(&self) -> Option<&GenerationRequest> {
        self.0.as_ref()
    }
}

/// Complete reducer state for one controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub phase: SessionPhase,
    /// Request that started this session, kept after it leaves the pending slot.
    pub request: Option<GenerationRequest>,
    pub pending: PendingRequest,
    pub view: GenerationState,
    /// Status of the last non-error event, used for the stage view.
    pub last_status: Option<ProgressStatus>,
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

impl Session {
    pub fn idle() -> Self {
        Self {
            phase: SessionPhase::Idle,
            request: None,
            pending: PendingRequest::default(),
            view: GenerationState::default(),
            last_status: None,
        }
    }

    /// Stage reported by the most recent event, if it named one.
    pub fn current_stage(&self) -> Option<AgentStage> {
        self.last_status.and_then(AgentStage::from_status)
    }

    /// Position in the step indicator: a stage index, or 3 once everything is done.
    fn stage_cursor(&self) -> Option<usize> {
        if let Some(stage) = self.current_stage() {
            return Some(stage.index());
        }
        if self.view.progress == 100 {
            return Some(AgentStage::ALL.len());
        }
        None
    }

    pub fn stage_status(&self, stage: AgentStage) -> StageStatus {
        let cursor = self.stage_cursor();
        let index = stage.index();
        if self.view.progress == 100 || cursor.is_some_and(|c| index < c) {
            StageStatus::Completed
        } else if cursor == Some(index) && self.view.is_generating {
            StageStatus::Current
        } else if cursor == Some(index) && self.view.error.is_some() {
            StageStatus::Failed
        } else {
            StageStatus::Pending
        }
    }

    pub fn stages(&self) -> [(AgentStage, StageStatus); 3] {
        AgentStage::ALL.map(|stage| (stage, self.stage_status(stage)))
    }
}
