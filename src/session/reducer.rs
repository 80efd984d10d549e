//! Pure session reducer: `(session, input) -> (session, effects)`.
//!
//! The reducer never touches a connection. It returns the effects the
//! controller must perform, which keeps the state machine testable without a
//! transport.

use crate::session::event::{ProgressEvent, ProgressStatus};
use crate::session::state::{
    GenerationState, Session, SessionPhase, COMPLETED_STEP, CONNECTING_PROGRESS, CONNECTING_STEP,
    REQUEST_SENT_PROGRESS,
};
use crate::types::GenerationRequest;

pub const CONNECTION_ERROR: &str =
    "Unable to connect to backend server. Please check that the backend is running.";
pub const CONNECTION_LOST_ERROR: &str =
    "Connection to server lost. Please check that the backend server is running and try again.";
pub const UNKNOWN_RESULT_ERROR: &str = "Unknown error occurred";
pub const PARSE_FAILURE_STEP: &str = "Failed to parse response data";
pub const PARSE_FAILURE_ERROR: &str = "Parse error";
pub const MALFORMED_MESSAGE_STEP: &str = "Received a malformed message from the server";
pub const MALFORMED_MESSAGE_ERROR: &str = "Protocol error";

/// Close code for a deliberate, expected shutdown.
pub const NORMAL_CLOSE_CODE: u16 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    /// Begin a new session, superseding any previous one.
    Start(GenerationRequest),
    /// Raw text frame from the live connection.
    Message(String),
    /// Already-decoded progress event.
    Event(ProgressEvent),
    /// Transport-level failure reported by the live connection.
    TransportError(String),
    /// The live connection closed with the given code.
    Closed { code: u16 },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open a fresh connection; any existing one is discarded first.
    OpenConnection,
    Send(GenerationRequest),
    /// Close the live connection with the normal code.
    CloseConnection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(session: Session) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }
}

pub fn reduce(session: Session, input: SessionInput) -> Transition {
    match input {
        SessionInput::Start(request) => start(request),
        SessionInput::Reset => Transition {
            session: Session::idle(),
            effects: vec![Effect::CloseConnection],
        },
        SessionInput::Message(raw) => match ProgressEvent::decode(&raw) {
            Ok(event) => reduce(session, SessionInput::Event(event)),
            Err(_) if session.phase.is_active() => apply_event(
                session,
                ProgressEvent::new(ProgressStatus::Error, MALFORMED_MESSAGE_STEP)
                    .with_error(MALFORMED_MESSAGE_ERROR),
            ),
            Err(_) => Transition::quiet(session),
        },
        SessionInput::Event(event) => {
            if !session.phase.is_active() {
                return Transition::quiet(session);
            }
            apply_event(session, event)
        }
        SessionInput::TransportError(_) => {
            if !session.phase.is_active() {
                return Transition::quiet(session);
            }
            fail(session, CONNECTION_ERROR.to_string())
        }
        SessionInput::Closed { code } => {
            if code == NORMAL_CLOSE_CODE || !session.phase.is_active() {
                return Transition::quiet(session);
            }
            fail(session, CONNECTION_LOST_ERROR.to_string())
        }
    }
}

fn start(request: GenerationRequest) -> Transition {
    let mut session = Session::idle();
    session.phase = SessionPhase::Connecting;
    session.request = Some(request.clone());
    session.pending.put(request);
    session.view = GenerationState {
        is_generating: true,
        current_step: Some(CONNECTING_STEP.to_string()),
        progress: CONNECTING_PROGRESS,
        error: None,
        result: None,
    };
    Transition {
        session,
        effects: vec![Effect::OpenConnection],
    }
}

fn apply_event(mut session: Session, event: ProgressEvent) -> Transition {
    match event.status {
        ProgressStatus::Connected => {
            let mut effects = Vec::new();
            if let Some(request) = session.pending.take() {
                effects.push(Effect::Send(request));
                session.view.progress = REQUEST_SENT_PROGRESS;
            }
            session.phase = SessionPhase::AwaitingSend;
            session.last_status = Some(event.status);
            session.view.current_step = Some(event.message);
            session.view.error = None;
            Transition { session, effects }
        }
        ProgressStatus::Completed => match event.completion_result() {
            Ok(result) => {
                let step = if event.message.is_empty() {
                    COMPLETED_STEP.to_string()
                } else {
                    event.message
                };
                let error = if result.success {
                    None
                } else {
                    Some(
                        result
                            .error
                            .clone()
                            .filter(|e| !e.is_empty())
                            .unwrap_or_else(|| UNKNOWN_RESULT_ERROR.to_string()),
                    )
                };
                session.phase = SessionPhase::Completed;
                session.pending.clear();
                session.last_status = Some(ProgressStatus::Completed);
                session.view = GenerationState {
                    is_generating: false,
                    current_step: Some(step),
                    progress: 100,
                    error,
                    result: Some(result),
                };
                Transition {
                    session,
                    effects: vec![Effect::CloseConnection],
                }
            }
            Err(_) => apply_event(
                session,
                ProgressEvent::new(ProgressStatus::Error, PARSE_FAILURE_STEP)
                    .with_error(PARSE_FAILURE_ERROR),
            ),
        },
        ProgressStatus::Error => {
            let error = event
                .error
                .filter(|e| !e.is_empty())
                .or_else(|| Some(event.message.clone()).filter(|m| !m.is_empty()))
                .unwrap_or_else(|| CONNECTION_ERROR.to_string());
            if !event.message.is_empty() {
                session.view.current_step = Some(event.message);
            }
            fail(session, error)
        }
        status => {
            session.phase = SessionPhase::Running(status);
            session.last_status = Some(status);
            if let Some(progress) = status.progress() {
                session.view.progress = progress;
            }
            session.view.current_step = Some(event.message);
            session.view.error = None;
            Transition::quiet(session)
        }
    }
}

fn fail(mut session: Session, error: String) -> Transition {
    session.phase = SessionPhase::Failed;
    session.pending.clear();
    session.view.is_generating = false;
    session.view.progress = 0;
    session.view.error = Some(error);
    Transition {
        session,
        effects: vec![Effect::CloseConnection],
    }
}
