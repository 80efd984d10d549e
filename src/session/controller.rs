//! Generation session controller.
//!
//! Owns one `Session` and one `ConnectionManager`. Inputs go through the pure
//! reducer; the controller performs the effects it returns. Every fault is
//! folded into `GenerationState::error`, so the controller stays usable for
//! the next `start_generation`.

use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::session::connection::{
    ConnectionManager, Connector, Signal, SignalKind, SignalReceiver,
};
use crate::session::reducer::{reduce, Effect, SessionInput};
use crate::session::state::{GenerationState, Session, SessionPhase};
use crate::types::{GenerationRequest, GenerationResult};

/// Path of the streaming endpoint, appended to the configured WebSocket base.
pub const STREAM_PATH: &str = "/ws/generate";

pub fn stream_url(ws_base: &str) -> String {
    format!("{}{}", ws_base.trim_end_matches('/'), STREAM_PATH)
}

pub struct GenerationSessionController<C: Connector> {
    manager: ConnectionManager<C>,
    signals: SignalReceiver,
    session: Session,
}

impl<C: Connector> GenerationSessionController<C> {
    pub fn new(connector: C, stream_url: impl Into<String>) -> Self {
        let (manager, signals) = ConnectionManager::new(connector, stream_url);
        Self {
            manager,
            signals,
            session: Session::idle(),
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.session.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase
    }

    pub fn connections(&self) -> &ConnectionManager<C> {
        &self.manager
    }

    /// Begin a new session. Any previous session and its connection are discarded.
    ///
    /// Only local validation can fail here; the session is left untouched then.
    pub fn start_generation(&mut self, request: GenerationRequest) -> Result<(), ApiError> {
        request.validate()?;
        info!(
            topic = %request.topic,
            platform = %request.platform,
            tone = %request.tone,
            "Starting generation session"
        );
        self.dispatch(SessionInput::Start(request));
        Ok(())
    }

    /// Return to idle and tear down the live connection.
    pub fn reset(&mut self) {
        debug!("Resetting generation session");
        self.dispatch(SessionInput::Reset);
    }

    /// Feed one connection signal through the state machine.
    ///
    /// Returns false when the signal came from a retired connection and was dropped.
    pub fn handle_signal(&mut self, signal: Signal) -> bool {
        let Some(kind) = self.manager.accept(signal) else {
            return false;
        };
        let input = match kind {
            SignalKind::Message(raw) => SessionInput::Message(raw),
            SignalKind::Error(detail) => {
                warn!(error = %detail, "Generation stream transport error");
                SessionInput::TransportError(detail)
            }
            SignalKind::Closed { code, .. } => SessionInput::Closed { code },
        };
        self.dispatch(input);
        true
    }

    /// Wait for the next signal that changes the session.
    ///
    /// Returns `None` once there is no live connection left to hear from.
    pub async fn next_update(&mut self) -> Option<&GenerationState> {
        loop {
            if !self.manager.is_live() {
                return None;
            }
            let signal = self.signals.recv().await?;
            if self.handle_signal(signal) {
                return Some(&self.session.view);
            }
        }
    }

    /// Drive the session until it reaches a terminal phase or loses its connection.
    ///
    /// `on_update` sees the session after every accepted signal.
    pub async fn run_to_completion<F>(&mut self, mut on_update: F) -> GenerationState
    where
        F: FnMut(&Session),
    {
        while self.session.phase.is_active() {
            if self.next_update().await.is_none() {
                break;
            }
            on_update(&self.session);
        }
        if self.session.phase.is_active() {
            warn!(
                phase = ?self.session.phase,
                "Generation stream ended without a terminal event"
            );
        }
        self.session.view.clone()
    }

    /// The request and result of a session that completed successfully.
    pub fn completed(&self) -> Option<(&GenerationRequest, &GenerationResult)> {
        if self.session.phase != SessionPhase::Completed {
            return None;
        }
        let result = self.session.view.result.as_ref().filter(|r| r.success)?;
        let request = self.session.request.as_ref()?;
        Some((request, result))
    }

    fn dispatch(&mut self, input: SessionInput) {
        let mut queue = vec![input];
        while let Some(input) = queue.pop() {
            let session = std::mem::take(&mut self.session);
            let transition = reduce(session, input);
            self.session = transition.session;
            for effect in transition.effects {
                if let Some(follow_up) = self.perform(effect) {
                    queue.push(follow_up);
                }
            }
        }
        debug!(
            phase = ?self.session.phase,
            progress = self.session.view.progress,
            "Session updated"
        );
    }

    fn perform(&mut self, effect: Effect) -> Option<SessionInput> {
        match effect {
            Effect::OpenConnection => {
                self.manager.open();
                None
            }
            Effect::CloseConnection => {
                self.manager.close();
                None
            }
            Effect::Send(request) => {
                let sent = serde_json::to_string(&request)
                    .map_err(|e| ApiError::Protocol(format!("Failed to encode request: {}", e)))
                    .and_then(|payload| self.manager.send(payload));
                match sent {
                    Ok(()) => {
                        info!(topic = %request.topic, "Generation request sent");
                        None
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to send generation request");
                        Some(SessionInput::TransportError(e.to_string()))
                    }
                }
            }
        }
    }
}
