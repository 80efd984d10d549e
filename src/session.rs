//! Generation sessions: event decoding, the session reducer, connection
//! management and the controller tying them together.

pub mod connection;
pub mod controller;
pub mod event;
pub mod reducer;
pub mod state;

pub use connection::{
    ConnectionId, ConnectionManager, Connector, Signal, SignalKind, Transport, WsConnector,
};
pub use controller::{stream_url, GenerationSessionController, STREAM_PATH};
pub use event::{ProgressEvent, ProgressStatus};
pub use reducer::{reduce, Effect, SessionInput, Transition};
pub use state::{AgentStage, GenerationState, PendingRequest, Session, SessionPhase, StageStatus};
