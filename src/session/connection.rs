//! Connection lifecycle for the generation stream.
//!
//! `ConnectionManager` owns zero or one live connection. Every connection gets
//! a fresh `ConnectionId`, and signals are tagged with the id of the
//! connection that produced them. Once a connection is closed or superseded
//! its id is retired, so anything it still emits is dropped in `accept`.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::session::reducer::NORMAL_CLOSE_CODE;

/// Close code reported when the transport vanished without a close frame.
pub const ABNORMAL_CLOSE_CODE: u16 = 1006;

pub type ConnectionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    Message(String),
    Error(String),
    Closed { code: u16, reason: String },
}

/// Something a connection reported, tagged with the connection it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub connection: ConnectionId,
    pub kind: SignalKind,
}

impl Signal {
    pub fn new(connection: ConnectionId, kind: SignalKind) -> Self {
        Self { connection, kind }
    }
}

pub type SignalSender = mpsc::UnboundedSender<Signal>;
pub type SignalReceiver = mpsc::UnboundedReceiver<Signal>;

/// Write half of one connection.
pub trait Transport: Send {
    fn send(&mut self, payload: String) -> Result<(), ApiError>;

    /// Close with the normal close code. Must be safe to call more than once.
    fn close(&mut self);
}

/// Opens connections. Opening never blocks: failures arrive later as
/// `SignalKind::Error` followed by `SignalKind::Closed`.
pub trait Connector: Send + Sync {
    fn open(&self, url: &str, id: ConnectionId, signals: SignalSender) -> Box<dyn Transport>;
}

struct LiveConnection {
    id: ConnectionId,
    transport: Box<dyn Transport>,
}

pub struct ConnectionManager<C: Connector> {
    connector: C,
    url: String,
    signals: SignalSender,
    last_id: ConnectionId,
    live: Option<LiveConnection>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager and the receiver its connections report into.
    pub fn new(connector: C, url: impl Into<String>) -> (Self, SignalReceiver) {
        let (signals, receiver) = mpsc::unbounded_channel();
        let manager = Self {
            connector,
            url: url.into(),
            signals,
            last_id: 0,
            live: None,
        };
        (manager, receiver)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open a fresh connection, closing any existing one first.
    pub fn open(&mut self) -> ConnectionId {
        self.close();
        self.last_id += 1;
        let id = self.last_id;
        info!(connection_id = id, url = %self.url, "Opening generation stream");
        let transport = self.connector.open(&self.url, id, self.signals.clone());
        self.live = Some(LiveConnection { id, transport });
        id
    }

    pub fn send(&mut self, payload: String) -> Result<(), ApiError> {
        let live = self
            .live
            .as_mut()
            .ok_or_else(|| ApiError::Transport("No live connection".to_string()))?;
        debug!(connection_id = live.id, bytes = payload.len(), "Sending on generation stream");
        live.transport.send(payload)
    }

    /// Close the live connection, if any, with the normal close code.
    pub fn close(&mut self) {
        if let Some(mut live) = self.live.take() {
            debug!(connection_id = live.id, "Closing generation stream");
            live.transport.close();
        }
    }

    pub fn live_id(&self) -> Option<ConnectionId> {
        self.live.as_ref().map(|live| live.id)
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Filter a signal against the live connection.
    ///
    /// Returns `None` for signals from retired connections. A close signal
    /// from the live connection retires it.
    pub fn accept(&mut self, signal: Signal) -> Option<SignalKind> {
        let live_id = self.live_id();
        if live_id != Some(signal.connection) {
            debug!(
                connection_id = signal.connection,
                live_id = ?live_id,
                "Dropping signal from retired connection"
            );
            return None;
        }
        if let SignalKind::Closed { code, ref reason } = signal.kind {
            if code == NORMAL_CLOSE_CODE {
                info!(connection_id = signal.connection, "Generation stream closed");
            } else {
                warn!(
                    connection_id = signal.connection,
                    code,
                    reason = %reason,
                    "Generation stream closed unexpectedly"
                );
            }
            self.live = None;
        }
        Some(signal.kind)
    }
}

impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        self.close();
    }
}

enum Outbound {
    Text(String),
    Close,
}

/// WebSocket connector backed by tokio-tungstenite.
///
/// `open` spawns the socket task, so it must be called inside a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn open(&self, url: &str, id: ConnectionId, signals: SignalSender) -> Box<dyn Transport> {
        let (outbound, commands) = mpsc::unbounded_channel();
        tokio::spawn(pump(url.to_string(), id, signals, commands));
        Box::new(WsTransport {
            outbound,
            closed: false,
        })
    }
}

struct WsTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
    closed: bool,
}

impl Transport for WsTransport {
    fn send(&mut self, payload: String) -> Result<(), ApiError> {
        if self.closed {
            return Err(ApiError::Transport("Connection is closed".to_string()));
        }
        self.outbound
            .send(Outbound::Text(payload))
            .map_err(|_| ApiError::Transport("Connection task has stopped".to_string()))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.outbound.send(Outbound::Close);
        }
    }
}

fn emit(signals: &SignalSender, id: ConnectionId, kind: SignalKind) {
    // The receiver only goes away with the controller.
    let _ = signals.send(Signal::new(id, kind));
}

fn emit_fault(signals: &SignalSender, id: ConnectionId, error: String) {
    emit(signals, id, SignalKind::Error(error.clone()));
    emit(
        signals,
        id,
        SignalKind::Closed {
            code: ABNORMAL_CLOSE_CODE,
            reason: error,
        },
    );
}

async fn pump(
    url: String,
    id: ConnectionId,
    signals: SignalSender,
    mut commands: mpsc::UnboundedReceiver<Outbound>,
) {
    let socket = match connect_async(url.as_str()).await {
        Ok((socket, _response)) => socket,
        Err(e) => {
            warn!(connection_id = id, url = %url, error = %e, "Failed to open generation stream");
            emit_fault(&signals, id, e.to_string());
            return;
        }
    };
    debug!(connection_id = id, "Generation stream handshake complete");
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Outbound::Text(payload)) => {
                    if let Err(e) = sink.send(Message::text(payload)).await {
                        emit_fault(&signals, id, e.to_string());
                        return;
                    }
                }
                Some(Outbound::Close) | None => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "session finished".into(),
                    };
                    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                        debug!(connection_id = id, error = %e, "Close frame not delivered");
                    }
                    emit(
                        &signals,
                        id,
                        SignalKind::Closed {
                            code: NORMAL_CLOSE_CODE,
                            reason: "closed by client".to_string(),
                        },
                    );
                    return;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    emit(&signals, id, SignalKind::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    emit(&signals, id, SignalKind::Message(text));
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                        .unwrap_or((ABNORMAL_CLOSE_CODE, "no close frame".to_string()));
                    emit(&signals, id, SignalKind::Closed { code, reason });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit_fault(&signals, id, e.to_string());
                    return;
                }
                None => {
                    emit(
                        &signals,
                        id,
                        SignalKind::Closed {
                            code: ABNORMAL_CLOSE_CODE,
                            reason: "stream ended".to_string(),
                        },
                    );
                    return;
                }
            },
        }
    }
}
