//! Shared test utilities for integration tests
//!
//! XDG environment isolation, a scripted WebSocket generation server and a
//! scripted REST backend.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Map, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use quill::backend::BackendApi;
use quill::error::ApiError;
use quill::types::{
    GenerationRequest, GenerationResult, HealthResponse, Platform, PublishRequest,
    PublishResponse, PublishStatusResponse, StatusResponse, Tone,
};

/// Global mutex to serialize XDG environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

const ISOLATED_VARS: [&str; 5] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "QUILL_ENV",
    "QUILL_BACKEND__BASE_URL",
];

impl EnvState {
    fn capture() -> Self {
        Self {
            vars: ISOLATED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with HOME, XDG_CONFIG_HOME and XDG_DATA_HOME pointed into `test_dir`.
///
/// Config lives in `<test_dir>/config`, data in `<test_dir>/data`. The original
/// environment is restored afterwards; a global mutex serializes callers.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().join("config");
    let test_data_home = test_dir.path().join("data");
    let test_home = test_dir.path().join("home");

    std::fs::create_dir_all(&test_config_home).unwrap();
    std::fs::create_dir_all(&test_data_home).unwrap();
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", &test_config_home);
    std::env::set_var("XDG_DATA_HOME", &test_data_home);
    std::env::remove_var("QUILL_ENV");
    std::env::remove_var("QUILL_BACKEND__BASE_URL");

    let result = f();

    env_state.restore();

    result
}

pub fn sample_result(topic: &str) -> GenerationResult {
    GenerationResult {
        success: true,
        topic: topic.to_string(),
        platform: "linkedin".to_string(),
        tone: "professional".to_string(),
        research_points: vec![
            "Adoption doubled year over year".to_string(),
            "Memory safety is the main driver".to_string(),
        ],
        content: format!("Here is what we learned about {}.", topic),
        word_count: 7,
        image_path: Some("/images/generated.png".to_string()),
        execution_time_seconds: 42.5,
        error: None,
        metadata: Map::new(),
    }
}

/// Wire form of a completed result, as the backend sends it.
pub fn result_payload(topic: &str) -> Value {
    json!({
        "success": true,
        "topic": topic,
        "platform": "linkedin",
        "tone": "professional",
        "research_bullet_points": ["Adoption doubled year over year"],
        "generated_content": format!("Here is what we learned about {}.", topic),
        "word_count": 7,
        "generated_image_path": null,
        "execution_time_seconds": 12.0,
        "metadata": {}
    })
}

pub fn event(status: &str, message: &str) -> String {
    json!({ "status": status, "message": message }).to_string()
}

/// One server action after the request has been received.
pub enum Step {
    Send(String),
    /// Close with the given code.
    Close(u16),
    /// Drop the TCP connection without a closing handshake.
    Drop,
    /// Keep the socket open until the client goes away.
    Hold,
}

/// Bind a one-shot generation stream server.
///
/// The server sends `connected`, waits for the client's request, then plays
/// `script`. The join handle yields the raw request it received.
pub async fn spawn_stream_server(script: Vec<Step>) -> (String, JoinHandle<Option<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move { serve_session(&listener, script).await });
    (format!("ws://{}", addr), handle)
}

/// Like `spawn_stream_server`, but serves one script per incoming connection, in order.
pub async fn spawn_stream_sessions(
    scripts: Vec<Vec<Step>>,
) -> (String, JoinHandle<Vec<Option<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for script in scripts {
            requests.push(serve_session(&listener, script).await);
        }
        requests
    });
    (format!("ws://{}", addr), handle)
}

async fn serve_session(listener: &TcpListener, script: Vec<Step>) -> Option<String> {
    let (tcp, _) = listener.accept().await.ok()?;
    let mut socket = tokio_tungstenite::accept_async(tcp).await.ok()?;
    socket
        .send(Message::text(event("connected", "Connected to server")))
        .await
        .ok()?;

    let request = loop {
        match socket.next().await? {
            Ok(Message::Text(text)) => break text.as_str().to_owned(),
            Ok(_) => continue,
            Err(_) => return None,
        }
    };

    for step in script {
        match step {
            Step::Send(text) => {
                if socket.send(Message::text(text)).await.is_err() {
                    return Some(request);
                }
            }
            Step::Close(code) => {
                let frame = CloseFrame {
                    code: CloseCode::from(code),
                    reason: "server closing".into(),
                };
                let _ = socket.send(Message::Close(Some(frame))).await;
                return Some(request);
            }
            Step::Drop => {
                drop(socket);
                return Some(request);
            }
            Step::Hold => {
                while let Some(Ok(frame)) = socket.next().await {
                    if matches!(frame, Message::Close(_)) {
                        break;
                    }
                }
                return Some(request);
            }
        }
    }

    // Drain until the client closes.
    let _ = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(Ok(frame)) = socket.next().await {
            if matches!(frame, Message::Close(_)) {
                break;
            }
        }
    })
    .await;
    Some(request)
}

/// REST backend double; each endpoint answers with its configured value or fails.
#[derive(Default)]
pub struct ScriptedBackend {
    pub health: Mutex<Option<HealthResponse>>,
    pub status: Mutex<Option<StatusResponse>>,
    pub publish_status: Mutex<Option<PublishStatusResponse>>,
    pub publish_response: Mutex<Option<PublishResponse>>,
    pub published: Mutex<Vec<PublishRequest>>,
}

fn offline() -> ApiError {
    ApiError::ConnectionFailed("connection refused".to_string())
}

#[async_trait]
impl BackendApi for ScriptedBackend {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.health.lock().unwrap().clone().ok_or_else(offline)
    }

    async fn status(&self) -> Result<StatusResponse, ApiError> {
        self.status.lock().unwrap().clone().ok_or_else(offline)
    }

    async fn platforms(&self) -> Result<Vec<Platform>, ApiError> {
        Err(offline())
    }

    async fn tones(&self) -> Result<Vec<Tone>, ApiError> {
        Err(offline())
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiError> {
        Ok(sample_result(&request.topic))
    }

    async fn publish_status(&self) -> Result<PublishStatusResponse, ApiError> {
        self.publish_status.lock().unwrap().clone().ok_or_else(offline)
    }

    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, ApiError> {
        self.published.lock().unwrap().push(request.clone());
        self.publish_response.lock().unwrap().clone().ok_or_else(offline)
    }
}
