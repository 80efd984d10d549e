//! End-to-end generation sessions against a scripted WebSocket server

use std::time::Duration;

use serde_json::{json, Value};

use quill::session::reducer::{CONNECTION_ERROR, CONNECTION_LOST_ERROR, MALFORMED_MESSAGE_ERROR};
use quill::session::{
    stream_url, GenerationSessionController, GenerationState, SessionPhase, WsConnector,
};
use quill::types::GenerationRequest;

use crate::integration::test_utils::{
    event, result_payload, spawn_stream_server, spawn_stream_sessions, Step,
};

const SESSION_TIMEOUT: Duration = Duration::from_secs(10);

fn request() -> GenerationRequest {
    GenerationRequest::new("rust in production", "linkedin", "professional")
}

fn completed(data: Value) -> String {
    json!({
        "status": "completed",
        "message": "Content generation completed!",
        "data": data
    })
    .to_string()
}

async fn run(
    controller: &mut GenerationSessionController<WsConnector>,
) -> (GenerationState, Vec<u8>) {
    let mut progress = Vec::new();
    let state = tokio::time::timeout(
        SESSION_TIMEOUT,
        controller.run_to_completion(|session| progress.push(session.view.progress)),
    )
    .await
    .expect("session did not finish in time");
    (state, progress)
}

#[tokio::test]
async fn test_full_session_reports_every_stage() {
    let (base, server) = spawn_stream_server(vec![
        Step::Send(event("started", "Starting content generation...")),
        Step::Send(event("research", "Research agent is gathering insights...")),
        Step::Send(event("content", "Content agent is writing...")),
        Step::Send(event("image", "Image agent is creating visuals...")),
        Step::Send(completed(result_payload("rust in production"))),
    ])
    .await;

    let mut controller = GenerationSessionController::new(WsConnector, stream_url(&base));
    controller.start_generation(request()).unwrap();
    assert!(controller.state().is_generating);
    assert_eq!(controller.state().progress, 5);

    let (state, progress) = run(&mut controller).await;

    assert_eq!(progress, vec![10, 20, 40, 70, 90, 100]);
    assert!(!state.is_generating);
    assert_eq!(state.error, None);
    assert_eq!(state.progress, 100);
    let result = state.result.expect("result is recorded");
    assert!(result.success);
    assert_eq!(result.topic, "rust in production");

    let (req, res) = controller.completed().expect("completed session");
    assert_eq!(req, &request());
    assert_eq!(res.content, "Here is what we learned about rust in production.");

    let sent = server.await.unwrap().expect("server saw a request");
    let sent: Value = serde_json::from_str(&sent).unwrap();
    assert_eq!(
        sent,
        json!({"topic": "rust in production", "platform": "linkedin", "tone": "professional"})
    );
}

#[tokio::test]
async fn test_completion_payload_may_be_json_string() {
    let encoded = result_payload("rust in production").to_string();
    let (base, _server) = spawn_stream_server(vec![Step::Send(completed(Value::String(encoded)))])
        .await;

    let mut controller = GenerationSessionController::new(WsConnector, stream_url(&base));
    controller.start_generation(request()).unwrap();
    let (state, _) = run(&mut controller).await;

    assert_eq!(controller.phase(), SessionPhase::Completed);
    assert!(state.result.unwrap().success);
}

#[tokio::test]
async fn test_unsuccessful_result_surfaces_backend_error() {
    let mut payload = result_payload("rust in production");
    payload["success"] = json!(false);
    payload["error"] = json!("Research agent timed out");
    let (base, _server) = spawn_stream_server(vec![Step::Send(completed(payload))]).await;

    let mut controller = GenerationSessionController::new(WsConnector, stream_url(&base));
    controller.start_generation(request()).unwrap();
    let (state, _) = run(&mut controller).await;

    assert_eq!(state.error.as_deref(), Some("Research agent timed out"));
    assert!(state.result.is_some());
    assert!(controller.completed().is_none());
}

#[tokio::test]
async fn test_error_event_fails_session() {
    let error = json!({
        "status": "error",
        "message": "Generation failed",
        "error": "Model quota exceeded"
    })
    .to_string();
    let (base, _server) = spawn_stream_server(vec![
        Step::Send(event("started", "Starting content generation...")),
        Step::Send(error),
        Step::Hold,
    ])
    .await;

    let mut controller = GenerationSessionController::new(WsConnector, stream_url(&base));
    controller.start_generation(request()).unwrap();
    let (state, _) = run(&mut controller).await;

    assert_eq!(controller.phase(), SessionPhase::Failed);
    assert_eq!(state.error.as_deref(), Some("Model quota exceeded"));
    assert_eq!(state.progress, 0);
    assert!(!state.is_generating);
}

#[tokio::test]
async fn test_malformed_frame_is_protocol_error() {
    let (base, _server) =
        spawn_stream_server(vec![Step::Send("not json".to_string()), Step::Hold]).await;

    let mut controller = GenerationSessionController::new(WsConnector, stream_url(&base));
    controller.start_generation(request()).unwrap();
    let (state, _) = run(&mut controller).await;

    assert_eq!(state.error.as_deref(), Some(MALFORMED_MESSAGE_ERROR));
}

#[tokio::test]
async fn test_server_close_mid_session_is_connection_lost() {
    let (base, _server) = spawn_stream_server(vec![
        Step::Send(event("research", "Research agent is gathering insights...")),
        Step::Close(1011),
    ])
    .await;

    let mut controller = GenerationSessionController::new(WsConnector, stream_url(&base));
    controller.start_generation(request()).unwrap();
    let (state, _) = run(&mut controller).await;

    assert_eq!(state.error.as_deref(), Some(CONNECTION_LOST_ERROR));
    assert_eq!(state.progress, 0);
    assert!(!controller.connections().is_live());
}

#[tokio::test]
async fn test_dropped_socket_fails_session() {
    let (base, _server) = spawn_stream_server(vec![
        Step::Send(event("started", "Starting content generation...")),
        Step::Drop,
    ])
    .await;

    let mut controller = GenerationSessionController::new(WsConnector, stream_url(&base));
    controller.start_generation(request()).unwrap();
    let (state, _) = run(&mut controller).await;

    // Depending on how the reset is observed this is a transport fault or an abnormal close.
    let error = state.error.expect("session failed");
    assert!(
        error == CONNECTION_ERROR || error == CONNECTION_LOST_ERROR,
        "unexpected error: {}",
        error
    );
    assert_eq!(controller.phase(), SessionPhase::Failed);
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut controller =
        GenerationSessionController::new(WsConnector, stream_url(&format!("ws://{}", addr)));
    controller.start_generation(request()).unwrap();
    let (state, progress) = run(&mut controller).await;

    assert_eq!(state.error.as_deref(), Some(CONNECTION_ERROR));
    assert_eq!(progress, vec![0]);
    assert_eq!(controller.phase(), SessionPhase::Failed);
}

#[tokio::test]
async fn test_invalid_request_never_connects() {
    let mut controller =
        GenerationSessionController::new(WsConnector, stream_url("ws://127.0.0.1:9"));
    let err = controller
        .start_generation(GenerationRequest::new("ab", "linkedin", "professional"))
        .unwrap_err();

    assert!(err.to_string().contains("at least"));
    assert_eq!(controller.phase(), SessionPhase::Idle);
    assert!(!controller.connections().is_live());
}

#[tokio::test]
async fn test_reset_then_new_session_uses_fresh_connection() {
    let (base, server) = spawn_stream_sessions(vec![
        vec![
            Step::Send(event("research", "Research agent is gathering insights...")),
            Step::Hold,
        ],
        vec![Step::Send(completed(result_payload("second topic")))],
    ])
    .await;

    let mut controller = GenerationSessionController::new(WsConnector, stream_url(&base));
    controller.start_generation(request()).unwrap();
    // connected, then research
    for _ in 0..2 {
        tokio::time::timeout(SESSION_TIMEOUT, controller.next_update())
            .await
            .unwrap()
            .expect("update");
    }
    assert_eq!(controller.state().progress, 40);
    let first_connection = controller.connections().live_id();

    controller.reset();
    assert_eq!(controller.phase(), SessionPhase::Idle);
    assert_eq!(controller.state(), &GenerationState::default());
    assert!(!controller.connections().is_live());

    controller
        .start_generation(GenerationRequest::new("second topic", "twitter", "casual"))
        .unwrap();
    assert_ne!(controller.connections().live_id(), first_connection);
    let (state, progress) = run(&mut controller).await;

    assert_eq!(progress.first(), Some(&10), "late frames from the first socket are dropped");
    assert_eq!(state.error, None);
    assert_eq!(state.result.unwrap().topic, "second topic");

    let requests = tokio::time::timeout(SESSION_TIMEOUT, server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(requests.len(), 2);
    let second: Value = serde_json::from_str(requests[1].as_deref().unwrap()).unwrap();
    assert_eq!(second["platform"], "twitter");
}
