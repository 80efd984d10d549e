//! Publishing and service health against a scripted backend

use std::sync::Arc;
use std::time::Duration;

use quill::backend::{platforms_or_fallback, tones_or_fallback, HealthMonitor};
use quill::config::PollingConfig;
use quill::publish::{PublishingClient, EMPTY_CONTENT, STATUS_CHECK_FAILED};
use quill::types::{
    HealthResponse, PublishCapabilities, PublishResponse, PublishStatusResponse, StatusResponse,
    Visibility,
};

use crate::integration::test_utils::ScriptedBackend;

fn configured() -> PublishStatusResponse {
    PublishStatusResponse {
        configured: true,
        error: None,
        capabilities: Some(PublishCapabilities {
            text_posting: true,
            image_posting: true,
            video_posting: false,
        }),
    }
}

fn posted(url: &str) -> PublishResponse {
    PublishResponse {
        success: true,
        post_id: Some("urn:li:share:42".to_string()),
        url: Some(url.to_string()),
        error: None,
        execution_time_seconds: 1.2,
    }
}

#[tokio::test]
async fn test_check_then_publish_records_url() {
    let backend = Arc::new(ScriptedBackend::default());
    *backend.publish_status.lock().unwrap() = Some(configured());
    *backend.publish_response.lock().unwrap() =
        Some(posted("https://www.linkedin.com/feed/update/urn:li:share:42"));
    let client = PublishingClient::new(backend.clone());

    let state = client.check_status().await;
    assert!(state.is_configured);
    assert!(state.capabilities.unwrap().image_posting);

    let response = client
        .publish(
            "Shipping Rust at scale",
            Some("/images/generated.png"),
            Visibility::Connections,
        )
        .await;
    assert!(response.success);

    let state = client.state();
    assert!(!state.is_posting);
    assert_eq!(state.posting_error, None);
    assert_eq!(
        state.last_post_url.as_deref(),
        Some("https://www.linkedin.com/feed/update/urn:li:share:42")
    );

    let published = backend.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].visibility, Visibility::Connections);
    assert_eq!(published[0].image_path.as_deref(), Some("/images/generated.png"));
}

#[tokio::test]
async fn test_unreachable_status_marks_unconfigured() {
    let backend = Arc::new(ScriptedBackend::default());
    let client = PublishingClient::new(backend);

    let state = client.check_status().await;

    assert!(!state.is_configured);
    assert_eq!(state.posting_error.as_deref(), Some(STATUS_CHECK_FAILED));
}

#[tokio::test]
async fn test_backend_rejection_is_kept_as_posting_error() {
    let backend = Arc::new(ScriptedBackend::default());
    *backend.publish_response.lock().unwrap() = Some(PublishResponse {
        success: false,
        post_id: None,
        url: None,
        error: Some("Token expired".to_string()),
        execution_time_seconds: 0.3,
    });
    let client = PublishingClient::new(backend);

    let response = client.publish("hello", None, Visibility::Public).await;

    assert!(!response.success);
    assert_eq!(client.state().posting_error.as_deref(), Some("Token expired"));

    client.reset_posting_state();
    assert_eq!(client.state().posting_error, None);
}

#[tokio::test]
async fn test_blank_content_never_reaches_backend() {
    let backend = Arc::new(ScriptedBackend::default());
    let client = PublishingClient::new(backend.clone());

    let response = client.publish(" \n ", None, Visibility::Public).await;

    assert_eq!(response.error.as_deref(), Some(EMPTY_CONTENT));
    assert!(backend.published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_discovery_falls_back_when_offline() {
    let backend = ScriptedBackend::default();

    let platforms = platforms_or_fallback(&backend).await;
    let tones = tones_or_fallback(&backend).await;

    let ids: Vec<&str> = platforms.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(ids, vec!["blog_post", "linkedin", "twitter"]);
    assert_eq!(tones.len(), 3);
}

#[tokio::test]
async fn test_health_monitor_tracks_backend() {
    let backend = Arc::new(ScriptedBackend::default());
    let polling = PollingConfig {
        health_interval_secs: 1,
        status_interval_secs: 1,
    };
    let monitor = HealthMonitor::spawn(backend.clone(), &polling);
    let mut updates = monitor.subscribe();

    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(!monitor.current().online);

    *backend.health.lock().unwrap() = Some(HealthResponse {
        status: "healthy".to_string(),
        timestamp: "2024-03-01T09:00:00Z".to_string(),
        version: "1.0.0".to_string(),
    });
    *backend.status.lock().unwrap() = Some(StatusResponse {
        service: "content-generation".to_string(),
        workflow_status: Default::default(),
        dependencies: Default::default(),
        health: "healthy".to_string(),
    });

    let online = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            updates.changed().await.unwrap();
            if updates.borrow().online {
                break;
            }
        }
    })
    .await;
    assert!(online.is_ok(), "monitor never saw the backend come online");
    monitor.stop();
}
