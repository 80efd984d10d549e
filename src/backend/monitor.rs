//! Periodic liveness polling of `/health` and `/status`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::BackendApi;
use crate::config::PollingConfig;
use crate::types::{HealthResponse, StatusResponse};

/// Latest view of backend liveness.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceHealth {
    pub online: bool,
    pub health: Option<HealthResponse>,
    pub status: Option<StatusResponse>,
    pub last_error: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl ServiceHealth {
    fn record_health(&mut self, outcome: Result<HealthResponse, String>) {
        self.checked_at = Some(Utc::now());
        match outcome {
            Ok(health) => {
                self.online = true;
                self.health = Some(health);
                self.last_error = None;
            }
            Err(e) => {
                self.online = false;
                self.health = None;
                self.last_error = Some(e);
            }
        }
    }

    fn record_status(&mut self, outcome: Result<StatusResponse, String>) {
        self.checked_at = Some(Utc::now());
        match outcome {
            Ok(status) => self.status = Some(status),
            Err(e) => {
                self.online = false;
                self.status = None;
                self.last_error = Some(e);
            }
        }
    }
}

/// Poll both endpoints once.
pub async fn check_once<A: BackendApi + ?Sized>(api: &A) -> ServiceHealth {
    let mut snapshot = ServiceHealth::default();
    snapshot.record_health(api.health().await.map_err(|e| e.to_string()));
    snapshot.record_status(api.status().await.map_err(|e| e.to_string()));
    snapshot
}

/// Background poller publishing `ServiceHealth` snapshots on a watch channel.
///
/// The task is aborted when the monitor is dropped.
pub struct HealthMonitor {
    receiver: watch::Receiver<ServiceHealth>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    pub fn spawn<A: BackendApi + 'static>(api: Arc<A>, polling: &PollingConfig) -> Self {
        let (sender, receiver) = watch::channel(ServiceHealth::default());
        let health_every = Duration::from_secs(polling.health_interval_secs.max(1));
        let status_every = Duration::from_secs(polling.status_interval_secs.max(1));
        let task = tokio::spawn(poll(api, sender, health_every, status_every));
        Self { receiver, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<ServiceHealth> {
        self.receiver.clone()
    }

    pub fn current(&self) -> ServiceHealth {
        self.receiver.borrow().clone()
    }

    pub fn stop(self) {}
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll<A: BackendApi>(
    api: Arc<A>,
    sender: watch::Sender<ServiceHealth>,
    health_every: Duration,
    status_every: Duration,
) {
    let mut health_tick = interval(health_every);
    let mut status_tick = interval(status_every);
    health_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    status_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = health_tick.tick() => {
                let outcome = api.health().await.map_err(|e| e.to_string());
                if let Err(e) = &outcome {
                    warn!(error = %e, "Health check failed");
                }
                sender.send_modify(|snapshot| snapshot.record_health(outcome));
            }
            _ = status_tick.tick() => {
                let outcome = api.status().await.map_err(|e| e.to_string());
                if let Err(e) = &outcome {
                    warn!(error = %e, "Status check failed");
                }
                sender.send_modify(|snapshot| snapshot.record_status(outcome));
            }
        }
        if sender.is_closed() {
            debug!("Health monitor has no subscribers, stopping");
            break;
        }
    }
}
