//! Server-status poller.
//!
//! DESIGN
//! ======
//! Status starts at `Checking` and is re-evaluated on every tick: one
//! health check per tick, no hysteresis, so a single result flips the
//! status. Observers are notified only on actual transitions, in
//! registration order, before the next tick starts.
//!
//! LIFECYCLE
//! =========
//! `StatusPoller::start` hands the tick loop to a `Scheduler` and returns
//! the `TaskHandle`; dropping or cancelling it is the teardown. Nothing
//! else keeps the loop alive.

#[cfg(test)]
#[path = "health_test.rs"]
mod health_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use super::scheduler::{Job, Scheduler, TaskHandle};
use crate::error::ClientError;
use crate::net::MessageApi;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Checking,
    Online,
    Offline,
}

impl ServerStatus {
    /// Whether message-sending affordances should be enabled.
    #[must_use]
    pub fn can_send(self) -> bool {
        self == Self::Online
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Next status after a health result, or `None` if nothing changes.
#[must_use]
pub fn next_status(current: ServerStatus, healthy: bool) -> Option<ServerStatus> {
    let next = if healthy { ServerStatus::Online } else { ServerStatus::Offline };
    (next != current).then_some(next)
}

// =============================================================================
// SEAMS
// =============================================================================

#[async_trait::async_trait]
pub trait HealthCheck: Send + Sync {
    /// # Errors
    ///
    /// Any failure marks the server offline.
    async fn check(&self) -> Result<(), ClientError>;
}

#[async_trait::async_trait]
impl HealthCheck for MessageApi {
    async fn check(&self) -> Result<(), ClientError> {
        self.health().await.map(|_| ())
    }
}

#[async_trait::async_trait]
pub trait StatusObserver: Send + Sync {
    async fn on_status_change(&self, from: ServerStatus, to: ServerStatus);
}

// =============================================================================
// POLLER
// =============================================================================

pub struct StatusPoller {
    health: Arc<dyn HealthCheck>,
    observers: Vec<Arc<dyn StatusObserver>>,
    interval: Duration,
    status: watch::Sender<ServerStatus>,
}

impl StatusPoller {
    #[must_use]
    pub fn new(health: Arc<dyn HealthCheck>, interval: Duration) -> Self {
        let (status, _) = watch::channel(ServerStatus::Checking);
        Self { health, observers: Vec::new(), interval, status }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    #[must_use]
    pub fn status(&self) -> ServerStatus {
        *self.status.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ServerStatus> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one health check and apply the result.
    pub async fn tick(&self) -> ServerStatus {
        let healthy = match self.health.check().await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        };

        let from = self.status();
        let Some(to) = next_status(from, healthy) else {
            return from;
        };
        self.status.send_replace(to);
        info!(%from, %to, "server status changed");
        for observer in &self.observers {
            observer.on_status_change(from, to).await;
        }
        to
    }

    /// Start polling: one check now, then one per interval until the handle goes away.
    pub fn start(self: &Arc<Self>, scheduler: &dyn Scheduler) -> TaskHandle {
        let poller = Arc::clone(self);
        let job: Job = Arc::new(move || {
            let poller = Arc::clone(&poller);
            Box::pin(async move {
                poller.tick().await;
            })
        });
        scheduler.repeat(self.interval, job)
    }
}
