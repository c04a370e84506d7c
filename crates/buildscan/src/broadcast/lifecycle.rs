//! Lifecycle event broadcaster for presentation code.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::controller::{Lifecycle, Progress};

/// A state transition or progress update of the controller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub lifecycle: Lifecycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Human-readable note, e.g. the banner message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    /// Creates an event for entering `lifecycle`.
    pub fn transition(lifecycle: Lifecycle, job_id: Option<&str>, message: Option<&str>) -> Self {
        Self {
            lifecycle,
            job_id: job_id.map(|s| s.to_string()),
            message: message.map(|s| s.to_string()),
            progress: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a progress update for a job being polled.
    pub fn progress(job_id: &str, progress: Progress) -> Self {
        Self {
            lifecycle: Lifecycle::Polling,
            job_id: Some(job_id.to_string()),
            message: None,
            progress: Some(progress),
            timestamp: Utc::now(),
        }
    }

    pub fn is_transition(&self) -> bool {
        self.progress.is_none()
    }
}

/// Broadcasts lifecycle events to any number of subscribers.
#[derive(Clone)]
pub struct LifecycleBroadcaster {
    sender: Arc<broadcast::Sender<LifecycleEvent>>,
}

impl LifecycleBroadcaster {
    /// Creates a broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: LifecycleEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }
}

impl Default for LifecycleBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
