//! Lifecycle states and the data the controller holds for the active job.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::progress::Progress;
use super::scheduler::PollHandle;
use crate::aggregate::Summary;
use crate::model::{JobSnapshot, ResultRecord};

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Idle,
    Uploading,
    Polling,
    Completed,
    Failed,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Idle => "idle",
            Lifecycle::Uploading => "uploading",
            Lifecycle::Polling => "polling",
            Lifecycle::Completed => "completed",
            Lifecycle::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Lifecycle::Completed | Lifecycle::Failed)
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state behind the controller's lock.
pub(crate) struct ControllerState {
    pub lifecycle: Lifecycle,
    /// Bumped on every new job and every new scan; async continuations
    /// compare it before applying their result.
    pub epoch: u64,
    pub job_id: Option<String>,
    pub job: Option<JobSnapshot>,
    pub results: Option<Arc<Vec<ResultRecord>>>,
    pub summary: Option<Summary>,
    /// Message shown in the error banner.
    pub error: Option<String>,
    pub transient_failures: u32,
    pub scheduler: Option<PollHandle>,
}

impl ControllerState {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Idle,
            epoch: 0,
            job_id: None,
            job: None,
            results: None,
            summary: None,
            error: None,
            transient_failures: 0,
            scheduler: None,
        }
    }

    /// True while `epoch` still names the job being polled.
    pub fn is_polling(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.lifecycle == Lifecycle::Polling
    }

    /// Drops every trace of the current job and returns to Idle.
    ///
    /// The returned scheduler handle should be dropped after the lock is
    /// released; dropping it aborts the poll loop.
    #[must_use]
    pub fn reset(&mut self) -> Option<PollHandle> {
        self.epoch = self.epoch.wrapping_add(1);
        self.lifecycle = Lifecycle::Idle;
        self.job_id = None;
        self.job = None;
        self.results = None;
        self.summary = None;
        self.error = None;
        self.transient_failures = 0;
        self.scheduler.take()
    }

    pub fn view(&self, seconds_per_item: u64) -> ControllerView {
        ControllerView {
            lifecycle: self.lifecycle,
            job_id: self.job_id.clone(),
            job: self.job.clone(),
            progress: self
                .job
                .as_ref()
                .map(|job| Progress::from_snapshot(job, seconds_per_item)),
            results: self.results.clone(),
            summary: self.summary.clone(),
            error: self.error.clone(),
            transient_failures: self.transient_failures,
            scheduler_active: self
                .scheduler
                .as_ref()
                .is_some_and(|handle| !handle.is_finished()),
        }
    }
}

/// Read-only copy of the controller state for presentation code.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerView {
    pub lifecycle: Lifecycle,
    pub job_id: Option<String>,
    pub job: Option<JobSnapshot>,
    pub progress: Option<Progress>,
    pub results: Option<Arc<Vec<ResultRecord>>>,
    pub summary: Option<Summary>,
    pub error: Option<String>,
    /// Poll failures swallowed since the job started.
    pub transient_failures: u32,
    pub scheduler_active: bool,
}

impl ControllerView {
    /// True when nothing of a previous job is left.
    pub fn is_clean_idle(&self) -> bool {
        self.lifecycle == Lifecycle::Idle
            && self.job_id.is_none()
            && self.job.is_none()
            && self.results.is_none()
            && self.summary.is_none()
            && self.error.is_none()
            && !self.scheduler_active
    }
}
