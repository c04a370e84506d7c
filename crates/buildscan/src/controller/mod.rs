//! Job lifecycle controller.
//!
//! [`ScanController`] owns the state machine
//! `Idle -> Uploading -> Polling -> {Completed, Failed}` for one job at a
//! time. It validates and submits a file, polls the job at a fixed interval,
//! and keeps the final results and their summary once the job completes.
//!
//! Every async continuation re-checks the job epoch before touching state,
//! so responses that arrive after a new scan started are dropped.

pub mod error;
pub mod progress;
mod scheduler;
pub mod state;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};

pub use error::ControllerError;
pub use progress::Progress;
pub use state::{ControllerView, Lifecycle};

use crate::aggregate::summarize;
use crate::broadcast::{LifecycleBroadcaster, LifecycleEvent};
use crate::config::{ClientConfig, ControllerSettings};
use crate::model::{JobReceipt, JobSnapshot, JobStatus, UploadFile};
use crate::transport::{HttpScanClient, ScanApi, TransportError};
use scheduler::PollHandle;
use state::ControllerState;

/// Banner text when a job fails without a message.
const DEFAULT_JOB_FAILED_MESSAGE: &str = "Job failed";

/// Banner text when an upload fails without a server message.
const DEFAULT_UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

/// Outcome of a single poll tick that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollOutcome {
    /// The job is still running; the snapshot was stored.
    Updated,
    /// An older snapshot arrived after a newer one and was dropped.
    OutOfOrder,
    /// Results were fetched and the controller is Completed.
    Completed,
    /// The response belonged to a job that is no longer active.
    Stale,
}

pub(crate) struct Inner {
    api: Arc<dyn ScanApi>,
    settings: ControllerSettings,
    state: RwLock<ControllerState>,
    events: LifecycleBroadcaster,
}

impl Inner {
    fn read(&self) -> RwLockReadGuard<'_, ControllerState> {
        match self.state.read() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Controller state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ControllerState> {
        match self.state.write() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Controller state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub(crate) fn is_polling(&self, epoch: u64) -> bool {
        self.read().is_polling(epoch)
    }

    fn progress_of(&self, snapshot: &JobSnapshot) -> Progress {
        Progress::from_snapshot(snapshot, self.settings.seconds_per_item)
    }
}

/// Client-side owner of one scan session.
///
/// Construct one per session and share it by reference (or inside an
/// `Arc`). Dropping the controller stops its poll loop.
pub struct ScanController {
    inner: Arc<Inner>,
}

impl ScanController {
    pub fn new(api: Arc<dyn ScanApi>, settings: ControllerSettings) -> Self {
        let events = LifecycleBroadcaster::new(settings.event_capacity);
        Self {
            inner: Arc::new(Inner {
                api,
                settings,
                state: RwLock::new(ControllerState::new()),
                events,
            }),
        }
    }

    /// Builds a controller backed by [`HttpScanClient`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = HttpScanClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.controller_settings()))
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.inner.settings
    }

    /// Validates and uploads `file`, then starts polling the new job.
    ///
    /// Accepted from Idle and Failed. A file that fails validation never
    /// reaches the network and leaves the controller Idle with the message
    /// in the error banner. An upload failure does the same with the
    /// server's message when it sent one.
    pub async fn submit(&self, file: UploadFile) -> Result<JobReceipt, ControllerError> {
        let (epoch, stale) = {
            let mut state = self.inner.write();
            if !matches!(state.lifecycle, Lifecycle::Idle | Lifecycle::Failed) {
                return Err(ControllerError::InvalidState {
                    state: state.lifecycle,
                    action: "submit",
                });
            }

            let stale = state.reset();

            if let Err(err) = file.validate(&self.inner.settings.upload) {
                info!("Rejected {}: {}", file.file_name(), err);
                let message = err.to_string();
                state.error = Some(message.clone());
                drop(state);
                drop(stale);
                self.inner.events.send(LifecycleEvent::transition(
                    Lifecycle::Idle,
                    None,
                    Some(&message),
                ));
                return Err(err.into());
            }

            state.lifecycle = Lifecycle::Uploading;
            (state.epoch, stale)
        };
        drop(stale);
        self.inner
            .events
            .send(LifecycleEvent::transition(Lifecycle::Uploading, None, None));

        let outcome = self.inner.api.submit_job(&file).await;

        let mut state = self.inner.write();
        if state.epoch != epoch || state.lifecycle != Lifecycle::Uploading {
            debug!("Discarding upload outcome for superseded epoch {}", epoch);
            return Err(ControllerError::Superseded);
        }

        match outcome {
            Ok(receipt) => {
                state.job_id = Some(receipt.job_id.clone());
                state.job = Some(JobSnapshot::pending(&receipt.job_id, receipt.total_count));
                state.lifecycle = Lifecycle::Polling;
                let handle = PollHandle::spawn(
                    Arc::downgrade(&self.inner),
                    epoch,
                    self.inner.settings.poll_interval,
                );
                let previous = state.scheduler.replace(handle);
                drop(state);
                drop(previous);

                info!(
                    "Polling job {} ({} addresses)",
                    receipt.job_id, receipt.total_count
                );
                self.inner.events.send(LifecycleEvent::transition(
                    Lifecycle::Polling,
                    Some(&receipt.job_id),
                    None,
                ));
                Ok(receipt)
            }
            Err(e) => {
                let message = e.user_message(DEFAULT_UPLOAD_FAILED_MESSAGE);
                warn!("Upload of {} failed: {}", file.file_name(), e);
                state.lifecycle = Lifecycle::Idle;
                state.error = Some(message.clone());
                drop(state);
                self.inner.events.send(LifecycleEvent::transition(
                    Lifecycle::Idle,
                    None,
                    Some(&message),
                ));
                Err(ControllerError::Upload { message })
            }
        }
    }

    /// Abandons whatever is in progress and returns to a clean Idle.
    pub fn start_new_scan(&self) {
        let (previous_job, stale) = {
            let mut state = self.inner.write();
            let previous_job = state.job_id.clone();
            (previous_job, state.reset())
        };
        drop(stale);

        if let Some(job_id) = previous_job {
            info!("Started new scan, discarding job {}", job_id);
        }
        self.inner
            .events
            .send(LifecycleEvent::transition(Lifecycle::Idle, None, None));
    }

    /// Clears the error banner without touching anything else.
    pub fn dismiss_error(&self) {
        self.inner.write().error = None;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.read().lifecycle
    }

    /// Progress of the stored job, if there is one.
    pub fn progress(&self) -> Option<Progress> {
        let state = self.inner.read();
        state.job.as_ref().map(|job| self.inner.progress_of(job))
    }

    pub fn snapshot(&self) -> ControllerView {
        self.inner.read().view(self.inner.settings.seconds_per_item)
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<LifecycleEvent> {
        self.inner.events.subscribe()
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        let handle = self.inner.write().scheduler.take();
        drop(handle);
    }
}

/// Runs one poll tick for the job identified by `epoch`.
pub(crate) async fn poll_once(inner: &Inner, epoch: u64) -> Result<PollOutcome, ControllerError> {
    let job_id = {
        let state = inner.read();
        match (&state.job_id, state.is_polling(epoch)) {
            (Some(job_id), true) => job_id.clone(),
            _ => return Ok(PollOutcome::Stale),
        }
    };

    let fetched = inner.api.fetch_status(&job_id).await;

    let snapshot = {
        let mut state = inner.write();
        if !state.is_polling(epoch) {
            return Ok(PollOutcome::Stale);
        }
        match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                state.transient_failures += 1;
                warn!("Status poll for job {} failed: {}", job_id, e);
                return Err(ControllerError::TransientPoll(e));
            }
        }
    };

    match snapshot.status {
        JobStatus::Pending | JobStatus::Processing => {
            let mut state = inner.write();
            if !state.is_polling(epoch) {
                return Ok(PollOutcome::Stale);
            }
            let behind = state
                .job
                .as_ref()
                .is_some_and(|stored| snapshot.processed_count < stored.processed_count);
            if behind {
                debug!(
                    "Dropping out-of-order snapshot for job {} ({} processed)",
                    job_id, snapshot.processed_count
                );
                return Ok(PollOutcome::OutOfOrder);
            }
            let progress = inner.progress_of(&snapshot);
            state.job = Some(snapshot);
            drop(state);
            inner.events.send(LifecycleEvent::progress(&job_id, progress));
            Ok(PollOutcome::Updated)
        }
        JobStatus::Failed => {
            let message = snapshot
                .error
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_JOB_FAILED_MESSAGE.to_string());
            let handle = {
                let mut state = inner.write();
                if !state.is_polling(epoch) {
                    return Ok(PollOutcome::Stale);
                }
                state.lifecycle = Lifecycle::Failed;
                state.error = Some(message.clone());
                state.job = Some(snapshot);
                state.scheduler.take()
            };
            drop(handle);
            warn!("Job {} failed: {}", job_id, message);
            inner.events.send(LifecycleEvent::transition(
                Lifecycle::Failed,
                Some(&job_id),
                Some(&message),
            ));
            Err(ControllerError::JobFailed { message })
        }
        JobStatus::Completed => {
            let fetched = inner.api.fetch_results(&job_id).await;
            let (handle, count) = {
                let mut state = inner.write();
                if !state.is_polling(epoch) {
                    return Ok(PollOutcome::Stale);
                }
                let results = match fetched {
                    Ok(results) => results,
                    Err(e) => {
                        state.transient_failures += 1;
                        state.job = Some(snapshot);
                        warn!(
                            "Job {} completed but fetching results failed: {}",
                            job_id, e
                        );
                        return Err(ControllerError::TransientPoll(e));
                    }
                };
                let count = results.len();
                state.summary = Some(summarize(&results));
                state.results = Some(Arc::new(results));
                state.job = Some(snapshot);
                state.lifecycle = Lifecycle::Completed;
                (state.scheduler.take(), count)
            };
            drop(handle);
            info!("Job {} completed with {} results", job_id, count);
            inner.events.send(LifecycleEvent::transition(
                Lifecycle::Completed,
                Some(&job_id),
                None,
            ));
            Ok(PollOutcome::Completed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::model::ResultRecord;
    use crate::transport::error::Result as TransportResult;

    /// Status responses keyed by job id; fetches block while `gated` is set.
    struct GatedApi {
        statuses: Mutex<VecDeque<(String, JobSnapshot)>>,
        gate: Semaphore,
        gated: AtomicBool,
        next_job: AtomicU32,
    }

    impl GatedApi {
        fn new() -> Self {
            Self {
                statuses: Mutex::new(VecDeque::new()),
                gate: Semaphore::new(0),
                gated: AtomicBool::new(false),
                next_job: AtomicU32::new(0),
            }
        }

        fn release(&self) {
            self.gate.add_permits(16);
        }
    }

    #[async_trait]
    impl ScanApi for GatedApi {
        async fn submit_job(&self, _file: &UploadFile) -> TransportResult<JobReceipt> {
            let n = self.next_job.fetch_add(1, Ordering::SeqCst);
            let job_id = ["job-a", "job-b", "job-c"][n as usize % 3].to_string();
            Ok(JobReceipt {
                job_id,
                message: String::new(),
                total_count: 4,
            })
        }

        async fn fetch_status(&self, job_id: &str) -> TransportResult<JobSnapshot> {
            if self.gated.load(Ordering::SeqCst) {
                if let Ok(permit) = self.gate.acquire().await {
                    permit.forget();
                }
            }
            let mut statuses = self.statuses.lock().unwrap();
            let position = statuses.iter().position(|(id, _)| id == job_id);
            Ok(position
                .and_then(|i| statuses.remove(i))
                .map(|(_, snapshot)| snapshot)
                .unwrap_or_else(|| JobSnapshot::pending(job_id, 4)))
        }

        async fn fetch_results(&self, _job_id: &str) -> TransportResult<Vec<ResultRecord>> {
            Ok(vec![ResultRecord::default()])
        }
    }

    fn settings() -> ControllerSettings {
        ControllerSettings {
            poll_interval: Duration::from_secs(3600),
            ..ControllerSettings::default()
        }
    }

    fn csv() -> UploadFile {
        UploadFile::new("input.csv", "street_number,street_name,zip_code\n1,A,1\n")
    }

    fn snapshot(job_id: &str, status: JobStatus, processed: u32) -> JobSnapshot {
        JobSnapshot {
            status,
            processed_count: processed,
            ..JobSnapshot::pending(job_id, 4)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_after_new_scan_is_ignored() {
        let api = Arc::new(GatedApi::new());
        let controller = ScanController::new(api.clone(), settings());

        controller.submit(csv()).await.unwrap();
        let epoch_a = controller.inner.read().epoch;

        // Hold job A's status response until job B is active.
        api.gated.store(true, Ordering::SeqCst);
        api.statuses.lock().unwrap().push_back((
            "job-a".to_string(),
            snapshot("job-a", JobStatus::Failed, 2),
        ));
        let inner = Arc::clone(&controller.inner);
        let delayed = tokio::spawn(async move { poll_once(&inner, epoch_a).await });
        tokio::task::yield_now().await;

        controller.start_new_scan();
        api.gated.store(false, Ordering::SeqCst);
        controller.submit(csv()).await.unwrap();
        assert_eq!(controller.snapshot().job_id.as_deref(), Some("job-b"));

        api.release();
        let outcome = delayed.await.unwrap();
        assert_eq!(outcome, Ok(PollOutcome::Stale));

        let view = controller.snapshot();
        assert_eq!(view.lifecycle, Lifecycle::Polling);
        assert_eq!(view.job_id.as_deref(), Some("job-b"));
        assert_eq!(view.job.map(|j| j.job_id), Some("job-b".to_string()));
        assert!(view.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_snapshot_is_dropped() {
        let api = Arc::new(GatedApi::new());
        let controller = ScanController::new(api.clone(), settings());
        controller.submit(csv()).await.unwrap();
        let epoch = controller.inner.read().epoch;

        api.statuses.lock().unwrap().extend([
            (
                "job-a".to_string(),
                snapshot("job-a", JobStatus::Processing, 3),
            ),
            (
                "job-a".to_string(),
                snapshot("job-a", JobStatus::Processing, 1),
            ),
        ]);

        assert_eq!(
            poll_once(&controller.inner, epoch).await,
            Ok(PollOutcome::Updated)
        );
        assert_eq!(
            poll_once(&controller.inner, epoch).await,
            Ok(PollOutcome::OutOfOrder)
        );
        assert_eq!(controller.progress().map(|p| p.processed), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_after_completion_is_stale() {
        let api = Arc::new(GatedApi::new());
        let controller = ScanController::new(api.clone(), settings());
        controller.submit(csv()).await.unwrap();
        let epoch = controller.inner.read().epoch;

        api.statuses.lock().unwrap().push_back((
            "job-a".to_string(),
            snapshot("job-a", JobStatus::Completed, 4),
        ));
        assert_eq!(
            poll_once(&controller.inner, epoch).await,
            Ok(PollOutcome::Completed)
        );
        assert_eq!(
            poll_once(&controller.inner, epoch).await,
            Ok(PollOutcome::Stale)
        );
        assert!(!controller.snapshot().scheduler_active);
    }
}
