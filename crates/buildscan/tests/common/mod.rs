//! Shared test utilities for buildscan integration tests.
//!
//! `FakeScanApi` plays back scripted transport responses so the lifecycle
//! controller can be driven without a network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use buildscan::model::{Category, JobReceipt, JobSnapshot, JobStatus, ResultRecord, UploadFile};
use buildscan::{ControllerView, ScanApi, ScanController, TransportError};

type Scripted<T> = Mutex<VecDeque<Result<T, TransportError>>>;

/// Pops the next scripted response; the last one repeats forever.
fn next<T: Clone>(queue: &Scripted<T>, what: &str) -> Result<T, TransportError> {
    let mut queue = queue.lock().unwrap();
    match queue.len() {
        0 => panic!("no scripted {} response", what),
        1 => queue[0].clone(),
        _ => queue.pop_front().unwrap(),
    }
}

pub struct FakeScanApi {
    upload: Scripted<JobReceipt>,
    statuses: Scripted<JobSnapshot>,
    results: Scripted<Vec<ResultRecord>>,
    upload_gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub results_calls: AtomicUsize,
}

impl FakeScanApi {
    /// A service that accepts uploads as `job_id` with `total` addresses and
    /// reports it as pending until told otherwise.
    pub fn accepting(job_id: &str, total: u32) -> Self {
        Self {
            upload: Mutex::new(VecDeque::from([Ok(JobReceipt {
                job_id: job_id.to_string(),
                message: format!("Processing {} addresses", total),
                total_count: total,
            })])),
            statuses: Mutex::new(VecDeque::from([Ok(JobSnapshot::pending(job_id, total))])),
            results: Mutex::new(VecDeque::from([Ok(Vec::new())])),
            upload_gate: Mutex::new(None),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            results_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_upload(error: TransportError) -> Self {
        let api = Self::accepting("unused", 0);
        *api.upload.lock().unwrap() = VecDeque::from([Err(error)]);
        api
    }

    pub fn with_uploads(self, receipts: Vec<JobReceipt>) -> Self {
        *self.upload.lock().unwrap() = receipts.into_iter().map(Ok).collect();
        self
    }

    pub fn with_statuses(self, statuses: Vec<Result<JobSnapshot, TransportError>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_results(self, results: Vec<Result<Vec<ResultRecord>, TransportError>>) -> Self {
        *self.results.lock().unwrap() = results.into();
        self
    }

    /// Makes the next upload wait until the returned sender fires.
    pub fn gate_upload(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.upload_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_fetches(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanApi for FakeScanApi {
    async fn submit_job(&self, _file: &UploadFile) -> Result<JobReceipt, TransportError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.upload_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        next(&self.upload, "upload")
    }

    async fn fetch_status(&self, _job_id: &str) -> Result<JobSnapshot, TransportError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.statuses, "status")
    }

    async fn fetch_results(&self, _job_id: &str) -> Result<Vec<ResultRecord>, TransportError> {
        self.results_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.results, "results")
    }
}

pub fn snapshot(job_id: &str, status: JobStatus, processed: u32, total: u32) -> JobSnapshot {
    JobSnapshot {
        job_id: job_id.to_string(),
        status,
        total_count: total,
        processed_count: processed,
        current_item: None,
        error: None,
    }
}

pub fn failed(job_id: &str, error: Option<&str>) -> JobSnapshot {
    JobSnapshot {
        error: error.map(|e| e.to_string()),
        ..snapshot(job_id, JobStatus::Failed, 0, 0)
    }
}

pub fn network_error() -> TransportError {
    TransportError::Request {
        url: "http://localhost:8000/api/status/job".to_string(),
        reason: "connection reset".to_string(),
    }
}

pub fn record(street: &str, category: Option<&str>, ratio: Option<f64>) -> ResultRecord {
    ResultRecord {
        street_number: "1".to_string(),
        street_name: street.to_string(),
        zip_code: "10001".to_string(),
        category: category.map(|c| Category::from(c.to_string())),
        ratio_estimate: ratio,
        ..ResultRecord::default()
    }
}

pub fn csv_file() -> UploadFile {
    UploadFile::new(
        "buildings.csv",
        "street_number,street_name,zip_code\n350,5th Avenue,10118\n",
    )
}

/// Waits (in virtual or real time) until `done` holds for the controller view.
pub async fn wait_for<F>(controller: &ScanController, done: F) -> ControllerView
where
    F: Fn(&ControllerView) -> bool,
{
    for _ in 0..200 {
        let view = controller.snapshot();
        if done(&view) {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not reached, last view: {:?}", controller.snapshot());
}
