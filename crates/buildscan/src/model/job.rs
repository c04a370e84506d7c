//! Job status as reported by the scan service.

use serde::{Deserialize, Serialize};

/// Remote status of a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a remote job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSnapshot {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(rename = "total_addresses", default)]
    pub total_count: u32,
    #[serde(rename = "processed_addresses", default)]
    pub processed_count: u32,
    /// Address currently being analyzed.
    #[serde(rename = "current_address", default)]
    pub current_item: Option<String>,
    /// Failure message; only meaningful when `status` is `Failed`.
    #[serde(default)]
    pub error: Option<String>,
}

impl JobSnapshot {
    /// Initial snapshot for a freshly accepted job.
    pub fn pending(job_id: &str, total_count: u32) -> Self {
        Self {
            job_id: job_id.to_string(),
            status: JobStatus::Pending,
            total_count,
            processed_count: 0,
            current_item: None,
            error: None,
        }
    }

    /// Items not yet processed.
    pub fn remaining(&self) -> u32 {
        self.total_count.saturating_sub(self.processed_count)
    }
}

/// Response of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobReceipt {
    pub job_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "total_addresses", default)]
    pub total_count: u32,
}
