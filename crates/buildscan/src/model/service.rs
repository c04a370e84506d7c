//! Informational endpoints of the scan service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::job::JobStatus;

/// Response of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Which upstream API keys the service has configured.
    #[serde(default)]
    pub keys_configured: BTreeMap<String, bool>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Per-client quota of buildings per window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub buildings_used: u32,
    pub buildings_remaining: u32,
    pub limit: u32,
    pub reset_in_seconds: u64,
}

/// One entry of the job listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobListing {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub processed: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobListEnvelope {
    #[serde(default)]
    pub jobs: Vec<JobListing>,
}
