//! HTTP client for the scan service.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::endpoints::Endpoints;
use super::error::{Result, TransportError};
use crate::config::ClientConfig;
use crate::model::{
    HealthReport, JobListEnvelope, JobListing, JobReceipt, JobSnapshot, RateLimitStatus,
    ResultRecord, ResultsEnvelope, UploadFile,
};

/// Maximum length of an error body kept in logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Multipart field the service reads the upload from.
const UPLOAD_FIELD: &str = "file";

/// The three remote operations the lifecycle controller depends on.
///
/// Each call is a single round trip. Implementations must not retry;
/// the poll loop already retries on its next tick.
#[async_trait]
pub trait ScanApi: Send + Sync {
    /// Uploads the file and returns the accepted job.
    async fn submit_job(&self, file: &UploadFile) -> Result<JobReceipt>;

    /// Fetches the current status of a job.
    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot>;

    /// Fetches the full result collection of a completed job.
    async fn fetch_results(&self, job_id: &str) -> Result<Vec<ResultRecord>>;
}

fn truncate_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}

/// Pulls a human-readable message out of a JSON error body.
///
/// The service reports failures as `{"detail": "..."}`; a `message` field
/// is accepted as well. Anything else yields `None`.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|field| field.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// reqwest-backed implementation of [`ScanApi`].
#[derive(Debug, Clone)]
pub struct HttpScanClient {
    client: Client,
    endpoints: Endpoints,
}

impl HttpScanClient {
    /// Creates a client with the configured base URL and timeouts.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            endpoints: Endpoints::new(&config.api_base),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Queries service health and which upstream keys are configured.
    pub async fn health(&self) -> Result<HealthReport> {
        self.get_json(&self.endpoints.health()).await
    }

    /// Queries the building quota for this client.
    pub async fn rate_limit(&self) -> Result<RateLimitStatus> {
        self.get_json(&self.endpoints.rate_limit()).await
    }

    /// Lists every job the service still holds in memory.
    pub async fn list_jobs(&self) -> Result<Vec<JobListing>> {
        let envelope: JobListEnvelope = self.get_json(&self.endpoints.jobs()).await?;
        Ok(envelope.jobs)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        decode(url, check_status(url, response).await?).await
    }
}

fn request_error(url: &str, err: reqwest::Error) -> TransportError {
    TransportError::Request {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

/// Turns a non-success response into `TransportError::Server`.
async fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(
        "Request to {} failed ({}): {}",
        url,
        status,
        truncate_body(&body)
    );

    Err(TransportError::Server {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    response.json::<T>().await.map_err(|e| TransportError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl ScanApi for HttpScanClient {
    async fn submit_job(&self, file: &UploadFile) -> Result<JobReceipt> {
        let url = self.endpoints.upload();
        info!("Uploading {} ({} bytes)", file.file_name(), file.size());

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str(&file.mime_type())
            .map_err(|e| request_error(&url, e))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let receipt: JobReceipt = decode(&url, check_status(&url, response).await?).await?;
        info!(
            "Job {} accepted with {} addresses",
            receipt.job_id, receipt.total_count
        );
        Ok(receipt)
    }

    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot> {
        self.get_json(&self.endpoints.status(job_id)).await
    }

    async fn fetch_results(&self, job_id: &str) -> Result<Vec<ResultRecord>> {
        let envelope: ResultsEnvelope = self.get_json(&self.endpoints.results_json(job_id)).await?;
        debug!("Fetched {} results for job {}", envelope.results.len(), job_id);
        Ok(envelope.results)
    }
}
