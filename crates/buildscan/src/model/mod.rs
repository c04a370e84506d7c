//! Data exchanged with the scan service.

pub mod job;
pub mod record;
pub mod service;
pub mod upload;

pub use job::{JobReceipt, JobSnapshot, JobStatus};
pub use record::{Category, Confidence, ImageSet, ResultRecord, ResultsEnvelope};
pub(crate) use service::JobListEnvelope;
pub use service::{HealthReport, JobListing, RateLimitStatus};
pub use upload::{UploadFile, ValidationError};
