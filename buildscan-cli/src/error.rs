use buildscan::{BuildscanError, ConfigError, ControllerError, TransportError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Buildscan(#[from] BuildscanError),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Buildscan(e.into())
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Buildscan(e.into())
    }
}

impl From<ControllerError> for CliError {
    fn from(e: ControllerError) -> Self {
        CliError::Buildscan(e.into())
    }
}
