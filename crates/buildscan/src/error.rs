use std::path::PathBuf;
use thiserror::Error;

use crate::controller::ControllerError;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum BuildscanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Failed to read upload file '{path}': {source}")]
    ReadUpload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid value for environment variable '{name}': {reason}")]
    InvalidEnv { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, BuildscanError>;
