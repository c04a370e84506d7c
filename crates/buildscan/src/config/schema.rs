use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upload ceiling enforced before any network call (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Client configuration for talking to the scan service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service API, e.g. `http://localhost:8000/api`.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Interval between status polls while a job is running.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Assumed processing cost of a single address, used for the ETA.
    #[serde(default = "default_seconds_per_item")]
    pub seconds_per_item: u64,
    /// Capacity of the lifecycle event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_api_base() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_seconds_per_item() -> u64 {
    30
}

fn default_event_capacity() -> usize {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            poll_interval_ms: default_poll_interval_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            seconds_per_item: default_seconds_per_item(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings consumed by the lifecycle controller.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            poll_interval: self.poll_interval(),
            seconds_per_item: self.seconds_per_item,
            event_capacity: self.event_capacity,
            upload: UploadLimits {
                max_bytes: self.max_upload_bytes,
                ..UploadLimits::default()
            },
        }
    }
}

/// Local checks applied to a file before it is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
    /// Required filename suffix, including the dot.
    pub extension: String,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            extension: ".csv".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub poll_interval: Duration,
    pub seconds_per_item: u64,
    pub event_capacity: usize,
    pub upload: UploadLimits,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        ClientConfig::default().controller_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api_base, "http://localhost:8000/api");
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.seconds_per_item, 30);
    }

    #[test]
    fn test_controller_settings_carry_upload_ceiling() {
        let config = ClientConfig {
            max_upload_bytes: 1024,
            poll_interval_ms: 500,
            ..ClientConfig::default()
        };
        let settings = config.controller_settings();
        assert_eq!(settings.upload.max_bytes, 1024);
        assert_eq!(settings.upload.extension, ".csv");
        assert_eq!(settings.poll_interval, Duration::from_millis(500));
    }
}
