use std::path::{Path, PathBuf};

use crate::config::schema::ClientConfig;
use crate::error::ConfigError;

pub const ENV_API_BASE: &str = "BUILDSCAN_API_BASE";
pub const ENV_POLL_INTERVAL_MS: &str = "BUILDSCAN_POLL_INTERVAL_MS";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Default location of the config file: `~/.config/buildscan/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("buildscan").join("config.json"))
}

/// Resolves the configuration used by the application.
///
/// An explicit path must exist. Without one, the default path is used when
/// present, otherwise built-in defaults. Environment overrides are applied
/// last and the result is validated again.
pub fn load_effective_config(explicit: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => {
                log::debug!("Loading config from {}", path.display());
                load_config(&path)?
            }
            _ => ClientConfig::default(),
        },
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut ClientConfig) -> Result<(), ConfigError> {
    if let Ok(value) = std::env::var(ENV_API_BASE) {
        config.api_base = value;
    }

    if let Ok(value) = std::env::var(ENV_POLL_INTERVAL_MS) {
        config.poll_interval_ms = value.parse().map_err(|e| ConfigError::InvalidEnv {
            name: ENV_POLL_INTERVAL_MS.to_string(),
            reason: format!("{}", e),
        })?;
    }

    Ok(())
}

fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    let base = config.api_base.trim();
    if base.is_empty() {
        return Err(ConfigError::Validation {
            message: "api_base must not be empty".to_string(),
        });
    }
    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(ConfigError::Validation {
            message: format!("api_base must be an http(s) URL, got '{}'", base),
        });
    }

    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation {
            message: "poll_interval_ms must be greater than zero".to_string(),
        });
    }

    if config.max_upload_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "max_upload_bytes must be greater than zero".to_string(),
        });
    }

    if config.event_capacity == 0 {
        return Err(ConfigError::Validation {
            message: "event_capacity must be greater than zero".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let config = load_config_from_str(
            r#"{
                "api_base": "https://scanner.example.com/api",
                "poll_interval_ms": 1500,
                "seconds_per_item": 20
            }"#,
        )
        .unwrap();

        assert_eq!(config.api_base, "https://scanner.example.com/api");
        assert_eq!(config.poll_interval_ms, 1500);
        assert_eq!(config.seconds_per_item, 20);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_rejects_non_http_base() {
        let result = load_config_from_str(r#"{"api_base": "ftp://example.com"}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = load_config_from_str(r#"{"poll_interval_ms": 0}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = load_config_from_str("{not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_config(dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_base": "http://file.example/api"}"#).unwrap();

        std::env::set_var(ENV_API_BASE, "http://env.example/api");
        std::env::set_var(ENV_POLL_INTERVAL_MS, "750");
        let config = load_effective_config(Some(&path));
        std::env::remove_var(ENV_API_BASE);
        std::env::remove_var(ENV_POLL_INTERVAL_MS);

        let config = config.unwrap();
        assert_eq!(config.api_base, "http://env.example/api");
        assert_eq!(config.poll_interval_ms, 750);
    }

    #[test]
    #[serial]
    fn test_bad_env_interval() {
        std::env::set_var(ENV_POLL_INTERVAL_MS, "soon");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        let result = load_effective_config(Some(&path));
        std::env::remove_var(ENV_POLL_INTERVAL_MS);

        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }
}
