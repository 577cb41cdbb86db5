//! App configuration, read from `.docchat.ron` in the working directory.

use std::fs;
use std::path::Path;
use std::time::Duration;

use client_logging::client_warn;
use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = ".docchat.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct PersistedConfig {
    backend_url: String,
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
    poll_interval_ms: u64,
    max_poll_ticks: Option<u32>,
}

impl Default for PersistedConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
            poll_interval_ms: 1000,
            max_poll_ticks: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub max_poll_ticks: Option<u32>,
}

impl From<PersistedConfig> for AppConfig {
    fn from(persisted: PersistedConfig) -> Self {
        Self {
            backend_url: persisted.backend_url,
            connect_timeout: Duration::from_secs(persisted.connect_timeout_secs),
            request_timeout: Duration::from_secs(persisted.request_timeout_secs),
            poll_interval: Duration::from_millis(persisted.poll_interval_ms),
            max_poll_ticks: persisted.max_poll_ticks,
        }
    }
}

/// Load the config, falling back to defaults when the file is missing or
/// unreadable.
pub(crate) fn load_config(dir: &Path) -> AppConfig {
    let path = dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::from(PersistedConfig::default());
        }
        Err(err) => {
            client_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::from(PersistedConfig::default());
        }
    };

    match ron::from_str::<PersistedConfig>(&content) {
        Ok(config) => AppConfig::from(config),
        Err(err) => {
            client_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::from(PersistedConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::load_config;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.backend_url, "http://127.0.0.1:8000");
        assert_eq!(config.poll_interval.as_millis(), 1000);
        assert_eq!(config.max_poll_ticks, None);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".docchat.ron"),
            "(backend_url: \"http://10.0.0.5:9000\", max_poll_ticks: Some(30))",
        )
        .unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.backend_url, "http://10.0.0.5:9000");
        assert_eq!(config.max_poll_ticks, Some(30));
        assert_eq!(config.request_timeout.as_secs(), 120);
    }

    #[test]
    fn unparseable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".docchat.ron"), "not ron at all").unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.backend_url, "http://127.0.0.1:8000");
    }
}
