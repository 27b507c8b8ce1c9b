use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use digger_core::Source;
use digger_engine::EngineSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILENAME: &str = "digger.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiggerConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_result_bytes: u64,
    pub default_source: Source,
    /// Log file; logs go to the terminal only when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for DiggerConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            base_url: engine.base_url,
            poll_interval_ms: duration_millis(engine.poll_interval),
            connect_timeout_secs: engine.connect_timeout.as_secs(),
            request_timeout_secs: engine.request_timeout.as_secs(),
            max_result_bytes: engine.max_response_bytes,
            default_source: Source::default(),
            log_file: None,
        }
    }
}

impl DiggerConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            base_url: self.base_url.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_response_bytes: self.max_result_bytes,
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Loads the config at `path`. A missing file yields the defaults unless
/// `required` is set; a file that exists but does not parse is always an error.
pub fn load_config(path: &Path, required: bool) -> Result<DiggerConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(DiggerConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_optional_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join(DEFAULT_CONFIG_FILENAME), false).unwrap();
        assert_eq!(config, DiggerConfig::default());
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.default_source, Source::MixesDb);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.ron"), true).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(base_url: "http://digger.local:5000", poll_interval_ms: 500, default_source: discogs)"#,
        )
        .unwrap();

        let config = load_config(&path, true).unwrap();
        assert_eq!(config.base_url, "http://digger.local:5000");
        assert_eq!(config.default_source, Source::Discogs);
        assert_eq!(config.request_timeout_secs, 30);

        let settings = config.engine_settings();
        assert_eq!(settings.poll_interval, Duration::from_millis(500));
        assert_eq!(settings.max_response_bytes, DiggerConfig::default().max_result_bytes);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "(base_url: ").unwrap();

        let err = load_config(&path, false).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn zero_interval_is_raised_to_one_millisecond() {
        let config = DiggerConfig {
            poll_interval_ms: 0,
            ..DiggerConfig::default()
        };
        assert_eq!(config.engine_settings().poll_interval, Duration::from_millis(1));
    }
}
