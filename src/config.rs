// src/config.rs

use crate::error::ConfigError;
use crate::logging::project_directory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_USER_AGENT: &str = "SiteWatch-Monitor/1.0";
pub const DEFAULT_SECURITY_USER_AGENT: &str = "SiteWatch-Security-Monitor/1.0";
const CONFIG_FILE: &str = "config.toml";

/// Per-probe budgets and identification used by every scan.
///
/// Every field has a default, so a config file only needs to list the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// TCP connect and TLS handshake budget for the certificate probe.
    pub tls_timeout_secs: u64,
    /// Total budget for the availability GET, redirects and body included.
    pub availability_timeout_secs: u64,
    pub headers_timeout_secs: u64,
    pub content_timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
    /// User agent sent by the content breach probe.
    pub security_user_agent: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            tls_timeout_secs: 10,
            availability_timeout_secs: 30,
            headers_timeout_secs: 10,
            content_timeout_secs: 10,
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            security_user_agent: DEFAULT_SECURITY_USER_AGENT.to_string(),
        }
    }
}

impl ScannerConfig {
    /// Reads a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded scanner configuration.");
        Ok(config)
    }

    /// Loads `config.toml` from the user config directory, or the defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                info!("No config file found, using default scanner configuration.");
                Ok(Self::default())
            }
        }
    }

    /// Applies one timeout to every network probe, e.g. from a command-line override.
    pub fn with_uniform_timeout(mut self, secs: u64) -> Self {
        self.tls_timeout_secs = secs;
        self.availability_timeout_secs = secs;
        self.headers_timeout_secs = secs;
        self.content_timeout_secs = secs;
        self
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_timeout_secs)
    }

    pub fn availability_timeout(&self) -> Duration {
        Duration::from_secs(self.availability_timeout_secs)
    }

    pub fn headers_timeout(&self) -> Duration {
        Duration::from_secs(self.headers_timeout_secs)
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    project_directory().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tls_timeout_secs = 3\nuser_agent = \"probe/2.0\"").unwrap();

        let config = ScannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tls_timeout(), Duration::from_secs(3));
        assert_eq!(config.user_agent, "probe/2.0");
        assert_eq!(config.availability_timeout_secs, 30);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tls_timeout_secs = \"ten\"").unwrap();

        let err = ScannerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScannerConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn uniform_timeout_overrides_every_probe() {
        let config = ScannerConfig::default().with_uniform_timeout(2);
        assert_eq!(config.tls_timeout(), Duration::from_secs(2));
        assert_eq!(config.availability_timeout(), Duration::from_secs(2));
        assert_eq!(config.headers_timeout(), Duration::from_secs(2));
        assert_eq!(config.content_timeout(), Duration::from_secs(2));
    }
}
