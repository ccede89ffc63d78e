// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors that reject a scan before any probe is launched.
///
/// Probe-level failures are never reported through this type; they end up
/// as fields inside the individual findings of a `ScanReport`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Target URL is empty")]
    EmptyUrl,

    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("Target URL '{0}' has no host")]
    MissingHost(String),
}

/// Errors raised while loading a `ScannerConfig` from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
