//! Relay server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for the relay server.
///
/// Every field is optional in the TOML file; missing ones take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_filter() -> String {
    "info,strictly_relay=debug".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_filter: default_log_filter(),
        }
    }
}

impl RelayConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|err| ConfigError::unreadable(path, err))?;

        let config: Self =
            toml::from_str(&content).map_err(|err| ConfigError::malformed(path, err))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Replaces fields with any values supplied on the command line.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        log_filter: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(log_filter) = log_filter {
            self.log_filter = log_filter;
        }
        self
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A config file that could not be read or parsed.
///
/// Carries the call site that raised it so startup failures point at the
/// loading step.
#[derive(Debug, Clone, Display, Error)]
#[display("Relay config: {message} ({file}:{line})")]
pub struct ConfigError {
    /// What went wrong.
    pub message: String,
    /// Line of the raising call.
    pub line: u32,
    /// File of the raising call.
    pub file: &'static str,
}

impl ConfigError {
    /// Builds an error tagged with the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let caller = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: caller.line(),
            file: caller.file(),
        }
    }

    #[track_caller]
    fn unreadable(path: &Path, err: std::io::Error) -> Self {
        Self::new(format!("Failed to read config file {}: {err}", path.display()))
    }

    #[track_caller]
    fn malformed(path: &Path, err: toml::de::Error) -> Self {
        Self::new(format!("Failed to parse config {}: {err}", path.display()))
    }
}
