//! # Client Configuration
//!
//! Settings shared by every call: the gateway endpoint, stream bounds, pacing and the metadata
//! attached to each kind of call. Stored as JSON; any missing field falls back to its default.
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// Errors that can occur when loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the gateway, shared by every transport instance.
    pub endpoint: String,
    /// Optional per-request timeout.
    pub timeout_ms: Option<u64>,
    /// Upper bound on the number of messages requested from a stream.
    pub max_stream_messages: u32,
    /// Interval the gateway is asked to leave between streamed messages.
    pub message_interval_ms: u32,
    /// Delay before a unary success is reported.
    pub response_delay_ms: u64,
    pub unary_headers: Vec<(String, String)>,
    pub streaming_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7070".to_string(),
            timeout_ms: None,
            max_stream_messages: 10,
            message_interval_ms: 500,
            response_delay_ms: 500,
            unary_headers: vec![("custom-header-1".to_string(), "value1".to_string())],
            streaming_headers: vec![("custom-header-1".to_string(), "value2".to_string())],
        }
    }
}

impl ClientConfig {
    /// Reads a configuration file. Fields absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Same as [`ClientConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }
}
