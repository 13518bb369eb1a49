// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Feed Configuration Types
//!
//! Defines the configuration schema for one algorithm feed subscription:
//! - Remote feed URL and local mirror directory
//! - Descriptor file suffix used for catalog discovery
//! - HTTP timeout settings applied to every outbound connection

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration for one (remote feed, local mirror) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// URL of the remotely published feed archive
    pub feed_url: String,

    /// Local directory the feed archive is mirrored into
    pub mirror_dir: PathBuf,

    /// File-name suffix identifying descriptor files (case-sensitive)
    #[serde(default = "default_descriptor_suffix")]
    pub descriptor_suffix: String,

    /// HTTP client settings shared by feed and reference retrieval
    #[serde(default)]
    pub http: HttpConfig,
}

/// Timeouts for outbound HTTP connections
///
/// Every network call in this layer blocks the calling task for its full
/// duration, so both limits are always enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// TCP connect timeout
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Total per-request timeout, including body transfer
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_descriptor_suffix() -> String {
    ".xml".to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl FeedConfig {
    /// Create a config with default suffix and timeouts
    pub fn new(feed_url: impl Into<String>, mirror_dir: impl Into<PathBuf>) -> Self {
        Self {
            feed_url: feed_url.into(),
            mirror_dir: mirror_dir.into(),
            descriptor_suffix: default_descriptor_suffix(),
            http: HttpConfig::default(),
        }
    }

    /// Load a feed configuration from a YAML manifest
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
