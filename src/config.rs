//! Worker Configuration
//!
//! Defines how the worker reaches the backend and how it paces itself:
//! - Backend base URL
//! - Identity (generated from a prefix, or fixed)
//! - Poll interval and simulated-work duration
//! - Optional per-request timeout
//!
//! Every field has a default, so an empty (or missing) TOML file is valid.

use crate::identity::{WorkerIdentity, DEFAULT_WORKER_PREFIX};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Backend used when nothing else is configured
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";

/// Pause between poll cycles
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Simulated work per claimed job
pub const DEFAULT_WORK_DURATION_SECS: u64 = 5;

/// Complete worker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Base URL of the job backend
    pub backend_url: String,
    /// Prefix of the generated worker name
    pub worker_prefix: String,
    /// Fixed worker name; overrides `worker_prefix` when set
    pub worker_name: Option<String>,
    /// Seconds to sleep between poll cycles
    pub poll_interval_secs: u64,
    /// Seconds of simulated work per claimed job
    pub work_duration_secs: u64,
    /// Per-request timeout; `None` keeps the HTTP client default
    pub request_timeout_secs: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            worker_prefix: DEFAULT_WORKER_PREFIX.to_string(),
            worker_name: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            work_duration_secs: DEFAULT_WORK_DURATION_SECS,
            request_timeout_secs: None,
        }
    }
}

impl WorkerConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: WorkerConfig = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Trim the trailing slash so paths can be appended directly
    pub fn normalize(&mut self) {
        self.backend_url = self.backend_url.trim_end_matches('/').to_string();
    }

    /// Identity for this process: the fixed name if configured, else a fresh one
    pub fn identity(&self) -> WorkerIdentity {
        match &self.worker_name {
            Some(name) if !name.trim().is_empty() => WorkerIdentity::from_name(name.trim()),
            _ => WorkerIdentity::generate(&self.worker_prefix),
        }
    }

    pub fn schedule(&self) -> SchedulePolicy {
        SchedulePolicy {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            work_duration: Duration::from_secs(self.work_duration_secs),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Timing of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// Sleep after every cycle
    pub poll_interval: Duration,
    /// Pause standing in for real computation
    pub work_duration: Duration,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        WorkerConfig::default().schedule()
    }
}
