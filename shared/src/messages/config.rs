//! Configuration types
//!
//! Both binaries start from `Default`, apply `PROFILE_FORGE_*` environment
//! overrides (a `.env` file is loaded by the binary first), then command line
//! flags, and finally call `validate()`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{SharedError, SharedResult};
use crate::validation::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES};

/// Submission store service configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    /// Front-end origin allowed by CORS
    pub allowed_origin: String,
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: u64,
    /// Simulated evaluation delay range
    pub min_evaluation_delay_ms: u64,
    pub max_evaluation_delay_ms: u64,
    /// Probability that a simulated evaluation completes successfully
    pub success_rate: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            uploads_dir: PathBuf::from("uploads"),
            allowed_origin: "http://localhost:9002".to_string(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            min_evaluation_delay_ms: 3000,
            max_evaluation_delay_ms: 6000,
            success_rate: 0.7,
        }
    }
}

impl StoreConfig {
    /// Apply overrides from a variable lookup (normally `std::env::var`)
    pub fn with_overrides<F>(mut self, lookup: F) -> SharedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PROFILE_FORGE_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PROFILE_FORGE_PORT") {
            self.port = parse_var("PROFILE_FORGE_PORT", &port)?;
        }
        if let Some(dir) = lookup("PROFILE_FORGE_UPLOADS_DIR") {
            self.uploads_dir = PathBuf::from(dir);
        }
        if let Some(origin) = lookup("PROFILE_FORGE_ALLOWED_ORIGIN") {
            self.allowed_origin = origin;
        }
        if let Some(bytes) = lookup("PROFILE_FORGE_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_var("PROFILE_FORGE_MAX_UPLOAD_BYTES", &bytes)?;
        }
        if let Some(rate) = lookup("PROFILE_FORGE_SUCCESS_RATE") {
            self.success_rate = parse_var("PROFILE_FORGE_SUCCESS_RATE", &rate)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> SharedResult<()> {
        if self.min_evaluation_delay_ms > self.max_evaluation_delay_ms {
            return Err(SharedError::invalid_config(
                "min_evaluation_delay_ms",
                format!("{} > {}", self.min_evaluation_delay_ms, self.max_evaluation_delay_ms),
            ));
        }
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(SharedError::invalid_config("success_rate", self.success_rate));
        }
        validate_upload_rules(&self.allowed_extensions, self.max_upload_bytes)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Polling schedule used while a submission is still being evaluated
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PollPolicy {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub backoff_factor: f64,
    /// Retry horizon: refreshes issued before giving up
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval_ms: 1000,
            max_interval_ms: 10_000,
            backoff_factor: 2.0,
            max_attempts: 30,
        }
    }
}

impl PollPolicy {
    /// Wait before refresh number `attempt` (0-based) is retried
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.initial_interval_ms as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = scaled.min(self.max_interval_ms as f64);
        Duration::from_millis(capped as u64)
    }

    pub fn validate(&self) -> SharedResult<()> {
        if self.max_attempts == 0 {
            return Err(SharedError::invalid_config("max_attempts", 0));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(SharedError::invalid_config("backoff_factor", self.backoff_factor));
        }
        if self.initial_interval_ms > self.max_interval_ms {
            return Err(SharedError::invalid_config(
                "initial_interval_ms",
                format!("{} > {}", self.initial_interval_ms, self.max_interval_ms),
            ));
        }
        Ok(())
    }
}

/// Lifecycle client configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub cache_dir: PathBuf,
    pub request_timeout_ms: u64,
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: u64,
    pub poll: PollPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            cache_dir: PathBuf::from(".profile-forge/cache"),
            request_timeout_ms: 30_000,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            poll: PollPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Apply overrides from a variable lookup (normally `std::env::var`)
    pub fn with_overrides<F>(mut self, lookup: F) -> SharedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PROFILE_FORGE_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup("PROFILE_FORGE_CACHE_DIR") {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(timeout) = lookup("PROFILE_FORGE_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_var("PROFILE_FORGE_REQUEST_TIMEOUT_MS", &timeout)?;
        }
        if let Some(bytes) = lookup("PROFILE_FORGE_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_var("PROFILE_FORGE_MAX_UPLOAD_BYTES", &bytes)?;
        }
        if let Some(attempts) = lookup("PROFILE_FORGE_POLL_MAX_ATTEMPTS") {
            self.poll.max_attempts = parse_var("PROFILE_FORGE_POLL_MAX_ATTEMPTS", &attempts)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> SharedResult<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(SharedError::invalid_config("api_base_url", &self.api_base_url));
        }
        if self.request_timeout_ms == 0 {
            return Err(SharedError::invalid_config("request_timeout_ms", 0));
        }
        self.poll.validate()?;
        validate_upload_rules(&self.allowed_extensions, self.max_upload_bytes)
    }
}

fn validate_upload_rules(extensions: &[String], max_upload_bytes: u64) -> SharedResult<()> {
    if extensions.is_empty() {
        return Err(SharedError::invalid_config("allowed_extensions", "[]"));
    }
    if let Some(bad) = extensions.iter().find(|ext| !ext.starts_with('.') || ext.len() < 2) {
        return Err(SharedError::invalid_config("allowed_extensions", bad));
    }
    if max_upload_bytes == 0 {
        return Err(SharedError::invalid_config("max_upload_bytes", 0));
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> SharedResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| SharedError::invalid_config(name, raw))
}
