//! Shared settings for filters backed by a remote API.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::error::ConfigError;
use crate::domain::{FailPolicy, FilterResult, Params};

pub const API_KEY_PARAM: &str = "API_KEY";
pub const TIMEOUT_PARAM: &str = "TIMEOUT_SECS";
pub const ENDPOINT_PARAM: &str = "ENDPOINT";
pub const ON_MISSING_KEY_PARAM: &str = "ON_MISSING_KEY";

/// Placeholder value that counts as "no key".
const NIL_KEY: &str = "NIL";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 120;

/// Credentials, policy and timeout common to remote filters.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub api_key: Option<String>,
    pub policy: FailPolicy,
    pub timeout: Duration,
}

impl RemoteSettings {
    pub fn from_params(params: &Params) -> Result<Self, ConfigError> {
        let api_key = params
            .get(API_KEY_PARAM)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty() && *k != NIL_KEY)
            .map(str::to_string);

        let policy = match params.get(ON_MISSING_KEY_PARAM) {
            Some(value) => FailPolicy::from_param(value).ok_or_else(|| {
                ConfigError::new(format!(
                    "{} must be 'allow' or 'block', got '{}'",
                    ON_MISSING_KEY_PARAM, value
                ))
            })?,
            None => FailPolicy::default(),
        };

        let timeout_secs = match params.get(TIMEOUT_PARAM) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| (1..=MAX_TIMEOUT_SECS).contains(s))
                .ok_or_else(|| {
                    ConfigError::new(format!(
                        "{} must be between 1 and {}, got '{}'",
                        TIMEOUT_PARAM, MAX_TIMEOUT_SECS, value
                    ))
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            policy,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build the HTTP client, only when there is a key to use it with.
    pub fn client(&self) -> Result<Option<Client>, ConfigError> {
        if self.api_key.is_none() {
            return Ok(None);
        }
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map(Some)
            .map_err(|e| ConfigError::new(format!("failed to build HTTP client: {}", e)))
    }

    /// Verdict used when no API key is configured.
    pub fn missing_key_result(&self, label: &str) -> FilterResult {
        match self.policy {
            FailPolicy::Open => {
                FilterResult::pass(format!("[{}] No API key configured, skipping", label))
            }
            FailPolicy::Closed => {
                FilterResult::block(format!("[{}] No API key configured, blocking", label))
            }
        }
    }
}
