//! Google Safe Browsing (v4 Lookup API) filter.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::remote::{RemoteSettings, API_KEY_PARAM, ENDPOINT_PARAM};
use super::{Filter, FilterRegistry};
use crate::domain::error::{ConfigError, RunError};
use crate::domain::{FailPolicy, FilterResult, Params};

pub const SAFE_BROWSING_FILTER_NAME: &str = "GoogleSafeBrowsing";

const LABEL: &str = "GoogleSafeBrowsing";
const DEFAULT_ENDPOINT: &str = "https://safebrowsing.googleapis.com/v4/threatMatches:find";
const CLIENT_ID: &str = "phishnet";

const THREAT_TYPES: &[&str] = &[
    "MALWARE",
    "SOCIAL_ENGINEERING",
    "UNWANTED_SOFTWARE",
    "POTENTIALLY_HARMFUL_APPLICATION",
];

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    matches: Vec<serde_json::Value>,
}

/// Reputation lookup against Google Safe Browsing.
///
/// The `API_KEY` parameter must be declared. A blank value means the check
/// cannot run and the filter's fail policy decides the verdict.
#[derive(Default)]
pub struct SafeBrowsingFilter {
    settings: Option<RemoteSettings>,
    endpoint: String,
    client: Option<Client>,
}

impl SafeBrowsingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn request_body(url: &str) -> serde_json::Value {
        serde_json::json!({
            "client": {
                "clientId": CLIENT_ID,
                "clientVersion": env!("CARGO_PKG_VERSION"),
            },
            "threatInfo": {
                "threatTypes": THREAT_TYPES,
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{ "url": url }],
            }
        })
    }

    fn verdict(response: LookupResponse) -> FilterResult {
        match response.matches.first() {
            None => FilterResult::pass(format!("[{}] No threats found", LABEL)),
            Some(first) => {
                let threat = first
                    .get("threatType")
                    .and_then(|t| t.as_str())
                    .unwrap_or("UNKNOWN");
                FilterResult::block(format!("[{}] Threat detected: {} ({})", LABEL, threat, first))
            }
        }
    }
}

impl Filter for SafeBrowsingFilter {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigError> {
        if !params.contains_key(API_KEY_PARAM) {
            return Err(ConfigError::new(format!(
                "{} filter requires an {} configuration",
                LABEL, API_KEY_PARAM
            )));
        }
        let settings = RemoteSettings::from_params(params)?;
        self.client = settings.client()?;
        self.endpoint = params
            .get(ENDPOINT_PARAM)
            .cloned()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        self.settings = Some(settings);
        Ok(())
    }

    fn run(&self, url: &str) -> Result<FilterResult, RunError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| RunError::new(format!("{} filter is not configured", LABEL)))?;

        let (Some(key), Some(client)) = (settings.api_key.as_deref(), self.client.as_ref()) else {
            return Ok(settings.missing_key_result(LABEL));
        };

        debug!("Querying Safe Browsing for {}", url);
        let response = client
            .post(&self.endpoint)
            .query(&[("key", key)])
            .json(&Self::request_body(url))
            .send()
            .map_err(|e| RunError::new(format!("google safe browsing request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RunError::new(format!("failed to read GSB response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(RunError::new(format!(
                "gsb API returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: LookupResponse = serde_json::from_str(&body)
            .map_err(|e| RunError::new(format!("failed to parse GSB response: {}", e)))?;
        Ok(Self::verdict(parsed))
    }

    fn fail_policy(&self) -> Option<FailPolicy> {
        self.settings.as_ref().map(|s| s.policy)
    }
}

/// Register the Safe Browsing filter.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(SAFE_BROWSING_FILTER_NAME, || {
        Box::new(SafeBrowsingFilter::new())
    });
}
