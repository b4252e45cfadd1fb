//! Gemini classification filter.
//!
//! Asks a Gemini model whether a URL looks like phishing and maps the
//! YES/NO answer onto a verdict.
//!
//! Parameters:
//! - `API_KEY`: Google API key. Blank or absent means no check is made and
//!   `ON_MISSING_KEY` (default `allow`) decides.
//! - `MODEL`: model name, default `gemini-2.5-flash`.
//! - `TIMEOUT_SECS`, `ENDPOINT`: request tuning.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::remote::{RemoteSettings, ENDPOINT_PARAM};
use super::{Filter, FilterRegistry};
use crate::domain::error::{ConfigError, RunError};
use crate::domain::{FailPolicy, FilterResult, Params};

pub const GEMINI_FILTER_NAME: &str = "GeminiFilter";

const LABEL: &str = "GeminiFilter";
const MODEL_PARAM: &str = "MODEL";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// AI classification of URLs via the Gemini API.
#[derive(Default)]
pub struct GeminiFilter {
    settings: Option<RemoteSettings>,
    model: String,
    endpoint: String,
    client: Option<Client>,
}

impl GeminiFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn prompt(url: &str) -> String {
        format!(
            "You are a security assistant. Answer ONLY 'YES' or 'NO' followed by a short reason (one sentence).\n\
             Is the following URL likely a phishing site?\nURL: {}",
            url
        )
    }

    fn request_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Map a model reply to a verdict. Unclear replies allow.
fn interpret_answer(reply: &str) -> FilterResult {
    let reply = reply.trim();
    let lower = reply.to_lowercase();

    if lower.starts_with('y') {
        FilterResult::block(format!("[{}] Model answered YES: {}", LABEL, reply))
    } else if lower.starts_with('n') {
        FilterResult::pass(format!("[{}] Model answered NO: {}", LABEL, reply))
    } else if lower.contains("yes") {
        FilterResult::block(format!("[{}] Model indicated phishing: {}", LABEL, reply))
    } else if lower.contains("no") {
        FilterResult::pass(format!("[{}] Model indicated not phishing: {}", LABEL, reply))
    } else {
        FilterResult::pass(format!(
            "[{}] Unclear model response, allowing: {}",
            LABEL, reply
        ))
    }
}

impl Filter for GeminiFilter {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigError> {
        let settings = RemoteSettings::from_params(params)?;
        self.client = settings.client()?;
        self.model = params
            .get(MODEL_PARAM)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
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
            .ok_or_else(|| RunError::new(format!("{} is not configured", LABEL)))?;

        let (Some(key), Some(client)) = (settings.api_key.as_deref(), self.client.as_ref()) else {
            return Ok(settings.missing_key_result(LABEL));
        };

        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": Self::prompt(url) }] }]
        });

        debug!("Querying {} for {}", self.model, url);
        let response = client
            .post(self.request_url())
            .query(&[("key", key)])
            .json(&payload)
            .send()
            .map_err(|e| RunError::new(format!("gemini request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RunError::new(format!("failed to read Gemini response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(RunError::new(format!(
                "gemini API returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| RunError::new(format!("failed to parse Gemini response: {}", e)))?;

        match parsed.text().map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => {
                debug!("Gemini reply: {}", text);
                Ok(interpret_answer(text))
            }
            None => Ok(FilterResult::pass(format!(
                "[{}] No response text, allowing",
                LABEL
            ))),
        }
    }

    fn fail_policy(&self) -> Option<FailPolicy> {
        self.settings.as_ref().map(|s| s.policy)
    }
}

/// Register the Gemini filter.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(GEMINI_FILTER_NAME, || Box::new(GeminiFilter::new()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_answer() {
        let yes = interpret_answer("YES. The domain imitates a bank.");
        assert!(!yes.proceed);
        assert!(yes.reason.starts_with("[GeminiFilter] Model answered YES"));

        assert!(interpret_answer("no, it is the official site").proceed);
        assert!(!interpret_answer("I would say yes").proceed);
        assert!(interpret_answer("Probably not: no signs of abuse").proceed);

        let unclear = interpret_answer("Unsure.");
        assert!(unclear.proceed);
        assert!(unclear.reason.contains("Unclear model response"));
    }

    #[test]
    fn test_missing_key_allows_by_default() {
        let mut filter = GeminiFilter::new();
        filter.configure(&Params::new()).unwrap();

        let result = filter.run("https://example.com").unwrap();
        assert!(result.proceed);
        assert_eq!(result.reason, "[GeminiFilter] No API key configured, skipping");
        assert_eq!(filter.fail_policy(), Some(FailPolicy::Open));
    }

    #[test]
    fn test_model_and_endpoint() {
        let mut filter = GeminiFilter::new();
        filter
            .configure(&Params::from([
                (MODEL_PARAM.to_string(), "gemini-pro".to_string()),
                (ENDPOINT_PARAM.to_string(), "http://localhost:9/models/".to_string()),
            ]))
            .unwrap();
        assert_eq!(
            filter.request_url(),
            "http://localhost:9/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_response_text() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"NO - legitimate"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.text(), Some("NO - legitimate"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_unreachable_endpoint_is_run_error() {
        let mut filter = GeminiFilter::new();
        filter
            .configure(&Params::from([
                ("API_KEY".to_string(), "dummy-key".to_string()),
                (ENDPOINT_PARAM.to_string(), "http://127.0.0.1:9".to_string()),
                ("TIMEOUT_SECS".to_string(), "2".to_string()),
            ]))
            .unwrap();

        let err = filter.run("https://example.com").unwrap_err();
        assert!(err.0.contains("gemini request failed"), "{}", err);
    }

    #[test]
    fn test_unconfigured_run_is_error() {
        let filter = GeminiFilter::new();
        assert!(filter.run("https://example.com").is_err());
    }
}
