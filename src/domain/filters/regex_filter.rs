//! Regex pattern filter implementation.

use regex::Regex;

use super::{Filter, FilterRegistry};
use crate::domain::error::{ConfigError, RunError};
use crate::domain::{FilterResult, Params};

pub const REGEX_FILTER_NAME: &str = "RegexFilter";

/// Alias kept for existing chain files.
pub const RICKROLL_FILTER_NAME: &str = "RickRoll";

/// Filter that blocks URLs matching any configured pattern.
///
/// Every parameter value is a pattern; keys are only labels.
#[derive(Default)]
pub struct RegexFilter {
    patterns: Vec<Regex>,
}

impl RegexFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the first pattern matching the URL.
    fn first_match(&self, url: &str) -> Option<&Regex> {
        self.patterns.iter().find(|p| p.is_match(url))
    }
}

impl Filter for RegexFilter {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigError> {
        for (key, value) in params {
            let pattern = Regex::new(value).map_err(|e| {
                ConfigError::new(format!("invalid regex pattern '{}' for {}: {}", value, key, e))
            })?;
            self.patterns.push(pattern);
        }
        Ok(())
    }

    fn run(&self, url: &str) -> Result<FilterResult, RunError> {
        match self.first_match(url) {
            Some(pattern) => Ok(FilterResult::block(format!(
                "[Regex] URL: {} matched with pattern: {}",
                url, pattern
            ))),
            None => Ok(FilterResult::pass("[Regex] No regex matches")),
        }
    }
}

/// Register the regex filter under its name and alias.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(REGEX_FILTER_NAME, || Box::new(RegexFilter::new()));
    registry.register(RICKROLL_FILTER_NAME, || Box::new(RegexFilter::new()));
}
