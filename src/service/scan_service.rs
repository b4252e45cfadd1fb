//! URL scanning service.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{normalize_url, parser, FilterChain, FilterRegistry};

/// Outcome of scanning one URL.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// URL as evaluated (normalized when possible)
    pub url: String,

    /// Whether the URL may be opened
    pub allowed: bool,

    /// Rendered chain trace or the reason the URL was rejected
    pub trace: String,

    /// Filter that blocked the URL, if one did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,
}

impl ScanReport {
    /// Exit code for this report.
    ///
    /// - Allowed: 0
    /// - Blocked: 2
    pub fn exit_code(&self) -> i32 {
        if self.allowed {
            0
        } else {
            2
        }
    }
}

/// Service that owns a fully built filter chain.
#[derive(Debug)]
pub struct ScanService {
    chain: FilterChain,
}

impl ScanService {
    /// Build the chain declared by the configured chain file.
    pub fn from_config(config: &Config, registry: Arc<FilterRegistry>) -> Result<Self> {
        Self::from_chain_file(&config.chain_path, registry)
    }

    /// Parse `path` and build its chain. Any declaration error aborts the build.
    pub fn from_chain_file(path: &Path, registry: Arc<FilterRegistry>) -> Result<Self> {
        let specs = parser::parse_file(path)
            .with_context(|| format!("Failed to parse chain file: {}", path.display()))?;

        let chain = FilterChain::from_specs(registry, specs)
            .with_context(|| format!("Failed to build filter chain from {}", path.display()))?;

        info!(
            "Filter chain built from {}: {} filter(s)",
            path.display(),
            chain.len()
        );
        Ok(Self { chain })
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    /// Normalize and scan a URL.
    ///
    /// An invalid URL is denied rather than treated as an error. Filter
    /// failures propagate as errors.
    pub fn scan(&self, raw: &str) -> Result<ScanReport> {
        let url = match normalize_url(raw) {
            Ok(url) => url,
            Err(e) => {
                debug!("Rejecting invalid URL {:?}: {}", raw, e);
                return Ok(ScanReport {
                    url: raw.to_string(),
                    allowed: false,
                    trace: format!("invalid url: {}", e),
                    blocked_by: None,
                });
            }
        };

        let outcome = self
            .chain
            .run(&url)
            .with_context(|| format!("error running filters on {}", url))?;

        info!(
            "Scanned {}: allowed={} after {} filter(s)",
            url,
            outcome.allowed,
            outcome.trace.len()
        );
        Ok(ScanReport {
            url,
            allowed: outcome.allowed,
            trace: outcome.trace.to_string(),
            blocked_by: outcome.trace.blocking_entry().map(|e| e.filter.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ChainError;
    use std::fs;

    fn service(chain: &str) -> (tempfile::TempDir, Result<ScanService>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.fn");
        fs::write(&path, chain).unwrap();
        let registry = Arc::new(FilterRegistry::with_builtin_filters());
        let service = ScanService::from_chain_file(&path, registry);
        (dir, service)
    }

    #[test]
    fn test_pattern_block() {
        let (_dir, service) = service("RickRoll:[\n pattern = example\\.com\n]\n");
        let report = service.unwrap().scan("http://example.com").unwrap();
        assert!(!report.allowed);
        assert_eq!(report.exit_code(), 2);
        assert_eq!(report.trace.lines().count(), 1);
        assert!(report.trace.starts_with("[RickRoll] FAIL: "));
        assert_eq!(report.blocked_by.as_deref(), Some("RickRoll"));
    }

    #[test]
    fn test_empty_block_list_passes() {
        let (_dir, service) = service("Block:[]\n");
        let report = service.unwrap().scan("anything.example/page/").unwrap();
        assert!(report.allowed);
        assert_eq!(report.url, "https://anything.example/page");
        assert_eq!(report.trace, "[Block] PASS");
    }

    #[test]
    fn test_block_list_then_pattern() {
        let chain = "\
Block:[
    known = phish.test
]
RegexFilter:[
    login = /login
]
";
        let (_dir, service) = service(chain);
        let service = service.unwrap();

        let report = service.scan("shop.test/login").unwrap();
        let lines: Vec<_> = report.trace.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[Block] PASS");
        assert_eq!(
            lines[1],
            "[RegexFilter] FAIL: [Regex] URL: https://shop.test/login matched with pattern: /login"
        );

        let listed = service.scan("https://phish.test/").unwrap();
        assert!(!listed.allowed);
        assert_eq!(
            listed.trace,
            "[Block] FAIL: [Block] URL blocked: https://phish.test"
        );
    }

    #[test]
    fn test_unknown_filter_aborts_build() {
        let (_dir, service) = service("Block:[]\nUnknown:[]\n");
        let err = service.unwrap_err();
        assert!(format!("{:#}", err).contains("unknown filter: Unknown"));
    }

    #[test]
    fn test_build_error_names_failing_filter() {
        let (_dir, service) = service("Block:[]\nRegexFilter:[\n broken = [a-\n]\n");
        let err = service.unwrap_err();
        let chain_err = err
            .downcast_ref::<ChainError>()
            .expect("chain build error should be preserved");
        assert!(matches!(
            chain_err,
            ChainError::Configure { filter, .. } if filter == "RegexFilter"
        ));
        assert!(format!("{:#}", err).contains("Failed to build filter chain"));
    }

    #[test]
    fn test_unterminated_chain_file() {
        let (_dir, service) = service("Block:[]\nRegexFilter:[\n a = b\n");
        let err = service.unwrap_err();
        assert!(format!("{:#}", err).contains("unterminated filter block for \"RegexFilter\""));
    }

    #[test]
    fn test_invalid_url_is_denied() {
        let (_dir, service) = service("");
        let report = service.unwrap().scan("   ").unwrap();
        assert!(!report.allowed);
        assert_eq!(report.trace, "invalid url: empty url");
    }

    #[test]
    fn test_empty_chain_file() {
        let (_dir, service) = service("// nothing configured\n");
        let report = service.unwrap().scan("example.com").unwrap();
        assert!(report.allowed);
        assert_eq!(report.trace, "no filters configured");
    }
}
