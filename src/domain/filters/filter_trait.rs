//! Filter trait definition.

use crate::domain::error::{ConfigError, RunError};
use crate::domain::{FailPolicy, FilterResult, Params};

/// Trait for URL safety filters.
///
/// A filter is configured exactly once before it is run. After
/// configuration its state is read-only, so one instance can serve
/// concurrent evaluations.
pub trait Filter: Send + Sync {
    /// Apply the parameters declared for this filter.
    fn configure(&mut self, params: &Params) -> Result<(), ConfigError>;

    /// Evaluate a URL.
    ///
    /// A `RunError` means no verdict could be reached and must never be
    /// reported as a block.
    fn run(&self, url: &str) -> Result<FilterResult, RunError>;

    /// Behavior when credentials are missing, for filters that need them.
    fn fail_policy(&self) -> Option<FailPolicy> {
        None
    }
}
