//! Filter chain implementation.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::{Filter, FilterRegistry};
use crate::domain::error::ChainError;
use crate::domain::{ChainOutcome, FilterSpec, Params, Trace, TraceEntry, Verdict};

/// A configured filter bound to its declaration.
struct ChainEntry {
    name: String,
    params: Params,
    filter: Box<dyn Filter>,
}

/// Ordered chain of configured filters.
///
/// Built once, then evaluated any number of times. Evaluation stops at the
/// first filter that blocks.
pub struct FilterChain {
    registry: Arc<FilterRegistry>,
    entries: Vec<ChainEntry>,
}

impl FilterChain {
    /// Create an empty chain resolving names through `registry`.
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self {
            registry,
            entries: Vec::new(),
        }
    }

    /// Build a chain from parsed declarations, in declaration order.
    pub fn from_specs(
        registry: Arc<FilterRegistry>,
        specs: Vec<FilterSpec>,
    ) -> Result<Self, ChainError> {
        let mut chain = Self::new(registry);
        for spec in specs {
            chain.add(&spec.name, spec.params)?;
        }
        Ok(chain)
    }

    /// Instantiate, configure and append a filter.
    ///
    /// On error the chain is left unchanged.
    pub fn add(&mut self, name: &str, params: Params) -> Result<(), ChainError> {
        let mut filter = self.registry.create(name)?;
        filter
            .configure(&params)
            .map_err(|source| ChainError::Configure {
                filter: name.to_string(),
                source,
            })?;

        match filter.fail_policy() {
            Some(policy) => info!(
                "Filter added: {} ({} params, fail policy: {})",
                name,
                params.len(),
                policy
            ),
            None => info!("Filter added: {} ({} params)", name, params.len()),
        }

        self.entries.push(ChainEntry {
            name: name.to_string(),
            params,
            filter,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared filter names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Run a URL through every filter in order.
    ///
    /// Returns on the first block. A filter error aborts the evaluation and
    /// is returned as an error, never as a blocked outcome.
    pub fn run(&self, url: &str) -> Result<ChainOutcome, ChainError> {
        let mut trace = Trace::new();

        if self.entries.is_empty() {
            debug!("No filters configured, allowing {}", url);
            return Ok(ChainOutcome {
                allowed: true,
                trace,
            });
        }

        for entry in &self.entries {
            let result = entry.filter.run(url).map_err(|source| {
                error!("Filter {} failed on {}: {}", entry.name, url, source);
                ChainError::Run {
                    filter: entry.name.clone(),
                    source,
                }
            })?;

            if result.proceed {
                debug!("[{}] PASS: {}", entry.name, result.reason);
                trace.push(TraceEntry {
                    filter: entry.name.clone(),
                    verdict: Verdict::Pass,
                    reason: result.reason,
                });
            } else {
                warn!("[{}] FAIL: {}", entry.name, result.reason);
                trace.push(TraceEntry {
                    filter: entry.name.clone(),
                    verdict: Verdict::Fail,
                    reason: result.reason,
                });
                return Ok(ChainOutcome {
                    allowed: false,
                    trace,
                });
            }
        }

        Ok(ChainOutcome {
            allowed: true,
            trace,
        })
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (&e.name, &e.params)))
            .finish()
    }
}
