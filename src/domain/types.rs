//! Core domain types for filter evaluation.

use std::collections::BTreeMap;
use std::fmt;

/// Filter parameters as declared in a chain file.
pub type Params = BTreeMap<String, String>;

/// Verdict produced by a single filter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    /// Whether the URL may proceed past this filter
    pub proceed: bool,

    /// Human-readable explanation
    pub reason: String,
}

impl FilterResult {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            proceed: true,
            reason: reason.into(),
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            proceed: false,
            reason: reason.into(),
        }
    }
}

/// One filter declaration parsed from a chain file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Registry key (case-insensitive)
    pub name: String,

    /// Parameters handed to `Filter::configure`
    pub params: Params,
}

impl FilterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
        }
    }
}

/// How a filter behaves when it lacks the credentials to perform its check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailPolicy {
    /// Skip the check and allow the URL
    #[default]
    Open,
    /// Block the URL
    Closed,
}

impl FailPolicy {
    /// Parse the `ON_MISSING_KEY` parameter value.
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" | "open" => Some(Self::Open),
            "block" | "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for FailPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailPolicy::Open => f.write_str("open"),
            FailPolicy::Closed => f.write_str("closed"),
        }
    }
}

/// Verdict recorded for one filter in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

/// One line of the evaluation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Filter name as declared in the chain
    pub filter: String,
    pub verdict: Verdict,
    pub reason: String,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verdict {
            Verdict::Pass => write!(f, "[{}] PASS", self.filter),
            Verdict::Fail => write!(f, "[{}] FAIL: {}", self.filter, self.reason),
        }
    }
}

/// Sentinel rendered for a chain without filters.
pub const EMPTY_CHAIN_TRACE: &str = "no filters configured";

/// Ordered log of the filters that ran during one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry that blocked the URL, if any.
    pub fn blocking_entry(&self) -> Option<&TraceEntry> {
        self.entries.iter().find(|e| e.verdict == Verdict::Fail)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(EMPTY_CHAIN_TRACE);
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Result of running a URL through a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    pub allowed: bool,
    pub trace: Trace,
}
