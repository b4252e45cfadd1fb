//! Domain layer containing core business logic.
//!
//! This module contains:
//! - Verdict, declaration and trace types
//! - Filter trait, registry, chain and built-in filters
//! - Chain file parser
//! - URL normalization
//! - Logger with rotation

pub mod error;
pub mod filters;
pub mod logger;
mod normalize;
pub mod parser;
mod types;

pub use filters::{FilterChain, FilterRegistry};
pub use normalize::normalize_url;
pub use types::{
    ChainOutcome, FailPolicy, FilterResult, FilterSpec, Params, Trace, TraceEntry, Verdict,
};

// Allow unused for potential future use / library API
#[allow(unused)]
pub use error::{ChainError, ConfigError, ParseError, RunError, UnknownFilterError};
#[allow(unused)]
pub use types::EMPTY_CHAIN_TRACE;
