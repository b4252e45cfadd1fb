//! Error types for phishnet.

use std::path::PathBuf;

use thiserror::Error;

/// A filter name that no factory is registered for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter: {0}")]
pub struct UnknownFilterError(pub String);

/// A filter rejected its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A filter could not reach a verdict.
///
/// This is an infrastructure fault, never a "blocked" verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RunError(pub String);

impl RunError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Malformed chain file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A block opener with an empty filter name
    #[error("invalid filter declaration on line {line}: {text:?}")]
    InvalidDeclaration { line: usize, text: String },

    /// End of input reached inside an open block
    #[error("unterminated filter block for {name:?}")]
    UnterminatedBlock { name: String },

    /// Failure reading the chain file from disk
    #[error("failed to read chain file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reading from an arbitrary stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building or running a filter chain.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error(transparent)]
    UnknownFilter(#[from] UnknownFilterError),

    #[error("filter {filter} rejected its configuration: {source}")]
    Configure {
        filter: String,
        #[source]
        source: ConfigError,
    },

    #[error("filter {filter} error: {source}")]
    Run {
        filter: String,
        #[source]
        source: RunError,
    },
}

/// URL normalization failure.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("empty url")]
    Empty,

    #[error("missing host in URL")]
    MissingHost,

    #[error(transparent)]
    Parse(#[from] url::ParseError),
}
