//! Error types for the access URL updater
//!
//! Every failure is fatal to the current run; nothing in this crate retries.

use std::fmt;
use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the access URL updater
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed XML, URL or address
    #[error("Parse error: {0}")]
    Parse(String),

    /// One or more required preference keys are missing or malformed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Missing device, setting or attribute
    #[error("Not found: {0}")]
    NotFound(String),

    /// Address preference outside of `first|last|all`
    #[error("Unknown address preference: {0}")]
    UnknownPreference(String),

    /// Capitalization outside of `lower|upper`
    #[error("Unknown IPv6 URL capitalization: {0}")]
    UnknownCapitalization(String),

    /// An operation that needs at least one element got none
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Non-2xx response from a remote service
    #[error("Request to {url} failed with status code {status} ({reason})")]
    Http {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
        /// Request URL (never contains the token)
        url: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure in a remote collaborator
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an unknown address preference error
    pub fn unknown_preference(value: impl Into<String>) -> Self {
        Self::UnknownPreference(value.into())
    }

    /// Create an unknown capitalization error
    pub fn unknown_capitalization(value: impl Into<String>) -> Self {
        Self::UnknownCapitalization(value.into())
    }

    /// Create an empty input error
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, reason: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Http {
            status,
            reason: reason.into(),
            url: url.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Preference key that failed
    pub key: String,
    /// Name of the rule that rejected it (`required`, `uuid4`, `len`, ...)
    pub rule: &'static str,
    /// Human readable detail
    pub detail: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key: '{}' failed on the '{}' rule ({})",
            self.key, self.rule, self.detail
        )
    }
}

/// All validation failures for one preferences mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub(crate) fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Failed rules in rule-table order
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `key` failed any rule
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|e| e.key == key)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
