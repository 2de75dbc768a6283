//! Error types for rs-siteconfig.
//!
//! One enum covers the whole resolution pipeline. Only
//! [`Error::OverrideCycle`] is fatal to a document's resolution; every other
//! failure raised by a rule is downgraded to a warning by the sandbox.

use std::time::Duration;

/// Error type for rule resolution and the capabilities rules call into.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document URL could not be turned into an identity.
    #[error("Invalid document URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A document type other than `article`, `photo` or `video`.
    #[error("Invalid document type {0:?}: expected article, photo or video")]
    InvalidDocumentType(String),

    /// A rule pattern failed to compile.
    #[error("Invalid rule pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Two rules were registered under the same id.
    #[error("Rule {0:?} is already registered")]
    DuplicateRule(String),

    /// A rule failed (or panicked) inside `is_active`.
    #[error("Rule {rule:?} failed while matching: {reason}")]
    Match { rule: String, reason: String },

    /// A rule failed (or panicked) inside `set_config`.
    #[error("Rule {rule:?} failed while configuring: {reason}")]
    ConfigMutation { rule: String, reason: String },

    /// The override protocol went deeper than `Options::max_override_depth`.
    #[error("Override from rule {rule:?} to {source_url:?} exceeded the maximum depth of {max_depth}")]
    OverrideCycle {
        rule: String,
        source_url: String,
        max_depth: usize,
    },

    /// The HTTP transport failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// `Response::raise_for_status` on a 4xx/5xx response.
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// URL parsing failed inside a rule.
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),

    /// JSON decoding failed.
    #[error("JSON decoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// XML decoding failed.
    #[error("XML decoding failed: {0}")]
    Xml(String),

    /// The rule ran out of its time budget.
    #[error("Rule time budget of {0:?} exceeded")]
    Timeout(Duration),

    /// Free-form failure raised by a rule body.
    #[error("{0}")]
    Rule(String),
}

impl Error {
    /// Builds a free-form rule failure.
    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule(message.into())
    }

    /// Whether this error aborts the whole document resolution.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::OverrideCycle { .. })
    }
}

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, Error>;
