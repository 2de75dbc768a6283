//! Capability context injected into every rule execution.
//!
//! The surface is fixed: an HTTP client, URL parsing (see
//! [`crate::url_utils`]), a logger, and text decoding helpers. Everything
//! here is stateless or immutable, so one `Capabilities` value is shared by
//! all resolutions of a [`crate::Resolver`].

use std::fmt;
use std::sync::Arc;

use crate::options::Options;

pub mod http;
pub mod text;

pub use http::{Headers, HttpClient, Requests, Response, Transport};

/// Shared, immutable capabilities.
#[derive(Debug, Clone)]
pub struct Capabilities {
    http: HttpClient,
}

impl Capabilities {
    /// Builds the default capabilities for `options`.
    ///
    /// With the `http` feature the client uses `ureq`; without it every HTTP
    /// call fails with `Error::Http`.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self::with_transport(default_transport(options), options)
    }

    /// Builds capabilities around a custom transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, options: &Options) -> Self {
        Self {
            http: HttpClient::new(transport, options.http_timeout),
        }
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[cfg(feature = "http")]
fn default_transport(options: &Options) -> Arc<dyn Transport> {
    Arc::new(http::UreqTransport::new(
        &options.user_agent,
        options.max_response_bytes,
    ))
}

#[cfg(not(feature = "http"))]
fn default_transport(_options: &Options) -> Arc<dyn Transport> {
    Arc::new(http::DisabledTransport)
}

/// Logger handed to a rule. Every event carries the rule id.
#[derive(Debug, Clone, Copy)]
pub struct RuleLogger<'a> {
    rule: &'a str,
}

impl<'a> RuleLogger<'a> {
    #[must_use]
    pub fn new(rule: &'a str) -> Self {
        Self { rule }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        tracing::debug!(rule = self.rule, "{message}");
    }

    pub fn info(&self, message: impl fmt::Display) {
        tracing::info!(rule = self.rule, "{message}");
    }

    /// Same level as `info`.
    pub fn log(&self, message: impl fmt::Display) {
        self.info(message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        tracing::warn!(rule = self.rule, "{message}");
    }

    pub fn error(&self, message: impl fmt::Display) {
        tracing::error!(rule = self.rule, "{message}");
    }
}
