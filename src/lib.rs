//! # rs-siteconfig
//!
//! Site rule resolution for a content extraction pipeline.
//!
//! Before readability runs on a fetched page, this crate decides which
//! site-specific rule applies to the page URL, runs that rule in an isolated
//! context, and hands the resulting selector configuration and document
//! state to the cleaning stage.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_siteconfig::{PatternRule, Registry, Resolver};
//!
//! let mut registry = Registry::new();
//! registry.register(PatternRule::new("example", r"^https://example\.com/", |ctx| {
//!     ctx.config_mut().set_title_selectors(["h1.headline"]);
//!     ctx.message_mut().set_site("Example");
//!     Ok(())
//! })?)?;
//!
//! let resolution = Resolver::new(registry).resolve("https://example.com/a")?;
//! assert_eq!(resolution.config.title_selectors(), ["h1.headline"]);
//! assert_eq!(resolution.message.site(), "Example");
//! # Ok::<(), rs_siteconfig::Error>(())
//! ```
//!
//! ## Features
//!
//! - **First match wins**: rules are tried in registration order
//! - **Isolation**: rule errors and panics become warnings, never crashes
//! - **Override protocol**: a rule can apply the configuration of another
//!   URL (archive mirrors, syndication copies) with bounded recursion
//! - **Capabilities**: HTTP, URL parsing, DOM access, logging and entity
//!   decoding are handed to rules explicitly

mod config;
mod context;
mod error;
mod extraction;
mod identity;
mod message;
mod options;
mod registry;
mod resolver;
mod rule;
mod sandbox;

/// HTTP client, logger and text helpers injected into rule executions.
pub mod capabilities;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Built-in site rules.
pub mod rules;

/// URL utilities for parsing, query access and comparison.
pub mod url_utils;

// Public API - re-exports
pub use capabilities::{Capabilities, RuleLogger};
pub use config::Config;
pub use context::RuleContext;
pub use error::{Error, Result};
pub use extraction::Extraction;
pub use identity::Identity;
pub use message::{DocumentType, Message};
pub use options::Options;
pub use registry::Registry;
pub use resolver::{Outcome, Resolution, Resolver};
pub use rule::{PatternRule, Rule, RuleId};
pub use sandbox::Sandbox;

/// Resolves `url` against the built-in rules with default options.
///
/// # Example
///
/// ```rust
/// let resolution = rs_siteconfig::resolve("https://github.com/rust-lang/rust")?;
/// assert_eq!(resolution.rule.as_ref().map(|id| id.as_str()), Some("github_readme"));
/// # Ok::<(), rs_siteconfig::Error>(())
/// ```
///
/// # Errors
///
/// `Error::InvalidUrl` when `url` has no usable host, `Error::OverrideCycle`
/// when a rule's overrides exceed the configured depth.
pub fn resolve(url: &str) -> Result<Resolution> {
    Resolver::new(rules::builtin()?).resolve(url)
}
