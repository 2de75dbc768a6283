//! Configuration options for rule resolution.
//!
//! The `Options` struct controls how the resolver iterates rules, how deep the
//! override protocol may recurse, and the budgets handed to the capability
//! context.

use std::time::Duration;

/// Configuration options for rule resolution.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rs_siteconfig::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     max_override_depth: 2,
///     rule_time_budget: Duration::from_secs(2),
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// How many additional hops the override protocol may take.
    ///
    /// A rule matched on the document URL runs at depth 0; the rule matched on
    /// the alternate source runs at depth 1. Requests beyond this bound fail
    /// the whole document with `Error::OverrideCycle`.
    ///
    /// Default: `1`
    pub max_override_depth: usize,

    /// Wall-clock budget for a single `set_config` call.
    ///
    /// HTTP calls made after the deadline fail immediately, and a rule that
    /// returns after it is reported as a failed contribution.
    ///
    /// Default: `5s`
    pub rule_time_budget: Duration,

    /// Upper bound for one HTTP call made through the capability context.
    ///
    /// The effective timeout is the smaller of this and the remaining rule
    /// budget.
    ///
    /// Default: `10s`
    pub http_timeout: Duration,

    /// User agent sent with rule HTTP calls unless a rule overrides it
    /// through `http_headers`.
    ///
    /// Default: `"rs-siteconfig/<version>"`
    pub user_agent: String,

    /// Keep evaluating later rules when a rule's `is_active` fails.
    ///
    /// When `false`, a failing predicate ends matching with no rule selected.
    ///
    /// Default: `false`
    pub continue_after_match_error: bool,

    /// Maximum response body size read by the HTTP capability.
    ///
    /// Default: `10 MiB`
    pub max_response_bytes: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_override_depth: 1,
            rule_time_budget: Duration::from_secs(5),
            http_timeout: Duration::from_secs(10),
            user_agent: concat!("rs-siteconfig/", env!("CARGO_PKG_VERSION")).to_string(),
            continue_after_match_error: false,
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}
