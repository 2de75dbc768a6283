//! The explicit context a rule's `set_config` runs against.
//!
//! Instead of ambient globals, a rule receives one `RuleContext` bundling the
//! live configuration, the message, the identity it was matched on, the
//! capability surface and the override protocol.

use std::time::Instant;

use crate::capabilities::{Requests, RuleLogger};
use crate::config::Config;
use crate::dom::Document;
use crate::error::Result;
use crate::identity::Identity;
use crate::message::Message;
use crate::resolver::{Resolver, Trace};
use crate::rule::RuleId;

/// Everything a rule may read or change during `set_config`.
pub struct RuleContext<'a> {
    pub(crate) rule: &'a str,
    pub(crate) identity: &'a Identity,
    pub(crate) config: &'a mut Config,
    pub(crate) message: &'a mut Message,
    pub(crate) document: Option<&'a Document>,
    pub(crate) resolver: &'a Resolver,
    pub(crate) depth: usize,
    pub(crate) deadline: Instant,
    pub(crate) trace: &'a mut Trace,
}

impl<'a> RuleContext<'a> {
    /// Id of the rule being executed.
    #[must_use]
    pub fn rule_id(&self) -> &str {
        self.rule
    }

    /// Identity this rule was matched against.
    ///
    /// During an override this is the alternate source, while
    /// [`RuleContext::message`] still describes the fetched document.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        self.identity
    }

    /// Shorthand for `identity().url()`.
    #[must_use]
    pub fn url(&self) -> &str {
        self.identity.url()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &*self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut *self.config
    }

    #[must_use]
    pub fn message(&self) -> &Message {
        &*self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut *self.message
    }

    /// Parsed document, when the caller supplied one.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document
    }

    /// 0 for the rule matched on the document URL, 1 for a rule applied
    /// through the override protocol, and so on.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// HTTP client seeded with the current `http_headers`.
    ///
    /// The headers are copied now; edits made to the configuration afterwards
    /// only apply to clients obtained later. The client does not borrow the
    /// context, so a rule can keep it while it edits the configuration.
    #[must_use]
    pub fn requests(&self) -> Requests<'a> {
        let resolver: &'a Resolver = self.resolver;
        resolver.capabilities().http().bind(
            self.config.http_headers(),
            self.deadline,
            resolver.options().rule_time_budget,
        )
    }

    /// Logger tagged with this rule's id.
    #[must_use]
    pub fn log(&self) -> RuleLogger<'_> {
        RuleLogger::new(self.rule)
    }

    /// Configures this document as if it had been fetched from `source`.
    ///
    /// Matches `source` against the registry and applies the matching rule's
    /// `set_config` on top of the current configuration, then returns control
    /// here. Returns the id of the applied rule, or `None` when nothing
    /// matched.
    ///
    /// # Errors
    ///
    /// `Error::InvalidUrl` for an unparsable `source`, and
    /// `Error::OverrideCycle` when the override depth limit is exceeded. A
    /// cycle fails the whole document even if the rule swallows this error.
    pub fn override_config(&mut self, source: &str) -> Result<Option<RuleId>> {
        let resolver = self.resolver;
        resolver.apply_override(self, source)
    }
}

impl std::fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("rule", &self.rule)
            .field("url", &self.identity.url())
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
