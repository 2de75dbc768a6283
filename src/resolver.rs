//! Rule resolution: first-match selection and the override protocol.
//!
//! For a document URL the resolver walks the registry in order, runs the
//! first active rule in the sandbox, and returns the resulting configuration.
//! A rule may call [`RuleContext::override_config`] to have the rule matching
//! an alternate source (an archive mirror's original URL, say) applied on top
//! of the live configuration. Overrides recurse through `apply_override`
//! with an explicit depth counter.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::capabilities::{Capabilities, Transport};
use crate::config::Config;
use crate::context::RuleContext;
use crate::error::{Error, Result};
use crate::extraction::Extraction;
use crate::identity::Identity;
use crate::message::Message;
use crate::options::Options;
use crate::registry::Registry;
use crate::rule::{Rule, RuleId};
use crate::sandbox::Sandbox;

/// Outcome of resolving one document.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Rule matched on the document URL.
    pub rule: Option<RuleId>,
    /// Rule applied by the outermost successful override call.
    pub override_rule: Option<RuleId>,
    pub config: Config,
    pub message: Message,
    /// Non-fatal rule failures, in the order they happened.
    pub warnings: Vec<String>,
}

/// What [`Resolver::resolve_in_place`] reports; the state stays in the
/// extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub rule: Option<RuleId>,
    pub override_rule: Option<RuleId>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
struct Cycle {
    rule: String,
    source_url: String,
    max_depth: usize,
}

impl Cycle {
    fn to_error(&self) -> Error {
        Error::OverrideCycle {
            rule: self.rule.clone(),
            source_url: self.source_url.clone(),
            max_depth: self.max_depth,
        }
    }
}

/// Bookkeeping shared by every rule execution of one resolution.
#[derive(Debug, Default)]
pub(crate) struct Trace {
    warnings: Vec<String>,
    override_rule: Option<RuleId>,
    cycle: Option<Cycle>,
}

impl Trace {
    fn warn(&mut self, err: &Error) {
        self.warnings.push(err.to_string());
    }

    fn cycle_error(&self) -> Option<Error> {
        self.cycle.as_ref().map(Cycle::to_error)
    }

    fn into_outcome(self, rule: Option<RuleId>) -> Outcome {
        Outcome {
            rule,
            override_rule: self.override_rule,
            warnings: self.warnings,
        }
    }
}

/// Matches documents against a registry and applies the selected rule.
///
/// A `Resolver` is immutable once built and can be shared between threads;
/// each call works on its own [`Extraction`].
#[derive(Debug)]
pub struct Resolver {
    registry: Registry,
    sandbox: Sandbox,
    capabilities: Capabilities,
    options: Options,
}

impl Resolver {
    /// Creates a resolver with default options.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::with_options(registry, Options::default())
    }

    #[must_use]
    pub fn with_options(registry: Registry, options: Options) -> Self {
        Self {
            registry,
            sandbox: Sandbox::new(options.rule_time_budget),
            capabilities: Capabilities::new(&options),
            options,
        }
    }

    /// Replaces the HTTP transport rules use.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.capabilities = Capabilities::with_transport(transport, &self.options);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// First active rule for `identity`, without running it.
    #[must_use]
    pub fn matching_rule(&self, identity: &Identity) -> Option<&dyn Rule> {
        self.find_match(identity, &mut Trace::default())
    }

    /// Resolves `url` starting from an empty configuration.
    ///
    /// # Errors
    ///
    /// `Error::InvalidUrl` for a URL without a host, `Error::OverrideCycle`
    /// when the override protocol exceeds its depth.
    pub fn resolve(&self, url: &str) -> Result<Resolution> {
        self.resolve_with(Extraction::new(url)?)
    }

    /// Resolves a caller-built extraction (defaults, properties, document).
    ///
    /// # Errors
    ///
    /// `Error::OverrideCycle` when the override protocol exceeds its depth;
    /// the caller should fall back to its default configuration.
    pub fn resolve_with(&self, mut extraction: Extraction) -> Result<Resolution> {
        let outcome = self.resolve_in_place(&mut extraction)?;
        let (config, message, _) = extraction.into_parts();
        Ok(Resolution {
            rule: outcome.rule,
            override_rule: outcome.override_rule,
            config,
            message,
            warnings: outcome.warnings,
        })
    }

    /// Resolves `extraction` in place.
    ///
    /// On error the extraction is left inspectable. After an override cycle
    /// the configuration and message edits made by overridden rules are
    /// rolled back; what the matched rule itself changed is kept.
    ///
    /// # Errors
    ///
    /// `Error::OverrideCycle` when the override protocol exceeds its depth.
    pub fn resolve_in_place(&self, extraction: &mut Extraction) -> Result<Outcome> {
        let mut trace = Trace::default();
        let identity = extraction.message.identity().clone();

        let Some(rule) = self.find_match(&identity, &mut trace) else {
            debug!(url = identity.url(), "no rule matched");
            return Ok(trace.into_outcome(None));
        };
        debug!(rule = rule.id(), url = identity.url(), "rule matched");

        let result = {
            let mut ctx = RuleContext {
                rule: rule.id(),
                identity: &identity,
                config: &mut extraction.config,
                message: &mut extraction.message,
                document: extraction.document.as_ref(),
                resolver: self,
                depth: 0,
                deadline: self.sandbox.deadline(),
                trace: &mut trace,
            };
            self.sandbox.execute(rule, &mut ctx)
        };

        if let Some(err) = trace.cycle_error() {
            error!(rule = rule.id(), url = identity.url(), %err, "resolution aborted");
            return Err(err);
        }
        if let Err(err) = result {
            warn!(rule = rule.id(), url = identity.url(), %err, "rule contribution failed");
            trace.warn(&err);
        }

        Ok(trace.into_outcome(Some(RuleId::from(rule.id()))))
    }

    /// Runs the override protocol for the rule executing in `ctx`.
    pub(crate) fn apply_override(
        &self,
        ctx: &mut RuleContext<'_>,
        source: &str,
    ) -> Result<Option<RuleId>> {
        let depth = ctx.depth + 1;
        if depth > self.options.max_override_depth {
            let cycle = Cycle {
                rule: ctx.rule.to_string(),
                source_url: source.to_string(),
                max_depth: self.options.max_override_depth,
            };
            let err = cycle.to_error();
            error!(rule = ctx.rule, source, depth, "override depth exceeded");
            if ctx.trace.cycle.is_none() {
                ctx.trace.cycle = Some(cycle);
            }
            return Err(err);
        }

        let identity = Identity::parse(source)?;
        let Some(rule) = self.find_match(&identity, ctx.trace) else {
            debug!(from = ctx.rule, source, "no rule matched override source");
            return Ok(None);
        };
        debug!(from = ctx.rule, to = rule.id(), source, depth, "applying override");

        let snapshot = (ctx.config.clone(), ctx.message.clone());
        let result = {
            let mut nested = RuleContext {
                rule: rule.id(),
                identity: &identity,
                config: &mut *ctx.config,
                message: &mut *ctx.message,
                document: ctx.document,
                resolver: self,
                depth,
                deadline: ctx.deadline,
                trace: &mut *ctx.trace,
            };
            self.sandbox.execute(rule, &mut nested)
        };

        if let Some(err) = ctx.trace.cycle_error() {
            (*ctx.config, *ctx.message) = snapshot;
            return Err(err);
        }
        if let Err(err) = result {
            warn!(rule = rule.id(), source, %err, "override contribution failed");
            ctx.trace.warn(&err);
        }

        let id = RuleId::from(rule.id());
        ctx.trace.override_rule = Some(id.clone());
        Ok(Some(id))
    }

    fn find_match(&self, identity: &Identity, trace: &mut Trace) -> Option<&dyn Rule> {
        for rule in self.registry.iter() {
            match self.sandbox.matches(rule, identity) {
                Ok(true) => return Some(rule),
                Ok(false) => {}
                Err(err) => {
                    warn!(url = identity.url(), %err, "rule predicate failed");
                    trace.warn(&err);
                    if !self.options.continue_after_match_error {
                        return None;
                    }
                }
            }
        }
        None
    }
}
