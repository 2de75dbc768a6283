//! The rule contract and the declarative `PatternRule`.
//!
//! A rule decides whether it applies to a document URL (`is_active`) and, if
//! selected, edits the configuration and message through a [`RuleContext`]
//! (`set_config`). Rules are registered once, never mutate themselves, and
//! keep no state between executions.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::RuleContext;
use crate::error::Result;
use crate::identity::Identity;

/// A site-specific extraction rule.
///
/// Both methods may fail. The sandbox turns a failing `is_active` into "not
/// active" and a failing `set_config` into a warning, keeping whatever the
/// rule changed before it failed.
pub trait Rule: Send + Sync {
    /// Unique, stable identifier used in logs and results.
    fn id(&self) -> &str;

    /// Whether this rule applies to `identity`.
    ///
    /// Matching sees the literal document URL; rules own their pattern scope.
    ///
    /// # Errors
    ///
    /// Any error is treated as a non-match by the resolver.
    fn is_active(&self, identity: &Identity) -> Result<bool>;

    /// Applies the rule to the configuration and message held by `ctx`.
    ///
    /// # Errors
    ///
    /// Any error aborts this rule's contribution; mutations already made are
    /// kept.
    fn set_config(&self, ctx: &mut RuleContext<'_>) -> Result<()>;
}

/// Identifier of a registered rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for RuleId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

type ConfigureFn = dyn Fn(&mut RuleContext<'_>) -> Result<()> + Send + Sync;

/// A rule made of a URL regex and a configuration closure.
///
/// # Example
///
/// ```rust
/// use rs_siteconfig::{PatternRule, Registry, Resolver};
///
/// let mut registry = Registry::new();
/// registry.register(PatternRule::new(
///     "example-articles",
///     r"^https://example\.com/[a-z]+/[a-z]+$",
///     |ctx| {
///         ctx.config_mut().set_body_selectors(["article.entry-content"]);
///         Ok(())
///     },
/// )?)?;
///
/// let resolution = Resolver::new(registry).resolve("https://example.com/foo/bar")?;
/// assert_eq!(resolution.config.body_selectors(), ["article.entry-content"]);
/// # Ok::<(), rs_siteconfig::Error>(())
/// ```
pub struct PatternRule {
    id: String,
    pattern: Regex,
    configure: Box<ConfigureFn>,
}

impl PatternRule {
    /// Compiles `pattern` and wraps `configure`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` when the regex does not compile.
    pub fn new<F>(id: impl Into<String>, pattern: &str, configure: F) -> Result<Self>
    where
        F: Fn(&mut RuleContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Ok(Self {
            id: id.into(),
            pattern: Regex::new(pattern)?,
            configure: Box::new(configure),
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl Rule for PatternRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self, identity: &Identity) -> Result<bool> {
        Ok(self.pattern.is_match(identity.url()))
    }

    fn set_config(&self, ctx: &mut RuleContext<'_>) -> Result<()> {
        (self.configure)(ctx)
    }
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn identity(url: &str) -> Identity {
        Identity::parse(url).unwrap_or_else(|err| panic!("bad test url {url}: {err}"))
    }

    #[test]
    fn test_pattern_matches_literal_url() {
        let rule = PatternRule::new("shape", r"^https://example\.com/[a-z]+/[a-z]+$", |_| Ok(()));
        let rule = rule.unwrap_or_else(|err| panic!("{err}"));

        assert!(matches!(rule.is_active(&identity("https://example.com/foo/bar")), Ok(true)));
        assert!(matches!(rule.is_active(&identity("https://example.com/foo")), Ok(false)));
        // Same registrable domain, different host: the pattern decides.
        assert!(matches!(rule.is_active(&identity("https://www.example.com/foo/bar")), Ok(false)));
    }

    #[test]
    fn test_invalid_pattern() {
        let rule = PatternRule::new("broken", r"^(unclosed", |_| Ok(()));
        assert!(matches!(rule, Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn test_rule_id_display_and_eq() {
        let id = RuleId::from("github");
        assert_eq!(id.to_string(), "github");
        assert_eq!(id, "github");
        assert_eq!(serde_json::to_string(&id).unwrap_or_default(), r#""github""#);
    }
}
