//! Ordered rule registry.
//!
//! Registration order is the matching order: the resolver selects the first
//! rule whose predicate holds. Callers loading rules from an unordered source
//! must sort them before registering.

use std::fmt;

use crate::error::{Error, Result};
use crate::rule::Rule;

/// Rules in registration order.
#[derive(Default)]
pub struct Registry {
    rules: Vec<Box<dyn Rule>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rule` after every rule registered so far.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateRule` when a rule with the same id exists.
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> Result<()> {
        self.register_boxed(Box::new(rule))
    }

    /// Same as [`Registry::register`] for an already boxed rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateRule` when a rule with the same id exists.
    pub fn register_boxed(&mut self, rule: Box<dyn Rule>) -> Result<()> {
        if self.get(rule.id()).is_some() {
            return Err(Error::DuplicateRule(rule.id().to_string()));
        }
        tracing::debug!(rule = rule.id(), position = self.rules.len(), "registered rule");
        self.rules.push(rule);
        Ok(())
    }

    /// Builder-style [`Registry::register`].
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateRule` when a rule with the same id exists.
    pub fn with<R: Rule + 'static>(mut self, rule: R) -> Result<Self> {
        self.register(rule)?;
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in matching order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Rule + 'static)> + '_ {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Rule ids in matching order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.iter().map(|rule| rule.id()).collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.iter().find(|rule| rule.id() == id)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
