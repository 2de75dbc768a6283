//! Isolated execution of rule predicates and mutators.
//!
//! Rule failures never escape as panics or fatal errors (except an override
//! cycle): they are classified here as `Error::Match` or
//! `Error::ConfigMutation` and the resolver decides what to log.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::context::RuleContext;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::rule::Rule;

/// Deadline used when the budget does not fit in an `Instant`.
const UNBOUNDED: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Runs rules with panic isolation and a time budget.
#[derive(Debug, Clone)]
pub struct Sandbox {
    budget: Duration,
}

impl Sandbox {
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Wall-clock budget given to one top-level `set_config`.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Deadline for an execution starting now.
    ///
    /// A budget too large to represent (`Duration::MAX`) means a year from
    /// now.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        let now = Instant::now();
        now.checked_add(self.budget)
            .or_else(|| now.checked_add(UNBOUNDED))
            .unwrap_or(now)
    }

    /// Evaluates `rule.is_active`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Match` when the predicate fails or panics.
    pub fn matches(&self, rule: &dyn Rule, identity: &Identity) -> Result<bool> {
        match panic::catch_unwind(AssertUnwindSafe(|| rule.is_active(identity))) {
            Ok(Ok(active)) => Ok(active),
            Ok(Err(err)) => Err(Error::Match {
                rule: rule.id().to_string(),
                reason: err.to_string(),
            }),
            Err(payload) => Err(Error::Match {
                rule: rule.id().to_string(),
                reason: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Runs `rule.set_config` against `ctx`.
    ///
    /// Mutations made before a failure are left in place.
    ///
    /// # Errors
    ///
    /// Fatal errors (`Error::OverrideCycle`) pass through unchanged. Anything
    /// else, including a panic or finishing past the context deadline,
    /// becomes `Error::ConfigMutation`.
    pub fn execute(&self, rule: &dyn Rule, ctx: &mut RuleContext<'_>) -> Result<()> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.set_config(ctx)));

        let reason = match outcome {
            Ok(Ok(())) if Instant::now() > ctx.deadline => Error::Timeout(self.budget).to_string(),
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) if err.is_fatal() => return Err(err),
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        Err(Error::ConfigMutation {
            rule: rule.id().to_string(),
            reason,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("panicked: {detail}")
}
