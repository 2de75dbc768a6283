//! Built-in site rules.
//!
//! Order matters: [`builtin`] registers archive mirrors before site rules so
//! a mirrored page is handled by the mirror rule, which then applies the
//! original site's rule through the override protocol.

use crate::error::Result;
use crate::registry::Registry;

pub mod github_readme;
pub mod wayback;

/// Registry holding every built-in rule in matching order.
///
/// # Errors
///
/// Returns an error only if a built-in pattern fails to compile.
pub fn builtin() -> Result<Registry> {
    Registry::new()
        .with(wayback::Wayback)?
        .with(github_readme::rule()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = builtin().unwrap_or_default();
        assert_eq!(registry.ids(), vec![wayback::ID, github_readme::ID]);
    }
}
