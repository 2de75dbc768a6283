//! GitHub repository landing pages: the README is the article.

use crate::error::Result;
use crate::rule::PatternRule;

pub const ID: &str = "github_readme";

/// `https://github.com/<owner>/<repo>` with an optional trailing slash and
/// query string. Deeper paths (issues, blobs, ...) are not matched.
pub const PATTERN: &str = r"(?i)^https://github\.com/[a-z0-9_-]+/[a-z0-9_-]+/?(\?.*)?$";

/// Builds the rule.
///
/// # Errors
///
/// Never fails in practice; the pattern is a constant.
pub fn rule() -> Result<PatternRule> {
    PatternRule::new(ID, PATTERN, |ctx| {
        ctx.config_mut().set_body_selectors(["article.entry-content"]);
        Ok(())
    })
}
