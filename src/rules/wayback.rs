//! Wayback Machine captures.
//!
//! A capture URL embeds the original one:
//! `https://web.archive.org/web/20240101000000/https://example.com/post`.
//! The rule applies whatever rule matches the original URL, then strips the
//! toolbar the archive injects into every capture.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

use crate::context::RuleContext;
use crate::error::Result;
use crate::identity::Identity;
use crate::rule::Rule;
use crate::url_utils;

pub const ID: &str = "wayback";

/// Capture URL, with an optional `id_`/`im_` style modifier after the
/// timestamp. Group 1 is the original URL.
static CAPTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://web\.archive\.org/web/\d+(?:[a-z]{2}_)?/(.+)$").expect("CAPTURE regex")
});

/// Elements of the archive toolbar.
const TOOLBAR: [&str; 2] = ["#wm-ipp-base", "#wm-ipp-print"];

/// Rule for `web.archive.org` captures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wayback;

/// Original URL embedded in a capture URL.
///
/// The archive accepts captures without a scheme (`/web/2024/example.com/`);
/// those are read as `http://`. `None` when the embedded part is not an
/// absolute http(s) URL with a host.
#[must_use]
pub fn original_url(capture: &str) -> Option<String> {
    let embedded = CAPTURE.captures(capture)?.get(1)?.as_str();
    let original = if embedded.starts_with("http://") || embedded.starts_with("https://") {
        embedded.to_string()
    } else {
        format!("http://{embedded}")
    };
    match url_utils::is_absolute_url(&original) {
        (true, _) => Some(original),
        (false, _) => None,
    }
}

impl Rule for Wayback {
    fn id(&self) -> &str {
        ID
    }

    fn is_active(&self, identity: &Identity) -> Result<bool> {
        Ok(CAPTURE.is_match(identity.url()))
    }

    fn set_config(&self, ctx: &mut RuleContext<'_>) -> Result<()> {
        if let Some(original) = original_url(ctx.url()) {
            let canonical = url_utils::normalize_url(&original);
            ctx.message_mut().set_meta("wayback.original_url", [canonical]);
            match ctx.override_config(&original)? {
                Some(rule) => ctx.log().debug(format_args!("applied {rule} for {original}")),
                None => ctx.log().debug(format_args!("no rule for {original}")),
            }
        }

        let mut strip = ctx.config().strip_selectors().to_vec();
        strip.extend(TOOLBAR.iter().map(ToString::to_string));
        ctx.config_mut().set_strip_selectors(strip);
        Ok(())
    }
}
