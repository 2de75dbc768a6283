//! URL Utility Functions
//!
//! URL capability for rules. Parsing and serialization come from `url::Url`
//! (`host_str`, `path`, `query`, `origin`, `to_string` round-trip); this
//! module adds the helpers rules reach for when matching and rewriting
//! document URLs.

pub use url::Url;

use crate::error::Result;

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Parses `input`, resolving it against `base` when given.
///
/// # Errors
///
/// Returns `Error::Url` when either string fails to parse.
///
/// # Example
///
/// ```rust
/// use rs_siteconfig::url_utils::parse;
///
/// let url = parse("../b?x=1", Some("https://example.com/a/c"))?;
/// assert_eq!(url.as_str(), "https://example.com/b?x=1");
/// # Ok::<(), rs_siteconfig::Error>(())
/// ```
pub fn parse(input: &str, base: Option<&str>) -> Result<Url> {
    let input = input.trim();
    match base {
        Some(base) => Ok(Url::parse(base.trim())?.join(input)?),
        None => Ok(Url::parse(input)?),
    }
}

/// Whether [`parse`] would succeed.
#[must_use]
pub fn can_parse(input: &str, base: Option<&str>) -> bool {
    parse(input, base).is_ok()
}

/// Serialized origin (`scheme://host[:port]`), `"null"` for opaque origins.
#[must_use]
pub fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Query string including the leading `?`, empty when there is none.
#[must_use]
pub fn search(url: &Url) -> String {
    url.query().map(|q| format!("?{q}")).unwrap_or_default()
}

/// First value of the query parameter `name`, percent-decoded.
#[must_use]
pub fn search_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// All values of the query parameter `name`, in order.
#[must_use]
pub fn search_params_all(url: &Url, name: &str) -> Vec<String> {
    url.query_pairs()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .collect()
}

/// Replaces (or appends) the query parameter `name`, keeping the others in
/// order.
pub fn set_search_param(url: &mut Url, name: &str, value: &str) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.push((name.to_string(), value.to_string()));

    url.query_pairs_mut().clear().extend_pairs(pairs);
}

/// Normalize a URL by removing the fragment and a trailing slash.
#[must_use]
pub fn normalize_url(url_str: &str) -> String {
    let (_, Some(mut url)) = is_absolute_url(url_str) else {
        return url_str.to_string();
    };

    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(&path[..path.len() - 1]);
    }

    url.to_string()
}
