//! Document identity: the URL being extracted, its host and its registrable
//! domain.
//!
//! Host and domain are always in Unicode form, whatever encoding the input
//! URL used (`xn--` labels are decoded).

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::{Error, Result};

/// Read-only identity of the document under extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    url: String,
    host: String,
    domain: String,
}

impl Identity {
    /// Builds an identity from the URL the document was fetched from.
    ///
    /// The URL string is kept exactly as given; rules match against it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` when the URL does not parse or has no host.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rs_siteconfig::Identity;
    ///
    /// let id = Identity::parse("https://www.example.co.uk/news/1")?;
    /// assert_eq!(id.host(), "www.example.co.uk");
    /// assert_eq!(id.domain(), "example.co.uk");
    /// # Ok::<(), rs_siteconfig::Error>(())
    /// ```
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let (host, domain) = match parsed.host() {
            Some(Host::Domain(name)) => {
                let ascii = name.trim_end_matches('.').to_ascii_lowercase();
                let registrable = psl::domain_str(&ascii).unwrap_or(&ascii);
                (to_unicode(&ascii), to_unicode(registrable))
            }
            Some(Host::Ipv4(addr)) => (addr.to_string(), addr.to_string()),
            Some(Host::Ipv6(addr)) => {
                let host = format!("[{addr}]");
                (host.clone(), host)
            }
            None => {
                return Err(Error::InvalidUrl {
                    url: url.to_string(),
                    reason: "missing host".to_string(),
                })
            }
        };

        Ok(Self {
            url: url.to_string(),
            host,
            domain,
        })
    }

    /// The URL as originally fetched.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Host name in Unicode form.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Registrable domain in Unicode form (`www.example.co.uk` → `example.co.uk`).
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Parses the URL again for rules that need its components.
    ///
    /// # Errors
    ///
    /// Never fails for an identity built by [`Identity::parse`] unless the
    /// original string carried surrounding whitespace that the parser rejects.
    pub fn parsed_url(&self) -> Result<Url> {
        Ok(Url::parse(self.url.trim())?)
    }
}

fn to_unicode(ascii: &str) -> String {
    let (unicode, result) = idna::domain_to_unicode(ascii);
    if result.is_ok() {
        unicode
    } else {
        ascii.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain_strips_subdomains() {
        let id = Identity::parse("https://www.example.co.uk/a/b").ok();
        let id = id.as_ref().map_or_else(|| panic!("expected identity"), |i| i);
        assert_eq!(id.url(), "https://www.example.co.uk/a/b");
        assert_eq!(id.host(), "www.example.co.uk");
        assert_eq!(id.domain(), "example.co.uk");
    }

    #[test]
    fn test_plain_domain_is_its_own_registrable_domain() {
        let id = Identity::parse("https://example.com/").ok();
        assert_eq!(id.map(|i| i.domain), Some("example.com".to_string()));
    }

    #[test]
    fn test_punycode_host_is_unicode() {
        let id = Identity::parse("https://www.xn--bcher-kva.de/buch").ok();
        let id = id.as_ref().map_or_else(|| panic!("expected identity"), |i| i);
        assert_eq!(id.host(), "www.bücher.de");
        assert_eq!(id.domain(), "bücher.de");
    }

    #[test]
    fn test_unicode_input_stays_unicode() {
        let id = Identity::parse("https://news.bücher.de/").ok();
        assert_eq!(id.map(|i| i.domain), Some("bücher.de".to_string()));
    }

    #[test]
    fn test_ip_host_uses_host_as_domain() {
        let id = Identity::parse("http://127.0.0.1:8080/x").ok();
        let id = id.as_ref().map_or_else(|| panic!("expected identity"), |i| i);
        assert_eq!(id.host(), "127.0.0.1");
        assert_eq!(id.domain(), "127.0.0.1");
    }

    #[test]
    fn test_localhost_falls_back_to_host() {
        let id = Identity::parse("http://localhost/page").ok();
        assert_eq!(id.map(|i| i.domain), Some("localhost".to_string()));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(matches!(
            Identity::parse("not a url"),
            Err(Error::InvalidUrl { .. })
        ));
        assert!(matches!(
            Identity::parse("mailto:someone@example.com"),
            Err(Error::InvalidUrl { .. })
        ));
    }
}
