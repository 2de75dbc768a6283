//! Extraction state ("message") shared between rules and the downstream
//! cleaning stage.
//!
//! Every mutable field is private and changed through a setter. Sequence
//! fields are replaced wholesale: there is no way to push onto `authors` or a
//! `meta` entry in place, so a rule that fails halfway never leaves a
//! half-appended list behind.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identity::Identity;

/// Kind of document being extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Article,
    Photo,
    Video,
}

impl DocumentType {
    /// Lowercase name as rules spell it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "article" => Ok(Self::Article),
            "photo" => Ok(Self::Photo),
            "video" => Ok(Self::Video),
            other => Err(Error::InvalidDocumentType(other.to_string())),
        }
    }
}

/// The document under extraction.
///
/// The identity is fixed at construction. `properties` is supplied by the
/// caller (for example archival-capture metadata) and is read-only for rules.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(flatten)]
    identity: Identity,
    title: String,
    description: String,
    site: String,
    authors: Vec<String>,
    #[serde(rename = "type")]
    document_type: DocumentType,
    readability: bool,
    html: Option<String>,
    meta: BTreeMap<String, Vec<String>>,
    properties: Map<String, Value>,
}

impl Message {
    /// Creates an empty message for `identity`, readability enabled.
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            title: String::new(),
            description: String::new(),
            site: String::new(),
            authors: Vec::new(),
            document_type: DocumentType::Article,
            readability: true,
            html: None,
            meta: BTreeMap::new(),
            properties: Map::new(),
        }
    }

    /// Attaches caller-supplied properties.
    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Shorthand for `identity().url()`.
    #[must_use]
    pub fn url(&self) -> &str {
        self.identity.url()
    }

    /// Shorthand for `identity().host()`.
    #[must_use]
    pub fn host(&self) -> &str {
        self.identity.host()
    }

    /// Shorthand for `identity().domain()`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.identity.domain()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Site name.
    #[must_use]
    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn set_site(&mut self, site: impl Into<String>) {
        self.site = site.into();
    }

    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Replaces the author list.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rs_siteconfig::{Identity, Message};
    ///
    /// let mut msg = Message::new(Identity::parse("https://example.com/")?);
    /// msg.set_authors(["Jane Doe"]);
    /// msg.set_authors(["John Roe"]);
    /// assert_eq!(msg.authors(), ["John Roe"]);
    /// # Ok::<(), rs_siteconfig::Error>(())
    /// ```
    pub fn set_authors<I, S>(&mut self, authors: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
    }

    #[must_use]
    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn set_document_type(&mut self, document_type: DocumentType) {
        self.document_type = document_type;
    }

    /// Sets the document type from its rule-facing name.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDocumentType` for anything other than
    /// `article`, `photo` or `video`; the current type is left unchanged.
    pub fn set_type(&mut self, name: &str) -> Result<()> {
        self.document_type = name.parse()?;
        Ok(())
    }

    /// Whether readability runs on this document.
    #[must_use]
    pub fn readability(&self) -> bool {
        self.readability
    }

    pub fn set_readability(&mut self, enabled: bool) {
        self.readability = enabled;
    }

    /// Full-content override, if a rule set one.
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Replaces the whole extracted content.
    ///
    /// Intended for photos and videos. The downstream sanitization pass still
    /// runs on this HTML, see [`Message::requires_sanitization`].
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = Some(html.into());
    }

    /// Free-form metadata values for `key`.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&[String]> {
        self.meta.get(key).map(Vec::as_slice)
    }

    /// All metadata entries.
    #[must_use]
    pub fn meta_entries(&self) -> &BTreeMap<String, Vec<String>> {
        &self.meta
    }

    /// Replaces the values stored under `key`.
    pub fn set_meta<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Caller-supplied properties.
    #[must_use]
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The final sanitization pass (disallowed tags and attributes) is not
    /// under rule control: it runs even with readability disabled and an
    /// `html` override set.
    #[must_use]
    pub fn requires_sanitization(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        match Identity::parse("https://www.example.co.uk/story") {
            Ok(id) => Message::new(id),
            Err(err) => panic!("expected identity, got {err:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let msg = message();
        assert_eq!(msg.domain(), "example.co.uk");
        assert!(msg.readability());
        assert_eq!(msg.document_type(), DocumentType::Article);
        assert!(msg.authors().is_empty());
        assert!(msg.html().is_none());
        assert!(msg.properties().is_empty());
    }

    #[test]
    fn test_authors_replace_wholesale() {
        let mut msg = message();
        msg.set_authors(["Jane Doe"]);
        msg.set_authors(vec!["John Roe".to_string()]);
        assert_eq!(msg.authors(), ["John Roe"]);
    }

    #[test]
    fn test_set_type_validates() {
        let mut msg = message();
        assert!(msg.set_type("video").is_ok());
        assert_eq!(msg.document_type(), DocumentType::Video);

        let err = msg.set_type("podcast");
        assert!(matches!(err, Err(Error::InvalidDocumentType(ref t)) if t == "podcast"));
        assert_eq!(msg.document_type(), DocumentType::Video);
    }

    #[test]
    fn test_html_keeps_sanitization() {
        let mut msg = message();
        msg.set_readability(false);
        msg.set_html("<img src=x onerror=alert(1)>");
        assert_eq!(msg.html(), Some("<img src=x onerror=alert(1)>"));
        assert!(msg.requires_sanitization());
    }

    #[test]
    fn test_meta_entries_replace_per_key() {
        let mut msg = message();
        msg.set_meta("keywords", ["a", "b"]);
        msg.set_meta("keywords", ["c"]);
        msg.set_meta("section", ["news"]);
        assert_eq!(msg.meta("keywords"), Some(&["c".to_string()][..]));
        assert_eq!(msg.meta_entries().len(), 2);
    }

    #[test]
    fn test_serializes_with_type_key() {
        let mut msg = message();
        msg.set_document_type(DocumentType::Photo);
        let json = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(json["type"], "photo");
        assert_eq!(json["domain"], "example.co.uk");
        assert_eq!(json["url"], "https://www.example.co.uk/story");
    }
}
