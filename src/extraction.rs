//! Per-document state handed to the resolver.
//!
//! An `Extraction` owns the configuration, the message and (optionally) the
//! parsed document for one URL. It is created fresh per document and never
//! shared between resolutions.

use serde_json::{Map, Value};

use crate::config::Config;
use crate::dom::{self, Document};
use crate::error::Result;
use crate::identity::Identity;
use crate::message::Message;

/// Configuration, message and document for one extraction.
pub struct Extraction {
    pub(crate) config: Config,
    pub(crate) message: Message,
    pub(crate) document: Option<Document>,
}

impl Extraction {
    /// Starts an extraction for `url` with an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` when `url` has no usable host.
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self::from_identity(Identity::parse(url)?))
    }

    #[must_use]
    pub fn from_identity(identity: Identity) -> Self {
        Self {
            config: Config::default(),
            message: Message::new(identity),
            document: None,
        }
    }

    /// Caller-supplied default configuration rules start from.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Read-only properties exposed to rules through the message.
    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.message = self.message.with_properties(properties);
        self
    }

    /// Parses `html` and exposes it to rules as the document tree.
    #[must_use]
    pub fn with_html(mut self, html: &str) -> Self {
        self.document = Some(dom::parse(html));
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[must_use]
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Splits the extraction for the downstream stage.
    #[must_use]
    pub fn into_parts(self) -> (Config, Message, Option<Document>) {
        (self.config, self.message, self.document)
    }
}

impl std::fmt::Debug for Extraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extraction")
            .field("config", &self.config)
            .field("message", &self.message)
            .field("has_document", &self.document.is_some())
            .finish()
    }
}
