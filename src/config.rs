//! Per-document extraction configuration edited by rules.
//!
//! Selector lists are handed verbatim to the selector engine of the cleaning
//! stage and evaluated in order. Every field is replaced wholesale: a rule
//! that wants to extend a list reads it, builds the new list, and sets it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Generates a getter and a wholesale setter for one selector list.
macro_rules! selector_list {
    ($(#[$doc:meta])* $field:ident, $setter:ident) => {
        $(#[$doc])*
        #[must_use]
        pub fn $field(&self) -> &[String] {
            &self.$field
        }

        #[doc = concat!("Replaces `", stringify!($field), "`.")]
        pub fn $setter<I, S>(&mut self, values: I)
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.$field = values.into_iter().map(Into::into).collect();
        }
    };
}

/// Extraction configuration for one document.
///
/// Serializes with the camelCase keys rule authors know (`titleSelectors`,
/// `httpHeaders`, ...), so defaults can be loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    title_selectors: Vec<String>,
    body_selectors: Vec<String>,
    date_selectors: Vec<String>,
    author_selectors: Vec<String>,
    strip_selectors: Vec<String>,
    strip_id_or_class: Vec<String>,
    strip_image_src: Vec<String>,
    single_page_link_selectors: Vec<String>,
    next_page_link_selectors: Vec<String>,
    replace_strings: Vec<(String, String)>,
    http_headers: BTreeMap<String, String>,
}

impl Config {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    selector_list!(
        /// Selectors for the document title.
        title_selectors,
        set_title_selectors
    );
    selector_list!(
        /// Selectors for the document body.
        body_selectors,
        set_body_selectors
    );
    selector_list!(
        /// Selectors for the publication date.
        date_selectors,
        set_date_selectors
    );
    selector_list!(
        /// Selectors for the authors.
        author_selectors,
        set_author_selectors
    );
    selector_list!(
        /// Selectors of elements removed before extraction.
        strip_selectors,
        set_strip_selectors
    );
    selector_list!(
        /// IDs or classes of elements removed before extraction.
        strip_id_or_class,
        set_strip_id_or_class
    );
    selector_list!(
        /// Substrings of an image `src` that trigger removal of the image.
        strip_image_src,
        set_strip_image_src
    );
    selector_list!(
        /// Selectors of links to a single-page version of the document.
        single_page_link_selectors,
        set_single_page_link_selectors
    );
    selector_list!(
        /// Selectors of links to the next page.
        next_page_link_selectors,
        set_next_page_link_selectors
    );

    /// Literal `(from, to)` substitutions, applied in order.
    #[must_use]
    pub fn replace_strings(&self) -> &[(String, String)] {
        &self.replace_strings
    }

    /// Replaces `replace_strings`.
    pub fn set_replace_strings<I, A, B>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.replace_strings = pairs
            .into_iter()
            .map(|(from, to)| (from.into(), to.into()))
            .collect();
    }

    /// Headers merged into every HTTP call made for the rest of this
    /// extraction.
    #[must_use]
    pub fn http_headers(&self) -> &BTreeMap<String, String> {
        &self.http_headers
    }

    /// Replaces `http_headers`.
    pub fn set_http_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.http_headers = headers
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
    }

    /// Applies `replace_strings` to `text` as literal substitutions.
    #[must_use]
    pub fn apply_replace_strings(&self, text: &str) -> String {
        self.replace_strings
            .iter()
            .filter(|(from, _)| !from.is_empty())
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
    }

    /// True when no field has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
