//! Text decoding helpers available to rules.
//!
//! Entity handling is delegated to `quick-xml`'s escape module (with the
//! HTML5 entity table) and percent-decoding to `percent-encoding`.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use quick_xml::escape::{escape, resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Escapes `&`, `<`, `>`, `'` and `"`.
#[must_use]
pub fn escape_html(s: &str) -> String {
    escape(s).into_owned()
}

/// Decodes named and numeric HTML entities.
///
/// Malformed input (a stray `&`, an unknown entity) is returned unchanged
/// rather than failing the rule.
#[must_use]
pub fn unescape_html(s: &str) -> String {
    match unescape_with(s, resolve_html5_entity) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_string(),
    }
}

/// Decodes `%XX` escapes. Invalid UTF-8 sequences become U+FFFD.
#[must_use]
pub fn unescape_url(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Decodes an XML document into a JSON tree.
///
/// Each element becomes an object keyed by its children's tag names.
/// Attributes are stored under `@name`, text under `#text`. An element with
/// neither attributes nor children is collapsed to its text. Repeated tags
/// become arrays.
///
/// # Errors
///
/// Returns `Error::Xml` for malformed or unbalanced input.
///
/// # Example
///
/// ```rust
/// use rs_siteconfig::capabilities::text::decode_xml;
///
/// let tree = decode_xml(r#"<feed lang="en"><entry>a</entry><entry>b</entry></feed>"#)?;
/// assert_eq!(tree["feed"]["@lang"], "en");
/// assert_eq!(tree["feed"]["entry"][1], "b");
/// # Ok::<(), rs_siteconfig::Error>(())
/// ```
pub fn decode_xml(s: &str) -> Result<Value> {
    let mut reader = Reader::from_str(s);
    reader.config_mut().trim_text(true);

    // (tag, attributes and children, text); the bottom frame is the document
    let mut stack: Vec<(String, Map<String, Value>, String)> =
        vec![(String::new(), Map::new(), String::new())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (tag, attrs) = open_element(&e)?;
                stack.push((tag, attrs, String::new()));
            }
            Ok(Event::Empty(e)) => {
                let (tag, attrs) = open_element(&e)?;
                let value = close_element(attrs, String::new());
                if let Some((_, parent, _)) = stack.last_mut() {
                    insert_child(parent, tag, value);
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                if let Some((_, _, buf)) = stack.last_mut() {
                    buf.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                if let Some((_, _, buf)) = stack.last_mut() {
                    buf.push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let (tag, fields, text) = match stack.pop() {
                    Some(frame) if !stack.is_empty() => frame,
                    _ => return Err(Error::Xml(format!("unexpected closing tag </{name}>"))),
                };
                let value = close_element(fields, text);
                if let Some((_, parent, _)) = stack.last_mut() {
                    insert_child(parent, tag, value);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
    }

    match stack.pop() {
        Some((_, root, _)) if stack.is_empty() => Ok(Value::Object(root)),
        _ => Err(Error::Xml("unclosed element at end of input".to_string())),
    }
}

fn open_element(e: &BytesStart<'_>) -> Result<(String, Map<String, Value>)> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Map::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<'_, str> = attr.unescape_value().map_err(|e| Error::Xml(e.to_string()))?;
        attrs.insert(format!("@{key}"), Value::String(value.into_owned()));
    }
    Ok((tag, attrs))
}

fn close_element(mut fields: Map<String, Value>, text: String) -> Value {
    if fields.is_empty() {
        return Value::String(text);
    }
    if !text.is_empty() {
        fields.insert("#text".to_string(), Value::String(text));
    }
    Value::Object(fields)
}

fn insert_child(parent: &mut Map<String, Value>, tag: String, value: Value) {
    match parent.get_mut(&tag) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(tag, value);
        }
    }
}
