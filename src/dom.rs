//! DOM Operations Adapter
//!
//! DOM-like tree capability for rules, backed by the `dom_query` crate.
//! Function names follow the browser `Node` API rules are written against
//! (`query_selector`, `append_child`, `replace_child`, ...).
//!
//! Selector evaluation is delegated to `dom_query` (CSS). Selector strings
//! from a [`crate::Config`] are passed through unmodified; [`first_match`]
//! evaluates a list in order and stops at the first selector that matches.

pub use dom_query::{Document, Selection};

// === Parsing ===

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

// === Querying ===

/// First element matching `selector`, `None` when nothing matches or the
/// selector is invalid.
#[must_use]
pub fn query_selector<'a>(sel: &Selection<'a>, selector: &str) -> Option<Selection<'a>> {
    sel.try_select(selector)
        .filter(Selection::exists)
        .and_then(|found| found.nodes().first().map(|node| Selection::from(*node)))
}

/// All elements matching `selector`, in document order.
#[must_use]
pub fn query_selector_all<'a>(sel: &Selection<'a>, selector: &str) -> Vec<Selection<'a>> {
    sel.try_select(selector)
        .map(|found| found.nodes().iter().map(|node| Selection::from(*node)).collect())
        .unwrap_or_default()
}

/// Evaluates `selectors` in list order against `doc`.
///
/// Returns the index of the first selector that matched together with its
/// matches. Invalid selectors count as non-matching.
///
/// # Example
///
/// ```rust
/// use rs_siteconfig::dom;
///
/// let doc = dom::parse(r#"<h1 class="headline">News</h1><h1>Other</h1>"#);
/// let selectors = vec!["h1.title".to_string(), "h1.headline".to_string(), "h1".to_string()];
/// let (index, found) = dom::first_match(&doc, &selectors).unwrap_or_else(|| unreachable!());
/// assert_eq!(index, 1);
/// assert_eq!(found.text().to_string(), "News");
/// ```
#[must_use]
pub fn first_match<'a>(doc: &'a Document, selectors: &[String]) -> Option<(usize, Selection<'a>)> {
    selectors.iter().enumerate().find_map(|(index, selector)| {
        doc.try_select(selector)
            .filter(Selection::exists)
            .map(|found| (index, found))
    })
}

// === Attribute Operations ===

/// Get any attribute value.
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

#[inline]
pub fn set_attribute(sel: &Selection, name: &str, value: &str) {
    sel.set_attr(name, value);
}

#[inline]
#[must_use]
pub fn has_attribute(sel: &Selection, name: &str) -> bool {
    sel.has_attr(name)
}

#[inline]
pub fn remove_attribute(sel: &Selection, name: &str) {
    sel.remove_attr(name);
}

/// All attributes of the first node as name/value pairs.
#[must_use]
pub fn attributes(sel: &Selection) -> Vec<(String, String)> {
    sel.nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

// === Node Information ===

/// Lowercase tag name of the first node.
#[must_use]
pub fn node_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_string())
}

/// Text of the node and its descendants.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> String {
    sel.text().to_string()
}

#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> String {
    sel.inner_html().to_string()
}

#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> String {
    sel.html().to_string()
}

// === Tree Navigation ===

#[inline]
#[must_use]
pub fn parent_node<'a>(sel: &Selection<'a>) -> Selection<'a> {
    sel.parent()
}

/// Child element nodes.
#[inline]
#[must_use]
pub fn children<'a>(sel: &Selection<'a>) -> Selection<'a> {
    sel.children()
}

/// All child nodes, text and comments included.
#[must_use]
pub fn child_nodes<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    sel.nodes()
        .first()
        .map(|node| node.children().into_iter().map(Selection::from).collect())
        .unwrap_or_default()
}

#[inline]
#[must_use]
pub fn next_sibling<'a>(sel: &Selection<'a>) -> Selection<'a> {
    sel.next_sibling()
}

#[inline]
#[must_use]
pub fn previous_sibling<'a>(sel: &Selection<'a>) -> Selection<'a> {
    sel.prev_sibling()
}

/// Next sibling that is an element, skipping text nodes.
#[must_use]
pub fn next_element_sibling<'a>(sel: &Selection<'a>) -> Option<Selection<'a>> {
    let mut sibling = sel.nodes().first()?.next_sibling();
    while let Some(node) = sibling {
        if node.is_element() {
            return Some(Selection::from(node));
        }
        sibling = node.next_sibling();
    }
    None
}

/// Previous sibling that is an element, skipping text nodes.
#[must_use]
pub fn previous_element_sibling<'a>(sel: &Selection<'a>) -> Option<Selection<'a>> {
    let mut sibling = sel.nodes().first()?.prev_sibling();
    while let Some(node) = sibling {
        if node.is_element() {
            return Some(Selection::from(node));
        }
        sibling = node.prev_sibling();
    }
    None
}

// === Tree Manipulation ===

/// Appends a copy of `child` at the end of `parent`.
pub fn append_child(parent: &Selection, child: &Selection) {
    parent.append_html(outer_html(child));
}

/// Removes `child` when it is a direct child of `parent`.
///
/// Returns `false` and leaves the tree untouched otherwise.
pub fn remove_child(parent: &Selection, child: &Selection) -> bool {
    if !is_child_of(parent, child) {
        return false;
    }
    child.remove();
    true
}

/// Replaces `old` (a direct child of `parent`) with `new`.
///
/// Returns `false` and leaves the tree untouched when `old` is not a child of
/// `parent`.
pub fn replace_child(parent: &Selection, new: &Selection, old: &Selection) -> bool {
    if !is_child_of(parent, old) {
        return false;
    }
    old.replace_with_html(outer_html(new));
    true
}

/// Replaces `sel` with an HTML fragment.
#[inline]
pub fn replace_with_html(sel: &Selection, html: &str) {
    sel.replace_with_html(html);
}

#[inline]
pub fn set_inner_html(sel: &Selection, html: &str) {
    sel.set_html(html);
}

fn is_child_of(parent: &Selection, child: &Selection) -> bool {
    let (Some(parent), Some(child)) = (parent.nodes().first(), child.nodes().first()) else {
        return false;
    };
    child.parent().is_some_and(|p| p.id == parent.id)
}
