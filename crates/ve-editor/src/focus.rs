//! Focus and in-place text editing.
//!
//! Editing turns the focused element itself into an editable region. Child
//! elements are protected from edits (they usually carry their own source
//! identifiers) and everything the session injects is undone on `end`.

use crate::dom::Document;
use ve_core::{ElementId, StyleMap, StyleProperty, style::normalize_computed};

/// Tags whose text may be edited in place.
pub const EDITABLE_TAGS: [&str; 15] = [
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "div", "li", "td", "th", "label", "a", "button",
];

/// Whether `node` supports in-place text editing.
///
/// Native editables always qualify. Otherwise the tag must be in
/// [`EDITABLE_TAGS`], the element must have visible text, and it must be a
/// leaf or have at most one child element alongside text of its own.
pub fn is_text_editable<D: Document>(doc: &D, node: &D::Node) -> bool {
    let tag = doc.tag_name(node);
    if doc.is_content_editable(node) || tag == "input" || tag == "textarea" {
        return true;
    }
    if !EDITABLE_TAGS.contains(&tag.as_str()) || doc.text_content(node).trim().is_empty() {
        return false;
    }
    let children = doc.child_element_count(node);
    let has_direct_text = !doc.direct_text(node).trim().is_empty();
    children == 0 || (children <= 1 && has_direct_text)
}

/// The text an edit operates on: the element's own text when it has child
/// elements, otherwise its full rendered text.
pub fn editable_text<D: Document>(doc: &D, node: &D::Node) -> String {
    if doc.child_element_count(node) > 0 {
        doc.direct_text(node)
    } else {
        doc.text_content(node)
    }
}

/// Normalized snapshot of every reported style property.
pub fn current_styles<D: Document>(doc: &D, node: &D::Node) -> StyleMap {
    StyleProperty::ALL
        .into_iter()
        .map(|p| {
            let raw = doc.computed_style(node, &p.css_name());
            (p.camel_name().to_string(), normalize_computed(p, &raw))
        })
        .collect()
}

/// The focused element.
#[derive(Debug, Clone)]
pub struct Focus<N> {
    pub id: ElementId,
    pub tag: String,
    pub element: N,
    pub is_editable: bool,
    /// Style snapshot taken when focus was acquired.
    pub original_styles: StyleMap,
}

/// An active in-place edit.
#[derive(Debug)]
pub struct EditSession<N> {
    pub element: N,
    was_editable: bool,
    injected_outline: bool,
    protected: Vec<N>,
    baseline: String,
}

impl<N: Clone + PartialEq> EditSession<N> {
    /// Make `element` editable and record the text baseline.
    pub fn begin<D: Document<Node = N>>(doc: &mut D, element: N, protected_attribute: &str) -> Self {
        let was_editable = doc.is_content_editable(&element);
        let mut protected = Vec::new();

        if !was_editable {
            doc.set_inline_style(&element, "outline", "none", true);
            doc.set_inline_style(&element, "box-shadow", "none", true);
            doc.set_attribute(&element, "contenteditable", "true");
            for child in doc.descendants(&element) {
                doc.set_attribute(&child, "contenteditable", "false");
                doc.set_attribute(&child, protected_attribute, "true");
                doc.set_inline_style(&child, "user-select", "none", false);
                doc.set_inline_style(&child, "-webkit-user-select", "none", false);
                protected.push(child);
            }
            doc.focus(&element);
        }

        let baseline = editable_text(doc, &element);
        log::debug!("edit session started ({} protected children)", protected.len());
        Self {
            element,
            was_editable,
            injected_outline: !was_editable,
            protected,
            baseline,
        }
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    /// `(old, new)` if the text moved away from the baseline. The baseline
    /// advances, so the same change is never reported twice.
    pub fn take_text_change<D: Document<Node = N>>(&mut self, doc: &D) -> Option<(String, String)> {
        let current = editable_text(doc, &self.element);
        if current == self.baseline {
            return None;
        }
        let old = std::mem::replace(&mut self.baseline, current.clone());
        Some((old, current))
    }

    /// Undo everything `begin` injected and drop DOM focus.
    pub fn end<D: Document<Node = N>>(self, doc: &mut D, protected_attribute: &str) {
        for child in &self.protected {
            if doc.attribute(child, protected_attribute).is_none() {
                continue;
            }
            doc.remove_attribute(child, "contenteditable");
            doc.remove_attribute(child, protected_attribute);
            doc.remove_inline_style(child, "user-select");
            doc.remove_inline_style(child, "-webkit-user-select");
        }

        if !self.was_editable {
            doc.set_attribute(&self.element, "contenteditable", "false");
        }
        if self.injected_outline {
            // Only strip our own declarations; the page may have replaced them
            for prop in ["outline", "box-shadow"] {
                if doc.inline_style(&self.element, prop).as_deref() == Some("none") {
                    doc.remove_inline_style(&self.element, prop);
                }
            }
        }
        doc.blur(&self.element);
    }
}
