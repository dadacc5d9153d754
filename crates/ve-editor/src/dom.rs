//! The document seam.
//!
//! The interaction engine never touches a browser API directly. Everything
//! it needs from the page goes through [`Document`], implemented by the WASM
//! bridge over `web-sys` and by [`crate::headless::HeadlessDocument`] for
//! tests and native replay.
//!
//! Node handles are non-owning: the page may remove an element at any time,
//! so every query is re-run on demand and a miss is a no-op.

use kurbo::Rect;
use std::fmt::Debug;

pub trait Document {
    /// Handle to an element. Equality is element identity.
    type Node: Clone + PartialEq + Debug;

    /// Topmost element under a viewport point.
    fn element_from_point(&self, x: f64, y: f64) -> Option<Self::Node>;

    /// All elements whose `attribute` equals `value`, in document order.
    fn query_attribute(&self, attribute: &str, value: &str) -> Vec<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// Lowercase tag name.
    fn tag_name(&self, node: &Self::Node) -> String;

    fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;
    fn child_element_count(&self, node: &Self::Node) -> usize;
    /// Every element below `node`, in document order.
    fn descendants(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Viewport-space bounding rectangle.
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// Computed value of a hyphenated CSS property; empty if unknown.
    fn computed_style(&self, node: &Self::Node, css_name: &str) -> String;

    fn set_inline_style(&mut self, node: &Self::Node, css_name: &str, value: &str, important: bool);
    fn remove_inline_style(&mut self, node: &Self::Node, css_name: &str);
    fn inline_style(&self, node: &Self::Node, css_name: &str) -> Option<String>;

    /// Rendered text of the element and all its descendants.
    fn text_content(&self, node: &Self::Node) -> String;
    /// Concatenation of the element's own text-node children.
    fn direct_text(&self, node: &Self::Node) -> String;

    /// Resolved `src` of an image element.
    fn image_src(&self, node: &Self::Node) -> Option<String>;
    /// Drop any responsive `srcset` and assign `src`.
    fn replace_image_src(&mut self, node: &Self::Node, src: &str);

    fn focus(&mut self, node: &Self::Node);
    fn blur(&mut self, node: &Self::Node);

    fn scroll_by(&mut self, dx: f64, dy: f64);
    fn load_stylesheet(&mut self, href: &str);

    /// Disable pointer events on the page while a resize drag is in
    /// progress. Elements matching `exempt_selector` (the resize handles)
    /// must keep receiving them.
    fn set_pointer_events_suppressed(&mut self, suppressed: bool, exempt_selector: &str);

    /// Origin used to resolve relative image sources.
    fn origin(&self) -> String;

    // ─── Provided ────────────────────────────────────────────────────────

    /// Nearest ancestor-or-self carrying `attribute`.
    fn closest_with_attribute(&self, node: &Self::Node, attribute: &str) -> Option<Self::Node> {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if self.attribute(&n, attribute).is_some() {
                return Some(n);
            }
            current = self.parent_element(&n);
        }
        None
    }

    /// Whether the node is an `<a>` or sits inside one.
    fn is_within_link(&self, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if self.tag_name(&n) == "a" {
                return true;
            }
            current = self.parent_element(&n);
        }
        false
    }

    fn is_content_editable(&self, node: &Self::Node) -> bool {
        self.attribute(node, "contenteditable").as_deref() == Some("true")
    }
}
