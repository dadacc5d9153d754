//! Hover tracking.
//!
//! Turns a stream of pointer hits into hover transitions. A transition is
//! reported only when the hit element or its identifier changes, so moving
//! the pointer inside one element, or between two nodes rendered from the
//! same source location, stays quiet.

use crate::dom::Document;
use smallvec::SmallVec;
use ve_core::{ElementId, HighlightBox, OverlayConfig};

/// Result of feeding one pointer hit to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverTransition {
    Unchanged,
    /// Pointer left every annotated element.
    Cleared,
    /// Pointer entered a new identifier. `rect` is `None` when the
    /// identifier is the focused one.
    Entered {
        id: ElementId,
        tag: String,
        rect: Option<HighlightBox>,
    },
}

#[derive(Debug)]
pub struct HoverTracker<N> {
    last_hit: Option<N>,
    last_id: Option<ElementId>,
    /// One box per node sharing the hovered identifier.
    boxes: SmallVec<[HighlightBox; 4]>,
    hovered: Option<HighlightBox>,
    tag: Option<String>,
}

impl<N> Default for HoverTracker<N> {
    fn default() -> Self {
        Self {
            last_hit: None,
            last_id: None,
            boxes: SmallVec::new(),
            hovered: None,
            tag: None,
        }
    }
}

impl<N: Clone + PartialEq> HoverTracker<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the annotated element under the pointer (or `None`).
    pub fn update<D: Document<Node = N>>(
        &mut self,
        doc: &D,
        hit: Option<N>,
        focused: Option<ElementId>,
        config: &OverlayConfig,
    ) -> HoverTransition {
        if hit == self.last_hit {
            return HoverTransition::Unchanged;
        }
        self.last_hit = hit.clone();

        let Some(hit) = hit else {
            self.last_id = None;
            self.clear_visuals();
            return HoverTransition::Cleared;
        };
        let Some(raw) = doc.attribute(&hit, &config.id_attribute) else {
            return HoverTransition::Unchanged;
        };
        let id = ElementId::intern(&raw);
        if self.last_id == Some(id) {
            return HoverTransition::Unchanged;
        }
        self.last_id = Some(id);

        let tag = display_tag(doc, &hit, config);
        if focused == Some(id) {
            self.boxes.clear();
            self.hovered = None;
            self.tag = None;
            return HoverTransition::Entered {
                id,
                tag,
                rect: None,
            };
        }

        self.boxes = doc
            .query_attribute(&config.id_attribute, id.as_str())
            .iter()
            .map(|n| HighlightBox::around(doc.bounding_rect(n)))
            .collect();
        let rect = HighlightBox::around(doc.bounding_rect(&hit));
        self.hovered = Some(rect);
        self.tag = Some(tag.clone());
        HoverTransition::Entered {
            id,
            tag,
            rect: Some(rect),
        }
    }

    /// Show boxes for externally chosen nodes (parent-driven hover, or the
    /// same-id siblings of a freshly focused element).
    pub fn show<D: Document<Node = N>>(&mut self, doc: &D, nodes: &[N], tag: Option<String>) {
        self.boxes = nodes
            .iter()
            .map(|n| HighlightBox::around(doc.bounding_rect(n)))
            .collect();
        self.tag = if self.boxes.is_empty() { None } else { tag };
        self.hovered = None;
    }

    /// Drop the boxes but remember the last hit.
    pub fn clear_visuals(&mut self) {
        self.boxes.clear();
        self.hovered = None;
        self.tag = None;
    }

    /// Forget the last hit so the next pointer move reports afresh.
    pub fn forget_last_hit(&mut self) {
        self.last_hit = None;
        self.last_id = None;
    }

    pub fn clear(&mut self) {
        self.forget_last_hit();
        self.clear_visuals();
    }

    pub fn boxes(&self) -> &[HighlightBox] {
        &self.boxes
    }

    pub fn hovered(&self) -> Option<HighlightBox> {
        self.hovered
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

/// The configured display-name attribute, or the lowercase tag name.
pub fn display_tag<D: Document>(doc: &D, node: &D::Node, config: &OverlayConfig) -> String {
    doc.attribute(node, &config.name_attribute)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| doc.tag_name(node))
}
