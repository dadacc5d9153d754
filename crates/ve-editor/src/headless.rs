//! Headless document model.
//!
//! A small element tree on a `petgraph` stable graph, with explicit layout
//! rectangles and computed styles. Used by the test suites and by native
//! replay of recorded sessions; the browser build uses the `web-sys`
//! implementation instead.

use crate::dom::Document;
use kurbo::{Rect, Size};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessKind {
    Element { tag: String },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineValue {
    pub value: String,
    pub important: bool,
}

#[derive(Debug, Clone)]
pub struct HeadlessNode {
    pub kind: HeadlessKind,
    pub attributes: BTreeMap<String, String>,
    pub rect: Rect,
    pub computed: HashMap<String, String>,
    pub inline: BTreeMap<String, InlineValue>,
    pub src: Option<String>,
    /// Child nodes in document order.
    pub children: SmallVec<[NodeIndex; 4]>,
}

impl HeadlessNode {
    fn element(tag: &str, rect: Rect) -> Self {
        Self {
            kind: HeadlessKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            attributes: BTreeMap::new(),
            rect,
            computed: HashMap::new(),
            inline: BTreeMap::new(),
            src: None,
            children: SmallVec::new(),
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, HeadlessKind::Element { .. })
    }
}

/// Element tree with edges from parent to child.
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    pub graph: StableDiGraph<HeadlessNode, ()>,
    /// The `<body>` element, covering the viewport.
    pub root: NodeIndex,
    origin: String,
    scroll: (f64, f64),
    stylesheets: Vec<String>,
    /// Exempt selector while pointer events are suppressed.
    pointer_events_exempt: Option<String>,
    focused: Option<NodeIndex>,
    blurred: Vec<NodeIndex>,
}

impl HeadlessDocument {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(HeadlessNode::element("body", viewport.to_rect()));
        Self {
            graph,
            root,
            origin: "http://localhost:3000".into(),
            scroll: (0.0, 0.0),
            stylesheets: Vec::new(),
            pointer_events_exempt: None,
            focused: None,
            blurred: Vec::new(),
        }
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }

    /// Append an element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeIndex, tag: &str, rect: Rect) -> NodeIndex {
        let idx = self.graph.add_node(HeadlessNode::element(tag, rect));
        self.attach(parent, idx);
        idx
    }

    /// Append an element carrying `attribute = id`.
    pub fn append_annotated(
        &mut self,
        parent: NodeIndex,
        tag: &str,
        attribute: &str,
        id: &str,
        rect: Rect,
    ) -> NodeIndex {
        let idx = self.append_element(parent, tag, rect);
        self.graph[idx]
            .attributes
            .insert(attribute.to_string(), id.to_string());
        idx
    }

    pub fn append_text(&mut self, parent: NodeIndex, text: &str) -> NodeIndex {
        let rect = self.graph[parent].rect;
        let idx = self.graph.add_node(HeadlessNode {
            kind: HeadlessKind::Text(text.to_string()),
            attributes: BTreeMap::new(),
            rect,
            computed: HashMap::new(),
            inline: BTreeMap::new(),
            src: None,
            children: SmallVec::new(),
        });
        self.attach(parent, idx);
        idx
    }

    fn attach(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.graph.add_edge(parent, child, ());
        self.graph[parent].children.push(child);
    }

    /// Remove a single node, unlinking it from its parent's child list.
    fn detach(&mut self, node: NodeIndex) {
        let parent = self
            .graph
            .neighbors_directed(node, petgraph::Direction::Incoming)
            .next();
        if let Some(parent) = parent {
            self.graph[parent].children.retain(|c| *c != node);
        }
        self.graph.remove_node(node);
    }

    /// Replace the direct text of `node`, as typing would.
    pub fn set_text(&mut self, node: NodeIndex, text: &str) {
        let texts: Vec<NodeIndex> = self
            .children(node)
            .into_iter()
            .filter(|&c| !self.graph[c].is_element())
            .collect();
        match texts.split_first() {
            Some((&first, rest)) => {
                self.graph[first].kind = HeadlessKind::Text(text.to_string());
                for &extra in rest {
                    self.detach(extra);
                }
            }
            None => {
                self.append_text(node, text);
            }
        }
    }

    /// Remove a node and its subtree.
    pub fn remove(&mut self, node: NodeIndex) {
        let mut stack = self.children(node);
        self.detach(node);
        while let Some(n) = stack.pop() {
            stack.extend(self.children(n));
            self.graph.remove_node(n);
        }
    }

    pub fn set_rect(&mut self, node: NodeIndex, rect: Rect) {
        self.graph[node].rect = rect;
    }

    pub fn set_computed(&mut self, node: NodeIndex, css_name: &str, value: &str) {
        self.graph[node]
            .computed
            .insert(css_name.to_string(), value.to_string());
    }

    pub fn set_image_src(&mut self, node: NodeIndex, src: &str) {
        self.graph[node].src = Some(src.to_string());
    }

    pub fn inline_styles(&self, node: NodeIndex) -> &BTreeMap<String, InlineValue> {
        &self.graph[node].inline
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    pub fn scroll_offset(&self) -> (f64, f64) {
        self.scroll
    }

    pub fn pointer_events_suppressed(&self) -> bool {
        self.pointer_events_exempt.is_some()
    }

    /// Selector still receiving pointer events during suppression.
    pub fn pointer_events_exempt(&self) -> Option<&str> {
        self.pointer_events_exempt.as_deref()
    }

    pub fn focused(&self) -> Option<NodeIndex> {
        self.focused
    }

    pub fn blurred(&self) -> &[NodeIndex] {
        &self.blurred
    }

    /// Children in document order. Indices freed by removals are reused,
    /// so index order is not insertion order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .node_weight(idx)
            .map(|n| n.children.to_vec())
            .unwrap_or_default()
    }

    fn element_children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.children(idx)
            .into_iter()
            .filter(|&c| self.graph[c].is_element())
            .collect()
    }

    fn contains(&self, idx: NodeIndex) -> bool {
        self.graph.contains_node(idx)
    }

    fn hit_test_node(&self, idx: NodeIndex, x: f64, y: f64) -> Option<NodeIndex> {
        // Last child paints on top
        for child in self.element_children(idx).into_iter().rev() {
            if let Some(hit) = self.hit_test_node(child, x, y) {
                return Some(hit);
            }
        }
        let rect = self.graph[idx].rect.abs();
        (x >= rect.x0 && x < rect.x1 && y >= rect.y0 && y < rect.y1).then_some(idx)
    }

    fn collect_text(&self, idx: NodeIndex, out: &mut String) {
        for child in self.children(idx) {
            match &self.graph[child].kind {
                HeadlessKind::Text(t) => out.push_str(t),
                HeadlessKind::Element { .. } => self.collect_text(child, out),
            }
        }
    }

    fn walk_elements(&self, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
        for child in self.element_children(idx) {
            out.push(child);
            self.walk_elements(child, out);
        }
    }
}

impl Document for HeadlessDocument {
    type Node = NodeIndex;

    fn element_from_point(&self, x: f64, y: f64) -> Option<NodeIndex> {
        self.hit_test_node(self.root, x, y)
    }

    fn query_attribute(&self, attribute: &str, value: &str) -> Vec<NodeIndex> {
        let mut all = vec![self.root];
        self.walk_elements(self.root, &mut all);
        all.retain(|&n| self.graph[n].attributes.get(attribute).map(String::as_str) == Some(value));
        all
    }

    fn attribute(&self, node: &NodeIndex, name: &str) -> Option<String> {
        self.graph.node_weight(*node)?.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeIndex, name: &str, value: &str) {
        if let Some(n) = self.graph.node_weight_mut(*node) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: &NodeIndex, name: &str) {
        if let Some(n) = self.graph.node_weight_mut(*node) {
            n.attributes.remove(name);
        }
    }

    fn tag_name(&self, node: &NodeIndex) -> String {
        match self.graph.node_weight(*node).map(|n| &n.kind) {
            Some(HeadlessKind::Element { tag }) => tag.clone(),
            _ => String::new(),
        }
    }

    fn parent_element(&self, node: &NodeIndex) -> Option<NodeIndex> {
        if !self.contains(*node) {
            return None;
        }
        self.graph
            .neighbors_directed(*node, petgraph::Direction::Incoming)
            .next()
    }

    fn child_element_count(&self, node: &NodeIndex) -> usize {
        if !self.contains(*node) {
            return 0;
        }
        self.element_children(*node).len()
    }

    fn descendants(&self, node: &NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        if self.contains(*node) {
            self.walk_elements(*node, &mut out);
        }
        out
    }

    fn bounding_rect(&self, node: &NodeIndex) -> Rect {
        self.graph
            .node_weight(*node)
            .map(|n| n.rect)
            .unwrap_or(Rect::ZERO)
    }

    /// Inline declarations win over the computed table; `width`/`height`
    /// fall back to the layout rect.
    fn computed_style(&self, node: &NodeIndex, css_name: &str) -> String {
        let Some(n) = self.graph.node_weight(*node) else {
            return String::new();
        };
        if let Some(inline) = n.inline.get(css_name) {
            return inline.value.clone();
        }
        if let Some(value) = n.computed.get(css_name) {
            return value.clone();
        }
        match css_name {
            "width" => format!("{}px", n.rect.width()),
            "height" => format!("{}px", n.rect.height()),
            _ => String::new(),
        }
    }

    fn set_inline_style(&mut self, node: &NodeIndex, css_name: &str, value: &str, important: bool) {
        if let Some(n) = self.graph.node_weight_mut(*node) {
            n.inline.insert(
                css_name.to_string(),
                InlineValue {
                    value: value.to_string(),
                    important,
                },
            );
        }
    }

    fn remove_inline_style(&mut self, node: &NodeIndex, css_name: &str) {
        if let Some(n) = self.graph.node_weight_mut(*node) {
            n.inline.remove(css_name);
        }
    }

    fn inline_style(&self, node: &NodeIndex, css_name: &str) -> Option<String> {
        self.graph
            .node_weight(*node)?
            .inline
            .get(css_name)
            .map(|v| v.value.clone())
    }

    fn text_content(&self, node: &NodeIndex) -> String {
        let mut out = String::new();
        if self.contains(*node) {
            self.collect_text(*node, &mut out);
        }
        out
    }

    fn direct_text(&self, node: &NodeIndex) -> String {
        if !self.contains(*node) {
            return String::new();
        }
        self.children(*node)
            .into_iter()
            .filter_map(|c| match &self.graph[c].kind {
                HeadlessKind::Text(t) => Some(t.as_str()),
                HeadlessKind::Element { .. } => None,
            })
            .collect()
    }

    fn image_src(&self, node: &NodeIndex) -> Option<String> {
        let n = self.graph.node_weight(*node)?;
        n.src.clone().or_else(|| n.attributes.get("src").cloned())
    }

    fn replace_image_src(&mut self, node: &NodeIndex, src: &str) {
        if let Some(n) = self.graph.node_weight_mut(*node) {
            n.attributes.remove("srcset");
            n.attributes.insert("src".into(), src.to_string());
            n.src = Some(src.to_string());
        }
    }

    fn focus(&mut self, node: &NodeIndex) {
        self.focused = Some(*node);
    }

    fn blur(&mut self, node: &NodeIndex) {
        if self.focused == Some(*node) {
            self.focused = None;
        }
        self.blurred.push(*node);
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll.0 += dx;
        self.scroll.1 += dy;
    }

    fn load_stylesheet(&mut self, href: &str) {
        self.stylesheets.push(href.to_string());
    }

    fn set_pointer_events_suppressed(&mut self, suppressed: bool, exempt_selector: &str) {
        self.pointer_events_exempt = suppressed.then(|| exempt_selector.to_string());
    }

    fn origin(&self) -> String {
        self.origin.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "data-orchids-id";

    fn page() -> (HeadlessDocument, NodeIndex, NodeIndex) {
        let mut doc = HeadlessDocument::new(Size::new(800.0, 600.0));
        let root = doc.root;
        let card = doc.append_annotated(root, "div", ID, "a.tsx:1:1", Rect::new(0.0, 0.0, 400.0, 300.0));
        let title = doc.append_annotated(card, "h1", ID, "a.tsx:2:3", Rect::new(10.0, 10.0, 200.0, 40.0));
        doc.append_text(title, "Hello");
        (doc, card, title)
    }

    #[test]
    fn hit_test_returns_topmost_descendant() {
        let (doc, card, title) = page();
        assert_eq!(doc.element_from_point(20.0, 20.0), Some(title));
        assert_eq!(doc.element_from_point(300.0, 200.0), Some(card));
        assert_eq!(doc.element_from_point(700.0, 500.0), Some(doc.root));
        assert_eq!(doc.element_from_point(900.0, 900.0), None);
    }

    #[test]
    fn later_sibling_wins_on_overlap() {
        let (mut doc, card, _) = page();
        let overlay = doc.append_element(card, "span", Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(doc.element_from_point(20.0, 20.0), Some(overlay));
    }

    #[test]
    fn closest_walks_ancestors() {
        let (mut doc, _, title) = page();
        let em = doc.append_element(title, "em", Rect::new(12.0, 12.0, 30.0, 30.0));
        assert_eq!(doc.closest_with_attribute(&em, ID), Some(title));
        assert_eq!(doc.closest_with_attribute(&doc.root, ID), None);
    }

    #[test]
    fn text_queries() {
        let (mut doc, card, title) = page();
        doc.append_text(card, "Body ");
        assert_eq!(doc.text_content(&card), "HelloBody ");
        assert_eq!(doc.direct_text(&card), "Body ");
        doc.set_text(title, "Bye");
        assert_eq!(doc.text_content(&title), "Bye");
    }

    #[test]
    fn inline_overrides_computed() {
        let (mut doc, card, _) = page();
        doc.set_computed(card, "color", "rgb(0, 0, 0)");
        assert_eq!(doc.computed_style(&card, "color"), "rgb(0, 0, 0)");
        doc.set_inline_style(&card, "color", "red", true);
        assert_eq!(doc.computed_style(&card, "color"), "red");
        assert_eq!(doc.computed_style(&card, "width"), "400px");
    }

    #[test]
    fn children_keep_document_order_after_index_reuse() {
        let (mut doc, card, title) = page();
        let first = doc.append_element(card, "p", Rect::new(0.0, 0.0, 100.0, 100.0));
        doc.remove(title);
        let last = doc.append_element(card, "span", Rect::new(0.0, 0.0, 50.0, 50.0));

        assert!(last.index() < first.index());
        assert_eq!(doc.children(card), vec![first, last]);
        assert_eq!(doc.element_from_point(20.0, 20.0), Some(last));
    }

    #[test]
    fn set_text_keeps_sibling_order() {
        let (mut doc, card, _) = page();
        doc.append_text(card, "a");
        doc.append_text(card, "b");
        doc.set_text(card, "ab");
        let tail = doc.append_text(card, "!");
        assert_eq!(doc.direct_text(&card), "ab!");
        assert_eq!(doc.children(card).last(), Some(&tail));
    }

    #[test]
    fn removed_nodes_are_misses() {
        let (mut doc, card, title) = page();
        doc.remove(card);
        assert!(doc.query_attribute(ID, "a.tsx:2:3").is_empty());
        assert_eq!(doc.attribute(&title, ID), None);
        assert_eq!(doc.text_content(&title), "");
        assert_eq!(doc.bounding_rect(&title), Rect::ZERO);
    }
}
