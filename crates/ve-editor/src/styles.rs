//! Live style, font and image edits.

use crate::dom::Document;
use std::collections::{HashMap, HashSet};
use ve_core::image::{ImageProxy, normalize_image_src};
use ve_core::style::{StyleWrite, resolve_write};
use ve_core::{ElementId, OverlayConfig, StyleMap};

/// Write a style patch onto every node. Neutral values remove the inline
/// override; everything else is set with `!important`.
pub fn apply_patch<D: Document>(doc: &mut D, nodes: &[D::Node], patch: &StyleMap) {
    for node in nodes {
        for (name, value) in patch {
            match resolve_write(name, value) {
                StyleWrite::Remove { css_name } => doc.remove_inline_style(node, &css_name),
                StyleWrite::Set { css_name, value } => {
                    doc.set_inline_style(node, &css_name, &value, true)
                }
            }
        }
    }
}

// ─── Style ledger ────────────────────────────────────────────────────────

/// Accumulated, not-yet-reported style patches per identifier.
///
/// Patches merge property-wise, last write wins. A merged map is reported
/// once, when focus leaves the element, and then forgotten.
#[derive(Debug, Default)]
pub struct StyleLedger {
    applied: HashMap<ElementId, StyleMap>,
    unflushed: HashSet<ElementId>,
}

impl StyleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: ElementId, patch: &StyleMap) {
        let entry = self.applied.entry(id).or_default();
        entry.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.unflushed.insert(id);
    }

    /// Take the merged patch for `id` if it holds unreported changes.
    pub fn take_blur(&mut self, id: ElementId) -> Option<StyleMap> {
        if !self.unflushed.remove(&id) {
            return None;
        }
        self.applied.remove(&id).filter(|styles| !styles.is_empty())
    }

    pub fn has_pending(&self, id: ElementId) -> bool {
        self.unflushed.contains(&id)
    }

    pub fn pending(&self, id: ElementId) -> Option<&StyleMap> {
        self.applied.get(&id)
    }

    /// Discard everything recorded for `id` without reporting it.
    pub fn forget(&mut self, id: ElementId) {
        self.applied.remove(&id);
        self.unflushed.remove(&id);
    }

    pub fn clear(&mut self) {
        self.applied.clear();
        self.unflushed.clear();
    }
}

// ─── Font previews ───────────────────────────────────────────────────────

/// Font stylesheet loading and the temporary font pins set by style
/// updates, which win over previews until they expire.
#[derive(Debug, Default)]
pub struct FontPreviews {
    loaded: HashSet<String>,
    pinned: HashMap<ElementId, String>,
}

impl FontPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject the stylesheet for `family` unless it was loaded before.
    pub fn ensure_loaded<D: Document>(&mut self, doc: &mut D, config: &OverlayConfig, family: &str) {
        let (key, url) = config.font_stylesheet_for(family);
        if key.is_empty() || !self.loaded.insert(key) {
            return;
        }
        log::debug!("loading font stylesheet {url}");
        doc.load_stylesheet(&url);
    }

    pub fn pin(&mut self, id: ElementId, family: &str) {
        self.pinned.insert(id, family.to_string());
    }

    pub fn unpin(&mut self, id: ElementId) {
        self.pinned.remove(&id);
    }

    pub fn is_pinned(&self, id: ElementId) -> bool {
        self.pinned.contains_key(&id)
    }

    pub fn is_loaded(&self, family: &str) -> bool {
        self.loaded.contains(&ve_core::config::font_family_key(family))
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
        self.pinned.clear();
    }
}

/// Inline `font-family` value for a preview.
pub fn preview_font_value(family: &str) -> String {
    format!("'{family}', sans-serif")
}

// ─── Images ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PendingImage<N> {
    pub element: N,
    pub id: ElementId,
    /// Source at the time tracking started.
    pub baseline: String,
}

/// The single image whose source change is waiting to be reported.
#[derive(Debug)]
pub struct ImageTracker<N> {
    pending: Option<PendingImage<N>>,
}

impl<N> Default for ImageTracker<N> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<N: Clone + PartialEq> ImageTracker<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `element`. Re-tracking the same element keeps the
    /// original baseline.
    pub fn track(&mut self, element: N, id: ElementId, baseline: String) {
        if self.pending.as_ref().is_some_and(|p| p.element == element) {
            return;
        }
        self.pending = Some(PendingImage {
            element,
            id,
            baseline,
        });
    }

    pub fn pending(&self) -> Option<&PendingImage<N>> {
        self.pending.as_ref()
    }

    /// `(id, old, new)` when the tracked image's normalized source differs
    /// from its baseline. Tracking stops once a change is taken.
    pub fn take_change<D: Document<Node = N>>(
        &mut self,
        doc: &D,
        proxy: &ImageProxy,
    ) -> Option<(ElementId, String, String)> {
        let pending = self.pending.as_ref()?;
        let origin = doc.origin();
        let current = doc
            .image_src(&pending.element)
            .map(|src| normalize_image_src(&src, &origin, proxy))
            .unwrap_or_default();
        let old = normalize_image_src(&pending.baseline, &origin, proxy);
        if current.is_empty() || current == old {
            return None;
        }
        let id = pending.id;
        self.pending = None;
        Some((id, old, current))
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Choose the image to update among same-id nodes: the one whose current
/// source matches `old_src`, else the first image element.
pub fn select_image<D: Document>(
    doc: &D,
    nodes: &[D::Node],
    old_src: Option<&str>,
    proxy: &ImageProxy,
) -> Option<D::Node> {
    let origin = doc.origin();
    let images: Vec<&D::Node> = nodes.iter().filter(|n| doc.tag_name(n) == "img").collect();
    if let Some(old) = old_src.filter(|s| !s.is_empty()) {
        let wanted = normalize_image_src(old, &origin, proxy);
        let matching = images.iter().find(|n| {
            doc.image_src(n)
                .is_some_and(|src| normalize_image_src(&src, &origin, proxy) == wanted)
        });
        if let Some(n) = matching {
            return Some((*n).clone());
        }
    }
    images.first().map(|n| (*n).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDocument;
    use kurbo::{Rect, Size};

    fn patch(pairs: &[(&str, &str)]) -> StyleMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn patches_merge_last_write_wins() {
        let id = ElementId::intern("s.tsx:1:1");
        let mut ledger = StyleLedger::new();
        ledger.record(id, &patch(&[("color", "red"), ("fontSize", "12px")]));
        ledger.record(id, &patch(&[("color", "blue")]));
        assert_eq!(
            ledger.take_blur(id),
            Some(patch(&[("color", "blue"), ("fontSize", "12px")]))
        );
        assert_eq!(ledger.take_blur(id), None);
    }

    #[test]
    fn empty_or_unrecorded_ledger_reports_nothing() {
        let id = ElementId::intern("s.tsx:2:1");
        let mut ledger = StyleLedger::new();
        assert_eq!(ledger.take_blur(id), None);
        ledger.record(id, &StyleMap::new());
        assert_eq!(ledger.take_blur(id), None);
    }

    #[test]
    fn neutral_patch_removes_inline_style() {
        let mut doc = HeadlessDocument::new(Size::new(800.0, 600.0));
        let el = doc.append_element(doc.root, "div", Rect::new(0.0, 0.0, 10.0, 10.0));
        apply_patch(&mut doc, &[el], &patch(&[("backgroundColor", "#ff0000")]));
        let inline = doc.inline_styles(el)["background-color"].clone();
        assert_eq!(inline.value, "#ff0000");
        assert!(inline.important);

        apply_patch(&mut doc, &[el], &patch(&[("backgroundColor", "transparent")]));
        assert_eq!(doc.inline_style(&el, "background-color"), None);
    }

    #[test]
    fn fonts_load_once() {
        let mut doc = HeadlessDocument::new(Size::new(800.0, 600.0));
        let config = OverlayConfig::default();
        let mut fonts = FontPreviews::new();
        fonts.ensure_loaded(&mut doc, &config, "Open Sans");
        fonts.ensure_loaded(&mut doc, &config, "'Open Sans'");
        assert_eq!(doc.stylesheets().len(), 1);
        assert!(fonts.is_loaded("Open Sans"));
        assert_eq!(preview_font_value("Inter"), "'Inter', sans-serif");
    }

    #[test]
    fn image_change_compares_normalized_sources() {
        let mut doc = HeadlessDocument::new(Size::new(800.0, 600.0)).with_origin("https://app.test");
        let img = doc.append_element(doc.root, "img", Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.set_image_src(img, "https://app.test/_next/image?url=%2Fa.png&w=640");
        let id = ElementId::intern("i.tsx:1:1");
        let proxy = ImageProxy::default();

        let mut tracker = ImageTracker::new();
        let initial = doc.image_src(&img).unwrap();
        tracker.track(img, id, initial);
        assert_eq!(tracker.take_change(&doc, &proxy), None);

        doc.replace_image_src(&img, "/b.png");
        assert_eq!(
            tracker.take_change(&doc, &proxy),
            Some((id, "/a.png".into(), "https://app.test/b.png".into()))
        );
        assert!(tracker.pending().is_none());
    }

    #[test]
    fn image_selection_prefers_old_src_match() {
        let mut doc = HeadlessDocument::new(Size::new(800.0, 600.0));
        let a = doc.append_element(doc.root, "img", Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = doc.append_element(doc.root, "img", Rect::new(0.0, 10.0, 10.0, 20.0));
        doc.set_image_src(a, "/one.png");
        doc.set_image_src(b, "/two.png");
        let proxy = ImageProxy::default();
        assert_eq!(select_image(&doc, &[a, b], Some("/two.png"), &proxy), Some(b));
        assert_eq!(select_image(&doc, &[a, b], Some("/zzz.png"), &proxy), Some(a));
        assert_eq!(select_image(&doc, &[a, b], None, &proxy), Some(a));
    }
}
