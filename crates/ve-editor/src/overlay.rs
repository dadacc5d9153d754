//! The overlay controller.
//!
//! `Overlay` owns every piece of interaction state and is the only thing
//! hosts talk to. Browser events, parent-frame messages and timer wakeups
//! come in through the `handle_*` methods and `tick`; outbound messages go
//! out through the [`MessageSink`], deduplicated, in the order the
//! transitions happen.
//!
//! ## Focus hand-off
//!
//! | Step | Focus moves from Y to X |
//! |------|-------------------------|
//! | 1 | flush Y's pending image change and style patch, finish Y's edit |
//! | 2 | snapshot X's styles, persist `{id, tag}` |
//! | 3 | show boxes for X's same-id siblings |
//! | 4 | start editing X if it is text-editable |
//! | 5 | start tracking X's image source |
//! | 6 | emit `ELEMENT_CLICKED` |
//! | 7 | re-check pending image changes on the next tick |

use crate::dom::Document;
use crate::focus::{EditSession, Focus, current_styles, is_text_editable};
use crate::host::{KeyValueStore, MessageSink};
use crate::hover::{HoverTracker, HoverTransition, display_tag};
use crate::mode::InteractionMode;
use crate::resize::{ResizeHandle, ResizeSession, finalize_dimensions, is_constraint};
use crate::styles::{
    FontPreviews, ImageTracker, StyleLedger, apply_patch, preview_font_value, select_image,
};
use crate::timers::{TimerKind, Timers};
use kurbo::{Insets, Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ve_core::css::leading_number;
use ve_core::geometry::content_box;
use ve_core::style::CLEARABLE_INLINE_STYLES;
use ve_core::text::wrap_multiline;
use ve_core::{
    ClickPosition, ElementId, HighlightBox, InboundMessage, MessageDeduplicator, OutboundMessage,
    OverlayConfig, StyleMap, parse_inbound,
};

/// What the host should do with the native click event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub prevent_default: bool,
}

/// `{id, tag}` marker persisted for the focused element.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedFocus {
    id: String,
    tag: String,
}

/// Everything a host needs to draw the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayState {
    pub active: bool,
    pub mode: &'static str,
    pub focused_id: Option<ElementId>,
    pub focus_box: Option<HighlightBox>,
    pub focus_tag: Option<String>,
    pub hovered_box: Option<HighlightBox>,
    pub hover_boxes: Vec<HighlightBox>,
    pub hover_tag: Option<String>,
    pub scrolling: bool,
}

pub struct Overlay<D: Document, S, K> {
    config: OverlayConfig,
    doc: D,
    sink: S,
    store: K,
    dedup: MessageDeduplicator,
    active: bool,
    mode: InteractionMode<D::Node>,
    hover: HoverTracker<D::Node>,
    focus_box: Option<HighlightBox>,
    ledger: StyleLedger,
    fonts: FontPreviews,
    images: ImageTracker<D::Node>,
    timers: Timers,
    scrolling: bool,
    last_click_ms: Option<f64>,
}

impl<D: Document, S: MessageSink, K: KeyValueStore> Overlay<D, S, K> {
    pub fn new(config: OverlayConfig, doc: D, sink: S, store: K) -> Self {
        Self {
            config,
            doc,
            sink,
            store,
            dedup: MessageDeduplicator::new(),
            active: false,
            mode: InteractionMode::Idle,
            hover: HoverTracker::new(),
            focus_box: None,
            ledger: StyleLedger::new(),
            fonts: FontPreviews::new(),
            images: ImageTracker::new(),
            timers: Timers::new(),
            scrolling: false,
            last_click_ms: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> &InteractionMode<D::Node> {
        &self.mode
    }

    pub fn focused_element(&self) -> Option<&D::Node> {
        self.mode.focused_element()
    }

    pub fn hover(&self) -> &HoverTracker<D::Node> {
        &self.hover
    }

    pub fn focus_box(&self) -> Option<HighlightBox> {
        self.focus_box
    }

    pub fn pending_styles(&self, id: ElementId) -> Option<&StyleMap> {
        self.ledger.pending(id)
    }

    /// Earliest timer deadline; the host should call `tick` at or after it.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    pub fn state(&self) -> OverlayState {
        OverlayState {
            active: self.active,
            mode: self.mode.name(),
            focused_id: self.mode.focused_id(),
            focus_box: self.focus_box,
            focus_tag: self.mode.focus().map(|f| f.tag.clone()),
            hovered_box: self.hover.hovered(),
            hover_boxes: self.hover.boxes().to_vec(),
            hover_tag: self.hover.tag().map(str::to_string),
            scrolling: self.scrolling,
        }
    }

    // ─── Outbox ──────────────────────────────────────────────────────────

    fn send(&mut self, message: OutboundMessage) {
        if self.dedup.admit(&message) {
            self.post(&message);
        }
    }

    /// Mode handshakes and resize commits always go out, even when
    /// identical to the last message.
    fn send_unconditionally(&mut self, message: OutboundMessage) {
        self.post(&message);
    }

    fn post(&mut self, message: &OutboundMessage) {
        match serde_json::to_value(message.envelope()) {
            Ok(value) => self.sink.post(value),
            Err(e) => log::warn!("dropping unserializable message: {e}"),
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Restore the persisted mode. When it was on, acknowledge it to the
    /// parent and schedule re-focusing the persisted element.
    pub fn mount(&mut self, now_ms: f64) {
        let persisted = self
            .store
            .get(&self.config.mode_key)
            .is_some_and(|v| v == "true");
        self.active = persisted;
        if !persisted {
            return;
        }
        log::info!("visual edit mode restored");
        self.send_unconditionally(OutboundMessage::VisualEditModeAck { active: true });
        self.send_unconditionally(OutboundMessage::VisualEditModeRestored { active: true });
        if self.store.get(&self.config.focus_key).is_some() {
            self.timers
                .arm(TimerKind::RestoreFocus, now_ms + self.config.restore_delay_ms);
        }
    }

    /// Undo DOM changes and drop all state without reporting anything.
    pub fn unmount(&mut self) {
        match self.mode.take() {
            InteractionMode::Editing { edit, .. } => {
                edit.end(&mut self.doc, &self.config.protected_attribute)
            }
            InteractionMode::Resizing { .. } => self
                .doc
                .set_pointer_events_suppressed(false, &self.config.resize_handle_selector),
            _ => {}
        }
        self.hover.clear();
        self.focus_box = None;
        self.ledger.clear();
        self.fonts.clear();
        self.images.clear();
        self.timers.clear();
        self.dedup.reset();
        self.scrolling = false;
        self.last_click_ms = None;
    }

    pub fn set_visual_edit_mode(&mut self, active: bool) {
        if active {
            self.store.set(&self.config.mode_key, "true");
        } else {
            self.store.remove(&self.config.mode_key);
            self.store.remove(&self.config.focus_key);
        }
        self.active = active;
        log::info!("visual edit mode {}", if active { "on" } else { "off" });
        self.send_unconditionally(OutboundMessage::VisualEditModeAck { active });

        if !active {
            self.force_cleanup();
            self.send(OutboundMessage::no_hit());
        }
    }

    fn force_cleanup(&mut self) {
        if self.mode.is_resizing() {
            self.end_resize();
        }
        self.flush_image_change();
        let previous = self.mode.take();
        self.release_focus(previous);
        self.ledger.clear();
        self.images.clear();
        self.hover.clear();
        self.focus_box = None;
        self.scrolling = false;
        for kind in [
            TimerKind::ScrollSettle,
            TimerKind::RestoreFocus,
            TimerKind::PostClickFlush,
        ] {
            self.timers.cancel(kind);
        }
    }

    /// Fire every due timer.
    pub fn tick(&mut self, now_ms: f64) {
        for kind in self.timers.take_due(now_ms) {
            match kind {
                TimerKind::ScrollSettle => {
                    self.scrolling = false;
                    self.send(OutboundMessage::ScrollStopped);
                }
                TimerKind::RestoreFocus => self.restore_focus(now_ms),
                TimerKind::PostClickFlush => self.flush_image_change(),
                TimerKind::FontPin(id) => self.fonts.unpin(id),
            }
        }
    }

    fn restore_focus(&mut self, now_ms: f64) {
        if !self.active {
            return;
        }
        let Some(raw) = self.store.get(&self.config.focus_key) else {
            return;
        };
        let record: PersistedFocus = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("discarding persisted focus: {e}");
                self.store.remove(&self.config.focus_key);
                return;
            }
        };
        let Some(node) = self
            .doc
            .query_attribute(&self.config.id_attribute, &record.id)
            .into_iter()
            .next()
        else {
            log::debug!("persisted element {} ({}) is gone", record.id, record.tag);
            return;
        };
        let center = self.doc.bounding_rect(&node).center();
        self.handle_click(Some(node), center.x, center.y, now_ms);
    }

    // ─── Hover ───────────────────────────────────────────────────────────

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) {
        if !self.active || self.mode.is_resizing() || self.scrolling {
            return;
        }
        let hit = self
            .doc
            .element_from_point(x, y)
            .and_then(|n| self.doc.closest_with_attribute(&n, &self.config.id_attribute));
        let focused = self.mode.focused_id();
        match self.hover.update(&self.doc, hit, focused, &self.config) {
            HoverTransition::Unchanged => {}
            HoverTransition::Cleared => {
                self.flush_image_change();
                self.send(OutboundMessage::no_hit());
            }
            HoverTransition::Entered { id, tag, rect } => self.send(OutboundMessage::Hit {
                id: Some(id),
                tag: Some(tag),
                rect,
            }),
        }
    }

    pub fn handle_pointer_leave(&mut self) {
        if !self.active || self.mode.is_resizing() {
            return;
        }
        self.hover.clear();
        self.flush_image_change();
        self.send(OutboundMessage::no_hit());
    }

    // ─── Focus ───────────────────────────────────────────────────────────

    /// A click on `target` at viewport `(x, y)`.
    pub fn handle_click(
        &mut self,
        target: Option<D::Node>,
        x: f64,
        y: f64,
        now_ms: f64,
    ) -> ClickOutcome {
        if !self.active {
            return ClickOutcome::default();
        }
        let in_link = target.as_ref().is_some_and(|t| self.doc.is_within_link(t));
        if self.mode.is_resizing() {
            return ClickOutcome {
                prevent_default: in_link,
            };
        }
        if self
            .last_click_ms
            .is_some_and(|last| now_ms - last < self.config.click_debounce_ms)
        {
            log::trace!("click debounced");
            return ClickOutcome {
                prevent_default: in_link,
            };
        }
        self.last_click_ms = Some(now_ms);

        let position = ClickPosition { x, y };
        let hit = target
            .as_ref()
            .and_then(|t| self.doc.closest_with_attribute(t, &self.config.id_attribute));
        match hit {
            Some(hit) => self.focus_element(hit, position, now_ms),
            None => {
                self.defocus(position);
                ClickOutcome {
                    prevent_default: in_link,
                }
            }
        }
    }

    fn focus_element(&mut self, hit: D::Node, position: ClickPosition, now_ms: f64) -> ClickOutcome {
        let Some(raw) = self.doc.attribute(&hit, &self.config.id_attribute) else {
            return ClickOutcome::default();
        };
        let id = ElementId::intern(&raw);
        let tag_name = self.doc.tag_name(&hit);
        let is_editable = is_text_editable(&self.doc, &hit);
        let is_button = tag_name == "button"
            || self.doc.attribute(&hit, "role").as_deref() == Some("button");
        let prevent_default = self.doc.is_within_link(&hit) || is_button || !is_editable;

        self.flush_image_change();
        let previous = self.mode.take();
        let carried_edit = if previous.focused_element() == Some(&hit) {
            previous.into_parts().and_then(|(_, edit)| edit)
        } else {
            self.release_focus(previous);
            None
        };

        let tag = display_tag(&self.doc, &hit, &self.config);
        let styles = current_styles(&self.doc, &hit);
        self.persist_focus(id, &tag);

        let siblings: Vec<D::Node> = self
            .doc
            .query_attribute(&self.config.id_attribute, id.as_str())
            .into_iter()
            .filter(|n| *n != hit)
            .collect();
        self.hover.show(&self.doc, &siblings, Some(tag.clone()));
        let rect = HighlightBox::around(self.doc.bounding_rect(&hit));
        self.focus_box = Some(rect);

        let src = if tag_name == "img" {
            self.doc.image_src(&hit)
        } else {
            None
        };
        match &src {
            Some(src) => self.images.track(hit.clone(), id, src.clone()),
            None => self.images.clear(),
        }

        let focus = Focus {
            id,
            tag: tag.clone(),
            element: hit.clone(),
            is_editable,
            original_styles: styles.clone(),
        };
        self.mode = if is_editable {
            let edit = carried_edit.unwrap_or_else(|| {
                EditSession::begin(&mut self.doc, hit.clone(), &self.config.protected_attribute)
            });
            InteractionMode::Editing { focus, edit }
        } else {
            InteractionMode::Focused(focus)
        };
        log::debug!("focused {id} ({})", self.mode.name());

        let class_name = self.doc.attribute(&hit, "class").unwrap_or_default();
        self.send(OutboundMessage::ElementClicked {
            id: Some(id),
            tag: Some(tag),
            rect,
            click_position: position,
            is_editable,
            current_styles: styles,
            class_name,
            src,
        });
        self.timers.arm(TimerKind::PostClickFlush, now_ms);

        ClickOutcome { prevent_default }
    }

    /// Click outside every annotated element.
    fn defocus(&mut self, position: ClickPosition) {
        if self.mode.focus().is_none() {
            return;
        }
        self.flush_image_change();
        let previous = self.mode.take();
        self.release_focus(previous);
        self.images.clear();
        self.hover.clear();
        self.focus_box = None;
        self.store.remove(&self.config.focus_key);
        self.send(OutboundMessage::ElementClicked {
            id: None,
            tag: None,
            rect: HighlightBox::ZERO,
            click_position: position,
            is_editable: false,
            current_styles: StyleMap::new(),
            class_name: String::new(),
            src: None,
        });
    }

    fn persist_focus(&mut self, id: ElementId, tag: &str) {
        let record = PersistedFocus {
            id: id.as_str().to_string(),
            tag: tag.to_string(),
        };
        match serde_json::to_string(&record) {
            Ok(json) => self.store.set(&self.config.focus_key, &json),
            Err(e) => log::warn!("could not persist focus: {e}"),
        }
    }

    /// Report and tear down a focus that is being left.
    fn release_focus(&mut self, mode: InteractionMode<D::Node>) {
        let Some((focus, edit)) = mode.into_parts() else {
            return;
        };
        match edit {
            Some(edit) => self.finish_edit(focus.id, edit),
            None => self.emit_style_blur(focus.id, &focus.element),
        }
    }

    fn finish_edit(&mut self, id: ElementId, mut edit: EditSession<D::Node>) {
        self.emit_style_blur(id, &edit.element);
        if let Some((old, new)) = edit.take_text_change(&self.doc) {
            self.emit_text_change(id, old, new);
        }
        edit.end(&mut self.doc, &self.config.protected_attribute);
    }

    /// The editable element lost DOM focus. Pending edits are reported but
    /// the element stays focused and editable.
    pub fn handle_edit_blur(&mut self, node: &D::Node) {
        let InteractionMode::Editing { focus, edit } = &self.mode else {
            return;
        };
        if edit.element != *node {
            log::warn!("ignoring blur from an element that is no longer being edited");
            return;
        }
        let (id, element) = (focus.id, focus.element.clone());
        self.emit_style_blur(id, &element);
        let change = match &mut self.mode {
            InteractionMode::Editing { edit, .. } => edit.take_text_change(&self.doc),
            _ => None,
        };
        if let Some((old, new)) = change {
            self.emit_text_change(id, old, new);
        }
    }

    fn emit_style_blur(&mut self, id: ElementId, element: &D::Node) {
        if !self.ledger.has_pending(id) {
            return;
        }
        let location = match id.location() {
            Ok(location) => location,
            Err(e) => {
                log::warn!("not reporting styles for {id}: {e}");
                return;
            }
        };
        let Some(styles) = self.ledger.take_blur(id) else {
            return;
        };
        let class_name = self.doc.attribute(element, "class").unwrap_or_default();
        self.send(OutboundMessage::style_blur(id, location, styles, class_name));
    }

    fn emit_text_change(&mut self, id: ElementId, old: String, new: String) {
        match id.location() {
            Ok(location) => self.send(OutboundMessage::text_changed(
                id,
                location,
                wrap_multiline(&old),
                wrap_multiline(&new),
            )),
            Err(e) => log::warn!("not reporting text for {id}: {e}"),
        }
    }

    fn flush_image_change(&mut self) {
        let Some((id, old, new)) = self.images.take_change(&self.doc, &self.config.image_proxy)
        else {
            return;
        };
        match id.location() {
            Ok(location) => self.send(OutboundMessage::image_blur(id, location, old, new)),
            Err(e) => log::warn!("not reporting image for {id}: {e}"),
        }
    }

    fn refresh_focus_box(&mut self) {
        if let Some(focus) = self.mode.focus() {
            self.focus_box = Some(HighlightBox::around(self.doc.bounding_rect(&focus.element)));
        }
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// The focused element may have moved: scroll, window resize or a
    /// layout change observed on the element.
    pub fn handle_viewport_change(&mut self) {
        let Some(focus) = self.mode.focus() else {
            return;
        };
        let id = focus.id;
        let rect = HighlightBox::around(self.doc.bounding_rect(&focus.element));
        self.focus_box = Some(rect);
        self.send(OutboundMessage::FocusMoved { id, rect });
    }

    pub fn handle_scroll(&mut self, now_ms: f64) {
        self.handle_viewport_change();
        if !self.active || self.mode.is_resizing() {
            return;
        }
        if !self.scrolling {
            self.scrolling = true;
            self.hover.clear_visuals();
            self.send(OutboundMessage::ScrollStarted);
        }
        self.timers
            .arm(TimerKind::ScrollSettle, now_ms + self.config.scroll_settle_ms);
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    /// Grab a resize handle of the focused element. An active edit is
    /// finished first. Returns `false` when nothing is focused or a drag is
    /// already running.
    pub fn begin_resize(&mut self, handle: ResizeHandle, x: f64, y: f64) -> bool {
        if !self.active {
            return false;
        }
        let mode = match self.mode.take() {
            InteractionMode::Editing { focus, edit } => {
                self.finish_edit(focus.id, edit);
                InteractionMode::Focused(focus)
            }
            other => other,
        };
        let Some(element) = mode.focused_element().cloned() else {
            log::debug!("resize ignored: nothing focused");
            self.mode = mode;
            return false;
        };

        let session = ResizeSession {
            handle,
            start: Point::new(x, y),
            start_size: self.doc.bounding_rect(&element).size(),
            max_width_constrained: is_constraint(&self.doc.computed_style(&element, "max-width")),
            max_height_constrained: is_constraint(&self.doc.computed_style(&element, "max-height")),
        };
        match mode.into_resizing(session) {
            Ok(mode) => {
                self.mode = mode;
                self.hover.clear();
                self.doc
                    .set_pointer_events_suppressed(true, &self.config.resize_handle_selector);
                true
            }
            Err(mode) => {
                log::warn!("cannot start resizing while {}", mode.name());
                self.mode = mode;
                false
            }
        }
    }

    /// Pointer moved during a drag: report the live size preview.
    pub fn handle_resize_move(&mut self, x: f64, y: f64) {
        let InteractionMode::Resizing { focus, session } = &self.mode else {
            return;
        };
        let parent = parent_content_box(&self.doc, &focus.element);
        let size = session.propose(Point::new(x, y), parent, self.config.min_resize_px);
        let element_id = focus.id;
        self.hover.clear_visuals();
        self.send(OutboundMessage::ResizeElement {
            element_id,
            width: size.width.round(),
            height: size.height.round(),
        });
    }

    /// Drag released: report the final dimensions as a style patch.
    pub fn end_resize(&mut self) {
        let (focus, session) = match self.mode.take().end_resizing() {
            Ok(parts) => parts,
            Err(other) => {
                self.mode = other;
                return;
            }
        };
        let element = &focus.element;
        let rect = self.doc.bounding_rect(element);
        let width = leading_number(&self.doc.computed_style(element, "width"))
            .filter(|w| *w > 0.0)
            .unwrap_or(rect.width());
        let height = leading_number(&self.doc.computed_style(element, "height"))
            .filter(|h| *h > 0.0)
            .unwrap_or(rect.height());
        let parent = parent_content_box(&self.doc, element);
        let (width, height) =
            finalize_dimensions(Size::new(width, height), parent, &self.config.snap);

        let mut styles = StyleMap::new();
        if session.max_width_constrained {
            styles.insert("maxWidth".into(), width.clone());
        }
        if session.max_height_constrained {
            styles.insert("maxHeight".into(), height.clone());
        }
        styles.insert("width".into(), width);
        styles.insert("height".into(), height);

        match focus.id.location() {
            Ok(location) => {
                let class_name = self.doc.attribute(element, "class").unwrap_or_default();
                self.send_unconditionally(OutboundMessage::style_blur(
                    focus.id, location, styles, class_name,
                ));
            }
            Err(e) => log::warn!("not reporting resize for {}: {e}", focus.id),
        }

        self.doc
            .set_pointer_events_suppressed(false, &self.config.resize_handle_selector);
        self.hover.forget_last_hit();
        self.mode = InteractionMode::Focused(focus);
        self.refresh_focus_box();
    }

    // ─── Parent frame ────────────────────────────────────────────────────

    /// Decode and dispatch a posted message; anything unrecognized is
    /// ignored.
    pub fn handle_raw_message(&mut self, data: &Value, now_ms: f64) {
        if let Some(message) = parse_inbound(data) {
            self.handle_message(message, now_ms);
        }
    }

    pub fn handle_message(&mut self, message: InboundMessage, now_ms: f64) {
        match message {
            InboundMessage::Pointer { x, y } => self.handle_pointer_move(x, y),
            InboundMessage::VisualEditMode { active } => self.set_visual_edit_mode(active),
            InboundMessage::Scroll { dx, dy } => self.doc.scroll_by(dx, dy),
            InboundMessage::ClearInlineStyles { element_id } => self.clear_inline_styles(element_id),
            InboundMessage::PreviewFont {
                element_id,
                font_family,
            } => self.preview_font(element_id, &font_family),
            InboundMessage::ResizeElement {
                element_id,
                width,
                height,
            } => self.apply_resize(element_id, width, height),
            InboundMessage::ShowElementHover { element_id } => self.show_element_hover(element_id),
            InboundMessage::StyleUpdate { element_id, styles } => {
                self.apply_style_update(element_id, &styles, now_ms)
            }
            InboundMessage::ImageUpdate {
                element_id,
                src,
                old_src,
            } => self.apply_image_update(element_id, &src, old_src.as_deref()),
        }
    }

    fn nodes_for(&self, id: ElementId) -> Vec<D::Node> {
        self.doc
            .query_attribute(&self.config.id_attribute, id.as_str())
    }

    /// Write a style patch to every node with `id`. Patches that touch the
    /// focused element are accumulated for its style-blur report; a
    /// `fontFamily` entry loads the font and pins it against previews.
    pub fn apply_style_update(&mut self, id: ElementId, styles: &StyleMap, now_ms: f64) {
        let nodes = self.nodes_for(id);
        if nodes.is_empty() {
            return;
        }
        if let Some(family) = styles.get("fontFamily") {
            let primary = family.split(',').next().unwrap_or(family).trim();
            self.fonts.ensure_loaded(&mut self.doc, &self.config, primary);
            self.fonts.pin(id, primary);
            self.timers
                .arm(TimerKind::FontPin(id), now_ms + self.config.font_override_ms);
        }
        apply_patch(&mut self.doc, &nodes, styles);

        let focused_here = self
            .mode
            .focused_element()
            .is_some_and(|f| nodes.contains(f));
        if focused_here {
            self.ledger.record(id, styles);
            self.refresh_focus_box();
        }
    }

    fn apply_image_update(&mut self, id: ElementId, src: &str, old_src: Option<&str>) {
        let nodes = self.nodes_for(id);
        let Some(img) = select_image(&self.doc, &nodes, old_src, &self.config.image_proxy) else {
            return;
        };
        if self.images.pending().is_some_and(|p| p.element != img) {
            self.flush_image_change();
        }
        let before = self.doc.image_src(&img).unwrap_or_default();
        self.images.track(img.clone(), id, before);
        self.doc.replace_image_src(&img, src);
    }

    fn clear_inline_styles(&mut self, id: ElementId) {
        for node in self.nodes_for(id) {
            for property in CLEARABLE_INLINE_STYLES {
                self.doc.remove_inline_style(&node, &property.css_name());
            }
        }
        self.ledger.forget(id);
    }

    fn preview_font(&mut self, id: ElementId, family: &str) {
        if self.fonts.is_pinned(id) {
            return;
        }
        let Some(node) = self.nodes_for(id).into_iter().next() else {
            return;
        };
        self.fonts.ensure_loaded(&mut self.doc, &self.config, family);
        self.doc
            .set_inline_style(&node, "font-family", &preview_font_value(family), false);
    }

    /// Size set by the parent. Applies only when the first node with `id`
    /// is the focused element.
    fn apply_resize(&mut self, id: ElementId, width: f64, height: f64) {
        let Some(first) = self.nodes_for(id).into_iter().next() else {
            return;
        };
        if self.mode.focused_element() != Some(&first) {
            log::debug!("resize for {id} ignored: not focused");
            return;
        }
        self.doc
            .set_inline_style(&first, "width", &format!("{width}px"), true);
        self.doc
            .set_inline_style(&first, "height", &format!("{height}px"), true);
        self.refresh_focus_box();
    }

    fn show_element_hover(&mut self, id: Option<ElementId>) {
        let Some(id) = id else {
            self.hover.clear_visuals();
            return;
        };
        let nodes = self.nodes_for(id);
        if nodes.is_empty() {
            return;
        }
        let focused = self.mode.focused_element();
        let visible: Vec<D::Node> = nodes
            .into_iter()
            .filter(|n| Some(n) != focused)
            .collect();
        let tag = visible
            .first()
            .map(|n| display_tag(&self.doc, n, &self.config));
        self.hover.show(&self.doc, &visible, tag);
    }
}

/// Content box of the element's parent, if it has one.
fn parent_content_box<D: Document>(doc: &D, node: &D::Node) -> Option<Size> {
    let parent = doc.parent_element(node)?;
    let side = |name: &str| leading_number(&doc.computed_style(&parent, name)).unwrap_or(0.0);
    let padding = Insets::new(
        side("padding-left"),
        side("padding-top"),
        side("padding-right"),
        side("padding-bottom"),
    );
    Some(content_box(doc.bounding_rect(&parent), padding))
}
