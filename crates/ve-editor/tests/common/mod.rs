//! Shared fixture: a small annotated page on the headless document.

#![allow(dead_code)]

use kurbo::{Rect, Size};
use serde_json::Value;
use ve_core::OverlayConfig;
use ve_editor::{HeadlessDocument, MemoryStore, NodeIndex, Overlay, RecordingSink};

pub const ID: &str = "data-orchids-id";
pub const PARA_ID: &str = "src/Foo.tsx:12:2";
pub const CARD_ID: &str = "src/Foo.tsx:10:4";
pub const IMAGE_ID: &str = "src/Hero.tsx:5:6";
pub const LINK_ID: &str = "src/Nav.tsx:2:2";

pub type TestOverlay = Overlay<HeadlessDocument, RecordingSink, MemoryStore>;

pub struct Page {
    pub doc: HeadlessDocument,
    pub section: NodeIndex,
    /// `<p>Hello</p>`, editable.
    pub para: NodeIndex,
    /// `<div>` holding two spans and no text of its own, not editable.
    pub card: NodeIndex,
    pub image: NodeIndex,
    pub link: NodeIndex,
}

/// ```text
/// body 1280×800
/// └─ section 1000×600                "src/Page.tsx:3:2"
///    ├─ p "Hello"      (20,20)-(420,60)   PARA_ID
///    ├─ div            (20,100)-(420,300) CARD_ID
///    │  ├─ span "One"  (30,110)-(200,140)
///    │  └─ span "Two"  (30,150)-(200,180)
///    ├─ img /hero.png  (500,20)-(900,300) IMAGE_ID
///    └─ a "Docs"       (20,320)-(200,350) LINK_ID
/// ```
pub fn page() -> Page {
    let mut doc = HeadlessDocument::new(Size::new(1280.0, 800.0));
    let root = doc.root;
    let section = doc.append_annotated(
        root,
        "section",
        ID,
        "src/Page.tsx:3:2",
        Rect::new(0.0, 0.0, 1000.0, 600.0),
    );

    let para = doc.append_annotated(section, "p", ID, PARA_ID, Rect::new(20.0, 20.0, 420.0, 60.0));
    doc.append_text(para, "Hello");

    let card = doc.append_annotated(section, "div", ID, CARD_ID, Rect::new(20.0, 100.0, 420.0, 300.0));
    let one = doc.append_element(card, "span", Rect::new(30.0, 110.0, 200.0, 140.0));
    doc.append_text(one, "One");
    let two = doc.append_element(card, "span", Rect::new(30.0, 150.0, 200.0, 180.0));
    doc.append_text(two, "Two");

    let image = doc.append_annotated(section, "img", ID, IMAGE_ID, Rect::new(500.0, 20.0, 900.0, 300.0));
    doc.set_image_src(image, "/hero.png");

    let link = doc.append_annotated(section, "a", ID, LINK_ID, Rect::new(20.0, 320.0, 200.0, 350.0));
    doc.append_text(link, "Docs");

    Page {
        doc,
        section,
        para,
        card,
        image,
        link,
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Overlay over `doc` with visual-edit mode on and the handshake drained.
pub fn active_overlay(doc: HeadlessDocument) -> TestOverlay {
    init_logging();
    let mut overlay = Overlay::new(
        OverlayConfig::default(),
        doc,
        RecordingSink::new(),
        MemoryStore::new(),
    );
    overlay.set_visual_edit_mode(true);
    overlay.sink_mut().take();
    overlay
}

/// Click the center of `node`.
pub fn click(overlay: &mut TestOverlay, node: NodeIndex, now_ms: f64) -> ve_editor::ClickOutcome {
    use ve_editor::Document;
    let center = overlay.document().bounding_rect(&node).center();
    overlay.handle_click(Some(node), center.x, center.y, now_ms)
}

pub fn kinds(overlay: &TestOverlay) -> Vec<String> {
    overlay.sink().kinds()
}

pub fn last(overlay: &TestOverlay, kind: &str) -> Value {
    overlay
        .sink()
        .of_kind(kind)
        .last()
        .map(|v| (*v).clone())
        .unwrap_or(Value::Null)
}
