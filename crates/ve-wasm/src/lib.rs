//! WASM bridge that mounts the visual-edit overlay inside the embedded
//! page.
//!
//! Compiled via `wasm-pack build --target web` and started by the preview
//! frame's bootstrap script. DOM events, parent-frame messages and timer
//! wakeups are forwarded to [`ve_editor::Overlay`]; drawing the highlight
//! boxes is left to the script, which reads them from `state_json`.

mod dom;
mod host;

pub use dom::WebDocument;
pub use host::{LocalStore, ParentSink, init_logging};

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use ve_core::{ElementId, OverlayConfig};
use ve_editor::{Overlay, ResizeHandle};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, MessageEvent, MouseEvent, ResizeObserver, Window};

type WebOverlay = Overlay<WebDocument, ParentSink, LocalStore>;

/// State shared between the exported handle and the DOM callbacks.
struct Runtime {
    overlay: RefCell<WebOverlay>,
    window: Window,
    wake: RefCell<Option<Closure<dyn FnMut()>>>,
    timeout: Cell<Option<i32>>,
    observer: RefCell<Option<ResizeObserver>>,
    observer_callback: RefCell<Option<Closure<dyn FnMut(js_sys::Array)>>>,
    observed: RefCell<Option<Element>>,
}

impl Runtime {
    fn now(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    /// Run `f` against the overlay, then re-arm the wakeup timer and the
    /// resize observer. Events raised while the overlay is already borrowed
    /// (focus changes it triggers itself) are skipped.
    fn with<R>(&self, f: impl FnOnce(&mut WebOverlay, f64) -> R) -> Option<R> {
        let now = self.now();
        let result = {
            let Ok(mut overlay) = self.overlay.try_borrow_mut() else {
                log::trace!("re-entrant event skipped");
                return None;
            };
            f(&mut overlay, now)
        };
        self.schedule();
        self.sync_observer();
        Some(result)
    }

    fn schedule(&self) {
        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let Some(at) = self
            .overlay
            .try_borrow()
            .ok()
            .and_then(|o| o.next_deadline())
        else {
            return;
        };
        let wake = self.wake.borrow();
        let Some(callback) = wake.as_ref() else {
            return;
        };
        let delay = (at - self.now()).max(0.0).ceil() as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay,
            ) {
            Ok(handle) => self.timeout.set(Some(handle)),
            Err(e) => log::warn!("could not schedule wakeup: {e:?}"),
        }
    }

    /// Keep the resize observer on the focused element only.
    fn sync_observer(&self) {
        let focused = self
            .overlay
            .try_borrow()
            .ok()
            .and_then(|o| o.focused_element().cloned());
        let mut observed = self.observed.borrow_mut();
        if *observed == focused {
            return;
        }
        if let Some(observer) = self.observer.borrow().as_ref() {
            if let Some(old) = observed.as_ref() {
                observer.unobserve(old);
            }
            if let Some(new) = focused.as_ref() {
                observer.observe(new);
            }
        }
        *observed = focused;
    }

    fn stop(&self) {
        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        if let Some(observer) = self.observer.borrow_mut().take() {
            observer.disconnect();
        }
        self.observer_callback.borrow_mut().take();
        self.observed.borrow_mut().take();
        self.wake.borrow_mut().take();
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

/// The overlay controller handed to the bootstrap script.
#[wasm_bindgen]
pub struct VisualEditOverlay {
    runtime: Rc<Runtime>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl VisualEditOverlay {
    /// Create the overlay. `config_json` may be empty or any subset of the
    /// configuration keys.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<VisualEditOverlay, JsValue> {
        init_logging(log::LevelFilter::Info);

        let config = if config_json.trim().is_empty() {
            OverlayConfig::default()
        } else {
            OverlayConfig::from_json(config_json)
                .map_err(|e| JsValue::from_str(&format!("invalid overlay config: {e}")))?
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let doc =
            WebDocument::new(window.clone()).ok_or_else(|| JsValue::from_str("no document"))?;
        let overlay = Overlay::new(
            config,
            doc,
            ParentSink::new(window.clone()),
            LocalStore::new(&window),
        );

        Ok(Self {
            runtime: Rc::new(Runtime {
                overlay: RefCell::new(overlay),
                window,
                wake: RefCell::new(None),
                timeout: Cell::new(None),
                observer: RefCell::new(None),
                observer_callback: RefCell::new(None),
                observed: RefCell::new(None),
            }),
            listeners: Vec::new(),
        })
    }

    /// Attach listeners and restore the persisted mode.
    pub fn mount(&mut self) -> Result<(), JsValue> {
        if !self.listeners.is_empty() {
            return Ok(());
        }
        let rt = &self.runtime;

        let weak = Rc::downgrade(rt);
        let wake = Closure::<dyn FnMut()>::new(move || {
            if let Some(rt) = weak.upgrade() {
                rt.timeout.set(None);
                rt.with(|o, now| o.tick(now));
            }
        });
        *rt.wake.borrow_mut() = Some(wake);

        let weak = Rc::downgrade(rt);
        let on_resize = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
            if let Some(rt) = weak.upgrade() {
                rt.with(|o, _| o.handle_viewport_change());
            }
        });
        let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;
        *rt.observer.borrow_mut() = Some(observer);
        *rt.observer_callback.borrow_mut() = Some(on_resize);

        let window: EventTarget = rt.window.clone().into();
        let document: EventTarget = rt.overlay.borrow().document().dom().clone().into();
        let root: Option<EventTarget> = rt
            .overlay
            .borrow()
            .document()
            .dom()
            .document_element()
            .map(Into::into);

        self.listen(&document, "pointermove", false, |rt, event| {
            let Some((x, y)) = client_point(&event) else {
                return;
            };
            rt.with(|o, _| {
                if o.mode().is_resizing() {
                    o.handle_resize_move(x, y);
                } else {
                    o.handle_pointer_move(x, y);
                }
            });
        })?;
        self.listen(&document, "pointerup", false, |rt, _| {
            rt.with(|o, _| {
                if o.mode().is_resizing() {
                    o.end_resize();
                }
            });
        })?;
        if let Some(root) = &root {
            self.listen(root, "mouseleave", false, |rt, _| {
                rt.with(|o, _| o.handle_pointer_leave());
            })?;
        }
        self.listen(&document, "click", true, |rt, event| {
            let target = event_element(&event);
            let (x, y) = client_point(&event).unwrap_or_default();
            let outcome = rt.with(|o, now| o.handle_click(target, x, y, now));
            if outcome.is_some_and(|c| c.prevent_default) {
                event.prevent_default();
                event.stop_propagation();
            }
        })?;
        self.listen(&document, "focusout", true, |rt, event| {
            if let Some(target) = event_element(&event) {
                rt.with(|o, _| o.handle_edit_blur(&target));
            }
        })?;
        self.listen(&document, "submit", true, |rt, event| {
            if rt.with(|o, _| o.is_active()).unwrap_or(false) {
                event.prevent_default();
            }
        })?;
        self.listen(&document, "scroll", true, |rt, _| {
            rt.with(|o, now| o.handle_scroll(now));
        })?;
        self.listen(&window, "resize", false, |rt, _| {
            rt.with(|o, _| o.handle_viewport_change());
        })?;
        self.listen(&window, "message", false, |rt, event| {
            let Some(data) = message_json(&event) else {
                return;
            };
            rt.with(|o, now| o.handle_raw_message(&data, now));
        })?;

        self.runtime.with(|o, now| o.mount(now));
        log::debug!("overlay mounted with {} listeners", self.listeners.len());
        Ok(())
    }

    /// Detach every listener and undo DOM changes.
    pub fn unmount(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener
                .target
                .remove_event_listener_with_callback_and_bool(
                    listener.kind,
                    listener.callback.as_ref().unchecked_ref(),
                    listener.capture,
                );
        }
        if let Ok(mut overlay) = self.runtime.overlay.try_borrow_mut() {
            overlay.unmount();
        }
        self.runtime.stop();
    }

    /// Toggle visual-edit mode from the host page.
    pub fn set_visual_edit_mode(&self, active: bool) {
        self.runtime.with(|o, _| o.set_visual_edit_mode(active));
    }

    /// Start dragging a resize handle (`"n"`, `"se"`, ...) of the focused
    /// element. Returns `false` when the drag cannot start.
    pub fn begin_resize(&self, handle: &str, x: f64, y: f64) -> bool {
        let Some(handle) = ResizeHandle::from_name(handle) else {
            log::warn!("unknown resize handle {handle:?}");
            return false;
        };
        self.runtime
            .with(|o, _| o.begin_resize(handle, x, y))
            .unwrap_or(false)
    }

    /// Snapshot of everything the script draws: focus box, hover boxes and
    /// labels, mode.
    pub fn state_json(&self) -> String {
        self.runtime
            .overlay
            .try_borrow()
            .ok()
            .and_then(|o| serde_json::to_string(&o.state()).ok())
            .unwrap_or_else(|| "null".to_string())
    }
}

impl VisualEditOverlay {
    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        capture: bool,
        mut handler: impl FnMut(&Runtime, Event) + 'static,
    ) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.runtime);
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(rt) = weak.upgrade() {
                handler(&rt, event);
            }
        });
        target.add_event_listener_with_callback_and_bool(
            kind,
            callback.as_ref().unchecked_ref(),
            capture,
        )?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            capture,
            callback,
        });
        Ok(())
    }
}

impl Drop for VisualEditOverlay {
    fn drop(&mut self) {
        if !self.listeners.is_empty() {
            self.unmount();
        }
    }
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn client_point(event: &Event) -> Option<(f64, f64)> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some((mouse.client_x() as f64, mouse.client_y() as f64))
}

fn message_json(event: &Event) -> Option<serde_json::Value> {
    let data = event.dyn_ref::<MessageEvent>()?.data();
    let text = js_sys::JSON::stringify(&data).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}

// ─── Standalone helpers (no overlay needed) ──────────────────────────────

/// Resolve an element identifier. Returns JSON:
/// `{"ok":true,"filePath":...,"line":...,"column":...}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn identifier_location(id: &str) -> String {
    let value = match ElementId::intern(id).location() {
        Ok(loc) => serde_json::json!({
            "ok": true,
            "filePath": loc.file_path,
            "line": loc.line,
            "column": loc.column,
        }),
        Err(e) => serde_json::json!({"ok": false, "error": e.to_string()}),
    };
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identifier_location_reports_parts() {
        let parsed: serde_json::Value =
            serde_json::from_str(&identifier_location("app/page.tsx:14:8")).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({"ok": true, "filePath": "app/page.tsx", "line": 14, "column": 8})
        );
    }

    #[test]
    fn identifier_location_reports_errors() {
        let parsed: serde_json::Value =
            serde_json::from_str(&identifier_location("nope")).unwrap();
        assert_eq!(parsed["ok"], false);
        assert!(parsed["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
}
