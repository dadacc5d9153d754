//! Browser-side sinks: parent-frame messaging, `localStorage` and console
//! logging.

use serde_json::Value;
use ve_editor::{KeyValueStore, MessageSink};
use wasm_bindgen::JsValue;
use web_sys::{Storage, Window};

/// Posts every outbound message to `window.parent`.
pub struct ParentSink {
    window: Window,
}

impl ParentSink {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl MessageSink for ParentSink {
    fn post(&mut self, message: Value) {
        let payload = match js_sys::JSON::parse(&message.to_string()) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("could not encode message: {e:?}");
                return;
            }
        };
        match self.window.parent() {
            Ok(Some(parent)) => {
                if let Err(e) = parent.post_message(&payload, "*") {
                    log::warn!("postMessage failed: {e:?}");
                }
            }
            _ => log::debug!("no parent frame; dropping message"),
        }
    }
}

/// `localStorage`, or nothing when storage is unavailable (sandboxed
/// frames, privacy modes).
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn new(window: &Window) -> Self {
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            log::info!("localStorage unavailable; mode will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}

// ─── Logging ─────────────────────────────────────────────────────────────

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from(format!("[visual-edit] {}: {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Route `log` output to the browser console and panics to
/// `console.error`. Safe to call more than once.
pub fn init_logging(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("visual-edit panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
