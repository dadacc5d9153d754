//! Host services: the outbound message sink and the persisted key-value store.

use serde_json::Value;
use std::collections::HashMap;

/// Delivers an enveloped message to the parent frame. Fire-and-forget.
pub trait MessageSink {
    fn post(&mut self, message: Value);
}

/// Origin-scoped string storage surviving a page reload.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Sink that keeps every posted message, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub messages: Vec<Value>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `msg` discriminant of every recorded message.
    pub fn kinds(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| m["msg"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Recorded messages of one kind.
    pub fn of_kind(&self, kind: &str) -> Vec<&Value> {
        self.messages.iter().filter(|m| m["msg"] == kind).collect()
    }

    /// Drain everything recorded so far.
    pub fn take(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.messages)
    }
}

impl MessageSink for RecordingSink {
    fn post(&mut self, message: Value) {
        self.messages.push(message);
    }
}
