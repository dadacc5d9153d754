//! Outbound message deduplication.
//!
//! Pointer-driven messages fire every animation frame. The gate keeps the
//! canonical serialization of the most recently sent message and drops a
//! message identical to it. Only the immediately preceding message is
//! remembered, so `A, B, A` still sends three times.

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MessageDeduplicator {
    last_key: Option<String>,
}

impl MessageDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `message` should be transmitted.
    ///
    /// A message that cannot be serialized is always admitted and leaves
    /// the remembered key untouched.
    pub fn admit<T: Serialize + ?Sized>(&mut self, message: &T) -> bool {
        let key = match serde_json::to_string(message) {
            Ok(key) => key,
            Err(e) => {
                log::debug!("dedup key unavailable, sending anyway: {e}");
                return true;
            }
        };
        if self.last_key.as_deref() == Some(key.as_str()) {
            return false;
        }
        self.last_key = Some(key);
        true
    }

    /// Forget the last sent message.
    pub fn reset(&mut self) {
        self.last_key = None;
    }
}
