pub mod dom;
pub mod focus;
pub mod headless;
pub mod host;
pub mod hover;
pub mod mode;
pub mod overlay;
pub mod resize;
pub mod styles;
pub mod timers;

pub use dom::Document;
pub use headless::HeadlessDocument;
pub use host::{KeyValueStore, MemoryStore, MessageSink, RecordingSink};
pub use mode::InteractionMode;
pub use overlay::{ClickOutcome, Overlay, OverlayState};
pub use resize::ResizeHandle;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::stable_graph::NodeIndex;
