pub mod config;
pub mod css;
pub mod dedup;
pub mod geometry;
pub mod id;
pub mod image;
pub mod protocol;
pub mod style;
pub mod text;

pub use config::{OverlayConfig, SnapConfig};
pub use dedup::MessageDeduplicator;
pub use geometry::{BOX_PADDING, ClickPosition, HighlightBox};
pub use id::{ElementId, IdentifierError, SourceLocation};
pub use protocol::{CHANNEL, InboundMessage, OutboundMessage, parse_inbound};
pub use style::{StyleMap, StyleProperty};

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Insets, Point, Rect, Size};
