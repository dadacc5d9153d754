//! Highlight boxes and content-box math.
//!
//! Every box the overlay reports is the element's bounding rectangle grown
//! by [`BOX_PADDING`] on all four sides, in viewport coordinates.

use kurbo::{Insets, Rect, Size};
use serde::{Deserialize, Serialize};

/// Padding added around an element's bounding rect.
pub const BOX_PADDING: f64 = 4.0;

/// A padded, viewport-space box as sent across the frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl HighlightBox {
    /// The all-zero box carried by a focus-lost click message.
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Pad an element's bounding rect.
    pub fn around(rect: Rect) -> Self {
        let padded = rect.abs().inflate(BOX_PADDING, BOX_PADDING);
        Self {
            top: padded.y0,
            left: padded.x0,
            width: padded.width(),
            height: padded.height(),
        }
    }
}

/// Pointer position of a click, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickPosition {
    pub x: f64,
    pub y: f64,
}

/// Inner size of a box after removing its padding. Never negative.
pub fn content_box(rect: Rect, padding: Insets) -> Size {
    let inner = rect.abs() - padding;
    Size::new(inner.width().max(0.0), inner.height().max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_is_padded_on_all_sides() {
        let b = HighlightBox::around(Rect::new(10.0, 20.0, 110.0, 70.0));
        assert_eq!(
            b,
            HighlightBox {
                top: 16.0,
                left: 6.0,
                width: 108.0,
                height: 58.0,
            }
        );
    }

    #[test]
    fn content_box_subtracts_padding() {
        let size = content_box(
            Rect::new(0.0, 0.0, 300.0, 200.0),
            Insets::new(10.0, 5.0, 20.0, 15.0),
        );
        assert_eq!(size, Size::new(270.0, 180.0));
    }

    #[test]
    fn content_box_never_negative() {
        let size = content_box(Rect::new(0.0, 0.0, 10.0, 10.0), Insets::uniform(8.0));
        assert_eq!(size, Size::ZERO);
    }

    #[test]
    fn box_serializes_camel_fields() {
        let json = serde_json::to_value(HighlightBox::ZERO).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"top": 0.0, "left": 0.0, "width": 0.0, "height": 0.0})
        );
    }
}
