//! Overlay configuration.
//!
//! Every field has a default, so a host may pass a partial JSON object
//! (or nothing at all) when mounting the overlay.

use crate::image::ImageProxy;
use serde::Deserialize;

/// Percentage-snapping thresholds applied when a resize drag ends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapConfig {
    /// A width within this many percentage points of a whole percent snaps.
    pub integer_tolerance: f64,
    /// A width within this many points of a breakpoint snaps.
    pub breakpoint_tolerance: f64,
    pub width_breakpoints: Vec<f64>,
    /// Heights snap only to these whole percentages.
    pub height_breakpoints: Vec<f64>,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            integer_tolerance: 0.1,
            breakpoint_tolerance: 0.5,
            width_breakpoints: vec![25.0, 33.333, 50.0, 66.667, 75.0, 100.0],
            height_breakpoints: vec![25.0, 50.0, 75.0, 100.0],
        }
    }
}

/// Configuration for the visual-edit overlay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Attribute carrying the `path:line:column` identifier.
    pub id_attribute: String,
    /// Optional human-readable name shown instead of the tag name.
    pub name_attribute: String,
    /// Marker set on descendants protected during in-place editing.
    pub protected_attribute: String,
    /// Clicks closer together than this are dropped.
    pub click_debounce_ms: f64,
    /// Quiet period after the last scroll event before `SCROLL_STOPPED`.
    pub scroll_settle_ms: f64,
    /// Delay before re-focusing the persisted element after mount.
    pub restore_delay_ms: f64,
    /// How long a style-update font family wins over font previews.
    pub font_override_ms: f64,
    pub min_resize_px: f64,
    /// Selector of the host-drawn resize handles, which keep receiving
    /// pointer events while the rest of the page is suppressed mid-drag.
    pub resize_handle_selector: String,
    pub snap: SnapConfig,
    pub image_proxy: ImageProxy,
    /// Stylesheet URL template; `{family}` is replaced by the family key.
    pub font_stylesheet_url: String,
    /// Storage key of the persisted visual-edit-mode flag.
    pub mode_key: String,
    /// Storage key of the persisted `{id, tag}` focus marker.
    pub focus_key: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            id_attribute: "data-orchids-id".into(),
            name_attribute: "data-orchids-name".into(),
            protected_attribute: "data-orchids-protected".into(),
            click_debounce_ms: 100.0,
            scroll_settle_ms: 16.0,
            restore_delay_ms: 500.0,
            font_override_ms: 2000.0,
            min_resize_px: 20.0,
            resize_handle_selector: ".resize-handle".into(),
            snap: SnapConfig::default(),
            image_proxy: ImageProxy::default(),
            font_stylesheet_url:
                "https://fonts.googleapis.com/css2?family={family}:wght@300;400;500;600;700&display=swap"
                    .into(),
            mode_key: "orchids_visual_edit_mode".into(),
            focus_key: "orchids_focused_element".into(),
        }
    }
}

impl OverlayConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Stylesheet URL for a font family, spaces and quotes folded to `+`.
    pub fn font_stylesheet_for(&self, family: &str) -> (String, String) {
        let key = font_family_key(family);
        let url = self.font_stylesheet_url.replace("{family}", &key);
        (key, url)
    }
}

/// `"Open Sans"` → `Open+Sans`, `'Inter'` → `Inter`.
pub fn font_family_key(family: &str) -> String {
    family
        .split(|c: char| c == '\'' || c == '"' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = OverlayConfig::from_json(r#"{"clickDebounceMs": 50, "snap": {"breakpointTolerance": 1.0}}"#)
            .unwrap();
        assert_eq!(cfg.click_debounce_ms, 50.0);
        assert_eq!(cfg.snap.breakpoint_tolerance, 1.0);
        assert_eq!(cfg.snap.integer_tolerance, 0.1);
        assert_eq!(cfg.id_attribute, "data-orchids-id");
        assert_eq!(cfg.resize_handle_selector, ".resize-handle");
    }

    #[test]
    fn font_keys_fold_spaces_and_quotes() {
        assert_eq!(font_family_key("Open Sans"), "Open+Sans");
        assert_eq!(font_family_key("'Playfair Display'"), "Playfair+Display");
        let (key, url) = OverlayConfig::default().font_stylesheet_for("Inter");
        assert_eq!(key, "Inter");
        assert!(url.contains("family=Inter:wght"));
    }
}
