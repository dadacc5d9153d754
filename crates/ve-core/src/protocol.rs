//! Cross-frame message protocol.
//!
//! Both directions share one channel name carried in the `type` field; the
//! `msg` field discriminates the message kind. Field names are camelCase on
//! the wire.
//!
//! | Direction | Kinds |
//! |-----------|-------|
//! | parent → overlay | `POINTER`, `VISUAL_EDIT_MODE`, `SCROLL`, `CLEAR_INLINE_STYLES`, `PREVIEW_FONT`, `RESIZE_ELEMENT`, `SHOW_ELEMENT_HOVER`, `STYLE_UPDATE`, `IMAGE_UPDATE` |
//! | overlay → parent | `HIT`, `ELEMENT_CLICKED`, `SCROLL_STARTED`, `SCROLL_STOPPED`, `TEXT_CHANGED`, `STYLE_CHANGED`, `STYLE_BLUR`, `IMAGE_BLUR`, `FOCUS_MOVED`, `RESIZE_ELEMENT`, `VISUAL_EDIT_MODE_ACK`, `VISUAL_EDIT_MODE_RESTORED` |

use crate::geometry::{ClickPosition, HighlightBox};
use crate::id::{ElementId, SourceLocation};
use crate::style::StyleMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Channel name shared by both directions.
pub const CHANNEL: &str = "ORCHIDS_HOVER_v1";

/// Legacy envelope types that predate the shared channel.
const LEGACY_STYLE_UPDATE: &str = "ORCHIDS_STYLE_UPDATE";
const LEGACY_IMAGE_UPDATE: &str = "ORCHIDS_IMAGE_UPDATE";
const LEGACY_RESIZE_ELEMENT: &str = "RESIZE_ELEMENT";

// ─── Overlay → parent ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "msg", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// Hover transition; all fields null when nothing is hovered.
    Hit {
        id: Option<ElementId>,
        tag: Option<String>,
        rect: Option<HighlightBox>,
    },
    /// Focus transition; `id` null means focus was lost.
    #[serde(rename_all = "camelCase")]
    ElementClicked {
        id: Option<ElementId>,
        tag: Option<String>,
        rect: HighlightBox,
        click_position: ClickPosition,
        is_editable: bool,
        current_styles: StyleMap,
        class_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        src: Option<String>,
    },
    ScrollStarted,
    ScrollStopped,
    #[serde(rename_all = "camelCase")]
    TextChanged {
        id: ElementId,
        old_text: String,
        new_text: String,
        file_path: String,
        line: u32,
        column: u32,
    },
    /// Incremental style report. Part of the protocol vocabulary; the overlay
    /// reports finalized edits through `StyleBlur` only.
    #[serde(rename_all = "camelCase")]
    StyleChanged {
        id: ElementId,
        styles: StyleMap,
        file_path: String,
        line: u32,
        column: u32,
    },
    /// Finalized, consolidated style edit.
    #[serde(rename_all = "camelCase")]
    StyleBlur {
        id: ElementId,
        styles: StyleMap,
        file_path: String,
        line: u32,
        column: u32,
        class_name: String,
    },
    #[serde(rename_all = "camelCase")]
    ImageBlur {
        id: ElementId,
        old_src: String,
        new_src: String,
        file_path: String,
        line: u32,
        column: u32,
    },
    FocusMoved {
        id: ElementId,
        rect: HighlightBox,
    },
    /// Live size preview during a resize drag; not a persisted edit.
    #[serde(rename_all = "camelCase")]
    ResizeElement {
        element_id: ElementId,
        width: f64,
        height: f64,
    },
    VisualEditModeAck {
        active: bool,
    },
    VisualEditModeRestored {
        active: bool,
    },
}

impl OutboundMessage {
    pub fn no_hit() -> Self {
        Self::Hit {
            id: None,
            tag: None,
            rect: None,
        }
    }

    pub fn text_changed(
        id: ElementId,
        location: SourceLocation,
        old_text: String,
        new_text: String,
    ) -> Self {
        Self::TextChanged {
            id,
            old_text,
            new_text,
            file_path: location.file_path,
            line: location.line,
            column: location.column,
        }
    }

    pub fn style_blur(
        id: ElementId,
        location: SourceLocation,
        styles: StyleMap,
        class_name: String,
    ) -> Self {
        Self::StyleBlur {
            id,
            styles,
            file_path: location.file_path,
            line: location.line,
            column: location.column,
            class_name,
        }
    }

    pub fn image_blur(
        id: ElementId,
        location: SourceLocation,
        old_src: String,
        new_src: String,
    ) -> Self {
        Self::ImageBlur {
            id,
            old_src,
            new_src,
            file_path: location.file_path,
            line: location.line,
            column: location.column,
        }
    }

    /// Wrap in the channel envelope, ready to post.
    pub fn envelope(&self) -> Envelope<'_> {
        Envelope {
            channel: CHANNEL,
            body: self,
        }
    }
}

/// `{ "type": CHANNEL, "msg": ..., ... }`
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    #[serde(rename = "type")]
    pub channel: &'static str,
    #[serde(flatten)]
    pub body: &'a OutboundMessage,
}

// ─── Parent → overlay ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "msg", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    Pointer {
        x: f64,
        y: f64,
    },
    VisualEditMode {
        active: bool,
    },
    Scroll {
        dx: f64,
        dy: f64,
    },
    #[serde(rename_all = "camelCase")]
    ClearInlineStyles {
        element_id: ElementId,
    },
    #[serde(rename_all = "camelCase")]
    PreviewFont {
        element_id: ElementId,
        font_family: String,
    },
    #[serde(rename_all = "camelCase")]
    ResizeElement {
        element_id: ElementId,
        width: f64,
        height: f64,
    },
    #[serde(rename_all = "camelCase")]
    ShowElementHover {
        element_id: Option<ElementId>,
    },
    /// Apply style properties to every node carrying the id.
    #[serde(rename_all = "camelCase")]
    StyleUpdate {
        element_id: ElementId,
        #[serde(deserialize_with = "style_values")]
        styles: StyleMap,
    },
    /// Replace an image source; `old_src` picks among same-id images.
    #[serde(rename_all = "camelCase")]
    ImageUpdate {
        element_id: ElementId,
        src: String,
        #[serde(default)]
        old_src: Option<String>,
    },
}

/// Style values may arrive as JSON numbers or booleans (`opacity: 0.5`,
/// `fontWeight: 700`); they are applied in their string form. `null`
/// entries are dropped.
fn style_values<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StyleMap, D::Error> {
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((name, value))
        })
        .collect())
}

/// Decode a posted message. Accepts the shared channel and the legacy
/// envelopes (`ORCHIDS_STYLE_UPDATE`, `ORCHIDS_IMAGE_UPDATE`, bare
/// `RESIZE_ELEMENT`), which are folded onto the same enum. Returns `None`
/// for anything else, including malformed payloads.
pub fn parse_inbound(data: &Value) -> Option<InboundMessage> {
    let kind = data.get("type")?.as_str()?;
    let legacy_msg = match kind {
        CHANNEL => None,
        LEGACY_STYLE_UPDATE => Some("STYLE_UPDATE"),
        LEGACY_IMAGE_UPDATE => Some("IMAGE_UPDATE"),
        LEGACY_RESIZE_ELEMENT => Some("RESIZE_ELEMENT"),
        _ => return None,
    };

    let mut body = data.clone();
    if let (Some(msg), Some(obj)) = (legacy_msg, body.as_object_mut()) {
        obj.insert("msg".into(), Value::String(msg.into()));
    }

    match serde_json::from_value(body) {
        Ok(msg) => Some(msg),
        Err(e) => {
            log::debug!("ignoring malformed {kind} message: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn hit_serializes_with_channel() {
        let msg = OutboundMessage::Hit {
            id: Some(ElementId::intern("src/Foo.tsx:10:4")),
            tag: Some("div".into()),
            rect: Some(HighlightBox {
                top: 1.0,
                left: 2.0,
                width: 3.0,
                height: 4.0,
            }),
        };
        assert_eq!(
            serde_json::to_value(msg.envelope()).unwrap(),
            json!({
                "type": CHANNEL,
                "msg": "HIT",
                "id": "src/Foo.tsx:10:4",
                "tag": "div",
                "rect": {"top": 1.0, "left": 2.0, "width": 3.0, "height": 4.0}
            })
        );
    }

    #[test]
    fn no_hit_serializes_nulls() {
        assert_eq!(
            serde_json::to_value(OutboundMessage::no_hit().envelope()).unwrap(),
            json!({"type": CHANNEL, "msg": "HIT", "id": null, "tag": null, "rect": null})
        );
    }

    #[test]
    fn style_blur_uses_camel_case_fields() {
        let loc = SourceLocation::parse("src/Foo.tsx:12:2").unwrap();
        let mut styles = StyleMap::new();
        styles.insert("fontSize".into(), "24px".into());
        let msg = OutboundMessage::style_blur(
            ElementId::intern("src/Foo.tsx:12:2"),
            loc,
            styles,
            "text-lg".into(),
        );
        let v = serde_json::to_value(msg.envelope()).unwrap();
        assert_eq!(v["msg"], "STYLE_BLUR");
        assert_eq!(v["filePath"], "src/Foo.tsx");
        assert_eq!(v["line"], 12);
        assert_eq!(v["className"], "text-lg");
        assert_eq!(v["styles"]["fontSize"], "24px");
    }

    #[test]
    fn style_changed_has_no_class_name() {
        let msg = OutboundMessage::StyleChanged {
            id: ElementId::intern("a.tsx:1:1"),
            styles: StyleMap::new(),
            file_path: "a.tsx".into(),
            line: 1,
            column: 1,
        };
        let v = serde_json::to_value(msg.envelope()).unwrap();
        assert_eq!(v["msg"], "STYLE_CHANGED");
        assert!(v.get("className").is_none());
    }

    #[test]
    fn unit_variants_carry_only_the_tag() {
        assert_eq!(
            serde_json::to_value(OutboundMessage::ScrollStarted.envelope()).unwrap(),
            json!({"type": CHANNEL, "msg": "SCROLL_STARTED"})
        );
    }

    #[test]
    fn parses_channel_messages() {
        assert_eq!(
            parse_inbound(&json!({"type": CHANNEL, "msg": "VISUAL_EDIT_MODE", "active": true})),
            Some(InboundMessage::VisualEditMode { active: true })
        );
        assert_eq!(
            parse_inbound(&json!({"type": CHANNEL, "msg": "SHOW_ELEMENT_HOVER", "elementId": null})),
            Some(InboundMessage::ShowElementHover { element_id: None })
        );
        assert_eq!(
            parse_inbound(&json!({
                "type": CHANNEL,
                "msg": "PREVIEW_FONT",
                "elementId": "a.tsx:1:2",
                "fontFamily": "Inter"
            })),
            Some(InboundMessage::PreviewFont {
                element_id: ElementId::intern("a.tsx:1:2"),
                font_family: "Inter".into()
            })
        );
    }

    #[test]
    fn folds_legacy_envelopes() {
        let msg = parse_inbound(&json!({
            "type": "ORCHIDS_STYLE_UPDATE",
            "elementId": "a.tsx:1:2",
            "styles": {"color": "#000000"}
        }));
        let mut styles = StyleMap::new();
        styles.insert("color".into(), "#000000".into());
        assert_eq!(
            msg,
            Some(InboundMessage::StyleUpdate {
                element_id: ElementId::intern("a.tsx:1:2"),
                styles
            })
        );

        let msg = parse_inbound(&json!({
            "type": "ORCHIDS_IMAGE_UPDATE",
            "elementId": "a.tsx:3:4",
            "src": "/hero.png"
        }));
        assert_eq!(
            msg,
            Some(InboundMessage::ImageUpdate {
                element_id: ElementId::intern("a.tsx:3:4"),
                src: "/hero.png".into(),
                old_src: None
            })
        );

        let msg = parse_inbound(&json!({
            "type": "RESIZE_ELEMENT",
            "elementId": "a.tsx:5:6",
            "width": 120,
            "height": 80
        }));
        assert!(matches!(msg, Some(InboundMessage::ResizeElement { .. })));
    }

    #[test]
    fn non_string_style_values_are_stringified() {
        let msg = parse_inbound(&json!({
            "type": "ORCHIDS_STYLE_UPDATE",
            "elementId": "a.tsx:1:2",
            "styles": {"opacity": 0.5, "fontWeight": 700, "color": "red", "gap": null}
        }));
        let styles: StyleMap = [("color", "red"), ("fontWeight", "700"), ("opacity", "0.5")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            msg,
            Some(InboundMessage::StyleUpdate {
                element_id: ElementId::intern("a.tsx:1:2"),
                styles
            })
        );
    }

    #[test]
    fn ignores_foreign_and_malformed_messages() {
        assert_eq!(parse_inbound(&json!({"type": "webpackOk"})), None);
        assert_eq!(parse_inbound(&json!("hello")), None);
        assert_eq!(
            parse_inbound(&json!({"type": CHANNEL, "msg": "SCROLL", "dx": "far"})),
            None
        );
        assert_eq!(parse_inbound(&json!({"type": CHANNEL, "msg": "NOPE"})), None);
    }
}
