//! Style normalization.
//!
//! Computed styles come back from the browser in many equivalent spellings
//! (`rgba(0, 0, 0, 0)` vs `transparent`, `0px` vs `0`). The overlay reduces
//! them to one canonical value per property so the parent frame can diff
//! snapshots, and so that writing a property's neutral value removes the
//! inline override instead of pinning a redundant `!important`.

use crate::css::{is_transparent_black, to_kebab_case};
use std::collections::BTreeMap;

/// Property name (camelCase) → value. Ordered so that serialization is
/// canonical, which the outbound deduplicator relies on.
pub type StyleMap = BTreeMap<String, String>;

/// The properties reported in a click snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    FontSize,
    Color,
    FontWeight,
    FontStyle,
    TextDecoration,
    TextAlign,
    LineHeight,
    LetterSpacing,
    PaddingLeft,
    PaddingRight,
    PaddingTop,
    PaddingBottom,
    MarginLeft,
    MarginRight,
    MarginTop,
    MarginBottom,
    BackgroundColor,
    BackgroundImage,
    BorderRadius,
    FontFamily,
    Opacity,
    Display,
    FlexDirection,
    AlignItems,
    JustifyContent,
    Gap,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 26] = [
        Self::FontSize,
        Self::Color,
        Self::FontWeight,
        Self::FontStyle,
        Self::TextDecoration,
        Self::TextAlign,
        Self::LineHeight,
        Self::LetterSpacing,
        Self::PaddingLeft,
        Self::PaddingRight,
        Self::PaddingTop,
        Self::PaddingBottom,
        Self::MarginLeft,
        Self::MarginRight,
        Self::MarginTop,
        Self::MarginBottom,
        Self::BackgroundColor,
        Self::BackgroundImage,
        Self::BorderRadius,
        Self::FontFamily,
        Self::Opacity,
        Self::Display,
        Self::FlexDirection,
        Self::AlignItems,
        Self::JustifyContent,
        Self::Gap,
    ];

    /// Name as used in patches and on the wire.
    pub fn camel_name(self) -> &'static str {
        match self {
            Self::FontSize => "fontSize",
            Self::Color => "color",
            Self::FontWeight => "fontWeight",
            Self::FontStyle => "fontStyle",
            Self::TextDecoration => "textDecoration",
            Self::TextAlign => "textAlign",
            Self::LineHeight => "lineHeight",
            Self::LetterSpacing => "letterSpacing",
            Self::PaddingLeft => "paddingLeft",
            Self::PaddingRight => "paddingRight",
            Self::PaddingTop => "paddingTop",
            Self::PaddingBottom => "paddingBottom",
            Self::MarginLeft => "marginLeft",
            Self::MarginRight => "marginRight",
            Self::MarginTop => "marginTop",
            Self::MarginBottom => "marginBottom",
            Self::BackgroundColor => "backgroundColor",
            Self::BackgroundImage => "backgroundImage",
            Self::BorderRadius => "borderRadius",
            Self::FontFamily => "fontFamily",
            Self::Opacity => "opacity",
            Self::Display => "display",
            Self::FlexDirection => "flexDirection",
            Self::AlignItems => "alignItems",
            Self::JustifyContent => "justifyContent",
            Self::Gap => "gap",
        }
    }

    /// Hyphenated CSS name, as passed to `getPropertyValue`.
    pub fn css_name(self) -> String {
        to_kebab_case(self.camel_name())
    }

    pub fn from_camel(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.camel_name() == name)
    }
}

/// Inline properties removed by a "clear inline styles" command.
pub const CLEARABLE_INLINE_STYLES: [StyleProperty; 16] = [
    StyleProperty::FontSize,
    StyleProperty::Color,
    StyleProperty::FontWeight,
    StyleProperty::FontStyle,
    StyleProperty::TextDecoration,
    StyleProperty::TextAlign,
    StyleProperty::PaddingLeft,
    StyleProperty::PaddingRight,
    StyleProperty::PaddingTop,
    StyleProperty::PaddingBottom,
    StyleProperty::MarginLeft,
    StyleProperty::MarginRight,
    StyleProperty::MarginTop,
    StyleProperty::MarginBottom,
    StyleProperty::BackgroundColor,
    StyleProperty::BackgroundImage,
];

fn is_box_spacing(name: &str) -> bool {
    name.contains("padding") || name.contains("margin")
}

/// Reduce a raw computed value to its canonical spelling.
pub fn normalize_computed(property: StyleProperty, raw: &str) -> String {
    use StyleProperty::*;

    match property {
        BackgroundColor if is_transparent_black(raw) => "transparent".into(),
        BackgroundImage if raw.is_empty() || raw == "none" => "none".into(),
        TextDecoration if raw.is_empty() || raw.contains("none") => "none".into(),
        FontStyle if raw.is_empty() || raw == "normal" => "normal".into(),
        FontWeight => match raw.trim().parse::<f64>() {
            Ok(w) if w.is_finite() => (w.trunc() as i64).to_string(),
            _ => "400".into(),
        },
        Opacity if raw.is_empty() || raw == "1" => "1".into(),
        BorderRadius if raw == "0px" || raw == "0" => "0".into(),
        LetterSpacing | Gap if raw == "normal" || raw == "0px" => "normal".into(),
        p if is_box_spacing(p.camel_name()) && (raw == "0px" || raw == "0") => "0".into(),
        _ => raw.to_string(),
    }
}

/// Whether `value` is the neutral value of `name`, i.e. the value that is
/// expressed by *removing* the inline override rather than setting it.
pub fn is_neutral(name: &str, value: &str) -> bool {
    match name {
        "backgroundColor" => is_transparent_black(value) && !value.trim().is_empty(),
        "backgroundImage" | "textDecoration" => value == "none",
        "fontStyle" => value == "normal",
        "opacity" => value == "1",
        "borderRadius" => value == "0",
        "letterSpacing" | "gap" => value == "normal",
        n if is_box_spacing(n) => value == "0",
        _ => false,
    }
}

/// One inline-style write derived from a patch entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleWrite {
    /// Drop the inline override for this CSS property.
    Remove { css_name: String },
    /// Set the property with `!important` precedence.
    Set { css_name: String, value: String },
}

/// Map a patch entry onto the DOM write that realises it.
pub fn resolve_write(name: &str, value: &str) -> StyleWrite {
    let css_name = to_kebab_case(name);
    if is_neutral(name, value) {
        return StyleWrite::Remove { css_name };
    }
    StyleWrite::Set {
        css_name,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_color_collapses_transparent() {
        for raw in ["rgba(0, 0, 0, 0)", "rgb(0, 0, 0, 0)", "transparent", ""] {
            assert_eq!(
                normalize_computed(StyleProperty::BackgroundColor, raw),
                "transparent"
            );
        }
        assert_eq!(
            normalize_computed(StyleProperty::BackgroundColor, "rgb(255, 0, 0)"),
            "rgb(255, 0, 0)"
        );
    }

    #[test]
    fn font_weight_is_integer_or_default() {
        assert_eq!(normalize_computed(StyleProperty::FontWeight, "700"), "700");
        assert_eq!(normalize_computed(StyleProperty::FontWeight, "bold"), "400");
        assert_eq!(normalize_computed(StyleProperty::FontWeight, ""), "400");
    }

    #[test]
    fn text_decoration_with_none_collapses() {
        assert_eq!(
            normalize_computed(StyleProperty::TextDecoration, "none solid rgb(0, 0, 0)"),
            "none"
        );
        assert_eq!(
            normalize_computed(StyleProperty::TextDecoration, "underline solid rgb(0, 0, 0)"),
            "underline solid rgb(0, 0, 0)"
        );
    }

    #[test]
    fn spacing_zero_collapses() {
        assert_eq!(normalize_computed(StyleProperty::PaddingTop, "0px"), "0");
        assert_eq!(normalize_computed(StyleProperty::MarginLeft, "0"), "0");
        assert_eq!(normalize_computed(StyleProperty::MarginLeft, "8px"), "8px");
        assert_eq!(normalize_computed(StyleProperty::BorderRadius, "0px"), "0");
        assert_eq!(normalize_computed(StyleProperty::Gap, "0px"), "normal");
        assert_eq!(normalize_computed(StyleProperty::LetterSpacing, "normal"), "normal");
    }

    #[test]
    fn other_properties_pass_through() {
        assert_eq!(normalize_computed(StyleProperty::FontSize, "16px"), "16px");
        assert_eq!(normalize_computed(StyleProperty::Display, "flex"), "flex");
    }

    #[test]
    fn neutral_values_resolve_to_removal() {
        assert_eq!(
            resolve_write("backgroundColor", "transparent"),
            StyleWrite::Remove {
                css_name: "background-color".into()
            }
        );
        assert_eq!(
            resolve_write("backgroundColor", "rgba(0, 0, 0, 0)"),
            StyleWrite::Remove {
                css_name: "background-color".into()
            }
        );
        assert_eq!(
            resolve_write("paddingInline", "0"),
            StyleWrite::Remove {
                css_name: "padding-inline".into()
            }
        );
    }

    #[test]
    fn non_neutral_values_resolve_to_set() {
        assert_eq!(
            resolve_write("backgroundColor", "#ff0000"),
            StyleWrite::Set {
                css_name: "background-color".into(),
                value: "#ff0000".into()
            }
        );
        assert_eq!(
            resolve_write("fontSize", "24px"),
            StyleWrite::Set {
                css_name: "font-size".into(),
                value: "24px".into()
            }
        );
    }

    #[test]
    fn property_names_roundtrip() {
        for p in StyleProperty::ALL {
            assert_eq!(StyleProperty::from_camel(p.camel_name()), Some(p));
        }
        assert_eq!(StyleProperty::JustifyContent.css_name(), "justify-content");
    }
}
