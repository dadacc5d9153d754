//! [`Document`] over the live browser DOM.

use kurbo::Rect;
use ve_editor::Document;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlImageElement, HtmlLinkElement, Node, NodeList, Window};

pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new(window: Window) -> Option<Self> {
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn dom(&self) -> &web_sys::Document {
        &self.document
    }

    fn body_style(&self) -> Option<web_sys::CssStyleDeclaration> {
        self.document.body().map(|b| b.style())
    }

    fn insert_exempt_rule(&self, selector: &str) {
        let Some(head) = self.document.head() else {
            return;
        };
        let rule = match self.document.create_element("style") {
            Ok(rule) => rule,
            Err(e) => {
                log::warn!("could not create exemption rule: {e:?}");
                return;
            }
        };
        rule.set_id(EXEMPT_STYLE_ID);
        rule.set_text_content(Some(&exempt_rule(selector)));
        if let Err(e) = head.append_child(&rule) {
            log::warn!("could not attach exemption rule: {e:?}");
        }
    }
}

/// Id of the `<style>` element that re-enables the resize handles.
const EXEMPT_STYLE_ID: &str = "ve-pointer-exempt";

/// Stylesheet rule keeping `selector` interactive under a suppressed body.
pub fn exempt_rule(selector: &str) -> String {
    format!("{selector} {{ pointer-events: auto !important; user-select: auto !important; }}")
}

/// `[name="value"]` with the value quoted for a CSS attribute selector.
pub fn attribute_selector(name: &str, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("[{name}=\"{escaped}\"]")
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

impl Document for WebDocument {
    type Node = Element;

    fn element_from_point(&self, x: f64, y: f64) -> Option<Element> {
        self.document.element_from_point(x as f32, y as f32)
    }

    fn query_attribute(&self, attribute: &str, value: &str) -> Vec<Element> {
        match self
            .document
            .query_selector_all(&attribute_selector(attribute, value))
        {
            Ok(list) => elements(list),
            Err(e) => {
                log::warn!("selector for {attribute}={value} rejected: {e:?}");
                Vec::new()
            }
        }
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        if let Err(e) = node.set_attribute(name, value) {
            log::warn!("could not set {name}: {e:?}");
        }
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn tag_name(&self, node: &Element) -> String {
        node.tag_name().to_lowercase()
    }

    fn parent_element(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn child_element_count(&self, node: &Element) -> usize {
        node.child_element_count() as usize
    }

    fn descendants(&self, node: &Element) -> Vec<Element> {
        node.query_selector_all("*").map(elements).unwrap_or_default()
    }

    fn bounding_rect(&self, node: &Element) -> Rect {
        let r = node.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }

    fn computed_style(&self, node: &Element, css_name: &str) -> String {
        self.window
            .get_computed_style(node)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(css_name).ok())
            .unwrap_or_default()
    }

    fn set_inline_style(&mut self, node: &Element, css_name: &str, value: &str, important: bool) {
        let Some(el) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let priority = if important { "important" } else { "" };
        if let Err(e) = el
            .style()
            .set_property_with_priority(css_name, value, priority)
        {
            log::warn!("could not set {css_name}: {e:?}");
        }
    }

    fn remove_inline_style(&mut self, node: &Element, css_name: &str) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.style().remove_property(css_name);
        }
    }

    fn inline_style(&self, node: &Element, css_name: &str) -> Option<String> {
        let value = node
            .dyn_ref::<HtmlElement>()?
            .style()
            .get_property_value(css_name)
            .ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn text_content(&self, node: &Element) -> String {
        match node.dyn_ref::<HtmlElement>() {
            Some(el) => el.inner_text(),
            None => node.text_content().unwrap_or_default(),
        }
    }

    fn direct_text(&self, node: &Element) -> String {
        let children = node.child_nodes();
        (0..children.length())
            .filter_map(|i| children.get(i))
            .filter(|n| n.node_type() == Node::TEXT_NODE)
            .filter_map(|n| n.text_content())
            .collect()
    }

    /// The resolved source the browser is showing, which may come from
    /// `srcset`.
    fn image_src(&self, node: &Element) -> Option<String> {
        let img = node.dyn_ref::<HtmlImageElement>()?;
        [img.current_src(), img.src()]
            .into_iter()
            .find(|src| !src.is_empty())
    }

    fn replace_image_src(&mut self, node: &Element, src: &str) {
        if let Some(img) = node.dyn_ref::<HtmlImageElement>() {
            let _ = img.remove_attribute("srcset");
            img.set_src(src);
        }
    }

    fn focus(&mut self, node: &Element) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn blur(&mut self, node: &Element) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.blur();
        }
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.window.scroll_by_with_x_and_y(dx, dy);
    }

    fn load_stylesheet(&mut self, href: &str) {
        let Some(head) = self.document.head() else {
            return;
        };
        let link = match self
            .document
            .create_element("link")
            .map(|el| el.unchecked_into::<HtmlLinkElement>())
        {
            Ok(link) => link,
            Err(e) => {
                log::warn!("could not create stylesheet link: {e:?}");
                return;
            }
        };
        link.set_rel("stylesheet");
        link.set_href(href);
        if let Err(e) = head.append_child(&link) {
            log::warn!("could not attach {href}: {e:?}");
        }
    }

    fn set_pointer_events_suppressed(&mut self, suppressed: bool, exempt_selector: &str) {
        if let Some(style) = self.body_style() {
            for property in ["pointer-events", "user-select"] {
                let _ = if suppressed {
                    style.set_property(property, "none")
                } else {
                    style.remove_property(property).map(drop)
                };
            }
        }
        if let Some(previous) = self.document.get_element_by_id(EXEMPT_STYLE_ID) {
            previous.remove();
        }
        if suppressed {
            self.insert_exempt_rule(exempt_selector);
        }
    }

    fn origin(&self) -> String {
        self.window.location().origin().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn selector_quotes_identifier() {
        assert_eq!(
            attribute_selector("data-orchids-id", "src/Foo.tsx:12:2"),
            "[data-orchids-id=\"src/Foo.tsx:12:2\"]"
        );
    }

    #[test]
    fn exempt_rule_reenables_handles() {
        assert_eq!(
            exempt_rule(".resize-handle"),
            ".resize-handle { pointer-events: auto !important; user-select: auto !important; }"
        );
    }

    #[test]
    fn selector_escapes_quotes() {
        assert_eq!(
            attribute_selector("data-x", r#"a"b\c"#),
            r#"[data-x="a\"b\\c"]"#
        );
    }
}
