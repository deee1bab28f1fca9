#![forbid(unsafe_code)]

//! [`Dom`] over `web-sys`. Only compiled on `wasm32` targets.

use pagefx_core::registry::STYLE_KEY_ATTR;
use pagefx_core::{Dom, DomError, Rect, Selector, Size, StyleMap};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Document, Element, HtmlElement, Node, Window};

/// The live document.
#[derive(Debug, Clone)]
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    /// The document of the global `window`.
    pub fn from_global() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or_else(|| DomError::Host("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| DomError::Host("no document".into()))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

pub(crate) fn host_error(err: JsValue) -> DomError {
    let message = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    DomError::Host(message)
}

fn element(node: &Node) -> Result<&Element, DomError> {
    node.dyn_ref::<Element>().ok_or(DomError::NotAnElement)
}

fn inline(node: &Node) -> Result<CssStyleDeclaration, DomError> {
    node.dyn_ref::<HtmlElement>()
        .map(HtmlElement::style)
        .ok_or(DomError::NotAnElement)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn nodes(list: &web_sys::NodeList) -> Vec<Node> {
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

impl Dom for WebDom {
    type Node = Node;

    fn create_element(&mut self, tag: &str, styles: &StyleMap) -> Result<Node, DomError> {
        let node: Node = self.document.create_element(tag).map_err(host_error)?.into();
        self.assign_styles(&node, styles)?;
        Ok(node)
    }

    fn assign_styles(&mut self, node: &Node, styles: &StyleMap) -> Result<(), DomError> {
        let style = inline(node)?;
        for (property, value) in styles.iter() {
            style.set_property(property, value).map_err(host_error)?;
        }
        Ok(())
    }

    fn inline_style(&self, node: &Node, property: &str) -> Option<String> {
        inline(node)
            .ok()?
            .get_property_value(property)
            .ok()
            .and_then(non_empty)
    }

    fn computed_style(&self, node: &Node, property: &str) -> Option<String> {
        let el = element(node).ok()?;
        self.window
            .get_computed_style(el)
            .ok()
            .flatten()?
            .get_property_value(property)
            .ok()
            .and_then(non_empty)
    }

    fn child_nodes(&self, node: &Node) -> Vec<Node> {
        nodes(&node.child_nodes())
    }

    fn clone_deep(&mut self, node: &Node) -> Result<Node, DomError> {
        node.clone_node_with_deep(true).map_err(host_error)
    }

    fn append_child(&mut self, parent: &Node, child: &Node) -> Result<(), DomError> {
        parent.append_child(child).map(drop).map_err(host_error)
    }

    fn remove_all_children(&mut self, node: &Node) -> Result<(), DomError> {
        while let Some(child) = node.first_child() {
            node.remove_child(&child).map_err(host_error)?;
        }
        Ok(())
    }

    fn offset_size(&self, node: &Node) -> Size {
        node.dyn_ref::<HtmlElement>().map_or_else(Size::default, |el| {
            Size::new(f64::from(el.offset_width()), f64::from(el.offset_height()))
        })
    }

    fn client_width(&self, node: &Node) -> f64 {
        element(node).map_or(0.0, |el| f64::from(el.client_width()))
    }

    fn bounding_rect(&self, node: &Node) -> Rect {
        element(node).map_or_else(
            |_| Rect::default(),
            |el| {
                let r = el.get_bounding_client_rect();
                Rect::new(r.left(), r.top(), r.width(), r.height())
            },
        )
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        element(node).ok()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        element(node)?
            .set_attribute(name, value)
            .map_err(host_error)
    }

    fn add_class(&mut self, node: &Node, class: &str) -> Result<(), DomError> {
        element(node)?.class_list().add_1(class).map_err(host_error)
    }

    fn remove_class(&mut self, node: &Node, class: &str) -> Result<(), DomError> {
        element(node)?
            .class_list()
            .remove_1(class)
            .map_err(host_error)
    }

    fn query_all(&self, selector: &Selector) -> Vec<Node> {
        match self.document.query_selector_all(&selector.to_string()) {
            Ok(list) => nodes(&list),
            Err(err) => {
                tracing::warn!(%selector, err = %host_error(err), "selector rejected");
                Vec::new()
            }
        }
    }

    fn root(&self) -> Option<Node> {
        self.document.document_element().map(Node::from)
    }

    fn force_reflow(&self, node: &Node) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.offset_width();
        }
    }

    fn has_global_style(&self, key: &str) -> bool {
        let selector = format!("style[{STYLE_KEY_ATTR}=\"{key}\"]");
        matches!(self.document.query_selector(&selector), Ok(Some(_)))
    }

    fn insert_global_style(&mut self, key: &str, css: &str) -> Result<(), DomError> {
        let head = self.document.head().ok_or(DomError::MissingHead)?;
        let style = self.document.create_element("style").map_err(host_error)?;
        style.set_attribute(STYLE_KEY_ATTR, key).map_err(host_error)?;
        style.set_text_content(Some(css));
        head.append_child(&style).map(drop).map_err(host_error)
    }
}
