#![forbid(unsafe_code)]

//! The DOM capability the effects are written against.
//!
//! The effects need a small, explicit slice of the DOM: create an element
//! with a tag and a style map, restyle it, move nodes around, read layout
//! boxes and computed transforms, and keep one global `<style>` block per
//! key. [`Dom`] names exactly that slice. `pagefx-web` implements it over
//! `web-sys`; [`crate::headless::MemoryDom`] implements it in memory.

use std::fmt;

use crate::geometry::{Rect, Size};
use crate::style::StyleMap;

/// Errors surfaced by a [`Dom`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node is not an element (e.g. a text node) but the operation
    /// needs one.
    NotAnElement,
    /// The document has no `<head>` to hold global styles.
    MissingHead,
    /// The node handle does not belong to this document.
    UnknownNode,
    /// A host call failed; carries the host's message.
    Host(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnElement => write!(f, "node is not an element"),
            Self::MissingHead => write!(f, "document has no <head>"),
            Self::UnknownNode => write!(f, "node does not belong to this document"),
            Self::Host(msg) => write!(f, "host DOM error: {msg}"),
        }
    }
}

impl std::error::Error for DomError {}

/// The two selector shapes the page bootstrap needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `[name]`
    Attribute(String),
    /// `.name`
    Class(String),
}

impl Selector {
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => write!(f, "[{name}]"),
            Self::Class(name) => write!(f, ".{name}"),
        }
    }
}

/// DOM operations used by the effects.
///
/// Reads take `&self`; anything that mutates the tree or styles takes
/// `&mut self`. Node handles are cheap to clone.
pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug;

    /// Create a detached element with `tag` and inline `styles`.
    fn create_element(&mut self, tag: &str, styles: &StyleMap) -> Result<Self::Node, DomError>;

    /// Write every entry of `styles` to the node's inline style.
    fn assign_styles(&mut self, node: &Self::Node, styles: &StyleMap) -> Result<(), DomError>;

    /// Inline style value, `None` when unset or empty.
    fn inline_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Computed style value, `None` when unavailable or empty.
    fn computed_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Direct children, text nodes included, in document order.
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Deep clone; the clone is detached.
    fn clone_deep(&mut self, node: &Self::Node) -> Result<Self::Node, DomError>;

    /// Append `child` to `parent`, moving it if it is already attached.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    /// Detach every child of `node`.
    fn remove_all_children(&mut self, node: &Self::Node) -> Result<(), DomError>;

    /// `offsetWidth` / `offsetHeight`.
    fn offset_size(&self, node: &Self::Node) -> Size;

    /// `clientWidth`.
    fn client_width(&self, node: &Self::Node) -> f64;

    /// `getBoundingClientRect()`.
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// Attribute value, `None` when absent.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str)
    -> Result<(), DomError>;

    fn add_class(&mut self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    fn remove_class(&mut self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    /// Every element matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<Self::Node>;

    /// The document element (`<html>`).
    fn root(&self) -> Option<Self::Node>;

    /// Flush pending style changes so the next write starts a new transition.
    fn force_reflow(&self, node: &Self::Node) {
        let _ = self.offset_size(node);
    }

    /// Whether a global style block was registered under `key`.
    fn has_global_style(&self, key: &str) -> bool;

    /// Append a global `<style>` block to `<head>`, tagged with `key`.
    fn insert_global_style(&mut self, key: &str, css: &str) -> Result<(), DomError>;
}

/// Attribute lookup for `node`, with empty values treated as unset.
pub fn attribute_lookup<'a, D: Dom>(
    dom: &'a D,
    node: &'a D::Node,
) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| dom.attribute(node, name).filter(|v| !v.is_empty())
}
