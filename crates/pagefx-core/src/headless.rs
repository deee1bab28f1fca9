#![forbid(unsafe_code)]

//! Headless DOM and timers for tests and non-browser hosts.
//!
//! [`MemoryDom`] is a small arena document that implements [`Dom`]: it keeps
//! tags, attributes, classes and inline styles, and reports whatever layout
//! the caller assigns with [`MemoryDom::set_layout`]. Elements without an
//! assigned layout derive their offset size from inline `width` / `height`
//! pixel values, so freshly created wrappers measure like they would in a
//! browser.
//!
//! [`ManualScheduler`] implements [`Scheduler`] over a virtual clock that
//! only moves when [`ManualScheduler::advance`] is called.
//!
//! # Example
//!
//! ```
//! use pagefx_core::headless::MemoryDom;
//! use pagefx_core::{Dom, Selector, StyleMap};
//!
//! let mut dom = MemoryDom::new();
//! let body = dom.body();
//! let el = dom.create_element("div", &StyleMap::new()).unwrap();
//! dom.set_attribute(&el, "w-wave", "").unwrap();
//! dom.append_child(&body, &el).unwrap();
//! assert_eq!(dom.query_all(&Selector::attribute("w-wave")), vec![el]);
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use crate::dom::{Dom, DomError, Selector};
use crate::geometry::{Rect, Size};
use crate::registry::STYLE_KEY_ATTR;
use crate::scheduler::{Scheduler, TimerToken};
use crate::style::{StyleMap, parse_px};

/// Handle to a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    style: StyleMap,
    computed: StyleMap,
    layout: Option<Rect>,
    client_width: Option<f64>,
    style_writes: usize,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document implementing [`Dom`].
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    html: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document: `<html><head></head><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            html: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
        };
        dom.html = dom.alloc_element("html");
        dom.head = dom.alloc_element("head");
        dom.body = dom.alloc_element("body");
        dom.attach(dom.html, dom.head);
        dom.attach(dom.html, dom.body);
        dom
    }

    #[must_use]
    pub fn document_element(&self) -> NodeId {
        self.html
    }

    #[must_use]
    pub fn head(&self) -> NodeId {
        self.head
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_owned()))
    }

    /// Create an element under `parent` and return it.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a text node.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.alloc_element(tag);
        assert!(self.element(parent).is_some(), "parent must be an element");
        self.attach(parent, id);
        id
    }

    /// Create a text node under `parent` and return it.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.attach(parent, id);
        id
    }

    /// Assign the box `getBoundingClientRect` reports. `offsetWidth` /
    /// `offsetHeight` and `clientWidth` follow its size unless overridden.
    pub fn set_layout(&mut self, node: NodeId, rect: Rect) {
        if let Some(el) = self.element_mut(node) {
            el.layout = Some(rect);
        }
    }

    /// Override `clientWidth` (e.g. to model a border).
    pub fn set_client_width(&mut self, node: NodeId, width: f64) {
        if let Some(el) = self.element_mut(node) {
            el.client_width = Some(width);
        }
    }

    /// Set a value `getComputedStyle` would report.
    pub fn set_computed_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.computed.set(property, value);
        }
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    /// Inline style map of an element.
    #[must_use]
    pub fn style(&self, node: NodeId) -> Option<&StyleMap> {
        self.element(node).map(|el| &el.style)
    }

    /// Number of [`Dom::assign_styles`] calls that touched `node`.
    #[must_use]
    pub fn style_writes(&self, node: NodeId) -> usize {
        self.element(node).map_or(0, |el| el.style_writes)
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Whether `node` is reachable from the document element.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == self.html {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// Registered global styles as `(key, css)`, in insertion order.
    pub fn global_styles(&self) -> impl Iterator<Item = (&str, String)> {
        self.nodes[self.head.0].children.iter().filter_map(|&id| {
            let el = self.element(id)?;
            let key = el
                .attributes
                .iter()
                .find(|(k, _)| k == STYLE_KEY_ATTR)
                .map(|(_, v)| v.as_str())?;
            Some((key, self.text_content(id)))
        })
    }

    /// Serialize `node` as HTML (attributes, classes and inline style).
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    // -- internals ----------------------------------------------------------

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn alloc_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        }))
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    fn checked_element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode)?.kind {
            NodeKind::Element(el) => Ok(el),
            NodeKind::Text(_) => Err(DomError::NotAnElement),
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    fn clone_subtree(&mut self, node: NodeId) -> NodeId {
        let kind = match &self.nodes[node.0].kind {
            NodeKind::Element(el) => NodeKind::Element(ElementData {
                tag: el.tag.clone(),
                attributes: el.attributes.clone(),
                classes: el.classes.clone(),
                style: el.style.clone(),
                ..ElementData::default()
            }),
            NodeKind::Text(text) => NodeKind::Text(text.clone()),
        };
        let copy = self.alloc(kind);
        let children = self.nodes[node.0].children.clone();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.attach(copy, child_copy);
        }
        copy
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        if let NodeKind::Text(text) = &data.kind {
            out.push_str(text);
        }
        for &child in &data.children {
            self.collect_text(child, out);
        }
    }

    fn walk(&self, node: NodeId, visit: &mut impl FnMut(NodeId)) {
        visit(node);
        for &child in &self.nodes[node.0].children {
            self.walk(child, visit);
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let data = &self.nodes[node.0];
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(el) => {
                let _ = write!(out, "<{}", el.tag);
                for (k, v) in &el.attributes {
                    if v.is_empty() {
                        let _ = write!(out, " {k}");
                    } else {
                        let _ = write!(out, " {k}=\"{v}\"");
                    }
                }
                if !el.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", el.classes.join(" "));
                }
                if !el.style.is_empty() {
                    let _ = write!(out, " style=\"{}\"", el.style);
                }
                out.push('>');
                for &child in &data.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }

    fn size_of(&self, el: &ElementData) -> Size {
        if let Some(rect) = el.layout {
            return rect.size();
        }
        Size::new(
            el.style.get("width").and_then(parse_px).unwrap_or(0.0),
            el.style.get("height").and_then(parse_px).unwrap_or(0.0),
        )
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str, styles: &StyleMap) -> Result<NodeId, DomError> {
        let id = self.alloc_element(tag);
        self.assign_styles(&id, styles)?;
        Ok(id)
    }

    fn assign_styles(&mut self, node: &NodeId, styles: &StyleMap) -> Result<(), DomError> {
        let el = self.checked_element_mut(*node)?;
        el.style.extend_from(styles);
        el.style_writes += 1;
        Ok(())
    }

    fn inline_style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.element(*node)?
            .style
            .get(property)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    fn computed_style(&self, node: &NodeId, property: &str) -> Option<String> {
        let el = self.element(*node)?;
        el.computed
            .get(property)
            .or_else(|| el.style.get(property))
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn clone_deep(&mut self, node: &NodeId) -> Result<NodeId, DomError> {
        if node.0 >= self.nodes.len() {
            return Err(DomError::UnknownNode);
        }
        Ok(self.clone_subtree(*node))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return Err(DomError::UnknownNode);
        }
        if self.element(*parent).is_none() {
            return Err(DomError::NotAnElement);
        }
        if self.is_ancestor_or_self(*child, *parent) {
            return Err(DomError::Host("HierarchyRequestError".to_owned()));
        }
        self.attach(*parent, *child);
        Ok(())
    }

    fn remove_all_children(&mut self, node: &NodeId) -> Result<(), DomError> {
        let children = std::mem::take(
            &mut self
                .nodes
                .get_mut(node.0)
                .ok_or(DomError::UnknownNode)?
                .children,
        );
        for child in children {
            self.nodes[child.0].parent = None;
        }
        Ok(())
    }

    fn offset_size(&self, node: &NodeId) -> Size {
        self.element(*node)
            .map_or_else(Size::default, |el| self.size_of(el))
    }

    fn client_width(&self, node: &NodeId) -> f64 {
        self.element(*node).map_or(0.0, |el| {
            el.client_width.unwrap_or_else(|| self.size_of(el).width)
        })
    }

    fn bounding_rect(&self, node: &NodeId) -> Rect {
        self.element(*node).map_or_else(Rect::default, |el| {
            el.layout.unwrap_or_else(|| {
                let size = self.size_of(el);
                Rect::new(0.0, 0.0, size.width, size.height)
            })
        })
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.element(*node)?
            .attributes
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.checked_element_mut(*node)?;
        let name = name.to_ascii_lowercase();
        match el.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value.to_owned(),
            None => el.attributes.push((name, value.to_owned())),
        }
        Ok(())
    }

    fn add_class(&mut self, node: &NodeId, class: &str) -> Result<(), DomError> {
        let el = self.checked_element_mut(*node)?;
        if !el.classes.iter().any(|c| c == class) {
            el.classes.push(class.to_owned());
        }
        Ok(())
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) -> Result<(), DomError> {
        let el = self.checked_element_mut(*node)?;
        el.classes.retain(|c| c != class);
        Ok(())
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(self.html, &mut |id| {
            let Some(el) = self.element(id) else {
                return;
            };
            let hit = match selector {
                Selector::Attribute(name) => {
                    let name = name.to_ascii_lowercase();
                    el.attributes.iter().any(|(k, _)| *k == name)
                }
                Selector::Class(class) => el.classes.iter().any(|c| c == class),
            };
            if hit {
                found.push(id);
            }
        });
        found
    }

    fn root(&self) -> Option<NodeId> {
        Some(self.html)
    }

    fn has_global_style(&self, key: &str) -> bool {
        self.global_styles().any(|(k, _)| k == key)
    }

    fn insert_global_style(&mut self, key: &str, css: &str) -> Result<(), DomError> {
        let style = self.append_element(self.head, "style");
        self.set_attribute(&style, STYLE_KEY_ATTR, key)?;
        self.append_text(style, css);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

/// Virtual-clock [`Scheduler`]. Time only moves on [`advance`](Self::advance).
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_token: u64,
    pending: BTreeMap<TimerToken, Duration>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.contains_key(&token)
    }

    /// Due time of a pending timer.
    #[must_use]
    pub fn due_at(&self, token: TimerToken) -> Option<Duration> {
        self.pending.get(&token).copied()
    }

    /// Move the clock forward by `by` and return the timers that expired,
    /// ordered by due time (ties by scheduling order).
    pub fn advance(&mut self, by: Duration) -> Vec<TimerToken> {
        self.now += by;
        let now = self.now;
        let mut fired: Vec<(Duration, TimerToken)> = self
            .pending
            .iter()
            .filter(|&(_, &due)| due <= now)
            .map(|(&token, &due)| (due, token))
            .collect();
        fired.sort();
        for (_, token) in &fired {
            self.pending.remove(token);
        }
        fired.into_iter().map(|(_, token)| token).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken::new(self.next_token);
        self.pending.insert(token, self.now + delay);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.pending.remove(&token);
    }
}
