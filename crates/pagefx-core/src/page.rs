#![forbid(unsafe_code)]

//! Page bootstrap: scan the document for marked elements and attach the
//! effects, plus the page's button hover classes and root font scaling.
//!
//! Attaching stamps each element with a marker attribute
//! ([`attr::WAVE_ATTACHED`] / [`attr::MARQUEE_ATTACHED`]); later init passes
//! skip stamped elements, so running init twice never re-wraps a marquee
//! or binds a second ripple.

use crate::config::{MarqueeConfig, WaveConfig, attr};
use crate::dom::{Dom, DomError, Selector, attribute_lookup};
use crate::marquee::MarqueeEffect;
use crate::style::{StyleMap, px};
use crate::wave::WaveEffect;

/// Page-level settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct PageConfig {
    /// Layout width at which the root font size equals `base_font_size_px`.
    pub base_width: f64,
    pub base_font_size_px: f64,
    /// Classes whose elements get hover enter/leave classes.
    pub hover_classes: Vec<String>,
    pub enter_class: String,
    pub leave_class: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            base_width: 1440.0,
            base_font_size_px: 16.0,
            hover_classes: vec!["c-btn-dialog".to_owned(), "c-btn".to_owned()],
            enter_class: "enter".to_owned(),
            leave_class: "leave".to_owned(),
        }
    }
}

impl PageConfig {
    /// Root font size for a document element `html_width` pixels wide.
    #[must_use]
    pub fn root_font_size_px(&self, html_width: f64) -> f64 {
        if self.base_width > 0.0 && html_width.is_finite() {
            self.base_font_size_px * html_width / self.base_width
        } else {
            self.base_font_size_px
        }
    }
}

/// Scale the document element's font size to its current width.
pub fn apply_root_font_size<D: Dom>(dom: &mut D, config: &PageConfig) -> Result<f64, DomError> {
    let root = dom.root().ok_or(DomError::NotAnElement)?;
    let size = config.root_font_size_px(dom.offset_size(&root).width);
    dom.assign_styles(&root, &StyleMap::new().with("font-size", px(size)))?;
    Ok(size)
}

/// Pointer crossing a hover target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverTransition {
    Enter,
    Leave,
}

impl HoverTransition {
    /// `mouseenter` / `mouseleave`.
    #[must_use]
    pub fn from_event(event: &str) -> Option<Self> {
        match event {
            "mouseenter" => Some(Self::Enter),
            "mouseleave" => Some(Self::Leave),
            _ => None,
        }
    }

    #[must_use]
    pub const fn event(self) -> &'static str {
        match self {
            Self::Enter => "mouseenter",
            Self::Leave => "mouseleave",
        }
    }
}

/// Swap the enter/leave classes on `node`.
pub fn apply_hover<D: Dom>(
    dom: &mut D,
    node: &D::Node,
    config: &PageConfig,
    transition: HoverTransition,
) -> Result<(), DomError> {
    let (remove, add) = match transition {
        HoverTransition::Enter => (&config.leave_class, &config.enter_class),
        HoverTransition::Leave => (&config.enter_class, &config.leave_class),
    };
    dom.remove_class(node, remove)?;
    dom.add_class(node, add)
}

/// Elements that get hover classes, in selector order, without duplicates.
pub fn hover_targets<D: Dom>(dom: &D, config: &PageConfig) -> Vec<D::Node> {
    let mut targets: Vec<D::Node> = Vec::new();
    for class in &config.hover_classes {
        for node in dom.query_all(&Selector::class(class.as_str())) {
            if !targets.contains(&node) {
                targets.push(node);
            }
        }
    }
    targets
}

/// Attach a wave to every unprocessed `[w-wave]` element.
///
/// An element that fails to attach is logged and skipped.
pub fn init_waves<D: Dom>(dom: &mut D) -> Vec<WaveEffect<D::Node>> {
    let mut effects = Vec::new();
    for element in pending(dom, attr::WAVE, attr::WAVE_ATTACHED) {
        let config = WaveConfig::from_attributes(attribute_lookup(&*dom, &element));
        let attached = WaveEffect::attach(dom, element.clone(), config)
            .and_then(|effect| stamp(dom, &element, attr::WAVE_ATTACHED).map(|()| effect));
        match attached {
            Ok(effect) => effects.push(effect),
            Err(err) => tracing::warn!(%err, ?element, "failed to attach wave"),
        }
    }
    tracing::debug!(count = effects.len(), "wave init");
    effects
}

/// Attach a marquee to every unprocessed `[w-marquee]` element.
pub fn init_marquees<D: Dom>(dom: &mut D) -> Vec<MarqueeEffect<D::Node>> {
    let mut effects = Vec::new();
    for element in pending(dom, attr::MARQUEE, attr::MARQUEE_ATTACHED) {
        let config = MarqueeConfig::from_attributes(attribute_lookup(&*dom, &element));
        let attached = MarqueeEffect::attach(dom, element.clone(), config)
            .and_then(|effect| stamp(dom, &element, attr::MARQUEE_ATTACHED).map(|()| effect));
        match attached {
            Ok(effect) => effects.push(effect),
            Err(err) => tracing::warn!(%err, ?element, "failed to attach marquee"),
        }
    }
    tracing::debug!(count = effects.len(), "marquee init");
    effects
}

fn pending<D: Dom>(dom: &D, marker: &str, attached: &str) -> Vec<D::Node> {
    dom.query_all(&Selector::attribute(marker))
        .into_iter()
        .filter(|node| {
            let done = dom.attribute(node, attached).is_some();
            if done {
                tracing::trace!(?node, marker, "already attached, skipping");
            }
            !done
        })
        .collect()
}

fn stamp<D: Dom>(dom: &mut D, node: &D::Node, name: &str) -> Result<(), DomError> {
    dom.set_attribute(node, name, "")
}
