#![forbid(unsafe_code)]

//! Marquee scrolling effect.
//!
//! [`MarqueeEffect::attach`] replaces an element's content with a clipping
//! wrapper holding two tracks, each a deep clone of the original children,
//! and animates them with shared keyframes:
//!
//! - [`MarqueeMode::Repeat`]: track A runs `translateX(0% → -100%)` while
//!   track B runs `translateX(100% → 0%)`, so B enters as A leaves.
//! - [`MarqueeMode::Return`]: track B is hidden; track A slides its `right`
//!   offset out to the element width and back, alternating each iteration.
//!
//! The keyframes are registered once per document under
//! [`KEYFRAMES_KEY`]. The return distance differs per element, so the
//! shared rule reads it from the `--w-marquee-return-right` custom property
//! that each return-mode track carries.

use crate::config::{MarqueeConfig, MarqueeMode};
use crate::dom::{Dom, DomError};
use crate::registry::{Keyframes, ensure_global_style, stylesheet};
use crate::style::{StyleMap, px};

/// Registration key of the marquee keyframes.
pub const KEYFRAMES_KEY: &str = "pagefx-marquee";

pub const REPEAT_LEAD: &str = "wMarqueeRepeat1";
pub const REPEAT_FOLLOW: &str = "wMarqueeRepeat2";
pub const RETURN: &str = "wMarqueeReturn";

/// Custom property holding the return-mode travel distance.
pub const RETURN_RIGHT_VAR: &str = "--w-marquee-return-right";

/// The three keyframe rules shared by every marquee.
#[must_use]
pub fn marquee_keyframes() -> Vec<Keyframes> {
    vec![
        Keyframes::new(REPEAT_LEAD)
            .stop(0, StyleMap::new().with("transform", "translateX(0%)"))
            .stop(100, StyleMap::new().with("transform", "translateX(-100%)")),
        Keyframes::new(REPEAT_FOLLOW)
            .stop(0, StyleMap::new().with("transform", "translateX(100%)"))
            .stop(100, StyleMap::new().with("transform", "translateX(0%)")),
        Keyframes::new(RETURN)
            .stop(0, StyleMap::new().with("right", "0px"))
            .stop(
                100,
                StyleMap::new()
                    .with("right", format!("var({RETURN_RIGHT_VAR})"))
                    .with("transform", "translateX(100%)"),
            ),
    ]
}

/// Nodes created by a marquee. Owned by the marquee element.
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeTrackSet<N> {
    pub wrapper: N,
    pub track_a: N,
    /// Hidden in [`MarqueeMode::Return`].
    pub track_b: N,
}

/// An attached marquee.
#[derive(Debug)]
pub struct MarqueeEffect<N> {
    element: N,
    tracks: MarqueeTrackSet<N>,
    config: MarqueeConfig,
    return_right: f64,
}

impl<N: Clone + PartialEq + std::fmt::Debug> MarqueeEffect<N> {
    /// Wrap `element`'s content into scrolling tracks.
    pub fn attach<D>(dom: &mut D, element: N, config: MarqueeConfig) -> Result<Self, DomError>
    where
        D: Dom<Node = N>,
    {
        ensure_global_style(dom, KEYFRAMES_KEY, || stylesheet(&marquee_keyframes()))?;

        // Measure before the content is replaced.
        let height = dom.offset_size(&element).height;
        let return_right = dom.client_width(&element);

        let wrapper = dom.create_element("div", &wrapper_styles(height))?;
        let track_a = dom.create_element("div", &track_styles(&config))?;
        let track_b = dom.create_element("div", &track_styles(&config))?;
        if config.mode == MarqueeMode::Return {
            dom.assign_styles(&track_b, &StyleMap::new().with("display", "none"))?;
        }

        for child in dom.child_nodes(&element) {
            let first = dom.clone_deep(&child)?;
            let second = dom.clone_deep(&child)?;
            dom.append_child(&track_a, &first)?;
            dom.append_child(&track_b, &second)?;
        }
        dom.append_child(&wrapper, &track_a)?;
        dom.append_child(&wrapper, &track_b)?;

        dom.remove_all_children(&element)?;
        dom.append_child(&element, &wrapper)?;

        let mut restore = StyleMap::new().with("height", px(dom.offset_size(&wrapper).height));
        if dom.inline_style(&element, "position").is_none() {
            restore.set("position", "relative");
        }
        dom.assign_styles(&element, &restore)?;

        match config.mode {
            MarqueeMode::Repeat => {
                dom.assign_styles(&track_a, &StyleMap::new().with("animation-name", REPEAT_LEAD))?;
                dom.assign_styles(
                    &track_b,
                    &StyleMap::new().with("animation-name", REPEAT_FOLLOW),
                )?;
            }
            MarqueeMode::Return => {
                dom.assign_styles(
                    &track_a,
                    &StyleMap::new()
                        .with("animation-name", RETURN)
                        .with("animation-direction", "alternate")
                        .with(RETURN_RIGHT_VAR, px(return_right)),
                )?;
            }
        }

        tracing::debug!(mode = ?config.mode, height, "marquee attached");
        Ok(Self {
            element,
            tracks: MarqueeTrackSet {
                wrapper,
                track_a,
                track_b,
            },
            config,
            return_right,
        })
    }

    #[must_use]
    pub fn element(&self) -> &N {
        &self.element
    }

    #[must_use]
    pub fn tracks(&self) -> &MarqueeTrackSet<N> {
        &self.tracks
    }

    #[must_use]
    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> MarqueeMode {
        self.config.mode
    }

    /// Width measured at attach; the return-mode end offset.
    #[must_use]
    pub fn return_right(&self) -> f64 {
        self.return_right
    }
}

fn wrapper_styles(height: f64) -> StyleMap {
    StyleMap::new()
        .with("height", px(height))
        .with("overflow", "hidden")
        .with("position", "absolute")
        .with("inset", "0")
        .with("border-radius", "inherit")
}

fn track_styles(config: &MarqueeConfig) -> StyleMap {
    StyleMap::new()
        .with("display", "flex")
        .with("position", "absolute")
        .with("animation-duration", config.duration.as_str())
        .with("animation-timing-function", config.timing_function.as_str())
        .with("animation-delay", config.delay.as_str())
        .with("animation-iteration-count", config.iteration_count.to_string())
}
