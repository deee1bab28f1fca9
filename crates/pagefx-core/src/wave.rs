#![forbid(unsafe_code)]

//! Wave ripple effect.
//!
//! A [`WaveEffect`] owns the ripple nodes of one element and the state of
//! the gesture in progress. The host calls [`WaveEffect::trigger`] when the
//! configured event fires, [`WaveEffect::release`] on the paired release
//! event, and [`WaveEffect::on_timer`] when a timer the effect scheduled
//! expires.
//!
//! # Phases
//!
//! ```text
//!            trigger                 grow timer (unkeep)
//!   Idle ─────────────▶ Growing ────────────────────────▶ Shrinking
//!     ▲                                                       │
//!     │  trigger (keep)                                       │ settle timer
//!     ├──────────────▶ Held ─── release ─────────────────────▶│
//!     └───────────────────────────────────────────────────────┘
//! ```
//!
//! A trigger in any phase other than `Idle` cancels the pending timer,
//! snaps the ripple back to zero without a transition and starts over from
//! the new origin. Timers are matched by token, so an expiry that raced a
//! re-trigger is ignored.

use crate::config::{WaveConfig, WaveMode};
use crate::dom::{Dom, DomError};
use crate::geometry::{ElementTransform, Point, Rect, Size, covering_diameter, local_point};
use crate::scheduler::{Scheduler, TimerToken};
use crate::style::{StyleMap, join_parts, px};

/// Where the ripple currently is in its gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WavePhase {
    #[default]
    Idle,
    /// Expanding towards the covering diameter.
    Growing,
    /// Fully grown, waiting for the release event.
    Held,
    /// Fading out.
    Shrinking,
}

/// Origin and size of one ripple, in the element's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleGeometry {
    pub origin: Point,
    pub diameter: f64,
}

/// Compute the ripple for a trigger at `client` (viewport coordinates).
///
/// `rect` is the element's bounding box, `size` its untransformed offset
/// size. Without a client point (keyboard or synthetic events) the ripple
/// starts at the element's center.
#[must_use]
pub fn ripple_geometry(
    rect: Rect,
    size: Size,
    client: Option<Point>,
    transform: ElementTransform,
) -> RippleGeometry {
    let origin = match client {
        Some(point) => local_point(rect, point, transform),
        None => Point::new(size.width / 2.0, size.height / 2.0),
    };
    RippleGeometry {
        origin,
        diameter: covering_diameter(size),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingTimer {
    /// Grow time elapsed; start shrinking.
    Shrink(TimerToken),
    /// Fade-out finished; back to idle.
    Settle(TimerToken),
}

impl PendingTimer {
    const fn token(self) -> TimerToken {
        match self {
            Self::Shrink(token) | Self::Settle(token) => token,
        }
    }
}

/// Ripple state for one element.
#[derive(Debug)]
pub struct WaveEffect<N> {
    element: N,
    wrapper: N,
    ripple: N,
    config: WaveConfig,
    phase: WavePhase,
    pending: Option<PendingTimer>,
    last: Option<RippleGeometry>,
}

impl<N: Clone + PartialEq + std::fmt::Debug> WaveEffect<N> {
    /// Build the ripple nodes inside `element`.
    ///
    /// Appends a clipping wrapper holding the ripple and makes the element
    /// a positioned ancestor unless it already has an inline `position`.
    pub fn attach<D>(dom: &mut D, element: N, config: WaveConfig) -> Result<Self, DomError>
    where
        D: Dom<Node = N>,
    {
        let wrapper = dom.create_element("div", &wrapper_styles())?;
        let ripple = dom.create_element("div", &ripple_styles(&config))?;
        dom.append_child(&wrapper, &ripple)?;
        dom.append_child(&element, &wrapper)?;
        if dom.inline_style(&element, "position").is_none() {
            dom.assign_styles(&element, &StyleMap::new().with("position", "relative"))?;
        }
        Ok(Self {
            element,
            wrapper,
            ripple,
            config,
            phase: WavePhase::Idle,
            pending: None,
            last: None,
        })
    }

    /// Start a ripple at `client`, or at the element center when `None`.
    pub fn trigger<D, S>(
        &mut self,
        dom: &mut D,
        scheduler: &mut S,
        client: Option<Point>,
    ) -> Result<RippleGeometry, DomError>
    where
        D: Dom<Node = N>,
        S: Scheduler + ?Sized,
    {
        tracing::debug!(event = %self.config.trigger_event, "wave triggered");

        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending.token());
        }
        if self.phase != WavePhase::Idle {
            dom.assign_styles(&self.ripple, &reset_styles())?;
            dom.force_reflow(&self.ripple);
        }

        let transform = ElementTransform::from_computed(
            dom.computed_style(&self.element, "scale").as_deref(),
            dom.computed_style(&self.element, "rotate").as_deref(),
        );
        let geometry = ripple_geometry(
            dom.bounding_rect(&self.element),
            dom.offset_size(&self.element),
            client,
            transform,
        );
        dom.assign_styles(&self.ripple, &enter_styles(&self.config, &geometry))?;
        self.last = Some(geometry);

        match self.config.mode {
            WaveMode::Unkeep => {
                let token = scheduler.schedule(self.config.grow.to_duration());
                self.pending = Some(PendingTimer::Shrink(token));
                self.phase = WavePhase::Growing;
            }
            WaveMode::Keep => self.phase = WavePhase::Held,
        }
        Ok(geometry)
    }

    /// Handle the release event. Only a held ripple reacts; returns whether
    /// the ripple started shrinking.
    pub fn release<D, S>(&mut self, dom: &mut D, scheduler: &mut S) -> Result<bool, DomError>
    where
        D: Dom<Node = N>,
        S: Scheduler + ?Sized,
    {
        if self.phase != WavePhase::Held {
            return Ok(false);
        }
        self.shrink(dom, scheduler)?;
        Ok(true)
    }

    /// Deliver an expired timer. Tokens the effect is no longer waiting for
    /// are ignored; returns whether the token was current.
    pub fn on_timer<D, S>(
        &mut self,
        dom: &mut D,
        scheduler: &mut S,
        token: TimerToken,
    ) -> Result<bool, DomError>
    where
        D: Dom<Node = N>,
        S: Scheduler + ?Sized,
    {
        match self.pending {
            Some(PendingTimer::Shrink(current)) if current == token => {
                self.pending = None;
                self.shrink(dom, scheduler)?;
                Ok(true)
            }
            Some(PendingTimer::Settle(current)) if current == token => {
                self.pending = None;
                self.phase = WavePhase::Idle;
                Ok(true)
            }
            _ => {
                tracing::trace!(token = token.get(), "ignoring stale wave timer");
                Ok(false)
            }
        }
    }

    fn shrink<D, S>(&mut self, dom: &mut D, scheduler: &mut S) -> Result<(), DomError>
    where
        D: Dom<Node = N>,
        S: Scheduler + ?Sized,
    {
        dom.assign_styles(&self.ripple, &leave_styles(&self.config))?;
        let token = scheduler.schedule(self.config.shrink.to_duration());
        self.pending = Some(PendingTimer::Settle(token));
        self.phase = WavePhase::Shrinking;
        Ok(())
    }

    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Token of the timer the effect is waiting for, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.pending.map(PendingTimer::token)
    }

    #[must_use]
    pub fn trigger_event(&self) -> &str {
        &self.config.trigger_event
    }

    /// Event that ends a held ripple, when the mode keeps ripples.
    #[must_use]
    pub fn release_event(&self) -> Option<&'static str> {
        (self.config.mode == WaveMode::Keep).then(|| self.config.release_event())
    }

    #[must_use]
    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    #[must_use]
    pub fn element(&self) -> &N {
        &self.element
    }

    #[must_use]
    pub fn wrapper(&self) -> &N {
        &self.wrapper
    }

    #[must_use]
    pub fn ripple(&self) -> &N {
        &self.ripple
    }

    /// Geometry of the most recent trigger.
    #[must_use]
    pub fn last_geometry(&self) -> Option<RippleGeometry> {
        self.last
    }
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

fn wrapper_styles() -> StyleMap {
    StyleMap::new()
        .with("overflow", "hidden")
        .with("position", "absolute")
        .with("inset", "0")
        .with("border-radius", "inherit")
}

fn grow_transition(config: &WaveConfig) -> String {
    join_parts(&["width", config.grow.as_str(), &config.timing_function])
}

fn ripple_styles(config: &WaveConfig) -> StyleMap {
    StyleMap::new()
        .with("width", "0px")
        .with("aspect-ratio", "1/1")
        .with("position", "absolute")
        .with("transform", "translate(-50%, -50%)")
        .with("border-radius", "50%")
        .with("background-color", config.color.as_str())
        .with("transition", grow_transition(config))
}

fn enter_styles(config: &WaveConfig, geometry: &RippleGeometry) -> StyleMap {
    StyleMap::new()
        .with("width", px(geometry.diameter))
        .with("top", px(geometry.origin.y))
        .with("left", px(geometry.origin.x))
        .with("opacity", "1")
        .with("transition", grow_transition(config))
}

/// Opacity fades first; width collapses only once fully transparent.
fn leave_styles(config: &WaveConfig) -> StyleMap {
    let shrink = config.shrink.as_str();
    let fade = join_parts(&["opacity", shrink, "0s", &config.timing_function]);
    let collapse = join_parts(&["width", "0s", shrink]);
    StyleMap::new()
        .with("width", "0px")
        .with("opacity", "0")
        .with("transition", format!("{fade}, {collapse}"))
}

fn reset_styles() -> StyleMap {
    StyleMap::new()
        .with("width", "0px")
        .with("opacity", "0")
        .with("transition", "none")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::CssTime;
    use crate::headless::{ManualScheduler, MemoryDom, NodeId};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn setup(config: WaveConfig) -> (MemoryDom, ManualScheduler, WaveEffect<NodeId>) {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let button = dom.append_element(body, "button");
        dom.set_layout(button, Rect::new(10.0, 20.0, 30.0, 40.0));
        let effect = WaveEffect::attach(&mut dom, button, config).unwrap();
        (dom, ManualScheduler::new(), effect)
    }

    fn ripple_style<'a>(dom: &'a MemoryDom, effect: &WaveEffect<NodeId>, prop: &str) -> &'a str {
        dom.style(*effect.ripple())
            .and_then(|s| s.get(prop))
            .unwrap_or_default()
    }

    #[test]
    fn attach_builds_wrapper_and_ripple() {
        let (dom, _, effect) = setup(WaveConfig::default());
        assert_eq!(dom.child_nodes(effect.element()), vec![*effect.wrapper()]);
        assert_eq!(dom.child_nodes(effect.wrapper()), vec![*effect.ripple()]);
        assert_eq!(
            dom.style(*effect.wrapper()).unwrap().to_string(),
            "overflow: hidden; position: absolute; inset: 0; border-radius: inherit"
        );
        assert_eq!(ripple_style(&dom, &effect, "background-color"), "#fa06");
        assert_eq!(ripple_style(&dom, &effect, "transition"), "width 250ms");
        assert_eq!(
            dom.inline_style(effect.element(), "position").as_deref(),
            Some("relative")
        );
        assert_eq!(effect.phase(), WavePhase::Idle);
    }

    #[test]
    fn attach_keeps_existing_position() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let el = dom.append_element(body, "div");
        dom.assign_styles(&el, &StyleMap::new().with("position", "absolute"))
            .unwrap();
        WaveEffect::attach(&mut dom, el, WaveConfig::default()).unwrap();
        assert_eq!(dom.inline_style(&el, "position").as_deref(), Some("absolute"));
    }

    #[test]
    fn trigger_positions_ripple_at_cursor() {
        let (mut dom, mut sched, mut effect) = setup(WaveConfig::default());
        let geometry = effect
            .trigger(&mut dom, &mut sched, Some(Point::new(15.0, 30.0)))
            .unwrap();
        assert_eq!(geometry.origin, Point::new(5.0, 10.0));
        assert_eq!(geometry.diameter, 100.0);
        assert_eq!(ripple_style(&dom, &effect, "width"), "100px");
        assert_eq!(ripple_style(&dom, &effect, "left"), "5px");
        assert_eq!(ripple_style(&dom, &effect, "top"), "10px");
        assert_eq!(ripple_style(&dom, &effect, "opacity"), "1");
        assert_eq!(effect.phase(), WavePhase::Growing);
    }

    #[test]
    fn trigger_without_point_uses_center() {
        let (mut dom, mut sched, mut effect) = setup(WaveConfig::default());
        let geometry = effect.trigger(&mut dom, &mut sched, None).unwrap();
        assert_eq!(geometry.origin, Point::new(15.0, 20.0));
    }

    #[test]
    fn trigger_corrects_for_scale() {
        let (mut dom, mut sched, mut effect) = setup(WaveConfig::default());
        dom.set_computed_style(*effect.element(), "scale", "2");
        let geometry = effect
            .trigger(&mut dom, &mut sched, Some(Point::new(30.0, 40.0)))
            .unwrap();
        assert_eq!(geometry.origin, Point::new(10.0, 10.0));
    }

    #[test]
    fn unkeep_shrinks_after_grow_duration() {
        let (mut dom, mut sched, mut effect) = setup(WaveConfig::default());
        effect.trigger(&mut dom, &mut sched, None).unwrap();
        let token = effect.pending_timer().unwrap();
        assert_eq!(sched.due_at(token), Some(Duration::from_millis(250)));

        assert_eq!(sched.advance(Duration::from_millis(250)), vec![token]);
        assert!(effect.on_timer(&mut dom, &mut sched, token).unwrap());
        assert_eq!(effect.phase(), WavePhase::Shrinking);
        assert_eq!(ripple_style(&dom, &effect, "opacity"), "0");
        assert_eq!(
            ripple_style(&dom, &effect, "transition"),
            "opacity 250ms 0s, width 0s 250ms"
        );

        let settle = sched.advance(Duration::from_millis(250));
        assert_eq!(settle.len(), 1);
        effect.on_timer(&mut dom, &mut sched, settle[0]).unwrap();
        assert_eq!(effect.phase(), WavePhase::Idle);
        assert_eq!(effect.pending_timer(), None);
    }

    #[test]
    fn leave_transition_includes_timing_function() {
        let config = WaveConfig {
            timing_function: "ease-in".into(),
            shrink: CssTime::from_millis(400),
            ..WaveConfig::default()
        };
        let (mut dom, mut sched, mut effect) = setup(config);
        effect.trigger(&mut dom, &mut sched, None).unwrap();
        let token = effect.pending_timer().unwrap();
        effect.on_timer(&mut dom, &mut sched, token).unwrap();
        assert_eq!(
            ripple_style(&dom, &effect, "transition"),
            "opacity 400ms 0s ease-in, width 0s 400ms"
        );
    }

    #[test]
    fn retrigger_resets_and_cancels() {
        let (mut dom, mut sched, mut effect) = setup(WaveConfig::default());
        effect.trigger(&mut dom, &mut sched, None).unwrap();
        let stale = effect.pending_timer().unwrap();
        let writes = dom.style_writes(*effect.ripple());

        sched.advance(Duration::from_millis(100));
        effect.trigger(&mut dom, &mut sched, None).unwrap();
        // reset + enter
        assert_eq!(dom.style_writes(*effect.ripple()), writes + 2);
        assert!(!sched.is_pending(stale));
        assert_ne!(effect.pending_timer(), Some(stale));

        let writes = dom.style_writes(*effect.ripple());
        assert!(!effect.on_timer(&mut dom, &mut sched, stale).unwrap());
        assert_eq!(dom.style_writes(*effect.ripple()), writes);
        assert_eq!(effect.phase(), WavePhase::Growing);
    }

    #[test]
    fn first_trigger_does_not_reset() {
        let (mut dom, mut sched, mut effect) = setup(WaveConfig::default());
        let writes = dom.style_writes(*effect.ripple());
        effect.trigger(&mut dom, &mut sched, None).unwrap();
        assert_eq!(dom.style_writes(*effect.ripple()), writes + 1);
    }

    #[test]
    fn keep_holds_until_release() {
        let config = WaveConfig {
            mode: WaveMode::Keep,
            ..WaveConfig::default()
        };
        let (mut dom, mut sched, mut effect) = setup(config);
        assert_eq!(effect.release_event(), Some("mouseup"));
        effect.trigger(&mut dom, &mut sched, None).unwrap();
        assert_eq!(effect.phase(), WavePhase::Held);
        assert_eq!(effect.pending_timer(), None);
        assert!(sched.advance(Duration::from_secs(60)).is_empty());
        assert_eq!(ripple_style(&dom, &effect, "opacity"), "1");

        assert!(effect.release(&mut dom, &mut sched).unwrap());
        assert_eq!(effect.phase(), WavePhase::Shrinking);
        assert_eq!(ripple_style(&dom, &effect, "opacity"), "0");
        assert!(!effect.release(&mut dom, &mut sched).unwrap());
    }

    #[test]
    fn release_ignored_in_unkeep_mode() {
        let (mut dom, mut sched, mut effect) = setup(WaveConfig::default());
        assert_eq!(effect.release_event(), None);
        effect.trigger(&mut dom, &mut sched, None).unwrap();
        assert!(!effect.release(&mut dom, &mut sched).unwrap());
        assert_eq!(effect.phase(), WavePhase::Growing);
    }
}
