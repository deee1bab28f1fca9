#![forbid(unsafe_code)]

//! End-to-end wave scenarios over the headless DOM and virtual clock.
//!
//! Elements are configured through markup attributes and attached by the
//! page bootstrap, then driven the way the web binding drives them: the
//! trigger event calls `trigger`, each expired timer token goes to
//! `on_timer`, the release event calls `release`.
//!
//! Run: `cargo test -p pagefx-core --test wave_lifecycle`

use std::time::Duration;

use pagefx_core::headless::{ManualScheduler, MemoryDom, NodeId};
use pagefx_core::{Dom, Point, Rect, WaveEffect, WaveMode, WavePhase, init_waves};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

struct Harness {
    dom: MemoryDom,
    clock: ManualScheduler,
    effect: WaveEffect<NodeId>,
}

impl Harness {
    fn new(attrs: &[(&str, &str)]) -> Self {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let button = dom.append_element(body, "button");
        dom.set_attribute(&button, "w-wave", "").unwrap();
        for (name, value) in attrs {
            dom.set_attribute(&button, name, value).unwrap();
        }
        dom.set_layout(button, Rect::new(100.0, 50.0, 30.0, 40.0));
        let mut effects = init_waves(&mut dom);
        assert_eq!(effects.len(), 1);
        Self {
            dom,
            clock: ManualScheduler::new(),
            effect: effects.remove(0),
        }
    }

    fn trigger_at(&mut self, x: f64, y: f64) {
        self.effect
            .trigger(&mut self.dom, &mut self.clock, Some(Point::new(x, y)))
            .unwrap();
    }

    /// Advance the clock and deliver every expired token, like the host's
    /// timer callbacks would.
    fn advance(&mut self, by: Duration) {
        for token in self.clock.advance(by) {
            self.effect
                .on_timer(&mut self.dom, &mut self.clock, token)
                .unwrap();
        }
    }

    fn ripple(&self, prop: &str) -> String {
        self.dom
            .inline_style(self.effect.ripple(), prop)
            .unwrap_or_default()
    }
}

#[test]
fn unkeep_grows_then_shrinks_after_duration() {
    let mut h = Harness::new(&[("w-mode", "unkeep"), ("w-duration", "100ms")]);
    assert_eq!(h.effect.trigger_event(), "mousedown");

    h.trigger_at(110.0, 70.0);
    assert_eq!(h.effect.phase(), WavePhase::Growing);
    assert_eq!(h.ripple("left"), "10px");
    assert_eq!(h.ripple("top"), "20px");
    assert_eq!(h.ripple("width"), "100px");
    assert_eq!(h.ripple("opacity"), "1");
    assert_eq!(h.ripple("transition"), "width 100ms");

    h.advance(ms(99));
    assert_eq!(h.effect.phase(), WavePhase::Growing);
    assert_eq!(h.ripple("opacity"), "1");

    h.advance(ms(1));
    assert_eq!(h.effect.phase(), WavePhase::Shrinking);
    assert_eq!(h.ripple("opacity"), "0");
    assert_eq!(h.ripple("width"), "0px");
    assert_eq!(h.ripple("transition"), "opacity 250ms 0s, width 0s 250ms");

    h.advance(ms(250));
    assert_eq!(h.effect.phase(), WavePhase::Idle);
    assert_eq!(h.clock.pending_count(), 0);
}

#[test]
fn retrigger_wins_over_stale_shrink() {
    let mut h = Harness::new(&[("w-duration", "100ms")]);
    h.trigger_at(110.0, 70.0);
    let first = h.effect.pending_timer().unwrap();

    h.advance(ms(60));
    h.trigger_at(120.0, 60.0);
    assert!(!h.clock.is_pending(first));
    assert_eq!(h.ripple("left"), "20px");
    assert_eq!(h.ripple("top"), "10px");

    // The first gesture's deadline passes without a shrink.
    h.advance(ms(40));
    assert_eq!(h.effect.phase(), WavePhase::Growing);
    assert_eq!(h.ripple("opacity"), "1");

    // The second gesture shrinks 100ms after its own trigger.
    h.advance(ms(60));
    assert_eq!(h.effect.phase(), WavePhase::Shrinking);
}

#[test]
fn retrigger_while_shrinking_restarts_growth() {
    let mut h = Harness::new(&[("w-duration", "100ms"), ("w-fadeout-duration", "300ms")]);
    h.trigger_at(110.0, 70.0);
    h.advance(ms(100));
    assert_eq!(h.effect.phase(), WavePhase::Shrinking);

    h.advance(ms(50));
    h.trigger_at(110.0, 70.0);
    assert_eq!(h.effect.phase(), WavePhase::Growing);
    assert_eq!(h.ripple("transition"), "width 100ms");
    assert_eq!(h.clock.pending_count(), 1);

    // The settle timer of the first gesture is gone; nothing flips to Idle.
    h.advance(ms(99));
    assert_eq!(h.effect.phase(), WavePhase::Growing);
}

#[test]
fn keep_never_shrinks_without_release() {
    let mut h = Harness::new(&[("w-mode", "keep"), ("w-event", "mouseenter")]);
    assert_eq!(h.effect.config().mode, WaveMode::Keep);
    assert_eq!(h.effect.release_event(), Some("mouseleave"));

    h.trigger_at(115.0, 70.0);
    assert_eq!(h.effect.phase(), WavePhase::Held);
    h.advance(Duration::from_secs(30));
    assert_eq!(h.effect.phase(), WavePhase::Held);
    assert_eq!(h.ripple("opacity"), "1");

    assert!(h.effect.release(&mut h.dom, &mut h.clock).unwrap());
    assert_eq!(h.effect.phase(), WavePhase::Shrinking);
    h.advance(ms(250));
    assert_eq!(h.effect.phase(), WavePhase::Idle);
}

#[test]
fn invalid_duration_attribute_falls_back() {
    let mut h = Harness::new(&[("w-duration", "fast")]);
    assert_eq!(h.effect.config().grow.as_str(), "250ms");
    h.trigger_at(110.0, 70.0);
    let token = h.effect.pending_timer().unwrap();
    assert_eq!(h.clock.due_at(token), Some(ms(250)));
}

#[test]
fn custom_color_and_easing_reach_the_ripple() {
    let mut h = Harness::new(&[
        ("w-background", "rgb(0, 128, 255)"),
        ("w-timing-function", "ease-out"),
        ("w-duration", "0.4s"),
    ]);
    assert_eq!(h.ripple("background-color"), "rgb(0, 128, 255)");
    h.trigger_at(110.0, 70.0);
    assert_eq!(h.ripple("transition"), "width 0.4s ease-out");
    assert_eq!(h.clock.due_at(h.effect.pending_timer().unwrap()), Some(ms(400)));
}
