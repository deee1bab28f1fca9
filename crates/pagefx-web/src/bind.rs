#![forbid(unsafe_code)]

//! Event listeners connecting the live DOM to the effects.
//!
//! Every attached effect is kept in a thread-local list together with the
//! listeners it installed. Dropping an entry removes its listeners and
//! clears its pending timers, which is all [`detach_all`] does.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use pagefx_core::page::{HoverTransition, PageConfig, apply_hover, apply_root_font_size};
use pagefx_core::{DomError, MarqueeEffect, Point, TimerToken, WaveEffect};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, EventTarget, MouseEvent, Node, TouchEvent, TouchList};

use crate::dom::{WebDom, host_error};
use crate::pointer::PointerSample;
use crate::timers::GlooScheduler;

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// An installed event listener, removed on drop.
struct Listener {
    target: EventTarget,
    event: String,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(
        target: &EventTarget,
        event: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, DomError> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(host_error)?;
        Ok(Self {
            target: target.clone(),
            event: event.to_owned(),
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.event, self.closure.as_ref().unchecked_ref());
    }
}

enum Attachment {
    Wave {
        _state: Rc<RefCell<WaveState>>,
        _listeners: Vec<Listener>,
    },
    Marquee {
        _effect: MarqueeEffect<Node>,
    },
    Page(Vec<Listener>),
}

thread_local! {
    static ATTACHED: RefCell<Vec<Attachment>> = const { RefCell::new(Vec::new()) };
}

fn keep(attachment: Attachment) {
    ATTACHED.with(|attached| attached.borrow_mut().push(attachment));
}

/// Remove every listener and pending timer installed so far. Effect nodes
/// and attach markers stay in the document.
pub(crate) fn detach_all() -> usize {
    // Drop outside the borrow: listener removal must not re-enter ATTACHED.
    let drained = ATTACHED.with(|attached| std::mem::take(&mut *attached.borrow_mut()));
    let count = drained.len();
    drop(drained);
    tracing::debug!(count, "detached");
    count
}

// ---------------------------------------------------------------------------
// Wave
// ---------------------------------------------------------------------------

struct WaveState {
    dom: WebDom,
    effect: WaveEffect<Node>,
    scheduler: GlooScheduler,
}

fn with_wave(
    state: &RefCell<WaveState>,
    what: &'static str,
    f: impl FnOnce(&mut WaveState) -> Result<(), DomError>,
) {
    let Ok(mut guard) = state.try_borrow_mut() else {
        tracing::warn!(what, "wave busy, event dropped");
        return;
    };
    if let Err(err) = f(&mut guard) {
        tracing::warn!(%err, what, "wave update failed");
    }
}

fn on_timer(state: &RefCell<WaveState>, token: TimerToken) {
    with_wave(state, "timer", |WaveState { dom, effect, scheduler }| {
        scheduler.retire(token);
        effect.on_timer(dom, scheduler, token).map(drop)
    });
}

/// Listen for the effect's trigger (and release, in keep mode) events.
pub(crate) fn bind_wave(dom: &WebDom, effect: WaveEffect<Node>) -> Result<(), DomError> {
    let target: EventTarget = effect.element().clone().into();
    let trigger_event = effect.trigger_event().to_owned();
    let release_event = effect.release_event();

    let state = Rc::new_cyclic(|weak: &Weak<RefCell<WaveState>>| {
        let weak = weak.clone();
        let on_fire: Rc<dyn Fn(TimerToken)> = Rc::new(move |token: TimerToken| {
            if let Some(state) = weak.upgrade() {
                on_timer(&state, token);
            }
        });
        RefCell::new(WaveState {
            dom: dom.clone(),
            effect,
            scheduler: GlooScheduler::new(on_fire),
        })
    });

    let mut listeners = Vec::with_capacity(2);
    let trigger_state = Rc::clone(&state);
    listeners.push(Listener::new(&target, &trigger_event, move |event: Event| {
        let point = sample(&event).client_point();
        with_wave(&trigger_state, "trigger", |WaveState { dom, effect, scheduler }| {
            effect.trigger(dom, scheduler, point).map(drop)
        });
    })?);
    if let Some(release_event) = release_event {
        let release_state = Rc::clone(&state);
        listeners.push(Listener::new(&target, release_event, move |_: Event| {
            with_wave(&release_state, "release", |WaveState { dom, effect, scheduler }| {
                effect.release(dom, scheduler).map(drop)
            });
        })?);
    }

    tracing::debug!(event = %trigger_event, release = ?release_event, "wave bound");
    keep(Attachment::Wave {
        _state: state,
        _listeners: listeners,
    });
    Ok(())
}

fn points(list: &TouchList) -> Vec<Point> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| Point::new(f64::from(t.client_x()), f64::from(t.client_y())))
        .collect()
}

fn sample(event: &Event) -> PointerSample {
    // `TouchEvent` is not defined in every browser, so avoid `instanceof`.
    if event.type_().starts_with("touch") {
        let touch = event.unchecked_ref::<TouchEvent>();
        return PointerSample::Touch {
            touches: points(&touch.touches()),
            changed: points(&touch.changed_touches()),
        };
    }
    match event.dyn_ref::<MouseEvent>() {
        Some(mouse) => PointerSample::Mouse {
            client_x: f64::from(mouse.client_x()),
            client_y: f64::from(mouse.client_y()),
        },
        None => PointerSample::Other,
    }
}

// ---------------------------------------------------------------------------
// Marquee and page
// ---------------------------------------------------------------------------

pub(crate) fn keep_marquee(effect: MarqueeEffect<Node>) {
    keep(Attachment::Marquee { _effect: effect });
}

/// Toggle the hover classes on every target. Returns the number of targets.
pub(crate) fn bind_hover(dom: &WebDom, config: &Rc<PageConfig>) -> Result<usize, DomError> {
    let targets = pagefx_core::page::hover_targets(dom, config);
    let mut listeners = Vec::with_capacity(targets.len() * 2);
    for node in &targets {
        let target: &EventTarget = node.as_ref();
        for transition in [HoverTransition::Enter, HoverTransition::Leave] {
            let mut dom = dom.clone();
            let node = node.clone();
            let config = Rc::clone(config);
            listeners.push(Listener::new(target, transition.event(), move |_: Event| {
                if let Err(err) = apply_hover(&mut dom, &node, &config, transition) {
                    tracing::warn!(%err, "hover update failed");
                }
            })?);
        }
    }
    keep(Attachment::Page(listeners));
    Ok(targets.len())
}

/// Scale the root font size now and on every window resize.
pub(crate) fn bind_root_font(dom: &WebDom, config: &Rc<PageConfig>) -> Result<(), DomError> {
    let mut resize_dom = dom.clone();
    apply_root_font_size(&mut resize_dom, config)?;
    let config = Rc::clone(config);
    let window: &EventTarget = dom.window().as_ref();
    let listener = Listener::new(window, "resize", move |_: Event| {
        if let Err(err) = apply_root_font_size(&mut resize_dom, &config) {
            tracing::warn!(%err, "root font update failed");
        }
    })?;
    keep(Attachment::Page(vec![listener]));
    Ok(())
}
