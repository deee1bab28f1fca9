#![forbid(unsafe_code)]

//! [`Scheduler`] over `setTimeout`, via `gloo-timers`.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use pagefx_core::{Scheduler, TimerToken};

/// Hands expired tokens to `on_fire`.
pub(crate) struct GlooScheduler {
    next: u64,
    active: HashMap<TimerToken, Timeout>,
    /// The most recently fired timeout. It is still executing when
    /// [`retire`](Self::retire) runs, so it is dropped on the next retire.
    retired: Option<Timeout>,
    on_fire: Rc<dyn Fn(TimerToken)>,
}

impl GlooScheduler {
    pub(crate) fn new(on_fire: Rc<dyn Fn(TimerToken)>) -> Self {
        Self {
            next: 0,
            active: HashMap::new(),
            retired: None,
            on_fire,
        }
    }

    /// Called from the timer callback for `token`.
    pub(crate) fn retire(&mut self, token: TimerToken) {
        if let Some(timeout) = self.active.remove(&token) {
            self.retired = Some(timeout);
        }
    }
}

impl Scheduler for GlooScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerToken {
        self.next += 1;
        let token = TimerToken::new(self.next);
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let on_fire = Rc::clone(&self.on_fire);
        let timeout = Timeout::new(millis, move || on_fire(token));
        self.active.insert(token, timeout);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        // Dropping a Timeout clears it.
        self.active.remove(&token);
    }
}

impl std::fmt::Debug for GlooScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlooScheduler")
            .field("next", &self.next)
            .field("pending", &self.active.len())
            .field("retired", &self.retired.is_some())
            .finish_non_exhaustive()
    }
}
