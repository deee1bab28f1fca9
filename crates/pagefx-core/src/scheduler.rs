#![forbid(unsafe_code)]

//! One-shot, cancellable timers.
//!
//! Effects never block or sleep. They ask a [`Scheduler`] for a timer and
//! get a [`TimerToken`] back; when the host's timer expires it hands the
//! token to the effect (e.g. [`WaveEffect::on_timer`]), which acts only if
//! the token is still the one it is waiting for.
//!
//! [`WaveEffect::on_timer`]: crate::wave::WaveEffect::on_timer

use std::time::Duration;

/// Identifies one scheduled timer. Unique per scheduler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Host timer capability (`setTimeout` / `clearTimeout`).
pub trait Scheduler {
    /// Arrange for `token` to be delivered back after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerToken;

    /// Cancel a pending timer. Cancelling an expired or unknown token is a
    /// no-op.
    fn cancel(&mut self, token: TimerToken);
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn schedule(&mut self, delay: Duration) -> TimerToken {
        (**self).schedule(delay)
    }

    fn cancel(&mut self, token: TimerToken) {
        (**self).cancel(token);
    }
}
