#![forbid(unsafe_code)]

//! Core: wave ripple and marquee scrolling effects for web pages.
//!
//! # Role in pagefx
//! `pagefx-core` owns every piece of effect logic that does not need a
//! browser: duration parsing, ripple geometry, the per-element wave state
//! machine, marquee track composition, keyframe registration and the page
//! bootstrap. The browser is reached only through two capability traits:
//!
//! - [`Dom`]: "create element with tag and style map", "remove all
//!   children", layout reads and the handful of other node operations the
//!   effects need.
//! - [`Scheduler`]: cancellable one-shot timers.
//!
//! `pagefx-web` implements both over `web-sys`; the [`headless`] module
//! implements both in memory so every effect can be driven
//! deterministically in tests.
//!
//! # Execution model
//! ```text
//! host event listener (mousedown, mouseenter, ...)
//!   → WaveEffect::trigger(dom, scheduler, client point)
//!   → inline styles on the ripple node, optional shrink timer
//! host timer expiry
//!   → WaveEffect::on_timer(dom, scheduler, token)
//! ```

pub mod config;
pub mod dom;
pub mod duration;
pub mod geometry;
pub mod headless;
pub mod marquee;
pub mod page;
pub mod registry;
pub mod scheduler;
pub mod style;
pub mod wave;

pub use config::{
    ConfigError, IterationCount, MarqueeConfig, MarqueeMode, MarqueeOptions, WaveConfig, WaveMode,
    WaveOptions,
};
pub use dom::{Dom, DomError, Selector};
pub use duration::{CssTime, DurationError, parse_duration};
pub use geometry::{ElementTransform, Point, Rect, Size, covering_diameter};
pub use marquee::{MarqueeEffect, MarqueeTrackSet};
pub use page::{HoverTransition, PageConfig, init_marquees, init_waves};
pub use scheduler::{Scheduler, TimerToken};
pub use style::StyleMap;
pub use wave::{RippleGeometry, WaveEffect, WavePhase};
