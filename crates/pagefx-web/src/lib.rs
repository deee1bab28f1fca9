#![forbid(unsafe_code)]

//! Browser frontend for pagefx.
//!
//! Implements the core's `Dom` capability over `web-sys` and its
//! `Scheduler` over `gloo-timers`, wires DOM event listeners to the wave
//! state machines and exports a small `wasm-bindgen` API:
//!
//! | Export | Does |
//! |---|---|
//! | `waveInit()` | attach waves to `[w-wave]` elements |
//! | `marqueeInit()` | attach marquees to `[w-marquee]` elements |
//! | `bootstrap(options?)` | both of the above, hover classes, root font scaling |
//! | `attachWave(el, options?)` | programmatic wave |
//! | `attachMarquee(el, options?)` | programmatic marquee |
//! | `detachAll()` | drop every listener and pending timer |
//!
//! The console, pointer and options modules are plain Rust and are tested
//! natively; everything touching the browser is compiled on `wasm32` only.

pub mod console;
pub mod options;
pub mod pointer;

#[cfg(target_arch = "wasm32")]
mod bind;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod timers;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
#[cfg(target_arch = "wasm32")]
pub use wasm::{attach_marquee, attach_wave, bootstrap, detach, marquee_init, wave_init};
