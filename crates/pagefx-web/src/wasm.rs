#![forbid(unsafe_code)]

//! `wasm-bindgen` exports. Only compiled on `wasm32` targets.
//!
//! ```js
//! import init, { bootstrap, attachWave } from "./pkg/pagefx_web.js";
//! await init();
//! bootstrap({ logLevel: "debug", baseWidth: 1440 });
//! attachWave(document.querySelector("#cta"), { mode: "keep", duration: "400ms" });
//! ```

use std::fmt;
use std::rc::Rc;

use pagefx_core::config::attr;
use pagefx_core::dom::attribute_lookup;
use pagefx_core::{
    Dom, MarqueeEffect, MarqueeOptions, WaveEffect, WaveOptions, init_marquees, init_waves,
};
use serde::de::DeserializeOwned;
use tracing::level_filters::LevelFilter;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, Node};

use crate::bind::{bind_hover, bind_root_font, bind_wave, detach_all, keep_marquee};
use crate::console::{ConsoleLevel, init_logging, panic_message};
use crate::dom::WebDom;
use crate::options::BootstrapOptions;

fn console_sink(level: ConsoleLevel, line: &str) {
    let line = JsValue::from_str(line);
    match level {
        ConsoleLevel::Log => web_sys::console::log_1(&line),
        ConsoleLevel::Debug => web_sys::console::debug_1(&line),
        ConsoleLevel::Info => web_sys::console::info_1(&line),
        ConsoleLevel::Warn => web_sys::console::warn_1(&line),
        ConsoleLevel::Error => web_sys::console::error_1(&line),
    }
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let location = info.location().map(|l| (l.file(), l.line(), l.column()));
            let payload = info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
                .unwrap_or("Box<dyn Any>");
            web_sys::console::error_1(&JsValue::from_str(&panic_message(location, payload)));
        }));
    });
}

/// First caller wins; later levels are ignored.
fn ensure_logging(level: LevelFilter) {
    if init_logging(console_sink, level) {
        tracing::debug!(%level, "console logging installed");
    }
}

fn to_js(err: impl fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}

fn parse_options<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

/// Attach the wave effect to every `[w-wave]` element not yet attached.
/// Returns the number of newly attached elements.
#[wasm_bindgen(js_name = waveInit)]
pub fn wave_init() -> Result<u32, JsValue> {
    ensure_logging(LevelFilter::INFO);
    let mut dom = WebDom::from_global().map_err(to_js)?;
    let effects = init_waves(&mut dom);
    let mut bound = 0;
    for effect in effects {
        match bind_wave(&dom, effect) {
            Ok(()) => bound += 1,
            Err(err) => tracing::warn!(%err, "failed to bind wave listeners"),
        }
    }
    Ok(count(bound))
}

/// Attach the marquee effect to every `[w-marquee]` element not yet
/// attached. Returns the number of newly attached elements.
#[wasm_bindgen(js_name = marqueeInit)]
pub fn marquee_init() -> Result<u32, JsValue> {
    ensure_logging(LevelFilter::INFO);
    let mut dom = WebDom::from_global().map_err(to_js)?;
    let effects = init_marquees(&mut dom);
    let n = effects.len();
    effects.into_iter().for_each(keep_marquee);
    Ok(count(n))
}

/// Set up the whole page: both effects, hover classes and root font
/// scaling. `options` is an optional object (see `BootstrapOptions`).
#[wasm_bindgen]
pub fn bootstrap(options: JsValue) -> Result<(), JsValue> {
    let options: BootstrapOptions = parse_options(options)?;
    ensure_logging(options.max_level());

    let waves = if options.waves { wave_init()? } else { 0 };
    let marquees = if options.marquees { marquee_init()? } else { 0 };

    let dom = WebDom::from_global().map_err(to_js)?;
    let page = Rc::new(options.page);
    let hover_targets = if options.hover {
        bind_hover(&dom, &page).map_err(to_js)?
    } else {
        0
    };
    if options.root_font {
        bind_root_font(&dom, &page).map_err(to_js)?;
    }
    tracing::info!(waves, marquees, hover_targets, "pagefx ready");
    Ok(())
}

/// Attach a wave to `element`. Fields of `options` override the element's
/// `w-*` attributes; invalid values are reported as errors. Returns `false`
/// when the element already has a wave.
#[wasm_bindgen(js_name = attachWave)]
pub fn attach_wave(element: HtmlElement, options: JsValue) -> Result<bool, JsValue> {
    let mut dom = WebDom::from_global().map_err(to_js)?;
    let node: Node = element.into();
    if dom.attribute(&node, attr::WAVE_ATTACHED).is_some() {
        return Ok(false);
    }
    let markup = WaveOptions::from_attributes(attribute_lookup(&dom, &node));
    let config = parse_options::<WaveOptions>(options)?
        .or(markup)
        .try_resolve()
        .map_err(to_js)?;
    let effect = WaveEffect::attach(&mut dom, node.clone(), config).map_err(to_js)?;
    dom.set_attribute(&node, attr::WAVE_ATTACHED, "")
        .map_err(to_js)?;
    bind_wave(&dom, effect).map_err(to_js)?;
    Ok(true)
}

/// Attach a marquee to `element`, like [`attach_wave`].
#[wasm_bindgen(js_name = attachMarquee)]
pub fn attach_marquee(element: HtmlElement, options: JsValue) -> Result<bool, JsValue> {
    let mut dom = WebDom::from_global().map_err(to_js)?;
    let node: Node = element.into();
    if dom.attribute(&node, attr::MARQUEE_ATTACHED).is_some() {
        return Ok(false);
    }
    let markup = MarqueeOptions::from_attributes(attribute_lookup(&dom, &node));
    let config = parse_options::<MarqueeOptions>(options)?
        .or(markup)
        .try_resolve()
        .map_err(to_js)?;
    let effect = MarqueeEffect::attach(&mut dom, node.clone(), config).map_err(to_js)?;
    dom.set_attribute(&node, attr::MARQUEE_ATTACHED, "")
        .map_err(to_js)?;
    keep_marquee(effect);
    Ok(true)
}

/// Remove every listener and pending timer. Returns the number of
/// attachments released.
#[wasm_bindgen(js_name = detachAll)]
pub fn detach() -> u32 {
    count(detach_all())
}
