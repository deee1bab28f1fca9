#![forbid(unsafe_code)]

//! Effect configuration read from markup attributes or options objects.
//!
//! Both effects are configured the same way: a partial options struct
//! (every field optional, as it comes out of `getAttribute` or a JS object)
//! is resolved against the defaults. Missing and empty values mean "unset".
//! [`WaveOptions::resolve`] / [`MarqueeOptions::resolve`] are lenient:
//! invalid values are logged and replaced by the default. The `try_resolve`
//! variants report the first invalid value instead.

use std::fmt;
use std::str::FromStr;

use crate::duration::{CssTime, DurationError};

/// Attribute names understood by the page bootstrap.
pub mod attr {
    /// Marks an element for the wave effect.
    pub const WAVE: &str = "w-wave";
    /// Marks an element for the marquee effect.
    pub const MARQUEE: &str = "w-marquee";

    pub const EVENT: &str = "w-event";
    pub const BACKGROUND: &str = "w-background";
    pub const DURATION: &str = "w-duration";
    pub const FADEOUT_DURATION: &str = "w-fadeout-duration";
    pub const TIMING_FUNCTION: &str = "w-timing-function";
    pub const MODE: &str = "w-mode";
    pub const DELAY: &str = "w-delay";
    /// HTML lowercases `w-iterationCount` to this.
    pub const ITERATION_COUNT: &str = "w-iterationcount";
    pub const ITERATION_COUNT_ALIAS: &str = "w-iteration-count";

    /// Stamped on elements once an effect is attached.
    pub const WAVE_ATTACHED: &str = "w-wave-attached";
    pub const MARQUEE_ATTACHED: &str = "w-marquee-attached";
}

/// Errors from strict option resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration attribute did not parse.
    InvalidDuration {
        field: &'static str,
        source: DurationError,
    },
    /// A mode value outside the known set.
    UnknownMode { field: &'static str, value: String },
    /// An iteration count that is neither `infinite` nor a non-negative number.
    InvalidIterationCount(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDuration { field, source } => write!(f, "{field}: {source}"),
            Self::UnknownMode { field, value } => write!(f, "{field}: unknown mode {value:?}"),
            Self::InvalidIterationCount(value) => {
                write!(f, "invalid iteration count {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidDuration { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Whether a ripple shrinks on its own or waits for the release event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaveMode {
    /// Stay visible until the paired release event fires.
    Keep,
    /// Shrink once the grow duration has elapsed.
    #[default]
    Unkeep,
}

impl FromStr for WaveMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "keep" => Ok(Self::Keep),
            "unkeep" => Ok(Self::Unkeep),
            other => Err(ConfigError::UnknownMode {
                field: "mode",
                value: other.to_owned(),
            }),
        }
    }
}

/// How marquee tracks move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarqueeMode {
    /// Two tracks scroll in lockstep for a seamless loop.
    #[default]
    Repeat,
    /// One track slides out and back, alternating every iteration.
    Return,
}

impl FromStr for MarqueeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "repeat" => Ok(Self::Repeat),
            "return" => Ok(Self::Return),
            other => Err(ConfigError::UnknownMode {
                field: "mode",
                value: other.to_owned(),
            }),
        }
    }
}

/// `animation-iteration-count`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum IterationCount {
    #[default]
    Infinite,
    Count(f64),
}

impl FromStr for IterationCount {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "infinite" {
            return Ok(Self::Infinite);
        }
        match s.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Ok(Self::Count(n)),
            _ => Err(ConfigError::InvalidIterationCount(s.to_owned())),
        }
    }
}

impl fmt::Display for IterationCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => f.write_str("infinite"),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

/// Event that ends a held ripple in [`WaveMode::Keep`].
#[must_use]
pub fn release_event_for(trigger: &str) -> &'static str {
    match trigger {
        "mousedown" => "mouseup",
        "mouseenter" => "mouseleave",
        "pointerdown" => "pointerup",
        "touchstart" => "touchend",
        _ => "mouseleave",
    }
}

// ---------------------------------------------------------------------------
// Resolved configs
// ---------------------------------------------------------------------------

/// Resolved wave settings. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveConfig {
    /// DOM event that starts a ripple.
    pub trigger_event: String,
    /// Ripple color (any CSS color).
    pub color: String,
    pub grow: CssTime,
    pub shrink: CssTime,
    /// CSS easing; empty means the browser default.
    pub timing_function: String,
    pub mode: WaveMode,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            trigger_event: "mousedown".to_owned(),
            color: "#fa06".to_owned(),
            grow: CssTime::from_millis(250),
            shrink: CssTime::from_millis(250),
            timing_function: String::new(),
            mode: WaveMode::Unkeep,
        }
    }
}

impl WaveConfig {
    /// Lenient resolution from element attributes.
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        WaveOptions::from_attributes(lookup).resolve()
    }

    /// Event that releases a held ripple.
    #[must_use]
    pub fn release_event(&self) -> &'static str {
        release_event_for(&self.trigger_event)
    }
}

/// Resolved marquee settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeConfig {
    pub duration: CssTime,
    pub timing_function: String,
    pub delay: CssTime,
    pub iteration_count: IterationCount,
    pub mode: MarqueeMode,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            duration: CssTime::from_secs(10),
            timing_function: "linear".to_owned(),
            delay: CssTime::from_secs(0),
            iteration_count: IterationCount::Infinite,
            mode: MarqueeMode::Repeat,
        }
    }
}

impl MarqueeConfig {
    /// Lenient resolution from element attributes.
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        MarqueeOptions::from_attributes(lookup).resolve()
    }
}

// ---------------------------------------------------------------------------
// Partial options
// ---------------------------------------------------------------------------

/// Unresolved wave options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct WaveOptions {
    pub event: Option<String>,
    #[cfg_attr(feature = "serde", serde(alias = "color"))]
    pub background: Option<String>,
    pub duration: Option<String>,
    pub fade_out_duration: Option<String>,
    pub timing_function: Option<String>,
    pub mode: Option<String>,
}

impl WaveOptions {
    /// Read the `w-*` attributes.
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            event: lookup(attr::EVENT),
            background: lookup(attr::BACKGROUND),
            duration: lookup(attr::DURATION),
            fade_out_duration: lookup(attr::FADEOUT_DURATION),
            timing_function: lookup(attr::TIMING_FUNCTION),
            mode: lookup(attr::MODE),
        }
    }

    /// Fill unset fields from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            event: first_set(self.event, fallback.event),
            background: first_set(self.background, fallback.background),
            duration: first_set(self.duration, fallback.duration),
            fade_out_duration: first_set(self.fade_out_duration, fallback.fade_out_duration),
            timing_function: first_set(self.timing_function, fallback.timing_function),
            mode: first_set(self.mode, fallback.mode),
        }
    }

    /// Resolve against the defaults, replacing invalid values.
    #[must_use]
    pub fn resolve(&self) -> WaveConfig {
        self.resolve_with(Strictness::Lenient).unwrap_or_default()
    }

    /// Resolve against the defaults, failing on the first invalid value.
    pub fn try_resolve(&self) -> Result<WaveConfig, ConfigError> {
        self.resolve_with(Strictness::Strict)
    }

    fn resolve_with(&self, strictness: Strictness) -> Result<WaveConfig, ConfigError> {
        let defaults = WaveConfig::default();
        Ok(WaveConfig {
            trigger_event: text_or(&self.event, defaults.trigger_event),
            color: text_or(&self.background, defaults.color),
            grow: pick(&self.duration, strictness, |v| duration_field("duration", v))?
                .unwrap_or(defaults.grow),
            shrink: pick(&self.fade_out_duration, strictness, |v| {
                duration_field("fadeOutDuration", v)
            })?
            .unwrap_or(defaults.shrink),
            timing_function: text_or(&self.timing_function, defaults.timing_function),
            mode: pick(&self.mode, strictness, str::parse)?.unwrap_or(defaults.mode),
        })
    }
}

/// Unresolved marquee options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct MarqueeOptions {
    pub duration: Option<String>,
    pub timing_function: Option<String>,
    pub delay: Option<String>,
    pub iteration_count: Option<String>,
    pub mode: Option<String>,
}

impl MarqueeOptions {
    /// Read the `w-*` attributes.
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            duration: lookup(attr::DURATION),
            timing_function: lookup(attr::TIMING_FUNCTION),
            delay: lookup(attr::DELAY),
            iteration_count: lookup(attr::ITERATION_COUNT)
                .or_else(|| lookup(attr::ITERATION_COUNT_ALIAS)),
            mode: lookup(attr::MODE),
        }
    }

    /// Fill unset fields from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            duration: first_set(self.duration, fallback.duration),
            timing_function: first_set(self.timing_function, fallback.timing_function),
            delay: first_set(self.delay, fallback.delay),
            iteration_count: first_set(self.iteration_count, fallback.iteration_count),
            mode: first_set(self.mode, fallback.mode),
        }
    }

    #[must_use]
    pub fn resolve(&self) -> MarqueeConfig {
        self.resolve_with(Strictness::Lenient).unwrap_or_default()
    }

    pub fn try_resolve(&self) -> Result<MarqueeConfig, ConfigError> {
        self.resolve_with(Strictness::Strict)
    }

    fn resolve_with(&self, strictness: Strictness) -> Result<MarqueeConfig, ConfigError> {
        let defaults = MarqueeConfig::default();
        Ok(MarqueeConfig {
            duration: pick(&self.duration, strictness, |v| duration_field("duration", v))?
                .unwrap_or(defaults.duration),
            timing_function: text_or(&self.timing_function, defaults.timing_function),
            delay: pick(&self.delay, strictness, |v| {
                CssTime::parse(v).map_err(|source| ConfigError::InvalidDuration {
                    field: "delay",
                    source,
                })
            })?
            .unwrap_or(defaults.delay),
            iteration_count: pick(&self.iteration_count, strictness, str::parse)?
                .unwrap_or(defaults.iteration_count),
            mode: pick(&self.mode, strictness, str::parse)?.unwrap_or(defaults.mode),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strictness {
    Lenient,
    Strict,
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn first_set(value: Option<String>, fallback: Option<String>) -> Option<String> {
    if is_unset(&value) {
        fallback
    } else {
        value
    }
}

fn text_or(value: &Option<String>, default: String) -> String {
    if is_unset(value) {
        default
    } else {
        value.as_deref().unwrap_or_default().trim().to_owned()
    }
}

fn duration_field(field: &'static str, value: &str) -> Result<CssTime, ConfigError> {
    CssTime::parse_non_negative(value)
        .map_err(|source| ConfigError::InvalidDuration { field, source })
}

/// Parse a set value. Lenient mode logs and drops invalid values.
fn pick<T>(
    value: &Option<String>,
    strictness: Strictness,
    parse: impl FnOnce(&str) -> Result<T, ConfigError>,
) -> Result<Option<T>, ConfigError> {
    if is_unset(value) {
        return Ok(None);
    }
    let raw = value.as_deref().unwrap_or_default();
    match parse(raw) {
        Ok(v) => Ok(Some(v)),
        Err(err) if strictness == Strictness::Strict => Err(err),
        Err(err) => {
            tracing::warn!(%err, value = raw, "invalid effect option, using default");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn wave_defaults() {
        let config = WaveConfig::from_attributes(attrs(&[]));
        assert_eq!(config, WaveConfig::default());
        assert_eq!(config.trigger_event, "mousedown");
        assert_eq!(config.color, "#fa06");
        assert_eq!(config.grow.as_str(), "250ms");
        assert_eq!(config.shrink.as_str(), "250ms");
        assert_eq!(config.timing_function, "");
        assert_eq!(config.mode, WaveMode::Unkeep);
    }

    #[test]
    fn wave_attributes_override_defaults() {
        let config = WaveConfig::from_attributes(attrs(&[
            ("w-event", "mouseenter"),
            ("w-background", "rgba(0,0,0,.2)"),
            ("w-duration", "1s"),
            ("w-fadeout-duration", "400ms"),
            ("w-timing-function", "ease-out"),
            ("w-mode", "keep"),
        ]));
        assert_eq!(config.trigger_event, "mouseenter");
        assert_eq!(config.color, "rgba(0,0,0,.2)");
        assert_eq!(config.grow.as_millis_f64(), 1000.0);
        assert_eq!(config.shrink.as_millis_f64(), 400.0);
        assert_eq!(config.timing_function, "ease-out");
        assert_eq!(config.mode, WaveMode::Keep);
        assert_eq!(config.release_event(), "mouseleave");
    }

    #[test]
    fn empty_attribute_counts_as_unset() {
        let config = WaveConfig::from_attributes(attrs(&[("w-event", ""), ("w-duration", " ")]));
        assert_eq!(config.trigger_event, "mousedown");
        assert_eq!(config.grow.as_str(), "250ms");
    }

    #[test]
    fn lenient_resolution_replaces_invalid_values() {
        let config = WaveConfig::from_attributes(attrs(&[
            ("w-duration", "250"),
            ("w-mode", "sticky"),
        ]));
        assert_eq!(config.grow.as_str(), "250ms");
        assert_eq!(config.mode, WaveMode::Unkeep);
    }

    #[test]
    fn strict_resolution_reports_first_error() {
        let options = WaveOptions {
            duration: Some("250".into()),
            ..WaveOptions::default()
        };
        assert_eq!(
            options.try_resolve(),
            Err(ConfigError::InvalidDuration {
                field: "duration",
                source: DurationError::MissingUnit("250".into()),
            })
        );
        let options = WaveOptions {
            fade_out_duration: Some("-1s".into()),
            ..WaveOptions::default()
        };
        assert!(matches!(
            options.try_resolve(),
            Err(ConfigError::InvalidDuration {
                field: "fadeOutDuration",
                source: DurationError::Negative(_),
            })
        ));
    }

    #[test]
    fn release_pairs() {
        assert_eq!(release_event_for("mousedown"), "mouseup");
        assert_eq!(release_event_for("mouseenter"), "mouseleave");
        assert_eq!(release_event_for("pointerdown"), "pointerup");
        assert_eq!(release_event_for("touchstart"), "touchend");
        assert_eq!(release_event_for("click"), "mouseleave");
    }

    #[test]
    fn marquee_defaults() {
        let config = MarqueeConfig::from_attributes(attrs(&[]));
        assert_eq!(config.duration.as_str(), "10s");
        assert_eq!(config.timing_function, "linear");
        assert_eq!(config.delay.as_str(), "0s");
        assert_eq!(config.iteration_count, IterationCount::Infinite);
        assert_eq!(config.mode, MarqueeMode::Repeat);
    }

    #[test]
    fn marquee_attributes() {
        let config = MarqueeConfig::from_attributes(attrs(&[
            ("w-duration", "4s"),
            ("w-delay", "-1s"),
            ("w-iterationcount", "3"),
            ("w-mode", "return"),
        ]));
        assert_eq!(config.duration.as_str(), "4s");
        assert_eq!(config.delay.as_str(), "-1s");
        assert_eq!(config.iteration_count, IterationCount::Count(3.0));
        assert_eq!(config.mode, MarqueeMode::Return);
    }

    #[test]
    fn iteration_count_alias() {
        let config = MarqueeConfig::from_attributes(attrs(&[("w-iteration-count", "2.5")]));
        assert_eq!(config.iteration_count, IterationCount::Count(2.5));
        assert_eq!(config.iteration_count.to_string(), "2.5");
    }

    #[test]
    fn iteration_count_parsing() {
        assert_eq!("infinite".parse(), Ok(IterationCount::Infinite));
        assert_eq!("0".parse(), Ok(IterationCount::Count(0.0)));
        assert!("-1".parse::<IterationCount>().is_err());
        assert!("inf".parse::<IterationCount>().is_err());
        assert!("NaN".parse::<IterationCount>().is_err());
        assert!("lots".parse::<IterationCount>().is_err());
    }

    #[test]
    fn unknown_marquee_mode_falls_back_to_repeat() {
        let config = MarqueeConfig::from_attributes(attrs(&[("w-mode", "bounce")]));
        assert_eq!(config.mode, MarqueeMode::Repeat);
        assert_eq!(
            MarqueeOptions {
                mode: Some("bounce".into()),
                ..MarqueeOptions::default()
            }
            .try_resolve(),
            Err(ConfigError::UnknownMode {
                field: "mode",
                value: "bounce".into()
            })
        );
    }

    #[test]
    fn options_overlay_prefers_set_fields() {
        let programmatic = WaveOptions {
            mode: Some("keep".into()),
            duration: Some(String::new()),
            ..WaveOptions::default()
        };
        let markup = WaveOptions::from_attributes(attrs(&[
            ("w-mode", "unkeep"),
            ("w-duration", "1s"),
            ("w-event", "mouseenter"),
        ]));
        let config = programmatic.or(markup).resolve();
        assert_eq!(config.mode, WaveMode::Keep);
        assert_eq!(config.grow.as_str(), "1s");
        assert_eq!(config.trigger_event, "mouseenter");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_deserialize_camel_case() {
        let options: WaveOptions = serde_json::from_str(
            r#"{"color":"red","fadeOutDuration":"1s","timingFunction":"linear"}"#,
        )
        .unwrap();
        assert_eq!(options.background.as_deref(), Some("red"));
        assert_eq!(options.fade_out_duration.as_deref(), Some("1s"));
        assert_eq!(options.timing_function.as_deref(), Some("linear"));
        assert_eq!(options.mode, None);

        let options: MarqueeOptions =
            serde_json::from_str(r#"{"iterationCount":"3","mode":"return"}"#).unwrap();
        let config = options.try_resolve().unwrap();
        assert_eq!(config.iteration_count, IterationCount::Count(3.0));
        assert_eq!(config.mode, MarqueeMode::Return);
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidDuration {
            field: "duration",
            source: DurationError::Empty,
        };
        assert_eq!(err.to_string(), "duration: empty duration");
        assert!(std::error::Error::source(&err).is_some());
    }
}
