#![forbid(unsafe_code)]

//! CSS `<time>` values.
//!
//! The same textual value is written into `transition` / `animation`
//! declarations and converted to a timer delay, so the visual end of a
//! transition and the timer that follows it stay in step. A value is a
//! decimal literal immediately followed by `ms` or `s`; anything else is
//! rejected instead of producing a NaN delay.

use std::fmt;
use std::time::Duration;

/// Errors from parsing a CSS time value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Input was empty or whitespace.
    Empty,
    /// No `ms` / `s` suffix.
    MissingUnit(String),
    /// The numeric part is not a finite decimal literal.
    InvalidNumber(String),
    /// A negative value where only non-negative durations make sense.
    Negative(String),
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty duration"),
            Self::MissingUnit(raw) => write!(f, "duration {raw:?} has no `ms` or `s` unit"),
            Self::InvalidNumber(raw) => write!(f, "duration {raw:?} has an invalid number"),
            Self::Negative(raw) => write!(f, "duration {raw:?} is negative"),
        }
    }
}

impl std::error::Error for DurationError {}

/// Unit suffix of a [`CssTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
        }
    }

    const fn millis_per_unit(self) -> f64 {
        match self {
            Self::Milliseconds => 1.0,
            Self::Seconds => 1000.0,
        }
    }
}

/// A validated CSS time value (`250ms`, `1.5s`, `-2s`).
#[derive(Debug, Clone, PartialEq)]
pub struct CssTime {
    text: String,
    unit: TimeUnit,
    millis: f64,
}

impl CssTime {
    /// Parse a CSS time value. Negative values are accepted (valid for
    /// `animation-delay`); use [`parse_duration`] where they are not.
    pub fn parse(input: &str) -> Result<Self, DurationError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(DurationError::Empty);
        }

        let (number, unit) = if let Some(n) = text.strip_suffix("ms") {
            (n, TimeUnit::Milliseconds)
        } else if let Some(n) = text.strip_suffix('s') {
            (n, TimeUnit::Seconds)
        } else {
            return Err(DurationError::MissingUnit(text.to_owned()));
        };

        let value =
            parse_decimal(number).ok_or_else(|| DurationError::InvalidNumber(text.to_owned()))?;

        Ok(Self {
            text: text.to_owned(),
            unit,
            millis: value * unit.millis_per_unit(),
        })
    }

    /// Parse a value that must not be negative.
    pub fn parse_non_negative(input: &str) -> Result<Self, DurationError> {
        let time = Self::parse(input)?;
        if time.is_negative() {
            return Err(DurationError::Negative(time.text));
        }
        Ok(time)
    }

    /// Build from whole milliseconds (`"<n>ms"`).
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self {
            text: format!("{millis}ms"),
            unit: TimeUnit::Milliseconds,
            millis: millis as f64,
        }
    }

    /// Build from whole seconds (`"<n>s"`).
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self {
            text: format!("{secs}s"),
            unit: TimeUnit::Seconds,
            millis: secs as f64 * 1000.0,
        }
    }

    /// The CSS text, trimmed, exactly as written into declarations.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Value in milliseconds (`"1.5s"` → `1500.0`).
    #[must_use]
    pub const fn as_millis_f64(&self) -> f64 {
        self.millis
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.millis < 0.0
    }

    /// Timer delay for this value; negative values clamp to zero.
    #[must_use]
    pub fn to_duration(&self) -> Duration {
        Duration::from_nanos((self.millis.max(0.0) * 1_000_000.0).round() as u64)
    }
}

impl fmt::Display for CssTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for CssTime {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a non-negative CSS time value straight to a timer delay.
///
/// `"250ms"` → 250ms, `"2s"` → 2000ms, `"1.5s"` → 1500ms.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    CssTime::parse_non_negative(input).map(|t| t.to_duration())
}

/// CSS `<number>`: optional sign, digits with an optional fraction, optional
/// exponent. Rejects the `inf`/`NaN` spellings `f64::from_str` would take.
fn parse_decimal(number: &str) -> Option<f64> {
    let bytes = number.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return None;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return None;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }
    if i != bytes.len() {
        return None;
    }
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_reference_values() {
        assert_eq!(CssTime::parse("250ms").unwrap().as_millis_f64(), 250.0);
        assert_eq!(CssTime::parse("2s").unwrap().as_millis_f64(), 2000.0);
        assert_eq!(CssTime::parse("1.5s").unwrap().as_millis_f64(), 1500.0);
        assert_eq!(CssTime::parse("0s").unwrap().as_millis_f64(), 0.0);
        assert_eq!(CssTime::parse(".5s").unwrap().as_millis_f64(), 500.0);
    }

    #[test]
    fn duration_conversion() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2s"), Ok(Duration::from_millis(2000)));
        assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
    }

    #[test]
    fn keeps_trimmed_text_for_css() {
        let t = CssTime::parse("  10s ").unwrap();
        assert_eq!(t.as_str(), "10s");
        assert_eq!(t.to_string(), "10s");
        assert_eq!(t.unit(), TimeUnit::Seconds);
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(CssTime::parse(""), Err(DurationError::Empty));
        assert_eq!(CssTime::parse("   "), Err(DurationError::Empty));
        assert_eq!(
            CssTime::parse("250"),
            Err(DurationError::MissingUnit("250".into()))
        );
        assert_eq!(
            CssTime::parse("ms"),
            Err(DurationError::InvalidNumber("ms".into()))
        );
        assert!(CssTime::parse("1.s").is_err());
        assert!(CssTime::parse("infs").is_err());
        assert!(CssTime::parse("NaNms").is_err());
        assert!(CssTime::parse("2 s").is_err());
        assert!(CssTime::parse("250msx").is_err());
        assert!(CssTime::parse("1e").is_err());
    }

    #[test]
    fn negative_values() {
        let delay = CssTime::parse("-2s").unwrap();
        assert!(delay.is_negative());
        assert_eq!(delay.to_duration(), Duration::ZERO);
        assert_eq!(
            parse_duration("-2s"),
            Err(DurationError::Negative("-2s".into()))
        );
    }

    #[test]
    fn exponent_form() {
        assert_eq!(CssTime::parse("1e3ms").unwrap().as_millis_f64(), 1000.0);
    }

    #[test]
    fn from_millis_round_trips_text() {
        let t = CssTime::from_millis(100);
        assert_eq!(t.as_str(), "100ms");
        assert_eq!(t.to_duration(), Duration::from_millis(100));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            DurationError::MissingUnit("250".into()).to_string(),
            "duration \"250\" has no `ms` or `s` unit"
        );
    }
}
