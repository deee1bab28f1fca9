#![forbid(unsafe_code)]

//! Global style registration.
//!
//! Keyframes are shared by every instance of an effect, so they are
//! registered once per effect type under a fixed key: the first attach
//! inserts the `<style>` block, later attaches (and later init passes) find
//! it already present. The document itself is the record of what has been
//! registered, so separate engines on the same page agree.

use std::fmt;

use crate::dom::{Dom, DomError};
use crate::style::StyleMap;

/// Attribute carrying the registration key on global `<style>` elements.
pub const STYLE_KEY_ATTR: &str = "data-pagefx-style";

/// Register `css` under `key` unless a block with that key already exists.
///
/// Returns `true` when a block was inserted.
pub fn ensure_global_style<D: Dom>(
    dom: &mut D,
    key: &str,
    css: impl FnOnce() -> String,
) -> Result<bool, DomError> {
    if dom.has_global_style(key) {
        return Ok(false);
    }
    dom.insert_global_style(key, &css())?;
    tracing::debug!(key, "registered global style");
    Ok(true)
}

/// A `@keyframes` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyframes {
    name: String,
    stops: Vec<(u8, StyleMap)>,
}

impl Keyframes {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stops: Vec::new(),
        }
    }

    /// Add a stop at `percent` (clamped to 100).
    #[must_use]
    pub fn stop(mut self, percent: u8, styles: StyleMap) -> Self {
        self.stops.push((percent.min(100), styles));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declarations at `percent`, if that stop exists.
    #[must_use]
    pub fn at(&self, percent: u8) -> Option<&StyleMap> {
        self.stops
            .iter()
            .find(|(p, _)| *p == percent)
            .map(|(_, s)| s)
    }
}

impl fmt::Display for Keyframes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@keyframes {} {{", self.name)?;
        for (percent, styles) in &self.stops {
            write!(f, "  {percent}% {{")?;
            for (p, v) in styles.iter() {
                write!(f, " {p}: {v};")?;
            }
            writeln!(f, " }}")?;
        }
        write!(f, "}}")
    }
}

/// Render several rules as one style sheet body.
#[must_use]
pub fn stylesheet(rules: &[Keyframes]) -> String {
    rules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::MemoryDom;
    use pretty_assertions::assert_eq;

    fn slide() -> Keyframes {
        Keyframes::new("slide")
            .stop(0, StyleMap::new().with("transform", "translateX(0%)"))
            .stop(100, StyleMap::new().with("transform", "translateX(-100%)"))
    }

    #[test]
    fn keyframes_render() {
        assert_eq!(
            slide().to_string(),
            "@keyframes slide {\n  0% { transform: translateX(0%); }\n  100% { transform: translateX(-100%); }\n}"
        );
    }

    #[test]
    fn stop_lookup() {
        let k = slide();
        assert_eq!(k.at(100).and_then(|s| s.get("transform")), Some("translateX(-100%)"));
        assert!(k.at(50).is_none());
    }

    #[test]
    fn registration_is_idempotent_per_key() {
        let mut dom = MemoryDom::new();
        assert_eq!(ensure_global_style(&mut dom, "a", || "x{}".into()), Ok(true));
        assert_eq!(
            ensure_global_style(&mut dom, "a", || panic!("must not render twice")),
            Ok(false)
        );
        assert_eq!(ensure_global_style(&mut dom, "b", || "y{}".into()), Ok(true));
        assert_eq!(dom.global_styles().count(), 2);
    }
}
