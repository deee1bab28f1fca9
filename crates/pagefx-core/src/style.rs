#![forbid(unsafe_code)]

//! Ordered inline-style maps.
//!
//! Properties use CSS (kebab-case) names, including custom properties
//! (`--name`), so a backend can hand them straight to
//! `CSSStyleDeclaration.setProperty`.

use std::fmt;

/// An insertion-ordered map of CSS property → value.
///
/// Setting a property that is already present replaces its value in place,
/// keeping the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Set `property` to `value`.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((property, value)),
        }
    }

    /// Remove `property`, returning its previous value.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(p, _)| p == property)?;
        Some(self.entries.remove(idx).1)
    }

    /// Value of `property`, if set.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(property, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Copy every entry of `other` into `self`.
    pub fn extend_from(&mut self, other: &StyleMap) {
        for (p, v) in other.iter() {
            self.set(p, v);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

/// Renders as a `style` attribute body: `a: 1; b: 2`.
impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (p, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{p}: {v}")?;
        }
        Ok(())
    }
}

/// Format a pixel length (`12px`, `0px`, `447.21px`).
#[must_use]
pub fn px(value: f64) -> String {
    if !value.is_finite() {
        return "0px".to_owned();
    }
    // Hundredths of a pixel.
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0px".to_owned();
    }
    format!("{rounded}px")
}

/// Parse a `<n>px` length as [`px`] writes it. Used by headless layout.
#[must_use]
pub fn parse_px(value: &str) -> Option<f64> {
    value
        .trim()
        .strip_suffix("px")
        .and_then(|n| n.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Join the non-empty parts of a single transition/animation entry.
pub(crate) fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
