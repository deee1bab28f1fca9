#![forbid(unsafe_code)]

//! Ripple geometry: covering diameter and cursor-to-local coordinates.
//!
//! # Invariants
//! 1. [`covering_diameter`] is `2·sqrt(w² + h²)`: a circle of that diameter
//!    centered anywhere inside a `w × h` rectangle covers the rectangle.
//! 2. [`ElementTransform::to_local`] and [`ElementTransform::to_visual`] are
//!    inverse to each other for any non-zero scale.
//! 3. The identity transform leaves coordinates untouched.

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A viewport-relative box, as `getBoundingClientRect` reports it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width / 2.0,
            self.top + self.height / 2.0,
        )
    }

    /// Closed containment check.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.x <= self.left + self.width
            && p.y >= self.top
            && p.y <= self.top + self.height
    }

    /// Corners in clockwise order starting at the top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let right = self.left + self.width;
        let bottom = self.top + self.height;
        [
            Point::new(self.left, self.top),
            Point::new(right, self.top),
            Point::new(right, bottom),
            Point::new(self.left, bottom),
        ]
    }
}

/// Diameter of a circle that covers a `size` box from any origin inside it.
#[must_use]
pub fn covering_diameter(size: Size) -> f64 {
    2.0 * size.width.hypot(size.height)
}

// ---------------------------------------------------------------------------
// Element transform
// ---------------------------------------------------------------------------

/// The individual `scale` / `rotate` transform of an element, read from its
/// computed style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTransform {
    pub scale: f64,
    pub rotate_deg: f64,
}

impl Default for ElementTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ElementTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotate_deg: 0.0,
    };

    #[must_use]
    pub const fn new(scale: f64, rotate_deg: f64) -> Self {
        Self { scale, rotate_deg }
    }

    /// Build from computed `scale` and `rotate` values. Missing or
    /// unparseable values fall back to scale 1 and rotation 0.
    #[must_use]
    pub fn from_computed(scale: Option<&str>, rotate: Option<&str>) -> Self {
        Self {
            scale: scale.and_then(parse_scale).unwrap_or(1.0),
            rotate_deg: rotate.and_then(parse_rotation_deg).unwrap_or(0.0),
        }
    }

    fn radians(&self) -> f64 {
        self.rotate_deg.to_radians()
    }

    /// Map an offset measured from the element's top-left in viewport space
    /// into the element's untransformed coordinate space: divide by the
    /// scale, then rotate by the negative of the element's rotation.
    #[must_use]
    pub fn to_local(&self, offset: Point) -> Point {
        let sx = offset.x / self.scale;
        let sy = offset.y / self.scale;
        let (sin, cos) = self.radians().sin_cos();
        Point::new(sx * cos + sy * sin, -sx * sin + sy * cos)
    }

    /// Inverse of [`to_local`](Self::to_local): where a local point is shown.
    #[must_use]
    pub fn to_visual(&self, local: Point) -> Point {
        let (sin, cos) = self.radians().sin_cos();
        let x = local.x * cos - local.y * sin;
        let y = local.x * sin + local.y * cos;
        Point::new(x * self.scale, y * self.scale)
    }
}

/// Cursor position relative to `rect`, corrected for `transform`.
#[must_use]
pub fn local_point(rect: Rect, client: Point, transform: ElementTransform) -> Point {
    transform.to_local(Point::new(client.x - rect.left, client.y - rect.top))
}

// ---------------------------------------------------------------------------
// Computed-style parsing
// ---------------------------------------------------------------------------

/// Parse a computed `scale` value (`"1.5"`, `"1.5 2"`, `"none"`).
///
/// Uses the x-axis factor. Zero is treated as unset, matching the
/// `parseFloat(..) || 1` convention of the page scripts this replaces.
#[must_use]
pub fn parse_scale(value: &str) -> Option<f64> {
    let (number, rest) = leading_number(value)?;
    let factor = if rest.starts_with('%') {
        number.parse::<f64>().ok()? / 100.0
    } else {
        number.parse::<f64>().ok()?
    };
    (factor.is_finite() && factor != 0.0).then_some(factor)
}

/// Parse a computed `rotate` value to degrees (`"45deg"`, `"0.5turn"`,
/// `"1.2rad"`, `"z 90deg"`, `"none"`). For axis forms the angle is the last
/// token.
#[must_use]
pub fn parse_rotation_deg(value: &str) -> Option<f64> {
    let angle = value.split_whitespace().last()?;
    let (number, unit) = leading_number(angle)?;
    let n = number.parse::<f64>().ok()?;
    let deg = match unit {
        "" | "deg" => n,
        "rad" => n.to_degrees(),
        "grad" => n * 360.0 / 400.0,
        "turn" => n * 360.0,
        _ => return None,
    };
    deg.is_finite().then_some(deg)
}

/// Split the longest leading decimal literal (as `parseFloat` reads it)
/// from the rest of `value`.
fn leading_number(value: &str) -> Option<(&str, &str)> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        let mut j = i + 1;
        let mut frac = 0;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
            frac += 1;
        }
        if frac > 0 || digits > 0 {
            i = j;
            digits += frac;
        }
    }
    if digits == 0 {
        return None;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some((&s[..i], &s[i..]))
}
