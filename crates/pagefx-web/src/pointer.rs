//! Extracting the trigger point from DOM events.

use pagefx_core::Point;

/// The coordinates a DOM event carries, copied out of the JS object.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointerSample {
    /// `MouseEvent` / `PointerEvent` viewport coordinates.
    Mouse { client_x: f64, client_y: f64 },
    /// `TouchEvent` touch lists.
    Touch {
        touches: Vec<Point>,
        changed: Vec<Point>,
    },
    /// Any event without coordinates.
    #[default]
    Other,
}

impl PointerSample {
    /// Viewport point the ripple starts from. `None` means the element
    /// center.
    ///
    /// Touch events use the first active touch, falling back to the first
    /// changed touch (`touchend` has no active touches left).
    #[must_use]
    pub fn client_point(&self) -> Option<Point> {
        match self {
            Self::Mouse { client_x, client_y } => Some(Point::new(*client_x, *client_y)),
            Self::Touch { touches, changed } => touches.first().or(changed.first()).copied(),
            Self::Other => None,
        }
    }
}
