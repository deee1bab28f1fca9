//! Property-based invariant tests for ripple geometry and duration parsing.
//!
//! 1. The covering diameter is exactly `2·sqrt(w²+h²)`.
//! 2. A circle of that diameter centered anywhere inside the element
//!    covers all four corners.
//! 3. Identity transform leaves cursor-relative offsets unchanged.
//! 4. `to_visual` inverts `to_local` for any non-zero scale and rotation.
//! 5. `"{n}ms"` and `"{n}s"` parse to `n` and `n·1000` milliseconds.

use pagefx_core::geometry::ElementTransform;
use pagefx_core::{CssTime, Point, Rect, Size, covering_diameter, parse_duration};
use proptest::prelude::*;
use std::time::Duration;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_size() -> impl Strategy<Value = Size> {
    (0.0f64..4000.0, 0.0f64..4000.0).prop_map(|(w, h)| Size::new(w, h))
}

fn arb_rect_with_inner_point() -> impl Strategy<Value = (Rect, Point)> {
    (
        -500.0f64..500.0,
        -500.0f64..500.0,
        1.0f64..2000.0,
        1.0f64..2000.0,
        0.0f64..=1.0,
        0.0f64..=1.0,
    )
        .prop_map(|(left, top, w, h, fx, fy)| {
            let rect = Rect::new(left, top, w, h);
            (rect, Point::new(left + fx * w, top + fy * h))
        })
}

fn arb_transform() -> impl Strategy<Value = ElementTransform> {
    (0.1f64..10.0, -720.0f64..720.0).prop_map(|(s, r)| ElementTransform::new(s, r))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn diameter_is_twice_the_diagonal(size in arb_size()) {
        let d = covering_diameter(size);
        let expected = 2.0 * (size.width * size.width + size.height * size.height).sqrt();
        prop_assert!(close(d, expected), "{d} vs {expected}");
    }

    #[test]
    fn circle_covers_element_from_any_inner_origin((rect, origin) in arb_rect_with_inner_point()) {
        let radius = covering_diameter(rect.size()) / 2.0;
        for corner in rect.corners() {
            prop_assert!(origin.distance(corner) <= radius + 1e-9);
        }
    }

    #[test]
    fn identity_transform_is_noop(x in -5000.0f64..5000.0, y in -5000.0f64..5000.0) {
        let p = ElementTransform::IDENTITY.to_local(Point::new(x, y));
        prop_assert_eq!(p, Point::new(x, y));
    }

    #[test]
    fn to_visual_inverts_to_local(
        t in arb_transform(),
        x in -2000.0f64..2000.0,
        y in -2000.0f64..2000.0,
    ) {
        let back = t.to_visual(t.to_local(Point::new(x, y)));
        prop_assert!(close(back.x, x) && close(back.y, y), "{back:?} vs ({x}, {y})");
    }

    #[test]
    fn millisecond_literals_parse(n in 0u32..1_000_000) {
        prop_assert_eq!(
            parse_duration(&format!("{n}ms")),
            Ok(Duration::from_millis(u64::from(n)))
        );
    }

    #[test]
    fn second_literals_scale_by_thousand(n in 0u32..100_000) {
        let t = CssTime::parse(&format!("{n}s")).unwrap();
        prop_assert_eq!(t.as_millis_f64(), f64::from(n) * 1000.0);
    }

    #[test]
    fn parse_never_panics(s in "\\PC{0,16}") {
        let _ = CssTime::parse(&s);
    }
}

#[test]
fn quarter_turn_maps_axes() {
    let t = ElementTransform::new(1.0, 90.0);
    let shown = t.to_visual(Point::new(7.0, 0.0));
    assert!(close(shown.x, 0.0) && close(shown.y, 7.0), "{shown:?}");
    let local = t.to_local(Point::new(0.0, 7.0));
    assert!(close(local.x, 7.0) && close(local.y, 0.0), "{local:?}");
}
