//! Pure geometry helpers.
//!
//! Screen space has y pointing down, so a positive angle rotates clockwise
//! on screen, matching CSS `rotate()`.

use crate::input::PointerEvent;
use kurbo::{Affine, Point, Rect, Vec2};

/// Rotate a vector by `degrees`.
///
/// Handle anchors are rotated forward with the element rotation; resize
/// deltas are brought back into the element frame with `-rotation`.
pub fn rotate_vector(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Express a viewport point relative to a container's viewport rect.
pub fn to_container_local(point: Point, container: Rect) -> Point {
    Point::new(point.x - container.x0, point.y - container.y0)
}

/// Inverse of [`to_container_local`].
pub fn to_viewport(point: Point, container: Rect) -> Point {
    Point::new(point.x + container.x0, point.y + container.y0)
}

/// Pointer position of a mixed mouse/touch event.
///
/// Active touches win, then the lifted touches of a touch-end, then the
/// event's own coordinates.
pub fn pointer_position(event: &PointerEvent) -> Point {
    event
        .touches
        .first()
        .or_else(|| event.changed_touches.first())
        .copied()
        .unwrap_or(event.client)
}

/// Angle in radians from `center` to `point`.
pub fn angle_to(center: Point, point: Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x)
}

/// Axis-aligned bounds of `rect` rotated by `degrees` about its centre.
///
/// This is what a browser reports as the bounding client rect of a
/// `rotate()`-transformed box.
pub fn rotated_bounds(rect: Rect, degrees: f64) -> Rect {
    Affine::rotate_about(degrees.to_radians(), rect.center()).transform_rect_bbox(rect)
}

/// Whether `point` lies inside `rect` rotated by `degrees` about its centre.
pub fn rotated_contains(rect: Rect, degrees: f64, point: Point) -> bool {
    let center = rect.center();
    let local = rotate_vector(point - center, -degrees);
    rect.contains(center + local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerPhase;

    const EPS: f64 = 1e-9;

    fn assert_vec(actual: Vec2, x: f64, y: f64) {
        assert!((actual.x - x).abs() < EPS, "x: {} != {}", actual.x, x);
        assert!((actual.y - y).abs() < EPS, "y: {} != {}", actual.y, y);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        assert_vec(rotate_vector(Vec2::new(1.0, 0.0), 90.0), 0.0, 1.0);
        assert_vec(rotate_vector(Vec2::new(0.0, 1.0), 90.0), -1.0, 0.0);
    }

    #[test]
    fn test_rotate_inverse_round_trip() {
        let v = Vec2::new(12.5, -7.0);
        for degrees in [-725.0, -90.0, 0.0, 33.0, 180.0, 410.0] {
            let back = rotate_vector(rotate_vector(v, degrees), -degrees);
            assert_vec(back, v.x, v.y);
        }
    }

    #[test]
    fn test_rotate_full_turns_are_identity() {
        let v = Vec2::new(3.0, 4.0);
        let turned = rotate_vector(v, 720.0);
        assert!((turned.x - v.x).abs() < 1e-6);
        assert!((turned.y - v.y).abs() < 1e-6);
    }

    #[test]
    fn test_container_local_round_trip() {
        let container = Rect::new(100.0, 50.0, 900.0, 650.0);
        let p = Point::new(130.0, 75.0);
        let local = to_container_local(p, container);
        assert_eq!(local, Point::new(30.0, 25.0));
        assert_eq!(to_viewport(local, container), p);
    }

    #[test]
    fn test_pointer_position_mouse_and_touch_agree() {
        let mouse = PointerEvent::mouse(PointerPhase::Down, Point::new(10.0, 20.0));
        let touch = PointerEvent::touch_start(vec![Point::new(10.0, 20.0), Point::new(99.0, 99.0)]);
        assert_eq!(pointer_position(&mouse), Point::new(10.0, 20.0));
        assert_eq!(pointer_position(&touch), pointer_position(&mouse));
    }

    #[test]
    fn test_pointer_position_touch_end_uses_changed_touches() {
        let end = PointerEvent::touch_end(vec![Point::new(7.0, 8.0)]);
        assert_eq!(pointer_position(&end), Point::new(7.0, 8.0));
    }

    #[test]
    fn test_angle_to() {
        let c = Point::new(0.0, 0.0);
        assert!((angle_to(c, Point::new(1.0, 0.0))).abs() < EPS);
        assert!((angle_to(c, Point::new(0.0, 1.0)) - std::f64::consts::FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_rotated_bounds_keeps_center() {
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        let bounds = rotated_bounds(rect, 90.0);
        assert!((bounds.center().x - 100.0).abs() < 1e-6);
        assert!((bounds.center().y - 50.0).abs() < 1e-6);
        assert!((bounds.width() - 100.0).abs() < 1e-6);
        assert!((bounds.height() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotated_contains() {
        let rect = Rect::new(0.0, 0.0, 200.0, 20.0);
        // Far end of the long axis is outside once the box stands upright.
        assert!(rotated_contains(rect, 0.0, Point::new(190.0, 10.0)));
        assert!(!rotated_contains(rect, 90.0, Point::new(190.0, 10.0)));
        assert!(rotated_contains(rect, 90.0, Point::new(100.0, 90.0)));
    }
}
