//! Pointer events for unified mouse/touch handling.
//!
//! The host translates its native events (DOM mouse/touch events, winit
//! events, synthetic test events) into [`PointerEvent`]s and resolves the
//! event target into a [`HitTarget`], either with its own hit testing or with
//! [`Canvas::hit_test`](crate::canvas::Canvas::hit_test).

use crate::canvas::CanvasId;
use crate::element::ElementId;
use crate::widget::HandleRole;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    /// `mousedown` / `touchstart`.
    Down,
    /// `mousemove` / `touchmove`.
    Move,
    /// `mouseup` / `touchend`.
    Up,
    /// `click`, or the tap delivered with a `touchend`.
    Click,
}

/// Device that produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// A pointer event in viewport (client) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub source: PointerSource,
    /// The event's own coordinates (`clientX`/`clientY`).
    pub client: Point,
    /// Touch points still in contact with the surface.
    #[serde(default)]
    pub touches: Vec<Point>,
    /// Touch points that changed in this event (the lifted ones on touch-end).
    #[serde(default)]
    pub changed_touches: Vec<Point>,
}

impl PointerEvent {
    /// A mouse event at `position`.
    pub fn mouse(phase: PointerPhase, position: Point) -> Self {
        Self {
            phase,
            source: PointerSource::Mouse,
            client: position,
            touches: Vec::new(),
            changed_touches: Vec::new(),
        }
    }

    /// A touch-start event with the given contact points.
    pub fn touch_start(touches: Vec<Point>) -> Self {
        Self::touch(PointerPhase::Down, touches)
    }

    /// A touch-move event with the given contact points.
    pub fn touch_move(touches: Vec<Point>) -> Self {
        Self::touch(PointerPhase::Move, touches)
    }

    /// A touch-end event; only the lifted points are known.
    pub fn touch_end(changed: Vec<Point>) -> Self {
        Self {
            phase: PointerPhase::Up,
            source: PointerSource::Touch,
            client: Point::ZERO,
            touches: Vec::new(),
            changed_touches: changed,
        }
    }

    /// A tap (the click synthesized from a touch-end).
    pub fn tap(position: Point) -> Self {
        Self {
            phase: PointerPhase::Click,
            source: PointerSource::Touch,
            client: Point::ZERO,
            touches: Vec::new(),
            changed_touches: vec![position],
        }
    }

    fn touch(phase: PointerPhase, touches: Vec<Point>) -> Self {
        Self {
            phase,
            source: PointerSource::Touch,
            client: Point::ZERO,
            changed_touches: touches.clone(),
            touches,
        }
    }

    /// Whether this event terminates gestures (mouse-up or touch-end).
    pub fn is_end(&self) -> bool {
        self.phase == PointerPhase::Up
    }
}

/// What a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    /// One of an element's overlay handles.
    Handle {
        canvas: CanvasId,
        element: ElementId,
        role: HandleRole,
    },
    /// The element wrapper itself (non-editable content).
    Element { canvas: CanvasId, element: ElementId },
    /// Editable text inside an element.
    EditableText { canvas: CanvasId, element: ElementId },
    /// The bare canvas surface.
    Background(CanvasId),
    /// Anywhere outside every canvas.
    Outside,
}

impl HitTarget {
    /// The canvas the target belongs to, if any.
    pub fn canvas(&self) -> Option<CanvasId> {
        match *self {
            HitTarget::Handle { canvas, .. }
            | HitTarget::Element { canvas, .. }
            | HitTarget::EditableText { canvas, .. }
            | HitTarget::Background(canvas) => Some(canvas),
            HitTarget::Outside => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_end_keeps_changed_points() {
        let event = PointerEvent::touch_end(vec![Point::new(5.0, 6.0)]);
        assert!(event.is_end());
        assert!(event.touches.is_empty());
        assert_eq!(event.changed_touches, vec![Point::new(5.0, 6.0)]);
    }

    #[test]
    fn test_mouse_event_has_no_touches() {
        let event = PointerEvent::mouse(PointerPhase::Move, Point::new(1.0, 2.0));
        assert!(!event.is_end());
        assert!(event.touches.is_empty());
        assert!(event.changed_touches.is_empty());
    }

    #[test]
    fn test_mouse_event_deserializes_without_touch_fields() {
        let json = r#"{"phase":"Down","source":"Mouse","client":{"x":10.0,"y":20.0}}"#;
        let event: PointerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.client, Point::new(10.0, 20.0));
        assert!(event.touches.is_empty());
    }

    #[test]
    fn test_target_canvas() {
        let canvas = CanvasId(2);
        assert_eq!(HitTarget::Background(canvas).canvas(), Some(canvas));
        assert_eq!(HitTarget::Outside.canvas(), None);
    }
}
