//! Gesture sessions: drag-to-move, drag-to-resize and drag-to-rotate.
//!
//! A session snapshots everything it needs at pointer-down and computes
//! each update from that snapshot, never from the previous update, so a
//! gesture never drifts.

use crate::canvas::{Canvas, CanvasId, CanvasLayout};
use crate::element::{Element, ElementId};
use crate::geometry::{angle_to, rotate_vector};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Which transform a session performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    Move,
    Resize,
    Rotate,
}

/// Pre-gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Snapshot {
    Move {
        /// Pointer minus the element's viewport layout top-left.
        drag_offset: Vec2,
        canvas_origin: Point,
    },
    Resize {
        start_pointer: Point,
        start_size: Size,
        start_rotation: f64,
    },
    Rotate {
        center: Point,
        /// Radians.
        start_angle: f64,
        start_rotation: f64,
    },
}

/// New top-left for a move, in canvas-local coordinates.
pub fn move_position(pointer: Point, drag_offset: Vec2, canvas_origin: Point) -> Point {
    Point::new(
        pointer.x - drag_offset.x - canvas_origin.x,
        pointer.y - drag_offset.y - canvas_origin.y,
    )
}

/// New size for a resize: the viewport delta is brought into the element's
/// own frame before it is added, and each axis is floored at `min_size`.
pub fn resize_size(start_size: Size, start_rotation: f64, delta: Vec2, min_size: f64) -> Size {
    let local = rotate_vector(delta, -start_rotation);
    Size::new(
        (start_size.width + local.x).max(min_size),
        (start_size.height + local.y).max(min_size),
    )
}

/// New rotation in degrees from the start rotation and the pointer angles
/// (radians) at gesture start and now.
pub fn rotate_angle(start_rotation: f64, start_angle: f64, current_angle: f64) -> f64 {
    start_rotation + (current_angle - start_angle).to_degrees()
}

/// One live gesture on one element.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    canvas: CanvasId,
    element: ElementId,
    snapshot: Snapshot,
    active: bool,
}

impl GestureSession {
    pub fn begin_move(canvas: CanvasId, element: &Element, layout: &CanvasLayout, pointer: Point) -> Self {
        let canvas_origin = layout.canvas_origin();
        let top_left = element.viewport_layout_rect(canvas_origin).origin();
        Self::new(
            canvas,
            element.id(),
            Snapshot::Move {
                drag_offset: pointer - top_left,
                canvas_origin,
            },
        )
    }

    pub fn begin_resize(canvas: CanvasId, element: &Element, pointer: Point) -> Self {
        Self::new(
            canvas,
            element.id(),
            Snapshot::Resize {
                start_pointer: pointer,
                start_size: element.size,
                start_rotation: element.rotation,
            },
        )
    }

    pub fn begin_rotate(canvas: CanvasId, element: &Element, layout: &CanvasLayout, pointer: Point) -> Self {
        let center = element.viewport_center(layout.canvas_origin());
        Self::new(
            canvas,
            element.id(),
            Snapshot::Rotate {
                center,
                start_angle: angle_to(center, pointer),
                start_rotation: element.rotation,
            },
        )
    }

    fn new(canvas: CanvasId, element: ElementId, snapshot: Snapshot) -> Self {
        Self {
            canvas,
            element,
            snapshot,
            active: true,
        }
    }

    pub fn canvas(&self) -> CanvasId {
        self.canvas
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn kind(&self) -> GestureKind {
        match self.snapshot {
            Snapshot::Move { .. } => GestureKind::Move,
            Snapshot::Resize { .. } => GestureKind::Resize,
            Snapshot::Rotate { .. } => GestureKind::Rotate,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Write the state for `pointer` into `element`. Ended sessions do nothing.
    pub fn apply(&self, element: &mut Element, pointer: Point, min_size: f64) {
        if !self.active {
            return;
        }
        match self.snapshot {
            Snapshot::Move {
                drag_offset,
                canvas_origin,
            } => {
                element.position = move_position(pointer, drag_offset, canvas_origin);
            }
            Snapshot::Resize {
                start_pointer,
                start_size,
                start_rotation,
            } => {
                element.size = resize_size(start_size, start_rotation, pointer - start_pointer, min_size);
            }
            Snapshot::Rotate {
                center,
                start_angle,
                start_rotation,
            } => {
                element.rotation = rotate_angle(start_rotation, start_angle, angle_to(center, pointer));
            }
        }
    }

    /// End the session. Returns `false` if it had already ended.
    pub fn end(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

/// Document-wide registry of live sessions.
///
/// Receives every move and end event regardless of what the pointer is over.
#[derive(Debug, Default)]
pub struct InteractionController {
    sessions: Vec<GestureSession>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, ending any session already running on its element.
    pub fn begin(&mut self, session: GestureSession) {
        self.end_for(session.element);
        log::debug!("Begin {:?} gesture on {}", session.kind(), session.element);
        self.sessions.push(session);
    }

    /// Apply `pointer` to every live session and reposition the affected
    /// handles. Sessions whose element has gone away are dropped.
    ///
    /// Returns the ids of the elements that changed.
    pub fn drive(&mut self, pointer: Point, canvases: &mut [Canvas], min_size: f64) -> Vec<ElementId> {
        let mut changed = Vec::new();
        self.sessions.retain_mut(|session| {
            let Some(canvas) = canvases.iter_mut().find(|c| c.id() == session.canvas) else {
                session.end();
                return false;
            };
            let Some(element) = canvas.element_mut(session.element) else {
                session.end();
                return false;
            };
            session.apply(element, pointer, min_size);
            canvas.update_handles(session.element);
            changed.push(session.element);
            true
        });
        changed
    }

    /// End every live session. Returns how many were ended.
    pub fn end_all(&mut self) -> usize {
        let ended = self
            .sessions
            .iter_mut()
            .map(GestureSession::end)
            .filter(|&ended| ended)
            .count();
        self.sessions.clear();
        if ended > 0 {
            log::debug!("Ended {} gesture(s)", ended);
        }
        ended
    }

    /// End the session on `element`, if any.
    pub fn end_for(&mut self, element: ElementId) -> bool {
        let mut ended = false;
        self.sessions.retain_mut(|session| {
            if session.element == element {
                ended |= session.end();
                false
            } else {
                true
            }
        });
        ended
    }

    /// The live session on `element`.
    pub fn session(&self, element: ElementId) -> Option<&GestureSession> {
        self.sessions.iter().find(|s| s.element == element)
    }

    pub fn is_active(&self, element: ElementId) -> bool {
        self.session(element).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::element::ElementContent;
    use kurbo::Rect;

    const EPS: f64 = 1e-9;

    fn layout() -> CanvasLayout {
        CanvasLayout::new(
            Rect::new(0.0, 0.0, 1100.0, 1100.0),
            Rect::new(50.0, 50.0, 1050.0, 1050.0),
        )
    }

    fn element() -> Element {
        Element::new(
            ElementContent::image("a.png", None),
            Point::new(100.0, 100.0),
            Size::new(200.0, 100.0),
        )
    }

    #[test]
    fn test_move_round_trip() {
        let layout = layout();
        let mut element = element();
        let start = Point::new(180.0, 170.0);
        let session = GestureSession::begin_move(CanvasId(1), &element, &layout, start);

        session.apply(&mut element, Point::new(400.0, 20.0), 30.0);
        assert_eq!(element.position, Point::new(320.0, -50.0));
        session.apply(&mut element, start, 30.0);
        assert_eq!(element.position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_move_ignores_rotation() {
        let layout = layout();
        let mut element = element();
        element.rotation = 45.0;
        let start = Point::new(200.0, 200.0);
        let session = GestureSession::begin_move(CanvasId(1), &element, &layout, start);
        // No jump when the pointer has not moved.
        session.apply(&mut element, start, 30.0);
        assert_eq!(element.position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_resize_floor() {
        let size = resize_size(Size::new(100.0, 100.0), 0.0, Vec2::new(-500.0, -80.0), 30.0);
        assert_eq!(size, Size::new(30.0, 30.0));
        let size = resize_size(Size::new(100.0, 100.0), 0.0, Vec2::new(20.0, -60.0), 30.0);
        assert_eq!(size, Size::new(120.0, 40.0));
    }

    #[test]
    fn test_resize_is_frame_invariant() {
        let local = Vec2::new(35.0, -12.0);
        for rotation in [-400.0, -90.0, 0.0, 30.0, 135.0, 720.0] {
            let viewport_delta = rotate_vector(local, rotation);
            let size = resize_size(Size::new(200.0, 100.0), rotation, viewport_delta, 30.0);
            assert!((size.width - 235.0).abs() < 1e-6, "at {}", rotation);
            assert!((size.height - 88.0).abs() < 1e-6, "at {}", rotation);
        }
    }

    #[test]
    fn test_rotate_accumulates() {
        assert!((rotate_angle(350.0, 0.0, std::f64::consts::FRAC_PI_2) - 440.0).abs() < EPS);
        assert!((rotate_angle(-10.0, 0.5, 0.5) + 10.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_session() {
        let layout = layout();
        let mut element = element();
        // Centre in viewport: (250, 200). Start straight right of it.
        let session = GestureSession::begin_rotate(CanvasId(1), &element, &layout, Point::new(350.0, 200.0));
        session.apply(&mut element, Point::new(250.0, 300.0), 30.0);
        assert!((element.rotation - 90.0).abs() < EPS);
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut element = element();
        let mut session = GestureSession::begin_resize(CanvasId(1), &element, Point::ZERO);
        assert!(session.end());
        assert!(!session.end());
        session.apply(&mut element, Point::new(50.0, 50.0), 30.0);
        assert_eq!(element.size, Size::new(200.0, 100.0));
    }

    #[test]
    fn test_controller_one_session_per_element() {
        let element = element();
        let layout = layout();
        let mut controller = InteractionController::new();
        controller.begin(GestureSession::begin_move(CanvasId(1), &element, &layout, Point::ZERO));
        controller.begin(GestureSession::begin_resize(CanvasId(1), &element, Point::ZERO));
        assert_eq!(controller.len(), 1);
        assert_eq!(controller.session(element.id()).unwrap().kind(), GestureKind::Resize);

        assert!(controller.end_for(element.id()));
        assert!(!controller.end_for(element.id()));
        assert!(controller.is_empty());
    }

    #[test]
    fn test_controller_drive_updates_handles() {
        let mut canvas = Canvas::new(CanvasId(1), &EngineConfig::default());
        canvas.set_layout(layout());
        let id = canvas.insert_element(element());
        canvas.select(id);
        let before = canvas.handles(id).unwrap().clone();

        let mut controller = InteractionController::new();
        let session = GestureSession::begin_resize(CanvasId(1), canvas.element(id).unwrap(), Point::new(350.0, 250.0));
        controller.begin(session);

        let mut canvases = vec![canvas];
        let changed = controller.drive(Point::new(370.0, 260.0), &mut canvases, 30.0);
        assert_eq!(changed, vec![id]);
        assert_eq!(canvases[0].element(id).unwrap().size, Size::new(220.0, 110.0));
        assert_ne!(canvases[0].handles(id).unwrap(), &before);

        assert_eq!(controller.end_all(), 1);
        assert_eq!(controller.end_all(), 0);
        assert!(controller.drive(Point::ZERO, &mut canvases, 30.0).is_empty());
    }

    #[test]
    fn test_controller_drops_sessions_of_removed_elements() {
        let mut canvas = Canvas::new(CanvasId(1), &EngineConfig::default());
        canvas.set_layout(layout());
        let id = canvas.insert_element(element());
        let mut controller = InteractionController::new();
        controller.begin(GestureSession::begin_resize(CanvasId(1), canvas.element(id).unwrap(), Point::ZERO));
        canvas.remove_element(id);

        let mut canvases = vec![canvas];
        assert!(controller.drive(Point::new(5.0, 5.0), &mut canvases, 30.0).is_empty());
        assert!(controller.is_empty());
    }
}
