//! Handle positioning.
//!
//! Handle geometry is always derived from element state: the centre comes
//! from the rendered box, the anchor offset from the unrotated half extents,
//! and the rotation is applied explicitly once. Taking the half extents from
//! the rotated bounds instead would rotate twice.

use super::handles::{HandleRole, HandleSet};
use crate::canvas::CanvasLayout;
use crate::element::Element;
use crate::geometry::{rotate_vector, to_container_local};
use kurbo::Point;

/// Viewport-space centre a handle of `role` should sit on.
pub fn handle_center(element: &Element, layout: &CanvasLayout, role: HandleRole, margin: f64) -> Point {
    let center = element.viewport_center(layout.canvas_origin());
    let offset = rotate_vector(role.anchor(element.half_extents(), margin), element.rotation);
    center + offset
}

/// Write position, visibility and icon rotation of every handle in `handles`.
pub fn position_handles(element: &Element, layout: &CanvasLayout, handles: &mut HandleSet, margin: f64) {
    for handle in handles.iter_mut() {
        let center = handle_center(element, layout, handle.role, margin);
        let local = to_container_local(center, layout.container);
        handle.position = Point::new(
            local.x - handle.size.width / 2.0,
            local.y - handle.size.height / 2.0,
        );
        handle.visible = element.is_selected();
        // Counter-rotate the glyph so it reads upright; position is unaffected.
        handle.icon_rotation = if handle.role == HandleRole::Rotate {
            -element.rotation
        } else {
            0.0
        };
    }
}
