//! Handle definitions for element manipulation.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The role of a handle - determines what manipulation it performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleRole {
    /// Top-left corner; removes the element on tap.
    Delete,
    /// Bottom-right corner; drag to resize.
    Resize,
    /// Top-right corner; drag to rotate.
    Rotate,
    /// Bottom-left corner; drag to move.
    Move,
    /// Above the top edge, images only; asks the host to cut the background.
    RemoveBackground,
}

impl HandleRole {
    /// Offset of the handle centre from the element's unrotated centre.
    pub fn anchor(self, half: Vec2, margin: f64) -> Vec2 {
        let x = half.x + margin;
        let y = half.y + margin;
        match self {
            HandleRole::Delete => Vec2::new(-x, -y),
            HandleRole::Resize => Vec2::new(x, y),
            HandleRole::Rotate => Vec2::new(x, -y),
            HandleRole::Move => Vec2::new(-x, y),
            HandleRole::RemoveBackground => Vec2::new(0.0, -y),
        }
    }

    /// Glyph shown on the handle.
    pub fn glyph(self) -> &'static str {
        match self {
            HandleRole::Delete => "✖",
            HandleRole::Resize => "",
            HandleRole::Rotate => "↻",
            HandleRole::Move => "↔",
            HandleRole::RemoveBackground => "✂",
        }
    }
}

/// An overlay control bound to one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    pub role: HandleRole,
    /// Top-left corner in container-local coordinates.
    pub position: Point,
    /// Rendered size of the handle.
    pub size: Size,
    pub visible: bool,
    /// Rotation applied to the handle's icon only, in degrees.
    pub icon_rotation: f64,
}

impl Handle {
    /// Create a hidden handle at the container origin.
    pub fn new(role: HandleRole, size: Size) -> Self {
        Self {
            role,
            position: Point::ZERO,
            size,
            visible: false,
            icon_rotation: 0.0,
        }
    }

    /// Container-local rect covered by the handle.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Container-local centre.
    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Check if a container-local point hits this handle.
    pub fn hit_test(&self, point: Point) -> bool {
        self.visible && self.rect().contains(point)
    }
}

/// The handles owned by one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandleSet {
    handles: Vec<Handle>,
}

impl HandleSet {
    pub fn new(roles: &[HandleRole], size: Size) -> Self {
        Self {
            handles: roles.iter().map(|&role| Handle::new(role, size)).collect(),
        }
    }

    pub fn get(&self, role: HandleRole) -> Option<&Handle> {
        self.handles.iter().find(|h| h.role == role)
    }

    pub fn get_mut(&mut self, role: HandleRole) -> Option<&mut Handle> {
        self.handles.iter_mut().find(|h| h.role == role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.handles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Handle> {
        self.handles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn set_visible(&mut self, visible: bool) {
        for handle in &mut self.handles {
            handle.visible = visible;
        }
    }

    /// Topmost visible handle under a container-local point.
    pub fn hit_test(&self, point: Point) -> Option<HandleRole> {
        self.handles
            .iter()
            .rev()
            .find(|h| h.hit_test(point))
            .map(|h| h.role)
    }
}
