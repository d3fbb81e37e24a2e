//! A canvas: its elements, their handle overlay, and its style panel.

use crate::config::EngineConfig;
use crate::element::{Element, ElementId};
use crate::geometry::to_container_local;
use crate::input::HitTarget;
use crate::style::StylePanel;
use crate::widget::{HandleSet, position_handles};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ordinal canvas identifier, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanvasId(pub u32);

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas-{}", self.0)
    }
}

/// Viewport rects reported by the host after layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasLayout {
    /// The container holding the canvas and its handle overlay.
    pub container: Rect,
    /// The canvas drawing surface.
    pub surface: Rect,
}

impl CanvasLayout {
    pub fn new(container: Rect, surface: Rect) -> Self {
        Self { container, surface }
    }

    /// Viewport position of the canvas-local origin.
    pub fn canvas_origin(&self) -> Point {
        self.surface.origin()
    }

    pub fn surface_size(&self) -> Size {
        self.surface.size()
    }
}

/// An independent drawing surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canvas {
    id: CanvasId,
    /// Creation order is paint order.
    elements: Vec<Element>,
    /// Overlay handles, keyed by the element they control.
    handles: HashMap<ElementId, HandleSet>,
    layout: Option<CanvasLayout>,
    pub(crate) is_active: bool,
    pub style_panel: StylePanel,
    /// Handles and the selection outline are suppressed (e.g. during export).
    transient_ui_hidden: bool,
    handle_margin: f64,
    handle_size: Size,
}

impl Canvas {
    pub fn new(id: CanvasId, config: &EngineConfig) -> Self {
        Self {
            id,
            elements: Vec::new(),
            handles: HashMap::new(),
            layout: None,
            is_active: false,
            style_panel: StylePanel::default(),
            transient_ui_hidden: false,
            handle_margin: config.handle_margin,
            handle_size: config.handle_size,
        }
    }

    pub fn id(&self) -> CanvasId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn layout(&self) -> Option<&CanvasLayout> {
        self.layout.as_ref()
    }

    /// Record new layout metrics and reposition every handle.
    pub fn set_layout(&mut self, layout: CanvasLayout) {
        self.layout = Some(layout);
        self.refresh_all_handles();
    }

    /// Elements in paint order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_element(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn handles(&self, id: ElementId) -> Option<&HandleSet> {
        self.handles.get(&id)
    }

    /// Add an element on top, together with its handle set.
    pub fn insert_element(&mut self, element: Element) -> ElementId {
        let id = element.id;
        let roles = element.content.handle_roles();
        self.handles
            .insert(id, HandleSet::new(&roles, self.handle_size));
        self.elements.push(element);
        id
    }

    /// Remove an element and its handles.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        self.handles.remove(&id);
        Some(self.elements.remove(index))
    }

    /// The selected element, if any.
    pub fn selected(&self) -> Option<ElementId> {
        self.elements.iter().find(|e| e.selected).map(|e| e.id)
    }

    /// Select `id`, deselecting the other elements of this canvas only.
    ///
    /// Returns the ids that lost selection, or `None` for an unknown element.
    pub fn select(&mut self, id: ElementId) -> Option<Vec<ElementId>> {
        if !self.contains_element(id) {
            return None;
        }
        let mut deselected = Vec::new();
        for element in &mut self.elements {
            if element.id == id {
                element.selected = true;
            } else if element.selected {
                element.selected = false;
                deselected.push(element.id);
            }
        }
        self.sync_visibility();
        self.update_handles(id);
        Some(deselected)
    }

    /// Deselect every element and hide the style panel.
    ///
    /// Returns the ids that lost selection.
    pub fn deselect_all(&mut self) -> Vec<ElementId> {
        let mut deselected = Vec::new();
        for element in &mut self.elements {
            if element.selected {
                element.selected = false;
                deselected.push(element.id);
            }
        }
        self.sync_visibility();
        self.style_panel.hide();
        deselected
    }

    fn sync_visibility(&mut self) {
        for element in &self.elements {
            if let Some(set) = self.handles.get_mut(&element.id) {
                set.set_visible(element.selected && !self.transient_ui_hidden);
            }
        }
    }

    /// Reposition one element's handles from its current state.
    ///
    /// Returns `false` without touching anything when the canvas has no
    /// layout yet or the element is gone.
    pub fn update_handles(&mut self, id: ElementId) -> bool {
        let Some(layout) = self.layout else {
            return false;
        };
        let Some(element) = self.elements.iter().find(|e| e.id == id) else {
            return false;
        };
        let Some(set) = self.handles.get_mut(&id) else {
            return false;
        };
        position_handles(element, &layout, set, self.handle_margin);
        if self.transient_ui_hidden {
            set.set_visible(false);
        }
        true
    }

    /// Reposition the handles of every element.
    pub fn refresh_all_handles(&mut self) {
        let ids: Vec<ElementId> = self.elements.iter().map(|e| e.id).collect();
        for id in ids {
            self.update_handles(id);
        }
        log::debug!("Refreshed handles of {} elements on {}", self.elements.len(), self.id);
    }

    /// Hide handles and the selection outline.
    pub fn hide_transient_ui(&mut self) {
        self.transient_ui_hidden = true;
        self.sync_visibility();
    }

    /// Undo [`Canvas::hide_transient_ui`].
    pub fn restore_transient_ui(&mut self) {
        self.transient_ui_hidden = false;
        self.sync_visibility();
    }

    /// Whether the selected element should be drawn with its outline.
    pub fn shows_selection_outline(&self) -> bool {
        !self.transient_ui_hidden && self.selected().is_some()
    }

    /// Resolve a viewport point to what it lands on.
    ///
    /// Visible handles win over elements, elements are tested front to
    /// back with their rotation. Detached canvases hit nothing.
    pub fn hit_test(&self, point: Point) -> HitTarget {
        let Some(layout) = self.layout else {
            return HitTarget::Outside;
        };
        let local = to_container_local(point, layout.container);
        for element in self.elements.iter().rev() {
            if let Some(role) = self.handles.get(&element.id).and_then(|set| set.hit_test(local)) {
                return HitTarget::Handle {
                    canvas: self.id,
                    element: element.id,
                    role,
                };
            }
        }

        let origin = layout.canvas_origin();
        if let Some(element) = self.elements.iter().rev().find(|e| e.contains(point, origin)) {
            return if element.content.is_text_bearing() {
                HitTarget::EditableText {
                    canvas: self.id,
                    element: element.id,
                }
            } else {
                HitTarget::Element {
                    canvas: self.id,
                    element: element.id,
                }
            };
        }

        if layout.surface.contains(point) {
            HitTarget::Background(self.id)
        } else {
            HitTarget::Outside
        }
    }
}
