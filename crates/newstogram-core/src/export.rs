//! Canvas export boundary.
//!
//! Rasterization lives in the host (a browser's canvas, a GPU renderer, a
//! test double); the core only guarantees that transient UI is out of the
//! picture while it runs.

use crate::canvas::Canvas;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Canvas has no layout yet")]
    Detached,
    #[error("Rasterization failed: {0}")]
    Render(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Encoded PNG produced by a [`Rasterizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl RasterImage {
    /// Suggested download name for the canvas image.
    pub fn file_name(canvas: &Canvas) -> String {
        format!("{}.png", canvas.id())
    }
}

/// Turns a canvas into an image.
pub trait Rasterizer {
    /// Rasterize `canvas` at `scale` times its layout size.
    fn rasterize(&mut self, canvas: &Canvas, scale: f64) -> Result<RasterImage, ExportError>;
}

/// Rasterize `canvas` with handles and the selection outline hidden.
///
/// The canvas is restored whether or not the rasterizer succeeds.
pub fn export_canvas(
    canvas: &mut Canvas,
    rasterizer: &mut dyn Rasterizer,
    scale: f64,
) -> Result<RasterImage, ExportError> {
    if canvas.layout().is_none() {
        return Err(ExportError::Detached);
    }
    canvas.hide_transient_ui();
    let result = rasterizer.rasterize(canvas, scale);
    canvas.restore_transient_ui();
    match &result {
        Ok(image) => log::info!("Exported {} at {}x{}", canvas.id(), image.width, image.height),
        Err(e) => log::warn!("Export of {} failed: {}", canvas.id(), e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasId, CanvasLayout};
    use crate::config::EngineConfig;
    use crate::element::{Element, ElementContent};
    use kurbo::{Point, Rect, Size};

    /// Records what the canvas looked like at rasterization time.
    struct Probe {
        fail: bool,
        saw_handles: Option<bool>,
        saw_outline: Option<bool>,
    }

    impl Rasterizer for Probe {
        fn rasterize(&mut self, canvas: &Canvas, scale: f64) -> Result<RasterImage, ExportError> {
            self.saw_outline = Some(canvas.shows_selection_outline());
            self.saw_handles = Some(
                canvas
                    .elements()
                    .iter()
                    .filter_map(|e| canvas.handles(e.id()))
                    .any(|set| set.iter().any(|h| h.visible)),
            );
            if self.fail {
                return Err(ExportError::Render("out of memory".into()));
            }
            let size = canvas.layout().map(|l| l.surface_size()).unwrap_or_default();
            Ok(RasterImage {
                width: (size.width * scale) as u32,
                height: (size.height * scale) as u32,
                png: vec![0x89, b'P', b'N', b'G'],
            })
        }
    }

    fn selected_canvas() -> Canvas {
        let mut canvas = Canvas::new(CanvasId(1), &EngineConfig::default());
        canvas.set_layout(CanvasLayout::new(
            Rect::new(0.0, 0.0, 1000.0, 1000.0),
            Rect::new(0.0, 0.0, 1000.0, 1000.0),
        ));
        let id = canvas.insert_element(Element::new(
            ElementContent::text("a"),
            Point::new(10.0, 10.0),
            Size::new(100.0, 100.0),
        ));
        canvas.select(id);
        canvas
    }

    fn probe(fail: bool) -> Probe {
        Probe {
            fail,
            saw_handles: None,
            saw_outline: None,
        }
    }

    #[test]
    fn test_export_hides_and_restores() {
        let mut canvas = selected_canvas();
        let mut probe = probe(false);
        let image = export_canvas(&mut canvas, &mut probe, 2.0).unwrap();
        assert_eq!((image.width, image.height), (2000, 2000));
        assert_eq!(probe.saw_handles, Some(false));
        assert_eq!(probe.saw_outline, Some(false));
        assert!(canvas.shows_selection_outline());
        assert_eq!(RasterImage::file_name(&canvas), "canvas-1.png");
    }

    #[test]
    fn test_export_restores_on_failure() {
        let mut canvas = selected_canvas();
        let mut probe = probe(true);
        assert!(matches!(
            export_canvas(&mut canvas, &mut probe, 2.0),
            Err(ExportError::Render(_))
        ));
        assert_eq!(probe.saw_handles, Some(false));
        assert!(canvas.shows_selection_outline());
        let id = canvas.selected().unwrap();
        assert!(canvas.handles(id).unwrap().iter().all(|h| h.visible));
    }

    #[test]
    fn test_detached_canvas_is_not_exported() {
        let mut canvas = Canvas::new(CanvasId(1), &EngineConfig::default());
        let mut probe = probe(false);
        assert!(matches!(
            export_canvas(&mut canvas, &mut probe, 2.0),
            Err(ExportError::Detached)
        ));
        assert_eq!(probe.saw_handles, None);
    }
}
