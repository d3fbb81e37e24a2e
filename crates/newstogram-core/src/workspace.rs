//! The canvas manager.
//!
//! A [`Workspace`] owns every canvas, the edit context (active canvas and
//! active text element), and the gesture controller. Hosts feed it layout
//! metrics and pointer events; each call leaves the model and all handle
//! geometry consistent before it returns.

use crate::canvas::{Canvas, CanvasId, CanvasLayout};
use crate::config::EngineConfig;
use crate::element::{Element, ElementContent, ElementId, ImageContent, TextStyle};
use crate::error::{EngineError, EngineResult};
use crate::export::{self, RasterImage, Rasterizer};
use crate::geometry::pointer_position;
use crate::input::{HitTarget, PointerEvent, PointerPhase};
use crate::interaction::{GestureKind, GestureSession, InteractionController};
use crate::source::{ContentSource, to_data_url};
use crate::style::{ActiveText, EditContext, StyleChange};
use crate::widget::HandleRole;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Entry in the canvas switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasThumbnail {
    pub canvas: CanvasId,
    pub label: String,
    pub highlighted: bool,
}

/// An image fetched during import, ready to be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelImage {
    /// Original URL on the scraped page.
    pub url: String,
    pub data_url: String,
}

/// Text kept from the last import for later insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub titles: Vec<String>,
    pub body: String,
    pub summary: Option<String>,
}

/// Outcome of [`Workspace::import_article`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub images_loaded: usize,
    pub images_failed: usize,
    /// The auto-inserted first image.
    pub image_element: Option<ElementId>,
    /// The auto-inserted title caption.
    pub caption_element: Option<ElementId>,
}

/// What a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Ignored,
    Selected(ElementId),
    GestureStarted { element: ElementId, kind: GestureKind },
    Moved(Vec<ElementId>),
    GesturesEnded(usize),
    Deleted(ElementId),
    /// The host should run background removal on this image.
    RemoveBackgroundRequested(ElementId),
    TextActivated(ElementId),
    /// Elements were deactivated on one canvas, or on all of them.
    Deactivated(Option<CanvasId>),
}

fn gesture_for(role: HandleRole) -> Option<GestureKind> {
    match role {
        HandleRole::Move => Some(GestureKind::Move),
        HandleRole::Resize => Some(GestureKind::Resize),
        HandleRole::Rotate => Some(GestureKind::Rotate),
        HandleRole::Delete | HandleRole::RemoveBackground => None,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// All canvases of one editing session.
#[derive(Debug, Default)]
pub struct Workspace {
    config: EngineConfig,
    canvases: Vec<Canvas>,
    last_canvas: u32,
    context: EditContext,
    controller: InteractionController,
    /// Handle refreshes deferred until the host has laid out new elements.
    pending_refresh: Vec<(CanvasId, ElementId)>,
    loading: bool,
    draft: ArticleDraft,
    image_panel: Vec<PanelImage>,
}

impl Workspace {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &EditContext {
        &self.context
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn canvases(&self) -> &[Canvas] {
        &self.canvases
    }

    pub fn canvas(&self, id: CanvasId) -> Option<&Canvas> {
        self.canvases.iter().find(|c| c.id() == id)
    }

    pub fn canvas_mut(&mut self, id: CanvasId) -> Option<&mut Canvas> {
        self.canvases.iter_mut().find(|c| c.id() == id)
    }

    fn require_canvas(&self, id: CanvasId) -> EngineResult<&Canvas> {
        self.canvas(id).ok_or_else(|| {
            log::warn!("Unknown canvas {}", id);
            EngineError::UnknownCanvas(id)
        })
    }

    fn require_canvas_mut(&mut self, id: CanvasId) -> EngineResult<&mut Canvas> {
        self.canvases.iter_mut().find(|c| c.id() == id).ok_or_else(|| {
            log::warn!("Unknown canvas {}", id);
            EngineError::UnknownCanvas(id)
        })
    }

    // --- Canvases ---

    /// Create the next canvas and make it active.
    pub fn add_canvas(&mut self) -> CanvasId {
        self.last_canvas += 1;
        let id = CanvasId(self.last_canvas);
        self.canvases.push(Canvas::new(id, &self.config));
        log::info!("Created {}", id);
        self.activate(id);
        id
    }

    /// Make `id` the canvas that receives new elements.
    pub fn set_active_canvas(&mut self, id: CanvasId) -> EngineResult<()> {
        if self.context.active_canvas == Some(id) {
            return Ok(());
        }
        self.require_canvas(id)?;
        self.activate(id);
        Ok(())
    }

    fn activate(&mut self, id: CanvasId) {
        if let Some(previous) = self.context.active_canvas {
            self.deactivate_canvas(previous);
        }
        self.clear_active_text_element();
        for canvas in &mut self.canvases {
            canvas.is_active = canvas.id() == id;
        }
        self.context.active_canvas = Some(id);
        log::debug!("Active canvas is now {}", id);
    }

    pub fn active_canvas(&self) -> Option<CanvasId> {
        self.context.active_canvas
    }

    /// The active canvas, or [`EngineError::NoActiveCanvas`].
    pub fn require_active_canvas(&self) -> EngineResult<CanvasId> {
        self.context.active_canvas.ok_or_else(|| {
            log::warn!("No active canvas");
            EngineError::NoActiveCanvas
        })
    }

    /// Canvas switcher entries in creation order.
    pub fn thumbnails(&self) -> Vec<CanvasThumbnail> {
        self.canvases
            .iter()
            .map(|canvas| CanvasThumbnail {
                canvas: canvas.id(),
                label: format!("Canvas {}", canvas.id().0),
                highlighted: canvas.is_active(),
            })
            .collect()
    }

    /// Record new layout metrics for a canvas and reposition its handles.
    pub fn set_layout(&mut self, canvas: CanvasId, layout: CanvasLayout) -> EngineResult<()> {
        self.require_canvas_mut(canvas)?.set_layout(layout);
        Ok(())
    }

    /// Reposition every handle of every canvas, e.g. after a window resize.
    pub fn refresh_all(&mut self) {
        for canvas in &mut self.canvases {
            canvas.refresh_all_handles();
        }
    }

    /// Reposition one element's handles. `Ok(false)` when the canvas has no
    /// layout yet or the element is gone.
    pub fn update_handles(&mut self, canvas: CanvasId, element: ElementId) -> EngineResult<bool> {
        Ok(self.require_canvas_mut(canvas)?.update_handles(element))
    }

    /// Run handle refreshes scheduled by element creation. Call once the
    /// host has painted. Returns how many elements were repositioned.
    pub fn tick(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_refresh);
        let mut refreshed = 0;
        for (canvas, element) in pending {
            if let Some(canvas) = self.canvas_mut(canvas) {
                if canvas.update_handles(element) {
                    refreshed += 1;
                }
            }
        }
        refreshed
    }

    /// Find what a viewport point lands on across all canvases.
    pub fn hit_test(&self, point: Point) -> HitTarget {
        self.canvases
            .iter()
            .map(|canvas| canvas.hit_test(point))
            .find(|target| *target != HitTarget::Outside)
            .unwrap_or(HitTarget::Outside)
    }

    // --- Elements ---

    /// Starting size of new content; both axes respect the resize floor.
    fn default_size(&self, content: &ElementContent) -> Size {
        let width = self.config.default_width;
        let height = match content {
            ElementContent::Image(ImageContent {
                natural_size: Some(natural),
                ..
            }) if natural.width > 0.0 && natural.height > 0.0 => width * natural.height / natural.width,
            ElementContent::Image(_) => self.config.image_height,
            content if content.is_caption() => self.config.caption_height,
            _ => self.config.text_height,
        };
        let min = self.config.min_size;
        Size::new(width.max(min), height.max(min))
    }

    /// Place `content` on `canvas`, which need not be the active one.
    pub fn create_element(&mut self, content: ElementContent, canvas: CanvasId) -> EngineResult<ElementId> {
        let size = self.default_size(&content);
        let target = self.require_canvas_mut(canvas)?;
        let position = match target.layout() {
            Some(layout) if content.is_caption() => Point::new(0.0, layout.surface_size().height - size.height),
            _ => Point::ZERO,
        };
        let kind = content.kind();
        let id = target.insert_element(Element::new(content, position, size));
        self.pending_refresh.push((canvas, id));
        log::debug!("Created {:?} element {} on {}", kind, id, canvas);
        Ok(id)
    }

    /// Add an editable paragraph to the active canvas.
    pub fn add_text(&mut self, text: impl Into<String>) -> EngineResult<ElementId> {
        let canvas = self.require_active_canvas()?;
        self.create_element(ElementContent::text(text), canvas)
    }

    /// Add an image by URL to the active canvas.
    pub fn add_image(&mut self, source: impl Into<String>, natural_size: Option<Size>) -> EngineResult<ElementId> {
        let canvas = self.require_active_canvas()?;
        self.create_element(ElementContent::image(source, natural_size), canvas)
    }

    /// Add an uploaded image to the active canvas.
    pub fn add_image_bytes(&mut self, bytes: &[u8], mime: &str) -> EngineResult<ElementId> {
        if bytes.is_empty() {
            return Err(EngineError::EmptyContent("image file is empty"));
        }
        self.add_image(to_data_url(bytes, mime), None)
    }

    /// Add a decorative overlay image (no remove-background handle).
    pub fn add_overlay(&mut self, source: impl Into<String>, natural_size: Option<Size>) -> EngineResult<ElementId> {
        let canvas = self.require_active_canvas()?;
        let content = ElementContent::Image(ImageContent {
            source: source.into(),
            natural_size,
            overlay: true,
        });
        self.create_element(content, canvas)
    }

    /// Remove an element and its handles.
    pub fn delete_element(&mut self, canvas: CanvasId, element: ElementId) -> EngineResult<()> {
        self.require_canvas_mut(canvas)?
            .remove_element(element)
            .ok_or(EngineError::UnknownElement(element))?;
        self.controller.end_for(element);
        self.pending_refresh.retain(|&(_, pending)| pending != element);
        if self.context.is_active_text(element) {
            self.clear_active_text_element();
        }
        log::info!("Deleted element {} from {}", element, canvas);
        Ok(())
    }

    /// Select `element`. Only other elements of the same canvas lose
    /// their selection.
    pub fn select_element(&mut self, canvas: CanvasId, element: ElementId) -> EngineResult<()> {
        let deselected = self
            .require_canvas_mut(canvas)?
            .select(element)
            .ok_or(EngineError::UnknownElement(element))?;
        self.after_deselect(&deselected);
        Ok(())
    }

    fn deactivate_canvas(&mut self, canvas: CanvasId) {
        let Some(target) = self.canvas_mut(canvas) else {
            return;
        };
        let deselected = target.deselect_all();
        self.after_deselect(&deselected);
    }

    fn after_deselect(&mut self, elements: &[ElementId]) {
        for &element in elements {
            self.controller.end_for(element);
            if self.context.is_active_text(element) {
                self.clear_active_text_element();
            }
        }
    }

    /// End every gesture, e.g. when the window loses focus.
    pub fn cancel_gestures(&mut self) -> usize {
        self.controller.end_all()
    }

    // --- Text styling ---

    pub fn active_text_element(&self) -> Option<ActiveText> {
        self.context.active_text
    }

    /// Bind a text-bearing element to its canvas's style panel.
    ///
    /// Returns `false` for content that has no text style.
    pub fn set_active_text_element(&mut self, canvas: CanvasId, element: ElementId) -> EngineResult<bool> {
        let style = self
            .require_canvas(canvas)?
            .element(element)
            .ok_or(EngineError::UnknownElement(element))?
            .content
            .text_style()
            .cloned();
        let Some(style) = style else {
            return Ok(false);
        };
        if let Some(previous) = self.context.active_text {
            if previous.canvas != canvas {
                if let Some(other) = self.canvas_mut(previous.canvas) {
                    other.style_panel.hide();
                }
            }
        }
        self.context.active_text = Some(ActiveText { canvas, element });
        self.require_canvas_mut(canvas)?.style_panel.populate_from(&style);
        Ok(true)
    }

    /// Unbind the active text element and hide its panel.
    pub fn clear_active_text_element(&mut self) {
        if let Some(active) = self.context.active_text.take() {
            if let Some(canvas) = self.canvas_mut(active.canvas) {
                canvas.style_panel.hide();
            }
        }
    }

    /// Apply a style panel edit to the active text element.
    pub fn apply_style(&mut self, change: StyleChange) -> EngineResult<()> {
        let active = self.context.active_text.ok_or(EngineError::NoActiveText)?;
        let canvas = self.require_canvas_mut(active.canvas)?;
        let style = canvas
            .element_mut(active.element)
            .and_then(|e| e.content.text_style_mut())
            .ok_or(EngineError::UnknownElement(active.element))?;
        style.apply(&change);
        let style = style.clone();
        canvas.style_panel.populate_from(&style);
        Ok(())
    }

    // --- Pointer routing ---

    /// Route a pointer event that landed on `target`.
    pub fn dispatch(&mut self, target: HitTarget, event: &PointerEvent) -> Dispatch {
        let pointer = pointer_position(event);
        match event.phase {
            PointerPhase::Down => self.pointer_down(target, pointer),
            PointerPhase::Move => {
                let moved = self
                    .controller
                    .drive(pointer, &mut self.canvases, self.config.min_size);
                if moved.is_empty() {
                    Dispatch::Ignored
                } else {
                    Dispatch::Moved(moved)
                }
            }
            PointerPhase::Up => Dispatch::GesturesEnded(self.controller.end_all()),
            PointerPhase::Click => self.click(target),
        }
    }

    fn is_selected(&self, canvas: CanvasId, element: ElementId) -> Option<bool> {
        self.canvas(canvas)?.element(element).map(Element::is_selected)
    }

    fn pointer_down(&mut self, target: HitTarget, pointer: Point) -> Dispatch {
        match target {
            HitTarget::Handle { canvas, element, role } => match self.is_selected(canvas, element) {
                None => Dispatch::Ignored,
                Some(false) => self.select_for_dispatch(canvas, element),
                Some(true) => match gesture_for(role) {
                    Some(kind) => self.start_gesture(canvas, element, kind, pointer),
                    None => Dispatch::Ignored,
                },
            },
            HitTarget::Element { canvas, element } => match self.select_for_dispatch(canvas, element) {
                Dispatch::Selected(_) => self.start_gesture(canvas, element, GestureKind::Move, pointer),
                other => other,
            },
            HitTarget::EditableText { canvas, element } => self.select_for_dispatch(canvas, element),
            HitTarget::Background(canvas) => {
                if let Err(e) = self.set_active_canvas(canvas) {
                    log::warn!("Ignoring pointer-down: {}", e);
                }
                Dispatch::Ignored
            }
            HitTarget::Outside => Dispatch::Ignored,
        }
    }

    /// Select on behalf of a pointer event; the element's canvas becomes
    /// the active one.
    fn select_for_dispatch(&mut self, canvas: CanvasId, element: ElementId) -> Dispatch {
        if self.is_selected(canvas, element).is_none() {
            log::warn!("Ignoring selection of unknown element {}", element);
            return Dispatch::Ignored;
        }
        let result = self
            .set_active_canvas(canvas)
            .and_then(|()| self.select_element(canvas, element));
        match result {
            Ok(()) => Dispatch::Selected(element),
            Err(e) => {
                log::warn!("Ignoring selection: {}", e);
                Dispatch::Ignored
            }
        }
    }

    fn start_gesture(&mut self, canvas: CanvasId, element: ElementId, kind: GestureKind, pointer: Point) -> Dispatch {
        let Some(target) = self.canvas(canvas) else {
            return Dispatch::Ignored;
        };
        let (Some(layout), Some(el)) = (target.layout(), target.element(element)) else {
            // Not laid out yet; selection stands but nothing can be dragged.
            return Dispatch::Selected(element);
        };
        let session = match kind {
            GestureKind::Move => GestureSession::begin_move(canvas, el, layout, pointer),
            GestureKind::Resize => GestureSession::begin_resize(canvas, el, pointer),
            GestureKind::Rotate => GestureSession::begin_rotate(canvas, el, layout, pointer),
        };
        self.controller.begin(session);
        Dispatch::GestureStarted { element, kind }
    }

    fn click(&mut self, target: HitTarget) -> Dispatch {
        match target {
            HitTarget::Handle {
                canvas,
                element,
                role: HandleRole::Delete,
            } if self.is_selected(canvas, element) == Some(true) => match self.delete_element(canvas, element) {
                Ok(()) => Dispatch::Deleted(element),
                Err(_) => Dispatch::Ignored,
            },
            HitTarget::Handle {
                canvas,
                element,
                role: HandleRole::RemoveBackground,
            } if self.is_selected(canvas, element) == Some(true) => Dispatch::RemoveBackgroundRequested(element),
            HitTarget::Handle { .. } | HitTarget::Element { .. } => Dispatch::Ignored,
            HitTarget::EditableText { canvas, element } => {
                if let Dispatch::Ignored = self.select_for_dispatch(canvas, element) {
                    return Dispatch::Ignored;
                }
                match self.set_active_text_element(canvas, element) {
                    Ok(true) => Dispatch::TextActivated(element),
                    _ => Dispatch::Selected(element),
                }
            }
            HitTarget::Background(canvas) => {
                self.deactivate_canvas(canvas);
                self.clear_active_text_element();
                Dispatch::Deactivated(Some(canvas))
            }
            HitTarget::Outside => {
                let ids: Vec<CanvasId> = self.canvases.iter().map(Canvas::id).collect();
                for id in ids {
                    self.deactivate_canvas(id);
                }
                self.clear_active_text_element();
                Dispatch::Deactivated(None)
            }
        }
    }

    // --- Export ---

    /// Rasterize a canvas at the configured scale with transient UI hidden.
    pub fn export_canvas(&mut self, canvas: CanvasId, rasterizer: &mut dyn Rasterizer) -> EngineResult<RasterImage> {
        let scale = self.config.export_scale;
        let target = self.require_canvas_mut(canvas)?;
        Ok(export::export_canvas(target, rasterizer, scale)?)
    }

    // --- Article import ---

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Title candidates and body text of the last import.
    pub fn draft(&self) -> &ArticleDraft {
        &self.draft
    }

    /// Images fetched by the last import.
    pub fn image_panel(&self) -> &[PanelImage] {
        &self.image_panel
    }

    /// Scrape `url` and place its lead image and title on the active canvas.
    ///
    /// Individual images that fail to load are skipped. If the scrape
    /// itself fails nothing on any canvas changes.
    pub async fn import_article(&mut self, source: &dyn ContentSource, url: &str) -> EngineResult<ImportSummary> {
        let url = url.trim();
        if url.is_empty() {
            log::warn!("Import requested without a URL");
            return Err(EngineError::EmptyUrl);
        }
        let canvas = self.require_active_canvas()?;

        self.loading = true;
        let result = self.run_import(source, canvas, url).await;
        self.loading = false;

        match &result {
            Ok(summary) => log::info!(
                "Imported {} into {} ({} images, {} failed)",
                url,
                canvas,
                summary.images_loaded,
                summary.images_failed
            ),
            Err(e) => log::warn!("Import of {} failed: {}", url, e),
        }
        result
    }

    async fn run_import(&mut self, source: &dyn ContentSource, canvas: CanvasId, url: &str) -> EngineResult<ImportSummary> {
        let article = source.scrape(url, &self.config.language).await?;

        let urls: Vec<String> = article.all_image_urls().into_iter().map(String::from).collect();
        let mut panel = Vec::with_capacity(urls.len());
        let mut failed = 0;
        for image_url in &urls {
            match source.fetch_image(image_url).await {
                Ok(image) => panel.push(PanelImage {
                    url: image_url.clone(),
                    data_url: image.to_data_url(),
                }),
                Err(e) => {
                    log::warn!("Skipping image {}: {}", image_url, e);
                    failed += 1;
                }
            }
        }

        let lead_image = urls
            .first()
            .and_then(|first| panel.iter().find(|image| &image.url == first))
            .map(|image| image.data_url.clone());
        let image_element = match lead_image {
            Some(data_url) => Some(self.create_element(ElementContent::image(data_url, None), canvas)?),
            None => None,
        };

        let caption_element = match article.titles.first().filter(|t| !t.trim().is_empty()) {
            Some(title) => {
                let content = ElementContent::Html {
                    markup: format!("<h3>{}</h3>", escape_html(title.trim())),
                    caption: true,
                    style: TextStyle::title(),
                };
                Some(self.create_element(content, canvas)?)
            }
            None => None,
        };

        let images_loaded = panel.len();
        self.image_panel = panel;
        self.draft = ArticleDraft {
            titles: article.titles,
            body: article.body,
            summary: article.summary,
        };

        Ok(ImportSummary {
            images_loaded,
            images_failed: failed,
            image_element,
            caption_element,
        })
    }

    /// Place title candidate `index` of the last import on the active canvas.
    pub fn add_title(&mut self, index: usize) -> EngineResult<ElementId> {
        let canvas = self.require_active_canvas()?;
        let title = self
            .draft
            .titles
            .get(index)
            .cloned()
            .ok_or(EngineError::NoSuchTitle(index))?;
        let content = ElementContent::Text {
            text: title,
            style: TextStyle::title(),
        };
        self.create_element(content, canvas)
    }

    /// Place the body text of the last import on the active canvas.
    pub fn add_description(&mut self) -> EngineResult<ElementId> {
        let canvas = self.require_active_canvas()?;
        if self.draft.body.trim().is_empty() {
            return Err(EngineError::EmptyContent("no article text loaded"));
        }
        let body = self.draft.body.clone();
        self.create_element(ElementContent::text(body), canvas)
    }

    /// Place image `index` of the image panel on the active canvas.
    pub fn add_panel_image(&mut self, index: usize) -> EngineResult<ElementId> {
        let canvas = self.require_active_canvas()?;
        let data_url = self
            .image_panel
            .get(index)
            .map(|image| image.data_url.clone())
            .ok_or(EngineError::NoSuchImage(index))?;
        self.create_element(ElementContent::image(data_url, None), canvas)
    }
}
