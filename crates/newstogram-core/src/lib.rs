//! Newstogram Core Library
//!
//! Headless canvas transform engine for the Newstogram composer: elements
//! placed on independent canvases, their rotation-aware control handles,
//! and the pointer gestures that move, resize and rotate them.

pub mod canvas;
pub mod config;
pub mod element;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod source;
pub mod style;
pub mod widget;
pub mod workspace;

pub use canvas::{Canvas, CanvasId, CanvasLayout};
pub use config::{ConfigError, EngineConfig};
pub use element::{ContentKind, Element, ElementContent, ElementId, ImageContent, SerializableColor, TextStyle};
pub use error::{EngineError, EngineResult};
pub use export::{ExportError, RasterImage, Rasterizer};
pub use input::{HitTarget, PointerEvent, PointerPhase, PointerSource};
pub use interaction::{GestureKind, GestureSession, InteractionController};
pub use source::{ContentSource, FetchedImage, MemorySource, ScrapedArticle, SourceError, SourceResult};
pub use style::{ActiveText, EditContext, StyleChange, StylePanel};
pub use widget::{Handle, HandleRole, HandleSet};
pub use workspace::{ArticleDraft, CanvasThumbnail, Dispatch, ImportSummary, PanelImage, Workspace};

#[cfg(feature = "http")]
pub use source::HttpSource;
