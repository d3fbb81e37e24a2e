//! Workspace errors.

use crate::canvas::CanvasId;
use crate::element::ElementId;
use crate::export::ExportError;
use crate::source::SourceError;
use thiserror::Error;

/// Errors returned by [`Workspace`](crate::workspace::Workspace) operations.
///
/// Messages are meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Select a canvas first.")]
    NoActiveCanvas,
    #[error("Unknown canvas: {0}")]
    UnknownCanvas(CanvasId),
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),
    #[error("Select a text element first.")]
    NoActiveText,
    #[error("Please enter a valid URL")]
    EmptyUrl,
    #[error("No title candidate at index {0}")]
    NoSuchTitle(usize),
    #[error("No fetched image at index {0}")]
    NoSuchImage(usize),
    #[error("Nothing to insert: {0}")]
    EmptyContent(&'static str),
    #[error("Failed to load content: {0}")]
    Source(#[from] SourceError),
    #[error("Failed to export canvas: {0}")]
    Export(#[from] ExportError),
}

/// Result type for workspace operations.
pub type EngineResult<T> = Result<T, EngineError>;
