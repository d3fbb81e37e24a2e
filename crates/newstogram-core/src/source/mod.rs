//! Content sources: where scraped articles and their images come from.

mod memory;

#[cfg(feature = "http")]
mod http;

pub use memory::MemorySource;

#[cfg(feature = "http")]
pub use http::HttpSource;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Content source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Result type for content source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A scraped and translated article, as the backend returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedArticle {
    /// Title candidates, best first.
    #[serde(rename = "judul", default)]
    pub titles: Vec<String>,
    /// Body text.
    #[serde(rename = "isi", default)]
    pub body: String,
    /// Article image URLs in document order.
    #[serde(rename = "gambar", default)]
    pub images: Vec<String>,
    /// Listing thumbnail outside the article; empty when the page has none.
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ScrapedArticle {
    /// Gallery images followed by the thumbnail, blanks skipped.
    pub fn all_image_urls(&self) -> Vec<&str> {
        self.images
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.thumbnail.as_str()))
            .filter(|url| !url.trim().is_empty())
            .collect()
    }
}

/// Raw image bytes fetched through the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl FetchedImage {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Encode as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        to_data_url(&self.bytes, &self.mime)
    }
}

/// Encode bytes as a base64 `data:` URL.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    let mime = if mime.trim().is_empty() {
        "application/octet-stream"
    } else {
        mime.trim()
    };
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Backend that scrapes articles and proxies their images.
pub trait ContentSource {
    /// Scrape `url`, translated into `lang`.
    fn scrape(&self, url: &str, lang: &str) -> BoxFuture<'_, SourceResult<ScrapedArticle>>;

    /// Fetch one image by URL.
    fn fetch_image(&self, url: &str) -> BoxFuture<'_, SourceResult<FetchedImage>>;
}
