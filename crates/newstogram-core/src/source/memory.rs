//! In-memory content source.

use super::{BoxFuture, ContentSource, FetchedImage, ScrapedArticle, SourceError, SourceResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory content source for testing and offline use.
#[derive(Default)]
pub struct MemorySource {
    articles: RwLock<HashMap<String, ScrapedArticle>>,
    images: RwLock<HashMap<String, FetchedImage>>,
}

impl MemorySource {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `article` for `url`.
    pub fn insert_article(&self, url: impl Into<String>, article: ScrapedArticle) {
        if let Ok(mut articles) = self.articles.write() {
            articles.insert(url.into(), article);
        }
    }

    /// Serve `image` for `url`.
    pub fn insert_image(&self, url: impl Into<String>, image: FetchedImage) {
        if let Ok(mut images) = self.images.write() {
            images.insert(url.into(), image);
        }
    }
}

impl ContentSource for MemorySource {
    fn scrape(&self, url: &str, _lang: &str) -> BoxFuture<'_, SourceResult<ScrapedArticle>> {
        let url = url.to_string();
        Box::pin(async move {
            let articles = self
                .articles
                .read()
                .map_err(|e| SourceError::Request(format!("Lock error: {}", e)))?;
            articles
                .get(&url)
                .cloned()
                .ok_or(SourceError::NotFound(url))
        })
    }

    fn fetch_image(&self, url: &str) -> BoxFuture<'_, SourceResult<FetchedImage>> {
        let url = url.to_string();
        Box::pin(async move {
            let images = self
                .images
                .read()
                .map_err(|e| SourceError::Request(format!("Lock error: {}", e)))?;
            images
                .get(&url)
                .cloned()
                .ok_or(SourceError::NotFound(url))
        })
    }
}
