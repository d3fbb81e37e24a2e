//! Content source backed by the scraping server.

use crate::config::EngineConfig;
use super::{BoxFuture, ContentSource, FetchedImage, ScrapedArticle, SourceError, SourceResult};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Error body the server sends with non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to `GET {endpoint}/scrape` and `GET {endpoint}/stream-image`.
pub struct HttpSource {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(endpoint: &str) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Request(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Client for the backend named in `config`.
    pub fn from_config(config: &EngineConfig) -> SourceResult<Self> {
        Self::new(&config.endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> SourceResult<reqwest::Response> {
        let response = self
            .http
            .get(format!("{}{}", self.endpoint, path))
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(SourceError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl ContentSource for HttpSource {
    fn scrape(&self, url: &str, lang: &str) -> BoxFuture<'_, SourceResult<ScrapedArticle>> {
        let url = url.to_string();
        let lang = lang.to_string();
        Box::pin(async move {
            let response = self.get("/scrape", &[("url", url.as_str()), ("lang", lang.as_str())]).await?;
            response
                .json::<ScrapedArticle>()
                .await
                .map_err(|e| SourceError::Decode(e.to_string()))
        })
    }

    fn fetch_image(&self, url: &str) -> BoxFuture<'_, SourceResult<FetchedImage>> {
        let url = url.to_string();
        Box::pin(async move {
            let response = self.get("/stream-image", &[("url", url.as_str())]).await?;
            let mime = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let bytes = response
                .bytes()
                .await
                .map_err(|e| SourceError::Request(e.to_string()))?;
            Ok(FetchedImage::new(bytes.to_vec(), mime))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash() {
        let source = HttpSource::new("http://localhost:3000/").unwrap();
        assert_eq!(source.endpoint(), "http://localhost:3000");
    }

    #[test]
    fn test_from_config() {
        let config = EngineConfig {
            endpoint: "https://api.newstogram.test/".into(),
            ..EngineConfig::default()
        };
        let source = HttpSource::from_config(&config).unwrap();
        assert_eq!(source.endpoint(), "https://api.newstogram.test");
    }
}
