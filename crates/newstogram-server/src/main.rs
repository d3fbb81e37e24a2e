//! Newstogram backend
//!
//! Scrapes news articles, translates them through an OpenAI-compatible
//! model and proxies article images so the composer can draw them without
//! cross-origin restrictions.
//!
//! ## Endpoints
//!
//! ```text
//! GET /scrape?url=<article>&lang=<code>   -> { "judul": [...], "isi": "...", "gambar": [...], "thumbnail": "..." }
//! GET /stream-image?url=<image>           -> image bytes, upstream content type
//! GET /health                             -> "ok"
//! ```

mod config;
mod error;
mod llm;
mod scrape;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderValue, Method, header},
    response::{IntoResponse, Response},
    routing::get,
};
use config::ServerConfig;
use error::ApiError;
use llm::{LlmClient, Translation};
use newstogram_core::ScrapedArticle;
use reqwest::Url;
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

const DEFAULT_LANG: &str = "id";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Shared server state
struct AppState {
    http: reqwest::Client,
    llm: Option<LlmClient>,
}

impl AppState {
    fn new(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        let llm = config
            .llm
            .clone()
            .map(|settings| LlmClient::new(http.clone(), settings));
        Ok(Self { http, llm })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeQuery {
    url: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageQuery {
    url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newstogram_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::new(&config)?);
    match &state.llm {
        Some(llm) => info!("Translation enabled with model {}", llm.model()),
        None => warn!("OPENAI_API_KEY not set; articles are returned untranslated"),
    }

    let app = router(state, cors_layer(config.frontend_url.as_deref()));

    let addr = config.addr();
    info!("Newstogram backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/scrape", get(scrape_article))
        .route("/stream-image", get(stream_image))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when unset, otherwise only the composer's origin.
fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let Some(origin) = frontend_url else {
        return CorsLayer::permissive();
    };
    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => {
            warn!("FRONTEND_URL '{}' is not a valid origin; allowing any", origin);
            CorsLayer::permissive()
        }
    }
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// Validate the `url` query parameter as an absolute http(s) URL.
fn required_url(raw: Option<String>) -> Result<Url, ApiError> {
    let raw = raw
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingUrl)?;
    let url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidUrl(format!("unsupported scheme '{other}'"))),
    }
}

/// Scrape an article and translate it.
async fn scrape_article(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<ScrapedArticle>, ApiError> {
    let url = required_url(query.url)?;
    let lang = query
        .lang
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| DEFAULT_LANG.to_string());

    let response = state
        .http
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ApiError::PageFetch(e.to_string()))?;
    if !response.status().is_success() {
        return Err(ApiError::PageFetch(format!("{} returned {}", url, response.status())));
    }
    let html = response
        .text()
        .await
        .map_err(|e| ApiError::PageFetch(e.to_string()))?;

    let page = scrape::extract(&html, url.as_str());
    info!(
        "Scraped {}: {} chars, {} images",
        url,
        page.content.len(),
        page.images.len()
    );

    let translation = match &state.llm {
        Some(llm) => {
            let reply = llm.translate(&page.content, &lang).await?;
            llm::parse_translation(&reply, &page.title, &page.content)
        }
        None => Translation::untranslated(&page.title, &page.content),
    };

    Ok(Json(ScrapedArticle {
        titles: translation.titles,
        body: translation.body,
        images: page.images,
        thumbnail: page.thumbnail,
        summary: translation.summary,
    }))
}

/// Proxy an image, keeping the upstream content type.
async fn stream_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let url = required_url(query.url)?;

    let response = state
        .http
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ApiError::ImageFetch(e.to_string()))?;
    if !response.status().is_success() {
        return Err(ApiError::ImageFetch(format!("{} returned {}", url, response.status())));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::ImageFetch(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, HeaderValue::from_static("inline")),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(&ServerConfig::default()).unwrap())
    }

    #[test]
    fn test_required_url() {
        assert!(matches!(required_url(None), Err(ApiError::MissingUrl)));
        assert!(matches!(required_url(Some("   ".into())), Err(ApiError::MissingUrl)));
        assert!(matches!(required_url(Some("not a url".into())), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(
            required_url(Some("file:///etc/passwd".into())),
            Err(ApiError::InvalidUrl(_))
        ));
        let url = required_url(Some(" https://news.test/a ".into())).unwrap();
        assert_eq!(url.as_str(), "https://news.test/a");
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn test_scrape_requires_url() {
        let result = scrape_article(State(state()), Query(ScrapeQuery::default())).await;
        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::MissingUrl));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stream_image_rejects_bad_url() {
        let query = ImageQuery {
            url: Some("ftp://cdn.test/a.png".into()),
        };
        let result = stream_image(State(state()), Query(query)).await;
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_router_builds_with_either_cors_mode() {
        let _open = router(state(), cors_layer(None));
        let _locked = router(state(), cors_layer(Some("https://newstogram.test")));
        let _fallback = router(state(), cors_layer(Some("bad\norigin")));
    }
}
