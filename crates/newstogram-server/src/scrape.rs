//! Article extraction from raw HTML.

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

/// What the scraper pulls out of a news page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// First `h1`, trimmed.
    pub title: String,
    /// Article paragraphs, one per line.
    pub content: String,
    /// Article images in document order, de-duplicated.
    pub images: Vec<String>,
    /// Listing thumbnail outside the article, empty when absent.
    pub thumbnail: String,
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// First match of `css` in the whole document.
fn first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    document.select(&selector).next()
}

/// Every match of `css` below `scope`.
fn all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(selector) => scope.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// Lazy-loaded images keep the real URL in `data-src`.
fn image_source(img: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
    let value = img.value();
    let raw = value
        .attr("data-src")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| value.attr("src"))?
        .trim();
    if raw.is_empty() {
        return None;
    }
    Some(match base.and_then(|b| b.join(raw).ok()) {
        Some(resolved) => resolved.to_string(),
        None => raw.to_string(),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract title, body, images and thumbnail. Relative image URLs are
/// resolved against `page_url` when it parses.
pub fn extract(html: &str, page_url: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let title = first(&document, "h1").map(text_of).unwrap_or_default();

    let mut content = String::new();
    let mut images: Vec<String> = Vec::new();
    if let Some(article) = first(&document, "article") {
        for paragraph in all(article, "p") {
            content.push_str(&text_of(paragraph));
            content.push('\n');
        }
        for img in all(article, "img") {
            if let Some(src) = image_source(img, base.as_ref()) {
                if !images.contains(&src) {
                    images.push(src);
                }
            }
        }
    }

    let thumbnail = first(&document, "a.mg-blog-thumb img")
        .and_then(|img| image_source(img, base.as_ref()))
        .unwrap_or_default();

    ExtractedPage {
        title,
        content,
        images,
        thumbnail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <a class="mg-blog-thumb" href="/post"><img src="/thumb.jpg"></a>
          <h1>  Breaking News  </h1>
          <h1>Second heading</h1>
          <article>
            <p> First paragraph. </p>
            <img data-src="https://cdn.test/a.jpg" src="placeholder.gif">
            <p>Second paragraph.</p>
            <img src="https://cdn.test/a.jpg">
            <img src="b.jpg">
            <img>
          </article>
        </body></html>
    "#;

    #[test]
    fn test_extract_article() {
        let page = extract(PAGE, "https://news.test/2024/story");
        assert_eq!(page.title, "Breaking News");
        assert_eq!(page.content, "First paragraph.\nSecond paragraph.\n");
        assert_eq!(
            page.images,
            vec!["https://cdn.test/a.jpg".to_string(), "https://news.test/2024/b.jpg".to_string()]
        );
        assert_eq!(page.thumbnail, "https://news.test/thumb.jpg");
    }

    #[test]
    fn test_extract_without_article() {
        let page = extract("<html><body><p>loose</p></body></html>", "not a url");
        assert_eq!(page, ExtractedPage::default());
        assert_eq!(page.thumbnail, "");
    }

    #[test]
    fn test_unresolvable_base_keeps_raw_src() {
        let page = extract(r#"<article><img src="x.png"></article>"#, "");
        assert_eq!(page.images, vec!["x.png".to_string()]);
    }
}
