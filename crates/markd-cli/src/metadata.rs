//! URL metadata fetching
//!
//! Fetches a page title when a bookmark is saved without one.

use anyhow::Result;
use scraper::{Html, Selector};
use std::time::Duration;

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Fetch the page title for a URL (async)
///
/// Returns None on any failure (graceful degradation); the caller falls
/// back to the hostname.
pub async fn fetch_title(url: &str) -> Option<String> {
    fetch_title_inner(url).await.ok().flatten()
}

/// Inner fetch function that can fail
async fn fetch_title_inner(url: &str) -> Result<Option<String>> {
    let candidate = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT))
        .user_agent("Mozilla/5.0 (compatible; Markd/0.1)")
        .build()?;

    let response = client.get(&candidate).send().await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let html = response.text().await?;
    Ok(extract_title(&html))
}

/// Extract a title from HTML content, preferring Open Graph
fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Ok(selector) = Selector::parse(r#"meta[property="og:title"]"#) {
        if let Some(element) = document.select(&selector).next() {
            if let Some(content) = element.value().attr("content") {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("title") {
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect();
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_prefers_og_title() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="OG Title" />
                <title>Plain Title</title>
            </head><body></body></html>
        "#;
        assert_eq!(extract_title(html), Some("OG Title".to_string()));
    }

    #[test]
    fn test_extract_title_falls_back_to_title_tag() {
        let html = "<html><head><title>  Plain Title  </title></head></html>";
        assert_eq!(extract_title(html), Some("Plain Title".to_string()));
    }

    #[test]
    fn test_extract_title_none_when_missing() {
        let html = "<html><head></head><body><p>no title here</p></body></html>";
        assert_eq!(extract_title(html), None);
    }
}
