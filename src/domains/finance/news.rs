//! News extraction: keep story items and render them as plain text.

use serde_json::Value;
use tracing::info;

/// Content type retained by the extractor.
pub const STORY_CONTENT_TYPE: &str = "STORY";

/// Fetch a nested string, defaulting to empty at any missing level.
fn text_at<'a>(item: &'a Value, pointer: &str) -> &'a str {
    item.pointer(pointer).and_then(Value::as_str).unwrap_or("")
}

/// Render every story item as a `Title/Summary/Description/URL` block.
pub fn extract_news(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter(|item| text_at(item, "/content/contentType") == STORY_CONTENT_TYPE)
        .map(|item| {
            format!(
                "Title: {}\nSummary: {}\nDescription: {}\nURL: {}",
                text_at(item, "/content/title"),
                text_at(item, "/content/summary"),
                text_at(item, "/content/description"),
                text_at(item, "/content/canonicalUrl/url"),
            )
        })
        .collect()
}

/// The "no results" sentinel for a ticker.
pub fn no_news_message(ticker: &str) -> String {
    format!("No news found for company that searched with {ticker} ticker.")
}

/// Join story blocks with a blank line, or return the sentinel when none survive.
pub fn render_news(ticker: &str, items: &[Value]) -> String {
    let blocks = extract_news(items);
    if blocks.is_empty() {
        let message = no_news_message(ticker);
        info!("{}", message);
        return message;
    }
    blocks.join("\n\n")
}
