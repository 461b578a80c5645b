use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; adforge/0.1)";

/// Scraped page text is bounded before it can reach the embedder or store.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Fetches a page and reduces it to bounded plain text.
///
/// Any failure (transport, HTTP status, decoding) yields an empty string;
/// callers skip empty pages.
pub struct Scraper {
    client: Client,
}

impl Scraper {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    pub async fn scrape(&self, url: &str) -> String {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(url, error = %err, "scrape request failed");
                return String::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!(url, status = %response.status(), "scrape rejected");
            return String::new();
        }

        match response.text().await {
            Ok(html) => extract_text(&html),
            Err(err) => {
                tracing::warn!(url, error = %err, "scrape body unreadable");
                String::new()
            }
        }
    }
}

impl Default for Scraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip script/style blocks and markup, collapse whitespace, bound length.
fn extract_text(html: &str) -> String {
    static SCRIPT_STYLE: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let script_style = SCRIPT_STYLE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").expect("valid regex")
    });
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"));

    let without_blocks = script_style.replace_all(html, " ");
    let without_tags = tag.replace_all(&without_blocks, " ");

    without_tags
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_CONTENT_CHARS)
        .collect()
}
