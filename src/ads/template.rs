//! Deterministic template fallback.
//!
//! Last tier of the generation chain: composes headline, review highlights
//! and a fixed call to action without any remote dependency, so ad
//! generation can always return text.

use std::sync::OnceLock;

use regex::Regex;

const HIGHLIGHT_LIMIT: usize = 3;
const SNIPPET_MAX_CHARS: usize = 140;
const CALL_TO_ACTION: &str = "Don't wait: order now while supplies last.";

/// Compose `headline + body(snippets) + call to action`.
pub fn render(product: &str, snippets: &[String]) -> String {
    let headline = format!("{product}: the choice customers keep coming back to.");

    let highlights: Vec<String> = snippets
        .iter()
        .map(|s| first_sentence(s))
        .filter(|s| !s.is_empty())
        .take(HIGHLIGHT_LIMIT)
        .map(|s| format!("\"{s}\""))
        .collect();

    if highlights.is_empty() {
        return format!("{headline} {CALL_TO_ACTION}");
    }

    format!(
        "{headline} Real customers say: {}. {CALL_TO_ACTION}",
        highlights.join(" ")
    )
}

/// First sentence of a snippet, bounded in length. Review text scraped from
/// the web is often one long block; one sentence is enough for a headline
/// highlight.
fn first_sentence(text: &str) -> String {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    let boundary = BOUNDARY.get_or_init(|| Regex::new(r"[.!?](\s|$)").expect("valid regex"));

    let trimmed = text.trim();
    let sentence = match boundary.find(trimmed) {
        Some(found) => trimmed[..found.start()].trim_end(),
        None => trimmed,
    };

    sentence.chars().take(SNIPPET_MAX_CHARS).collect()
}
