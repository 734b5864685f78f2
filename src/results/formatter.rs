//! Renders search results as model input context

use super::types::SearchResult;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Format every result, preserving input order.
///
/// Each result becomes a numbered block; blocks are separated by a blank
/// line. An empty slice yields an empty string.
pub fn format_results(results: &[SearchResult]) -> String {
    format_results_limited(results, usize::MAX)
}

/// Format at most `max` results, preserving input order
pub fn format_results_limited(results: &[SearchResult], max: usize) -> String {
    results
        .iter()
        .take(max)
        .enumerate()
        .map(|(i, result)| format_one(i + 1, result))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_one(position: usize, result: &SearchResult) -> String {
    let mut block = format!("[{}] {}", position, clean_text(&result.title));

    let description = clean_text(&result.description);
    if !description.is_empty() {
        block.push('\n');
        block.push_str(&description);
    }

    let url = result.url.trim();
    if !url.is_empty() {
        block.push_str("\nSource: ");
        block.push_str(url);
    }

    block
}

/// Strip inline HTML tags and decode the entities providers commonly emit
pub fn clean_text(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    stripped
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        // last, so "&amp;lt;" decodes to "&lt;" and not "<"
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
