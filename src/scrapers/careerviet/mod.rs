//! CareerViet job board: pagination and page extractors.
//!
//! Search-results pages are addressed as `<slug>-vi.html` for the first page
//! and `<slug>-trang-N-vi.html` for page N.

pub mod detail;
pub mod listing;

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

pub use detail::extract_detail;
pub use listing::extract_listings;

static PAGED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*)-trang-\d+(-vi\.html)").unwrap());

/// Listing page URLs to crawl, starting from `base_url`.
///
/// A first-page URL is kept as given and followed by pages `2..=max_pages`.
/// A URL already pointing at page N restarts from page 1. Any other URL is
/// crawled alone.
pub fn page_urls(base_url: &str, max_pages: usize) -> Vec<String> {
    let following = |slug: &str| -> Vec<String> {
        (2..=max_pages)
            .map(|page| format!("{}-trang-{}-vi.html", slug, page))
            .collect()
    };

    let urls = if base_url.ends_with("-vi.html") && !base_url.contains("trang-") {
        let slug = base_url.trim_end_matches("-vi.html");
        let mut urls = vec![base_url.to_string()];
        urls.extend(following(slug));
        urls
    } else if let Some(caps) = PAGED_URL.captures(base_url) {
        let slug = &caps[1];
        let mut urls = vec![format!("{}{}", slug, &caps[2])];
        urls.extend(following(slug));
        urls
    } else {
        vec![base_url.to_string()]
    };

    info!("Generated {} page URLs from {}", urls.len(), base_url);
    urls
}
