//! Image reference extraction from scraped page HTML.
//!
//! Three sources per page: `<img src>`, the lazy-load `<img data-src>`
//! variant, and inline `style` attributes carrying a
//! `background-image: url(...)` declaration. References are resolved
//! against the page URL; only http(s) results survive.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::resolve;

static BACKGROUND_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"background-image:\s*url\(["']?([^"')]+)["']?\)"#)
        .expect("Invalid background-image regex")
});

/// Extract every image URL referenced by a page, resolved to absolute form.
///
/// Duplicates are preserved; the caller accumulates into a set.
pub fn extract_image_urls(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut images = Vec::new();

    // Constant selectors are known-valid
    let img_selector = Selector::parse("img").unwrap();
    let styled_selector = Selector::parse("[style]").unwrap();

    for element in document.select(&img_selector) {
        if let Some(src) = element.value().attr("src") {
            if let Some(absolute) = resolve(page_url, src) {
                images.push(absolute);
            }
        }
        // Lazy-loaded images keep their real source in data-src
        if let Some(data_src) = element.value().attr("data-src") {
            if let Some(absolute) = resolve(page_url, data_src) {
                images.push(absolute);
            }
        }
    }

    for element in document.select(&styled_selector) {
        let style = element.value().attr("style").unwrap_or("");
        for capture in BACKGROUND_IMAGE.captures_iter(style) {
            if let Some(absolute) = resolve(page_url, &capture[1]) {
                images.push(absolute);
            }
        }
    }

    images
}
