//! Open directory-listing probing for conventional upload paths.

use scraper::{Html, Selector};
use url::Url;

use super::resolve;
use crate::paths;

/// Whether a response body looks like a server-generated directory index.
///
/// Text-marker heuristic inherited from the reference behavior; isolated
/// here so it can be swapped for a structural check later.
pub fn looks_like_directory_listing(body: &str) -> bool {
    body.contains("Index of")
}

/// Extract image links from a directory-listing page.
///
/// Keeps anchors whose resolved path carries one of the given image
/// extensions; everything else (parent-directory links, subdirectories,
/// sort toggles) is dropped.
pub fn extract_listing_images(
    html: &str,
    listing_url: &Url,
    extensions: &[String],
) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();
    let mut images = Vec::new();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute) = resolve(listing_url, href) {
                if let Ok(parsed) = Url::parse(&absolute) {
                    if paths::has_image_extension(&parsed, extensions) {
                        images.push(absolute);
                    }
                }
            }
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        ["jpg", "jpeg", "png", "gif", "webp", "svg", "ico"]
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    const LISTING: &str = r#"<html><head><title>Index of /wp-content/uploads/</title></head>
<body><h1>Index of /wp-content/uploads/</h1>
<a href="../">../</a>
<a href="2021/">2021/</a>
<a href="header.png">header.png</a>
<a href="photo.JPG">photo.JPG</a>
<a href="notes.txt">notes.txt</a>
</body></html>"#;

    #[test]
    fn test_listing_marker_heuristic() {
        assert!(looks_like_directory_listing(LISTING));
        assert!(!looks_like_directory_listing(
            "<html><body>404 not found</body></html>"
        ));
    }

    #[test]
    fn test_extracts_only_image_anchors() {
        let base = Url::parse("https://site.example/wp-content/uploads/").unwrap();
        let urls = extract_listing_images(LISTING, &base, &exts());
        assert_eq!(
            urls,
            vec![
                "https://site.example/wp-content/uploads/header.png".to_string(),
                "https://site.example/wp-content/uploads/photo.JPG".to_string(),
            ]
        );
    }
}
