//! Sitemap document parsing.
//!
//! Sitemaps come in two shapes: a `<urlset>` of page locations and a
//! `<sitemapindex>` of child sitemaps. Both are deserialized with
//! quick-xml and yield their `<loc>` entries; an index is *not* followed
//! recursively — its child-sitemap locations are returned as-is, matching
//! the reference behavior of collecting every `<loc>` uniformly.

use serde::Deserialize;

/// `<urlset>` document: one `<url><loc>…</loc></url>` per page.
#[derive(Debug, Deserialize)]
struct Urlset {
    #[serde(default)]
    url: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    loc: String,
}

/// `<sitemapindex>` document listing child sitemaps.
#[derive(Debug, Deserialize)]
struct SitemapIndex {
    #[serde(default)]
    sitemap: Vec<SitemapEntry>,
}

#[derive(Debug, Deserialize)]
struct SitemapEntry {
    loc: String,
}

/// Collect every `<loc>` from a sitemap document.
///
/// Returns an empty vec when the body is not a recognizable sitemap.
pub fn parse_locations(xml: &str) -> Vec<String> {
    if let Ok(urlset) = quick_xml::de::from_str::<Urlset>(xml) {
        if !urlset.url.is_empty() {
            return urlset
                .url
                .into_iter()
                .map(|entry| entry.loc.trim().to_string())
                .collect();
        }
    }

    if let Ok(index) = quick_xml::de::from_str::<SitemapIndex>(xml) {
        return index
            .sitemap
            .into_iter()
            .map(|entry| entry.loc.trim().to_string())
            .collect();
    }

    Vec::new()
}
