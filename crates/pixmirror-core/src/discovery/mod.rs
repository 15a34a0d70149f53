//! Candidate URL discovery.
//!
//! Three strategies feed one deduplicated set: the first responsive
//! well-known sitemap (falling back to a conventional page list), image
//! references scraped from each page, and open upload-directory listings.
//! Discovery is strictly best-effort — a strategy that fails contributes
//! nothing and the run continues.

pub mod listing;
pub mod page;
pub mod sitemap;

use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

use crate::config::{DiscoveryConfig, HttpConfig};
use crate::fetch::Fetcher;
use crate::paths;

/// Resolve an HTML reference against its base, keeping http(s) only.
pub(crate) fn resolve(base: &Url, reference: &str) -> Option<String> {
    let resolved = base.join(reference).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.into()),
        _ => None,
    }
}

/// Aggregates candidate image URLs for a site.
pub struct DiscoveryEngine {
    config: DiscoveryConfig,
    page_delay: Duration,
}

impl DiscoveryEngine {
    /// Create a discovery engine from the discovery and HTTP settings.
    pub fn new(config: DiscoveryConfig, http: &HttpConfig) -> Self {
        Self {
            config,
            page_delay: Duration::from_millis(http.page_delay_ms),
        }
    }

    /// Run every strategy and return the extension-filtered candidate set.
    pub async fn discover(&self, fetcher: &Fetcher, site_root: &Url) -> BTreeSet<String> {
        let pages = self.page_urls(fetcher, site_root).await;
        tracing::info!("Found {} page(s) to scan", pages.len());

        let mut candidates = BTreeSet::new();
        self.scrape_pages(fetcher, &pages, &mut candidates).await;
        self.probe_upload_dirs(fetcher, site_root, &mut candidates)
            .await;

        self.filter_candidates(candidates)
    }

    /// Page URLs from the first responsive sitemap, or the conventional
    /// fallback list when no sitemap yields anything.
    pub async fn page_urls(&self, fetcher: &Fetcher, site_root: &Url) -> Vec<String> {
        let mut urls = Vec::new();

        for path in &self.config.sitemap_paths {
            let Ok(sitemap_url) = site_root.join(path) else {
                continue;
            };
            match fetcher.fetch_page(sitemap_url.as_str()).await {
                Ok(body) => {
                    urls = sitemap::parse_locations(&body);
                    tracing::info!("Found {} URL(s) in sitemap {}", urls.len(), sitemap_url);
                    // First successful sitemap wins; later ones are not merged
                    break;
                }
                Err(e) => {
                    tracing::debug!("Sitemap probe {} failed: {}", sitemap_url, e);
                }
            }
        }

        if urls.is_empty() {
            tracing::info!("No sitemap URLs; assuming conventional pages");
            urls = self
                .config
                .fallback_pages
                .iter()
                .filter_map(|path| site_root.join(path).ok())
                .map(Into::into)
                .collect();
        }

        urls
    }

    /// Scrape each page for image references, with a politeness delay
    /// between fetches. Scrape failures yield zero images for that page.
    pub async fn scrape_pages(
        &self,
        fetcher: &Fetcher,
        pages: &[String],
        candidates: &mut BTreeSet<String>,
    ) {
        for (index, page) in pages.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.page_delay).await;
            }

            let Ok(page_url) = Url::parse(page) else {
                tracing::warn!("Skipping unparseable page URL: {}", page);
                continue;
            };

            tracing::debug!("Scanning page: {}", page);
            match fetcher.fetch_page(page).await {
                Ok(html) => {
                    let found = page::extract_image_urls(&html, &page_url);
                    tracing::debug!("{} image ref(s) on {}", found.len(), page);
                    candidates.extend(found);
                }
                Err(e) => {
                    tracing::warn!("Failed to scan {}: {}", page, e);
                }
            }
        }
    }

    /// Probe conventional upload directories for open listings.
    pub async fn probe_upload_dirs(
        &self,
        fetcher: &Fetcher,
        site_root: &Url,
        candidates: &mut BTreeSet<String>,
    ) {
        for dir in &self.config.upload_dirs {
            let Ok(dir_url) = site_root.join(dir) else {
                continue;
            };
            match fetcher.fetch_page(dir_url.as_str()).await {
                Ok(body) if listing::looks_like_directory_listing(&body) => {
                    let found = listing::extract_listing_images(
                        &body,
                        &dir_url,
                        &self.config.image_extensions,
                    );
                    tracing::info!("{} image(s) listed under {}", found.len(), dir_url);
                    candidates.extend(found);
                }
                Ok(_) => {
                    tracing::debug!("{} is not an open listing", dir_url);
                }
                Err(e) => {
                    tracing::debug!("Could not access {}: {}", dir_url, e);
                }
            }
        }
    }

    /// Keep only candidates whose URL path carries an image extension.
    /// No content-type sniffing; everything else is silently dropped.
    pub fn filter_candidates(&self, candidates: BTreeSet<String>) -> BTreeSet<String> {
        candidates
            .into_iter()
            .filter(|candidate| {
                Url::parse(candidate)
                    .map(|url| paths::has_image_extension(&url, &self.config.image_extensions))
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;

    fn engine() -> DiscoveryEngine {
        DiscoveryEngine::new(DiscoveryConfig::default(), &HttpConfig::default())
    }

    fn page_html(n: usize) -> String {
        format!(
            r#"<html><body>
<img src="/media/photo-{n}.jpg">
<img data-src="/media/lazy-{n}.png">
<div style="background-image: url('/media/bg-{n}.webp')"></div>
</body></html>"#
        )
    }

    #[test]
    fn test_three_pages_yield_nine_unique_candidates() {
        // Sitemap with 3 pages, each carrying a src image, a data-src-only
        // image, and an inline background-image: 9 unique candidates.
        let mut candidates = BTreeSet::new();
        for n in 1..=3 {
            let page_url = Url::parse(&format!("https://site.example/page-{n}")).unwrap();
            candidates.extend(page::extract_image_urls(&page_html(n), &page_url));
        }
        assert_eq!(candidates.len(), 9);

        let filtered = engine().filter_candidates(candidates);
        assert_eq!(filtered.len(), 9);
    }

    #[test]
    fn test_filter_drops_non_image_paths() {
        let candidates: BTreeSet<String> = [
            "https://site.example/media/banner.JPG?v=2",
            "https://site.example/about.html",
            "https://site.example/feed",
            "https://site.example/wp-content/uploads/2021/05/photo.png",
            "not a url at all",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let filtered = engine().filter_candidates(candidates);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.contains("https://site.example/media/banner.JPG?v=2"));
        assert!(filtered.contains("https://site.example/wp-content/uploads/2021/05/photo.png"));
    }

    #[test]
    fn test_resolve_keeps_http_only() {
        let base = Url::parse("https://site.example/page").unwrap();
        assert_eq!(
            resolve(&base, "/a.png").as_deref(),
            Some("https://site.example/a.png")
        );
        assert!(resolve(&base, "mailto:admin@site.example").is_none());
        assert!(resolve(&base, "javascript:void(0)").is_none());
    }

    #[test]
    fn test_duplicate_references_collapse() {
        let page_url = Url::parse("https://site.example/page").unwrap();
        let html = r#"<img src="/media/same.jpg"><img src="/media/same.jpg">"#;
        let mut candidates = BTreeSet::new();
        candidates.extend(page::extract_image_urls(html, &page_url));
        assert_eq!(candidates.len(), 1);
    }
}
