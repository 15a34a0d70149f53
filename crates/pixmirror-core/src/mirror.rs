//! Run orchestration: wires discovery, fetching, path mapping, and
//! transcoding together and keeps the inventory honest.
//!
//! The per-URL entry point is [`Mirror::mirror_image`]; the CLI drives it
//! over the candidate set with its own progress reporting and politeness
//! delay, then calls [`Mirror::persist`] exactly once.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::discovery::DiscoveryEngine;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::paths;
use crate::transcode::Transcoder;
use crate::types::{DownloadRecord, Inventory};

/// Outcome of mirroring one candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// Freshly fetched, written, and recorded
    Downloaded,
    /// Destination already existed on disk; recorded without a fetch
    Skipped,
    /// Recorded as a failure; the run continues
    Failed,
}

/// Orchestrates one mirroring run against a site.
pub struct Mirror {
    config: Config,
    fetcher: Fetcher,
    discovery: DiscoveryEngine,
    transcoder: Transcoder,
    site_root: Url,
    output_root: PathBuf,
    images_root: PathBuf,
}

impl Mirror {
    /// Create a mirror for a site and output root.
    ///
    /// Creates the images directory eagerly; failing to do so is fatal
    /// since nothing useful can happen without it.
    pub fn new(config: Config, site_root: &str, output_root: impl Into<PathBuf>) -> Result<Self> {
        let site_root = Url::parse(site_root)?;
        let output_root = output_root.into();
        let images_root = output_root.join(&config.output.images_subdir);
        std::fs::create_dir_all(&images_root)?;

        let fetcher = Fetcher::new(&config.http)?;
        let discovery = DiscoveryEngine::new(config.discovery.clone(), &config.http);
        let transcoder = Transcoder::new(config.transcode.clone());

        Ok(Self {
            config,
            fetcher,
            discovery,
            transcoder,
            site_root,
            output_root,
            images_root,
        })
    }

    /// The parsed site root.
    pub fn site_root(&self) -> &Url {
        &self.site_root
    }

    /// Directory receiving the mirrored image tree.
    pub fn images_root(&self) -> &PathBuf {
        &self.images_root
    }

    /// Politeness delay between successive image downloads.
    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.config.http.download_delay_ms)
    }

    /// Run the full discovery phase: page URLs, per-page scraping,
    /// upload-directory probing, extension filtering.
    pub async fn discover(&self) -> BTreeSet<String> {
        self.discovery.discover(&self.fetcher, &self.site_root).await
    }

    /// Mirror a single candidate URL into the images tree.
    ///
    /// An existing destination is treated as a success and recorded from
    /// disk metadata, which is what makes interrupted runs resumable and
    /// repeat runs fetch-free. All failures are soft: they land in the
    /// inventory and the batch moves on.
    pub async fn mirror_image(&self, url: &str, inventory: &mut Inventory) -> MirrorOutcome {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                inventory.record_failure(url, format!("invalid URL: {e}"));
                return MirrorOutcome::Failed;
            }
        };

        let relative = paths::relative_destination(&parsed);
        let dest = paths::destination_for(&parsed, &self.images_root);
        let relative_path = format!("{}/{}", self.config.output.images_subdir, relative);

        if dest.exists() {
            let size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
            tracing::debug!("Already exists: {}", dest.display());
            inventory.record_download(DownloadRecord {
                original_url: url.to_string(),
                local_path: dest,
                relative_path,
                size,
            });
            return MirrorOutcome::Skipped;
        }

        let bytes = match self.fetcher.fetch_bytes(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                inventory.record_failure(url, e.to_string());
                return MirrorOutcome::Failed;
            }
        };

        if let Err(e) = dest
            .parent()
            .map(std::fs::create_dir_all)
            .unwrap_or(Ok(()))
            .and_then(|_| std::fs::write(&dest, &bytes))
        {
            tracing::warn!("Failed to write {}: {}", dest.display(), e);
            inventory.record_failure(url, format!("write failed: {e}"));
            return MirrorOutcome::Failed;
        }

        if self.transcoder.is_enabled() && Transcoder::qualifies(&dest) {
            if let Err(e) = self.transcoder.optimize_in_place(&dest) {
                // Non-fatal: the download itself succeeded and the
                // original bytes are still on disk.
                tracing::warn!("Could not optimize {}: {}", dest.display(), e);
            }
        }

        let size = std::fs::metadata(&dest)
            .map(|m| m.len())
            .unwrap_or(bytes.len() as u64);
        tracing::debug!("Downloaded {} -> {}", url, dest.display());
        inventory.record_download(DownloadRecord {
            original_url: url.to_string(),
            local_path: dest,
            relative_path,
            size,
        });
        MirrorOutcome::Downloaded
    }

    /// Write the inventory and mapping documents under the output root.
    ///
    /// The one fatal error path of the pipeline: a run whose inventory
    /// cannot be written has nothing to show for itself.
    pub fn persist(&self, inventory: &mut Inventory) -> Result<(PathBuf, PathBuf)> {
        inventory.persist(
            &self.output_root,
            &self.config.output.inventory_file,
            &self.config.output.mapping_file,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror_at(output_root: &std::path::Path) -> Mirror {
        Mirror::new(Config::default(), "https://site.example", output_root).unwrap()
    }

    #[test]
    fn test_new_creates_images_root() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror_at(dir.path());
        assert!(mirror.images_root().is_dir());
        assert_eq!(mirror.images_root(), &dir.path().join("images"));
    }

    #[tokio::test]
    async fn test_existing_destination_is_skipped_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror_at(dir.path());

        let dest = dir.path().join("images/2021/05/photo.png");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, b"png bytes from an earlier run").unwrap();

        let url = "https://site.example/wp-content/uploads/2021/05/photo.png";
        let mut inventory = Inventory::new();
        let outcome = mirror.mirror_image(url, &mut inventory).await;

        assert_eq!(outcome, MirrorOutcome::Skipped);
        let record = inventory.downloaded_images.get(url).unwrap();
        assert_eq!(record.relative_path, "images/2021/05/photo.png");
        assert_eq!(record.size, 29);
        assert_eq!(
            inventory.url_mapping.get(url).map(String::as_str),
            Some("images/2021/05/photo.png")
        );
    }

    #[tokio::test]
    async fn test_repeat_runs_record_identical_memberships() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror_at(dir.path());

        let dest = dir.path().join("images/logo.svg");
        std::fs::write(&dest, b"<svg/>").unwrap();
        let url = "https://site.example/logo.svg";

        let mut first = Inventory::new();
        mirror.mirror_image(url, &mut first).await;
        let mut second = Inventory::new();
        mirror.mirror_image(url, &mut second).await;

        first.refresh_stats();
        second.refresh_stats();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror_at(dir.path());

        let mut inventory = Inventory::new();
        let outcome = mirror.mirror_image("not a url", &mut inventory).await;

        assert_eq!(outcome, MirrorOutcome::Failed);
        assert_eq!(inventory.failed(), 1);
        assert!(inventory.downloaded_images.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_recorded_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror_at(dir.path());

        // Port 1 refuses immediately; no external network involved
        let url = "http://127.0.0.1:1/banner.jpg";
        let mut inventory = Inventory::new();
        let outcome = mirror.mirror_image(url, &mut inventory).await;

        assert_eq!(outcome, MirrorOutcome::Failed);
        assert_eq!(inventory.failed(), 1);
        assert_eq!(inventory.failed_downloads[0].url, url);
        assert!(!inventory.downloaded_images.contains_key(url));
    }

    #[tokio::test]
    async fn test_persist_after_mixed_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror_at(dir.path());

        let dest = dir.path().join("images/kept.jpg");
        std::fs::write(&dest, b"jpeg").unwrap();

        let mut inventory = Inventory::new();
        mirror
            .mirror_image("https://site.example/kept.jpg", &mut inventory)
            .await;
        mirror
            .mirror_image("http://127.0.0.1:1/missing.png", &mut inventory)
            .await;

        let (inventory_path, mapping_path) = mirror.persist(&mut inventory).unwrap();
        assert!(inventory_path.exists());
        assert!(mapping_path.exists());

        let written: Inventory =
            serde_json::from_str(&std::fs::read_to_string(&inventory_path).unwrap()).unwrap();
        assert_eq!(written.stats.total_downloaded, 1);
        assert_eq!(written.stats.total_failed, 1);
    }
}
