//! Inventory data types for a mirroring run.
//!
//! Everything in here is run-scoped: the inventory is accumulated while the
//! download loop runs and written out once at the end, fully replacing any
//! inventory from a previous run. Ordered maps keep serialization
//! deterministic regardless of discovery order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A successfully mirrored image.
///
/// Created once per URL, on a fresh download or when the destination
/// already existed on disk, and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// The remote URL the bytes came from
    pub original_url: String,

    /// Absolute path of the local copy
    pub local_path: PathBuf,

    /// Path relative to the output root, with `/` separators, as used by
    /// content-rewriting tools
    pub relative_path: String,

    /// Size of the local file in bytes
    pub size: u64,
}

/// A URL that could not be mirrored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    /// The remote URL that failed
    pub url: String,

    /// Classified failure description (e.g. `HTTP 404`)
    pub error: String,
}

/// Summary statistics over a finished run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub total_downloaded: usize,
    pub total_failed: usize,
    pub total_size_bytes: u64,
}

/// The persisted aggregate for one run: successes, failures, the URL
/// mapping, and summary statistics.
///
/// Invariant: every key of `url_mapping` is also a key of
/// `downloaded_images`. Both are only ever written through
/// [`Inventory::record_download`], so the two cannot drift apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Successful downloads, keyed by original URL
    pub downloaded_images: BTreeMap<String, DownloadRecord>,

    /// Failed downloads, in the order they occurred
    pub failed_downloads: Vec<FailureRecord>,

    /// original URL → relative path, a projection of `downloaded_images`
    pub url_mapping: BTreeMap<String, String>,

    /// Counts and byte totals, recomputed at persist time
    pub stats: RunStats,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mirrored image. The mapping entry is derived from the
    /// record here, which is what keeps the invariant above true.
    pub fn record_download(&mut self, record: DownloadRecord) {
        self.url_mapping
            .insert(record.original_url.clone(), record.relative_path.clone());
        self.downloaded_images
            .insert(record.original_url.clone(), record);
    }

    /// Record a failed URL with its classified description.
    pub fn record_failure(&mut self, url: impl Into<String>, error: impl Into<String>) {
        self.failed_downloads.push(FailureRecord {
            url: url.into(),
            error: error.into(),
        });
    }

    /// Number of mirrored images.
    pub fn downloaded(&self) -> usize {
        self.downloaded_images.len()
    }

    /// Number of failures.
    pub fn failed(&self) -> usize {
        self.failed_downloads.len()
    }

    /// Recompute `stats` from the accumulated records.
    pub fn refresh_stats(&mut self) {
        self.stats = RunStats {
            total_downloaded: self.downloaded_images.len(),
            total_failed: self.failed_downloads.len(),
            total_size_bytes: self.downloaded_images.values().map(|r| r.size).sum(),
        };
    }

    /// Write the full inventory and the mapping projection under the
    /// output root, overwriting previous runs.
    ///
    /// This is the one place where an error is fatal for the run: without
    /// the inventory the run's results are unrecoverable.
    pub fn persist(
        &mut self,
        output_root: &Path,
        inventory_file: &str,
        mapping_file: &str,
    ) -> Result<(PathBuf, PathBuf)> {
        self.refresh_stats();

        let inventory_path = output_root.join(inventory_file);
        std::fs::write(&inventory_path, serde_json::to_string_pretty(self)?)?;

        let mapping_path = output_root.join(mapping_file);
        std::fs::write(
            &mapping_path,
            serde_json::to_string_pretty(&self.url_mapping)?,
        )?;

        Ok((inventory_path, mapping_path))
    }
}
