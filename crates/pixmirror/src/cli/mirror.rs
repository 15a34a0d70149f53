//! The `pixmirror mirror` command: the end-to-end run.
//!
//! Strictly ordered: discovery → filtered candidate set → sequential
//! download loop (skip-if-exists, politeness delay, optional transcode)
//! → persist inventory + mapping → summary. Per-URL failures never abort
//! the batch; the inventory is written even when every download failed.

use clap::Args;
use pixmirror_core::{config, Config, Inventory, Mirror, MirrorOutcome};

/// Arguments for the `mirror` command.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Site root URL to mirror images from
    pub site_url: String,

    /// Output root directory (receives the images tree, inventory, and mapping)
    pub output_root: String,

    /// Skip the transcoding step, keeping downloaded bytes as-is
    #[arg(long)]
    pub no_optimize: bool,

    /// Override the configured JPEG quality (1-100)
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// Override the configured maximum image width in pixels
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Override the delay between page scrapes, in milliseconds
    #[arg(long)]
    pub page_delay_ms: Option<u64>,

    /// Override the delay between image downloads, in milliseconds
    #[arg(long)]
    pub download_delay_ms: Option<u64>,
}

/// Fold CLI overrides into the loaded configuration.
fn apply_overrides(args: &MirrorArgs, config: &mut Config) {
    if args.no_optimize {
        config.transcode.enabled = false;
    }
    if let Some(quality) = args.jpeg_quality {
        config.transcode.jpeg_quality = quality;
    }
    if let Some(width) = args.max_width {
        config.transcode.max_width = width;
    }
    if let Some(delay) = args.page_delay_ms {
        config.http.page_delay_ms = delay;
    }
    if let Some(delay) = args.download_delay_ms {
        config.http.download_delay_ms = delay;
    }
}

/// Execute the mirror command.
pub async fn execute(args: MirrorArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);
    config.validate()?;

    let output_root = config::expand_path(&args.output_root);
    let mirror = Mirror::new(config, &args.site_url, output_root)?;

    tracing::info!("Mirroring images from {}", mirror.site_root());
    tracing::info!("Saving to {}", mirror.images_root().display());

    let candidates = mirror.discover().await;
    if candidates.is_empty() {
        tracing::warn!("No image candidates discovered");
    } else {
        tracing::info!("Found {} image(s) to download", candidates.len());
    }

    let progress = create_progress_bar(candidates.len() as u64);
    let delay = mirror.download_delay();
    let mut inventory = Inventory::new();
    let mut downloaded: u64 = 0;
    let mut skipped: u64 = 0;
    let mut failed: u64 = 0;

    for url in &candidates {
        match mirror.mirror_image(url, &mut inventory).await {
            MirrorOutcome::Downloaded => {
                downloaded += 1;
                tokio::time::sleep(delay).await;
            }
            MirrorOutcome::Failed => {
                failed += 1;
                tokio::time::sleep(delay).await;
            }
            // Cached files never touched the server; no delay owed
            MirrorOutcome::Skipped => skipped += 1,
        }

        progress.inc(1);
        progress.set_message(format!("{downloaded} new, {skipped} cached, {failed} failed"));
    }

    progress.finish_and_clear();

    let (inventory_path, mapping_path) = mirror.persist(&mut inventory)?;
    tracing::info!("Inventory written to {}", inventory_path.display());
    tracing::info!("URL mapping written to {}", mapping_path.display());

    print_summary(&inventory, downloaded, skipped);

    Ok(())
}

/// Create a progress bar for the download loop.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print the end-of-run summary, including a sample of failures.
fn print_summary(inventory: &Inventory, downloaded: u64, skipped: u64) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Downloaded:   {:>8}", downloaded);
    if skipped > 0 {
        eprintln!("    Cached:       {:>8}", skipped);
    }
    if inventory.failed() > 0 {
        eprintln!("    Failed:       {:>8}", inventory.failed());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Mirrored:     {:>8}", inventory.downloaded());
    eprintln!("    Total bytes:  {:>8}", inventory.stats.total_size_bytes);
    eprintln!("  ====================================");

    if !inventory.failed_downloads.is_empty() {
        let shown = inventory.failed_downloads.len().min(10);
        eprintln!();
        eprintln!("  Failed downloads (showing {shown}):");
        for failure in inventory.failed_downloads.iter().take(10) {
            eprintln!("    - {}: {}", failure.url, failure.error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MirrorArgs {
        MirrorArgs {
            site_url: "https://site.example".to_string(),
            output_root: "./static".to_string(),
            no_optimize: false,
            jpeg_quality: None,
            max_width: None,
            page_delay_ms: None,
            download_delay_ms: None,
        }
    }

    #[test]
    fn test_overrides_default_to_config_values() {
        let mut config = Config::default();
        apply_overrides(&args(), &mut config);
        assert!(config.transcode.enabled);
        assert_eq!(config.transcode.jpeg_quality, 85);
        assert_eq!(config.transcode.max_width, 1920);
    }

    #[test]
    fn test_no_optimize_disables_transcoding() {
        let mut config = Config::default();
        let mut args = args();
        args.no_optimize = true;
        apply_overrides(&args, &mut config);
        assert!(!config.transcode.enabled);
    }

    #[test]
    fn test_explicit_overrides_win() {
        let mut config = Config::default();
        let mut args = args();
        args.jpeg_quality = Some(70);
        args.max_width = Some(1280);
        args.download_delay_ms = Some(0);
        apply_overrides(&args, &mut config);
        assert_eq!(config.transcode.jpeg_quality, 70);
        assert_eq!(config.transcode.max_width, 1280);
        assert_eq!(config.http.download_delay_ms, 0);
    }
}
