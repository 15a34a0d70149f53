//! Pixmirror Core - embeddable site image mirroring library.
//!
//! Pixmirror crawls a website, discovers the image assets its pages
//! reference, downloads them into a local tree that preserves upload-
//! directory structure, optionally re-encodes them for web delivery, and
//! emits a URL-to-path mapping for downstream content rewriting.
//!
//! # Architecture
//!
//! One-way pipeline, no long-lived state beyond the output tree:
//!
//! ```text
//! Discover (sitemap | fallback pages | upload listings)
//!     → Filter by extension → Fetch → Map path → Transcode → Inventory
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixmirror_core::{Config, Inventory, Mirror};
//!
//! #[tokio::main]
//! async fn main() -> pixmirror_core::Result<()> {
//!     let mirror = Mirror::new(Config::load()?, "https://site.example", "./static")?;
//!     let candidates = mirror.discover().await;
//!
//!     let mut inventory = Inventory::new();
//!     for url in &candidates {
//!         mirror.mirror_image(url, &mut inventory).await;
//!     }
//!     mirror.persist(&mut inventory)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod mirror;
pub mod paths;
pub mod transcode;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use discovery::DiscoveryEngine;
pub use error::{ConfigError, FetchError, MirrorError, Result, TranscodeError};
pub use fetch::Fetcher;
pub use mirror::{Mirror, MirrorOutcome};
pub use transcode::Transcoder;
pub use types::{DownloadRecord, FailureRecord, Inventory, RunStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
