//! Configuration management for pixmirror.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults; every section is optional in the TOML file and falls back to
//! the reference behavior of the tool (WordPress-flavored discovery paths,
//! a 1920 px width cap, JPEG quality 85).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Root configuration structure for pixmirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client settings
    pub http: HttpConfig,

    /// Discovery strategy settings
    pub discovery: DiscoveryConfig,

    /// Transcoding settings
    pub transcode: TranscodeConfig,

    /// Output layout settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Timeout for page, sitemap, and listing probes, in seconds
    pub page_timeout_secs: u64,

    /// Timeout for image body downloads, in seconds
    pub image_timeout_secs: u64,

    /// Delay between successive page scrapes, in milliseconds
    pub page_delay_ms: u64,

    /// Delay between successive image downloads, in milliseconds
    pub download_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            // A desktop-browser identity keeps basic bot filters from
            // rejecting the probe requests outright.
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            page_timeout_secs: 10,
            image_timeout_secs: 30,
            page_delay_ms: 500,
            download_delay_ms: 200,
        }
    }
}

/// Discovery strategy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Well-known sitemap locations, probed in order; first success wins
    pub sitemap_paths: Vec<String>,

    /// Pages assumed to exist when no sitemap yields any URL
    pub fallback_pages: Vec<String>,

    /// Conventional upload directories probed for open listings
    pub upload_dirs: Vec<String>,

    /// Extensions (lowercase, no dot) accepted as image URLs
    pub image_extensions: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sitemap_paths: vec![
                "/sitemap.xml".to_string(),
                "/wp-sitemap.xml".to_string(),
                "/sitemap_index.xml".to_string(),
            ],
            fallback_pages: vec![
                "/".to_string(),
                "/about".to_string(),
                "/services".to_string(),
                "/contact".to_string(),
                "/blog".to_string(),
            ],
            upload_dirs: vec![
                "/wp-content/uploads/".to_string(),
                "/wp-includes/images/".to_string(),
                "/wp-admin/images/".to_string(),
            ],
            image_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "webp".to_string(),
                "svg".to_string(),
                "ico".to_string(),
            ],
        }
    }
}

/// Transcoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Whether downloaded jpg/jpeg/png files are re-encoded in place
    pub enabled: bool,

    /// Maximum image width in pixels; wider images are downscaled
    pub max_width: u32,

    /// JPEG encoding quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_width: 1920,
            jpeg_quality: 85,
        }
    }
}

/// Output layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Subdirectory of the output root that receives the image tree
    pub images_subdir: String,

    /// File name of the full inventory document
    pub inventory_file: String,

    /// File name of the URL-to-path mapping document
    pub mapping_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            images_subdir: "images".to_string(),
            inventory_file: "image_inventory.json".to_string(),
            mapping_file: "url_mapping.json".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// `~/.pixmirror/config.toml` if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "pixmirror", "pixmirror")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".pixmirror").join("config.toml")
            })
    }

    /// Check that configured values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transcode.jpeg_quality == 0 || self.transcode.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(format!(
                "jpeg_quality must be 1-100, got {}",
                self.transcode.jpeg_quality
            )));
        }
        if self.transcode.max_width == 0 {
            return Err(ConfigError::ValidationError(
                "max_width must be nonzero".to_string(),
            ));
        }
        if self.http.page_timeout_secs == 0 || self.http.image_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be nonzero".to_string(),
            ));
        }
        if self.discovery.image_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "image_extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.transcode.max_width, 1920);
        assert_eq!(config.transcode.jpeg_quality, 85);
        assert_eq!(config.http.page_timeout_secs, 10);
        assert_eq!(config.http.image_timeout_secs, 30);
        assert_eq!(config.discovery.sitemap_paths[0], "/sitemap.xml");
        assert_eq!(config.discovery.image_extensions.len(), 7);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[http]"));
        assert!(toml.contains("[discovery]"));
        assert!(toml.contains("[transcode]"));
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let mut config = Config::default();
        config.transcode.jpeg_quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[transcode]\nmax_width = 1280\n").unwrap();
        assert_eq!(config.transcode.max_width, 1280);
        // Untouched sections keep their defaults
        assert_eq!(config.transcode.jpeg_quality, 85);
        assert_eq!(config.output.images_subdir, "images");
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("/tmp/out"), PathBuf::from("/tmp/out"));
    }
}
