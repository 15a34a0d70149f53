//! In-place re-encoding of downloaded images for web delivery.
//!
//! Only jpg/jpeg/png destinations qualify. JPEG output cannot carry an
//! alpha channel, so RGBA sources are composited over opaque white first;
//! anything wider than the configured cap is downscaled proportionally
//! with Lanczos resampling before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;

use crate::config::TranscodeConfig;
use crate::error::TranscodeError;

/// Encode target derived from the destination extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetFormat {
    Jpeg,
    Png,
}

fn target_format(path: &Path) -> Option<TargetFormat> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => Some(TargetFormat::Jpeg),
        Some("png") => Some(TargetFormat::Png),
        _ => None,
    }
}

/// Rewrites downloaded images in place with web-friendly encoding.
pub struct Transcoder {
    config: TranscodeConfig,
}

impl Transcoder {
    /// Create a transcoder with the given settings.
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }

    /// Whether transcoding is enabled at all.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Whether a destination path qualifies for transcoding.
    pub fn qualifies(path: &Path) -> bool {
        target_format(path).is_some()
    }

    /// Re-encode the file at `path` in place.
    ///
    /// Errors are soft: the caller logs a warning and leaves the
    /// originally downloaded bytes on disk, which this function never
    /// touches unless the full decode-normalize-encode chain succeeded.
    pub fn optimize_in_place(&self, path: &Path) -> Result<(), TranscodeError> {
        let Some(target) = target_format(path) else {
            return Ok(());
        };

        let bytes = std::fs::read(path).map_err(|source| TranscodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| TranscodeError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {e}"),
            })?;
        let mut img = reader.decode().map_err(|e| TranscodeError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if target == TargetFormat::Jpeg && img.color().has_alpha() {
            img = DynamicImage::ImageRgb8(flatten_onto_white(&img));
        }

        if img.width() > self.config.max_width {
            img = downscale_to_width(&img, self.config.max_width);
        }

        let mut out = Vec::new();
        match target {
            TargetFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut out, self.config.jpeg_quality);
                // Alpha was flattened above, but a paletted or grayscale
                // source may still need an explicit RGB pass for JPEG.
                DynamicImage::ImageRgb8(img.to_rgb8())
                    .write_with_encoder(encoder)
                    .map_err(|e| TranscodeError::Encode {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
            }
            TargetFormat::Png => {
                let encoder =
                    PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive);
                img.write_with_encoder(encoder)
                    .map_err(|e| TranscodeError::Encode {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
            }
        }

        std::fs::write(path, &out).map_err(|source| TranscodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Optimized {} ({} bytes)", path.display(), out.len());
        Ok(())
    }
}

/// Composite an image with alpha over an opaque white background.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let blend = |channel: u8| -> u8 {
            let a = a as u16;
            (((channel as u16 * a) + 255 * (255 - a) + 127) / 255) as u8
        };
        rgb.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }

    rgb
}

/// Downscale so width equals `max_width`, preserving aspect ratio.
fn downscale_to_width(img: &DynamicImage, max_width: u32) -> DynamicImage {
    let ratio = max_width as f64 / img.width() as f64;
    let height = ((img.height() as f64 * ratio).round() as u32).max(1);
    img.resize_exact(max_width, height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcoder() -> Transcoder {
        Transcoder::new(TranscodeConfig::default())
    }

    #[test]
    fn test_qualifies_by_extension() {
        assert!(Transcoder::qualifies(Path::new("a.jpg")));
        assert!(Transcoder::qualifies(Path::new("a.JPEG")));
        assert!(Transcoder::qualifies(Path::new("a.png")));
        assert!(!Transcoder::qualifies(Path::new("a.gif")));
        assert!(!Transcoder::qualifies(Path::new("a.svg")));
        assert!(!Transcoder::qualifies(Path::new("noext")));
    }

    #[test]
    fn test_wide_image_is_capped_at_max_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.jpg");
        DynamicImage::new_rgb8(3840, 1080).save(&path).unwrap();

        transcoder().optimize_in_place(&path).unwrap();

        let out = image::open(&path).unwrap();
        assert_eq!(out.dimensions(), (1920, 540));
    }

    #[test]
    fn test_narrow_image_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.png");
        DynamicImage::new_rgb8(800, 600).save(&path).unwrap();

        transcoder().optimize_in_place(&path).unwrap();

        let out = image::open(&path).unwrap();
        assert_eq!(out.dimensions(), (800, 600));
    }

    #[test]
    fn test_flatten_blends_toward_white() {
        let mut rgba = image::RgbaImage::new(1, 1);
        rgba.put_pixel(0, 0, image::Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));

        let [r, g, b] = flat.get_pixel(0, 0).0;
        // Half-transparent black over white lands mid-gray
        assert_eq!((r, g, b), (127, 127, 127));
    }

    #[test]
    fn test_flatten_keeps_opaque_pixels() {
        let mut rgba = image::RgbaImage::new(1, 1);
        rgba.put_pixel(0, 0, image::Rgba([10, 200, 30, 255]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0).0, [10, 200, 30]);
    }

    #[test]
    fn test_corrupt_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let result = transcoder().optimize_in_place(&path);
        assert!(result.is_err());
        assert_eq!(
            std::fs::read(&path).unwrap(),
            b"definitely not a jpeg".to_vec()
        );
    }

    #[test]
    fn test_non_qualifying_extension_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        std::fs::write(&path, b"GIF89a-ish bytes").unwrap();

        transcoder().optimize_in_place(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"GIF89a-ish bytes".to_vec());
    }

    #[test]
    fn test_downscale_rounds_height() {
        let img = DynamicImage::new_rgb8(2000, 999);
        let out = downscale_to_width(&img, 1920);
        assert_eq!(out.width(), 1920);
        // 999 * 1920/2000 = 959.04 → 959
        assert_eq!(out.height(), 959);
    }
}
