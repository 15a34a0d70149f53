//! Destination path derivation for remote image URLs.
//!
//! Everything here is a pure function of the URL (and the images root), so
//! repeated runs derive byte-identical destinations and the on-disk tree
//! doubles as a skip-cache.

use std::path::{Path, PathBuf};
use url::Url;

/// Path segment marking platform-managed upload storage. Directory
/// structure after this marker (typically `year/month`) is preserved
/// under the images root.
pub const UPLOAD_MARKER: &str = "/wp-content/uploads/";

/// Destination path relative to the images root, with `/` separators.
///
/// The final URL path segment becomes the file name; a URL without one
/// (e.g. ending in `/`) gets a synthesized name instead. Upload-directory
/// substructure after [`UPLOAD_MARKER`] is kept, everything else lands
/// flat in the images root.
pub fn relative_destination(url: &Url) -> String {
    let path = url.path();
    let file_name = match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => synthesized_file_name(url.as_str()),
    };

    if let Some((_, after)) = path.split_once(UPLOAD_MARKER) {
        let segments: Vec<&str> = after.split('/').collect();
        if segments.len() > 1 {
            let subdir = segments[..segments.len() - 1].join("/");
            if !subdir.is_empty() {
                return format!("{subdir}/{file_name}");
            }
        }
    }

    file_name
}

/// Absolute destination under the images root.
pub fn destination_for(url: &Url, images_root: &Path) -> PathBuf {
    let mut dest = images_root.to_path_buf();
    for segment in relative_destination(url).split('/') {
        dest.push(segment);
    }
    dest
}

/// Synthesize a file name for a URL whose path carries none.
///
/// `image_<8 hex chars>.jpg`, where the hex is the BLAKE3 digest of the
/// URL string truncated to eight characters. Stable across calls;
/// collisions over a few thousand URLs are astronomically unlikely.
pub fn synthesized_file_name(url: &str) -> String {
    let digest = blake3::hash(url.as_bytes()).to_hex();
    format!("image_{}.jpg", &digest.as_str()[..8])
}

/// Whether the URL's *path* ends in one of the given extensions
/// (lowercase, no dot). Matching ignores query and fragment, so
/// `.../banner.JPG?v=2` passes.
pub fn has_image_extension(url: &Url, extensions: &[String]) -> bool {
    let file_name = url.path().rsplit('/').next().unwrap_or("");
    match file_name.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|allowed| *allowed == ext)
        }
        None => false,
    }
}
