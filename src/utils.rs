//! Utility functions for destination path derivation

use crate::types::DownloadTicket;
use std::path::{Path, PathBuf};

/// Longest extension accepted from a URL; anything longer is treated as no extension
const MAX_EXTENSION_LEN: usize = 16;

/// Extract the file extension from a URL
///
/// Only the last path segment is considered, so dots in the host name, query string
/// or fragment never produce an extension. URLs that fail to parse fall back to the
/// raw text after the last `/`.
///
/// # Returns
///
/// The extension without the leading dot, or `None` if the last segment has no
/// usable extension (missing, empty, too long, or not ASCII alphanumeric).
///
/// # Examples
///
/// ```
/// use url_dl::utils::url_extension;
///
/// assert_eq!(url_extension("http://x/a.png").as_deref(), Some("png"));
/// assert_eq!(url_extension("https://cdn.example.com/photo.JPG?w=200").as_deref(), Some("JPG"));
/// assert_eq!(url_extension("https://example.com/image"), None);
/// ```
#[must_use]
pub fn url_extension(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string)?,
        Err(_) => {
            let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
            without_suffix
                .rsplit('/')
                .next()
                .unwrap_or(without_suffix)
                .to_string()
        }
    };

    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }

    Some(ext.to_string())
}

/// Build the destination path for a download
///
/// The filename is `<prefix><ticket>.<ext>`, where `<ext>` comes from
/// [`url_extension`] or, when the URL has none, from `fallback_ext`. An empty
/// `fallback_ext` produces a filename without an extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use url_dl::types::DownloadTicket;
/// use url_dl::utils::destination_path;
///
/// let dest = destination_path(Path::new("downloads"), "image_", DownloadTicket(1), "http://x/a.png", "bin");
/// assert_eq!(dest, Path::new("downloads/image_1.png"));
///
/// let dest = destination_path(Path::new("downloads"), "image_", DownloadTicket(2), "http://x/latest", "bin");
/// assert_eq!(dest, Path::new("downloads/image_2.bin"));
/// ```
pub fn destination_path(
    dir: &Path,
    prefix: &str,
    ticket: DownloadTicket,
    url: &str,
    fallback_ext: &str,
) -> PathBuf {
    let ext = url_extension(url).unwrap_or_else(|| fallback_ext.to_string());
    let filename = if ext.is_empty() {
        format!("{}{}", prefix, ticket)
    } else {
        format!("{}{}.{}", prefix, ticket, ext)
    };
    dir.join(filename)
}
