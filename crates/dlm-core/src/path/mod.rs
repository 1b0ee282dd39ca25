//! Filespace path normalization and URL encoding.
//!
//! Maps an absolute path under the mount point (or a path already relative to
//! it) onto the filespace-relative form the daemon expects, then
//! percent-encodes each segment so the result can be embedded in a request URL.

mod encode;
mod normalize;

pub use encode::{decode_path, encode_path};
pub use normalize::relative_segments;

use crate::error::PathError;

/// A path resolved against the mount point. Keeps the caller's raw input for
/// display next to the encoded form sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    pub raw_path: String,
    /// Segments joined with `/`, no leading slash, never empty.
    pub relative_path: String,
    /// `relative_path` with every segment percent-encoded.
    pub encoded_path: String,
}

/// Normalizes `raw_path` against `mount_point`.
///
/// # Examples
///
/// - `normalize("/Volumes/filespace/My Doc.txt", "/Volumes/filespace")` →
///   relative `My Doc.txt`, encoded `My%20Doc.txt`
/// - `normalize("../../etc/passwd", "/Volumes/filespace")` → `PathError::EscapesMount`
pub fn normalize(raw_path: &str, mount_point: &str) -> Result<NormalizedPath, PathError> {
    let segments = relative_segments(raw_path, mount_point)?;
    let relative_path = segments.join("/");
    let encoded_path = encode_path(&segments);
    Ok(NormalizedPath {
        raw_path: raw_path.to_string(),
        relative_path,
        encoded_path,
    })
}
