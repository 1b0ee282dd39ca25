//! Per-segment percent-encoding.

use std::string::FromUtf8Error;

/// Percent-encodes each segment and joins them with `/`.
///
/// Only RFC 3986 unreserved characters pass through unchanged, so space, `#`,
/// `?`, `%` and non-ASCII bytes are always escaped.
pub fn encode_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| urlencoding::encode(s.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reverses `encode_path`, for display and logging.
pub fn decode_path(encoded: &str) -> Result<String, FromUtf8Error> {
    let decoded = encoded
        .split('/')
        .map(|s| urlencoding::decode(s).map(|c| c.into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(decoded.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_preserved() {
        assert_eq!(encode_path(&["dir", "file.txt"]), "dir/file.txt");
    }

    #[test]
    fn reserved_escaped() {
        assert_eq!(encode_path(&["a b#c?d%e"]), "a%20b%23c%3Fd%25e");
        assert_eq!(encode_path(&["file2[v1].pdf"]), "file2%5Bv1%5D.pdf");
    }

    #[test]
    fn decode_reverses() {
        assert_eq!(decode_path("a%20b/%C3%A9").unwrap(), "a b/é");
    }
}
