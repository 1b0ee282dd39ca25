//! Classify daemon HTTP status codes into API error kinds.

use crate::error::{ApiErrorKind, LinkError};

/// Longest body excerpt carried into an error message.
const BODY_EXCERPT: usize = 200;

/// Returns `None` for 2xx, otherwise the classified error.
///
/// - 408, 429 and 5xx are transient (the daemon may recover).
/// - Any other 4xx means the daemon rejected or does not know the path.
/// - Anything else (1xx, 3xx) is not a response shape we understand.
pub fn classify_status(status: u32, body: &[u8]) -> Option<LinkError> {
    let kind = match status {
        200..=299 => return None,
        408 | 429 | 500..=599 => ApiErrorKind::Transient,
        400..=499 => ApiErrorKind::NotFound,
        _ => ApiErrorKind::Malformed,
    };
    let excerpt = body_excerpt(body);
    let message = if excerpt.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, excerpt)
    };
    Some(LinkError::api(kind, message))
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    let mut end = text.len().min(BODY_EXCERPT);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
