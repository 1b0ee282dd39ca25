//! API v3: the daemon returns the direct link itself.

use serde_json::Value;

use crate::error::{ApiErrorKind, LinkError};

const ENDPOINT: &str = "/fsEntry/direct-link";

/// Envelope fields that may carry the link, in lookup order.
const LINK_FIELDS: &[&str] = &["result", "directLink"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V3Schema;

impl V3Schema {
    pub(super) fn path_and_query(&self, encoded_path: &str) -> String {
        format!("{}?path={}", ENDPOINT, encoded_path)
    }

    pub(super) fn link_from_json(&self, json: &Value) -> Result<String, LinkError> {
        LINK_FIELDS
            .iter()
            .find_map(|field| json.get(*field).and_then(Value::as_str))
            .filter(|link| !link.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                LinkError::api(
                    ApiErrorKind::Malformed,
                    format!("response has no {} field", LINK_FIELDS.join("/")),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_field() {
        let link = V3Schema
            .link_from_json(&json!({"result": "https://x/dl/1"}))
            .unwrap();
        assert_eq!(link, "https://x/dl/1");
    }

    #[test]
    fn empty_or_non_string_is_malformed() {
        assert!(V3Schema.link_from_json(&json!({"result": ""})).is_err());
        assert!(V3Schema.link_from_json(&json!({"result": 5})).is_err());
        assert!(V3Schema.link_from_json(&json!([])).is_err());
    }
}
