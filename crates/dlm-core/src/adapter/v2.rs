//! API v2: the daemon returns an entry id; the link is derived from it.

use serde_json::Value;

use crate::error::{ApiErrorKind, LinkError};

const ENDPOINT: &str = "/fsEntry";
const ID_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2Schema {
    filespace: String,
}

impl V2Schema {
    pub fn new(filespace: &str) -> Self {
        Self {
            filespace: filespace.to_string(),
        }
    }

    pub fn filespace(&self) -> &str {
        &self.filespace
    }

    pub(super) fn path_and_query(&self, encoded_path: &str) -> String {
        format!("{}?path={}", ENDPOINT, encoded_path)
    }

    pub(super) fn link_for_entry(&self, entry_id: &str) -> String {
        format!("lucid://{}/file/{}", self.filespace, entry_id)
    }

    pub(super) fn link_from_json(&self, json: &Value) -> Result<String, LinkError> {
        let id = match json.get(ID_FIELD) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(LinkError::api(
                    ApiErrorKind::Malformed,
                    format!("response has no {} field", ID_FIELD),
                ))
            }
        };
        Ok(self.link_for_entry(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_id_is_malformed() {
        let s = V2Schema::new("fs");
        let err = s.link_from_json(&json!({"id": null})).unwrap_err();
        assert_eq!(err.api_kind(), Some(ApiErrorKind::Malformed));
    }

    #[test]
    fn filespace_kept() {
        assert_eq!(V2Schema::new("media").filespace(), "media");
    }
}
