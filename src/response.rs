//! Typed responses.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of `_cat/indices?format=json`. Every column is reported as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatIndicesResponse {
    pub health: String,
    pub status: String,
    pub index: String,
    pub uuid: String,
    pub pri: String,
    pub rep: String,
    #[serde(rename = "docs.count")]
    pub docs_count: String,
    #[serde(rename = "docs.deleted")]
    pub docs_deleted: String,
    #[serde(rename = "store.size")]
    pub store_size: String,
    #[serde(rename = "pri.store.size")]
    pub pri_store_size: String,
}

impl CatIndicesResponse {
    /// Decode the JSON array returned by the listing endpoint.
    pub fn from_slice(bytes: &[u8]) -> Result<Vec<CatIndicesResponse>> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryDslError;

    const BODY: &str = r#"[{
        "health": "yellow",
        "status": "open",
        "index": "posts",
        "uuid": "u8FNjxh8Rfy_awN11oDKYQ",
        "pri": "1",
        "rep": "1",
        "docs.count": "1200",
        "docs.deleted": "0",
        "store.size": "88.1kb",
        "pri.store.size": "88.1kb"
    }]"#;

    #[test]
    fn test_cat_indices_response_decode() {
        let rows = CatIndicesResponse::from_slice(BODY.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.index, "posts");
        assert_eq!(row.docs_count, "1200");
        assert_eq!(row.pri_store_size, "88.1kb");

        let encoded = serde_json::to_value(row).unwrap();
        assert_eq!(encoded["docs.deleted"], "0");
    }

    #[test]
    fn test_cat_indices_response_missing_column() {
        let result = CatIndicesResponse::from_slice(br#"[{"health": "green"}]"#);
        assert!(matches!(result, Err(QueryDslError::Json(_))));
    }
}
