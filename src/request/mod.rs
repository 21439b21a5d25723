//! Request envelope: what a transport needs to send a built document.
//!
//! Every request exposes an HTTP method, an endpoint path, query parameters
//! and a body. Sending is left to the caller.
//!
//! # Examples
//!
//! ```
//! use querydsl::query::{Builder, MatchAllQuery};
//! use querydsl::request::{JsonSerializer, Request, SearchRequest};
//!
//! let request = SearchRequest::builder()
//!     .index("posts")
//!     .query(MatchAllQuery::new())
//!     .size(10u32)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(request.endpoint(), "posts/_search");
//! let body = request.make_body(&JsonSerializer::default()).unwrap();
//! assert!(!body.is_empty());
//! ```

pub mod cat;
pub mod search;

use std::fmt;

use serde_json::Value;

use crate::config::SerializerConfig;
use crate::error::MakeBodyError;

pub use cat::CatIndicesRequest;
pub use search::{SearchRequest, SearchRequestBuilder};

/// HTTP verbs used by requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns JSON values into body bytes and back.
pub trait Serializer {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, serde_json::Error>;

    fn decode(&self, bytes: &[u8]) -> Result<Value, serde_json::Error>;
}

/// The default serializer, compact or pretty per [`SerializerConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer {
    config: SerializerConfig,
}

impl JsonSerializer {
    pub fn new(config: SerializerConfig) -> Self {
        JsonSerializer { config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }
}

impl Serializer for JsonSerializer {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, serde_json::Error> {
        if self.config.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// An outbound request.
pub trait Request {
    fn method(&self) -> HttpMethod;

    /// Path relative to the cluster root, without a leading slash.
    fn endpoint(&self) -> String;

    fn query_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Serialize the payload. Bodyless requests fail with
    /// [`MakeBodyError::NoBodyForRequest`] instead of returning empty bytes.
    fn make_body(&self, serializer: &dyn Serializer) -> Result<Vec<u8>, MakeBodyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }

    #[test]
    fn test_json_serializer_compact_and_pretty() {
        let value = json!({"query": {"match_all": {}}});

        let compact = JsonSerializer::default().encode(&value).unwrap();
        assert_eq!(compact, br#"{"query":{"match_all":{}}}"#.to_vec());

        let pretty = JsonSerializer::new(SerializerConfig::pretty())
            .encode(&value)
            .unwrap();
        assert!(String::from_utf8(pretty.clone()).unwrap().contains('\n'));
        assert_eq!(JsonSerializer::default().decode(&pretty).unwrap(), value);
    }
}
