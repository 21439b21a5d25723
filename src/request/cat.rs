//! `_cat` listing requests.

use crate::error::MakeBodyError;
use crate::request::{HttpMethod, Request, Serializer};

/// Lists the indices of a cluster. Never carries a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatIndicesRequest;

impl CatIndicesRequest {
    pub fn new() -> Self {
        CatIndicesRequest
    }
}

impl Request for CatIndicesRequest {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        "_cat/indices".to_string()
    }

    fn make_body(&self, _serializer: &dyn Serializer) -> Result<Vec<u8>, MakeBodyError> {
        Err(MakeBodyError::NoBodyForRequest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::JsonSerializer;

    #[test]
    fn test_cat_indices_request() {
        let request = CatIndicesRequest::new();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.endpoint(), "_cat/indices");
        assert!(request.query_params().is_empty());
        assert_eq!(request, CatIndicesRequest::default());
    }

    #[test]
    fn test_cat_indices_request_has_no_body() {
        let result = CatIndicesRequest::new().make_body(&JsonSerializer::default());
        assert!(matches!(result, Err(MakeBodyError::NoBodyForRequest)));
    }
}
