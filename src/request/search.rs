//! Search requests: a query and/or a suggest section posted to `_search`.

use log::debug;
use serde_json::Value;

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter};
use crate::error::{MakeBodyError, QueryDslError, Result};
use crate::query::builder::{Builder, setters};
use crate::query::types::SourceFilter;
use crate::query::Query;
use crate::request::{HttpMethod, Request, Serializer};
use crate::suggest::Suggest;

const BODY_KEYS: [&str; 5] = ["query", "suggest", "from", "size", "_source"];

/// A search over zero or more indices. No indices means all of them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    pub indices: Vec<String>,
    pub query: Option<Query>,
    pub suggest: Option<Suggest>,
    pub from: Option<u32>,
    pub size: Option<u32>,
    pub source: Option<SourceFilter>,
    pub routing: Option<String>,
    pub preference: Option<String>,
}

impl SearchRequest {
    pub fn builder() -> SearchRequestBuilder {
        SearchRequestBuilder::new()
    }

    /// Reopen this request for changes. `build` validates it again.
    pub fn into_builder(self) -> SearchRequestBuilder {
        SearchRequestBuilder {
            indices: self.indices,
            query: self.query,
            suggest: self.suggest,
            from: self.from,
            size: self.size,
            source: self.source,
            routing: self.routing,
            preference: self.preference,
        }
    }
}

impl Request for SearchRequest {
    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn endpoint(&self) -> String {
        if self.indices.is_empty() {
            "_search".to_string()
        } else {
            format!("{}/_search", self.indices.join(","))
        }
    }

    fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(routing) = &self.routing {
            params.push(("routing".to_string(), routing.clone()));
        }
        if let Some(preference) = &self.preference {
            params.push(("preference".to_string(), preference.clone()));
        }
        params
    }

    fn make_body(&self, serializer: &dyn Serializer) -> std::result::Result<Vec<u8>, MakeBodyError> {
        let body = self.to_json();
        debug!("Producing search body for {}", self.endpoint());
        Ok(serializer.encode(&body)?)
    }
}

/// The codec covers the body only; indices and URL parameters are not part
/// of the document.
impl JsonCodec for SearchRequest {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec_opt("query", self.query.as_ref())
            .put_codec_opt("suggest", self.suggest.as_ref())
            .put_opt("from", self.from)
            .put_opt("size", self.size)
            .put_codec_opt("_source", self.source.as_ref());
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SearchRequest", value)?;
        reader.reject_unknown(&BODY_KEYS)?;
        Ok(SearchRequest {
            query: reader.decode_opt("query", Query::from_json)?,
            suggest: reader.decode_opt("suggest", Suggest::from_json)?,
            from: reader.u32_opt("from")?,
            size: reader.u32_opt("size")?,
            source: reader.decode_opt("_source", SourceFilter::from_json)?,
            ..SearchRequest::default()
        })
    }
}

/// Builder for [`SearchRequest`]. Every part is optional.
#[derive(Debug, Default)]
pub struct SearchRequestBuilder {
    indices: Vec<String>,
    query: Option<Query>,
    suggest: Option<Suggest>,
    from: Option<u32>,
    size: Option<u32>,
    source: Option<SourceFilter>,
    routing: Option<String>,
    preference: Option<String>,
}

impl SearchRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one index to search.
    pub fn index<S: Into<String>>(mut self, index: S) -> Self {
        self.indices.push(index.into());
        self
    }

    pub fn indices<I, S>(mut self, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indices.extend(indices.into_iter().map(Into::into));
        self
    }

    setters! {
        query: Query,
        suggest: Suggest,
        /// Offset of the first hit.
        from: u32,
        /// Number of hits to return.
        size: u32,
        source: SourceFilter,
        routing: String,
        preference: String,
    }
}

impl Builder for SearchRequestBuilder {
    type Output = SearchRequest;

    fn build(self) -> Result<SearchRequest> {
        if let Some(bad) = self
            .indices
            .iter()
            .find(|index| index.is_empty() || index.contains(',') || index.contains('/'))
        {
            return Err(QueryDslError::invalid_field(
                "indices",
                format!("illegal index name {bad:?}"),
            ));
        }
        Ok(SearchRequest {
            indices: self.indices,
            query: self.query,
            suggest: self.suggest,
            from: self.from,
            size: self.size,
            source: self.source,
            routing: self.routing,
            preference: self.preference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MatchAllQuery, MatchQuery};
    use crate::request::JsonSerializer;
    use crate::suggest::TermSuggestion;
    use serde_json::json;

    #[test]
    fn test_search_request_endpoint() {
        let request = SearchRequest::builder().build().unwrap();
        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.endpoint(), "_search");

        let request = SearchRequest::builder()
            .index("posts")
            .indices(["comments", "users"])
            .build()
            .unwrap();
        assert_eq!(request.endpoint(), "posts,comments,users/_search");
    }

    #[test]
    fn test_search_request_query_params() {
        let request = SearchRequest::builder()
            .routing("user1")
            .preference("_local")
            .build()
            .unwrap();
        assert_eq!(
            request.query_params(),
            vec![
                ("routing".to_string(), "user1".to_string()),
                ("preference".to_string(), "_local".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_request_body() {
        let suggest = Suggest::builder()
            .global_text("tring out")
            .suggestion(
                "fix",
                TermSuggestion::builder().field("message").build().unwrap(),
            )
            .build()
            .unwrap();
        let request = SearchRequest::builder()
            .index("posts")
            .query(MatchQuery::builder().field("message").value("hello").build().unwrap())
            .suggest(suggest)
            .from(10u32)
            .size(5u32)
            .source(false)
            .build()
            .unwrap();

        let expected = json!({
            "query": {"match": {"message": "hello"}},
            "suggest": {
                "text": "tring out",
                "fix": {"term": {"field": "message"}}
            },
            "from": 10,
            "size": 5,
            "_source": false
        });
        assert_eq!(request.to_json(), expected);

        let body = request.make_body(&JsonSerializer::default()).unwrap();
        let decoded: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, expected);

        let parsed = SearchRequest::from_json(&expected).unwrap();
        assert_eq!(parsed.query, request.query);
        assert_eq!(parsed.suggest, request.suggest);
        assert!(parsed.indices.is_empty());
    }

    #[test]
    fn test_empty_search_body_is_an_object() {
        let request = SearchRequest::builder().build().unwrap();
        let body = request.make_body(&JsonSerializer::default()).unwrap();
        assert_eq!(body, b"{}".to_vec());
    }

    #[test]
    fn test_search_request_rejects_unknown_body_key() {
        let doc = json!({"query": {"match_all": {}}, "aggs": {}});
        assert!(SearchRequest::from_json(&doc).is_err());

        let doc = json!({"query": {"match_all": {}}});
        let request = SearchRequest::from_json(&doc).unwrap();
        assert_eq!(request.query, Some(Query::from(MatchAllQuery::new())));
    }

    #[test]
    fn test_search_request_illegal_index() {
        let err = SearchRequest::builder().index("a,b").build().unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { ref field, .. } if field == "indices"));
    }
}
