//! Specialized queries: `more_like_this`, `script`, `percolate` and
//! `wrapper`.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{IntoDecimal, JsonCodec, KeyedReader, KeyedWriter, serde_via_codec};
use crate::error::{QueryDslError, Result};
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::{MinimumShouldMatch, Script};
use crate::query::{QueryType, QueryVariant};

/// One `like` or `unlike` entry of a `more_like_this` query.
#[derive(Debug, Clone, PartialEq)]
pub enum MoreLikeThisItem {
    /// Free text.
    Text(String),
    /// An indexed document by id, or an artificial document given inline.
    Document {
        index: Option<String>,
        id: Option<String>,
        doc: Option<Value>,
    },
}

impl MoreLikeThisItem {
    /// Reference to an indexed document.
    pub fn document<I: Into<String>, D: Into<String>>(index: I, id: D) -> Self {
        MoreLikeThisItem::Document {
            index: Some(index.into()),
            id: Some(id.into()),
            doc: None,
        }
    }

    /// An artificial document not present in the index.
    pub fn artificial(doc: Value) -> Self {
        MoreLikeThisItem::Document {
            index: None,
            id: None,
            doc: Some(doc),
        }
    }
}

impl JsonCodec for MoreLikeThisItem {
    fn to_json(&self) -> Value {
        match self {
            MoreLikeThisItem::Text(text) => Value::from(text.as_str()),
            MoreLikeThisItem::Document { index, id, doc } => {
                let mut writer = KeyedWriter::new();
                writer
                    .put_opt("_index", index.as_deref())
                    .put_opt("_id", id.as_deref())
                    .put_opt("doc", doc.clone());
                writer.finish()
            }
        }
    }

    fn from_json(value: &Value) -> Result<Self> {
        if let Value::String(text) = value {
            return Ok(MoreLikeThisItem::Text(text.clone()));
        }
        let reader = KeyedReader::new("MoreLikeThisItem", value)?;
        reader.reject_unknown(&["_index", "_id", "doc"])?;
        let id = reader.scalar_opt("_id")?;
        let doc = reader.value_opt("doc").cloned();
        if id.is_none() && doc.is_none() {
            return Err(QueryDslError::at_least_one(["_id", "doc"]));
        }
        Ok(MoreLikeThisItem::Document {
            index: reader.string_opt("_index")?,
            id,
            doc,
        })
    }
}

serde_via_codec!(MoreLikeThisItem);

impl From<&str> for MoreLikeThisItem {
    fn from(text: &str) -> Self {
        MoreLikeThisItem::Text(text.to_string())
    }
}

impl From<String> for MoreLikeThisItem {
    fn from(text: String) -> Self {
        MoreLikeThisItem::Text(text)
    }
}

/// `like` and `unlike` accept a single item or a list.
fn decode_items(reader: &KeyedReader<'_>, key: &str) -> Result<Vec<MoreLikeThisItem>> {
    match reader.value_opt(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(MoreLikeThisItem::from_json).collect(),
        Some(single) => Ok(vec![MoreLikeThisItem::from_json(single)?]),
    }
}

/// Finds documents similar to the given texts or documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoreLikeThisQuery {
    pub fields: Vec<String>,
    pub like: Vec<MoreLikeThisItem>,
    pub unlike: Vec<MoreLikeThisItem>,
    pub max_query_terms: Option<u32>,
    pub min_term_freq: Option<u32>,
    pub min_doc_freq: Option<u32>,
    pub max_doc_freq: Option<u32>,
    pub min_word_length: Option<u32>,
    pub max_word_length: Option<u32>,
    pub stop_words: Vec<String>,
    pub analyzer: Option<String>,
    pub minimum_should_match: Option<MinimumShouldMatch>,
    pub boost_terms: Option<BigDecimal>,
    pub include: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl MoreLikeThisQuery {
    pub fn builder() -> MoreLikeThisQueryBuilder {
        MoreLikeThisQueryBuilder::new()
    }
}

impl QueryVariant for MoreLikeThisQuery {
    const QUERY_TYPE: QueryType = QueryType::MoreLikeThis;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_strings("fields", &self.fields)
            .put_codec_list("like", &self.like)
            .put_codec_list("unlike", &self.unlike)
            .put_opt("max_query_terms", self.max_query_terms)
            .put_opt("min_term_freq", self.min_term_freq)
            .put_opt("min_doc_freq", self.min_doc_freq)
            .put_opt("max_doc_freq", self.max_doc_freq)
            .put_opt("min_word_length", self.min_word_length)
            .put_opt("max_word_length", self.max_word_length)
            .put_strings("stop_words", &self.stop_words)
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_codec_opt("minimum_should_match", self.minimum_should_match.as_ref())
            .put_decimal_opt("boost_terms", self.boost_terms.as_ref())
            .put_opt("include", self.include)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("MoreLikeThisQuery", body)?;
        let like = decode_items(&reader, "like")?;
        if like.is_empty() {
            return Err(QueryDslError::missing_field("like"));
        }
        Ok(MoreLikeThisQuery {
            fields: reader.strings_opt("fields")?.unwrap_or_default(),
            like,
            unlike: decode_items(&reader, "unlike")?,
            max_query_terms: reader.u32_opt("max_query_terms")?,
            min_term_freq: reader.u32_opt("min_term_freq")?,
            min_doc_freq: reader.u32_opt("min_doc_freq")?,
            max_doc_freq: reader.u32_opt("max_doc_freq")?,
            min_word_length: reader.u32_opt("min_word_length")?,
            max_word_length: reader.u32_opt("max_word_length")?,
            stop_words: reader.strings_opt("stop_words")?.unwrap_or_default(),
            analyzer: reader.string_opt("analyzer")?,
            minimum_should_match: reader
                .decode_opt("minimum_should_match", MinimumShouldMatch::from_json)?,
            boost_terms: reader.decimal_opt("boost_terms")?,
            include: reader.bool_opt("include")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`MoreLikeThisQuery`]. Requires at least one `like` item.
#[derive(Debug, Default)]
pub struct MoreLikeThisQueryBuilder {
    query: MoreLikeThisQuery,
}

impl MoreLikeThisQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn like<T: Into<MoreLikeThisItem>>(mut self, item: T) -> Self {
        self.query.like.push(item.into());
        self
    }

    pub fn unlike<T: Into<MoreLikeThisItem>>(mut self, item: T) -> Self {
        self.query.unlike.push(item.into());
        self
    }

    pub fn max_query_terms(mut self, value: u32) -> Self {
        self.query.max_query_terms = Some(value);
        self
    }

    pub fn min_term_freq(mut self, value: u32) -> Self {
        self.query.min_term_freq = Some(value);
        self
    }

    pub fn min_doc_freq(mut self, value: u32) -> Self {
        self.query.min_doc_freq = Some(value);
        self
    }

    pub fn max_doc_freq(mut self, value: u32) -> Self {
        self.query.max_doc_freq = Some(value);
        self
    }

    pub fn min_word_length(mut self, value: u32) -> Self {
        self.query.min_word_length = Some(value);
        self
    }

    pub fn max_word_length(mut self, value: u32) -> Self {
        self.query.max_word_length = Some(value);
        self
    }

    pub fn stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.query.analyzer = Some(analyzer.into());
        self
    }

    pub fn minimum_should_match<M: Into<MinimumShouldMatch>>(mut self, value: M) -> Self {
        self.query.minimum_should_match = Some(value.into());
        self
    }

    pub fn boost_terms(mut self, value: impl IntoDecimal) -> Self {
        self.query.boost_terms = Some(IntoDecimal::into_decimal(value));
        self
    }

    /// Whether the input documents themselves may be returned.
    pub fn include(mut self, include: bool) -> Self {
        self.query.include = Some(include);
        self
    }

    pub fn boost(mut self, value: impl IntoDecimal) -> Self {
        self.query.boost = Some(IntoDecimal::into_decimal(value));
        self
    }
}

impl Builder for MoreLikeThisQueryBuilder {
    type Output = MoreLikeThisQuery;

    fn build(self) -> Result<MoreLikeThisQuery> {
        if self.query.like.is_empty() {
            return Err(QueryDslError::missing_field("like"));
        }
        Ok(self.query)
    }
}

/// Filters documents with a script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptQuery {
    pub script: Script,
    pub boost: Option<BigDecimal>,
}

impl ScriptQuery {
    pub fn new<S: Into<Script>>(script: S) -> Self {
        ScriptQuery {
            script: script.into(),
            boost: None,
        }
    }

    pub fn builder() -> ScriptQueryBuilder {
        ScriptQueryBuilder::new()
    }
}

impl QueryVariant for ScriptQuery {
    const QUERY_TYPE: QueryType = QueryType::Script;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec("script", &self.script)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("ScriptQuery", body)?;
        Ok(ScriptQuery {
            script: reader.decode("script", Script::from_json)?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct ScriptQueryBuilder {
    script: Option<Script>,
    boost: Option<BigDecimal>,
}

impl ScriptQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        script: Script,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for ScriptQueryBuilder {
    type Output = ScriptQuery;

    fn build(self) -> Result<ScriptQuery> {
        Ok(ScriptQuery {
            script: required!(self.script),
            boost: self.boost,
        })
    }
}

/// Matches stored queries against a document, given inline or by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PercolateQuery {
    pub field: String,
    pub document: Option<Value>,
    pub index: Option<String>,
    pub id: Option<String>,
    pub routing: Option<String>,
    pub preference: Option<String>,
    pub boost: Option<BigDecimal>,
}

impl PercolateQuery {
    pub fn builder() -> PercolateQueryBuilder {
        PercolateQueryBuilder::new()
    }

    /// Exactly one of an inline `document` or an `index`/`id` reference.
    fn check_document_source(self) -> Result<Self> {
        let referenced = self.index.is_some() || self.id.is_some();
        match (&self.document, referenced) {
            (Some(_), true) => Err(QueryDslError::invalid_field(
                "document",
                "document cannot be combined with index/id",
            )),
            (None, false) => Err(QueryDslError::at_least_one(["document", "id"])),
            (None, true) if self.index.is_none() => Err(QueryDslError::missing_field("index")),
            (None, true) if self.id.is_none() => Err(QueryDslError::missing_field("id")),
            _ => Ok(self),
        }
    }
}

impl QueryVariant for PercolateQuery {
    const QUERY_TYPE: QueryType = QueryType::Percolate;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("field", self.field.as_str())
            .put_opt("document", self.document.clone())
            .put_opt("index", self.index.as_deref())
            .put_opt("id", self.id.as_deref())
            .put_opt("routing", self.routing.as_deref())
            .put_opt("preference", self.preference.as_deref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("PercolateQuery", body)?;
        PercolateQuery {
            field: reader.string("field")?,
            document: reader.value_opt("document").cloned(),
            index: reader.string_opt("index")?,
            id: reader.scalar_opt("id")?,
            routing: reader.string_opt("routing")?,
            preference: reader.string_opt("preference")?,
            boost: reader.decimal_opt("boost")?,
        }
        .check_document_source()
    }
}

/// Builder for [`PercolateQuery`]. Requires `field`, then a document source.
#[derive(Debug, Default)]
pub struct PercolateQueryBuilder {
    field: Option<String>,
    document: Option<Value>,
    index: Option<String>,
    id: Option<String>,
    routing: Option<String>,
    preference: Option<String>,
    boost: Option<BigDecimal>,
}

impl PercolateQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Set the `percolator` field holding the stored queries.
        field: String,
        document: Value,
        index: String,
        id: String,
        routing: String,
        preference: String,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for PercolateQueryBuilder {
    type Output = PercolateQuery;

    fn build(self) -> Result<PercolateQuery> {
        let field = required!(self.field);
        PercolateQuery {
            field,
            document: self.document,
            index: self.index,
            id: self.id,
            routing: self.routing,
            preference: self.preference,
            boost: self.boost,
        }
        .check_document_source()
    }
}

/// A query given as base64-encoded JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperQuery {
    pub query: String,
}

fn is_base64(text: &str) -> bool {
    let trimmed = text.trim_end_matches('=');
    !text.is_empty()
        && text.len() % 4 == 0
        && text.len() - trimmed.len() <= 2
        && trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

impl WrapperQuery {
    pub fn new<S: Into<String>>(query: S) -> Result<Self> {
        let query = query.into();
        if !is_base64(&query) {
            return Err(QueryDslError::invalid_field("query", "not base64 text"));
        }
        Ok(WrapperQuery { query })
    }

    pub fn builder() -> WrapperQueryBuilder {
        WrapperQueryBuilder::new()
    }
}

impl QueryVariant for WrapperQuery {
    const QUERY_TYPE: QueryType = QueryType::Wrapper;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer.put("query", self.query.as_str());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("WrapperQuery", body)?;
        WrapperQuery::new(reader.string("query")?)
    }
}

#[derive(Debug, Default)]
pub struct WrapperQueryBuilder {
    query: Option<String>,
}

impl WrapperQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Set the base64-encoded query text.
        query: String,
    }
}

impl Builder for WrapperQueryBuilder {
    type Output = WrapperQuery;

    fn build(self) -> Result<WrapperQuery> {
        WrapperQuery::new(required!(self.query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_more_like_this_query() {
        let query = MoreLikeThisQuery::builder()
            .fields(["title", "description"])
            .like("Once upon a time")
            .like(MoreLikeThisItem::document("imdb", "1"))
            .min_term_freq(1)
            .max_query_terms(12)
            .build()
            .unwrap();

        let expected = json!({
            "more_like_this": {
                "fields": ["title", "description"],
                "like": [
                    "Once upon a time",
                    {"_index": "imdb", "_id": "1"}
                ],
                "max_query_terms": 12,
                "min_term_freq": 1
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(MoreLikeThisQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_more_like_this_requires_like() {
        let err = MoreLikeThisQuery::builder()
            .fields(["title"])
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "like"));

        let single = json!({"more_like_this": {"like": "Once upon a time"}});
        let query = MoreLikeThisQuery::from_json(&single).unwrap();
        assert_eq!(query.like, vec![MoreLikeThisItem::from("Once upon a time")]);
    }

    #[test]
    fn test_more_like_this_item_forms() {
        let artificial = MoreLikeThisItem::artificial(json!({"name": {"first": "Ben"}}));
        assert_eq!(artificial.to_json(), json!({"doc": {"name": {"first": "Ben"}}}));
        assert_eq!(MoreLikeThisItem::from_json(&artificial.to_json()).unwrap(), artificial);

        assert!(MoreLikeThisItem::from_json(&json!({"_index": "imdb"})).is_err());
        assert!(MoreLikeThisItem::from_json(&json!({"_id": "1", "other": true})).is_err());
    }

    #[test]
    fn test_script_query() {
        let query = ScriptQuery::new(
            Script::new("doc['num1'].value > params.param1")
                .lang("painless")
                .param("param1", 5),
        );
        let expected = json!({
            "script": {
                "script": {
                    "source": "doc['num1'].value > params.param1",
                    "lang": "painless",
                    "params": {"param1": 5}
                }
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(ScriptQuery::from_json(&expected).unwrap(), query);

        let err = ScriptQuery::builder().boost(2).build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "script"));
    }

    #[test]
    fn test_percolate_query_sources() {
        let inline = PercolateQuery::builder()
            .field("query")
            .document(json!({"message": "A new bonsai tree in the office"}))
            .build()
            .unwrap();
        let expected = json!({
            "percolate": {
                "field": "query",
                "document": {"message": "A new bonsai tree in the office"}
            }
        });
        assert_eq!(inline.to_json(), expected);
        assert_eq!(PercolateQuery::from_json(&expected).unwrap(), inline);

        let referenced = PercolateQuery::builder()
            .field("query")
            .index("my-index")
            .id("2")
            .build()
            .unwrap();
        assert_eq!(PercolateQuery::from_json(&referenced.to_json()).unwrap(), referenced);

        let err = PercolateQuery::builder().field("query").build().unwrap_err();
        assert!(matches!(err, QueryDslError::AtLeastOneRequired(_)));

        let err = PercolateQuery::builder()
            .field("query")
            .index("my-index")
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "id"));

        let err = PercolateQuery::builder()
            .field("query")
            .document(json!({}))
            .id("2")
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { .. }));
    }

    #[test]
    fn test_wrapper_query() {
        let query = WrapperQuery::builder()
            .query("eyJ0ZXJtIiA6IHsgInVzZXIiIDogIktpbWNoeSIgfX0=")
            .build()
            .unwrap();
        let expected = json!({"wrapper": {"query": "eyJ0ZXJtIiA6IHsgInVzZXIiIDogIktpbWNoeSIgfX0="}});
        assert_eq!(query.to_json(), expected);
        assert_eq!(WrapperQuery::from_json(&expected).unwrap(), query);

        assert!(WrapperQuery::new("not base64!").is_err());
        let err = WrapperQuery::builder().build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "query"));
    }
}
