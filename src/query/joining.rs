//! Joining queries over nested objects and parent/child relations.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter, serde_via_codec};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::{ScoreMode, SourceFilter};
use crate::query::{Query, QueryType, QueryVariant, decode_query};

/// Options for returning the nested or child hits that caused a match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InnerHits {
    pub name: Option<String>,
    pub from: Option<u32>,
    pub size: Option<u32>,
    /// Sort clauses, kept as raw JSON.
    pub sort: Vec<Value>,
    pub source: Option<SourceFilter>,
    pub explain: Option<bool>,
    pub version: Option<bool>,
}

impl InnerHits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn from(mut self, from: u32) -> Self {
        self.from = Some(from);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sort<V: Into<Value>>(mut self, sort: V) -> Self {
        self.sort.push(sort.into());
        self
    }

    pub fn source<S: Into<SourceFilter>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn explain(mut self, explain: bool) -> Self {
        self.explain = Some(explain);
        self
    }

    pub fn version(mut self, version: bool) -> Self {
        self.version = Some(version);
        self
    }
}

impl JsonCodec for InnerHits {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_opt("name", self.name.as_deref())
            .put_opt("from", self.from)
            .put_opt("size", self.size);
        if !self.sort.is_empty() {
            writer.put("sort", self.sort.clone());
        }
        writer
            .put_codec_opt("_source", self.source.as_ref())
            .put_opt("explain", self.explain)
            .put_opt("version", self.version);
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("InnerHits", value)?;
        let sort = match reader.value_opt("sort") {
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
            None => Vec::new(),
        };
        Ok(InnerHits {
            name: reader.string_opt("name")?,
            from: reader.u32_opt("from")?,
            size: reader.u32_opt("size")?,
            sort,
            source: reader.decode_opt("_source", SourceFilter::from_json)?,
            explain: reader.bool_opt("explain")?,
            version: reader.bool_opt("version")?,
        })
    }
}

serde_via_codec!(InnerHits);

/// Runs `query` against nested objects under `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedQuery {
    pub path: String,
    pub query: Box<Query>,
    pub score_mode: Option<ScoreMode>,
    pub ignore_unmapped: Option<bool>,
    pub inner_hits: Option<InnerHits>,
    pub boost: Option<BigDecimal>,
}

impl NestedQuery {
    pub fn new<P: Into<String>, Q: Into<Query>>(path: P, query: Q) -> Self {
        NestedQuery {
            path: path.into(),
            query: Box::new(query.into()),
            score_mode: None,
            ignore_unmapped: None,
            inner_hits: None,
            boost: None,
        }
    }

    pub fn builder() -> NestedQueryBuilder {
        NestedQueryBuilder::new()
    }
}

impl QueryVariant for NestedQuery {
    const QUERY_TYPE: QueryType = QueryType::Nested;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("path", self.path.as_str())
            .put_codec("query", self.query.as_ref())
            .put_opt("score_mode", self.score_mode)
            .put_opt("ignore_unmapped", self.ignore_unmapped)
            .put_codec_opt("inner_hits", self.inner_hits.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("NestedQuery", body)?;
        Ok(NestedQuery {
            path: reader.string("path")?,
            query: Box::new(reader.decode("query", decode_query)?),
            score_mode: reader.parse_opt("score_mode")?,
            ignore_unmapped: reader.bool_opt("ignore_unmapped")?,
            inner_hits: reader.decode_opt("inner_hits", InnerHits::from_json)?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`NestedQuery`]. Requires `path`, then `query`.
#[derive(Debug, Default)]
pub struct NestedQueryBuilder {
    path: Option<String>,
    query: Option<Query>,
    score_mode: Option<ScoreMode>,
    ignore_unmapped: Option<bool>,
    inner_hits: Option<InnerHits>,
    boost: Option<BigDecimal>,
}

impl NestedQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Set the path of the nested object field.
        path: String,
        query: Query,
        score_mode: ScoreMode,
        ignore_unmapped: bool,
        inner_hits: InnerHits,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for NestedQueryBuilder {
    type Output = NestedQuery;

    fn build(self) -> Result<NestedQuery> {
        let path = required!(self.path);
        let query = required!(self.query);
        Ok(NestedQuery {
            path,
            query: Box::new(query),
            score_mode: self.score_mode,
            ignore_unmapped: self.ignore_unmapped,
            inner_hits: self.inner_hits,
            boost: self.boost,
        })
    }
}

/// Returns parent documents whose children of `child_type` match `query`.
#[derive(Debug, Clone, PartialEq)]
pub struct HasChildQuery {
    pub child_type: String,
    pub query: Box<Query>,
    pub score_mode: Option<ScoreMode>,
    pub min_children: Option<u32>,
    pub max_children: Option<u32>,
    pub ignore_unmapped: Option<bool>,
    pub inner_hits: Option<InnerHits>,
    pub boost: Option<BigDecimal>,
}

impl HasChildQuery {
    pub fn builder() -> HasChildQueryBuilder {
        HasChildQueryBuilder::new()
    }
}

impl QueryVariant for HasChildQuery {
    const QUERY_TYPE: QueryType = QueryType::HasChild;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("type", self.child_type.as_str())
            .put_codec("query", self.query.as_ref())
            .put_opt("score_mode", self.score_mode)
            .put_opt("min_children", self.min_children)
            .put_opt("max_children", self.max_children)
            .put_opt("ignore_unmapped", self.ignore_unmapped)
            .put_codec_opt("inner_hits", self.inner_hits.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("HasChildQuery", body)?;
        Ok(HasChildQuery {
            child_type: reader.string("type")?,
            query: Box::new(reader.decode("query", decode_query)?),
            score_mode: reader.parse_opt("score_mode")?,
            min_children: reader.u32_opt("min_children")?,
            max_children: reader.u32_opt("max_children")?,
            ignore_unmapped: reader.bool_opt("ignore_unmapped")?,
            inner_hits: reader.decode_opt("inner_hits", InnerHits::from_json)?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`HasChildQuery`]. Requires `type`, then `query`.
#[derive(Debug, Default)]
pub struct HasChildQueryBuilder {
    child_type: Option<String>,
    query: Option<Query>,
    score_mode: Option<ScoreMode>,
    min_children: Option<u32>,
    max_children: Option<u32>,
    ignore_unmapped: Option<bool>,
    inner_hits: Option<InnerHits>,
    boost: Option<BigDecimal>,
}

impl HasChildQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        child_type: String,
        query: Query,
        score_mode: ScoreMode,
        min_children: u32,
        max_children: u32,
        ignore_unmapped: bool,
        inner_hits: InnerHits,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for HasChildQueryBuilder {
    type Output = HasChildQuery;

    fn build(self) -> Result<HasChildQuery> {
        let child_type = required!(self.child_type, "type");
        let query = required!(self.query);
        Ok(HasChildQuery {
            child_type,
            query: Box::new(query),
            score_mode: self.score_mode,
            min_children: self.min_children,
            max_children: self.max_children,
            ignore_unmapped: self.ignore_unmapped,
            inner_hits: self.inner_hits,
            boost: self.boost,
        })
    }
}

/// Returns child documents whose parent of `parent_type` matches `query`.
#[derive(Debug, Clone, PartialEq)]
pub struct HasParentQuery {
    pub parent_type: String,
    pub query: Box<Query>,
    /// Whether the parent's score is carried over to the child.
    pub score: Option<bool>,
    pub ignore_unmapped: Option<bool>,
    pub inner_hits: Option<InnerHits>,
    pub boost: Option<BigDecimal>,
}

impl HasParentQuery {
    pub fn builder() -> HasParentQueryBuilder {
        HasParentQueryBuilder::new()
    }
}

impl QueryVariant for HasParentQuery {
    const QUERY_TYPE: QueryType = QueryType::HasParent;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("parent_type", self.parent_type.as_str())
            .put_codec("query", self.query.as_ref())
            .put_opt("score", self.score)
            .put_opt("ignore_unmapped", self.ignore_unmapped)
            .put_codec_opt("inner_hits", self.inner_hits.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("HasParentQuery", body)?;
        Ok(HasParentQuery {
            parent_type: reader.string("parent_type")?,
            query: Box::new(reader.decode("query", decode_query)?),
            score: reader.bool_opt("score")?,
            ignore_unmapped: reader.bool_opt("ignore_unmapped")?,
            inner_hits: reader.decode_opt("inner_hits", InnerHits::from_json)?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`HasParentQuery`]. Requires `parent_type`, then `query`.
#[derive(Debug, Default)]
pub struct HasParentQueryBuilder {
    parent_type: Option<String>,
    query: Option<Query>,
    score: Option<bool>,
    ignore_unmapped: Option<bool>,
    inner_hits: Option<InnerHits>,
    boost: Option<BigDecimal>,
}

impl HasParentQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        parent_type: String,
        query: Query,
        score: bool,
        ignore_unmapped: bool,
        inner_hits: InnerHits,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for HasParentQueryBuilder {
    type Output = HasParentQuery;

    fn build(self) -> Result<HasParentQuery> {
        let parent_type = required!(self.parent_type);
        let query = required!(self.query);
        Ok(HasParentQuery {
            parent_type,
            query: Box::new(query),
            score: self.score,
            ignore_unmapped: self.ignore_unmapped,
            inner_hits: self.inner_hits,
            boost: self.boost,
        })
    }
}

/// Returns child documents of `child_type` joined to the parent `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentIdQuery {
    pub child_type: String,
    pub id: String,
    pub ignore_unmapped: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl ParentIdQuery {
    pub fn new<T: Into<String>, I: Into<String>>(child_type: T, id: I) -> Self {
        ParentIdQuery {
            child_type: child_type.into(),
            id: id.into(),
            ignore_unmapped: None,
            boost: None,
        }
    }

    pub fn builder() -> ParentIdQueryBuilder {
        ParentIdQueryBuilder::new()
    }
}

impl QueryVariant for ParentIdQuery {
    const QUERY_TYPE: QueryType = QueryType::ParentId;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("type", self.child_type.as_str())
            .put("id", self.id.as_str())
            .put_opt("ignore_unmapped", self.ignore_unmapped)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("ParentIdQuery", body)?;
        Ok(ParentIdQuery {
            child_type: reader.string("type")?,
            id: reader.scalar("id")?,
            ignore_unmapped: reader.bool_opt("ignore_unmapped")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct ParentIdQueryBuilder {
    child_type: Option<String>,
    id: Option<String>,
    ignore_unmapped: Option<bool>,
    boost: Option<BigDecimal>,
}

impl ParentIdQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        child_type: String,
        id: String,
        ignore_unmapped: bool,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for ParentIdQueryBuilder {
    type Output = ParentIdQuery;

    fn build(self) -> Result<ParentIdQuery> {
        let child_type = required!(self.child_type, "type");
        let id = required!(self.id);
        Ok(ParentIdQuery {
            child_type,
            id,
            ignore_unmapped: self.ignore_unmapped,
            boost: self.boost,
        })
    }
}
