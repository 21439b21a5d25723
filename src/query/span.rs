//! Span queries: positional matching over term spans.
//!
//! Compound span queries only nest other span queries, which the
//! [`SpanQuery`] sum type enforces. `span_multi` is the one bridge from a
//! regular multi-term query into the span family.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{FieldBody, JsonCodec, KeyedReader, KeyedWriter, decode_field_keyed, named};
use crate::error::{QueryDslError, Result};
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::{Query, QueryType, QueryVariant, decode_query};

/// Any span query.
#[derive(Debug, Clone, PartialEq)]
pub enum SpanQuery {
    Term(SpanTermQuery),
    Multi(SpanMultiTermQuery),
    First(SpanFirstQuery),
    Near(SpanNearQuery),
    Or(SpanOrQuery),
    Not(SpanNotQuery),
    Containing(SpanContainingQuery),
    Within(SpanWithinQuery),
    FieldMasking(FieldMaskingSpanQuery),
}

macro_rules! each_span {
    ($value:expr, $q:ident => $body:expr) => {
        match $value {
            SpanQuery::Term($q) => $body,
            SpanQuery::Multi($q) => $body,
            SpanQuery::First($q) => $body,
            SpanQuery::Near($q) => $body,
            SpanQuery::Or($q) => $body,
            SpanQuery::Not($q) => $body,
            SpanQuery::Containing($q) => $body,
            SpanQuery::Within($q) => $body,
            SpanQuery::FieldMasking($q) => $body,
        }
    };
}

impl SpanQuery {
    pub fn query_type(&self) -> QueryType {
        each_span!(self, q => q.query_type())
    }

    /// Decode a body under an already-known span discriminator.
    pub fn decode_tagged(query_type: QueryType, body: &Value) -> Result<SpanQuery> {
        let query = match query_type {
            QueryType::SpanTerm => SpanQuery::Term(SpanTermQuery::decode_body(body)?),
            QueryType::SpanMulti => SpanQuery::Multi(SpanMultiTermQuery::decode_body(body)?),
            QueryType::SpanFirst => SpanQuery::First(SpanFirstQuery::decode_body(body)?),
            QueryType::SpanNear => SpanQuery::Near(SpanNearQuery::decode_body(body)?),
            QueryType::SpanOr => SpanQuery::Or(SpanOrQuery::decode_body(body)?),
            QueryType::SpanNot => SpanQuery::Not(SpanNotQuery::decode_body(body)?),
            QueryType::SpanContaining => {
                SpanQuery::Containing(SpanContainingQuery::decode_body(body)?)
            }
            QueryType::SpanWithin => SpanQuery::Within(SpanWithinQuery::decode_body(body)?),
            QueryType::FieldMaskingSpan => {
                SpanQuery::FieldMasking(FieldMaskingSpanQuery::decode_body(body)?)
            }
            other => return Err(QueryDslError::unrecognized("span query", other.as_str())),
        };
        Ok(query)
    }
}

impl JsonCodec for SpanQuery {
    fn to_json(&self) -> Value {
        each_span!(self, q => q.to_json())
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SpanQuery", value)?;
        let (tag, body) = reader.single_entry()?;
        let query_type: QueryType = tag
            .parse()
            .map_err(|_| QueryDslError::unrecognized("span query", tag))?;
        SpanQuery::decode_tagged(query_type, body)
    }
}

crate::codec::serde_via_codec!(SpanQuery);

impl From<SpanQuery> for Query {
    fn from(query: SpanQuery) -> Self {
        Query::Span(query)
    }
}

/// Wires a span type into the codec, serde, [`SpanQuery`] and [`Query`].
macro_rules! span_variant {
    ($($t:ident => $variant:ident),+ $(,)?) => {
        $(
            impl JsonCodec for $t {
                fn to_json(&self) -> Value {
                    named(<$t as QueryVariant>::QUERY_TYPE.as_str(), self.encode_body())
                }

                fn from_json(value: &Value) -> Result<Self> {
                    let body = crate::codec::decode_named(
                        stringify!($t),
                        <$t as QueryVariant>::QUERY_TYPE.as_str(),
                        value,
                    )?;
                    <$t as QueryVariant>::decode_body(body)
                }
            }

            crate::codec::serde_via_codec!($t);

            impl From<$t> for SpanQuery {
                fn from(query: $t) -> Self {
                    SpanQuery::$variant(query)
                }
            }

            impl From<$t> for Query {
                fn from(query: $t) -> Self {
                    Query::Span(SpanQuery::$variant(query))
                }
            }
        )+
    };
}

span_variant! {
    SpanTermQuery => Term,
    SpanMultiTermQuery => Multi,
    SpanFirstQuery => First,
    SpanNearQuery => Near,
    SpanOrQuery => Or,
    SpanNotQuery => Not,
    SpanContainingQuery => Containing,
    SpanWithinQuery => Within,
    FieldMaskingSpanQuery => FieldMasking,
}

fn decode_span(value: &Value) -> Result<Box<SpanQuery>> {
    SpanQuery::from_json(value).map(Box::new)
}

/// Matches spans containing a term.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanTermQuery {
    pub field: String,
    pub value: Value,
    pub boost: Option<BigDecimal>,
}

impl SpanTermQuery {
    pub fn new<F: Into<String>, V: Into<Value>>(field: F, value: V) -> Self {
        SpanTermQuery {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }
}

impl QueryVariant for SpanTermQuery {
    const QUERY_TYPE: QueryType = QueryType::SpanTerm;

    fn encode_body(&self) -> Value {
        let Some(boost) = &self.boost else {
            return named(&self.field, self.value.clone());
        };
        let mut writer = KeyedWriter::new();
        writer.put("value", self.value.clone()).put_decimal("boost", boost);
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("SpanTermQuery", body)?;
        match body {
            FieldBody::Short(value) => Ok(SpanTermQuery::new(
                field,
                FieldBody::short_scalar(value, "SpanTermQuery")?,
            )),
            FieldBody::Expanded(reader) => Ok(SpanTermQuery {
                field,
                value: reader.scalar_value("value")?,
                boost: reader.decimal_opt("boost")?,
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct SpanTermQueryBuilder {
    field: Option<String>,
    value: Option<Value>,
    boost: Option<BigDecimal>,
}

impl SpanTermQueryBuilder {
    setters! {
        field: String,
        value: Value,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for SpanTermQueryBuilder {
    type Output = SpanTermQuery;

    fn build(self) -> Result<SpanTermQuery> {
        let field = required!(self.field);
        let value = required!(self.value);
        Ok(SpanTermQuery {
            field,
            value,
            boost: self.boost,
        })
    }
}

/// Wraps a `prefix`, `wildcard`, `regexp`, `fuzzy` or `range` query as a
/// span query.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanMultiTermQuery {
    pub match_query: Box<Query>,
    pub boost: Option<BigDecimal>,
}

fn check_multi_term(query: &Query) -> Result<()> {
    match query.query_type() {
        QueryType::Prefix
        | QueryType::Wildcard
        | QueryType::Regexp
        | QueryType::Fuzzy
        | QueryType::Range => Ok(()),
        other => Err(QueryDslError::invalid_field(
            "match",
            format!("{other} is not a multi-term query"),
        )),
    }
}

impl QueryVariant for SpanMultiTermQuery {
    const QUERY_TYPE: QueryType = QueryType::SpanMulti;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec("match", self.match_query.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SpanMultiTermQuery", body)?;
        let match_query = reader.decode("match", decode_query)?;
        check_multi_term(&match_query)?;
        Ok(SpanMultiTermQuery {
            match_query: Box::new(match_query),
            boost: reader.decimal_opt("boost")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct SpanMultiTermQueryBuilder {
    match_query: Option<Query>,
    boost: Option<BigDecimal>,
}

impl SpanMultiTermQueryBuilder {
    setters! {
        /// Set the wrapped multi-term query.
        match_query: Query,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for SpanMultiTermQueryBuilder {
    type Output = SpanMultiTermQuery;

    fn build(self) -> Result<SpanMultiTermQuery> {
        let match_query = required!(self.match_query, "match");
        check_multi_term(&match_query)?;
        Ok(SpanMultiTermQuery {
            match_query: Box::new(match_query),
            boost: self.boost,
        })
    }
}

/// Matches spans near the beginning of a field, ending at or before `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanFirstQuery {
    pub match_query: Box<SpanQuery>,
    pub end: u32,
    pub boost: Option<BigDecimal>,
}

impl QueryVariant for SpanFirstQuery {
    const QUERY_TYPE: QueryType = QueryType::SpanFirst;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec("match", self.match_query.as_ref())
            .put("end", self.end)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SpanFirstQuery", body)?;
        Ok(SpanFirstQuery {
            match_query: reader.decode("match", decode_span)?,
            end: reader
                .u32_opt("end")?
                .ok_or_else(|| QueryDslError::key_not_found("SpanFirstQuery", "end"))?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct SpanFirstQueryBuilder {
    match_query: Option<SpanQuery>,
    end: Option<u32>,
    boost: Option<BigDecimal>,
}

impl SpanFirstQueryBuilder {
    setters! {
        match_query: SpanQuery,
        /// Maximum end position of the match.
        end: u32,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for SpanFirstQueryBuilder {
    type Output = SpanFirstQuery;

    fn build(self) -> Result<SpanFirstQuery> {
        let match_query = required!(self.match_query, "match");
        let end = required!(self.end);
        Ok(SpanFirstQuery {
            match_query: Box::new(match_query),
            end,
            boost: self.boost,
        })
    }
}

/// Matches spans that are near one another.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanNearQuery {
    pub clauses: Vec<SpanQuery>,
    /// Maximum number of intervening unmatched positions.
    pub slop: Option<u32>,
    pub in_order: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl QueryVariant for SpanNearQuery {
    const QUERY_TYPE: QueryType = QueryType::SpanNear;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec_list("clauses", &self.clauses)
            .put_opt("slop", self.slop)
            .put_opt("in_order", self.in_order)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SpanNearQuery", body)?;
        Ok(SpanNearQuery {
            clauses: decode_clauses(&reader)?,
            slop: reader.u32_opt("slop")?,
            in_order: reader.bool_opt("in_order")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

fn decode_clauses(reader: &KeyedReader<'_>) -> Result<Vec<SpanQuery>> {
    let clauses = reader
        .list_opt("clauses", SpanQuery::from_json)?
        .unwrap_or_default();
    if clauses.is_empty() {
        return Err(QueryDslError::missing_field("clauses"));
    }
    Ok(clauses)
}

#[derive(Debug, Default)]
pub struct SpanNearQueryBuilder {
    clauses: Vec<SpanQuery>,
    slop: Option<u32>,
    in_order: Option<bool>,
    boost: Option<BigDecimal>,
}

impl SpanNearQueryBuilder {
    /// Append a clause.
    pub fn clause<Q: Into<SpanQuery>>(mut self, clause: Q) -> Self {
        self.clauses.push(clause.into());
        self
    }

    setters! {
        slop: u32,
        in_order: bool,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for SpanNearQueryBuilder {
    type Output = SpanNearQuery;

    fn build(self) -> Result<SpanNearQuery> {
        if self.clauses.is_empty() {
            return Err(QueryDslError::missing_field("clauses"));
        }
        Ok(SpanNearQuery {
            clauses: self.clauses,
            slop: self.slop,
            in_order: self.in_order,
            boost: self.boost,
        })
    }
}

/// Matches the union of its span clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanOrQuery {
    pub clauses: Vec<SpanQuery>,
    pub boost: Option<BigDecimal>,
}

impl QueryVariant for SpanOrQuery {
    const QUERY_TYPE: QueryType = QueryType::SpanOr;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec_list("clauses", &self.clauses)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SpanOrQuery", body)?;
        Ok(SpanOrQuery {
            clauses: decode_clauses(&reader)?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct SpanOrQueryBuilder {
    clauses: Vec<SpanQuery>,
    boost: Option<BigDecimal>,
}

impl SpanOrQueryBuilder {
    pub fn clause<Q: Into<SpanQuery>>(mut self, clause: Q) -> Self {
        self.clauses.push(clause.into());
        self
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for SpanOrQueryBuilder {
    type Output = SpanOrQuery;

    fn build(self) -> Result<SpanOrQuery> {
        if self.clauses.is_empty() {
            return Err(QueryDslError::missing_field("clauses"));
        }
        Ok(SpanOrQuery {
            clauses: self.clauses,
            boost: self.boost,
        })
    }
}

/// Removes `include` spans that overlap `exclude` spans.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanNotQuery {
    pub include: Box<SpanQuery>,
    pub exclude: Box<SpanQuery>,
    pub pre: Option<u32>,
    pub post: Option<u32>,
    pub dist: Option<u32>,
    pub boost: Option<BigDecimal>,
}

impl QueryVariant for SpanNotQuery {
    const QUERY_TYPE: QueryType = QueryType::SpanNot;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec("include", self.include.as_ref())
            .put_codec("exclude", self.exclude.as_ref())
            .put_opt("pre", self.pre)
            .put_opt("post", self.post)
            .put_opt("dist", self.dist)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SpanNotQuery", body)?;
        Ok(SpanNotQuery {
            include: reader.decode("include", decode_span)?,
            exclude: reader.decode("exclude", decode_span)?,
            pre: reader.u32_opt("pre")?,
            post: reader.u32_opt("post")?,
            dist: reader.u32_opt("dist")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct SpanNotQueryBuilder {
    include: Option<SpanQuery>,
    exclude: Option<SpanQuery>,
    pre: Option<u32>,
    post: Option<u32>,
    dist: Option<u32>,
    boost: Option<BigDecimal>,
}

impl SpanNotQueryBuilder {
    setters! {
        include: SpanQuery,
        exclude: SpanQuery,
        pre: u32,
        post: u32,
        /// Shorthand for equal `pre` and `post`.
        dist: u32,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for SpanNotQueryBuilder {
    type Output = SpanNotQuery;

    fn build(self) -> Result<SpanNotQuery> {
        let include = required!(self.include);
        let exclude = required!(self.exclude);
        Ok(SpanNotQuery {
            include: Box::new(include),
            exclude: Box::new(exclude),
            pre: self.pre,
            post: self.post,
            dist: self.dist,
            boost: self.boost,
        })
    }
}

/// Defines a span query over a `big` and a `little` span.
macro_rules! big_little_query {
    ($(#[$meta:meta])* $name:ident, $builder:ident, $query_type:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub big: Box<SpanQuery>,
            pub little: Box<SpanQuery>,
            pub boost: Option<BigDecimal>,
        }

        impl QueryVariant for $name {
            const QUERY_TYPE: QueryType = QueryType::$query_type;

            fn encode_body(&self) -> Value {
                let mut writer = KeyedWriter::new();
                writer
                    .put_codec("big", self.big.as_ref())
                    .put_codec("little", self.little.as_ref())
                    .put_decimal_opt("boost", self.boost.as_ref());
                writer.finish()
            }

            fn decode_body(body: &Value) -> Result<Self> {
                let reader = KeyedReader::new(stringify!($name), body)?;
                Ok($name {
                    big: reader.decode("big", decode_span)?,
                    little: reader.decode("little", decode_span)?,
                    boost: reader.decimal_opt("boost")?,
                })
            }
        }

        #[derive(Debug, Default)]
        pub struct $builder {
            big: Option<SpanQuery>,
            little: Option<SpanQuery>,
            boost: Option<BigDecimal>,
        }

        impl $builder {
            setters! {
                big: SpanQuery,
                little: SpanQuery,
            }

            decimal_setters! {
                boost,
            }
        }

        impl Builder for $builder {
            type Output = $name;

            fn build(self) -> Result<$name> {
                let big = required!(self.big);
                let little = required!(self.little);
                Ok($name {
                    big: Box::new(big),
                    little: Box::new(little),
                    boost: self.boost,
                })
            }
        }
    };
}

big_little_query! {
    /// Returns `big` spans that enclose a `little` span.
    SpanContainingQuery, SpanContainingQueryBuilder, SpanContaining
}

big_little_query! {
    /// Returns `little` spans enclosed in a `big` span.
    SpanWithinQuery, SpanWithinQueryBuilder, SpanWithin
}

/// Lets a span query on one field combine with span queries on another by
/// presenting it under `field`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMaskingSpanQuery {
    pub query: Box<SpanQuery>,
    pub field: String,
    pub boost: Option<BigDecimal>,
}

impl QueryVariant for FieldMaskingSpanQuery {
    const QUERY_TYPE: QueryType = QueryType::FieldMaskingSpan;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec("query", self.query.as_ref())
            .put("field", self.field.as_str())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("FieldMaskingSpanQuery", body)?;
        Ok(FieldMaskingSpanQuery {
            query: reader.decode("query", decode_span)?,
            field: reader.string("field")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct FieldMaskingSpanQueryBuilder {
    query: Option<SpanQuery>,
    field: Option<String>,
    boost: Option<BigDecimal>,
}

impl FieldMaskingSpanQueryBuilder {
    setters! {
        query: SpanQuery,
        /// Field the wrapped query is presented under.
        field: String,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for FieldMaskingSpanQueryBuilder {
    type Output = FieldMaskingSpanQuery;

    fn build(self) -> Result<FieldMaskingSpanQuery> {
        let query = required!(self.query);
        let field = required!(self.field);
        Ok(FieldMaskingSpanQuery {
            query: Box::new(query),
            field,
            boost: self.boost,
        })
    }
}

/// Entry points returning a fresh builder for each span query kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanQueryBuilders;

impl SpanQueryBuilders {
    pub fn span_term_query(&self) -> SpanTermQueryBuilder {
        SpanTermQueryBuilder::default()
    }

    pub fn span_multi_term_query(&self) -> SpanMultiTermQueryBuilder {
        SpanMultiTermQueryBuilder::default()
    }

    pub fn span_first_query(&self) -> SpanFirstQueryBuilder {
        SpanFirstQueryBuilder::default()
    }

    pub fn span_near_query(&self) -> SpanNearQueryBuilder {
        SpanNearQueryBuilder::default()
    }

    pub fn span_or_query(&self) -> SpanOrQueryBuilder {
        SpanOrQueryBuilder::default()
    }

    pub fn span_not_query(&self) -> SpanNotQueryBuilder {
        SpanNotQueryBuilder::default()
    }

    pub fn span_containing_query(&self) -> SpanContainingQueryBuilder {
        SpanContainingQueryBuilder::default()
    }

    pub fn span_within_query(&self) -> SpanWithinQueryBuilder {
        SpanWithinQueryBuilder::default()
    }

    pub fn field_masking_span_query(&self) -> FieldMaskingSpanQueryBuilder {
        FieldMaskingSpanQueryBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PrefixQuery, QueryBuilders, TermQuery};
    use serde_json::json;

    fn span() -> SpanQueryBuilders {
        QueryBuilders::span()
    }

    #[test]
    fn test_span_term_query() {
        let query = span()
            .span_term_query()
            .field("user")
            .value("kimchy")
            .boost(2.5)
            .build()
            .unwrap();

        let expected = json!({"span_term": {"user": {"value": "kimchy", "boost": 2.5}}});
        assert_eq!(query.to_json(), expected);
        assert_eq!(SpanTermQuery::from_json(&expected).unwrap(), query);

        let short = json!({"span_term": {"user": "kimchy"}});
        assert_eq!(SpanTermQuery::from_json(&short).unwrap(), SpanTermQuery::new("user", "kimchy"));
    }

    #[test]
    fn test_span_near_query() {
        let query = span()
            .span_near_query()
            .clause(SpanTermQuery::new("field", "value1"))
            .clause(SpanTermQuery::new("field", "value2"))
            .clause(SpanTermQuery::new("field", "value3"))
            .slop(12u32)
            .in_order(false)
            .build()
            .unwrap();

        let expected = json!({
            "span_near": {
                "clauses": [
                    {"span_term": {"field": "value1"}},
                    {"span_term": {"field": "value2"}},
                    {"span_term": {"field": "value3"}}
                ],
                "slop": 12,
                "in_order": false
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(SpanNearQuery::from_json(&expected).unwrap(), query);
        assert!(span().span_near_query().build().is_err());
    }

    #[test]
    fn test_span_clauses_reject_non_span_queries() {
        let doc = json!({"span_or": {"clauses": [{"term": {"field": "value1"}}]}});
        match SpanOrQuery::from_json(&doc) {
            Err(QueryDslError::UnrecognizedVariant { kind, name }) => {
                assert_eq!(kind, "span query");
                assert_eq!(name, "term");
            }
            other => panic!("Expected unrecognized span query, got {other:?}"),
        }
    }

    #[test]
    fn test_span_multi_term_query() {
        let query = span()
            .span_multi_term_query()
            .match_query(PrefixQuery::new("user", "ki"))
            .build()
            .unwrap();

        let expected = json!({"span_multi": {"match": {"prefix": {"user": "ki"}}}});
        assert_eq!(query.to_json(), expected);
        assert_eq!(SpanMultiTermQuery::from_json(&expected).unwrap(), query);

        let err = span()
            .span_multi_term_query()
            .match_query(TermQuery::new("user", "kimchy"))
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { ref field, .. } if field == "match"));
    }

    #[test]
    fn test_span_first_and_not() {
        let first = span()
            .span_first_query()
            .match_query(SpanTermQuery::new("user", "kimchy"))
            .end(3u32)
            .build()
            .unwrap();
        let expected = json!({"span_first": {"match": {"span_term": {"user": "kimchy"}}, "end": 3}});
        assert_eq!(first.to_json(), expected);
        assert_eq!(SpanFirstQuery::from_json(&expected).unwrap(), first);

        let not = span()
            .span_not_query()
            .include(SpanTermQuery::new("field1", "hoya"))
            .exclude(SpanTermQuery::new("field1", "la"))
            .dist(1u32)
            .build()
            .unwrap();
        let encoded = not.to_json();
        assert_eq!(encoded["span_not"]["dist"], json!(1));
        assert_eq!(SpanNotQuery::from_json(&encoded).unwrap(), not);

        let err = span()
            .span_first_query()
            .end(3u32)
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "match"));
    }

    #[test]
    fn test_span_containing_and_within() {
        let containing = span()
            .span_containing_query()
            .big(SpanTermQuery::new("field1", "bar"))
            .little(SpanTermQuery::new("field1", "foo"))
            .build()
            .unwrap();
        let within = span()
            .span_within_query()
            .big(SpanTermQuery::new("field1", "bar"))
            .little(SpanTermQuery::new("field1", "foo"))
            .build()
            .unwrap();

        let containing: Query = containing.into();
        let within: Query = within.into();
        assert_eq!(containing.query_type(), QueryType::SpanContaining);
        assert_ne!(containing, within);
        assert_eq!(Query::from_json(&within.to_json()).unwrap(), within);
    }

    #[test]
    fn test_field_masking_span_query() {
        let query = span()
            .field_masking_span_query()
            .query(SpanTermQuery::new("text.stems", "fox"))
            .field("text")
            .build()
            .unwrap();
        let expected = json!({
            "field_masking_span": {
                "query": {"span_term": {"text.stems": "fox"}},
                "field": "text"
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(FieldMaskingSpanQuery::from_json(&expected).unwrap(), query);
    }
}
