//! Query DSL: the closed set of query kinds and their JSON codec.
//!
//! Every query document is a single-key object `{ "<query_type>": body }`.
//! [`Query`] is the sum type over all kinds; decoding picks the variant from
//! the one key present and rejects documents with more or fewer keys.

pub mod boolean;
pub mod builder;
pub mod compound;
pub mod function_score;
pub mod fuzzy;
pub mod geo;
pub mod joining;
pub mod match_all;
pub mod multi_match;
pub mod phrase;
pub mod query_string;
pub mod range;
pub mod span;
pub mod specialized;
pub mod term;
pub mod types;
pub mod wildcard;

use log::debug;
use serde_json::Value;

use crate::codec::{JsonCodec, KeyedReader, wire_enum};
use crate::error::Result;

pub use self::boolean::{BoolQuery, BoolQueryBuilder, Occur};
pub use self::builder::Builder;
pub use self::compound::{
    BoostingQuery, BoostingQueryBuilder, ConstantScoreQuery, ConstantScoreQueryBuilder,
    DisMaxQuery, DisMaxQueryBuilder,
};
pub use self::function_score::{
    BoostMode, DecayFunction, DecayFunctionBuilder, FieldValueFactorFunction,
    FieldValueFactorFunctionBuilder, FieldValueFactorModifier, FunctionScoreMode,
    FunctionScoreQuery, FunctionScoreQueryBuilder, MultiValueMode, RandomScoreFunction,
    ScoreFunction, ScoreFunctionType, ScriptScoreFunction, WeightFunction,
};
pub use self::fuzzy::{FuzzyQuery, FuzzyQueryBuilder};
pub use self::geo::{
    GeoBoundingBoxQuery, GeoBoundingBoxQueryBuilder, GeoDistanceQuery, GeoDistanceQueryBuilder,
    GeoDistanceType, GeoPolygonQuery, GeoPolygonQueryBuilder, GeoShape, GeoShapeQuery,
    GeoShapeQueryBuilder, GeoValidationMethod, IndexedShape, ShapeRelation,
};
pub use self::joining::{
    HasChildQuery, HasChildQueryBuilder, HasParentQuery, HasParentQueryBuilder, InnerHits,
    NestedQuery, NestedQueryBuilder, ParentIdQuery, ParentIdQueryBuilder,
};
pub use self::match_all::{
    MatchAllQuery, MatchAllQueryBuilder, MatchNoneQuery, MatchNoneQueryBuilder,
};
pub use self::multi_match::{
    CommonMinimumShouldMatch, CommonTermsQuery, CommonTermsQueryBuilder, MultiMatchQuery,
    MultiMatchQueryBuilder,
};
pub use self::phrase::{
    MatchPhrasePrefixQuery, MatchPhrasePrefixQueryBuilder, MatchPhraseQuery,
    MatchPhraseQueryBuilder, MatchQuery, MatchQueryBuilder,
};
pub use self::query_string::{
    QueryStringQuery, QueryStringQueryBuilder, SimpleQueryStringQuery,
    SimpleQueryStringQueryBuilder,
};
pub use self::range::{RangeQuery, RangeQueryBuilder};
pub use self::span::{
    FieldMaskingSpanQuery, SpanContainingQuery, SpanFirstQuery, SpanMultiTermQuery,
    SpanNearQuery, SpanNotQuery, SpanOrQuery, SpanQuery, SpanQueryBuilders, SpanTermQuery,
    SpanWithinQuery,
};
pub use self::specialized::{
    MoreLikeThisItem, MoreLikeThisQuery, MoreLikeThisQueryBuilder, PercolateQuery,
    PercolateQueryBuilder, ScriptQuery, ScriptQueryBuilder, WrapperQuery, WrapperQueryBuilder,
};
pub use self::term::{
    ExistsQuery, ExistsQueryBuilder, IdsQuery, IdsQueryBuilder, TermQuery, TermQueryBuilder,
    TermsQuery, TermsQueryBuilder, TypeQuery, TypeQueryBuilder,
};
pub use self::types::{
    Fuzziness, GeoPoint, MinimumShouldMatch, MultiMatchType, Operator, RangeRelation,
    RewriteMethod, ScoreMode, Script, SourceFilter, ZeroTermsQuery,
};
pub use self::wildcard::{
    PrefixQuery, PrefixQueryBuilder, RegexpQuery, RegexpQueryBuilder, WildcardQuery,
    WildcardQueryBuilder,
};

wire_enum! {
    /// Discriminator of every query kind, as written on the wire.
    pub enum QueryType("query") {
        MatchAll => "match_all",
        MatchNone => "match_none",
        Term => "term",
        Terms => "terms",
        Range => "range",
        Exists => "exists",
        Prefix => "prefix",
        Wildcard => "wildcard",
        Regexp => "regexp",
        Fuzzy => "fuzzy",
        Ids => "ids",
        Type => "type",
        Match => "match",
        MatchPhrase => "match_phrase",
        MatchPhrasePrefix => "match_phrase_prefix",
        MultiMatch => "multi_match",
        CommonTerms => "common",
        QueryString => "query_string",
        SimpleQueryString => "simple_query_string",
        Bool => "bool",
        ConstantScore => "constant_score",
        DisMax => "dis_max",
        Boosting => "boosting",
        FunctionScore => "function_score",
        GeoShape => "geo_shape",
        GeoBoundingBox => "geo_bounding_box",
        GeoDistance => "geo_distance",
        GeoPolygon => "geo_polygon",
        SpanTerm => "span_term",
        SpanMulti => "span_multi",
        SpanFirst => "span_first",
        SpanNear => "span_near",
        SpanOr => "span_or",
        SpanNot => "span_not",
        SpanContaining => "span_containing",
        SpanWithin => "span_within",
        FieldMaskingSpan => "field_masking_span",
        Nested => "nested",
        HasChild => "has_child",
        HasParent => "has_parent",
        ParentId => "parent_id",
        MoreLikeThis => "more_like_this",
        Script => "script",
        Percolate => "percolate",
        Wrapper => "wrapper",
    }
}

impl QueryType {
    /// Whether this kind belongs to the span family.
    pub fn is_span(&self) -> bool {
        matches!(
            self,
            QueryType::SpanTerm
                | QueryType::SpanMulti
                | QueryType::SpanFirst
                | QueryType::SpanNear
                | QueryType::SpanOr
                | QueryType::SpanNot
                | QueryType::SpanContaining
                | QueryType::SpanWithin
                | QueryType::FieldMaskingSpan
        )
    }
}

/// One concrete query kind: its discriminator plus the codec for the body
/// that sits under it.
pub trait QueryVariant: Sized {
    /// The discriminator, fixed per type.
    const QUERY_TYPE: QueryType;

    /// Encode the body placed under the discriminator key.
    fn encode_body(&self) -> Value;

    /// Decode the body found under the discriminator key.
    fn decode_body(body: &Value) -> Result<Self>;

    fn query_type(&self) -> QueryType {
        Self::QUERY_TYPE
    }
}

/// Wires a [`QueryVariant`] into the codec, serde and the [`Query`] sum type.
macro_rules! query_variant {
    ($($t:ident => $variant:ident),+ $(,)?) => {
        $(
            impl JsonCodec for $t {
                fn to_json(&self) -> Value {
                    crate::codec::named(
                        <$t as QueryVariant>::QUERY_TYPE.as_str(),
                        QueryVariant::encode_body(self),
                    )
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

            impl From<$t> for Query {
                fn from(query: $t) -> Self {
                    Query::$variant(query)
                }
            }
        )+
    };
}

query_variant! {
    MatchAllQuery => MatchAll,
    MatchNoneQuery => MatchNone,
    TermQuery => Term,
    TermsQuery => Terms,
    RangeQuery => Range,
    ExistsQuery => Exists,
    PrefixQuery => Prefix,
    WildcardQuery => Wildcard,
    RegexpQuery => Regexp,
    FuzzyQuery => Fuzzy,
    IdsQuery => Ids,
    TypeQuery => Type,
    MatchQuery => Match,
    MatchPhraseQuery => MatchPhrase,
    MatchPhrasePrefixQuery => MatchPhrasePrefix,
    MultiMatchQuery => MultiMatch,
    CommonTermsQuery => CommonTerms,
    QueryStringQuery => QueryString,
    SimpleQueryStringQuery => SimpleQueryString,
    BoolQuery => Bool,
    ConstantScoreQuery => ConstantScore,
    DisMaxQuery => DisMax,
    BoostingQuery => Boosting,
    FunctionScoreQuery => FunctionScore,
    GeoShapeQuery => GeoShape,
    GeoBoundingBoxQuery => GeoBoundingBox,
    GeoDistanceQuery => GeoDistance,
    GeoPolygonQuery => GeoPolygon,
    NestedQuery => Nested,
    HasChildQuery => HasChild,
    HasParentQuery => HasParent,
    ParentIdQuery => ParentId,
    MoreLikeThisQuery => MoreLikeThis,
    ScriptQuery => Script,
    PercolateQuery => Percolate,
    WrapperQuery => Wrapper,
}

/// Any query.
///
/// Equality compares the variant first and then every field, recursing into
/// nested queries, so two different kinds are never equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll(MatchAllQuery),
    MatchNone(MatchNoneQuery),
    Term(TermQuery),
    Terms(TermsQuery),
    Range(RangeQuery),
    Exists(ExistsQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Regexp(RegexpQuery),
    Fuzzy(FuzzyQuery),
    Ids(IdsQuery),
    Type(TypeQuery),
    Match(MatchQuery),
    MatchPhrase(MatchPhraseQuery),
    MatchPhrasePrefix(MatchPhrasePrefixQuery),
    MultiMatch(MultiMatchQuery),
    CommonTerms(CommonTermsQuery),
    QueryString(QueryStringQuery),
    SimpleQueryString(SimpleQueryStringQuery),
    Bool(BoolQuery),
    ConstantScore(ConstantScoreQuery),
    DisMax(DisMaxQuery),
    Boosting(BoostingQuery),
    FunctionScore(FunctionScoreQuery),
    GeoShape(GeoShapeQuery),
    GeoBoundingBox(GeoBoundingBoxQuery),
    GeoDistance(GeoDistanceQuery),
    GeoPolygon(GeoPolygonQuery),
    Span(SpanQuery),
    Nested(NestedQuery),
    HasChild(HasChildQuery),
    HasParent(HasParentQuery),
    ParentId(ParentIdQuery),
    MoreLikeThis(MoreLikeThisQuery),
    Script(ScriptQuery),
    Percolate(PercolateQuery),
    Wrapper(WrapperQuery),
}

macro_rules! each_query {
    ($value:expr, $q:ident => $body:expr) => {
        match $value {
            Query::MatchAll($q) => $body,
            Query::MatchNone($q) => $body,
            Query::Term($q) => $body,
            Query::Terms($q) => $body,
            Query::Range($q) => $body,
            Query::Exists($q) => $body,
            Query::Prefix($q) => $body,
            Query::Wildcard($q) => $body,
            Query::Regexp($q) => $body,
            Query::Fuzzy($q) => $body,
            Query::Ids($q) => $body,
            Query::Type($q) => $body,
            Query::Match($q) => $body,
            Query::MatchPhrase($q) => $body,
            Query::MatchPhrasePrefix($q) => $body,
            Query::MultiMatch($q) => $body,
            Query::CommonTerms($q) => $body,
            Query::QueryString($q) => $body,
            Query::SimpleQueryString($q) => $body,
            Query::Bool($q) => $body,
            Query::ConstantScore($q) => $body,
            Query::DisMax($q) => $body,
            Query::Boosting($q) => $body,
            Query::FunctionScore($q) => $body,
            Query::GeoShape($q) => $body,
            Query::GeoBoundingBox($q) => $body,
            Query::GeoDistance($q) => $body,
            Query::GeoPolygon($q) => $body,
            Query::Span($q) => $body,
            Query::Nested($q) => $body,
            Query::HasChild($q) => $body,
            Query::HasParent($q) => $body,
            Query::ParentId($q) => $body,
            Query::MoreLikeThis($q) => $body,
            Query::Script($q) => $body,
            Query::Percolate($q) => $body,
            Query::Wrapper($q) => $body,
        }
    };
}

impl Query {
    /// The discriminator of this query.
    pub fn query_type(&self) -> QueryType {
        each_query!(self, q => q.query_type())
    }

    /// Compare with another query: false unless both are the same kind with
    /// equal fields.
    pub fn is_equal_to(&self, other: &Query) -> bool {
        self == other
    }

    /// Decode a body that sits under an already-known discriminator.
    pub fn decode_tagged(query_type: QueryType, body: &Value) -> Result<Query> {
        let query = match query_type {
            QueryType::MatchAll => Query::MatchAll(MatchAllQuery::decode_body(body)?),
            QueryType::MatchNone => Query::MatchNone(MatchNoneQuery::decode_body(body)?),
            QueryType::Term => Query::Term(TermQuery::decode_body(body)?),
            QueryType::Terms => Query::Terms(TermsQuery::decode_body(body)?),
            QueryType::Range => Query::Range(RangeQuery::decode_body(body)?),
            QueryType::Exists => Query::Exists(ExistsQuery::decode_body(body)?),
            QueryType::Prefix => Query::Prefix(PrefixQuery::decode_body(body)?),
            QueryType::Wildcard => Query::Wildcard(WildcardQuery::decode_body(body)?),
            QueryType::Regexp => Query::Regexp(RegexpQuery::decode_body(body)?),
            QueryType::Fuzzy => Query::Fuzzy(FuzzyQuery::decode_body(body)?),
            QueryType::Ids => Query::Ids(IdsQuery::decode_body(body)?),
            QueryType::Type => Query::Type(TypeQuery::decode_body(body)?),
            QueryType::Match => Query::Match(MatchQuery::decode_body(body)?),
            QueryType::MatchPhrase => Query::MatchPhrase(MatchPhraseQuery::decode_body(body)?),
            QueryType::MatchPhrasePrefix => {
                Query::MatchPhrasePrefix(MatchPhrasePrefixQuery::decode_body(body)?)
            }
            QueryType::MultiMatch => Query::MultiMatch(MultiMatchQuery::decode_body(body)?),
            QueryType::CommonTerms => Query::CommonTerms(CommonTermsQuery::decode_body(body)?),
            QueryType::QueryString => Query::QueryString(QueryStringQuery::decode_body(body)?),
            QueryType::SimpleQueryString => {
                Query::SimpleQueryString(SimpleQueryStringQuery::decode_body(body)?)
            }
            QueryType::Bool => Query::Bool(BoolQuery::decode_body(body)?),
            QueryType::ConstantScore => {
                Query::ConstantScore(ConstantScoreQuery::decode_body(body)?)
            }
            QueryType::DisMax => Query::DisMax(DisMaxQuery::decode_body(body)?),
            QueryType::Boosting => Query::Boosting(BoostingQuery::decode_body(body)?),
            QueryType::FunctionScore => {
                Query::FunctionScore(FunctionScoreQuery::decode_body(body)?)
            }
            QueryType::GeoShape => Query::GeoShape(GeoShapeQuery::decode_body(body)?),
            QueryType::GeoBoundingBox => {
                Query::GeoBoundingBox(GeoBoundingBoxQuery::decode_body(body)?)
            }
            QueryType::GeoDistance => Query::GeoDistance(GeoDistanceQuery::decode_body(body)?),
            QueryType::GeoPolygon => Query::GeoPolygon(GeoPolygonQuery::decode_body(body)?),
            QueryType::SpanTerm
            | QueryType::SpanMulti
            | QueryType::SpanFirst
            | QueryType::SpanNear
            | QueryType::SpanOr
            | QueryType::SpanNot
            | QueryType::SpanContaining
            | QueryType::SpanWithin
            | QueryType::FieldMaskingSpan => {
                Query::Span(SpanQuery::decode_tagged(query_type, body)?)
            }
            QueryType::Nested => Query::Nested(NestedQuery::decode_body(body)?),
            QueryType::HasChild => Query::HasChild(HasChildQuery::decode_body(body)?),
            QueryType::HasParent => Query::HasParent(HasParentQuery::decode_body(body)?),
            QueryType::ParentId => Query::ParentId(ParentIdQuery::decode_body(body)?),
            QueryType::MoreLikeThis => Query::MoreLikeThis(MoreLikeThisQuery::decode_body(body)?),
            QueryType::Script => Query::Script(ScriptQuery::decode_body(body)?),
            QueryType::Percolate => Query::Percolate(PercolateQuery::decode_body(body)?),
            QueryType::Wrapper => Query::Wrapper(WrapperQuery::decode_body(body)?),
        };
        Ok(query)
    }
}

impl JsonCodec for Query {
    fn to_json(&self) -> Value {
        each_query!(self, q => q.to_json())
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("Query", value)?;
        let (tag, body) = reader.single_entry()?;
        let query_type: QueryType = tag.parse()?;
        debug!("decoding {query_type} query");
        Query::decode_tagged(query_type, body)
    }
}

crate::codec::serde_via_codec!(Query);

/// Decode one nested query, used by compound and joining kinds.
pub(crate) fn decode_query(value: &Value) -> Result<Query> {
    Query::from_json(value)
}

/// Entry points returning a fresh builder for each query kind.
pub struct QueryBuilders;

impl QueryBuilders {
    pub fn match_all_query() -> MatchAllQueryBuilder {
        MatchAllQueryBuilder::new()
    }

    pub fn match_none_query() -> MatchNoneQueryBuilder {
        MatchNoneQueryBuilder::new()
    }

    pub fn term_query() -> TermQueryBuilder {
        TermQueryBuilder::new()
    }

    pub fn terms_query() -> TermsQueryBuilder {
        TermsQueryBuilder::new()
    }

    pub fn range_query() -> RangeQueryBuilder {
        RangeQueryBuilder::new()
    }

    pub fn exists_query() -> ExistsQueryBuilder {
        ExistsQueryBuilder::new()
    }

    pub fn prefix_query() -> PrefixQueryBuilder {
        PrefixQueryBuilder::new()
    }

    pub fn wildcard_query() -> WildcardQueryBuilder {
        WildcardQueryBuilder::new()
    }

    pub fn regexp_query() -> RegexpQueryBuilder {
        RegexpQueryBuilder::new()
    }

    pub fn fuzzy_query() -> FuzzyQueryBuilder {
        FuzzyQueryBuilder::new()
    }

    pub fn ids_query() -> IdsQueryBuilder {
        IdsQueryBuilder::new()
    }

    pub fn type_query() -> TypeQueryBuilder {
        TypeQueryBuilder::new()
    }

    pub fn match_query() -> MatchQueryBuilder {
        MatchQueryBuilder::new()
    }

    pub fn match_phrase_query() -> MatchPhraseQueryBuilder {
        MatchPhraseQueryBuilder::new()
    }

    pub fn match_phrase_prefix_query() -> MatchPhrasePrefixQueryBuilder {
        MatchPhrasePrefixQueryBuilder::new()
    }

    pub fn multi_match_query() -> MultiMatchQueryBuilder {
        MultiMatchQueryBuilder::new()
    }

    pub fn common_terms_query() -> CommonTermsQueryBuilder {
        CommonTermsQueryBuilder::new()
    }

    pub fn query_string_query() -> QueryStringQueryBuilder {
        QueryStringQueryBuilder::new()
    }

    pub fn simple_query_string_query() -> SimpleQueryStringQueryBuilder {
        SimpleQueryStringQueryBuilder::new()
    }

    pub fn bool_query() -> BoolQueryBuilder {
        BoolQueryBuilder::new()
    }

    pub fn constant_score_query() -> ConstantScoreQueryBuilder {
        ConstantScoreQueryBuilder::new()
    }

    pub fn dis_max_query() -> DisMaxQueryBuilder {
        DisMaxQueryBuilder::new()
    }

    pub fn boosting_query() -> BoostingQueryBuilder {
        BoostingQueryBuilder::new()
    }

    pub fn function_score_query() -> FunctionScoreQueryBuilder {
        FunctionScoreQueryBuilder::new()
    }

    pub fn geo_shape_query() -> GeoShapeQueryBuilder {
        GeoShapeQueryBuilder::new()
    }

    pub fn geo_bounding_box_query() -> GeoBoundingBoxQueryBuilder {
        GeoBoundingBoxQueryBuilder::new()
    }

    pub fn geo_distance_query() -> GeoDistanceQueryBuilder {
        GeoDistanceQueryBuilder::new()
    }

    pub fn geo_polygon_query() -> GeoPolygonQueryBuilder {
        GeoPolygonQueryBuilder::new()
    }

    pub fn nested_query() -> NestedQueryBuilder {
        NestedQueryBuilder::new()
    }

    pub fn has_child_query() -> HasChildQueryBuilder {
        HasChildQueryBuilder::new()
    }

    pub fn has_parent_query() -> HasParentQueryBuilder {
        HasParentQueryBuilder::new()
    }

    pub fn parent_id_query() -> ParentIdQueryBuilder {
        ParentIdQueryBuilder::new()
    }

    pub fn more_like_this_query() -> MoreLikeThisQueryBuilder {
        MoreLikeThisQueryBuilder::new()
    }

    pub fn script_query() -> ScriptQueryBuilder {
        ScriptQueryBuilder::new()
    }

    pub fn percolate_query() -> PercolateQueryBuilder {
        PercolateQueryBuilder::new()
    }

    pub fn wrapper_query() -> WrapperQueryBuilder {
        WrapperQueryBuilder::new()
    }

    /// Span query builders live under their own entry point.
    pub fn span() -> SpanQueryBuilders {
        SpanQueryBuilders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::assert_key_count;
    use crate::error::QueryDslError;
    use serde_json::json;

    #[test]
    fn test_query_types_round_trip_through_strings() {
        for query_type in QueryType::ALL {
            let parsed: QueryType = query_type.as_str().parse().unwrap();
            assert_eq!(&parsed, query_type);
        }
        assert_eq!(QueryType::ALL.len(), 45);
        assert!(QueryType::SpanNear.is_span());
        assert!(!QueryType::Bool.is_span());
    }

    #[test]
    fn test_decode_picks_variant_from_key() {
        let query = Query::from_json(&json!({"term": {"user": "kimchy"}})).unwrap();
        assert_eq!(query.query_type(), QueryType::Term);
        assert_eq!(query, Query::Term(TermQuery::new("user", "kimchy")));

        let query = Query::from_json(&json!({"span_term": {"user": "kimchy"}})).unwrap();
        assert_eq!(query.query_type(), QueryType::SpanTerm);
    }

    #[test]
    fn test_decode_rejects_extra_top_level_keys() {
        let doc = json!({
            "term": {"user": "kimchy"},
            "match": {"message": "hello"}
        });
        assert_key_count(Query::from_json(&doc), 1, 2);
        assert_key_count(Query::from_json(&json!({})), 1, 0);
    }

    #[test]
    fn test_decode_unknown_query_type() {
        match Query::from_json(&json!({"matchy": {"message": "hello"}})) {
            Err(QueryDslError::UnrecognizedVariant { kind, name }) => {
                assert_eq!(kind, "query");
                assert_eq!(name, "matchy");
            }
            other => panic!("Expected unrecognized variant, got {other:?}"),
        }
    }

    #[test]
    fn test_different_kinds_are_never_equal() {
        let term: Query = TermQuery::new("user", "kimchy").into();
        let prefix: Query = PrefixQuery::new("user", "kimchy").into();
        assert!(!term.is_equal_to(&prefix));
        assert!(term.is_equal_to(&term.clone()));
    }

    #[test]
    fn test_serde_integration() {
        let query: Query = MatchQuery::new("message", "this is a test").into();
        let text = serde_json::to_string(&query).unwrap();
        assert_eq!(text, r#"{"match":{"message":"this is a test"}}"#);

        let decoded: Query = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, query);

        let err = serde_json::from_str::<Query>(r#"{"match":{"a":"x","b":"y"}}"#).unwrap_err();
        assert!(err.to_string().contains("expect: 1 key found: 2"));
    }
}
