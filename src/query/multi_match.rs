//! Full-text queries that go beyond a single analyzed field: `multi_match`
//! and `common` terms.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{FieldBody, JsonCodec, KeyedReader, KeyedWriter, decode_field_keyed, named};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::{Fuzziness, MinimumShouldMatch, MultiMatchType, Operator, ZeroTermsQuery};
use crate::query::{QueryType, QueryVariant};

/// Runs one text query over several fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMatchQuery {
    pub query: String,
    /// Target fields, optionally boosted as `"subject^3"`. Empty means the
    /// index default fields.
    pub fields: Vec<String>,
    pub match_type: Option<MultiMatchType>,
    pub tie_breaker: Option<BigDecimal>,
    pub operator: Option<Operator>,
    pub analyzer: Option<String>,
    pub fuzziness: Option<Fuzziness>,
    pub prefix_length: Option<u32>,
    pub max_expansions: Option<u32>,
    pub slop: Option<u32>,
    pub lenient: Option<bool>,
    pub minimum_should_match: Option<MinimumShouldMatch>,
    pub zero_terms_query: Option<ZeroTermsQuery>,
    pub cutoff_frequency: Option<BigDecimal>,
    pub auto_generate_synonyms_phrase_query: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl MultiMatchQuery {
    pub fn new<Q: Into<String>>(query: Q) -> Self {
        MultiMatchQuery {
            query: query.into(),
            fields: Vec::new(),
            match_type: None,
            tie_breaker: None,
            operator: None,
            analyzer: None,
            fuzziness: None,
            prefix_length: None,
            max_expansions: None,
            slop: None,
            lenient: None,
            minimum_should_match: None,
            zero_terms_query: None,
            cutoff_frequency: None,
            auto_generate_synonyms_phrase_query: None,
            boost: None,
        }
    }

    pub fn builder() -> MultiMatchQueryBuilder {
        MultiMatchQueryBuilder::new()
    }
}

impl QueryVariant for MultiMatchQuery {
    const QUERY_TYPE: QueryType = QueryType::MultiMatch;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("query", self.query.as_str())
            .put_opt("type", self.match_type)
            .put_strings("fields", &self.fields)
            .put_decimal_opt("tie_breaker", self.tie_breaker.as_ref())
            .put_opt("operator", self.operator)
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_codec_opt("fuzziness", self.fuzziness.as_ref())
            .put_opt("prefix_length", self.prefix_length)
            .put_opt("max_expansions", self.max_expansions)
            .put_opt("slop", self.slop)
            .put_opt("lenient", self.lenient)
            .put_codec_opt("minimum_should_match", self.minimum_should_match.as_ref())
            .put_opt("zero_terms_query", self.zero_terms_query)
            .put_decimal_opt("cutoff_frequency", self.cutoff_frequency.as_ref())
            .put_opt(
                "auto_generate_synonyms_phrase_query",
                self.auto_generate_synonyms_phrase_query,
            )
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("MultiMatchQuery", body)?;
        Ok(MultiMatchQuery {
            query: reader.scalar("query")?,
            fields: reader.strings_opt("fields")?.unwrap_or_default(),
            match_type: reader.parse_opt("type")?,
            tie_breaker: reader.decimal_opt("tie_breaker")?,
            operator: reader.parse_opt("operator")?,
            analyzer: reader.string_opt("analyzer")?,
            fuzziness: reader.decode_opt("fuzziness", Fuzziness::from_json)?,
            prefix_length: reader.u32_opt("prefix_length")?,
            max_expansions: reader.u32_opt("max_expansions")?,
            slop: reader.u32_opt("slop")?,
            lenient: reader.bool_opt("lenient")?,
            minimum_should_match: reader
                .decode_opt("minimum_should_match", MinimumShouldMatch::from_json)?,
            zero_terms_query: reader.parse_opt("zero_terms_query")?,
            cutoff_frequency: reader.decimal_opt("cutoff_frequency")?,
            auto_generate_synonyms_phrase_query: reader
                .bool_opt("auto_generate_synonyms_phrase_query")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`MultiMatchQuery`]. Requires `query`.
#[derive(Debug, Default)]
pub struct MultiMatchQueryBuilder {
    query: Option<String>,
    fields: Vec<String>,
    match_type: Option<MultiMatchType>,
    tie_breaker: Option<BigDecimal>,
    operator: Option<Operator>,
    analyzer: Option<String>,
    fuzziness: Option<Fuzziness>,
    prefix_length: Option<u32>,
    max_expansions: Option<u32>,
    slop: Option<u32>,
    lenient: Option<bool>,
    minimum_should_match: Option<MinimumShouldMatch>,
    zero_terms_query: Option<ZeroTermsQuery>,
    cutoff_frequency: Option<BigDecimal>,
    auto_generate_synonyms_phrase_query: Option<bool>,
    boost: Option<BigDecimal>,
}

impl MultiMatchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Set the query text.
        query: String,
        /// Set the execution strategy (`type` on the wire).
        match_type: MultiMatchType,
        operator: Operator,
        analyzer: String,
        fuzziness: Fuzziness,
        prefix_length: u32,
        max_expansions: u32,
        slop: u32,
        lenient: bool,
        minimum_should_match: MinimumShouldMatch,
        zero_terms_query: ZeroTermsQuery,
        auto_generate_synonyms_phrase_query: bool,
    }

    /// Replace the target fields.
    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Append one target field.
    pub fn add_field<F: Into<String>>(mut self, field: F) -> Self {
        self.fields.push(field.into());
        self
    }

    decimal_setters! {
        /// Set the weight of non-best matching fields.
        tie_breaker,
        cutoff_frequency,
        boost,
    }
}

impl Builder for MultiMatchQueryBuilder {
    type Output = MultiMatchQuery;

    fn build(self) -> Result<MultiMatchQuery> {
        let query = required!(self.query);
        Ok(MultiMatchQuery {
            query,
            fields: self.fields,
            match_type: self.match_type,
            tie_breaker: self.tie_breaker,
            operator: self.operator,
            analyzer: self.analyzer,
            fuzziness: self.fuzziness,
            prefix_length: self.prefix_length,
            max_expansions: self.max_expansions,
            slop: self.slop,
            lenient: self.lenient,
            minimum_should_match: self.minimum_should_match,
            zero_terms_query: self.zero_terms_query,
            cutoff_frequency: self.cutoff_frequency,
            auto_generate_synonyms_phrase_query: self.auto_generate_synonyms_phrase_query,
            boost: self.boost,
        })
    }
}

/// `minimum_should_match` of a `common` query: one value, or separate values
/// for the low and high frequency groups.
#[derive(Debug, Clone, PartialEq)]
pub enum CommonMinimumShouldMatch {
    Single(MinimumShouldMatch),
    Split {
        low_freq: Option<MinimumShouldMatch>,
        high_freq: Option<MinimumShouldMatch>,
    },
}

impl JsonCodec for CommonMinimumShouldMatch {
    fn to_json(&self) -> Value {
        match self {
            CommonMinimumShouldMatch::Single(value) => value.to_json(),
            CommonMinimumShouldMatch::Split { low_freq, high_freq } => {
                let mut writer = KeyedWriter::new();
                writer
                    .put_codec_opt("low_freq", low_freq.as_ref())
                    .put_codec_opt("high_freq", high_freq.as_ref());
                writer.finish()
            }
        }
    }

    fn from_json(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return MinimumShouldMatch::from_json(value).map(CommonMinimumShouldMatch::Single);
        }
        let reader = KeyedReader::new("CommonMinimumShouldMatch", value)?;
        reader.reject_unknown(&["low_freq", "high_freq"])?;
        Ok(CommonMinimumShouldMatch::Split {
            low_freq: reader.decode_opt("low_freq", MinimumShouldMatch::from_json)?,
            high_freq: reader.decode_opt("high_freq", MinimumShouldMatch::from_json)?,
        })
    }
}

macro_rules! single_minimum_should_match {
    ($($t:ty),+) => {
        $(
            impl From<$t> for CommonMinimumShouldMatch {
                fn from(value: $t) -> Self {
                    CommonMinimumShouldMatch::Single(value.into())
                }
            }
        )+
    };
}

single_minimum_should_match!(MinimumShouldMatch, i64, i32, &str, String);

/// Splits query terms into high and low frequency groups, scoring the
/// frequent ones only when the rare ones match.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTermsQuery {
    pub field: String,
    pub query: String,
    pub cutoff_frequency: Option<BigDecimal>,
    pub low_freq_operator: Option<Operator>,
    pub high_freq_operator: Option<Operator>,
    pub minimum_should_match: Option<CommonMinimumShouldMatch>,
    pub analyzer: Option<String>,
    pub boost: Option<BigDecimal>,
}

impl CommonTermsQuery {
    pub fn new<F: Into<String>, Q: Into<String>>(field: F, query: Q) -> Self {
        CommonTermsQuery {
            field: field.into(),
            query: query.into(),
            cutoff_frequency: None,
            low_freq_operator: None,
            high_freq_operator: None,
            minimum_should_match: None,
            analyzer: None,
            boost: None,
        }
    }

    pub fn builder() -> CommonTermsQueryBuilder {
        CommonTermsQueryBuilder::new()
    }
}

impl QueryVariant for CommonTermsQuery {
    const QUERY_TYPE: QueryType = QueryType::CommonTerms;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("query", self.query.as_str())
            .put_decimal_opt("cutoff_frequency", self.cutoff_frequency.as_ref())
            .put_opt("low_freq_operator", self.low_freq_operator)
            .put_opt("high_freq_operator", self.high_freq_operator)
            .put_codec_opt("minimum_should_match", self.minimum_should_match.as_ref())
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_decimal_opt("boost", self.boost.as_ref());
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("CommonTermsQuery", body)?;
        let reader = match body {
            FieldBody::Short(value) => {
                let query = FieldBody::short_text(value, "CommonTermsQuery")?;
                return Ok(CommonTermsQuery::new(field, query));
            }
            FieldBody::Expanded(reader) => reader,
        };
        Ok(CommonTermsQuery {
            field,
            query: reader.scalar("query")?,
            cutoff_frequency: reader.decimal_opt("cutoff_frequency")?,
            low_freq_operator: reader.parse_opt("low_freq_operator")?,
            high_freq_operator: reader.parse_opt("high_freq_operator")?,
            minimum_should_match: reader
                .decode_opt("minimum_should_match", CommonMinimumShouldMatch::from_json)?,
            analyzer: reader.string_opt("analyzer")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`CommonTermsQuery`]. Requires `field`, then `query`.
#[derive(Debug, Default)]
pub struct CommonTermsQueryBuilder {
    field: Option<String>,
    query: Option<String>,
    cutoff_frequency: Option<BigDecimal>,
    low_freq_operator: Option<Operator>,
    high_freq_operator: Option<Operator>,
    minimum_should_match: Option<CommonMinimumShouldMatch>,
    analyzer: Option<String>,
    boost: Option<BigDecimal>,
}

impl CommonTermsQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        query: String,
        low_freq_operator: Operator,
        high_freq_operator: Operator,
        minimum_should_match: CommonMinimumShouldMatch,
        analyzer: String,
    }

    decimal_setters! {
        /// Set the document frequency above which a term counts as common.
        cutoff_frequency,
        boost,
    }
}

impl Builder for CommonTermsQueryBuilder {
    type Output = CommonTermsQuery;

    fn build(self) -> Result<CommonTermsQuery> {
        let field = required!(self.field);
        let query = required!(self.query);
        Ok(CommonTermsQuery {
            field,
            query,
            cutoff_frequency: self.cutoff_frequency,
            low_freq_operator: self.low_freq_operator,
            high_freq_operator: self.high_freq_operator,
            minimum_should_match: self.minimum_should_match,
            analyzer: self.analyzer,
            boost: self.boost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IntoDecimal;
    use crate::error::QueryDslError;
    use serde_json::json;

    #[test]
    fn test_multi_match_query_encode() {
        let query = MultiMatchQuery::builder()
            .query("brown fox")
            .fields(["subject", "message"])
            .tie_breaker(0.3)
            .match_type(MultiMatchType::BestFields)
            .build()
            .unwrap();

        let expected = json!({
            "multi_match": {
                "query": "brown fox",
                "type": "best_fields",
                "fields": ["subject", "message"],
                "tie_breaker": 0.3
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"multi_match":{"query":"brown fox","type":"best_fields","fields":["subject","message"],"tie_breaker":0.3}}"#
        );
        assert_eq!(MultiMatchQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_multi_match_query_decode() {
        let decoded = MultiMatchQuery::from_json(&json!({
            "multi_match": {
                "query": "this is a test",
                "type": "best_fields",
                "fields": ["subject", "message"],
                "tie_breaker": 0.3
            }
        }))
        .unwrap();

        assert_eq!(decoded.query, "this is a test");
        assert_eq!(decoded.fields, vec!["subject", "message"]);
        assert_eq!(decoded.tie_breaker, Some(0.3f64.into_decimal()));
        assert_eq!(decoded.match_type, Some(MultiMatchType::BestFields));
    }

    #[test]
    fn test_multi_match_add_field() {
        let query = MultiMatchQuery::builder()
            .query("quick")
            .add_field("title^3")
            .add_field("body")
            .build()
            .unwrap();
        assert_eq!(query.fields, vec!["title^3", "body"]);

        let bare = MultiMatchQuery::new("quick");
        assert_eq!(bare.to_json(), json!({"multi_match": {"query": "quick"}}));
    }

    #[test]
    fn test_multi_match_requires_query() {
        let err = MultiMatchQuery::builder().add_field("body").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "query"));
    }

    #[test]
    fn test_common_terms_query() {
        let doc = json!({
            "common": {
                "body": {
                    "query": "nelly the elephant not as a cartoon",
                    "cutoff_frequency": 0.001,
                    "low_freq_operator": "and",
                    "minimum_should_match": {"low_freq": 2, "high_freq": 3}
                }
            }
        });

        let query = CommonTermsQuery::from_json(&doc).unwrap();
        assert_eq!(query.low_freq_operator, Some(Operator::And));
        assert_eq!(
            query.minimum_should_match,
            Some(CommonMinimumShouldMatch::Split {
                low_freq: Some(MinimumShouldMatch::Count(2)),
                high_freq: Some(MinimumShouldMatch::Count(3)),
            })
        );
        assert_eq!(query.to_json(), doc);
    }

    #[test]
    fn test_common_terms_builder() {
        let query = CommonTermsQuery::builder()
            .field("body")
            .query("this is bonsai cool")
            .cutoff_frequency(0.001)
            .minimum_should_match("75%")
            .build()
            .unwrap();

        let encoded = query.to_json();
        assert_eq!(encoded["common"]["body"]["minimum_should_match"], json!("75%"));
        assert_eq!(CommonTermsQuery::from_json(&encoded).unwrap(), query);

        let err = CommonTermsQuery::builder().field("body").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "query"));
    }
}
