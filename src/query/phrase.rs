//! Match-family full-text queries: `match`, `match_phrase` and
//! `match_phrase_prefix`.
//!
//! All three are keyed by the document field. When nothing but the field and
//! the query text is set they encode to the abbreviated form
//! `{ "match": { "<field>": "<text>" } }`; decoding accepts both forms.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{FieldBody, JsonCodec, KeyedWriter, decode_field_keyed, named};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::{Fuzziness, MinimumShouldMatch, Operator, ZeroTermsQuery};
use crate::query::{QueryType, QueryVariant};

/// A standard full-text query on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub field: String,
    /// The text to analyze and match (`query` on the wire).
    pub value: String,
    pub operator: Option<Operator>,
    pub zero_terms_query: Option<ZeroTermsQuery>,
    pub cutoff_frequency: Option<BigDecimal>,
    pub fuzziness: Option<Fuzziness>,
    pub prefix_length: Option<u32>,
    pub max_expansions: Option<u32>,
    pub fuzzy_transpositions: Option<bool>,
    pub lenient: Option<bool>,
    pub analyzer: Option<String>,
    pub minimum_should_match: Option<MinimumShouldMatch>,
    pub auto_generate_synonyms_phrase_query: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl MatchQuery {
    /// Create a match query with only the required fields.
    pub fn new<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        MatchQuery {
            field: field.into(),
            value: value.into(),
            operator: None,
            zero_terms_query: None,
            cutoff_frequency: None,
            fuzziness: None,
            prefix_length: None,
            max_expansions: None,
            fuzzy_transpositions: None,
            lenient: None,
            analyzer: None,
            minimum_should_match: None,
            auto_generate_synonyms_phrase_query: None,
            boost: None,
        }
    }

    pub fn builder() -> MatchQueryBuilder {
        MatchQueryBuilder::new()
    }

    /// True when only `field` and `value` are set.
    pub fn is_short_form(&self) -> bool {
        *self == MatchQuery::new(self.field.as_str(), self.value.as_str())
    }
}

impl QueryVariant for MatchQuery {
    const QUERY_TYPE: QueryType = QueryType::Match;

    fn encode_body(&self) -> Value {
        if self.is_short_form() {
            return named(&self.field, Value::from(self.value.as_str()));
        }
        let mut writer = KeyedWriter::new();
        writer
            .put("query", self.value.as_str())
            .put_opt("operator", self.operator)
            .put_opt("zero_terms_query", self.zero_terms_query)
            .put_decimal_opt("cutoff_frequency", self.cutoff_frequency.as_ref())
            .put_codec_opt("fuzziness", self.fuzziness.as_ref())
            .put_opt("prefix_length", self.prefix_length)
            .put_opt("max_expansions", self.max_expansions)
            .put_opt("fuzzy_transpositions", self.fuzzy_transpositions)
            .put_opt("lenient", self.lenient)
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_codec_opt("minimum_should_match", self.minimum_should_match.as_ref())
            .put_opt(
                "auto_generate_synonyms_phrase_query",
                self.auto_generate_synonyms_phrase_query,
            )
            .put_decimal_opt("boost", self.boost.as_ref());
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("MatchQuery", body)?;
        match body {
            FieldBody::Short(value) => Ok(MatchQuery::new(
                field,
                FieldBody::short_text(value, "MatchQuery")?,
            )),
            FieldBody::Expanded(reader) => Ok(MatchQuery {
                field,
                value: reader.scalar("query")?,
                operator: reader.parse_opt("operator")?,
                zero_terms_query: reader.parse_opt("zero_terms_query")?,
                cutoff_frequency: reader.decimal_opt("cutoff_frequency")?,
                fuzziness: reader.decode_opt("fuzziness", Fuzziness::from_json)?,
                prefix_length: reader.u32_opt("prefix_length")?,
                max_expansions: reader.u32_opt("max_expansions")?,
                fuzzy_transpositions: reader.bool_opt("fuzzy_transpositions")?,
                lenient: reader.bool_opt("lenient")?,
                analyzer: reader.string_opt("analyzer")?,
                minimum_should_match: reader
                    .decode_opt("minimum_should_match", MinimumShouldMatch::from_json)?,
                auto_generate_synonyms_phrase_query: reader
                    .bool_opt("auto_generate_synonyms_phrase_query")?,
                boost: reader.decimal_opt("boost")?,
            }),
        }
    }
}

/// Builder for [`MatchQuery`]. Requires `field`, then `value`.
#[derive(Debug, Default)]
pub struct MatchQueryBuilder {
    field: Option<String>,
    value: Option<String>,
    operator: Option<Operator>,
    zero_terms_query: Option<ZeroTermsQuery>,
    cutoff_frequency: Option<BigDecimal>,
    fuzziness: Option<Fuzziness>,
    prefix_length: Option<u32>,
    max_expansions: Option<u32>,
    fuzzy_transpositions: Option<bool>,
    lenient: Option<bool>,
    analyzer: Option<String>,
    minimum_should_match: Option<MinimumShouldMatch>,
    auto_generate_synonyms_phrase_query: Option<bool>,
    boost: Option<BigDecimal>,
}

impl MatchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Set the field to search.
        field: String,
        /// Set the query text.
        value: String,
        operator: Operator,
        zero_terms_query: ZeroTermsQuery,
        fuzziness: Fuzziness,
        prefix_length: u32,
        max_expansions: u32,
        fuzzy_transpositions: bool,
        lenient: bool,
        analyzer: String,
        minimum_should_match: MinimumShouldMatch,
        auto_generate_synonyms_phrase_query: bool,
    }

    decimal_setters! {
        cutoff_frequency,
        boost,
    }
}

impl Builder for MatchQueryBuilder {
    type Output = MatchQuery;

    fn build(self) -> Result<MatchQuery> {
        let field = required!(self.field);
        let value = required!(self.value);
        Ok(MatchQuery {
            field,
            value,
            operator: self.operator,
            zero_terms_query: self.zero_terms_query,
            cutoff_frequency: self.cutoff_frequency,
            fuzziness: self.fuzziness,
            prefix_length: self.prefix_length,
            max_expansions: self.max_expansions,
            fuzzy_transpositions: self.fuzzy_transpositions,
            lenient: self.lenient,
            analyzer: self.analyzer,
            minimum_should_match: self.minimum_should_match,
            auto_generate_synonyms_phrase_query: self.auto_generate_synonyms_phrase_query,
            boost: self.boost,
        })
    }
}

/// Matches the analyzed text as a phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhraseQuery {
    pub field: String,
    pub value: String,
    pub analyzer: Option<String>,
    pub slop: Option<u32>,
    pub zero_terms_query: Option<ZeroTermsQuery>,
    pub boost: Option<BigDecimal>,
}

impl MatchPhraseQuery {
    pub fn new<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        MatchPhraseQuery {
            field: field.into(),
            value: value.into(),
            analyzer: None,
            slop: None,
            zero_terms_query: None,
            boost: None,
        }
    }

    pub fn builder() -> MatchPhraseQueryBuilder {
        MatchPhraseQueryBuilder::new()
    }

    pub fn is_short_form(&self) -> bool {
        *self == MatchPhraseQuery::new(self.field.as_str(), self.value.as_str())
    }
}

impl QueryVariant for MatchPhraseQuery {
    const QUERY_TYPE: QueryType = QueryType::MatchPhrase;

    fn encode_body(&self) -> Value {
        if self.is_short_form() {
            return named(&self.field, Value::from(self.value.as_str()));
        }
        let mut writer = KeyedWriter::new();
        writer
            .put("query", self.value.as_str())
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_opt("slop", self.slop)
            .put_opt("zero_terms_query", self.zero_terms_query)
            .put_decimal_opt("boost", self.boost.as_ref());
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("MatchPhraseQuery", body)?;
        match body {
            FieldBody::Short(value) => Ok(MatchPhraseQuery::new(
                field,
                FieldBody::short_text(value, "MatchPhraseQuery")?,
            )),
            FieldBody::Expanded(reader) => Ok(MatchPhraseQuery {
                field,
                value: reader.scalar("query")?,
                analyzer: reader.string_opt("analyzer")?,
                slop: reader.u32_opt("slop")?,
                zero_terms_query: reader.parse_opt("zero_terms_query")?,
                boost: reader.decimal_opt("boost")?,
            }),
        }
    }
}

/// Builder for [`MatchPhraseQuery`]. Requires `field`, then `value`.
#[derive(Debug, Default)]
pub struct MatchPhraseQueryBuilder {
    field: Option<String>,
    value: Option<String>,
    analyzer: Option<String>,
    slop: Option<u32>,
    zero_terms_query: Option<ZeroTermsQuery>,
    boost: Option<BigDecimal>,
}

impl MatchPhraseQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        value: String,
        analyzer: String,
        /// Set how far apart the phrase terms may be.
        slop: u32,
        zero_terms_query: ZeroTermsQuery,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for MatchPhraseQueryBuilder {
    type Output = MatchPhraseQuery;

    fn build(self) -> Result<MatchPhraseQuery> {
        let field = required!(self.field);
        let value = required!(self.value);
        Ok(MatchPhraseQuery {
            field,
            value,
            analyzer: self.analyzer,
            slop: self.slop,
            zero_terms_query: self.zero_terms_query,
            boost: self.boost,
        })
    }
}

/// Like [`MatchPhraseQuery`], but the last term is matched as a prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhrasePrefixQuery {
    pub field: String,
    pub value: String,
    pub analyzer: Option<String>,
    pub slop: Option<u32>,
    pub max_expansions: Option<u32>,
    pub boost: Option<BigDecimal>,
}

impl MatchPhrasePrefixQuery {
    pub fn new<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        MatchPhrasePrefixQuery {
            field: field.into(),
            value: value.into(),
            analyzer: None,
            slop: None,
            max_expansions: None,
            boost: None,
        }
    }

    pub fn builder() -> MatchPhrasePrefixQueryBuilder {
        MatchPhrasePrefixQueryBuilder::new()
    }

    pub fn is_short_form(&self) -> bool {
        *self == MatchPhrasePrefixQuery::new(self.field.as_str(), self.value.as_str())
    }
}

impl QueryVariant for MatchPhrasePrefixQuery {
    const QUERY_TYPE: QueryType = QueryType::MatchPhrasePrefix;

    fn encode_body(&self) -> Value {
        if self.is_short_form() {
            return named(&self.field, Value::from(self.value.as_str()));
        }
        let mut writer = KeyedWriter::new();
        writer
            .put("query", self.value.as_str())
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_opt("slop", self.slop)
            .put_opt("max_expansions", self.max_expansions)
            .put_decimal_opt("boost", self.boost.as_ref());
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("MatchPhrasePrefixQuery", body)?;
        match body {
            FieldBody::Short(value) => Ok(MatchPhrasePrefixQuery::new(
                field,
                FieldBody::short_text(value, "MatchPhrasePrefixQuery")?,
            )),
            FieldBody::Expanded(reader) => Ok(MatchPhrasePrefixQuery {
                field,
                value: reader.scalar("query")?,
                analyzer: reader.string_opt("analyzer")?,
                slop: reader.u32_opt("slop")?,
                max_expansions: reader.u32_opt("max_expansions")?,
                boost: reader.decimal_opt("boost")?,
            }),
        }
    }
}

/// Builder for [`MatchPhrasePrefixQuery`]. Requires `field`, then `value`.
#[derive(Debug, Default)]
pub struct MatchPhrasePrefixQueryBuilder {
    field: Option<String>,
    value: Option<String>,
    analyzer: Option<String>,
    slop: Option<u32>,
    max_expansions: Option<u32>,
    boost: Option<BigDecimal>,
}

impl MatchPhrasePrefixQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        value: String,
        analyzer: String,
        slop: u32,
        /// Set how many terms the final prefix may expand to.
        max_expansions: u32,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for MatchPhrasePrefixQueryBuilder {
    type Output = MatchPhrasePrefixQuery;

    fn build(self) -> Result<MatchPhrasePrefixQuery> {
        let field = required!(self.field);
        let value = required!(self.value);
        Ok(MatchPhrasePrefixQuery {
            field,
            value,
            analyzer: self.analyzer,
            slop: self.slop,
            max_expansions: self.max_expansions,
            boost: self.boost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::assert_key_count;
    use crate::error::QueryDslError;
    use serde_json::json;

    #[test]
    fn test_match_query_encode() {
        let query = MatchQuery {
            auto_generate_synonyms_phrase_query: Some(false),
            ..MatchQuery::new("message", "ny city")
        };

        assert_eq!(
            query.to_json(),
            json!({
                "match": {
                    "message": {
                        "query": "ny city",
                        "auto_generate_synonyms_phrase_query": false
                    }
                }
            })
        );
    }

    #[test]
    fn test_match_query_decode() {
        let query = MatchQuery::builder()
            .field("message")
            .value("to be or not to be")
            .operator(Operator::And)
            .zero_terms_query(ZeroTermsQuery::All)
            .build()
            .unwrap();

        let decoded = MatchQuery::from_json(&json!({
            "match": {
                "message": {
                    "query": "to be or not to be",
                    "operator": "and",
                    "zero_terms_query": "all"
                }
            }
        }))
        .unwrap();

        assert_eq!(query, decoded);
    }

    #[test]
    fn test_match_query_short_form() {
        let query = MatchQuery::builder()
            .field("message")
            .value("this is a test")
            .build()
            .unwrap();

        let short = json!({"match": {"message": "this is a test"}});
        let expanded = json!({"match": {"message": {"query": "this is a test"}}});

        assert_eq!(query.to_json(), short);
        assert_eq!(MatchQuery::from_json(&short).unwrap(), query);
        assert_eq!(MatchQuery::from_json(&expanded).unwrap(), query);
    }

    #[test]
    fn test_match_query_decode_fail() {
        let doc = json!({
            "match": {
                "message": "this is a test",
                "invalid_key": "random"
            }
        });

        let result = MatchQuery::from_json(&doc);
        match &result {
            Err(QueryDslError::KeyCountMismatch { type_name, .. }) => {
                assert_eq!(type_name, "MatchQuery")
            }
            other => panic!("Expected key count mismatch, got {other:?}"),
        }
        assert_key_count(result, 1, 2);
    }

    #[test]
    fn test_match_query_builder_missing_fields() {
        let err = MatchQuery::builder().value("text").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "field"));

        let err = MatchQuery::builder().field("message").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "value"));

        // field is checked first
        let err = MatchQuery::builder().build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "field"));
    }

    #[test]
    fn test_match_query_full_round_trip() {
        let query = MatchQuery::builder()
            .field("message")
            .value("quikc brwn")
            .fuzziness(Fuzziness::Auto)
            .prefix_length(1u32)
            .max_expansions(20u32)
            .cutoff_frequency(0.001)
            .minimum_should_match("75%")
            .analyzer("standard")
            .boost(1.5)
            .build()
            .unwrap();

        let encoded = query.to_json();
        assert_eq!(encoded["match"]["message"]["fuzziness"], json!("AUTO"));
        assert_eq!(encoded["match"]["message"]["cutoff_frequency"], json!(0.001));
        assert_eq!(MatchQuery::from_json(&encoded).unwrap(), query);
    }

    #[test]
    fn test_match_phrase_query_encode() {
        let query = MatchPhraseQuery {
            analyzer: Some("my_analyzer".into()),
            ..MatchPhraseQuery::new("message", "this is a test")
        };

        assert_eq!(
            query.to_json(),
            json!({
                "match_phrase": {
                    "message": {
                        "query": "this is a test",
                        "analyzer": "my_analyzer"
                    }
                }
            })
        );
    }

    #[test]
    fn test_match_phrase_query_decode() {
        let query = MatchPhraseQuery::builder()
            .field("message")
            .value("this is a test")
            .analyzer("my_analyzer")
            .build()
            .unwrap();

        let decoded = MatchPhraseQuery::from_json(&json!({
            "match_phrase": {
                "message": {
                    "query": "this is a test",
                    "analyzer": "my_analyzer"
                }
            }
        }))
        .unwrap();

        assert_eq!(query, decoded);

        let short = MatchPhraseQuery::from_json(&json!({
            "match_phrase": {"message": "this is a test"}
        }))
        .unwrap();
        assert_eq!(short, MatchPhraseQuery::new("message", "this is a test"));
    }

    #[test]
    fn test_match_phrase_query_decode_fail() {
        let doc = json!({
            "match_phrase": {
                "message": "this is a test",
                "invalid_key": "random"
            }
        });
        assert_key_count(MatchPhraseQuery::from_json(&doc), 1, 2);
    }

    #[test]
    fn test_match_phrase_query_builder_missing_value() {
        let err = MatchPhraseQuery::builder().field("message").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "value"));
    }

    #[test]
    fn test_match_phrase_prefix_query_encode() {
        let query = MatchPhrasePrefixQuery {
            max_expansions: Some(10),
            ..MatchPhrasePrefixQuery::new("message", "quick brown f")
        };

        assert_eq!(
            query.to_json(),
            json!({
                "match_phrase_prefix": {
                    "message": {
                        "query": "quick brown f",
                        "max_expansions": 10
                    }
                }
            })
        );
    }

    #[test]
    fn test_match_phrase_prefix_query_decode() {
        let query = MatchPhrasePrefixQuery::builder()
            .field("message")
            .value("quick brown f")
            .max_expansions(10u32)
            .build()
            .unwrap();

        let decoded = MatchPhrasePrefixQuery::from_json(&json!({
            "match_phrase_prefix": {
                "message": {
                    "query": "quick brown f",
                    "max_expansions": 10
                }
            }
        }))
        .unwrap();
        assert_eq!(query, decoded);

        let short = MatchPhrasePrefixQuery::from_json(&json!({
            "match_phrase_prefix": {"message": "quick brown f"}
        }))
        .unwrap();
        assert!(short.is_short_form());
        assert_eq!(short.to_json(), json!({"match_phrase_prefix": {"message": "quick brown f"}}));
    }

    #[test]
    fn test_match_phrase_prefix_query_decode_fail() {
        let doc = json!({
            "match_phrase_prefix": {
                "message": "quick brown f",
                "invalid_key": "random"
            }
        });
        assert_key_count(MatchPhrasePrefixQuery::from_json(&doc), 1, 2);
    }
}
