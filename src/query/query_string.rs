//! Queries parsed server-side from a Lucene-style query string.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::{Fuzziness, MinimumShouldMatch, MultiMatchType, Operator};
use crate::query::{QueryType, QueryVariant};

/// Full query-string syntax (`status:active AND (title:rust OR body:rust)`).
/// Syntax errors are reported by the server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryStringQuery {
    pub query: String,
    pub default_field: Option<String>,
    pub fields: Vec<String>,
    pub match_type: Option<MultiMatchType>,
    pub default_operator: Option<Operator>,
    pub analyzer: Option<String>,
    pub quote_analyzer: Option<String>,
    pub quote_field_suffix: Option<String>,
    pub allow_leading_wildcard: Option<bool>,
    pub analyze_wildcard: Option<bool>,
    pub fuzziness: Option<Fuzziness>,
    pub fuzzy_max_expansions: Option<u32>,
    pub fuzzy_prefix_length: Option<u32>,
    pub phrase_slop: Option<u32>,
    pub tie_breaker: Option<BigDecimal>,
    pub minimum_should_match: Option<MinimumShouldMatch>,
    pub lenient: Option<bool>,
    pub time_zone: Option<String>,
    pub boost: Option<BigDecimal>,
}

impl QueryStringQuery {
    pub fn new<Q: Into<String>>(query: Q) -> Self {
        QueryStringQuery {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn builder() -> QueryStringQueryBuilder {
        QueryStringQueryBuilder::new()
    }
}

impl QueryVariant for QueryStringQuery {
    const QUERY_TYPE: QueryType = QueryType::QueryString;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("query", self.query.as_str())
            .put_opt("default_field", self.default_field.as_deref())
            .put_strings("fields", &self.fields)
            .put_opt("type", self.match_type)
            .put_opt("default_operator", self.default_operator)
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_opt("quote_analyzer", self.quote_analyzer.as_deref())
            .put_opt("quote_field_suffix", self.quote_field_suffix.as_deref())
            .put_opt("allow_leading_wildcard", self.allow_leading_wildcard)
            .put_opt("analyze_wildcard", self.analyze_wildcard)
            .put_codec_opt("fuzziness", self.fuzziness.as_ref())
            .put_opt("fuzzy_max_expansions", self.fuzzy_max_expansions)
            .put_opt("fuzzy_prefix_length", self.fuzzy_prefix_length)
            .put_opt("phrase_slop", self.phrase_slop)
            .put_decimal_opt("tie_breaker", self.tie_breaker.as_ref())
            .put_codec_opt("minimum_should_match", self.minimum_should_match.as_ref())
            .put_opt("lenient", self.lenient)
            .put_opt("time_zone", self.time_zone.as_deref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("QueryStringQuery", body)?;
        Ok(QueryStringQuery {
            query: reader.string("query")?,
            default_field: reader.string_opt("default_field")?,
            fields: reader.strings_opt("fields")?.unwrap_or_default(),
            match_type: reader.parse_opt("type")?,
            default_operator: reader.parse_opt("default_operator")?,
            analyzer: reader.string_opt("analyzer")?,
            quote_analyzer: reader.string_opt("quote_analyzer")?,
            quote_field_suffix: reader.string_opt("quote_field_suffix")?,
            allow_leading_wildcard: reader.bool_opt("allow_leading_wildcard")?,
            analyze_wildcard: reader.bool_opt("analyze_wildcard")?,
            fuzziness: reader.decode_opt("fuzziness", Fuzziness::from_json)?,
            fuzzy_max_expansions: reader.u32_opt("fuzzy_max_expansions")?,
            fuzzy_prefix_length: reader.u32_opt("fuzzy_prefix_length")?,
            phrase_slop: reader.u32_opt("phrase_slop")?,
            tie_breaker: reader.decimal_opt("tie_breaker")?,
            minimum_should_match: reader
                .decode_opt("minimum_should_match", MinimumShouldMatch::from_json)?,
            lenient: reader.bool_opt("lenient")?,
            time_zone: reader.string_opt("time_zone")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`QueryStringQuery`]. Requires `query`.
#[derive(Debug, Default)]
pub struct QueryStringQueryBuilder {
    query: Option<String>,
    default_field: Option<String>,
    fields: Vec<String>,
    match_type: Option<MultiMatchType>,
    default_operator: Option<Operator>,
    analyzer: Option<String>,
    quote_analyzer: Option<String>,
    quote_field_suffix: Option<String>,
    allow_leading_wildcard: Option<bool>,
    analyze_wildcard: Option<bool>,
    fuzziness: Option<Fuzziness>,
    fuzzy_max_expansions: Option<u32>,
    fuzzy_prefix_length: Option<u32>,
    phrase_slop: Option<u32>,
    tie_breaker: Option<BigDecimal>,
    minimum_should_match: Option<MinimumShouldMatch>,
    lenient: Option<bool>,
    time_zone: Option<String>,
    boost: Option<BigDecimal>,
}

impl QueryStringQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        query: String,
        /// Field searched when the query string names none.
        default_field: String,
        match_type: MultiMatchType,
        default_operator: Operator,
        analyzer: String,
        quote_analyzer: String,
        quote_field_suffix: String,
        allow_leading_wildcard: bool,
        analyze_wildcard: bool,
        fuzziness: Fuzziness,
        fuzzy_max_expansions: u32,
        fuzzy_prefix_length: u32,
        phrase_slop: u32,
        minimum_should_match: MinimumShouldMatch,
        lenient: bool,
        time_zone: String,
    }

    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_field<F: Into<String>>(mut self, field: F) -> Self {
        self.fields.push(field.into());
        self
    }

    decimal_setters! {
        tie_breaker,
        boost,
    }
}

impl Builder for QueryStringQueryBuilder {
    type Output = QueryStringQuery;

    fn build(self) -> Result<QueryStringQuery> {
        let query = required!(self.query);
        Ok(QueryStringQuery {
            query,
            default_field: self.default_field,
            fields: self.fields,
            match_type: self.match_type,
            default_operator: self.default_operator,
            analyzer: self.analyzer,
            quote_analyzer: self.quote_analyzer,
            quote_field_suffix: self.quote_field_suffix,
            allow_leading_wildcard: self.allow_leading_wildcard,
            analyze_wildcard: self.analyze_wildcard,
            fuzziness: self.fuzziness,
            fuzzy_max_expansions: self.fuzzy_max_expansions,
            fuzzy_prefix_length: self.fuzzy_prefix_length,
            phrase_slop: self.phrase_slop,
            tie_breaker: self.tie_breaker,
            minimum_should_match: self.minimum_should_match,
            lenient: self.lenient,
            time_zone: self.time_zone,
            boost: self.boost,
        })
    }
}

/// A forgiving query-string variant that never fails on bad syntax.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleQueryStringQuery {
    pub query: String,
    pub fields: Vec<String>,
    pub default_operator: Option<Operator>,
    pub analyzer: Option<String>,
    /// Enabled operators, e.g. `"OR|AND|PREFIX"`.
    pub flags: Option<String>,
    pub analyze_wildcard: Option<bool>,
    pub lenient: Option<bool>,
    pub minimum_should_match: Option<MinimumShouldMatch>,
    pub quote_field_suffix: Option<String>,
    pub auto_generate_synonyms_phrase_query: Option<bool>,
    pub fuzzy_prefix_length: Option<u32>,
    pub fuzzy_max_expansions: Option<u32>,
    pub fuzzy_transpositions: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl SimpleQueryStringQuery {
    pub fn new<Q: Into<String>>(query: Q) -> Self {
        SimpleQueryStringQuery {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn builder() -> SimpleQueryStringQueryBuilder {
        SimpleQueryStringQueryBuilder::new()
    }
}

impl QueryVariant for SimpleQueryStringQuery {
    const QUERY_TYPE: QueryType = QueryType::SimpleQueryString;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("query", self.query.as_str())
            .put_strings("fields", &self.fields)
            .put_opt("default_operator", self.default_operator)
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_opt("flags", self.flags.as_deref())
            .put_opt("analyze_wildcard", self.analyze_wildcard)
            .put_opt("lenient", self.lenient)
            .put_codec_opt("minimum_should_match", self.minimum_should_match.as_ref())
            .put_opt("quote_field_suffix", self.quote_field_suffix.as_deref())
            .put_opt(
                "auto_generate_synonyms_phrase_query",
                self.auto_generate_synonyms_phrase_query,
            )
            .put_opt("fuzzy_prefix_length", self.fuzzy_prefix_length)
            .put_opt("fuzzy_max_expansions", self.fuzzy_max_expansions)
            .put_opt("fuzzy_transpositions", self.fuzzy_transpositions)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SimpleQueryStringQuery", body)?;
        Ok(SimpleQueryStringQuery {
            query: reader.string("query")?,
            fields: reader.strings_opt("fields")?.unwrap_or_default(),
            default_operator: reader.parse_opt("default_operator")?,
            analyzer: reader.string_opt("analyzer")?,
            flags: reader.string_opt("flags")?,
            analyze_wildcard: reader.bool_opt("analyze_wildcard")?,
            lenient: reader.bool_opt("lenient")?,
            minimum_should_match: reader
                .decode_opt("minimum_should_match", MinimumShouldMatch::from_json)?,
            quote_field_suffix: reader.string_opt("quote_field_suffix")?,
            auto_generate_synonyms_phrase_query: reader
                .bool_opt("auto_generate_synonyms_phrase_query")?,
            fuzzy_prefix_length: reader.u32_opt("fuzzy_prefix_length")?,
            fuzzy_max_expansions: reader.u32_opt("fuzzy_max_expansions")?,
            fuzzy_transpositions: reader.bool_opt("fuzzy_transpositions")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`SimpleQueryStringQuery`]. Requires `query`.
#[derive(Debug, Default)]
pub struct SimpleQueryStringQueryBuilder {
    query: Option<String>,
    fields: Vec<String>,
    default_operator: Option<Operator>,
    analyzer: Option<String>,
    flags: Option<String>,
    analyze_wildcard: Option<bool>,
    lenient: Option<bool>,
    minimum_should_match: Option<MinimumShouldMatch>,
    quote_field_suffix: Option<String>,
    auto_generate_synonyms_phrase_query: Option<bool>,
    fuzzy_prefix_length: Option<u32>,
    fuzzy_max_expansions: Option<u32>,
    fuzzy_transpositions: Option<bool>,
    boost: Option<BigDecimal>,
}

impl SimpleQueryStringQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        query: String,
        default_operator: Operator,
        analyzer: String,
        flags: String,
        analyze_wildcard: bool,
        lenient: bool,
        minimum_should_match: MinimumShouldMatch,
        quote_field_suffix: String,
        auto_generate_synonyms_phrase_query: bool,
        fuzzy_prefix_length: u32,
        fuzzy_max_expansions: u32,
        fuzzy_transpositions: bool,
    }

    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_field<F: Into<String>>(mut self, field: F) -> Self {
        self.fields.push(field.into());
        self
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for SimpleQueryStringQueryBuilder {
    type Output = SimpleQueryStringQuery;

    fn build(self) -> Result<SimpleQueryStringQuery> {
        let query = required!(self.query);
        Ok(SimpleQueryStringQuery {
            query,
            fields: self.fields,
            default_operator: self.default_operator,
            analyzer: self.analyzer,
            flags: self.flags,
            analyze_wildcard: self.analyze_wildcard,
            lenient: self.lenient,
            minimum_should_match: self.minimum_should_match,
            quote_field_suffix: self.quote_field_suffix,
            auto_generate_synonyms_phrase_query: self.auto_generate_synonyms_phrase_query,
            fuzzy_prefix_length: self.fuzzy_prefix_length,
            fuzzy_max_expansions: self.fuzzy_max_expansions,
            fuzzy_transpositions: self.fuzzy_transpositions,
            boost: self.boost,
        })
    }
}
