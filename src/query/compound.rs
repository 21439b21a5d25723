//! Compound queries wrapping other queries: `constant_score`, `dis_max` and
//! `boosting`. `bool` and `function_score` have their own modules.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{KeyedReader, KeyedWriter};
use crate::error::{QueryDslError, Result};
use crate::query::builder::{Builder, decimal_setters, required};
use crate::query::{Query, QueryType, QueryVariant, decode_query};

/// Wraps a filter and gives every match the same score.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantScoreQuery {
    pub filter: Box<Query>,
    pub boost: Option<BigDecimal>,
}

impl ConstantScoreQuery {
    pub fn new<Q: Into<Query>>(filter: Q) -> Self {
        ConstantScoreQuery {
            filter: Box::new(filter.into()),
            boost: None,
        }
    }

    pub fn builder() -> ConstantScoreQueryBuilder {
        ConstantScoreQueryBuilder::new()
    }
}

impl QueryVariant for ConstantScoreQuery {
    const QUERY_TYPE: QueryType = QueryType::ConstantScore;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec("filter", self.filter.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("ConstantScoreQuery", body)?;
        Ok(ConstantScoreQuery {
            filter: Box::new(reader.decode("filter", decode_query)?),
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`ConstantScoreQuery`]. Requires `filter`.
#[derive(Debug, Default)]
pub struct ConstantScoreQueryBuilder {
    filter: Option<Query>,
    boost: Option<BigDecimal>,
}

impl ConstantScoreQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter<Q: Into<Query>>(mut self, filter: Q) -> Self {
        self.filter = Some(filter.into());
        self
    }

    decimal_setters! {
        /// Set the score given to every match.
        boost,
    }
}

impl Builder for ConstantScoreQueryBuilder {
    type Output = ConstantScoreQuery;

    fn build(self) -> Result<ConstantScoreQuery> {
        Ok(ConstantScoreQuery {
            filter: Box::new(required!(self.filter)),
            boost: self.boost,
        })
    }
}

/// Disjunction max: scores each document by its best matching sub-query,
/// plus `tie_breaker` times the other matching scores.
#[derive(Debug, Clone, PartialEq)]
pub struct DisMaxQuery {
    pub queries: Vec<Query>,
    pub tie_breaker: Option<BigDecimal>,
    pub boost: Option<BigDecimal>,
}

impl DisMaxQuery {
    pub fn builder() -> DisMaxQueryBuilder {
        DisMaxQueryBuilder::new()
    }
}

impl QueryVariant for DisMaxQuery {
    const QUERY_TYPE: QueryType = QueryType::DisMax;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec_list("queries", &self.queries)
            .put_decimal_opt("tie_breaker", self.tie_breaker.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("DisMaxQuery", body)?;
        let queries = reader.list_opt("queries", decode_query)?.unwrap_or_default();
        if queries.is_empty() {
            return Err(QueryDslError::missing_field("queries"));
        }
        Ok(DisMaxQuery {
            queries,
            tie_breaker: reader.decimal_opt("tie_breaker")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`DisMaxQuery`]. Requires at least one query.
#[derive(Debug, Default)]
pub struct DisMaxQueryBuilder {
    queries: Vec<Query>,
    tie_breaker: Option<BigDecimal>,
    boost: Option<BigDecimal>,
}

impl DisMaxQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sub-query.
    pub fn query<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.queries.push(query.into());
        self
    }

    decimal_setters! {
        tie_breaker,
        boost,
    }
}

impl Builder for DisMaxQueryBuilder {
    type Output = DisMaxQuery;

    fn build(self) -> Result<DisMaxQuery> {
        if self.queries.is_empty() {
            return Err(QueryDslError::missing_field("queries"));
        }
        Ok(DisMaxQuery {
            queries: self.queries,
            tie_breaker: self.tie_breaker,
            boost: self.boost,
        })
    }
}

/// Demotes documents matching `negative` instead of excluding them.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostingQuery {
    pub positive: Box<Query>,
    pub negative: Box<Query>,
    /// Multiplier (between 0 and 1) applied to negative matches.
    pub negative_boost: Option<BigDecimal>,
    pub boost: Option<BigDecimal>,
}

impl BoostingQuery {
    pub fn builder() -> BoostingQueryBuilder {
        BoostingQueryBuilder::new()
    }
}

impl QueryVariant for BoostingQuery {
    const QUERY_TYPE: QueryType = QueryType::Boosting;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec("positive", self.positive.as_ref())
            .put_codec("negative", self.negative.as_ref())
            .put_decimal_opt("negative_boost", self.negative_boost.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("BoostingQuery", body)?;
        Ok(BoostingQuery {
            positive: Box::new(reader.decode("positive", decode_query)?),
            negative: Box::new(reader.decode("negative", decode_query)?),
            negative_boost: reader.decimal_opt("negative_boost")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`BoostingQuery`]. Requires `positive`, then `negative`.
#[derive(Debug, Default)]
pub struct BoostingQueryBuilder {
    positive: Option<Query>,
    negative: Option<Query>,
    negative_boost: Option<BigDecimal>,
    boost: Option<BigDecimal>,
}

impl BoostingQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positive<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.positive = Some(query.into());
        self
    }

    pub fn negative<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.negative = Some(query.into());
        self
    }

    decimal_setters! {
        negative_boost,
        boost,
    }
}

impl Builder for BoostingQueryBuilder {
    type Output = BoostingQuery;

    fn build(self) -> Result<BoostingQuery> {
        let positive = required!(self.positive);
        let negative = required!(self.negative);
        Ok(BoostingQuery {
            positive: Box::new(positive),
            negative: Box::new(negative),
            negative_boost: self.negative_boost,
            boost: self.boost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::query::{MatchAllQuery, TermQuery};
    use serde_json::json;

    #[test]
    fn test_constant_score_query() {
        let query = ConstantScoreQuery::builder()
            .filter(TermQuery::new("user", "kimchy"))
            .boost(1.2)
            .build()
            .unwrap();

        let expected = json!({
            "constant_score": {
                "filter": {"term": {"user": "kimchy"}},
                "boost": 1.2
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(ConstantScoreQuery::from_json(&expected).unwrap(), query);

        let err = ConstantScoreQuery::builder().boost(1.2).build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "filter"));
    }

    #[test]
    fn test_dis_max_query() {
        let query = DisMaxQuery::builder()
            .query(TermQuery::new("title", "Quick pets"))
            .query(TermQuery::new("body", "Quick pets"))
            .tie_breaker(0.7)
            .build()
            .unwrap();

        let expected = json!({
            "dis_max": {
                "queries": [
                    {"term": {"title": "Quick pets"}},
                    {"term": {"body": "Quick pets"}}
                ],
                "tie_breaker": 0.7
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(DisMaxQuery::from_json(&expected).unwrap(), query);
        assert!(DisMaxQuery::builder().build().is_err());
    }

    #[test]
    fn test_boosting_query() {
        let query = BoostingQuery::builder()
            .positive(TermQuery::new("text", "apple"))
            .negative(TermQuery::new("text", "pie"))
            .negative_boost(0.5)
            .build()
            .unwrap();

        let expected = json!({
            "boosting": {
                "positive": {"term": {"text": "apple"}},
                "negative": {"term": {"text": "pie"}},
                "negative_boost": 0.5
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(BoostingQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_boosting_query_missing_negative() {
        let err = BoostingQuery::builder()
            .positive(MatchAllQuery::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "negative"));
    }
}
