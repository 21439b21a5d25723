//! Boolean query for combining multiple queries.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter, wire_enum};
use crate::error::{QueryDslError, Result};
use crate::query::builder::{Builder, decimal_setters, setters};
use crate::query::types::MinimumShouldMatch;
use crate::query::{Query, QueryType, QueryVariant, decode_query};

wire_enum! {
    /// Occurrence requirements for boolean clauses.
    pub enum Occur("bool clause") {
        /// The clause must match and contributes to the score.
        Must => "must",
        /// The clause must match but is not scored.
        Filter => "filter",
        /// The clause should match (equivalent to OR).
        Should => "should",
        /// The clause must not match (equivalent to NOT).
        MustNot => "must_not",
    }
}

/// A query built from other queries, each under an occurrence requirement.
///
/// At least one of the four clause lists is non-empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub filter: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
    pub minimum_should_match: Option<MinimumShouldMatch>,
    pub boost: Option<BigDecimal>,
}

impl BoolQuery {
    pub fn builder() -> BoolQueryBuilder {
        BoolQueryBuilder::new()
    }

    /// The clauses with the given occurrence.
    pub fn clauses(&self, occur: Occur) -> &[Query] {
        match occur {
            Occur::Must => &self.must,
            Occur::Filter => &self.filter,
            Occur::Should => &self.should,
            Occur::MustNot => &self.must_not,
        }
    }

    /// Total number of clauses across all occurrences.
    pub fn clause_count(&self) -> usize {
        Occur::ALL.iter().map(|occur| self.clauses(*occur).len()).sum()
    }

    fn validate(self) -> Result<Self> {
        if self.clause_count() == 0 {
            return Err(QueryDslError::at_least_one(
                Occur::ALL.iter().map(Occur::as_str),
            ));
        }
        Ok(self)
    }
}

impl QueryVariant for BoolQuery {
    const QUERY_TYPE: QueryType = QueryType::Bool;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        for occur in Occur::ALL {
            writer.put_codec_list(occur.as_str(), self.clauses(*occur));
        }
        writer
            .put_codec_opt("minimum_should_match", self.minimum_should_match.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("BoolQuery", body)?;
        let clauses = |occur: Occur| -> Result<Vec<Query>> {
            Ok(reader.list_opt(occur.as_str(), decode_query)?.unwrap_or_default())
        };
        BoolQuery {
            must: clauses(Occur::Must)?,
            filter: clauses(Occur::Filter)?,
            should: clauses(Occur::Should)?,
            must_not: clauses(Occur::MustNot)?,
            minimum_should_match: reader
                .decode_opt("minimum_should_match", MinimumShouldMatch::from_json)?,
            boost: reader.decimal_opt("boost")?,
        }
        .validate()
    }
}

/// Builder for [`BoolQuery`]. Requires at least one clause.
#[derive(Debug, Default)]
pub struct BoolQueryBuilder {
    query: BoolQuery,
    minimum_should_match: Option<MinimumShouldMatch>,
    boost: Option<BigDecimal>,
}

impl BoolQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause with an explicit occurrence.
    pub fn add_clause<Q: Into<Query>>(mut self, occur: Occur, query: Q) -> Self {
        let clauses = match occur {
            Occur::Must => &mut self.query.must,
            Occur::Filter => &mut self.query.filter,
            Occur::Should => &mut self.query.should,
            Occur::MustNot => &mut self.query.must_not,
        };
        clauses.push(query.into());
        self
    }

    /// Add a MUST clause.
    pub fn must<Q: Into<Query>>(self, query: Q) -> Self {
        self.add_clause(Occur::Must, query)
    }

    /// Add a FILTER clause.
    pub fn filter<Q: Into<Query>>(self, query: Q) -> Self {
        self.add_clause(Occur::Filter, query)
    }

    /// Add a SHOULD clause.
    pub fn should<Q: Into<Query>>(self, query: Q) -> Self {
        self.add_clause(Occur::Should, query)
    }

    /// Add a MUST_NOT clause.
    pub fn must_not<Q: Into<Query>>(self, query: Q) -> Self {
        self.add_clause(Occur::MustNot, query)
    }

    setters! {
        /// Set how many SHOULD clauses have to match.
        minimum_should_match: MinimumShouldMatch,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for BoolQueryBuilder {
    type Output = BoolQuery;

    fn build(self) -> Result<BoolQuery> {
        BoolQuery {
            minimum_should_match: self.minimum_should_match,
            boost: self.boost,
            ..self.query
        }
        .validate()
    }
}
