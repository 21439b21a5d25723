//! `range` query over numeric, date or keyword fields.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{FieldBody, KeyedReader, KeyedWriter, decode_field_keyed, named};
use crate::error::{QueryDslError, Result};
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::RangeRelation;
use crate::query::{QueryType, QueryVariant};

const BOUNDS: [&str; 4] = ["gte", "gt", "lte", "lt"];

/// Matches documents whose `field` lies within the given bounds.
///
/// Bounds are kept as raw JSON scalars so numbers and date math strings
/// (`"now-1d/d"`) are both expressible.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub field: String,
    pub gte: Option<Value>,
    pub gt: Option<Value>,
    pub lte: Option<Value>,
    pub lt: Option<Value>,
    pub format: Option<String>,
    pub time_zone: Option<String>,
    pub relation: Option<RangeRelation>,
    pub boost: Option<BigDecimal>,
}

impl RangeQuery {
    pub fn builder() -> RangeQueryBuilder {
        RangeQueryBuilder::new()
    }

    fn has_bound(&self) -> bool {
        self.gte.is_some() || self.gt.is_some() || self.lte.is_some() || self.lt.is_some()
    }
}

impl QueryVariant for RangeQuery {
    const QUERY_TYPE: QueryType = QueryType::Range;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_opt("gte", self.gte.clone())
            .put_opt("gt", self.gt.clone())
            .put_opt("lte", self.lte.clone())
            .put_opt("lt", self.lt.clone())
            .put_opt("format", self.format.as_deref())
            .put_opt("time_zone", self.time_zone.as_deref())
            .put_opt("relation", self.relation)
            .put_decimal_opt("boost", self.boost.as_ref());
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("RangeQuery", body)?;
        let FieldBody::Expanded(reader) = body else {
            return Err(QueryDslError::type_mismatch("RangeQuery", field, "an object"));
        };
        let query = RangeQuery {
            gte: bound(&reader, "gte")?,
            gt: bound(&reader, "gt")?,
            lte: bound(&reader, "lte")?,
            lt: bound(&reader, "lt")?,
            format: reader.string_opt("format")?,
            time_zone: reader.string_opt("time_zone")?,
            relation: reader.parse_opt("relation")?,
            boost: reader.decimal_opt("boost")?,
            field,
        };
        if !query.has_bound() {
            return Err(QueryDslError::at_least_one(BOUNDS));
        }
        Ok(query)
    }
}

fn bound(reader: &KeyedReader<'_>, key: &str) -> Result<Option<Value>> {
    match reader.value_opt(key) {
        None => Ok(None),
        Some(value @ (Value::Number(_) | Value::String(_))) => Ok(Some(value.clone())),
        Some(_) => Err(QueryDslError::type_mismatch(
            reader.type_name(),
            key,
            "a number or string",
        )),
    }
}

/// Builder for [`RangeQuery`]. Requires `field` and at least one bound.
#[derive(Debug, Default)]
pub struct RangeQueryBuilder {
    field: Option<String>,
    gte: Option<Value>,
    gt: Option<Value>,
    lte: Option<Value>,
    lt: Option<Value>,
    format: Option<String>,
    time_zone: Option<String>,
    relation: Option<RangeRelation>,
    boost: Option<BigDecimal>,
}

impl RangeQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        /// Greater than or equal to.
        gte: Value,
        /// Greater than.
        gt: Value,
        /// Less than or equal to.
        lte: Value,
        /// Less than.
        lt: Value,
        /// Date format used to parse date bounds.
        format: String,
        time_zone: String,
        relation: RangeRelation,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for RangeQueryBuilder {
    type Output = RangeQuery;

    fn build(self) -> Result<RangeQuery> {
        let field = required!(self.field);
        let query = RangeQuery {
            field,
            gte: self.gte,
            gt: self.gt,
            lte: self.lte,
            lt: self.lt,
            format: self.format,
            time_zone: self.time_zone,
            relation: self.relation,
            boost: self.boost,
        };
        if !query.has_bound() {
            return Err(QueryDslError::at_least_one(BOUNDS));
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde_json::json;

    #[test]
    fn test_range_query_numeric() {
        let query = RangeQuery::builder()
            .field("age")
            .gte(10)
            .lte(20)
            .boost(2.5)
            .build()
            .unwrap();

        let expected = json!({"range": {"age": {"gte": 10, "lte": 20, "boost": 2.5}}});
        assert_eq!(query.to_json(), expected);
        assert_eq!(RangeQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_range_query_dates() {
        let doc = json!({
            "range": {
                "born": {
                    "gte": "01/01/2012",
                    "lte": "2013",
                    "format": "dd/MM/yyyy||yyyy",
                    "time_zone": "+01:00",
                    "relation": "WITHIN"
                }
            }
        });

        let query = RangeQuery::from_json(&doc).unwrap();
        assert_eq!(query.field, "born");
        assert_eq!(query.gte, Some(json!("01/01/2012")));
        assert_eq!(query.relation, Some(RangeRelation::Within));
        assert_eq!(query.to_json(), doc);
    }

    #[test]
    fn test_range_query_requires_a_bound() {
        let err = RangeQuery::builder().field("age").build().unwrap_err();
        match err {
            QueryDslError::AtLeastOneRequired(fields) => {
                assert_eq!(fields, vec!["gte", "gt", "lte", "lt"])
            }
            other => panic!("Expected at-least-one error, got {other:?}"),
        }

        let doc = json!({"range": {"age": {"boost": 1.5}}});
        assert!(matches!(
            RangeQuery::from_json(&doc),
            Err(QueryDslError::AtLeastOneRequired(_))
        ));
    }

    #[test]
    fn test_range_query_requires_field() {
        let err = RangeQuery::builder().gt(1).build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "field"));
    }

    #[test]
    fn test_range_query_rejects_bad_bound() {
        let doc = json!({"range": {"age": {"gte": [1, 2]}}});
        assert!(matches!(
            RangeQuery::from_json(&doc),
            Err(QueryDslError::TypeMismatch { .. })
        ));
    }
}
