//! `fuzzy` query: terms within an edit distance of the given value.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{FieldBody, JsonCodec, KeyedWriter, decode_field_keyed, named};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::{Fuzziness, RewriteMethod};
use crate::query::{QueryType, QueryVariant};

/// Matches terms similar to `value`, as measured by Levenshtein edit
/// distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyQuery {
    pub field: String,
    pub value: Value,
    pub fuzziness: Option<Fuzziness>,
    /// Number of leading characters that must match exactly.
    pub prefix_length: Option<u32>,
    /// Maximum number of terms the query expands to.
    pub max_expansions: Option<u32>,
    pub transpositions: Option<bool>,
    pub rewrite: Option<RewriteMethod>,
    pub boost: Option<BigDecimal>,
}

impl FuzzyQuery {
    pub fn new<F: Into<String>, V: Into<Value>>(field: F, value: V) -> Self {
        FuzzyQuery {
            field: field.into(),
            value: value.into(),
            fuzziness: None,
            prefix_length: None,
            max_expansions: None,
            transpositions: None,
            rewrite: None,
            boost: None,
        }
    }

    pub fn builder() -> FuzzyQueryBuilder {
        FuzzyQueryBuilder::new()
    }
}

impl QueryVariant for FuzzyQuery {
    const QUERY_TYPE: QueryType = QueryType::Fuzzy;

    fn encode_body(&self) -> Value {
        if *self == FuzzyQuery::new(self.field.as_str(), self.value.clone()) {
            return named(&self.field, self.value.clone());
        }
        let mut writer = KeyedWriter::new();
        writer
            .put("value", self.value.clone())
            .put_codec_opt("fuzziness", self.fuzziness.as_ref())
            .put_opt("prefix_length", self.prefix_length)
            .put_opt("max_expansions", self.max_expansions)
            .put_opt("transpositions", self.transpositions)
            .put_opt("rewrite", self.rewrite)
            .put_decimal_opt("boost", self.boost.as_ref());
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("FuzzyQuery", body)?;
        match body {
            FieldBody::Short(value) => Ok(FuzzyQuery::new(
                field,
                FieldBody::short_scalar(value, "FuzzyQuery")?,
            )),
            FieldBody::Expanded(reader) => Ok(FuzzyQuery {
                field,
                value: reader.scalar_value("value")?,
                fuzziness: reader.decode_opt("fuzziness", Fuzziness::from_json)?,
                prefix_length: reader.u32_opt("prefix_length")?,
                max_expansions: reader.u32_opt("max_expansions")?,
                transpositions: reader.bool_opt("transpositions")?,
                rewrite: reader.parse_opt("rewrite")?,
                boost: reader.decimal_opt("boost")?,
            }),
        }
    }
}

/// Builder for [`FuzzyQuery`]. Requires `field`, then `value`.
#[derive(Debug, Default)]
pub struct FuzzyQueryBuilder {
    field: Option<String>,
    value: Option<Value>,
    fuzziness: Option<Fuzziness>,
    prefix_length: Option<u32>,
    max_expansions: Option<u32>,
    transpositions: Option<bool>,
    rewrite: Option<RewriteMethod>,
    boost: Option<BigDecimal>,
}

impl FuzzyQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        value: Value,
        /// Set the maximum edit distance.
        fuzziness: Fuzziness,
        prefix_length: u32,
        max_expansions: u32,
        /// Whether swapping two adjacent characters counts as one edit.
        transpositions: bool,
        rewrite: RewriteMethod,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for FuzzyQueryBuilder {
    type Output = FuzzyQuery;

    fn build(self) -> Result<FuzzyQuery> {
        let field = required!(self.field);
        let value = required!(self.value);
        Ok(FuzzyQuery {
            field,
            value,
            fuzziness: self.fuzziness,
            prefix_length: self.prefix_length,
            max_expansions: self.max_expansions,
            transpositions: self.transpositions,
            rewrite: self.rewrite,
            boost: self.boost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryDslError;
    use serde_json::json;

    #[test]
    fn test_fuzzy_query_short_form() {
        let query = FuzzyQuery::new("user", "ki");
        assert_eq!(query.to_json(), json!({"fuzzy": {"user": "ki"}}));
        assert_eq!(FuzzyQuery::from_json(&json!({"fuzzy": {"user": "ki"}})).unwrap(), query);
    }

    #[test]
    fn test_fuzzy_query_full() {
        let query = FuzzyQuery::builder()
            .field("user")
            .value("ki")
            .fuzziness(2u32)
            .prefix_length(0u32)
            .max_expansions(100u32)
            .transpositions(false)
            .boost(1.5)
            .build()
            .unwrap();

        let expected = json!({
            "fuzzy": {
                "user": {
                    "value": "ki",
                    "fuzziness": 2,
                    "prefix_length": 0,
                    "max_expansions": 100,
                    "transpositions": false,
                    "boost": 1.5
                }
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(FuzzyQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_fuzzy_query_numeric_value() {
        let doc = json!({"fuzzy": {"price": 12}});
        let query = FuzzyQuery::from_json(&doc).unwrap();
        assert_eq!(query, FuzzyQuery::new("price", 12));
        assert_eq!(query.to_json(), doc);
    }

    #[test]
    fn test_fuzzy_query_auto_fuzziness() {
        let doc = json!({"fuzzy": {"user": {"value": "ki", "fuzziness": "AUTO:3,6"}}});
        let query = FuzzyQuery::from_json(&doc).unwrap();
        assert_eq!(query.fuzziness, Some(Fuzziness::AutoRange(3, 6)));
    }

    #[test]
    fn test_fuzzy_query_missing_value() {
        let err = FuzzyQuery::builder().field("user").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "value"));

        let doc = json!({"fuzzy": {"user": {"fuzziness": 2}}});
        assert!(matches!(
            FuzzyQuery::from_json(&doc),
            Err(QueryDslError::KeyNotFound { .. })
        ));
    }
}
