//! Pattern queries on un-analyzed terms: `prefix`, `wildcard` and `regexp`.
//!
//! Patterns are sent to the server as written; no local compilation happens.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{FieldBody, KeyedWriter, decode_field_keyed, named};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::RewriteMethod;
use crate::query::{QueryType, QueryVariant};

/// Defines a `{ "<field>": "<value>" }` pattern query with `boost` and
/// `rewrite` options, plus its builder.
macro_rules! pattern_query {
    ($(#[$meta:meta])* $name:ident, $builder:ident, $query_type:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub field: String,
            pub value: Value,
            pub boost: Option<BigDecimal>,
            pub rewrite: Option<RewriteMethod>,
        }

        impl $name {
            pub fn new<F: Into<String>, V: Into<Value>>(field: F, value: V) -> Self {
                $name {
                    field: field.into(),
                    value: value.into(),
                    boost: None,
                    rewrite: None,
                }
            }

            pub fn builder() -> $builder {
                $builder::default()
            }
        }

        impl QueryVariant for $name {
            const QUERY_TYPE: QueryType = QueryType::$query_type;

            fn encode_body(&self) -> Value {
                if self.boost.is_none() && self.rewrite.is_none() {
                    return named(&self.field, self.value.clone());
                }
                let mut writer = KeyedWriter::new();
                writer
                    .put("value", self.value.clone())
                    .put_decimal_opt("boost", self.boost.as_ref())
                    .put_opt("rewrite", self.rewrite);
                named(&self.field, writer.finish())
            }

            fn decode_body(body: &Value) -> Result<Self> {
                let (field, body) = decode_field_keyed(stringify!($name), body)?;
                match body {
                    FieldBody::Short(value) => Ok($name::new(
                        field,
                        FieldBody::short_scalar(value, stringify!($name))?,
                    )),
                    FieldBody::Expanded(reader) => Ok($name {
                        field,
                        value: reader.scalar_value("value")?,
                        boost: reader.decimal_opt("boost")?,
                        rewrite: reader.parse_opt("rewrite")?,
                    }),
                }
            }
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`]. Requires `field`, then `value`.")]
        #[derive(Debug, Default)]
        pub struct $builder {
            field: Option<String>,
            value: Option<Value>,
            boost: Option<BigDecimal>,
            rewrite: Option<RewriteMethod>,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            setters! {
                field: String,
                value: Value,
                rewrite: RewriteMethod,
            }

            decimal_setters! {
                boost,
            }
        }

        impl Builder for $builder {
            type Output = $name;

            fn build(self) -> Result<$name> {
                let field = required!(self.field);
                let value = required!(self.value);
                Ok($name {
                    field,
                    value,
                    boost: self.boost,
                    rewrite: self.rewrite,
                })
            }
        }
    };
}

pattern_query! {
    /// Matches terms starting with `value`.
    PrefixQuery, PrefixQueryBuilder, Prefix
}

pattern_query! {
    /// Matches terms against a pattern where `*` is any run of characters and
    /// `?` is any single character.
    WildcardQuery, WildcardQueryBuilder, Wildcard
}

/// Matches terms against a Lucene regular expression.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexpQuery {
    pub field: String,
    pub value: Value,
    /// Enabled operators, e.g. `"INTERSECTION|COMPLEMENT|EMPTY"`.
    pub flags: Option<String>,
    pub max_determinized_states: Option<u32>,
    pub boost: Option<BigDecimal>,
    pub rewrite: Option<RewriteMethod>,
}

impl RegexpQuery {
    pub fn new<F: Into<String>, V: Into<Value>>(field: F, value: V) -> Self {
        RegexpQuery {
            field: field.into(),
            value: value.into(),
            flags: None,
            max_determinized_states: None,
            boost: None,
            rewrite: None,
        }
    }

    pub fn builder() -> RegexpQueryBuilder {
        RegexpQueryBuilder::new()
    }
}

impl QueryVariant for RegexpQuery {
    const QUERY_TYPE: QueryType = QueryType::Regexp;

    fn encode_body(&self) -> Value {
        if *self == RegexpQuery::new(self.field.as_str(), self.value.clone()) {
            return named(&self.field, self.value.clone());
        }
        let mut writer = KeyedWriter::new();
        writer
            .put("value", self.value.clone())
            .put_opt("flags", self.flags.as_deref())
            .put_opt("max_determinized_states", self.max_determinized_states)
            .put_decimal_opt("boost", self.boost.as_ref())
            .put_opt("rewrite", self.rewrite);
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("RegexpQuery", body)?;
        match body {
            FieldBody::Short(value) => Ok(RegexpQuery::new(
                field,
                FieldBody::short_scalar(value, "RegexpQuery")?,
            )),
            FieldBody::Expanded(reader) => Ok(RegexpQuery {
                field,
                value: reader.scalar_value("value")?,
                flags: reader.string_opt("flags")?,
                max_determinized_states: reader.u32_opt("max_determinized_states")?,
                boost: reader.decimal_opt("boost")?,
                rewrite: reader.parse_opt("rewrite")?,
            }),
        }
    }
}

/// Builder for [`RegexpQuery`]. Requires `field`, then `value`.
#[derive(Debug, Default)]
pub struct RegexpQueryBuilder {
    field: Option<String>,
    value: Option<Value>,
    flags: Option<String>,
    max_determinized_states: Option<u32>,
    boost: Option<BigDecimal>,
    rewrite: Option<RewriteMethod>,
}

impl RegexpQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        /// Set the regular expression.
        value: Value,
        flags: String,
        max_determinized_states: u32,
        rewrite: RewriteMethod,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for RegexpQueryBuilder {
    type Output = RegexpQuery;

    fn build(self) -> Result<RegexpQuery> {
        let field = required!(self.field);
        let value = required!(self.value);
        Ok(RegexpQuery {
            field,
            value,
            flags: self.flags,
            max_determinized_states: self.max_determinized_states,
            boost: self.boost,
            rewrite: self.rewrite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{JsonCodec, assert_key_count};
    use crate::error::QueryDslError;
    use serde_json::json;

    #[test]
    fn test_prefix_query_forms() {
        let query = PrefixQuery::new("user", "ki");
        assert_eq!(query.to_json(), json!({"prefix": {"user": "ki"}}));

        let expanded = json!({"prefix": {"user": {"value": "ki"}}});
        assert_eq!(PrefixQuery::from_json(&expanded).unwrap(), query);

        let numeric = json!({"prefix": {"zip": 90}});
        assert_eq!(PrefixQuery::from_json(&numeric).unwrap().to_json(), numeric);
    }

    #[test]
    fn test_prefix_query_with_options() {
        let query = PrefixQuery::builder()
            .field("user")
            .value("ki")
            .boost(2.5)
            .rewrite(RewriteMethod::ConstantScore)
            .build()
            .unwrap();

        let expected = json!({
            "prefix": {"user": {"value": "ki", "boost": 2.5, "rewrite": "constant_score"}}
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(PrefixQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_wildcard_query() {
        let query = WildcardQuery::builder()
            .field("user")
            .value("ki*y")
            .boost(1.5)
            .build()
            .unwrap();

        let expected = json!({"wildcard": {"user": {"value": "ki*y", "boost": 1.5}}});
        assert_eq!(query.to_json(), expected);
        assert_eq!(WildcardQuery::from_json(&expected).unwrap(), query);
        assert_key_count(
            WildcardQuery::from_json(&json!({"wildcard": {"a": "x", "b": "y"}})),
            1,
            2,
        );
    }

    #[test]
    fn test_wildcard_is_not_prefix() {
        let doc = json!({"prefix": {"user": "ki"}});
        assert!(matches!(
            WildcardQuery::from_json(&doc),
            Err(QueryDslError::VariantMismatch { .. })
        ));
    }

    #[test]
    fn test_regexp_query() {
        let query = RegexpQuery::builder()
            .field("name.first")
            .value("s.*y")
            .flags("INTERSECTION|COMPLEMENT|EMPTY")
            .max_determinized_states(20000u32)
            .build()
            .unwrap();

        let expected = json!({
            "regexp": {
                "name.first": {
                    "value": "s.*y",
                    "flags": "INTERSECTION|COMPLEMENT|EMPTY",
                    "max_determinized_states": 20000
                }
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(RegexpQuery::from_json(&expected).unwrap(), query);

        let short = RegexpQuery::from_json(&json!({"regexp": {"name.first": "s.*y"}})).unwrap();
        assert_eq!(short, RegexpQuery::new("name.first", "s.*y"));
    }

    #[test]
    fn test_pattern_builders_require_field_first() {
        let err = RegexpQuery::builder().build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "field"));
        let err = PrefixQuery::builder().field("user").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "value"));
    }
}
