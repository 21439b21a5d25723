//! `match_all` and `match_none` queries.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{KeyedReader, KeyedWriter};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters};
use crate::query::{QueryType, QueryVariant};

/// Declares a query whose body carries nothing but an optional `boost`.
macro_rules! boost_only_query {
    ($(#[$meta:meta])* $name:ident, $builder:ident, $query_type:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub boost: Option<BigDecimal>,
        }

        impl $name {
            pub fn new() -> Self {
                $name { boost: None }
            }

            pub fn builder() -> $builder {
                $builder::new()
            }
        }

        impl QueryVariant for $name {
            const QUERY_TYPE: QueryType = QueryType::$query_type;

            fn encode_body(&self) -> Value {
                let mut writer = KeyedWriter::new();
                writer.put_decimal_opt("boost", self.boost.as_ref());
                writer.finish()
            }

            fn decode_body(body: &Value) -> Result<Self> {
                let reader = KeyedReader::new(stringify!($name), body)?;
                Ok($name {
                    boost: reader.decimal_opt("boost")?,
                })
            }
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`]. Has no required fields.")]
        #[derive(Debug, Default)]
        pub struct $builder {
            boost: Option<BigDecimal>,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            decimal_setters! {
                boost,
            }
        }

        impl Builder for $builder {
            type Output = $name;

            fn build(self) -> Result<$name> {
                Ok($name { boost: self.boost })
            }
        }
    };
}

boost_only_query!(
    /// Matches every document, giving each a score of `boost` (1.0 by default).
    MatchAllQuery,
    MatchAllQueryBuilder,
    MatchAll
);

boost_only_query!(
    /// Matches no documents.
    MatchNoneQuery,
    MatchNoneQueryBuilder,
    MatchNone
);
