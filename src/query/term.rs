//! Term-level queries: exact matches on indexed terms, without analysis.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{FieldBody, KeyedReader, KeyedWriter, decode_field_keyed, named};
use crate::error::{QueryDslError, Result};
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::{QueryType, QueryVariant};

/// Matches documents whose `field` contains exactly `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub field: String,
    /// A string, number or boolean, sent as written.
    pub value: Value,
    pub boost: Option<BigDecimal>,
}

impl TermQuery {
    pub fn new<F: Into<String>, V: Into<Value>>(field: F, value: V) -> Self {
        TermQuery {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn builder() -> TermQueryBuilder {
        TermQueryBuilder::new()
    }
}

impl QueryVariant for TermQuery {
    const QUERY_TYPE: QueryType = QueryType::Term;

    fn encode_body(&self) -> Value {
        let Some(boost) = &self.boost else {
            return named(&self.field, self.value.clone());
        };
        let mut writer = KeyedWriter::new();
        writer.put("value", self.value.clone()).put_decimal("boost", boost);
        named(&self.field, writer.finish())
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let (field, body) = decode_field_keyed("TermQuery", body)?;
        match body {
            FieldBody::Short(value) => Ok(TermQuery::new(
                field,
                FieldBody::short_scalar(value, "TermQuery")?,
            )),
            FieldBody::Expanded(reader) => Ok(TermQuery {
                field,
                value: reader.scalar_value("value")?,
                boost: reader.decimal_opt("boost")?,
            }),
        }
    }
}

/// Builder for [`TermQuery`]. Requires `field`, then `value`.
#[derive(Debug, Default)]
pub struct TermQueryBuilder {
    field: Option<String>,
    value: Option<Value>,
    boost: Option<BigDecimal>,
}

impl TermQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        /// Set the exact term to look up.
        value: Value,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for TermQueryBuilder {
    type Output = TermQuery;

    fn build(self) -> Result<TermQuery> {
        let field = required!(self.field);
        let value = required!(self.value);
        Ok(TermQuery {
            field,
            value,
            boost: self.boost,
        })
    }
}

/// Matches documents whose `field` contains any of `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsQuery {
    pub field: String,
    pub values: Vec<String>,
    pub boost: Option<BigDecimal>,
}

impl TermsQuery {
    pub fn new<F, I, V>(field: F, values: I) -> Self
    where
        F: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        TermsQuery {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            boost: None,
        }
    }

    pub fn builder() -> TermsQueryBuilder {
        TermsQueryBuilder::new()
    }
}

impl QueryVariant for TermsQuery {
    const QUERY_TYPE: QueryType = QueryType::Terms;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put(&self.field, self.values.clone())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("TermsQuery", body)?;
        // `boost` is the option only when it is not a list of terms.
        let boost_is_option = reader
            .value_opt("boost")
            .is_some_and(|value| !value.is_array());
        let (field, _) = if boost_is_option {
            reader.entry_excluding(&["boost"])?
        } else {
            reader.entry_excluding(&[])?
        };
        Ok(TermsQuery {
            field: field.to_string(),
            values: reader.strings_opt(field)?.unwrap_or_default(),
            boost: if boost_is_option {
                reader.decimal_opt("boost")?
            } else {
                None
            },
        })
    }
}

/// Builder for [`TermsQuery`]. Requires `field`, then at least one value.
#[derive(Debug, Default)]
pub struct TermsQueryBuilder {
    field: Option<String>,
    values: Vec<String>,
    boost: Option<BigDecimal>,
}

impl TermsQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
    }

    /// Replace the terms to look up.
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Append one term.
    pub fn add_value<V: Into<String>>(mut self, value: V) -> Self {
        self.values.push(value.into());
        self
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for TermsQueryBuilder {
    type Output = TermsQuery;

    fn build(self) -> Result<TermsQuery> {
        let field = required!(self.field);
        if self.values.is_empty() {
            return Err(QueryDslError::missing_field("values"));
        }
        // A document field named `boost` occupies the option's key.
        if field == "boost" && self.boost.is_some() {
            return Err(QueryDslError::invalid_field(
                "boost",
                "cannot set a boost on a terms query over a field named boost",
            ));
        }
        Ok(TermsQuery {
            field,
            values: self.values,
            boost: self.boost,
        })
    }
}

/// Matches documents that have any indexed value for `field`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsQuery {
    pub field: String,
}

impl ExistsQuery {
    pub fn new<F: Into<String>>(field: F) -> Self {
        ExistsQuery {
            field: field.into(),
        }
    }

    pub fn builder() -> ExistsQueryBuilder {
        ExistsQueryBuilder::new()
    }
}

impl QueryVariant for ExistsQuery {
    const QUERY_TYPE: QueryType = QueryType::Exists;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer.put("field", self.field.as_str());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("ExistsQuery", body)?;
        Ok(ExistsQuery {
            field: reader.string("field")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct ExistsQueryBuilder {
    field: Option<String>,
}

impl ExistsQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
    }
}

impl Builder for ExistsQueryBuilder {
    type Output = ExistsQuery;

    fn build(self) -> Result<ExistsQuery> {
        Ok(ExistsQuery {
            field: required!(self.field),
        })
    }
}

/// Matches documents by `_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct IdsQuery {
    pub values: Vec<String>,
    pub boost: Option<BigDecimal>,
}

impl IdsQuery {
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        IdsQuery {
            values: values.into_iter().map(Into::into).collect(),
            boost: None,
        }
    }

    pub fn builder() -> IdsQueryBuilder {
        IdsQueryBuilder::new()
    }
}

impl QueryVariant for IdsQuery {
    const QUERY_TYPE: QueryType = QueryType::Ids;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("values", self.values.clone())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("IdsQuery", body)?;
        Ok(IdsQuery {
            values: reader
                .strings_opt("values")?
                .ok_or_else(|| QueryDslError::key_not_found("IdsQuery", "values"))?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`IdsQuery`]. Requires at least one id.
#[derive(Debug, Default)]
pub struct IdsQueryBuilder {
    values: Vec<String>,
    boost: Option<BigDecimal>,
}

impl IdsQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_value<V: Into<String>>(mut self, value: V) -> Self {
        self.values.push(value.into());
        self
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for IdsQueryBuilder {
    type Output = IdsQuery;

    fn build(self) -> Result<IdsQuery> {
        if self.values.is_empty() {
            return Err(QueryDslError::missing_field("values"));
        }
        Ok(IdsQuery {
            values: self.values,
            boost: self.boost,
        })
    }
}

/// Matches documents of the given mapping type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeQuery {
    pub value: String,
}

impl TypeQuery {
    pub fn new<V: Into<String>>(value: V) -> Self {
        TypeQuery {
            value: value.into(),
        }
    }

    pub fn builder() -> TypeQueryBuilder {
        TypeQueryBuilder::new()
    }
}

impl QueryVariant for TypeQuery {
    const QUERY_TYPE: QueryType = QueryType::Type;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer.put("value", self.value.as_str());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("TypeQuery", body)?;
        Ok(TypeQuery {
            value: reader.string("value")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct TypeQueryBuilder {
    value: Option<String>,
}

impl TypeQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Set the mapping type name.
        value: String,
    }
}

impl Builder for TypeQueryBuilder {
    type Output = TypeQuery;

    fn build(self) -> Result<TypeQuery> {
        Ok(TypeQuery {
            value: required!(self.value),
        })
    }
}
