//! Discriminated-key JSON codec.
//!
//! Query, suggestion and smoothing model documents are JSON objects whose key
//! set is not known statically: it mixes fixed field names with a
//! discriminator chosen at runtime (the type name, or for field-keyed queries
//! the document field). [`KeyedReader`] and [`KeyedWriter`] are ordered,
//! string-keyed views over [`serde_json::Map`] that carry the decoding type's
//! name so every structural failure can report where it happened.

use std::fmt::Debug;
use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::{QueryDslError, Result};

/// Two-way conversion between a value and its JSON wire form.
pub trait JsonCodec: Sized {
    /// Encode this value.
    fn to_json(&self) -> Value;

    /// Decode a value, validating the document's key structure.
    fn from_json(value: &Value) -> Result<Self>;
}

/// Produce a key for an arbitrary runtime string.
pub fn key_for<S: AsRef<str>>(name: S) -> String {
    name.as_ref().to_string()
}

/// Wrap `body` in a single-key object keyed by `tag`.
pub fn named(tag: &str, body: Value) -> Value {
    let mut map = Map::new();
    map.insert(key_for(tag), body);
    Value::Object(map)
}

/// Conversion into the base-10 decimal used for all fractional fields.
pub trait IntoDecimal {
    fn into_decimal(self) -> BigDecimal;
}

impl IntoDecimal for BigDecimal {
    fn into_decimal(self) -> BigDecimal {
        self
    }
}

impl IntoDecimal for &BigDecimal {
    fn into_decimal(self) -> BigDecimal {
        self.clone()
    }
}

impl IntoDecimal for f64 {
    fn into_decimal(self) -> BigDecimal {
        if !self.is_finite() {
            warn!("non-finite value {self} has no decimal form, using 0");
            return BigDecimal::from(0);
        }
        // Display gives the shortest text that round-trips, never an exponent.
        BigDecimal::from_str(&self.to_string()).unwrap_or_else(|_| BigDecimal::from(0))
    }
}

impl IntoDecimal for f32 {
    fn into_decimal(self) -> BigDecimal {
        if !self.is_finite() {
            warn!("non-finite value {self} has no decimal form, using 0");
            return BigDecimal::from(0);
        }
        BigDecimal::from_str(&self.to_string()).unwrap_or_else(|_| BigDecimal::from(0))
    }
}

macro_rules! int_into_decimal {
    ($($t:ty),*) => {
        $(
            impl IntoDecimal for $t {
                fn into_decimal(self) -> BigDecimal {
                    BigDecimal::from(self)
                }
            }
        )*
    };
}

int_into_decimal!(i32, i64, u32, u64);

/// Encode a decimal as a JSON number.
///
/// Integral values that fit in `i64` are written as JSON integers. Everything
/// else keeps its exact base-10 digits on the wire.
pub fn decimal_to_json(value: &BigDecimal) -> Value {
    if value.is_integer() {
        if let Some(int) = value.to_i64() {
            return Value::from(int);
        }
    }
    let text = value.to_plain_string();
    match Number::from_str(&text) {
        Ok(number) => Value::Number(number),
        Err(e) => {
            warn!("decimal {text} is not a JSON number ({e}), writing it as a string");
            Value::String(text)
        }
    }
}

/// Decode a decimal from a JSON number or numeric string.
pub fn decimal_from_json(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(number) => BigDecimal::from_str(&number.to_string()).ok(),
        Value::String(text) => BigDecimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

/// Render a JSON scalar as text (strings verbatim, numbers and booleans
/// in their JSON form).
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Read-only view over one JSON object of a document being decoded.
#[derive(Debug, Clone, Copy)]
pub struct KeyedReader<'a> {
    type_name: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> KeyedReader<'a> {
    /// Create a reader, failing if `value` is not an object.
    pub fn new(type_name: &'static str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(KeyedReader { type_name, map }),
            _ => Err(QueryDslError::type_mismatch(type_name, "<document>", "an object")),
        }
    }

    /// Name of the type being decoded.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.map.keys().map(String::as_str)
    }

    /// Entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Fail unless exactly `expected` keys are present.
    pub fn expect_key_count(&self, expected: usize) -> Result<()> {
        if self.map.len() != expected {
            return Err(QueryDslError::key_count(
                self.type_name,
                expected,
                self.map.len(),
            ));
        }
        Ok(())
    }

    /// The only entry of a single-key object.
    pub fn single_entry(&self) -> Result<(&'a str, &'a Value)> {
        self.expect_key_count(1)?;
        self.map
            .iter()
            .next()
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| QueryDslError::key_count(self.type_name, 1, 0))
    }

    /// The one entry whose key is not a known sibling field.
    pub fn entry_excluding(&self, known: &[&str]) -> Result<(&'a str, &'a Value)> {
        let mut candidates = self
            .map
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()));
        let first = candidates.next();
        let rest = candidates.count();
        match first {
            Some((key, value)) if rest == 0 => Ok((key.as_str(), value)),
            Some(_) => Err(QueryDslError::key_count(self.type_name, 1, rest + 1)),
            None => Err(QueryDslError::key_count(self.type_name, 1, 0)),
        }
    }

    /// Fail if any key outside `allowed` is present.
    pub fn reject_unknown(&self, allowed: &[&str]) -> Result<()> {
        match self.keys().find(|k| !allowed.contains(k)) {
            Some(key) => Err(QueryDslError::invalid_value(
                self.type_name,
                format!("unknown key {key}"),
            )),
            None => Ok(()),
        }
    }

    /// A present, non-null value.
    pub fn value_opt(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn value(&self, key: &str) -> Result<&'a Value> {
        self.value_opt(key)
            .ok_or_else(|| QueryDslError::key_not_found(self.type_name, key))
    }

    pub fn nested(&self, key: &str) -> Result<KeyedReader<'a>> {
        KeyedReader::new(self.type_name, self.value(key)?)
            .map_err(|_| self.mismatch(key, "an object"))
    }

    pub fn nested_opt(&self, key: &str) -> Result<Option<KeyedReader<'a>>> {
        self.value_opt(key)
            .map(|v| KeyedReader::new(self.type_name, v).map_err(|_| self.mismatch(key, "an object")))
            .transpose()
    }

    pub fn string(&self, key: &str) -> Result<String> {
        self.string_opt(key)?
            .ok_or_else(|| QueryDslError::key_not_found(self.type_name, key))
    }

    pub fn string_opt(&self, key: &str) -> Result<Option<String>> {
        match self.value_opt(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(_) => Err(self.mismatch(key, "a string")),
        }
    }

    /// A string, number or boolean kept in its JSON form.
    pub fn scalar_value(&self, key: &str) -> Result<Value> {
        match self.value(key)? {
            value @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => Ok(value.clone()),
            _ => Err(self.mismatch(key, "a scalar")),
        }
    }

    /// A string, number or boolean rendered as text.
    pub fn scalar_opt(&self, key: &str) -> Result<Option<String>> {
        self.value_opt(key)
            .map(|v| scalar_to_string(v).ok_or_else(|| self.mismatch(key, "a scalar")))
            .transpose()
    }

    pub fn scalar(&self, key: &str) -> Result<String> {
        self.scalar_opt(key)?
            .ok_or_else(|| QueryDslError::key_not_found(self.type_name, key))
    }

    pub fn bool_opt(&self, key: &str) -> Result<Option<bool>> {
        match self.value_opt(key) {
            None => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(*flag)),
            Some(_) => Err(self.mismatch(key, "a boolean")),
        }
    }

    pub fn i64_opt(&self, key: &str) -> Result<Option<i64>> {
        self.value_opt(key)
            .map(|v| v.as_i64().ok_or_else(|| self.mismatch(key, "an integer")))
            .transpose()
    }

    pub fn u64_opt(&self, key: &str) -> Result<Option<u64>> {
        self.value_opt(key)
            .map(|v| v.as_u64().ok_or_else(|| self.mismatch(key, "an unsigned integer")))
            .transpose()
    }

    pub fn u32_opt(&self, key: &str) -> Result<Option<u32>> {
        self.u64_opt(key)?
            .map(|v| u32::try_from(v).map_err(|_| self.mismatch(key, "a 32-bit unsigned integer")))
            .transpose()
    }

    pub fn i32_opt(&self, key: &str) -> Result<Option<i32>> {
        self.i64_opt(key)?
            .map(|v| i32::try_from(v).map_err(|_| self.mismatch(key, "a 32-bit integer")))
            .transpose()
    }

    pub fn f64_opt(&self, key: &str) -> Result<Option<f64>> {
        self.value_opt(key)
            .map(|v| v.as_f64().ok_or_else(|| self.mismatch(key, "a number")))
            .transpose()
    }

    pub fn decimal_opt(&self, key: &str) -> Result<Option<BigDecimal>> {
        self.value_opt(key)
            .map(|v| decimal_from_json(v).ok_or_else(|| self.mismatch(key, "a decimal number")))
            .transpose()
    }

    pub fn decimal(&self, key: &str) -> Result<BigDecimal> {
        self.decimal_opt(key)?
            .ok_or_else(|| QueryDslError::key_not_found(self.type_name, key))
    }

    /// A list of strings; a lone string is read as a one-element list.
    pub fn strings_opt(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.value_opt(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(vec![text.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| scalar_to_string(item).ok_or_else(|| self.mismatch(key, "a list of strings")))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(_) => Err(self.mismatch(key, "a list of strings")),
        }
    }

    /// A value of one of the wire enums (or anything parsed from a string).
    pub fn parse_opt<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr<Err = QueryDslError>,
    {
        self.string_opt(key)?.map(|text| text.parse::<T>()).transpose()
    }

    /// A plain serde-mapped value.
    pub fn serde_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.value_opt(key)
            .map(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    QueryDslError::invalid_value(self.type_name, format!("{key}: {e}"))
                })
            })
            .transpose()
    }

    /// A value decoded by a custom function, e.g. a nested polymorphic query.
    pub fn decode_opt<T, F>(&self, key: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(&'a Value) -> Result<T>,
    {
        self.value_opt(key).map(decode).transpose()
    }

    pub fn decode<T, F>(&self, key: &str, decode: F) -> Result<T>
    where
        F: FnOnce(&'a Value) -> Result<T>,
    {
        decode(self.value(key)?)
    }

    /// A list decoded element by element, in document order. A lone object is
    /// read as a one-element list.
    pub fn list_opt<T, F>(&self, key: &str, mut decode: F) -> Result<Option<Vec<T>>>
    where
        F: FnMut(&'a Value) -> Result<T>,
    {
        match self.value_opt(key) {
            None => Ok(None),
            Some(Value::Array(items)) => items.iter().map(decode).collect::<Result<Vec<_>>>().map(Some),
            Some(single @ Value::Object(_)) => decode(single).map(|item| Some(vec![item])),
            Some(_) => Err(self.mismatch(key, "a list")),
        }
    }

    fn mismatch(&self, key: &str, expected: &str) -> QueryDslError {
        QueryDslError::type_mismatch(self.type_name, key, expected)
    }
}

/// Ordered builder for one JSON object of a document being encoded.
#[derive(Debug, Default, Clone)]
pub struct KeyedWriter {
    map: Map<String, Value>,
}

impl KeyedWriter {
    pub fn new() -> Self {
        KeyedWriter { map: Map::new() }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn put<V: Into<Value>>(&mut self, key: &str, value: V) -> &mut Self {
        self.map.insert(key_for(key), value.into());
        self
    }

    pub fn put_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.put(key, value);
        }
        self
    }

    pub fn put_decimal(&mut self, key: &str, value: &BigDecimal) -> &mut Self {
        self.put(key, decimal_to_json(value))
    }

    pub fn put_decimal_opt(&mut self, key: &str, value: Option<&BigDecimal>) -> &mut Self {
        if let Some(value) = value {
            self.put_decimal(key, value);
        }
        self
    }

    /// Write a value that encodes itself.
    pub fn put_codec<T: JsonCodec>(&mut self, key: &str, value: &T) -> &mut Self {
        self.put(key, value.to_json())
    }

    pub fn put_codec_opt<T: JsonCodec>(&mut self, key: &str, value: Option<&T>) -> &mut Self {
        if let Some(value) = value {
            self.put_codec(key, value);
        }
        self
    }

    /// Write a list of self-encoding values, skipping empty lists.
    pub fn put_codec_list<T: JsonCodec>(&mut self, key: &str, values: &[T]) -> &mut Self {
        if !values.is_empty() {
            let items: Vec<Value> = values.iter().map(JsonCodec::to_json).collect();
            self.put(key, Value::Array(items));
        }
        self
    }

    /// Write a list of strings, skipping empty lists.
    pub fn put_strings(&mut self, key: &str, values: &[String]) -> &mut Self {
        if !values.is_empty() {
            self.put(key, values.to_vec());
        }
        self
    }

    pub fn put_writer(&mut self, key: &str, nested: KeyedWriter) -> &mut Self {
        self.put(key, nested.finish())
    }

    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.map
    }
}

/// Body of a field-keyed query, `{ "<field>": <scalar or object> }`, after the
/// field name has been picked.
#[derive(Debug, Clone, Copy)]
pub enum FieldBody<'a> {
    /// Abbreviated form: the primary value given directly.
    Short(&'a Value),
    /// Full form: an object of options.
    Expanded(KeyedReader<'a>),
}

impl<'a> FieldBody<'a> {
    /// The abbreviated value as text.
    pub fn short_text(value: &'a Value, type_name: &'static str) -> Result<String> {
        scalar_to_string(value)
            .ok_or_else(|| QueryDslError::type_mismatch(type_name, "<field value>", "a scalar"))
    }

    /// The abbreviated value as written, for kinds that accept numeric and
    /// boolean terms.
    pub fn short_scalar(value: &'a Value, type_name: &'static str) -> Result<Value> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value.clone()),
            _ => Err(QueryDslError::type_mismatch(type_name, "<field value>", "a scalar")),
        }
    }
}

/// Pick the single field key of a field-keyed body.
pub fn decode_field_keyed<'a>(
    type_name: &'static str,
    body: &'a Value,
) -> Result<(String, FieldBody<'a>)> {
    let reader = KeyedReader::new(type_name, body)?;
    let (field, value) = reader.single_entry()?;
    let body = match value {
        Value::Object(_) => FieldBody::Expanded(KeyedReader::new(type_name, value)?),
        _ => FieldBody::Short(value),
    };
    Ok((field.to_string(), body))
}

/// Decode the single `{ tag: body }` entry of a discriminated document,
/// checking the tag against the one the caller expects.
pub fn decode_named<'a>(
    type_name: &'static str,
    expected_tag: &str,
    value: &'a Value,
) -> Result<&'a Value> {
    let reader = KeyedReader::new(type_name, value)?;
    let (tag, body) = reader.single_entry()?;
    if tag != expected_tag {
        return Err(QueryDslError::variant_mismatch(expected_tag, tag));
    }
    Ok(body)
}

/// Defines a closed set of string constants used on the wire.
///
/// The generated enum parses with [`FromStr`] (failing with an
/// unrecognized-variant error naming `$kind`), prints with `Display` and
/// serializes as its wire string.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All values in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire string of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::QueryDslError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => Err($crate::error::QueryDslError::unrecognized($kind, other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for serde_json::Value {
            fn from(value: $name) -> Self {
                serde_json::Value::String(value.as_str().to_string())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let text = <String as serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use wire_enum;

/// Implements serde's traits for a [`JsonCodec`] type by going through
/// `serde_json::Value`.
macro_rules! serde_via_codec {
    ($($t:ty),+ $(,)?) => {
        $(
            impl serde::Serialize for $t {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                    serde::Serialize::serialize(&$crate::codec::JsonCodec::to_json(self), serializer)
                }
            }

            impl<'de> serde::Deserialize<'de> for $t {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                    let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                    <$t as $crate::codec::JsonCodec>::from_json(&value).map_err(serde::de::Error::custom)
                }
            }
        )+
    };
}

pub(crate) use serde_via_codec;

/// Assert helper for decode failures in tests: the error must be a key-count
/// mismatch with the given expectation.
#[cfg(test)]
pub(crate) fn assert_key_count<T: Debug>(result: Result<T>, expected: usize, found: usize) {
    match result {
        Err(QueryDslError::KeyCountMismatch {
            expected: e,
            found: f,
            description,
            ..
        }) => {
            assert_eq!((e, f), (expected, found));
            assert_eq!(
                description,
                format!("Unable to find field name in key(s) expect: {expected} key found: {found}.")
            );
        }
        other => panic!("Expected key count mismatch, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_entry_rejects_extra_keys() {
        let doc = json!({"message": "this is a test", "invalid_key": "random"});
        let reader = KeyedReader::new("MatchQuery", &doc).unwrap();

        assert_key_count(reader.single_entry(), 1, 2);
    }

    #[test]
    fn test_entry_excluding_known_siblings() {
        let doc = json!({"text": "tring out", "term": {"field": "message"}});
        let reader = KeyedReader::new("Suggestion", &doc).unwrap();

        let (key, body) = reader.entry_excluding(&["text", "prefix", "regex"]).unwrap();
        assert_eq!(key, "term");
        assert_eq!(body, &json!({"field": "message"}));

        let doc = json!({"text": "x"});
        let reader = KeyedReader::new("Suggestion", &doc).unwrap();
        assert_key_count(reader.entry_excluding(&["text"]), 1, 0);
    }

    #[test]
    fn test_decimal_round_trip_is_base_ten() {
        let decimal = 0.3f64.into_decimal();
        assert_eq!(decimal, BigDecimal::from_str("0.3").unwrap());
        assert_eq!(decimal_to_json(&decimal), json!(0.3));

        let decoded = decimal_from_json(&json!(0.1)).unwrap();
        assert_eq!(decoded, BigDecimal::from_str("0.1").unwrap());

        assert_eq!(decimal_to_json(&BigDecimal::from(10)), json!(10));
        assert_eq!(f64::NAN.into_decimal(), BigDecimal::from(0));
    }

    #[test]
    fn test_decimal_keeps_every_digit() {
        let precise = BigDecimal::from_str("0.12345678901234567891").unwrap();
        let encoded = decimal_to_json(&precise);
        assert_eq!(serde_json::to_string(&encoded).unwrap(), "0.12345678901234567891");
        assert_eq!(decimal_from_json(&encoded).unwrap(), precise);

        let huge = BigDecimal::from_str("123456789012345678901234567890").unwrap();
        let encoded = decimal_to_json(&huge);
        assert!(encoded.is_number());
        assert_eq!(serde_json::to_string(&encoded).unwrap(), "123456789012345678901234567890");
        assert_eq!(decimal_from_json(&encoded).unwrap(), huge);

        let parsed: Value = serde_json::from_str("1.000000000000000000001").unwrap();
        assert_eq!(
            decimal_from_json(&parsed).unwrap(),
            BigDecimal::from_str("1.000000000000000000001").unwrap()
        );
    }

    #[test]
    fn test_writer_keeps_insertion_order() {
        let mut writer = KeyedWriter::new();
        writer
            .put("query", "brown fox")
            .put_opt::<&str>("analyzer", None)
            .put("type", "best_fields")
            .put_decimal("tie_breaker", &0.3f64.into_decimal());

        let value = writer.finish();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["query", "type", "tie_breaker"]);
    }

    #[test]
    fn test_reader_typed_getters() {
        let doc = json!({
            "size": 5,
            "flag": true,
            "fields": ["a", "b"],
            "single": "c",
            "nothing": null
        });
        let reader = KeyedReader::new("Test", &doc).unwrap();

        assert_eq!(reader.u32_opt("size").unwrap(), Some(5));
        assert_eq!(reader.bool_opt("flag").unwrap(), Some(true));
        assert_eq!(reader.strings_opt("fields").unwrap(), Some(vec!["a".into(), "b".into()]));
        assert_eq!(reader.strings_opt("single").unwrap(), Some(vec!["c".into()]));
        assert_eq!(reader.string_opt("nothing").unwrap(), None);
        assert!(matches!(
            reader.string("size"),
            Err(QueryDslError::TypeMismatch { .. })
        ));
        assert!(matches!(
            reader.string("missing"),
            Err(QueryDslError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_decode_named_checks_tag() {
        let doc = json!({"term": {"user": "kimchy"}});
        assert!(decode_named("MatchQuery", "term", &doc).is_ok());
        assert!(matches!(
            decode_named("MatchQuery", "match", &doc),
            Err(QueryDslError::VariantMismatch { .. })
        ));
    }
}
