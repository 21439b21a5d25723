//! Value types shared by several query kinds.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter, scalar_to_string, serde_via_codec, wire_enum};
use crate::error::{QueryDslError, Result};

wire_enum! {
    /// Boolean operator used to combine analyzed terms.
    pub enum Operator("operator") {
        And => "and",
        Or => "or",
    }
}

wire_enum! {
    /// What a full-text query matches when the analyzer removes every token.
    pub enum ZeroTermsQuery("zero_terms_query") {
        None => "none",
        All => "all",
    }
}

wire_enum! {
    /// Execution strategy of a `multi_match` query.
    pub enum MultiMatchType("multi_match type") {
        BestFields => "best_fields",
        MostFields => "most_fields",
        CrossFields => "cross_fields",
        Phrase => "phrase",
        PhrasePrefix => "phrase_prefix",
        BoolPrefix => "bool_prefix",
    }
}

wire_enum! {
    /// How a range query matches range-typed fields.
    pub enum RangeRelation("range relation") {
        Intersects => "INTERSECTS",
        Contains => "CONTAINS",
        Within => "WITHIN",
    }
}

wire_enum! {
    /// How child or nested hit scores roll up into the parent score.
    pub enum ScoreMode("score_mode") {
        None => "none",
        Avg => "avg",
        Sum => "sum",
        Max => "max",
        Min => "min",
    }
}

wire_enum! {
    /// Rewrite method for multi-term queries.
    pub enum RewriteMethod("rewrite") {
        ConstantScore => "constant_score",
        ScoringBoolean => "scoring_boolean",
        ConstantScoreBoolean => "constant_score_boolean",
        TopTermsN => "top_terms_N",
        TopTermsBoostN => "top_terms_boost_N",
        TopTermsBlendedFreqsN => "top_terms_blended_freqs_N",
    }
}

/// Maximum edit distance of a fuzzy match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fuzziness {
    /// `AUTO`: edit distance derived from term length.
    Auto,
    /// `AUTO:low,high` with explicit length thresholds.
    AutoRange(u32, u32),
    /// A fixed number of edits.
    Edits(u32),
}

impl FromStr for Fuzziness {
    type Err = QueryDslError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || QueryDslError::invalid_value("Fuzziness", format!("invalid fuzziness {s}"));
        if s == "AUTO" {
            return Ok(Fuzziness::Auto);
        }
        if let Some(range) = s.strip_prefix("AUTO:") {
            let (low, high) = range.split_once(',').ok_or_else(invalid)?;
            let low = low.trim().parse().map_err(|_| invalid())?;
            let high = high.trim().parse().map_err(|_| invalid())?;
            return Ok(Fuzziness::AutoRange(low, high));
        }
        s.parse().map(Fuzziness::Edits).map_err(|_| invalid())
    }
}

impl JsonCodec for Fuzziness {
    fn to_json(&self) -> Value {
        match self {
            Fuzziness::Auto => Value::from("AUTO"),
            Fuzziness::AutoRange(low, high) => Value::from(format!("AUTO:{low},{high}")),
            Fuzziness::Edits(edits) => Value::from(*edits),
        }
    }

    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(_) | Value::String(_) => scalar_to_string(value)
                .ok_or_else(|| QueryDslError::invalid_value("Fuzziness", "not a scalar"))?
                .parse(),
            _ => Err(QueryDslError::type_mismatch("Fuzziness", "fuzziness", "a string or number")),
        }
    }
}

impl From<u32> for Fuzziness {
    fn from(edits: u32) -> Self {
        Fuzziness::Edits(edits)
    }
}

/// `minimum_should_match`: either an absolute count or a textual expression
/// such as `"75%"` or `"3<90%"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinimumShouldMatch {
    Count(i64),
    Expression(String),
}

impl JsonCodec for MinimumShouldMatch {
    fn to_json(&self) -> Value {
        match self {
            MinimumShouldMatch::Count(count) => Value::from(*count),
            MinimumShouldMatch::Expression(expr) => Value::from(expr.as_str()),
        }
    }

    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(MinimumShouldMatch::Count).ok_or_else(|| {
                QueryDslError::type_mismatch("MinimumShouldMatch", "minimum_should_match", "an integer")
            }),
            Value::String(expr) => Ok(MinimumShouldMatch::Expression(expr.clone())),
            _ => Err(QueryDslError::type_mismatch(
                "MinimumShouldMatch",
                "minimum_should_match",
                "an integer or string",
            )),
        }
    }
}

impl From<i64> for MinimumShouldMatch {
    fn from(count: i64) -> Self {
        MinimumShouldMatch::Count(count)
    }
}

impl From<i32> for MinimumShouldMatch {
    fn from(count: i32) -> Self {
        MinimumShouldMatch::Count(count.into())
    }
}

impl From<&str> for MinimumShouldMatch {
    fn from(expr: &str) -> Self {
        MinimumShouldMatch::Expression(expr.to_string())
    }
}

impl From<String> for MinimumShouldMatch {
    fn from(expr: String) -> Self {
        MinimumShouldMatch::Expression(expr)
    }
}

/// An inline script. Encodes to a bare string when only the source is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub source: String,
    pub lang: Option<String>,
    pub params: Option<Map<String, Value>>,
}

impl Script {
    pub fn new<S: Into<String>>(source: S) -> Self {
        Script {
            source: source.into(),
            lang: None,
            params: None,
        }
    }

    /// Set the script language.
    pub fn lang<S: Into<String>>(mut self, lang: S) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Add a script parameter.
    pub fn param<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

impl JsonCodec for Script {
    fn to_json(&self) -> Value {
        if self.lang.is_none() && self.params.is_none() {
            return Value::from(self.source.as_str());
        }
        let mut writer = KeyedWriter::new();
        writer
            .put("source", self.source.as_str())
            .put_opt("lang", self.lang.as_deref())
            .put_opt("params", self.params.clone().map(Value::Object));
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        if let Value::String(source) = value {
            return Ok(Script::new(source.as_str()));
        }
        let reader = KeyedReader::new("Script", value)?;
        let params = match reader.value_opt("params") {
            None => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => return Err(QueryDslError::type_mismatch("Script", "params", "an object")),
        };
        Ok(Script {
            source: reader.string("source")?,
            lang: reader.string_opt("lang")?,
            params,
        })
    }
}

impl From<&str> for Script {
    fn from(source: &str) -> Self {
        Script::new(source)
    }
}

impl From<String> for Script {
    fn from(source: String) -> Self {
        Script::new(source)
    }
}

/// A geographical point with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographical point.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(QueryDslError::invalid_field(
                "lat",
                format!("invalid latitude: {lat} (must be between -90 and 90)"),
            ));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(QueryDslError::invalid_field(
                "lon",
                format!("invalid longitude: {lon} (must be between -180 and 180)"),
            ));
        }

        Ok(GeoPoint { lat, lon })
    }
}

impl JsonCodec for GeoPoint {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer.put("lat", self.lat).put("lon", self.lon);
        writer.finish()
    }

    /// Accepts `{"lat": .., "lon": ..}`, `[lon, lat]` and `"lat,lon"`.
    fn from_json(value: &Value) -> Result<Self> {
        let invalid = |message: &str| QueryDslError::invalid_value("GeoPoint", message);
        let (lat, lon) = match value {
            Value::Object(_) => {
                let reader = KeyedReader::new("GeoPoint", value)?;
                let lat = reader.f64_opt("lat")?.ok_or_else(|| QueryDslError::key_not_found("GeoPoint", "lat"))?;
                let lon = reader.f64_opt("lon")?.ok_or_else(|| QueryDslError::key_not_found("GeoPoint", "lon"))?;
                (lat, lon)
            }
            Value::Array(items) if items.len() == 2 => {
                let lon = items[0].as_f64().ok_or_else(|| invalid("longitude is not a number"))?;
                let lat = items[1].as_f64().ok_or_else(|| invalid("latitude is not a number"))?;
                (lat, lon)
            }
            Value::String(text) => {
                let (lat, lon) = text
                    .split_once(',')
                    .ok_or_else(|| invalid("expected \"lat,lon\""))?;
                let lat = lat.trim().parse().map_err(|_| invalid("latitude is not a number"))?;
                let lon = lon.trim().parse().map_err(|_| invalid("longitude is not a number"))?;
                (lat, lon)
            }
            _ => return Err(invalid("expected an object, [lon, lat] array or \"lat,lon\" string")),
        };
        GeoPoint::new(lat, lon).map_err(|e| invalid(&e.to_string()))
    }
}

/// Controls which parts of `_source` are returned for a hit.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFilter {
    /// Return the whole source (`true`) or nothing (`false`).
    Fetch(bool),
    /// A single field pattern.
    Field(String),
    /// Several field patterns.
    Fields(Vec<String>),
    /// Include and exclude patterns.
    Filter {
        includes: Vec<String>,
        excludes: Vec<String>,
    },
}

impl JsonCodec for SourceFilter {
    fn to_json(&self) -> Value {
        match self {
            SourceFilter::Fetch(fetch) => Value::from(*fetch),
            SourceFilter::Field(field) => Value::from(field.as_str()),
            SourceFilter::Fields(fields) => Value::from(fields.clone()),
            SourceFilter::Filter { includes, excludes } => {
                let mut writer = KeyedWriter::new();
                writer.put_strings("includes", includes).put_strings("excludes", excludes);
                writer.finish()
            }
        }
    }

    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(fetch) => Ok(SourceFilter::Fetch(*fetch)),
            Value::String(field) => Ok(SourceFilter::Field(field.clone())),
            Value::Array(_) => {
                let wrapped = serde_json::json!({ "fields": value });
                let reader = KeyedReader::new("SourceFilter", &wrapped)?;
                Ok(SourceFilter::Fields(reader.strings_opt("fields")?.unwrap_or_default()))
            }
            Value::Object(_) => {
                let reader = KeyedReader::new("SourceFilter", value)?;
                reader.reject_unknown(&["includes", "excludes"])?;
                Ok(SourceFilter::Filter {
                    includes: reader.strings_opt("includes")?.unwrap_or_default(),
                    excludes: reader.strings_opt("excludes")?.unwrap_or_default(),
                })
            }
            _ => Err(QueryDslError::type_mismatch(
                "SourceFilter",
                "_source",
                "a boolean, string, list or object",
            )),
        }
    }
}

impl From<bool> for SourceFilter {
    fn from(fetch: bool) -> Self {
        SourceFilter::Fetch(fetch)
    }
}

impl From<&str> for SourceFilter {
    fn from(field: &str) -> Self {
        SourceFilter::Field(field.to_string())
    }
}

serde_via_codec!(Fuzziness, MinimumShouldMatch, Script, GeoPoint, SourceFilter);
