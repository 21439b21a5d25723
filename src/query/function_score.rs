//! `function_score` query and its score functions.
//!
//! Each entry of `functions` is an object holding an optional `filter`, an
//! optional `weight` and at most one function keyed by its type:
//!
//! ```json
//! { "filter": { "match": { "test": "bar" } }, "random_score": {}, "weight": 23 }
//! ```
//!
//! An entry with only `weight` is a weight function.

use bigdecimal::BigDecimal;
use serde_json::{Map, Value};

use crate::codec::{IntoDecimal, JsonCodec, KeyedReader, KeyedWriter, serde_via_codec, wire_enum};
use crate::error::{QueryDslError, Result};
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::Script;
use crate::query::{Query, QueryType, QueryVariant, decode_query};

wire_enum! {
    /// Discriminator of a score function.
    pub enum ScoreFunctionType("score function") {
        Weight => "weight",
        RandomScore => "random_score",
        ScriptScore => "script_score",
        FieldValueFactor => "field_value_factor",
        Gauss => "gauss",
        Exp => "exp",
        Linear => "linear",
    }
}

impl ScoreFunctionType {
    /// Whether this is one of the distance decay functions.
    pub fn is_decay(&self) -> bool {
        matches!(
            self,
            ScoreFunctionType::Gauss | ScoreFunctionType::Exp | ScoreFunctionType::Linear
        )
    }
}

wire_enum! {
    /// How the scores of the individual functions are combined.
    pub enum FunctionScoreMode("score_mode") {
        Multiply => "multiply",
        Sum => "sum",
        Avg => "avg",
        First => "first",
        Max => "max",
        Min => "min",
    }
}

wire_enum! {
    /// How the combined function score is merged with the query score.
    pub enum BoostMode("boost_mode") {
        Multiply => "multiply",
        Replace => "replace",
        Sum => "sum",
        Avg => "avg",
        Max => "max",
        Min => "min",
    }
}

wire_enum! {
    /// Function applied to a field value before it becomes a score.
    pub enum FieldValueFactorModifier("field_value_factor modifier") {
        None => "none",
        Log => "log",
        Log1p => "log1p",
        Log2p => "log2p",
        Ln => "ln",
        Ln1p => "ln1p",
        Ln2p => "ln2p",
        Square => "square",
        Sqrt => "sqrt",
        Reciprocal => "reciprocal",
    }
}

wire_enum! {
    /// Which value of a multi-valued field a decay function uses.
    pub enum MultiValueMode("multi_value_mode") {
        Min => "min",
        Max => "max",
        Avg => "avg",
        Sum => "sum",
    }
}

const COMMON_KEYS: [&str; 2] = ["filter", "weight"];

/// A constant score multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightFunction {
    pub weight: BigDecimal,
    pub filter: Option<Query>,
}

impl WeightFunction {
    pub fn new(weight: impl IntoDecimal) -> Self {
        WeightFunction {
            weight: weight.into_decimal(),
            filter: None,
        }
    }
}

/// Uniformly distributed random scores, reproducible with `seed` and `field`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RandomScoreFunction {
    pub seed: Option<i64>,
    pub field: Option<String>,
    pub filter: Option<Query>,
    pub weight: Option<BigDecimal>,
}

impl RandomScoreFunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: i64, field: impl Into<String>) -> Self {
        self.seed = Some(seed);
        self.field = Some(field.into());
        self
    }
}

/// Scores documents with a script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptScoreFunction {
    pub script: Script,
    pub filter: Option<Query>,
    pub weight: Option<BigDecimal>,
}

impl ScriptScoreFunction {
    pub fn new<S: Into<Script>>(script: S) -> Self {
        ScriptScoreFunction {
            script: script.into(),
            filter: None,
            weight: None,
        }
    }
}

/// Scores documents by a numeric field, optionally scaled and modified.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValueFactorFunction {
    pub field: String,
    pub factor: Option<BigDecimal>,
    pub modifier: Option<FieldValueFactorModifier>,
    /// Value used for documents missing the field.
    pub missing: Option<BigDecimal>,
    pub filter: Option<Query>,
    pub weight: Option<BigDecimal>,
}

impl FieldValueFactorFunction {
    pub fn builder() -> FieldValueFactorFunctionBuilder {
        FieldValueFactorFunctionBuilder::new()
    }
}

/// Builder for [`FieldValueFactorFunction`]. Requires `field`.
#[derive(Debug, Default)]
pub struct FieldValueFactorFunctionBuilder {
    field: Option<String>,
    factor: Option<BigDecimal>,
    modifier: Option<FieldValueFactorModifier>,
    missing: Option<BigDecimal>,
    filter: Option<Query>,
    weight: Option<BigDecimal>,
}

impl FieldValueFactorFunctionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        modifier: FieldValueFactorModifier,
        /// Restrict the function to documents matching this query.
        filter: Query,
    }

    decimal_setters! {
        factor,
        missing,
        weight,
    }
}

impl Builder for FieldValueFactorFunctionBuilder {
    type Output = FieldValueFactorFunction;

    fn build(self) -> Result<FieldValueFactorFunction> {
        Ok(FieldValueFactorFunction {
            field: required!(self.field),
            factor: self.factor,
            modifier: self.modifier,
            missing: self.missing,
            filter: self.filter,
            weight: self.weight,
        })
    }
}

/// Scores documents by the distance of a field value from `origin`, with a
/// `gauss`, `exp` or `linear` curve.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayFunction {
    pub function_type: ScoreFunctionType,
    pub field: String,
    /// Numbers, dates or geo points, as written on the wire.
    pub origin: Option<Value>,
    pub scale: Value,
    pub offset: Option<Value>,
    pub decay: Option<BigDecimal>,
    pub multi_value_mode: Option<MultiValueMode>,
    pub filter: Option<Query>,
    pub weight: Option<BigDecimal>,
}

impl DecayFunction {
    pub fn gauss() -> DecayFunctionBuilder {
        DecayFunctionBuilder::new(ScoreFunctionType::Gauss)
    }

    pub fn exp() -> DecayFunctionBuilder {
        DecayFunctionBuilder::new(ScoreFunctionType::Exp)
    }

    pub fn linear() -> DecayFunctionBuilder {
        DecayFunctionBuilder::new(ScoreFunctionType::Linear)
    }

    fn encode_params(&self) -> Value {
        let mut params = KeyedWriter::new();
        params
            .put_opt("origin", self.origin.clone())
            .put("scale", self.scale.clone())
            .put_opt("offset", self.offset.clone())
            .put_decimal_opt("decay", self.decay.as_ref());
        let mut writer = KeyedWriter::new();
        writer
            .put_writer(&self.field, params)
            .put_opt("multi_value_mode", self.multi_value_mode);
        writer.finish()
    }

    fn decode_params(
        function_type: ScoreFunctionType,
        body: &Value,
        filter: Option<Query>,
        weight: Option<BigDecimal>,
    ) -> Result<Self> {
        let reader = KeyedReader::new("DecayFunction", body)?;
        let (field, _) = reader.entry_excluding(&["multi_value_mode"])?;
        let params = reader.nested(field)?;
        Ok(DecayFunction {
            function_type,
            field: field.to_string(),
            origin: params.value_opt("origin").cloned(),
            scale: params.value("scale")?.clone(),
            offset: params.value_opt("offset").cloned(),
            decay: params.decimal_opt("decay")?,
            multi_value_mode: reader.parse_opt("multi_value_mode")?,
            filter,
            weight,
        })
    }
}

/// Builder for [`DecayFunction`]. Requires `field`, then `scale`.
#[derive(Debug)]
pub struct DecayFunctionBuilder {
    function_type: ScoreFunctionType,
    field: Option<String>,
    origin: Option<Value>,
    scale: Option<Value>,
    offset: Option<Value>,
    decay: Option<BigDecimal>,
    multi_value_mode: Option<MultiValueMode>,
    filter: Option<Query>,
    weight: Option<BigDecimal>,
}

impl DecayFunctionBuilder {
    pub fn new(function_type: ScoreFunctionType) -> Self {
        DecayFunctionBuilder {
            function_type,
            field: None,
            origin: None,
            scale: None,
            offset: None,
            decay: None,
            multi_value_mode: None,
            filter: None,
            weight: None,
        }
    }

    setters! {
        field: String,
        /// Point of highest score.
        origin: Value,
        /// Distance from `origin + offset` at which the score equals `decay`.
        scale: Value,
        offset: Value,
        multi_value_mode: MultiValueMode,
        filter: Query,
    }

    decimal_setters! {
        decay,
        weight,
    }
}

impl Builder for DecayFunctionBuilder {
    type Output = DecayFunction;

    fn build(self) -> Result<DecayFunction> {
        if !self.function_type.is_decay() {
            return Err(QueryDslError::invalid_field(
                "function_type",
                format!("{} is not a decay function", self.function_type),
            ));
        }
        let field = required!(self.field);
        let scale = required!(self.scale);
        Ok(DecayFunction {
            function_type: self.function_type,
            field,
            origin: self.origin,
            scale,
            offset: self.offset,
            decay: self.decay,
            multi_value_mode: self.multi_value_mode,
            filter: self.filter,
            weight: self.weight,
        })
    }
}

/// Any score function.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreFunction {
    Weight(WeightFunction),
    RandomScore(RandomScoreFunction),
    ScriptScore(ScriptScoreFunction),
    FieldValueFactor(FieldValueFactorFunction),
    Decay(DecayFunction),
}

impl ScoreFunction {
    pub fn function_type(&self) -> ScoreFunctionType {
        match self {
            ScoreFunction::Weight(_) => ScoreFunctionType::Weight,
            ScoreFunction::RandomScore(_) => ScoreFunctionType::RandomScore,
            ScoreFunction::ScriptScore(_) => ScoreFunctionType::ScriptScore,
            ScoreFunction::FieldValueFactor(_) => ScoreFunctionType::FieldValueFactor,
            ScoreFunction::Decay(f) => f.function_type,
        }
    }

    pub fn filter(&self) -> Option<&Query> {
        match self {
            ScoreFunction::Weight(f) => f.filter.as_ref(),
            ScoreFunction::RandomScore(f) => f.filter.as_ref(),
            ScoreFunction::ScriptScore(f) => f.filter.as_ref(),
            ScoreFunction::FieldValueFactor(f) => f.filter.as_ref(),
            ScoreFunction::Decay(f) => f.filter.as_ref(),
        }
    }

    pub fn weight(&self) -> Option<&BigDecimal> {
        match self {
            ScoreFunction::Weight(f) => Some(&f.weight),
            ScoreFunction::RandomScore(f) => f.weight.as_ref(),
            ScoreFunction::ScriptScore(f) => f.weight.as_ref(),
            ScoreFunction::FieldValueFactor(f) => f.weight.as_ref(),
            ScoreFunction::Decay(f) => f.weight.as_ref(),
        }
    }

    /// The `{ "<type>": body }` part, absent for weight functions.
    fn encode_function(&self) -> Option<Value> {
        let body = match self {
            ScoreFunction::Weight(_) => return None,
            ScoreFunction::RandomScore(f) => {
                let mut writer = KeyedWriter::new();
                writer
                    .put_opt("seed", f.seed)
                    .put_opt("field", f.field.as_deref());
                writer.finish()
            }
            ScoreFunction::ScriptScore(f) => {
                let mut writer = KeyedWriter::new();
                writer.put_codec("script", &f.script);
                writer.finish()
            }
            ScoreFunction::FieldValueFactor(f) => {
                let mut writer = KeyedWriter::new();
                writer
                    .put("field", f.field.as_str())
                    .put_decimal_opt("factor", f.factor.as_ref())
                    .put_opt("modifier", f.modifier)
                    .put_decimal_opt("missing", f.missing.as_ref());
                writer.finish()
            }
            ScoreFunction::Decay(f) => f.encode_params(),
        };
        Some(body)
    }
}

impl JsonCodec for ScoreFunction {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer.put_codec_opt("filter", self.filter());
        if let Some(body) = self.encode_function() {
            writer.put(self.function_type().as_str(), body);
        }
        writer.put_decimal_opt("weight", self.weight());
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("ScoreFunction", value)?;
        let filter = reader.decode_opt("filter", decode_query)?;
        let weight = reader.decimal_opt("weight")?;

        if reader.keys().all(|key| COMMON_KEYS.contains(&key)) {
            let weight = weight.ok_or_else(|| QueryDslError::key_not_found("ScoreFunction", "weight"))?;
            return Ok(ScoreFunction::Weight(WeightFunction { weight, filter }));
        }

        let (tag, body) = reader.entry_excluding(&COMMON_KEYS)?;
        let function_type: ScoreFunctionType = tag.parse()?;
        let function = match function_type {
            ScoreFunctionType::Weight => {
                return Err(QueryDslError::invalid_value(
                    "ScoreFunction",
                    "weight cannot carry a function body",
                ));
            }
            ScoreFunctionType::RandomScore => {
                let body = KeyedReader::new("RandomScoreFunction", body)?;
                ScoreFunction::RandomScore(RandomScoreFunction {
                    seed: body.i64_opt("seed")?,
                    field: body.string_opt("field")?,
                    filter,
                    weight,
                })
            }
            ScoreFunctionType::ScriptScore => {
                let body = KeyedReader::new("ScriptScoreFunction", body)?;
                ScoreFunction::ScriptScore(ScriptScoreFunction {
                    script: body.decode("script", Script::from_json)?,
                    filter,
                    weight,
                })
            }
            ScoreFunctionType::FieldValueFactor => {
                let body = KeyedReader::new("FieldValueFactorFunction", body)?;
                ScoreFunction::FieldValueFactor(FieldValueFactorFunction {
                    field: body.string("field")?,
                    factor: body.decimal_opt("factor")?,
                    modifier: body.parse_opt("modifier")?,
                    missing: body.decimal_opt("missing")?,
                    filter,
                    weight,
                })
            }
            ScoreFunctionType::Gauss | ScoreFunctionType::Exp | ScoreFunctionType::Linear => {
                ScoreFunction::Decay(DecayFunction::decode_params(
                    function_type,
                    body,
                    filter,
                    weight,
                )?)
            }
        };
        Ok(function)
    }
}

serde_via_codec!(ScoreFunction);

impl From<WeightFunction> for ScoreFunction {
    fn from(f: WeightFunction) -> Self {
        ScoreFunction::Weight(f)
    }
}

impl From<RandomScoreFunction> for ScoreFunction {
    fn from(f: RandomScoreFunction) -> Self {
        ScoreFunction::RandomScore(f)
    }
}

impl From<ScriptScoreFunction> for ScoreFunction {
    fn from(f: ScriptScoreFunction) -> Self {
        ScoreFunction::ScriptScore(f)
    }
}

impl From<FieldValueFactorFunction> for ScoreFunction {
    fn from(f: FieldValueFactorFunction) -> Self {
        ScoreFunction::FieldValueFactor(f)
    }
}

impl From<DecayFunction> for ScoreFunction {
    fn from(f: DecayFunction) -> Self {
        ScoreFunction::Decay(f)
    }
}

/// Modifies the score of the documents matched by `query` with one or more
/// functions.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionScoreQuery {
    pub query: Option<Box<Query>>,
    pub functions: Vec<ScoreFunction>,
    pub score_mode: Option<FunctionScoreMode>,
    pub boost_mode: Option<BoostMode>,
    pub max_boost: Option<BigDecimal>,
    pub min_score: Option<BigDecimal>,
    pub boost: Option<BigDecimal>,
}

impl FunctionScoreQuery {
    pub fn builder() -> FunctionScoreQueryBuilder {
        FunctionScoreQueryBuilder::new()
    }
}

const FUNCTION_KEYS: [&str; 7] = [
    "weight",
    "random_score",
    "script_score",
    "field_value_factor",
    "gauss",
    "exp",
    "linear",
];

impl QueryVariant for FunctionScoreQuery {
    const QUERY_TYPE: QueryType = QueryType::FunctionScore;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec_opt("query", self.query.as_deref())
            .put_codec_list("functions", &self.functions)
            .put_opt("score_mode", self.score_mode)
            .put_opt("boost_mode", self.boost_mode)
            .put_decimal_opt("max_boost", self.max_boost.as_ref())
            .put_decimal_opt("min_score", self.min_score.as_ref())
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("FunctionScoreQuery", body)?;
        let functions = match reader.list_opt("functions", ScoreFunction::from_json)? {
            Some(functions) => functions,
            None => {
                // a single function may sit directly in the body
                let inline: Map<String, Value> = reader
                    .entries()
                    .filter(|(key, _)| FUNCTION_KEYS.contains(key))
                    .map(|(key, value)| (key.to_string(), value.clone()))
                    .collect();
                if inline.is_empty() {
                    Vec::new()
                } else {
                    vec![ScoreFunction::from_json(&Value::Object(inline))?]
                }
            }
        };
        if functions.is_empty() {
            return Err(QueryDslError::missing_field("functions"));
        }
        Ok(FunctionScoreQuery {
            query: reader.decode_opt("query", decode_query)?.map(Box::new),
            functions,
            score_mode: reader.parse_opt("score_mode")?,
            boost_mode: reader.parse_opt("boost_mode")?,
            max_boost: reader.decimal_opt("max_boost")?,
            min_score: reader.decimal_opt("min_score")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`FunctionScoreQuery`]. Requires at least one function.
#[derive(Debug, Default)]
pub struct FunctionScoreQueryBuilder {
    query: Option<Query>,
    functions: Vec<ScoreFunction>,
    score_mode: Option<FunctionScoreMode>,
    boost_mode: Option<BoostMode>,
    max_boost: Option<BigDecimal>,
    min_score: Option<BigDecimal>,
    boost: Option<BigDecimal>,
}

impl FunctionScoreQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Set the query whose matches are rescored.
        query: Query,
        score_mode: FunctionScoreMode,
        boost_mode: BoostMode,
    }

    /// Append a score function.
    pub fn function<F: Into<ScoreFunction>>(mut self, function: F) -> Self {
        self.functions.push(function.into());
        self
    }

    decimal_setters! {
        max_boost,
        min_score,
        boost,
    }
}

impl Builder for FunctionScoreQueryBuilder {
    type Output = FunctionScoreQuery;

    fn build(self) -> Result<FunctionScoreQuery> {
        if self.functions.is_empty() {
            return Err(QueryDslError::missing_field("functions"));
        }
        Ok(FunctionScoreQuery {
            query: self.query.map(Box::new),
            functions: self.functions,
            score_mode: self.score_mode,
            boost_mode: self.boost_mode,
            max_boost: self.max_boost,
            min_score: self.min_score,
            boost: self.boost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MatchAllQuery, MatchQuery, TermQuery};
    use serde_json::json;

    #[test]
    fn test_function_score_query() {
        let query = FunctionScoreQuery::builder()
            .query(MatchAllQuery::new())
            .function(WeightFunction {
                weight: 23.into(),
                filter: Some(MatchQuery::new("test", "bar").into()),
            })
            .function(RandomScoreFunction {
                filter: Some(MatchQuery::new("test", "cat").into()),
                weight: Some(42.into()),
                ..RandomScoreFunction::new()
            })
            .max_boost(42)
            .score_mode(FunctionScoreMode::Max)
            .boost_mode(BoostMode::Multiply)
            .min_score(42)
            .boost(5)
            .build()
            .unwrap();

        let expected = json!({
            "function_score": {
                "query": {"match_all": {}},
                "functions": [
                    {"filter": {"match": {"test": "bar"}}, "weight": 23},
                    {"filter": {"match": {"test": "cat"}}, "random_score": {}, "weight": 42}
                ],
                "score_mode": "max",
                "boost_mode": "multiply",
                "max_boost": 42,
                "min_score": 42,
                "boost": 5
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(FunctionScoreQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_decay_function() {
        let function = DecayFunction::gauss()
            .field("date")
            .origin("2013-09-17")
            .scale("10d")
            .offset("5d")
            .decay(0.5)
            .multi_value_mode(MultiValueMode::Avg)
            .build()
            .unwrap();

        let expected = json!({
            "gauss": {
                "date": {"origin": "2013-09-17", "scale": "10d", "offset": "5d", "decay": 0.5},
                "multi_value_mode": "avg"
            }
        });
        let function = ScoreFunction::from(function);
        assert_eq!(function.to_json(), expected);
        assert_eq!(ScoreFunction::from_json(&expected).unwrap(), function);
        assert_eq!(function.function_type(), ScoreFunctionType::Gauss);
    }

    #[test]
    fn test_decay_function_requires_scale() {
        let err = DecayFunction::linear().field("price").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "scale"));

        let err = DecayFunctionBuilder::new(ScoreFunctionType::Weight)
            .field("price")
            .scale(10)
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { .. }));
    }

    #[test]
    fn test_field_value_factor_function() {
        let function = FieldValueFactorFunction::builder()
            .field("likes")
            .factor(1.2)
            .modifier(FieldValueFactorModifier::Sqrt)
            .missing(1)
            .build()
            .unwrap();

        let expected = json!({
            "field_value_factor": {"field": "likes", "factor": 1.2, "modifier": "sqrt", "missing": 1}
        });
        let function = ScoreFunction::from(function);
        assert_eq!(function.to_json(), expected);
        assert_eq!(ScoreFunction::from_json(&expected).unwrap(), function);
    }

    #[test]
    fn test_script_score_function() {
        let function: ScoreFunction = ScriptScoreFunction::new(
            Script::new("Math.log(2 + doc['likes'].value)"),
        )
        .into();
        let expected = json!({"script_score": {"script": "Math.log(2 + doc['likes'].value)"}});
        assert_eq!(function.to_json(), expected);
        assert_eq!(ScoreFunction::from_json(&expected).unwrap(), function);
    }

    #[test]
    fn test_single_inline_function() {
        let doc = json!({
            "function_score": {
                "query": {"term": {"user": "kimchy"}},
                "random_score": {"seed": 10, "field": "_seq_no"},
                "boost_mode": "multiply"
            }
        });

        let query = FunctionScoreQuery::from_json(&doc).unwrap();
        assert_eq!(query.query.as_deref(), Some(&Query::from(TermQuery::new("user", "kimchy"))));
        assert_eq!(
            query.functions,
            vec![ScoreFunction::RandomScore(RandomScoreFunction::new().with_seed(10, "_seq_no"))]
        );
    }

    #[test]
    fn test_function_score_requires_functions() {
        let err = FunctionScoreQuery::builder()
            .query(MatchAllQuery::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "functions"));
    }

    #[test]
    fn test_unknown_function_type() {
        assert!(ScoreFunction::from_json(&json!({"gauss": {}})).is_err());

        match ScoreFunction::from_json(&json!({"bogus_score": {}})) {
            Err(QueryDslError::UnrecognizedVariant { kind, .. }) => {
                assert_eq!(kind, "score function")
            }
            other => panic!("Expected unrecognized variant, got {other:?}"),
        }
    }
}
