//! Completion suggester: prefix lookups against a `completion` field.

use serde_json::Value;

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter, serde_via_codec, wire_enum};
use crate::error::Result;
use crate::query::builder::{Builder, required, setters};
use crate::query::types::Fuzziness;
use crate::suggest::Envelope;

wire_enum! {
    /// Operators enabled in a completion regex.
    pub enum RegexFlag("regex flag") {
        All => "ALL",
        AnyString => "ANYSTRING",
        Complement => "COMPLEMENT",
        Empty => "EMPTY",
        Intersection => "INTERSECTION",
        Interval => "INTERVAL",
        None => "NONE",
    }
}

/// Fuzzy prefix matching options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuzzyOptions {
    pub fuzziness: Option<Fuzziness>,
    pub transpositions: Option<bool>,
    pub min_length: Option<u32>,
    pub prefix_length: Option<u32>,
    pub unicode_aware: Option<bool>,
    pub max_determinized_states: Option<u32>,
}

impl FuzzyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fuzziness<F: Into<Fuzziness>>(mut self, fuzziness: F) -> Self {
        self.fuzziness = Some(fuzziness.into());
        self
    }

    pub fn transpositions(mut self, transpositions: bool) -> Self {
        self.transpositions = Some(transpositions);
        self
    }

    pub fn min_length(mut self, min_length: u32) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = Some(prefix_length);
        self
    }

    pub fn unicode_aware(mut self, unicode_aware: bool) -> Self {
        self.unicode_aware = Some(unicode_aware);
        self
    }
}

impl JsonCodec for FuzzyOptions {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec_opt("fuzziness", self.fuzziness.as_ref())
            .put_opt("transpositions", self.transpositions)
            .put_opt("min_length", self.min_length)
            .put_opt("prefix_length", self.prefix_length)
            .put_opt("unicode_aware", self.unicode_aware)
            .put_opt("max_determinized_states", self.max_determinized_states);
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("FuzzyOptions", value)?;
        Ok(FuzzyOptions {
            fuzziness: reader.decode_opt("fuzziness", Fuzziness::from_json)?,
            transpositions: reader.bool_opt("transpositions")?,
            min_length: reader.u32_opt("min_length")?,
            prefix_length: reader.u32_opt("prefix_length")?,
            unicode_aware: reader.bool_opt("unicode_aware")?,
            max_determinized_states: reader.u32_opt("max_determinized_states")?,
        })
    }
}

/// Options for the sibling `regex` pattern.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegexOptions {
    pub flags: Option<RegexFlag>,
    pub max_determinized_states: Option<u32>,
}

impl RegexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(mut self, flags: RegexFlag) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn max_determinized_states(mut self, states: u32) -> Self {
        self.max_determinized_states = Some(states);
        self
    }
}

impl JsonCodec for RegexOptions {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_opt("flags", self.flags)
            .put_opt("max_determinized_states", self.max_determinized_states);
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("RegexOptions", value)?;
        Ok(RegexOptions {
            flags: reader.parse_opt("flags")?,
            max_determinized_states: reader.u32_opt("max_determinized_states")?,
        })
    }
}

serde_via_codec!(FuzzyOptions, RegexOptions);

/// A completion suggestion.
///
/// The `regex` pattern is a sibling of the `completion` key, while its
/// options live under `regex` inside the `completion` object.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSuggestion {
    pub field: String,
    pub text: Option<String>,
    pub prefix: Option<String>,
    pub regex: Option<String>,
    pub analyzer: Option<String>,
    pub size: Option<u32>,
    pub shard_size: Option<u32>,
    pub skip_duplicates: Option<bool>,
    pub fuzzy_options: Option<FuzzyOptions>,
    pub regex_options: Option<RegexOptions>,
}

impl CompletionSuggestion {
    pub fn builder() -> CompletionSuggestionBuilder {
        CompletionSuggestionBuilder::new()
    }

    pub(crate) fn encode_options(&self) -> KeyedWriter {
        let mut writer = KeyedWriter::new();
        writer
            .put("field", self.field.as_str())
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_opt("size", self.size)
            .put_opt("shard_size", self.shard_size)
            .put_opt("skip_duplicates", self.skip_duplicates)
            .put_codec_opt("fuzzy", self.fuzzy_options.as_ref())
            .put_codec_opt("regex", self.regex_options.as_ref());
        writer
    }

    pub(crate) fn from_envelope(envelope: Envelope<'_>) -> Result<Self> {
        let body = envelope.body;
        Ok(CompletionSuggestion {
            field: body.string("field")?,
            text: envelope.text,
            prefix: envelope.prefix,
            regex: envelope.regex,
            analyzer: body.string_opt("analyzer")?,
            size: body.u32_opt("size")?,
            shard_size: body.u32_opt("shard_size")?,
            skip_duplicates: body.bool_opt("skip_duplicates")?,
            fuzzy_options: body.decode_opt("fuzzy", FuzzyOptions::from_json)?,
            regex_options: body.decode_opt("regex", RegexOptions::from_json)?,
        })
    }
}

/// Builder for [`CompletionSuggestion`]. Requires `field`.
#[derive(Debug, Default)]
pub struct CompletionSuggestionBuilder {
    field: Option<String>,
    text: Option<String>,
    prefix: Option<String>,
    regex: Option<String>,
    analyzer: Option<String>,
    size: Option<u32>,
    shard_size: Option<u32>,
    skip_duplicates: Option<bool>,
    fuzzy_options: Option<FuzzyOptions>,
    regex_options: Option<RegexOptions>,
}

impl CompletionSuggestionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        text: String,
        /// Set the prefix to complete.
        prefix: String,
        regex: String,
        analyzer: String,
        size: u32,
        shard_size: u32,
        skip_duplicates: bool,
        fuzzy_options: FuzzyOptions,
        regex_options: RegexOptions,
    }
}

impl Builder for CompletionSuggestionBuilder {
    type Output = CompletionSuggestion;

    fn build(self) -> Result<CompletionSuggestion> {
        let field = required!(self.field);
        Ok(CompletionSuggestion {
            field,
            text: self.text,
            prefix: self.prefix,
            regex: self.regex,
            analyzer: self.analyzer,
            size: self.size,
            shard_size: self.shard_size,
            skip_duplicates: self.skip_duplicates,
            fuzzy_options: self.fuzzy_options,
            regex_options: self.regex_options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryDslError;
    use serde_json::json;

    #[test]
    fn test_completion_suggestion_with_fuzzy() {
        let suggestion = CompletionSuggestion::builder()
            .field("suggest")
            .prefix("nor")
            .skip_duplicates(true)
            .fuzzy_options(FuzzyOptions::new().fuzziness(2u32).min_length(3))
            .build()
            .unwrap();

        let expected = json!({
            "prefix": "nor",
            "completion": {
                "field": "suggest",
                "skip_duplicates": true,
                "fuzzy": {"fuzziness": 2, "min_length": 3}
            }
        });
        assert_eq!(suggestion.to_json(), expected);
        assert_eq!(CompletionSuggestion::from_json(&expected).unwrap(), suggestion);
    }

    #[test]
    fn test_completion_regex_and_regex_options() {
        let suggestion = CompletionSuggestion::builder()
            .field("suggest")
            .regex("n[ever|i]r")
            .regex_options(
                RegexOptions::new()
                    .flags(RegexFlag::AnyString)
                    .max_determinized_states(10000),
            )
            .build()
            .unwrap();

        let expected = json!({
            "regex": "n[ever|i]r",
            "completion": {
                "field": "suggest",
                "regex": {"flags": "ANYSTRING", "max_determinized_states": 10000}
            }
        });
        assert_eq!(suggestion.to_json(), expected);
        assert_eq!(CompletionSuggestion::from_json(&expected).unwrap(), suggestion);
    }

    #[test]
    fn test_completion_missing_field() {
        let err = CompletionSuggestion::builder().prefix("nor").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "field"));
    }

    #[test]
    fn test_fuzzy_auto() {
        let options = FuzzyOptions::new().fuzziness(Fuzziness::Auto).transpositions(false);
        assert_eq!(options.to_json(), json!({"fuzziness": "AUTO", "transpositions": false}));
        assert_eq!(FuzzyOptions::from_json(&options.to_json()).unwrap(), options);
    }
}
