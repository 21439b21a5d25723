//! Term suggester: per-term corrections based on edit distance.

use bigdecimal::BigDecimal;

use crate::codec::{KeyedWriter, wire_enum};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::suggest::{Envelope, SuggestMode};

wire_enum! {
    /// Ordering of suggestions per input term.
    pub enum SortBy("sort") {
        Score => "score",
        Frequency => "frequency",
    }
}

wire_enum! {
    /// String distance used to compare suggested terms.
    pub enum StringDistance("string_distance") {
        Internal => "internal",
        DamerauLevenshtein => "damerau_levenshtein",
        Levenshtein => "levenshtein",
        JaroWinkler => "jaro_winkler",
        Ngram => "ngram",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermSuggestion {
    pub field: String,
    pub text: Option<String>,
    pub prefix: Option<String>,
    pub regex: Option<String>,
    pub analyzer: Option<String>,
    pub size: Option<u32>,
    pub shard_size: Option<u32>,
    pub sort: Option<SortBy>,
    pub suggest_mode: Option<SuggestMode>,
    pub accuracy: Option<BigDecimal>,
    pub max_edits: Option<u32>,
    pub max_inspections: Option<u32>,
    pub max_term_freq: Option<BigDecimal>,
    pub prefix_length: Option<u32>,
    pub min_word_length: Option<u32>,
    pub min_doc_freq: Option<BigDecimal>,
    pub string_distance: Option<StringDistance>,
}

impl TermSuggestion {
    pub fn builder() -> TermSuggestionBuilder {
        TermSuggestionBuilder::new()
    }

    pub(crate) fn encode_options(&self) -> KeyedWriter {
        let mut writer = KeyedWriter::new();
        writer
            .put("field", self.field.as_str())
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_opt("size", self.size)
            .put_opt("shard_size", self.shard_size)
            .put_opt("sort", self.sort)
            .put_opt("suggest_mode", self.suggest_mode)
            .put_decimal_opt("accuracy", self.accuracy.as_ref())
            .put_opt("max_edits", self.max_edits)
            .put_opt("max_inspections", self.max_inspections)
            .put_decimal_opt("max_term_freq", self.max_term_freq.as_ref())
            .put_opt("prefix_length", self.prefix_length)
            .put_opt("min_word_length", self.min_word_length)
            .put_decimal_opt("min_doc_freq", self.min_doc_freq.as_ref())
            .put_opt("string_distance", self.string_distance);
        writer
    }

    pub(crate) fn from_envelope(envelope: Envelope<'_>) -> Result<Self> {
        let body = envelope.body;
        Ok(TermSuggestion {
            field: body.string("field")?,
            text: envelope.text,
            prefix: envelope.prefix,
            regex: envelope.regex,
            analyzer: body.string_opt("analyzer")?,
            size: body.u32_opt("size")?,
            shard_size: body.u32_opt("shard_size")?,
            sort: body.parse_opt("sort")?,
            suggest_mode: body.parse_opt("suggest_mode")?,
            accuracy: body.decimal_opt("accuracy")?,
            max_edits: body.u32_opt("max_edits")?,
            max_inspections: body.u32_opt("max_inspections")?,
            max_term_freq: body.decimal_opt("max_term_freq")?,
            prefix_length: body.u32_opt("prefix_length")?,
            min_word_length: body.u32_opt("min_word_length")?,
            min_doc_freq: body.decimal_opt("min_doc_freq")?,
            string_distance: body.parse_opt("string_distance")?,
        })
    }
}

/// Builder for [`TermSuggestion`]. Requires `field`.
#[derive(Debug, Default)]
pub struct TermSuggestionBuilder {
    field: Option<String>,
    text: Option<String>,
    prefix: Option<String>,
    regex: Option<String>,
    analyzer: Option<String>,
    size: Option<u32>,
    shard_size: Option<u32>,
    sort: Option<SortBy>,
    suggest_mode: Option<SuggestMode>,
    accuracy: Option<BigDecimal>,
    max_edits: Option<u32>,
    max_inspections: Option<u32>,
    max_term_freq: Option<BigDecimal>,
    prefix_length: Option<u32>,
    min_word_length: Option<u32>,
    min_doc_freq: Option<BigDecimal>,
    string_distance: Option<StringDistance>,
}

impl TermSuggestionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        /// Set the text to suggest corrections for.
        text: String,
        prefix: String,
        regex: String,
        analyzer: String,
        /// Maximum corrections returned per term.
        size: u32,
        shard_size: u32,
        sort: SortBy,
        suggest_mode: SuggestMode,
        max_edits: u32,
        max_inspections: u32,
        prefix_length: u32,
        min_word_length: u32,
        string_distance: StringDistance,
    }

    decimal_setters! {
        accuracy,
        max_term_freq,
        min_doc_freq,
    }
}

impl Builder for TermSuggestionBuilder {
    type Output = TermSuggestion;

    fn build(self) -> Result<TermSuggestion> {
        let field = required!(self.field);
        Ok(TermSuggestion {
            field,
            text: self.text,
            prefix: self.prefix,
            regex: self.regex,
            analyzer: self.analyzer,
            size: self.size,
            shard_size: self.shard_size,
            sort: self.sort,
            suggest_mode: self.suggest_mode,
            accuracy: self.accuracy,
            max_edits: self.max_edits,
            max_inspections: self.max_inspections,
            max_term_freq: self.max_term_freq,
            prefix_length: self.prefix_length,
            min_word_length: self.min_word_length,
            min_doc_freq: self.min_doc_freq,
            string_distance: self.string_distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::error::QueryDslError;
    use serde_json::json;

    #[test]
    fn test_term_suggestion_encode() {
        let suggestion = TermSuggestion::builder()
            .field("message")
            .text("tring out Elasticsearch")
            .size(3u32)
            .sort(SortBy::Frequency)
            .suggest_mode(SuggestMode::Popular)
            .accuracy(0.7)
            .max_edits(2u32)
            .min_doc_freq(0.01)
            .string_distance(StringDistance::JaroWinkler)
            .build()
            .unwrap();

        let expected = json!({
            "text": "tring out Elasticsearch",
            "term": {
                "field": "message",
                "size": 3,
                "sort": "frequency",
                "suggest_mode": "popular",
                "accuracy": 0.7,
                "max_edits": 2,
                "min_doc_freq": 0.01,
                "string_distance": "jaro_winkler"
            }
        });
        assert_eq!(suggestion.to_json(), expected);
        assert_eq!(TermSuggestion::from_json(&expected).unwrap(), suggestion);
    }

    #[test]
    fn test_term_suggestion_siblings_stay_outside() {
        let suggestion = TermSuggestion::builder()
            .field("message")
            .prefix("tri")
            .regex("tr.*")
            .build()
            .unwrap();
        let encoded = suggestion.to_json();
        assert_eq!(encoded["prefix"], json!("tri"));
        assert_eq!(encoded["regex"], json!("tr.*"));
        assert!(encoded["term"].get("prefix").is_none());
    }

    #[test]
    fn test_term_suggestion_missing_field() {
        let err = TermSuggestion::builder().text("x").build().unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "field"));

        let doc = json!({"text": "x", "term": {"size": 3}});
        assert!(matches!(
            TermSuggestion::from_json(&doc),
            Err(QueryDslError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_term_suggestion_bad_enum_value() {
        let doc = json!({"term": {"field": "message", "string_distance": "hamming"}});
        assert!(matches!(
            TermSuggestion::from_json(&doc),
            Err(QueryDslError::UnrecognizedVariant { .. })
        ));
    }
}
