//! Suggesters: term, phrase and completion suggestions.
//!
//! A suggestion document keys its options under the suggestion type, with
//! `text`, `prefix` and `regex` as siblings of that key:
//!
//! ```json
//! { "text": "tring out", "term": { "field": "message", "size": 3 } }
//! ```

pub mod completion;
pub mod phrase;
pub mod smoothing;
pub mod term;

use std::collections::BTreeMap;

use log::debug;
use serde_json::Value;

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter, wire_enum};
use crate::error::{QueryDslError, Result};
use crate::query::builder::Builder;

pub use self::completion::{
    CompletionSuggestion, CompletionSuggestionBuilder, FuzzyOptions, RegexFlag, RegexOptions,
};
pub use self::phrase::{
    Collate, DirectCandidateGenerator, Highlight, PhraseSuggestion, PhraseSuggestionBuilder,
};
pub use self::smoothing::{
    Laplace, LinearInterpolation, SmoothingModel, SmoothingModelType, StupidBackoff,
    is_equal_smoothing_models,
};
pub use self::term::{SortBy, StringDistance, TermSuggestion, TermSuggestionBuilder};

wire_enum! {
    /// Discriminator of a suggestion.
    pub enum SuggestionType("suggestion") {
        Term => "term",
        Phrase => "phrase",
        Completion => "completion",
    }
}

wire_enum! {
    /// Which input terms receive suggestions.
    pub enum SuggestMode("suggest_mode") {
        Missing => "missing",
        Popular => "popular",
        Always => "always",
    }
}

/// Keys that sit next to the suggestion type key rather than inside it.
pub const SIBLING_KEYS: [&str; 3] = ["text", "prefix", "regex"];

/// A decoded suggestion document: the sibling values plus a reader over the
/// type-keyed options object.
#[derive(Debug)]
pub struct Envelope<'a> {
    pub text: Option<String>,
    pub prefix: Option<String>,
    pub regex: Option<String>,
    pub body: KeyedReader<'a>,
}

impl<'a> Envelope<'a> {
    /// Split a suggestion document into its type tag and envelope.
    pub fn decode(type_name: &'static str, value: &'a Value) -> Result<(SuggestionType, Envelope<'a>)> {
        let reader = KeyedReader::new(type_name, value)?;
        let (tag, body) = reader.entry_excluding(&SIBLING_KEYS)?;
        let suggestion_type: SuggestionType = tag.parse()?;
        let body = KeyedReader::new(type_name, body)?;
        let envelope = Envelope {
            text: reader.string_opt("text")?,
            prefix: reader.string_opt("prefix")?,
            regex: reader.string_opt("regex")?,
            body,
        };
        Ok((suggestion_type, envelope))
    }

    /// Decode, failing unless the tag is `expected`.
    pub fn decode_as(
        type_name: &'static str,
        expected: SuggestionType,
        value: &'a Value,
    ) -> Result<Envelope<'a>> {
        let (suggestion_type, envelope) = Envelope::decode(type_name, value)?;
        if suggestion_type != expected {
            return Err(QueryDslError::variant_mismatch(
                expected.as_str(),
                suggestion_type.as_str(),
            ));
        }
        Ok(envelope)
    }
}

/// Assemble a suggestion document from its siblings and options object.
pub fn encode_envelope(
    suggestion_type: SuggestionType,
    text: Option<&str>,
    prefix: Option<&str>,
    regex: Option<&str>,
    body: KeyedWriter,
) -> Value {
    let mut writer = KeyedWriter::new();
    writer
        .put_opt("text", text)
        .put_opt("prefix", prefix)
        .put_opt("regex", regex)
        .put_writer(suggestion_type.as_str(), body);
    writer.finish()
}

/// Any suggestion.
///
/// Two suggestions of different types are never equal, even when their
/// shared fields coincide.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    Term(TermSuggestion),
    Phrase(PhraseSuggestion),
    Completion(CompletionSuggestion),
}

impl Suggestion {
    pub fn suggestion_type(&self) -> SuggestionType {
        match self {
            Suggestion::Term(_) => SuggestionType::Term,
            Suggestion::Phrase(_) => SuggestionType::Phrase,
            Suggestion::Completion(_) => SuggestionType::Completion,
        }
    }

    /// The field suggestions are drawn from.
    pub fn field(&self) -> &str {
        match self {
            Suggestion::Term(s) => &s.field,
            Suggestion::Phrase(s) => &s.field,
            Suggestion::Completion(s) => &s.field,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Suggestion::Term(s) => s.text.as_deref(),
            Suggestion::Phrase(s) => s.text.as_deref(),
            Suggestion::Completion(s) => s.text.as_deref(),
        }
    }

    pub fn is_equal_to(&self, other: &Suggestion) -> bool {
        self == other
    }
}

impl JsonCodec for Suggestion {
    fn to_json(&self) -> Value {
        match self {
            Suggestion::Term(s) => s.to_json(),
            Suggestion::Phrase(s) => s.to_json(),
            Suggestion::Completion(s) => s.to_json(),
        }
    }

    fn from_json(value: &Value) -> Result<Self> {
        let (suggestion_type, envelope) = Envelope::decode("Suggestion", value)?;
        debug!("decoding {suggestion_type} suggestion");
        let suggestion = match suggestion_type {
            SuggestionType::Term => Suggestion::Term(TermSuggestion::from_envelope(envelope)?),
            SuggestionType::Phrase => Suggestion::Phrase(PhraseSuggestion::from_envelope(envelope)?),
            SuggestionType::Completion => {
                Suggestion::Completion(CompletionSuggestion::from_envelope(envelope)?)
            }
        };
        Ok(suggestion)
    }
}

/// Wires a suggestion type into the codec, serde and [`Suggestion`].
macro_rules! suggestion_variant {
    ($($t:ident => $variant:ident),+ $(,)?) => {
        $(
            impl JsonCodec for $t {
                fn to_json(&self) -> Value {
                    encode_envelope(
                        SuggestionType::$variant,
                        self.text.as_deref(),
                        self.prefix.as_deref(),
                        self.regex.as_deref(),
                        self.encode_options(),
                    )
                }

                fn from_json(value: &Value) -> Result<Self> {
                    let envelope = Envelope::decode_as(stringify!($t), SuggestionType::$variant, value)?;
                    $t::from_envelope(envelope)
                }
            }

            crate::codec::serde_via_codec!($t);

            impl From<$t> for Suggestion {
                fn from(suggestion: $t) -> Self {
                    Suggestion::$variant(suggestion)
                }
            }
        )+
    };
}

suggestion_variant! {
    TermSuggestion => Term,
    PhraseSuggestion => Phrase,
    CompletionSuggestion => Completion,
}

crate::codec::serde_via_codec!(Suggestion, SuggestSource, Suggest);

/// Per-suggestion input text plus a global text, in one flat object where
/// `text` is reserved for the global entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuggestSource {
    pub global_text: Option<String>,
    pub suggestions: BTreeMap<String, String>,
}

impl JsonCodec for SuggestSource {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer.put_opt("text", self.global_text.as_deref());
        for (name, text) in &self.suggestions {
            writer.put(name, text.as_str());
        }
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SuggestSource", value)?;
        let mut suggestions = BTreeMap::new();
        for (name, _) in reader.entries().filter(|(name, _)| *name != "text") {
            suggestions.insert(name.to_string(), reader.string(name)?);
        }
        Ok(SuggestSource {
            global_text: reader.string_opt("text")?,
            suggestions,
        })
    }
}

/// The `suggest` section of a search body: named suggestions sharing an
/// optional global text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Suggest {
    pub global_text: Option<String>,
    pub suggestions: BTreeMap<String, Suggestion>,
}

impl Suggest {
    pub fn builder() -> SuggestBuilder {
        SuggestBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&Suggestion> {
        self.suggestions.get(name)
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

impl JsonCodec for Suggest {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer.put_opt("text", self.global_text.as_deref());
        for (name, suggestion) in &self.suggestions {
            writer.put_codec(name, suggestion);
        }
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("Suggest", value)?;
        let mut suggestions = BTreeMap::new();
        for (name, body) in reader.entries().filter(|(name, _)| *name != "text") {
            suggestions.insert(name.to_string(), Suggestion::from_json(body)?);
        }
        Ok(Suggest {
            global_text: reader.string_opt("text")?,
            suggestions,
        })
    }
}

/// Builder for [`Suggest`]. Names must be unique and must not be `text`.
#[derive(Debug, Default)]
pub struct SuggestBuilder {
    global_text: Option<String>,
    suggestions: Vec<(String, Suggestion)>,
}

impl SuggestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_text<S: Into<String>>(mut self, text: S) -> Self {
        self.global_text = Some(text.into());
        self
    }

    pub fn suggestion<N: Into<String>, S: Into<Suggestion>>(mut self, name: N, suggestion: S) -> Self {
        self.suggestions.push((name.into(), suggestion.into()));
        self
    }
}

impl Builder for SuggestBuilder {
    type Output = Suggest;

    fn build(self) -> Result<Suggest> {
        let mut suggestions = BTreeMap::new();
        for (name, suggestion) in self.suggestions {
            if name == "text" {
                return Err(QueryDslError::invalid_field(
                    name,
                    "reserved for the global suggest text",
                ));
            }
            if suggestions.contains_key(&name) {
                return Err(QueryDslError::invalid_field(name, "duplicate suggestion name"));
            }
            suggestions.insert(name, suggestion);
        }
        Ok(Suggest {
            global_text: self.global_text,
            suggestions,
        })
    }
}

/// Entry points returning a fresh builder for each suggestion kind.
pub struct SuggestBuilders;

impl SuggestBuilders {
    pub fn term_suggestion() -> TermSuggestionBuilder {
        TermSuggestionBuilder::new()
    }

    pub fn phrase_suggestion() -> PhraseSuggestionBuilder {
        PhraseSuggestionBuilder::new()
    }

    pub fn completion_suggestion() -> CompletionSuggestionBuilder {
        CompletionSuggestionBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variant_isolation() {
        let term: Suggestion = TermSuggestion::builder()
            .field("message")
            .text("tring out")
            .build()
            .unwrap()
            .into();
        let phrase: Suggestion = PhraseSuggestion::builder()
            .field("message")
            .text("tring out")
            .build()
            .unwrap()
            .into();

        assert!(!term.is_equal_to(&phrase));
        assert!(!phrase.is_equal_to(&term));
        assert!(term.is_equal_to(&term.clone()));
        assert_eq!(term.field(), phrase.field());
        assert_eq!(term.text(), Some("tring out"));
    }

    #[test]
    fn test_suggestion_decode_dispatches_on_type_key() {
        let doc = json!({"text": "nir", "completion": {"field": "suggest"}});
        let suggestion = Suggestion::from_json(&doc).unwrap();
        assert_eq!(suggestion.suggestion_type(), SuggestionType::Completion);
        assert_eq!(suggestion.to_json(), doc);

        let doc = json!({"text": "nir", "spelling": {"field": "suggest"}});
        assert!(matches!(
            Suggestion::from_json(&doc),
            Err(QueryDslError::UnrecognizedVariant { .. })
        ));

        let doc = json!({"term": {"field": "a"}, "phrase": {"field": "b"}});
        crate::codec::assert_key_count(Suggestion::from_json(&doc), 1, 2);
    }

    #[test]
    fn test_typed_decode_rejects_other_variant() {
        let doc = json!({"phrase": {"field": "message"}});
        assert!(matches!(
            TermSuggestion::from_json(&doc),
            Err(QueryDslError::VariantMismatch { .. })
        ));
    }

    #[test]
    fn test_suggest_source() {
        let doc = json!({"text": "tring out", "my-suggest-1": "elasticsaerch"});
        let source = SuggestSource::from_json(&doc).unwrap();
        assert_eq!(source.global_text.as_deref(), Some("tring out"));
        assert_eq!(source.suggestions.get("my-suggest-1").map(String::as_str), Some("elasticsaerch"));
        assert_eq!(source.to_json(), doc);
    }

    #[test]
    fn test_suggest_section() {
        let suggest = Suggest::builder()
            .global_text("tring out Elasticsearch")
            .suggestion(
                "my-suggest-1",
                TermSuggestion::builder().field("message").build().unwrap(),
            )
            .suggestion(
                "my-suggest-2",
                TermSuggestion::builder().field("user").build().unwrap(),
            )
            .build()
            .unwrap();

        let expected = json!({
            "text": "tring out Elasticsearch",
            "my-suggest-1": {"term": {"field": "message"}},
            "my-suggest-2": {"term": {"field": "user"}}
        });
        assert_eq!(suggest.to_json(), expected);
        assert_eq!(Suggest::from_json(&expected).unwrap(), suggest);
        assert_eq!(suggest.len(), 2);
    }

    #[test]
    fn test_suggest_builder_rejects_reserved_and_duplicate_names() {
        let term = TermSuggestion::builder().field("message").build().unwrap();
        let err = Suggest::builder()
            .suggestion("text", term.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { ref field, .. } if field == "text"));

        let err = Suggest::builder()
            .suggestion("a", term.clone())
            .suggestion("a", term)
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_missing_field_is_rejected_for_every_kind() {
        let errors = [
            SuggestBuilders::term_suggestion().text("x").build().map(Suggestion::from),
            SuggestBuilders::phrase_suggestion().text("x").build().map(Suggestion::from),
            SuggestBuilders::completion_suggestion().prefix("x").build().map(Suggestion::from),
        ];
        for result in errors {
            assert!(matches!(result, Err(QueryDslError::MissingRequiredField(ref f)) if f == "field"));
        }
    }
}
