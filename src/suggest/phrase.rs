//! Phrase suggester: whole-phrase corrections scored by an n-gram language
//! model.

use bigdecimal::BigDecimal;
use serde_json::{Map, Value};

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter, serde_via_codec};
use crate::error::Result;
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::Script;
use crate::suggest::smoothing::SmoothingModel;
use crate::suggest::term::{SortBy, StringDistance};
use crate::suggest::{Envelope, SuggestMode};

/// Tags wrapped around changed tokens in the suggested phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub pre_tag: String,
    pub post_tag: String,
}

impl Highlight {
    pub fn new<P: Into<String>, S: Into<String>>(pre_tag: P, post_tag: S) -> Self {
        Highlight {
            pre_tag: pre_tag.into(),
            post_tag: post_tag.into(),
        }
    }
}

impl JsonCodec for Highlight {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("pre_tag", self.pre_tag.as_str())
            .put("post_tag", self.post_tag.as_str());
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("Highlight", value)?;
        Ok(Highlight {
            pre_tag: reader.string("pre_tag")?,
            post_tag: reader.string("post_tag")?,
        })
    }
}

/// Checks each suggestion against a query, dropping or flagging phrases
/// with no matching documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Collate {
    pub query: Script,
    pub params: Option<Map<String, Value>>,
    /// Keep non-matching suggestions and mark them instead of dropping them.
    pub prune: Option<bool>,
}

impl Collate {
    pub fn new<S: Into<Script>>(query: S) -> Self {
        Collate {
            query: query.into(),
            params: None,
            prune: None,
        }
    }

    pub fn param<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn prune(mut self, prune: bool) -> Self {
        self.prune = Some(prune);
        self
    }
}

impl JsonCodec for Collate {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_codec("query", &self.query)
            .put_opt("params", self.params.clone())
            .put_opt("prune", self.prune);
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("Collate", value)?;
        Ok(Collate {
            query: reader.decode("query", Script::from_json)?,
            params: reader.serde_opt("params")?,
            prune: reader.bool_opt("prune")?,
        })
    }
}

/// Candidate generator feeding per-term candidates into the phrase model.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectCandidateGenerator {
    pub field: String,
    pub pre_filter: Option<String>,
    pub post_filter: Option<String>,
    pub suggest_mode: Option<SuggestMode>,
    pub accuracy: Option<BigDecimal>,
    pub size: Option<u32>,
    pub sort: Option<SortBy>,
    pub string_distance: Option<StringDistance>,
    pub max_edits: Option<u32>,
    pub max_inspections: Option<u32>,
    pub max_term_freq: Option<BigDecimal>,
    pub prefix_length: Option<u32>,
    pub min_word_length: Option<u32>,
    pub min_doc_freq: Option<BigDecimal>,
}

impl DirectCandidateGenerator {
    pub fn new<F: Into<String>>(field: F) -> Self {
        DirectCandidateGenerator {
            field: field.into(),
            pre_filter: None,
            post_filter: None,
            suggest_mode: None,
            accuracy: None,
            size: None,
            sort: None,
            string_distance: None,
            max_edits: None,
            max_inspections: None,
            max_term_freq: None,
            prefix_length: None,
            min_word_length: None,
            min_doc_freq: None,
        }
    }

    pub fn suggest_mode(mut self, mode: SuggestMode) -> Self {
        self.suggest_mode = Some(mode);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn pre_filter<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.pre_filter = Some(analyzer.into());
        self
    }

    pub fn post_filter<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.post_filter = Some(analyzer.into());
        self
    }
}

impl JsonCodec for DirectCandidateGenerator {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("field", self.field.as_str())
            .put_opt("pre_filter", self.pre_filter.as_deref())
            .put_opt("post_filter", self.post_filter.as_deref())
            .put_opt("suggest_mode", self.suggest_mode)
            .put_decimal_opt("accuracy", self.accuracy.as_ref())
            .put_opt("size", self.size)
            .put_opt("sort", self.sort)
            .put_opt("string_distance", self.string_distance)
            .put_opt("max_edits", self.max_edits)
            .put_opt("max_inspections", self.max_inspections)
            .put_decimal_opt("max_term_freq", self.max_term_freq.as_ref())
            .put_opt("prefix_length", self.prefix_length)
            .put_opt("min_word_length", self.min_word_length)
            .put_decimal_opt("min_doc_freq", self.min_doc_freq.as_ref());
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("DirectCandidateGenerator", value)?;
        Ok(DirectCandidateGenerator {
            field: reader.string("field")?,
            pre_filter: reader.string_opt("pre_filter")?,
            post_filter: reader.string_opt("post_filter")?,
            suggest_mode: reader.parse_opt("suggest_mode")?,
            accuracy: reader.decimal_opt("accuracy")?,
            size: reader.u32_opt("size")?,
            sort: reader.parse_opt("sort")?,
            string_distance: reader.parse_opt("string_distance")?,
            max_edits: reader.u32_opt("max_edits")?,
            max_inspections: reader.u32_opt("max_inspections")?,
            max_term_freq: reader.decimal_opt("max_term_freq")?,
            prefix_length: reader.u32_opt("prefix_length")?,
            min_word_length: reader.u32_opt("min_word_length")?,
            min_doc_freq: reader.decimal_opt("min_doc_freq")?,
        })
    }
}

serde_via_codec!(Highlight, Collate, DirectCandidateGenerator);

#[derive(Debug, Clone, PartialEq)]
pub struct PhraseSuggestion {
    pub field: String,
    pub text: Option<String>,
    pub prefix: Option<String>,
    pub regex: Option<String>,
    pub analyzer: Option<String>,
    pub size: Option<u32>,
    pub shard_size: Option<u32>,
    pub max_errors: Option<BigDecimal>,
    pub separator: Option<String>,
    pub real_word_error_likelihood: Option<BigDecimal>,
    pub confidence: Option<BigDecimal>,
    pub gram_size: Option<u32>,
    pub force_unigrams: Option<bool>,
    pub token_limit: Option<u32>,
    pub highlight: Option<Highlight>,
    pub collate: Option<Collate>,
    pub smoothing: Option<SmoothingModel>,
    pub direct_generator: Vec<DirectCandidateGenerator>,
}

impl PhraseSuggestion {
    pub fn builder() -> PhraseSuggestionBuilder {
        PhraseSuggestionBuilder::new()
    }

    pub(crate) fn encode_options(&self) -> KeyedWriter {
        let mut writer = KeyedWriter::new();
        writer
            .put("field", self.field.as_str())
            .put_opt("analyzer", self.analyzer.as_deref())
            .put_opt("size", self.size)
            .put_opt("shard_size", self.shard_size)
            .put_decimal_opt("max_errors", self.max_errors.as_ref())
            .put_opt("separator", self.separator.as_deref())
            .put_decimal_opt(
                "real_word_error_likelihood",
                self.real_word_error_likelihood.as_ref(),
            )
            .put_decimal_opt("confidence", self.confidence.as_ref())
            .put_opt("gram_size", self.gram_size)
            .put_opt("force_unigrams", self.force_unigrams)
            .put_opt("token_limit", self.token_limit)
            .put_codec_opt("highlight", self.highlight.as_ref())
            .put_codec_opt("collate", self.collate.as_ref())
            .put_codec_opt("smoothing", self.smoothing.as_ref())
            .put_codec_list("direct_generator", &self.direct_generator);
        writer
    }

    pub(crate) fn from_envelope(envelope: Envelope<'_>) -> Result<Self> {
        let body = envelope.body;
        Ok(PhraseSuggestion {
            field: body.string("field")?,
            text: envelope.text,
            prefix: envelope.prefix,
            regex: envelope.regex,
            analyzer: body.string_opt("analyzer")?,
            size: body.u32_opt("size")?,
            shard_size: body.u32_opt("shard_size")?,
            max_errors: body.decimal_opt("max_errors")?,
            separator: body.string_opt("separator")?,
            real_word_error_likelihood: body.decimal_opt("real_word_error_likelihood")?,
            confidence: body.decimal_opt("confidence")?,
            gram_size: body.u32_opt("gram_size")?,
            force_unigrams: body.bool_opt("force_unigrams")?,
            token_limit: body.u32_opt("token_limit")?,
            highlight: body.decode_opt("highlight", Highlight::from_json)?,
            collate: body.decode_opt("collate", Collate::from_json)?,
            smoothing: body.decode_opt("smoothing", SmoothingModel::from_json)?,
            direct_generator: body
                .list_opt("direct_generator", DirectCandidateGenerator::from_json)?
                .unwrap_or_default(),
        })
    }
}

/// Builder for [`PhraseSuggestion`]. Requires `field`.
#[derive(Debug, Default)]
pub struct PhraseSuggestionBuilder {
    field: Option<String>,
    text: Option<String>,
    prefix: Option<String>,
    regex: Option<String>,
    analyzer: Option<String>,
    size: Option<u32>,
    shard_size: Option<u32>,
    max_errors: Option<BigDecimal>,
    separator: Option<String>,
    real_word_error_likelihood: Option<BigDecimal>,
    confidence: Option<BigDecimal>,
    gram_size: Option<u32>,
    force_unigrams: Option<bool>,
    token_limit: Option<u32>,
    highlight: Option<Highlight>,
    collate: Option<Collate>,
    smoothing: Option<SmoothingModel>,
    direct_generator: Vec<DirectCandidateGenerator>,
}

impl PhraseSuggestionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        text: String,
        prefix: String,
        regex: String,
        analyzer: String,
        size: u32,
        shard_size: u32,
        separator: String,
        gram_size: u32,
        force_unigrams: bool,
        token_limit: u32,
        highlight: Highlight,
        collate: Collate,
        /// Set the language model smoothing.
        smoothing: SmoothingModel,
    }

    decimal_setters! {
        /// Maximum share of terms treated as misspelled: below 1 a fraction,
        /// otherwise an absolute count.
        max_errors,
        real_word_error_likelihood,
        confidence,
    }

    /// Append a candidate generator.
    pub fn direct_generator(mut self, generator: DirectCandidateGenerator) -> Self {
        self.direct_generator.push(generator);
        self
    }
}

impl Builder for PhraseSuggestionBuilder {
    type Output = PhraseSuggestion;

    fn build(self) -> Result<PhraseSuggestion> {
        let field = required!(self.field);
        Ok(PhraseSuggestion {
            field,
            text: self.text,
            prefix: self.prefix,
            regex: self.regex,
            analyzer: self.analyzer,
            size: self.size,
            shard_size: self.shard_size,
            max_errors: self.max_errors,
            separator: self.separator,
            real_word_error_likelihood: self.real_word_error_likelihood,
            confidence: self.confidence,
            gram_size: self.gram_size,
            force_unigrams: self.force_unigrams,
            token_limit: self.token_limit,
            highlight: self.highlight,
            collate: self.collate,
            smoothing: self.smoothing,
            direct_generator: self.direct_generator,
        })
    }
}
