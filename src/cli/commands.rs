//! Command implementations for the querydsl CLI.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};
use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::codec::JsonCodec;
use crate::error::Result;
use crate::query::{Builder, Query, SpanQuery};
use crate::request::{Request, SearchRequest};
use crate::suggest::{Suggest, Suggestion};

/// Execute a CLI command.
pub fn execute_command(args: QueryDslArgs) -> Result<()> {
    match &args.command {
        Command::Validate(validate_args) => validate_command(validate_args, &args),
        Command::Format(format_args) => format_command(format_args, &args),
        Command::Suggest(suggest_args) => suggest_command(suggest_args, &args),
        Command::Request(request_args) => request_command(request_args, &args),
    }
}

/// Validate a document, reporting the discriminator or the decode error.
fn validate_command(args: &ValidateArgs, cli_args: &QueryDslArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    let (report, outcome) = validation_report(args.kind, &document);
    let message = if report.valid {
        "Document is valid"
    } else {
        "Document is invalid"
    };
    output_result(message, &report, cli_args)?;
    outcome
}

/// Print the canonical encoding of a document.
fn format_command(args: &FormatArgs, cli_args: &QueryDslArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    let (_, canonical) = decode_document(args.kind, &document)?;
    output_document(&canonical, cli_args)
}

fn suggest_command(args: &SuggestArgs, cli_args: &QueryDslArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    let report = suggest_report(&Suggest::from_json(&document)?);
    output_result("Suggest section", &report, cli_args)
}

fn request_command(args: &RequestArgs, cli_args: &QueryDslArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    let search = search_request(args, &document)?;
    output_result("Search request", &request_report(&search), cli_args)
}

/// Read and parse a JSON document from a file or stdin.
pub fn read_document(path: &Path) -> Result<Value> {
    let text = if is_stdin(path) {
        debug!("Reading document from stdin");
        io::read_to_string(io::stdin())?
    } else {
        debug!("Reading document from {}", path.display());
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

/// Decode a document as `kind`, returning its discriminator and canonical
/// encoding.
pub fn decode_document(kind: DocumentKind, document: &Value) -> Result<(String, Value)> {
    let decoded = match kind {
        DocumentKind::Query => {
            let query = Query::from_json(document)?;
            (query.query_type().to_string(), query.to_json())
        }
        DocumentKind::Span => {
            let query = SpanQuery::from_json(document)?;
            (query.query_type().to_string(), query.to_json())
        }
        DocumentKind::Suggestion => {
            let suggestion = Suggestion::from_json(document)?;
            (suggestion.suggestion_type().to_string(), suggestion.to_json())
        }
        DocumentKind::Suggest => {
            let suggest = Suggest::from_json(document)?;
            ("suggest".to_string(), suggest.to_json())
        }
        DocumentKind::Search => {
            let search = SearchRequest::from_json(document)?;
            ("search".to_string(), search.to_json())
        }
    };
    info!("Decoded {kind:?} document as {}", decoded.0);
    Ok(decoded)
}

/// Decode a search body and apply the command line's indices and URL
/// parameters, validating the result like any other built request.
pub fn search_request(args: &RequestArgs, document: &Value) -> Result<SearchRequest> {
    let mut builder = SearchRequest::from_json(document)?
        .into_builder()
        .indices(args.indices.iter().cloned());
    if let Some(routing) = &args.routing {
        builder = builder.routing(routing.as_str());
    }
    if let Some(preference) = &args.preference {
        builder = builder.preference(preference.as_str());
    }
    builder.build()
}

/// Decode `document` as `kind` into a report. The decode error, if any, is
/// handed back alongside so callers can fail after printing.
pub fn validation_report(kind: DocumentKind, document: &Value) -> (ValidationReport, Result<()>) {
    match decode_document(kind, document) {
        Ok((discriminator, _)) => (ValidationReport::valid(kind, discriminator), Ok(())),
        Err(error) => (ValidationReport::invalid(kind, &error), Err(error)),
    }
}

pub fn suggest_report(suggest: &Suggest) -> SuggestReport {
    SuggestReport {
        global_text: suggest.global_text.clone(),
        suggestions: suggest
            .suggestions
            .iter()
            .map(|(name, suggestion)| SuggestionSummary {
                name: name.clone(),
                suggestion_type: suggestion.suggestion_type().to_string(),
                field: suggestion.field().to_string(),
                text: suggestion.text().map(str::to_string),
            })
            .collect(),
    }
}

pub fn request_report(search: &SearchRequest) -> RequestReport {
    RequestReport {
        method: search.method().to_string(),
        endpoint: search.endpoint(),
        query_params: search.query_params(),
        body: search.to_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryDslError;
    use clap::Parser;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_document(document: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{document}").unwrap();
        file
    }

    #[test]
    fn test_read_document_from_file() {
        let file = write_document(&json!({"match_all": {}}));
        let document = read_document(file.path()).unwrap();
        assert_eq!(document, json!({"match_all": {}}));
    }

    #[test]
    fn test_read_document_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(read_document(file.path()), Err(QueryDslError::Json(_))));
    }

    #[test]
    fn test_read_document_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_document(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(QueryDslError::Io(_))));
    }

    #[test]
    fn test_decode_document_canonicalizes_shorthand() {
        let document = json!({"term": {"user": "kimchy"}});
        let (discriminator, canonical) = decode_document(DocumentKind::Query, &document).unwrap();
        assert_eq!(discriminator, "term");
        assert_eq!(canonical, document);
    }

    #[test]
    fn test_decode_document_span_rejects_general_query() {
        let document = json!({"match": {"message": "hello"}});
        assert!(decode_document(DocumentKind::Query, &document).is_ok());
        assert!(matches!(
            decode_document(DocumentKind::Span, &document),
            Err(QueryDslError::UnrecognizedVariant { .. })
        ));
    }

    #[test]
    fn test_validation_report() {
        let (report, outcome) = validation_report(DocumentKind::Query, &json!({"match_all": {}}));
        assert!(report.valid);
        assert!(outcome.is_ok());
        assert_eq!(report.discriminator.as_deref(), Some("match_all"));

        let document = json!({"match_all": {}, "term": {"user": "kimchy"}});
        let (report, outcome) = validation_report(DocumentKind::Query, &document);
        assert!(!report.valid);
        assert!(matches!(outcome, Err(QueryDslError::KeyCountMismatch { .. })));
        assert!(
            report
                .error
                .unwrap()
                .contains("Unable to find field name in key(s) expect: 1 key found: 2.")
        );
    }

    #[test]
    fn test_suggest_report() {
        let document = json!({
            "text": "tring out",
            "fix": {"term": {"field": "message"}},
            "complete": {"prefix": "nir", "completion": {"field": "suggest"}}
        });
        let report = suggest_report(&Suggest::from_json(&document).unwrap());
        assert_eq!(report.global_text.as_deref(), Some("tring out"));
        assert_eq!(report.suggestions.len(), 2);

        let complete = &report.suggestions[0];
        assert_eq!(complete.name, "complete");
        assert_eq!(complete.suggestion_type, "completion");
        assert_eq!(complete.field, "suggest");
        assert_eq!(report.suggestions[1].suggestion_type, "term");
    }

    #[test]
    fn test_request_report() {
        let mut search =
            SearchRequest::from_json(&json!({"query": {"match_all": {}}, "size": 3})).unwrap();
        search.indices = vec!["posts".to_string()];

        let report = request_report(&search);
        assert_eq!(report.method, "POST");
        assert_eq!(report.endpoint, "posts/_search");
        assert!(report.query_params.is_empty());
        assert_eq!(report.body, json!({"query": {"match_all": {}}, "size": 3}));
    }

    #[test]
    fn test_search_request_applies_cli_arguments() {
        let args = RequestArgs {
            input: "-".into(),
            indices: vec!["posts".to_string(), "users".to_string()],
            routing: Some("user1".to_string()),
            preference: None,
        };
        let search = search_request(&args, &json!({"size": 3})).unwrap();
        assert_eq!(search.endpoint(), "posts,users/_search");
        assert_eq!(search.query_params(), vec![("routing".to_string(), "user1".to_string())]);
        assert_eq!(search.size, Some(3));
    }

    #[test]
    fn test_search_request_rejects_joined_index_names() {
        let args = RequestArgs {
            input: "-".into(),
            indices: vec!["a,b".to_string()],
            routing: None,
            preference: None,
        };
        assert!(matches!(
            search_request(&args, &json!({})),
            Err(QueryDslError::InvalidField { ref field, .. }) if field == "indices"
        ));

        let file = write_document(&json!({}));
        let path = file.path().to_string_lossy().to_string();
        let cli = QueryDslArgs::try_parse_from(["querydsl", "-q", "request", &path, "-i", "a/b"])
            .unwrap();
        assert!(matches!(execute_command(cli), Err(QueryDslError::InvalidField { .. })));
    }

    #[test]
    fn test_execute_validate_fails_on_invalid_document() {
        let file = write_document(&json!({"matchy": {}}));
        let path = file.path().to_string_lossy().to_string();
        let args =
            QueryDslArgs::try_parse_from(["querydsl", "-q", "-o", "json", "validate", &path])
                .unwrap();
        assert!(matches!(
            execute_command(args),
            Err(QueryDslError::UnrecognizedVariant { .. })
        ));
    }

    #[test]
    fn test_execute_format() {
        let file = write_document(&json!({"match": {"message": "hello"}}));
        let path = file.path().to_string_lossy().to_string();
        let args = QueryDslArgs::try_parse_from(["querydsl", "format", &path]).unwrap();
        assert!(execute_command(args).is_ok());
    }
}
