//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::args::{DocumentKind, OutputFormat, QueryDslArgs};
use crate::error::{QueryDslError, Result};
use crate::request::{JsonSerializer, Serializer};

/// Result of decoding one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub kind: DocumentKind,
    pub valid: bool,
    /// The discriminator picked by the decoder.
    pub discriminator: Option<String>,
    pub error: Option<String>,
}

impl ValidationReport {
    pub fn valid(kind: DocumentKind, discriminator: String) -> Self {
        ValidationReport {
            kind,
            valid: true,
            discriminator: Some(discriminator),
            error: None,
        }
    }

    pub fn invalid(kind: DocumentKind, error: &QueryDslError) -> Self {
        ValidationReport {
            kind,
            valid: false,
            discriminator: None,
            error: Some(error.to_string()),
        }
    }
}

/// One named entry of a suggest section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSummary {
    pub name: String,
    pub suggestion_type: String,
    pub field: String,
    pub text: Option<String>,
}

/// Contents of a suggest section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestReport {
    pub global_text: Option<String>,
    pub suggestions: Vec<SuggestionSummary>,
}

/// The envelope a transport would send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestReport {
    pub method: String,
    pub endpoint: String,
    pub query_params: Vec<(String, String)>,
    pub body: Value,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &QueryDslArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Print a query DSL document as JSON regardless of the output format.
pub fn output_document(document: &Value, args: &QueryDslArgs) -> Result<()> {
    println!("{}", render_document(document, args)?);
    Ok(())
}

fn render_document(document: &Value, args: &QueryDslArgs) -> Result<String> {
    let bytes = JsonSerializer::new(args.serializer_config()).encode(document)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &QueryDslArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    for line in human_lines(&value) {
        println!("{line}");
    }
    Ok(())
}

fn human_lines(value: &Value) -> Vec<String> {
    match value {
        Value::Object(obj) => obj
            .iter()
            .filter(|(_, val)| !val.is_null())
            .map(|(key, val)| format!("{key}: {}", format_value(val)))
            .collect(),
        _ => vec![format_value(value)],
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &QueryDslArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}
