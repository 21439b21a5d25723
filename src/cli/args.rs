//! Command line argument parsing for the querydsl CLI using clap.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::SerializerConfig;

/// querydsl - validate and format Elasticsearch-style query documents
#[derive(Parser, Debug, Clone)]
#[command(name = "querydsl")]
#[command(about = "Validate, normalize and inspect query DSL documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct QueryDslArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'o', long = "output", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl QueryDslArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }

    pub fn serializer_config(&self) -> SerializerConfig {
        SerializerConfig::new().with_pretty(self.pretty)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Decode a document and report its discriminator or the decode error
    Validate(ValidateArgs),

    /// Decode a document and print its canonical encoding
    Format(FormatArgs),

    /// List the suggestions of a suggest section
    Suggest(SuggestArgs),

    /// Show the request envelope for a search body
    Request(RequestArgs),
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Validate(_) => "validate",
            Command::Format(_) => "format",
            Command::Suggest(_) => "suggest",
            Command::Request(_) => "request",
        }
    }
}

/// Arguments for validating a document
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Input file, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// What the document is expected to hold
    #[arg(short, long, default_value = "query")]
    pub kind: DocumentKind,
}

/// Arguments for formatting a document
#[derive(Parser, Debug, Clone)]
pub struct FormatArgs {
    /// Input file, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// What the document is expected to hold
    #[arg(short, long, default_value = "query")]
    pub kind: DocumentKind,
}

/// Arguments for inspecting a suggest section
#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Input file, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}

/// Arguments for building a search request
#[derive(Parser, Debug, Clone)]
pub struct RequestArgs {
    /// Search body file, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Index to search (repeatable)
    #[arg(short, long = "index", value_name = "INDEX")]
    pub indices: Vec<String>,

    /// Routing value
    #[arg(long)]
    pub routing: Option<String>,

    /// Shard preference
    #[arg(long)]
    pub preference: Option<String>,
}

/// Kinds of document the CLI can decode.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A single query, `{ "<query_type>": ... }`
    Query,
    /// A span query
    Span,
    /// A single suggestion
    Suggestion,
    /// A suggest section with named suggestions
    Suggest,
    /// A search request body
    Search,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

/// True when the input path names stdin.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_command() {
        let args = QueryDslArgs::try_parse_from(["querydsl", "validate", "query.json"]).unwrap();

        assert_eq!(args.command.name(), "validate");
        if let Command::Validate(validate_args) = args.command {
            assert_eq!(validate_args.input, PathBuf::from("query.json"));
            assert_eq!(validate_args.kind, DocumentKind::Query);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_format_command_with_kind() {
        let args = QueryDslArgs::try_parse_from([
            "querydsl", "--pretty", "format", "-", "--kind", "suggestion",
        ])
        .unwrap();

        assert!(args.serializer_config().pretty);
        if let Command::Format(format_args) = args.command {
            assert!(is_stdin(&format_args.input));
            assert_eq!(format_args.kind, DocumentKind::Suggestion);
        } else {
            panic!("Expected Format command");
        }
    }

    #[test]
    fn test_request_command() {
        let args = QueryDslArgs::try_parse_from([
            "querydsl",
            "request",
            "body.json",
            "--index",
            "posts",
            "-i",
            "users",
            "--routing",
            "user1",
        ])
        .unwrap();

        if let Command::Request(request_args) = args.command {
            assert_eq!(request_args.indices, vec!["posts", "users"]);
            assert_eq!(request_args.routing.as_deref(), Some("user1"));
            assert!(request_args.preference.is_none());
        } else {
            panic!("Expected Request command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = QueryDslArgs::try_parse_from(["querydsl", "suggest", "s.json"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = QueryDslArgs::try_parse_from(["querydsl", "-vv", "suggest", "s.json"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args =
            QueryDslArgs::try_parse_from(["querydsl", "--quiet", "suggest", "s.json"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            QueryDslArgs::try_parse_from(["querydsl", "--output", "json", "suggest", "s.json"])
                .unwrap();
        assert!(matches!(args.output_format, OutputFormat::Json));
    }
}
