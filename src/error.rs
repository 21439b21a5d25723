//! Error types for the querydsl library.
//!
//! All failures are represented by the [`QueryDslError`] enum. Builder
//! validation, structural decode problems, unknown discriminators and
//! bodyless requests each get their own variant so that callers can locate
//! a malformed input without re-parsing it.
//!
//! # Examples
//!
//! ```
//! use querydsl::error::{QueryDslError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(QueryDslError::missing_field("field"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for querydsl operations.
#[derive(Error, Debug)]
pub enum QueryDslError {
    /// A builder was asked to build without one of its required fields.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// A builder needs at least one of several fields to be set.
    #[error("at least one of [{}] is required", .0.join(", "))]
    AtLeastOneRequired(Vec<String>),

    /// A builder field holds a value that can never produce a valid query.
    #[error("invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },

    /// A decoded object has a different number of keys than its shape allows.
    #[error("type mismatch decoding {type_name}: {description}")]
    KeyCountMismatch {
        type_name: String,
        expected: usize,
        found: usize,
        description: String,
    },

    /// A discriminator is not part of the known set for a polymorphic boundary.
    #[error("unrecognized {kind} type: {name}")]
    UnrecognizedVariant { kind: String, name: String },

    /// A concrete decoder was given a document tagged for another variant.
    #[error("expected a {expected} document but found {found}")]
    VariantMismatch { expected: String, found: String },

    /// A required key is absent from a decoded object.
    #[error("key not found decoding {type_name}: {key}")]
    KeyNotFound { type_name: String, key: String },

    /// A key holds a JSON value of the wrong shape.
    #[error("type mismatch decoding {type_name}: {key} is not {expected}")]
    TypeMismatch {
        type_name: String,
        key: String,
        expected: String,
    },

    /// A decoded value is well-formed JSON but not a legal value.
    #[error("invalid value decoding {type_name}: {message}")]
    InvalidValue { type_name: String, message: String },

    /// The request kind structurally has no body.
    #[error("no body for this request")]
    NoBodyForRequest,

    /// I/O errors (reading input documents).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with QueryDslError.
pub type Result<T> = std::result::Result<T, QueryDslError>;

impl QueryDslError {
    /// Create a missing required field error.
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        QueryDslError::MissingRequiredField(field.into())
    }

    /// Create an error for a group of fields of which none was set.
    pub fn at_least_one<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryDslError::AtLeastOneRequired(fields.into_iter().map(Into::into).collect())
    }

    /// Create an invalid builder field error.
    pub fn invalid_field<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        QueryDslError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a key count mismatch error with the standard description.
    pub fn key_count<S: Into<String>>(type_name: S, expected: usize, found: usize) -> Self {
        QueryDslError::KeyCountMismatch {
            type_name: type_name.into(),
            expected,
            found,
            description: format!(
                "Unable to find field name in key(s) expect: {expected} key found: {found}."
            ),
        }
    }

    /// Create an unrecognized discriminator error.
    pub fn unrecognized<K: Into<String>, N: Into<String>>(kind: K, name: N) -> Self {
        QueryDslError::UnrecognizedVariant {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a variant mismatch error.
    pub fn variant_mismatch<E: Into<String>, F: Into<String>>(expected: E, found: F) -> Self {
        QueryDslError::VariantMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a key not found error.
    pub fn key_not_found<T: Into<String>, K: Into<String>>(type_name: T, key: K) -> Self {
        QueryDslError::KeyNotFound {
            type_name: type_name.into(),
            key: key.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch<T, K, E>(type_name: T, key: K, expected: E) -> Self
    where
        T: Into<String>,
        K: Into<String>,
        E: Into<String>,
    {
        QueryDslError::TypeMismatch {
            type_name: type_name.into(),
            key: key.into(),
            expected: expected.into(),
        }
    }

    /// Create an invalid decoded value error.
    pub fn invalid_value<T: Into<String>, M: Into<String>>(type_name: T, message: M) -> Self {
        QueryDslError::InvalidValue {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        QueryDslError::Other(msg.into())
    }

    /// True for errors raised by `build()` rather than by decoding.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QueryDslError::MissingRequiredField(_)
                | QueryDslError::AtLeastOneRequired(_)
                | QueryDslError::InvalidField { .. }
        )
    }
}

/// Failure to produce a request body.
///
/// Bodyless requests report [`MakeBodyError::NoBodyForRequest`] so callers can
/// tell them apart from a body that serialized to nothing.
#[derive(Error, Debug)]
pub enum MakeBodyError {
    #[error("no body for this request")]
    NoBodyForRequest,

    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<MakeBodyError> for QueryDslError {
    fn from(error: MakeBodyError) -> Self {
        match error {
            MakeBodyError::NoBodyForRequest => QueryDslError::NoBodyForRequest,
            MakeBodyError::Serialization(error) => QueryDslError::Json(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = QueryDslError::missing_field("field");
        assert_eq!(error.to_string(), "missing required field: field");
        assert!(error.is_validation());

        let error = QueryDslError::at_least_one(["must", "should"]);
        assert_eq!(error.to_string(), "at least one of [must, should] is required");

        let error = QueryDslError::unrecognized("query", "matchy");
        assert_eq!(error.to_string(), "unrecognized query type: matchy");
        assert!(!error.is_validation());
    }

    #[test]
    fn test_key_count_description() {
        match QueryDslError::key_count("MatchQuery", 1, 2) {
            QueryDslError::KeyCountMismatch {
                type_name,
                expected,
                found,
                description,
            } => {
                assert_eq!(type_name, "MatchQuery");
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
                assert_eq!(
                    description,
                    "Unable to find field name in key(s) expect: 1 key found: 2."
                );
            }
            other => panic!("Expected key count mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = QueryDslError::from(io_error);

        match error {
            QueryDslError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_make_body_error_conversion() {
        let error = QueryDslError::from(MakeBodyError::NoBodyForRequest);
        assert!(matches!(error, QueryDslError::NoBodyForRequest));
        assert_eq!(error.to_string(), "no body for this request");
    }
}
