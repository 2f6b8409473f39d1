//! Error types for lovref.
//!
//! Uses the dual-error pattern: `LovrefError` for library consumers and the
//! CLI, and narrow error types (`ParseError`, `FormatError`, `LookupError`)
//! returned by the individual pipeline stages.

use thiserror::Error;

/// Failure to turn a citation string into a structured citation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was empty after normalization.
    #[error("Citation is empty")]
    Empty,

    /// No document identifier could be isolated and none was supplied.
    #[error("No document identifier found in citation: '{input}'")]
    MissingDocumentId { input: String },

    /// A chapter was given without any section.
    #[error("Chapter given without a section in citation: '{input}'")]
    ChapterWithoutSection { input: String },
}

/// Failure to render a structured citation.
///
/// Only reachable with a hand-built citation; anything produced by the
/// parser carries at least a document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Citation carries neither a location nor a document identifier.
    #[error("Citation has neither a section, an article nor a document identifier")]
    MissingLocation,
}

/// Failure reported by a provision store while answering a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Provision lookup failed: {message}")]
pub struct LookupError {
    pub message: String,
}

impl LookupError {
    /// Create a lookup error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Main error type for the lovref library.
#[derive(Debug, Error)]
pub enum LovrefError {
    /// Citation could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Citation could not be formatted.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Invalid document identifier.
    #[error("Invalid document identifier: '{0}'. Expected YYYY:N, type:YYYY/N or a short name")]
    InvalidDocumentId(String),

    /// Invalid date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2018-05-25)")]
    InvalidDate(String),

    /// Unknown citation style.
    #[error("Unknown citation style: '{0}'. Expected full, short or pinpoint")]
    InvalidStyle(String),

    /// Unknown output format.
    #[error("Unknown output format: '{0}'. Expected json or yaml")]
    InvalidFormat(String),

    /// Input could not be turned into a document tree.
    #[error("Invalid document tree: {0}")]
    InvalidTree(String),

    /// Citation did not resolve against the provision store.
    #[error("Citation not matched: {0}")]
    Unmatched(String),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for lovref operations.
pub type Result<T> = std::result::Result<T, LovrefError>;
