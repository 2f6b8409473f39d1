//! Lovref - Citations to Danish statutes and their EU legal basis.
//!
//! This crate parses free-form citations such as `"2018:502 § 5, stk. 2"`
//! into structured form, renders them back, checks them against a store of
//! known provisions, and extracts provisions, cross-references, EU
//! references and definitions from LexDania document trees.
//!
//! # Example
//!
//! ```
//! use lovref::citation::{format_citation, parse_citation, CitationStyle};
//!
//! let citation = parse_citation("2018:502 § 5, stk. 2").unwrap();
//! assert_eq!(citation.document_id, "2018:502");
//! assert_eq!(citation.section.as_deref(), Some("5"));
//! assert_eq!(
//!     format_citation(&citation, CitationStyle::Short).unwrap(),
//!     "§ 5"
//! );
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants and input validation
//! - [`types`]: Core data types (citations, provisions, references)
//! - [`error`]: Error types and Result alias
//! - [`text`]: Text normalization and sentence helpers
//! - [`patterns`]: Citation grammar matchers shared by parser and extractors
//! - [`citation`]: Citation parsing, formatting and caching
//! - [`validate`]: Validation against a provision lookup
//! - [`tree`]: Document trees from XML and JSON
//! - [`extract`]: Provision, reference and definition extraction
//! - [`output`]: Seed record writer
//! - [`cli`]: Command-line interface

pub mod citation;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod patterns;
pub mod text;
pub mod tree;
pub mod types;
pub mod validate;

// Re-export commonly used items
pub use citation::{format_citation, parse_citation, parse_citation_in, CitationStyle};
pub use config::{validate_date, validate_document_id};
pub use error::{LovrefError, Result};
pub use extract::{extract_document, DocumentExtraction, ExtractionSeed};
pub use types::{
    CrossReference, Definition, EuReference, LegalProvision, ProvisionRef, ReferenceType,
    StructuredCitation, ValidationResult,
};
pub use validate::{validate_citation, InMemoryProvisionStore, ProvisionLookup};
