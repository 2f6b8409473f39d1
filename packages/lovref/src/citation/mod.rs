//! Citation parsing, formatting and caching.
//!
//! Parsing turns a free-form citation ("2018:502 § 3, stk. 5") into a
//! [`StructuredCitation`](crate::types::StructuredCitation); formatting
//! renders it back in one of the [`CitationStyle`]s. `full` output always
//! parses back to an equal citation.

mod cache;
mod format;
mod parser;

pub use cache::CitationCache;
pub use format::{format_citation, CitationStyle};
pub use parser::{parse_citation, parse_citation_in};
