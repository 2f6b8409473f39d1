//! Memoized citation parsing.

use std::collections::HashMap;

use crate::citation::parse_citation_in;
use crate::error::ParseError;
use crate::types::StructuredCitation;

type CacheKey = (String, Option<String>);

/// Parse results keyed by raw input and ambient document id.
///
/// Parsing is pure, so failures are cached alongside successes.
#[derive(Debug, Default)]
pub struct CitationCache {
    entries: HashMap<CacheKey, Result<StructuredCitation, ParseError>>,
    hits: usize,
}

impl CitationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `input`, reusing an earlier result for the same input and ambient id.
    ///
    /// # Errors
    ///
    /// Returns the same [`ParseError`] as [`parse_citation_in`].
    pub fn parse(
        &mut self,
        input: &str,
        ambient_document_id: Option<&str>,
    ) -> Result<StructuredCitation, ParseError> {
        let key = (input.to_string(), ambient_document_id.map(str::to_string));
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return cached.clone();
        }
        let result = parse_citation_in(input, ambient_document_id);
        self.entries.insert(key, result.clone());
        result
    }

    /// Number of distinct inputs parsed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered from the cache.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
    }
}
