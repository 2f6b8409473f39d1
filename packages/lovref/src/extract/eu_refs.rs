//! EU legal-basis reference extraction.
//!
//! Finds directive, regulation and decision citations (named forms such as
//! "Regulation (EU) 2016/679" or "direktiv 95/46/EF", and CELEX numbers) and
//! classifies each by the relationship verb in its sentence. Whether a
//! reference is the primary implementation is never read from the text: it
//! comes from the caller's legal-basis designation of the scanned source.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::config::{ARTICLE_LOOKBEHIND_CHARS, EU_CONTEXT_WIDTH};
use crate::patterns::{eu_document_id, eu_year_and_number, find_celex_ids, find_last_eu_article};
use crate::text::{sentence_around, window_around};
use crate::types::{EuReference, ProvisionRef, ReferenceType};

#[allow(clippy::expect_used)]
/// Named EU act: "Directive 95/46/EC", "Regulation (EU) 2016/679",
/// "forordning (EU) nr. 2016/679", "direktiv 2016/680/EU".
static NAMED_EU_ACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(direktiv|directive|forordning|regulation|beslutning|decision)\s+(?:\((?:EU|EF|EØF|EC|EEC|Euratom)\)\s+)?(?:nr\.?\s*|no\.?\s*)?(\d{2,4})/(\d{1,4})(?:/(?:EU|EF|EØF|EC|EEC))?\b",
    )
    .expect("valid regex")
});

/// Phrases marking the citing text as implementing the act.
const IMPLEMENTS_PHRASES: &[&str] = &[
    "gennemfører",
    "gennemførelse af",
    "implementerer",
    "implementering af",
    "implementer af",
];

/// Phrases marking the citing text as supplementing or amending around the act.
const SUPPLEMENTS_PHRASES: &[&str] = &["som ændret ved", "supplerer", "supplerende bestemmelser til"];

/// A piece of text to scan, with its place in the document.
#[derive(Debug, Clone, Copy)]
pub struct EuTextSource<'a> {
    /// `None` for document-level text such as the title.
    pub provision: Option<&'a ProvisionRef>,
    pub text: &'a str,
    /// Whether the caller designated this text as the legal basis.
    pub is_legal_basis: bool,
}

impl<'a> EuTextSource<'a> {
    #[must_use]
    pub fn new(provision: Option<&'a ProvisionRef>, text: &'a str) -> Self {
        Self {
            provision,
            text,
            is_legal_basis: false,
        }
    }

    #[must_use]
    pub fn legal_basis(mut self, is_legal_basis: bool) -> Self {
        self.is_legal_basis = is_legal_basis;
        self
    }
}

/// Classify the relationship from the sentence around a citation.
///
/// # Examples
/// ```
/// use lovref::extract::classify_reference;
/// use lovref::types::ReferenceType;
///
/// assert_eq!(classify_reference("Loven gennemfører direktiv 2016/680/EU."), ReferenceType::Implements);
/// assert_eq!(classify_reference("Direktiv 95/46/EF som ændret ved ..."), ReferenceType::Supplements);
/// assert_eq!(classify_reference("Se forordning (EU) 2016/679."), ReferenceType::Applies);
/// ```
#[must_use]
pub fn classify_reference(sentence: &str) -> ReferenceType {
    let lowered = sentence.to_lowercase();
    if IMPLEMENTS_PHRASES.iter().any(|p| lowered.contains(p)) {
        ReferenceType::Implements
    } else if SUPPLEMENTS_PHRASES.iter().any(|p| lowered.contains(p)) {
        ReferenceType::Supplements
    } else {
        ReferenceType::Applies
    }
}

/// EU document ids in `text` with the byte offset they start at.
fn find_eu_acts(text: &str) -> Vec<(String, usize)> {
    let mut acts: Vec<(String, usize)> = NAMED_EU_ACT
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (year, number) = eu_year_and_number(caps.get(2)?.as_str(), caps.get(3)?.as_str());
            Some((eu_document_id(&caps[1], year, number), whole.start()))
        })
        .collect();
    acts.extend(find_celex_ids(text).map(|found| (found.value, found.range.start)));
    acts.sort_by_key(|(_, start)| *start);
    acts
}

/// Article mentioned just before `start` ("artikel 6, stk. 1, i forordning ...").
fn article_before(text: &str, start: usize) -> Option<String> {
    let before = text.get(..start)?;
    let skip = before.chars().count().saturating_sub(ARTICLE_LOOKBEHIND_CHARS);
    let window: String = before.chars().skip(skip).collect();
    find_last_eu_article(&window)
}

fn scan_source(document_id: &str, source: &EuTextSource<'_>) -> Vec<EuReference> {
    find_eu_acts(source.text)
        .into_iter()
        .map(|(eu_document_id, start)| {
            let sentence_range = sentence_around(source.text, start);
            let sentence = source.text.get(sentence_range.clone()).unwrap_or_default();
            let focus = start.saturating_sub(sentence_range.start);

            EuReference {
                document_id: document_id.to_string(),
                provision_id: source.provision.map(ToString::to_string),
                eu_document_id,
                eu_article: article_before(source.text, start),
                reference_type: classify_reference(sentence),
                is_primary_implementation: source.is_legal_basis,
                context: window_around(sentence, focus, EU_CONTEXT_WIDTH),
            }
        })
        .collect()
}

/// Collapse references sharing document, provision, EU act and article.
///
/// The strongest relationship wins (implements over supplements over
/// applies) and the primary flag is kept if any duplicate carried it.
fn merge_duplicates(references: Vec<EuReference>) -> Vec<EuReference> {
    type Key = (String, Option<String>, String, Option<String>);
    let mut index: HashMap<Key, usize> = HashMap::new();
    let mut merged: Vec<EuReference> = Vec::new();

    for reference in references {
        let key = (
            reference.document_id.clone(),
            reference.provision_id.clone(),
            reference.eu_document_id.clone(),
            reference.eu_article.clone(),
        );
        let Some(existing) = index.get(&key).and_then(|&i| merged.get_mut(i)) else {
            index.insert(key, merged.len());
            merged.push(reference);
            continue;
        };

        let primary = existing.is_primary_implementation || reference.is_primary_implementation;
        if reference.reference_type > existing.reference_type {
            *existing = reference;
        }
        existing.is_primary_implementation = primary;
    }

    merged
}

/// Find EU act citations in the given sources.
///
/// # Examples
/// ```
/// use lovref::extract::{extract_eu_references, EuTextSource};
/// use lovref::types::{ProvisionRef, ReferenceType};
///
/// let basis = ProvisionRef::section("1");
/// let text = "Loven gennemfører dele af Regulation (EU) 2016/679.";
/// let refs = extract_eu_references("2018:502", &[EuTextSource::new(Some(&basis), text).legal_basis(true)]);
/// assert_eq!(refs[0].eu_document_id, "regulation:2016/679");
/// assert_eq!(refs[0].reference_type, ReferenceType::Implements);
/// assert!(refs[0].is_primary_implementation);
/// ```
#[must_use]
pub fn extract_eu_references(document_id: &str, sources: &[EuTextSource<'_>]) -> Vec<EuReference> {
    let references: Vec<EuReference> = sources
        .iter()
        .flat_map(|source| scan_source(document_id, source))
        .collect();
    let merged = merge_duplicates(references);
    tracing::debug!(document_id, references = merged.len(), "Extracted EU references");
    merged
}
