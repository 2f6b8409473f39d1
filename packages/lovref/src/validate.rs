//! Citation validation against a provision store.
//!
//! The validator never asserts a match on its own: a citation is matched only
//! when the injected [`ProvisionLookup`] confirms that the document and the
//! provision exist. Lookup failures degrade to an unmatched result.
//!
//! # Example
//!
//! ```
//! use lovref::citation::parse_citation;
//! use lovref::types::{DocumentMeta, ProvisionRef};
//! use lovref::validate::{validate_citation, InMemoryProvisionStore};
//!
//! let mut store = InMemoryProvisionStore::new();
//! store.add_document(DocumentMeta::new("2018:502"));
//! store.add_provision("2018:502", ProvisionRef::new(Some("1".to_string()), "1"));
//!
//! let citation = parse_citation("2018:502 § 1").unwrap();
//! let result = validate_citation(&citation, &store, None);
//! assert!(result.matched);
//! ```

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

use crate::config::MAX_SIBLING_HINTS;
use crate::error::{LookupError, Result};
use crate::extract::ExtractionSeed;
use crate::types::{
    DocumentMeta, InForceWindow, ProvisionRef, ResolvedProvision, StructuredCitation,
    ValidationResult,
};

/// Warning for a citation whose document is unknown to the store.
pub const DOCUMENT_NOT_FOUND: &str = "document not found";

/// Warning for a citation whose document exists but whose provision does not.
pub const PROVISION_NOT_FOUND: &str = "document exists, provision not found";

/// Answer of a [`ProvisionLookup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResult {
    /// Whether the document (or, when a provision was asked for, the provision) exists.
    pub exists: bool,
    /// In-force window of what was looked up, when known.
    pub in_force: Option<InForceWindow>,
    /// Other provisions of the same document, used for hints.
    pub sibling_refs: Vec<ProvisionRef>,
    /// The stored provision the query resolved to, if the store qualifies it further.
    pub resolved: Option<ProvisionRef>,
}

impl LookupResult {
    /// Nothing found.
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    /// Found, with an optional in-force window.
    #[must_use]
    pub fn found(in_force: Option<InForceWindow>) -> Self {
        Self {
            exists: true,
            in_force,
            ..Self::default()
        }
    }
}

/// Capability to check whether a document or provision exists.
///
/// With `provision` set to `None` the lookup is about the document alone.
pub trait ProvisionLookup {
    /// Look up a document or one of its provisions.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] when the store cannot answer.
    fn lookup(
        &self,
        document_id: &str,
        provision: Option<&ProvisionRef>,
        as_of: Option<NaiveDate>,
    ) -> std::result::Result<LookupResult, LookupError>;
}

/// Check a citation against a provision store.
///
/// Never fails: missing documents, missing provisions and lookup errors all
/// produce an unmatched result with warnings. A date outside the in-force
/// window adds an advisory warning to an otherwise matched result.
pub fn validate_citation<L: ProvisionLookup + ?Sized>(
    citation: &StructuredCitation,
    store: &L,
    as_of: Option<NaiveDate>,
) -> ValidationResult {
    let document_id = citation.document_id.as_str();

    let document = match store.lookup(document_id, None, as_of) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(document_id, error = %err, "Document lookup failed");
            return ValidationResult::unmatched(err.to_string());
        }
    };
    if !document.exists {
        return ValidationResult::unmatched(DOCUMENT_NOT_FOUND);
    }

    let mut window = document.in_force;
    let mut resolved = ResolvedProvision {
        document_id: document_id.to_string(),
        provision: None,
    };

    if let Some(provision) = citation.provision_ref() {
        let found = match store.lookup(document_id, Some(&provision), as_of) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(
                    document_id,
                    provision = %provision,
                    error = %err,
                    "Provision lookup failed"
                );
                return ValidationResult::unmatched(err.to_string());
            }
        };

        if !found.exists {
            let mut result = ValidationResult::unmatched(PROVISION_NOT_FOUND);
            let nearest = nearest_siblings(&provision, &found.sibling_refs, MAX_SIBLING_HINTS);
            if !nearest.is_empty() {
                let hint = nearest
                    .iter()
                    .map(|r| format!("§ {}", r.section))
                    .collect::<Vec<_>>()
                    .join(", ");
                result.warnings.push(format!("nearest sections: {hint}"));
            }
            return result;
        }

        window = found.in_force.or(window);
        resolved.provision = Some(found.resolved.unwrap_or(provision));
    }

    let mut result = ValidationResult::matched(resolved);
    if let (Some(date), Some(window)) = (as_of, window) {
        if !window.contains(date) {
            result
                .warnings
                .push(format!("not in force on {date} (in force {window})"));
        }
    }
    result
}

/// Numeric part and suffix of a section, for ordering ("5 a" -> (5, "a")).
fn section_key(section: &str) -> (Option<u64>, &str) {
    let digits_end = section
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(section.len());
    (
        section[..digits_end].parse().ok(),
        section[digits_end..].trim(),
    )
}

/// Up to `limit` siblings closest to `target`, nearest first.
fn nearest_siblings(target: &ProvisionRef, siblings: &[ProvisionRef], limit: usize) -> Vec<ProvisionRef> {
    let (Some(target_number), _) = section_key(&target.section) else {
        return siblings.iter().take(limit).cloned().collect();
    };

    let mut ranked: Vec<(u64, &ProvisionRef)> = siblings
        .iter()
        .filter(|sibling| *sibling != target)
        .filter_map(|sibling| {
            let (number, _) = section_key(&sibling.section);
            number.map(|n| (n.abs_diff(target_number), sibling))
        })
        .collect();
    // Stable: equal distances keep document order.
    ranked.sort_by_key(|(distance, _)| *distance);
    ranked.into_iter().take(limit).map(|(_, r)| r.clone()).collect()
}

#[derive(Debug, Clone, Default)]
struct StoredDocument {
    meta: DocumentMeta,
    provisions: Vec<(ProvisionRef, Option<InForceWindow>)>,
}

/// Provision store held in memory, filled from extraction seeds.
///
/// A provision ref without chapter matches any chapter, so "§ 5" finds a
/// section stored as "3:5".
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvisionStore {
    documents: HashMap<String, StoredDocument>,
}

impl InMemoryProvisionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document, replacing its metadata if already present.
    pub fn add_document(&mut self, meta: DocumentMeta) {
        let key = meta.document_id.clone();
        self.documents.entry(key).or_default().meta = meta;
    }

    /// Register a provision; the document is created if unknown.
    pub fn add_provision(&mut self, document_id: &str, provision: ProvisionRef) {
        self.add_provision_in_force(document_id, provision, None);
    }

    /// Register a provision with its own in-force window.
    pub fn add_provision_in_force(
        &mut self,
        document_id: &str,
        provision: ProvisionRef,
        in_force: Option<InForceWindow>,
    ) {
        let document = self
            .documents
            .entry(document_id.to_string())
            .or_insert_with(|| StoredDocument {
                meta: DocumentMeta::new(document_id),
                provisions: Vec::new(),
            });
        if let Some(existing) = document.provisions.iter_mut().find(|(r, _)| *r == provision) {
            existing.1 = in_force.or(existing.1);
        } else {
            document.provisions.push((provision, in_force));
        }
    }

    /// Load everything an extraction seed knows about its document.
    pub fn add_seed(&mut self, seed: &ExtractionSeed) {
        let document_id = seed.document.document_id.clone();
        self.add_document(seed.document.clone());
        for provision in &seed.provisions {
            let window = seed
                .provision_versions
                .iter()
                .find(|version| version.provision_ref == provision.provision_ref)
                .map(|version| InForceWindow::new(version.valid_from, version.valid_to));
            self.add_provision_in_force(&document_id, provision.provision_ref.clone(), window);
        }
        tracing::debug!(
            document_id = %document_id,
            provisions = seed.provisions.len(),
            "Loaded seed into store"
        );
    }

    /// Read a JSON or YAML seed file (by extension) into the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialized.
    pub fn load_seed_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let seed: ExtractionSeed = if is_yaml {
            serde_yaml_ng::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        self.add_seed(&seed);
        Ok(())
    }

    /// Number of documents in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ProvisionLookup for InMemoryProvisionStore {
    fn lookup(
        &self,
        document_id: &str,
        provision: Option<&ProvisionRef>,
        _as_of: Option<NaiveDate>,
    ) -> std::result::Result<LookupResult, LookupError> {
        let Some(document) = self.documents.get(document_id) else {
            return Ok(LookupResult::missing());
        };
        let Some(provision) = provision else {
            return Ok(LookupResult::found(Some(document.meta.in_force)));
        };

        let found = document
            .provisions
            .iter()
            .find(|(stored, _)| stored.matches(provision));
        Ok(match found {
            Some((stored, window)) => LookupResult {
                exists: true,
                in_force: window.or(Some(document.meta.in_force)),
                sibling_refs: Vec::new(),
                resolved: Some(stored.clone()),
            },
            None => LookupResult {
                sibling_refs: document.provisions.iter().map(|(r, _)| r.clone()).collect(),
                ..LookupResult::missing()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> InMemoryProvisionStore {
        let mut store = InMemoryProvisionStore::new();
        store.add_document(DocumentMeta::new("2018:502").with_in_force(InForceWindow::new(
            Some(date(2018, 5, 25)),
            None,
        )));
        for section in ["1", "2", "3", "5", "5 a", "9"] {
            store.add_provision("2018:502", ProvisionRef::new(Some("1".to_string()), section));
        }
        store
    }

    struct FailingStore;

    impl ProvisionLookup for FailingStore {
        fn lookup(
            &self,
            _document_id: &str,
            _provision: Option<&ProvisionRef>,
            _as_of: Option<NaiveDate>,
        ) -> std::result::Result<LookupResult, LookupError> {
            Err(LookupError::new("database unavailable"))
        }
    }

    /// Claims the document exists but knows no provisions.
    struct DocumentOnlyStore;

    impl ProvisionLookup for DocumentOnlyStore {
        fn lookup(
            &self,
            _document_id: &str,
            provision: Option<&ProvisionRef>,
            _as_of: Option<NaiveDate>,
        ) -> std::result::Result<LookupResult, LookupError> {
            Ok(match provision {
                None => LookupResult::found(None),
                Some(_) => LookupResult::missing(),
            })
        }
    }

    #[test]
    fn test_validate_unknown_document() {
        let citation = StructuredCitation::new("9999:1").with_section("1");
        let result = validate_citation(&citation, &InMemoryProvisionStore::new(), None);
        assert!(!result.matched);
        assert_eq!(result.warnings, vec![DOCUMENT_NOT_FOUND.to_string()]);
        assert!(result.resolved.is_none());
    }

    #[test]
    fn test_validate_existing_provision() {
        let citation = StructuredCitation::new("2018:502").with_section("5 a");
        let result = validate_citation(&citation, &store(), None);
        assert!(result.matched);
        assert!(result.warnings.is_empty());
        let resolved = result.resolved.unwrap();
        assert_eq!(resolved.provision.unwrap().to_string(), "1:5 a");
    }

    #[test]
    fn test_validate_chapter_mismatch_is_not_found() {
        let citation = StructuredCitation::new("2018:502")
            .with_chapter("2")
            .with_section("5");
        let result = validate_citation(&citation, &store(), None);
        assert!(!result.matched);
        assert_eq!(result.warnings[0], PROVISION_NOT_FOUND);
    }

    #[test]
    fn test_validate_missing_provision_hints_siblings() {
        let citation = StructuredCitation::new("2018:502").with_section("4");
        let result = validate_citation(&citation, &store(), None);
        assert!(!result.matched);
        assert_eq!(result.warnings[0], PROVISION_NOT_FOUND);
        assert_eq!(result.warnings[1], "nearest sections: § 3, § 5, § 5 a");
    }

    #[test]
    fn test_validate_document_only_citation() {
        let citation = StructuredCitation::new("2018:502");
        let result = validate_citation(&citation, &store(), None);
        assert!(result.matched);
        assert_eq!(result.resolved.unwrap().provision, None);
    }

    #[test]
    fn test_validate_out_of_force_is_advisory() {
        let citation = StructuredCitation::new("2018:502").with_section("1");
        let result = validate_citation(&citation, &store(), Some(date(2017, 1, 1)));
        assert!(result.matched);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("not in force on 2017-01-01"));

        let result = validate_citation(&citation, &store(), Some(date(2020, 1, 1)));
        assert!(result.matched);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_lookup_error_is_unmatched() {
        let citation = StructuredCitation::new("2018:502").with_section("1");
        let result = validate_citation(&citation, &FailingStore, None);
        assert!(!result.matched);
        assert!(result.warnings[0].contains("database unavailable"));
    }

    #[test]
    fn test_validate_never_matches_unconfirmed_provision() {
        let citation = StructuredCitation::new("2018:502").with_section("1");
        let result = validate_citation(&citation, &DocumentOnlyStore, None);
        assert!(!result.matched);
        assert_eq!(result.warnings, vec![PROVISION_NOT_FOUND.to_string()]);
    }

    #[test]
    fn test_validate_eu_article_as_provision() {
        let mut store = InMemoryProvisionStore::new();
        store.add_provision("regulation:2016/679", ProvisionRef::section("6"));
        let citation = StructuredCitation::new("regulation:2016/679").with_eu_article("6");
        assert!(validate_citation(&citation, &store, None).matched);
    }

    #[test]
    fn test_nearest_siblings_orders_by_distance() {
        let siblings: Vec<ProvisionRef> = ["1", "10", "7", "8"]
            .iter()
            .map(ProvisionRef::section)
            .collect();
        let nearest = nearest_siblings(&ProvisionRef::section("9"), &siblings, 2);
        assert_eq!(nearest, vec![ProvisionRef::section("10"), ProvisionRef::section("8")]);
    }

    #[test]
    fn test_add_document_replaces_meta_and_keeps_provisions() {
        let mut store = store();
        store.add_document(DocumentMeta::new("2018:502").with_in_force(InForceWindow::new(
            Some(date(2016, 1, 1)),
            None,
        )));
        assert_eq!(store.len(), 1);

        let citation = StructuredCitation::new("2018:502").with_section("5 a");
        let result = validate_citation(&citation, &store, Some(date(2017, 1, 1)));
        assert!(result.matched);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_store_provision_window_overrides_document() {
        let mut store = store();
        store.add_provision_in_force(
            "2018:502",
            ProvisionRef::new(Some("1".to_string()), "9"),
            Some(InForceWindow::new(None, Some(date(2019, 12, 31)))),
        );
        let citation = StructuredCitation::new("2018:502").with_section("9");
        let result = validate_citation(&citation, &store, Some(date(2021, 1, 1)));
        assert!(result.matched);
        assert_eq!(result.warnings.len(), 1);
    }
}
