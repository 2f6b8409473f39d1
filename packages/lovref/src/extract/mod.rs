//! Per-document extraction pipeline.
//!
//! One call turns a document tree into everything the storage layer needs:
//! provisions, cross-references, EU references and definitions, plus the
//! warnings collected on the way. [`DocumentExtraction::to_seed`] shapes the
//! result into the record written by [`crate::output`].

mod cross_refs;
mod definitions;
mod eu_refs;
mod provisions;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::tree::DocumentNode;
use crate::types::{
    CrossReference, Definition, DocumentMeta, EuReference, LegalProvision, ProvisionRef,
};

pub use cross_refs::extract_cross_references;
pub use definitions::{definitions_in, extract_definitions};
pub use eu_refs::{classify_reference, extract_eu_references, EuTextSource};
pub use provisions::{deduplicate_provisions, extract_provisions, ExtractionWarning, WarningKind};

/// Everything extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub document: DocumentMeta,
    pub provisions: Vec<LegalProvision>,
    pub cross_references: Vec<CrossReference>,
    pub eu_references: Vec<EuReference>,
    pub definitions: Vec<Definition>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Extract a document.
///
/// `legal_basis` names the provisions the caller designates as the legal
/// basis; EU references found in them are flagged as primary implementations.
/// The document title is scanned for EU references at document level.
///
/// # Examples
/// ```
/// use lovref::extract::extract_document;
/// use lovref::tree::{DocumentNode, HeadingKind};
/// use lovref::types::{DocumentMeta, ProvisionRef};
///
/// let tree = DocumentNode::section(Some("P1"), vec![
///     DocumentNode::text("Ved tobaksvarer forstås varer af tobak."),
/// ]);
/// let meta = DocumentMeta::new("2018:502");
/// let extraction = extract_document(&meta, &tree, &[]);
/// assert_eq!(extraction.provisions.len(), 1);
/// assert_eq!(extraction.definitions[0].term, "tobaksvarer");
/// ```
#[must_use]
pub fn extract_document(
    meta: &DocumentMeta,
    tree: &DocumentNode,
    legal_basis: &[ProvisionRef],
) -> DocumentExtraction {
    let document_id = meta.document_id.as_str();
    let (provisions, warnings) = extract_provisions(document_id, tree);
    let cross_references = extract_cross_references(&provisions);
    let definitions = extract_definitions(&provisions);

    let mut sources: Vec<EuTextSource<'_>> = Vec::with_capacity(provisions.len() + 1);
    if let Some(title) = &meta.title {
        sources.push(EuTextSource::new(None, title));
    }
    sources.extend(provisions.iter().map(|provision| {
        let is_basis = legal_basis
            .iter()
            .any(|basis| basis.matches(&provision.provision_ref));
        EuTextSource::new(Some(&provision.provision_ref), &provision.content).legal_basis(is_basis)
    }));
    let eu_references = extract_eu_references(document_id, &sources);

    tracing::info!(
        document_id,
        provisions = provisions.len(),
        cross_references = cross_references.len(),
        eu_references = eu_references.len(),
        definitions = definitions.len(),
        warnings = warnings.len(),
        "Extracted document"
    );

    DocumentExtraction {
        document: meta.clone(),
        provisions,
        cross_references,
        eu_references,
        definitions,
        warnings,
    }
}

/// A provision as stored in the seed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionSeed {
    pub provision_ref: ProvisionRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
}

/// A dated version of a provision's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionVersion {
    pub provision_ref: ProvisionRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDate>,
    /// Lower-case hex SHA-256 of the content.
    pub content_hash: String,
}

/// Seed record for one document, as handed to the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSeed {
    pub document: DocumentMeta,
    #[serde(default)]
    pub provisions: Vec<ProvisionSeed>,
    #[serde(default)]
    pub provision_versions: Vec<ProvisionVersion>,
    #[serde(default)]
    pub cross_references: Vec<CrossReference>,
    #[serde(default)]
    pub eu_references: Vec<EuReference>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

/// Lower-case hex SHA-256 of a provision's content.
#[must_use]
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

impl DocumentExtraction {
    /// Shape the extraction into a seed record.
    ///
    /// Every provision gets one version carrying the document's in-force
    /// window and a hash of its content.
    #[must_use]
    pub fn to_seed(&self) -> ExtractionSeed {
        let window = self.document.in_force;
        ExtractionSeed {
            document: self.document.clone(),
            provisions: self
                .provisions
                .iter()
                .map(|p| ProvisionSeed {
                    provision_ref: p.provision_ref.clone(),
                    chapter: p.chapter.clone(),
                    section: p.section.clone(),
                    title: p.title.clone(),
                    content: p.content.clone(),
                })
                .collect(),
            provision_versions: self
                .provisions
                .iter()
                .map(|p| ProvisionVersion {
                    provision_ref: p.provision_ref.clone(),
                    valid_from: window.from,
                    valid_to: window.to,
                    content_hash: content_hash(&p.content),
                })
                .collect(),
            cross_references: self.cross_references.clone(),
            eu_references: self.eu_references.clone(),
            definitions: self.definitions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::HeadingKind;
    use crate::types::{InForceWindow, ReferenceType};

    fn tree() -> DocumentNode {
        DocumentNode::group(vec![DocumentNode::chapter(
            Some("K1"),
            vec![
                DocumentNode::section(
                    Some("P1"),
                    vec![
                        DocumentNode::heading(HeadingKind::Explicatus, "§ 1."),
                        DocumentNode::text(
                            "Loven gennemfører dele af Regulation (EU) 2016/679, jf. § 2.",
                        ),
                    ],
                ),
                DocumentNode::section(
                    Some("P2"),
                    vec![DocumentNode::text(
                        "Ved personoplysninger forstås enhver information.",
                    )],
                ),
            ],
        )])
    }

    #[test]
    fn test_extract_document_wires_all_extractors() {
        let meta = DocumentMeta::new("2018:502").with_title("Databeskyttelsesloven");
        let extraction = extract_document(&meta, &tree(), &[ProvisionRef::section("1")]);

        assert_eq!(extraction.provisions.len(), 2);
        assert_eq!(extraction.cross_references.len(), 1);
        assert_eq!(
            extraction.cross_references[0].target_provision,
            Some(ProvisionRef::section("2"))
        );
        assert_eq!(extraction.definitions[0].term, "personoplysninger");

        let eu = &extraction.eu_references[0];
        assert_eq!(eu.eu_document_id, "regulation:2016/679");
        assert_eq!(eu.reference_type, ReferenceType::Implements);
        assert!(eu.is_primary_implementation);
        assert_eq!(eu.provision_id.as_deref(), Some("1:1"));
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_legal_basis_not_designated() {
        let meta = DocumentMeta::new("2018:502");
        let extraction = extract_document(&meta, &tree(), &[]);
        assert!(!extraction.eu_references[0].is_primary_implementation);
    }

    #[test]
    fn test_title_scanned_at_document_level() {
        let meta = DocumentMeta::new("2018:502")
            .with_title("Lov om supplerende bestemmelser til forordning (EU) 2016/679");
        let extraction = extract_document(&meta, &DocumentNode::group(Vec::new()), &[]);
        assert_eq!(extraction.eu_references.len(), 1);
        assert_eq!(extraction.eu_references[0].provision_id, None);
        assert_eq!(
            extraction.eu_references[0].reference_type,
            ReferenceType::Supplements
        );
    }

    #[test]
    fn test_to_seed_versions() {
        let from = NaiveDate::from_ymd_opt(2018, 5, 25).unwrap();
        let meta = DocumentMeta::new("2018:502")
            .with_in_force(InForceWindow::new(Some(from), None));
        let seed = extract_document(&meta, &tree(), &[]).to_seed();

        assert_eq!(seed.provisions.len(), 2);
        assert_eq!(seed.provision_versions.len(), 2);
        let version = &seed.provision_versions[1];
        assert_eq!(version.provision_ref.to_string(), "1:2");
        assert_eq!(version.valid_from, Some(from));
        assert_eq!(version.valid_to, None);
        assert_eq!(
            version.content_hash,
            content_hash("Ved personoplysninger forstås enhver information.")
        );
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_hash("abc").len(), 64);
    }
}
