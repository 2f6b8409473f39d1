//! End-to-end integration tests for the extraction and validation pipeline.
//!
//! Runs the LexDania fixture of the Danish data protection act (2018:502)
//! through tree building, extraction, seed writing and validation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use lovref::citation::{format_citation, parse_citation, parse_citation_in, CitationStyle};
use lovref::extract::{extract_document, DocumentExtraction, WarningKind};
use lovref::output::{save_seed, OutputFormat};
use lovref::tree::{load_tree, parse_xml, DocumentNode};
use lovref::types::{DocumentMeta, InForceWindow, ProvisionRef, ReferenceType};
use lovref::validate::{
    validate_citation, InMemoryProvisionStore, DOCUMENT_NOT_FOUND, PROVISION_NOT_FOUND,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn in_force_from() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 5, 25).unwrap()
}

fn meta() -> DocumentMeta {
    DocumentMeta::new("2018:502")
        .with_title("Databeskyttelsesloven")
        .with_in_force(InForceWindow::new(Some(in_force_from()), None))
}

/// Run extraction on the fixture with § 1 designated as legal basis.
fn run_pipeline() -> DocumentExtraction {
    let tree = parse_xml(&load_fixture("databeskyttelsesloven.xml")).expect("fixture parses");
    extract_document(&meta(), &tree, &[ProvisionRef::section("1")])
}

fn store() -> InMemoryProvisionStore {
    let mut store = InMemoryProvisionStore::new();
    store.add_seed(&run_pipeline().to_seed());
    store
}

#[test]
fn test_provisions_carry_chapter_and_section() {
    let extraction = run_pipeline();
    let refs: Vec<String> = extraction
        .provisions
        .iter()
        .map(|p| p.provision_ref.to_string())
        .collect();
    assert_eq!(refs, vec!["1:1", "1:2", "2:5", "2:5 a"]);

    let definitions = &extraction.provisions[1];
    assert_eq!(definitions.title.as_deref(), Some("Definitioner"));
    assert!(extraction
        .provisions
        .iter()
        .all(|p| !p.content.is_empty() && p.document_id == "2018:502"));
}

#[test]
fn test_inline_markup_joins_text() {
    let extraction = run_pipeline();
    assert!(extraction.provisions[0]
        .content
        .contains("reglerne i databeskyttelsesforordningen, jf. § 2."));
}

#[test]
fn test_signature_and_unnumbered_section() {
    let extraction = run_pipeline();
    assert!(extraction
        .provisions
        .iter()
        .all(|p| !p.content.contains("Christiansborg")));
    assert_eq!(extraction.warnings.len(), 1);
    assert_eq!(extraction.warnings[0].kind, WarningKind::UnresolvedSection);
    assert_eq!(extraction.warnings[0].chapter.as_deref(), Some("2"));
}

#[test]
fn test_cross_references() {
    let extraction = run_pipeline();
    let found: Vec<(String, String, Option<String>, Option<String>)> = extraction
        .cross_references
        .iter()
        .map(|r| {
            (
                r.source_provision.to_string(),
                r.target_document_id.clone(),
                r.target_provision.as_ref().map(|p| p.section.clone()),
                r.pinpoint.clone(),
            )
        })
        .collect();

    assert_eq!(
        found,
        vec![
            ("1:1".into(), "2018:502".into(), Some("2".into()), None),
            ("2:5".into(), "2018:502".into(), Some("1".into()), None),
            ("2:5".into(), "2018:502".into(), Some("2".into()), None),
            ("2:5".into(), "2000:429".into(), Some("3".into()), None),
            ("2:5 a".into(), "2018:502".into(), Some("5".into()), Some("2".into())),
        ]
    );
}

#[test]
fn test_eu_references() {
    let extraction = run_pipeline();
    assert_eq!(extraction.eu_references.len(), 2);

    let basis = &extraction.eu_references[0];
    assert_eq!(basis.eu_document_id, "regulation:2016/679");
    assert_eq!(basis.provision_id.as_deref(), Some("1:1"));
    assert_eq!(basis.reference_type, ReferenceType::Implements);
    assert!(basis.is_primary_implementation);
    assert_eq!(basis.eu_article, None);

    let applied = &extraction.eu_references[1];
    assert_eq!(applied.eu_document_id, "regulation:2016/679");
    assert_eq!(applied.provision_id.as_deref(), Some("2:5"));
    assert_eq!(applied.eu_article.as_deref(), Some("6"));
    assert_eq!(applied.reference_type, ReferenceType::Applies);
    assert!(!applied.is_primary_implementation);
}

#[test]
fn test_definitions() {
    let extraction = run_pipeline();
    assert_eq!(extraction.definitions.len(), 1);
    let definition = &extraction.definitions[0];
    assert_eq!(definition.term, "personoplysninger");
    assert_eq!(
        definition.definition,
        "enhver form for information om en identificeret fysisk person."
    );
    assert_eq!(definition.source_provision.to_string(), "1:2");
}

#[test]
fn test_seed_versions_hash_content() {
    let seed = run_pipeline().to_seed();
    assert_eq!(seed.provision_versions.len(), seed.provisions.len());
    for (version, provision) in seed.provision_versions.iter().zip(&seed.provisions) {
        assert_eq!(version.provision_ref, provision.provision_ref);
        assert_eq!(version.valid_from, Some(in_force_from()));
        assert_eq!(version.content_hash.len(), 64);
    }
}

#[test]
fn test_validation_against_extracted_store() {
    let store = store();

    let result = validate_citation(&parse_citation("2018:502 § 5, stk. 2").unwrap(), &store, None);
    assert!(result.matched);
    assert!(result.warnings.is_empty());
    let resolved = result.resolved.unwrap();
    assert_eq!(resolved.document_id, "2018:502");
    assert_eq!(
        resolved.provision,
        Some(ProvisionRef::new(Some("2".to_string()), "5"))
    );

    let result = validate_citation(
        &parse_citation_in("§ 5a", Some("2018:502")).unwrap(),
        &store,
        None,
    );
    assert!(result.matched);

    let result = validate_citation(&parse_citation("2018:502").unwrap(), &store, None);
    assert!(result.matched);
}

#[test]
fn test_validation_failures() {
    let store = store();

    let result = validate_citation(&parse_citation("2018:502 § 4").unwrap(), &store, None);
    assert!(!result.matched);
    assert_eq!(result.warnings[0], PROVISION_NOT_FOUND);
    assert!(result.warnings[1].starts_with("nearest sections: § 5"));

    let result = validate_citation(&parse_citation("2000:429 § 3").unwrap(), &store, None);
    assert!(!result.matched);
    assert_eq!(result.warnings, vec![DOCUMENT_NOT_FOUND.to_string()]);
}

#[test]
fn test_validation_outside_in_force_window_is_advisory() {
    let store = store();
    let before = NaiveDate::from_ymd_opt(2017, 1, 1);

    let result = validate_citation(&parse_citation("2018:502 § 1").unwrap(), &store, before);
    assert!(result.matched);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].starts_with("not in force on 2017-01-01"));
}

#[test]
fn test_full_style_round_trip() {
    for input in [
        "2018:502 § 5, stk. 2",
        "2018:502 kap. 2 § 5 a",
        "regulation:2016/679 art. 6",
        "2018:502",
    ] {
        let parsed = parse_citation(input).unwrap();
        let rendered = format_citation(&parsed, CitationStyle::Full).unwrap();
        assert_eq!(parse_citation(&rendered).unwrap(), parsed, "{input}");
    }
}

#[test]
fn test_seed_files_load_into_store() {
    let dir = tempfile::tempdir().unwrap();
    let seed = run_pipeline().to_seed();

    for format in [OutputFormat::Json, OutputFormat::Yaml] {
        let path = save_seed(&seed, format, dir.path()).unwrap();
        let mut store = InMemoryProvisionStore::new();
        store.load_seed_file(&path).unwrap();

        let result = validate_citation(&parse_citation("2018:502 § 2").unwrap(), &store, None);
        assert!(result.matched, "{format}");
    }
}

#[test]
fn test_load_tree_from_file_matches_parse() {
    let from_file = load_tree(&fixture_path("databeskyttelsesloven.xml")).unwrap();
    let parsed = parse_xml(&load_fixture("databeskyttelsesloven.xml")).unwrap();
    assert_eq!(from_file, parsed);
    assert!(matches!(from_file, DocumentNode::Group(_)));
}

#[test]
fn test_ingestion_json_fixture_extracts_same_provisions() {
    let tree = load_tree(&fixture_path("tobaksvarer.json")).unwrap();
    let extraction = extract_document(&DocumentMeta::new("2019:1010"), &tree, &[]);

    let refs: Vec<String> = extraction
        .provisions
        .iter()
        .map(|p| p.provision_ref.to_string())
        .collect();
    assert_eq!(refs, vec!["1:1", "1:2"]);
    assert_eq!(extraction.definitions[0].term, "tobaksvarer");
    assert_eq!(extraction.eu_references[0].eu_document_id, "directive:2014/40");
    assert_eq!(
        extraction.eu_references[0].reference_type,
        ReferenceType::Implements
    );
}
