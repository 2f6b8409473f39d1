//! Configuration constants and validation functions.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{LovrefError, Result};
use crate::patterns::classify_document_id;

/// Tag of a chapter container in LexDania XML.
pub const CHAPTER_TAG: &str = "Kapitel";

/// Tag of a section (paragraf) container in LexDania XML.
pub const SECTION_TAG: &str = "Paragraf";

/// Tag of the label heading ("§ 1.", "Kapitel 2").
pub const EXPLICATUS_TAG: &str = "Explicatus";

/// Tag of the title heading ("Lovens anvendelsesområde").
pub const RUBRICA_TAG: &str = "Rubrica";

/// Formatting elements whose text belongs to the surrounding text run.
pub const INLINE_TAGS: &[&str] = &["Char", "Sup", "Sub", "Em", "Strong", "Bold", "Italic", "Ref"];

/// Elements that never carry provision content.
pub const SKIP_TAGS: &[&str] = &["Meta", "DokumentMeta", "Signatur", "Note"];

/// Key holding the character payload of a node in the JSON ingestion shape.
pub const TEXT_PAYLOAD_KEY: &str = "#text";

/// Prefix marking attribute keys in the JSON ingestion shape.
pub const ATTRIBUTE_PREFIX: char = '@';

/// Attribute names that identify a node locally, in lookup order.
pub const LOCAL_ID_KEYS: &[&str] = &["id", "localId", "local_id"];

/// Keys that are never treated as text, with or without the attribute prefix.
pub const NON_CONTENT_KEYS: &[&str] = &[
    "id",
    "localId",
    "local_id",
    "schemaLocation",
    "xsi:schemaLocation",
    "xmlns",
    "xmlns:xsi",
    "format",
    "class",
    "style",
];

/// Width in characters of the context snippet stored with an EU reference.
pub const EU_CONTEXT_WIDTH: usize = 200;

/// How far (in characters) before an EU citation an article mention is searched.
pub const ARTICLE_LOOKBEHIND_CHARS: usize = 60;

/// Maximum number of sibling sections suggested when a provision is missing.
pub const MAX_SIBLING_HINTS: usize = 3;

/// Largest numeric span expanded from a "§§ 3-5" style range.
pub const MAX_SECTION_RANGE: u32 = 50;

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate a document identifier.
///
/// Accepts Danish `YYYY:N`, EU `type:YYYY/N` and short names.
///
/// # Examples
/// ```
/// use lovref::config::validate_document_id;
///
/// assert!(validate_document_id("2018:502").is_ok());
/// assert!(validate_document_id("regulation:2016/679").is_ok());
/// assert!(validate_document_id("grundloven").is_ok());
/// assert!(validate_document_id("§ 3").is_err());
/// ```
pub fn validate_document_id(document_id: &str) -> Result<()> {
    if classify_document_id(document_id).is_some() {
        Ok(())
    } else {
        Err(LovrefError::InvalidDocumentId(document_id.to_string()))
    }
}

/// Parse and validate a date (YYYY-MM-DD).
///
/// # Examples
/// ```
/// use lovref::config::parse_date;
///
/// assert!(parse_date("2018-05-25").is_ok());
/// assert!(parse_date("2018-13-01").is_err());
/// assert!(parse_date("25-05-2018").is_err());
/// ```
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(LovrefError::InvalidDate(date_str.to_string()));
    }

    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| LovrefError::InvalidDate(date_str.to_string()))
}

/// Validate date format (YYYY-MM-DD).
pub fn validate_date(date_str: &str) -> Result<()> {
    parse_date(date_str).map(|_| ())
}

/// Whether a key of the JSON ingestion shape must never be read as text.
#[must_use]
pub fn is_non_content_key(key: &str) -> bool {
    let bare = key.strip_prefix(ATTRIBUTE_PREFIX).unwrap_or(key);
    key.starts_with(ATTRIBUTE_PREFIX) || NON_CONTENT_KEYS.contains(&bare)
}
