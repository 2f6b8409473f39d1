//! Citation tokenizer and parser.

use std::ops::Range;
use std::str::FromStr;

use crate::error::ParseError;
use crate::patterns::{
    find_bare_section, find_chapter, find_compact_location, find_eu_article, find_pinpoint,
    find_section_marker, has_dangling_act_number, mask, match_document_id,
};
use crate::text::normalize_text;
use crate::types::StructuredCitation;

/// Location part of a citation: everything after the document identifier.
#[derive(Debug, Default, PartialEq, Eq)]
struct Location {
    chapter: Option<String>,
    section: Option<String>,
    pinpoint: Option<String>,
    eu_article: Option<String>,
}

impl Location {
    /// Pick the location tokens out of the text following the document id.
    ///
    /// Pinpoints and EU articles are taken first and masked out so their
    /// digits cannot be read as a section. A `§` marker beats a compact
    /// `chapter:section` token, which beats a bare number.
    fn parse(text: &str) -> Self {
        let mut consumed: Vec<Range<usize>> = Vec::new();

        let pinpoint = find_pinpoint(text).map(|found| {
            consumed.push(found.range);
            found.value
        });
        let eu_article = find_eu_article(&mask(text, &consumed)).map(|found| {
            consumed.push(found.range);
            found.value
        });
        let keyword_chapter = find_chapter(&mask(text, &consumed)).map(|found| {
            consumed.push(found.range);
            found.value
        });

        let masked = mask(text, &consumed);
        let (chapter, section) = if let Some(marked) = find_section_marker(&masked) {
            (keyword_chapter, Some(marked.value))
        } else if let Some(compact) = find_compact_location(&masked) {
            let (chapter, section) = compact.value;
            (Some(chapter), Some(section))
        } else {
            (
                keyword_chapter,
                find_bare_section(&masked).map(|found| found.value),
            )
        };

        Self {
            chapter,
            section,
            pinpoint,
            eu_article,
        }
    }
}

/// Parse a citation that must carry its own document identifier.
///
/// # Errors
///
/// Returns a [`ParseError`] when no document identifier can be isolated or a
/// chapter is given without a section.
///
/// # Examples
/// ```
/// use lovref::citation::parse_citation;
///
/// let citation = parse_citation("2018:502 § 5 a").unwrap();
/// assert_eq!(citation.document_id, "2018:502");
/// assert_eq!(citation.section.as_deref(), Some("5 a"));
/// assert_eq!(citation.chapter, None);
/// assert_eq!(citation.pinpoint, None);
/// ```
pub fn parse_citation(input: &str) -> Result<StructuredCitation, ParseError> {
    parse_citation_in(input, None)
}

/// Parse a citation, falling back to `ambient_document_id` when the input
/// names no document ("§ 5", "3:5").
///
/// # Errors
///
/// See [`parse_citation`].
///
/// # Examples
/// ```
/// use lovref::citation::parse_citation_in;
///
/// let citation = parse_citation_in("3:5", Some("2018:502")).unwrap();
/// assert_eq!(citation.document_id, "2018:502");
/// assert_eq!(citation.chapter.as_deref(), Some("3"));
/// assert_eq!(citation.section.as_deref(), Some("5"));
///
/// assert!(parse_citation_in("kap3", None).is_err());
/// ```
pub fn parse_citation_in(
    input: &str,
    ambient_document_id: Option<&str>,
) -> Result<StructuredCitation, ParseError> {
    let normalized = normalize_text(input);
    if normalized.is_empty() {
        return Err(ParseError::Empty);
    }

    let (own_document_id, rest) = match match_document_id(&normalized) {
        Some(found) => (Some(found.id), &normalized[found.end..]),
        None => (None, normalized.as_str()),
    };
    // An act number without its year names no document, not even the ambient one.
    if own_document_id.is_none() && has_dangling_act_number(&normalized) {
        return Err(ParseError::MissingDocumentId { input: normalized });
    }

    let location = Location::parse(rest);
    if location.chapter.is_some() && location.section.is_none() {
        return Err(ParseError::ChapterWithoutSection { input: normalized });
    }

    let document_id = own_document_id
        .or_else(|| ambient_document_id.and_then(canonical_document_id))
        .ok_or_else(|| ParseError::MissingDocumentId {
            input: normalized.clone(),
        })?;

    tracing::debug!(
        input = %normalized,
        document_id = %document_id,
        section = ?location.section,
        "Parsed citation"
    );

    Ok(StructuredCitation {
        document_id,
        chapter: location.chapter,
        section: location.section,
        pinpoint: location.pinpoint,
        eu_article: location.eu_article,
        raw: input.to_string(),
    })
}

/// Canonical form of a caller-supplied document id; short names pass through.
fn canonical_document_id(document_id: &str) -> Option<String> {
    let normalized = normalize_text(document_id);
    if normalized.is_empty() {
        return None;
    }
    match match_document_id(&normalized) {
        Some(found) if found.end == normalized.len() => Some(found.id),
        _ => Some(normalized),
    }
}

impl FromStr for StructuredCitation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_citation(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_section_with_pinpoint() {
        let citation = parse_citation("2018:502 § 3, stk. 5").unwrap();
        assert_eq!(citation.document_id, "2018:502");
        assert_eq!(citation.section.as_deref(), Some("3"));
        assert_eq!(citation.pinpoint.as_deref(), Some("5"));
        assert_eq!(citation.chapter, None);
    }

    #[test]
    fn test_parse_compact_chapter_section() {
        let citation = parse_citation("2018:502 3:5").unwrap();
        assert_eq!(citation.chapter.as_deref(), Some("3"));
        assert_eq!(citation.section.as_deref(), Some("5"));
    }

    #[test]
    fn test_parse_alphanumeric_section_preserved() {
        let citation = parse_citation("2018:502 § 5 a").unwrap();
        assert_eq!(
            citation,
            StructuredCitation::new("2018:502").with_section("5 a")
        );
        assert_eq!(citation.raw, "2018:502 § 5 a");
    }

    #[test]
    fn test_parse_compact_suffix_normalized() {
        let citation = parse_citation("2018:502 §5a").unwrap();
        assert_eq!(citation.section.as_deref(), Some("5 a"));
    }

    #[test]
    fn test_parse_pinpoint_never_changes_section() {
        let citation = parse_citation("2018:502 § 5 a, stk. 2").unwrap();
        assert_eq!(citation.section.as_deref(), Some("5 a"));
        assert_eq!(citation.pinpoint.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_symbol_wins_over_bare_number() {
        let citation = parse_citation("2018:502 7 § 5").unwrap();
        assert_eq!(citation.section.as_deref(), Some("5"));
    }

    #[test]
    fn test_parse_bare_section() {
        let citation = parse_citation("2018:502 12").unwrap();
        assert_eq!(citation.section.as_deref(), Some("12"));
    }

    #[test]
    fn test_parse_chapter_keyword() {
        let citation = parse_citation("2018:502 kap. 3 § 5").unwrap();
        assert_eq!(citation.chapter.as_deref(), Some("3"));
        assert_eq!(citation.section.as_deref(), Some("5"));
    }

    #[test]
    fn test_parse_eu_identifier() {
        let citation = parse_citation("regulation:2016/679 art. 5").unwrap();
        assert_eq!(citation.document_id, "regulation:2016/679");
        assert_eq!(citation.eu_article.as_deref(), Some("5"));
        assert_eq!(citation.section, None);
    }

    #[test]
    fn test_parse_eu_identifier_with_pinpoint() {
        let citation = parse_citation("Regulation:2016/679 artikel 6, stk. 1").unwrap();
        assert_eq!(citation.document_id, "regulation:2016/679");
        assert_eq!(citation.eu_article.as_deref(), Some("6"));
        assert_eq!(citation.pinpoint.as_deref(), Some("1"));
        assert_eq!(citation.section, None);
    }

    #[test]
    fn test_parse_celex_identifier() {
        let citation = parse_citation("32016R0679 art. 17").unwrap();
        assert_eq!(citation.document_id, "regulation:2016/679");
        assert_eq!(citation.eu_article.as_deref(), Some("17"));
    }

    #[test]
    fn test_parse_short_name_passed_through() {
        let citation = parse_citation("grundloven § 3").unwrap();
        assert_eq!(citation.document_id, "grundloven");
        assert_eq!(citation.section.as_deref(), Some("3"));

        let citation = parse_citation("Lov om tobaksvarer § 4, stk. 2").unwrap();
        assert_eq!(citation.document_id, "Lov om tobaksvarer");
    }

    #[test]
    fn test_parse_law_number_document() {
        let citation = parse_citation("Lov nr. 502 af 23. maj 2018 § 3, stk. 2").unwrap();
        assert_eq!(citation.document_id, "2018:502");
        assert_eq!(citation.section.as_deref(), Some("3"));
        assert_eq!(citation.pinpoint.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_law_number_without_year_fails() {
        let err = parse_citation("Lov nr. 502 § 3").unwrap_err();
        assert!(matches!(err, ParseError::MissingDocumentId { .. }));

        let err = parse_citation_in("Lov nr. 502 § 3", Some("2018:502")).unwrap_err();
        assert!(matches!(err, ParseError::MissingDocumentId { .. }));
    }

    #[test]
    fn test_parse_two_digit_eu_year_matches_celex() {
        let named = parse_citation("directive:95/46 art. 2").unwrap();
        let celex = parse_citation("31995L0046 art. 2").unwrap();
        assert_eq!(named.document_id, "directive:1995/46");
        assert_eq!(named, celex);
    }

    #[test]
    fn test_parse_document_only() {
        let citation = parse_citation("2018:502").unwrap();
        assert_eq!(citation, StructuredCitation::new("2018:502"));
    }

    #[test]
    fn test_parse_uses_ambient_document() {
        let citation = parse_citation_in("§ 5", Some("2018:502")).unwrap();
        assert_eq!(citation.document_id, "2018:502");
        assert_eq!(citation.section.as_deref(), Some("5"));
    }

    #[test]
    fn test_parse_own_document_beats_ambient() {
        let citation = parse_citation_in("2020:1 § 5", Some("2018:502")).unwrap();
        assert_eq!(citation.document_id, "2020:1");
    }

    #[test]
    fn test_parse_ambient_is_canonicalized() {
        let citation = parse_citation_in("art. 5", Some("Forordning:2016/679")).unwrap();
        assert_eq!(citation.document_id, "regulation:2016/679");
    }

    #[test]
    fn test_parse_chapter_without_section_fails() {
        let err = parse_citation("kap3").unwrap_err();
        assert!(matches!(err, ParseError::ChapterWithoutSection { .. }));

        let err = parse_citation_in("kap. 3", Some("2018:502")).unwrap_err();
        assert!(matches!(err, ParseError::ChapterWithoutSection { .. }));
    }

    #[test]
    fn test_parse_missing_document_fails() {
        let err = parse_citation("§ 5").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingDocumentId {
                input: "§ 5".to_string()
            }
        );
        assert!(parse_citation("3:5").is_err());
    }

    #[test]
    fn test_parse_empty_fails() {
        assert_eq!(parse_citation("   ").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_parse_normalizes_whitespace() {
        let citation = parse_citation(" 2018:502\u{a0}§\u{a0}5 ,  stk.\n2 ").unwrap();
        assert_eq!(citation.section.as_deref(), Some("5"));
        assert_eq!(citation.pinpoint.as_deref(), Some("2"));
    }

    #[test]
    fn test_from_str() {
        let citation: StructuredCitation = "2018:502 § 1".parse().unwrap();
        assert_eq!(citation.section.as_deref(), Some("1"));
    }
}
