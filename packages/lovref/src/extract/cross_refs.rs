//! Cross-reference extraction from provision text.
//!
//! Candidates are found in three passes over the text, each masking what it
//! consumed: plural "§§" lists, single "§ N" references (optionally with a
//! preceding "YYYY:N" or a trailing "i lov nr. N af ... YYYY" or
//! "i straffeloven"), and bare "lov nr. N af ... YYYY" mentions. Every
//! candidate is confirmed by the citation parser; anything it rejects is dropped.

use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use crate::citation::CitationCache;
use crate::config::MAX_SECTION_RANGE;
use crate::patterns::{find_bare_sections, find_law_numbers, find_section_markers, mask};
use crate::types::{CrossReference, LegalProvision, ProvisionRef};

#[allow(clippy::expect_used)]
static PLURAL_SECTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)§§\s*\d+(?:\s?[a-zæøå]\b)?(?:\s*(?:,|og|eller|-|–)\s*\d+(?:\s?[a-zæøå]\b)?)*",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static PRECEDING_DOCUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d:])(\d{4}):0*(\d+)\s*$").expect("valid regex")
});

#[allow(clippy::expect_used)]
static TRAILING_PINPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*,?\s*stk\.\s*0*(\d+)").expect("valid regex"));

#[allow(clippy::expect_used)]
static TRAILING_DOCUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*,?\s*i\s+(?:(\d{4}):0*(\d+)\b|lov\s+nr\.\s*0*(\d+)\s+af\s+(?:\d{1,2}\.\s*[a-zæøå]+\s+)?(\d{4})\b)",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
/// Statute named by a one-word short name: "i straffeloven", "i grundloven".
static TRAILING_SHORT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*,?\s*i\s+([a-zæøå][a-zæøå-]+(?:loven|lov|bekendtgørelsen|anordningen|kodeksen))\b",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
/// Another act named in a form that cannot be turned into an id: "i lov om ...".
static TRAILING_OTHER_ACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*,?\s*i\s+(?:lov|lovbekendtgørelse|bekendtgørelse|anordning|forordning|direktiv)(?:en|et)?\s+(?:om|nr\.)",
    )
    .expect("valid regex")
});

/// What follows a section reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Trailing {
    /// Nothing naming another document.
    None,
    /// A document id or short name, with the end offset of its mention.
    Document(String, usize),
    /// Another act that cannot be identified; the reference is not ours to record.
    Unidentified,
}

/// A reference candidate before parser confirmation.
#[derive(Debug, Clone)]
struct Candidate {
    document_id: Option<String>,
    section: Option<String>,
    pinpoint: Option<String>,
    range: Range<usize>,
}

impl Candidate {
    /// Citation text handed to the parser.
    fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(document_id) = &self.document_id {
            parts.push(document_id.clone());
        }
        if let Some(section) = &self.section {
            parts.push(format!("§ {section}"));
        }
        let mut rendered = parts.join(" ");
        if let Some(pinpoint) = &self.pinpoint {
            rendered.push_str(&format!(", stk. {pinpoint}"));
        }
        rendered
    }
}

/// Document named after a reference at `start`: "i YYYY:N",
/// "i lov nr. N af ... YYYY" or a short name such as "i straffeloven".
fn trailing_document(text: &str, start: usize) -> Trailing {
    let Some(rest) = text.get(start..) else {
        return Trailing::None;
    };

    if let Some(caps) = TRAILING_DOCUMENT.captures(rest) {
        let end = start + caps.get(0).map_or(0, |m| m.end());
        return match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
            (Some(year), Some(number), _, _) | (_, _, Some(number), Some(year)) => {
                Trailing::Document(format!("{}:{}", year.as_str(), number.as_str()), end)
            }
            _ => Trailing::Unidentified,
        };
    }
    if let Some(caps) = TRAILING_SHORT_NAME.captures(rest) {
        let end = start + caps.get(0).map_or(0, |m| m.end());
        return Trailing::Document(caps[1].to_lowercase(), end);
    }
    if TRAILING_OTHER_ACT.is_match(rest) {
        return Trailing::Unidentified;
    }
    Trailing::None
}

/// Document id written directly before a section marker ("2018:502 § 3").
fn preceding_document(before: &str) -> Option<(String, usize)> {
    let caps = PRECEDING_DOCUMENT.captures(before)?;
    let year = caps.get(1)?;
    Some((format!("{}:{}", year.as_str(), &caps[2]), year.start()))
}

/// Section numbers of a "§§" list; "3-5" style ranges are expanded.
fn plural_items(text: &str, range: Range<usize>) -> (Vec<String>, usize) {
    let Some(haystack) = text.get(range.start..) else {
        return (Vec::new(), range.end);
    };
    let limit = range.end - range.start;
    let items: Vec<_> = find_bare_sections(haystack)
        .into_iter()
        .take_while(|item| item.range.start < limit)
        .collect();

    let mut sections: Vec<String> = Vec::new();
    let mut previous: Option<(u32, Range<usize>)> = None;
    for item in &items {
        let number: Option<u32> = item.value.parse().ok();
        let separator = previous
            .as_ref()
            .and_then(|(_, prev)| haystack.get(prev.end..item.range.start))
            .unwrap_or_default();

        match (previous.as_ref(), number) {
            (Some((from, _)), Some(to))
                if separator.contains(['-', '–']) && to > *from && to - from <= MAX_SECTION_RANGE =>
            {
                sections.extend((from + 1..=to).map(|n| n.to_string()));
            }
            _ => sections.push(item.value.clone()),
        }
        previous = number.map(|n| (n, item.range.clone()));
    }

    let end = items
        .last()
        .map_or(range.end, |item| range.start + item.range.end);
    (sections, end)
}

fn find_candidates(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut consumed: Vec<Range<usize>> = Vec::new();

    for found in PLURAL_SECTIONS.find_iter(text) {
        let (sections, items_end) = plural_items(text, found.range());
        let (document_id, end) = match trailing_document(text, items_end) {
            Trailing::Document(document_id, end) => (Some(document_id), end),
            Trailing::None => (None, items_end),
            Trailing::Unidentified => {
                consumed.push(found.start()..items_end);
                continue;
            }
        };
        let range = found.start()..end;
        candidates.extend(sections.into_iter().map(|section| Candidate {
            document_id: document_id.clone(),
            section: Some(section),
            pinpoint: None,
            range: range.clone(),
        }));
        consumed.push(range);
    }

    let masked = mask(text, &consumed);
    for marker in find_section_markers(&masked) {
        let mut start = marker.range.start;
        let mut end = marker.range.end;

        let mut document_id = None;
        if let Some((preceding, doc_start)) = masked.get(..start).and_then(preceding_document) {
            document_id = Some(preceding);
            start = doc_start;
        }

        let pinpoint = masked
            .get(end..)
            .and_then(|rest| TRAILING_PINPOINT.captures(rest))
            .and_then(|caps| {
                let whole = caps.get(0)?;
                Some((caps[1].to_string(), whole.end()))
            })
            .map(|(pinpoint, len)| {
                end += len;
                pinpoint
            });

        if document_id.is_none() {
            match trailing_document(&masked, end) {
                Trailing::Document(trailing, doc_end) => {
                    document_id = Some(trailing);
                    end = doc_end;
                }
                Trailing::Unidentified => {
                    tracing::debug!(
                        reference = masked.get(start..end).unwrap_or_default(),
                        "Skipping reference into an unidentified act"
                    );
                    consumed.push(start..end);
                    continue;
                }
                Trailing::None => {}
            }
        }

        candidates.push(Candidate {
            document_id,
            section: Some(marker.value),
            pinpoint,
            range: start..end,
        });
        consumed.push(start..end);
    }

    let masked = mask(text, &consumed);
    for found in find_law_numbers(&masked) {
        candidates.push(Candidate {
            document_id: Some(found.value),
            section: None,
            pinpoint: None,
            range: found.range,
        });
    }

    candidates.sort_by_key(|candidate| candidate.range.start);
    candidates
}

fn scan_provision(provision: &LegalProvision, cache: &mut CitationCache) -> Vec<CrossReference> {
    let text = provision.content.as_str();
    let mut seen: HashSet<(String, Option<ProvisionRef>, Option<String>)> = HashSet::new();
    let mut references = Vec::new();

    for candidate in find_candidates(text) {
        let citation = match cache.parse(&candidate.render(), Some(provision.document_id.as_str())) {
            Ok(citation) => citation,
            Err(err) => {
                tracing::debug!(
                    provision = %provision.provision_ref,
                    candidate = %candidate.render(),
                    error = %err,
                    "Discarding unparseable reference candidate"
                );
                continue;
            }
        };

        let target_provision = citation.provision_ref();
        let same_document = citation.document_id == provision.document_id;
        let is_self = same_document
            && target_provision
                .as_ref()
                .is_none_or(|target| target.matches(&provision.provision_ref));
        if is_self {
            continue;
        }

        let key = (
            citation.document_id.clone(),
            target_provision.clone(),
            citation.pinpoint.clone(),
        );
        if !seen.insert(key) {
            continue;
        }

        references.push(CrossReference {
            source_document_id: provision.document_id.clone(),
            source_provision: provision.provision_ref.clone(),
            target_document_id: citation.document_id,
            target_provision,
            pinpoint: citation.pinpoint,
            raw: text
                .get(candidate.range.clone())
                .map(|raw| raw.trim().to_string())
                .unwrap_or_default(),
        });
    }

    references
}

/// Find references to other provisions or documents in provision text.
///
/// Targets are recorded as written, not resolved against any store.
/// Self-references and duplicates within a provision are dropped.
///
/// # Examples
/// ```
/// use lovref::extract::extract_cross_references;
/// use lovref::types::{LegalProvision, ProvisionRef};
///
/// let provision = LegalProvision {
///     document_id: "2018:502".to_string(),
///     provision_ref: ProvisionRef::section("1"),
///     chapter: None,
///     section: "1".to_string(),
///     title: None,
///     content: "Reglerne i § 5, stk. 2, finder anvendelse.".to_string(),
/// };
/// let refs = extract_cross_references(&[provision]);
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].target_provision, Some(ProvisionRef::section("5")));
/// assert_eq!(refs[0].pinpoint.as_deref(), Some("2"));
/// ```
#[must_use]
pub fn extract_cross_references(provisions: &[LegalProvision]) -> Vec<CrossReference> {
    let mut cache = CitationCache::new();
    let references: Vec<CrossReference> = provisions
        .iter()
        .flat_map(|provision| scan_provision(provision, &mut cache))
        .collect();
    tracing::debug!(
        references = references.len(),
        cached = cache.len(),
        "Extracted cross-references"
    );
    references
}
