//! Named pattern matchers for Danish citation syntax.
//!
//! One matcher per grammar rule: document identifiers, section markers,
//! compact `chapter:section` locations, subsection pinpoints, EU article
//! pinpoints, and the heading/local-id forms found in document trees.
//! Each `find_*` function returns the canonical value together with the
//! byte range it was matched in, so callers can mask consumed spans.

use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

use crate::text::normalize_text;
use crate::types::DocumentIdKind;

// Static regexes for citation grammar - all patterns are guaranteed to be valid
#[allow(clippy::expect_used)]
/// Danish document identifier: year and number (e.g. "2018:502").
static DANISH_ID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}):0*(\d+)\b").expect("valid regex"));

#[allow(clippy::expect_used)]
static DANISH_ID_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}:\d+$").expect("valid regex"));

#[allow(clippy::expect_used)]
/// EU document identifier: type, year and number (e.g. "regulation:2016/679").
static EU_ID_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(directive|regulation|decision|direktiv|forordning|beslutning):(\d{2,4})/0*(\d+)\b",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static EU_ID_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(directive|regulation|decision|direktiv|forordning|beslutning):\d{2,4}/\d+$")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
/// CELEX number of a legislative act (sector 3), e.g. "32016R0679".
static CELEX_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b3(\d{4})([LRD])0*(\d+)\b").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Danish act by law number and year: "lov nr. 502 af 23. maj 2018".
static LAW_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\blov\s+nr\.\s*0*(\d+)\s+af\s+(?:\d{1,2}\.\s*[a-zæøå]+\s+)?(\d{4})\b")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
/// Act number whose year is missing: "Lov nr. 502 § 3".
static DANGLING_ACT_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-zæøå][a-zæøå .-]*\bnr\.\s*\d").expect("valid regex")
});

#[allow(clippy::expect_used)]
/// Start of any location token; a short name ends where the first one begins.
static LOCATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)§|\bkap(?:itel|\.)?\s*\d|\bstk\.|\bart(?:ikel|icle|\.)?\s*\d|\b\d")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static CHAPTER_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bkap(?:itel|\.)?\s*(\d+)(?:\s?([a-zæøå])\b)?").expect("valid regex")
});

#[allow(clippy::expect_used)]
static SECTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)§\s*(\d+)(?:\s?([a-zæøå])\b)?").expect("valid regex"));

#[allow(clippy::expect_used)]
static COMPACT_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)([a-zæøå])?:(\d+)(?:\s?([a-zæøå])\b)?").expect("valid regex")
});

#[allow(clippy::expect_used)]
static PINPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bstk\.?\s*(\d+)").expect("valid regex"));

#[allow(clippy::expect_used)]
static EU_ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bart(?:ikel|icle|\.)?\s*(\d+)([a-z])?\b").expect("valid regex")
});

#[allow(clippy::expect_used)]
static BARE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)(?:\s?([a-zæøå])\b)?").expect("valid regex"));

#[allow(clippy::expect_used)]
static CHAPTER_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bkapitel\s+(\d+)(?:\s?([a-zæøå])\b)?").expect("valid regex")
});

#[allow(clippy::expect_used)]
static SECTION_HEADING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*§\s*(\d+)(?:\s?([a-zæøå])\b)?").expect("valid regex")
});

#[allow(clippy::expect_used)]
static SECTION_HEADING_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)(?:\s?([a-zæøå]))?\.(?:\s|$)").expect("valid regex")
});

#[allow(clippy::expect_used)]
static LOCAL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z]+[-_]?)?0*(\d+)\s*([a-zæøå])?$").expect("valid regex")
});

#[allow(clippy::expect_used)]
static CANONICAL_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0*(\d+)\s*([a-zæøå])$").expect("valid regex"));

/// A canonical value and the byte range of the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub value: T,
    pub range: Range<usize>,
}

impl<T> Located<T> {
    fn new(value: T, range: Range<usize>) -> Self {
        Self { value, range }
    }
}

/// A document identifier isolated at the start of a citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIdMatch {
    /// Canonical identifier.
    pub id: String,
    /// Shape of the identifier.
    pub kind: DocumentIdKind,
    /// Byte offset where the rest of the citation starts.
    pub end: usize,
}

/// Canonicalize a section or chapter token: "5a", "5 A" and "05 a" become "5 a".
///
/// # Examples
/// ```
/// use lovref::patterns::canonical_section;
///
/// assert_eq!(canonical_section("5a"), "5 a");
/// assert_eq!(canonical_section(" 5  A "), "5 a");
/// assert_eq!(canonical_section("12"), "12");
/// ```
#[must_use]
pub fn canonical_section(token: &str) -> String {
    let normalized = normalize_text(token).to_lowercase();
    if let Some(caps) = CANONICAL_SECTION.captures(&normalized) {
        return format!("{} {}", &caps[1], &caps[2]);
    }
    match normalized.trim_start_matches('0') {
        "" if !normalized.is_empty() => "0".to_string(),
        trimmed if trimmed.chars().all(|c| c.is_ascii_digit()) => trimmed.to_string(),
        _ => normalized,
    }
}

/// Build a canonical section from a number group and an optional letter suffix.
///
/// A lone "i" followed by a word is the Danish preposition ("§ 3 i lov nr. 5"),
/// not a suffix.
fn section_from_captures(caps: &Captures<'_>, number: usize, suffix: usize, haystack: &str) -> (String, usize) {
    let Some(number_match) = caps.get(number) else {
        return (String::new(), caps.get(0).map_or(0, |m| m.end()));
    };
    match caps.get(suffix) {
        Some(letter) if !is_preposition(letter.as_str(), &haystack[letter.end()..]) => (
            canonical_section(&format!("{} {}", number_match.as_str(), letter.as_str())),
            letter.end(),
        ),
        _ => (canonical_section(number_match.as_str()), number_match.end()),
    }
}

fn is_preposition(letter: &str, rest: &str) -> bool {
    if !letter.eq_ignore_ascii_case("i") {
        return false;
    }
    let mut chars = rest.chars();
    matches!(chars.next(), Some(c) if c.is_whitespace())
        && chars.next().is_some_and(char::is_alphabetic)
}

/// Classify a complete document identifier.
///
/// Returns `None` when the text is not a recognised identifier shape.
#[must_use]
pub fn classify_document_id(document_id: &str) -> Option<DocumentIdKind> {
    let id = normalize_text(document_id);
    if DANISH_ID_FULL.is_match(&id) {
        Some(DocumentIdKind::Danish)
    } else if EU_ID_FULL.is_match(&id) {
        Some(DocumentIdKind::Eu)
    } else if id.chars().next().is_some_and(char::is_alphabetic) && !LOCATION_MARKER.is_match(&id) {
        Some(DocumentIdKind::ShortName)
    } else {
        None
    }
}

/// Map an EU act type word (English or Danish) to its canonical name.
#[must_use]
pub fn canonical_eu_type(word: &str) -> &'static str {
    match word.to_lowercase().as_str() {
        "regulation" | "forordning" | "r" => "regulation",
        "decision" | "beslutning" | "d" => "decision",
        _ => "directive",
    }
}

/// Four-digit year of an EU act; two-digit years from 50 up are 19xx.
///
/// # Examples
/// ```
/// use lovref::patterns::expand_eu_year;
///
/// assert_eq!(expand_eu_year("95"), "1995");
/// assert_eq!(expand_eu_year("04"), "2004");
/// assert_eq!(expand_eu_year("2016"), "2016");
/// ```
#[must_use]
pub fn expand_eu_year(year: &str) -> String {
    match (year.len(), year.parse::<u32>()) {
        (2, Ok(short)) if short >= 50 => format!("19{year}"),
        (2, Ok(_)) => format!("20{year}"),
        _ => year.to_string(),
    }
}

/// Whether a number token of an EU act can be its year.
fn looks_like_eu_year(token: &str) -> bool {
    match token.len() {
        2 => token.chars().all(|c| c.is_ascii_digit()),
        4 => token.parse::<u32>().is_ok_and(|y| (1950..=2099).contains(&y)),
        _ => false,
    }
}

/// Year and number of a "first/second" act number.
///
/// Acts are written year first ("95/46", "2016/679") except older
/// regulations, which put the number first ("1049/2001", "1408/71").
///
/// # Examples
/// ```
/// use lovref::patterns::eu_year_and_number;
///
/// assert_eq!(eu_year_and_number("95", "46"), ("95", "46"));
/// assert_eq!(eu_year_and_number("1049", "2001"), ("2001", "1049"));
/// assert_eq!(eu_year_and_number("1408", "71"), ("71", "1408"));
/// ```
#[must_use]
pub fn eu_year_and_number<'t>(first: &'t str, second: &'t str) -> (&'t str, &'t str) {
    if !looks_like_eu_year(first) && looks_like_eu_year(second) {
        (second, first)
    } else {
        (first, second)
    }
}

/// Build a canonical EU document identifier with a four-digit year.
#[must_use]
pub fn eu_document_id(kind: &str, year: &str, number: &str) -> String {
    let number = number.trim_start_matches('0');
    let number = if number.is_empty() { "0" } else { number };
    format!("{}:{}/{number}", canonical_eu_type(kind), expand_eu_year(year))
}

/// Convert a CELEX number of a directive, regulation or decision to a document identifier.
///
/// # Examples
/// ```
/// use lovref::patterns::celex_to_document_id;
///
/// assert_eq!(celex_to_document_id("32016R0679").as_deref(), Some("regulation:2016/679"));
/// assert_eq!(celex_to_document_id("31995L0046").as_deref(), Some("directive:1995/46"));
/// assert_eq!(celex_to_document_id("52016PC0679"), None);
/// ```
#[must_use]
pub fn celex_to_document_id(celex: &str) -> Option<String> {
    let caps = CELEX_ID.captures(celex.trim())?;
    if caps.get(0)?.start() != 0 {
        return None;
    }
    Some(eu_document_id(&caps[2], &caps[1], &caps[3]))
}

/// Find all CELEX numbers in free text.
pub fn find_celex_ids(text: &str) -> impl Iterator<Item = Located<String>> + '_ {
    CELEX_ID.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(Located::new(
            eu_document_id(&caps[2], &caps[1], &caps[3]),
            whole.range(),
        ))
    })
}

/// Isolate a document identifier at the start of a normalized citation.
///
/// Tries, in order: Danish `YYYY:N`, EU `type:YYYY/N`, CELEX, and finally a
/// short name (the text before the first location marker, starting with a
/// letter). Short names are passed through untouched.
#[must_use]
pub fn match_document_id(text: &str) -> Option<DocumentIdMatch> {
    if let Some(caps) = DANISH_ID_PREFIX.captures(text) {
        return Some(DocumentIdMatch {
            id: format!("{}:{}", &caps[1], &caps[2]),
            kind: DocumentIdKind::Danish,
            end: caps.get(0)?.end(),
        });
    }

    if let Some(caps) = EU_ID_PREFIX.captures(text) {
        return Some(DocumentIdMatch {
            id: eu_document_id(&caps[1], &caps[2], &caps[3]),
            kind: DocumentIdKind::Eu,
            end: caps.get(0)?.end(),
        });
    }

    if let Some(caps) = CELEX_ID.captures(text) {
        let whole = caps.get(0)?;
        if whole.start() == 0 {
            return Some(DocumentIdMatch {
                id: eu_document_id(&caps[2], &caps[1], &caps[3]),
                kind: DocumentIdKind::Eu,
                end: whole.end(),
            });
        }
    }

    if let Some(found) = find_law_numbers(text).into_iter().next() {
        if found.range.start == 0 {
            return Some(DocumentIdMatch {
                id: found.value,
                kind: DocumentIdKind::Danish,
                end: found.range.end,
            });
        }
    }

    if !text.chars().next().is_some_and(char::is_alphabetic) || has_dangling_act_number(text) {
        return None;
    }
    let end = LOCATION_MARKER.find(text).map_or(text.len(), |m| m.start());
    let name = text[..end].trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    if name.is_empty() {
        return None;
    }
    Some(DocumentIdMatch {
        id: name.to_string(),
        kind: DocumentIdKind::ShortName,
        end,
    })
}

/// Find "lov nr. N af [d. måned] YYYY" mentions, as `YYYY:N` ids.
///
/// # Examples
/// ```
/// use lovref::patterns::find_law_numbers;
///
/// let found = find_law_numbers("jf. lov nr. 429 af 31. maj 2000");
/// assert_eq!(found[0].value, "2000:429");
/// ```
#[must_use]
pub fn find_law_numbers(text: &str) -> Vec<Located<String>> {
    LAW_NUMBER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Located::new(format!("{}:{}", &caps[2], &caps[1]), whole.range()))
        })
        .collect()
}

/// Whether the text starts with an act number that lacks its year ("Lov nr. 502").
#[must_use]
pub fn has_dangling_act_number(text: &str) -> bool {
    DANGLING_ACT_NUMBER.is_match(text)
        && find_law_numbers(text)
            .first()
            .is_none_or(|found| found.range.start != 0)
}

/// Find a "kap. N" / "kapitel N" chapter token.
#[must_use]
pub fn find_chapter(text: &str) -> Option<Located<String>> {
    let caps = CHAPTER_KEYWORD.captures(text)?;
    let start = caps.get(0)?.start();
    let (chapter, end) = section_from_captures(&caps, 1, 2, text);
    Some(Located::new(chapter, start..end))
}

/// Find a symbolic section token ("§ 5", "§ 5 a").
#[must_use]
pub fn find_section_marker(text: &str) -> Option<Located<String>> {
    let caps = SECTION_MARKER.captures(text)?;
    let start = caps.get(0)?.start();
    let (section, end) = section_from_captures(&caps, 1, 2, text);
    Some(Located::new(section, start..end))
}

/// Find every symbolic section token in free text, in order.
pub fn find_section_markers(text: &str) -> Vec<Located<String>> {
    SECTION_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let (section, end) = section_from_captures(&caps, 1, 2, text);
            Some(Located::new(section, start..end))
        })
        .collect()
}

/// Find a compact "chapter:section" token ("3:5").
#[must_use]
pub fn find_compact_location(text: &str) -> Option<Located<(String, String)>> {
    let caps = COMPACT_LOCATION.captures(text)?;
    let start = caps.get(0)?.start();
    let chapter = match caps.get(2) {
        Some(letter) => canonical_section(&format!("{} {}", &caps[1], letter.as_str())),
        None => canonical_section(&caps[1]),
    };
    let (section, end) = section_from_captures(&caps, 3, 4, text);
    Some(Located::new((chapter, section), start..end))
}

/// Find a bare numeric section token ("5", "5 a").
#[must_use]
pub fn find_bare_section(text: &str) -> Option<Located<String>> {
    let caps = BARE_SECTION.captures(text)?;
    let start = caps.get(0)?.start();
    let (section, end) = section_from_captures(&caps, 1, 2, text);
    Some(Located::new(section, start..end))
}

/// Find every bare numeric token ("3", "5 a") in `text`.
pub fn find_bare_sections(text: &str) -> Vec<Located<String>> {
    BARE_SECTION
        .captures_iter(text)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let (section, end) = section_from_captures(&caps, 1, 2, text);
            Some(Located::new(section, start..end))
        })
        .collect()
}

/// Find a subsection pinpoint ("stk. 2").
#[must_use]
pub fn find_pinpoint(text: &str) -> Option<Located<String>> {
    let caps = PINPOINT.captures(text)?;
    let whole = caps.get(0)?;
    let value = caps[1].trim_start_matches('0');
    let value = if value.is_empty() { "0" } else { value };
    Some(Located::new(value.to_string(), whole.range()))
}

/// Find an EU article pinpoint ("art. 5", "artikel 6", "Article 17").
#[must_use]
pub fn find_eu_article(text: &str) -> Option<Located<String>> {
    let caps = EU_ARTICLE.captures(text)?;
    let whole = caps.get(0)?;
    let article = match caps.get(2) {
        Some(letter) => format!("{}{}", &caps[1], letter.as_str().to_lowercase()),
        None => caps[1].to_string(),
    };
    Some(Located::new(article, whole.range()))
}

/// Find the last EU article mention in a text window.
#[must_use]
pub fn find_last_eu_article(text: &str) -> Option<String> {
    EU_ARTICLE.captures_iter(text).last().map(|caps| match caps.get(2) {
        Some(letter) => format!("{}{}", &caps[1], letter.as_str().to_lowercase()),
        None => caps[1].to_string(),
    })
}

/// Resolve a chapter number from heading text ("Kapitel 3").
#[must_use]
pub fn chapter_from_heading(heading: &str) -> Option<String> {
    let caps = CHAPTER_HEADING.captures(heading)?;
    Some(section_from_captures(&caps, 1, 2, heading).0)
}

/// Resolve a section number from heading text ("§ 3.", "§ 5 a." or "3.").
#[must_use]
pub fn section_from_heading(heading: &str) -> Option<String> {
    if let Some(caps) = SECTION_HEADING_MARKER.captures(heading) {
        return Some(section_from_captures(&caps, 1, 2, heading).0);
    }
    let caps = SECTION_HEADING_BARE.captures(heading)?;
    Some(section_from_captures(&caps, 1, 2, heading).0)
}

/// Resolve a number from a locally-scoped identifier ("P5a", "K3", "12").
#[must_use]
pub fn number_from_local_id(local_id: &str) -> Option<String> {
    let caps = LOCAL_ID.captures(local_id.trim())?;
    Some(match caps.get(2) {
        Some(letter) => canonical_section(&format!("{} {}", &caps[1], letter.as_str())),
        None => canonical_section(&caps[1]),
    })
}

/// Replace the characters inside `ranges` with spaces, keeping byte offsets stable.
#[must_use]
pub fn mask(text: &str, ranges: &[Range<usize>]) -> String {
    text.char_indices()
        .map(|(i, c)| {
            if ranges.iter().any(|r| r.contains(&i)) {
                " ".repeat(c.len_utf8())
            } else {
                c.to_string()
            }
        })
        .collect()
}
