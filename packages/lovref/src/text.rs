//! Text normalization and key derivation.

use std::ops::Range;
use unicode_normalization::UnicodeNormalization;

/// Normalize text to NFC, collapse whitespace runs to a single space and trim.
///
/// Total over any input; idempotent.
///
/// # Examples
/// ```
/// use lovref::text::normalize_text;
///
/// assert_eq!(normalize_text("  §\u{a0}5 \n stk. 2 "), "§ 5 stk. 2");
/// assert_eq!(normalize_text(""), "");
/// ```
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a term for use as a definition key: normalized text, lower-cased.
#[must_use]
pub fn normalize_term(text: &str) -> String {
    normalize_text(text).to_lowercase()
}

/// Derive an ASCII-only, lower-cased, underscore-joined key from arbitrary text.
///
/// Danish letters are transliterated (æ → ae, ø → oe, å → aa), other
/// accented letters lose their diacritics, and everything that is not an
/// ASCII letter or digit separates words.
///
/// # Examples
/// ```
/// use lovref::text::to_key;
///
/// assert_eq!(to_key("Lov om Databeskyttelse"), "lov_om_databeskyttelse");
/// assert_eq!(to_key("Færdselsloven § 5"), "faerdselsloven_5");
/// assert_eq!(to_key("2018:502"), "2018_502");
/// assert_eq!(to_key(""), "");
/// ```
#[must_use]
pub fn to_key(text: &str) -> String {
    let mut transliterated = String::with_capacity(text.len());
    for c in text.nfc().flat_map(char::to_lowercase) {
        match c {
            'æ' => transliterated.push_str("ae"),
            'ø' => transliterated.push_str("oe"),
            'å' => transliterated.push_str("aa"),
            'ß' => transliterated.push_str("ss"),
            _ => transliterated.push(c),
        }
    }

    let ascii: String = transliterated.nfkd().filter(char::is_ascii).collect();

    ascii
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "jf", "nr", "stk", "pkt", "f.eks", "bl.a", "art", "lit", "kap", "m.v", "m.m", "dvs", "evt",
    "ca", "pr", "mv", "el",
];

fn ends_with_abbreviation(before: &str) -> bool {
    let word: String = before
        .chars()
        .rev()
        .take_while(|c| c.is_alphabetic() || *c == '.')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let word = word.trim_start_matches('.').to_lowercase();
    ABBREVIATIONS.contains(&word.as_str())
}

/// Byte offset just past the sentence that starts at or before `from`.
///
/// A sentence ends at `.`, `!` or `?` followed by the end of the text or by
/// whitespace and an upper-case letter, unless the period closes a common
/// abbreviation ("jf.", "nr.", "stk.").
///
/// # Examples
/// ```
/// use lovref::text::sentence_end;
///
/// let text = "Jf. nr. 3 gælder. Næste sætning.";
/// assert_eq!(&text[..sentence_end(text, 0)], "Jf. nr. 3 gælder.");
/// ```
#[must_use]
pub fn sentence_end(text: &str, from: usize) -> usize {
    let Some(tail) = text.get(from..) else {
        return text.len();
    };
    for (offset, c) in tail.char_indices() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at = from + offset;
        let after = at + c.len_utf8();
        let rest = &text[after..];
        if rest.trim().is_empty() {
            return after;
        }
        let next_is_capital = rest.starts_with(char::is_whitespace)
            && rest.trim_start().chars().next().is_some_and(char::is_uppercase);
        if next_is_capital && (c != '.' || !ends_with_abbreviation(&text[..at])) {
            return after;
        }
    }
    text.len()
}

/// Byte range of the sentence containing byte offset `at`.
#[must_use]
pub fn sentence_around(text: &str, at: usize) -> Range<usize> {
    let mut start = 0;
    while start < text.len() {
        let end = sentence_end(text, start);
        if end > at || end >= text.len() {
            return start..end;
        }
        let skipped = text[end..].len() - text[end..].trim_start().len();
        start = end + skipped;
    }
    start..text.len()
}

/// At most `width` characters of `text`, centred on byte offset `focus`.
#[must_use]
pub fn window_around(text: &str, focus: usize, width: usize) -> String {
    let total = text.chars().count();
    if total <= width {
        return text.trim().to_string();
    }
    let focus_char = text
        .char_indices()
        .take_while(|(i, _)| *i < focus)
        .count();
    let start = focus_char.saturating_sub(width / 2).min(total - width);
    text.chars()
        .skip(start)
        .take(width)
        .collect::<String>()
        .trim()
        .to_string()
}
