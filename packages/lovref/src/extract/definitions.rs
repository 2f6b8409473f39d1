//! Term definition extraction.
//!
//! Recognises "Ved X forstås Y." (optionally "forstås i denne lov") and
//! numbered lists introduced by "forstås ved:" or "forstås:" ("1) X: Y 2) ...").

use regex::Regex;
use std::sync::LazyLock;

use crate::text::{normalize_term, normalize_text, sentence_end};
use crate::types::{Definition, LegalProvision, ProvisionRef};

#[allow(clippy::expect_used)]
static VED_FORSTAAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bved\s+([^.;:]{1,150}?)\s+forstås\s+(?:i\s+(?:denne|dette)\s+(?:lov|kapitel|afsnit|bekendtgørelse|bestemmelse)\s+)?",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static LIST_INTRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bforstås(?:\s+ved)?\s*:").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Text after "forstås" that opens a numbered list rather than a definition.
static LIST_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:ved\s*)?:").expect("valid regex"));

#[allow(clippy::expect_used)]
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)\d+\)\s*([^:()]{1,150}?)\s*:\s").expect("valid regex")
});

const QUOTES: &[char] = &['»', '«', '"', '\'', '„', '“', '”'];

fn clean_term(raw: &str) -> String {
    normalize_term(raw.trim().trim_matches(QUOTES))
}

fn definition(term: &str, text: &str, source: &ProvisionRef) -> Option<Definition> {
    let term = clean_term(term);
    let definition = normalize_text(text);
    if term.is_empty() || definition.is_empty() {
        return None;
    }
    Some(Definition {
        term,
        definition,
        source_provision: source.clone(),
    })
}

fn numbered_definitions(text: &str, source: &ProvisionRef) -> Vec<Definition> {
    let Some(intro) = LIST_INTRO.find(text) else {
        return Vec::new();
    };
    let list = &text[intro.end()..];

    let items: Vec<(String, usize, usize)> = LIST_ITEM
        .captures_iter(list)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let term = caps.get(1)?;
            Some((term.as_str().to_string(), whole.start(), whole.end()))
        })
        .collect();

    items
        .iter()
        .enumerate()
        .filter_map(|(i, (term, _, body_start))| {
            let body_end = items
                .get(i + 1)
                .map_or_else(|| sentence_end(list, *body_start), |(_, next_start, _)| *next_start);
            let body = list.get(*body_start..body_end)?;
            definition(term, body, source)
        })
        .collect()
}

fn sentence_definitions(text: &str, source: &ProvisionRef) -> Vec<Definition> {
    VED_FORSTAAS
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let term = caps.get(1)?;
            let rest = text.get(whole.end()..)?;
            if LIST_OPENER.is_match(rest) {
                return None;
            }
            let end = sentence_end(text, whole.end());
            definition(term.as_str(), text.get(whole.end()..end)?, source)
        })
        .collect()
}

/// Definitions found in one piece of provision text.
///
/// # Examples
/// ```
/// use lovref::extract::definitions_in;
/// use lovref::types::ProvisionRef;
///
/// let found = definitions_in(
///     "Ved personoplysninger forstås enhver information.",
///     &ProvisionRef::section("3"),
/// );
/// assert_eq!(found[0].term, "personoplysninger");
/// assert_eq!(found[0].definition, "enhver information.");
/// ```
#[must_use]
pub fn definitions_in(text: &str, source: &ProvisionRef) -> Vec<Definition> {
    let mut found = sentence_definitions(text, source);
    found.extend(numbered_definitions(text, source));
    found
}

/// Definitions across all provisions, in document order.
#[must_use]
pub fn extract_definitions(provisions: &[LegalProvision]) -> Vec<Definition> {
    provisions
        .iter()
        .flat_map(|provision| definitions_in(&provision.content, &provision.provision_ref))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source() -> ProvisionRef {
        ProvisionRef::new(Some("1".to_string()), "3")
    }

    fn terms(definitions: &[Definition]) -> Vec<(&str, &str)> {
        definitions
            .iter()
            .map(|d| (d.term.as_str(), d.definition.as_str()))
            .collect()
    }

    #[test]
    fn test_ved_forstaas() {
        let found = definitions_in("Ved personoplysninger forstås enhver information.", &source());
        assert_eq!(terms(&found), vec![("personoplysninger", "enhver information.")]);
        assert_eq!(found[0].source_provision, source());
    }

    #[test]
    fn test_ved_forstaas_i_denne_lov() {
        let found = definitions_in(
            "Ved Den Dataansvarlige forstås i denne lov en fysisk eller juridisk person, jf. stk. 2. Ved tredjemand forstås enhver anden.",
            &source(),
        );
        assert_eq!(
            terms(&found),
            vec![
                ("den dataansvarlige", "en fysisk eller juridisk person, jf. stk. 2."),
                ("tredjemand", "enhver anden.")
            ]
        );
    }

    #[test]
    fn test_quoted_term() {
        let found = definitions_in("Ved »behandling« forstås enhver aktivitet.", &source());
        assert_eq!(found[0].term, "behandling");
    }

    #[test]
    fn test_numbered_list() {
        let found = definitions_in(
            "I denne lov forstås ved: 1) Tobaksvarer: Varer, der er fremstillet af tobak. 2) Forbruger: En fysisk person. Stk. 2. Andet.",
            &source(),
        );
        assert_eq!(
            terms(&found),
            vec![
                ("tobaksvarer", "Varer, der er fremstillet af tobak."),
                ("forbruger", "En fysisk person.")
            ]
        );
    }

    #[test]
    fn test_ved_clause_before_numbered_list() {
        let found = definitions_in(
            "Ved anvendelse af denne lov forstås ved: 1) Tobaksvarer: Varer, der er fremstillet af tobak. 2) Forbruger: En fysisk person.",
            &source(),
        );
        assert_eq!(
            terms(&found),
            vec![
                ("tobaksvarer", "Varer, der er fremstillet af tobak."),
                ("forbruger", "En fysisk person.")
            ]
        );
    }

    #[test]
    fn test_numbered_list_without_ved() {
        let found = definitions_in(
            "I denne lov forstås: 1) Forhandler: Enhver, der sælger tobaksvarer.",
            &source(),
        );
        assert_eq!(
            terms(&found),
            vec![("forhandler", "Enhver, der sælger tobaksvarer.")]
        );
    }

    #[test]
    fn test_no_definition() {
        assert!(definitions_in("Loven gælder for hele riget.", &source()).is_empty());
        assert!(definitions_in("", &source()).is_empty());
    }
}
