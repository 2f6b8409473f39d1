//! Citation rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FormatError, LovrefError};
use crate::types::StructuredCitation;

/// Output style for [`format_citation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// Document, chapter, section, article and pinpoint. Parses back losslessly.
    #[default]
    Full,
    /// The most specific location alone ("§ 5", "art. 6").
    Short,
    /// Full citation including the subsection pinpoint.
    Pinpoint,
}

impl CitationStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Short => "short",
            Self::Pinpoint => "pinpoint",
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitationStyle {
    type Err = LovrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "short" => Ok(Self::Short),
            "pinpoint" => Ok(Self::Pinpoint),
            _ => Err(LovrefError::InvalidStyle(s.to_string())),
        }
    }
}

/// Render a citation in the given style.
///
/// # Errors
///
/// Returns [`FormatError::MissingLocation`] for a citation with neither a
/// document identifier nor a location.
///
/// # Examples
/// ```
/// use lovref::citation::{format_citation, parse_citation, CitationStyle};
///
/// let citation = parse_citation("2018:502 3:5, stk. 2").unwrap();
/// assert_eq!(
///     format_citation(&citation, CitationStyle::Full).unwrap(),
///     "2018:502 kap. 3 § 5, stk. 2"
/// );
/// assert_eq!(format_citation(&citation, CitationStyle::Short).unwrap(), "§ 5");
/// ```
pub fn format_citation(
    citation: &StructuredCitation,
    style: CitationStyle,
) -> Result<String, FormatError> {
    let document_id = citation.document_id.trim();
    if document_id.is_empty() && citation.section.is_none() && citation.eu_article.is_none() {
        return Err(FormatError::MissingLocation);
    }

    match style {
        CitationStyle::Full | CitationStyle::Pinpoint => Ok(render_full(citation, document_id)),
        CitationStyle::Short => Ok(render_short(citation, document_id)),
    }
}

fn render_full(citation: &StructuredCitation, document_id: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !document_id.is_empty() {
        parts.push(document_id.to_string());
    }
    if let Some(chapter) = &citation.chapter {
        parts.push(format!("kap. {chapter}"));
    }
    if let Some(section) = &citation.section {
        parts.push(format!("§ {section}"));
    }
    if let Some(article) = &citation.eu_article {
        parts.push(format!("art. {article}"));
    }

    let mut rendered = parts.join(" ");
    if let Some(pinpoint) = &citation.pinpoint {
        rendered.push_str(&format!(", stk. {pinpoint}"));
    }
    rendered
}

fn render_short(citation: &StructuredCitation, document_id: &str) -> String {
    if let Some(section) = &citation.section {
        format!("§ {section}")
    } else if let Some(article) = &citation.eu_article {
        format!("art. {article}")
    } else {
        document_id.to_string()
    }
}
