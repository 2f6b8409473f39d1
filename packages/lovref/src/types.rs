//! Core data types for citations, provisions and extracted references.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::patterns::{canonical_section, classify_document_id};

/// Shape of a document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentIdKind {
    /// Danish Lovtidende identifier, `YYYY:N`.
    Danish,
    /// EU act, `type:YYYY/N`.
    Eu,
    /// Short name or opaque source id, resolved downstream.
    ShortName,
}

/// A fully parsed citation.
///
/// Equality ignores `raw`: two citations are equal when they point at the
/// same place, however they were written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredCitation {
    /// Document identifier (`2018:502`, `regulation:2016/679`, or a short name).
    pub document_id: String,

    /// Chapter (kapitel), only together with a section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,

    /// Section (paragraf), e.g. "5" or "5 a".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Subsection pinpoint (stk.).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinpoint: Option<String>,

    /// Article pinpoint in an EU act.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eu_article: Option<String>,

    /// The input the citation was parsed from.
    #[serde(default)]
    pub raw: String,
}

impl StructuredCitation {
    /// Create a citation for a document with no location.
    #[must_use]
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            chapter: None,
            section: None,
            pinpoint: None,
            eu_article: None,
            raw: String::new(),
        }
    }

    /// Set the section (canonicalized).
    #[must_use]
    pub fn with_section(mut self, section: impl AsRef<str>) -> Self {
        self.section = Some(canonical_section(section.as_ref()));
        self
    }

    /// Set the chapter (canonicalized).
    #[must_use]
    pub fn with_chapter(mut self, chapter: impl AsRef<str>) -> Self {
        self.chapter = Some(canonical_section(chapter.as_ref()));
        self
    }

    /// Set the subsection pinpoint.
    #[must_use]
    pub fn with_pinpoint(mut self, pinpoint: impl Into<String>) -> Self {
        self.pinpoint = Some(pinpoint.into());
        self
    }

    /// Set the EU article pinpoint.
    #[must_use]
    pub fn with_eu_article(mut self, article: impl Into<String>) -> Self {
        self.eu_article = Some(article.into());
        self
    }

    /// Shape of the document identifier; unrecognised ids count as short names.
    #[must_use]
    pub fn document_kind(&self) -> DocumentIdKind {
        classify_document_id(&self.document_id).unwrap_or(DocumentIdKind::ShortName)
    }

    /// The provision this citation points at.
    ///
    /// An EU article stands in for the section when no section is given.
    #[must_use]
    pub fn provision_ref(&self) -> Option<ProvisionRef> {
        let section = self.section.as_deref().or(self.eu_article.as_deref())?;
        Some(ProvisionRef::new(self.chapter.clone(), section))
    }
}

impl PartialEq for StructuredCitation {
    fn eq(&self, other: &Self) -> bool {
        self.document_id == other.document_id
            && self.chapter == other.chapter
            && self.section == other.section
            && self.pinpoint == other.pinpoint
            && self.eu_article == other.eu_article
    }
}

impl Eq for StructuredCitation {}

/// Canonical key of a provision inside a document.
///
/// Renders as `chapter:section` when a chapter is known, else `section`.
/// Serialized as its rendered string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProvisionRef {
    pub chapter: Option<String>,
    pub section: String,
}

impl ProvisionRef {
    /// Create a reference; chapter and section are canonicalized.
    #[must_use]
    pub fn new(chapter: Option<String>, section: impl AsRef<str>) -> Self {
        Self {
            chapter: chapter
                .map(|c| canonical_section(&c))
                .filter(|c| !c.is_empty()),
            section: canonical_section(section.as_ref()),
        }
    }

    /// Create a reference without chapter.
    #[must_use]
    pub fn section(section: impl AsRef<str>) -> Self {
        Self::new(None, section)
    }

    /// Parse a rendered reference ("3:5", "5 a").
    ///
    /// # Examples
    /// ```
    /// use lovref::types::ProvisionRef;
    ///
    /// let r = ProvisionRef::parse("3:5a");
    /// assert_eq!(r.chapter.as_deref(), Some("3"));
    /// assert_eq!(r.section, "5 a");
    /// assert_eq!(r.to_string(), "3:5 a");
    /// ```
    #[must_use]
    pub fn parse(rendered: &str) -> Self {
        match rendered.split_once(':') {
            Some((chapter, section)) => Self::new(Some(chapter.to_string()), section),
            None => Self::section(rendered),
        }
    }

    /// Whether two refs name the same section, treating a missing chapter as a wildcard.
    #[must_use]
    pub fn matches(&self, other: &ProvisionRef) -> bool {
        self.section == other.section
            && match (&self.chapter, &other.chapter) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

impl fmt::Display for ProvisionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.chapter {
            Some(chapter) => write!(f, "{chapter}:{}", self.section),
            None => f.write_str(&self.section),
        }
    }
}

impl Serialize for ProvisionRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProvisionRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rendered = String::deserialize(deserializer)?;
        Ok(Self::parse(&rendered))
    }
}

/// One section of a statute after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalProvision {
    pub document_id: String,
    pub provision_ref: ProvisionRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Never empty.
    pub content: String,
}

/// A reference found in provision text pointing at another provision or document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossReference {
    pub source_document_id: String,
    pub source_provision: ProvisionRef,
    /// Same as the source document for "§ N" style references.
    pub target_document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_provision: Option<ProvisionRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinpoint: Option<String>,
    /// The matched text.
    pub raw: String,
}

impl CrossReference {
    /// Whether the reference points into the document it was found in.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.source_document_id == self.target_document_id
    }
}

/// Relationship between a Danish provision or document and an EU act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// Bare citation without a relationship verb.
    Applies,
    /// "som ændret ved", "supplerer".
    Supplements,
    /// "gennemfører", "implementerer af".
    Implements,
}

impl ReferenceType {
    /// Get the string value used in storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Implements => "implements",
            Self::Supplements => "supplements",
            Self::Applies => "applies",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link from a Danish document (or one of its provisions) to an EU act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EuReference {
    pub document_id: String,
    /// Rendered provision ref; `None` for document-level text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision_id: Option<String>,
    pub eu_document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eu_article: Option<String>,
    pub reference_type: ReferenceType,
    pub is_primary_implementation: bool,
    /// Sentence around the match.
    pub context: String,
}

/// A defined term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Lower-cased, normalized.
    pub term: String,
    pub definition: String,
    pub source_provision: ProvisionRef,
}

/// Dates between which a document or provision is in force.
///
/// Both ends are inclusive; an open end is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InForceWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl InForceWindow {
    /// Create a window.
    #[must_use]
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Whether `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| from <= date) && self.to.is_none_or(|to| date <= to)
    }
}

impl fmt::Display for InForceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from.map(|d| d.to_string()).unwrap_or_else(|| "…".to_string());
        let to = self.to.map(|d| d.to_string()).unwrap_or_else(|| "…".to_string());
        write!(f, "{from} – {to}")
    }
}

/// Metadata about the document being extracted, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub in_force: InForceWindow,
}

impl DocumentMeta {
    /// Create metadata with just a document id.
    #[must_use]
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            title: None,
            in_force: InForceWindow::default(),
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the in-force window.
    #[must_use]
    pub fn with_in_force(mut self, window: InForceWindow) -> Self {
        self.in_force = window;
        self
    }
}

/// The provision a successful validation resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProvision {
    pub document_id: String,
    /// `None` for a document-level citation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision: Option<ProvisionRef>,
}

/// Outcome of checking a citation against a provision store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub matched: bool,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedProvision>,
}

impl ValidationResult {
    /// An unmatched result with a first warning.
    #[must_use]
    pub fn unmatched(warning: impl Into<String>) -> Self {
        Self {
            matched: false,
            warnings: vec![warning.into()],
            resolved: None,
        }
    }

    /// A matched result.
    #[must_use]
    pub fn matched(resolved: ResolvedProvision) -> Self {
        Self {
            matched: true,
            warnings: Vec::new(),
            resolved: Some(resolved),
        }
    }
}
