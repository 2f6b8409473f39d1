//! Provision extraction from a document tree.
//!
//! Walks the tree tracking the nearest enclosing chapter and emits one
//! [`LegalProvision`] per section with text of its own. Nodes whose number
//! cannot be resolved produce an [`ExtractionWarning`] instead; their
//! children are still walked.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::patterns::{chapter_from_heading, number_from_local_id, section_from_heading};
use crate::text::normalize_text;
use crate::tree::{Container, DocumentNode, HeadingKind};
use crate::types::{LegalProvision, ProvisionRef};

/// What went wrong with a tree node during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Chapter without a usable id or "Kapitel N" heading; parent chapter inherited.
    UnresolvedChapter,
    /// Section without a usable id or "§ N" heading; not emitted.
    UnresolvedSection,
    /// Section resolved but carries no text of its own; not emitted.
    EmptySection,
}

/// A non-fatal problem found while walking a document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    /// Chapter in effect at the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

impl ExtractionWarning {
    fn new(kind: WarningKind, container: &Container, chapter: Option<&str>) -> Self {
        Self {
            kind,
            local_id: container.local_id.clone(),
            heading: container.headings().next().map(|h| h.text.clone()),
            chapter: chapter.map(str::to_string),
        }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            WarningKind::UnresolvedChapter => "unresolved chapter",
            WarningKind::UnresolvedSection => "unresolved section",
            WarningKind::EmptySection => "section without text",
        };
        write!(f, "{what}")?;
        if let Some(heading) = &self.heading {
            write!(f, " (heading '{heading}')")?;
        }
        if let Some(local_id) = &self.local_id {
            write!(f, " (id '{local_id}')")?;
        }
        if let Some(chapter) = &self.chapter {
            write!(f, " in chapter {chapter}")?;
        }
        Ok(())
    }
}

struct ProvisionWalker<'a> {
    document_id: &'a str,
    provisions: Vec<LegalProvision>,
    warnings: Vec<ExtractionWarning>,
}

impl ProvisionWalker<'_> {
    fn walk(&mut self, node: &DocumentNode, chapter: Option<&str>) {
        match node {
            DocumentNode::Chapter(container) => {
                let resolved = resolve_chapter(container);
                if resolved.is_none() {
                    let warning =
                        ExtractionWarning::new(WarningKind::UnresolvedChapter, container, chapter);
                    tracing::warn!(
                        document_id = %self.document_id,
                        node = ?warning.local_id,
                        heading = ?warning.heading,
                        "Could not resolve chapter number, keeping enclosing chapter"
                    );
                    self.warnings.push(warning);
                }
                let chapter = resolved.as_deref().or(chapter);
                for child in &container.children {
                    self.walk(child, chapter);
                }
            }
            DocumentNode::Section(container) => {
                self.visit_section(container, chapter);
                for child in &container.children {
                    self.walk(child, chapter);
                }
            }
            DocumentNode::Group(container) => {
                for child in &container.children {
                    self.walk(child, chapter);
                }
            }
            DocumentNode::Heading(_) | DocumentNode::Text { .. } => {}
        }
    }

    fn visit_section(&mut self, container: &Container, chapter: Option<&str>) {
        let Some(section) = resolve_section(container) else {
            let warning = ExtractionWarning::new(WarningKind::UnresolvedSection, container, chapter);
            tracing::warn!(
                document_id = %self.document_id,
                node = ?warning.local_id,
                heading = ?warning.heading,
                "Could not resolve section number, skipping"
            );
            self.warnings.push(warning);
            return;
        };

        let content = own_text(container);
        if content.is_empty() {
            tracing::debug!(
                document_id = %self.document_id,
                section = %section,
                "Section has no text of its own"
            );
            self.warnings.push(ExtractionWarning::new(
                WarningKind::EmptySection,
                container,
                chapter,
            ));
            return;
        }

        let provision_ref = ProvisionRef::new(chapter.map(str::to_string), &section);
        self.provisions.push(LegalProvision {
            document_id: self.document_id.to_string(),
            chapter: provision_ref.chapter.clone(),
            section: provision_ref.section.clone(),
            provision_ref,
            title: container.heading(HeadingKind::Rubrica).map(str::to_string),
            content,
        });
    }
}

/// Chapter number from the local id, else from a "Kapitel N" heading.
fn resolve_chapter(container: &Container) -> Option<String> {
    container
        .local_id
        .as_deref()
        .and_then(number_from_local_id)
        .or_else(|| {
            container
                .headings()
                .find_map(|heading| chapter_from_heading(&heading.text))
        })
}

/// Section number from the local id, else from a "§ N" or "N." heading.
fn resolve_section(container: &Container) -> Option<String> {
    container
        .local_id
        .as_deref()
        .and_then(number_from_local_id)
        .or_else(|| {
            container
                .heading(HeadingKind::Explicatus)
                .and_then(section_from_heading)
        })
        .or_else(|| {
            container
                .headings()
                .find_map(|heading| section_from_heading(&heading.text))
        })
}

/// Text of a section excluding its own headings and nested sections or chapters.
///
/// Subsection labels ("Stk. 2.") are kept so pinpoints stay readable in the content.
fn own_text(container: &Container) -> String {
    let mut parts: Vec<&str> = Vec::new();
    collect_own_text(&container.children, false, &mut parts);
    normalize_text(&parts.join(" "))
}

fn collect_own_text<'a>(nodes: &'a [DocumentNode], nested: bool, parts: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            DocumentNode::Text { text } => parts.push(text),
            DocumentNode::Heading(heading) if nested && heading.kind == HeadingKind::Explicatus => {
                parts.push(&heading.text);
            }
            DocumentNode::Group(inner) => collect_own_text(&inner.children, true, parts),
            DocumentNode::Chapter(_) | DocumentNode::Section(_) | DocumentNode::Heading(_) => {}
        }
    }
}

/// Collapse provisions sharing `(document id, provision ref)`.
///
/// The entry with the longest content wins; on equal length the first one
/// stays. Output keeps the order of first occurrence.
#[must_use]
pub fn deduplicate_provisions(provisions: Vec<LegalProvision>) -> Vec<LegalProvision> {
    let mut index: HashMap<(String, ProvisionRef), usize> = HashMap::new();
    let mut kept: Vec<LegalProvision> = Vec::with_capacity(provisions.len());

    for provision in provisions {
        let key = (provision.document_id.clone(), provision.provision_ref.clone());
        match index.get(&key) {
            Some(&position) => {
                let Some(existing) = kept.get_mut(position) else {
                    continue;
                };
                if provision.content.chars().count() > existing.content.chars().count() {
                    tracing::debug!(
                        document_id = %provision.document_id,
                        provision = %provision.provision_ref,
                        "Replacing duplicate provision with longer content"
                    );
                    *existing = provision;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(provision);
            }
        }
    }

    kept
}

/// Extract the deduplicated provisions of one document.
///
/// # Examples
/// ```
/// use lovref::extract::extract_provisions;
/// use lovref::tree::{DocumentNode, HeadingKind};
///
/// let tree = DocumentNode::chapter(Some("K2"), vec![
///     DocumentNode::section(None, vec![
///         DocumentNode::heading(HeadingKind::Explicatus, "§ 5 a."),
///         DocumentNode::text("Tekst."),
///     ]),
/// ]);
/// let (provisions, warnings) = extract_provisions("2018:502", &tree);
/// assert_eq!(provisions[0].provision_ref.to_string(), "2:5 a");
/// assert!(warnings.is_empty());
/// ```
#[must_use]
pub fn extract_provisions(
    document_id: &str,
    tree: &DocumentNode,
) -> (Vec<LegalProvision>, Vec<ExtractionWarning>) {
    let mut walker = ProvisionWalker {
        document_id,
        provisions: Vec::new(),
        warnings: Vec::new(),
    };
    walker.walk(tree, None);

    let provisions = deduplicate_provisions(walker.provisions);
    tracing::debug!(
        document_id,
        provisions = provisions.len(),
        warnings = walker.warnings.len(),
        "Extracted provisions"
    );
    (provisions, walker.warnings)
}
