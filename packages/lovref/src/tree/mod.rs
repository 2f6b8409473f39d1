//! Hierarchical legal-document tree.
//!
//! Upstream ingestion produces either LexDania XML or its JSON rendering
//! (`@attr` / `#text` keys). Both are converted into the closed
//! [`DocumentNode`] type, so the provision walker never has to guess which
//! keys carry text.

pub mod json;
pub mod xml;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{LovrefError, Result};

pub use json::parse_ingestion_json;
pub use xml::parse_xml;

/// Kind of heading attached to a chapter or section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingKind {
    /// Label such as "§ 3." or "Kapitel 2".
    Explicatus,
    /// Title such as "Lovens anvendelsesområde".
    Rubrica,
}

/// A heading leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub kind: HeadingKind,
    pub text: String,
}

/// A node with an optional local id and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

impl Container {
    #[must_use]
    pub fn new(local_id: Option<String>, children: Vec<DocumentNode>) -> Self {
        Self { local_id, children }
    }

    /// Text of the first direct heading of the given kind.
    #[must_use]
    pub fn heading(&self, kind: HeadingKind) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            DocumentNode::Heading(heading) if heading.kind == kind => Some(heading.text.as_str()),
            _ => None,
        })
    }

    /// Direct headings of any kind, in document order.
    pub fn headings(&self) -> impl Iterator<Item = &Heading> {
        self.children.iter().filter_map(|child| match child {
            DocumentNode::Heading(heading) => Some(heading),
            _ => None,
        })
    }
}

/// One node of a document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentNode {
    /// Kapitel.
    Chapter(Container),
    /// Paragraf.
    Section(Container),
    /// Any other structural element (stk., litra, document root).
    Group(Container),
    Heading(Heading),
    Text { text: String },
}

impl DocumentNode {
    #[must_use]
    pub fn chapter(local_id: Option<&str>, children: Vec<DocumentNode>) -> Self {
        Self::Chapter(Container::new(local_id.map(str::to_string), children))
    }

    #[must_use]
    pub fn section(local_id: Option<&str>, children: Vec<DocumentNode>) -> Self {
        Self::Section(Container::new(local_id.map(str::to_string), children))
    }

    #[must_use]
    pub fn group(children: Vec<DocumentNode>) -> Self {
        Self::Group(Container::new(None, children))
    }

    #[must_use]
    pub fn heading(kind: HeadingKind, text: impl Into<String>) -> Self {
        Self::Heading(Heading {
            kind,
            text: text.into(),
        })
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Children of a container node; leaves have none.
    #[must_use]
    pub fn children(&self) -> &[DocumentNode] {
        match self {
            Self::Chapter(c) | Self::Section(c) | Self::Group(c) => &c.children,
            Self::Heading(_) | Self::Text { .. } => &[],
        }
    }

    /// Number of nodes in this subtree, including itself.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Self::node_count).sum::<usize>()
    }
}

/// Load a document tree from a file, choosing the reader by extension.
///
/// `.xml` is read as LexDania XML. `.json` is read as the tagged
/// [`DocumentNode`] form when it has a `type` key at the root, otherwise as
/// the ingestion JSON shape.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_tree(path: &Path) -> Result<DocumentNode> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xml" => parse_xml(&content),
        "json" => {
            let value: serde_json::Value = serde_json::from_str(&content)?;
            if value.get("type").is_some_and(serde_json::Value::is_string) {
                Ok(serde_json::from_value(value)?)
            } else {
                json::from_ingestion_value(&value)
            }
        }
        other => Err(LovrefError::InvalidTree(format!(
            "unsupported file type '{other}' for {}",
            path.display()
        ))),
    }
}
