//! LexDania XML to document tree conversion.

use roxmltree::{Document, Node};

use super::{Container, DocumentNode, HeadingKind};
use crate::config::{
    CHAPTER_TAG, EXPLICATUS_TAG, INLINE_TAGS, LOCAL_ID_KEYS, RUBRICA_TAG, SECTION_TAG, SKIP_TAGS,
};
use crate::error::Result;
use crate::text::normalize_text;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use lovref::tree::xml::get_tag_name;
///
/// let doc = Document::parse(r#"<Dokument><Paragraf>x</Paragraf></Dokument>"#).unwrap();
/// let paragraf = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(paragraf), "Paragraf");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Concatenated text of all descendants, unnormalized.
pub fn collect_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// First locally-scoped id attribute of an element.
fn local_id(node: Node<'_, '_>) -> Option<String> {
    LOCAL_ID_KEYS
        .iter()
        .find_map(|key| node.attribute(*key))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Parse LexDania XML into a document tree rooted at the document element.
///
/// Attributes other than the local id are dropped; they never become text.
///
/// # Errors
///
/// Returns an error if the XML is not well-formed.
///
/// # Examples
/// ```
/// use lovref::tree::{parse_xml, DocumentNode};
///
/// let tree = parse_xml(r#"<Dokument><Paragraf id="P1"><Explicatus>§ 1.</Explicatus></Paragraf></Dokument>"#).unwrap();
/// assert!(matches!(tree.children()[0], DocumentNode::Section(_)));
/// ```
pub fn parse_xml(xml: &str) -> Result<DocumentNode> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    Ok(convert_element(root).unwrap_or_else(|| DocumentNode::group(Vec::new())))
}

fn convert_element(node: Node<'_, '_>) -> Option<DocumentNode> {
    let tag = get_tag_name(node);
    if SKIP_TAGS.contains(&tag) {
        return None;
    }

    if tag == EXPLICATUS_TAG || tag == RUBRICA_TAG {
        let kind = if tag == EXPLICATUS_TAG {
            HeadingKind::Explicatus
        } else {
            HeadingKind::Rubrica
        };
        let text = normalize_text(&collect_text(node));
        return (!text.is_empty()).then(|| DocumentNode::heading(kind, text));
    }

    let container = Container::new(local_id(node), convert_children(node));
    Some(match tag {
        CHAPTER_TAG => DocumentNode::Chapter(container),
        SECTION_TAG => DocumentNode::Section(container),
        _ => DocumentNode::Group(container),
    })
}

/// Convert children, merging text nodes and inline markup into text runs.
fn convert_children(node: Node<'_, '_>) -> Vec<DocumentNode> {
    let mut children = Vec::new();
    let mut run = String::new();

    for child in node.children() {
        if child.is_text() {
            run.push_str(child.text().unwrap_or_default());
            continue;
        }
        if !child.is_element() {
            continue;
        }
        if INLINE_TAGS.contains(&get_tag_name(child)) {
            run.push_str(&collect_text(child));
            continue;
        }

        flush_run(&mut run, &mut children);
        if let Some(converted) = convert_element(child) {
            children.push(converted);
        }
    }
    flush_run(&mut run, &mut children);

    children
}

fn flush_run(run: &mut String, children: &mut Vec<DocumentNode>) {
    let text = normalize_text(run);
    if !text.is_empty() {
        children.push(DocumentNode::text(text));
    }
    run.clear();
}
