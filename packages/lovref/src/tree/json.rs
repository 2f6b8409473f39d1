//! Ingestion JSON to document tree conversion.
//!
//! The ingestion shape mirrors the XML: element names are object keys,
//! repeated elements are arrays, attributes are `@`-prefixed keys and the
//! character payload sits under `#text` (or is the value itself when an
//! element has neither attributes nor children).

use serde_json::{Map, Value};

use super::{Container, DocumentNode, HeadingKind};
use crate::config::{
    is_non_content_key, ATTRIBUTE_PREFIX, CHAPTER_TAG, EXPLICATUS_TAG, INLINE_TAGS,
    LOCAL_ID_KEYS, RUBRICA_TAG, SECTION_TAG, SKIP_TAGS, TEXT_PAYLOAD_KEY,
};
use crate::error::{LovrefError, Result};
use crate::text::normalize_text;

/// Parse ingestion JSON text into a document tree.
///
/// # Errors
///
/// Returns an error if the text is not JSON or its root is not an object.
///
/// # Examples
/// ```
/// use lovref::tree::{parse_ingestion_json, DocumentNode};
///
/// let json = r##"{"Dokument": {"Paragraf": {"@id": "P1", "#text": "Tekst."}}}"##;
/// let tree = parse_ingestion_json(json).unwrap();
/// assert_eq!(
///     tree.children()[0],
///     DocumentNode::section(Some("P1"), vec![DocumentNode::text("Tekst.")])
/// );
/// ```
pub fn parse_ingestion_json(json: &str) -> Result<DocumentNode> {
    let value: Value = serde_json::from_str(json)?;
    from_ingestion_value(&value)
}

/// Convert an already parsed ingestion value.
///
/// A root object with a single element key is unwrapped to that element.
///
/// # Errors
///
/// Returns [`LovrefError::InvalidTree`] if the root is not an object.
pub fn from_ingestion_value(value: &Value) -> Result<DocumentNode> {
    let Value::Object(map) = value else {
        return Err(LovrefError::InvalidTree(
            "expected a JSON object at the root".to_string(),
        ));
    };

    if map.len() == 1 {
        if let Some((tag, inner)) = map.iter().next() {
            if !is_non_content_key(tag) && tag != TEXT_PAYLOAD_KEY && inner.is_object() {
                let mut nodes = convert_tagged(tag, inner);
                if nodes.len() == 1 {
                    if let Some(node) = nodes.pop() {
                        return Ok(node);
                    }
                }
                return Ok(DocumentNode::group(nodes));
            }
        }
    }

    Ok(DocumentNode::Group(convert_object("", map)))
}

/// Convert the value of an element key; arrays yield one node per item.
fn convert_tagged(tag: &str, value: &Value) -> Vec<DocumentNode> {
    if SKIP_TAGS.contains(&tag) {
        return Vec::new();
    }

    if let Some(kind) = heading_kind(tag) {
        let text = normalize_text(&collect_text(value));
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![DocumentNode::heading(kind, text)]
        };
    }

    match value {
        Value::Array(items) => items
            .iter()
            .flat_map(|item| convert_tagged(tag, item))
            .collect(),
        Value::Object(map) => vec![wrap(tag, convert_object(tag, map))],
        Value::Null => Vec::new(),
        scalar => {
            let text = normalize_text(&collect_text(scalar));
            let children = if text.is_empty() {
                Vec::new()
            } else {
                vec![DocumentNode::text(text)]
            };
            match tag {
                CHAPTER_TAG | SECTION_TAG => vec![wrap(tag, Container::new(None, children))],
                _ => children,
            }
        }
    }
}

fn convert_object(tag: &str, map: &Map<String, Value>) -> Container {
    let mut children = Vec::new();
    let mut run = String::new();

    for (key, child) in map {
        if key == TEXT_PAYLOAD_KEY {
            run.push(' ');
            run.push_str(&collect_text(child));
            continue;
        }
        if is_non_content_key(key) {
            continue;
        }
        if INLINE_TAGS.contains(&key.as_str()) {
            run.push(' ');
            run.push_str(&collect_text(child));
            continue;
        }

        flush_run(&mut run, &mut children);
        children.extend(convert_tagged(key, child));
    }
    flush_run(&mut run, &mut children);

    tracing::trace!(tag, children = children.len(), "Converted ingestion element");
    Container::new(local_id(map), children)
}

fn wrap(tag: &str, container: Container) -> DocumentNode {
    match tag {
        CHAPTER_TAG => DocumentNode::Chapter(container),
        SECTION_TAG => DocumentNode::Section(container),
        _ => DocumentNode::Group(container),
    }
}

fn heading_kind(tag: &str) -> Option<HeadingKind> {
    match tag {
        EXPLICATUS_TAG => Some(HeadingKind::Explicatus),
        RUBRICA_TAG => Some(HeadingKind::Rubrica),
        _ => None,
    }
}

/// Local id from `@id`-style keys (or their unprefixed forms).
fn local_id(map: &Map<String, Value>) -> Option<String> {
    LOCAL_ID_KEYS.iter().find_map(|key| {
        let prefixed = format!("{ATTRIBUTE_PREFIX}{key}");
        let value = map.get(&prefixed).or_else(|| map.get(*key))?;
        let id = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!id.is_empty()).then_some(id)
    })
}

/// All text content of a value, skipping attribute and other non-content keys.
fn collect_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(collect_text).collect::<Vec<_>>().join(" "),
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| *key == TEXT_PAYLOAD_KEY || !is_non_content_key(key))
            .filter(|(key, _)| !SKIP_TAGS.contains(&key.as_str()))
            .map(|(_, child)| collect_text(child))
            .collect::<Vec<_>>()
            .join(" "),
        Value::Bool(_) | Value::Null => String::new(),
    }
}

fn flush_run(run: &mut String, children: &mut Vec<DocumentNode>) {
    let text = normalize_text(run);
    if !text.is_empty() {
        children.push(DocumentNode::text(text));
    }
    run.clear();
}
