use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::debug;

use crate::{
    dom::document::{Document, NodeId},
    locator::{
        descriptor::ElementDescriptor,
        markers::{UNIQUE_ID_ATTR, is_marker_class},
    },
};

pub const BODY_PATH: &str = "/html/body";
pub const TEXT_LIMIT: usize = 100;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Capture `node` into a descriptor and tag it with a fresh unique id.
pub fn describe(doc: &mut Document, node: NodeId) -> ElementDescriptor {
    let unique_id = generate_unique_id();
    doc.set_attr(node, UNIQUE_ID_ATTR, &unique_id);

    let descriptor = ElementDescriptor {
        tag_name: doc.tag_name(node).unwrap_or_default().to_ascii_uppercase(),
        id: doc.id(node).map(str::to_string),
        classes: capture_classes(doc, node),
        text: capture_text(doc, node),
        unique_id: Some(unique_id),
        xpath: Some(element_path(doc, node)),
    };

    debug!(
        unique_id = descriptor.unique_id.as_deref().unwrap_or_default(),
        xpath = descriptor.xpath.as_deref().unwrap_or_default(),
        "described element"
    );
    descriptor
}

/// `cmw-<epoch millis>-<9 base36 chars>`.
pub fn generate_unique_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("cmw-{}-{}", millis, suffix)
}

/// Absolute path expression for `node`, anchored at the body.
///
/// Elements with an id short-circuit to `//*[@id="..."]`. Otherwise each step
/// up to the body is `/<tag>[n]`, `n` being the 1-based position among
/// same-tag element siblings.
pub fn element_path(doc: &Document, node: NodeId) -> String {
    if let Some(id) = doc.id(node) {
        return format!("//*[@id=\"{}\"]", id);
    }

    let body = doc.body();
    if Some(node) == body {
        return BODY_PATH.to_string();
    }

    let mut path = String::new();
    let mut current = Some(node);

    while let Some(step) = current {
        if Some(step) == body {
            break;
        }
        let Some(tag) = doc.tag_name(step) else {
            break;
        };

        let mut index = 1;
        let mut sibling = doc.previous_element_sibling(step);
        while let Some(prev) = sibling {
            if doc.tag_name(prev) == Some(tag) {
                index += 1;
            }
            sibling = doc.previous_element_sibling(prev);
        }

        path = format!("/{}[{}]{}", tag, index, path);
        current = doc.parent_element(step);
    }

    format!("{}{}", BODY_PATH, path)
}

fn capture_classes(doc: &Document, node: NodeId) -> Vec<String> {
    doc.class_list(node)
        .into_iter()
        .filter(|c| !is_marker_class(c))
        .map(str::to_string)
        .collect()
}

fn capture_text(doc: &Document, node: NodeId) -> String {
    doc.text_content(node)
        .trim()
        .chars()
        .take(TEXT_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_id_shape() {
        let id = generate_unique_id();
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts[0], "cmw");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
        assert_ne!(generate_unique_id(), generate_unique_id());
    }
}
