use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    dom::{
        document::{Document, NodeId},
        selector::query_selector_all,
        xpath::evaluate_first,
    },
    locator::{descriptor::ElementDescriptor, markers::UNIQUE_ID_ATTR},
};

/// Which strategy answered a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Element already carries the descriptor's generated id (same session).
    UniqueId,
    /// The stored path expression matched.
    Path,
    /// Tag + id or tag + classes selector; may match many elements.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub tier: Option<Tier>,
    pub nodes: Vec<NodeId>,
}

impl Resolution {
    fn found(tier: Tier, nodes: Vec<NodeId>) -> Self {
        Self {
            tier: Some(tier),
            nodes,
        }
    }

    fn miss() -> Self {
        Self {
            tier: None,
            nodes: Vec::new(),
        }
    }

    pub fn is_miss(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Find the live element(s) a descriptor refers to.
///
/// Tiers run in order and the first that yields a node wins. Path and legacy
/// hits are tagged with the descriptor's unique id so later calls in the same
/// page session take the unique-id tier. Misses and malformed input are
/// logged, never returned as errors.
pub fn resolve(doc: &mut Document, descriptor: &ElementDescriptor) -> Resolution {
    let unique_id = descriptor.unique_id.as_deref().filter(|u| !u.is_empty());

    if let Some(unique_id) = unique_id {
        if let Some(node) = doc.find_by_attr(UNIQUE_ID_ATTR, unique_id) {
            debug!(unique_id, %node, "resolved by unique id");
            return Resolution::found(Tier::UniqueId, vec![node]);
        }
    }

    if let Some(xpath) = descriptor.xpath.as_deref().filter(|x| !x.is_empty()) {
        match evaluate_first(doc, xpath) {
            Ok(Some(node)) => {
                if let Some(unique_id) = unique_id {
                    doc.set_attr(node, UNIQUE_ID_ATTR, unique_id);
                }
                debug!(xpath, %node, "resolved by path");
                return Resolution::found(Tier::Path, vec![node]);
            }
            Ok(None) => warn!(xpath, "path matched no elements"),
            Err(e) => warn!(xpath, error = %e, "invalid path expression"),
        }
    }

    let Some(selector) = legacy_selector(descriptor) else {
        warn!(
            tag = descriptor.tag_name.as_str(),
            "cannot resolve element without path, id or classes"
        );
        return Resolution::miss();
    };

    let nodes = match query_selector_all(doc, &selector) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!(selector = selector.as_str(), error = %e, "legacy selector rejected");
            return Resolution::miss();
        }
    };

    if nodes.is_empty() {
        warn!(selector = selector.as_str(), "no elements found for selector");
        return Resolution::miss();
    }

    if let Some(unique_id) = unique_id {
        for node in &nodes {
            if !doc.has_attr(*node, UNIQUE_ID_ATTR) {
                doc.set_attr(*node, UNIQUE_ID_ATTR, unique_id);
            }
        }
    }

    debug!(selector = selector.as_str(), count = nodes.len(), "resolved by legacy selector");
    Resolution::found(Tier::Legacy, nodes)
}

/// `TAG#id` when the descriptor has an id, else `TAG.c1.c2`.
pub fn legacy_selector(descriptor: &ElementDescriptor) -> Option<String> {
    if let Some(id) = descriptor.non_empty_id() {
        return Some(format!("{}#{}", descriptor.tag_name, id));
    }
    if !descriptor.classes.is_empty() {
        return Some(format!("{}.{}", descriptor.tag_name, descriptor.classes.join(".")));
    }
    None
}
