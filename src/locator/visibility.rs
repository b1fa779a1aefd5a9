use tracing::debug;

use crate::{
    dom::document::{Document, NodeId},
    locator::markers::{HIDDEN_CLASS, UNIQUE_ID_ATTR},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Shown,
}

/// Hide or show every node in `nodes`.
///
/// Showing also drops the generated-id attribute: the pairing is only needed
/// while the element stays hidden in this session.
pub fn apply_visibility(doc: &mut Document, nodes: &[NodeId], visibility: Visibility) {
    for node in nodes {
        match visibility {
            Visibility::Hidden => doc.add_class(*node, HIDDEN_CLASS),
            Visibility::Shown => {
                doc.remove_class(*node, HIDDEN_CLASS);
                doc.remove_attr(*node, UNIQUE_ID_ATTR);
            }
        }
    }
    debug!(count = nodes.len(), ?visibility, "applied visibility");
}

pub fn is_hidden(doc: &Document, node: NodeId) -> bool {
    doc.has_class(node, HIDDEN_CLASS)
}
