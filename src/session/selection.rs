use tracing::{debug, info};

use crate::{
    dom::document::{Document, NodeId},
    locator::{
        describe::describe,
        descriptor::ElementDescriptor,
        markers::HOVER_CLASS,
        visibility::{Visibility, apply_visibility},
    },
    session::overlay::{
        create_indicator, ensure_badge, hide_badge, inject_styles, is_overlay, update_badge,
    },
};

/// Result of a click while selecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Overlay element; the click passes through untouched.
    PassThrough,
    /// The target was described and hidden.
    Committed(ElementDescriptor),
}

/// Interactive selection state, alive only while selection mode is on.
///
/// Holds the hovered element and the overlay nodes it created. Dropping the
/// session through [`SelectionSession::disable`] restores the page.
#[derive(Debug)]
pub struct SelectionSession {
    hovered: Option<NodeId>,
    badge: Option<NodeId>,
    indicator: Option<NodeId>,
}

impl SelectionSession {
    pub fn enable(doc: &mut Document) -> Self {
        info!("selection mode enabled");
        inject_styles(doc);
        let badge = ensure_badge(doc);
        let indicator = create_indicator(doc);
        if let Some(body) = doc.body() {
            doc.set_style_property(body, "cursor", "crosshair");
        }

        Self {
            hovered: None,
            badge,
            indicator,
        }
    }

    pub fn disable(mut self, doc: &mut Document) {
        info!("selection mode disabled");
        if let Some(badge) = self.badge {
            hide_badge(doc, badge);
        }
        if let Some(indicator) = self.indicator.take() {
            doc.detach(indicator);
        }
        if let Some(body) = doc.body() {
            doc.remove_style_property(body, "cursor");
        }
        self.clear_highlight(doc);
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn badge(&self) -> Option<NodeId> {
        self.badge
    }

    pub fn indicator(&self) -> Option<NodeId> {
        self.indicator
    }

    /// Track the pointer: move the highlight to a new target, or only
    /// reposition the badge when the target is unchanged.
    pub fn pointer_move(&mut self, doc: &mut Document, target: NodeId, x: i32, y: i32) {
        if is_overlay(doc, target) {
            return;
        }

        if self.hovered != Some(target) {
            if let Some(previous) = self.hovered {
                doc.remove_class(previous, HOVER_CLASS);
            }
            self.hovered = Some(target);
            doc.add_class(target, HOVER_CLASS);
        }

        if let Some(badge) = self.badge {
            update_badge(doc, badge, target, x, y);
        }
    }

    /// Describe and hide the clicked element.
    pub fn click(&mut self, doc: &mut Document, target: NodeId) -> ClickOutcome {
        if is_overlay(doc, target) {
            debug!(%target, "click on overlay ignored");
            return ClickOutcome::PassThrough;
        }

        let descriptor = describe(doc, target);
        apply_visibility(doc, &[target], Visibility::Hidden);
        self.clear_highlight(doc);

        info!(
            tag = descriptor.tag_name.as_str(),
            xpath = descriptor.xpath.as_deref().unwrap_or_default(),
            "element selected"
        );
        ClickOutcome::Committed(descriptor)
    }

    fn clear_highlight(&mut self, doc: &mut Document) {
        if let Some(hovered) = self.hovered.take() {
            doc.remove_class(hovered, HOVER_CLASS);
        }
    }
}
