use tracing::{debug, warn};

use crate::{
    dom::document::{Document, NodeId},
    locator::markers::{
        BADGE_CLASS, INDICATOR_CLASS, STYLE_ELEMENT_ID, STYLE_SHEET, is_marker_class,
    },
};

const OVERLAY_STYLE: &str = "position: fixed !important; z-index: 2147483647 !important; \
     pointer-events: none !important;";

const BADGE_OFFSET: i32 = 15;

/// Insert the marker style sheet once per page.
pub fn inject_styles(doc: &mut Document) {
    if doc.find_by_id(STYLE_ELEMENT_ID).is_some() {
        return;
    }
    let Some(parent) = doc.head().or_else(|| doc.document_element()) else {
        warn!("page has no document element, styles not injected");
        return;
    };

    let style = doc.create_element("style");
    doc.set_attr(style, "id", STYLE_ELEMENT_ID);
    doc.set_text(style, STYLE_SHEET);
    doc.append_child(parent, style);
    debug!("style sheet injected");
}

/// The floating badge, created hidden on first use and reused afterwards.
pub fn ensure_badge(doc: &mut Document) -> Option<NodeId> {
    let body = doc.body()?;
    if let Some(existing) = doc
        .descendant_elements(body)
        .into_iter()
        .find(|n| doc.has_class(*n, BADGE_CLASS))
    {
        return Some(existing);
    }

    let badge = doc.create_element("div");
    doc.set_attr(badge, "class", BADGE_CLASS);
    doc.set_attr(badge, "style", OVERLAY_STYLE);
    doc.set_style_property(badge, "display", "none");
    doc.append_child(body, badge);
    Some(badge)
}

/// Point the badge at `target` and move it next to the pointer.
pub fn update_badge(doc: &mut Document, badge: NodeId, target: NodeId, x: i32, y: i32) {
    let label = badge_label(doc, target);
    doc.set_text(badge, &label);
    doc.set_style_property(badge, "display", "block");
    doc.set_style_property(badge, "left", &format!("{}px", x + BADGE_OFFSET));
    doc.set_style_property(badge, "top", &format!("{}px", y + BADGE_OFFSET));
}

pub fn hide_badge(doc: &mut Document, badge: NodeId) {
    doc.set_style_property(badge, "display", "none");
}

/// `tag#id.c1.c2` with at most two non-marker classes.
///
/// Marker classes are dropped before the dot is added, so a classless element
/// reads `div` rather than `div.`.
pub fn badge_label(doc: &Document, target: NodeId) -> String {
    let mut label = doc.tag_name(target).unwrap_or_default().to_string();
    if let Some(id) = doc.id(target) {
        label.push('#');
        label.push_str(id);
    }
    let classes: Vec<&str> = doc
        .class_list(target)
        .into_iter()
        .filter(|c| !is_marker_class(c))
        .take(2)
        .collect();
    if !classes.is_empty() {
        label.push('.');
        label.push_str(&classes.join("."));
    }
    label
}

pub fn create_indicator(doc: &mut Document) -> Option<NodeId> {
    let body = doc.body()?;

    let indicator = doc.create_element("div");
    doc.set_attr(indicator, "class", INDICATOR_CLASS);
    doc.set_attr(indicator, "style", OVERLAY_STYLE);
    doc.set_style_property(indicator, "top", "20px");
    doc.set_style_property(indicator, "right", "20px");

    let icon = doc.create_element("div");
    doc.set_text(icon, "\u{2702}\u{fe0f}");
    doc.append_child(indicator, icon);

    let copy = doc.create_element("div");
    let title = doc.create_element("div");
    doc.set_text(title, "Selection Mode Active");
    let hint = doc.create_element("div");
    doc.set_text(hint, "Click elements to hide \u{2022} ESC to exit");
    doc.append_child(copy, title);
    doc.append_child(copy, hint);
    doc.append_child(indicator, copy);

    doc.append_child(body, indicator);
    debug!("mode indicator created");
    Some(indicator)
}

/// Whether `target` belongs to the injected overlay and must not be selected.
pub fn is_overlay(doc: &Document, target: NodeId) -> bool {
    doc.has_class(target, INDICATOR_CLASS)
        || doc.has_class(target, BADGE_CLASS)
        || doc.closest_with_class(target, INDICATOR_CLASS).is_some()
}
