// Names injected into the page. Stored descriptors and already-tagged pages
// depend on these exact strings.

pub const MARKER_PREFIX: &str = "cmw-";

pub const HIDDEN_CLASS: &str = "cmw-hidden-element";
pub const HOVER_CLASS: &str = "cmw-hover-highlight";
pub const BADGE_CLASS: &str = "cmw-element-badge";
pub const INDICATOR_CLASS: &str = "cmw-mode-indicator";

pub const UNIQUE_ID_ATTR: &str = "data-cmw-unique-id";
pub const STYLE_ELEMENT_ID: &str = "cmw-styles";

pub const STYLE_SHEET: &str = r#"
.cmw-hidden-element {
    display: none !important;
}
.cmw-hover-highlight {
    outline: 3px solid #667eea !important;
    outline-offset: 2px !important;
    background: rgba(102, 126, 234, 0.1) !important;
    cursor: crosshair !important;
    transition: all 0.1s ease !important;
}
@keyframes cmw-slideIn {
    from { transform: translateX(400px); opacity: 0; }
    to { transform: translateX(0); opacity: 1; }
}
"#;

/// Whether a class name belongs to the injected marker namespace.
pub fn is_marker_class(class: &str) -> bool {
    class.starts_with(MARKER_PREFIX)
}
