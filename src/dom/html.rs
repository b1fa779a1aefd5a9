use scraper::{ElementRef, Html};

use crate::dom::document::{Document, NodeId, NodeKind, ReadyState};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parse an HTML page into a [`Document`].
///
/// The HTML5 parser always produces `html`, `head` and `body`, so the result
/// has the structure path expressions are computed against. Comments and the
/// doctype are dropped.
pub fn parse_html(source: &str) -> Document {
    let parsed = Html::parse_document(source);
    let mut doc = Document::new();
    let root = doc.root();
    let html = copy_element(&mut doc, parsed.root_element());
    doc.append_child(root, html);
    doc.set_ready_state(ReadyState::Complete);
    doc
}

fn copy_element(doc: &mut Document, source: ElementRef<'_>) -> NodeId {
    let node = doc.create_element(source.value().name());
    for (name, value) in source.value().attrs() {
        doc.set_attr(node, name, value);
    }

    for child in source.children() {
        if let Some(element) = ElementRef::wrap(child) {
            let copied = copy_element(doc, element);
            doc.append_child(node, copied);
        } else if let Some(text) = child.value().as_text() {
            let copied = doc.create_text(&**text);
            doc.append_child(node, copied);
        }
    }

    node
}

/// Serialize the document back to HTML.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    for child in doc.children(doc.root()) {
        write_node(doc, *child, false, &mut out);
    }
    out.push('\n');
    out
}

fn write_node(doc: &Document, node: NodeId, raw_text: bool, out: &mut String) {
    match doc.kind(node) {
        NodeKind::Document => {
            for child in doc.children(node) {
                write_node(doc, *child, false, out);
            }
        }
        NodeKind::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                return;
            }

            let raw = RAW_TEXT_ELEMENTS.contains(&element.tag.as_str());
            for child in doc.children(node) {
                write_node(doc, *child, raw, out);
            }

            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
