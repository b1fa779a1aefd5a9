use std::fmt;

/// Index of a node inside a [`Document`] arena.
///
/// Ids stay valid for the lifetime of the document; detached nodes keep their
/// slot so a stale id never aliases a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Complete,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    /// Lowercase local name.
    pub tag: String,
    /// Attributes in source order, names lowercased.
    pub attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Mutable in-memory page: an arena of nodes rooted at a document node.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    ready_state: ReadyState,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            ready_state: ReadyState::Complete,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Remove `node` from its parent. The subtree stays in the arena.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Replace all children of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Parent if it is an element (the document node is not).
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
    }

    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|c| *c == node)?;
        siblings[..position]
            .iter()
            .rev()
            .copied()
            .find(|c| self.is_element(*c))
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root).next()
    }

    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|c| self.tag_name(*c) == Some("head"))
    }

    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|c| self.tag_name(*c) == Some("body"))
    }

    /// Whether `node` is attached to the document tree.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Element descendants of `node` (excluding `node`) in document order.
    pub fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.is_element(current) {
                out.push(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every connected element in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendant_elements(self.root)
    }

    /// `node` itself or its nearest ancestor element carrying `class`.
    pub fn closest_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.has_class(current, class) {
                return Some(current);
            }
            cursor = self.parent_element(current);
        }
        None
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        let element = self.element(node)?;
        element
            .attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Set an attribute; no-op on non-element nodes.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(node) else {
            return;
        };
        let lowered = name.to_ascii_lowercase();
        match element.attrs.iter_mut().find(|(k, _)| *k == lowered) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attrs.push((lowered, value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element_mut(node) {
            element.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        }
    }

    /// The element id, treating an empty attribute as absent.
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id").filter(|id| !id.is_empty())
    }

    /// First connected element whose attribute `name` equals `value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|n| self.attr(*n, name) == Some(value))
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_attr("id", id)
    }

    // ------------------------------------------------------------------
    // Class list
    // ------------------------------------------------------------------

    pub fn class_list(&self, node: NodeId) -> Vec<&str> {
        self.attr(node, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_list(node).contains(&class)
    }

    /// Add `class` unless already present.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.is_element(node) || self.has_class(node, class) {
            return;
        }
        let mut classes: Vec<String> = self
            .class_list(node)
            .into_iter()
            .map(str::to_string)
            .collect();
        classes.push(class.to_string());
        self.set_attr(node, "class", &classes.join(" "));
    }

    /// Remove every occurrence of `class`.
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let remaining: Vec<String> = self
            .class_list(node)
            .into_iter()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        self.set_attr(node, "class", &remaining.join(" "));
    }

    // ------------------------------------------------------------------
    // Text and inline style
    // ------------------------------------------------------------------

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            _ => {
                let mut out = String::new();
                for child in self.children(node) {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
        }
    }

    pub fn style_property(&self, node: NodeId, property: &str) -> Option<String> {
        parse_style(self.attr(node, "style").unwrap_or(""))
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    pub fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) {
        let mut declarations = parse_style(self.attr(node, "style").unwrap_or(""));
        match declarations.iter_mut().find(|(k, _)| k == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }
        self.set_attr(node, "style", &format_style(&declarations));
    }

    pub fn remove_style_property(&mut self, node: NodeId, property: &str) {
        let Some(style) = self.attr(node, "style") else {
            return;
        };
        let mut declarations = parse_style(style);
        declarations.retain(|(k, _)| k != property);
        if declarations.is_empty() {
            self.remove_attr(node, "style");
        } else {
            self.set_attr(node, "style", &format_style(&declarations));
        }
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim().to_ascii_lowercase();
            if k.is_empty() {
                return None;
            }
            Some((k, v.trim().to_string()))
        })
        .collect()
}

fn format_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}
