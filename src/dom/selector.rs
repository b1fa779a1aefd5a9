//! CSS selector queries over the [`Document`] arena.
//!
//! Selectors are parsed with scraper's grammar and matched by the `selectors`
//! engine through [`ArenaElement`], so the arena accepts the same selectors
//! `scraper::Selector` does. Non-tree-structural pseudo-classes never match.

use cssparser::ParserInput;
use scraper::{
    error::SelectorErrorKind,
    selector::{CssLocalName, CssString, NonTSPseudoClass, Parser, PseudoElement, Simple},
};
use selectors::{
    Element, OpaqueElement, SelectorImpl, SelectorList,
    attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint},
    matching,
    parser::ParseRelative,
};
use thiserror::Error;

use crate::dom::document::{Document, NodeId, NodeKind};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("'{selector}' is not a valid selector: {reason}")]
    Invalid { selector: String, reason: String },
}

/// A parsed selector group, ready to match against any [`Document`].
#[derive(Debug, Clone)]
pub struct Selector {
    list: SelectorList<Simple>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        if selector.trim().is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut input = ParserInput::new(selector);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&Parser, &mut parser, ParseRelative::No).map_err(|e| {
            SelectorError::Invalid {
                selector: selector.to_string(),
                reason: SelectorErrorKind::from(e).to_string(),
            }
        })?;

        Ok(Self { list })
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = ArenaElement::wrap(doc, node) else {
            return false;
        };
        let mut nth_index_cache = Default::default();
        let mut context = matching::MatchingContext::new(
            matching::MatchingMode::Normal,
            None,
            &mut nth_index_cache,
            matching::QuirksMode::NoQuirks,
            matching::NeedsSelectorFlags::No,
            matching::IgnoreNthChildForInvalidation::No,
        );
        matching::matches_selector_list(&self.list, &element, &mut context)
    }

    /// Every connected element matching this selector, in document order.
    pub fn select(&self, doc: &Document) -> Vec<NodeId> {
        doc.elements()
            .into_iter()
            .filter(|n| self.matches(doc, *n))
            .collect()
    }
}

/// Every connected element matching `selector`, in document order.
pub fn query_selector_all(doc: &Document, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
    Ok(Selector::parse(selector)?.select(doc))
}

pub fn query_selector(doc: &Document, selector: &str) -> Result<Option<NodeId>, SelectorError> {
    Ok(query_selector_all(doc, selector)?.into_iter().next())
}

/// Element view of one arena node for the `selectors` matching engine.
#[derive(Debug, Clone, Copy)]
pub struct ArenaElement<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl<'a> ArenaElement<'a> {
    pub fn wrap(doc: &'a Document, node: NodeId) -> Option<Self> {
        doc.is_element(node).then_some(Self { doc, node })
    }

    fn with(&self, node: NodeId) -> Self {
        Self { doc: self.doc, node }
    }

    fn tag(&self) -> &'a str {
        self.doc.tag_name(self.node).unwrap_or_default()
    }

    fn siblings(&self) -> &'a [NodeId] {
        self.doc
            .parent(self.node)
            .map(|p| self.doc.children(p))
            .unwrap_or_default()
    }
}

impl Element for ArenaElement<'_> {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.doc.kind(self.node))
    }

    fn parent_element(&self) -> Option<Self> {
        self.doc.parent_element(self.node).map(|p| self.with(p))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.doc
            .previous_element_sibling(self.node)
            .map(|s| self.with(s))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let siblings = self.siblings();
        let position = siblings.iter().position(|s| *s == self.node)?;
        siblings[position + 1..]
            .iter()
            .find(|s| self.doc.is_element(**s))
            .map(|s| self.with(*s))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.doc
            .element_children(self.node)
            .next()
            .map(|c| self.with(c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.tag() == &*name.0
    }

    fn has_namespace(&self, ns: &<Simple as SelectorImpl>::BorrowedNamespaceUrl) -> bool {
        &**ns == HTML_NAMESPACE
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&<Simple as SelectorImpl>::NamespaceUrl>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        // Arena attributes carry no namespace.
        if matches!(ns, NamespaceConstraint::Specific(url) if !url.is_empty()) {
            return false;
        }
        self.doc
            .element(self.node)
            .map(|e| {
                e.attrs
                    .iter()
                    .any(|(name, value)| name.as_str() == &*local_name.0 && operation.eval_str(value))
            })
            .unwrap_or(false)
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pc: &NonTSPseudoClass,
        _context: &mut matching::MatchingContext<'_, Simple>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut matching::MatchingContext<'_, Simple>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: matching::ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        self.tag() == "link"
    }

    fn is_html_slot_element(&self) -> bool {
        self.tag() == "slot"
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .id(self.node)
            .is_some_and(|own| case_sensitivity.eq(id.0.as_bytes(), own.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .class_list(self.node)
            .iter()
            .any(|c| case_sensitivity.eq(name.0.as_bytes(), c.as_bytes()))
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self.doc.children(self.node).iter().any(|c| match self.doc.kind(*c) {
            NodeKind::Element(_) => true,
            NodeKind::Text(text) => !text.is_empty(),
            NodeKind::Document => false,
        })
    }

    fn is_root(&self) -> bool {
        self.doc
            .parent(self.node)
            .is_some_and(|p| matches!(self.doc.kind(p), NodeKind::Document))
    }
}
