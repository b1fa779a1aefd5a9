//! Path-expression evaluation over a [`Document`].
//!
//! Covers the location-path subset element descriptors are written in:
//!
//! ```text
//! /html/body/div[2]/span[1]
//! //*[@id="cookie-banner"]
//! //section//a[@href='/promo']
//! ```
//!
//! Each step is a child (`/`) or descendant (`//`) step with a name test
//! (`name` or `*`) and at most one predicate: a 1-based position or an
//! attribute equality. Anything outside that grammar is a [`XPathError`].

use std::collections::HashSet;

use thiserror::Error;

use crate::dom::document::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XPathError {
    #[error("empty path expression")]
    Empty,

    #[error("path expression must be absolute: {0}")]
    Relative(String),

    #[error("unexpected end of path expression: {0}")]
    UnexpectedEnd(String),

    #[error("unexpected '{found}' at offset {offset} in {expr}")]
    UnexpectedChar {
        expr: String,
        offset: usize,
        found: char,
    },

    #[error("invalid position predicate '{0}'")]
    InvalidPosition(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    AttrEquals { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicate: Option<Predicate>,
}

/// A parsed, absolute location path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    steps: Vec<Step>,
}

impl XPath {
    pub fn parse(expr: &str) -> Result<Self, XPathError> {
        Parser::new(expr).parse()
    }

    /// All matching elements in document order.
    pub fn select(&self, doc: &Document) -> Vec<NodeId> {
        let mut context = vec![doc.root()];

        for step in &self.steps {
            let mut seen = HashSet::new();
            let mut next = Vec::new();

            for ctx in &context {
                for candidate in step_candidates(doc, *ctx, step.axis) {
                    if step.accepts(doc, candidate) && seen.insert(candidate) {
                        next.push(candidate);
                    }
                }
            }

            if next.is_empty() {
                return Vec::new();
            }
            context = next;
        }

        let selected: HashSet<NodeId> = context.into_iter().collect();
        doc.elements()
            .into_iter()
            .filter(|n| selected.contains(n))
            .collect()
    }

    /// First match in document order.
    pub fn first(&self, doc: &Document) -> Option<NodeId> {
        self.select(doc).into_iter().next()
    }
}

/// Parse and evaluate `expr`, returning the first ordered match.
pub fn evaluate_first(doc: &Document, expr: &str) -> Result<Option<NodeId>, XPathError> {
    Ok(XPath::parse(expr)?.first(doc))
}

fn step_candidates(doc: &Document, ctx: NodeId, axis: Axis) -> Vec<NodeId> {
    match axis {
        Axis::Child => doc.element_children(ctx).collect(),
        // descendant-or-self::node()/child::*
        Axis::Descendant => doc.descendant_elements(ctx),
    }
}

impl Step {
    fn name_matches(&self, doc: &Document, node: NodeId) -> bool {
        match &self.test {
            NameTest::Any => doc.is_element(node),
            NameTest::Name(name) => doc
                .tag_name(node)
                .is_some_and(|tag| tag.eq_ignore_ascii_case(name)),
        }
    }

    fn accepts(&self, doc: &Document, node: NodeId) -> bool {
        if !self.name_matches(doc, node) {
            return false;
        }
        match &self.predicate {
            None => true,
            Some(Predicate::AttrEquals { name, value }) => {
                doc.attr(node, name) == Some(value.as_str())
            }
            Some(Predicate::Position(position)) => self.position_of(doc, node) == *position,
        }
    }

    /// 1-based position of `node` among its parent's children passing the
    /// name test.
    fn position_of(&self, doc: &Document, node: NodeId) -> usize {
        let Some(parent) = doc.parent(node) else {
            return 1;
        };
        doc.element_children(parent)
            .filter(|c| self.name_matches(doc, *c))
            .position(|c| c == node)
            .map_or(0, |p| p + 1)
    }
}

struct Parser<'a> {
    expr: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(expr: &'a str) -> Self {
        Self {
            expr,
            chars: expr.char_indices().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<XPath, XPathError> {
        if self.expr.trim().is_empty() {
            return Err(XPathError::Empty);
        }
        if self.peek() != Some('/') {
            return Err(XPathError::Relative(self.expr.to_string()));
        }

        let mut steps = Vec::new();
        while self.peek().is_some() {
            steps.push(self.step()?);
        }
        Ok(XPath { steps })
    }

    fn step(&mut self) -> Result<Step, XPathError> {
        self.expect('/')?;
        let axis = if self.peek() == Some('/') {
            self.pos += 1;
            Axis::Descendant
        } else {
            Axis::Child
        };

        let test = if self.peek() == Some('*') {
            self.pos += 1;
            NameTest::Any
        } else {
            NameTest::Name(self.name()?)
        };

        let predicate = if self.peek() == Some('[') {
            Some(self.predicate()?)
        } else {
            None
        };

        Ok(Step {
            axis,
            test,
            predicate,
        })
    }

    fn predicate(&mut self) -> Result<Predicate, XPathError> {
        self.expect('[')?;
        self.skip_ws();

        let predicate = match self.peek() {
            Some('@') => {
                self.pos += 1;
                let name = self.name()?;
                self.skip_ws();
                self.expect('=')?;
                self.skip_ws();
                let value = self.quoted()?;
                Predicate::AttrEquals { name, value }
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().map(|(_, c)| c).collect();
                let position = digits
                    .parse::<usize>()
                    .map_err(|_| XPathError::InvalidPosition(digits.clone()))?;
                Predicate::Position(position)
            }
            Some(_) => return Err(self.unexpected()),
            None => return Err(XPathError::UnexpectedEnd(self.expr.to_string())),
        };

        self.skip_ws();
        self.expect(']')?;
        Ok(predicate)
    }

    fn name(&mut self) -> Result<String, XPathError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => self.pos += 1,
            Some(_) => return Err(self.unexpected()),
            None => return Err(XPathError::UnexpectedEnd(self.expr.to_string())),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().map(|(_, c)| c).collect())
    }

    fn quoted(&mut self) -> Result<String, XPathError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            Some(_) => return Err(self.unexpected()),
            None => return Err(XPathError::UnexpectedEnd(self.expr.to_string())),
        };
        self.pos += 1;

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value = self.chars[start..self.pos].iter().map(|(_, c)| c).collect();
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(XPathError::UnexpectedEnd(self.expr.to_string()))
    }

    fn expect(&mut self, expected: char) -> Result<(), XPathError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.unexpected()),
            None => Err(XPathError::UnexpectedEnd(self.expr.to_string())),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn unexpected(&self) -> XPathError {
        let (offset, found) = self.chars[self.pos];
        XPathError::UnexpectedChar {
            expr: self.expr.to_string(),
            offset,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::html::parse_html;

    const PAGE: &str = r#"
        <div id="top"><span>a</span></div>
        <div><span>b</span><p>x</p><span class="hit">c</span></div>
        <section><a href="/promo">promo</a></section>
    "#;

    #[test]
    fn positional_path_selects_nth_same_tag_child() {
        let doc = parse_html(PAGE);
        let hit = evaluate_first(&doc, "/html/body/div[2]/span[2]").unwrap().unwrap();
        assert!(doc.has_class(hit, "hit"));

        assert_eq!(evaluate_first(&doc, "/html/body/div[3]").unwrap(), None);
        assert_eq!(evaluate_first(&doc, "/html/body").unwrap(), doc.body());
    }

    #[test]
    fn descendant_attribute_predicate() {
        let doc = parse_html(PAGE);
        let top = evaluate_first(&doc, r#"//*[@id="top"]"#).unwrap();
        assert_eq!(top, doc.find_by_id("top"));

        let link = evaluate_first(&doc, "//section//a[@href='/promo']").unwrap().unwrap();
        assert_eq!(doc.text_content(link), "promo");
    }

    #[test]
    fn select_returns_document_order() {
        let doc = parse_html(PAGE);
        let spans = XPath::parse("//span").unwrap().select(&doc);
        let texts: Vec<String> = spans.iter().map(|s| doc.text_content(*s)).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn malformed_expressions_are_errors() {
        assert_eq!(XPath::parse(""), Err(XPathError::Empty));
        assert!(matches!(XPath::parse("html/body"), Err(XPathError::Relative(_))));
        assert!(matches!(
            XPath::parse(r#"//*[@id="a"b"]"#),
            Err(XPathError::UnexpectedChar { found: 'b', .. })
        ));
        assert!(matches!(XPath::parse("/html/body/div["), Err(XPathError::UnexpectedEnd(_))));
        assert!(matches!(XPath::parse("/html/body/div[last()]"), Err(XPathError::UnexpectedChar { .. })));
        assert!(matches!(XPath::parse("/html/"), Err(XPathError::UnexpectedEnd(_))));
    }
}
