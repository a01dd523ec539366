// src/css/ast.rs: the fully-owned stylesheet tree the expander rewrites.
use crate::error::SourceLocation;

/// A fully-owned CSS stylesheet: the top-level nodes in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    AtRule(AtRule),
    Rule(Rule),
    Declaration(Declaration),
    Comment(Comment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// e.g. "media", "responsive"
    pub name: String,
    /// Everything between the name and the block, trimmed.
    pub params: String,
    /// `None` for statement at-rules such as `@import "a.css";`.
    pub nodes: Option<Vec<Node>>,
    pub source: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// e.g. ".red", ".foo.test + .bar"
    pub selector: String,
    pub nodes: Vec<Node>,
    pub source: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    pub source: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub source: SourceLocation,
}

impl Stylesheet {
    pub fn new() -> Self {
        Stylesheet { nodes: Vec::new() }
    }
}

impl AtRule {
    /// A block at-rule with no children yet.
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        AtRule {
            name: name.into(),
            params: params.into(),
            nodes: Some(Vec::new()),
            source: SourceLocation::default(),
        }
    }

    /// Style rules directly inside this at-rule's block.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.nodes
            .iter()
            .flatten()
            .filter_map(|node| match node {
                Node::Rule(rule) => Some(rule),
                _ => None,
            })
    }

    pub fn append(&mut self, node: Node) {
        self.nodes.get_or_insert_with(Vec::new).push(node);
    }
}

impl Rule {
    pub fn new(selector: impl Into<String>) -> Self {
        Rule {
            selector: selector.into(),
            nodes: Vec::new(),
            source: SourceLocation::default(),
        }
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Declaration(decl) => Some(decl),
            _ => None,
        })
    }
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Declaration {
            property: property.into(),
            value: value.into(),
            important: false,
            source: SourceLocation::default(),
        }
    }
}
