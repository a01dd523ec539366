use crate::css::ast::{AtRule, Node, Rule, Stylesheet};
use crate::error::Error;
use lightningcss::error::{Error as LcssError, ParserError};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use std::fmt;

/// How a stylesheet is turned back into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Everything on one line: `@media (x) { .a { color: red; } }`.
    Compact,
    /// One node per line, two-space indentation.
    #[default]
    Pretty,
    /// Compact output re-printed by LightningCSS with minification on.
    Minified,
}

impl Stylesheet {
    pub fn to_css(&self, style: OutputStyle) -> Result<String, Error> {
        match style {
            OutputStyle::Compact => Ok(self.to_string()),
            OutputStyle::Pretty => {
                let mut out = String::new();
                for node in &self.nodes {
                    write_pretty(&mut out, node, 0);
                    out.push('\n');
                }
                Ok(out)
            }
            OutputStyle::Minified => minify(&self.to_string()),
        }
    }
}

/// Compact form.
impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_children(f, &self.nodes)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::AtRule(at_rule) => write!(f, "{}", at_rule),
            Node::Rule(rule) => write!(f, "{}", rule),
            Node::Declaration(decl) => {
                write!(f, "{}: {}", decl.property, decl.value)?;
                if decl.important {
                    f.write_str(" !important")?;
                }
                f.write_str(";")
            }
            Node::Comment(comment) => write!(f, "/* {} */", comment.text),
        }
    }
}

impl fmt::Display for AtRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.params.is_empty() {
            write!(f, " {}", self.params)?;
        }
        match &self.nodes {
            None => f.write_str(";"),
            Some(nodes) => write_block(f, nodes),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)?;
        write_block(f, &self.nodes)
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

fn write_block(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    if nodes.is_empty() {
        return f.write_str(" {}");
    }
    f.write_str(" { ")?;
    write_children(f, nodes)?;
    f.write_str(" }")
}

fn write_pretty(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::AtRule(at_rule) => {
            out.push_str(&indent);
            out.push('@');
            out.push_str(&at_rule.name);
            if !at_rule.params.is_empty() {
                out.push(' ');
                out.push_str(&at_rule.params);
            }
            match &at_rule.nodes {
                None => out.push(';'),
                Some(nodes) => write_pretty_block(out, nodes, depth),
            }
        }
        Node::Rule(rule) => {
            out.push_str(&indent);
            out.push_str(&rule.selector);
            write_pretty_block(out, &rule.nodes, depth);
        }
        Node::Declaration(_) | Node::Comment(_) => {
            out.push_str(&indent);
            out.push_str(&node.to_string());
        }
    }
}

fn write_pretty_block(out: &mut String, nodes: &[Node], depth: usize) {
    if nodes.is_empty() {
        out.push_str(" {}");
        return;
    }
    out.push_str(" {\n");
    for child in nodes {
        write_pretty(out, child, depth + 1);
        out.push('\n');
    }
    out.push_str(&"  ".repeat(depth));
    out.push('}');
}

/// Re-print CSS text through LightningCSS with minification enabled.
pub fn minify(css: &str) -> Result<String, Error> {
    let sheet = LightningStyleSheet::parse(css, ParserOptions::default())
        .map_err(|e: LcssError<ParserError<'_>>| Error::Minify(e.to_string()))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| Error::Minify(e.to_string()))?;
    Ok(printed.code)
}
