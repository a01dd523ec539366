//! The handful of tree operations the expander needs, so it never touches a
//! concrete node API directly.

use crate::css::ast::{AtRule, Node, Rule, Stylesheet};
use crate::error::SourceLocation;

/// Position of a top-level node. Only valid until the tree is next mutated.
pub type NodeId = usize;

/// A style rule that can be inspected and cloned under a new selector.
pub trait StyleRule: Clone {
    fn selector(&self) -> &str;

    fn source(&self) -> SourceLocation;

    /// Deep clone with the selector replaced; children are left as they are.
    fn with_selector(&self, selector: String) -> Self;
}

/// Mutable stylesheet as seen by the expander.
pub trait CssTree {
    type Rule: StyleRule;

    /// Top-level at-rules called `name`, in document order.
    fn at_rule_ids(&self, name: &str) -> Vec<NodeId>;

    fn at_rule_params(&self, id: NodeId) -> &str;

    fn at_rule_source(&self, id: NodeId) -> SourceLocation;

    /// Style rules directly inside the at-rule's block.
    fn child_rules(&self, id: NodeId) -> Vec<&Self::Rule>;

    /// Number of at-rules directly inside the at-rule's block.
    fn child_at_rule_count(&self, id: NodeId) -> usize;

    fn append_rule(&mut self, id: NodeId, rule: Self::Rule);

    /// Add a new block at-rule holding `rules` at the end of the tree.
    fn append_at_rule(&mut self, name: &str, params: &str, rules: Vec<Self::Rule>);

    /// Drop the given top-level nodes, `ids` in ascending order as returned
    /// by [`CssTree::at_rule_ids`]. Ids of every other node may shift.
    fn remove(&mut self, ids: &[NodeId]);
}

impl StyleRule for Rule {
    fn selector(&self) -> &str {
        &self.selector
    }

    fn source(&self) -> SourceLocation {
        self.source
    }

    fn with_selector(&self, selector: String) -> Self {
        Rule {
            selector,
            ..self.clone()
        }
    }
}

impl Stylesheet {
    fn at_rule(&self, id: NodeId) -> Option<&AtRule> {
        match self.nodes.get(id) {
            Some(Node::AtRule(at_rule)) => Some(at_rule),
            _ => None,
        }
    }
}

impl CssTree for Stylesheet {
    type Rule = Rule;

    fn at_rule_ids(&self, name: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, node)| match node {
                Node::AtRule(at_rule) if at_rule.name == name => Some(id),
                _ => None,
            })
            .collect()
    }

    fn at_rule_params(&self, id: NodeId) -> &str {
        self.at_rule(id).map_or("", |at_rule| at_rule.params.as_str())
    }

    fn at_rule_source(&self, id: NodeId) -> SourceLocation {
        self.at_rule(id)
            .map(|at_rule| at_rule.source)
            .unwrap_or_default()
    }

    fn child_rules(&self, id: NodeId) -> Vec<&Rule> {
        match self.at_rule(id) {
            Some(at_rule) => at_rule.rules().collect(),
            None => Vec::new(),
        }
    }

    fn child_at_rule_count(&self, id: NodeId) -> usize {
        self.at_rule(id)
            .and_then(|at_rule| at_rule.nodes.as_ref())
            .map_or(0, |nodes| {
                nodes
                    .iter()
                    .filter(|node| matches!(node, Node::AtRule(_)))
                    .count()
            })
    }

    fn append_rule(&mut self, id: NodeId, rule: Rule) {
        if let Some(Node::AtRule(at_rule)) = self.nodes.get_mut(id) {
            at_rule.append(Node::Rule(rule));
        }
    }

    fn append_at_rule(&mut self, name: &str, params: &str, rules: Vec<Rule>) {
        let mut at_rule = AtRule::new(name, params);
        at_rule.nodes = Some(rules.into_iter().map(Node::Rule).collect());
        self.nodes.push(Node::AtRule(at_rule));
    }

    fn remove(&mut self, ids: &[NodeId]) {
        let mut pending = ids.iter().copied().peekable();
        let mut index = 0;
        self.nodes.retain(|_| {
            // Skip duplicates and ids already behind the cursor.
            while pending.next_if(|&id| id < index).is_some() {}
            let drop = pending.next_if_eq(&index).is_some();
            index += 1;
            !drop
        });
    }
}
