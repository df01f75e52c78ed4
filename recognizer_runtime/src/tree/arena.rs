//! Arena holding every rule invocation context and leaf of a parse.
//!
//! Nodes are addressed by [`NodeId`]. A node's parent is a relation only;
//! the arena owns every node, so trees of any depth drop without recursion.
//! Every allocation gets a fresh stamp: an id whose node was released by
//! [`ParseTree::clear`] or [`ParseTree::truncate`] resolves to nothing, even
//! after its slot is reused.

use super::listener::ParseTreeListener;
use super::walker::{IterativeWalker, TreeWalker};
use crate::config::compile_time::parser::INITIAL_TREE_CAPACITY;
use crate::interval::Interval;
use crate::parser::RecognitionError;
use crate::tokens::{escape_whitespace, TokenRef};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    slot: usize,
    stamp: u64,
}

impl NodeId {
    /// Arena slot. Slots are reused after a release; compare ids, not slots.
    pub fn index(self) -> usize {
        self.slot
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.slot)
    }
}

/// One rule invocation. Doubles as call-stack frame and parse-tree node.
#[derive(Debug, Clone)]
pub struct RuleNode {
    pub rule_index: usize,
    /// Automaton state that invoked this rule; -1 for the root
    pub invoking_state: isize,
    pub alt_number: Option<usize>,
    pub start: Option<TokenRef>,
    pub stop: Option<TokenRef>,
    /// Set when the rule did not complete normally
    pub exception: Option<RecognitionError>,
    children: Vec<NodeId>,
}

impl RuleNode {
    fn new(invoking_state: isize, rule_index: usize) -> Self {
        Self {
            rule_index,
            invoking_state,
            alt_number: None,
            start: None,
            stop: None,
            exception: None,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Rule(RuleNode),
    Terminal(TokenRef),
    /// A token consumed or conjured during error recovery
    Error(TokenRef),
}

#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
    stamp: u64,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_rule(&self) -> bool {
        matches!(self.kind, NodeKind::Rule(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, NodeKind::Error(_))
    }

    /// Token of a terminal or error node
    pub fn token(&self) -> Option<&TokenRef> {
        match &self.kind {
            NodeKind::Terminal(token) | NodeKind::Error(token) => Some(token),
            NodeKind::Rule(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    nodes: Vec<Node>,
    next_stamp: u64,
}

impl Default for ParseTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseTree {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_TREE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            next_stamp: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node. Outstanding ids stop resolving.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Release every node allocated after the first `len`. Ids of released
    /// nodes stop resolving; child lists that named them are not rewritten.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Whether `id` still names a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId {
            slot: self.nodes.len(),
            stamp: self.next_stamp,
        };
        self.next_stamp += 1;
        self.nodes.push(Node {
            parent,
            kind,
            stamp: id.stamp,
        });
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.slot)
            .filter(|node| node.stamp == id.stamp)
    }

    /// New rule context whose parent is `parent`. The parent's children are
    /// left untouched.
    pub fn create_rule_node(
        &mut self,
        parent: Option<NodeId>,
        invoking_state: isize,
        rule_index: usize,
    ) -> NodeId {
        self.push(parent, NodeKind::Rule(RuleNode::new(invoking_state, rule_index)))
    }

    /// New leaf whose parent is `parent`; the leaf is not yet a child.
    pub fn create_terminal(&mut self, parent: NodeId, token: TokenRef, is_error: bool) -> NodeId {
        let kind = if is_error {
            NodeKind::Error(token)
        } else {
            NodeKind::Terminal(token)
        };
        self.push(Some(parent), kind)
    }

    /// Append `child` to a rule node and make it the child's parent.
    /// Returns false when `parent` is not a rule node.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(rule) = self.rule_mut(parent) else {
            return false;
        };
        rule.children.push(child);
        self.set_parent(child, Some(parent));
        true
    }

    pub fn remove_last_child(&mut self, parent: NodeId) -> Option<NodeId> {
        let removed = self.rule_mut(parent)?.children.pop()?;
        Some(removed)
    }

    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.node_mut(child) {
            node.parent = parent;
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot).filter(|node| node.stamp == id.stamp)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn rule(&self, id: NodeId) -> Option<&RuleNode> {
        match &self.node(id)?.kind {
            NodeKind::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn rule_mut(&mut self, id: NodeId) -> Option<&mut RuleNode> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn token(&self, id: NodeId) -> Option<&TokenRef> {
        self.node(id)?.token()
    }

    /// Children of a rule node; empty for leaves
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.rule(id).map(RuleNode::children).unwrap_or(&[])
    }

    pub fn child(&self, id: NodeId, i: usize) -> Option<NodeId> {
        self.children(id).get(i).copied()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Number of nodes from `id` up to the root, both included
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).map(|_| id);
        while let Some(node) = current {
            depth += 1;
            current = self.parent(node);
        }
        depth
    }

    /// A context is empty when nothing invoked it (the root frame)
    pub fn is_empty_context(&self, id: NodeId) -> bool {
        self.rule(id).map_or(false, |rule| rule.invoking_state == -1)
    }

    /// Token-index range covered by a node. A rule with no stop token yet (or
    /// one that matched nothing) covers `start..start-1`.
    pub fn source_interval(&self, id: NodeId) -> Interval {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Rule(rule)) => {
                let Some(start) = &rule.start else {
                    return Interval::INVALID;
                };
                let start_index = start.token_index as i32;
                match &rule.stop {
                    Some(stop) if stop.token_index >= start.token_index => {
                        Interval::of(start_index, stop.token_index as i32)
                    }
                    _ => Interval::of(start_index, start_index - 1),
                }
            }
            Some(NodeKind::Terminal(token)) | Some(NodeKind::Error(token)) => {
                let index = token.token_index as i32;
                Interval::of(index, index)
            }
            None => Interval::INVALID,
        }
    }

    /// Leaf children of `id` whose token has the given type
    pub fn child_tokens(&self, id: NodeId, token_type: i32) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| {
                self.token(child)
                    .map_or(false, |token| token.token_type == token_type)
            })
            .collect()
    }

    pub fn child_token(&self, id: NodeId, token_type: i32, i: usize) -> Option<NodeId> {
        self.child_tokens(id, token_type).get(i).copied()
    }

    /// Rule children of `id` invoking the given rule
    pub fn child_rules(&self, id: NodeId, rule_index: usize) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| {
                self.rule(child)
                    .map_or(false, |rule| rule.rule_index == rule_index)
            })
            .collect()
    }

    pub fn child_rule(&self, id: NodeId, rule_index: usize, i: usize) -> Option<NodeId> {
        self.child_rules(id, rule_index).get(i).copied()
    }

    /// Concatenated text of every leaf below `id`
    pub fn text(&self, id: NodeId) -> String {
        let mut collector = TextCollector::default();
        IterativeWalker.walk(&mut collector, self, id);
        collector.text
    }

    /// LISP-style rendering: `(rule child child ...)`, `rule:alt` when the
    /// alternative is recorded, leaf text with whitespace escaped. Rules
    /// missing from `rule_names` render as their index.
    pub fn to_string_tree(&self, id: NodeId, rule_names: &[&str]) -> String {
        let mut printer = LispPrinter {
            rule_names,
            out: String::new(),
            needs_space: false,
        };
        IterativeWalker.walk(&mut printer, self, id);
        printer.out
    }
}

#[derive(Default)]
struct TextCollector {
    text: String,
}

impl ParseTreeListener for TextCollector {
    fn visit_terminal(&mut self, tree: &ParseTree, node: NodeId) {
        if let Some(text) = tree.token(node).and_then(|token| token.text()) {
            self.text.push_str(text);
        }
    }

    fn visit_error_node(&mut self, tree: &ParseTree, node: NodeId) {
        self.visit_terminal(tree, node);
    }
}

struct LispPrinter<'a> {
    rule_names: &'a [&'a str],
    out: String,
    needs_space: bool,
}

impl LispPrinter<'_> {
    fn separate(&mut self) {
        if self.needs_space {
            self.out.push(' ');
        }
        self.needs_space = true;
    }

    fn leaf(&mut self, tree: &ParseTree, node: NodeId) {
        self.separate();
        let text = tree
            .token(node)
            .and_then(|token| token.text())
            .unwrap_or("<no text>");
        self.out.push_str(&escape_whitespace(text));
    }
}

impl ParseTreeListener for LispPrinter<'_> {
    fn enter_every_rule(&mut self, tree: &ParseTree, ctx: NodeId) {
        let Some(rule) = tree.rule(ctx) else {
            return;
        };
        self.separate();
        if !rule.children().is_empty() {
            self.out.push('(');
        }
        match self.rule_names.get(rule.rule_index) {
            Some(name) => self.out.push_str(&escape_whitespace(name)),
            None => self.out.push_str(&rule.rule_index.to_string()),
        }
        if let Some(alt) = rule.alt_number {
            self.out.push_str(&format!(":{}", alt));
        }
    }

    fn exit_every_rule(&mut self, tree: &ParseTree, ctx: NodeId) {
        if tree.child_count(ctx) > 0 {
            self.out.push(')');
        }
    }

    fn visit_terminal(&mut self, tree: &ParseTree, node: NodeId) {
        self.leaf(tree, node);
    }

    fn visit_error_node(&mut self, tree: &ParseTree, node: NodeId) {
        self.leaf(tree, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Token, TokenLocation};
    use std::sync::Arc;

    fn token(token_type: i32, text: &str, index: isize) -> TokenRef {
        let mut token = Token::new(token_type, text).with_location(TokenLocation::new(
            index,
            index,
            1,
            index as u32,
        ));
        token.token_index = index;
        Arc::new(token)
    }

    /// (s (e a) + (e b))
    fn sample() -> (ParseTree, NodeId) {
        let mut tree = ParseTree::new();
        let root = tree.create_rule_node(None, -1, 0);
        let left = tree.create_rule_node(Some(root), 3, 1);
        tree.add_child(root, left);
        let a = tree.create_terminal(left, token(1, "a", 0), false);
        tree.add_child(left, a);
        let plus = tree.create_terminal(root, token(2, "+", 1), false);
        tree.add_child(root, plus);
        let right = tree.create_rule_node(Some(root), 5, 1);
        tree.add_child(root, right);
        let b = tree.create_terminal(right, token(1, "b", 2), false);
        tree.add_child(right, b);

        let rule = tree.rule_mut(root).unwrap();
        rule.start = Some(token(1, "a", 0));
        rule.stop = Some(token(1, "b", 2));
        (tree, root)
    }

    #[test]
    fn test_structure_queries() {
        let (tree, root) = sample();
        assert_eq!(tree.child_count(root), 3);
        assert_eq!(tree.child_rules(root, 1).len(), 2);
        assert_eq!(tree.child_tokens(root, 2).len(), 1);
        assert!(tree.child_token(root, 1, 0).is_none());

        let right = tree.child_rule(root, 1, 1).unwrap();
        assert_eq!(tree.parent(right), Some(root));
        assert_eq!(tree.depth(right), 2);
        assert_eq!(tree.depth(root), 1);
        assert!(tree.is_empty_context(root));
        assert!(!tree.is_empty_context(right));
    }

    #[test]
    fn test_text_and_lisp_form() {
        let (mut tree, root) = sample();
        assert_eq!(tree.text(root), "a+b");
        assert_eq!(tree.to_string_tree(root, &["s", "e"]), "(s (e a) + (e b))");

        tree.rule_mut(root).unwrap().alt_number = Some(2);
        assert_eq!(tree.to_string_tree(root, &[]), "(0:2 (1 a) + (1 b))");
    }

    #[test]
    fn test_childless_rule_renders_bare() {
        let mut tree = ParseTree::new();
        let root = tree.create_rule_node(None, -1, 0);
        assert_eq!(tree.to_string_tree(root, &["empty"]), "empty");
        assert_eq!(tree.text(root), "");
    }

    #[test]
    fn test_error_leaf_is_rendered_escaped() {
        let mut tree = ParseTree::new();
        let root = tree.create_rule_node(None, -1, 0);
        let bad = tree.create_terminal(root, token(9, "\n", 0), true);
        tree.add_child(root, bad);

        assert!(tree.node(bad).unwrap().is_error());
        assert_eq!(tree.to_string_tree(root, &["r"]), "(r \\n)");
    }

    #[test]
    fn test_source_interval() {
        let (mut tree, root) = sample();
        assert_eq!(tree.source_interval(root), Interval::of(0, 2));

        let plus = tree.child(root, 1).unwrap();
        assert_eq!(tree.source_interval(plus), Interval::of(1, 1));

        tree.rule_mut(root).unwrap().stop = None;
        assert_eq!(tree.source_interval(root), Interval::of(0, -1));

        let fresh = tree.create_rule_node(None, -1, 0);
        assert_eq!(tree.source_interval(fresh), Interval::INVALID);
    }

    #[test]
    fn test_create_does_not_attach() {
        let mut tree = ParseTree::new();
        let root = tree.create_rule_node(None, -1, 0);
        let child = tree.create_rule_node(Some(root), 1, 0);

        assert_eq!(tree.parent(child), Some(root));
        assert!(tree.children(root).is_empty());

        assert!(tree.add_child(root, child));
        assert_eq!(tree.remove_last_child(root), Some(child));
        assert!(tree.children(root).is_empty());

        let leaf = tree.create_terminal(root, token(1, "x", 0), false);
        assert!(!tree.add_child(leaf, child));
    }

    #[test]
    fn test_released_ids_do_not_alias_new_nodes() {
        let mut tree = ParseTree::new();
        let old_root = tree.create_rule_node(None, -1, 0);
        let old_child = tree.create_rule_node(Some(old_root), 1, 4);
        tree.clear();

        let new_root = tree.create_rule_node(None, -1, 7);
        assert_eq!(old_root.index(), new_root.index());
        assert_ne!(old_root, new_root);
        assert!(tree.node(old_root).is_none());
        assert!(tree.rule_mut(old_root).is_none());
        assert_eq!(tree.rule(new_root).unwrap().rule_index, 7);

        let reused = tree.create_rule_node(Some(new_root), 2, 5);
        tree.truncate(1);
        assert!(!tree.contains(reused));
        assert!(!tree.contains(old_child));
        assert!(tree.contains(new_root));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.parent(reused), None);
    }
}
