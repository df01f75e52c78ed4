//! Depth-first listener dispatch over a [`ParseTree`].
//!
//! Both walkers emit the same events in the same order: for a rule node the
//! generic enter hook, the node-specific enter hook, each child left to
//! right, the node-specific exit hook and finally the generic exit hook.
//! Leaves get a single terminal or error-node visit.

use super::arena::{NodeId, NodeKind, ParseTree};
use super::listener::ParseTreeListener;

pub trait TreeWalker {
    fn walk<L: ParseTreeListener + ?Sized>(&self, listener: &mut L, tree: &ParseTree, root: NodeId);
}

/// Plain recursion. Depth is bounded by the thread's stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveWalker;

/// Explicit node and child-index stacks; safe at any depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterativeWalker;

/// Walk `root` with the iterative walker
pub fn walk<L: ParseTreeListener + ?Sized>(listener: &mut L, tree: &ParseTree, root: NodeId) {
    IterativeWalker.walk(listener, tree, root);
}

fn enter_rule<L: ParseTreeListener + ?Sized>(listener: &mut L, tree: &ParseTree, ctx: NodeId) {
    listener.enter_every_rule(tree, ctx);
    listener.enter_context(tree, ctx);
}

fn exit_rule<L: ParseTreeListener + ?Sized>(listener: &mut L, tree: &ParseTree, ctx: NodeId) {
    listener.exit_context(tree, ctx);
    listener.exit_every_rule(tree, ctx);
}

/// Fire the entry event for `node`; true when it is a rule node
fn visit<L: ParseTreeListener + ?Sized>(listener: &mut L, tree: &ParseTree, node: NodeId) -> bool {
    match tree.node(node).map(|n| n.kind()) {
        Some(NodeKind::Rule(_)) => {
            enter_rule(listener, tree, node);
            true
        }
        Some(NodeKind::Terminal(_)) => {
            listener.visit_terminal(tree, node);
            false
        }
        Some(NodeKind::Error(_)) => {
            listener.visit_error_node(tree, node);
            false
        }
        None => false,
    }
}

impl TreeWalker for RecursiveWalker {
    fn walk<L: ParseTreeListener + ?Sized>(&self, listener: &mut L, tree: &ParseTree, root: NodeId) {
        if !visit(listener, tree, root) {
            return;
        }
        for &child in tree.children(root) {
            self.walk(listener, tree, child);
        }
        exit_rule(listener, tree, root);
    }
}

impl TreeWalker for IterativeWalker {
    fn walk<L: ParseTreeListener + ?Sized>(&self, listener: &mut L, tree: &ParseTree, root: NodeId) {
        let mut node_stack: Vec<NodeId> = Vec::new();
        let mut index_stack: Vec<usize> = Vec::new();
        let mut node = root;
        let mut index = 0usize;

        'walk: loop {
            let is_rule = visit(listener, tree, node);

            if let Some(first) = tree.child(node, 0) {
                node_stack.push(node);
                index_stack.push(index);
                node = first;
                index = 0;
                continue;
            }

            // No children: close this node, then climb until a sibling exists
            let mut closing_rule = is_rule;
            loop {
                if closing_rule {
                    exit_rule(listener, tree, node);
                }
                let Some(&parent) = node_stack.last() else {
                    break 'walk;
                };
                index += 1;
                if let Some(sibling) = tree.child(parent, index) {
                    node = sibling;
                    continue 'walk;
                }
                node_stack.pop();
                node = parent;
                index = index_stack.pop().unwrap_or_default();
                closing_rule = true;
            }
        }
    }
}
