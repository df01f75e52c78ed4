use super::arena::{NodeId, ParseTree};

/// Callbacks fired while a tree is built or walked.
///
/// Generated listeners implement `enter_context` / `exit_context` and
/// dispatch on the node's rule index; the `every_rule` hooks see every rule
/// node. All methods default to no-ops.
pub trait ParseTreeListener {
    fn enter_every_rule(&mut self, _tree: &ParseTree, _ctx: NodeId) {}

    fn exit_every_rule(&mut self, _tree: &ParseTree, _ctx: NodeId) {}

    fn visit_terminal(&mut self, _tree: &ParseTree, _node: NodeId) {}

    fn visit_error_node(&mut self, _tree: &ParseTree, _node: NodeId) {}

    /// Node-specific enter hook, fired after `enter_every_rule`
    fn enter_context(&mut self, _tree: &ParseTree, _ctx: NodeId) {}

    /// Node-specific exit hook, fired before `exit_every_rule`
    fn exit_context(&mut self, _tree: &ParseTree, _ctx: NodeId) {}
}
