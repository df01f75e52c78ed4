//! Parse trees and listener dispatch
//!
//! Rule invocation contexts, terminals and error leaves live in a
//! [`ParseTree`] arena. The parser uses the parent links as its call stack
//! and, when tree building is on, the child lists as the parse tree.
//!
//! ## Key Components
//!
//! - **[`ParseTree`]** - Node arena with structural queries and text rendering
//! - **[`ParseTreeListener`]** - Enter/exit/visit callbacks
//! - **[`RecursiveWalker`] / [`IterativeWalker`]** - Equivalent traversal strategies

pub mod arena;
pub mod listener;
pub mod walker;

pub use arena::{Node, NodeId, NodeKind, ParseTree, RuleNode};
pub use listener::ParseTreeListener;
pub use walker::{walk, IterativeWalker, RecursiveWalker, TreeWalker};
