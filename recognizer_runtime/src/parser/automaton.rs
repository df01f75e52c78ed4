//! Interfaces to the grammar automaton and the prediction oracle.
//!
//! Both are produced outside this crate (by the grammar tool or by hand); the
//! engine only asks them questions.

use crate::interval::IntervalSet;
use crate::stream::TokenStream;
use crate::tree::{NodeId, ParseTree};
use std::collections::HashMap;

/// Follow-set queries against the grammar automaton.
pub trait Automaton: Send + Sync {
    /// Tokens that can follow `state` inside its rule. Contains
    /// `TOKEN_EPSILON` when the end of the rule is reachable without
    /// consuming input.
    fn next_tokens(&self, state: usize) -> IntervalSet;

    /// State the caller resumes in after the rule invoked from
    /// `invoking_state` returns
    fn follow_state(&self, invoking_state: usize) -> Option<usize>;
}

/// Table-driven automaton for hand-written recognizers and tests
#[derive(Debug, Clone, Default)]
pub struct StaticAutomaton {
    next_tokens: HashMap<usize, IntervalSet>,
    follow_states: HashMap<usize, usize>,
}

impl StaticAutomaton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_next_tokens(mut self, state: usize, tokens: IntervalSet) -> Self {
        self.next_tokens.insert(state, tokens);
        self
    }

    pub fn with_follow_state(mut self, invoking_state: usize, follow_state: usize) -> Self {
        self.follow_states.insert(invoking_state, follow_state);
        self
    }
}

impl Automaton for StaticAutomaton {
    fn next_tokens(&self, state: usize) -> IntervalSet {
        self.next_tokens.get(&state).cloned().unwrap_or_default()
    }

    fn follow_state(&self, invoking_state: usize) -> Option<usize> {
        self.follow_states.get(&invoking_state).copied()
    }
}

/// What the oracle may look at when choosing an alternative
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub tree: &'a ParseTree,
    pub context: NodeId,
    /// Binding power of the innermost left-recursive invocation
    pub precedence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    /// 1-based alternative number
    Alt(usize),
    /// No alternative matches; the token at `offending_index` is where
    /// every candidate failed
    NoViableAlt { offending_index: usize },
}

/// Chooses alternatives at grammar decision points.
///
/// The oracle may move the stream cursor while looking ahead; the engine
/// restores it afterwards.
pub trait DecisionOracle<T: TokenStream> {
    fn adaptive_predict(
        &mut self,
        input: &mut T,
        decision: usize,
        scope: DecisionContext<'_>,
    ) -> Prediction;
}
