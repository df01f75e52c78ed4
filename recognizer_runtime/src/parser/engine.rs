//! Rule invocation machinery called by generated parsers.
//!
//! The engine owns the token stream and the context arena. Generated rule
//! functions drive it through a fixed protocol:
//!
//! - plain rules: `new_context`, `enter_rule`, `enter_outer_alt`, body,
//!   `exit_rule`
//! - left-recursive rules: `enter_recursion_rule`, primary alternative, then
//!   `push_new_recursion_context` once per operator, and finally
//!   `unroll_recursion_contexts`
//!
//! Each step is an explicit transition on the context stack; after a rule
//! returns, the stack is exactly what it was before the rule was entered.

use super::automaton::{Automaton, DecisionContext, DecisionOracle, Prediction};
use super::error::{ParseError, RecognitionError};
use super::listener::{ConsoleErrorListener, ErrorListener, ProxyErrorListener};
use super::recognizer::{GrammarInfo, Recognizer, RecognizerSnapshot};
use crate::config::compile_time::parser::INITIAL_PRECEDENCE;
use crate::config::ParserPreferences;
use crate::interval::IntervalSet;
use crate::logging::codes;
use crate::stream::TokenStream;
use crate::tokens::{TokenRef, TOKEN_EOF, TOKEN_EPSILON};
use crate::tree::{NodeId, ParseTree, ParseTreeListener};
use crate::{log_debug, log_info, log_success, log_warning};
use std::sync::Arc;

pub struct ParserEngine<T: TokenStream> {
    input: T,
    tree: ParseTree,
    ctx: Option<NodeId>,
    state: isize,
    precedence_stack: Vec<i32>,
    syntax_errors: usize,
    matched_eof: bool,
    build_parse_trees: bool,
    /// Nodes below this length predate turning tree building off
    reclaim_floor: usize,
    track_alt_numbers: bool,
    trace_rules: bool,
    parse_listeners: Vec<Box<dyn ParseTreeListener>>,
    error_listeners: ProxyErrorListener,
    grammar: GrammarInfo,
    automaton: Option<Arc<dyn Automaton>>,
    oracle: Option<Box<dyn DecisionOracle<T>>>,
}

impl<T: TokenStream> ParserEngine<T> {
    pub fn new(input: T, grammar: GrammarInfo) -> Self {
        Self::with_preferences(input, grammar, &ParserPreferences::default())
    }

    pub fn with_preferences(input: T, grammar: GrammarInfo, preferences: &ParserPreferences) -> Self {
        let mut error_listeners = ProxyErrorListener::new();
        error_listeners.add(Box::new(ConsoleErrorListener));

        Self {
            input,
            tree: ParseTree::new(),
            ctx: None,
            state: -1,
            precedence_stack: vec![INITIAL_PRECEDENCE],
            syntax_errors: 0,
            matched_eof: false,
            build_parse_trees: preferences.build_parse_trees,
            reclaim_floor: 0,
            track_alt_numbers: false,
            trace_rules: preferences.trace_rule_invocations,
            parse_listeners: Vec::new(),
            error_listeners,
            grammar,
            automaton: None,
            oracle: None,
        }
    }

    pub fn with_automaton(mut self, automaton: Arc<dyn Automaton>) -> Self {
        self.automaton = Some(automaton);
        self
    }

    pub fn with_oracle(mut self, oracle: Box<dyn DecisionOracle<T>>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn set_automaton(&mut self, automaton: Arc<dyn Automaton>) {
        self.automaton = Some(automaton);
    }

    pub fn set_oracle(&mut self, oracle: Box<dyn DecisionOracle<T>>) {
        self.oracle = Some(oracle);
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn input(&self) -> &T {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut T {
        &mut self.input
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ParseTree {
        &mut self.tree
    }

    /// Current rule context (top of the call stack)
    pub fn context(&self) -> Option<NodeId> {
        self.ctx
    }

    pub fn set_state(&mut self, state: isize) {
        self.state = state;
    }

    /// Binding power of the innermost left-recursive invocation; -1 when the
    /// precedence stack is empty
    pub fn precedence(&self) -> i32 {
        self.precedence_stack.last().copied().unwrap_or(-1)
    }

    pub fn number_of_syntax_errors(&self) -> usize {
        self.syntax_errors
    }

    pub fn matched_eof(&self) -> bool {
        self.matched_eof
    }

    pub fn set_matched_eof(&mut self, matched: bool) {
        self.matched_eof = matched;
    }

    pub fn build_parse_trees(&self) -> bool {
        self.build_parse_trees
    }

    /// With tree building off, popped contexts are released as the parse
    /// moves on. Nodes built before the switch are kept.
    pub fn set_build_parse_trees(&mut self, build: bool) {
        if self.build_parse_trees && !build {
            self.reclaim_floor = self.tree.len();
        }
        self.build_parse_trees = build;
    }

    /// Record the chosen outer alternative on each context
    pub fn set_track_alt_numbers(&mut self, track: bool) {
        self.track_alt_numbers = track;
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace_rules = trace;
    }

    pub fn current_token(&mut self) -> Option<TokenRef> {
        self.input.lt(1)
    }

    fn rule_name(&self, rule_index: usize) -> &'static str {
        self.grammar
            .rule_names
            .get(rule_index)
            .copied()
            .unwrap_or("<unknown rule>")
    }

    /// Rule names from the current context up to the root
    pub fn rule_invocation_stack(&self) -> Vec<&'static str> {
        let mut stack = Vec::new();
        let mut current = self.ctx;
        while let Some(ctx) = current {
            if let Some(rule) = self.tree.rule(ctx) {
                stack.push(self.rule_name(rule.rule_index));
            }
            current = self.tree.parent(ctx);
        }
        stack
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Listeners see events as the tree is built. Enter events go out in
    /// registration order, exit events in reverse.
    pub fn add_parse_listener(&mut self, listener: Box<dyn ParseTreeListener>) {
        self.parse_listeners.push(listener);
    }

    pub fn remove_parse_listeners(&mut self) -> Vec<Box<dyn ParseTreeListener>> {
        std::mem::take(&mut self.parse_listeners)
    }

    pub fn add_error_listener(&mut self, listener: Box<dyn ErrorListener>) {
        self.error_listeners.add(listener);
    }

    pub fn remove_error_listeners(&mut self) {
        self.error_listeners.clear();
    }

    pub fn trigger_enter_rule_event(&mut self) {
        let Some(ctx) = self.ctx else {
            return;
        };
        for listener in self.parse_listeners.iter_mut() {
            listener.enter_every_rule(&self.tree, ctx);
            listener.enter_context(&self.tree, ctx);
        }
    }

    pub fn trigger_exit_rule_event(&mut self) {
        let Some(ctx) = self.ctx else {
            return;
        };
        for listener in self.parse_listeners.iter_mut().rev() {
            listener.exit_context(&self.tree, ctx);
            listener.exit_every_rule(&self.tree, ctx);
        }
    }

    /// Count the error and hand it to every error listener. `offending`
    /// defaults to the current token.
    pub fn notify_error_listeners(
        &mut self,
        message: &str,
        offending: Option<TokenRef>,
        error: Option<&RecognitionError>,
    ) {
        self.syntax_errors += 1;
        let offending = offending.or_else(|| self.input.lt(1));
        let (line, column) = offending
            .as_ref()
            .map_or((0, 0), |token| (token.line, token.column));

        log_warning!(message,
            "line" => line,
            "column" => column,
            "code" => error.map_or("-", |error| error.error_code().as_str()),
            "source" => self.input.source_name()
        );

        let snapshot = RecognizerSnapshot {
            grammar: self.grammar,
            state: self.state,
        };
        self.error_listeners
            .syntax_error(&snapshot, offending.as_ref(), line, column, message, error);
    }

    // ------------------------------------------------------------------
    // Rule protocol
    // ------------------------------------------------------------------

    /// Allocate a rule context. Without tree building, every node newer than
    /// the current context belongs to an invocation that already returned
    /// and is released first, so a returned context stays readable until
    /// its caller invokes the next rule.
    pub fn create_context(
        &mut self,
        parent: Option<NodeId>,
        invoking_state: isize,
        rule_index: usize,
    ) -> NodeId {
        self.release_popped_contexts();
        self.tree.create_rule_node(parent, invoking_state, rule_index)
    }

    fn release_popped_contexts(&mut self) {
        if self.build_parse_trees {
            return;
        }
        // Live frames are never newer than the current context
        let keep = self
            .ctx
            .map_or(0, |ctx| ctx.index() + 1)
            .max(self.reclaim_floor);
        if keep < self.tree.len() {
            self.tree.truncate(keep);
        }
    }

    /// Context for a rule invoked from the current context and state
    pub fn new_context(&mut self, rule_index: usize) -> NodeId {
        self.create_context(self.ctx, self.state, rule_index)
    }

    pub fn enter_rule(&mut self, localctx: NodeId, state: isize, rule_index: usize) {
        self.state = state;
        self.ctx = Some(localctx);
        let start = self.input.lt(1);
        if let Some(rule) = self.tree.rule_mut(localctx) {
            rule.start = start;
        }
        if self.build_parse_trees {
            if let Some(parent) = self.tree.parent(localctx) {
                self.tree.add_child(parent, localctx);
            }
        }
        self.trace("enter", rule_index);
        self.trigger_enter_rule_event();
    }

    pub fn exit_rule(&mut self) {
        let Some(ctx) = self.ctx else {
            log_warning!("Rule exit without an active context");
            return;
        };
        let stop = if self.matched_eof {
            self.input.lt(1)
        } else {
            self.input.lt(-1)
        };
        let (invoking_state, rule_index) = match self.tree.rule_mut(ctx) {
            Some(rule) => {
                rule.stop = stop;
                (rule.invoking_state, rule.rule_index)
            }
            None => (-1, 0),
        };

        self.trace("exit", rule_index);
        self.trigger_exit_rule_event();
        self.state = invoking_state;
        self.ctx = self.tree.parent(ctx);

        if self.ctx.is_none() {
            log_success!(
                codes::success::PARSE_TREE_COMPLETE,
                "Parse completed",
                "rule" => self.rule_name(rule_index),
                "nodes" => self.tree.len(),
                "syntax_errors" => self.syntax_errors
            );
        }
    }

    /// Make `localctx` current for alternative `alt`. A context replaced by
    /// a more specific one (labeled alternatives) is swapped out of its
    /// parent's children.
    pub fn enter_outer_alt(&mut self, localctx: NodeId, alt: usize) {
        if self.track_alt_numbers {
            if let Some(rule) = self.tree.rule_mut(localctx) {
                rule.alt_number = Some(alt);
            }
        }
        if self.build_parse_trees && self.ctx != Some(localctx) {
            if let Some(parent) = self.tree.parent(localctx) {
                self.tree.remove_last_child(parent);
                self.tree.add_child(parent, localctx);
            }
        }
        self.ctx = Some(localctx);
    }

    /// Enter a left-recursive rule at binding power `precedence`. The
    /// context is not attached to its parent yet; the tree for these rules
    /// is built bottom-up.
    pub fn enter_recursion_rule(
        &mut self,
        localctx: NodeId,
        state: isize,
        rule_index: usize,
        precedence: i32,
    ) {
        self.state = state;
        self.precedence_stack.push(precedence);
        self.ctx = Some(localctx);
        let start = self.input.lt(1);
        if let Some(rule) = self.tree.rule_mut(localctx) {
            rule.start = start;
        }
        self.trace("enter", rule_index);
        self.trigger_enter_rule_event();
    }

    /// Wrap the current context as the first child of `localctx`, which
    /// becomes current. Called each time another operator extends a
    /// left-recursive rule.
    pub fn push_new_recursion_context(&mut self, localctx: NodeId, state: isize, rule_index: usize) {
        let Some(previous) = self.ctx else {
            log_warning!("Recursion context pushed without an active context",
                "rule" => self.rule_name(rule_index)
            );
            return;
        };

        let stop = self.input.lt(-1);
        self.tree.set_parent(previous, Some(localctx));
        let start = match self.tree.rule_mut(previous) {
            Some(rule) => {
                rule.invoking_state = state;
                rule.stop = stop;
                rule.start.clone()
            }
            None => None,
        };

        self.ctx = Some(localctx);
        if let Some(rule) = self.tree.rule_mut(localctx) {
            rule.start = start;
        }
        if self.build_parse_trees {
            self.tree.add_child(localctx, previous);
        }
        self.trace("extend", rule_index);
        self.trigger_enter_rule_event();
    }

    /// Leave a left-recursive rule: fire exit events for every frame up to
    /// (not including) `parent`, then hang the outermost result under it.
    pub fn unroll_recursion_contexts(&mut self, parent: Option<NodeId>) {
        self.precedence_stack.pop();
        let Some(retctx) = self.ctx else {
            self.ctx = parent;
            return;
        };

        let stop = self.input.lt(-1);
        if let Some(rule) = self.tree.rule_mut(retctx) {
            rule.stop = stop;
        }

        if self.parse_listeners.is_empty() {
            self.ctx = parent;
        } else {
            while self.ctx.is_some() && self.ctx != parent {
                self.trigger_exit_rule_event();
                self.ctx = self.ctx.and_then(|ctx| self.tree.parent(ctx));
            }
        }

        self.tree.set_parent(retctx, parent);
        if self.build_parse_trees {
            if let Some(parent) = parent {
                self.tree.add_child(parent, retctx);
            }
        }
        if let Some(rule_index) = self.tree.rule(retctx).map(|rule| rule.rule_index) {
            self.trace("unroll", rule_index);
        }
    }

    /// Set the current context's stop token to the last consumed token
    pub fn record_stop_token(&mut self) {
        let stop = self.input.lt(-1);
        if let Some(rule) = self.ctx.and_then(|ctx| self.tree.rule_mut(ctx)) {
            rule.stop = stop;
        }
    }

    /// Whether a left-recursive alternative with binding power `precedence`
    /// may continue at the current level
    pub fn precpred(&self, _ctx: Option<NodeId>, precedence: i32) -> bool {
        precedence >= self.precedence()
    }

    /// Record `error` on every context from the current one up to the root
    pub fn annotate_context_chain(&mut self, error: &RecognitionError) {
        let mut current = self.ctx;
        while let Some(ctx) = current {
            if let Some(rule) = self.tree.rule_mut(ctx) {
                rule.exception = Some(error.clone());
            }
            current = self.tree.parent(ctx);
        }
    }

    fn trace(&mut self, action: &str, rule_index: usize) {
        if self.trace_rules {
            let lookahead = self
                .input
                .lt(1)
                .and_then(|token| token.text().map(str::to_string))
                .unwrap_or_default();
            log_info!("Rule trace",
                "action" => action,
                "rule" => self.rule_name(rule_index),
                "lt1" => lookahead
            );
        } else {
            log_debug!("Rule transition",
                "action" => action,
                "rule" => self.rule_name(rule_index),
                "state" => self.state
            );
        }
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Advance past the current token and attach it to the current context.
    /// Fails at EOF.
    pub fn consume_symbol(&mut self, as_error: bool) -> Result<TokenRef, ParseError> {
        let token = self
            .input
            .lt(1)
            .ok_or_else(|| ParseError::invalid_state("token stream produced no tokens"))?;
        self.input.consume()?;
        self.attach_symbol(token.clone(), as_error);
        Ok(token)
    }

    /// Attach `token` to the current context as a terminal or error node and
    /// notify listeners. Nothing is created when neither a tree nor
    /// listeners want it; a leaf built only for listeners is released once
    /// they have seen it.
    pub fn attach_symbol(&mut self, token: TokenRef, as_error: bool) -> Option<NodeId> {
        if !self.build_parse_trees && self.parse_listeners.is_empty() {
            return None;
        }
        let ctx = self.ctx?;
        let node = self.tree.create_terminal(ctx, token, as_error);
        if self.build_parse_trees {
            self.tree.add_child(ctx, node);
        }
        for listener in self.parse_listeners.iter_mut() {
            if as_error {
                listener.visit_error_node(&self.tree, node);
            } else {
                listener.visit_terminal(&self.tree, node);
            }
        }
        if !self.build_parse_trees {
            self.tree.truncate(node.index());
            return None;
        }
        Some(node)
    }

    /// Add an error leaf for a token conjured by inline recovery. Listeners
    /// are not notified; they only hear about consumed tokens.
    pub fn attach_conjured_symbol(&mut self, token: TokenRef) -> Option<NodeId> {
        if !self.build_parse_trees {
            return None;
        }
        let ctx = self.ctx?;
        let node = self.tree.create_terminal(ctx, token, true);
        self.tree.add_child(ctx, node);
        Some(node)
    }

    // ------------------------------------------------------------------
    // Automaton queries
    // ------------------------------------------------------------------

    fn require_automaton(&self) -> Result<Arc<dyn Automaton>, ParseError> {
        self.automaton
            .clone()
            .ok_or_else(|| ParseError::invalid_state("no grammar automaton configured"))
    }

    fn current_state(&self) -> Result<usize, ParseError> {
        usize::try_from(self.state)
            .map_err(|_| ParseError::invalid_state(format!("no automaton state (state {})", self.state)))
    }

    fn follow_of(&self, automaton: &dyn Automaton, invoking_state: isize) -> Result<IntervalSet, ParseError> {
        let follow = usize::try_from(invoking_state)
            .ok()
            .and_then(|state| automaton.follow_state(state))
            .ok_or_else(|| {
                ParseError::invalid_state(format!("no follow state for invoking state {}", invoking_state))
            })?;
        Ok(automaton.next_tokens(follow))
    }

    /// Whether `symbol` can come next, looking through enclosing rules when
    /// the current rule can end here
    pub fn is_expected_token(&self, symbol: i32) -> Result<bool, ParseError> {
        let automaton = self.require_automaton()?;
        let mut following = automaton.next_tokens(self.current_state()?);
        if following.contains(symbol) {
            return Ok(true);
        }
        if !following.contains(TOKEN_EPSILON) {
            return Ok(false);
        }

        let mut current = self.ctx;
        while let Some(ctx) = current {
            let Some(rule) = self.tree.rule(ctx) else {
                break;
            };
            if rule.invoking_state < 0 || !following.contains(TOKEN_EPSILON) {
                break;
            }
            following = self.follow_of(automaton.as_ref(), rule.invoking_state)?;
            if following.contains(symbol) {
                return Ok(true);
            }
            current = self.tree.parent(ctx);
        }

        Ok(following.contains(TOKEN_EPSILON) && symbol == TOKEN_EOF)
    }

    /// Every token that can come next in the current context; EOF is
    /// included when the outermost rule can end here
    pub fn expected_tokens(&self) -> Result<IntervalSet, ParseError> {
        let automaton = self.require_automaton()?;
        let epsilon = IntervalSet::of(TOKEN_EPSILON);
        let mut following = automaton.next_tokens(self.current_state()?);
        if !following.contains(TOKEN_EPSILON) {
            return Ok(following);
        }

        let mut expected = following.subtract(Some(&epsilon));
        let mut current = self.ctx;
        while let Some(ctx) = current {
            let Some(rule) = self.tree.rule(ctx) else {
                break;
            };
            if rule.invoking_state < 0 || !following.contains(TOKEN_EPSILON) {
                break;
            }
            following = self.follow_of(automaton.as_ref(), rule.invoking_state)?;
            expected = expected.or(&following).subtract(Some(&epsilon));
            current = self.tree.parent(ctx);
        }

        if following.contains(TOKEN_EPSILON) {
            expected = expected.or(&IntervalSet::of(TOKEN_EOF));
        }
        Ok(expected)
    }

    /// Tokens that can follow the current state without leaving the rule
    pub fn expected_tokens_within_current_rule(&self) -> Result<IntervalSet, ParseError> {
        let automaton = self.require_automaton()?;
        Ok(automaton.next_tokens(self.current_state()?))
    }

    /// Mismatch at the current token, with the expected set when an
    /// automaton is available
    pub fn input_mismatch_error(&mut self) -> RecognitionError {
        let expected = self.expected_tokens().unwrap_or_default();
        RecognitionError::input_mismatch(self.input.lt(1), expected).with_state(self.state, self.ctx)
    }

    /// Ask the oracle which alternative to take at `decision`. The stream
    /// cursor is restored before returning.
    pub fn adaptive_predict(&mut self, decision: usize) -> Result<usize, ParseError> {
        let ctx = self
            .ctx
            .ok_or_else(|| ParseError::invalid_state("prediction outside of a rule"))?;
        let Some(oracle) = self.oracle.as_mut() else {
            return Err(ParseError::invalid_state("no decision oracle configured"));
        };

        let start_index = self.input.index();
        let scope = DecisionContext {
            tree: &self.tree,
            context: ctx,
            precedence: self.precedence_stack.last().copied().unwrap_or(-1),
        };
        let prediction = oracle.adaptive_predict(&mut self.input, decision, scope);
        self.input.seek(start_index)?;

        match prediction {
            Prediction::Alt(alt) => Ok(alt),
            Prediction::NoViableAlt { offending_index } => {
                let start = self.input.get(start_index).ok();
                let offending = self.input.get(offending_index).ok();
                log_debug!("No viable alternative",
                    "decision" => decision,
                    "start" => start_index,
                    "offending" => offending_index
                );
                Err(ParseError::recognition(
                    RecognitionError::no_viable_alternative(start, offending)
                        .with_state(self.state, Some(ctx)),
                ))
            }
        }
    }

    /// Serialized automaton shipped with the grammar
    pub fn serialized_automaton(&self) -> Result<&'static str, ParseError> {
        self.grammar.serialized_atn.ok_or_else(|| {
            ParseError::invalid_state("the current parser does not support an ATN with bypass alternatives")
        })
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    fn reset_state(&mut self) {
        self.tree.clear();
        self.reclaim_floor = 0;
        self.ctx = None;
        self.state = -1;
        self.syntax_errors = 0;
        self.matched_eof = false;
        self.trace_rules = false;
        self.precedence_stack.clear();
        self.precedence_stack.push(INITIAL_PRECEDENCE);
    }

    /// Rewind the input and discard every context. Node ids handed out
    /// before the reset no longer resolve in [`ParserEngine::tree`].
    pub fn reset(&mut self) -> Result<(), ParseError> {
        self.input.seek(0)?;
        self.reset_state();
        Ok(())
    }

    /// Swap in a new token stream, returning the old one. Discards every
    /// context the same way [`ParserEngine::reset`] does.
    pub fn set_input(&mut self, input: T) -> T {
        let previous = std::mem::replace(&mut self.input, input);
        self.reset_state();
        previous
    }

    pub fn into_parts(self) -> (T, ParseTree) {
        (self.input, self.tree)
    }
}

impl<T: TokenStream> Recognizer for ParserEngine<T> {
    fn grammar(&self) -> &GrammarInfo {
        &self.grammar
    }

    fn state(&self) -> isize {
        self.state
    }
}
