//! A hand-written recognizer shaped like generated output for
//!
//! ```text
//! start : expr EOF ;
//! expr  : expr '*' expr
//!       | expr '+' expr
//!       | ID
//!       ;
//! ```
//!
//! exercising the left-recursion protocol end to end.

use assert_matches::assert_matches;
use recognizer_runtime::parser::{
    CollectingErrorListener, DecisionContext, DecisionOracle, GrammarInfo, ParseError, Parser,
    Prediction, RecognitionErrorKind, Recognizer, StaticAutomaton,
};
use recognizer_runtime::stream::{CommonTokenStream, TokenStream};
use recognizer_runtime::tokens::{
    ListTokenSource, Token, TokenLocation, VocabularyImpl, HIDDEN_CHANNEL, TOKEN_EOF,
};
use recognizer_runtime::tree::{NodeId, ParseTree, ParseTreeListener};
use recognizer_runtime::IntervalSet;
use std::sync::{Arc, Mutex};

const ID: i32 = 1;
const PLUS: i32 = 2;
const STAR: i32 = 3;
const WS: i32 = 4;

const RULE_START: usize = 0;
const RULE_EXPR: usize = 1;

const PRIMARY_DECISION: usize = 0;
const OPERATOR_DECISION: usize = 1;

static LITERALS: [Option<&str>; 4] = [None, None, Some("'+'"), Some("'*'")];
static SYMBOLS: [Option<&str>; 5] = [None, Some("ID"), Some("PLUS"), Some("STAR"), Some("WS")];
static VOCABULARY: VocabularyImpl = VocabularyImpl::new(&LITERALS, &SYMBOLS, &[]);
static RULE_NAMES: [&str; 2] = ["start", "expr"];
static GRAMMAR: GrammarInfo = GrammarInfo::new("Expr.g4", &RULE_NAMES, &VOCABULARY);

type Stream = CommonTokenStream<ListTokenSource>;

/// One token per character; blanks go to the hidden channel
fn lex(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (offset, ch) in input.char_indices() {
        let token_type = match ch {
            '+' => PLUS,
            '*' => STAR,
            ' ' => WS,
            _ => ID,
        };
        let mut token = Token::new(token_type, ch.to_string()).with_location(TokenLocation::new(
            offset as isize,
            offset as isize,
            1,
            offset as u32,
        ));
        if token_type == WS {
            token = token.with_channel(HIDDEN_CHANNEL);
        }
        tokens.push(token);
    }
    tokens
}

/// Precedence-aware predictions for the two decisions of `expr`
struct ExprOracle;

impl<T: TokenStream> DecisionOracle<T> for ExprOracle {
    fn adaptive_predict(
        &mut self,
        input: &mut T,
        decision: usize,
        scope: DecisionContext<'_>,
    ) -> Prediction {
        match decision {
            PRIMARY_DECISION if input.la(1) == ID => Prediction::Alt(1),
            PRIMARY_DECISION => Prediction::NoViableAlt {
                offending_index: input.index(),
            },
            _ => match input.la(1) {
                STAR if 2 >= scope.precedence => Prediction::Alt(1),
                PLUS if 1 >= scope.precedence => Prediction::Alt(2),
                _ => Prediction::Alt(3),
            },
        }
    }
}

struct ExprParser {
    base: Parser<Stream>,
    unrolls: usize,
}

impl ExprParser {
    fn new(input: &str) -> Self {
        let stream = CommonTokenStream::on_default_channel(ListTokenSource::new(lex(input)));
        let mut base = Parser::new(stream, GRAMMAR);
        base.set_oracle(Box::new(ExprOracle));
        base.set_automaton(Arc::new(
            StaticAutomaton::new().with_next_tokens(5, IntervalSet::of(TOKEN_EOF)),
        ));
        Self { base, unrolls: 0 }
    }

    fn quiet(input: &str) -> (Self, CollectingErrorListener) {
        let mut parser = Self::new(input);
        parser.base.remove_error_listeners();
        let collector = CollectingErrorListener::new();
        parser.base.add_error_listener(Box::new(collector.clone()));
        (parser, collector)
    }

    fn start(&mut self) -> Result<NodeId, ParseError> {
        let localctx = self.base.new_context(RULE_START);
        self.base.enter_rule(localctx, 0, RULE_START);
        let result = match self.start_body(localctx) {
            Err(error) => self.base.recover_from(error),
            ok => ok,
        };
        self.base.exit_rule();
        result.map(|()| localctx)
    }

    fn start_body(&mut self, localctx: NodeId) -> Result<(), ParseError> {
        self.base.enter_outer_alt(localctx, 1);
        self.base.set_state(4);
        self.expr(0)?;
        self.base.set_state(5);
        self.base.match_token(TOKEN_EOF)?;
        Ok(())
    }

    fn expr(&mut self, precedence: i32) -> Result<NodeId, ParseError> {
        let parentctx = self.base.context();
        let parent_state = self.base.state();
        let localctx = self.base.create_context(parentctx, parent_state, RULE_EXPR);
        let mut current = localctx;
        self.base.enter_recursion_rule(localctx, 2, RULE_EXPR, precedence);

        let result = match self.expr_body(parentctx, parent_state, &mut current) {
            Err(error) => self.base.recover_from(error),
            ok => ok,
        };
        self.base.unroll_recursion_contexts(parentctx);
        self.unrolls += 1;
        result.map(|()| current)
    }

    fn expr_body(
        &mut self,
        parentctx: Option<NodeId>,
        parent_state: isize,
        current: &mut NodeId,
    ) -> Result<(), ParseError> {
        self.base.enter_outer_alt(*current, 1);
        self.base.set_state(6);
        self.base.adaptive_predict(PRIMARY_DECISION)?;
        self.base.match_token(ID)?;
        self.base.record_stop_token();

        loop {
            self.base.set_state(8);
            let alt = self.base.adaptive_predict(OPERATOR_DECISION)?;
            let (binding, operator, next_precedence) = match alt {
                1 => (2, STAR, 3),
                2 => (1, PLUS, 2),
                _ => break,
            };

            self.base.trigger_exit_rule_event();
            let next = self.base.create_context(parentctx, parent_state, RULE_EXPR);
            self.base.push_new_recursion_context(next, 2, RULE_EXPR);
            *current = next;

            if !self.base.precpred(self.base.context(), binding) {
                return Err(self
                    .base
                    .failed_predicate(&format!("precpred(_ctx, {})", binding), None));
            }
            self.base.set_state(10);
            self.base.match_token(operator)?;
            self.expr(next_precedence)?;
        }
        Ok(())
    }

    fn tree(&self) -> &ParseTree {
        self.base.tree()
    }

    fn render(&self, root: NodeId) -> String {
        self.tree().to_string_tree(root, &RULE_NAMES)
    }
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ParseTreeListener for Recorder {
    fn enter_every_rule(&mut self, tree: &ParseTree, ctx: NodeId) {
        self.push(format!("enter {}", RULE_NAMES[tree.rule(ctx).unwrap().rule_index]));
    }

    fn exit_every_rule(&mut self, tree: &ParseTree, ctx: NodeId) {
        self.push(format!("exit {}", RULE_NAMES[tree.rule(ctx).unwrap().rule_index]));
    }

    fn visit_terminal(&mut self, tree: &ParseTree, node: NodeId) {
        self.push(format!("term {}", tree.text(node)));
    }
}

#[test]
fn test_equal_precedence_operands() {
    let mut parser = ExprParser::new("a+b");
    let root = parser.start().unwrap();

    assert_eq!(parser.render(root), "(start (expr (expr a) + (expr b)) <EOF>)");
    assert_eq!(parser.unrolls, 2);
    assert_eq!(parser.base.context(), None);
    assert_eq!(parser.base.number_of_syntax_errors(), 0);
    assert!(parser.base.matched_eof());
}

#[test]
fn test_same_operator_is_left_associative() {
    let mut parser = ExprParser::new("a+b+c");
    let root = parser.start().unwrap();

    assert_eq!(
        parser.render(root),
        "(start (expr (expr (expr a) + (expr b)) + (expr c)) <EOF>)"
    );
    assert_eq!(parser.unrolls, 3);
}

#[test]
fn test_higher_binding_operator_nests_deeper() {
    let mut parser = ExprParser::new("a+b*c");
    let root = parser.start().unwrap();
    assert_eq!(
        parser.render(root),
        "(start (expr (expr a) + (expr (expr b) * (expr c))) <EOF>)"
    );

    let mut parser = ExprParser::new("a*b+c");
    let root = parser.start().unwrap();
    assert_eq!(
        parser.render(root),
        "(start (expr (expr (expr a) * (expr b)) + (expr c)) <EOF>)"
    );
}

#[test]
fn test_hidden_tokens_stay_in_source_text() {
    let mut parser = ExprParser::new("a + b");
    let root = parser.start().unwrap();
    let tree = parser.tree();

    let expr = tree.child_rule(root, RULE_EXPR, 0).unwrap();
    assert_eq!(tree.text(expr), "a+b");

    let rule = tree.rule(expr).unwrap();
    assert_eq!(rule.start.as_ref().unwrap().text(), Some("a"));
    assert_eq!(rule.stop.as_ref().unwrap().text(), Some("b"));

    let interval = tree.source_interval(expr);
    assert_eq!((interval.a, interval.b), (0, 4));
    assert_eq!(parser.base.input_mut().text_for_interval(interval), "a + b");
}

#[test]
fn test_listener_sees_balanced_events() {
    let mut parser = ExprParser::new("a+b");
    let recorder = Recorder::default();
    parser.base.add_parse_listener(Box::new(recorder.clone()));
    parser.start().unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            "enter start",
            "enter expr",
            "term a",
            "exit expr",
            "enter expr",
            "term +",
            "enter expr",
            "term b",
            "exit expr",
            "exit expr",
            "term <EOF>",
            "exit start",
        ]
    );
}

#[test]
fn test_bail_cancels_on_missing_operand() {
    let (mut parser, collector) = ExprParser::quiet("a + +");
    let result = parser.start();

    let error = assert_matches!(result, Err(ParseError::Cancelled(error)) => error);
    assert_matches!(error.kind, RecognitionErrorKind::NoViableAlternative { .. });
    assert_eq!(error.offending.as_ref().unwrap().text(), Some("+"));

    let diagnostics = collector.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "no viable alternative at input '+'");
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 4));
    assert_eq!(parser.base.number_of_syntax_errors(), 1);

    // Every context from the failing rule up to the root carries the error
    let tree = parser.tree();
    let mut chain = Vec::new();
    let mut current = error.context;
    while let Some(ctx) = current {
        assert!(tree.rule(ctx).unwrap().exception.is_some());
        chain.push(tree.rule(ctx).unwrap().rule_index);
        current = tree.parent(ctx);
    }
    assert_eq!(chain, vec![RULE_EXPR, RULE_EXPR, RULE_START]);
    assert_eq!(parser.base.context(), None);
}

#[test]
fn test_bail_reports_eof_when_input_ends_early() {
    let (mut parser, collector) = ExprParser::quiet("a+");
    assert_matches!(parser.start(), Err(ParseError::Cancelled(_)));
    assert_eq!(collector.messages(), vec!["no viable alternative at input '<EOF>'"]);
}

#[test]
fn test_mismatched_token_cancels_with_expected_set() {
    let (mut parser, collector) = ExprParser::quiet("a b");
    let result = parser.start();

    let error = assert_matches!(result, Err(ParseError::Cancelled(error)) => error);
    assert_matches!(error.kind, RecognitionErrorKind::InputMismatch);
    assert_eq!(error.offending.as_ref().unwrap().text(), Some("b"));
    assert_eq!(error.expected, IntervalSet::of(TOKEN_EOF));
    assert_eq!(error.state, 5);
    // Inline mismatches cancel without reporting
    assert!(collector.is_empty());
}

#[test]
fn test_without_tree_building() {
    let mut parser = ExprParser::new("a+b");
    parser.base.set_build_parse_trees(false);
    let root = parser.start().unwrap();

    assert_eq!(parser.tree().child_count(root), 0);
    assert_eq!(parser.unrolls, 2);
    assert_eq!(parser.base.context(), None);
}

#[test]
fn test_reset_allows_reparse() {
    let mut parser = ExprParser::new("a*b");
    let first = parser.start().unwrap();
    let expected = parser.render(first);

    parser.base.reset().unwrap();
    parser.unrolls = 0;
    let second = parser.start().unwrap();
    assert_eq!(parser.render(second), expected);
    assert_eq!(parser.unrolls, 2);
}

#[test]
fn test_rule_invocation_stack_mid_parse() {
    struct DepthRecorder {
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl ParseTreeListener for DepthRecorder {
        fn visit_terminal(&mut self, tree: &ParseTree, node: NodeId) {
            self.seen.lock().unwrap().push(tree.depth(node));
        }
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut parser = ExprParser::new("a");
    parser.base.add_parse_listener(Box::new(DepthRecorder { seen: seen.clone() }));
    parser.start().unwrap();

    // `a` under expr under start; EOF directly under start
    assert_eq!(*seen.lock().unwrap(), vec![3, 2]);
    assert_eq!(parser.base.grammar_file_name(), "Expr.g4");
}
