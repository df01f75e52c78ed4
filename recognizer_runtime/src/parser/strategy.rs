//! Error strategy contract and the fail-fast policy.

use super::engine::ParserEngine;
use super::error::{ParseError, RecognitionError, RecognitionErrorKind};
use super::recognizer::Recognizer;
use crate::config::compile_time::parser::MAX_REPORTED_LOOKAHEAD_TOKENS;
use crate::interval::Interval;
use crate::logging::codes;
use crate::stream::TokenStream;
use crate::tokens::{escape_whitespace, Token, TokenRef, TOKEN_EOF};
use crate::{log_debug, log_error};

/// Hooks the parser calls when input does not match the grammar.
pub trait ErrorStrategy<T: TokenStream> {
    /// Forget any recovery state; called when the parser is reset
    fn reset(&mut self, engine: &mut ParserEngine<T>);

    /// Called when `match_token` fails. Returns the token to use in place of
    /// the current one, or an error to abort the rule.
    fn recover_inline(&mut self, engine: &mut ParserEngine<T>) -> Result<TokenRef, ParseError>;

    /// Called after `report_error` when a rule catches a recognition error.
    /// Returning an error aborts the parse.
    fn recover(&mut self, engine: &mut ParserEngine<T>, error: &RecognitionError) -> Result<(), ParseError>;

    /// Called at synchronization points inside a rule; may consume tokens
    fn sync(&mut self, engine: &mut ParserEngine<T>) -> Result<(), ParseError>;

    fn in_error_recovery_mode(&self, engine: &ParserEngine<T>) -> bool;

    /// Called on every successful match
    fn report_match(&mut self, engine: &mut ParserEngine<T>);

    fn report_error(&mut self, engine: &mut ParserEngine<T>, error: &RecognitionError);
}

/// Abandons the parse at the first syntax error.
///
/// Every context from the failing rule up to the root is annotated with the
/// error before `ParseError::Cancelled` is returned, so the partial tree
/// shows which rules were in progress. No resynchronization is attempted.
#[derive(Debug, Clone, Copy, Default)]
pub struct BailErrorStrategy {
    error_recovery_mode: bool,
}

impl BailErrorStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn cancel<T: TokenStream>(engine: &mut ParserEngine<T>, error: RecognitionError) -> ParseError {
        engine.annotate_context_chain(&error);
        let rules = engine.rule_invocation_stack().join(" < ");
        match error.offending.as_deref() {
            Some(token) => log_error!(
                codes::parser::PARSE_CANCELLED,
                "Parse cancelled at first syntax error",
                span = token.span(),
                "rules" => rules,
                "offending" => token_error_display(Some(token)),
                "cause" => error.error_code()
            ),
            None => log_error!(
                codes::parser::PARSE_CANCELLED,
                "Parse cancelled at first syntax error",
                "rules" => rules,
                "offending" => token_error_display(None),
                "cause" => error.error_code()
            ),
        }
        ParseError::Cancelled(Box::new(error))
    }

    fn input_mismatch_message<T: TokenStream>(engine: &ParserEngine<T>, error: &RecognitionError) -> String {
        format!(
            "mismatched input {} expecting {}",
            token_error_display(error.offending.as_deref()),
            error.expected.to_string_with_vocabulary(engine.grammar().vocabulary)
        )
    }

    fn no_viable_message<T: TokenStream>(
        engine: &mut ParserEngine<T>,
        start: Option<&TokenRef>,
        error: &RecognitionError,
    ) -> String {
        let input = match (start, error.offending.as_ref()) {
            (Some(start), _) if start.token_type == TOKEN_EOF => "<EOF>".to_string(),
            (Some(start), Some(offending)) => Self::lookahead_text(engine, start, offending),
            _ => "<unknown input>".to_string(),
        };
        format!("no viable alternative at input {}", escape_and_quote(&input))
    }

    /// Buffered text from `start` through `offending`, cut after
    /// `MAX_REPORTED_LOOKAHEAD_TOKENS` tokens
    fn lookahead_text<T: TokenStream>(engine: &mut ParserEngine<T>, start: &Token, offending: &Token) -> String {
        let limit = MAX_REPORTED_LOOKAHEAD_TOKENS as isize;
        if start.token_index < 0 || offending.token_index - start.token_index < limit {
            return engine.input_mut().text_between(start, offending);
        }
        let last = start.token_index + limit - 1;
        let mut text = engine
            .input_mut()
            .text_for_interval(Interval::of(start.token_index as i32, last as i32));
        text.push_str("...");
        text
    }

    fn failed_predicate_message<T: TokenStream>(
        engine: &ParserEngine<T>,
        rule_index: usize,
        predicate: Option<&str>,
        message: Option<&str>,
    ) -> String {
        let rule_name = engine
            .grammar()
            .rule_names
            .get(rule_index)
            .copied()
            .unwrap_or("<unknown rule>");
        let detail = match message {
            Some(message) => message.to_string(),
            None => format!("failed predicate: {{{}}}?", predicate.unwrap_or("")),
        };
        format!("rule {} {}", rule_name, detail)
    }
}

impl<T: TokenStream> ErrorStrategy<T> for BailErrorStrategy {
    fn reset(&mut self, _engine: &mut ParserEngine<T>) {
        self.error_recovery_mode = false;
    }

    fn recover_inline(&mut self, engine: &mut ParserEngine<T>) -> Result<TokenRef, ParseError> {
        let error = engine.input_mismatch_error();
        Err(Self::cancel(engine, error))
    }

    fn recover(&mut self, engine: &mut ParserEngine<T>, error: &RecognitionError) -> Result<(), ParseError> {
        Err(Self::cancel(engine, error.clone()))
    }

    fn sync(&mut self, _engine: &mut ParserEngine<T>) -> Result<(), ParseError> {
        Ok(())
    }

    fn in_error_recovery_mode(&self, _engine: &ParserEngine<T>) -> bool {
        self.error_recovery_mode
    }

    fn report_match(&mut self, _engine: &mut ParserEngine<T>) {
        self.error_recovery_mode = false;
    }

    fn report_error(&mut self, engine: &mut ParserEngine<T>, error: &RecognitionError) {
        // Already reporting this error condition
        if self.error_recovery_mode {
            log_debug!("Suppressed duplicate syntax error report", "code" => error.error_code());
            return;
        }
        self.error_recovery_mode = true;

        let message = match &error.kind {
            RecognitionErrorKind::InputMismatch => Self::input_mismatch_message(engine, error),
            RecognitionErrorKind::NoViableAlternative { start } => {
                Self::no_viable_message(engine, start.as_ref(), error)
            }
            RecognitionErrorKind::FailedPredicate {
                rule_index,
                predicate,
                message,
            } => Self::failed_predicate_message(
                engine,
                *rule_index,
                predicate.as_deref(),
                message.as_deref(),
            ),
        };
        engine.notify_error_listeners(&message, error.offending.clone(), Some(error));
    }
}

/// Quoted, escaped token text for messages
pub fn token_error_display(token: Option<&Token>) -> String {
    let Some(token) = token else {
        return "<no token>".to_string();
    };
    match token.text() {
        Some(text) => escape_and_quote(text),
        None if token.is_eof() => escape_and_quote("<EOF>"),
        None => escape_and_quote(&format!("<{}>", token.token_type)),
    }
}

fn escape_and_quote(text: &str) -> String {
    format!("'{}'", escape_whitespace(text))
}
