//! The parser handle generated recognizers wrap: the engine plus an error
//! strategy.

use super::engine::ParserEngine;
use super::error::{ParseError, RecognitionError, RecognitionErrorKind};
use super::recognizer::{GrammarInfo, Recognizer};
use super::strategy::{BailErrorStrategy, ErrorStrategy};
use crate::config::ParserPreferences;
use crate::stream::TokenStream;
use crate::tokens::{TokenRef, TOKEN_EOF};
use crate::log_debug;
use std::ops::{Deref, DerefMut};

/// Kept separate from the engine so the strategy can borrow the engine
/// mutably while it recovers.
pub struct Parser<T: TokenStream> {
    engine: ParserEngine<T>,
    strategy: Box<dyn ErrorStrategy<T>>,
}

impl<T: TokenStream> Parser<T> {
    /// Parser with the fail-fast error strategy
    pub fn new(input: T, grammar: GrammarInfo) -> Self {
        Self::from_engine(ParserEngine::new(input, grammar))
    }

    pub fn with_preferences(input: T, grammar: GrammarInfo, preferences: &ParserPreferences) -> Self {
        Self::from_engine(ParserEngine::with_preferences(input, grammar, preferences))
    }

    pub fn from_engine(engine: ParserEngine<T>) -> Self {
        Self {
            engine,
            strategy: Box::new(BailErrorStrategy::new()),
        }
    }

    pub fn set_error_strategy(&mut self, strategy: Box<dyn ErrorStrategy<T>>) {
        self.strategy = strategy;
    }

    pub fn engine(&self) -> &ParserEngine<T> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ParserEngine<T> {
        &mut self.engine
    }

    pub fn into_engine(self) -> ParserEngine<T> {
        self.engine
    }

    pub fn in_error_recovery_mode(&self) -> bool {
        self.strategy.in_error_recovery_mode(&self.engine)
    }

    /// Match the current token against `token_type`.
    ///
    /// On success the token is consumed and attached to the current context.
    /// Matching EOF attaches it without advancing. On mismatch the strategy
    /// either supplies a substitute (attached as an error node when it was
    /// conjured, without notifying parse listeners) or fails the rule.
    pub fn match_token(&mut self, token_type: i32) -> Result<TokenRef, ParseError> {
        let current = self
            .engine
            .current_token()
            .ok_or_else(|| ParseError::invalid_state("token stream produced no tokens"))?;

        if current.token_type != token_type {
            let substitute = self.strategy.recover_inline(&mut self.engine)?;
            if substitute.token_index == -1 {
                self.engine.attach_conjured_symbol(substitute.clone());
            }
            return Ok(substitute);
        }

        if token_type == TOKEN_EOF {
            self.engine.set_matched_eof(true);
        }
        self.strategy.report_match(&mut self.engine);
        self.consume_or_attach(current)
    }

    /// Match any token other than EOF
    pub fn match_wildcard(&mut self) -> Result<TokenRef, ParseError> {
        let current = self
            .engine
            .current_token()
            .ok_or_else(|| ParseError::invalid_state("token stream produced no tokens"))?;

        if current.token_type <= 0 {
            let substitute = self.strategy.recover_inline(&mut self.engine)?;
            if substitute.token_index == -1 {
                self.engine.attach_conjured_symbol(substitute.clone());
            }
            return Ok(substitute);
        }

        self.strategy.report_match(&mut self.engine);
        self.consume_or_attach(current)
    }

    fn consume_or_attach(&mut self, current: TokenRef) -> Result<TokenRef, ParseError> {
        if current.is_eof() {
            let as_error = self.in_error_recovery_mode();
            self.engine.attach_symbol(current.clone(), as_error);
            return Ok(current);
        }
        self.consume()
    }

    /// Consume the current token. The token becomes an error node while the
    /// strategy is recovering. Fails at EOF.
    pub fn consume(&mut self) -> Result<TokenRef, ParseError> {
        let as_error = self.in_error_recovery_mode();
        self.engine.consume_symbol(as_error)
    }

    pub fn sync(&mut self) -> Result<(), ParseError> {
        self.strategy.sync(&mut self.engine)
    }

    pub fn reset(&mut self) -> Result<(), ParseError> {
        self.engine.reset()?;
        self.strategy.reset(&mut self.engine);
        Ok(())
    }

    pub fn set_input(&mut self, input: T) -> T {
        let previous = self.engine.set_input(input);
        self.strategy.reset(&mut self.engine);
        previous
    }

    /// Error for a semantic predicate that evaluated to false in the current
    /// rule
    pub fn failed_predicate(&mut self, predicate: &str, message: Option<&str>) -> ParseError {
        let rule_index = self
            .engine
            .context()
            .and_then(|ctx| self.engine.tree().rule(ctx))
            .map_or(0, |rule| rule.rule_index);
        let offending = self.engine.current_token();
        let state = self.engine.state();
        let context = self.engine.context();

        ParseError::recognition(
            RecognitionError::new(
                RecognitionErrorKind::FailedPredicate {
                    rule_index,
                    predicate: Some(predicate.to_string()),
                    message: message.map(str::to_string),
                },
                offending,
            )
            .with_state(state, context),
        )
    }

    /// The catch block of a generated rule: record the error on the current
    /// context, report it, and let the strategy recover. Errors other than
    /// recognition failures pass through untouched.
    pub fn recover_from(&mut self, error: ParseError) -> Result<(), ParseError> {
        let ParseError::Recognition(error) = error else {
            return Err(error);
        };

        if let Some(rule) = self
            .engine
            .context()
            .and_then(|ctx| self.engine.tree_mut().rule_mut(ctx))
        {
            rule.exception = Some((*error).clone());
        }
        log_debug!("Recovering from recognition error",
            "code" => error.error_code(),
            "state" => error.state
        );
        self.strategy.report_error(&mut self.engine, &error);
        self.strategy.recover(&mut self.engine, &error)
    }
}

impl<T: TokenStream> Deref for Parser<T> {
    type Target = ParserEngine<T>;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

impl<T: TokenStream> DerefMut for Parser<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.engine
    }
}
