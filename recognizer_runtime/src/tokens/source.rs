//! Token producers consumed by the buffered streams.

use super::factory::{CommonTokenFactory, TokenFactory};
use super::token::{Token, TokenLocation, DEFAULT_CHANNEL, TOKEN_EOF};
use crate::config::ParserPreferences;
use std::sync::Arc;

/// A producer of tokens, normally a generated lexer.
///
/// After the input is exhausted `next_token` must keep returning EOF tokens.
pub trait TokenSource {
    fn next_token(&mut self) -> Token;

    /// Line of the next token to be produced (1-based)
    fn line(&self) -> u32;

    /// Column of the next token to be produced (0-based)
    fn column(&self) -> u32;

    fn source_name(&self) -> &str;

    fn set_token_factory(&mut self, factory: Arc<dyn TokenFactory>);

    fn token_factory(&self) -> Arc<dyn TokenFactory>;
}

impl<S: TokenSource + ?Sized> TokenSource for Box<S> {
    fn next_token(&mut self) -> Token {
        (**self).next_token()
    }

    fn line(&self) -> u32 {
        (**self).line()
    }

    fn column(&self) -> u32 {
        (**self).column()
    }

    fn source_name(&self) -> &str {
        (**self).source_name()
    }

    fn set_token_factory(&mut self, factory: Arc<dyn TokenFactory>) {
        (**self).set_token_factory(factory)
    }

    fn token_factory(&self) -> Arc<dyn TokenFactory> {
        (**self).token_factory()
    }
}

pub const UNKNOWN_SOURCE_NAME: &str = "<unknown>";

/// Replays a prepared token list, then produces EOF forever.
///
/// When the list does not end in EOF, an EOF token is synthesized just past
/// the last token. Tokens backed by an input are replayed through the token
/// factory, so a copying factory stores their text.
pub struct ListTokenSource {
    tokens: Vec<Token>,
    next: usize,
    eof_token: Option<Token>,
    source_name: String,
    factory: Arc<dyn TokenFactory>,
}

impl ListTokenSource {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_source_name(tokens, UNKNOWN_SOURCE_NAME)
    }

    pub fn with_source_name(tokens: Vec<Token>, source_name: impl Into<String>) -> Self {
        Self {
            tokens,
            next: 0,
            eof_token: None,
            source_name: source_name.into(),
            factory: Arc::new(CommonTokenFactory::DEFAULT),
        }
    }

    /// Source whose factory follows `copy_token_text`
    pub fn with_preferences(tokens: Vec<Token>, preferences: &ParserPreferences) -> Self {
        let mut source = Self::new(tokens);
        source.factory = Arc::new(CommonTokenFactory::from_preferences(preferences));
        source
    }

    fn replay(&self, token: &Token) -> Token {
        let Some(input) = token.input() else {
            return token.clone();
        };
        let mut produced = self.factory.create(
            Some(input),
            token.token_type,
            token.stored_text(),
            token.channel,
            token.location(),
        );
        produced.token_index = token.token_index;
        produced
    }

    fn synthesize_eof(&self) -> Token {
        let start = match self.tokens.last() {
            Some(last) if last.stop != -1 => last.stop + 1,
            _ => -1,
        };
        let stop = (start - 1).max(-1);
        self.factory.create(
            None,
            TOKEN_EOF,
            None,
            DEFAULT_CHANNEL,
            TokenLocation::new(start, stop, self.line(), self.column()),
        )
    }
}

impl TokenSource for ListTokenSource {
    fn next_token(&mut self) -> Token {
        if self.next >= self.tokens.len() {
            if self.eof_token.is_none() {
                self.eof_token = Some(self.synthesize_eof());
            }
            return self
                .eof_token
                .clone()
                .unwrap_or_else(|| Token::eof(TokenLocation::default()));
        }

        let token = self.replay(&self.tokens[self.next]);
        if self.next == self.tokens.len() - 1 && token.is_eof() {
            self.eof_token = Some(token.clone());
        }
        self.next += 1;
        token
    }

    fn line(&self) -> u32 {
        if let Some(token) = self.tokens.get(self.next) {
            return token.line;
        }
        if let Some(eof) = &self.eof_token {
            return eof.line;
        }
        match self.tokens.last() {
            Some(last) => {
                let newlines = last.text().map(|t| t.matches('\n').count()).unwrap_or(0);
                last.line + newlines as u32
            }
            None => 1,
        }
    }

    fn column(&self) -> u32 {
        if let Some(token) = self.tokens.get(self.next) {
            return token.column;
        }
        if let Some(eof) = &self.eof_token {
            return eof.column;
        }
        match self.tokens.last() {
            Some(last) => match last.text() {
                Some(text) => match text.rfind('\n') {
                    Some(newline) => text[newline + 1..].chars().count() as u32,
                    None => last.column + text.chars().count() as u32,
                },
                None => last.column,
            },
            None => 0,
        }
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn set_token_factory(&mut self, factory: Arc<dyn TokenFactory>) {
        self.factory = factory;
    }

    fn token_factory(&self) -> Arc<dyn TokenFactory> {
        self.factory.clone()
    }
}
