use super::token::{Token, TokenLocation};
use crate::config::ParserPreferences;
use std::sync::Arc;

/// Creates the tokens a source hands to a stream.
pub trait TokenFactory: Send + Sync {
    /// Token for a lexed span of `input`. Explicit `text` overrides the slice.
    fn create(
        &self,
        input: Option<&Arc<str>>,
        token_type: i32,
        text: Option<&str>,
        channel: i32,
        location: TokenLocation,
    ) -> Token;

    /// Token with the given type and text and no input position
    fn create_token(&self, token_type: i32, text: &str) -> Token {
        Token::new(token_type, text)
    }
}

/// Default factory. With `copy_text` set, text is copied out of the input at
/// creation instead of being sliced on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommonTokenFactory {
    pub copy_text: bool,
}

impl CommonTokenFactory {
    pub const DEFAULT: CommonTokenFactory = CommonTokenFactory { copy_text: false };

    pub const fn new(copy_text: bool) -> Self {
        Self { copy_text }
    }

    pub fn from_preferences(preferences: &ParserPreferences) -> Self {
        Self::new(preferences.copy_token_text)
    }
}

impl TokenFactory for CommonTokenFactory {
    fn create(
        &self,
        input: Option<&Arc<str>>,
        token_type: i32,
        text: Option<&str>,
        channel: i32,
        location: TokenLocation,
    ) -> Token {
        let mut token = match input {
            Some(input) => Token::from_input(token_type, channel, input.clone(), location),
            None => Token::eof(location).with_channel(channel),
        };
        token.token_type = token_type;

        if let Some(text) = text {
            token.set_text(text);
        } else if self.copy_text && input.is_some() {
            if let Some(copied) = token.text().map(str::to_owned) {
                token.set_text(copied);
            }
        }
        token
    }
}
