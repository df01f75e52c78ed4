//! Token model for generated recognizers
//!
//! A lexer implements [`TokenSource`] and produces [`Token`] values through a
//! [`TokenFactory`]. Streams assign each token its index exactly once when it
//! is buffered and share it afterwards as a [`TokenRef`].
//!
//! ## Key Components
//!
//! - **[`Token`]** - Type, channel, byte span, line/column and text
//! - **[`TokenSource`]** - Lexer-side producer; [`ListTokenSource`] replays a list
//! - **[`CommonTokenFactory`]** - Default factory with lazy or copied text
//! - **[`VocabularyImpl`]** - Literal, symbolic and display names per token type

pub mod factory;
pub mod source;
pub mod token;
pub mod vocabulary;

pub use factory::{CommonTokenFactory, TokenFactory};
pub use source::{ListTokenSource, TokenSource};
pub use token::{
    escape_whitespace, Token, TokenLocation, TokenRef, DEFAULT_CHANNEL, HIDDEN_CHANNEL,
    MIN_USER_TOKEN_TYPE, TOKEN_EOF, TOKEN_EPSILON, TOKEN_INVALID_TYPE,
};
pub use vocabulary::{Vocabulary, VocabularyImpl, EMPTY_VOCABULARY};
