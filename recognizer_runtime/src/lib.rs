//! Runtime support for generated lexers and parsers.
//!
//! A generated lexer implements [`TokenSource`]; its tokens are buffered by a
//! [`BufferedTokenStream`] (or the channel-filtering [`CommonTokenStream`]);
//! a generated parser drives a [`Parser`] over that stream, building a
//! [`ParseTree`] that [`walk`] replays to listeners.

// Internal modules
pub mod config;
pub mod interval;
#[macro_use]
pub mod logging;
pub mod parser;
pub mod stream;
pub mod tokens;
pub mod tree;
pub mod utils;

// Re-export key types for library consumers
pub use config::{ConfigError, RuntimeConfig};
pub use interval::{Interval, IntervalSet, IntervalSetError};
pub use parser::{
    BailErrorStrategy, ErrorListener, ErrorStrategy, GrammarInfo, ParseError, Parser,
    ParserEngine, RecognitionError, Recognizer,
};
pub use stream::{BufferedTokenStream, CommonTokenStream, StreamError, TokenStream};
pub use tokens::{Token, TokenRef, TokenSource, Vocabulary, VocabularyImpl};
pub use tree::{walk, NodeId, ParseTree, ParseTreeListener};
