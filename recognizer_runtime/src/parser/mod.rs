//! Parser engine, error handling and recognizer metadata
//!
//! Generated parsers wrap a [`Parser`], which pairs the [`ParserEngine`] (rule
//! protocol, tree building, listener dispatch, follow sets) with an
//! [`ErrorStrategy`]. Alternative selection is delegated to an external
//! [`DecisionOracle`]; follow-set questions go to an [`Automaton`].
//!
//! ## Key Components
//!
//! - **[`ParserEngine`]** - Context stack, precedence climbing, listener events
//! - **[`Parser`]** - Token matching and recovery entry points
//! - **[`BailErrorStrategy`]** - Fail-fast policy
//! - **[`ErrorListener`]** - Console, proxy and collecting listeners
//! - **[`GrammarInfo`] / [`Recognizer`]** - Names and process-wide lookup caches

pub mod automaton;
pub mod engine;
pub mod error;
pub mod handle;
pub mod listener;
pub mod recognizer;
pub mod strategy;

pub use automaton::{Automaton, DecisionContext, DecisionOracle, Prediction, StaticAutomaton};
pub use engine::ParserEngine;
pub use error::{ParseError, RecognitionError, RecognitionErrorKind};
pub use handle::Parser;
pub use listener::{
    CollectingErrorListener, ConsoleErrorListener, ErrorListener, ProxyErrorListener,
    SyntaxDiagnostic,
};
pub use recognizer::{GrammarInfo, Recognizer, RecognizerSnapshot};
pub use strategy::{token_error_display, BailErrorStrategy, ErrorStrategy};
