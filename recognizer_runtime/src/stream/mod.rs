//! Buffered token streams
//!
//! [`BufferedTokenStream`] pulls tokens from a [`TokenSource`](crate::tokens::TokenSource)
//! on demand and gives the parser random access to them. The channel filter
//! type parameter decides what lookahead sees: [`AllChannels`] for the plain
//! buffer, [`OnChannel`] for [`CommonTokenStream`], which skips tokens on
//! other channels (whitespace and comments, usually) while keeping them in the
//! buffer for text extraction.
//!
//! The parser is written against the [`TokenStream`] trait.

pub mod buffered;
pub mod error;
pub mod filter;

pub use buffered::{BufferedTokenStream, CommonTokenStream};
pub use error::StreamError;
pub use filter::{AllChannels, ChannelFilter, OnChannel};

use crate::interval::Interval;
use crate::tokens::{Token, TokenRef, TokenSource};

/// Cursor-based token access used by the parser engine
pub trait TokenStream {
    /// Type of the `k`-th visible token relative to the cursor; invalid type
    /// when there is none
    fn la(&mut self, k: isize) -> i32;

    fn lt(&mut self, k: isize) -> Option<TokenRef>;

    fn consume(&mut self) -> Result<(), StreamError>;

    fn index(&self) -> usize;

    fn seek(&mut self, index: usize) -> Result<(), StreamError>;

    fn size(&self) -> usize;

    fn get(&self, index: usize) -> Result<TokenRef, StreamError>;

    fn text_for_interval(&mut self, interval: Interval) -> String;

    fn text_between(&mut self, start: &Token, stop: &Token) -> String;

    fn source_name(&self) -> String;
}

impl<S: TokenSource, F: ChannelFilter> TokenStream for BufferedTokenStream<S, F> {
    fn la(&mut self, k: isize) -> i32 {
        BufferedTokenStream::la(self, k)
    }

    fn lt(&mut self, k: isize) -> Option<TokenRef> {
        BufferedTokenStream::lt(self, k)
    }

    fn consume(&mut self) -> Result<(), StreamError> {
        BufferedTokenStream::consume(self)
    }

    fn index(&self) -> usize {
        BufferedTokenStream::index(self)
    }

    fn seek(&mut self, index: usize) -> Result<(), StreamError> {
        BufferedTokenStream::seek(self, index)
    }

    fn size(&self) -> usize {
        BufferedTokenStream::size(self)
    }

    fn get(&self, index: usize) -> Result<TokenRef, StreamError> {
        BufferedTokenStream::get(self, index)
    }

    fn text_for_interval(&mut self, interval: Interval) -> String {
        BufferedTokenStream::text_for_interval(self, interval)
    }

    fn text_between(&mut self, start: &Token, stop: &Token) -> String {
        BufferedTokenStream::text_between(self, start, stop)
    }

    fn source_name(&self) -> String {
        BufferedTokenStream::source_name(self).to_string()
    }
}
