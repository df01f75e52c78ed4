//! The symbol model shared by token sources, streams and parse trees.

use crate::utils::{Position, Span};
use std::fmt;
use std::sync::Arc;

/// End of input
pub const TOKEN_EOF: i32 = -1;
/// No token / unknown type
pub const TOKEN_INVALID_TYPE: i32 = 0;
/// Placeholder for an empty follow path inside token-type sets
pub const TOKEN_EPSILON: i32 = -2;
pub const MIN_USER_TOKEN_TYPE: i32 = 1;

/// Channel the parser listens to by default
pub const DEFAULT_CHANNEL: i32 = 0;
/// Conventional channel for whitespace and comments
pub const HIDDEN_CHANNEL: i32 = 1;

/// Shared handle to a buffered token
pub type TokenRef = Arc<Token>;

/// Where a token sits in the input: inclusive byte offsets plus line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenLocation {
    pub start: isize,
    pub stop: isize,
    /// 1-based
    pub line: u32,
    /// 0-based
    pub column: u32,
}

impl TokenLocation {
    pub fn new(start: isize, stop: isize, line: u32, column: u32) -> Self {
        Self {
            start,
            stop,
            line,
            column,
        }
    }
}

/// A lexical symbol.
///
/// Text is either stored on the token or sliced lazily out of the shared
/// input. The token index is `-1` until a stream buffers the token, and stays
/// `-1` for tokens conjured by error recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: i32,
    pub channel: i32,
    pub start: isize,
    pub stop: isize,
    pub token_index: isize,
    pub line: u32,
    pub column: u32,
    text: Option<String>,
    input: Option<Arc<str>>,
}

impl Token {
    pub fn new(token_type: i32, text: impl Into<String>) -> Self {
        Self {
            token_type,
            channel: DEFAULT_CHANNEL,
            start: -1,
            stop: -1,
            token_index: -1,
            line: 0,
            column: 0,
            text: Some(text.into()),
            input: None,
        }
    }

    /// Token whose text is sliced from `input` on demand
    pub fn from_input(
        token_type: i32,
        channel: i32,
        input: Arc<str>,
        location: TokenLocation,
    ) -> Self {
        Self {
            token_type,
            channel,
            start: location.start,
            stop: location.stop,
            token_index: -1,
            line: location.line,
            column: location.column,
            text: None,
            input: Some(input),
        }
    }

    pub fn eof(location: TokenLocation) -> Self {
        Self {
            token_type: TOKEN_EOF,
            channel: DEFAULT_CHANNEL,
            start: location.start,
            stop: location.stop,
            token_index: -1,
            line: location.line,
            column: location.column,
            text: None,
            input: None,
        }
    }

    pub fn with_channel(mut self, channel: i32) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_location(mut self, location: TokenLocation) -> Self {
        self.start = location.start;
        self.stop = location.stop;
        self.line = location.line;
        self.column = location.column;
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == TOKEN_EOF
    }

    pub fn location(&self) -> TokenLocation {
        TokenLocation::new(self.start, self.stop, self.line, self.column)
    }

    /// Token text. EOF reads as `<EOF>`; `None` when the text is neither
    /// stored nor recoverable from the input.
    pub fn text(&self) -> Option<&str> {
        if let Some(text) = &self.text {
            return Some(text);
        }
        if self.is_eof() {
            return Some("<EOF>");
        }
        let input = self.input.as_deref()?;
        if self.start < 0 || self.stop < self.start - 1 {
            return None;
        }
        let start = self.start as usize;
        let end = (self.stop + 1) as usize;
        if start < input.len() && end <= input.len() {
            input.get(start..end)
        } else {
            Some("<EOF>")
        }
    }

    pub fn input(&self) -> Option<&Arc<str>> {
        self.input.as_ref()
    }

    /// Text held by the token itself rather than sliced from its input
    pub fn stored_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn span(&self) -> Span {
        let start = Position::new(self.start.max(0) as usize, self.line, self.column);
        Span::covering(start, self.text().unwrap_or(""))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = if self.channel > DEFAULT_CHANNEL {
            format!(",channel={}", self.channel)
        } else {
            String::new()
        };
        let text = match self.text() {
            Some(text) => escape_whitespace(text),
            None => "<no text>".to_string(),
        };
        write!(
            f,
            "[@{},{}:{}='{}',<{}>{},{}:{}]",
            self.token_index,
            self.start,
            self.stop,
            text,
            self.token_type,
            channel,
            self.line,
            self.column
        )
    }
}

/// Replace newline, carriage return and tab with their escape sequences
pub fn escape_whitespace(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}
