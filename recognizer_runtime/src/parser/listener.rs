//! Syntax error listeners.

use super::error::RecognitionError;
use super::recognizer::Recognizer;
use crate::logging::Code;
use crate::tokens::TokenRef;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives every syntax error the error strategy reports.
pub trait ErrorListener {
    fn syntax_error(
        &mut self,
        recognizer: &dyn Recognizer,
        offending: Option<&TokenRef>,
        line: u32,
        column: u32,
        message: &str,
        error: Option<&RecognitionError>,
    );
}

/// Prints `line L:C message` to stderr. Installed on every new parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleErrorListener;

impl ErrorListener for ConsoleErrorListener {
    fn syntax_error(
        &mut self,
        _recognizer: &dyn Recognizer,
        _offending: Option<&TokenRef>,
        line: u32,
        column: u32,
        message: &str,
        _error: Option<&RecognitionError>,
    ) {
        eprintln!("{}", format_console_line(line, column, message));
    }
}

pub fn format_console_line(line: u32, column: u32, message: &str) -> String {
    format!("line {}:{} {}", line, column, message)
}

/// Fans each error out to its delegates in registration order
#[derive(Default)]
pub struct ProxyErrorListener {
    delegates: Vec<Box<dyn ErrorListener>>,
}

impl ProxyErrorListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Box<dyn ErrorListener>) {
        self.delegates.push(listener);
    }

    pub fn clear(&mut self) {
        self.delegates.clear();
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl ErrorListener for ProxyErrorListener {
    fn syntax_error(
        &mut self,
        recognizer: &dyn Recognizer,
        offending: Option<&TokenRef>,
        line: u32,
        column: u32,
        message: &str,
        error: Option<&RecognitionError>,
    ) {
        for delegate in &mut self.delegates {
            delegate.syntax_error(recognizer, offending, line, column, message, error);
        }
    }
}

/// One reported syntax error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub offending_text: Option<String>,
    pub code: Option<Code>,
}

/// Records diagnostics instead of printing them. Clones share one record.
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorListener {
    diagnostics: Arc<Mutex<Vec<SyntaxDiagnostic>>>,
}

impl CollectingErrorListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<SyntaxDiagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.diagnostics()
            .into_iter()
            .map(|diagnostic| diagnostic.message)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorListener for CollectingErrorListener {
    fn syntax_error(
        &mut self,
        _recognizer: &dyn Recognizer,
        offending: Option<&TokenRef>,
        line: u32,
        column: u32,
        message: &str,
        error: Option<&RecognitionError>,
    ) {
        let diagnostic = SyntaxDiagnostic {
            line,
            column,
            message: message.to_string(),
            offending_text: offending.and_then(|token| token.text()).map(str::to_string),
            code: error.map(RecognitionError::error_code),
        };
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
