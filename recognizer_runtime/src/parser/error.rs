use crate::interval::IntervalSet;
use crate::logging::{codes, Code};
use crate::stream::StreamError;
use crate::tokens::TokenRef;
use crate::tree::NodeId;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionErrorKind {
    /// Current token is not in the expected set
    InputMismatch,
    /// The decision oracle found no alternative that matches; `start` is the
    /// token where the decision began
    NoViableAlternative { start: Option<TokenRef> },
    /// A semantic predicate evaluated to false
    FailedPredicate {
        rule_index: usize,
        predicate: Option<String>,
        message: Option<String>,
    },
}

/// A syntax error at a specific token, handed to the error strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionError {
    pub kind: RecognitionErrorKind,
    pub offending: Option<TokenRef>,
    pub expected: IntervalSet,
    /// Automaton state when the error was detected
    pub state: isize,
    /// Rule context active when the error was detected
    pub context: Option<NodeId>,
}

impl RecognitionError {
    pub fn new(kind: RecognitionErrorKind, offending: Option<TokenRef>) -> Self {
        Self {
            kind,
            offending,
            expected: IntervalSet::new(),
            state: -1,
            context: None,
        }
    }

    pub fn input_mismatch(offending: Option<TokenRef>, expected: IntervalSet) -> Self {
        Self {
            expected,
            ..Self::new(RecognitionErrorKind::InputMismatch, offending)
        }
    }

    pub fn no_viable_alternative(start: Option<TokenRef>, offending: Option<TokenRef>) -> Self {
        Self::new(RecognitionErrorKind::NoViableAlternative { start }, offending)
    }

    pub fn with_state(mut self, state: isize, context: Option<NodeId>) -> Self {
        self.state = state;
        self.context = context;
        self
    }

    pub fn error_code(&self) -> Code {
        match self.kind {
            RecognitionErrorKind::InputMismatch => codes::parser::INPUT_MISMATCH,
            RecognitionErrorKind::NoViableAlternative { .. } => codes::parser::NO_VIABLE_ALTERNATIVE,
            RecognitionErrorKind::FailedPredicate { .. } => codes::parser::FAILED_PREDICATE,
        }
    }
}

impl fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self
            .offending
            .as_ref()
            .and_then(|token| token.text())
            .unwrap_or("<unknown>");
        match &self.kind {
            RecognitionErrorKind::InputMismatch => {
                write!(f, "input mismatch at '{}', expecting {}", at, self.expected)
            }
            RecognitionErrorKind::NoViableAlternative { .. } => {
                write!(f, "no viable alternative at '{}'", at)
            }
            RecognitionErrorKind::FailedPredicate {
                rule_index,
                predicate,
                message,
            } => match message {
                Some(message) => write!(f, "{}", message),
                None => write!(
                    f,
                    "failed predicate: {{{}}}? in rule {}",
                    predicate.as_deref().unwrap_or(""),
                    rule_index
                ),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("invalid recognizer state: {message}")]
    InvalidRecognizerState { message: String },

    /// A syntax error the error strategy declined to resolve
    #[error("{0}")]
    Recognition(Box<RecognitionError>),

    /// Parse aborted by a fail-fast error strategy
    #[error("parse cancelled: {0}")]
    Cancelled(Box<RecognitionError>),
}

impl ParseError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidRecognizerState {
            message: message.into(),
        }
    }

    pub fn recognition(error: RecognitionError) -> Self {
        Self::Recognition(Box::new(error))
    }

    /// The syntax error carried by recognition failures and cancellations
    pub fn recognition_error(&self) -> Option<&RecognitionError> {
        match self {
            Self::Recognition(error) | Self::Cancelled(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Only recognition failures can be handed to an error strategy
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recognition(_))
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Stream(err) => err.error_code(),
            Self::InvalidRecognizerState { .. } => codes::parser::INVALID_RECOGNIZER_STATE,
            Self::Recognition(err) => err.error_code(),
            Self::Cancelled(_) => codes::parser::PARSE_CANCELLED,
        }
    }
}
