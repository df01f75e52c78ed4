use crate::logging::{codes, Code};

/// Errors raised by interval set mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntervalSetError {
    #[error("can't alter readonly IntervalSet")]
    ReadOnly,
}

impl IntervalSetError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::ReadOnly => codes::interval::READ_ONLY_MUTATION,
        }
    }
}
