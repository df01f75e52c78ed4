use crate::logging::{codes, Code};

/// Token buffering errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("cannot consume EOF")]
    BufferExhausted,

    #[error("token index {index} out of range 0..{size}")]
    IndexOutOfRange { index: usize, size: usize },
}

impl StreamError {
    pub fn out_of_range(index: usize, size: usize) -> Self {
        Self::IndexOutOfRange { index, size }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::BufferExhausted => codes::stream::BUFFER_EXHAUSTED,
            Self::IndexOutOfRange { .. } => codes::stream::INDEX_OUT_OF_RANGE,
        }
    }
}
