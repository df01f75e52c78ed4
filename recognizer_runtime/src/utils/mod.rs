//! Shared primitive types used across the runtime.

pub mod span;

pub use span::{Position, Span};
