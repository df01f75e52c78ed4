//! Configuration module for the recognizer runtime
//!
//! Limits that shape buffering and parsing live in `compile_time`; user
//! preferences are loaded from the environment or a TOML document through
//! `runtime::RuntimeConfig`.

pub mod constants;
pub mod error;
pub mod runtime;

pub use constants::compile_time;
pub use error::ConfigError;
pub use runtime::{LoggingPreferences, ParserPreferences, RuntimeConfig, StreamPreferences};
