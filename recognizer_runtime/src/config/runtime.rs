// RUNTIME PREFERENCES (User Experience)

use super::error::ConfigError;
use crate::log_success;
use crate::logging::{codes, LogLevel};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Whether new parsers attach children to rule contexts
    pub build_parse_trees: bool,

    /// Whether the default token factory copies token text out of the input
    pub copy_token_text: bool,

    /// Whether rule entry and exit are logged at debug level
    pub trace_rule_invocations: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            build_parse_trees: env::var(env_vars::PARSER_BUILD_PARSE_TREES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            copy_token_text: env::var(env_vars::PARSER_COPY_TOKEN_TEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            trace_rule_invocations: env::var(env_vars::PARSER_TRACE_RULES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamPreferences {
    /// Tokens requested per `fill()` round
    pub fill_block_size: usize,

    /// Whether a completed `fill()` is logged
    pub log_fill_events: bool,
}

impl Default for StreamPreferences {
    fn default() -> Self {
        Self {
            fill_block_size: env::var(env_vars::STREAM_FILL_BLOCK_SIZE)
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size: &usize| *size > 0)
                .unwrap_or(super::compile_time::stream::FILL_BLOCK_SIZE),
            log_fill_events: env::var(env_vars::STREAM_LOG_FILL)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level passed through to loggers
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub parser: ParserPreferences,
    pub stream: StreamPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a configuration document. Missing tables and keys fall back to
    /// the environment-aware defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&source)?;

        log_success!(
            codes::success::CONFIG_LOADED,
            "Runtime configuration loaded",
            "path" => path.display()
        );

        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Parser
    pub const PARSER_BUILD_PARSE_TREES: &str = "RECOG_PARSER_BUILD_PARSE_TREES";
    pub const PARSER_COPY_TOKEN_TEXT: &str = "RECOG_PARSER_COPY_TOKEN_TEXT";
    pub const PARSER_TRACE_RULES: &str = "RECOG_PARSER_TRACE_RULES";

    // Stream
    pub const STREAM_FILL_BLOCK_SIZE: &str = "RECOG_STREAM_FILL_BLOCK_SIZE";
    pub const STREAM_LOG_FILL: &str = "RECOG_STREAM_LOG_FILL";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "RECOG_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "RECOG_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "RECOG_LOGGING_MIN_LEVEL";
}
