//! Consolidated error codes and classification system
//!
//! Single source of truth for the codes the runtime logs, their metadata, and
//! the classification functions used by events and error types.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Token buffering error codes
pub mod stream {
    use super::Code;

    pub const BUFFER_EXHAUSTED: Code = Code::new("E010");
    pub const INDEX_OUT_OF_RANGE: Code = Code::new("E011");
}

/// Interval set error codes
pub mod interval {
    use super::Code;

    pub const READ_ONLY_MUTATION: Code = Code::new("E020");
}

/// Recognition error codes
pub mod parser {
    use super::Code;

    pub const INPUT_MISMATCH: Code = Code::new("E040");
    pub const NO_VIABLE_ALTERNATIVE: Code = Code::new("E041");
    pub const FAILED_PREDICATE: Code = Code::new("E042");
    pub const PARSE_CANCELLED: Code = Code::new("E043");
    pub const INVALID_RECOGNIZER_STATE: Code = Code::new("E044");
}

/// Configuration error codes
pub mod config {
    use super::Code;

    pub const CONFIG_IO_ERROR: Code = Code::new("E060");
    pub const CONFIG_PARSE_ERROR: Code = Code::new("E061");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const STREAM_FILLED: Code = Code::new("I010");
    pub const TOKEN_SOURCE_REBOUND: Code = Code::new("I011");
    pub const PARSE_TREE_COMPLETE: Code = Code::new("I040");
    pub const CONFIG_LOADED: Code = Code::new("I060");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

type RegistryRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

const REGISTRY_ROWS: &[RegistryRow] = &[
    (
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal runtime error",
        "File a bug report with the grammar and input that triggered it",
    ),
    (
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "Runtime initialization failure",
        "Check logging and configuration initialization order",
    ),
    (
        "E010",
        "Stream",
        Severity::High,
        false,
        true,
        "Attempted to consume past the end-of-input token",
        "Check the lookahead for EOF before consuming",
    ),
    (
        "E011",
        "Stream",
        Severity::High,
        false,
        true,
        "Token index outside the buffered range",
        "Only address tokens that have already been buffered",
    ),
    (
        "E020",
        "Interval",
        Severity::High,
        false,
        true,
        "Mutation attempted on a read-only interval set",
        "Copy the set before modifying it",
    ),
    (
        "E040",
        "Recognition",
        Severity::Medium,
        true,
        false,
        "Input token did not match the expected token",
        "Check the input against the grammar near the reported position",
    ),
    (
        "E041",
        "Recognition",
        Severity::Medium,
        true,
        false,
        "No alternative of the current decision matches the input",
        "Check the input against the grammar near the reported position",
    ),
    (
        "E042",
        "Recognition",
        Severity::Medium,
        true,
        false,
        "A semantic or precedence predicate failed",
        "Check operator precedence in the input",
    ),
    (
        "E043",
        "Recognition",
        Severity::High,
        false,
        true,
        "Parse cancelled by a fail-fast error strategy",
        "Inspect the exception recorded on the open rule contexts",
    ),
    (
        "E044",
        "Recognition",
        Severity::High,
        false,
        true,
        "Operation requires a capability the recognizer lacks",
        "Configure the recognizer with the missing automaton or oracle",
    ),
    (
        "E060",
        "Config",
        Severity::Medium,
        true,
        false,
        "Configuration file could not be read",
        "Check the configuration path and permissions",
    ),
    (
        "E061",
        "Config",
        Severity::Medium,
        true,
        false,
        "Configuration file is not valid TOML for the runtime schema",
        "Fix the reported key or value in the configuration file",
    ),
    (
        "I004",
        "System",
        Severity::Low,
        true,
        false,
        "Logging system initialized",
        "No action required",
    ),
    (
        "I010",
        "Stream",
        Severity::Low,
        true,
        false,
        "Token buffer filled through end of input",
        "No action required",
    ),
    (
        "I011",
        "Stream",
        Severity::Low,
        true,
        false,
        "Token source rebound and buffer reset",
        "No action required",
    ),
    (
        "I040",
        "Recognition",
        Severity::Low,
        true,
        false,
        "Top-level rule invocation completed",
        "No action required",
    ),
    (
        "I060",
        "Config",
        Severity::Low,
        true,
        false,
        "Runtime configuration loaded",
        "No action required",
    ),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ROWS
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
