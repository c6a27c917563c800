//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.
//! This module combines code constants with their behavioral metadata in one place.

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

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for an error code
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

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
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

/// Token registry error codes
pub mod registry {
    use super::Code;

    pub const INVALID_PATTERN: Code = Code::new("E010");
    pub const REGISTRATION_WHILE_PARSING: Code = Code::new("E011");
    pub const TOO_MANY_TOKEN_TYPES: Code = Code::new("E012");
    pub const NAME_TOO_LONG: Code = Code::new("E013");
}

/// Tokenization error codes
pub mod lexical {
    use super::Code;

    pub const UNDEFINED_TOKEN: Code = Code::new("E020");
    pub const READ_PAST_END: Code = Code::new("E021");
    pub const MATCHER_ABORTED: Code = Code::new("E022");
    pub const TOO_MANY_TOKENS: Code = Code::new("E023");
    pub const SOURCE_TOO_LARGE: Code = Code::new("E024");
    pub const ZERO_LENGTH_MATCH: Code = Code::new("E025");
    pub const TOKEN_VALUE_TOO_LARGE: Code = Code::new("E026");
}

/// Parse facade error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E041");
    pub const NOT_PARSING: Code = Code::new("E042");
    pub const ALREADY_PARSING: Code = Code::new("E043");
    pub const GRAMMAR_ERROR: Code = Code::new("E044");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    // General success codes
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    // Registry success codes
    pub const TOKEN_TYPE_REGISTERED: Code = Code::new("I010");

    // Tokenization success codes
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");

    // Parse success codes
    pub const PARSE_COMPLETE: Code = Code::new("I040");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "Contact system administrator or file bug report",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check system configuration and dependencies",
            ),
        );

        // Token registry errors
        registry.insert(
            "E010",
            ErrorMetadata::new(
                "E010",
                "Registry",
                Severity::Medium,
                true,
                false,
                "Token type pattern failed to compile",
                "Fix the regular expression supplied for the token type",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "Registry",
                Severity::Medium,
                true,
                false,
                "Token type registered while a parse is running",
                "Register all token types before calling parse",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "Registry",
                Severity::High,
                false,
                true,
                "Registry contains too many token types",
                "Reduce the number of registered token types",
            ),
        );
        registry.insert(
            "E013",
            ErrorMetadata::new(
                "E013",
                "Registry",
                Severity::Low,
                true,
                false,
                "Token type name exceeds maximum allowed length",
                "Shorten the token type name",
            ),
        );

        // Tokenization errors
        registry.insert(
            "E020",
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "No registered token type matches the input",
                "Register a token type that covers the offending text",
            ),
        );
        registry.insert(
            "E021",
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Matcher read past the end of its candidate text",
                "Bound matcher reads with remaining() or peek checks",
            ),
        );
        registry.insert(
            "E022",
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Matcher routine aborted with a fatal error",
                "Inspect the matcher routine for the reported failure",
            ),
        );
        registry.insert(
            "E023",
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::High,
                false,
                true,
                "Input produced too many tokens, possible DoS attack",
                "Reduce input complexity or increase token limits",
            ),
        );
        registry.insert(
            "E024",
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Input exceeds maximum size limit",
                "Reduce input size or increase processing limits",
            ),
        );
        registry.insert(
            "E025",
            ErrorMetadata::new(
                "E025",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Matcher reported a match of zero consumed length",
                "Ensure matcher routines consume at least one character on success",
            ),
        );

        registry.insert(
            "E026",
            ErrorMetadata::new(
                "E026",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Token value exceeds maximum size limit",
                "Reduce token size or increase the token value limit",
            ),
        );

        // Parse facade errors
        registry.insert(
            "E040",
            ErrorMetadata::new(
                "E040",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Unexpected token during parsing",
                "Check token sequence and grammar compliance",
            ),
        );
        registry.insert(
            "E041",
            ErrorMetadata::new(
                "E041",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Token buffer exhausted while more input was expected",
                "Ensure the input is complete for the grammar",
            ),
        );
        registry.insert(
            "E042",
            ErrorMetadata::new(
                "E042",
                "Syntax",
                Severity::High,
                true,
                false,
                "Token access attempted outside an active parse",
                "Call token operations only from within the grammar function",
            ),
        );
        registry.insert(
            "E043",
            ErrorMetadata::new(
                "E043",
                "Syntax",
                Severity::High,
                true,
                false,
                "Parse invoked while another parse is already running",
                "Wait for the active parse to finish before starting another",
            ),
        );
        registry.insert(
            "E044",
            ErrorMetadata::new(
                "E044",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Grammar function reported a domain-specific failure",
                "Check the grammar function error message for details",
            ),
        );

        // Success codes
        registry.insert(
            "I004",
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "System initialization completed successfully",
                "Continue normal operation",
            ),
        );
        registry.insert(
            "I020",
            ErrorMetadata::new(
                "I020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Tokenization completed successfully",
                "Continue to parsing stage",
            ),
        );
        registry.insert(
            "I040",
            ErrorMetadata::new(
                "I040",
                "Syntax",
                Severity::Low,
                true,
                false,
                "Parse completed successfully",
                "Consume the grammar result",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
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

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        let code = lexical::UNDEFINED_TOKEN;
        assert_eq!(code.as_str(), "E020");
        assert_eq!(format!("{}", code), "E020");
    }

    #[test]
    fn test_metadata_lookup() {
        let metadata = get_error_metadata("E011").unwrap();
        assert_eq!(metadata.category, "Registry");
        assert_eq!(metadata.severity, Severity::Medium);
        assert!(metadata.recoverable);
    }

    #[test]
    fn test_halt_classification() {
        assert!(requires_halt("E024"));
        assert!(requires_halt("ERR001"));
        assert!(!requires_halt("E040"));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_severity("E999"), Severity::Medium);
        assert!(is_recoverable("E999"));
        assert!(!requires_halt("E999"));
    }
}
