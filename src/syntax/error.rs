//! Parse facade error types

use crate::lexical::LexicalError;
use crate::logging::codes::{self, Code};
use crate::tokens::RegistryError;
use crate::utils::Span;
use thiserror::Error;

/// Result type for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised by the parser facade or propagated from beneath it.
///
/// Every variant is fatal for the current parse invocation; the facade
/// guarantees the parsing mode is reset before the error reaches the
/// caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Lexical(#[from] LexicalError),

    #[error("Expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input while reading {expected}")]
    UnexpectedEndOfInput { expected: String },

    #[error("'{operation}' called outside of an active parse")]
    NotParsing { operation: &'static str },

    #[error("parse called while another parse is already running")]
    AlreadyParsing,

    #[error("{message}")]
    Grammar { message: String },
}

impl ParseError {
    /// Raise a domain-specific failure from inside a grammar function.
    ///
    /// Grammar errors propagate through the facade unchanged.
    pub fn grammar(message: impl Into<String>) -> Self {
        ParseError::Grammar {
            message: message.into(),
        }
    }

    /// Get the error code for this parse error
    pub fn error_code(&self) -> Code {
        match self {
            ParseError::Registry(e) => e.error_code(),
            ParseError::Lexical(e) => e.error_code(),
            ParseError::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            ParseError::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            ParseError::NotParsing { .. } => codes::syntax::NOT_PARSING,
            ParseError::AlreadyParsing => codes::syntax::ALREADY_PARSING,
            ParseError::Grammar { .. } => codes::syntax::GRAMMAR_ERROR,
        }
    }

    /// Get span information if available
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Lexical(e) => e.span(),
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            _ => None,
        }
    }

    /// Check if this error is recoverable per the code registry
    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ParseError::AlreadyParsing.error_code().as_str(),
            "E043"
        );
        assert_eq!(
            ParseError::NotParsing { operation: "peek" }
                .error_code()
                .as_str(),
            "E042"
        );
        assert_eq!(ParseError::grammar("oops").error_code().as_str(), "E044");
    }

    #[test]
    fn test_wrapped_errors_keep_their_codes() {
        let lexical: ParseError = LexicalError::ReadPastEnd { index: 3 }.into();
        assert_eq!(lexical.error_code().as_str(), "E021");

        let registry: ParseError = RegistryError::RegistrationWhileParsing {
            name: "NUMBER".to_string(),
        }
        .into();
        assert_eq!(registry.error_code().as_str(), "E011");
    }

    #[test]
    fn test_span_availability() {
        let err = ParseError::UnexpectedToken {
            expected: ";".to_string(),
            found: "NUMBER".to_string(),
            span: Span::dummy(),
        };
        assert!(err.span().is_some());
        assert!(ParseError::AlreadyParsing.span().is_none());
    }

    #[test]
    fn test_grammar_message_display() {
        let err = ParseError::grammar("duplicate key 'x'");
        assert_eq!(format!("{}", err), "duplicate key 'x'");
    }
}
