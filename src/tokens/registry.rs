//! Ordered token type registry and the two matching strategies

use crate::config::compile_time::registry::{MAX_NAME_LENGTH, MAX_TOKEN_TYPES};
use crate::lexical::LexicalError;
use crate::logging::codes::{self, Code};
use crate::matcher::{CharCursor, MatchOutcome, MatcherRoutine};
use regex::Regex;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Errors raised while building the registry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid token pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Cannot register token type '{name}' while a parse is running")]
    RegistrationWhileParsing { name: String },

    #[error("Registry already holds {count} token types, the maximum")]
    TooManyTokenTypes { count: usize },

    #[error("Token type name is {length} bytes, exceeding the maximum of {max}")]
    NameTooLong { length: usize, max: usize },
}

impl RegistryError {
    /// Get the error code for this registry error
    pub fn error_code(&self) -> Code {
        match self {
            RegistryError::InvalidPattern { .. } => codes::registry::INVALID_PATTERN,
            RegistryError::RegistrationWhileParsing { .. } => {
                codes::registry::REGISTRATION_WHILE_PARSING
            }
            RegistryError::TooManyTokenTypes { .. } => codes::registry::TOO_MANY_TOKEN_TYPES,
            RegistryError::NameTooLong { .. } => codes::registry::NAME_TOO_LONG,
        }
    }
}

/// Result of applying a matcher to the unconsumed remainder of the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    /// The matched value (may be empty for omit-only programmable matches)
    pub value: String,
    /// Consumed length in bytes
    pub length: usize,
}

/// A token matching strategy: a fixed anchored pattern or a programmable
/// character-level routine
#[derive(Clone)]
pub enum Matcher {
    Pattern(Regex),
    Programmable(Rc<MatcherRoutine>),
}

impl Matcher {
    /// Compile a fixed pattern matcher.
    ///
    /// The pattern is applied anchored at the start of the unconsumed
    /// remainder; a leading `^` is therefore optional.
    pub fn pattern(pattern: &str) -> Result<Self, RegistryError> {
        let regex = Regex::new(pattern).map_err(|e| RegistryError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Matcher::Pattern(regex))
    }

    /// Wrap a programmable matcher routine
    pub fn routine<F>(routine: F) -> Self
    where
        F: Fn(&mut CharCursor) -> Result<MatchOutcome, LexicalError> + 'static,
    {
        Matcher::Programmable(Rc::new(routine))
    }

    /// Apply this matcher to the start of `input`.
    ///
    /// `Ok(None)` means no match; `Err(_)` aborts the whole tokenization run.
    pub fn apply(&self, input: &str) -> Result<Option<MatchReport>, LexicalError> {
        match self {
            Matcher::Pattern(regex) => {
                let report = regex
                    .find(input)
                    .filter(|m| m.start() == 0)
                    .map(|m| MatchReport {
                        value: m.as_str().to_string(),
                        length: m.as_str().len(),
                    });
                Ok(report)
            }
            Matcher::Programmable(routine) => {
                let mut cursor = CharCursor::new(input);
                match routine(&mut cursor)? {
                    MatchOutcome::Match => {
                        let length = cursor.consumed_bytes();
                        Ok(Some(MatchReport {
                            value: cursor.into_value(),
                            length,
                        }))
                    }
                    MatchOutcome::NoMatch => Ok(None),
                }
            }
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Matcher::Programmable(_) => f.write_str("Programmable(..)"),
        }
    }
}

/// A registered token definition
#[derive(Debug, Clone)]
pub struct TokenTypeDef {
    /// `None` marks a discard definition: matches consume input but never
    /// emit a token
    pub name: Option<String>,
    pub matcher: Matcher,
    pub hidden: bool,
}

/// Ordered list of token type definitions. Registration order is
/// significant: the first definition that matches wins.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    defs: Vec<TokenTypeDef>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self { defs: Vec::new() }
    }

    /// Append a token type definition
    pub fn register(
        &mut self,
        name: Option<&str>,
        matcher: Matcher,
        hidden: bool,
    ) -> Result<(), RegistryError> {
        if self.defs.len() >= MAX_TOKEN_TYPES {
            return Err(RegistryError::TooManyTokenTypes {
                count: self.defs.len(),
            });
        }

        if let Some(name) = name {
            if name.len() > MAX_NAME_LENGTH {
                return Err(RegistryError::NameTooLong {
                    length: name.len(),
                    max: MAX_NAME_LENGTH,
                });
            }
        }

        self.defs.push(TokenTypeDef {
            name: name.map(|n| n.to_string()),
            matcher,
            hidden,
        });

        Ok(())
    }

    /// Definitions in registration order
    pub fn defs(&self) -> &[TokenTypeDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_pattern_matches_anchored_at_start() {
        let matcher = Matcher::pattern(r"\d+").unwrap();

        let report = matcher.apply("42abc").unwrap().unwrap();
        assert_eq!(report.value, "42");
        assert_eq!(report.length, 2);

        // A match later in the input does not count
        assert_eq!(matcher.apply("abc42").unwrap(), None);
    }

    #[test]
    fn test_explicit_anchor_behaves_identically() {
        let anchored = Matcher::pattern(r"^\d+").unwrap();
        let bare = Matcher::pattern(r"\d+").unwrap();

        assert_eq!(anchored.apply("7x").unwrap(), bare.apply("7x").unwrap());
        assert_eq!(anchored.apply("x7").unwrap(), None);
        assert_eq!(bare.apply("x7").unwrap(), None);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = Matcher::pattern("[unclosed");
        assert_matches!(result, Err(RegistryError::InvalidPattern { .. }));
    }

    #[test]
    fn test_programmable_matcher_reports_value_and_length() {
        let matcher = Matcher::routine(|cursor| {
            while !cursor.is_eof() && cursor.read_char_if("0123456789")?.is_some() {}
            if cursor.value().is_empty() {
                Ok(MatchOutcome::NoMatch)
            } else {
                Ok(MatchOutcome::Match)
            }
        });

        let report = matcher.apply("123x").unwrap().unwrap();
        assert_eq!(report.value, "123");
        assert_eq!(report.length, 3);

        assert_eq!(matcher.apply("x123").unwrap(), None);
    }

    #[test]
    fn test_programmable_matcher_error_propagates() {
        let matcher = Matcher::routine(|cursor| {
            // Always reads, even at end of input
            cursor.read_char()?;
            cursor.read_char()?;
            Ok(MatchOutcome::Match)
        });

        assert_matches!(matcher.apply("x"), Err(LexicalError::ReadPastEnd { .. }));
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = TokenRegistry::new();
        registry
            .register(Some("A"), Matcher::pattern("a").unwrap(), false)
            .unwrap();
        registry
            .register(Some("B"), Matcher::pattern("b").unwrap(), true)
            .unwrap();
        registry
            .register(None, Matcher::pattern(r"\s+").unwrap(), false)
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.defs()[0].name.as_deref(), Some("A"));
        assert!(registry.defs()[1].hidden);
        assert_eq!(registry.defs()[2].name, None);
    }

    #[test]
    fn test_name_length_limit() {
        let mut registry = TokenRegistry::new();
        let long_name = "X".repeat(MAX_NAME_LENGTH + 1);

        let result = registry.register(Some(&long_name), Matcher::pattern("x").unwrap(), false);
        assert_matches!(result, Err(RegistryError::NameTooLong { .. }));
    }

    #[test]
    fn test_error_codes() {
        let err = RegistryError::InvalidPattern {
            pattern: "[".to_string(),
            reason: "unclosed class".to_string(),
        };
        assert_eq!(err.error_code().as_str(), "E010");

        let err = RegistryError::RegistrationWhileParsing {
            name: "NUMBER".to_string(),
        };
        assert_eq!(err.error_code().as_str(), "E011");
    }
}
