//! Token production over the registered token types
//!
//! The whole source is tokenized eagerly before any grammar logic runs;
//! parsing never interleaves with tokenization.

use crate::config::compile_time::lexical::{
    MAX_SOURCE_SIZE, MAX_TOKEN_COUNT, MAX_TOKEN_VALUE_SIZE,
};
use crate::config::runtime::TokenizerPreferences;
use crate::logging::codes::{self, Code};
use crate::tokens::{MatchReport, Matcher, Token, TokenBuffer, TokenRegistry, TokenTypeDef};
use crate::utils::{Position, SourceMap, Span};
use crate::{log_debug, log_error, log_performance, log_warning};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised during tokenization or inside matcher routines.
///
/// Every variant is fatal for the current parse invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexicalError {
    #[error("No token type matches input at {span}: '{snippet}'")]
    UndefinedToken { snippet: String, span: Span },

    #[error("Matcher read past the end of input at character index {index}")]
    ReadPastEnd { index: usize },

    #[error("Matcher routine aborted: {message}")]
    MatcherAborted { message: String },

    #[error("Input produced more than {max} tokens")]
    TooManyTokens { max: usize },

    #[error("Input is {size} bytes, exceeding the maximum of {max}")]
    SourceTooLarge { size: usize, max: usize },

    #[error("Token value is {length} bytes, exceeding the maximum of {max}")]
    TokenValueTooLarge { length: usize, max: usize },
}

impl LexicalError {
    /// Construct a matcher abort with a custom message.
    ///
    /// Matcher routines use this to raise domain-specific failures such as
    /// an unterminated literal.
    pub fn aborted(message: impl Into<String>) -> Self {
        LexicalError::MatcherAborted {
            message: message.into(),
        }
    }

    /// Get the error code for this lexical error
    pub fn error_code(&self) -> Code {
        match self {
            LexicalError::UndefinedToken { .. } => codes::lexical::UNDEFINED_TOKEN,
            LexicalError::ReadPastEnd { .. } => codes::lexical::READ_PAST_END,
            LexicalError::MatcherAborted { .. } => codes::lexical::MATCHER_ABORTED,
            LexicalError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexicalError::SourceTooLarge { .. } => codes::lexical::SOURCE_TOO_LARGE,
            LexicalError::TokenValueTooLarge { .. } => codes::lexical::TOKEN_VALUE_TOO_LARGE,
        }
    }

    /// Get span information if available
    pub fn span(&self) -> Option<Span> {
        match self {
            LexicalError::UndefinedToken { span, .. } => Some(*span),
            _ => None,
        }
    }
}

/// Statistics collected during one tokenization run
#[derive(Debug, Clone, Default)]
pub struct TokenizerMetrics {
    pub total_tokens: usize,
    pub hidden_tokens: usize,
    pub discarded_matches: usize,
    pub pattern_matches: usize,
    pub programmable_matches: usize,
    pub source_bytes: usize,
    /// Per-type emit counts, populated only when type usage tracking is on
    pub type_usage: HashMap<String, usize>,
}

/// Eager tokenizer: builds the complete lookahead buffer in one pass.
#[derive(Debug)]
pub struct Tokenizer {
    buffer: TokenBuffer,
    metrics: TokenizerMetrics,
}

impl Tokenizer {
    /// Tokenize the whole source against the registry.
    ///
    /// Definitions are tried in registration order at each position and the
    /// first match of length >= 1 wins. Matches from unnamed definitions,
    /// and matches whose value is empty, consume input without emitting a
    /// token.
    pub fn initialize(
        registry: &TokenRegistry,
        source: &str,
        preferences: &TokenizerPreferences,
    ) -> Result<Self, LexicalError> {
        if source.len() > MAX_SOURCE_SIZE {
            let error = LexicalError::SourceTooLarge {
                size: source.len(),
                max: MAX_SOURCE_SIZE,
            };
            log_error!(error.error_code(), &error.to_string(),
                "size" => source.len(),
                "limit" => MAX_SOURCE_SIZE
            );
            return Err(error);
        }

        log_debug!("Starting tokenization",
            "source_bytes" => source.len(),
            "token_types" => registry.len()
        );

        let start_time = std::time::Instant::now();
        let mut tokens: Vec<Token> = Vec::new();
        let mut metrics = TokenizerMetrics {
            source_bytes: source.len(),
            ..Default::default()
        };
        let mut position = Position::start();

        while position.offset < source.len() {
            let input = &source[position.offset..];
            let Some((def, report)) = Self::match_at(registry, input)? else {
                return Err(Self::undefined_token(source, position, preferences));
            };

            if report.value.len() > MAX_TOKEN_VALUE_SIZE {
                let error = LexicalError::TokenValueTooLarge {
                    length: report.value.len(),
                    max: MAX_TOKEN_VALUE_SIZE,
                };
                log_error!(error.error_code(), &error.to_string());
                return Err(error);
            }

            if preferences.collect_detailed_metrics {
                match def.matcher {
                    Matcher::Pattern(_) => metrics.pattern_matches += 1,
                    Matcher::Programmable(_) => metrics.programmable_matches += 1,
                }
            }

            let start = position;
            position = position.advance_str(&input[..report.length]);

            // Unnamed definitions and empty values consume without emitting
            if def.name.is_none() || report.value.is_empty() {
                metrics.discarded_matches += 1;
                continue;
            }

            let name = def.name.clone().unwrap_or_default();
            if def.hidden {
                metrics.hidden_tokens += 1;
            }
            if preferences.track_type_usage {
                *metrics.type_usage.entry(name.clone()).or_insert(0) += 1;
            }

            tokens.push(Token::new(
                name,
                report.value,
                def.hidden,
                Span::new(start, position),
            ));

            if tokens.len() > MAX_TOKEN_COUNT {
                let error = LexicalError::TooManyTokens {
                    max: MAX_TOKEN_COUNT,
                };
                log_error!(error.error_code(), &error.to_string(),
                    "limit" => MAX_TOKEN_COUNT
                );
                return Err(error);
            }
        }

        metrics.total_tokens = tokens.len();

        if preferences.log_token_statistics {
            log_performance!(codes::success::TOKENIZATION_COMPLETE, "Tokenization complete",
                duration = start_time.elapsed(),
                "tokens" => metrics.total_tokens,
                "hidden" => metrics.hidden_tokens,
                "discarded" => metrics.discarded_matches
            );
        }

        Ok(Self {
            buffer: TokenBuffer::new(tokens),
            metrics,
        })
    }

    /// First definition matching at the start of `input`, with its report
    fn match_at<'r>(
        registry: &'r TokenRegistry,
        input: &str,
    ) -> Result<Option<(&'r TokenTypeDef, MatchReport)>, LexicalError> {
        for def in registry.defs() {
            let outcome = match def.matcher.apply(input) {
                Ok(outcome) => outcome,
                Err(error) => {
                    log_error!(error.error_code(), &error.to_string());
                    return Err(error);
                }
            };

            match outcome {
                Some(report) if report.length > 0 => return Ok(Some((def, report))),
                Some(report) => {
                    // Unreachable under the documented matcher contracts
                    if !report.value.is_empty() {
                        log_warning!("Zero-length match with non-empty value treated as non-match",
                            "value" => report.value
                        );
                    }
                }
                None => {}
            }
        }
        Ok(None)
    }

    fn undefined_token(
        source: &str,
        position: Position,
        preferences: &TokenizerPreferences,
    ) -> LexicalError {
        let rest = &source[position.offset..];
        let snippet: String = rest.chars().take(16).collect();
        let span = match rest.chars().next() {
            Some(ch) => Span::single(position, ch),
            None => Span::new(position, position),
        };
        let error = LexicalError::UndefinedToken {
            snippet: snippet.clone(),
            span,
        };

        if preferences.include_position_in_errors {
            let source_map = SourceMap::new(source.to_string());
            log_error!(error.error_code(), &error.to_string(), span = span,
                "context" => source_map.format_error(&span, "undefined token")
            );
        } else {
            log_error!(error.error_code(), &error.to_string(), "snippet" => snippet);
        }

        error
    }

    /// Token at `read_cursor + offset`, hidden or not, without side effects
    pub fn peek_token(&self, offset: usize) -> Option<&Token> {
        self.buffer.peek_raw(offset)
    }

    /// Token at the read cursor; advances the cursor past it
    pub fn next_token(&mut self) -> Option<Token> {
        self.buffer.next_token()
    }

    /// True iff every buffered token has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.buffer.remaining() == 0
    }

    /// Metrics collected during initialization
    pub fn metrics(&self) -> &TokenizerMetrics {
        &self.metrics
    }

    /// The underlying lookahead buffer
    pub fn buffer(&self) -> &TokenBuffer {
        &self.buffer
    }
}
