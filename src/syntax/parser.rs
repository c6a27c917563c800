//! Parser facade: registry building, mode enforcement, and mediated token
//! access for a user-supplied grammar function

use super::error::{ParseError, ParseResult};
use crate::config::runtime::{FacadePreferences, TokenizerPreferences};
use crate::lexical::Tokenizer;
use crate::logging::{self, codes};
use crate::tokens::{Matcher, RegistryError, Token, TokenRegistry};
use crate::{log_debug, log_error, log_performance, log_success};
use std::time::Instant;

type GrammarFn<T> = Box<dyn FnMut(&mut Parser<T>) -> ParseResult<T>>;

/// The user-facing entry point of the framework.
///
/// A `Parser` owns the token registry and, during a `parse` call, the
/// lookahead buffer for that invocation. The grammar function supplied at
/// construction receives the parser back as its argument and drives token
/// consumption through `peek`, `read`, `is_eof` and `is_peek_type`.
///
/// The parsing flag is a non-reentrant lock: token access requires an
/// active parse, registration requires no active parse, and a nested
/// `parse` call is rejected. The flag is reset on every exit path.
pub struct Parser<T> {
    main: Option<GrammarFn<T>>,
    registry: TokenRegistry,
    tokenizer: Option<Tokenizer>,
    parsing: bool,
    parse_count: u64,
    preferences: FacadePreferences,
    tokenizer_preferences: TokenizerPreferences,
}

impl<T> Parser<T> {
    /// Create a parser around a grammar function.
    ///
    /// The grammar function is invoked once per `parse` call, after the
    /// whole source has been tokenized. Its return value is the parse
    /// result; the framework imposes no schema on it.
    pub fn new<F>(main: F) -> Self
    where
        F: FnMut(&mut Parser<T>) -> ParseResult<T> + 'static,
    {
        Self {
            main: Some(Box::new(main)),
            registry: TokenRegistry::new(),
            tokenizer: None,
            parsing: false,
            parse_count: 0,
            preferences: FacadePreferences::default(),
            tokenizer_preferences: TokenizerPreferences::default(),
        }
    }

    /// Replace the default runtime preferences
    pub fn with_preferences(
        mut self,
        facade: FacadePreferences,
        tokenizer: TokenizerPreferences,
    ) -> Self {
        self.preferences = facade;
        self.tokenizer_preferences = tokenizer;
        self
    }

    /// Register a token type.
    ///
    /// `name: None` registers a discard definition whose matches consume
    /// input without emitting tokens. Fails while a parse is running.
    pub fn register_token(
        &mut self,
        name: Option<&str>,
        matcher: Matcher,
    ) -> Result<(), RegistryError> {
        self.register(name, matcher, false)
    }

    /// Register a hidden token type: invisible to peeking, consumable by an
    /// explicit `read` of its name
    pub fn register_hidden_token(
        &mut self,
        name: &str,
        matcher: Matcher,
    ) -> Result<(), RegistryError> {
        self.register(Some(name), matcher, true)
    }

    fn register(
        &mut self,
        name: Option<&str>,
        matcher: Matcher,
        hidden: bool,
    ) -> Result<(), RegistryError> {
        if self.parsing {
            let error = RegistryError::RegistrationWhileParsing {
                name: name.unwrap_or("<discard>").to_string(),
            };
            log_error!(error.error_code(), &error.to_string());
            return Err(error);
        }
        self.registry.register(name, matcher, hidden)?;
        log_success!(codes::success::TOKEN_TYPE_REGISTERED, "Token type registered",
            "name" => name.unwrap_or("<discard>"),
            "hidden" => hidden
        );
        Ok(())
    }

    /// Registered token type definitions
    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Tokenize `source` and run the grammar function over the result.
    ///
    /// All-or-nothing: any failure aborts the invocation, and no state
    /// except the registry survives to the next call.
    pub fn parse(&mut self, source: &str) -> ParseResult<T> {
        if self.parsing {
            let error = ParseError::AlreadyParsing;
            log_error!(error.error_code(), &error.to_string());
            return Err(error);
        }

        self.parsing = true;
        self.parse_count += 1;
        logging::set_parse_context(format!("source({}B)", source.len()), self.parse_count);

        // Cleanup runs in the guard's Drop, so the mode reset holds even
        // when the grammar function unwinds
        let main = self.main.take();
        let mut active = ActiveParse { parser: self, main };
        active.run(source)
    }

    /// Next non-hidden token at or after `offset` raw positions past the
    /// read cursor, without consuming anything.
    ///
    /// Hidden tokens are looked through at every offset; `Ok(None)` means
    /// the buffer holds nothing visible from there on.
    pub fn peek(&self, offset: usize) -> ParseResult<Option<Token>> {
        let tokenizer = self.active_tokenizer("peek")?;

        let mut offset = offset;
        loop {
            match tokenizer.peek_token(offset) {
                None => return Ok(None),
                Some(token) if token.hidden => offset += 1,
                Some(token) => return Ok(Some(token.clone())),
            }
        }
    }

    /// True iff no visible token remains
    pub fn is_eof(&self) -> ParseResult<bool> {
        Ok(self.peek(0)?.is_none())
    }

    /// True iff `peek(offset)` yields a token of type `name`
    pub fn is_peek_type(&self, name: &str, offset: usize) -> ParseResult<bool> {
        Ok(self
            .peek(offset)?
            .map(|token| token.name == name)
            .unwrap_or(false))
    }

    /// Consume and return the next token of type `name`.
    ///
    /// Hidden tokens of other types are consumed silently on the way; a
    /// hidden token of the requested type is returned like any other. The
    /// read cursor advances permanently past everything consumed.
    pub fn read(&mut self, name: &str) -> ParseResult<Token> {
        if !self.parsing {
            return Err(ParseError::NotParsing { operation: "read" });
        }
        let Some(tokenizer) = self.tokenizer.as_mut() else {
            return Err(ParseError::NotParsing { operation: "read" });
        };

        loop {
            let Some(token) = tokenizer.next_token() else {
                return Err(ParseError::UnexpectedEndOfInput {
                    expected: name.to_string(),
                });
            };

            if token.hidden && token.name != name {
                continue;
            }

            if token.name != name {
                let found = if self.preferences.include_token_values_in_errors {
                    format!("{} ({:?})", token.name, token.value)
                } else {
                    token.name.clone()
                };
                return Err(ParseError::UnexpectedToken {
                    expected: name.to_string(),
                    found,
                    span: token.span,
                });
            }

            return Ok(token);
        }
    }

    fn active_tokenizer(&self, operation: &'static str) -> ParseResult<&Tokenizer> {
        if !self.parsing {
            return Err(ParseError::NotParsing { operation });
        }
        self.tokenizer
            .as_ref()
            .ok_or(ParseError::NotParsing { operation })
    }
}

/// One parse invocation in flight.
///
/// Holds the grammar function for the duration of the call and resets the
/// facade in `Drop`: the parsing flag, the lookahead buffer, and the parse
/// context are cleared on normal return, on error, and on unwind alike.
struct ActiveParse<'a, T> {
    parser: &'a mut Parser<T>,
    main: Option<GrammarFn<T>>,
}

impl<T> ActiveParse<'_, T> {
    fn run(&mut self, source: &str) -> ParseResult<T> {
        let start_time = Instant::now();

        if self.parser.preferences.log_parse_events {
            log_debug!("Parse started",
                "source_bytes" => source.len(),
                "token_types" => self.parser.registry.len()
            );
        }

        let tokenizer = Tokenizer::initialize(
            &self.parser.registry,
            source,
            &self.parser.tokenizer_preferences,
        )?;
        self.parser.tokenizer = Some(tokenizer);

        let Some(main) = self.main.as_mut() else {
            return Err(ParseError::grammar("grammar function is not available"));
        };
        let result = main(&mut *self.parser);

        if self.parser.preferences.log_parse_events {
            match &result {
                Ok(_) => {
                    log_performance!(codes::success::PARSE_COMPLETE, "Parse complete",
                        duration = start_time.elapsed()
                    );
                }
                Err(error) => {
                    log_error!(error.error_code(), &error.to_string());
                }
            }
        }

        result
    }
}

impl<T> Drop for ActiveParse<'_, T> {
    fn drop(&mut self) {
        if let Some(main) = self.main.take() {
            self.parser.main = Some(main);
        }
        self.parser.tokenizer = None;
        self.parser.parsing = false;
        logging::clear_parse_context();
    }
}

impl<T> std::fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("registry", &self.registry)
            .field("parsing", &self.parsing)
            .field("parse_count", &self.parse_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexicalError;
    use crate::matcher::MatchOutcome;
    use assert_matches::assert_matches;

    fn register_number<T>(parser: &mut Parser<T>) {
        parser
            .register_token(Some("NUMBER"), Matcher::pattern(r"\d+").unwrap())
            .unwrap();
        parser
            .register_token(None, Matcher::pattern(r" +").unwrap())
            .unwrap();
    }

    #[test]
    fn test_read_number() {
        let mut parser = Parser::new(|p: &mut Parser<Token>| p.read("NUMBER"));
        register_number(&mut parser);

        let token = parser.parse("5").unwrap();
        assert_eq!(token.name, "NUMBER");
        assert_eq!(token.value, "5");
    }

    #[test]
    fn test_grammar_result_passthrough() {
        let mut parser = Parser::new(|p: &mut Parser<Vec<String>>| {
            let mut values = Vec::new();
            while !p.is_eof()? {
                values.push(p.read("NUMBER")?.value);
            }
            Ok(values)
        });
        parser
            .register_token(Some("NUMBER"), Matcher::pattern(r"\d+").unwrap())
            .unwrap();
        parser
            .register_token(None, Matcher::pattern(r" +").unwrap())
            .unwrap();

        assert_eq!(parser.parse("1 22 333").unwrap(), vec!["1", "22", "333"]);
    }

    #[test]
    fn test_discard_only_input_is_immediately_eof() {
        let mut parser = Parser::new(|p: &mut Parser<bool>| p.is_eof());
        parser
            .register_token(None, Matcher::pattern(r"\s+").unwrap())
            .unwrap();

        assert!(parser.parse("   ").unwrap());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut parser = Parser::new(|p: &mut Parser<Token>| {
            assert_eq!(p.peek(0)?.unwrap().value, "7");
            assert_eq!(p.peek(0)?.unwrap().value, "7");
            p.read("NUMBER")
        });
        register_number(&mut parser);

        assert_eq!(parser.parse("7").unwrap().value, "7");
    }

    #[test]
    fn test_hidden_transparency_at_any_offset() {
        let mut parser = Parser::new(|p: &mut Parser<()>| {
            // Raw buffer: NUMBER, hidden ;, NUMBER, hidden ;, NUMBER
            assert_eq!(p.peek(0)?.unwrap().value, "1");
            assert_eq!(p.peek(1)?.unwrap().value, "2");
            assert_eq!(p.peek(2)?.unwrap().value, "2");
            assert_eq!(p.peek(3)?.unwrap().value, "3");
            assert!(p.peek(5)?.is_none());

            // Never a hidden token, at any offset
            for offset in 0..6 {
                if let Some(token) = p.peek(offset)? {
                    assert!(!token.hidden);
                }
            }
            Ok(())
        });
        register_number(&mut parser);
        parser
            .register_hidden_token(";", Matcher::pattern(r"\n+").unwrap())
            .unwrap();

        parser.parse("1\n2\n3").unwrap();
    }

    #[test]
    fn test_hidden_fallback_on_read() {
        let mut parser = Parser::new(|p: &mut Parser<()>| {
            p.read("NUMBER")?;
            // Explicitly reading the hidden type consumes it
            let semi = p.read(";")?;
            assert!(semi.hidden);
            assert_eq!(semi.value, "\n");
            p.read("NUMBER")?;
            Ok(())
        });
        register_number(&mut parser);
        parser
            .register_hidden_token(";", Matcher::pattern(r"\n+").unwrap())
            .unwrap();

        parser.parse("1\n2").unwrap();
    }

    #[test]
    fn test_hidden_skipped_when_reading_other_type() {
        let mut parser = Parser::new(|p: &mut Parser<()>| {
            p.read("NUMBER")?;
            // The newline between the numbers is skipped silently
            p.read("NUMBER")?;
            Ok(())
        });
        register_number(&mut parser);
        parser
            .register_hidden_token(";", Matcher::pattern(r"\n+").unwrap())
            .unwrap();

        parser.parse("1\n2").unwrap();
    }

    #[test]
    fn test_explicit_semicolon_or_hidden_newline() {
        // The ';' terminator is acceptable both as the literal token and as
        // a hidden newline consumed through the fallback
        let grammar = |p: &mut Parser<Vec<String>>| {
            let mut values = Vec::new();
            loop {
                values.push(p.read("NUMBER")?.value);
                if p.is_eof()? {
                    break;
                }
                p.read(";")?;
            }
            Ok(values)
        };

        let mut parser = Parser::new(grammar);
        parser
            .register_token(Some("NUMBER"), Matcher::pattern(r"\d+").unwrap())
            .unwrap();
        parser
            .register_token(Some(";"), Matcher::pattern(";").unwrap())
            .unwrap();
        parser
            .register_hidden_token(";", Matcher::pattern(r"\n+").unwrap())
            .unwrap();

        assert_eq!(parser.parse("1;2").unwrap(), vec!["1", "2"]);
        assert_eq!(parser.parse("1\n2").unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn test_unexpected_token() {
        let mut parser = Parser::new(|p: &mut Parser<Token>| p.read("STRING"));
        register_number(&mut parser);
        parser
            .register_token(Some("STRING"), Matcher::pattern("[a-z]+").unwrap())
            .unwrap();

        let error = parser.parse("42").unwrap_err();
        assert_matches!(
            error,
            ParseError::UnexpectedToken { ref expected, .. } if expected == "STRING"
        );
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let mut parser = Parser::new(|p: &mut Parser<()>| {
            p.read("NUMBER")?;
            p.read("NUMBER")?;
            Ok(())
        });
        register_number(&mut parser);

        let error = parser.parse("1").unwrap_err();
        assert_matches!(
            error,
            ParseError::UnexpectedEndOfInput { ref expected } if expected == "NUMBER"
        );
    }

    #[test]
    fn test_mode_gating_outside_parse() {
        let parser = Parser::new(|p: &mut Parser<Token>| p.read("NUMBER"));

        assert_matches!(
            parser.peek(0),
            Err(ParseError::NotParsing { operation: "peek" })
        );
        assert_matches!(parser.is_eof(), Err(ParseError::NotParsing { .. }));
        assert_matches!(
            parser.is_peek_type("NUMBER", 0),
            Err(ParseError::NotParsing { .. })
        );

        let mut parser = parser;
        assert_matches!(
            parser.read("NUMBER"),
            Err(ParseError::NotParsing { operation: "read" })
        );
    }

    #[test]
    fn test_registration_rejected_during_parse() {
        let mut parser = Parser::new(|p: &mut Parser<()>| {
            let result = p.register_token(Some("LATE"), Matcher::pattern("x").unwrap());
            assert_matches!(result, Err(RegistryError::RegistrationWhileParsing { .. }));
            Ok(())
        });
        register_number(&mut parser);

        parser.parse("1").unwrap();
    }

    #[test]
    fn test_non_reentrancy() {
        let mut parser = Parser::new(|p: &mut Parser<()>| {
            let nested = p.parse("2");
            assert_matches!(nested, Err(ParseError::AlreadyParsing));
            Ok(())
        });
        register_number(&mut parser);

        parser.parse("1").unwrap();
    }

    #[test]
    fn test_mode_reset_after_failure() {
        let mut parser = Parser::new(|p: &mut Parser<Token>| p.read("NUMBER"));
        register_number(&mut parser);

        // Lexical failure: '%' is undefined
        assert_matches!(
            parser.parse("%"),
            Err(ParseError::Lexical(LexicalError::UndefinedToken { .. }))
        );

        // The facade is not locked: registration and parsing both work again
        parser
            .register_token(Some("PERCENT"), Matcher::pattern("%").unwrap())
            .unwrap();
        assert_eq!(parser.parse("5").unwrap().value, "5");
    }

    #[test]
    fn test_mode_reset_after_grammar_panic() {
        let mut calls = 0;
        let mut parser = Parser::new(move |p: &mut Parser<String>| {
            calls += 1;
            if calls == 1 {
                panic!("grammar function failed");
            }
            Ok(p.read("NUMBER")?.value)
        });
        register_number(&mut parser);

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| parser.parse("1")));
        assert!(unwound.is_err());
        assert!(logging::get_current_parse_context().is_none());

        // An unwinding grammar function must not lock the facade: the
        // parsing flag is cleared and the grammar function is restored
        parser
            .register_token(Some("X"), Matcher::pattern("x").unwrap())
            .unwrap();
        assert_eq!(parser.parse("7").unwrap(), "7");
    }

    #[test]
    fn test_boundary_events_reach_global_logger() {
        use crate::logging::{LogLevel, LoggingService, MultiLogger};
        use std::sync::Arc;

        let (multi, memory) = MultiLogger::new(LogLevel::Debug).with_memory();
        let service = Arc::new(LoggingService::new(Arc::new(multi), LogLevel::Debug));
        logging::init_global_logging_with_service(service)
            .expect("no other test installs the global logger");

        let mut parser = Parser::new(|p: &mut Parser<Token>| p.read("NUMBER")).with_preferences(
            FacadePreferences {
                log_parse_events: true,
                include_token_values_in_errors: true,
            },
            TokenizerPreferences {
                collect_detailed_metrics: false,
                track_type_usage: false,
                log_token_statistics: true,
                include_position_in_errors: true,
            },
        );
        register_number(&mut parser);

        parser.parse("5").unwrap();
        assert!(memory.has_success_with_code(codes::success::TOKEN_TYPE_REGISTERED));
        assert!(memory.has_success_with_code(codes::success::TOKENIZATION_COMPLETE));
        assert!(memory.has_success_with_code(codes::success::PARSE_COMPLETE));

        let complete = memory.get_events_with_code(codes::success::PARSE_COMPLETE);
        assert!(complete[0].context.contains_key("duration_ms"));

        parser.parse("%").unwrap_err();
        assert!(memory.has_error_with_code(codes::lexical::UNDEFINED_TOKEN));
    }

    #[test]
    fn test_mode_reset_after_grammar_error() {
        let mut parser = Parser::new(|_: &mut Parser<()>| {
            Err(ParseError::grammar("nothing makes sense"))
        });
        register_number(&mut parser);

        let error = parser.parse("1").unwrap_err();
        assert_matches!(error, ParseError::Grammar { ref message } if message == "nothing makes sense");

        // Grammar errors propagate unchanged and do not poison the facade
        assert_matches!(parser.parse("1").unwrap_err(), ParseError::Grammar { .. });
    }

    #[test]
    fn test_no_state_survives_between_parses() {
        let mut parser = Parser::new(|p: &mut Parser<String>| Ok(p.read("NUMBER")?.value));
        register_number(&mut parser);

        assert_eq!(parser.parse("1").unwrap(), "1");
        // A fresh lookahead buffer is built per invocation
        assert_eq!(parser.parse("2").unwrap(), "2");
        assert_eq!(parser.parse("1").unwrap(), "1");
    }

    #[test]
    fn test_is_peek_type() {
        let mut parser = Parser::new(|p: &mut Parser<()>| {
            assert!(p.is_peek_type("NUMBER", 0)?);
            assert!(!p.is_peek_type("STRING", 0)?);
            assert!(!p.is_peek_type("NUMBER", 1)?);
            Ok(())
        });
        register_number(&mut parser);

        parser.parse("5").unwrap();
    }

    #[test]
    fn test_programmable_quote_matcher_end_to_end() {
        let mut parser = Parser::new(|p: &mut Parser<Token>| p.read("STRING"));
        parser
            .register_token(
                Some("STRING"),
                Matcher::routine(|cursor| {
                    if cursor.omit_char_if('"')?.is_none() {
                        return Ok(MatchOutcome::NoMatch);
                    }
                    while cursor.peek_char() != Some('"') {
                        cursor.read_char()?;
                    }
                    cursor.omit_char()?;
                    Ok(MatchOutcome::Match)
                }),
            )
            .unwrap();

        let token = parser.parse("\"foo\"").unwrap();
        assert_eq!(token.value, "foo");

        // Unterminated literal aborts before any token is produced
        assert_matches!(
            parser.parse("\"abc"),
            Err(ParseError::Lexical(LexicalError::ReadPastEnd { .. }))
        );
    }
}
