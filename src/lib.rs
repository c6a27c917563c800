// Internal modules
pub mod config;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod matcher;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::LexicalError;
pub use matcher::{CharCursor, Constraint, MatchOutcome};
pub use syntax::{ParseError, ParseResult, Parser};
pub use tokens::{Matcher, RegistryError, Token, TokenBuffer};
