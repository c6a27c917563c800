//! The user-facing parser facade

pub mod error;
pub mod parser;

pub use error::{ParseError, ParseResult};
pub use parser::Parser;
