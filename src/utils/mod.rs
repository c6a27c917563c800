//! Shared primitives for the tokenizer and parser facade
//!
//! Dependency-free source location types used across lexical analysis,
//! error reporting, and logging.

pub mod span;

pub use span::{Position, SourceMap, Span};
