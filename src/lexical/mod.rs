//! Eager tokenization of the full source into a lookahead buffer

pub mod tokenizer;

pub use tokenizer::{LexicalError, Tokenizer, TokenizerMetrics};
