//! Token types, the ordered token type registry, and the lookahead buffer

pub mod buffer;
pub mod registry;
pub mod token;

pub use buffer::TokenBuffer;
pub use registry::{MatchReport, Matcher, RegistryError, TokenRegistry, TokenTypeDef};
pub use token::Token;
