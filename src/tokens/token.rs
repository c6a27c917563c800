//! Token type produced by tokenization

use crate::utils::Span;
use serde::{Deserialize, Serialize};

/// A classified, non-empty lexical unit.
///
/// Tokens are created during eager tokenization, stored in the lookahead
/// buffer, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Name of the token type definition that produced this token
    pub name: String,
    /// The matched substring (never empty)
    pub value: String,
    /// Copied from the producing token type definition
    pub hidden: bool,
    /// Location of the matched text in the source
    pub span: Span,
}

impl Token {
    pub fn new(name: impl Into<String>, value: impl Into<String>, hidden: bool, span: Span) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            hidden,
            span,
        }
    }

    /// True iff this token's type name equals `name`
    pub fn is_type(&self, name: &str) -> bool {
        self.name == name
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.name, self.value)
    }
}
