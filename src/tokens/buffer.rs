//! Lookahead buffer over the fully-materialized token sequence

use super::token::Token;

/// The complete ordered token sequence for one parse invocation plus a
/// monotonically advancing read cursor.
///
/// Peeking never mutates the cursor; the cursor only moves forward.
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
    read_cursor: usize,
}

impl TokenBuffer {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            read_cursor: 0,
        }
    }

    /// Token at `read_cursor + offset`, hidden or not, without side effects
    pub fn peek_raw(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.read_cursor + offset)
    }

    /// Token at the read cursor; advances the cursor past it
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.read_cursor).cloned()?;
        self.read_cursor += 1;
        Some(token)
    }

    /// Current read cursor position
    pub fn read_cursor(&self) -> usize {
        self.read_cursor
    }

    /// Total number of buffered tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens not yet consumed
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.read_cursor)
    }

    /// All buffered tokens, consumed or not
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;

    fn sample_tokens() -> Vec<Token> {
        vec![
            Token::new("NUMBER", "1", false, Span::dummy()),
            Token::new("SEMI", "\n", true, Span::dummy()),
            Token::new("NUMBER", "2", false, Span::dummy()),
        ]
    }

    #[test]
    fn test_peek_does_not_advance() {
        let buffer = TokenBuffer::new(sample_tokens());

        assert_eq!(buffer.peek_raw(0).unwrap().value, "1");
        assert_eq!(buffer.peek_raw(0).unwrap().value, "1");
        assert_eq!(buffer.peek_raw(2).unwrap().value, "2");
        assert_eq!(buffer.peek_raw(3), None);
        assert_eq!(buffer.read_cursor(), 0);
    }

    #[test]
    fn test_next_token_advances() {
        let mut buffer = TokenBuffer::new(sample_tokens());

        assert_eq!(buffer.next_token().unwrap().value, "1");
        assert_eq!(buffer.read_cursor(), 1);
        assert_eq!(buffer.remaining(), 2);

        // Peeks are relative to the new cursor
        assert_eq!(buffer.peek_raw(0).unwrap().name, "SEMI");

        buffer.next_token();
        buffer.next_token();
        assert_eq!(buffer.next_token(), None);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_empty_buffer() {
        let mut buffer = TokenBuffer::new(Vec::new());

        assert!(buffer.is_empty());
        assert_eq!(buffer.peek_raw(0), None);
        assert_eq!(buffer.next_token(), None);
    }
}
