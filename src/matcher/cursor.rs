//! Cursor over a candidate substring for programmable matcher routines

use crate::lexical::LexicalError;

/// Character constraint for conditional read/omit operations
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Exactly this character
    Char(char),
    /// Any character in the set
    OneOf(String),
}

impl Constraint {
    pub fn allows(&self, c: char) -> bool {
        match self {
            Constraint::Char(expected) => *expected == c,
            Constraint::OneOf(set) => set.contains(c),
        }
    }
}

impl From<char> for Constraint {
    fn from(c: char) -> Self {
        Constraint::Char(c)
    }
}

impl From<&str> for Constraint {
    fn from(set: &str) -> Self {
        Constraint::OneOf(set.to_string())
    }
}

impl From<String> for Constraint {
    fn from(set: String) -> Self {
        Constraint::OneOf(set)
    }
}

/// Verdict returned by a matcher routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Accept the consumed prefix; the token value is the accumulated buffer
    Match,
    /// Discard the attempt as if it never happened
    NoMatch,
}

/// Cursor over the unconsumed remainder of the source.
///
/// The cursor indexes characters, not bytes; `consumed_bytes` reports the
/// byte length of the consumed prefix so the tokenizer can advance its
/// absolute source position correctly on multibyte input.
#[derive(Debug)]
pub struct CharCursor {
    chars: Vec<char>,
    index: usize,
    consumed_bytes: usize,
    value: String,
}

impl CharCursor {
    /// Create a cursor over the candidate substring
    pub fn new(candidate: &str) -> Self {
        Self {
            chars: candidate.chars().collect(),
            index: 0,
            consumed_bytes: 0,
            value: String::new(),
        }
    }

    /// Read the current character, appending it to the value buffer.
    ///
    /// Reading past the end of the candidate is fatal for the whole
    /// tokenization attempt, not just this match.
    pub fn read_char(&mut self) -> Result<char, LexicalError> {
        let c = self.current()?;
        self.value.push(c);
        self.advance(c);
        Ok(c)
    }

    /// Read the current character only if it satisfies the constraint.
    ///
    /// Returns `Ok(None)` without advancing when the constraint is not
    /// satisfied; the routine decides whether that ends the match.
    pub fn read_char_if<C: Into<Constraint>>(
        &mut self,
        constraint: C,
    ) -> Result<Option<char>, LexicalError> {
        let c = self.current()?;
        if !constraint.into().allows(c) {
            return Ok(None);
        }
        self.value.push(c);
        self.advance(c);
        Ok(Some(c))
    }

    /// Consume the current character without appending it to the value buffer
    pub fn omit_char(&mut self) -> Result<char, LexicalError> {
        let c = self.current()?;
        self.advance(c);
        Ok(c)
    }

    /// Consume the current character without appending, only if it satisfies
    /// the constraint
    pub fn omit_char_if<C: Into<Constraint>>(
        &mut self,
        constraint: C,
    ) -> Result<Option<char>, LexicalError> {
        let c = self.current()?;
        if !constraint.into().allows(c) {
            return Ok(None);
        }
        self.advance(c);
        Ok(Some(c))
    }

    /// Character at the cursor without mutating state
    pub fn peek_char(&self) -> Option<char> {
        self.peek_char_at(0)
    }

    /// Character at cursor + offset without mutating state
    pub fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    /// Absolute-index lookup, independent of the cursor position
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// True iff the cursor has passed the last character
    pub fn is_eof(&self) -> bool {
        self.index >= self.chars.len()
    }

    /// Current cursor position in characters
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte length of the consumed prefix
    pub fn consumed_bytes(&self) -> usize {
        self.consumed_bytes
    }

    /// Accumulated value buffer
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consume the cursor, yielding the accumulated value
    pub fn into_value(self) -> String {
        self.value
    }

    fn current(&self) -> Result<char, LexicalError> {
        self.chars
            .get(self.index)
            .copied()
            .ok_or(LexicalError::ReadPastEnd { index: self.index })
    }

    fn advance(&mut self, c: char) {
        self.index += 1;
        self.consumed_bytes += c.len_utf8();
    }
}
