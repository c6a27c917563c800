//! Programmable character-level matching
//!
//! A matcher routine drives a [`CharCursor`] over the unconsumed remainder
//! of the source, consuming characters one at a time and accumulating the
//! token value. Routines report [`MatchOutcome::Match`] to accept the
//! consumed prefix or [`MatchOutcome::NoMatch`] to discard the attempt.

pub mod cursor;

pub use cursor::{CharCursor, Constraint, MatchOutcome};

use crate::lexical::LexicalError;

/// Signature of a programmable matcher routine.
///
/// Errors abort the whole tokenization run; `Ok(NoMatch)` just moves the
/// tokenizer on to the next registered token type.
pub type MatcherRoutine = dyn Fn(&mut CharCursor) -> Result<MatchOutcome, LexicalError>;
