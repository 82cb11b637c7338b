//! Lexer error type.

use cmmc_util::Span;
use thiserror::Error;

/// Error raised when the character stream does not form a valid
/// token. The full caret rendering has already been emitted to the
/// diagnostic handler by the time this is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid token near {0}")]
    InvalidToken(Span),
}

impl LexError {
    /// Location of the offending character.
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidToken(span) => *span,
        }
    }
}
