//! Parser error type.

use cmmc_lex::LexError;
use cmmc_util::Span;
use thiserror::Error;

/// Error raised when the token stream does not match the grammar.
/// The caret rendering has already been emitted to the diagnostic
/// handler when this is returned; parsing halts at the first error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid token near {0}")]
    InvalidToken(Span),

    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    /// Location of the offending token or character.
    pub fn span(&self) -> Span {
        match self {
            ParseError::InvalidToken(span) => *span,
            ParseError::Lex(err) => err.span(),
        }
    }
}
