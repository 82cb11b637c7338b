//! Runtime error taxonomy.

use thiserror::Error;

/// Fatal error raised while executing intermediate code. Execution
/// halts at the first runtime error.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("divide-by-zero at line {line}")]
    DivideByZero { line: usize },

    #[error("array-out-of-bounds '{name}[{index}]' at line {line}")]
    ArrayOutOfBounds {
        name: String,
        index: i64,
        line: usize,
    },

    #[error("eof-on-read at line {line}")]
    EofOnRead { line: usize },

    #[error("invalid-input '{input}' at line {line}")]
    InvalidInput { input: String, line: usize },

    #[error("unknown name '{name}' at line {line}")]
    UnknownName { name: String, line: usize },

    #[error("malformed op at line {line}")]
    MalformedOp { line: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
