//! Semantic error taxonomy.
//!
//! Each variant names the error kind the way the toolchain reports
//! it, followed by the offending identifier and its location.

use cmmc_util::Span;
use thiserror::Error;

/// Error raised by the semantic analyzer. The walk aborts at the
/// first error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    #[error("redefined '{name}' near {span}")]
    Redefined { name: String, span: Span },

    #[error("undefined '{name}' near {span}")]
    Undefined { name: String, span: Span },

    #[error("type-mismatch '{name}' near {span}")]
    TypeMismatch { name: String, span: Span },

    #[error("param-mismatch '{name}' near {span}")]
    ParamMismatch { name: String, span: Span },

    #[error("index-missing '{name}' near {span}")]
    IndexMissing { name: String, span: Span },

    #[error("no-main: a void main function must be defined")]
    NoMain,
}

impl SemanticError {
    /// Location of the offending node, if it has one.
    pub fn span(&self) -> Span {
        match self {
            SemanticError::Redefined { span, .. }
            | SemanticError::Undefined { span, .. }
            | SemanticError::TypeMismatch { span, .. }
            | SemanticError::ParamMismatch { span, .. }
            | SemanticError::IndexMissing { span, .. } => *span,
            SemanticError::NoMain => Span::DUMMY,
        }
    }
}
