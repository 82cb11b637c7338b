//! cmmc-sem - Semantic analysis for the CMM language.
//!
//! The analyzer walks the AST depth-first, building a tree of
//! scopes with tie-indexed visibility and enforcing the type rules.
//! The built-in functions `read` and `write` are seeded into the
//! root scope before the walk begins.

mod analysis;
mod error;
pub mod scope;
pub mod types;

pub use analysis::Analyzer;
pub use error::SemanticError;
pub use scope::{Scope, ScopeId, Symbol, SymbolTable};
pub use types::{ScalarType, SymType, ValueKind};
