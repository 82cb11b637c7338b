//! cmmc-ir - Four-address intermediate code for the CMM language.
//!
//! The emitter lowers a semantically checked AST into a flat list
//! of [`Code`] records. Line numbers are assigned at creation time
//! and are final; jump targets are either computed from lines that
//! already exist or back-patched once both sides are known.

mod emit;
mod ir;

pub use emit::Emitter;
pub use ir::{render_codes, Arg, Code, OpCode};
