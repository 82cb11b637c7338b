//! cmmc-util - Shared infrastructure for the CMM toolchain.
//!
//! This crate provides the types every pipeline stage needs:
//! source locations ([`Span`]) and diagnostic reporting
//! ([`Diagnostic`], [`Handler`]).

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use span::Span;
