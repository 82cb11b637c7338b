//! Diagnostic reporting infrastructure.
//!
//! Every pipeline stage reports failures as [`Diagnostic`] records
//! collected by a [`Handler`]. A diagnostic renders to the caret
//! format the toolchain prints on the error stream:
//!
//! ```text
//!
//! Invalid token near row 2, column 8:
//! int x = 1.;
//!        ^
//! Expected INT_LITERAL
//! ```
//!
//! Stages emit the diagnostic to the handler and also return an
//! `Err` from their entry point, so the pipeline stops at the first
//! error without the handler having to know about control flow.

use std::cell::RefCell;
use std::fmt;

use crate::span::Span;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that aborts the pipeline.
    Error,
    /// A warning that does not abort the pipeline.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with severity, location and display context.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity level.
    pub level: Level,
    /// Heading line, e.g. `Invalid token near row 2, column 8:`.
    pub message: String,
    /// Source location the diagnostic points at.
    pub span: Span,
    /// The offending source line, if the reporting stage captured it.
    pub snippet: Option<String>,
    /// Token kinds that would have been accepted at this point.
    pub expected: Vec<String>,
    /// Additional free-form context lines.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            snippet: None,
            expected: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    /// Attach the offending source line for caret display.
    pub fn with_snippet(mut self, line: impl Into<String>) -> Self {
        self.snippet = Some(line.into());
        self
    }

    /// Attach the list of acceptable token kinds.
    pub fn with_expected(mut self, expected: Vec<String>) -> Self {
        self.expected = expected;
        self
    }

    /// Attach a note line.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Render the diagnostic in the caret format.
    ///
    /// Produces a leading blank line, the heading, the offending
    /// line with a caret under the reported column, an optional
    /// `Expected X or Y` line, and any notes.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push('\n');
        out.push_str(&self.message);
        out.push('\n');
        if let Some(snippet) = &self.snippet {
            out.push_str(snippet);
            out.push('\n');
            let offset = self.span.column.saturating_sub(1) as usize;
            out.push_str(&" ".repeat(offset));
            out.push_str("^\n");
        }
        if !self.expected.is_empty() {
            out.push_str(&format!("Expected {}\n", self.expected.join(" or ")));
        }
        for note in &self.notes {
            out.push_str(note);
            out.push('\n');
        }
        out
    }
}

/// Collects diagnostics emitted by the pipeline stages.
///
/// Storage is interior-mutable so a stage holding `&Handler` can
/// report without threading `&mut` through every parse function.
///
/// # Examples
///
/// ```
/// use cmmc_util::{Diagnostic, Handler, Span};
///
/// let handler = Handler::new();
/// handler.emit(Diagnostic::error("something went wrong", Span::new(1, 1)));
/// assert!(handler.has_errors());
/// assert_eq!(handler.error_count(), 1);
/// ```
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Create a new empty handler.
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Record a diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Returns true if any error-level diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of error-level diagnostics recorded.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Snapshot of all recorded diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drop all recorded diagnostics.
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Error), "error");
        assert_eq!(format!("{}", Level::Warning), "warning");
    }

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::error("bad input", Span::new(1, 3));
        assert_eq!(diag.level, Level::Error);
        assert_eq!(diag.message, "bad input");
        assert_eq!(diag.span, Span::new(1, 3));
    }

    #[test]
    fn test_render_with_snippet() {
        let diag = Diagnostic::error("Invalid token near row 1, column 5:", Span::new(1, 5))
            .with_snippet("int 1x;");
        let rendered = diag.render();
        assert_eq!(
            rendered,
            "\nInvalid token near row 1, column 5:\nint 1x;\n    ^\n"
        );
    }

    #[test]
    fn test_render_with_expected() {
        let diag = Diagnostic::error("Invalid token near row 1, column 1:", Span::new(1, 1))
            .with_snippet("}")
            .with_expected(vec!["ID".into(), "SEMICOLON".into()]);
        let rendered = diag.render();
        assert!(rendered.ends_with("Expected ID or SEMICOLON\n"));
    }

    #[test]
    fn test_render_without_snippet() {
        let diag = Diagnostic::error("redefined symbol 'x' near row 2, column 5", Span::new(2, 5));
        assert_eq!(
            diag.render(),
            "\nredefined symbol 'x' near row 2, column 5\n"
        );
    }

    #[test]
    fn test_handler_collects() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        handler.emit(Diagnostic::error("one", Span::DUMMY));
        handler.emit(Diagnostic::warning("two", Span::DUMMY));
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.diagnostics().len(), 2);
    }

    #[test]
    fn test_handler_clear() {
        let handler = Handler::new();
        handler.emit(Diagnostic::error("one", Span::DUMMY));
        handler.clear();
        assert!(!handler.has_errors());
        assert!(handler.diagnostics().is_empty());
    }
}
