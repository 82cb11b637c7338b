//! cmmc-drv - Pipeline driver for the CMM toolchain.
//!
//! The driver runs the stages in order and stops at the selected
//! [`Mode`]: lexical analysis, parsing, semantic analysis, IR
//! emission, or execution. Each successful run returns the
//! [`Artifacts`] of the selected stage and all earlier ones.
//! Textual dumps go to the output stream; diagnostics go to the
//! error stream. An error at any stage short-circuits the rest.

use std::io::{self, Write};

use thiserror::Error;

use cmmc_interp::{InputStream, Interpreter, OutputStream, RuntimeError, StdinInput};
use cmmc_ir::{render_codes, Code, Emitter};
use cmmc_lex::{LexError, Lexer, StrSource, Token};
use cmmc_par::ast::Program;
use cmmc_par::{tree, ParseError, Parser};
use cmmc_sem::{Analyzer, SemanticError, SymbolTable};
use cmmc_util::Handler;

/// How far the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Tokenize and dump the token listing.
    Lexer,
    /// Parse and dump the syntax tree.
    Parser,
    /// Analyze and dump the scope tree.
    Semantic,
    /// Emit and dump the intermediate code listing.
    Compile,
    /// Emit and execute.
    Execute,
}

/// Everything the selected mode and its earlier stages produced.
pub struct Artifacts {
    pub tokens: Vec<Token>,
    pub ast: Option<Program>,
    pub scopes: Option<SymbolTable>,
    pub codes: Option<Vec<Code>>,
}

/// Error from any pipeline stage.
///
/// Stage errors have already been rendered to the error stream by
/// the time this is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One pipeline run over one source text.
pub struct Pipeline {
    source: String,
    mode: Mode,
    input: Box<dyn InputStream>,
    output: OutputStream,
    error: OutputStream,
}

impl Pipeline {
    /// Create a pipeline with the process's standard streams.
    pub fn new(source: impl Into<String>, mode: Mode) -> Self {
        Self {
            source: source.into(),
            mode,
            input: Box::new(StdinInput),
            output: Box::new(io::stdout()),
            error: Box::new(io::stderr()),
        }
    }

    /// Replace the input stream serving the built-in `read`.
    pub fn with_input(mut self, input: Box<dyn InputStream>) -> Self {
        self.input = input;
        self
    }

    /// Replace the output stream.
    pub fn with_output(mut self, output: OutputStream) -> Self {
        self.output = output;
        self
    }

    /// Replace the error stream.
    pub fn with_error(mut self, error: OutputStream) -> Self {
        self.error = error;
        self
    }

    /// Run the pipeline up to the selected mode.
    pub fn run(mut self) -> Result<Artifacts, PipelineError> {
        let handler = Handler::new();

        if self.mode == Mode::Lexer {
            let tokens = match self.lex_all(&handler) {
                Ok(tokens) => tokens,
                Err(err) => {
                    self.report(&handler);
                    return Err(err.into());
                }
            };
            writeln!(self.output, "{}", render_tokens(&tokens))?;
            return Ok(Artifacts {
                tokens,
                ast: None,
                scopes: None,
                codes: None,
            });
        }

        let lexer = Lexer::new(StrSource::new(&self.source), &handler);
        let mut parser = Parser::new(lexer, &handler);
        let ast = match parser.parse() {
            Ok(ast) => ast,
            Err(err) => {
                self.report(&handler);
                return Err(err.into());
            }
        };
        let tokens = parser.into_tokens();

        if self.mode == Mode::Parser {
            writeln!(self.output, "{}", tree::render_program(&ast))?;
            return Ok(Artifacts {
                tokens,
                ast: Some(ast),
                scopes: None,
                codes: None,
            });
        }

        let scopes = match Analyzer::new(&handler).analyze(&ast) {
            Ok(scopes) => scopes,
            Err(err) => {
                self.report(&handler);
                return Err(err.into());
            }
        };

        if self.mode == Mode::Semantic {
            writeln!(self.output, "{}", scopes.dump())?;
            return Ok(Artifacts {
                tokens,
                ast: Some(ast),
                scopes: Some(scopes),
                codes: None,
            });
        }

        let codes = Emitter::new().emit_program(&ast);

        if self.mode == Mode::Compile {
            writeln!(self.output, "{}", render_codes(&codes))?;
            return Ok(Artifacts {
                tokens,
                ast: Some(ast),
                scopes: Some(scopes),
                codes: Some(codes),
            });
        }

        // execute: the interpreter owns the streams and reports its
        // own error before returning
        let interpreter = Interpreter::new(codes.clone(), self.input, self.output, self.error);
        interpreter.run()?;

        Ok(Artifacts {
            tokens,
            ast: Some(ast),
            scopes: Some(scopes),
            codes: Some(codes),
        })
    }

    /// Tokenize the whole source (lexer mode).
    fn lex_all(&self, handler: &Handler) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(StrSource::new(&self.source), handler);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Write collected diagnostics to the error stream.
    fn report(&mut self, handler: &Handler) {
        for diagnostic in handler.diagnostics() {
            let _ = write!(self.error, "{}", diagnostic.render());
        }
        let _ = self.error.flush();
    }
}

/// Render the token listing, grouped by source row: the first token
/// of a row is prefixed with its line number, the rest are aligned
/// under it.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut current_line = 0;
    for token in tokens {
        if token.span.line != current_line {
            current_line = token.span.line;
            out.push_str(&format!("{}: {}\n", current_line, token));
        } else {
            out.push_str(&format!("   {}: {}\n", current_line, token));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tokens_groups_by_row() {
        let handler = Handler::new();
        let mut lexer = Lexer::new(StrSource::new("int a;\nint b;"), &handler);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token().expect("lex") {
            tokens.push(token);
        }
        let listing = render_tokens(&tokens);
        assert_eq!(
            listing,
            "1: <INT: 'int'>\n\
             \u{20}  1: <ID: 'a'>\n\
             \u{20}  1: <SEMICOLON: ';'>\n\
             2: <INT: 'int'>\n\
             \u{20}  2: <ID: 'b'>\n\
             \u{20}  2: <SEMICOLON: ';'>\n"
        );
    }
}
