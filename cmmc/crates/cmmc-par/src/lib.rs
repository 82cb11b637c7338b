//! cmmc-par - Recursive-descent parser for the CMM language.
//!
//! The parser drives the lexer token by token and keeps an unget
//! stack, so productions that need more than one token of lookahead
//! read the prefix they need and push it back. Every parse function
//! returns exactly one AST node; the entry point is
//! [`Parser::parse`], which returns the [`ast::Program`] root.

pub mod ast;
mod error;
mod expr;
mod items;
mod stmt;
pub mod tree;

pub use error::ParseError;

use cmmc_lex::{CharSource, Lexer, Token, TokenKind};
use cmmc_util::{Diagnostic, Handler, Span};

/// Recursive-descent parser over an on-demand token stream.
pub struct Parser<'a, S> {
    /// Token producer; also the source of line context for errors.
    lexer: Lexer<'a, S>,

    /// Diagnostic sink shared with the lexer.
    handler: &'a Handler,

    /// Unget stack; `next` pops here before asking the lexer.
    buf: Vec<Token>,

    /// Every token fetched from the lexer, in source order.
    fetched: Vec<Token>,
}

impl<'a, S: CharSource> Parser<'a, S> {
    /// Create a parser over the given lexer.
    pub fn new(lexer: Lexer<'a, S>, handler: &'a Handler) -> Self {
        Self {
            lexer,
            handler,
            buf: Vec::new(),
            fetched: Vec::new(),
        }
    }

    /// Parse a whole program.
    pub fn parse(&mut self) -> Result<ast::Program, ParseError> {
        self.parse_program()
    }

    /// The tokens read from the lexer so far, in source order.
    ///
    /// After a successful [`parse`](Self::parse) this is the full
    /// token stream of the compilation.
    pub fn tokens(&self) -> &[Token] {
        &self.fetched
    }

    /// Consume the parser, keeping the token stream.
    pub fn into_tokens(self) -> Vec<Token> {
        self.fetched
    }

    /// Get the next token, from the unget stack or the lexer.
    pub(crate) fn next(&mut self) -> Result<Option<Token>, ParseError> {
        if let Some(token) = self.buf.pop() {
            return Ok(Some(token));
        }
        match self.lexer.next_token()? {
            Some(token) => {
                self.fetched.push(token.clone());
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// Push a token back; the next `next` returns it again.
    pub(crate) fn unget(&mut self, token: Token) {
        self.buf.push(token);
    }

    /// Peek-and-match: consume and return the next token if it has
    /// the given kind, otherwise push it back and return `None`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Result<Option<Token>, ParseError> {
        match self.next()? {
            Some(token) if token.is(kind) => Ok(Some(token)),
            Some(token) => {
                self.unget(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Consume the next token, requiring one of the given kinds.
    pub(crate) fn expect(&mut self, kinds: &[TokenKind]) -> Result<Token, ParseError> {
        match self.next()? {
            Some(token) if kinds.iter().any(|k| token.is(*k)) => Ok(token),
            other => Err(self.invalid_at(other, kinds)),
        }
    }

    /// Consume the next token, requiring exactly the given kind.
    pub(crate) fn expect_one(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.expect(&[kind])
    }

    /// Report a grammar mismatch at `token` (or at the current input
    /// position when the stream ended), listing the accepted kinds.
    pub(crate) fn invalid_at(&mut self, token: Option<Token>, expected: &[TokenKind]) -> ParseError {
        let span = match &token {
            Some(token) => token.span,
            None => Span::new(self.lexer.line(), self.lexer.current_column()),
        };
        self.lexer.drain_line();
        let mut diag = Diagnostic::error(format!("Invalid token near {}:", span), span)
            .with_snippet(self.lexer.current_line());
        if !expected.is_empty() {
            diag = diag.with_expected(expected.iter().map(|k| k.describe().to_string()).collect());
        }
        self.handler.emit(diag);
        ParseError::InvalidToken(span)
    }

    /// Read an identifier token into an [`ast::Ident`].
    pub(crate) fn expect_ident(&mut self) -> Result<ast::Ident, ParseError> {
        let token = self.expect_one(TokenKind::Ident)?;
        Ok(ast::Ident {
            name: token.lexeme,
            span: token.span,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use cmmc_lex::StrSource;

    /// Parse a full program, panicking on error.
    pub fn parse_program(source: &str) -> ast::Program {
        let handler = Handler::new();
        let lexer = Lexer::new(StrSource::new(source), &handler);
        let mut parser = Parser::new(lexer, &handler);
        match parser.parse() {
            Ok(program) => program,
            Err(err) => panic!(
                "parse failed: {err}\ndiagnostics: {:?}",
                handler
                    .diagnostics()
                    .iter()
                    .map(|d| d.render())
                    .collect::<Vec<_>>()
            ),
        }
    }

    /// Parse a full program, returning the error and rendered
    /// diagnostics on failure.
    pub fn parse_err(source: &str) -> (ParseError, Vec<String>) {
        let handler = Handler::new();
        let lexer = Lexer::new(StrSource::new(source), &handler);
        let mut parser = Parser::new(lexer, &handler);
        match parser.parse() {
            Ok(_) => panic!("expected parse error"),
            Err(err) => {
                let rendered = handler.diagnostics().iter().map(|d| d.render()).collect();
                (err, rendered)
            }
        }
    }
}
