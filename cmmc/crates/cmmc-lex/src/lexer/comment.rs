//! Slash disambiguation and comment skipping.
//!
//! A `/` opens a line comment (`//`), a block comment (`/*`), or is
//! the division operator. Block comments do not nest.

use cmmc_util::Span;

use crate::error::LexError;
use crate::source::CharSource;
use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a, S: CharSource> Lexer<'a, S> {
    /// Lex a token starting with `/`: comment forms or DIVIDE.
    ///
    /// Comments are consumed and the scan continues with the next
    /// token, so callers never see a comment.
    pub(crate) fn lex_slash(&mut self, span: Span) -> Result<Option<Token>, LexError> {
        match self.getch() {
            Some('/') => {
                self.skip_line_comment();
                self.next_token()
            }
            Some('*') => {
                self.skip_block_comment()?;
                self.next_token()
            }
            other => {
                if let Some(c) = other {
                    self.ungetch(c);
                }
                Ok(Some(Token::new(TokenKind::Divide, "/", span)))
            }
        }
    }

    /// Skip the rest of a line comment, through the newline.
    fn skip_line_comment(&mut self) {
        loop {
            match self.getch() {
                Some('\n') | None => break,
                Some(_) => {}
            }
        }
    }

    /// Skip a block comment, stopping after the first `*/`.
    ///
    /// End of input before the terminator is an invalid token at the
    /// point the input ran out.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        loop {
            match self.getch() {
                Some('*') => match self.getch() {
                    Some('/') => return Ok(()),
                    Some(c) => self.ungetch(c),
                    None => return Err(self.invalid_token()),
                },
                Some(_) => {}
                None => return Err(self.invalid_token()),
            }
        }
    }
}
