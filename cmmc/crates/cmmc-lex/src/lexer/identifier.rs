//! Identifier and reserved-word lexing.

use cmmc_util::Span;

use crate::error::LexError;
use crate::source::CharSource;
use crate::token::{reserved_kind, Token, TokenKind};
use crate::Lexer;

impl<'a, S: CharSource> Lexer<'a, S> {
    /// Lex an identifier or reserved word.
    ///
    /// Identifiers start with a letter and continue with letters,
    /// digits and underscores, but may not end in an underscore.
    pub(crate) fn lex_identifier(&mut self, first: char, span: Span) -> Result<Token, LexError> {
        let mut text = String::new();
        let mut cur = first;
        loop {
            text.push(cur);
            match self.getch() {
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => cur = c,
                Some(c) => {
                    self.ungetch(c);
                    break;
                }
                None => break,
            }
        }

        if text.ends_with('_') {
            self.ungetch('_');
            return Err(self.invalid_token());
        }

        match reserved_kind(&text) {
            Some(kind) => Ok(Token::new(kind, text, span)),
            None => Ok(Token::new(TokenKind::Ident, text, span)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;
    use cmmc_util::Handler;

    fn lex_one(source: &str) -> Result<Option<Token>, LexError> {
        let handler = Handler::new();
        let mut lexer = Lexer::new(StrSource::new(source), &handler);
        lexer.next_token()
    }

    #[test]
    fn test_plain_identifier() {
        let token = lex_one("sum").unwrap().unwrap();
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.lexeme, "sum");
    }

    #[test]
    fn test_identifier_with_digits_and_underscores() {
        let token = lex_one("a1_b2 ").unwrap().unwrap();
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.lexeme, "a1_b2");
    }

    #[test]
    fn test_reserved_word() {
        let token = lex_one("while").unwrap().unwrap();
        assert_eq!(token.kind, TokenKind::While);
    }

    #[test]
    fn test_reserved_word_prefix_is_identifier() {
        let token = lex_one("ifx").unwrap().unwrap();
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.lexeme, "ifx");
    }

    #[test]
    fn test_trailing_underscore_is_invalid() {
        let err = lex_one("abc_ ").unwrap_err();
        // caret on the underscore, column 4
        assert_eq!(err.span(), Span::new(1, 4));
    }

    #[test]
    fn test_trailing_underscore_at_eof() {
        assert!(lex_one("abc_").is_err());
    }
}
