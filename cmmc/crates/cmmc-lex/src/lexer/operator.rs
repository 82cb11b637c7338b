//! Two-character operator lexing: `<` / `<>` and `=` / `==`.

use cmmc_util::Span;

use crate::source::CharSource;
use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a, S: CharSource> Lexer<'a, S> {
    /// Lex less-than or not-equal.
    pub(crate) fn lex_less(&mut self, span: Span) -> Token {
        match self.getch() {
            Some('>') => Token::new(TokenKind::Nequal, "<>", span),
            other => {
                if let Some(c) = other {
                    self.ungetch(c);
                }
                Token::new(TokenKind::Lt, "<", span)
            }
        }
    }

    /// Lex assignment or equality.
    pub(crate) fn lex_assign(&mut self, span: Span) -> Token {
        match self.getch() {
            Some('=') => Token::new(TokenKind::Equal, "==", span),
            other => {
                if let Some(c) = other {
                    self.ungetch(c);
                }
                Token::new(TokenKind::Assign, "=", span)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;
    use cmmc_util::Handler;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let handler = Handler::new();
        let mut lexer = Lexer::new(StrSource::new(source), &handler);
        let mut kinds = Vec::new();
        while let Some(token) = lexer.next_token().expect("unexpected lex error") {
            kinds.push(token.kind);
        }
        kinds
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            kinds("< <> > == ="),
            vec![
                TokenKind::Lt,
                TokenKind::Nequal,
                TokenKind::Gt,
                TokenKind::Equal,
                TokenKind::Assign,
            ]
        );
    }

    #[test]
    fn test_adjacent_operators() {
        // "==" then "=", not "=" "==" "="
        assert_eq!(
            kinds("==="),
            vec![TokenKind::Equal, TokenKind::Assign]
        );
    }

    #[test]
    fn test_less_at_eof() {
        assert_eq!(kinds("<"), vec![TokenKind::Lt]);
    }
}
