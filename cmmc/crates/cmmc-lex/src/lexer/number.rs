//! Number literal lexing.
//!
//! Integer literals are `0` or a nonzero digit followed by digits;
//! a leading zero in a multi-digit integer is invalid. A real
//! literal is an integer part, a dot, and at least one fraction
//! digit (leading zeros allowed in the fraction).

use cmmc_util::Span;

use crate::error::LexError;
use crate::source::CharSource;
use crate::token::Token;
use crate::Lexer;

impl<'a, S: CharSource> Lexer<'a, S> {
    /// Lex an integer or real literal starting at `first`.
    pub(crate) fn lex_number(&mut self, first: char, span: Span) -> Result<Token, LexError> {
        let integral = self.lex_integral(first)?;

        match self.getch() {
            Some('.') => {
                let frac_first = match self.getch() {
                    Some(c) if c.is_ascii_digit() => c,
                    Some(c) => {
                        self.ungetch(c);
                        return Err(self.invalid_token());
                    }
                    None => return Err(self.invalid_token()),
                };
                let fraction = self.lex_digits(frac_first);
                let text = format!("{}.{}", integral, fraction);
                match text.parse::<f64>() {
                    Ok(value) => Ok(Token::real(value, text, span)),
                    Err(_) => Err(self.invalid_token_at(span)),
                }
            }
            other => {
                if let Some(c) = other {
                    self.ungetch(c);
                }
                match integral.parse::<i64>() {
                    Ok(value) => Ok(Token::int(value, integral, span)),
                    Err(_) => Err(self.invalid_token_at(span)),
                }
            }
        }
    }

    /// Lex the integral part, enforcing the leading-zero rule.
    fn lex_integral(&mut self, first: char) -> Result<String, LexError> {
        if first == '0' {
            match self.getch() {
                Some(c) if c.is_ascii_digit() => {
                    self.ungetch(c);
                    return Err(self.invalid_token());
                }
                Some(c) => self.ungetch(c),
                None => {}
            }
            return Ok("0".to_string());
        }
        Ok(self.lex_digits(first))
    }

    /// Collect a run of digits starting at `first`.
    fn lex_digits(&mut self, first: char) -> String {
        let mut text = String::new();
        let mut cur = first;
        loop {
            text.push(cur);
            match self.getch() {
                Some(c) if c.is_ascii_digit() => cur = c,
                Some(c) => {
                    self.ungetch(c);
                    break;
                }
                None => break,
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;
    use crate::token::{Literal, TokenKind};
    use cmmc_util::Handler;

    fn lex_one(source: &str) -> Result<Option<Token>, LexError> {
        let handler = Handler::new();
        let mut lexer = Lexer::new(StrSource::new(source), &handler);
        lexer.next_token()
    }

    #[test]
    fn test_zero() {
        let token = lex_one("0").unwrap().unwrap();
        assert_eq!(token.kind, TokenKind::IntLiteral);
        assert_eq!(token.int_value(), Some(0));
    }

    #[test]
    fn test_integer() {
        let token = lex_one("1024;").unwrap().unwrap();
        assert_eq!(token.int_value(), Some(1024));
        assert_eq!(token.lexeme, "1024");
    }

    #[test]
    fn test_leading_zero_is_invalid() {
        assert!(lex_one("01").is_err());
    }

    #[test]
    fn test_real() {
        let token = lex_one("3.14").unwrap().unwrap();
        assert_eq!(token.kind, TokenKind::RealLiteral);
        assert_eq!(token.literal, Some(Literal::Real(3.14)));
        assert_eq!(token.lexeme, "3.14");
    }

    #[test]
    fn test_real_fraction_may_lead_with_zero() {
        let token = lex_one("1.05").unwrap().unwrap();
        assert_eq!(token.real_value(), Some(1.05));
    }

    #[test]
    fn test_zero_point() {
        let token = lex_one("0.5").unwrap().unwrap();
        assert_eq!(token.real_value(), Some(0.5));
    }

    #[test]
    fn test_dot_without_fraction_is_invalid() {
        let err = lex_one("1.;").unwrap_err();
        // caret on the character after the dot
        assert_eq!(err.span(), Span::new(1, 3));
    }

    #[test]
    fn test_dot_at_eof_is_invalid() {
        assert!(lex_one("7.").is_err());
    }
}
