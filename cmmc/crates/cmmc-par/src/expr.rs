//! Expression parsing: conditions, additive/multiplicative chains,
//! factors, and call expressions.
//!
//! Operator chains fold left-to-right while parsing, so the emitter
//! can walk a plain binary tree and still produce one temporary per
//! operator in source order.

use cmmc_lex::{CharSource, Literal, TokenKind};

use crate::ast::{BinOp, CallExpr, CompOp, Condition, Expr};
use crate::{ParseError, Parser};

impl<'a, S: CharSource> Parser<'a, S> {
    /// condition ::= expression compOp expression
    pub(crate) fn parse_cond(&mut self) -> Result<Condition, ParseError> {
        let lhs = self.parse_expr()?;
        let op_token = self.expect(&[
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Equal,
            TokenKind::Nequal,
        ])?;
        let op = match op_token.kind {
            TokenKind::Lt => CompOp::Lt,
            TokenKind::Gt => CompOp::Gt,
            TokenKind::Equal => CompOp::Equal,
            _ => CompOp::Nequal,
        };
        let rhs = self.parse_expr()?;
        let span = lhs.span();
        Ok(Condition { lhs, op, rhs, span })
    }

    /// expression ::= term (addOp term)*
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = if self.eat(TokenKind::Plus)?.is_some() {
                BinOp::Add
            } else if self.eat(TokenKind::Minus)?.is_some() {
                BinOp::Sub
            } else {
                break;
            };
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// term ::= factor (mulOp factor)*
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = if self.eat(TokenKind::Times)?.is_some() {
                BinOp::Mul
            } else if self.eat(TokenKind::Divide)?.is_some() {
                BinOp::Div
            } else {
                break;
            };
            let rhs = self.parse_factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// factor ::= REAL_LITERAL | INT_LITERAL | ID (array)?
    ///          | funcCallExpr | '(' expression ')'
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let token = self.expect(&[
            TokenKind::RealLiteral,
            TokenKind::IntLiteral,
            TokenKind::Ident,
            TokenKind::LParen,
        ])?;

        match token.kind {
            TokenKind::IntLiteral => {
                let value = match token.literal {
                    Some(Literal::Int(v)) => v,
                    _ => 0,
                };
                Ok(Expr::IntLit(value, token.span))
            }
            TokenKind::RealLiteral => {
                let value = match token.literal {
                    Some(Literal::Real(v)) => v,
                    _ => 0.0,
                };
                Ok(Expr::RealLit(value, token.span))
            }
            TokenKind::Ident => {
                let after = self.next()?;
                let is_call = matches!(&after, Some(p) if p.is(TokenKind::LParen));
                if let Some(p) = after {
                    self.unget(p);
                }
                self.unget(token);
                if is_call {
                    Ok(Expr::Call(self.parse_call_expr()?))
                } else {
                    let name = self.expect_ident()?;
                    let index = self.parse_array_opt()?;
                    Ok(Expr::Var { name, index })
                }
            }
            _ => {
                let inner = self.parse_expr()?;
                self.expect_one(TokenKind::RParen)?;
                Ok(inner)
            }
        }
    }

    /// funcCallExpr ::= ID '(' (expression (',' expression)* | 'void')? ')'
    pub(crate) fn parse_call_expr(&mut self) -> Result<CallExpr, ParseError> {
        let callee = self.expect_ident()?;
        self.expect_one(TokenKind::LParen)?;

        let mut args = Vec::new();
        if self.eat(TokenKind::RParen)?.is_none() {
            if self.eat(TokenKind::Void)?.is_none() {
                args.push(self.parse_expr()?);
                while self.eat(TokenKind::Comma)?.is_some() {
                    args.push(self.parse_expr()?);
                }
            }
            self.expect_one(TokenKind::RParen)?;
        }

        Ok(CallExpr { callee, args })
    }
}
