//! Top-level parsing: the item list, function definitions and
//! declarations.
//!
//! The grammar needs more than one token of lookahead at the top
//! level: after `int` or `real`, a `[` starts an array declaration,
//! an identifier followed by `(` starts a function definition, and
//! anything else is a scalar declaration. The lookahead prefix is
//! read and pushed back before the chosen production runs.

use cmmc_lex::TokenKind;

use crate::ast::{
    ArraySize, ArraySpec, Block, DataType, DeclareStmt, FuncDef, Initializer, Item, LiteralItem,
    Param, Program, ReturnStmt, ReturnType, Stmt,
};
use crate::{ParseError, Parser};
use cmmc_lex::CharSource;

impl<'a, S: CharSource> Parser<'a, S> {
    /// exterStmts ::= ( declareStmt | funcDefStmt )*
    pub(crate) fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();
        while let Some(first) = self.next()? {
            match first.kind {
                TokenKind::Void => {
                    self.unget(first);
                    items.push(Item::Func(self.parse_func_def()?));
                }
                TokenKind::Int | TokenKind::Real => {
                    let second = self.next()?;
                    match second {
                        Some(t) if t.is(TokenKind::LBracket) => {
                            self.unget(t);
                            self.unget(first);
                            items.push(Item::Declare(self.parse_declare()?));
                        }
                        Some(t) if t.is(TokenKind::Ident) => {
                            let third = self.next()?;
                            let is_func =
                                matches!(&third, Some(p) if p.is(TokenKind::LParen));
                            if let Some(p) = third {
                                self.unget(p);
                            }
                            self.unget(t);
                            self.unget(first);
                            if is_func {
                                items.push(Item::Func(self.parse_func_def()?));
                            } else {
                                items.push(Item::Declare(self.parse_declare()?));
                            }
                        }
                        other => {
                            return Err(self
                                .invalid_at(other, &[TokenKind::Ident, TokenKind::LBracket]));
                        }
                    }
                }
                _ => {
                    return Err(self.invalid_at(
                        Some(first),
                        &[TokenKind::Int, TokenKind::Real, TokenKind::Void],
                    ));
                }
            }
        }
        Ok(Program { items })
    }

    /// funcDefStmt ::= returnType ID '(' funcDefParams? ')' '{' innerStmts '}'
    pub(crate) fn parse_func_def(&mut self) -> Result<FuncDef, ParseError> {
        let ret_token =
            self.expect(&[TokenKind::Int, TokenKind::Real, TokenKind::Void])?;
        let ret = match ret_token.kind {
            TokenKind::Int => ReturnType::Data(DataType::Int),
            TokenKind::Real => ReturnType::Data(DataType::Real),
            _ => ReturnType::Void,
        };

        let name = self.expect_ident()?;
        self.expect_one(TokenKind::LParen)?;

        let mut params = Vec::new();
        if self.eat(TokenKind::RParen)?.is_none() {
            if self.eat(TokenKind::Void)?.is_none() {
                params = self.parse_params()?;
            }
            self.expect_one(TokenKind::RParen)?;
        }

        self.expect_one(TokenKind::LBrace)?;
        let mut body = self.parse_inner_stmts()?;
        let rbrace = self.expect_one(TokenKind::RBrace)?;

        // A body not ending in a return gets a bare one; the
        // semantic stage rejects it for non-void functions.
        if !matches!(body.stmts.last(), Some(Stmt::Return(_))) {
            body.stmts.push(Stmt::Return(ReturnStmt {
                value: None,
                span: rbrace.span,
            }));
        }

        Ok(FuncDef {
            ret,
            name,
            params,
            body,
        })
    }

    /// funcDefParams ::= funcDefParam (',' funcDefParam)*
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = vec![self.parse_param()?];
        while self.eat(TokenKind::Comma)?.is_some() {
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    /// funcDefParam ::= dataType ID
    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let ty_token = self.expect(&[TokenKind::Int, TokenKind::Real])?;
        let data_type = if ty_token.is(TokenKind::Int) {
            DataType::Int
        } else {
            DataType::Real
        };
        let name = self.expect_ident()?;
        Ok(Param { data_type, name })
    }

    /// declareStmt ::= dataType (array)? ID (',' ID)*
    ///                 ('=' (expression | arrayInit))? ';'
    pub(crate) fn parse_declare(&mut self) -> Result<DeclareStmt, ParseError> {
        let ty_token = self.expect(&[TokenKind::Int, TokenKind::Real])?;
        let data_type = if ty_token.is(TokenKind::Int) {
            DataType::Int
        } else {
            DataType::Real
        };

        let array = self.parse_array_opt()?;

        let mut names = vec![self.expect_ident()?];
        while self.eat(TokenKind::Comma)?.is_some() {
            names.push(self.expect_ident()?);
        }

        let init = if self.eat(TokenKind::Assign)?.is_some() {
            if let Some(t) = self.eat(TokenKind::LBrace)? {
                self.unget(t);
                Some(Initializer::List(self.parse_init_list()?))
            } else {
                Some(Initializer::Expr(self.parse_expr()?))
            }
        } else {
            None
        };

        self.expect_one(TokenKind::Semicolon)?;

        Ok(DeclareStmt {
            data_type,
            array,
            names,
            init,
            span: ty_token.span,
        })
    }

    /// array ::= '[' (INT_LITERAL | ID)? ']'
    pub(crate) fn parse_array_opt(&mut self) -> Result<Option<ArraySpec>, ParseError> {
        let lbracket = match self.eat(TokenKind::LBracket)? {
            Some(t) => t,
            None => return Ok(None),
        };

        let size = if let Some(t) = self.eat(TokenKind::IntLiteral)? {
            Some(ArraySize::Literal(t.int_value().unwrap_or(0), t.span))
        } else if let Some(t) = self.eat(TokenKind::Ident)? {
            Some(ArraySize::Name(crate::ast::Ident {
                name: t.lexeme,
                span: t.span,
            }))
        } else {
            None
        };

        self.expect_one(TokenKind::RBracket)?;
        Ok(Some(ArraySpec {
            size,
            span: lbracket.span,
        }))
    }

    /// arrayInit ::= '{' literal (',' literal)* '}'
    fn parse_init_list(&mut self) -> Result<Vec<LiteralItem>, ParseError> {
        self.expect_one(TokenKind::LBrace)?;
        let mut items = Vec::new();
        loop {
            let t = self.expect(&[TokenKind::IntLiteral, TokenKind::RealLiteral])?;
            if let Some(literal) = t.literal {
                items.push(LiteralItem {
                    literal,
                    span: t.span,
                });
            }
            if self.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        self.expect_one(TokenKind::RBrace)?;
        Ok(items)
    }

    /// innerStmts ::= ( declareStmt | assignStmt | ifStmt | whileStmt
    ///                | funcCallStmt | returnStmt )*
    pub(crate) fn parse_inner_stmts(&mut self) -> Result<Block, ParseError> {
        let mut stmts = Vec::new();
        while let Some(token) = self.next()? {
            match token.kind {
                TokenKind::If => {
                    self.unget(token);
                    stmts.push(Stmt::If(self.parse_if()?));
                }
                TokenKind::While => {
                    self.unget(token);
                    stmts.push(Stmt::While(self.parse_while()?));
                }
                TokenKind::Int | TokenKind::Real => {
                    self.unget(token);
                    stmts.push(Stmt::Declare(self.parse_declare()?));
                }
                TokenKind::Return => {
                    self.unget(token);
                    stmts.push(Stmt::Return(self.parse_return()?));
                }
                TokenKind::Ident => {
                    let after = self.next()?;
                    let is_call = matches!(&after, Some(p) if p.is(TokenKind::LParen));
                    if let Some(p) = after {
                        self.unget(p);
                    }
                    self.unget(token);
                    if is_call {
                        let call = self.parse_call_expr()?;
                        self.expect_one(TokenKind::Semicolon)?;
                        stmts.push(Stmt::Call(call));
                    } else {
                        stmts.push(Stmt::Assign(self.parse_assign()?));
                    }
                }
                _ => {
                    self.unget(token);
                    break;
                }
            }
        }
        Ok(Block { stmts })
    }
}
