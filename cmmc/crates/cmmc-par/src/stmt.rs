//! Statement parsing: if, while, assignment and return.

use cmmc_lex::{CharSource, TokenKind};

use crate::ast::{AssignStmt, IfStmt, ReturnStmt, WhileStmt};
use crate::{ParseError, Parser};

impl<'a, S: CharSource> Parser<'a, S> {
    /// ifStmt ::= 'if' '(' condition ')' '{' innerStmts '}'
    ///            ( 'else' '{' innerStmts '}' )?
    pub(crate) fn parse_if(&mut self) -> Result<IfStmt, ParseError> {
        self.expect_one(TokenKind::If)?;
        self.expect_one(TokenKind::LParen)?;
        let cond = self.parse_cond()?;
        self.expect_one(TokenKind::RParen)?;
        self.expect_one(TokenKind::LBrace)?;
        let then_block = self.parse_inner_stmts()?;
        self.expect_one(TokenKind::RBrace)?;

        let else_block = if self.eat(TokenKind::Else)?.is_some() {
            self.expect_one(TokenKind::LBrace)?;
            let block = self.parse_inner_stmts()?;
            self.expect_one(TokenKind::RBrace)?;
            Some(block)
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            then_block,
            else_block,
        })
    }

    /// whileStmt ::= 'while' '(' condition ')' '{' innerStmts '}'
    pub(crate) fn parse_while(&mut self) -> Result<WhileStmt, ParseError> {
        self.expect_one(TokenKind::While)?;
        self.expect_one(TokenKind::LParen)?;
        let cond = self.parse_cond()?;
        self.expect_one(TokenKind::RParen)?;
        self.expect_one(TokenKind::LBrace)?;
        let body = self.parse_inner_stmts()?;
        self.expect_one(TokenKind::RBrace)?;
        Ok(WhileStmt { cond, body })
    }

    /// assignStmt ::= ID (array)? '=' expression ';'
    pub(crate) fn parse_assign(&mut self) -> Result<AssignStmt, ParseError> {
        let target = self.expect_ident()?;
        let index = self.parse_array_opt()?;
        self.expect_one(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        self.expect_one(TokenKind::Semicolon)?;
        Ok(AssignStmt {
            target,
            index,
            value,
        })
    }

    /// returnStmt ::= 'return' expression? ';'
    pub(crate) fn parse_return(&mut self) -> Result<ReturnStmt, ParseError> {
        let keyword = self.expect_one(TokenKind::Return)?;
        if self.eat(TokenKind::Semicolon)?.is_some() {
            return Ok(ReturnStmt {
                value: None,
                span: keyword.span,
            });
        }
        let value = self.parse_expr()?;
        self.expect_one(TokenKind::Semicolon)?;
        Ok(ReturnStmt {
            value: Some(value),
            span: keyword.span,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ArraySize, Expr, Item, Stmt};
    use crate::test_util::{parse_err, parse_program};

    fn body_stmts(source: &str) -> Vec<Stmt> {
        let program = parse_program(source);
        match program.items.into_iter().next() {
            Some(Item::Func(func)) => func.body.stmts,
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else() {
        let stmts = body_stmts("void main(void){ if(1 < 2){ write(1); } }");
        match &stmts[0] {
            Stmt::If(stmt) => {
                assert_eq!(stmt.then_block.stmts.len(), 1);
                assert!(stmt.else_block.is_none());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_with_else() {
        let stmts = body_stmts("void main(void){ if(1 < 2){ write(1); } else { write(2); } }");
        match &stmts[0] {
            Stmt::If(stmt) => assert!(stmt.else_block.is_some()),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_while() {
        let stmts = body_stmts("void main(void){ while(i < 3){ i = i + 1; } }");
        match &stmts[0] {
            Stmt::While(stmt) => assert_eq!(stmt.body.stmts.len(), 1),
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_assignment() {
        let stmts = body_stmts("void main(void){ x = 1; }");
        match &stmts[0] {
            Stmt::Assign(stmt) => {
                assert_eq!(stmt.target.name, "x");
                assert!(stmt.index.is_none());
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_indexed_assignment() {
        let stmts = body_stmts("void main(void){ a[2] = 1; }");
        match &stmts[0] {
            Stmt::Assign(stmt) => {
                let index = stmt.index.as_ref().expect("index");
                assert!(matches!(index.size, Some(ArraySize::Literal(2, _))));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_variable_indexed_assignment() {
        let stmts = body_stmts("void main(void){ a[i] = 1; }");
        match &stmts[0] {
            Stmt::Assign(stmt) => {
                let index = stmt.index.as_ref().expect("index");
                assert!(matches!(index.size, Some(ArraySize::Name(_))));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_return() {
        let stmts = body_stmts("void main(void){ return; }");
        match &stmts[0] {
            Stmt::Return(ret) => assert!(ret.value.is_none()),
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn test_return_with_value() {
        let stmts = body_stmts("int f(void){ return 1 + 2; }");
        match &stmts[0] {
            Stmt::Return(ret) => {
                assert!(matches!(ret.value, Some(Expr::Binary { .. })));
            }
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_without_equals_rejected() {
        let (_, rendered) = parse_err("void main(void){ x 1; }");
        assert!(rendered[0].contains("Expected ASSIGN"));
    }

    #[test]
    fn test_missing_condition_paren_rejected() {
        let (_, rendered) = parse_err("void main(void){ if 1 < 2 { } }");
        assert!(rendered[0].contains("Expected LPAREN"));
    }
}
