//! AST node definitions for the CMM language.
//!
//! Nodes are typed structs rather than a generic display tree;
//! parent back-references are not stored. The tree-text dump used
//! for display lives in [`crate::tree`].

use cmmc_lex::Literal;
use cmmc_util::Span;

/// AST root: the ordered list of top-level items.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Global variable declaration
    Declare(DeclareStmt),

    /// Function definition
    Func(FuncDef),
}

/// A declarable data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Real,
}

impl DataType {
    /// Source spelling of the type.
    pub fn keyword(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Real => "real",
        }
    }
}

/// Function return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Data(DataType),
}

impl ReturnType {
    /// Source spelling of the return type.
    pub fn keyword(&self) -> &'static str {
        match self {
            ReturnType::Void => "void",
            ReturnType::Data(ty) => ty.keyword(),
        }
    }
}

/// An identifier with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// The size written inside an array suffix.
#[derive(Debug, Clone, PartialEq)]
pub enum ArraySize {
    /// `[3]`
    Literal(i64, Span),
    /// `[n]`
    Name(Ident),
}

/// An array suffix `[ size? ]`.
///
/// The size may be absent syntactically; whether that is legal at a
/// given site is decided by the semantic analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySpec {
    pub size: Option<ArraySize>,
    pub span: Span,
}

/// One literal inside a brace initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralItem {
    pub literal: Literal,
    pub span: Span,
}

/// Declaration initializer: scalar expression or brace list.
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Expr(Expr),
    List(Vec<LiteralItem>),
}

/// `dataType (array)? ID (',' ID)* ('=' init)? ';'`
///
/// With several declarators the initializer binds to the last name.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareStmt {
    pub data_type: DataType,
    pub array: Option<ArraySpec>,
    pub names: Vec<Ident>,
    pub init: Option<Initializer>,
    pub span: Span,
}

/// `returnType ID '(' params? ')' '{' innerStmts '}'`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub ret: ReturnType,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Block,
}

/// A declared function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub data_type: DataType,
    pub name: Ident,
}

/// A `{ … }` statement block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

/// A statement inside a function body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Declare(DeclareStmt),
    Assign(AssignStmt),
    If(IfStmt),
    While(WhileStmt),
    Call(CallExpr),
    Return(ReturnStmt),
}

/// `ID (array)? '=' expression ';'`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Ident,
    pub index: Option<ArraySpec>,
    pub value: Expr,
}

/// `'if' '(' condition ')' block ('else' block)?`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Condition,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

/// `'while' '(' condition ')' block`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub cond: Condition,
    pub body: Block,
}

/// `'return' expression? ';'`
///
/// A body that does not end in a return gets a bare one synthesized
/// by the parser, spanned at the closing brace.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Lt,
    Gt,
    Equal,
    Nequal,
}

impl CompOp {
    /// Source spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompOp::Lt => "<",
            CompOp::Gt => ">",
            CompOp::Equal => "==",
            CompOp::Nequal => "<>",
        }
    }
}

/// `expression compOp expression`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub lhs: Expr,
    pub op: CompOp,
    pub rhs: Expr,
    pub span: Span,
}

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Source spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}

/// `ID '(' (expression (',' expression)* | 'void')? ')'`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Ident,
    pub args: Vec<Expr>,
}

/// An expression. Operator chains are folded left-to-right during
/// parsing, so `a - b - c` is `Binary(Binary(a, b), c)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit(i64, Span),
    RealLit(f64, Span),
    Var {
        name: Ident,
        index: Option<ArraySpec>,
    },
    Call(CallExpr),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Location of the leftmost token of the expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit(_, span) => *span,
            Expr::RealLit(_, span) => *span,
            Expr::Var { name, .. } => name.span,
            Expr::Call(call) => call.callee.span,
            Expr::Binary { lhs, .. } => lhs.span(),
        }
    }
}
