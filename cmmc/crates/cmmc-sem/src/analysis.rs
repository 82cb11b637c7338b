//! Semantic analysis walk.
//!
//! The analyzer visits the AST depth-first. Each `innerStmts` block
//! opens a child scope; a function body's scope receives the
//! declared parameters without redefinition checks. Expression kind
//! calculation resolves variable references against the scope chain
//! and requires uniform kinds; there is no implicit int/real
//! conversion. The walk aborts at the first error.

use cmmc_lex::Literal;
use cmmc_par::ast::{
    ArraySize, ArraySpec, AssignStmt, Block, CallExpr, Condition, DeclareStmt, Expr, FuncDef,
    Ident, Initializer, Item, Program, ReturnStmt, Stmt,
};
use cmmc_util::{Diagnostic, Handler, Span};

use crate::error::SemanticError;
use crate::scope::{ScopeId, SymbolTable};
use crate::types::{ScalarType, SymType, ValueKind};

/// Kind computed for an expression.
///
/// `Any` is produced by calls to the built-in `read`, whose result
/// is exempt from strict kind matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExprKind {
    Value(ValueKind),
    Any,
    Void,
}

impl ExprKind {
    /// Whether this kind satisfies a required value kind.
    fn matches(self, kind: ValueKind) -> bool {
        match self {
            ExprKind::Any => true,
            ExprKind::Value(k) => k == kind,
            ExprKind::Void => false,
        }
    }
}

/// Unify the kinds of two operands, or `None` on mismatch.
fn unify(lhs: ExprKind, rhs: ExprKind) -> Option<ExprKind> {
    match (lhs, rhs) {
        (ExprKind::Void, _) | (_, ExprKind::Void) => None,
        (ExprKind::Any, other) | (other, ExprKind::Any) => Some(other),
        (ExprKind::Value(a), ExprKind::Value(b)) if a == b => Some(lhs),
        _ => None,
    }
}

/// Depth-first semantic analyzer.
///
/// # Examples
///
/// ```
/// use cmmc_lex::{Lexer, StrSource};
/// use cmmc_par::Parser;
/// use cmmc_sem::Analyzer;
/// use cmmc_util::Handler;
///
/// let handler = Handler::new();
/// let lexer = Lexer::new(StrSource::new("void main(void){ write(1); }"), &handler);
/// let mut parser = Parser::new(lexer, &handler);
/// let program = parser.parse().unwrap();
/// let table = Analyzer::new(&handler).analyze(&program).unwrap();
/// assert!(table.find(cmmc_sem::SymbolTable::ROOT, "main").is_some());
/// ```
pub struct Analyzer<'a> {
    table: SymbolTable,
    handler: &'a Handler,
    /// Name and return type of the function being walked.
    current_fn: Option<(String, ScalarType)>,
}

impl<'a> Analyzer<'a> {
    /// Create an analyzer with the built-ins seeded into the root
    /// scope: `read : () -> int` and `write : (int) -> void`.
    pub fn new(handler: &'a Handler) -> Self {
        let mut table = SymbolTable::new();
        // the root scope is empty, so these cannot collide
        let _ = table.insert(
            SymbolTable::ROOT,
            "read",
            SymType::Func {
                ret: ScalarType::Int,
                params: Vec::new(),
            },
            Span::DUMMY,
        );
        let _ = table.insert(
            SymbolTable::ROOT,
            "write",
            SymType::Func {
                ret: ScalarType::Void,
                params: vec![ValueKind::Int],
            },
            Span::DUMMY,
        );
        Self {
            table,
            handler,
            current_fn: None,
        }
    }

    /// Analyze a program, returning the populated scope tree.
    ///
    /// The first semantic error aborts the walk; it is emitted to
    /// the diagnostic handler and returned.
    pub fn analyze(mut self, program: &Program) -> Result<SymbolTable, SemanticError> {
        match self.walk_program(program) {
            Ok(()) => Ok(self.table),
            Err(err) => {
                self.handler
                    .emit(Diagnostic::error(err.to_string(), err.span()));
                Err(err)
            }
        }
    }

    fn walk_program(&mut self, program: &Program) -> Result<(), SemanticError> {
        for item in &program.items {
            match item {
                Item::Declare(decl) => self.check_declare(SymbolTable::ROOT, decl)?,
                Item::Func(func) => self.check_func(func)?,
            }
        }

        match self.table.find(SymbolTable::ROOT, "main") {
            Some(symbol)
                if matches!(
                    symbol.ty,
                    SymType::Func {
                        ret: ScalarType::Void,
                        ..
                    }
                ) =>
            {
                Ok(())
            }
            _ => Err(SemanticError::NoMain),
        }
    }

    fn check_func(&mut self, func: &FuncDef) -> Result<(), SemanticError> {
        let ret = ScalarType::from(func.ret);
        let params: Vec<ValueKind> = func
            .params
            .iter()
            .map(|p| ValueKind::from(p.data_type))
            .collect();
        self.table.insert(
            SymbolTable::ROOT,
            func.name.name.clone(),
            SymType::Func { ret, params },
            func.name.span,
        )?;

        // the body block's scope also holds the parameters, which
        // may shadow globals
        let body = self.table.open_scope(SymbolTable::ROOT);
        for param in &func.params {
            self.table.insert_param(
                body,
                param.name.name.clone(),
                SymType::Scalar(ValueKind::from(param.data_type)),
                param.name.span,
            );
        }

        self.current_fn = Some((func.name.name.clone(), ret));
        let result = self.check_block(body, &func.body);
        self.current_fn = None;
        result
    }

    fn check_block(&mut self, scope: ScopeId, block: &Block) -> Result<(), SemanticError> {
        for stmt in &block.stmts {
            match stmt {
                Stmt::Declare(decl) => self.check_declare(scope, decl)?,
                Stmt::Assign(assign) => self.check_assign(scope, assign)?,
                Stmt::If(stmt) => {
                    self.check_cond(scope, &stmt.cond)?;
                    let then_scope = self.table.open_scope(scope);
                    self.check_block(then_scope, &stmt.then_block)?;
                    if let Some(else_block) = &stmt.else_block {
                        let else_scope = self.table.open_scope(scope);
                        self.check_block(else_scope, else_block)?;
                    }
                }
                Stmt::While(stmt) => {
                    self.check_cond(scope, &stmt.cond)?;
                    let body_scope = self.table.open_scope(scope);
                    self.check_block(body_scope, &stmt.body)?;
                }
                Stmt::Call(call) => {
                    // statement position accepts any return type
                    self.call_kind(scope, call)?;
                }
                Stmt::Return(ret) => self.check_return(scope, ret)?,
            }
        }
        Ok(())
    }

    fn check_declare(&mut self, scope: ScopeId, decl: &DeclareStmt) -> Result<(), SemanticError> {
        let elem = ValueKind::from(decl.data_type);
        let array_size = match &decl.array {
            Some(spec) => Some(self.declared_size(spec, &decl.names[0])?),
            None => None,
        };
        let ty = match array_size {
            Some(size) => SymType::Array {
                elem,
                size: Some(size),
            },
            None => SymType::Scalar(elem),
        };

        for name in &decl.names {
            self.table
                .insert(scope, name.name.clone(), ty.clone(), name.span)?;
        }

        let init = match &decl.init {
            Some(init) => init,
            None => return Ok(()),
        };
        // the initializer binds to the last declarator
        let target = &decl.names[decl.names.len() - 1];

        match init {
            Initializer::Expr(expr) => {
                if array_size.is_some() {
                    return Err(SemanticError::TypeMismatch {
                        name: target.name.clone(),
                        span: target.span,
                    });
                }
                let kind = self.expr_kind(scope, expr)?;
                if !kind.matches(elem) {
                    return Err(SemanticError::TypeMismatch {
                        name: target.name.clone(),
                        span: target.span,
                    });
                }
            }
            Initializer::List(items) => {
                let size = match array_size {
                    Some(size) => size,
                    None => {
                        return Err(SemanticError::TypeMismatch {
                            name: target.name.clone(),
                            span: target.span,
                        })
                    }
                };
                if items.len() > size {
                    return Err(SemanticError::TypeMismatch {
                        name: target.name.clone(),
                        span: target.span,
                    });
                }
                for item in items {
                    let kind = match item.literal {
                        Literal::Int(_) => ValueKind::Int,
                        Literal::Real(_) => ValueKind::Real,
                    };
                    if kind != elem {
                        return Err(SemanticError::TypeMismatch {
                            name: target.name.clone(),
                            span: item.span,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Size of a declared array; it must be a literal at the
    /// declaring site.
    fn declared_size(&self, spec: &ArraySpec, owner: &Ident) -> Result<usize, SemanticError> {
        match &spec.size {
            Some(ArraySize::Literal(value, _)) => Ok(*value as usize),
            Some(ArraySize::Name(name)) => Err(SemanticError::IndexMissing {
                name: name.name.clone(),
                span: name.span,
            }),
            None => Err(SemanticError::IndexMissing {
                name: owner.name.clone(),
                span: spec.span,
            }),
        }
    }

    fn check_assign(&self, scope: ScopeId, assign: &AssignStmt) -> Result<(), SemanticError> {
        let symbol = self.table.find(scope, &assign.target.name).ok_or_else(|| {
            SemanticError::Undefined {
                name: assign.target.name.clone(),
                span: assign.target.span,
            }
        })?;

        let target_kind = match (&symbol.ty, &assign.index) {
            (SymType::Scalar(kind), None) => *kind,
            (SymType::Array { elem, .. }, Some(index)) => {
                let elem = *elem;
                self.check_index(scope, index, &assign.target)?;
                elem
            }
            _ => {
                return Err(SemanticError::TypeMismatch {
                    name: assign.target.name.clone(),
                    span: assign.target.span,
                })
            }
        };

        let value = self.expr_kind(scope, &assign.value)?;
        if !value.matches(target_kind) {
            return Err(SemanticError::TypeMismatch {
                name: assign.target.name.clone(),
                span: assign.target.span,
            });
        }
        Ok(())
    }

    /// Check an array subscript at a use site: the index must be
    /// present, and an identifier index must name an int scalar.
    fn check_index(
        &self,
        scope: ScopeId,
        index: &ArraySpec,
        owner: &Ident,
    ) -> Result<(), SemanticError> {
        match &index.size {
            None => Err(SemanticError::IndexMissing {
                name: owner.name.clone(),
                span: index.span,
            }),
            Some(ArraySize::Literal(..)) => Ok(()),
            Some(ArraySize::Name(name)) => {
                let symbol =
                    self.table
                        .find(scope, &name.name)
                        .ok_or_else(|| SemanticError::Undefined {
                            name: name.name.clone(),
                            span: name.span,
                        })?;
                match symbol.ty {
                    SymType::Scalar(ValueKind::Int) => Ok(()),
                    _ => Err(SemanticError::TypeMismatch {
                        name: name.name.clone(),
                        span: name.span,
                    }),
                }
            }
        }
    }

    fn check_cond(&self, scope: ScopeId, cond: &Condition) -> Result<(), SemanticError> {
        let lhs = self.expr_kind(scope, &cond.lhs)?;
        let rhs = self.expr_kind(scope, &cond.rhs)?;
        if unify(lhs, rhs).is_none() {
            return Err(SemanticError::TypeMismatch {
                name: cond.op.symbol().to_string(),
                span: cond.span,
            });
        }
        Ok(())
    }

    fn check_return(&self, scope: ScopeId, ret: &ReturnStmt) -> Result<(), SemanticError> {
        let (fn_name, ret_ty) = match &self.current_fn {
            Some(current) => current,
            None => {
                return Err(SemanticError::Undefined {
                    name: "return".to_string(),
                    span: ret.span,
                })
            }
        };

        match (&ret.value, ret_ty.value_kind()) {
            (None, None) => Ok(()),
            (Some(expr), Some(kind)) => {
                let value = self.expr_kind(scope, expr)?;
                if !value.matches(kind) {
                    return Err(SemanticError::TypeMismatch {
                        name: fn_name.clone(),
                        span: expr.span(),
                    });
                }
                Ok(())
            }
            _ => Err(SemanticError::TypeMismatch {
                name: fn_name.clone(),
                span: ret.span,
            }),
        }
    }

    /// Kind of a call expression; checks the callee and arguments.
    ///
    /// The built-in `write` bypasses argument-kind checking, and the
    /// built-in `read` types as a wildcard. Built-ins are recognized
    /// by name: the root entries make those names impossible to
    /// redeclare.
    fn call_kind(&self, scope: ScopeId, call: &CallExpr) -> Result<ExprKind, SemanticError> {
        let symbol = self.table.find(scope, &call.callee.name).ok_or_else(|| {
            SemanticError::Undefined {
                name: call.callee.name.clone(),
                span: call.callee.span,
            }
        })?;

        let (ret, params) = match &symbol.ty {
            SymType::Func { ret, params } => (*ret, params.clone()),
            _ => {
                return Err(SemanticError::TypeMismatch {
                    name: call.callee.name.clone(),
                    span: call.callee.span,
                })
            }
        };

        if call.args.len() != params.len() {
            return Err(SemanticError::ParamMismatch {
                name: call.callee.name.clone(),
                span: call.callee.span,
            });
        }

        let unchecked = call.callee.name == "write";
        for (arg, param) in call.args.iter().zip(params.iter()) {
            let kind = self.expr_kind(scope, arg)?;
            if !unchecked && !kind.matches(*param) {
                return Err(SemanticError::ParamMismatch {
                    name: call.callee.name.clone(),
                    span: arg.span(),
                });
            }
        }

        if call.callee.name == "read" {
            return Ok(ExprKind::Any);
        }
        Ok(match ret.value_kind() {
            Some(kind) => ExprKind::Value(kind),
            None => ExprKind::Void,
        })
    }

    /// Kind of an expression in value position.
    fn expr_kind(&self, scope: ScopeId, expr: &Expr) -> Result<ExprKind, SemanticError> {
        match expr {
            Expr::IntLit(..) => Ok(ExprKind::Value(ValueKind::Int)),
            Expr::RealLit(..) => Ok(ExprKind::Value(ValueKind::Real)),
            Expr::Var { name, index } => {
                let symbol =
                    self.table
                        .find(scope, &name.name)
                        .ok_or_else(|| SemanticError::Undefined {
                            name: name.name.clone(),
                            span: name.span,
                        })?;
                match (&symbol.ty, index) {
                    (SymType::Scalar(kind), None) => Ok(ExprKind::Value(*kind)),
                    (SymType::Array { elem, .. }, Some(spec)) => {
                        let elem = *elem;
                        self.check_index(scope, spec, name)?;
                        Ok(ExprKind::Value(elem))
                    }
                    // array-ness of the reference must match the
                    // symbol; functions are illegal in value position
                    _ => Err(SemanticError::TypeMismatch {
                        name: name.name.clone(),
                        span: name.span,
                    }),
                }
            }
            Expr::Call(call) => {
                let kind = self.call_kind(scope, call)?;
                if kind == ExprKind::Void {
                    return Err(SemanticError::TypeMismatch {
                        name: call.callee.name.clone(),
                        span: call.callee.span,
                    });
                }
                Ok(kind)
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.expr_kind(scope, lhs)?;
                let r = self.expr_kind(scope, rhs)?;
                unify(l, r).ok_or_else(|| SemanticError::TypeMismatch {
                    name: op.symbol().to_string(),
                    span: lhs.span(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmmc_lex::{Lexer, StrSource};
    use cmmc_par::Parser;

    fn analyze(source: &str) -> Result<SymbolTable, SemanticError> {
        let handler = Handler::new();
        let lexer = Lexer::new(StrSource::new(source), &handler);
        let mut parser = Parser::new(lexer, &handler);
        let program = parser.parse().expect("parse failed");
        Analyzer::new(&handler).analyze(&program)
    }

    #[test]
    fn test_hello_world_passes() {
        assert!(analyze("void main(void){ write(1 + 2); }").is_ok());
    }

    #[test]
    fn test_missing_main() {
        let err = analyze("int f(void){ return 1; }").unwrap_err();
        assert_eq!(err, SemanticError::NoMain);
    }

    #[test]
    fn test_main_must_return_void() {
        let err = analyze("int main(void){ return 1; }").unwrap_err();
        assert_eq!(err, SemanticError::NoMain);
    }

    #[test]
    fn test_assignment_kind_mismatch() {
        let err = analyze("void main(void){ int x; real y; y = 1.5; x = y; }").unwrap_err();
        match err {
            SemanticError::TypeMismatch { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected type-mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_redefined_in_same_block() {
        let err = analyze("void main(void){ int x; int x; }").unwrap_err();
        assert!(matches!(err, SemanticError::Redefined { .. }));
    }

    #[test]
    fn test_redefinition_of_builtin() {
        let err = analyze("void main(void){ int write; }").unwrap_err();
        match err {
            SemanticError::Redefined { name, .. } => assert_eq!(name, "write"),
            other => panic!("expected redefined, got {:?}", other),
        }
    }

    #[test]
    fn test_param_may_shadow_global() {
        assert!(analyze(
            "int n; int f(int n){ return n; } void main(void){ write(f(1)); }"
        )
        .is_ok());
    }

    #[test]
    fn test_undefined_variable() {
        let err = analyze("void main(void){ x = 1; }").unwrap_err();
        match err {
            SemanticError::Undefined { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected undefined, got {:?}", other),
        }
    }

    #[test]
    fn test_later_global_invisible_in_earlier_function() {
        let err = analyze(
            "int f(void){ return g; } int g; void main(void){ write(f()); }",
        )
        .unwrap_err();
        match err {
            SemanticError::Undefined { name, .. } => assert_eq!(name, "g"),
            other => panic!("expected undefined, got {:?}", other),
        }
    }

    #[test]
    fn test_earlier_global_visible_in_function() {
        assert!(analyze(
            "int g; int f(void){ return g; } void main(void){ write(f()); }"
        )
        .is_ok());
    }

    #[test]
    fn test_call_argument_count() {
        let err = analyze(
            "int f(int a, int b){ return a; } void main(void){ write(f(1)); }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ParamMismatch { .. }));
    }

    #[test]
    fn test_call_argument_kind() {
        let err = analyze(
            "int f(int a){ return a; } void main(void){ write(f(1.5)); }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ParamMismatch { .. }));
    }

    #[test]
    fn test_write_skips_argument_kind() {
        assert!(analyze("void main(void){ real y; y = 1.5; write(y); }").is_ok());
    }

    #[test]
    fn test_read_matches_any_kind() {
        assert!(analyze("void main(void){ int x; real y; x = read(); y = read(); }").is_ok());
    }

    #[test]
    fn test_array_init_ok() {
        assert!(analyze("void main(void){ int[3] a = {10, 20, 30}; write(a[2]); }").is_ok());
    }

    #[test]
    fn test_array_init_too_long() {
        let err = analyze("void main(void){ int[2] a = {1, 2, 3}; }").unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_array_init_wrong_literal_kind() {
        let err = analyze("void main(void){ int[2] a = {1, 2.5}; }").unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_unsized_array_declaration() {
        let err = analyze("void main(void){ int[] a; }").unwrap_err();
        assert!(matches!(err, SemanticError::IndexMissing { .. }));
    }

    #[test]
    fn test_missing_subscript_on_store() {
        let err = analyze("void main(void){ int[2] a; a[] = 1; }").unwrap_err();
        assert!(matches!(err, SemanticError::IndexMissing { .. }));
    }

    #[test]
    fn test_array_used_without_subscript() {
        let err = analyze("void main(void){ int[2] a; int x; x = a; }").unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_index_variable_must_be_int() {
        let err =
            analyze("void main(void){ int[2] a; real r; r = 1.0; a[r] = 1; }").unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_condition_kind_mismatch() {
        let err = analyze("void main(void){ real y; y = 1.0; if(y < 2){ } }").unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_missing_return_in_valued_function() {
        // the parser synthesizes a bare return at the closing brace
        let err = analyze("int f(void){ int x; } void main(void){ }").unwrap_err();
        match err {
            SemanticError::TypeMismatch { name, .. } => assert_eq!(name, "f"),
            other => panic!("expected type-mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_void_call_in_expression() {
        let err = analyze(
            "void f(void){ } void main(void){ int x; x = f(); }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_function_in_value_position() {
        let err = analyze("int f(void){ return 1; } void main(void){ int x; x = f + 1; }")
            .unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_recursion_sees_own_symbol() {
        assert!(analyze(
            "int fact(int n){ if(n < 2){ return 1; } return n * fact(n - 1); } \
             void main(void){ write(fact(5)); }"
        )
        .is_ok());
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let source = "int g; void main(void){ g = 1; write(g); }";
        let handler = Handler::new();
        let lexer = Lexer::new(StrSource::new(source), &handler);
        let mut parser = Parser::new(lexer, &handler);
        let program = parser.parse().expect("parse failed");

        let first = Analyzer::new(&handler).analyze(&program).expect("first run");
        let second = Analyzer::new(&handler)
            .analyze(&program)
            .expect("second run");
        assert_eq!(first.scope_count(), second.scope_count());
        assert_eq!(first.dump(), second.dump());
    }
}
