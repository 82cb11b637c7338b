//! Lowering from the AST to four-address code.
//!
//! The emitter owns the code vector; the line counter is simply the
//! vector length, so line numbers always match indices. Temporaries
//! are named `_t<line>` after the op that writes them. Control flow
//! is lowered with conditional branches that jump when the
//! condition is FALSE, back-patched once the other side is known.

use cmmc_lex::Literal;
use cmmc_par::ast::{
    ArraySize, ArraySpec, AssignStmt, BinOp, Block, CallExpr, Condition, DataType, DeclareStmt,
    Expr, FuncDef, IfStmt, Initializer, Item, Program, ReturnStmt, Stmt, WhileStmt,
};

use crate::ir::{Arg, Code, OpCode};

/// Emits the IR for one compilation.
pub struct Emitter {
    codes: Vec<Code>,
}

impl Emitter {
    /// Create an emitter with an empty code list; the line counter
    /// starts at zero for each compilation.
    pub fn new() -> Self {
        Self { codes: Vec::new() }
    }

    /// Lower a whole program. The AST must have passed semantic
    /// analysis.
    pub fn emit_program(mut self, program: &Program) -> Vec<Code> {
        for item in &program.items {
            match item {
                Item::Declare(decl) => self.emit_declare(decl),
                Item::Func(func) => self.emit_func(func),
            }
        }
        self.codes
    }

    /// The line the next op will get.
    fn line(&self) -> usize {
        self.codes.len()
    }

    /// Fresh scratch name for the op about to be pushed.
    fn fresh_temp(&self) -> String {
        format!("_t{}", self.line())
    }

    /// Append an op; returns its line.
    fn push(&mut self, op: OpCode, arg1: Arg, arg2: Arg, target: Arg) -> usize {
        let line = self.codes.len();
        self.codes.push(Code {
            line,
            op,
            arg1,
            arg2,
            target,
        });
        line
    }

    /// Back-patch the target of the op at `line`.
    fn patch(&mut self, line: usize, target: usize) {
        self.codes[line].target = Arg::Line(target);
    }

    /// Declaration marker for a scalar of the given type.
    fn type_marker(ty: DataType) -> &'static str {
        match ty {
            DataType::Int => "_i",
            DataType::Real => "_f",
        }
    }

    /// Declaration marker for an array of the given element type.
    fn array_marker(ty: DataType) -> &'static str {
        match ty {
            DataType::Int => "_i[]",
            DataType::Real => "_f[]",
        }
    }

    fn emit_declare(&mut self, decl: &DeclareStmt) {
        match &decl.array {
            None => {
                for name in &decl.names {
                    self.push(
                        OpCode::Assign,
                        Arg::name(Self::type_marker(decl.data_type)),
                        Arg::Empty,
                        Arg::name(&name.name),
                    );
                }
            }
            Some(spec) => {
                let size = Self::array_size(spec);
                for name in &decl.names {
                    self.push(
                        OpCode::Assign,
                        Arg::name(Self::array_marker(decl.data_type)),
                        Arg::Int(size),
                        Arg::name(&name.name),
                    );
                }
            }
        }

        if let Some(init) = &decl.init {
            let target = &decl.names[decl.names.len() - 1];
            match init {
                Initializer::Expr(expr) => {
                    let value = self.emit_expr(expr);
                    self.push(
                        OpCode::Assign,
                        Arg::name(value),
                        Arg::Empty,
                        Arg::name(&target.name),
                    );
                }
                Initializer::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        let value = match item.literal {
                            Literal::Int(v) => Arg::Int(v),
                            Literal::Real(v) => Arg::Real(v),
                        };
                        self.push(
                            OpCode::ArrayStore,
                            Arg::Int(index as i64),
                            value,
                            Arg::name(&target.name),
                        );
                    }
                }
            }
        }
    }

    /// Size literal of a declared array; semantic analysis has
    /// already required it.
    fn array_size(spec: &ArraySpec) -> i64 {
        match spec.size {
            Some(ArraySize::Literal(value, _)) => value,
            _ => 0,
        }
    }

    fn emit_func(&mut self, func: &FuncDef) {
        // entry is the op after the header and its skip jump
        let entry = self.line() + 2;
        self.push(
            OpCode::FuncDef,
            Arg::Line(entry),
            Arg::Empty,
            Arg::name(&func.name.name),
        );
        let skip = self.push(OpCode::Jump, Arg::Empty, Arg::Empty, Arg::Empty);

        for (index, param) in func.params.iter().enumerate() {
            self.push(
                OpCode::Assign,
                Arg::name(Self::type_marker(param.data_type)),
                Arg::Empty,
                Arg::name(&param.name.name),
            );
            self.push(
                OpCode::ParamRecv,
                Arg::name(format!("_p{}", index)),
                Arg::Empty,
                Arg::name(&param.name.name),
            );
        }

        self.emit_block(&func.body);
        let after = self.line();
        self.patch(skip, after);
    }

    fn emit_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            match stmt {
                Stmt::Declare(decl) => self.emit_declare(decl),
                Stmt::Assign(assign) => self.emit_assign(assign),
                Stmt::If(stmt) => self.emit_if(stmt),
                Stmt::While(stmt) => self.emit_while(stmt),
                Stmt::Call(call) => {
                    self.emit_call(call);
                }
                Stmt::Return(ret) => self.emit_return(ret),
            }
        }
    }

    fn emit_assign(&mut self, assign: &AssignStmt) {
        let value = self.emit_expr(&assign.value);
        match &assign.index {
            None => {
                self.push(
                    OpCode::Assign,
                    Arg::name(value),
                    Arg::Empty,
                    Arg::name(&assign.target.name),
                );
            }
            Some(spec) => {
                let index = Self::index_arg(spec);
                self.push(
                    OpCode::ArrayStore,
                    index,
                    Arg::name(value),
                    Arg::name(&assign.target.name),
                );
            }
        }
    }

    /// Subscript operand: an int literal or a variable name.
    fn index_arg(spec: &ArraySpec) -> Arg {
        match &spec.size {
            Some(ArraySize::Literal(value, _)) => Arg::Int(*value),
            Some(ArraySize::Name(name)) => Arg::name(&name.name),
            None => Arg::Empty,
        }
    }

    /// Emit a condition; returns the line of the branch op, whose
    /// target is patched later. The branch is taken when the
    /// condition is FALSE.
    fn emit_cond(&mut self, cond: &Condition) -> usize {
        let lhs = self.emit_expr(&cond.lhs);
        let rhs = self.emit_expr(&cond.rhs);
        let op = match cond.op {
            cmmc_par::ast::CompOp::Lt => OpCode::JumpLt,
            cmmc_par::ast::CompOp::Gt => OpCode::JumpGt,
            cmmc_par::ast::CompOp::Equal => OpCode::JumpEq,
            cmmc_par::ast::CompOp::Nequal => OpCode::JumpNe,
        };
        self.push(op, Arg::name(lhs), Arg::name(rhs), Arg::Empty)
    }

    fn emit_if(&mut self, stmt: &IfStmt) {
        let branch = self.emit_cond(&stmt.cond);
        self.emit_block(&stmt.then_block);
        match &stmt.else_block {
            Some(else_block) => {
                let skip = self.push(OpCode::Jump, Arg::Empty, Arg::Empty, Arg::Empty);
                let else_start = self.line();
                self.patch(branch, else_start);
                self.emit_block(else_block);
                let after = self.line();
                self.patch(skip, after);
            }
            None => {
                let after = self.line();
                self.patch(branch, after);
            }
        }
    }

    fn emit_while(&mut self, stmt: &WhileStmt) {
        let start = self.line();
        let branch = self.emit_cond(&stmt.cond);
        self.emit_block(&stmt.body);
        let back = self.push(OpCode::Jump, Arg::Empty, Arg::Empty, Arg::Line(start));
        self.patch(branch, back + 1);
    }

    fn emit_return(&mut self, ret: &ReturnStmt) {
        match &ret.value {
            Some(expr) => {
                let value = self.emit_expr(expr);
                self.push(
                    OpCode::Assign,
                    Arg::name(value),
                    Arg::Empty,
                    Arg::name("_rv"),
                );
            }
            None => {
                self.push(OpCode::Assign, Arg::Int(0), Arg::Empty, Arg::name("_rv"));
            }
        }
        self.push(OpCode::Ret, Arg::Empty, Arg::Empty, Arg::Empty);
    }

    /// Emit a call: stage arguments into `_p<i>` slots, set `_ra` to
    /// the line after the `c`, call, and copy `_rv` into a fresh
    /// temp which is the expression's value.
    fn emit_call(&mut self, call: &CallExpr) -> String {
        let mut staged = Vec::new();
        for arg in &call.args {
            staged.push(self.emit_expr(arg));
        }
        for (index, temp) in staged.iter().enumerate() {
            self.push(
                OpCode::ParamPass,
                Arg::name(temp),
                Arg::Empty,
                Arg::name(format!("_p{}", index)),
            );
        }

        // the `=` below and the `c` occupy the next two lines
        let ra = self.line() + 2;
        self.push(
            OpCode::Assign,
            Arg::Int(ra as i64),
            Arg::Empty,
            Arg::name("_ra"),
        );
        self.push(
            OpCode::Call,
            Arg::Empty,
            Arg::Empty,
            Arg::name(&call.callee.name),
        );

        let temp = self.fresh_temp();
        self.push(OpCode::Assign, Arg::name("_rv"), Arg::Empty, Arg::name(&temp));
        temp
    }

    /// Emit an expression; returns the temp holding its value.
    fn emit_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::IntLit(value, _) => {
                let temp = self.fresh_temp();
                self.push(OpCode::Assign, Arg::Int(*value), Arg::Empty, Arg::name(&temp));
                temp
            }
            Expr::RealLit(value, _) => {
                let temp = self.fresh_temp();
                self.push(
                    OpCode::Assign,
                    Arg::Real(*value),
                    Arg::Empty,
                    Arg::name(&temp),
                );
                temp
            }
            Expr::Var { name, index } => match index {
                None => {
                    let temp = self.fresh_temp();
                    self.push(
                        OpCode::Assign,
                        Arg::name(&name.name),
                        Arg::Empty,
                        Arg::name(&temp),
                    );
                    temp
                }
                Some(spec) => {
                    let index = Self::index_arg(spec);
                    let temp = self.fresh_temp();
                    self.push(
                        OpCode::ArrayLoad,
                        Arg::name(&name.name),
                        index,
                        Arg::name(&temp),
                    );
                    temp
                }
            },
            Expr::Call(call) => self.emit_call(call),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.emit_expr(lhs);
                let rhs = self.emit_expr(rhs);
                let opcode = match op {
                    BinOp::Add => OpCode::Add,
                    BinOp::Sub => OpCode::Sub,
                    BinOp::Mul => OpCode::Mul,
                    BinOp::Div => OpCode::Div,
                };
                let temp = self.fresh_temp();
                self.push(opcode, Arg::name(lhs), Arg::name(rhs), Arg::name(&temp));
                temp
            }
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
