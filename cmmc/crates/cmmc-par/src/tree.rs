//! Tree-text rendering of the AST.
//!
//! Produces the display dump used by the `parser` pipeline mode:
//! one `|----> label` line per node, children indented with bar
//! continuation, leaves rendered as `KIND : "lexeme"`.

use crate::ast::{
    ArraySize, ArraySpec, Block, CallExpr, Condition, DeclareStmt, Expr, FuncDef, Initializer,
    Item, Program, Stmt,
};
use cmmc_lex::Literal;

/// A generic labeled tree used only for display.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create an inner node.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Create a leaf rendered as `KIND : "lexeme"`.
    pub fn leaf(kind: &str, lexeme: &str) -> Self {
        Self::new(format!("{} : \"{}\"", kind, lexeme))
    }

    /// Append a child node.
    pub fn push(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    /// Render the tree as indented text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut Vec::new(), false, &mut out);
        out
    }

    fn render_into(&self, bars: &mut Vec<bool>, my_bar: bool, out: &mut String) {
        for &bar in bars.iter() {
            out.push_str(if bar { "|     " } else { "      " });
        }
        out.push_str("|----> ");
        out.push_str(&self.label);
        out.push('\n');

        bars.push(my_bar);
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.render_into(bars, i < count - 1, out);
        }
        bars.pop();
    }
}

/// Render a whole program as tree text.
pub fn render_program(program: &Program) -> String {
    program_node(program).render()
}

/// Build the display tree for a program.
pub fn program_node(program: &Program) -> TreeNode {
    let mut root = TreeNode::new("ExterStmts");
    for item in &program.items {
        match item {
            Item::Declare(decl) => root.push(declare_node(decl)),
            Item::Func(func) => root.push(func_node(func)),
        }
    }
    root
}

fn declare_node(decl: &DeclareStmt) -> TreeNode {
    let mut node = TreeNode::new("DeclareStmt");
    let keyword = decl.data_type.keyword();
    node.push(TreeNode::leaf(&keyword.to_uppercase(), keyword));
    if let Some(array) = &decl.array {
        node.push(array_node(array));
    }
    for name in &decl.names {
        node.push(TreeNode::leaf("ID", &name.name));
    }
    match &decl.init {
        Some(Initializer::Expr(expr)) => {
            let mut init = TreeNode::new("Init");
            init.push(expr_node(expr));
            node.push(init);
        }
        Some(Initializer::List(items)) => {
            let mut init = TreeNode::new("ArrayInit");
            for item in items {
                init.push(literal_leaf(&item.literal));
            }
            node.push(init);
        }
        None => {}
    }
    node
}

fn func_node(func: &FuncDef) -> TreeNode {
    let mut node = TreeNode::new("FuncDef");
    let keyword = func.ret.keyword();
    node.push(TreeNode::leaf(&keyword.to_uppercase(), keyword));
    node.push(TreeNode::leaf("ID", &func.name.name));
    let mut params = TreeNode::new("Params");
    for param in &func.params {
        let mut p = TreeNode::new("Param");
        let keyword = param.data_type.keyword();
        p.push(TreeNode::leaf(&keyword.to_uppercase(), keyword));
        p.push(TreeNode::leaf("ID", &param.name.name));
        params.push(p);
    }
    node.push(params);
    node.push(block_node(&func.body));
    node
}

fn block_node(block: &Block) -> TreeNode {
    let mut node = TreeNode::new("InnerStmts");
    for stmt in &block.stmts {
        node.push(stmt_node(stmt));
    }
    node
}

fn stmt_node(stmt: &Stmt) -> TreeNode {
    match stmt {
        Stmt::Declare(decl) => declare_node(decl),
        Stmt::Assign(assign) => {
            let mut node = TreeNode::new("AssignStmt");
            node.push(TreeNode::leaf("ID", &assign.target.name));
            if let Some(index) = &assign.index {
                node.push(array_node(index));
            }
            node.push(expr_node(&assign.value));
            node
        }
        Stmt::If(stmt) => {
            let mut node = TreeNode::new("IfStmt");
            node.push(cond_node(&stmt.cond));
            node.push(block_node(&stmt.then_block));
            if let Some(else_block) = &stmt.else_block {
                node.push(block_node(else_block));
            }
            node
        }
        Stmt::While(stmt) => {
            let mut node = TreeNode::new("WhileStmt");
            node.push(cond_node(&stmt.cond));
            node.push(block_node(&stmt.body));
            node
        }
        Stmt::Call(call) => call_node(call),
        Stmt::Return(ret) => {
            let mut node = TreeNode::new("ReturnStmt");
            if let Some(value) = &ret.value {
                node.push(expr_node(value));
            }
            node
        }
    }
}

fn cond_node(cond: &Condition) -> TreeNode {
    let mut node = TreeNode::new("Condition");
    node.push(expr_node(&cond.lhs));
    let mut compare = TreeNode::new("Compare");
    compare.push(TreeNode::leaf("COMPOP", cond.op.symbol()));
    node.push(compare);
    node.push(expr_node(&cond.rhs));
    node
}

fn call_node(call: &CallExpr) -> TreeNode {
    let mut node = TreeNode::new("FuncCall");
    node.push(TreeNode::leaf("ID", &call.callee.name));
    for arg in &call.args {
        node.push(expr_node(arg));
    }
    node
}

fn expr_node(expr: &Expr) -> TreeNode {
    match expr {
        Expr::IntLit(value, _) => TreeNode::leaf("INT_LITERAL", &value.to_string()),
        Expr::RealLit(value, _) => TreeNode::leaf("REAL_LITERAL", &format!("{:?}", value)),
        Expr::Var { name, index } => {
            let mut node = TreeNode::new("Factor");
            node.push(TreeNode::leaf("ID", &name.name));
            if let Some(index) = index {
                node.push(array_node(index));
            }
            node
        }
        Expr::Call(call) => call_node(call),
        Expr::Binary { op, lhs, rhs } => {
            let mut node = TreeNode::new("Expression");
            node.push(expr_node(lhs));
            node.push(TreeNode::leaf("OP", op.symbol()));
            node.push(expr_node(rhs));
            node
        }
    }
}

fn array_node(array: &ArraySpec) -> TreeNode {
    let mut node = TreeNode::new("Array");
    match &array.size {
        Some(ArraySize::Literal(value, _)) => {
            node.push(TreeNode::leaf("INT_LITERAL", &value.to_string()));
        }
        Some(ArraySize::Name(name)) => {
            node.push(TreeNode::leaf("ID", &name.name));
        }
        None => {}
    }
    node
}

fn literal_leaf(literal: &Literal) -> TreeNode {
    match literal {
        Literal::Int(value) => TreeNode::leaf("INT_LITERAL", &value.to_string()),
        Literal::Real(value) => TreeNode::leaf("REAL_LITERAL", &format!("{:?}", value)),
    }
}
