//! Scope tree with tie-indexed visibility.
//!
//! Scopes live in an arena and refer to each other by [`ScopeId`].
//! Each scope records a tie index: the number of symbols its parent
//! held at the moment the scope was appended. Name lookup in the
//! parent is bounded by that index, so a reference inside a child
//! scope only sees symbols the parent had declared before the child
//! was opened.

use cmmc_par::tree::TreeNode;
use cmmc_util::Span;

use crate::error::SemanticError;
use crate::types::SymType;

/// Index of a scope in the table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A declared symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: SymType,
    /// The scope the symbol was declared in.
    pub scope: ScopeId,
    pub span: Span,
}

/// A single scope: parent link, children in open order, symbols in
/// declaration order, and the tie index into the parent.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub symbols: Vec<Symbol>,
    /// Parent symbol count when this scope was appended.
    pub tie: usize,
}

/// The scope tree of one compilation.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// The root scope.
    pub const ROOT: ScopeId = ScopeId(0);

    /// Create a table holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                children: Vec::new(),
                symbols: Vec::new(),
                tie: 0,
            }],
        }
    }

    /// Open a new child scope of `parent`.
    pub fn open_scope(&mut self, parent: ScopeId) -> ScopeId {
        let tie = self.scopes[parent.index()].symbols.len();
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            children: Vec::new(),
            symbols: Vec::new(),
            tie,
        });
        self.scopes[parent.index()].children.push(id);
        id
    }

    /// Access a scope by id.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Number of scopes in the table.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Insert a symbol, failing if the name is already visible from
    /// `scope` through the tie-bounded ancestor chain.
    pub fn insert(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        ty: SymType,
        span: Span,
    ) -> Result<(), SemanticError> {
        let name = name.into();
        if self.find(scope, &name).is_some() {
            return Err(SemanticError::Redefined { name, span });
        }
        self.push_symbol(scope, name, ty, span);
        Ok(())
    }

    /// Insert a function parameter without a redefinition check;
    /// parameter names may shadow globals.
    pub fn insert_param(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        ty: SymType,
        span: Span,
    ) {
        self.push_symbol(scope, name.into(), ty, span);
    }

    fn push_symbol(&mut self, scope: ScopeId, name: String, ty: SymType, span: Span) {
        self.scopes[scope.index()].symbols.push(Symbol {
            name,
            ty,
            scope,
            span,
        });
    }

    /// Look up `name` starting from `scope`.
    ///
    /// The starting scope is searched back-to-front in full; each
    /// parent is searched only up to the tie index recorded when the
    /// descent path was opened.
    pub fn find(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut id = scope;
        let mut end = self.scopes[scope.index()].symbols.len();
        loop {
            let scope = &self.scopes[id.index()];
            if let Some(symbol) = scope.symbols[..end].iter().rev().find(|s| s.name == name) {
                return Some(symbol);
            }
            match scope.parent {
                Some(parent) => {
                    end = scope.tie;
                    id = parent;
                }
                None => return None,
            }
        }
    }

    /// Render the scope tree as tree text.
    pub fn dump(&self) -> String {
        self.scope_node(Self::ROOT).render()
    }

    fn scope_node(&self, id: ScopeId) -> TreeNode {
        let scope = self.scope(id);
        let mut node = TreeNode::new("Scope");
        for symbol in &scope.symbols {
            node.push(TreeNode::leaf(&symbol.ty.to_string(), &symbol.name));
        }
        for &child in &scope.children {
            node.push(self.scope_node(child));
        }
        node
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
