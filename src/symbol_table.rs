use crate::ast::Type;
use crate::error::{SemanticError, SemanticResult, SourceLocation};
use std::collections::HashMap;

pub type ScopeId = usize;
pub type SymbolId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub symbol_type: Type,
    pub kind: SymbolKind,
    pub scope_id: ScopeId,
    pub declared_at: SourceLocation,
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScopeKind {
    Global,
    Function { name: String },
    Block,
    ForLoop,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub symbols: HashMap<String, SymbolId>,
    pub depth: usize,
}

impl Scope {
    pub fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>, depth: usize) -> Self {
        Self {
            id,
            kind,
            parent,
            symbols: HashMap::new(),
            depth,
        }
    }

    pub fn get_symbol(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }
}

/// Scope-chained symbol table. Scopes live in an arena and point at their parent by index;
/// exited scopes are kept so symbols stay addressable by id.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    current_scope: ScopeId,
    global_scope: ScopeId,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(0, ScopeKind::Global, None, 0)],
            symbols: Vec::new(),
            current_scope: 0,
            global_scope: 0,
        }
    }

    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let scope_id = self.scopes.len();
        let depth = self.scopes[self.current_scope].depth + 1;
        self.scopes
            .push(Scope::new(scope_id, kind, Some(self.current_scope), depth));
        self.current_scope = scope_id;
        scope_id
    }

    /// Return to the parent scope. Exiting the global scope is a no-op.
    pub fn exit_scope(&mut self) -> ScopeId {
        if let Some(parent) = self.scopes[self.current_scope].parent {
            self.current_scope = parent;
        }
        self.current_scope
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current_scope
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global_scope
    }

    pub fn get_scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Insert a symbol into the current scope. A name may shadow one from an
    /// enclosing scope but must be unique within its own scope.
    pub fn declare(
        &mut self,
        name: &str,
        symbol_type: Type,
        kind: SymbolKind,
        location: SourceLocation,
    ) -> SemanticResult<SymbolId> {
        if self.lookup_current_scope(name).is_some() {
            return Err(SemanticError::Redeclared {
                name: name.to_string(),
                location,
            });
        }

        let symbol_id = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            symbol_type,
            kind,
            scope_id: self.current_scope,
            declared_at: location,
            used: false,
        });
        self.scopes[self.current_scope]
            .symbols
            .insert(name.to_string(), symbol_id);
        Ok(symbol_id)
    }

    /// Look up a symbol by name, searching from current scope up to global scope
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let mut scope_id = Some(self.current_scope);

        while let Some(id) = scope_id {
            let scope = &self.scopes[id];
            if let Some(symbol_id) = scope.get_symbol(name) {
                return Some(symbol_id);
            }
            scope_id = scope.parent;
        }

        None
    }

    /// Look up a symbol by name in the current scope only
    pub fn lookup_current_scope(&self, name: &str) -> Option<SymbolId> {
        self.scopes[self.current_scope].get_symbol(name)
    }

    /// Resolve `name` through the scope chain and mark it used.
    pub fn resolve(&mut self, name: &str, location: SourceLocation) -> SemanticResult<&Symbol> {
        let symbol_id = self.lookup(name).ok_or_else(|| SemanticError::Undeclared {
            name: name.to_string(),
            location,
        })?;
        let symbol = &mut self.symbols[symbol_id];
        symbol.used = true;
        Ok(symbol)
    }

    /// All unused variables (for diagnostics)
    pub fn get_unused_variables(&self) -> Vec<&Symbol> {
        self.symbols
            .iter()
            .filter(|symbol| !symbol.used && symbol.kind == SymbolKind::Variable)
            .collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
