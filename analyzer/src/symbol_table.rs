//! Scoped symbol table for one analysis run.
//!
//! Scopes form a stack over a persistent global scope. A program unit pushes
//! a scope on entry and pops it on exit; name lookup walks from the
//! innermost scope out to the global scope, so a local declaration shadows a
//! global one. All name comparison goes through `Id` and is therefore
//! case-insensitive.

use plcheck_dsl::common::TypeSpec;
use plcheck_dsl::core::Id;

/// How a symbol entered its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Input variable of the unit's interface.
    Input,
    /// Output variable of the unit's interface.
    Output,
    /// In-out variable of the unit's interface.
    InOut,
    /// Variable local to the unit.
    Local,
    /// Variable of a file-scope list.
    Global,
    /// Constant declaration.
    Constant,
    /// Control variable implicitly declared by a `FOR` statement.
    ControlVariable,
    /// The implicit return variable of a function, named after it.
    ReturnValue,
}

impl SymbolKind {
    /// Interface variables are written and read by the caller, so they are
    /// never reported as unused.
    pub fn is_interface(&self) -> bool {
        matches!(
            self,
            SymbolKind::Input | SymbolKind::Output | SymbolKind::InOut
        )
    }
}

/// One declared name. The flags are flipped in place as the analyzer
/// observes initializers, assignments and references.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: Id,
    pub declared_type: TypeSpec,
    pub kind: SymbolKind,
    pub declaration_line: usize,
    pub initialized: bool,
    pub used: bool,
}

impl Symbol {
    pub fn new(name: Id, declared_type: TypeSpec, kind: SymbolKind) -> Self {
        let declaration_line = name.span.start.line;
        Symbol {
            name,
            declared_type,
            kind,
            declaration_line,
            initialized: false,
            used: false,
        }
    }

    /// The full declared type name, as used for type comparisons.
    pub fn type_name(&self) -> Id {
        self.declared_type.type_name()
    }
}

/// Identifies a scope for diagnostics and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    /// Scope of a named program unit.
    Named(Id),
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeKind::Global => write!(f, "(global)"),
            ScopeKind::Named(name) => write!(f, "{}", name),
        }
    }
}

/// One lexical region of visible names. Symbols are kept in declaration
/// order so scope-wide reports are deterministic.
#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    symbols: Vec<Symbol>,
}

impl Scope {
    fn find(&self, name: &Id) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| &symbol.name == name)
    }

    fn find_mut(&mut self, name: &Id) -> Option<&mut Symbol> {
        self.symbols.iter_mut().find(|symbol| &symbol.name == name)
    }
}

/// The scope stack. The global scope is created up front and never popped.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope {
                kind: ScopeKind::Global,
                symbols: vec![],
            }],
        }
    }

    pub fn enter_scope(&mut self, name: &Id) {
        self.scopes.push(Scope {
            kind: ScopeKind::Named(name.clone()),
            symbols: vec![],
        });
    }

    /// Pops the innermost scope and returns its symbols in declaration
    /// order. The global scope is never popped; popping there returns
    /// nothing.
    pub fn exit_scope(&mut self) -> Vec<Symbol> {
        if self.scopes.len() <= 1 {
            return vec![];
        }
        self.scopes
            .pop()
            .map(|scope| scope.symbols)
            .unwrap_or_default()
    }

    /// Declares the symbol in the innermost scope. Returns false, without
    /// inserting, when the name is already declared there: the first
    /// declaration stays in place.
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.find(&symbol.name).is_some() {
                return false;
            }
            scope.symbols.push(symbol);
            return true;
        }
        false
    }

    /// First match walking from the innermost scope out to the global one.
    pub fn lookup(&self, name: &Id) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.find(name))
    }

    pub fn mark_used(&mut self, name: &Id) {
        if let Some(symbol) = self.lookup_mut(name) {
            symbol.used = true;
        }
    }

    pub fn mark_initialized(&mut self, name: &Id) {
        if let Some(symbol) = self.lookup_mut(name) {
            symbol.initialized = true;
        }
    }

    fn lookup_mut(&mut self, name: &Id) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.find_mut(name))
    }

    /// Every symbol in the live scopes, outermost scope first.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.scopes.iter().flat_map(|scope| scope.symbols.iter())
    }

    /// Symbols in live scopes that were never read.
    pub fn unused_variables(&self) -> Vec<&Symbol> {
        self.symbols().filter(|symbol| !symbol.used).collect()
    }

    /// Symbols in live scopes that were never given a value and never read.
    pub fn uninitialized_variables(&self) -> Vec<&Symbol> {
        self.symbols()
            .filter(|symbol| !symbol.initialized && !symbol.used)
            .collect()
    }

    pub fn current_scope(&self) -> &ScopeKind {
        match self.scopes.last() {
            Some(scope) => &scope.kind,
            None => &ScopeKind::Global,
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
