//! Scope forest built by the resolver

use indexmap::IndexMap;
use la_arena::ArenaMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use ss_intern::{Interner, Name};
use ss_syntax::NodeId;
use ss_ty::Type;
use std::fmt::{self, Write as _};

/// Unique identifier for a scope
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    /// Story entry point
    Root,
    /// Generic nested block (including catch/finally bodies)
    Block,
    /// `foreach` body holding the loop variables
    Loop,
    /// Function body; never has a parent
    Function,
}

impl ScopeKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Block => "block",
            Self::Loop => "loop",
            Self::Function => "function",
        }
    }
}

/// A named, typed binding
///
/// Symbols are never updated in place: a later assignment to a typed name is
/// only checked against the existing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    name: Name,
    ty: Type,
}

impl Symbol {
    /// Create a symbol
    #[must_use]
    pub const fn new(name: Name, ty: Type) -> Self {
        Self { name, ty }
    }

    /// The symbol's name
    #[must_use]
    pub const fn name(&self) -> Name {
        self.name
    }

    /// The symbol's type
    #[must_use]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Take the type out of the symbol
    #[must_use]
    pub fn into_ty(self) -> Type {
        self.ty
    }
}

/// A single scope in the forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Enclosing scope (None for roots and functions)
    pub parent: Option<ScopeId>,
    /// Kind of scope
    pub kind: ScopeKind,
    /// Symbols defined directly in this scope, in first-definition order
    pub symbols: IndexMap<Name, Symbol, FxBuildHasher>,
}

impl Scope {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            symbols: IndexMap::default(),
        }
    }
}

/// All scopes created for one story
///
/// Function scopes start new roots, so this is a forest rather than a single
/// chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Create an empty forest
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, scope: Scope) -> ScopeId {
        let scope_id = ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(scope);
        scope_id
    }

    /// Create a scope without a parent
    pub fn create_root(&mut self, kind: ScopeKind) -> ScopeId {
        self.push(Scope::new(None, kind))
    }

    /// Create a child scope
    pub fn create_child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.push(Scope::new(Some(parent), kind))
    }

    /// Bind a symbol in `scope`, replacing any binding of the same name in
    /// that scope. Returns the replaced symbol.
    pub fn insert(&mut self, scope: ScopeId, symbol: Symbol) -> Option<Symbol> {
        self.scopes[scope.0 as usize]
            .symbols
            .insert(symbol.name(), symbol)
    }

    /// Symbol bound directly in `scope`
    #[must_use]
    pub fn lookup_local(&self, scope: ScopeId, name: Name) -> Option<&Symbol> {
        self.get_scope(scope).symbols.get(&name)
    }

    /// Resolve a name in a scope, walking up the scope chain
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: Name) -> Option<&Symbol> {
        self.ancestors(scope)
            .find_map(|scope_id| self.lookup_local(scope_id, name))
    }

    /// `scope` followed by each of its parents
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |&current| self.get_scope(current).parent)
    }

    /// Every name visible from `scope`, innermost first
    #[must_use]
    pub fn visible_names(&self, scope: ScopeId) -> Vec<Name> {
        self.ancestors(scope)
            .flat_map(|scope_id| self.get_scope(scope_id).symbols.keys().copied())
            .collect()
    }

    /// Get a scope by ID
    #[must_use]
    pub fn get_scope(&self, scope: ScopeId) -> &Scope {
        &self.scopes[scope.0 as usize]
    }

    /// Number of scopes
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope was created
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// All scopes with their IDs, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> + '_ {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId(index as u32), scope))
    }

    /// Scopes without a parent
    pub fn roots(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.iter()
            .filter(|(_, scope)| scope.parent.is_none())
            .map(|(scope_id, _)| scope_id)
    }

    /// Render every scope and its symbols, one scope per paragraph
    #[must_use]
    pub fn dump(&self, interner: &Interner) -> String {
        let mut out = String::new();
        for (scope_id, scope) in self.iter() {
            // Writing into a String cannot fail.
            let _written = write_scope(&mut out, interner, scope_id, scope);
        }
        out
    }
}

fn write_scope(
    out: &mut String,
    interner: &Interner,
    scope_id: ScopeId,
    scope: &Scope,
) -> fmt::Result {
    write!(out, "scope {} ({})", scope_id.0, scope.kind.as_str())?;
    if let Some(parent) = scope.parent {
        write!(out, " parent {}", parent.0)?;
    }
    writeln!(out)?;
    for symbol in scope.symbols.values() {
        writeln!(out, "  {}: {}", interner.resolve(&symbol.name), symbol.ty)?;
    }
    Ok(())
}

/// Scopes attached to syntax nodes
///
/// Each node receives at most one scope. `start`, `foreach_block` and
/// `function_block` nodes always get one after a successful run; a
/// `nested_block` gets one when it opened its own scope.
#[derive(Clone, Default)]
pub struct ScopeAnnotations {
    map: ArenaMap<NodeId, ScopeId>,
}

impl ScopeAnnotations {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `scope` to `node`. Returns `false` and leaves the table
    /// unchanged if the node already has a scope.
    #[must_use]
    pub fn attach(&mut self, node: NodeId, scope: ScopeId) -> bool {
        if self.map.get(node).is_some() {
            return false;
        }
        self.map.insert(node, scope);
        true
    }

    /// Scope attached to `node`
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<ScopeId> {
        self.map.get(node).copied()
    }

    /// Every annotated node with its scope, in node order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, ScopeId)> + '_ {
        self.map.iter().map(|(node, &scope)| (node, scope))
    }

    /// Number of annotated nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.values().count()
    }

    /// Whether no node is annotated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for ScopeAnnotations {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for ScopeAnnotations {}

impl fmt::Debug for ScopeAnnotations {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}
