//! Contracts the resolver relies on for paths, expressions and returns
//!
//! Every call receives the scope to work in explicitly; implementations keep
//! no per-call state, so one instance can serve any number of trees.

use crate::error::SemanticError;
use crate::scope::{ScopeAnnotations, ScopeId, ScopeTree, Symbol};
use ss_intern::Interner;
use ss_syntax::{NodeId, SyntaxKind, SyntaxTree};
use ss_ty::Type;

/// Read-only view of the resolution state handed to collaborators
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Tree being analyzed
    pub tree: &'a SyntaxTree,
    /// Interner for identifier names
    pub interner: &'a Interner,
    /// Scopes created so far
    pub scopes: &'a ScopeTree,
    /// Scopes attached to nodes so far
    pub annotations: &'a ScopeAnnotations,
}

impl<'a> ResolveContext<'a> {
    /// Bundle the resolution state
    #[must_use]
    pub const fn new(
        tree: &'a SyntaxTree,
        interner: &'a Interner,
        scopes: &'a ScopeTree,
        annotations: &'a ScopeAnnotations,
    ) -> Self {
        Self {
            tree,
            interner,
            scopes,
            annotations,
        }
    }

    /// First child of `parent` with `kind`, or a malformed-tree error
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::MalformedTree` if there is no such child.
    pub fn required_child(
        &self,
        parent: NodeId,
        kind: SyntaxKind,
    ) -> Result<NodeId, SemanticError> {
        self.tree
            .child(parent, kind)
            .ok_or_else(|| SemanticError::malformed(self.tree, parent, kind))
    }
}

/// Resolves a `path` node to the symbol it denotes
pub trait PathResolver {
    /// Resolve `path` in `scope`.
    ///
    /// With `check_existence` disabled an unbound plain name yields a symbol
    /// typed [`Type::None`] instead of an error.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::UnresolvedVariable` for unbound names (when
    /// checked) and `ErrorKind::TypeIndexIncompatible` for invalid fragments.
    fn resolve_path(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        path: NodeId,
        check_existence: bool,
    ) -> Result<Symbol, SemanticError>;
}

/// Computes static types of expressions and type annotations
pub trait ExpressionResolver {
    /// Static type of `expr` evaluated in `scope`
    ///
    /// # Errors
    ///
    /// Returns an error if the expression references unbound names or
    /// combines incompatible types.
    fn resolve_expression_type(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        expr: NodeId,
    ) -> Result<Type, SemanticError>;

    /// Type named by a `types` annotation node
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::TypeNameUnknown` for unknown names.
    fn resolve_declared_type(
        &self,
        cx: &ResolveContext<'_>,
        types: NodeId,
    ) -> Result<Type, SemanticError>;
}

/// Validates the `return` statements of a function body
pub trait ReturnChecker {
    /// Check every return in `body` against `declared`
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::ReturnTypeMismatch` for the first incompatible
    /// return value.
    fn check_returns(
        &self,
        cx: &ResolveContext<'_>,
        body: NodeId,
        scope: ScopeId,
        declared: &Type,
    ) -> Result<(), SemanticError>;
}

impl<T: PathResolver + ?Sized> PathResolver for &T {
    fn resolve_path(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        path: NodeId,
        check_existence: bool,
    ) -> Result<Symbol, SemanticError> {
        (**self).resolve_path(cx, scope, path, check_existence)
    }
}

impl<T: ExpressionResolver + ?Sized> ExpressionResolver for &T {
    fn resolve_expression_type(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        expr: NodeId,
    ) -> Result<Type, SemanticError> {
        (**self).resolve_expression_type(cx, scope, expr)
    }

    fn resolve_declared_type(
        &self,
        cx: &ResolveContext<'_>,
        types: NodeId,
    ) -> Result<Type, SemanticError> {
        (**self).resolve_declared_type(cx, types)
    }
}

impl<T: ReturnChecker + ?Sized> ReturnChecker for &T {
    fn check_returns(
        &self,
        cx: &ResolveContext<'_>,
        body: NodeId,
        scope: ScopeId,
        declared: &Type,
    ) -> Result<(), SemanticError> {
        (**self).check_returns(cx, body, scope, declared)
    }
}

/// Everything the resolver needs from its collaborators
pub trait Collaborators: PathResolver + ExpressionResolver + ReturnChecker {}

impl<T: PathResolver + ExpressionResolver + ReturnChecker> Collaborators for T {}

/// Built-in implementation of all collaborator contracts
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;
