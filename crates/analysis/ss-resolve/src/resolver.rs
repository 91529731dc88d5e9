//! Scope and type resolution pass
//!
//! Walks the tree once, depth first. Each node kind decides which scope its
//! children see:
//!
//! - `start`, `nested_block`, `foreach_block` and `function_block` open a new
//!   scope and record it in [`ScopeAnnotations`];
//! - `if`/`elseif`/`else`/`while`/`when` visit their body's statements in the
//!   scope they received, so bindings made inside stay visible afterwards;
//! - `catch` and `finally` dispatch generically, which reaches their body's
//!   `nested_block` handler and so gives them a child scope;
//! - functions start a fresh root holding only their parameters.

use crate::collab::{Collaborators, DefaultResolver, ResolveContext};
use crate::error::{ErrorKind, SemanticError};
use crate::scope::{ScopeAnnotations, ScopeId, ScopeKind, ScopeTree, Symbol};
use ss_intern::{Interner, Name};
use ss_syntax::{NodeId, SyntaxKind, SyntaxTree};
use ss_ty::Type;

/// Result of resolving a story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeResolution {
    /// Scope forest built during resolution
    pub scopes: ScopeTree,
    /// Scope attached to each scoped node
    pub annotations: ScopeAnnotations,
}

impl ScopeResolution {
    /// Scope attached to `node`
    #[must_use]
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.annotations.get(node)
    }

    /// Resolve `name` as seen from the scope attached to `node`
    #[must_use]
    pub fn lookup_at(&self, node: NodeId, name: Name) -> Option<&Symbol> {
        self.scope_of(node)
            .and_then(|scope| self.scopes.lookup(scope, name))
    }
}

/// Scope and type resolver for one syntax tree
pub struct TypeResolver<'a, C = DefaultResolver> {
    /// Tree being resolved
    tree: &'a SyntaxTree,
    /// Interner for identifier names
    interner: &'a Interner,
    /// Path, expression and return collaborators
    collaborators: C,
    /// Scope forest being built
    scopes: ScopeTree,
    /// Scope attached to each scoped node
    annotations: ScopeAnnotations,
}

impl<'a> TypeResolver<'a> {
    /// Resolve `tree` with the built-in collaborators
    ///
    /// # Errors
    ///
    /// Returns the first semantic error found in depth-first order.
    pub fn resolve(
        tree: &'a SyntaxTree,
        interner: &'a Interner,
    ) -> Result<ScopeResolution, SemanticError> {
        Self::with_collaborators(tree, interner, DefaultResolver).run()
    }
}

impl<'a, C: Collaborators> TypeResolver<'a, C> {
    /// Create a resolver using custom collaborators
    pub fn with_collaborators(tree: &'a SyntaxTree, interner: &'a Interner, collaborators: C) -> Self {
        Self {
            tree,
            interner,
            collaborators,
            scopes: ScopeTree::new(),
            annotations: ScopeAnnotations::new(),
        }
    }

    /// Run the pass over the whole tree
    ///
    /// # Errors
    ///
    /// Returns the first semantic error found in depth-first order, or
    /// `ErrorKind::MalformedTree` if the root is not a `start` node.
    #[tracing::instrument(skip_all, fields(nodes = self.tree.len()))]
    pub fn run(mut self) -> Result<ScopeResolution, SemanticError> {
        let root = self.tree.root();
        if self.tree.kind(root) != SyntaxKind::Start {
            return Err(SemanticError::new(
                ErrorKind::MalformedTree {
                    parent: self.tree.kind(root),
                    expected: SyntaxKind::Start,
                },
                self.tree,
                root,
            ));
        }
        self.start(root)?;
        tracing::debug!(scopes = self.scopes.len(), "resolution finished");
        Ok(ScopeResolution {
            scopes: self.scopes,
            annotations: self.annotations,
        })
    }

    fn context(&self) -> ResolveContext<'_> {
        ResolveContext::new(self.tree, self.interner, &self.scopes, &self.annotations)
    }

    fn required_child(&self, parent: NodeId, kind: SyntaxKind) -> Result<NodeId, SemanticError> {
        self.context().required_child(parent, kind)
    }

    fn attach(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        if self.annotations.attach(node, scope) {
            Ok(())
        } else {
            let kind = ErrorKind::ScopeAlreadyAttached {
                kind: self.tree.kind(node),
            };
            Err(SemanticError::new(kind, self.tree, node))
        }
    }

    fn expression_type(&self, expr: NodeId, scope: ScopeId) -> Result<Type, SemanticError> {
        self.collaborators
            .resolve_expression_type(&self.context(), scope, expr)
    }

    fn bind(&mut self, scope: ScopeId, name_node: NodeId, ty: Type) {
        let name = self.interner.intern(self.tree.text(name_node));
        tracing::debug!(
            name = self.tree.text(name_node),
            ty = %ty,
            scope = scope.0,
            "bind"
        );
        self.scopes.insert(scope, Symbol::new(name, ty));
    }

    /// Dispatch on the node kind
    fn visit(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let kind = self.tree.kind(node);
        tracing::trace!(%kind, scope = scope.0, "visit");
        match kind {
            SyntaxKind::Start => self.start(node),
            SyntaxKind::Block | SyntaxKind::Rules => self.visit_children(node, scope),
            SyntaxKind::NestedBlock => self.nested_block(node, scope),
            SyntaxKind::Assignment => self.assignment(node, scope),
            SyntaxKind::ForeachBlock => self.foreach_block(node, scope),
            SyntaxKind::WhileBlock | SyntaxKind::WhenBlock => self.loop_block(node, scope),
            SyntaxKind::IfBlock => self.if_block(node, scope),
            SyntaxKind::ElseifBlock => self.elseif_block(node, scope),
            SyntaxKind::ElseBlock => self.else_block(node, scope),
            SyntaxKind::TryBlock => self.try_block(node, scope),
            SyntaxKind::CatchBlock | SyntaxKind::FinallyBlock => self.visit_children(node, scope),
            SyntaxKind::FunctionBlock => self.function_block(node),

            // No handler: children see the same scope.
            SyntaxKind::AssignmentFragment
            | SyntaxKind::Path
            | SyntaxKind::PathFragment
            | SyntaxKind::ReturnStatement
            | SyntaxKind::AbsoluteExpression
            | SyntaxKind::IfStatement
            | SyntaxKind::ElseifStatement
            | SyntaxKind::WhileStatement
            | SyntaxKind::WhenStatement
            | SyntaxKind::ForeachStatement
            | SyntaxKind::Output
            | SyntaxKind::CatchStatement
            | SyntaxKind::FunctionStatement
            | SyntaxKind::TypedArgument
            | SyntaxKind::FunctionOutput
            | SyntaxKind::Types
            | SyntaxKind::BaseExpression
            | SyntaxKind::Expression
            | SyntaxKind::BinaryExpression
            | SyntaxKind::UnaryExpression
            | SyntaxKind::Number
            | SyntaxKind::String
            | SyntaxKind::Boolean
            | SyntaxKind::Time
            | SyntaxKind::Regexp
            | SyntaxKind::Void
            | SyntaxKind::List
            | SyntaxKind::Map
            | SyntaxKind::MapItem
            | SyntaxKind::Name => self.visit_children(node, scope),
        }
    }

    fn visit_children(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let tree = self.tree;
        for &child in tree.children(node) {
            self.visit(child, scope)?;
        }
        Ok(())
    }

    fn start(&mut self, node: NodeId) -> Result<(), SemanticError> {
        let scope = self.scopes.create_root(ScopeKind::Root);
        self.attach(node, scope)?;
        self.visit_children(node, scope)
    }

    fn nested_block(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let block_scope = self.scopes.create_child(scope, ScopeKind::Block);
        tracing::debug!(scope = block_scope.0, parent = scope.0, "open block scope");
        self.attach(node, block_scope)?;
        self.visit_children(node, block_scope)
    }

    fn assignment(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let path = self.required_child(node, SyntaxKind::Path)?;
        let target = self
            .collaborators
            .resolve_path(&self.context(), scope, path, false)?;

        let fragment = self.required_child(node, SyntaxKind::AssignmentFragment)?;
        let value = self.required_child(fragment, SyntaxKind::BaseExpression)?;
        let value_ty = self.expression_type(value, scope)?;

        if target.ty().is_none() {
            let ty = if value_ty.is_none() { Type::Any } else { value_ty };
            let head = self.required_child(path, SyntaxKind::Name)?;
            self.bind(scope, head, ty);
        } else if !target.ty().can_accept(&value_ty) {
            let kind = ErrorKind::TypeAssignmentDifferent {
                target_type: target.into_ty(),
                source_type: value_ty,
            };
            return Err(SemanticError::new(kind, self.tree, node));
        }

        self.visit_children(node, scope)
    }

    fn foreach_block(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let tree = self.tree;
        let loop_scope = self.scopes.create_child(scope, ScopeKind::Loop);
        tracing::debug!(scope = loop_scope.0, parent = scope.0, "open loop scope");
        self.attach(node, loop_scope)?;

        let statement = self.required_child(node, SyntaxKind::ForeachStatement)?;
        if let Some(iterable) = tree.child(statement, SyntaxKind::BaseExpression) {
            self.expression_type(iterable, scope)?;
        }
        let output = self.required_child(statement, SyntaxKind::Output)?;
        for name in tree.children_of_kind(output, SyntaxKind::Name) {
            // Element types of collections are not tracked.
            self.bind(loop_scope, name, Type::Any);
        }

        let body = self.required_child(node, SyntaxKind::NestedBlock)?;
        self.visit_children(body, loop_scope)
    }

    /// `while` and `when` bodies share the enclosing scope
    fn loop_block(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let body = self.required_child(node, SyntaxKind::NestedBlock)?;
        self.visit_children(body, scope)
    }

    fn if_block(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let tree = self.tree;
        let body = self.if_statement(node, scope)?;
        for branch in after_body(tree, node, body) {
            self.visit(branch, scope)?;
        }
        Ok(())
    }

    /// Condition and body of an `if`; returns the body node
    fn if_statement(&mut self, node: NodeId, scope: ScopeId) -> Result<NodeId, SemanticError> {
        let statement = self.required_child(node, SyntaxKind::IfStatement)?;
        let condition = self.required_child(statement, SyntaxKind::BaseExpression)?;
        self.expression_type(condition, scope)?;

        let body = self.required_child(node, SyntaxKind::NestedBlock)?;
        self.visit_children(body, scope)?;
        Ok(body)
    }

    fn elseif_block(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let statement = self.required_child(node, SyntaxKind::ElseifStatement)?;
        let condition = self.required_child(statement, SyntaxKind::BaseExpression)?;
        self.expression_type(condition, scope)?;

        let body = self.required_child(node, SyntaxKind::NestedBlock)?;
        self.visit_children(body, scope)
    }

    fn else_block(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let body = self.required_child(node, SyntaxKind::NestedBlock)?;
        self.visit_children(body, scope)
    }

    fn try_block(&mut self, node: NodeId, scope: ScopeId) -> Result<(), SemanticError> {
        let tree = self.tree;
        let body = self.required_child(node, SyntaxKind::NestedBlock)?;
        self.visit_children(body, scope)?;
        for handler in after_body(tree, node, body) {
            self.visit(handler, scope)?;
        }
        Ok(())
    }

    fn function_block(&mut self, node: NodeId) -> Result<(), SemanticError> {
        let statement = self.required_child(node, SyntaxKind::FunctionStatement)?;
        let (scope, return_type) = self.function_statement(statement)?;
        self.attach(node, scope)?;

        let body = self.required_child(node, SyntaxKind::NestedBlock)?;
        self.visit_children(body, scope)?;
        self.collaborators
            .check_returns(&self.context(), body, scope, &return_type)
    }

    /// Create the function's root scope holding its parameters
    fn function_statement(&mut self, node: NodeId) -> Result<(ScopeId, Type), SemanticError> {
        let tree = self.tree;
        let scope = self.scopes.create_root(ScopeKind::Function);
        tracing::debug!(scope = scope.0, "open function scope");

        for argument in tree.children_of_kind(node, SyntaxKind::TypedArgument) {
            let name = self.required_child(argument, SyntaxKind::Name)?;
            let types = self.required_child(argument, SyntaxKind::Types)?;
            let ty = self
                .collaborators
                .resolve_declared_type(&self.context(), types)?;
            self.bind(scope, name, ty);
        }

        let return_type = match tree.child(node, SyntaxKind::FunctionOutput) {
            Some(output) => {
                let types = self.required_child(output, SyntaxKind::Types)?;
                self.collaborators
                    .resolve_declared_type(&self.context(), types)?
            }
            None => Type::Any,
        };
        Ok((scope, return_type))
    }
}

/// Children of `node` that follow its body `nested_block`
fn after_body(tree: &SyntaxTree, node: NodeId, body: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.children(node)
        .iter()
        .copied()
        .skip_while(move |&child| child != body)
        .skip(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{ExpressionResolver, PathResolver, ReturnChecker};
    use ss_syntax::TreeBuilder;
    use std::cell::Cell;

    #[test]
    fn start_gets_root_scope() {
        let interner = Interner::new();
        let tree = TreeBuilder::new().story(Vec::new());

        let resolution = TypeResolver::resolve(&tree, &interner).unwrap();
        let root = resolution.scope_of(tree.root()).unwrap();
        assert_eq!(resolution.scopes.get_scope(root).parent, None);
        assert_eq!(resolution.scopes.get_scope(root).kind, ScopeKind::Root);
        assert_eq!(resolution.annotations.len(), 1);
    }

    #[test]
    fn root_must_be_start() {
        let interner = Interner::new();
        let mut builder = TreeBuilder::new();
        let body = builder.nested_block(Vec::new());
        let tree = builder.finish(body);

        let error = TypeResolver::resolve(&tree, &interner).unwrap_err();
        assert_eq!(
            error.kind,
            ErrorKind::MalformedTree {
                parent: SyntaxKind::NestedBlock,
                expected: SyntaxKind::Start,
            }
        );
    }

    #[test]
    fn missing_body_is_malformed() {
        let interner = Interner::new();
        let mut builder = TreeBuilder::new();
        let condition = builder.boolean(true);
        let statement = builder.node(SyntaxKind::WhileStatement, vec![condition]);
        let while_block = builder.node(SyntaxKind::WhileBlock, vec![statement]);
        let tree = builder.story(vec![while_block]);

        let error = TypeResolver::resolve(&tree, &interner).unwrap_err();
        assert_eq!(error.node, while_block);
        assert_eq!(error.code(), "malformed_tree");
    }

    #[test]
    fn first_assignment_binds_value_type() {
        let interner = Interner::new();
        let mut builder = TreeBuilder::new();
        let value = builder.string("hello");
        let assignment = builder.assign("greeting", value);
        let tree = builder.story(vec![assignment]);

        let resolution = TypeResolver::resolve(&tree, &interner).unwrap();
        let symbol = resolution
            .lookup_at(tree.root(), interner.intern("greeting"))
            .unwrap();
        assert_eq!(symbol.ty(), &Type::String);
    }

    #[test]
    fn null_assignment_binds_any() {
        let interner = Interner::new();
        let mut builder = TreeBuilder::new();
        let value = builder.null();
        let first = builder.assign("slot", value);
        let value = builder.int(3);
        let second = builder.assign("slot", value);
        let tree = builder.story(vec![first, second]);

        let resolution = TypeResolver::resolve(&tree, &interner).unwrap();
        let symbol = resolution
            .lookup_at(tree.root(), interner.intern("slot"))
            .unwrap();
        assert_eq!(symbol.ty(), &Type::Any);
    }

    /// Delegates to [`DefaultResolver`] but never rejects a return and counts
    /// path lookups.
    #[derive(Default)]
    struct LenientReturns {
        paths: Cell<usize>,
    }

    impl PathResolver for LenientReturns {
        fn resolve_path(
            &self,
            cx: &ResolveContext<'_>,
            scope: ScopeId,
            path: NodeId,
            check_existence: bool,
        ) -> Result<Symbol, SemanticError> {
            self.paths.set(self.paths.get() + 1);
            DefaultResolver.resolve_path(cx, scope, path, check_existence)
        }
    }

    impl ExpressionResolver for LenientReturns {
        fn resolve_expression_type(
            &self,
            cx: &ResolveContext<'_>,
            scope: ScopeId,
            expr: NodeId,
        ) -> Result<Type, SemanticError> {
            DefaultResolver.resolve_expression_type(cx, scope, expr)
        }

        fn resolve_declared_type(
            &self,
            cx: &ResolveContext<'_>,
            types: NodeId,
        ) -> Result<Type, SemanticError> {
            DefaultResolver.resolve_declared_type(cx, types)
        }
    }

    impl ReturnChecker for LenientReturns {
        fn check_returns(
            &self,
            _cx: &ResolveContext<'_>,
            _body: NodeId,
            _scope: ScopeId,
            _declared: &Type,
        ) -> Result<(), SemanticError> {
            Ok(())
        }
    }

    #[test]
    fn custom_collaborators_are_used() {
        let interner = Interner::new();
        let mut builder = TreeBuilder::new();
        let int = builder.types("int", Vec::new());
        let text = builder.string("s");
        let ret = builder.return_statement(Some(text));
        let function = builder.function_block("f", Vec::new(), Some(int), vec![ret]);
        let value = builder.int(1);
        let assignment = builder.assign("a", value);
        let tree = builder.story(vec![function, assignment]);

        let collaborators = LenientReturns::default();
        let resolution = TypeResolver::with_collaborators(&tree, &interner, &collaborators).run();
        assert!(resolution.is_ok());
        assert_eq!(collaborators.paths.get(), 1);

        let error = TypeResolver::resolve(&tree, &interner).unwrap_err();
        assert_eq!(error.code(), "return_type_mismatch");
    }
}
