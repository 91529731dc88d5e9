//! Integration test utilities for the Story front end

use anyhow::Result;
use ss_intern::Interner;
use ss_resolve::{ScopeResolution, SemanticError, TypeResolver};
use ss_syntax::{NodeId, SyntaxTree, TreeBuilder};
use ss_ty::Type;

/// A built story together with the interner used to resolve it
pub struct Story {
    /// The syntax tree
    pub tree: SyntaxTree,
    /// Interner shared by every resolution of this story
    pub interner: Interner,
}

impl Story {
    /// Build a story from top-level statements
    pub fn build(build: impl FnOnce(&mut TreeBuilder) -> Vec<NodeId>) -> Self {
        let mut builder = TreeBuilder::new();
        let statements = build(&mut builder);
        Self {
            tree: builder.story(statements),
            interner: Interner::new(),
        }
    }

    /// Run scope and type resolution
    ///
    /// # Errors
    ///
    /// Returns the first semantic error in the story.
    pub fn resolve(&self) -> Result<ScopeResolution, SemanticError> {
        TypeResolver::resolve(&self.tree, &self.interner)
    }

    /// Resolve, expecting an error
    ///
    /// # Panics
    ///
    /// Panics if resolution succeeds.
    #[must_use]
    pub fn resolve_err(&self) -> SemanticError {
        match self.resolve() {
            Ok(resolution) => panic!(
                "expected a semantic error, got scopes:\n{}",
                resolution.scopes.dump(&self.interner)
            ),
            Err(error) => error,
        }
    }

    /// Type of `name` as seen from the scope attached to `node`
    #[must_use]
    pub fn type_at(&self, resolution: &ScopeResolution, node: NodeId, name: &str) -> Option<Type> {
        let name = self.interner.get(name)?;
        resolution
            .lookup_at(node, name)
            .map(|symbol| symbol.ty().clone())
    }

    /// Type of `name` in the story's root scope
    #[must_use]
    pub fn root_type(&self, resolution: &ScopeResolution, name: &str) -> Option<Type> {
        self.type_at(resolution, self.tree.root(), name)
    }

    /// Resolve and render the scope forest
    ///
    /// # Errors
    ///
    /// Returns an error if resolution fails.
    pub fn dump(&self) -> Result<String> {
        let resolution = self.resolve()?;
        Ok(resolution.scopes.dump(&self.interner))
    }
}
