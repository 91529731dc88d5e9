//! Scope and type resolution for Story
//!
//! This crate runs after parsing and before code generation. It builds a
//! scope forest, binds every assigned variable to a typed symbol, checks
//! reassignments and function returns against the types already known, and
//! attaches the scopes it creates to the syntax nodes that own them.
//!
//! # Architecture
//!
//! The pass consists of:
//! - **Scope forest** ([`ScopeTree`]): arena of scopes linked to their parents
//!   by index; functions start new roots
//! - **Collaborators** ([`PathResolver`], [`ExpressionResolver`],
//!   [`ReturnChecker`]): typing of paths, expressions, annotations and
//!   returns, with [`DefaultResolver`] as the built-in implementation
//! - **Type resolver** ([`TypeResolver`]): the traversal deciding which scope
//!   each construct uses
//! - **Semantic errors** ([`SemanticError`]): the first error aborts the pass
//!
//! # Usage
//!
//! ```rust,ignore
//! use ss_resolve::TypeResolver;
//!
//! let resolution = TypeResolver::resolve(&tree, &interner)?;
//! let scope = resolution.scope_of(tree.root()).unwrap();
//! ```

pub mod collab;
pub mod error;
mod expr;
mod path;
pub mod resolver;
mod returns;
pub mod scope;

pub use collab::{
    Collaborators, DefaultResolver, ExpressionResolver, PathResolver, ResolveContext,
    ReturnChecker,
};
pub use error::{ErrorKind, SemanticError};
pub use resolver::{ScopeResolution, TypeResolver};
pub use scope::{Scope, ScopeAnnotations, ScopeId, ScopeKind, ScopeTree, Symbol};
