//! Path resolution: `name`, `name[index]`, `name.field`

use crate::collab::{DefaultResolver, ExpressionResolver, PathResolver, ResolveContext};
use crate::error::{compute_suggestions, ErrorKind, SemanticError};
use crate::scope::{ScopeId, Symbol};
use ss_intern::Name;
use ss_syntax::{NodeId, SyntaxKind};
use ss_ty::Type;

impl PathResolver for DefaultResolver {
    fn resolve_path(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        path: NodeId,
        check_existence: bool,
    ) -> Result<Symbol, SemanticError> {
        let tree = cx.tree;
        let head = cx.required_child(path, SyntaxKind::Name)?;
        let name = cx.interner.intern(tree.text(head));
        let mut fragments = tree.children_of_kind(path, SyntaxKind::PathFragment).peekable();

        let Some(symbol) = cx.scopes.lookup(scope, name) else {
            if !check_existence && fragments.peek().is_none() {
                return Ok(Symbol::new(name, Type::None));
            }
            return Err(unresolved(cx, scope, name, head));
        };

        let mut ty = symbol.ty().clone();
        for fragment in fragments {
            ty = self.fragment_type(cx, scope, &ty, fragment)?;
        }
        Ok(Symbol::new(name, ty))
    }
}

impl DefaultResolver {
    /// Type reached by applying one fragment to a value of type `base`
    fn fragment_type(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        base: &Type,
        fragment: NodeId,
    ) -> Result<Type, SemanticError> {
        let tree = cx.tree;
        let key = tree
            .children(fragment)
            .first()
            .copied()
            .ok_or_else(|| SemanticError::malformed(tree, fragment, SyntaxKind::BaseExpression))?;
        let is_field = tree.kind(key) == SyntaxKind::Name;
        if !is_field {
            self.resolve_expression_type(cx, scope, key)?;
        }

        match base {
            Type::List(element) if !is_field => Ok(element.as_ref().clone()),
            Type::Map(_, value) => Ok(value.as_ref().clone()),
            Type::Any | Type::Object => Ok(Type::Any),
            _ => Err(SemanticError::new(
                ErrorKind::TypeIndexIncompatible { ty: base.clone() },
                tree,
                fragment,
            )),
        }
    }
}

fn unresolved(cx: &ResolveContext<'_>, scope: ScopeId, name: Name, node: NodeId) -> SemanticError {
    let visible = cx.scopes.visible_names(scope);
    let suggestions = compute_suggestions(
        cx.interner.resolve(&name),
        visible.iter().map(|candidate| cx.interner.resolve(candidate)),
    );
    tracing::debug!(name = cx.interner.resolve(&name), ?suggestions, "unresolved variable");
    SemanticError::new(
        ErrorKind::UnresolvedVariable {
            name: cx.interner.resolve(&name).to_string(),
            suggestions,
        },
        cx.tree,
        node,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ScopeAnnotations, ScopeKind, ScopeTree};
    use ss_intern::Interner;
    use ss_syntax::TreeBuilder;

    struct Fixture {
        interner: Interner,
        scopes: ScopeTree,
        annotations: ScopeAnnotations,
        root: ScopeId,
    }

    impl Fixture {
        fn new(bindings: &[(&str, Type)]) -> Self {
            let interner = Interner::new();
            let mut scopes = ScopeTree::new();
            let root = scopes.create_root(ScopeKind::Root);
            for (name, ty) in bindings {
                scopes.insert(root, Symbol::new(interner.intern(name), ty.clone()));
            }
            Self {
                interner,
                scopes,
                annotations: ScopeAnnotations::new(),
                root,
            }
        }

        fn resolve(
            &self,
            tree: &ss_syntax::SyntaxTree,
            path: NodeId,
            check_existence: bool,
        ) -> Result<Symbol, SemanticError> {
            let cx = ResolveContext::new(tree, &self.interner, &self.scopes, &self.annotations);
            DefaultResolver.resolve_path(&cx, self.root, path, check_existence)
        }
    }

    #[test]
    fn unbound_name_is_placeholder_when_unchecked() {
        let fixture = Fixture::new(&[]);
        let mut builder = TreeBuilder::new();
        let path = builder.path("fresh");
        let tree = builder.story(Vec::new());

        let symbol = fixture.resolve(&tree, path, false).unwrap();
        assert_eq!(symbol.ty(), &Type::None);
        assert_eq!(fixture.interner.resolve(&symbol.name()), "fresh");
    }

    #[test]
    fn unbound_name_is_error_when_checked() {
        let fixture = Fixture::new(&[("counter", Type::Int)]);
        let mut builder = TreeBuilder::new();
        let path = builder.path("countr");
        let tree = builder.story(Vec::new());

        let error = fixture.resolve(&tree, path, true).unwrap_err();
        assert_eq!(
            error.kind,
            ErrorKind::UnresolvedVariable {
                name: "countr".to_string(),
                suggestions: vec!["counter".to_string()],
            }
        );
    }

    #[test]
    fn fragments_on_unbound_name_are_errors_even_unchecked() {
        let fixture = Fixture::new(&[]);
        let mut builder = TreeBuilder::new();
        let index = builder.int(0);
        let path = builder.indexed_path("items", vec![index]);
        let tree = builder.story(Vec::new());

        let error = fixture.resolve(&tree, path, false).unwrap_err();
        assert_eq!(error.code(), "unresolved_variable");
    }

    #[test]
    fn indexing_yields_element_types() {
        let fixture = Fixture::new(&[
            ("numbers", Type::list(Type::Int)),
            ("ages", Type::map(Type::String, Type::Float)),
            ("data", Type::Object),
        ]);
        let mut builder = TreeBuilder::new();
        let zero = builder.int(0);
        let list_path = builder.indexed_path("numbers", vec![zero]);
        let map_path = builder.dotted_path("ages", &["tom"]);
        let object_path = builder.dotted_path("data", &["a", "b"]);
        let tree = builder.story(Vec::new());

        assert_eq!(fixture.resolve(&tree, list_path, true).unwrap().into_ty(), Type::Int);
        assert_eq!(fixture.resolve(&tree, map_path, true).unwrap().into_ty(), Type::Float);
        assert_eq!(fixture.resolve(&tree, object_path, true).unwrap().into_ty(), Type::Any);
    }

    #[test]
    fn indexing_scalars_is_rejected() {
        let fixture = Fixture::new(&[("n", Type::Int), ("xs", Type::list(Type::Int))]);
        let mut builder = TreeBuilder::new();
        let zero = builder.int(0);
        let scalar_path = builder.indexed_path("n", vec![zero]);
        let field_on_list = builder.dotted_path("xs", &["length"]);
        let tree = builder.story(Vec::new());

        let error = fixture.resolve(&tree, scalar_path, true).unwrap_err();
        assert_eq!(error.kind, ErrorKind::TypeIndexIncompatible { ty: Type::Int });
        let error = fixture.resolve(&tree, field_on_list, true).unwrap_err();
        assert_eq!(error.code(), "type_index_incompatible");
    }

    #[test]
    fn index_expressions_are_resolved() {
        let fixture = Fixture::new(&[("xs", Type::list(Type::Int))]);
        let mut builder = TreeBuilder::new();
        let index = builder.path("missing");
        let path = builder.indexed_path("xs", vec![index]);
        let tree = builder.story(Vec::new());

        let error = fixture.resolve(&tree, path, true).unwrap_err();
        assert_eq!(error.code(), "unresolved_variable");
    }
}
