//! Return statement checking

use crate::collab::{DefaultResolver, ExpressionResolver, ResolveContext, ReturnChecker};
use crate::error::{ErrorKind, SemanticError};
use crate::scope::ScopeId;
use ss_syntax::{NodeId, SyntaxKind};
use ss_ty::Type;

impl ReturnChecker for DefaultResolver {
    fn check_returns(
        &self,
        cx: &ResolveContext<'_>,
        body: NodeId,
        scope: ScopeId,
        declared: &Type,
    ) -> Result<(), SemanticError> {
        let tree = cx.tree;
        for &child in tree.children(body) {
            // Nodes that opened their own scope evaluate their returns there.
            let scope = cx.annotations.get(child).unwrap_or(scope);
            match tree.kind(child) {
                // Nested functions were checked against their own signature.
                SyntaxKind::FunctionBlock => {}
                SyntaxKind::ReturnStatement => {
                    let found = match tree.child(child, SyntaxKind::BaseExpression) {
                        Some(value) => self.resolve_expression_type(cx, scope, value)?,
                        None => Type::None,
                    };
                    if !declared.can_accept(&found) {
                        return Err(SemanticError::new(
                            ErrorKind::ReturnTypeMismatch {
                                expected: declared.clone(),
                                found,
                            },
                            tree,
                            child,
                        ));
                    }
                }
                _ => self.check_returns(cx, child, scope, declared)?,
            }
        }
        Ok(())
    }
}
