//! Expression and annotation typing

use crate::collab::{DefaultResolver, ExpressionResolver, PathResolver, ResolveContext};
use crate::error::{ErrorKind, SemanticError};
use crate::scope::ScopeId;
use ss_syntax::{NodeId, SyntaxKind};
use ss_ty::{BinaryOp, Type, UnaryOp};

impl ExpressionResolver for DefaultResolver {
    fn resolve_expression_type(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        expr: NodeId,
    ) -> Result<Type, SemanticError> {
        let tree = cx.tree;
        let ty = match tree.kind(expr) {
            SyntaxKind::BaseExpression | SyntaxKind::Expression => {
                let inner = single_child(cx, expr)?;
                self.resolve_expression_type(cx, scope, inner)?
            }
            SyntaxKind::Number => {
                if tree.text(expr).contains(['.', 'e', 'E']) {
                    Type::Float
                } else {
                    Type::Int
                }
            }
            SyntaxKind::String => Type::String,
            SyntaxKind::Boolean => Type::Boolean,
            SyntaxKind::Time => Type::Time,
            SyntaxKind::Regexp => Type::Regexp,
            SyntaxKind::Void => Type::Any,
            SyntaxKind::List => {
                let items = tree
                    .children(expr)
                    .iter()
                    .map(|&item| self.resolve_expression_type(cx, scope, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Type::list(Type::join_all(&items))
            }
            SyntaxKind::Map => {
                let mut keys = Vec::new();
                let mut values = Vec::new();
                for item in tree.children_of_kind(expr, SyntaxKind::MapItem) {
                    let [key, value] = tree.children(item) else {
                        return Err(SemanticError::malformed(tree, item, SyntaxKind::BaseExpression));
                    };
                    keys.push(self.resolve_expression_type(cx, scope, *key)?);
                    values.push(self.resolve_expression_type(cx, scope, *value)?);
                }
                Type::map(Type::join_all(&keys), Type::join_all(&values))
            }
            SyntaxKind::Path => self.resolve_path(cx, scope, expr, true)?.into_ty(),
            SyntaxKind::BinaryExpression => self.binary_type(cx, scope, expr)?,
            SyntaxKind::UnaryExpression => self.unary_type(cx, scope, expr)?,
            kind => {
                return Err(SemanticError::new(
                    ErrorKind::NotAnExpression { kind },
                    tree,
                    expr,
                ));
            }
        };
        Ok(ty)
    }

    fn resolve_declared_type(
        &self,
        cx: &ResolveContext<'_>,
        types: NodeId,
    ) -> Result<Type, SemanticError> {
        let tree = cx.tree;
        let args = tree
            .children_of_kind(types, SyntaxKind::Types)
            .map(|arg| self.resolve_declared_type(cx, arg))
            .collect::<Result<Vec<_>, _>>()?;
        let arity = args.len();
        Type::from_annotation(tree.text(types), args).ok_or_else(|| {
            let name = if arity == 0 {
                tree.text(types).to_string()
            } else {
                format!("{}[{arity} arguments]", tree.text(types))
            };
            SemanticError::new(ErrorKind::TypeNameUnknown { name }, tree, types)
        })
    }
}

impl DefaultResolver {
    fn binary_type(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        expr: NodeId,
    ) -> Result<Type, SemanticError> {
        let tree = cx.tree;
        let symbol = tree.text(expr);
        let op = BinaryOp::from_symbol(symbol).ok_or_else(|| {
            SemanticError::new(ErrorKind::OperatorUnknown { op: symbol.to_string() }, tree, expr)
        })?;
        let [lhs, rhs] = tree.children(expr) else {
            return Err(SemanticError::malformed(tree, expr, SyntaxKind::BaseExpression));
        };
        let left = self.resolve_expression_type(cx, scope, *lhs)?;
        let right = self.resolve_expression_type(cx, scope, *rhs)?;
        op.result_type(&left, &right).ok_or_else(|| {
            SemanticError::new(
                ErrorKind::TypeOperationIncompatible {
                    op: op.to_string(),
                    left,
                    right,
                },
                tree,
                expr,
            )
        })
    }

    fn unary_type(
        &self,
        cx: &ResolveContext<'_>,
        scope: ScopeId,
        expr: NodeId,
    ) -> Result<Type, SemanticError> {
        let tree = cx.tree;
        let symbol = tree.text(expr);
        let op = UnaryOp::from_symbol(symbol).ok_or_else(|| {
            SemanticError::new(ErrorKind::OperatorUnknown { op: symbol.to_string() }, tree, expr)
        })?;
        let operand_node = single_child(cx, expr)?;
        let operand = self.resolve_expression_type(cx, scope, operand_node)?;
        op.result_type(&operand).ok_or_else(|| {
            SemanticError::new(
                ErrorKind::TypeUnaryIncompatible {
                    op: op.to_string(),
                    operand,
                },
                tree,
                expr,
            )
        })
    }
}

fn single_child(cx: &ResolveContext<'_>, node: NodeId) -> Result<NodeId, SemanticError> {
    cx.tree
        .children(node)
        .first()
        .copied()
        .ok_or_else(|| SemanticError::malformed(cx.tree, node, SyntaxKind::BaseExpression))
}
