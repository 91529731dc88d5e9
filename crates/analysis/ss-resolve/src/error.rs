//! Semantic errors reported by scope and type resolution

use miette::{Diagnostic, LabeledSpan};
use rustc_hash::FxHashSet;
use ss_span::Span;
use ss_syntax::{NodeId, SyntaxKind, SyntaxTree};
use ss_ty::Type;
use std::fmt;
use thiserror::Error;

/// What went wrong
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Assignment to a typed variable with a value it can't hold
    #[error("can't assign `{source_type}` to a variable of type `{target_type}`")]
    TypeAssignmentDifferent {
        /// Type of the existing variable
        target_type: Type,
        /// Type of the assigned value
        source_type: Type,
    },

    /// Variable is not defined in any visible scope
    #[error("variable `{name}` has not been defined")]
    UnresolvedVariable {
        /// The name that was not found
        name: String,
        /// Similar visible names, closest first
        suggestions: Vec<String>,
    },

    /// A `return` value doesn't match the declared return type
    #[error("function returns `{expected}` but `{found}` is returned")]
    ReturnTypeMismatch {
        /// Declared return type
        expected: Type,
        /// Type of the returned value
        found: Type,
    },

    /// Binary operator applied to operands it doesn't support
    #[error("`{op}` can't be applied to `{left}` and `{right}`")]
    TypeOperationIncompatible {
        /// Operator token
        op: String,
        /// Left operand type
        left: Type,
        /// Right operand type
        right: Type,
    },

    /// Unary operator applied to an operand it doesn't support
    #[error("`{op}` can't be applied to `{operand}`")]
    TypeUnaryIncompatible {
        /// Operator token
        op: String,
        /// Operand type
        operand: Type,
    },

    /// Indexing or field access on a type without elements
    #[error("`{ty}` can't be indexed")]
    TypeIndexIncompatible {
        /// Type of the indexed value
        ty: Type,
    },

    /// Type annotation naming no known type
    #[error("unknown type `{name}`")]
    TypeNameUnknown {
        /// Annotation as written
        name: String,
    },

    /// Operator token the type rules don't know
    #[error("unknown operator `{op}`")]
    OperatorUnknown {
        /// Operator token
        op: String,
    },

    /// Node used as an expression that isn't one
    #[error("`{kind}` is not an expression")]
    NotAnExpression {
        /// Kind of the offending node
        kind: SyntaxKind,
    },

    /// A node lacks a child its grammar rule requires
    #[error("`{parent}` is missing its `{expected}`")]
    MalformedTree {
        /// Kind of the incomplete node
        parent: SyntaxKind,
        /// Kind of the missing child
        expected: SyntaxKind,
    },

    /// A node was given a second scope
    #[error("`{kind}` already has a scope attached")]
    ScopeAlreadyAttached {
        /// Kind of the node
        kind: SyntaxKind,
    },
}

impl ErrorKind {
    /// Stable identifier of the error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::TypeAssignmentDifferent { .. } => "type_assignment_different",
            Self::UnresolvedVariable { .. } => "unresolved_variable",
            Self::ReturnTypeMismatch { .. } => "return_type_mismatch",
            Self::TypeOperationIncompatible { .. } => "type_operation_incompatible",
            Self::TypeUnaryIncompatible { .. } => "type_unary_incompatible",
            Self::TypeIndexIncompatible { .. } => "type_index_incompatible",
            Self::TypeNameUnknown { .. } => "type_name_unknown",
            Self::OperatorUnknown { .. } => "operator_unknown",
            Self::NotAnExpression { .. } => "not_an_expression",
            Self::MalformedTree { .. } => "malformed_tree",
            Self::ScopeAlreadyAttached { .. } => "scope_already_attached",
        }
    }
}

/// A semantic error attached to the syntax node that caused it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct SemanticError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Offending node
    pub node: NodeId,
    /// Source location of the node
    pub span: Span,
}

impl SemanticError {
    /// Create an error located at `node`
    #[must_use]
    pub fn new(kind: ErrorKind, tree: &SyntaxTree, node: NodeId) -> Self {
        Self {
            kind,
            node,
            span: tree.span(node),
        }
    }

    /// Error for a missing required child
    #[must_use]
    pub fn malformed(tree: &SyntaxTree, parent: NodeId, expected: SyntaxKind) -> Self {
        let kind = ErrorKind::MalformedTree {
            parent: tree.kind(parent),
            expected,
        };
        Self::new(kind, tree, parent)
    }

    /// Stable identifier of the error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Diagnostic for SemanticError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.kind {
            ErrorKind::UnresolvedVariable { suggestions, .. } if !suggestions.is_empty() => {
                let names: Vec<String> = suggestions.iter().map(|name| format!("`{name}`")).collect();
                Some(Box::new(format!("did you mean {}?", names.join(" or "))))
            }
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_with_span(Some(self.kind.code().to_string()), self.span.range());
        Some(Box::new(std::iter::once(label)))
    }
}

/// Names from `available` close to `target`, closest first
pub(crate) fn compute_suggestions<'a>(
    target: &str,
    available: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut suggestions: Vec<(&str, usize)> = available
        .into_iter()
        .filter(|candidate| seen.insert(*candidate))
        .map(|candidate| (candidate, levenshtein_distance(target, candidate)))
        .filter(|&(_, distance)| distance <= 3) // Only suggest if distance is small
        .collect();

    suggestions.sort_by_key(|&(_, distance)| distance);
    suggestions
        .into_iter()
        .take(3)
        .map(|(candidate, _)| candidate.to_string())
        .collect()
}

/// Compute Levenshtein distance between two strings
fn levenshtein_distance(source: &str, target: &str) -> usize {
    let target: Vec<char> = target.chars().collect();
    let mut previous: Vec<usize> = (0..=target.len()).collect();

    for (idx, source_char) in source.chars().enumerate() {
        let mut current = vec![idx + 1; target.len() + 1];
        for (jdx, &target_char) in target.iter().enumerate() {
            let cost = usize::from(source_char != target_char);
            current[jdx + 1] = (previous[jdx + 1] + 1)
                .min(current[jdx] + 1)
                .min(previous[jdx] + cost);
        }
        previous = current;
    }

    previous[target.len()]
}
