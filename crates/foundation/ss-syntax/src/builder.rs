//! Programmatic tree construction
//!
//! Leaf tokens are laid out one after another so every node gets a distinct,
//! stable span; composite nodes span their children.

use crate::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
use la_arena::Arena;
use ss_span::Span;

/// Helper to build syntax trees
#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: Arena<SyntaxNode>,
    offset: u32,
}

impl TreeBuilder {
    /// Creates a new tree builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a leaf node carrying source text
    pub fn token(&mut self, kind: SyntaxKind, text: impl Into<String>) -> NodeId {
        let text = text.into();
        let len = u32::try_from(text.len()).unwrap_or(u32::MAX);
        let span = Span::new(self.offset, self.offset.saturating_add(len));
        self.offset = span.end.saturating_add(1);
        self.arena.alloc(SyntaxNode {
            kind,
            span,
            text,
            children: Vec::new(),
        })
    }

    /// Allocate an interior node over `children`
    pub fn node(&mut self, kind: SyntaxKind, children: Vec<NodeId>) -> NodeId {
        self.node_with_text(kind, String::new(), children)
    }

    /// Allocate an interior node that also carries text (operators, type names)
    pub fn node_with_text(
        &mut self,
        kind: SyntaxKind,
        text: impl Into<String>,
        children: Vec<NodeId>,
    ) -> NodeId {
        let span = children
            .iter()
            .map(|&child| self.arena[child].span)
            .reduce(Span::cover)
            .unwrap_or_else(|| Span::new(self.offset, self.offset));
        self.arena.alloc(SyntaxNode {
            kind,
            span,
            text: text.into(),
            children,
        })
    }

    /// Gets a reference to a node
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SyntaxNode {
        &self.arena[id]
    }

    /// Consumes the builder, making `root` the tree's entry point
    #[must_use]
    pub fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree::new(self.arena, root)
    }

    /// Wrap statements in a `start` node and finish the tree
    #[must_use]
    pub fn story(mut self, statements: Vec<NodeId>) -> SyntaxTree {
        let blocks = self.statements(statements);
        let root = self.node(SyntaxKind::Start, blocks);
        self.finish(root)
    }

    /// Identifier token
    pub fn name(&mut self, text: &str) -> NodeId {
        self.token(SyntaxKind::Name, text)
    }

    /// Integer literal
    pub fn int(&mut self, value: i64) -> NodeId {
        self.token(SyntaxKind::Number, value.to_string())
    }

    /// Float literal
    pub fn float(&mut self, value: f64) -> NodeId {
        let mut text = value.to_string();
        if !text.contains(['.', 'e', 'E']) {
            text.push_str(".0");
        }
        self.token(SyntaxKind::Number, text)
    }

    /// String literal
    pub fn string(&mut self, value: &str) -> NodeId {
        self.token(SyntaxKind::String, format!("\"{value}\""))
    }

    /// Boolean literal
    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.token(SyntaxKind::Boolean, value.to_string())
    }

    /// `null` literal
    pub fn null(&mut self) -> NodeId {
        self.token(SyntaxKind::Void, "null")
    }

    /// Duration literal such as `5m`
    pub fn time(&mut self, text: &str) -> NodeId {
        self.token(SyntaxKind::Time, text)
    }

    /// Regular expression literal
    pub fn regexp(&mut self, pattern: &str) -> NodeId {
        self.token(SyntaxKind::Regexp, format!("/{pattern}/"))
    }

    /// List literal
    pub fn list(&mut self, items: Vec<NodeId>) -> NodeId {
        let items = items.into_iter().map(|item| self.expr(item)).collect();
        self.node(SyntaxKind::List, items)
    }

    /// Map literal from `(key, value)` expressions
    pub fn map(&mut self, entries: Vec<(NodeId, NodeId)>) -> NodeId {
        let items = entries
            .into_iter()
            .map(|(key, value)| {
                let key = self.expr(key);
                let value = self.expr(value);
                self.node(SyntaxKind::MapItem, vec![key, value])
            })
            .collect();
        self.node(SyntaxKind::Map, items)
    }

    /// Path consisting only of a variable name
    pub fn path(&mut self, head: &str) -> NodeId {
        self.indexed_path(head, Vec::new())
    }

    /// Path with index fragments, `head[i][j]`
    pub fn indexed_path(&mut self, head: &str, indices: Vec<NodeId>) -> NodeId {
        let mut children = vec![self.name(head)];
        for index in indices {
            let index = self.expr(index);
            children.push(self.node(SyntaxKind::PathFragment, vec![index]));
        }
        self.node(SyntaxKind::Path, children)
    }

    /// Path with field fragments, `head.a.b`
    pub fn dotted_path(&mut self, head: &str, fields: &[&str]) -> NodeId {
        let mut children = vec![self.name(head)];
        for field in fields {
            let field = self.name(field);
            children.push(self.node(SyntaxKind::PathFragment, vec![field]));
        }
        self.node(SyntaxKind::Path, children)
    }

    /// Binary operation
    pub fn binary(&mut self, op: &str, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.node_with_text(SyntaxKind::BinaryExpression, op, vec![lhs, rhs])
    }

    /// Unary operation
    pub fn unary(&mut self, op: &str, operand: NodeId) -> NodeId {
        self.node_with_text(SyntaxKind::UnaryExpression, op, vec![operand])
    }

    /// Wrap an expression in a `base_expression`
    pub fn expr(&mut self, inner: NodeId) -> NodeId {
        if self.arena[inner].kind == SyntaxKind::BaseExpression {
            return inner;
        }
        self.node(SyntaxKind::BaseExpression, vec![inner])
    }

    /// `target = value`
    pub fn assignment(&mut self, target: NodeId, value: NodeId) -> NodeId {
        let value = self.expr(value);
        let fragment = self.node(SyntaxKind::AssignmentFragment, vec![value]);
        self.node(SyntaxKind::Assignment, vec![target, fragment])
    }

    /// `name = value`
    pub fn assign(&mut self, name: &str, value: NodeId) -> NodeId {
        let target = self.path(name);
        self.assignment(target, value)
    }

    /// `return` with an optional value
    pub fn return_statement(&mut self, value: Option<NodeId>) -> NodeId {
        let children = value.map(|value| vec![self.expr(value)]).unwrap_or_default();
        self.node(SyntaxKind::ReturnStatement, children)
    }

    /// Expression statement
    pub fn absolute_expression(&mut self, value: NodeId) -> NodeId {
        let value = self.expr(value);
        self.node(SyntaxKind::AbsoluteExpression, vec![value])
    }

    /// Wrap a statement in the `block` (and `rules`) containers the grammar produces
    pub fn statement(&mut self, statement: NodeId) -> NodeId {
        let kind = self.arena[statement].kind;
        let inner = match kind {
            SyntaxKind::Assignment
            | SyntaxKind::ReturnStatement
            | SyntaxKind::AbsoluteExpression => self.node(SyntaxKind::Rules, vec![statement]),
            _ => statement,
        };
        self.node(SyntaxKind::Block, vec![inner])
    }

    fn statements(&mut self, statements: Vec<NodeId>) -> Vec<NodeId> {
        statements
            .into_iter()
            .map(|statement| self.statement(statement))
            .collect()
    }

    /// Indented body
    pub fn nested_block(&mut self, statements: Vec<NodeId>) -> NodeId {
        let blocks = self.statements(statements);
        self.node(SyntaxKind::NestedBlock, blocks)
    }

    /// `if cond ... [else if ...] [else ...]`
    ///
    /// `branches` are nodes built with [`Self::elseif_block`] and [`Self::else_block`].
    pub fn if_block(
        &mut self,
        condition: NodeId,
        body: Vec<NodeId>,
        branches: Vec<NodeId>,
    ) -> NodeId {
        let condition = self.expr(condition);
        let statement = self.node(SyntaxKind::IfStatement, vec![condition]);
        let body = self.nested_block(body);
        let mut children = vec![statement, body];
        children.extend(branches);
        self.node(SyntaxKind::IfBlock, children)
    }

    /// `else if cond ...`
    pub fn elseif_block(&mut self, condition: NodeId, body: Vec<NodeId>) -> NodeId {
        let condition = self.expr(condition);
        let statement = self.node(SyntaxKind::ElseifStatement, vec![condition]);
        let body = self.nested_block(body);
        self.node(SyntaxKind::ElseifBlock, vec![statement, body])
    }

    /// `else ...`
    pub fn else_block(&mut self, body: Vec<NodeId>) -> NodeId {
        let body = self.nested_block(body);
        self.node(SyntaxKind::ElseBlock, vec![body])
    }

    /// `while cond ...`
    pub fn while_block(&mut self, condition: NodeId, body: Vec<NodeId>) -> NodeId {
        let condition = self.expr(condition);
        let statement = self.node(SyntaxKind::WhileStatement, vec![condition]);
        let body = self.nested_block(body);
        self.node(SyntaxKind::WhileBlock, vec![statement, body])
    }

    /// `when subject ...`
    pub fn when_block(&mut self, subject: NodeId, body: Vec<NodeId>) -> NodeId {
        let subject = self.expr(subject);
        let statement = self.node(SyntaxKind::WhenStatement, vec![subject]);
        let body = self.nested_block(body);
        self.node(SyntaxKind::WhenBlock, vec![statement, body])
    }

    /// `foreach iterable as a, b ...`
    pub fn foreach_block(
        &mut self,
        iterable: NodeId,
        outputs: &[&str],
        body: Vec<NodeId>,
    ) -> NodeId {
        let iterable = self.expr(iterable);
        let names = outputs.iter().map(|output| self.name(output)).collect();
        let output = self.node(SyntaxKind::Output, names);
        let statement = self.node(SyntaxKind::ForeachStatement, vec![iterable, output]);
        let body = self.nested_block(body);
        self.node(SyntaxKind::ForeachBlock, vec![statement, body])
    }

    /// `try ...` followed by handlers built with [`Self::catch_block`] and
    /// [`Self::finally_block`]
    pub fn try_block(&mut self, body: Vec<NodeId>, handlers: Vec<NodeId>) -> NodeId {
        let body = self.nested_block(body);
        let mut children = vec![body];
        children.extend(handlers);
        self.node(SyntaxKind::TryBlock, children)
    }

    /// `catch [as name] ...`
    pub fn catch_block(&mut self, binding: Option<&str>, body: Vec<NodeId>) -> NodeId {
        let names = binding.map(|name| vec![self.name(name)]).unwrap_or_default();
        let statement = self.node(SyntaxKind::CatchStatement, names);
        let body = self.nested_block(body);
        self.node(SyntaxKind::CatchBlock, vec![statement, body])
    }

    /// `finally ...`
    pub fn finally_block(&mut self, body: Vec<NodeId>) -> NodeId {
        let body = self.nested_block(body);
        self.node(SyntaxKind::FinallyBlock, vec![body])
    }

    /// Type annotation such as `int` or `Map[string,int]`
    pub fn types(&mut self, name: &str, args: Vec<NodeId>) -> NodeId {
        self.node_with_text(SyntaxKind::Types, name, args)
    }

    /// `function name a:T ... [returns R]` with a body
    pub fn function_block(
        &mut self,
        name: &str,
        params: Vec<(&str, NodeId)>,
        output: Option<NodeId>,
        body: Vec<NodeId>,
    ) -> NodeId {
        let mut signature = vec![self.name(name)];
        for (param, ty) in params {
            let param = self.name(param);
            signature.push(self.node(SyntaxKind::TypedArgument, vec![param, ty]));
        }
        if let Some(output) = output {
            signature.push(self.node(SyntaxKind::FunctionOutput, vec![output]));
        }
        let statement = self.node(SyntaxKind::FunctionStatement, signature);
        let body = self.nested_block(body);
        self.node(SyntaxKind::FunctionBlock, vec![statement, body])
    }
}
