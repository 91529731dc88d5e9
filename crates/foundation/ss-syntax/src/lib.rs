//! Syntax tree for Story sources
//!
//! Trees are produced by the parser (or by [`TreeBuilder`] in tests and
//! tools) and consumed by the semantic passes. Nodes live in an arena and are
//! addressed by [`NodeId`]; identifiers and literals are leaf nodes whose
//! source text is kept in [`SyntaxNode::text`].

mod builder;

pub use builder::TreeBuilder;

use la_arena::{Arena, Idx};
use ss_span::Span;
use std::fmt;

/// Index of a node inside a [`SyntaxTree`]
pub type NodeId = Idx<SyntaxNode>;

/// A single syntax tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// The kind of this node
    pub kind: SyntaxKind,
    /// Source location
    pub span: Span,
    /// Source text (identifiers, literals, operators)
    pub text: String,
    /// Child nodes, in source order
    pub children: Vec<NodeId>,
}

/// Every node kind the grammar can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root of a story
    Start,
    /// A single statement slot
    Block,
    /// Simple statement wrapper
    Rules,
    /// Indented statement list
    NestedBlock,

    /// `path = expression`
    Assignment,
    /// Right-hand side of an assignment
    AssignmentFragment,
    /// Variable reference with optional fragments (`a`, `a[0]`, `a.b`)
    Path,
    /// Field access or index following a path head
    PathFragment,
    /// `return` with an optional expression
    ReturnStatement,
    /// Expression evaluated for its side effects
    AbsoluteExpression,

    /// `if` with its branches
    IfBlock,
    /// Condition of an `if`
    IfStatement,
    /// `else if` branch
    ElseifBlock,
    /// Condition of an `else if`
    ElseifStatement,
    /// `else` branch
    ElseBlock,
    /// `while` loop
    WhileBlock,
    /// Condition of a `while`
    WhileStatement,
    /// `when` block
    WhenBlock,
    /// Subject of a `when`
    WhenStatement,
    /// `foreach` loop
    ForeachBlock,
    /// Iterated expression and loop variables
    ForeachStatement,
    /// Loop variable names
    Output,
    /// `try` with its handlers
    TryBlock,
    /// `catch` handler
    CatchBlock,
    /// Exception binding of a `catch`
    CatchStatement,
    /// `finally` handler
    FinallyBlock,

    /// Function definition
    FunctionBlock,
    /// Function signature
    FunctionStatement,
    /// `name:type` parameter
    TypedArgument,
    /// `returns type` clause
    FunctionOutput,
    /// Type annotation; `text` holds the base name, children the type arguments
    Types,

    /// Expression wrapper
    BaseExpression,
    /// Parenthesised expression
    Expression,
    /// Binary operation; `text` holds the operator
    BinaryExpression,
    /// Unary operation; `text` holds the operator
    UnaryExpression,
    /// Integer or float literal
    Number,
    /// String literal
    String,
    /// `true` / `false`
    Boolean,
    /// Duration literal such as `5m`
    Time,
    /// Regular expression literal
    Regexp,
    /// `null`
    Void,
    /// List literal
    List,
    /// Map literal
    Map,
    /// `key: value` entry of a map literal
    MapItem,

    /// Identifier token
    Name,
}

impl SyntaxKind {
    /// Grammar rule name of this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Block => "block",
            Self::Rules => "rules",
            Self::NestedBlock => "nested_block",
            Self::Assignment => "assignment",
            Self::AssignmentFragment => "assignment_fragment",
            Self::Path => "path",
            Self::PathFragment => "path_fragment",
            Self::ReturnStatement => "return_statement",
            Self::AbsoluteExpression => "absolute_expression",
            Self::IfBlock => "if_block",
            Self::IfStatement => "if_statement",
            Self::ElseifBlock => "elseif_block",
            Self::ElseifStatement => "elseif_statement",
            Self::ElseBlock => "else_block",
            Self::WhileBlock => "while_block",
            Self::WhileStatement => "while_statement",
            Self::WhenBlock => "when_block",
            Self::WhenStatement => "when_statement",
            Self::ForeachBlock => "foreach_block",
            Self::ForeachStatement => "foreach_statement",
            Self::Output => "output",
            Self::TryBlock => "try_block",
            Self::CatchBlock => "catch_block",
            Self::CatchStatement => "catch_statement",
            Self::FinallyBlock => "finally_block",
            Self::FunctionBlock => "function_block",
            Self::FunctionStatement => "function_statement",
            Self::TypedArgument => "typed_argument",
            Self::FunctionOutput => "function_output",
            Self::Types => "types",
            Self::BaseExpression => "base_expression",
            Self::Expression => "expression",
            Self::BinaryExpression => "binary_expression",
            Self::UnaryExpression => "unary_expression",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Time => "time",
            Self::Regexp => "regexp",
            Self::Void => "void",
            Self::List => "list",
            Self::Map => "map",
            Self::MapItem => "map_item",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A parsed story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Arena<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    /// Wrap an arena whose `root` node is the story entry point
    #[must_use]
    pub const fn new(nodes: Arena<SyntaxNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    /// The root node
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id]
    }

    /// Kind of a node
    #[must_use]
    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id].kind
    }

    /// Source text of a node
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id].text
    }

    /// Source span of a node
    #[must_use]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }

    /// Children of a node, in source order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// First child of `kind`
    #[must_use]
    pub fn child(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children_of_kind(id, kind).next()
    }

    /// All children of `kind`
    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: SyntaxKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) == kind)
    }

    /// Iterate over every node id in allocation order
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|(id, _)| id)
    }

    /// Render the tree as an indented outline, one node per line
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_node(self.root, 0, &mut out);
        out
    }

    fn outline_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.kind.as_str());
        if !node.text.is_empty() {
            out.push(' ');
            out.push_str(&node.text);
        }
        out.push('\n');
        for &child in &node.children {
            self.outline_node(child, depth + 1, out);
        }
    }
}
