//! The concrete parse tree.
//!
//! The grammar produces an untyped tree of nodes and tokens that mirrors the
//! source text. A separate builder walks this tree to create the syntax tree
//! objects. Keeping the stages apart means the grammar only has to get the
//! shape of the language right, and everything about meaning (which token is
//! a name, which child is the loop bound) lives in one place in the builder.

use crate::token::Token;
use plcheck_dsl::core::SourceSpan;

/// What a parse tree node represents.
///
/// One kind per grammar production that the builder needs to tell apart.
/// Variable block and literal nodes carry their distinguishing token as a
/// child instead of splitting into kinds per keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    /// The root. Children are the top-level declarations of one file.
    CompilationUnit,
    Program,
    FunctionBlock,
    Function,
    /// `TYPE .. END_TYPE` with one `TypeDecl` child per declared type.
    TypeBlock,
    TypeDecl,
    StructDef,
    EnumDef,
    EnumValue,
    AliasDef,
    VarBlock,
    VarDecl,
    TypeSpec,
    /// A value range `lo..hi`, used for array dimensions and CASE selectors.
    Range,
    /// A bracketed initializer list such as `[1, 2, 3]`.
    BracketInit,
    /// A statement list.
    Body,
    Assignment,
    CallStmt,
    If,
    ElsifClause,
    ElseClause,
    Case,
    CaseElement,
    For,
    While,
    Repeat,
    Exit,
    Return,
    EmptyStmt,
    Binary,
    Unary,
    Paren,
    Literal,
    Variable,
    FieldAccess,
    Subscript,
    Call,
    Arg,
}

/// A child of a parse tree node: either a nested node or a token from the
/// source.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseChild {
    Node(ParseNode),
    Token(Token),
}

impl ParseChild {
    pub fn span(&self) -> SourceSpan {
        match self {
            ParseChild::Node(node) => node.span.clone(),
            ParseChild::Token(token) => token.span.clone(),
        }
    }
}

/// An untyped parse tree node. The span covers all children.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
    pub kind: ParseKind,
    pub children: Vec<ParseChild>,
    pub span: SourceSpan,
}

impl ParseNode {
    /// Creates a node whose span covers its children, in child order.
    pub fn new(kind: ParseKind, children: Vec<ParseChild>) -> Self {
        let span = match children.first() {
            Some(first) => children
                .iter()
                .skip(1)
                .fold(first.span(), |span, child| span.join(&child.span())),
            None => SourceSpan::default(),
        };
        ParseNode {
            kind,
            children,
            span,
        }
    }

    /// Creates a node with no children spanning nothing, used as the root
    /// for files that fail to parse.
    pub fn empty(kind: ParseKind) -> Self {
        ParseNode {
            kind,
            children: vec![],
            span: SourceSpan::default(),
        }
    }

    /// The nested nodes among the children, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &ParseNode> {
        self.children.iter().filter_map(|child| match child {
            ParseChild::Node(node) => Some(node),
            ParseChild::Token(_) => None,
        })
    }

    /// The tokens among the children, in order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(|child| match child {
            ParseChild::Node(_) => None,
            ParseChild::Token(token) => Some(token),
        })
    }

    /// The node child at the index, counting nodes only.
    pub fn node(&self, index: usize) -> Option<&ParseNode> {
        self.nodes().nth(index)
    }

    /// The token child at the index, counting tokens only.
    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens().nth(index)
    }

    /// The nested nodes of the kind, in order.
    pub fn nodes_of(&self, kind: ParseKind) -> impl Iterator<Item = &ParseNode> {
        self.nodes().filter(move |node| node.kind == kind)
    }

    pub fn first_node(&self, kind: ParseKind) -> Option<&ParseNode> {
        self.nodes_of(kind).next()
    }

    /// The number of node children.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }
}

/// Builds the child list for a grammar action. Tokens come from the matched
/// slice by reference and are cloned into the tree.
#[derive(Default)]
pub struct Children {
    children: Vec<ParseChild>,
}

impl Children {
    pub fn new() -> Self {
        Children { children: vec![] }
    }

    pub fn node(mut self, node: ParseNode) -> Self {
        self.children.push(ParseChild::Node(node));
        self
    }

    pub fn token(mut self, token: &Token) -> Self {
        self.children.push(ParseChild::Token(token.clone()));
        self
    }

    pub fn opt_node(mut self, node: Option<ParseNode>) -> Self {
        if let Some(node) = node {
            self.children.push(ParseChild::Node(node));
        }
        self
    }

    pub fn nodes(mut self, nodes: Vec<ParseNode>) -> Self {
        self.children
            .extend(nodes.into_iter().map(ParseChild::Node));
        self
    }

    pub fn tokens(mut self, tokens: &[Token]) -> Self {
        self.children
            .extend(tokens.iter().cloned().map(ParseChild::Token));
        self
    }

    pub fn into_node(self, kind: ParseKind) -> ParseNode {
        ParseNode::new(kind, self.children)
    }
}
