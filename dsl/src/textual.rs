//! Provides definitions of objects from the IEC 61131-3 textual language,
//! that is, the statements and expressions inside a program unit body.
//!
//! See section 3.3.

use crate::core::{Id, Located, SourceSpan};
use std::fmt;

/// Identity of an expression node.
///
/// The builder assigns each expression a unique identity when constructing
/// the tree. Later passes record information about expressions (such as the
/// inferred type) in side tables keyed by this identity, so the tree itself
/// never changes after construction. Identity 0 means "not assigned" and is
/// used by trees built by hand in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExprId(pub u32);

/// Binary operators, including arithmetic, comparison and boolean operators.
///
/// See section 3.3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "MOD",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Xor => "XOR",
        };
        f.write_str(text)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Boolean complement.
    Not,
    /// Arithmetic negation.
    Neg,
}

/// The kind of a literal constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Real,
    /// Single-quoted single-byte character string.
    String,
    /// Double-quoted double-byte character string.
    WString,
    Bool,
    /// Duration literal such as `T#5s`. The text is kept as written.
    Time,
}

/// An expression.
///
/// The set is closed: anything the builder does not recognize becomes an
/// `Empty` expression carrying the original span, so consumers never need a
/// null check.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Literal(Literal),
    Variable(Box<VariableRef>),
    Call(Box<FunctionCall>),
    Empty(EmptyExpr),
}

impl ExprKind {
    pub fn id(&self) -> ExprId {
        match self {
            ExprKind::Binary(expr) => expr.id,
            ExprKind::Unary(expr) => expr.id,
            ExprKind::Literal(literal) => literal.id,
            ExprKind::Variable(variable) => variable.id,
            ExprKind::Call(call) => call.id,
            ExprKind::Empty(empty) => empty.id,
        }
    }

    /// Creates a binary expression without an assigned identity.
    pub fn binary(op: BinaryOp, left: ExprKind, right: ExprKind) -> ExprKind {
        let span = left.span().join(&right.span());
        ExprKind::Binary(Box::new(BinaryExpr {
            id: ExprId::default(),
            op,
            left,
            right,
            span,
        }))
    }

    /// Creates a reference to a plain named variable.
    pub fn named_variable(name: &str) -> ExprKind {
        ExprKind::Variable(Box::new(VariableRef {
            id: ExprId::default(),
            base: Id::from(name),
            fields: vec![],
            subscripts: vec![],
            span: SourceSpan::default(),
        }))
    }

    pub fn integer_literal(text: &str) -> ExprKind {
        ExprKind::Literal(Literal {
            id: ExprId::default(),
            kind: LiteralKind::Integer,
            text: String::from(text),
            span: SourceSpan::default(),
        })
    }

    pub fn bool_literal(value: bool) -> ExprKind {
        ExprKind::Literal(Literal {
            id: ExprId::default(),
            kind: LiteralKind::Bool,
            text: String::from(if value { "TRUE" } else { "FALSE" }),
            span: SourceSpan::default(),
        })
    }
}

impl Located for ExprKind {
    fn span(&self) -> SourceSpan {
        match self {
            ExprKind::Binary(expr) => expr.span.clone(),
            ExprKind::Unary(expr) => expr.span.clone(),
            ExprKind::Literal(literal) => literal.span.clone(),
            ExprKind::Variable(variable) => variable.span.clone(),
            ExprKind::Call(call) => call.span.clone(),
            ExprKind::Empty(empty) => empty.span.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub id: ExprId,
    pub op: BinaryOp,
    pub left: ExprKind,
    pub right: ExprKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub id: ExprId,
    pub op: UnaryOp,
    pub operand: ExprKind,
    pub span: SourceSpan,
}

/// A literal constant with the raw text preserved as written.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub id: ExprId,
    pub kind: LiteralKind,
    pub text: String,
    pub span: SourceSpan,
}

/// A reference to a variable: a base name, then any number of structure
/// fields and array subscripts.
///
/// The reference is flat: `axis.limit[i]` has base `axis`, fields `[limit]`
/// and subscripts `[i]`. Name resolution works on the base name only.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    pub id: ExprId,
    pub base: Id,
    pub fields: Vec<Id>,
    pub subscripts: Vec<ExprKind>,
    pub span: SourceSpan,
}

/// A function or function block invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub id: ExprId,
    pub name: Id,
    pub args: Vec<CallArg>,
    pub span: SourceSpan,
}

/// One argument of an invocation, optionally named (`param := value`).
#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    pub name: Option<Id>,
    pub value: ExprKind,
}

/// Placeholder for an expression the builder could not represent.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyExpr {
    pub id: ExprId,
    pub span: SourceSpan,
}

/// A statement.
///
/// Like expressions, the set is closed and unrecognized constructs become
/// `Empty` statements with the original span.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Assignment(Assignment),
    FbCall(FbCall),
    If(If),
    Case(Case),
    For(For),
    While(While),
    Repeat(Repeat),
    Exit(Exit),
    Return(Return),
    Empty(EmptyStmt),
}

impl StmtKind {
    /// Creates an assignment to a plain named variable, useful in tests.
    pub fn simple_assignment(target: &str, value: ExprKind) -> StmtKind {
        StmtKind::Assignment(Assignment {
            target: VariableRef {
                id: ExprId::default(),
                base: Id::from(target),
                fields: vec![],
                subscripts: vec![],
                span: SourceSpan::default(),
            },
            value,
            span: SourceSpan::default(),
        })
    }

    /// Creates an IF statement with no ELSIF arms and no ELSE, useful in tests.
    pub fn if_then(cond: ExprKind, body: Vec<StmtKind>) -> StmtKind {
        StmtKind::If(If {
            cond,
            body,
            else_ifs: vec![],
            else_body: vec![],
            span: SourceSpan::default(),
        })
    }
}

impl Located for StmtKind {
    fn span(&self) -> SourceSpan {
        match self {
            StmtKind::Assignment(assignment) => assignment.span.clone(),
            StmtKind::FbCall(fb_call) => fb_call.call.span.clone(),
            StmtKind::If(if_stmt) => if_stmt.span.clone(),
            StmtKind::Case(case) => case.span.clone(),
            StmtKind::For(for_stmt) => for_stmt.span.clone(),
            StmtKind::While(while_stmt) => while_stmt.span.clone(),
            StmtKind::Repeat(repeat) => repeat.span.clone(),
            StmtKind::Exit(exit) => exit.span.clone(),
            StmtKind::Return(ret) => ret.span.clone(),
            StmtKind::Empty(empty) => empty.span.clone(),
        }
    }
}

/// Assigns the value of the right expression to the variable on the left.
///
/// See section 3.3.2.1.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: VariableRef,
    pub value: ExprKind,
    pub span: SourceSpan,
}

/// Invokes a function block instance as a statement, such as `timer(IN := x);`.
#[derive(Debug, Clone, PartialEq)]
pub struct FbCall {
    pub call: FunctionCall,
}

/// Selection statement with a condition per branch.
///
/// Every branch owns its statements: the THEN block, each ELSIF arm, and the
/// ELSE block are separate lists.
///
/// See section 3.3.2.3.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub cond: ExprKind,
    pub body: Vec<StmtKind>,
    pub else_ifs: Vec<ElseIf>,
    pub else_body: Vec<StmtKind>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub cond: ExprKind,
    pub body: Vec<StmtKind>,
}

/// Selection statement over the value of a selector expression.
///
/// See section 3.3.2.3.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub selector: ExprKind,
    pub elements: Vec<CaseElement>,
    pub else_body: Vec<StmtKind>,
    pub span: SourceSpan,
}

/// One group of selector values and the statements they guard.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseElement {
    pub selectors: Vec<ExprKind>,
    pub body: Vec<StmtKind>,
}

/// Counting iteration over a control variable.
///
/// See section 3.3.2.4.
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub control: Id,
    pub from: ExprKind,
    pub to: ExprKind,
    pub by: Option<ExprKind>,
    pub body: Vec<StmtKind>,
    pub span: SourceSpan,
}

/// Iteration while a condition holds, tested before the body.
///
/// See section 3.3.2.4.
#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub cond: ExprKind,
    pub body: Vec<StmtKind>,
    pub span: SourceSpan,
}

/// Iteration until a condition holds, tested after the body.
///
/// See section 3.3.2.4.
#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub body: Vec<StmtKind>,
    pub until: ExprKind,
    pub span: SourceSpan,
}

/// Terminates the innermost iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Exit {
    pub span: SourceSpan,
}

/// Returns from the containing program unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub span: SourceSpan,
}

/// Placeholder for a statement the builder could not represent.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStmt {
    pub span: SourceSpan,
}
