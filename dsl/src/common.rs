//! Provides definitions of objects for the top level of a source file:
//! program units, variable declarations and data type declarations.
//!
//! See section 2.

use crate::core::{Id, Located, SourceSpan};
use crate::textual::{ExprKind, StmtKind};
use std::fmt;

/// A top-level element of one source file.
///
/// The set is closed. A construct the builder does not recognize becomes an
/// `Empty` node carrying the original span, so consumers can always walk the
/// whole list without null checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program(ProgramDecl),
    FunctionBlock(FunctionBlockDecl),
    Function(FunctionDecl),
    /// A variable block at file scope, such as the content of a global
    /// variable list.
    VarBlock(VarBlock),
    DataType(DataTypeDecl),
    Empty(SourceSpan),
}

impl Located for Node {
    fn span(&self) -> SourceSpan {
        match self {
            Node::Program(program) => program.span.clone(),
            Node::FunctionBlock(fb) => fb.span.clone(),
            Node::Function(function) => function.span.clone(),
            Node::VarBlock(block) => block.span.clone(),
            Node::DataType(decl) => decl.span.clone(),
            Node::Empty(span) => span.clone(),
        }
    }
}

/// The kind of a program organization unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PouKind {
    Program,
    FunctionBlock,
    Function,
}

impl fmt::Display for PouKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PouKind::Program => "PROGRAM",
            PouKind::FunctionBlock => "FUNCTION_BLOCK",
            PouKind::Function => "FUNCTION",
        };
        f.write_str(text)
    }
}

/// Declares a program.
///
/// See section 2.5.3.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramDecl {
    pub name: Id,
    pub var_blocks: Vec<VarBlock>,
    pub body: Vec<StmtKind>,
    pub span: SourceSpan,
}

/// Declares a function block.
///
/// See section 2.5.2.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBlockDecl {
    pub name: Id,
    pub var_blocks: Vec<VarBlock>,
    pub body: Vec<StmtKind>,
    pub span: SourceSpan,
}

/// Declares a function with its return type.
///
/// See section 2.5.1.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Id,
    pub return_type: TypeSpec,
    pub var_blocks: Vec<VarBlock>,
    pub body: Vec<StmtKind>,
    pub span: SourceSpan,
}

/// The scope kind a variable block declares into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarBlockKind {
    /// `VAR_INPUT`
    Input,
    /// `VAR_OUTPUT`
    Output,
    /// `VAR_IN_OUT`
    InOut,
    /// `VAR` and `VAR_TEMP`
    Local,
    /// `VAR_GLOBAL`
    Global,
    /// Any block with the `CONSTANT` qualifier.
    Constant,
}

/// A block of variable declarations.
///
/// See section 2.4.3.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBlock {
    pub kind: VarBlockKind,
    pub decls: Vec<VarDecl>,
    pub span: SourceSpan,
}

/// Declares a single variable.
///
/// A declaration list such as `a, b : INT;` produces one `VarDecl` per name,
/// each sharing the written type.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Id,
    pub type_spec: TypeSpec,
    pub initializer: Option<ExprKind>,
    pub span: SourceSpan,
}

impl Located for VarDecl {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}

/// The declared type of a variable as written: a base type name plus array,
/// pointer and reference markers.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub base: Id,
    pub is_array: bool,
    /// Array dimension bounds, recorded when both bounds are literal.
    pub array_ranges: Vec<ArrayRange>,
    pub is_pointer: bool,
    pub is_reference: bool,
}

impl TypeSpec {
    /// A plain scalar type.
    pub fn simple(name: &str) -> Self {
        TypeSpec {
            base: Id::from(name),
            is_array: false,
            array_ranges: vec![],
            is_pointer: false,
            is_reference: false,
        }
    }

    /// Renders the full type name used for type comparisons. Composite types
    /// render with their markers (`ARRAY [0..9] OF INT`, `POINTER TO INT`)
    /// so they never unify with a scalar of the base type.
    pub fn type_name(&self) -> Id {
        if !self.is_array && !self.is_pointer && !self.is_reference {
            return self.base.clone();
        }
        let mut name = String::new();
        if self.is_array {
            let ranges = if self.array_ranges.is_empty() {
                String::from("..")
            } else {
                self.array_ranges
                    .iter()
                    .map(|range| format!("{}..{}", range.lower, range.upper))
                    .collect::<Vec<String>>()
                    .join(", ")
            };
            name.push_str(&format!("ARRAY [{}] OF ", ranges));
        }
        if self.is_pointer {
            name.push_str("POINTER TO ");
        }
        if self.is_reference {
            name.push_str("REFERENCE TO ");
        }
        name.push_str(&self.base.original);
        Id::from(&name).with_span(self.base.span.clone())
    }
}

/// Bounds of one array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayRange {
    pub lower: i64,
    pub upper: i64,
}

/// The kind of a data type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTypeKind {
    Struct,
    Enum,
    Alias,
    Unknown,
}

/// Declares a named data type.
///
/// See section 2.3.3.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTypeDecl {
    pub name: Id,
    pub definition: TypeDefinition,
    pub span: SourceSpan,
}

impl DataTypeDecl {
    pub fn kind(&self) -> DataTypeKind {
        match self.definition {
            TypeDefinition::Struct(_) => DataTypeKind::Struct,
            TypeDefinition::Enum(_) => DataTypeKind::Enum,
            TypeDefinition::Alias(_) => DataTypeKind::Alias,
            TypeDefinition::Empty(_) => DataTypeKind::Unknown,
        }
    }
}

/// The definition part of a data type declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
    Struct(StructType),
    Enum(EnumType),
    Alias(AliasType),
    Empty(SourceSpan),
}

/// A structure type: ordered field declarations. Unions are represented the
/// same way since only names and declared types matter to analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub fields: Vec<VarDecl>,
    pub span: SourceSpan,
}

/// An enumeration type: ordered values, each with an optional explicit
/// integer value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub values: Vec<EnumValue>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: Id,
    pub value: Option<i64>,
    pub span: SourceSpan,
}

/// A type that renames another type.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasType {
    pub target: TypeSpec,
    pub span: SourceSpan,
}
