//! The result of analyzing one source file.

use std::collections::HashMap;

use plcheck_dsl::common::{Node, PouKind};
use plcheck_dsl::core::{FileId, Id, Located};
use plcheck_dsl::diagnostic::Diagnostic;
use plcheck_dsl::textual::{ExprId, StmtKind};
use plcheck_parser::tree::{ParseKind, ParseNode};

/// Everything the analysis of one file produced.
///
/// A file that fails extraction or parsing still yields a tree: zero root
/// nodes and a non-empty diagnostic list. Callers iterate what is there
/// rather than checking for failure first.
#[derive(Debug)]
pub struct SyntaxTree {
    pub file_id: FileId,
    /// The structured text the diagnostics' positions refer to. For
    /// TwinCAT files this is the extracted text, not the XML.
    pub source_code: String,
    /// The concrete parse tree. Empty when parsing failed.
    pub parse_tree: ParseNode,
    pub root_nodes: Vec<Node>,
    /// Extraction, lexical, syntax, then semantic problems, in that order.
    pub diagnostics: Vec<Diagnostic>,
    /// Inferred type per expression, keyed by expression identity.
    pub inferred_types: HashMap<ExprId, Id>,
}

impl SyntaxTree {
    /// A tree for a file that produced no parse, only diagnostics.
    pub(crate) fn failed(
        file_id: FileId,
        source_code: String,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        SyntaxTree {
            file_id,
            source_code,
            parse_tree: ParseNode::empty(ParseKind::CompilationUnit),
            root_nodes: vec![],
            diagnostics,
            inferred_types: HashMap::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// One program organization unit of a syntax tree.
#[derive(Debug, Clone)]
pub struct Pou<'a> {
    pub name: &'a Id,
    pub kind: PouKind,
    pub file_id: FileId,
    /// First and last line of the unit in the analyzed text.
    pub start_line: usize,
    pub end_line: usize,
    pub node: &'a Node,
}

impl<'a> Pou<'a> {
    /// Wraps a root node when it is a program organization unit.
    pub(crate) fn from_node(node: &'a Node, file_id: &FileId) -> Option<Pou<'a>> {
        let (name, kind) = match node {
            Node::Program(program) => (&program.name, PouKind::Program),
            Node::FunctionBlock(fb) => (&fb.name, PouKind::FunctionBlock),
            Node::Function(function) => (&function.name, PouKind::Function),
            _ => return None,
        };
        let span = node.span();
        Some(Pou {
            name,
            kind,
            file_id: file_id.clone(),
            start_line: span.start.line,
            end_line: span.end.line,
            node,
        })
    }

    /// The unit's statements.
    pub fn body(&self) -> &'a [StmtKind] {
        match self.node {
            Node::Program(program) => &program.body,
            Node::FunctionBlock(fb) => &fb.body,
            Node::Function(function) => &function.body,
            _ => &[],
        }
    }
}
