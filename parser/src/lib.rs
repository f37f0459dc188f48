// Diagnostics are large error values and that is expected here.
#![allow(clippy::result_large_err)]

//! Parser for IEC 61131-3 Structured Text.
//!
//! Parsing runs in three stages. The lexer turns source text into a token
//! stream, the grammar turns the tokens into an untyped parse tree, and the
//! builder turns that tree into typed declarations. Each stage keeps going
//! where it can: the lexer skips an unexpected character and records a
//! problem, and a grammar rejection produces an empty tree plus a diagnostic
//! rather than an error the caller must unwrap.

mod builder;
mod grammar;
mod lexer;
pub mod token;
pub mod tree;

use log::debug;
use plcheck_dsl::common::Node;
use plcheck_dsl::core::FileId;
use plcheck_dsl::diagnostic::Diagnostic;

use crate::tree::{ParseKind, ParseNode};

/// The outcome of parsing one source file.
///
/// Parsing always produces a value. When the grammar rejects the input, the
/// parse tree is an empty compilation unit, the declaration list is empty
/// and the diagnostics say why.
#[derive(Debug)]
pub struct ParsedSource {
    /// The untyped parse tree, down to individual tokens.
    pub tree: ParseNode,
    /// The typed top-level declarations built from the tree.
    pub nodes: Vec<Node>,
    /// Problems found while tokenizing and parsing.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedSource {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parses one Structured Text source.
///
/// This does not return a result because lexer problems do not stop the
/// parse; the affected characters are skipped and the problems are reported
/// together with whatever the grammar found.
pub fn parse_program(source: &str, file_id: &FileId) -> ParsedSource {
    let (tokens, mut diagnostics) = lexer::tokenize(source, file_id);
    match grammar::parse_tokens(&tokens, file_id) {
        Ok(tree) => {
            let nodes = builder::build(&tree);
            debug!(
                "Parsed {} into {} declarations with {} problems",
                file_id,
                nodes.len(),
                diagnostics.len()
            );
            ParsedSource {
                tree,
                nodes,
                diagnostics,
            }
        }
        Err(diagnostic) => {
            debug!("Parse of {} failed: {}", file_id, diagnostic);
            diagnostics.push(diagnostic);
            ParsedSource {
                tree: ParseNode::empty(ParseKind::CompilationUnit),
                nodes: vec![],
                diagnostics,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plcheck_dsl::core::Id;
    use proptest::prelude::*;

    #[test]
    fn parse_program_when_valid_then_single_program_no_diagnostics() {
        let parsed = parse_program(
            "PROGRAM P VAR x : INT; END_VAR x := x + 1; END_PROGRAM",
            &FileId::default(),
        );
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.nodes.len(), 1);
        match &parsed.nodes[0] {
            Node::Program(program) => assert_eq!(program.name, Id::from("P")),
            other => panic!("expected program, got {:?}", other),
        }
    }

    #[test]
    fn parse_program_when_grammar_rejects_then_empty_tree_with_diagnostic() {
        let parsed = parse_program("PROGRAM P x := ; END_PROGRAM", &FileId::default());
        assert!(parsed.has_errors());
        assert_eq!(parsed.nodes.len(), 0);
        assert_eq!(parsed.tree.kind, ParseKind::CompilationUnit);
        assert_eq!(parsed.tree.node_count(), 0);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].code, "P1002");
    }

    #[test]
    fn parse_program_when_bad_character_then_problem_recorded_and_parse_continues() {
        let parsed = parse_program("PROGRAM P x := 1; @ END_PROGRAM", &FileId::default());
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].code, "P1001");
        assert_eq!(parsed.nodes.len(), 1);
    }

    #[test]
    fn parse_program_when_repeated_then_identical_output() {
        let source =
            "PROGRAM P VAR a : INT; END_VAR IF a > 1 THEN a := 0; END_IF END_PROGRAM";
        let first = parse_program(source, &FileId::default());
        let second = parse_program(source, &FileId::default());
        assert_eq!(format!("{:?}", first.nodes), format!("{:?}", second.nodes));
        assert_eq!(first.diagnostics.len(), second.diagnostics.len());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn parse_program_when_arbitrary_text_then_never_panics(source in ".*") {
            let _ = parse_program(&source, &FileId::default());
        }

        #[test]
        fn parse_program_when_generated_program_then_accepted(
            program in "[A-Z][A-Za-z0-9_]{0,8}",
            variable in "[a-z][A-Za-z0-9_]{0,8}",
        ) {
            let source = format!(
                "PROGRAM Prog_{}\nVAR\n    var_{} : INT;\nEND_VAR\n    var_{} := var_{} + 1;\nEND_PROGRAM",
                program, variable, variable, variable
            );
            let parsed = parse_program(&source, &FileId::default());
            prop_assert!(parsed.diagnostics.is_empty(), "problems: {:?}", parsed.diagnostics);
            prop_assert_eq!(parsed.nodes.len(), 1);
        }
    }
}
