//! The analysis pipeline from file path to syntax tree.
//!
//! Every stage is total. Failures become diagnostics on the returned
//! tree, so analyzing many files never aborts on one bad file; each
//! file's problems stay local to its own tree.

use std::path::Path;

use log::debug;
use plcheck_analyzer::complexity::{cyclomatic_complexity, ComplexityOptions};
use plcheck_analyzer::semantic;
use plcheck_dsl::core::FileId;
use plcheck_dsl::diagnostic::{Diagnostic, Label};
use plcheck_problems::Problem;
use plcheck_sources::FileType;

use crate::syntax_tree::{Pou, SyntaxTree};

/// Analyzes one file from disk.
///
/// TwinCAT XML files are unwrapped first; anything else is treated as
/// plain structured text.
pub fn parse_file(path: &Path) -> SyntaxTree {
    let file_id = FileId::from_path(path);
    let content = match plcheck_sources::read_source(path, &file_id) {
        Ok(content) => content,
        Err(diagnostic) => return SyntaxTree::failed(file_id, String::new(), vec![diagnostic]),
    };
    let source = match FileType::from_path(path) {
        FileType::TwinCat => match plcheck_sources::extract_source(&content, &file_id) {
            Ok(source) => source,
            Err(diagnostic) => return SyntaxTree::failed(file_id, String::new(), vec![diagnostic]),
        },
        FileType::StructuredText | FileType::Unknown => content,
    };
    analyze_source(source, file_id)
}

/// Analyzes structured text that is already in memory.
pub fn analyze_source(source: String, file_id: FileId) -> SyntaxTree {
    if source.trim().is_empty() {
        let diagnostic = Diagnostic::problem(
            Problem::EmptySource,
            Label::file(&file_id, "File contains no structured text"),
        );
        return SyntaxTree::failed(file_id, source, vec![diagnostic]);
    }

    let parsed = plcheck_parser::parse_program(&source, &file_id);

    // A grammar failure leaves nothing to analyze.
    if parsed.nodes.is_empty() && !parsed.diagnostics.is_empty() {
        debug!("Skipping analysis of {}: parse failed", file_id);
        return SyntaxTree {
            file_id,
            source_code: source,
            parse_tree: parsed.tree,
            root_nodes: vec![],
            diagnostics: parsed.diagnostics,
            inferred_types: Default::default(),
        };
    }

    let analysis = semantic::analyze(&parsed.nodes);
    let mut diagnostics = parsed.diagnostics;
    diagnostics.extend(analysis.diagnostics);
    SyntaxTree {
        file_id,
        source_code: source,
        parse_tree: parsed.tree,
        root_nodes: parsed.nodes,
        diagnostics,
        inferred_types: analysis.inferred_types,
    }
}

/// The program organization units of a tree, in source order.
pub fn extract_function_blocks<'a>(tree: &'a SyntaxTree) -> Vec<Pou<'a>> {
    tree.root_nodes
        .iter()
        .filter_map(|node| Pou::from_node(node, &tree.file_id))
        .collect()
}

/// McCabe complexity of one unit with default options.
pub fn calculate_cyclomatic_complexity(pou: &Pou) -> u32 {
    cyclomatic_complexity(pou.node, &ComplexityOptions::default())
}

/// McCabe complexity of one unit with explicit options.
pub fn calculate_cyclomatic_complexity_with(pou: &Pou, options: &ComplexityOptions) -> u32 {
    cyclomatic_complexity(pou.node, options)
}

/// All diagnostics recorded for the tree, in reporting order.
pub fn get_parsing_errors(tree: &SyntaxTree) -> &[Diagnostic] {
    &tree.diagnostics
}
