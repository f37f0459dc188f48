//! JSON reports for downstream quality tooling.

use serde_json::{json, Value};

use plcheck_analyzer::complexity::{grade, Thresholds};

use crate::pipeline::{calculate_cyclomatic_complexity, extract_function_blocks};
use crate::syntax_tree::SyntaxTree;

/// Renders one tree as a JSON report.
///
/// The report lists every diagnostic with its position and every program
/// organization unit with its complexity, severity and grade. Positions
/// refer to the tree's source text.
pub fn analysis_report(tree: &SyntaxTree, thresholds: &Thresholds) -> Value {
    let diagnostics: Vec<Value> = tree
        .diagnostics
        .iter()
        .map(|diagnostic| {
            json!({
                "code": diagnostic.code,
                "description": diagnostic.description,
                "message": diagnostic.primary.message,
                "line": diagnostic.line(),
                "column": diagnostic.column(),
                "offending_symbol": diagnostic.offending_symbol,
            })
        })
        .collect();

    let units: Vec<Value> = extract_function_blocks(tree)
        .iter()
        .map(|pou| {
            let complexity = calculate_cyclomatic_complexity(pou);
            json!({
                "name": pou.name.original,
                "kind": pou.kind.to_string(),
                "start_line": pou.start_line,
                "end_line": pou.end_line,
                "complexity": complexity,
                "severity": thresholds.classify(complexity).to_string(),
                "grade": grade(complexity).to_string(),
            })
        })
        .collect();

    json!({
        "file": tree.file_id.as_str(),
        "valid": tree.is_valid(),
        "diagnostics": diagnostics,
        "units": units,
    })
}
