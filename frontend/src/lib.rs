//! Analysis front-end for TwinCAT structured text.
//!
//! This crate ties the pieces together: it reads a file, unwraps TwinCAT
//! XML where needed, parses the structured text and runs semantic
//! analysis, producing a [`SyntaxTree`] that carries the declarations,
//! the diagnostics and the inferred types. The front-end is total; a
//! file that cannot be read or parsed still yields a tree whose
//! diagnostics say what went wrong.

mod comments;
mod pipeline;
mod report;
mod syntax_tree;

pub use crate::comments::extract_comments;
pub use crate::pipeline::{
    analyze_source, calculate_cyclomatic_complexity, calculate_cyclomatic_complexity_with,
    extract_function_blocks, get_parsing_errors, parse_file,
};
pub use crate::report::analysis_report;
pub use crate::syntax_tree::{Pou, SyntaxTree};
