//! Problem codes for every diagnostic this workspace can report.
//!
//! The `Problem` enumeration is generated at build time from
//! `resources/problem-codes.csv` so that codes stay stable and are defined
//! in exactly one place. Codes group by pipeline stage: `P0xxx` extraction,
//! `P1xxx` lexical and syntax, `P2xxx` semantic, `P3xxx` configuration.

use std::fmt;

/// The pipeline stage that reports a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Reading the file or extracting structured text from the container.
    Extraction,
    /// Tokenizing and parsing the structured text.
    Syntax,
    /// Analyzing the parsed program.
    Semantic,
    /// Validating caller-supplied configuration.
    Configuration,
}

include!(concat!(env!("OUT_DIR"), "/problems.rs"));

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_when_semantic_problem_then_p2_prefix() {
        assert_eq!(Problem::UndeclaredVariable.code(), "P2001");
        assert_eq!(Problem::UndeclaredVariable.category(), Category::Semantic);
    }

    #[test]
    fn message_when_syntax_error_then_constant_text() {
        assert_eq!(
            Problem::SyntaxError.message(),
            "The text is not a valid structured text program"
        );
        assert_eq!(Problem::SyntaxError.category(), Category::Syntax);
    }
}
