//! Diagnostics describe problems found in source files.

use crate::core::{FileId, SourceSpan};
use plcheck_problems::Problem;
use std::fmt;

/// A message associated with a location in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub span: SourceSpan,
    pub message: String,
}

impl Label {
    /// Creates a label at the span.
    pub fn span(span: SourceSpan, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
        }
    }

    /// Creates a label that refers to the file as a whole (line 0, column 0).
    pub fn file(file_id: &FileId, message: impl Into<String>) -> Self {
        Label {
            span: SourceSpan::file(file_id),
            message: message.into(),
        }
    }
}

/// A diagnostic reported by some stage of analysis.
///
/// The code and description come from the `Problem` so that codes stay
/// stable. The primary label says where and what; secondary labels add
/// related positions such as the first declaration for a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The stable problem code, such as `P2001`.
    pub code: String,
    /// The constant description of the problem type.
    pub description: String,
    pub primary: Label,
    pub secondary: Vec<Label>,
    /// The token text that triggered the problem, when one token did.
    pub offending_symbol: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic for the problem.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Diagnostic {
            code: problem.code().to_owned(),
            description: problem.message().to_owned(),
            primary,
            secondary: vec![],
            offending_symbol: None,
        }
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    pub fn with_offending_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.offending_symbol = Some(symbol.into());
        self
    }

    /// The line of the primary label. Line 0 means the file as a whole.
    pub fn line(&self) -> usize {
        self.primary.span.start.line
    }

    pub fn column(&self) -> usize {
        self.primary.span.start.column
    }

    pub fn file_id(&self) -> &FileId {
        &self.primary.span.file_id
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}:{}:{})",
            self.code,
            self.primary.message,
            self.file_id(),
            self.line(),
            self.column()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;

    #[test]
    fn problem_when_created_then_has_stable_code() {
        let file_id = FileId::new("main.st");
        let diagnostic = Diagnostic::problem(
            Problem::UndeclaredVariable,
            Label::span(
                SourceSpan::range(Position::new(3, 4), Position::new(3, 5), &file_id),
                "variable 'x' is not declared",
            ),
        );
        assert_eq!(diagnostic.code, "P2001");
        assert_eq!(diagnostic.line(), 3);
        assert_eq!(diagnostic.column(), 4);
    }

    #[test]
    fn file_label_when_created_then_line_zero() {
        let file_id = FileId::new("main.st");
        let diagnostic = Diagnostic::problem(
            Problem::FileNotReadable,
            Label::file(&file_id, "no such file"),
        );
        assert_eq!(diagnostic.line(), 0);
        assert_eq!(diagnostic.column(), 0);
    }
}
