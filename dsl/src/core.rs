//! Core objects shared by all language elements.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

/// Identity of a source file.
///
/// The identity is the path as given by the caller. Cloning is cheap so the
/// identity can be attached to every span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(Arc<str>);

impl FileId {
    pub fn new(name: &str) -> Self {
        FileId(Arc::from(name))
    }

    pub fn from_path(path: &Path) -> Self {
        FileId(Arc::from(path.to_string_lossy().as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        FileId(Arc::from(""))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A position in a source file.
///
/// Lines are 1-indexed, matching what editors display. Columns are 0-indexed
/// offsets within the line. Line 0 is reserved for problems that apply to
/// the file as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Location in a file of a language element instance.
#[derive(Debug, Clone, Default)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
    pub file_id: FileId,
}

impl SourceSpan {
    pub fn range(start: Position, end: Position, file_id: &FileId) -> Self {
        SourceSpan {
            start,
            end,
            file_id: file_id.clone(),
        }
    }

    /// A span that stands for the file as a whole (line 0, column 0).
    pub fn file(file_id: &FileId) -> Self {
        SourceSpan {
            start: Position::default(),
            end: Position::default(),
            file_id: file_id.clone(),
        }
    }

    /// The smallest span covering this span and the other.
    pub fn join(&self, other: &SourceSpan) -> SourceSpan {
        let start = if (other.start.line, other.start.column) < (self.start.line, self.start.column)
        {
            other.start
        } else {
            self.start
        };
        let end = if (other.end.line, other.end.column) > (self.end.line, self.end.column) {
            other.end
        } else {
            self.end
        };
        SourceSpan {
            start,
            end,
            file_id: self.file_id.clone(),
        }
    }
}

impl PartialEq for SourceSpan {
    fn eq(&self, _other: &Self) -> bool {
        // Two spans always compare equal. When comparing language elements
        // we rarely care that they were written at the same position, and
        // this lets containing types derive PartialEq.
        true
    }
}
impl Eq for SourceSpan {}

/// Defines an element that has a location in source code.
pub trait Located {
    fn span(&self) -> SourceSpan;
}

/// An identifier.
///
/// Identifiers in IEC 61131-3 are case-insensitive, so the identifier keeps
/// the spelling as written for display along with the lower-cased form that
/// equality and hashing use. The case policy applies uniformly: variable
/// names, program unit names, and type names all compare through `Id`.
#[derive(Debug, Clone)]
pub struct Id {
    pub original: String,
    pub lower_case: String,
    pub span: SourceSpan,
}

impl Id {
    /// Converts a `&str` into an identifier with an unspecified span.
    pub fn from(str: &str) -> Self {
        Id {
            original: String::from(str),
            lower_case: str.to_lowercase(),
            span: SourceSpan::default(),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = span;
        self
    }
}

impl Located for Id {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.lower_case == other.lower_case
    }
}
impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower_case.hash(state);
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
