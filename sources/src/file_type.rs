//! File type detection by extension.

use std::path::Path;

/// The kind of source file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// TwinCAT project XML (.TcPOU, .TcGVL, .TcDUT).
    TwinCat,
    /// Plain structured text (.st, .iec).
    StructuredText,
    /// Anything else. Callers treat the content as plain structured text.
    Unknown,
}

impl FileType {
    /// Determines the file type from the extension, ignoring case.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tcpou") => FileType::TwinCat,
            Some(ext) if ext.eq_ignore_ascii_case("tcgvl") => FileType::TwinCat,
            Some(ext) if ext.eq_ignore_ascii_case("tcdut") => FileType::TwinCat,
            Some(ext) if ext.eq_ignore_ascii_case("st") => FileType::StructuredText,
            Some(ext) if ext.eq_ignore_ascii_case("iec") => FileType::StructuredText,
            _ => FileType::Unknown,
        }
    }
}
