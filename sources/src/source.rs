//! Reading source files from disk.

use std::fs;
use std::path::Path;

use log::debug;
use plcheck_dsl::core::FileId;
use plcheck_dsl::diagnostic::{Diagnostic, Label};
use plcheck_problems::Problem;

/// Reads a source file, decoding by byte-order mark when one is present.
///
/// TwinCAT writes project XML as UTF-8 with a BOM, and exported files are
/// sometimes UTF-16. The BOM is sniffed and removed; without one the bytes
/// are decoded as UTF-8 with invalid sequences replaced.
pub fn read_source(path: &Path, file_id: &FileId) -> Result<String, Diagnostic> {
    debug!("Reading {}", file_id);
    let bytes = fs::read(path).map_err(|error| {
        Diagnostic::problem(
            Problem::FileNotReadable,
            Label::file(file_id, format!("Cannot read file: {error}")),
        )
    })?;
    let (text, _, _) = encoding_rs::UTF_8.decode(&bytes);
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_source_when_utf8_bom_then_stripped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFPROGRAM P END_PROGRAM").unwrap();
        let text = read_source(file.path(), &FileId::new("main.st")).unwrap();
        assert_eq!(text, "PROGRAM P END_PROGRAM");
    }

    #[test]
    fn read_source_when_utf16_le_then_decoded() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "VAR_GLOBAL g : INT; END_VAR".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        let text = read_source(file.path(), &FileId::new("g.TcGVL")).unwrap();
        assert_eq!(text, "VAR_GLOBAL g : INT; END_VAR");
    }

    #[test]
    fn read_source_when_file_missing_then_not_readable() {
        let error = read_source(
            Path::new("/nonexistent/Missing.TcPOU"),
            &FileId::new("Missing.TcPOU"),
        )
        .unwrap_err();
        assert_eq!(error.code, "P0001");
        assert_eq!(error.line(), 0);
    }
}
