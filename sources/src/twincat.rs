//! Extraction of structured text from TwinCAT project XML.
//!
//! TwinCAT stores each POU, GVL, and DUT as an XML document. The
//! `<Declaration>` CDATA holds the header and variable blocks, and for a
//! POU the `<Implementation><ST>` CDATA holds the body statements. The
//! closing keyword (`END_PROGRAM` and friends) is implicit in the XML
//! structure and is appended here so the text parses as one unit.
//!
//! Positions in later diagnostics refer to the extracted text, which the
//! caller keeps alongside the analysis result. Methods and actions nested
//! inside a POU element are not extracted.

use log::debug;
use plcheck_dsl::core::{FileId, Position, SourceSpan};
use plcheck_dsl::diagnostic::{Diagnostic, Label};
use plcheck_problems::Problem;

/// Extracts the structured text stored in a TwinCAT XML file.
///
/// An empty result is valid and means the file declares nothing; the
/// caller decides whether that is worth a diagnostic.
///
/// # Errors
///
/// Returns a diagnostic when the XML is malformed (P0002), the TwinCAT
/// object structure is missing (P0003), or a POU body uses a graphical
/// language (P0004).
pub fn extract_source(content: &str, file_id: &FileId) -> Result<String, Diagnostic> {
    debug!("Extracting structured text from {}", file_id);

    let doc = roxmltree::Document::parse(content).map_err(|error| {
        Diagnostic::problem(
            Problem::XmlMalformed,
            Label::file(file_id, format!("XML error: {error}")),
        )
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "TcPlcObject" {
        return Err(Diagnostic::problem(
            Problem::MissingPlcObject,
            Label::span(
                element_span(&doc, &root, file_id),
                format!(
                    "Expected root element 'TcPlcObject', found '{}'",
                    root.tag_name().name()
                ),
            ),
        ));
    }

    let object = root
        .children()
        .find(|node| node.is_element() && matches!(node.tag_name().name(), "POU" | "GVL" | "DUT"))
        .ok_or_else(|| {
            Diagnostic::problem(
                Problem::MissingPlcObject,
                Label::file(file_id, "TcPlcObject contains no POU, GVL, or DUT element"),
            )
        })?;

    let declaration = child_text(&object, "Declaration");
    if object.tag_name().name() != "POU" {
        // GVL and DUT files keep everything in the declaration.
        return Ok(declaration);
    }

    let implementation = pou_implementation(&doc, &object, file_id)?;
    let closing = closing_keyword(&declaration);
    debug!(
        "POU declaration {} bytes, implementation {} bytes",
        declaration.len(),
        implementation.len()
    );

    let mut combined = declaration;
    if !implementation.trim().is_empty() {
        combined.push_str("\n\n");
        combined.push_str(&implementation);
    }
    if !closing.is_empty() {
        combined.push('\n');
        combined.push_str(closing);
    }
    Ok(combined)
}

/// The ST implementation text of a POU. A POU with no implementation
/// element, or an empty one, yields an empty string.
fn pou_implementation(
    doc: &roxmltree::Document,
    pou: &roxmltree::Node,
    file_id: &FileId,
) -> Result<String, Diagnostic> {
    let implementation = match find_child(pou, "Implementation") {
        Some(node) => node,
        None => return Ok(String::new()),
    };

    if let Some(st) = find_child(&implementation, "ST") {
        return Ok(st.text().unwrap_or("").to_owned());
    }

    for child in implementation.children().filter(|node| node.is_element()) {
        let language = child.tag_name().name();
        if matches!(language, "FBD" | "LD" | "IL" | "SFC" | "CFC") {
            return Err(Diagnostic::problem(
                Problem::BodyTypeNotSupported,
                Label::span(
                    element_span(doc, &child, file_id),
                    format!("POU body is {language}; only ST is supported"),
                ),
            ));
        }
    }

    Ok(String::new())
}

/// The closing keyword matching the declaration's opening keyword.
///
/// FUNCTION_BLOCK is tested before FUNCTION, which is its prefix. An
/// unrecognized opener gets no closing keyword and the parser reports
/// the malformed unit.
fn closing_keyword(declaration: &str) -> &'static str {
    let opening = opening_text(declaration);
    for (opener, closer) in [
        ("FUNCTION_BLOCK", "END_FUNCTION_BLOCK"),
        ("FUNCTION", "END_FUNCTION"),
        ("PROGRAM", "END_PROGRAM"),
    ] {
        let starts_with_opener = opening
            .get(..opener.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(opener));
        if starts_with_opener {
            return closer;
        }
    }
    ""
}

/// The declaration text with leading whitespace and attribute pragmas
/// such as `{attribute 'qualified_only'}` skipped.
fn opening_text(declaration: &str) -> &str {
    let mut rest = declaration.trim_start();
    while rest.starts_with('{') {
        match rest.find('}') {
            Some(end) => rest = rest[end + 1..].trim_start(),
            None => return rest,
        }
    }
    rest
}

fn child_text(parent: &roxmltree::Node, name: &str) -> String {
    find_child(parent, name)
        .and_then(|node| node.text())
        .unwrap_or("")
        .to_owned()
}

fn find_child<'a>(parent: &'a roxmltree::Node, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    parent
        .children()
        .find(|node| node.is_element() && node.tag_name().name() == name)
}

/// A point span at the element's position in the XML text.
fn element_span(doc: &roxmltree::Document, node: &roxmltree::Node, file_id: &FileId) -> SourceSpan {
    let pos = doc.text_pos_at(node.range().start);
    let position = Position::new(pos.row as usize, pos.col.saturating_sub(1) as usize);
    SourceSpan::range(position, position, file_id)
}
