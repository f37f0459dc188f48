//! Converts source text into tokens.

use crate::token::{Token, TokenType};
use log::trace;
use logos::Logos;
use plcheck_dsl::core::{FileId, Position, SourceSpan};
use plcheck_dsl::diagnostic::{Diagnostic, Label};
use plcheck_problems::Problem;

/// Tokenizes structured text.
///
/// Lexing always consumes the whole input: characters that are not valid in
/// structured text each produce a diagnostic and lexing continues with the
/// next character, so a single stray character does not hide the rest of the
/// file from analysis.
pub fn tokenize(source: &str, file_id: &FileId) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut tokens = vec![];
    let mut diagnostics = vec![];

    let mut lexer = TokenType::lexer(source);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let line = lexer.extras.line + 1;
        let column = range.start - lexer.extras.line_start;
        let start = Position::new(line, column);
        let end = Position::new(line, column + (range.end - range.start));
        let span = SourceSpan::range(start, end, file_id);
        match result {
            Ok(token_type) => tokens.push(Token {
                token_type,
                text: lexer.slice().to_owned(),
                span,
            }),
            Err(_) => {
                let text = lexer.slice();
                diagnostics.push(
                    Diagnostic::problem(
                        Problem::UnexpectedCharacter,
                        Label::span(span, format!("Unexpected character '{}'", text)),
                    )
                    .with_offending_symbol(text),
                );
            }
        }
    }

    trace!(
        "Tokenized {} into {} tokens and {} problems",
        file_id,
        tokens.len(),
        diagnostics.len()
    );
    (tokens, diagnostics)
}
