//! Comment extraction for documentation checks.
//!
//! Comments are recovered from the source text rather than the token
//! stream, so extraction works even for files the grammar rejected. The
//! scan is textual: a `//` inside a string literal counts as a comment.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::syntax_tree::SyntaxTree;

lazy_static! {
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)\(\*(.*?)\*\)").unwrap();
}

/// Extracts all comments from the tree's source, keyed by 1-based line.
///
/// Line comments run to the end of their line. A block comment is keyed
/// by the line it opens on and keeps its inner newlines; when both kinds
/// start on one line, the block comment wins. Empty comments are dropped.
pub fn extract_comments(tree: &SyntaxTree) -> BTreeMap<usize, String> {
    comments_in(&tree.source_code)
}

fn comments_in(source: &str) -> BTreeMap<usize, String> {
    let mut comments = BTreeMap::new();

    for (index, line) in source.lines().enumerate() {
        if let Some(position) = line.find("//") {
            let text = line[position + 2..].trim();
            if !text.is_empty() {
                comments.insert(index + 1, text.to_owned());
            }
        }
    }

    for captures in BLOCK_COMMENT.captures_iter(source) {
        if let Some(whole) = captures.get(0) {
            let line = source[..whole.start()].matches('\n').count() + 1;
            let text = captures[1].trim();
            if !text.is_empty() {
                comments.insert(line, text.to_owned());
            }
        }
    }

    comments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_in_when_line_comments_then_keyed_by_line() {
        let comments = comments_in(
            "PROGRAM P // main cycle\nVAR\n    x : INT; // loop counter\nEND_VAR\nEND_PROGRAM",
        );
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[&1], "main cycle");
        assert_eq!(comments[&3], "loop counter");
    }

    #[test]
    fn comments_in_when_block_comment_then_keyed_at_opening_line() {
        let comments = comments_in("PROGRAM P\n(* runs the\n   conveyor *)\nEND_PROGRAM");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[&2], "runs the\n   conveyor");
    }

    #[test]
    fn comments_in_when_comment_empty_then_skipped() {
        let comments = comments_in("x := 1; //\ny := 2; (*  *)\nz := 3; // kept");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[&3], "kept");
    }

    #[test]
    fn comments_in_when_both_kinds_on_one_line_then_block_wins() {
        let comments = comments_in("x := 1; // line text (* block text *)");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[&1], "block text");
    }

    #[test]
    fn comments_in_when_no_comments_then_empty() {
        assert!(comments_in("PROGRAM P END_PROGRAM").is_empty());
    }
}
