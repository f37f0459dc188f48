//! Grammar for the structured text part of IEC 61131-3.
//!
//! The grammar works on tokens, not text: the lexer has already removed
//! whitespace, comments and pragmas, so the rules here only describe
//! meaningful structure. Rules produce untyped parse tree nodes; anything
//! about meaning is left to the builder.
//!
//! Fixed tokens appear in rules as their canonical spelling (`"IF"`, `":="`)
//! which is matched against [`TokenType::describe`]. This keeps the list of
//! expected tokens in syntax error messages readable.

use crate::token::{Token, TokenType};
use crate::tree::{Children, ParseKind, ParseNode};
use peg::{Parse, ParseElem, ParseLiteral, ParseSlice, RuleResult};
use plcheck_dsl::core::FileId;
use plcheck_dsl::diagnostic::{Diagnostic, Label};
use plcheck_problems::Problem;

/// Parses a token stream into a parse tree.
///
/// A file either parses completely or produces a single syntax error naming
/// the unexpected token and what would have been accepted in its place.
pub fn parse_tokens(tokens: &[Token], file_id: &FileId) -> Result<ParseNode, Diagnostic> {
    st_parser::compilation_unit(&TokenSlice(tokens)).map_err(|err| {
        // The expected set iterates in hash order; sort so that the same
        // source always produces the same message.
        let mut expected: Vec<&str> = err.expected.tokens().collect();
        expected.sort_unstable();
        expected.dedup();
        let expected = expected.join(", ");
        match tokens.get(err.location) {
            Some(token) => Diagnostic::problem(
                Problem::SyntaxError,
                Label::span(
                    token.span.clone(),
                    format!("Expected one of: {}. Found {}", expected, token),
                ),
            )
            .with_offending_symbol(&token.text),
            None => {
                let message = format!("Expected one of: {}. Found end of file", expected);
                let label = match tokens.last() {
                    Some(last) => Label::span(last.span.clone(), message),
                    None => Label::file(file_id, message),
                };
                Diagnostic::problem(Problem::SyntaxError, label)
            }
        }
    })
}

/// The default parsing traits for `[T]` expect `T` to be `Copy`. This
/// wrapper exposes the tokens by reference instead.
pub struct TokenSlice<'a>(pub &'a [Token]);

impl<'a> Parse for TokenSlice<'a> {
    type PositionRepr = usize;

    fn start(&self) -> usize {
        0
    }

    fn is_eof(&self, pos: usize) -> bool {
        pos >= self.0.len()
    }

    fn position_repr(&self, pos: usize) -> usize {
        pos
    }
}

impl<'a> ParseElem<'a> for TokenSlice<'a> {
    type Element = &'a Token;

    fn parse_elem(&'a self, pos: usize) -> RuleResult<&'a Token> {
        match self.0.get(pos) {
            Some(token) => RuleResult::Matched(pos + 1, token),
            None => RuleResult::Failed,
        }
    }
}

impl<'a> ParseLiteral for TokenSlice<'a> {
    /// Matches a string literal in the grammar against the canonical
    /// spelling of the token at the position.
    fn parse_string_literal(&self, pos: usize, literal: &str) -> RuleResult<()> {
        match self.0.get(pos) {
            Some(token) if token.token_type.describe() == literal => {
                RuleResult::Matched(pos + 1, ())
            }
            _ => RuleResult::Failed,
        }
    }
}

impl<'a> ParseSlice<'a> for TokenSlice<'a> {
    type Slice = &'a [Token];

    fn parse_slice(&'a self, p1: usize, p2: usize) -> &'a [Token] {
        &self.0[p1..p2]
    }
}

/// Folds a left-associative operator chain into nested binary nodes.
fn fold_binary(lhs: ParseNode, rest: Vec<(&[Token], ParseNode)>) -> ParseNode {
    rest.into_iter().fold(lhs, |acc, (op, rhs)| {
        Children::new()
            .node(acc)
            .tokens(op)
            .node(rhs)
            .into_node(ParseKind::Binary)
    })
}

peg::parser! {
  grammar st_parser<'a>() for TokenSlice<'a> {

    pub rule compilation_unit() -> ParseNode
        = decls:declaration()* {
            Children::new().nodes(decls).into_node(ParseKind::CompilationUnit)
        }

    rule declaration() -> ParseNode
        = program()
        / function_block()
        / function()
        / type_block()
        / var_block()

    // Program units. The opening and closing keywords are kept in the tree
    // so that the unit's span covers the whole declaration.

    rule program() -> ParseNode
        = open:$("PROGRAM") name:id() blocks:var_block()* body:body() close:$("END_PROGRAM") {
            Children::new()
                .tokens(open)
                .token(name)
                .nodes(blocks)
                .node(body)
                .tokens(close)
                .into_node(ParseKind::Program)
        }

    rule function_block() -> ParseNode
        = open:$("FUNCTION_BLOCK") name:id() inherit_clause()* blocks:var_block()* body:body()
          close:$("END_FUNCTION_BLOCK") {
            Children::new()
                .tokens(open)
                .token(name)
                .nodes(blocks)
                .node(body)
                .tokens(close)
                .into_node(ParseKind::FunctionBlock)
        }

    rule function() -> ParseNode
        = open:$("FUNCTION") name:id() ":" ret:type_spec() blocks:var_block()* body:body()
          close:$("END_FUNCTION") {
            Children::new()
                .tokens(open)
                .token(name)
                .node(ret)
                .nodes(blocks)
                .node(body)
                .tokens(close)
                .into_node(ParseKind::Function)
        }

    // EXTENDS and IMPLEMENTS are not reserved words in the token set, so
    // they are matched as identifiers. The named bases are accepted but not
    // recorded; inheritance does not take part in single-file analysis.
    rule inherit_clause()
        = id_eq("EXTENDS") (id() ++ ".") {}
        / id_eq("IMPLEMENTS") (id() ++ ",") {}

    // Variable declarations.

    rule var_block() -> ParseNode
        = open:$(("VAR_INPUT" / "VAR_OUTPUT" / "VAR_IN_OUT" / "VAR_GLOBAL" / "VAR_TEMP" / "VAR"))
          quals:$(("CONSTANT" / "RETAIN" / "PERSISTENT"))*
          decls:var_decl()*
          close:$("END_VAR") {
            let mut children = Children::new().tokens(open);
            for qual in quals {
                children = children.tokens(qual);
            }
            children.nodes(decls).tokens(close).into_node(ParseKind::VarBlock)
        }

    /// One declaration line. Several names may share one type; the builder
    /// fans them out into one declaration per name.
    rule var_decl() -> ParseNode
        = names:(id() ++ ",") at_clause()? ":" ts:type_spec() init:initializer()? ";" {
            let mut children = Children::new();
            for name in names {
                children = children.token(name);
            }
            children.node(ts).opt_node(init).into_node(ParseKind::VarDecl)
        }

    rule at_clause()
        = "AT" direct_address() {}

    rule initializer() -> ParseNode
        = ":=" value:(expression() / bracket_initializer()) { value }

    rule bracket_initializer() -> ParseNode
        = open:$("[") values:(expression() ** ",") close:$("]") {
            Children::new()
                .tokens(open)
                .nodes(values)
                .tokens(close)
                .into_node(ParseKind::BracketInit)
        }

    // Type specifications such as `INT`, `ARRAY [0..9] OF INT` or
    // `POINTER TO ST_Point`.

    rule type_spec() -> ParseNode
        = array_spec() / pointer_spec() / reference_spec() / simple_spec()

    rule array_spec() -> ParseNode
        = kw:$("ARRAY") "[" ranges:(range() ++ ",") "]" "OF" elem:type_spec() {
            Children::new()
                .tokens(kw)
                .nodes(ranges)
                .node(elem)
                .into_node(ParseKind::TypeSpec)
        }

    rule pointer_spec() -> ParseNode
        = kw:$("POINTER") "TO" elem:type_spec() {
            Children::new().tokens(kw).node(elem).into_node(ParseKind::TypeSpec)
        }

    rule reference_spec() -> ParseNode
        = kw:$("REFERENCE") "TO" elem:type_spec() {
            Children::new().tokens(kw).node(elem).into_node(ParseKind::TypeSpec)
        }

    rule simple_spec() -> ParseNode
        = name:id() type_suffix()? {
            Children::new().token(name).into_node(ParseKind::TypeSpec)
        }

    // String sizes (`STRING(80)`, `STRING[80]`) and subranges
    // (`INT (0..100)`) are accepted and dropped. Analysis works on the
    // base type.
    rule type_suffix()
        = "(" simple_value() ".." simple_value() ")" {}
        / "(" expression() ")" {}
        / "[" expression() "]" {}

    rule range() -> ParseNode
        = lo:simple_value() ".." hi:simple_value() {
            Children::new().node(lo).node(hi).into_node(ParseKind::Range)
        }

    // Data types.

    rule type_block() -> ParseNode
        = open:$("TYPE") decls:type_decl()* close:$("END_TYPE") ";"? {
            Children::new()
                .tokens(open)
                .nodes(decls)
                .tokens(close)
                .into_node(ParseKind::TypeBlock)
        }

    rule type_decl() -> ParseNode
        = name:id() ":" def:type_definition() ";"? {
            Children::new().token(name).node(def).into_node(ParseKind::TypeDecl)
        }

    rule type_definition() -> ParseNode
        = struct_def() / enum_def() / alias_def()

    /// A structure or union. Both declare named fields; the difference in
    /// storage does not matter to analysis.
    rule struct_def() -> ParseNode
        = open:$("STRUCT") fields:var_decl()* close:$("END_STRUCT") {
            Children::new()
                .tokens(open)
                .nodes(fields)
                .tokens(close)
                .into_node(ParseKind::StructDef)
        }
        / open:$("UNION") fields:var_decl()* close:$("END_UNION") {
            Children::new()
                .tokens(open)
                .nodes(fields)
                .tokens(close)
                .into_node(ParseKind::StructDef)
        }

    rule enum_def() -> ParseNode
        = open:$("(") values:(enum_value() ++ ",") close:$(")") id()? {
            Children::new()
                .tokens(open)
                .nodes(values)
                .tokens(close)
                .into_node(ParseKind::EnumDef)
        }

    rule enum_value() -> ParseNode
        = name:id() value:(":=" value:simple_value() { value })? {
            Children::new().token(name).opt_node(value).into_node(ParseKind::EnumValue)
        }

    rule alias_def() -> ParseNode
        = ts:type_spec() init:initializer()? {
            Children::new().node(ts).opt_node(init).into_node(ParseKind::AliasDef)
        }

    // Statements.

    rule body() -> ParseNode
        = stmts:statement()* { Children::new().nodes(stmts).into_node(ParseKind::Body) }

    rule statement() -> ParseNode
        = if_stmt()
        / case_stmt()
        / for_stmt()
        / while_stmt()
        / repeat_stmt()
        / exit_stmt()
        / return_stmt()
        / assignment()
        / call_stmt()
        / empty_stmt()

    rule assignment() -> ParseNode
        = target:variable_ref() ":=" value:expression() semi:$(";") {
            Children::new()
                .node(target)
                .node(value)
                .tokens(semi)
                .into_node(ParseKind::Assignment)
        }

    rule call_stmt() -> ParseNode
        = call:call_expr() semi:$(";") {
            Children::new().node(call).tokens(semi).into_node(ParseKind::CallStmt)
        }

    rule if_stmt() -> ParseNode
        = open:$("IF") cond:expression() "THEN" body:body()
          elsifs:elsif_clause()* els:else_clause()? close:$("END_IF") ";"? {
            Children::new()
                .tokens(open)
                .node(cond)
                .node(body)
                .nodes(elsifs)
                .opt_node(els)
                .tokens(close)
                .into_node(ParseKind::If)
        }

    rule elsif_clause() -> ParseNode
        = kw:$("ELSIF") cond:expression() "THEN" body:body() {
            Children::new()
                .tokens(kw)
                .node(cond)
                .node(body)
                .into_node(ParseKind::ElsifClause)
        }

    rule else_clause() -> ParseNode
        = kw:$("ELSE") body:body() {
            Children::new().tokens(kw).node(body).into_node(ParseKind::ElseClause)
        }

    rule case_stmt() -> ParseNode
        = open:$("CASE") selector:expression() "OF"
          elements:case_element()* els:else_clause()? close:$("END_CASE") ";"? {
            Children::new()
                .tokens(open)
                .node(selector)
                .nodes(elements)
                .opt_node(els)
                .tokens(close)
                .into_node(ParseKind::Case)
        }

    rule case_element() -> ParseNode
        = values:(case_value() ++ ",") ":" body:body() {
            Children::new().nodes(values).node(body).into_node(ParseKind::CaseElement)
        }

    rule case_value() -> ParseNode
        = lo:simple_value() ".." hi:simple_value() {
            Children::new().node(lo).node(hi).into_node(ParseKind::Range)
        }
        / simple_value()

    rule for_stmt() -> ParseNode
        = open:$("FOR") control:id() ":=" from:expression() "TO" to:expression()
          by:("BY" step:expression() { step })? "DO" body:body() close:$("END_FOR") ";"? {
            Children::new()
                .tokens(open)
                .token(control)
                .node(from)
                .node(to)
                .opt_node(by)
                .node(body)
                .tokens(close)
                .into_node(ParseKind::For)
        }

    rule while_stmt() -> ParseNode
        = open:$("WHILE") cond:expression() "DO" body:body() close:$("END_WHILE") ";"? {
            Children::new()
                .tokens(open)
                .node(cond)
                .node(body)
                .tokens(close)
                .into_node(ParseKind::While)
        }

    rule repeat_stmt() -> ParseNode
        = open:$("REPEAT") body:body() "UNTIL" cond:expression() close:$("END_REPEAT") ";"? {
            Children::new()
                .tokens(open)
                .node(body)
                .node(cond)
                .tokens(close)
                .into_node(ParseKind::Repeat)
        }

    rule exit_stmt() -> ParseNode
        = kw:$("EXIT") semi:$(";") {
            Children::new().tokens(kw).tokens(semi).into_node(ParseKind::Exit)
        }

    rule return_stmt() -> ParseNode
        = kw:$("RETURN") semi:$(";") {
            Children::new().tokens(kw).tokens(semi).into_node(ParseKind::Return)
        }

    rule empty_stmt() -> ParseNode
        = semi:$(";") { Children::new().tokens(semi).into_node(ParseKind::EmptyStmt) }

    // Expressions, from lowest to highest precedence. Each level folds its
    // operator chain left-associatively.

    rule expression() -> ParseNode = or_expr()

    rule or_expr() -> ParseNode
        = lhs:xor_expr() rest:(op:$("OR") rhs:xor_expr() { (op, rhs) })* {
            fold_binary(lhs, rest)
        }

    rule xor_expr() -> ParseNode
        = lhs:and_expr() rest:(op:$("XOR") rhs:and_expr() { (op, rhs) })* {
            fold_binary(lhs, rest)
        }

    rule and_expr() -> ParseNode
        = lhs:equality_expr() rest:(op:$(("AND" / "&")) rhs:equality_expr() { (op, rhs) })* {
            fold_binary(lhs, rest)
        }

    rule equality_expr() -> ParseNode
        = lhs:relational_expr() rest:(op:$(("=" / "<>")) rhs:relational_expr() { (op, rhs) })* {
            fold_binary(lhs, rest)
        }

    rule relational_expr() -> ParseNode
        = lhs:add_expr() rest:(op:$(("<=" / ">=" / "<" / ">")) rhs:add_expr() { (op, rhs) })* {
            fold_binary(lhs, rest)
        }

    rule add_expr() -> ParseNode
        = lhs:term() rest:(op:$(("+" / "-")) rhs:term() { (op, rhs) })* {
            fold_binary(lhs, rest)
        }

    rule term() -> ParseNode
        = lhs:unary() rest:(op:$(("*" / "/" / "MOD")) rhs:unary() { (op, rhs) })* {
            fold_binary(lhs, rest)
        }

    rule unary() -> ParseNode
        = op:$(("NOT" / "-" / "+")) operand:unary() {
            Children::new().tokens(op).node(operand).into_node(ParseKind::Unary)
        }
        / primary()

    rule primary() -> ParseNode
        = paren() / literal() / call_expr() / variable_ref()

    rule paren() -> ParseNode
        = open:$("(") inner:expression() close:$(")") {
            Children::new()
                .tokens(open)
                .node(inner)
                .tokens(close)
                .into_node(ParseKind::Paren)
        }

    rule literal() -> ParseNode
        = token:literal_tok() { Children::new().token(token).into_node(ParseKind::Literal) }

    /// A value usable where a constant is expected: in array bounds, CASE
    /// selectors and enumeration values. Named constants are allowed.
    rule simple_value() -> ParseNode
        = sign:$("-") value:literal() {
            Children::new().tokens(sign).node(value).into_node(ParseKind::Unary)
        }
        / "+" value:literal() { value }
        / literal()
        / variable_ref()

    rule call_expr() -> ParseNode
        = callee:(id() ++ ".") open:$("(") args:(call_arg() ** ",") close:$(")") {
            let mut children = Children::new();
            for name in callee {
                children = children.token(name);
            }
            children.tokens(open).nodes(args).tokens(close).into_node(ParseKind::Call)
        }

    rule call_arg() -> ParseNode
        = name:id() dir:$((":=" / "=>")) value:expression() {
            Children::new()
                .token(name)
                .tokens(dir)
                .node(value)
                .into_node(ParseKind::Arg)
        }
        / value:expression() { Children::new().node(value).into_node(ParseKind::Arg) }

    rule variable_ref() -> ParseNode
        = base:id() accesses:access()* {
            let mut children = Children::new().token(base);
            for access in accesses.into_iter().flatten() {
                children = children.node(access);
            }
            children.into_node(ParseKind::Variable)
        }

    // Pointer dereference changes the value, not which variable is used,
    // so the caret is consumed without a tree node.
    rule access() -> Option<ParseNode>
        = "." field:id() {
            Some(Children::new().token(field).into_node(ParseKind::FieldAccess))
        }
        / sub:subscript() { Some(sub) }
        / "^" { None }

    rule subscript() -> ParseNode
        = open:$("[") indexes:(expression() ++ ",") close:$("]") {
            Children::new()
                .tokens(open)
                .nodes(indexes)
                .tokens(close)
                .into_node(ParseKind::Subscript)
        }

    // Token helpers. `quiet!` plus `expected!` names the token category in
    // error messages instead of showing the match pattern.

    rule id() -> &'input Token
        = quiet!{ token:[token if token.token_type == TokenType::Identifier] { token } }
        / expected!("identifier")

    rule id_eq(val: &str)
        = [token if token.token_type == TokenType::Identifier
            && token.text.eq_ignore_ascii_case(val)] {}

    rule direct_address() -> &'input Token
        = quiet!{ token:[token if token.token_type == TokenType::DirectAddress] { token } }
        / expected!("direct address")

    rule literal_tok() -> &'input Token
        = quiet!{ token:[token if matches!(
            token.token_type,
            TokenType::IntegerLiteral
                | TokenType::RealLiteral
                | TokenType::BasedLiteral
                | TokenType::TypedLiteral
                | TokenType::TimeLiteral
                | TokenType::StringLiteral
                | TokenType::WStringLiteral
                | TokenType::True
                | TokenType::False
        )] { token } }
        / expected!("literal")
  }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> Result<ParseNode, Diagnostic> {
        let file_id = FileId::default();
        let (tokens, diagnostics) = tokenize(source, &file_id);
        assert!(diagnostics.is_empty(), "lexer problems: {:?}", diagnostics);
        parse_tokens(&tokens, &file_id)
    }

    #[test]
    fn parse_when_empty_then_empty_unit() {
        let unit = parse("").unwrap();
        assert_eq!(unit.kind, ParseKind::CompilationUnit);
        assert_eq!(unit.node_count(), 0);
    }

    #[test]
    fn parse_when_minimal_program_then_one_declaration() {
        let unit = parse("PROGRAM P END_PROGRAM").unwrap();
        assert_eq!(unit.node_count(), 1);
        let program = unit.node(0).unwrap();
        assert_eq!(program.kind, ParseKind::Program);
        assert_eq!(program.token(1).map(|t| t.text.as_str()), Some("P"));
    }

    #[test]
    fn parse_when_var_block_then_decls_nested() {
        let unit = parse(
            "PROGRAM P
             VAR
                 a, b : INT := 1;
                 s : STRING(80);
             END_VAR
             END_PROGRAM",
        )
        .unwrap();
        let program = unit.node(0).unwrap();
        let block = program.first_node(ParseKind::VarBlock).unwrap();
        assert_eq!(block.nodes_of(ParseKind::VarDecl).count(), 2);
        let first = block.node(0).unwrap();
        // Two names, one shared type, one initializer.
        assert_eq!(first.tokens().count(), 2);
        assert!(first.first_node(ParseKind::TypeSpec).is_some());
        assert_eq!(first.node_count(), 2);
    }

    #[test]
    fn parse_when_array_type_then_ranges_recorded() {
        let unit = parse(
            "PROGRAM P VAR a : ARRAY [0..9, -1..1] OF INT; END_VAR END_PROGRAM",
        )
        .unwrap();
        let decl = unit
            .node(0)
            .unwrap()
            .first_node(ParseKind::VarBlock)
            .unwrap()
            .first_node(ParseKind::VarDecl)
            .unwrap();
        let spec = decl.first_node(ParseKind::TypeSpec).unwrap();
        assert_eq!(spec.nodes_of(ParseKind::Range).count(), 2);
        assert!(spec.first_node(ParseKind::TypeSpec).is_some());
    }

    #[test]
    fn parse_when_precedence_then_multiplication_binds_tighter() {
        let unit = parse("PROGRAM P x := 1 + 2 * 3; END_PROGRAM").unwrap();
        let body = unit.node(0).unwrap().first_node(ParseKind::Body).unwrap();
        let assignment = body.node(0).unwrap();
        assert_eq!(assignment.kind, ParseKind::Assignment);
        let value = assignment.node(1).unwrap();
        assert_eq!(value.kind, ParseKind::Binary);
        assert_eq!(value.token(0).map(|t| t.text.as_str()), Some("+"));
        assert_eq!(value.node(1).unwrap().kind, ParseKind::Binary);
    }

    #[test]
    fn parse_when_call_statement_then_not_assignment() {
        let unit = parse("PROGRAM P fbStep(IN := TRUE, 5); END_PROGRAM").unwrap();
        let body = unit.node(0).unwrap().first_node(ParseKind::Body).unwrap();
        let stmt = body.node(0).unwrap();
        assert_eq!(stmt.kind, ParseKind::CallStmt);
        let call = stmt.node(0).unwrap();
        assert_eq!(call.kind, ParseKind::Call);
        assert_eq!(call.nodes_of(ParseKind::Arg).count(), 2);
    }

    #[test]
    fn parse_when_if_with_elsif_then_clauses_kept() {
        let unit = parse(
            "PROGRAM P
             IF a THEN x := 1;
             ELSIF b THEN x := 2;
             ELSIF c THEN x := 3;
             ELSE x := 4;
             END_IF
             END_PROGRAM",
        )
        .unwrap();
        let body = unit.node(0).unwrap().first_node(ParseKind::Body).unwrap();
        let if_stmt = body.node(0).unwrap();
        assert_eq!(if_stmt.kind, ParseKind::If);
        assert_eq!(if_stmt.nodes_of(ParseKind::ElsifClause).count(), 2);
        assert_eq!(if_stmt.nodes_of(ParseKind::ElseClause).count(), 1);
    }

    #[test]
    fn parse_when_case_with_ranges_then_selectors_kept() {
        let unit = parse(
            "PROGRAM P
             CASE nStep OF
                 0: x := 1;
                 1..3, 5: x := 2;
                 E_Mode.Run: x := 3;
             ELSE
                 x := 4;
             END_CASE
             END_PROGRAM",
        )
        .unwrap();
        let body = unit.node(0).unwrap().first_node(ParseKind::Body).unwrap();
        let case = body.node(0).unwrap();
        assert_eq!(case.kind, ParseKind::Case);
        assert_eq!(case.nodes_of(ParseKind::CaseElement).count(), 3);
        let second = case.nodes_of(ParseKind::CaseElement).nth(1).unwrap();
        // The range, the single selector, and the body.
        assert_eq!(second.node_count(), 3);
        assert!(second.first_node(ParseKind::Range).is_some());
    }

    #[test]
    fn parse_when_global_list_then_block_at_top_level() {
        let unit = parse("VAR_GLOBAL CONSTANT nMax : INT := 10; END_VAR").unwrap();
        assert_eq!(unit.node(0).unwrap().kind, ParseKind::VarBlock);
    }

    #[test]
    fn parse_when_type_declarations_then_one_node_per_type() {
        let unit = parse(
            "TYPE ST_Point :
             STRUCT
                 x : INT;
                 y : INT;
             END_STRUCT
             END_TYPE
             TYPE E_Color : (Red, Green := 5, Blue); END_TYPE",
        )
        .unwrap();
        assert_eq!(unit.node_count(), 2);
        let st = unit.node(0).unwrap().first_node(ParseKind::TypeDecl).unwrap();
        assert_eq!(st.node(0).unwrap().kind, ParseKind::StructDef);
        let en = unit.node(1).unwrap().first_node(ParseKind::TypeDecl).unwrap();
        assert_eq!(en.node(0).unwrap().kind, ParseKind::EnumDef);
        assert_eq!(en.node(0).unwrap().nodes_of(ParseKind::EnumValue).count(), 3);
    }

    #[test]
    fn parse_when_pointer_use_then_deref_and_fields_parse() {
        let unit = parse(
            "PROGRAM P
             pPoint^.x := arr[i + 1, j];
             FOR i := 0 TO 10 BY 2 DO EXIT; END_FOR
             REPEAT n := n - 1; UNTIL n = 0 END_REPEAT
             END_PROGRAM",
        )
        .unwrap();
        let body = unit.node(0).unwrap().first_node(ParseKind::Body).unwrap();
        assert_eq!(body.node_count(), 3);
        assert_eq!(body.node(1).unwrap().kind, ParseKind::For);
        assert_eq!(body.node(2).unwrap().kind, ParseKind::Repeat);
    }

    #[test]
    fn parse_when_missing_semicolon_then_syntax_error_with_expectations() {
        let err = parse("PROGRAM P x := 1 END_PROGRAM").unwrap_err();
        assert_eq!(err.code, "P1002");
        assert!(err.primary.message.starts_with("Expected one of:"));
        assert_eq!(err.offending_symbol.as_deref(), Some("END_PROGRAM"));
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn parse_when_truncated_then_end_of_file_reported() {
        let err = parse("PROGRAM P x := 1;").unwrap_err();
        assert_eq!(err.code, "P1002");
        assert!(err.primary.message.ends_with("Found end of file"));
    }

    #[test]
    fn parse_when_function_then_return_type_direct_child() {
        let unit = parse(
            "FUNCTION Add : INT
             VAR_INPUT a, b : INT; END_VAR
             Add := a + b;
             END_FUNCTION",
        )
        .unwrap();
        let function = unit.node(0).unwrap();
        assert_eq!(function.kind, ParseKind::Function);
        assert_eq!(function.node(0).unwrap().kind, ParseKind::TypeSpec);
    }

    #[test]
    fn parse_when_output_arg_then_direction_accepted() {
        let unit = parse("PROGRAM P fb(q => bDone, IN := x.y); END_PROGRAM").unwrap();
        let body = unit.node(0).unwrap().first_node(ParseKind::Body).unwrap();
        assert_eq!(body.node(0).unwrap().kind, ParseKind::CallStmt);
    }
}
