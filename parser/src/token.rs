//! Tokens of the structured text language.

use logos::{Lexer, Logos, Skip};
use plcheck_dsl::core::SourceSpan;
use std::fmt;

/// Line accounting while lexing. `line` counts newlines seen so far and
/// `line_start` is the byte offset just after the most recent newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineTracker {
    pub line: usize,
    pub line_start: usize,
}

fn newline_callback(lex: &mut Lexer<TokenType>) -> Skip {
    lex.extras.line += 1;
    lex.extras.line_start = lex.span().end;
    Skip
}

/// Skips a token that may contain newlines, keeping the line accounting
/// correct. Used for block comments and pragmas.
fn multiline_skip_callback(lex: &mut Lexer<TokenType>) -> Skip {
    let text = lex.slice();
    let newlines = text.bytes().filter(|byte| *byte == b'\n').count();
    if newlines > 0 {
        lex.extras.line += newlines;
        if let Some(index) = text.rfind('\n') {
            lex.extras.line_start = lex.span().start + index + 1;
        }
    }
    Skip
}

/// The type of a token.
///
/// Keywords are matched case-insensitively. Whitespace, comments and
/// TwinCAT attribute pragmas never reach the token stream; the parser only
/// sees meaningful tokens.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(extras = LineTracker)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenType {
    #[regex(r"\n", newline_callback)]
    Newline,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    // Kept in unrolled form: logos miscompiles the equivalent
    // `\(\*([^*]|\*+[^*)])*\*+\)` alternation and rejects valid comments.
    #[regex(r"\(\*[^*]*\*+([^*)][^*]*\*+)*\)", multiline_skip_callback)]
    BlockComment,

    // TwinCAT attribute pragmas such as {attribute 'qualified_only'}.
    #[regex(r"\{[^}]*\}", multiline_skip_callback)]
    Pragma,

    #[token("PROGRAM", ignore(case))]
    Program,
    #[token("END_PROGRAM", ignore(case))]
    EndProgram,
    #[token("FUNCTION_BLOCK", ignore(case))]
    FunctionBlock,
    #[token("END_FUNCTION_BLOCK", ignore(case))]
    EndFunctionBlock,
    #[token("FUNCTION", ignore(case))]
    Function,
    #[token("END_FUNCTION", ignore(case))]
    EndFunction,

    #[token("VAR", ignore(case))]
    Var,
    #[token("VAR_INPUT", ignore(case))]
    VarInput,
    #[token("VAR_OUTPUT", ignore(case))]
    VarOutput,
    #[token("VAR_IN_OUT", ignore(case))]
    VarInOut,
    #[token("VAR_GLOBAL", ignore(case))]
    VarGlobal,
    #[token("VAR_TEMP", ignore(case))]
    VarTemp,
    #[token("END_VAR", ignore(case))]
    EndVar,
    #[token("CONSTANT", ignore(case))]
    Constant,
    #[token("RETAIN", ignore(case))]
    Retain,
    #[token("PERSISTENT", ignore(case))]
    Persistent,
    #[token("AT", ignore(case))]
    At,

    #[token("TYPE", ignore(case))]
    Type,
    #[token("END_TYPE", ignore(case))]
    EndType,
    #[token("STRUCT", ignore(case))]
    Struct,
    #[token("END_STRUCT", ignore(case))]
    EndStruct,
    #[token("UNION", ignore(case))]
    Union,
    #[token("END_UNION", ignore(case))]
    EndUnion,
    #[token("ARRAY", ignore(case))]
    Array,
    #[token("OF", ignore(case))]
    Of,
    #[token("POINTER", ignore(case))]
    Pointer,
    #[token("REFERENCE", ignore(case))]
    Reference,
    #[token("TO", ignore(case))]
    To,

    #[token("IF", ignore(case))]
    If,
    #[token("THEN", ignore(case))]
    Then,
    #[token("ELSIF", ignore(case))]
    Elsif,
    #[token("ELSE", ignore(case))]
    Else,
    #[token("END_IF", ignore(case))]
    EndIf,
    #[token("CASE", ignore(case))]
    Case,
    #[token("END_CASE", ignore(case))]
    EndCase,
    #[token("FOR", ignore(case))]
    For,
    #[token("BY", ignore(case))]
    By,
    #[token("DO", ignore(case))]
    Do,
    #[token("END_FOR", ignore(case))]
    EndFor,
    #[token("WHILE", ignore(case))]
    While,
    #[token("END_WHILE", ignore(case))]
    EndWhile,
    #[token("REPEAT", ignore(case))]
    Repeat,
    #[token("UNTIL", ignore(case))]
    Until,
    #[token("END_REPEAT", ignore(case))]
    EndRepeat,
    #[token("EXIT", ignore(case))]
    Exit,
    #[token("RETURN", ignore(case))]
    Return,

    #[token("MOD", ignore(case))]
    Mod,
    #[token("AND", ignore(case))]
    And,
    #[token("OR", ignore(case))]
    Or,
    #[token("XOR", ignore(case))]
    Xor,
    #[token("NOT", ignore(case))]
    Not,
    #[token("TRUE", ignore(case))]
    True,
    #[token("FALSE", ignore(case))]
    False,

    #[token(":=")]
    Assign,
    #[token("=>")]
    OutputAssign,
    #[token("=")]
    Equal,
    #[token("<>")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("&")]
    Ampersand,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("^")]
    Caret,

    // Duration literals such as T#5s or TIME#1h2m. The body is free-form
    // here; analysis keeps the text as written.
    #[regex(r"(time|ltime|t|lt)#[0-9a-z_.]+", priority = 10, ignore(case))]
    TimeLiteral,

    // Typed literals such as INT#5 or BYTE#16#FF.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*#[0-9][0-9a-fA-F_.#]*", priority = 5)]
    TypedLiteral,

    // Based literals such as 16#FF or 2#1010.
    #[regex(r"[0-9][0-9_]*#[0-9a-fA-F_]+")]
    BasedLiteral,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    RealLiteral,

    #[regex(r"[0-9][0-9_]*")]
    IntegerLiteral,

    // Single-byte string with $ escapes, such as 'it$'s'.
    #[regex(r"'([^'$\n]|\$.)*'")]
    StringLiteral,

    // Double-byte string.
    #[regex(r#""([^"$\n]|\$.)*""#)]
    WStringLiteral,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // Direct addresses such as %QX0.0 or %IW4.
    #[regex(r"%[A-Za-z*][0-9A-Za-z.*]*")]
    DirectAddress,
}

impl TokenType {
    /// The canonical spelling of the token, or a category name for tokens
    /// without a fixed spelling. The grammar matches fixed tokens by this
    /// spelling, which also makes expected-token lists readable.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenType::Newline => "newline",
            TokenType::LineComment | TokenType::BlockComment => "comment",
            TokenType::Pragma => "pragma",
            TokenType::Program => "PROGRAM",
            TokenType::EndProgram => "END_PROGRAM",
            TokenType::FunctionBlock => "FUNCTION_BLOCK",
            TokenType::EndFunctionBlock => "END_FUNCTION_BLOCK",
            TokenType::Function => "FUNCTION",
            TokenType::EndFunction => "END_FUNCTION",
            TokenType::Var => "VAR",
            TokenType::VarInput => "VAR_INPUT",
            TokenType::VarOutput => "VAR_OUTPUT",
            TokenType::VarInOut => "VAR_IN_OUT",
            TokenType::VarGlobal => "VAR_GLOBAL",
            TokenType::VarTemp => "VAR_TEMP",
            TokenType::EndVar => "END_VAR",
            TokenType::Constant => "CONSTANT",
            TokenType::Retain => "RETAIN",
            TokenType::Persistent => "PERSISTENT",
            TokenType::At => "AT",
            TokenType::Type => "TYPE",
            TokenType::EndType => "END_TYPE",
            TokenType::Struct => "STRUCT",
            TokenType::EndStruct => "END_STRUCT",
            TokenType::Union => "UNION",
            TokenType::EndUnion => "END_UNION",
            TokenType::Array => "ARRAY",
            TokenType::Of => "OF",
            TokenType::Pointer => "POINTER",
            TokenType::Reference => "REFERENCE",
            TokenType::To => "TO",
            TokenType::If => "IF",
            TokenType::Then => "THEN",
            TokenType::Elsif => "ELSIF",
            TokenType::Else => "ELSE",
            TokenType::EndIf => "END_IF",
            TokenType::Case => "CASE",
            TokenType::EndCase => "END_CASE",
            TokenType::For => "FOR",
            TokenType::By => "BY",
            TokenType::Do => "DO",
            TokenType::EndFor => "END_FOR",
            TokenType::While => "WHILE",
            TokenType::EndWhile => "END_WHILE",
            TokenType::Repeat => "REPEAT",
            TokenType::Until => "UNTIL",
            TokenType::EndRepeat => "END_REPEAT",
            TokenType::Exit => "EXIT",
            TokenType::Return => "RETURN",
            TokenType::Mod => "MOD",
            TokenType::And => "AND",
            TokenType::Or => "OR",
            TokenType::Xor => "XOR",
            TokenType::Not => "NOT",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::Assign => ":=",
            TokenType::OutputAssign => "=>",
            TokenType::Equal => "=",
            TokenType::NotEqual => "<>",
            TokenType::LessEqual => "<=",
            TokenType::GreaterEqual => ">=",
            TokenType::Less => "<",
            TokenType::Greater => ">",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Ampersand => "&",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::Comma => ",",
            TokenType::Semicolon => ";",
            TokenType::Colon => ":",
            TokenType::DotDot => "..",
            TokenType::Dot => ".",
            TokenType::Caret => "^",
            TokenType::TimeLiteral => "duration literal",
            TokenType::TypedLiteral => "typed literal",
            TokenType::BasedLiteral => "based literal",
            TokenType::RealLiteral => "real literal",
            TokenType::IntegerLiteral => "integer literal",
            TokenType::StringLiteral => "string literal",
            TokenType::WStringLiteral => "wide string literal",
            TokenType::Identifier => "identifier",
            TokenType::DirectAddress => "direct address",
        }
    }
}

/// A token with its text and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub text: String,
    pub span: SourceSpan,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.text)
    }
}
