//! Builds syntax tree objects from the parse tree.
//!
//! The builder is the only place that knows which parse tree child means
//! what. It walks the untyped tree by matching on node kinds and produces
//! the typed objects from the language definition crate. The walk is total:
//! a shape the builder does not recognize becomes an `Empty` node, statement
//! or expression carrying the original span, never a panic.
//!
//! The builder also assigns every expression its identity, numbering from 1
//! in tree order. Later passes key side tables by these identities.

use crate::token::{Token, TokenType};
use crate::tree::{ParseKind, ParseNode};
use plcheck_dsl::common::*;
use plcheck_dsl::core::Id;
use plcheck_dsl::textual::*;

/// Builds the top-level syntax tree nodes for one parsed file.
pub fn build(unit: &ParseNode) -> Vec<Node> {
    let mut builder = Builder { next_expr_id: 1 };
    let mut nodes = vec![];
    if unit.kind != ParseKind::CompilationUnit {
        return nodes;
    }
    for decl in unit.nodes() {
        match decl.kind {
            ParseKind::Program => {
                let (name, var_blocks, body) = builder.pou_parts(decl);
                nodes.push(Node::Program(ProgramDecl {
                    name,
                    var_blocks,
                    body,
                    span: decl.span.clone(),
                }));
            }
            ParseKind::FunctionBlock => {
                let (name, var_blocks, body) = builder.pou_parts(decl);
                nodes.push(Node::FunctionBlock(FunctionBlockDecl {
                    name,
                    var_blocks,
                    body,
                    span: decl.span.clone(),
                }));
            }
            ParseKind::Function => {
                let (name, var_blocks, body) = builder.pou_parts(decl);
                let return_type = decl
                    .first_node(ParseKind::TypeSpec)
                    .map(|spec| builder.build_type_spec(spec))
                    .unwrap_or_else(|| TypeSpec::simple(""));
                nodes.push(Node::Function(FunctionDecl {
                    name,
                    return_type,
                    var_blocks,
                    body,
                    span: decl.span.clone(),
                }));
            }
            ParseKind::TypeBlock => {
                for type_decl in decl.nodes_of(ParseKind::TypeDecl) {
                    nodes.push(Node::DataType(builder.build_type_decl(type_decl)));
                }
            }
            ParseKind::VarBlock => {
                nodes.push(Node::VarBlock(builder.build_var_block(decl)));
            }
            _ => nodes.push(Node::Empty(decl.span.clone())),
        }
    }
    nodes
}

struct Builder {
    next_expr_id: u32,
}

impl Builder {
    fn next_id(&mut self) -> ExprId {
        let id = ExprId(self.next_expr_id);
        self.next_expr_id += 1;
        id
    }

    /// The parts common to all program unit kinds. The unit name is the
    /// token after the opening keyword.
    fn pou_parts(&mut self, node: &ParseNode) -> (Id, Vec<VarBlock>, Vec<StmtKind>) {
        let name = node.token(1).map(id_from).unwrap_or_else(|| Id::from(""));
        let var_blocks = node
            .nodes_of(ParseKind::VarBlock)
            .map(|block| self.build_var_block(block))
            .collect();
        let body = node
            .first_node(ParseKind::Body)
            .map(|body| self.build_body(body))
            .unwrap_or_default();
        (name, var_blocks, body)
    }

    fn build_var_block(&mut self, node: &ParseNode) -> VarBlock {
        let mut kind = match node.token(0).map(|token| token.token_type) {
            Some(TokenType::VarInput) => VarBlockKind::Input,
            Some(TokenType::VarOutput) => VarBlockKind::Output,
            Some(TokenType::VarInOut) => VarBlockKind::InOut,
            Some(TokenType::VarGlobal) => VarBlockKind::Global,
            _ => VarBlockKind::Local,
        };
        if node
            .tokens()
            .any(|token| token.token_type == TokenType::Constant)
        {
            kind = VarBlockKind::Constant;
        }
        let mut decls = vec![];
        for decl in node.nodes_of(ParseKind::VarDecl) {
            decls.append(&mut self.build_var_decls(decl));
        }
        VarBlock {
            kind,
            decls,
            span: node.span.clone(),
        }
    }

    /// One declaration line becomes one declaration per name, all sharing
    /// the written type and initializer.
    fn build_var_decls(&mut self, node: &ParseNode) -> Vec<VarDecl> {
        let type_spec = node
            .first_node(ParseKind::TypeSpec)
            .map(|spec| self.build_type_spec(spec))
            .unwrap_or_else(|| TypeSpec::simple(""));
        let initializer = node.node(1).map(|init| self.build_expr(init));
        node.tokens()
            .map(|name| VarDecl {
                name: id_from(name),
                type_spec: type_spec.clone(),
                initializer: initializer.clone(),
                span: node.span.clone(),
            })
            .collect()
    }

    fn build_type_spec(&mut self, node: &ParseNode) -> TypeSpec {
        match node.token(0) {
            Some(token) if token.token_type == TokenType::Array => {
                let mut array_ranges = vec![];
                for range in node.nodes_of(ParseKind::Range) {
                    // Bounds are recorded only when both evaluate to an
                    // integer; a named constant leaves the dimension open.
                    if let Some(range) = build_array_range(range) {
                        array_ranges.push(range);
                    } else {
                        array_ranges.clear();
                        break;
                    }
                }
                let elem = self.element_spec(node);
                TypeSpec {
                    is_array: true,
                    array_ranges,
                    ..elem
                }
            }
            Some(token) if token.token_type == TokenType::Pointer => TypeSpec {
                is_pointer: true,
                ..self.element_spec(node)
            },
            Some(token) if token.token_type == TokenType::Reference => TypeSpec {
                is_reference: true,
                ..self.element_spec(node)
            },
            Some(token) => TypeSpec {
                base: id_from(token),
                is_array: false,
                array_ranges: vec![],
                is_pointer: false,
                is_reference: false,
            },
            None => TypeSpec::simple(""),
        }
    }

    /// The nested element type of an array, pointer or reference.
    fn element_spec(&mut self, node: &ParseNode) -> TypeSpec {
        node.first_node(ParseKind::TypeSpec)
            .map(|spec| self.build_type_spec(spec))
            .unwrap_or_else(|| TypeSpec::simple(""))
    }

    fn build_type_decl(&mut self, node: &ParseNode) -> DataTypeDecl {
        let name = node.token(0).map(id_from).unwrap_or_else(|| Id::from(""));
        let definition = match node.node(0) {
            Some(def) => match def.kind {
                ParseKind::StructDef => {
                    let mut fields = vec![];
                    for field in def.nodes_of(ParseKind::VarDecl) {
                        fields.append(&mut self.build_var_decls(field));
                    }
                    TypeDefinition::Struct(StructType {
                        fields,
                        span: def.span.clone(),
                    })
                }
                ParseKind::EnumDef => {
                    let values = def
                        .nodes_of(ParseKind::EnumValue)
                        .map(|value| EnumValue {
                            name: value.token(0).map(id_from).unwrap_or_else(|| Id::from("")),
                            value: value.node(0).and_then(const_int_value),
                            span: value.span.clone(),
                        })
                        .collect();
                    TypeDefinition::Enum(EnumType {
                        values,
                        span: def.span.clone(),
                    })
                }
                ParseKind::AliasDef => {
                    let target = def
                        .first_node(ParseKind::TypeSpec)
                        .map(|spec| self.build_type_spec(spec))
                        .unwrap_or_else(|| TypeSpec::simple(""));
                    TypeDefinition::Alias(AliasType {
                        target,
                        span: def.span.clone(),
                    })
                }
                _ => TypeDefinition::Empty(def.span.clone()),
            },
            None => TypeDefinition::Empty(node.span.clone()),
        };
        DataTypeDecl {
            name,
            definition,
            span: node.span.clone(),
        }
    }

    fn build_body(&mut self, node: &ParseNode) -> Vec<StmtKind> {
        node.nodes().map(|stmt| self.build_stmt(stmt)).collect()
    }

    fn build_stmt(&mut self, node: &ParseNode) -> StmtKind {
        let span = node.span.clone();
        match node.kind {
            ParseKind::Assignment => {
                let target = match node.node(0) {
                    Some(target) => self.build_variable(target),
                    None => self.empty_variable(node),
                };
                let value = self.child_expr(node, 1);
                StmtKind::Assignment(Assignment {
                    target,
                    value,
                    span,
                })
            }
            ParseKind::CallStmt => {
                let call = match node.node(0) {
                    Some(call) => self.build_call(call),
                    None => self.empty_call(node),
                };
                StmtKind::FbCall(FbCall { call })
            }
            ParseKind::If => {
                let cond = self.child_expr(node, 0);
                let body = self.clause_body(node);
                let else_ifs = node
                    .nodes_of(ParseKind::ElsifClause)
                    .map(|clause| ElseIf {
                        cond: self.child_expr(clause, 0),
                        body: self.clause_body(clause),
                    })
                    .collect();
                let else_body = self.else_body(node);
                StmtKind::If(If {
                    cond,
                    body,
                    else_ifs,
                    else_body,
                    span,
                })
            }
            ParseKind::Case => {
                let selector = self.child_expr(node, 0);
                let elements = node
                    .nodes_of(ParseKind::CaseElement)
                    .map(|element| self.build_case_element(element))
                    .collect();
                let else_body = self.else_body(node);
                StmtKind::Case(Case {
                    selector,
                    elements,
                    else_body,
                    span,
                })
            }
            ParseKind::For => {
                let control = node.token(1).map(id_from).unwrap_or_else(|| Id::from(""));
                let from = self.child_expr(node, 0);
                let to = self.child_expr(node, 1);
                let by = if node.node_count() == 4 {
                    node.node(2).map(|step| self.build_expr(step))
                } else {
                    None
                };
                let body = self.clause_body(node);
                StmtKind::For(For {
                    control,
                    from,
                    to,
                    by,
                    body,
                    span,
                })
            }
            ParseKind::While => StmtKind::While(While {
                cond: self.child_expr(node, 0),
                body: self.clause_body(node),
                span,
            }),
            ParseKind::Repeat => StmtKind::Repeat(Repeat {
                body: self.clause_body(node),
                until: self.child_expr(node, 1),
                span,
            }),
            ParseKind::Exit => StmtKind::Exit(Exit { span }),
            ParseKind::Return => StmtKind::Return(Return { span }),
            _ => StmtKind::Empty(EmptyStmt { span }),
        }
    }

    /// The statements of the `Body` child, or none.
    fn clause_body(&mut self, node: &ParseNode) -> Vec<StmtKind> {
        node.first_node(ParseKind::Body)
            .map(|body| self.build_body(body))
            .unwrap_or_default()
    }

    /// The statements of the `ELSE` clause, or none.
    fn else_body(&mut self, node: &ParseNode) -> Vec<StmtKind> {
        node.first_node(ParseKind::ElseClause)
            .map(|clause| self.clause_body(clause))
            .unwrap_or_default()
    }

    fn build_case_element(&mut self, node: &ParseNode) -> CaseElement {
        let mut selectors = vec![];
        let mut body = vec![];
        for child in node.nodes() {
            match child.kind {
                ParseKind::Body => body = self.build_body(child),
                // A range selector contributes both of its endpoints.
                ParseKind::Range => {
                    for bound in child.nodes() {
                        selectors.push(self.build_expr(bound));
                    }
                }
                _ => selectors.push(self.build_expr(child)),
            }
        }
        CaseElement { selectors, body }
    }

    /// Builds the node child at the index as an expression, or an empty
    /// expression at the parent's span when the child is missing.
    fn child_expr(&mut self, node: &ParseNode, index: usize) -> ExprKind {
        match node.node(index) {
            Some(child) => self.build_expr(child),
            None => ExprKind::Empty(EmptyExpr {
                id: self.next_id(),
                span: node.span.clone(),
            }),
        }
    }

    fn build_expr(&mut self, node: &ParseNode) -> ExprKind {
        let span = node.span.clone();
        match node.kind {
            ParseKind::Binary => {
                let op = match node.token(0).map(|token| token.token_type) {
                    Some(TokenType::Plus) => BinaryOp::Add,
                    Some(TokenType::Minus) => BinaryOp::Sub,
                    Some(TokenType::Star) => BinaryOp::Mul,
                    Some(TokenType::Slash) => BinaryOp::Div,
                    Some(TokenType::Mod) => BinaryOp::Mod,
                    Some(TokenType::Equal) => BinaryOp::Eq,
                    Some(TokenType::NotEqual) => BinaryOp::Ne,
                    Some(TokenType::Less) => BinaryOp::Lt,
                    Some(TokenType::LessEqual) => BinaryOp::Le,
                    Some(TokenType::Greater) => BinaryOp::Gt,
                    Some(TokenType::GreaterEqual) => BinaryOp::Ge,
                    Some(TokenType::And) | Some(TokenType::Ampersand) => BinaryOp::And,
                    Some(TokenType::Or) => BinaryOp::Or,
                    Some(TokenType::Xor) => BinaryOp::Xor,
                    // The grammar produces no other operator; Add stands in
                    // for an unknown one rather than dropping the operands.
                    _ => BinaryOp::Add,
                };
                let id = self.next_id();
                let left = self.child_expr(node, 0);
                let right = self.child_expr(node, 1);
                ExprKind::Binary(Box::new(BinaryExpr {
                    id,
                    op,
                    left,
                    right,
                    span,
                }))
            }
            ParseKind::Unary => {
                let op = match node.token(0).map(|token| token.token_type) {
                    Some(TokenType::Not) => UnaryOp::Not,
                    Some(TokenType::Minus) => UnaryOp::Neg,
                    // Unary plus changes nothing; build the operand directly.
                    Some(TokenType::Plus) => return self.child_expr(node, 0),
                    _ => {
                        return ExprKind::Empty(EmptyExpr {
                            id: self.next_id(),
                            span,
                        })
                    }
                };
                let id = self.next_id();
                let operand = self.child_expr(node, 0);
                ExprKind::Unary(Box::new(UnaryExpr {
                    id,
                    op,
                    operand,
                    span,
                }))
            }
            ParseKind::Paren => self.child_expr(node, 0),
            ParseKind::Literal => self.build_literal(node),
            ParseKind::Variable => ExprKind::Variable(Box::new(self.build_variable(node))),
            ParseKind::Call => ExprKind::Call(Box::new(self.build_call(node))),
            _ => ExprKind::Empty(EmptyExpr {
                id: self.next_id(),
                span,
            }),
        }
    }

    fn build_literal(&mut self, node: &ParseNode) -> ExprKind {
        let span = node.span.clone();
        let id = self.next_id();
        match node.token(0) {
            Some(token) => {
                let kind = match token.token_type {
                    TokenType::IntegerLiteral | TokenType::BasedLiteral => LiteralKind::Integer,
                    TokenType::RealLiteral => LiteralKind::Real,
                    TokenType::TypedLiteral => typed_literal_kind(&token.text),
                    TokenType::TimeLiteral => LiteralKind::Time,
                    TokenType::StringLiteral => LiteralKind::String,
                    TokenType::WStringLiteral => LiteralKind::WString,
                    TokenType::True | TokenType::False => LiteralKind::Bool,
                    _ => return ExprKind::Empty(EmptyExpr { id, span }),
                };
                ExprKind::Literal(Literal {
                    id,
                    kind,
                    text: token.text.clone(),
                    span,
                })
            }
            None => ExprKind::Empty(EmptyExpr { id, span }),
        }
    }

    fn build_variable(&mut self, node: &ParseNode) -> VariableRef {
        if node.kind != ParseKind::Variable {
            return self.empty_variable(node);
        }
        let id = self.next_id();
        let base = node.token(0).map(id_from).unwrap_or_else(|| Id::from(""));
        let fields = node
            .nodes_of(ParseKind::FieldAccess)
            .filter_map(|field| field.token(0))
            .map(id_from)
            .collect();
        let mut subscripts = vec![];
        for subscript in node.nodes_of(ParseKind::Subscript) {
            for index in subscript.nodes() {
                subscripts.push(self.build_expr(index));
            }
        }
        VariableRef {
            id,
            base,
            fields,
            subscripts,
            span: node.span.clone(),
        }
    }

    fn empty_variable(&mut self, node: &ParseNode) -> VariableRef {
        VariableRef {
            id: self.next_id(),
            base: Id::from(""),
            fields: vec![],
            subscripts: vec![],
            span: node.span.clone(),
        }
    }

    fn build_call(&mut self, node: &ParseNode) -> FunctionCall {
        if node.kind != ParseKind::Call {
            return self.empty_call(node);
        }
        let id = self.next_id();
        // A dotted callee such as `fbAxis.Reset(..)` resolves by its base
        // name, which is the first token.
        let name = node.token(0).map(id_from).unwrap_or_else(|| Id::from(""));
        let args = node
            .nodes_of(ParseKind::Arg)
            .map(|arg| CallArg {
                name: arg
                    .token(0)
                    .filter(|token| token.token_type == TokenType::Identifier)
                    .map(id_from),
                value: self.child_expr(arg, 0),
            })
            .collect();
        FunctionCall {
            id,
            name,
            args,
            span: node.span.clone(),
        }
    }

    fn empty_call(&mut self, node: &ParseNode) -> FunctionCall {
        FunctionCall {
            id: self.next_id(),
            name: Id::from(""),
            args: vec![],
            span: node.span.clone(),
        }
    }
}

fn id_from(token: &Token) -> Id {
    Id::from(&token.text).with_span(token.span.clone())
}

fn build_array_range(node: &ParseNode) -> Option<ArrayRange> {
    let lower = const_int_value(node.node(0)?)?;
    let upper = const_int_value(node.node(1)?)?;
    Some(ArrayRange { lower, upper })
}

/// Evaluates a parse tree node as a constant integer, if it is one.
fn const_int_value(node: &ParseNode) -> Option<i64> {
    match node.kind {
        ParseKind::Literal => int_token_value(node.token(0)?),
        ParseKind::Unary => {
            let value = const_int_value(node.node(0)?)?;
            match node.token(0)?.token_type {
                TokenType::Minus => Some(-value),
                TokenType::Plus => Some(value),
                _ => None,
            }
        }
        ParseKind::Paren => const_int_value(node.node(0)?),
        _ => None,
    }
}

fn int_token_value(token: &Token) -> Option<i64> {
    match token.token_type {
        TokenType::IntegerLiteral => parse_digits(&token.text),
        TokenType::BasedLiteral => based_value(&token.text),
        TokenType::TypedLiteral => {
            let (_, rest) = token.text.split_once('#')?;
            if rest.contains('#') {
                based_value(rest)
            } else {
                parse_digits(rest)
            }
        }
        _ => None,
    }
}

fn parse_digits(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    digits.parse().ok()
}

fn based_value(text: &str) -> Option<i64> {
    let (radix, digits) = text.split_once('#')?;
    let radix: u32 = radix.parse().ok()?;
    if !(2..=36).contains(&radix) {
        return None;
    }
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    i64::from_str_radix(&digits, radix).ok()
}

/// The literal kind of a typed literal such as `INT#5`, from its prefix.
fn typed_literal_kind(text: &str) -> LiteralKind {
    let prefix = text.split('#').next().unwrap_or("").to_lowercase();
    match prefix.as_str() {
        "real" | "lreal" => LiteralKind::Real,
        "bool" => LiteralKind::Bool,
        _ => LiteralKind::Integer,
    }
}
