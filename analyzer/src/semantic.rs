//! Semantic analysis over the syntax tree of one file.
//!
//! A single traversal: declarations populate the symbol table, statements
//! and expressions resolve references and infer types, and diagnostics
//! accumulate in traversal order. Inferred types are recorded in a side
//! table keyed by expression identity; the tree itself is never changed.
//!
//! Analysis is per file. Names declared in other files (function blocks,
//! functions, global lists) are not visible here, so an unresolved callee
//! is not a problem while an unresolved variable reference is.

use std::collections::HashMap;

use log::debug;
use plcheck_dsl::common::*;
use plcheck_dsl::core::{Id, Located, SourceSpan};
use plcheck_dsl::diagnostic::{Diagnostic, Label};
use plcheck_dsl::textual::*;
use plcheck_problems::Problem;

use crate::symbol_table::{Symbol, SymbolKind, SymbolTable};
use crate::type_rules;

/// The outcome of analyzing one file's root nodes.
#[derive(Debug)]
pub struct Analysis {
    /// Semantic problems in traversal order.
    pub diagnostics: Vec<Diagnostic>,
    /// Inferred type per expression.
    pub inferred_types: HashMap<ExprId, Id>,
    /// Every symbol declared during the run, in scope-exit order.
    pub symbols: Vec<Symbol>,
}

/// Analyzes the root nodes of one file.
pub fn analyze(nodes: &[Node]) -> Analysis {
    debug!("Analyzing {} declarations", nodes.len());
    let mut analyzer = SemanticAnalyzer {
        table: SymbolTable::new(),
        diagnostics: vec![],
        types: HashMap::new(),
        retired: vec![],
    };
    analyzer.analyze_nodes(nodes);
    analyzer.finish()
}

struct SemanticAnalyzer {
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    types: HashMap<ExprId, Id>,
    retired: Vec<Symbol>,
}

impl SemanticAnalyzer {
    fn analyze_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Program(program) => {
                    self.analyze_pou(&program.name, None, &program.var_blocks, &program.body)
                }
                Node::FunctionBlock(fb) => {
                    self.analyze_pou(&fb.name, None, &fb.var_blocks, &fb.body)
                }
                Node::Function(function) => self.analyze_pou(
                    &function.name,
                    Some(&function.return_type),
                    &function.var_blocks,
                    &function.body,
                ),
                Node::VarBlock(block) => self.declare_block(block),
                Node::DataType(decl) => self.check_data_type(decl),
                Node::Empty(_) => {}
            }
        }
    }

    /// Remaining live scopes get the same unused check the popped scopes
    /// got, then everything still declared is retired.
    fn finish(mut self) -> Analysis {
        let remaining: Vec<Symbol> = self.table.symbols().cloned().collect();
        for symbol in &remaining {
            self.check_unused(symbol);
        }
        self.retired.extend(remaining);
        Analysis {
            diagnostics: self.diagnostics,
            inferred_types: self.types,
            symbols: self.retired,
        }
    }

    fn analyze_pou(
        &mut self,
        name: &Id,
        return_type: Option<&TypeSpec>,
        var_blocks: &[VarBlock],
        body: &[StmtKind],
    ) {
        debug!("Analyzing program unit {}", name);
        self.table.enter_scope(name);
        if let Some(return_type) = return_type {
            // The function name doubles as its implicit return variable.
            self.table.declare(Symbol::new(
                name.clone(),
                return_type.clone(),
                SymbolKind::ReturnValue,
            ));
        }
        for block in var_blocks {
            self.declare_block(block);
        }
        self.analyze_body(body);
        let popped = self.table.exit_scope();
        for symbol in &popped {
            self.check_unused(symbol);
        }
        self.retired.extend(popped);
    }

    fn check_unused(&mut self, symbol: &Symbol) {
        if symbol.used || symbol.kind.is_interface() {
            return;
        }
        self.diagnostics.push(
            Diagnostic::problem(
                Problem::UnusedVariable,
                Label::span(
                    symbol.name.span.clone(),
                    format!("Variable '{}' is never used", symbol.name),
                ),
            )
            .with_offending_symbol(&symbol.name.original),
        );
    }

    fn declare_block(&mut self, block: &VarBlock) {
        let kind = match block.kind {
            VarBlockKind::Input => SymbolKind::Input,
            VarBlockKind::Output => SymbolKind::Output,
            VarBlockKind::InOut => SymbolKind::InOut,
            VarBlockKind::Local => SymbolKind::Local,
            VarBlockKind::Global => SymbolKind::Global,
            VarBlockKind::Constant => SymbolKind::Constant,
        };
        for decl in &block.decls {
            self.declare_variable(decl, kind);
        }
    }

    fn declare_variable(&mut self, decl: &VarDecl, kind: SymbolKind) {
        let declared = Symbol::new(decl.name.clone(), decl.type_spec.clone(), kind);
        if !self.table.declare(declared) {
            let first_span = self
                .table
                .lookup(&decl.name)
                .map(|symbol| symbol.name.span.clone());
            let mut diagnostic = Diagnostic::problem(
                Problem::DuplicateDeclaration,
                Label::span(
                    decl.name.span.clone(),
                    format!("Variable '{}' is already declared in this scope", decl.name),
                ),
            )
            .with_offending_symbol(&decl.name.original);
            if let Some(first_span) = first_span {
                diagnostic = diagnostic.with_secondary(Label::span(
                    first_span,
                    "First declaration is here",
                ));
            }
            self.diagnostics.push(diagnostic);
        }
        // The initializer counts even when the declaration itself was
        // rejected as a duplicate.
        if let Some(initializer) = &decl.initializer {
            let source = self.infer_expr(initializer);
            self.table.mark_initialized(&decl.name);
            let target = decl.type_spec.type_name();
            if !type_rules::are_compatible(&target, &source) {
                self.report_type_mismatch(initializer.span(), &target, &source);
            }
        }
    }

    fn analyze_body(&mut self, body: &[StmtKind]) {
        let mut terminated = false;
        let mut reported = false;
        for stmt in body {
            if terminated && !reported && !matches!(stmt, StmtKind::Empty(_)) {
                self.diagnostics.push(Diagnostic::problem(
                    Problem::UnreachableCode,
                    Label::span(stmt.span(), "Statement follows RETURN or EXIT"),
                ));
                reported = true;
            }
            self.analyze_stmt(stmt);
            if matches!(stmt, StmtKind::Exit(_) | StmtKind::Return(_)) {
                terminated = true;
            }
        }
    }

    fn analyze_stmt(&mut self, stmt: &StmtKind) {
        match stmt {
            StmtKind::Assignment(assignment) => {
                let target = self.infer_variable(&assignment.target);
                let value = self.infer_expr(&assignment.value);
                if !type_rules::are_compatible(&target, &value) {
                    self.report_type_mismatch(assignment.value.span(), &target, &value);
                }
                self.table.mark_initialized(&assignment.target.base);
            }
            StmtKind::FbCall(fb_call) => {
                let inferred = self.call_type(&fb_call.call);
                self.types.insert(fb_call.call.id, inferred);
            }
            StmtKind::If(if_stmt) => {
                self.check_condition(&if_stmt.cond);
                self.analyze_body(&if_stmt.body);
                for else_if in &if_stmt.else_ifs {
                    self.check_condition(&else_if.cond);
                    self.analyze_body(&else_if.body);
                }
                self.analyze_body(&if_stmt.else_body);
            }
            StmtKind::Case(case) => {
                self.infer_expr(&case.selector);
                for element in &case.elements {
                    for selector in &element.selectors {
                        self.infer_expr(selector);
                    }
                    self.analyze_body(&element.body);
                }
                self.analyze_body(&case.else_body);
            }
            StmtKind::For(for_stmt) => {
                // The control variable is declared implicitly; a clash with
                // an existing name is allowed and reuses that symbol.
                self.table.declare(Symbol::new(
                    for_stmt.control.clone(),
                    TypeSpec::simple("INT"),
                    SymbolKind::ControlVariable,
                ));
                self.table.mark_initialized(&for_stmt.control);
                self.table.mark_used(&for_stmt.control);
                self.infer_expr(&for_stmt.from);
                self.infer_expr(&for_stmt.to);
                if let Some(by) = &for_stmt.by {
                    self.infer_expr(by);
                }
                self.analyze_body(&for_stmt.body);
            }
            StmtKind::While(while_stmt) => {
                self.check_condition(&while_stmt.cond);
                self.analyze_body(&while_stmt.body);
            }
            StmtKind::Repeat(repeat) => {
                self.analyze_body(&repeat.body);
                self.check_condition(&repeat.until);
            }
            StmtKind::Exit(_) | StmtKind::Return(_) | StmtKind::Empty(_) => {}
        }
    }

    /// Conditions must be BOOL. Unknown passes so that an undeclared
    /// variable in a condition is reported once, not twice.
    fn check_condition(&mut self, cond: &ExprKind) {
        let inferred = self.infer_expr(cond);
        if type_rules::is_unknown(&inferred) || inferred == type_rules::bool_type() {
            return;
        }
        self.report_type_mismatch(cond.span(), &type_rules::bool_type(), &inferred);
    }

    fn infer_expr(&mut self, expr: &ExprKind) -> Id {
        let inferred = match expr {
            ExprKind::Binary(binary) => {
                let left = self.infer_expr(&binary.left);
                let right = self.infer_expr(&binary.right);
                if binary.op.is_comparison() || binary.op.is_logical() {
                    type_rules::bool_type()
                } else {
                    type_rules::arithmetic_result(&left, &right)
                }
            }
            ExprKind::Unary(unary) => {
                let operand = self.infer_expr(&unary.operand);
                match unary.op {
                    UnaryOp::Not => type_rules::bool_type(),
                    UnaryOp::Neg => operand,
                }
            }
            ExprKind::Literal(literal) => literal_type(literal),
            ExprKind::Variable(variable) => return self.infer_variable(variable),
            ExprKind::Call(call) => self.call_type(call),
            ExprKind::Empty(_) => type_rules::unknown_type(),
        };
        self.types.insert(expr.id(), inferred.clone());
        inferred
    }

    /// Resolves a variable reference, marks the symbol used, and records
    /// the reference's inferred type.
    fn infer_variable(&mut self, variable: &VariableRef) -> Id {
        for subscript in &variable.subscripts {
            self.infer_expr(subscript);
        }
        let declared = self
            .table
            .lookup(&variable.base)
            .map(|symbol| symbol.declared_type.clone());
        let inferred = match declared {
            Some(declared) => {
                self.table.mark_used(&variable.base);
                infer_access(variable, &declared)
            }
            None => {
                self.diagnostics.push(
                    Diagnostic::problem(
                        Problem::UndeclaredVariable,
                        Label::span(
                            variable.base.span.clone(),
                            format!("Variable '{}' is not declared", variable.base),
                        ),
                    )
                    .with_offending_symbol(&variable.base.original),
                );
                type_rules::unknown_type()
            }
        };
        self.types.insert(variable.id, inferred.clone());
        inferred
    }

    /// A call produces a value of unknown type. The callee usually lives
    /// in another file, so an unresolved callee is not a problem; a
    /// resolved one (a local instance) is marked used.
    fn call_type(&mut self, call: &FunctionCall) -> Id {
        if self.table.lookup(&call.name).is_some() {
            self.table.mark_used(&call.name);
        }
        let mut seen: Vec<&Id> = vec![];
        for arg in &call.args {
            if let Some(name) = &arg.name {
                if seen.contains(&name) {
                    self.diagnostics.push(
                        Diagnostic::problem(
                            Problem::InvalidFunctionCall,
                            Label::span(
                                name.span.clone(),
                                format!("Argument '{}' is given more than once", name),
                            ),
                        )
                        .with_offending_symbol(&name.original),
                    );
                } else {
                    seen.push(name);
                }
            }
            self.infer_expr(&arg.value);
        }
        type_rules::unknown_type()
    }

    fn check_data_type(&mut self, decl: &DataTypeDecl) {
        match &decl.definition {
            TypeDefinition::Struct(struct_type) => {
                let mut seen: Vec<Id> = vec![];
                for field in &struct_type.fields {
                    match seen.iter().find(|existing| **existing == field.name).cloned() {
                        Some(first) => self.report_duplicate_member(&field.name, &first),
                        None => seen.push(field.name.clone()),
                    }
                    if let Some(initializer) = &field.initializer {
                        let source = self.infer_expr(initializer);
                        let target = field.type_spec.type_name();
                        if !type_rules::are_compatible(&target, &source) {
                            self.report_type_mismatch(initializer.span(), &target, &source);
                        }
                    }
                }
            }
            TypeDefinition::Enum(enum_type) => {
                let mut seen: Vec<Id> = vec![];
                for value in &enum_type.values {
                    match seen.iter().find(|existing| **existing == value.name).cloned() {
                        Some(first) => self.report_duplicate_member(&value.name, &first),
                        None => seen.push(value.name.clone()),
                    }
                }
            }
            TypeDefinition::Alias(_) | TypeDefinition::Empty(_) => {}
        }
    }

    fn report_duplicate_member(&mut self, name: &Id, first: &Id) {
        self.diagnostics.push(
            Diagnostic::problem(
                Problem::DuplicateDeclaration,
                Label::span(
                    name.span.clone(),
                    format!("Name '{}' is already declared in this type", name),
                ),
            )
            .with_secondary(Label::span(first.span.clone(), "First declaration is here"))
            .with_offending_symbol(&name.original),
        );
    }

    fn report_type_mismatch(&mut self, span: SourceSpan, target: &Id, source: &Id) {
        self.diagnostics.push(Diagnostic::problem(
            Problem::TypeMismatch,
            Label::span(
                span,
                format!("Expected type '{}' but found '{}'", target, source),
            ),
        ));
    }
}

/// Inferred type of a resolved reference. Member types are not resolved
/// across files, so a field access is Unknown; subscripting an array
/// strips the array part and yields the element type.
fn infer_access(variable: &VariableRef, declared: &TypeSpec) -> Id {
    if !variable.fields.is_empty() {
        return type_rules::unknown_type();
    }
    if !variable.subscripts.is_empty() && declared.is_array {
        let element = TypeSpec {
            is_array: false,
            array_ranges: vec![],
            ..declared.clone()
        };
        return element.type_name();
    }
    declared.type_name()
}

fn literal_type(literal: &Literal) -> Id {
    if let Some(prefix) = type_rules::typed_literal_prefix(&literal.text) {
        return prefix;
    }
    match literal.kind {
        LiteralKind::Integer => type_rules::int_type(),
        LiteralKind::Real => Id::from("REAL"),
        LiteralKind::String => Id::from("STRING"),
        LiteralKind::WString => Id::from("WSTRING"),
        LiteralKind::Bool => type_rules::bool_type(),
        LiteralKind::Time => Id::from("TIME"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plcheck_dsl::core::FileId;
    use plcheck_parser::parse_program;
    use rstest::rstest;

    fn analyzed(source: &str) -> (Vec<Node>, Analysis) {
        let parsed = parse_program(source, &FileId::default());
        assert!(
            parsed.diagnostics.is_empty(),
            "parse problems: {:?}",
            parsed.diagnostics
        );
        let analysis = analyze(&parsed.nodes);
        (parsed.nodes, analysis)
    }

    fn codes(analysis: &Analysis) -> Vec<&str> {
        analysis
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.code.as_str())
            .collect()
    }

    fn find_symbol<'a>(analysis: &'a Analysis, name: &str) -> &'a Symbol {
        analysis
            .symbols
            .iter()
            .find(|symbol| symbol.name == Id::from(name))
            .expect("symbol should have been declared")
    }

    #[test]
    fn analyze_when_well_formed_program_then_no_diagnostics() {
        let (nodes, analysis) =
            analyzed("PROGRAM P VAR x : INT; END_VAR x := x + 1; END_PROGRAM");
        assert_eq!(nodes.len(), 1);
        assert!(analysis.diagnostics.is_empty());
        let x = find_symbol(&analysis, "x");
        assert!(x.initialized);
        assert!(x.used);
    }

    #[test]
    fn analyze_when_undeclared_reference_then_single_problem_and_unknown() {
        let (nodes, analysis) =
            analyzed("PROGRAM P\nVAR y : INT; END_VAR\ny := z;\nEND_PROGRAM");
        assert_eq!(codes(&analysis), vec!["P2001"]);
        assert_eq!(analysis.diagnostics[0].line(), 3);
        assert_eq!(
            analysis.diagnostics[0].offending_symbol.as_deref(),
            Some("z")
        );
        let program = match &nodes[0] {
            Node::Program(program) => program,
            other => panic!("expected program, got {:?}", other),
        };
        let value_id = match &program.body[0] {
            StmtKind::Assignment(assignment) => assignment.value.id(),
            other => panic!("expected assignment, got {:?}", other),
        };
        assert_eq!(
            analysis.inferred_types.get(&value_id),
            Some(&type_rules::unknown_type())
        );
    }

    #[test]
    fn analyze_when_duplicate_declaration_then_first_wins() {
        let (_, analysis) =
            analyzed("PROGRAM P VAR a : INT; a : BOOL; END_VAR a := 1; END_PROGRAM");
        assert_eq!(codes(&analysis), vec!["P2002"]);
        assert!(!analysis.diagnostics[0].secondary.is_empty());
        let a = find_symbol(&analysis, "a");
        assert_eq!(a.type_name(), Id::from("INT"));
        assert_eq!(
            analysis
                .symbols
                .iter()
                .filter(|symbol| symbol.name == Id::from("a"))
                .count(),
            1
        );
    }

    #[test]
    fn analyze_when_local_shadows_global_then_local_resolves() {
        let (_, analysis) = analyzed(
            "VAR_GLOBAL x : BOOL; END_VAR
             PROGRAM P VAR x : INT; END_VAR x := 1; END_PROGRAM",
        );
        // The local INT x accepts the assignment; only the global x goes
        // unused.
        assert_eq!(codes(&analysis), vec!["P2005"]);
        let unused = &analysis.diagnostics[0];
        assert_eq!(unused.line(), 1);
    }

    #[test]
    fn analyze_when_global_referenced_in_unit_then_resolves_through_chain() {
        let (_, analysis) = analyzed(
            "VAR_GLOBAL g : INT; END_VAR
             PROGRAM P g := 2; END_PROGRAM",
        );
        assert!(analysis.diagnostics.is_empty());
        assert!(find_symbol(&analysis, "g").used);
    }

    #[rstest]
    #[case("IF n THEN x := 1; END_IF")]
    #[case("WHILE n DO x := 1; END_WHILE")]
    #[case("REPEAT x := 1; UNTIL n END_REPEAT")]
    fn analyze_when_condition_not_bool_then_type_mismatch(#[case] body: &str) {
        let source = format!(
            "PROGRAM P VAR n : INT; x : INT; END_VAR {} END_PROGRAM",
            body
        );
        let (_, analysis) = analyzed(&source);
        assert_eq!(codes(&analysis), vec!["P2003"]);
    }

    #[test]
    fn analyze_when_condition_bool_then_accepted() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR b : BOOL; x : INT; END_VAR
             IF b AND NOT b THEN x := 1; END_IF
             END_PROGRAM",
        );
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn analyze_when_condition_undeclared_then_no_extra_mismatch() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR x : INT; END_VAR
             IF zMissing THEN x := 1; END_IF
             END_PROGRAM",
        );
        assert_eq!(codes(&analysis), vec!["P2001"]);
    }

    #[test]
    fn analyze_when_for_statement_then_control_variable_implicit() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR n : INT; END_VAR
             FOR i := 0 TO 10 BY 2 DO n := i; END_FOR
             END_PROGRAM",
        );
        assert!(analysis.diagnostics.is_empty());
        let control = find_symbol(&analysis, "i");
        assert_eq!(control.kind, SymbolKind::ControlVariable);
        assert_eq!(control.type_name(), Id::from("INT"));
        assert!(control.initialized);
        assert!(control.used);
    }

    #[rstest]
    #[case("s : STRING", "s := 5;", vec!["P2003"])]
    #[case("r : REAL", "r := 5;", vec![])]
    #[case("d : DINT", "d := DINT#5;", vec![])]
    fn analyze_when_assignment_then_compatibility_checked(
        #[case] decl: &str,
        #[case] stmt: &str,
        #[case] expected: Vec<&str>,
    ) {
        let source = format!("PROGRAM P VAR {}; END_VAR {} END_PROGRAM", decl, stmt);
        let (_, analysis) = analyzed(&source);
        assert_eq!(codes(&analysis), expected);
    }

    #[test]
    fn analyze_when_initializer_incompatible_then_type_mismatch() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR s : STRING := 5; END_VAR s := 'ok'; END_PROGRAM",
        );
        assert_eq!(codes(&analysis), vec!["P2003"]);
        assert!(find_symbol(&analysis, "s").initialized);
    }

    #[test]
    fn analyze_when_local_never_read_then_unused_reported() {
        let (_, analysis) = analyzed("PROGRAM P VAR nIdle : INT; END_VAR END_PROGRAM");
        assert_eq!(codes(&analysis), vec!["P2005"]);
        assert_eq!(
            analysis.diagnostics[0].offending_symbol.as_deref(),
            Some("nIdle")
        );
    }

    #[test]
    fn analyze_when_interface_variable_unused_then_exempt() {
        let (_, analysis) = analyzed(
            "FUNCTION_BLOCK FB_Valve
             VAR_INPUT bOpen : BOOL; END_VAR
             VAR_OUTPUT bMoving : BOOL; END_VAR
             VAR nInternal : INT; END_VAR
             END_FUNCTION_BLOCK",
        );
        assert_eq!(codes(&analysis), vec!["P2005"]);
        assert_eq!(
            analysis.diagnostics[0].offending_symbol.as_deref(),
            Some("nInternal")
        );
    }

    #[test]
    fn analyze_when_function_return_assigned_then_no_diagnostics() {
        let (_, analysis) = analyzed(
            "FUNCTION F_Add : INT
             VAR_INPUT a : INT; b : INT; END_VAR
             F_Add := a + b;
             END_FUNCTION",
        );
        assert!(analysis.diagnostics.is_empty());
        let result = find_symbol(&analysis, "F_Add");
        assert_eq!(result.kind, SymbolKind::ReturnValue);
        assert_eq!(result.type_name(), Id::from("INT"));
    }

    #[test]
    fn analyze_when_function_return_never_set_then_unused_reported() {
        let (_, analysis) = analyzed(
            "FUNCTION F_Noop : INT
             VAR_INPUT a : INT; END_VAR
             END_FUNCTION",
        );
        assert_eq!(codes(&analysis), vec!["P2005"]);
        assert_eq!(
            analysis.diagnostics[0].offending_symbol.as_deref(),
            Some("F_Noop")
        );
    }

    #[test]
    fn analyze_when_named_argument_repeated_then_invalid_call() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR fbTimer : TON; bRun : BOOL; END_VAR
             fbTimer(IN := bRun, IN := TRUE);
             END_PROGRAM",
        );
        assert_eq!(codes(&analysis), vec!["P2006"]);
        assert!(find_symbol(&analysis, "fbTimer").used);
    }

    #[test]
    fn analyze_when_callee_not_declared_then_no_problem() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR x : INT; y : INT; END_VAR
             x := F_Scale(y) + 1;
             END_PROGRAM",
        );
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn analyze_when_statement_after_return_then_unreachable_once() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR x : INT; END_VAR
             RETURN;
             x := 1;
             x := 2;
             END_PROGRAM",
        );
        assert_eq!(codes(&analysis), vec!["P2007"]);
        assert_eq!(analysis.diagnostics[0].line(), 3);
    }

    #[test]
    fn analyze_when_exit_inside_loop_then_following_statement_unreachable() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR n : INT; END_VAR
             WHILE TRUE DO
                 EXIT;
                 n := 1;
             END_WHILE
             END_PROGRAM",
        );
        assert_eq!(codes(&analysis), vec!["P2007"]);
    }

    #[test]
    fn analyze_when_enum_value_repeated_then_duplicate_with_secondary() {
        let (_, analysis) = analyzed("TYPE E_Mode : (Auto, Manual, Auto); END_TYPE");
        assert_eq!(codes(&analysis), vec!["P2002"]);
        assert!(!analysis.diagnostics[0].secondary.is_empty());
        assert_eq!(
            analysis.diagnostics[0].offending_symbol.as_deref(),
            Some("Auto")
        );
    }

    #[test]
    fn analyze_when_struct_fields_then_dup_and_initializer_checked() {
        let (_, analysis) = analyzed(
            "TYPE ST_Point :
             STRUCT
                 x : INT;
                 x : BOOL;
                 s : STRING := 5;
             END_STRUCT
             END_TYPE",
        );
        assert_eq!(codes(&analysis), vec!["P2002", "P2003"]);
    }

    #[test]
    fn analyze_when_binary_expressions_then_types_inferred() {
        let (nodes, analysis) = analyzed(
            "PROGRAM P VAR r : REAL; b : BOOL; END_VAR
             r := 1.5 + 2;
             b := 1 < 2;
             END_PROGRAM",
        );
        assert!(analysis.diagnostics.is_empty());
        let program = match &nodes[0] {
            Node::Program(program) => program,
            other => panic!("expected program, got {:?}", other),
        };
        let value_ids: Vec<ExprId> = program
            .body
            .iter()
            .map(|stmt| match stmt {
                StmtKind::Assignment(assignment) => assignment.value.id(),
                other => panic!("expected assignment, got {:?}", other),
            })
            .collect();
        assert_eq!(
            analysis.inferred_types.get(&value_ids[0]),
            Some(&Id::from("REAL"))
        );
        assert_eq!(
            analysis.inferred_types.get(&value_ids[1]),
            Some(&Id::from("BOOL"))
        );
    }

    #[test]
    fn analyze_when_member_access_then_unknown_without_cascade() {
        let (_, analysis) = analyzed(
            "PROGRAM P VAR axis : ST_Axis; n : INT; END_VAR
             n := axis.nPosition;
             END_PROGRAM",
        );
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn analyze_when_array_element_then_element_type() {
        let (nodes, analysis) = analyzed(
            "PROGRAM P VAR a : ARRAY [0..9] OF INT; n : INT; END_VAR
             n := a[3];
             END_PROGRAM",
        );
        assert!(analysis.diagnostics.is_empty());
        let program = match &nodes[0] {
            Node::Program(program) => program,
            other => panic!("expected program, got {:?}", other),
        };
        let value_id = match &program.body[0] {
            StmtKind::Assignment(assignment) => assignment.value.id(),
            other => panic!("expected assignment, got {:?}", other),
        };
        assert_eq!(
            analysis.inferred_types.get(&value_id),
            Some(&Id::from("INT"))
        );
    }

    #[test]
    fn analyze_when_repeated_then_identical_diagnostics() {
        let source = "PROGRAM P VAR a : INT; a : BOOL; END_VAR
             b := z;
             END_PROGRAM";
        let (_, first) = analyzed(source);
        let (_, second) = analyzed(source);
        assert_eq!(
            format!("{:?}", first.diagnostics),
            format!("{:?}", second.diagnostics)
        );
        assert!(first.diagnostics.len() >= 3);
    }
}
