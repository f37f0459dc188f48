//! Cyclomatic complexity of program organization units.
//!
//! Complexity starts at one and grows by one for every decision point:
//! each `IF` and `ELSIF`, each `CASE` element (the `ELSE` arm is not a
//! decision), and each loop. `EXIT` and `RETURN` are configurable because
//! teams disagree on whether early exits add paths worth counting.

use log::debug;
use plcheck_dsl::common::Node;
use plcheck_dsl::core::FileId;
use plcheck_dsl::diagnostic::{Diagnostic, Label};
use plcheck_dsl::textual::StmtKind;
use plcheck_problems::Problem;
use std::fmt;
use thiserror::Error;

/// Switches for the optional decision points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplexityOptions {
    /// Count each `EXIT` as a decision point.
    pub count_exits: bool,
    /// Count each `RETURN` as a decision point.
    pub count_returns: bool,
}

/// Computes the cyclomatic complexity of one declaration.
///
/// Declarations without a body (variable lists, type blocks) have the
/// minimum complexity of one.
pub fn cyclomatic_complexity(node: &Node, options: &ComplexityOptions) -> u32 {
    let body = match node {
        Node::Program(program) => &program.body,
        Node::FunctionBlock(fb) => &fb.body,
        Node::Function(function) => &function.body,
        _ => return 1,
    };
    let mut complexity = 1 + count_body(body, options);
    if options.count_returns && ends_with_return(body) {
        // A RETURN that ends the unit opens no extra path.
        complexity -= 1;
    }
    debug!("Complexity {}", complexity);
    complexity
}

fn count_body(body: &[StmtKind], options: &ComplexityOptions) -> u32 {
    body.iter().map(|stmt| count_stmt(stmt, options)).sum()
}

fn count_stmt(stmt: &StmtKind, options: &ComplexityOptions) -> u32 {
    match stmt {
        StmtKind::If(if_stmt) => {
            let mut count = 1 + if_stmt.else_ifs.len() as u32;
            count += count_body(&if_stmt.body, options);
            for else_if in &if_stmt.else_ifs {
                count += count_body(&else_if.body, options);
            }
            count + count_body(&if_stmt.else_body, options)
        }
        StmtKind::Case(case) => {
            let mut count = case.elements.len() as u32;
            for element in &case.elements {
                count += count_body(&element.body, options);
            }
            count + count_body(&case.else_body, options)
        }
        StmtKind::For(for_stmt) => 1 + count_body(&for_stmt.body, options),
        StmtKind::While(while_stmt) => 1 + count_body(&while_stmt.body, options),
        StmtKind::Repeat(repeat) => 1 + count_body(&repeat.body, options),
        StmtKind::Exit(_) => u32::from(options.count_exits),
        StmtKind::Return(_) => u32::from(options.count_returns),
        StmtKind::Assignment(_) | StmtKind::FbCall(_) | StmtKind::Empty(_) => 0,
    }
}

fn ends_with_return(body: &[StmtKind]) -> bool {
    body.iter()
        .rev()
        .find(|stmt| !matches!(stmt, StmtKind::Empty(_)))
        .map_or(false, |stmt| matches!(stmt, StmtKind::Return(_)))
}

/// How much a complexity value exceeds the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    None,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Severity::None => "none",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(text)
    }
}

/// Complexity levels at which a unit is worth flagging.
///
/// The fields stay private so that a value of this type is always
/// strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    medium: u32,
    high: u32,
    critical: u32,
}

impl Thresholds {
    /// Creates thresholds, rejecting any ordering that is not strictly
    /// increasing.
    pub fn new(medium: u32, high: u32, critical: u32) -> Result<Self, ThresholdError> {
        if medium < high && high < critical {
            Ok(Thresholds {
                medium,
                high,
                critical,
            })
        } else {
            Err(ThresholdError::NotIncreasing {
                medium,
                high,
                critical,
            })
        }
    }

    /// Classifies a complexity value against the thresholds.
    pub fn classify(&self, complexity: u32) -> Severity {
        if complexity >= self.critical {
            Severity::Critical
        } else if complexity >= self.high {
            Severity::High
        } else if complexity >= self.medium {
            Severity::Medium
        } else {
            Severity::None
        }
    }

    pub fn medium(&self) -> u32 {
        self.medium
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    pub fn critical(&self) -> u32 {
        self.critical
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            medium: 10,
            high: 15,
            critical: 20,
        }
    }
}

/// Rejected threshold configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("thresholds must increase: medium {medium} < high {high} < critical {critical} required")]
    NotIncreasing { medium: u32, high: u32, critical: u32 },
}

impl ThresholdError {
    /// Renders the error as a diagnostic attached to the file whose
    /// analysis was requested.
    pub fn diagnostic(&self, file_id: &FileId) -> Diagnostic {
        Diagnostic::problem(Problem::InvalidThresholds, Label::file(file_id, self.to_string()))
    }
}

/// A letter grade for a complexity value, on a fixed scale independent
/// of the configurable thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(text)
    }
}

/// Grades a complexity value.
pub fn grade(complexity: u32) -> Grade {
    match complexity {
        0..=5 => Grade::A,
        6..=10 => Grade::B,
        11..=20 => Grade::C,
        21..=30 => Grade::D,
        _ => Grade::F,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plcheck_parser::parse_program;
    use rstest::rstest;

    fn unit(source: &str) -> Node {
        let parsed = parse_program(source, &FileId::default());
        assert!(
            parsed.diagnostics.is_empty(),
            "parse problems: {:?}",
            parsed.diagnostics
        );
        parsed.nodes.into_iter().next().expect("one declaration")
    }

    fn complexity_of(source: &str) -> u32 {
        cyclomatic_complexity(&unit(source), &ComplexityOptions::default())
    }

    #[test]
    fn cyclomatic_complexity_when_straight_line_then_one() {
        assert_eq!(
            complexity_of("PROGRAM P VAR x : INT; END_VAR x := 1; x := 2; END_PROGRAM"),
            1
        );
    }

    #[test]
    fn cyclomatic_complexity_when_if_with_two_elsifs_then_four() {
        let source = "PROGRAM P VAR n : INT; x : INT; END_VAR
            IF n = 1 THEN x := 1;
            ELSIF n = 2 THEN x := 2;
            ELSIF n = 3 THEN x := 3;
            ELSE x := 4;
            END_IF
            END_PROGRAM";
        assert_eq!(complexity_of(source), 4);
    }

    #[test]
    fn cyclomatic_complexity_when_case_then_one_per_element() {
        let source = "PROGRAM P VAR n : INT; x : INT; END_VAR
            CASE n OF
                1: x := 1;
                2, 3: x := 2;
                4..6: x := 3;
            ELSE
                x := 0;
            END_CASE
            END_PROGRAM";
        assert_eq!(complexity_of(source), 4);
    }

    #[test]
    fn cyclomatic_complexity_when_nested_loops_then_each_counted() {
        let source = "PROGRAM P VAR n : INT; b : BOOL; END_VAR
            FOR i := 0 TO 10 DO
                WHILE b DO n := n + 1; END_WHILE
            END_FOR
            END_PROGRAM";
        assert_eq!(complexity_of(source), 3);
    }

    #[test]
    fn cyclomatic_complexity_when_tree_built_by_hand_then_counted() {
        use plcheck_dsl::common::ProgramDecl;
        use plcheck_dsl::core::{Id, SourceSpan};
        use plcheck_dsl::textual::{BinaryOp, ExprKind};

        let body = vec![
            StmtKind::if_then(
                ExprKind::binary(
                    BinaryOp::Lt,
                    ExprKind::named_variable("n"),
                    ExprKind::integer_literal("10"),
                ),
                vec![StmtKind::simple_assignment(
                    "x",
                    ExprKind::integer_literal("1"),
                )],
            ),
            StmtKind::if_then(
                ExprKind::bool_literal(true),
                vec![StmtKind::simple_assignment(
                    "x",
                    ExprKind::integer_literal("2"),
                )],
            ),
        ];
        let node = Node::Program(ProgramDecl {
            name: Id::from("P"),
            var_blocks: vec![],
            body,
            span: SourceSpan::default(),
        });
        assert_eq!(
            cyclomatic_complexity(&node, &ComplexityOptions::default()),
            3
        );
    }

    #[test]
    fn cyclomatic_complexity_when_exit_then_counted_only_on_request() {
        let source = "PROGRAM P VAR b : BOOL; END_VAR
            WHILE b DO EXIT; END_WHILE
            END_PROGRAM";
        let node = unit(source);
        assert_eq!(cyclomatic_complexity(&node, &ComplexityOptions::default()), 2);
        let options = ComplexityOptions {
            count_exits: true,
            ..ComplexityOptions::default()
        };
        assert_eq!(cyclomatic_complexity(&node, &options), 3);
    }

    #[test]
    fn cyclomatic_complexity_when_trailing_return_then_not_counted() {
        let source = "PROGRAM P VAR x : INT; END_VAR
            x := 1;
            RETURN;
            END_PROGRAM";
        let node = unit(source);
        let options = ComplexityOptions {
            count_returns: true,
            ..ComplexityOptions::default()
        };
        assert_eq!(cyclomatic_complexity(&node, &options), 1);
    }

    #[test]
    fn cyclomatic_complexity_when_early_return_then_counted() {
        let source = "PROGRAM P VAR b : BOOL; x : INT; END_VAR
            IF b THEN RETURN; END_IF
            x := 1;
            END_PROGRAM";
        let node = unit(source);
        let options = ComplexityOptions {
            count_returns: true,
            ..ComplexityOptions::default()
        };
        assert_eq!(cyclomatic_complexity(&node, &options), 3);
    }

    #[rstest]
    #[case(10, 15, 20, true)]
    #[case(1, 2, 3, true)]
    #[case(20, 15, 25, false)]
    #[case(10, 10, 20, false)]
    #[case(10, 15, 15, false)]
    fn thresholds_when_constructed_then_strictly_increasing_required(
        #[case] medium: u32,
        #[case] high: u32,
        #[case] critical: u32,
        #[case] accepted: bool,
    ) {
        assert_eq!(Thresholds::new(medium, high, critical).is_ok(), accepted);
    }

    #[test]
    fn threshold_error_when_rendered_then_invalid_thresholds_problem() {
        let error = Thresholds::new(20, 15, 25).unwrap_err();
        let diagnostic = error.diagnostic(&FileId::new("main.TcPOU"));
        assert_eq!(diagnostic.code, "P3001");
        assert_eq!(diagnostic.line(), 0);
    }

    #[rstest]
    #[case(9, Severity::None)]
    #[case(10, Severity::Medium)]
    #[case(14, Severity::Medium)]
    #[case(15, Severity::High)]
    #[case(19, Severity::High)]
    #[case(20, Severity::Critical)]
    #[case(99, Severity::Critical)]
    fn classify_when_default_thresholds_then_boundaries_inclusive(
        #[case] complexity: u32,
        #[case] expected: Severity,
    ) {
        assert_eq!(Thresholds::default().classify(complexity), expected);
    }

    #[rstest]
    #[case(1, Grade::A)]
    #[case(5, Grade::A)]
    #[case(6, Grade::B)]
    #[case(10, Grade::B)]
    #[case(11, Grade::C)]
    #[case(20, Grade::C)]
    #[case(21, Grade::D)]
    #[case(30, Grade::D)]
    #[case(31, Grade::F)]
    fn grade_when_scale_boundaries_then_expected_letter(
        #[case] complexity: u32,
        #[case] expected: Grade,
    ) {
        assert_eq!(grade(complexity), expected);
    }
}
