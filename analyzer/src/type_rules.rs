//! Type names and the compatibility rules between them.
//!
//! The model is deliberately permissive: exact case-insensitive name
//! equality, with every numeric type assignable to every other numeric type.
//! Precision loss is not modeled. The distinguished Unknown type is
//! compatible with everything so that one missing declaration produces one
//! problem instead of a cascade.

use phf::{phf_set, Set};
use plcheck_dsl::core::Id;

/// Name given to expressions whose type cannot be determined.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

static NUMERIC_TYPES_LOWER_CASE: Set<&'static str> = phf_set! {
    // signed_integer_type_name
    "sint",
    "int",
    "dint",
    "lint",
    // unsigned_integer_type_name
    "usint",
    "uint",
    "udint",
    "ulint",
    // real_type_name
    "real",
    "lreal",
};

static ELEMENTARY_TYPES_LOWER_CASE: Set<&'static str> = phf_set! {
    // signed_integer_type_name
    "sint",
    "int",
    "dint",
    "lint",
    // unsigned_integer_type_name
    "usint",
    "uint",
    "udint",
    "ulint",
    // real_type_name
    "real",
    "lreal",
    // date_type_name
    "date",
    "time_of_day",
    "tod",
    "date_and_time",
    "dt",
    // bit_string_type_name
    "bool",
    "byte",
    "word",
    "dword",
    "lword",
    // remaining elementary_type_name
    "string",
    "wstring",
    "time",
    "ltime",
};

pub fn unknown_type() -> Id {
    Id::from(UNKNOWN_TYPE)
}

pub fn is_unknown(type_name: &Id) -> bool {
    type_name.lower_case == "unknown"
}

pub fn is_numeric(type_name: &Id) -> bool {
    NUMERIC_TYPES_LOWER_CASE.contains(type_name.lower_case.as_str())
}

pub fn is_elementary(type_name: &Id) -> bool {
    ELEMENTARY_TYPES_LOWER_CASE.contains(type_name.lower_case.as_str())
}

pub fn bool_type() -> Id {
    Id::from("BOOL")
}

pub fn int_type() -> Id {
    Id::from("INT")
}

/// Whether a value of the source type may be assigned to a target of the
/// target type.
pub fn are_compatible(target: &Id, source: &Id) -> bool {
    if is_unknown(target) || is_unknown(source) {
        return true;
    }
    target == source || (is_numeric(target) && is_numeric(source))
}

/// Result type of an arithmetic operator: the wider of the operands by the
/// order LREAL > REAL > DINT, and INT for everything else.
pub fn arithmetic_result(left: &Id, right: &Id) -> Id {
    for (lower, name) in [("lreal", "LREAL"), ("real", "REAL"), ("dint", "DINT")] {
        if left.lower_case == lower || right.lower_case == lower {
            return Id::from(name);
        }
    }
    int_type()
}

/// The type a typed literal prefix names, when it names an elementary type.
/// `DINT#5` yields `DINT`; `16#FF` has a radix prefix and yields nothing.
pub fn typed_literal_prefix(text: &str) -> Option<Id> {
    let (prefix, _) = text.split_once('#')?;
    let id = Id::from(prefix);
    if is_elementary(&id) {
        Some(id)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("INT", "DINT", true)]
    #[case("int", "INT", true)]
    #[case("REAL", "usint", true)]
    #[case("BOOL", "INT", false)]
    #[case("STRING", "WSTRING", false)]
    #[case("ST_Axis", "ST_AXIS", true)]
    #[case("ST_Axis", "ST_Point", false)]
    fn are_compatible_when_pair_then_expected(
        #[case] target: &str,
        #[case] source: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            are_compatible(&Id::from(target), &Id::from(source)),
            expected
        );
    }

    #[test]
    fn are_compatible_when_unknown_then_always() {
        assert!(are_compatible(&unknown_type(), &Id::from("STRING")));
        assert!(are_compatible(&Id::from("BOOL"), &unknown_type()));
    }

    #[rstest]
    #[case("INT", "LREAL", "LREAL")]
    #[case("REAL", "INT", "REAL")]
    #[case("DINT", "INT", "DINT")]
    #[case("INT", "INT", "INT")]
    #[case("UINT", "USINT", "INT")]
    fn arithmetic_result_when_operands_then_widened(
        #[case] left: &str,
        #[case] right: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(
            arithmetic_result(&Id::from(left), &Id::from(right)),
            Id::from(expected)
        );
    }

    #[rstest]
    #[case("DINT#5", Some("DINT"))]
    #[case("LREAL#0.5", Some("LREAL"))]
    #[case("16#FF", None)]
    #[case("ST_Axis#1", None)]
    fn typed_literal_prefix_when_text_then_prefix_type(
        #[case] text: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(typed_literal_prefix(text), expected.map(Id::from));
    }
}
