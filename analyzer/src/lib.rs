// Allow large errors because diagnostics carry full location data.
#![allow(clippy::result_large_err)]

//! Semantic analysis for structured text syntax trees.
//!
//! The entry points are [`semantic::analyze`] for symbol and type
//! checking and [`complexity::cyclomatic_complexity`] for the complexity
//! measure. Both work on the tree a parse produces and never mutate it.

pub mod complexity;
pub mod semantic;
pub mod symbol_table;
mod type_rules;
