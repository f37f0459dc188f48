//! Language objects for IEC 61131-3 structured text analysis.
//!
//! This crate defines the objects that the parser produces and the analyzer
//! consumes: identifiers and source positions (`core`), the top-level
//! declarations (`common`), statements and expressions (`textual`), and
//! diagnostics (`diagnostic`). The objects are immutable once built; any
//! information discovered later (such as inferred types) lives in side
//! tables keyed by node identity.

pub mod common;
pub mod core;
pub mod diagnostic;
pub mod textual;
