// Allow large errors because diagnostics carry full location data.
#![allow(clippy::result_large_err)]

//! Source file handling for TwinCAT projects.
//!
//! TwinCAT stores each POU, GVL, and DUT as an XML document wrapping the
//! structured text in CDATA sections. This crate reads such files from
//! disk (decoding by byte-order mark) and extracts the structured text so
//! the parser sees one plain unit of source.

pub mod file_type;
mod source;
mod twincat;

// Re-export the main entry points.
pub use file_type::FileType;
pub use source::read_source;
pub use twincat::extract_source;
