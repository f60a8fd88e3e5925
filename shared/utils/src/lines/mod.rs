//! Order Line Processing Module
//!
//! Turns free-text order lines ("part number, optional quantity") into
//! parsed items for the research pipeline.

pub mod parser;

pub use parser::{parse_lines, QuantityParser};
