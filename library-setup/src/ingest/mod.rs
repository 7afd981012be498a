//! Table ingester
//!
//! Parses the Markdown column-metadata table into typed rows and loads them
//! into the metadata table with a reset-then-insert pass.

mod load;
mod parse;
mod record;

pub use load::{reload, LoadReport};
pub use parse::{parse_table, parse_table_str, ParsedTable, TableParseError, HEADER_MARKER};
pub use record::{ColumnRecord, ParsedRow, RowOutcome, SkipReason, MIN_CELLS};
