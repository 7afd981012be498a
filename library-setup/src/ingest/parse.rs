//! Markdown pipe-table parser for the column metadata source

use super::record::{ParsedRow, MIN_CELLS};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Header cell that identifies the metadata table inside the file.
pub const HEADER_MARKER: &str = "|nro_columna|";

#[derive(Debug, Error)]
pub enum TableParseError {
    #[error("header marker {marker} not found")]
    MarkerNotFound { marker: &'static str },

    #[error("failed to read table source: {0}")]
    Read(#[from] std::io::Error),
}

/// Header cells and data rows of the first table carrying the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
    /// Pipe lines dropped for having fewer than `MIN_CELLS` cells.
    pub discarded: usize,
}

/// Split a pipe line into trimmed cells, dropping the empty cells produced by
/// the outer pipes.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells: Vec<String> = line.split('|').map(|c| c.trim().to_string()).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

/// Parse table text already in memory.
pub fn parse_table_str(content: &str) -> Result<ParsedTable, TableParseError> {
    let lines: Vec<&str> = content.trim_start_matches('\u{feff}').lines().collect();

    let header_index = lines
        .iter()
        .position(|line| line.contains(HEADER_MARKER))
        .ok_or(TableParseError::MarkerNotFound {
            marker: HEADER_MARKER,
        })?;

    let headers = lines[header_index]
        .split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut discarded = 0;

    // The line right after the header is the separator row
    for (index, raw) in lines.iter().enumerate().skip(header_index + 2) {
        let line = raw.trim();
        if line.is_empty() || !line.starts_with('|') {
            break;
        }

        let cells = split_cells(line);
        if cells.len() < MIN_CELLS {
            debug!(line = index + 1, cells = cells.len(), "Discarding short table line");
            discarded += 1;
            continue;
        }
        rows.push(ParsedRow {
            line: index + 1,
            cells,
        });
    }

    Ok(ParsedTable {
        headers,
        rows,
        discarded,
    })
}

/// Read `path` as UTF-8 and parse its metadata table.
pub fn parse_table(path: &Path) -> Result<ParsedTable, TableParseError> {
    let content = fs::read_to_string(path)?;
    parse_table_str(&content)
}
