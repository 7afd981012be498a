//! Column metadata rows

/// Minimum cells a data line needs to be considered a row at all.
pub const MIN_CELLS: usize = 7;

/// Cell positions in the source table. Cells 7 and 8 carry no metadata.
mod cell {
    pub const ORDINAL: usize = 0;
    pub const NAME: usize = 1;
    pub const EXPLANATION: usize = 2;
    pub const FORMAT: usize = 3;
    pub const FIXED_VALUE: usize = 4;
    pub const DESIRED_LANGUAGE: usize = 5;
    pub const BACKUP_SOURCE_ID: usize = 6;
    pub const MAX_LENGTH: usize = 9;
}

/// One data line of the source table, split into trimmed cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub cells: Vec<String>,
}

/// A row accepted for insertion into the metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    pub ordinal: i32,
    pub name: String,
    pub explanation: String,
    pub format: String,
    pub fixed_value: String,
    pub desired_language: String,
    /// Non-empty when the field is imported verbatim from a bibliographic backup.
    pub backup_source_id: String,
    pub max_length: Option<i32>,
}

impl ColumnRecord {
    /// Fields sourced from a backup are never edited by hand.
    pub fn is_read_only(&self) -> bool {
        !self.backup_source_id.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingOrdinal,
    MissingName,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOrdinal => write!(f, "no numeric ordinal"),
            Self::MissingName => write!(f, "no column name"),
        }
    }
}

/// What to do with a parsed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Valid(ColumnRecord),
    Skip(SkipReason),
}

/// Non-empty, ASCII digits only, and within `i32`.
fn numeric(value: &str) -> Option<i32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl ParsedRow {
    fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or_default()
    }

    pub fn classify(&self) -> RowOutcome {
        let Some(ordinal) = numeric(self.cell(cell::ORDINAL)) else {
            return RowOutcome::Skip(SkipReason::MissingOrdinal);
        };
        let name = self.cell(cell::NAME);
        if name.is_empty() {
            return RowOutcome::Skip(SkipReason::MissingName);
        }

        RowOutcome::Valid(ColumnRecord {
            ordinal,
            name: name.to_string(),
            explanation: self.cell(cell::EXPLANATION).to_string(),
            format: self.cell(cell::FORMAT).to_string(),
            fixed_value: self.cell(cell::FIXED_VALUE).to_string(),
            desired_language: self.cell(cell::DESIRED_LANGUAGE).to_string(),
            backup_source_id: self.cell(cell::BACKUP_SOURCE_ID).to_string(),
            max_length: numeric(self.cell(cell::MAX_LENGTH)),
        })
    }
}
