//! Loading of the sets catalog and the parent theme taxonomy.
//!
//! Both sources are CSV files with a header row. [`load`] validates the
//! required columns of each source, deserializes the rows into
//! [`SetRecord`]/[`ThemeRecord`] values and inner-joins them into the
//! [`JoinedTable`] every metric works on.

mod loader;
mod records;
mod table;

use std::fmt;
use std::path::PathBuf;

pub use loader::{join, load};
pub use records::{parse_flag, SetRecord, ThemeRecord};
pub use table::{columns, joined_columns, JoinedRow, JoinedTable, SETS_SUFFIX, THEMES_SUFFIX};

/// Identifies which of the two input sources an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// The sets catalog (one row per LEGO set).
    Sets,
    /// The parent theme taxonomy.
    Themes,
}

impl SourceKind {
    /// Columns that must be present in the header row of the source.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            SourceKind::Sets => &[columns::SET_NUM, columns::YEAR, columns::PARENT_THEME],
            SourceKind::Themes => &[columns::NAME, columns::IS_LICENSED],
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Sets => f.write_str("sets"),
            SourceKind::Themes => f.write_str("themes"),
        }
    }
}

/// Errors raised while reading the input sources.
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    /// The file could not be opened or its header row could not be read.
    #[error("failed to read {kind} source {}", .path.display())]
    Open {
        kind: SourceKind,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// The header row lacks columns the pipeline depends on.
    #[error(
        "{kind} source {} is missing required columns: {}",
        .path.display(),
        .missing.join(", ")
    )]
    MissingColumns {
        kind: SourceKind,
        path: PathBuf,
        missing: Vec<&'static str>,
    },
    /// A data row could not be deserialized.
    #[error("invalid {kind} record at line {line} of {}", .path.display())]
    Record {
        kind: SourceKind,
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },
}
