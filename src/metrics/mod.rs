//! Aggregations answering the report's questions.
//!
//! Every function here is pure: it borrows the [`JoinedTable`] (or a subset produced by
//! another metric), never mutates it and performs no I/O. Rankings break ties explicitly:
//! higher counts first, then the smaller key (theme name or year).

pub mod complexity;
pub mod licensing;
pub mod releases;
pub mod stats;
pub mod table;
pub mod themes;

use std::collections::BTreeMap;

use crate::data::{JoinedRow, JoinedTable};

pub use complexity::{SizeDistribution, SizeGroup, ThemeComplexity};
pub use licensing::{LicenseSplit, LicenseYear, ThemeShare};
pub use releases::ThemeYear;
pub use stats::BoxSummary;
pub use table::{MetricTable, Tabular};
pub use themes::SubthemeCount;

/// Errors raised while computing a metric.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricError {
    /// A column the metric depends on is absent from the joined table.
    #[error("column `{column}` not found in the joined table")]
    Schema { column: &'static str },
    /// The denominator of a ratio was zero.
    #[error("cannot compute {metric}: there are no {denominator}")]
    Division {
        metric: &'static str,
        denominator: &'static str,
    },
    /// A subset the metric selects from was empty.
    #[error("cannot compute {metric}: the subset is empty")]
    EmptySubset { metric: &'static str },
}

/// Number of sets of one parent theme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeCount {
    pub theme: String,
    pub sets: usize,
}

/// Number of rows released in one year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Per-year values of one parent theme, ascending by year.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeSeries<T> {
    pub theme: String,
    pub points: Vec<(i32, T)>,
}

pub(crate) fn require_column(table: &JoinedTable, column: &'static str) -> Result<(), MetricError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(MetricError::Schema { column })
    }
}

pub(crate) fn count_by_theme<'a, I>(rows: I) -> BTreeMap<&'a str, usize>
where
    I: IntoIterator<Item = &'a JoinedRow>,
{
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.parent_theme.as_str()).or_insert(0) += 1;
    }
    counts
}

pub(crate) fn count_by_year<'a, I>(rows: I) -> BTreeMap<i32, usize>
where
    I: IntoIterator<Item = &'a JoinedRow>,
{
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.year).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::data::{columns, JoinedRow, JoinedTable};

    pub(crate) fn row(
        set_num: &str,
        year: i32,
        parent_theme: &str,
        is_licensed: bool,
        num_parts: Option<f64>,
    ) -> JoinedRow {
        JoinedRow {
            set_num: set_num.to_string(),
            set_name: None,
            year,
            theme_name: None,
            num_parts,
            parent_theme: parent_theme.to_string(),
            theme_id: None,
            is_licensed,
        }
    }

    pub(crate) fn table(rows: Vec<JoinedRow>) -> JoinedTable {
        let columns = [
            columns::SET_NUM,
            "name_ls",
            columns::YEAR,
            columns::THEME_NAME,
            columns::NUM_PARTS,
            columns::PARENT_THEME,
            columns::ID,
            "name_pt",
            columns::IS_LICENSED,
        ];
        JoinedTable::new(columns.iter().map(|name| name.to_string()).collect(), rows)
    }

    /// The three-row catalog from the report's worked example.
    pub(crate) fn star_wars_and_town() -> JoinedTable {
        table(vec![
            row("1", 1999, "Star Wars", true, Some(100.0)),
            row("2", 1999, "Star Wars", true, Some(250.0)),
            row("3", 2000, "Town", false, Some(40.0)),
        ])
    }
}
