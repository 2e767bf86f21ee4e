//! Tabular views of metric results, used for PDF tables and CSV export.

use std::fs;
use std::io;
use std::path::Path;

use super::complexity::{SizeDistribution, SizeGroup, ThemeComplexity};
use super::licensing::{LicenseSplit, LicenseYear, ThemeShare};
use super::releases::ThemeYear;
use super::themes::SubthemeCount;
use super::{ThemeCount, ThemeSeries, YearCount};

/// A header row plus string cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MetricTable {
    /// Creates an empty table with the given header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row and returns the updated table.
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Header names in column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Formatted cells, one vector per row.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Serializes the table as CSV.
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))
    }

    /// Writes the CSV serialization to `path`.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let bytes = self.to_csv().map_err(io::Error::from)?;
        fs::write(path, bytes)
    }
}

/// Conversion of a metric result into a [`MetricTable`].
pub trait Tabular {
    fn to_table(&self) -> MetricTable;
}

fn decimal(value: f64) -> String {
    format!("{value:.2}")
}

fn optional_decimal(value: Option<f64>) -> String {
    value.map(decimal).unwrap_or_default()
}

impl Tabular for [ThemeCount] {
    fn to_table(&self) -> MetricTable {
        self.iter().fold(
            MetricTable::new(["Parent theme", "Sets"]),
            |table, entry| table.with_row([entry.theme.clone(), entry.sets.to_string()]),
        )
    }
}

impl Tabular for [YearCount] {
    fn to_table(&self) -> MetricTable {
        self.iter().fold(MetricTable::new(["Year", "Sets"]), |table, entry| {
            table.with_row([entry.year.to_string(), entry.count.to_string()])
        })
    }
}

impl Tabular for [ThemeSeries<usize>] {
    fn to_table(&self) -> MetricTable {
        self.iter()
            .flat_map(|series| series.points.iter().map(move |point| (series, point)))
            .fold(
                MetricTable::new(["Parent theme", "Year", "Sets"]),
                |table, (series, (year, sets))| {
                    table.with_row([series.theme.clone(), year.to_string(), sets.to_string()])
                },
            )
    }
}

impl Tabular for [ThemeSeries<f64>] {
    fn to_table(&self) -> MetricTable {
        self.iter()
            .flat_map(|series| series.points.iter().map(move |point| (series, point)))
            .fold(
                MetricTable::new(["Parent theme", "Year", "Average parts"]),
                |table, (series, (year, average))| {
                    table.with_row([series.theme.clone(), year.to_string(), decimal(*average)])
                },
            )
    }
}

impl Tabular for [LicenseYear] {
    fn to_table(&self) -> MetricTable {
        self.iter().fold(
            MetricTable::new(["Year", "Non-licensed", "Licensed"]),
            |table, entry| {
                table.with_row([
                    entry.year.to_string(),
                    entry.unlicensed.to_string(),
                    entry.licensed.to_string(),
                ])
            },
        )
    }
}

impl Tabular for [SubthemeCount] {
    fn to_table(&self) -> MetricTable {
        self.iter().fold(
            MetricTable::new(["Parent theme", "Sub-theme", "Sets"]),
            |table, entry| {
                table.with_row([
                    entry.parent_theme.clone(),
                    entry.theme_name.clone(),
                    entry.sets.to_string(),
                ])
            },
        )
    }
}

impl Tabular for [ThemeYear] {
    fn to_table(&self) -> MetricTable {
        self.iter().fold(
            MetricTable::new(["Year", "Themes", "New themes"]),
            |table, entry| {
                table.with_row([
                    entry.year.to_string(),
                    entry.themes.to_string(),
                    entry.debuts.to_string(),
                ])
            },
        )
    }
}

impl Tabular for [SizeGroup] {
    fn to_table(&self) -> MetricTable {
        self.iter().fold(
            MetricTable::new(["Group", "Sets", "Q1", "Median", "Q3", "Max"]),
            |table, group| {
                let label = if group.licensed { "Licensed" } else { "Non-licensed" };
                table.with_row([
                    label.to_string(),
                    group.summary.count.to_string(),
                    decimal(group.summary.q1),
                    decimal(group.summary.median),
                    decimal(group.summary.q3),
                    decimal(group.summary.max),
                ])
            },
        )
    }
}

impl Tabular for [ThemeComplexity] {
    fn to_table(&self) -> MetricTable {
        self.iter().fold(
            MetricTable::new(["Parent theme", "Sets", "Average parts"]),
            |table, entry| {
                table.with_row([
                    entry.theme.clone(),
                    entry.total_sets.to_string(),
                    optional_decimal(entry.avg_parts),
                ])
            },
        )
    }
}

impl Tabular for LicenseSplit {
    fn to_table(&self) -> MetricTable {
        MetricTable::new(["Group", "Sets"])
            .with_row(["Non-licensed".to_string(), self.unlicensed.to_string()])
            .with_row(["Licensed".to_string(), self.licensed.to_string()])
    }
}

impl Tabular for ThemeShare<'_> {
    fn to_table(&self) -> MetricTable {
        MetricTable::new(["Parent theme", "Licensed sets", "Share (%)"]).with_row([
            self.theme.clone(),
            self.rows.len().to_string(),
            decimal(self.percentage),
        ])
    }
}

impl Tabular for SizeDistribution<'_> {
    fn to_table(&self) -> MetricTable {
        self.rows().iter().fold(
            MetricTable::new(["Set", "Parent theme", "Parts"]),
            |table, row| {
                table.with_row([
                    row.set_num.clone(),
                    row.parent_theme.clone(),
                    optional_decimal(row.num_parts),
                ])
            },
        )
    }
}
