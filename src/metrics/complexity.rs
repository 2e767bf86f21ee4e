//! Set sizes measured by their part counts.

use std::collections::BTreeMap;

use log::debug;

use crate::data::{columns, JoinedRow, JoinedTable};

use super::stats::{mean, BoxSummary};
use super::themes::top_themes;
use super::{require_column, MetricError, ThemeSeries};

/// Rows with a known part count, unmodified and in table order.
#[derive(Clone, Debug, PartialEq)]
pub struct SizeDistribution<'a> {
    rows: Vec<&'a JoinedRow>,
}

impl<'a> SizeDistribution<'a> {
    /// Retained rows in table order.
    pub fn rows(&self) -> &[&'a JoinedRow] {
        &self.rows
    }

    /// Part counts of the retained rows.
    pub fn parts(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row.num_parts).collect()
    }

    /// Number of rows with a part count.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when no row has a part count.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keeps the rows whose part count is known.
///
/// Fails with [`MetricError::Schema`] before looking at any row when the joined table
/// has no `num_parts` column.
pub fn size_distribution(table: &JoinedTable) -> Result<SizeDistribution<'_>, MetricError> {
    require_column(table, columns::NUM_PARTS)?;

    let rows: Vec<&JoinedRow> = table
        .rows()
        .iter()
        .filter(|row| row.num_parts.is_some())
        .collect();
    debug!(
        "size distribution keeps {} of {} sets",
        rows.len(),
        table.len()
    );
    Ok(SizeDistribution { rows })
}

/// Part counts of the licensed or the unlicensed sets.
#[derive(Clone, Debug, PartialEq)]
pub struct SizeGroup {
    pub licensed: bool,
    pub parts: Vec<f64>,
    pub summary: BoxSummary,
}

/// Splits known part counts by licensed flag, unlicensed group first.
///
/// A group without any known part count is omitted.
pub fn size_by_license(table: &JoinedTable) -> Result<Vec<SizeGroup>, MetricError> {
    let distribution = size_distribution(table)?;

    Ok([false, true]
        .into_iter()
        .filter_map(|licensed| {
            let parts: Vec<f64> = distribution
                .rows()
                .iter()
                .filter(|row| row.is_licensed == licensed)
                .filter_map(|row| row.num_parts)
                .collect();
            BoxSummary::from_values(&parts).map(|summary| SizeGroup {
                licensed,
                parts,
                summary,
            })
        })
        .collect())
}

/// Average part count per year for the `limit` largest parent themes, in rank order.
///
/// Years in which none of a theme's sets has a known part count are left out.
pub fn complexity_trends(
    table: &JoinedTable,
    limit: usize,
) -> Result<Vec<ThemeSeries<f64>>, MetricError> {
    require_column(table, columns::NUM_PARTS)?;

    let selected = top_themes(table, limit);
    let mut parts: BTreeMap<(&str, i32), Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        if let Some(value) = row.num_parts {
            parts
                .entry((row.parent_theme.as_str(), row.year))
                .or_default()
                .push(value);
        }
    }

    Ok(selected
        .into_iter()
        .map(|ranked| {
            let points = parts
                .iter()
                .filter(|((theme, _), _)| *theme == ranked.theme)
                .filter_map(|((_, year), values)| {
                    mean(values.iter().copied()).map(|average| (*year, average))
                })
                .collect();
            ThemeSeries {
                theme: ranked.theme,
                points,
            }
        })
        .collect())
}

/// Popularity and average size of one parent theme.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeComplexity {
    pub theme: String,
    pub total_sets: usize,
    /// `None` when none of the theme's sets has a known part count.
    pub avg_parts: Option<f64>,
}

/// Counts sets and averages part counts per parent theme in a single pass.
///
/// One row per parent theme, ordered by theme name.
pub fn popularity_vs_complexity(table: &JoinedTable) -> Result<Vec<ThemeComplexity>, MetricError> {
    require_column(table, columns::NUM_PARTS)?;

    #[derive(Default)]
    struct Accumulator {
        sets: usize,
        parts_sum: f64,
        parts_seen: usize,
    }

    let mut themes: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for row in table.rows() {
        let entry = themes.entry(row.parent_theme.as_str()).or_default();
        entry.sets += 1;
        if let Some(value) = row.num_parts {
            entry.parts_sum += value;
            entry.parts_seen += 1;
        }
    }

    Ok(themes
        .into_iter()
        .map(|(theme, totals)| ThemeComplexity {
            theme: theme.to_string(),
            total_sets: totals.sets,
            avg_parts: (totals.parts_seen > 0)
                .then(|| totals.parts_sum / totals.parts_seen as f64),
        })
        .collect())
}
