//! Licensed versus in-house themes.

use std::collections::BTreeMap;

use crate::data::{JoinedRow, JoinedTable};

use super::stats::round2;
use super::themes::rank_themes;
use super::{MetricError, ThemeCount};

/// Share of licensed sets that belong to one parent theme.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeShare<'a> {
    pub theme: String,
    /// Percentage of all licensed sets, rounded to two decimals.
    pub percentage: f64,
    /// The licensed rows of the theme, reusable by follow-up metrics.
    pub rows: Vec<&'a JoinedRow>,
}

/// Computes which percentage of licensed sets belong to `theme`.
///
/// Fails with [`MetricError::Division`] when the table has no licensed rows.
pub fn licensed_theme_share<'a>(
    table: &'a JoinedTable,
    theme: &str,
) -> Result<ThemeShare<'a>, MetricError> {
    let licensed: Vec<&JoinedRow> = table.licensed_rows().collect();
    if licensed.is_empty() {
        return Err(MetricError::Division {
            metric: "licensed theme share",
            denominator: "licensed sets",
        });
    }

    let total = licensed.len();
    let rows: Vec<&JoinedRow> = licensed
        .into_iter()
        .filter(|row| row.parent_theme == theme)
        .collect();

    Ok(ThemeShare {
        theme: theme.to_string(),
        percentage: round2(rows.len() as f64 / total as f64 * 100.0),
        rows,
    })
}

/// Licensed and unlicensed set counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LicenseSplit {
    pub licensed: usize,
    pub unlicensed: usize,
    /// Licensed share of all sets, truncated to a whole percent.
    pub licensed_percent: u32,
}

impl LicenseSplit {
    /// All sets, licensed or not.
    pub fn total(&self) -> usize {
        self.licensed + self.unlicensed
    }

    /// Exact licensed share in percent.
    pub fn licensed_share(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.licensed as f64 / self.total() as f64 * 100.0
        }
    }
}

/// Counts licensed and unlicensed sets. Fails on an empty table.
pub fn licensed_split(table: &JoinedTable) -> Result<LicenseSplit, MetricError> {
    if table.is_empty() {
        return Err(MetricError::Division {
            metric: "licensed percentage",
            denominator: "sets",
        });
    }

    let licensed = table.licensed_rows().count();
    let unlicensed = table.len() - licensed;
    Ok(LicenseSplit {
        licensed,
        unlicensed,
        licensed_percent: (licensed * 100 / table.len()) as u32,
    })
}

/// Licensed parent themes with the most sets.
pub fn top_licensed_themes(table: &JoinedTable, limit: usize) -> Vec<ThemeCount> {
    rank_themes(table.licensed_rows(), limit)
}

/// Licensed and unlicensed releases of one year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LicenseYear {
    pub year: i32,
    pub licensed: usize,
    pub unlicensed: usize,
}

impl LicenseYear {
    /// Sets released that year.
    pub fn total(&self) -> usize {
        self.licensed + self.unlicensed
    }
}

/// Pivots the releases into one row per year with a column per licensed flag.
pub fn license_trend(table: &JoinedTable) -> Vec<LicenseYear> {
    let mut years: BTreeMap<i32, LicenseYear> = BTreeMap::new();
    for row in table.rows() {
        let entry = years.entry(row.year).or_insert(LicenseYear {
            year: row.year,
            licensed: 0,
            unlicensed: 0,
        });
        if row.is_licensed {
            entry.licensed += 1;
        } else {
            entry.unlicensed += 1;
        }
    }
    years.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{row, star_wars_and_town, table};

    #[test]
    fn star_wars_owns_all_licensed_sets() {
        let table = star_wars_and_town();
        let share = licensed_theme_share(&table, "Star Wars").unwrap();

        assert_eq!(share.percentage, 100.0);
        assert_eq!(share.rows.len(), 2);
    }

    #[test]
    fn share_is_a_rounded_percentage() {
        let table = table(vec![
            row("1", 2001, "Star Wars", true, None),
            row("2", 2002, "Harry Potter", true, None),
            row("3", 2002, "Batman", true, None),
            row("4", 2003, "Town", false, None),
        ]);
        let share = licensed_theme_share(&table, "Star Wars").unwrap();
        assert_eq!(share.percentage, 33.33);
        assert!((0.0..=100.0).contains(&share.percentage));

        let absent = licensed_theme_share(&table, "Ninjago").unwrap();
        assert_eq!(absent.percentage, 0.0);
        assert!(absent.rows.is_empty());
    }

    #[test]
    fn share_without_licensed_sets_is_a_division_error() {
        let table = table(vec![row("1", 2001, "Town", false, None)]);
        let err = licensed_theme_share(&table, "Star Wars").unwrap_err();
        assert!(matches!(err, MetricError::Division { .. }));
    }

    #[test]
    fn split_truncates_the_percentage() {
        let table = table(vec![
            row("1", 2001, "Star Wars", true, None),
            row("2", 2001, "Town", false, None),
            row("3", 2002, "Town", false, None),
        ]);
        let split = licensed_split(&table).unwrap();

        assert_eq!(split.licensed, 1);
        assert_eq!(split.unlicensed, 2);
        assert_eq!(split.licensed_percent, 33);
        assert!(licensed_split(&crate::metrics::fixtures::table(Vec::new())).is_err());
    }

    #[test]
    fn trend_fills_missing_cells_with_zero() {
        let trend = license_trend(&star_wars_and_town());
        assert_eq!(
            trend,
            vec![
                LicenseYear {
                    year: 1999,
                    licensed: 2,
                    unlicensed: 0
                },
                LicenseYear {
                    year: 2000,
                    licensed: 0,
                    unlicensed: 1
                },
            ]
        );
    }

    #[test]
    fn licensed_ranking_ignores_unlicensed_themes() {
        let ranking = top_licensed_themes(&star_wars_and_town(), 10);
        assert_eq!(
            ranking,
            vec![ThemeCount {
                theme: "Star Wars".to_string(),
                sets: 2
            }]
        );
    }
}
