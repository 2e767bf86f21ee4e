//! Release volumes over time.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::data::{JoinedRow, JoinedTable};

use super::{count_by_year, MetricError, YearCount};

/// Number of sets released per year, ascending by year.
pub fn sets_per_year(table: &JoinedTable) -> Vec<YearCount> {
    count_by_year(table.rows())
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// The year with the most rows; ties go to the earliest year.
pub fn peak_year<'a, I>(rows: I) -> Result<YearCount, MetricError>
where
    I: IntoIterator<Item = &'a JoinedRow>,
{
    let mut peak: Option<YearCount> = None;
    for (year, count) in count_by_year(rows) {
        if peak.map_or(true, |best| count > best.count) {
            peak = Some(YearCount { year, count });
        }
    }
    peak.ok_or(MetricError::EmptySubset { metric: "peak year" })
}

/// Parent theme activity of one year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeYear {
    pub year: i32,
    /// Distinct parent themes with at least one release that year.
    pub themes: usize,
    /// Parent themes whose first release falls in that year.
    pub debuts: usize,
}

/// Counts distinct parent themes per year.
pub fn themes_per_year(table: &JoinedTable) -> Vec<ThemeYear> {
    let mut active: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
    let mut first_year: HashMap<&str, i32> = HashMap::new();

    for row in table.rows() {
        active
            .entry(row.year)
            .or_default()
            .insert(row.parent_theme.as_str());
        first_year
            .entry(row.parent_theme.as_str())
            .and_modify(|year| *year = (*year).min(row.year))
            .or_insert(row.year);
    }

    active
        .into_iter()
        .map(|(year, themes)| ThemeYear {
            year,
            themes: themes.len(),
            debuts: themes
                .iter()
                .filter(|theme| first_year.get(**theme) == Some(&year))
                .count(),
        })
        .collect()
}

/// The year with the most active parent themes; ties go to the earliest year.
pub fn busiest_theme_year(years: &[ThemeYear]) -> Option<ThemeYear> {
    years
        .iter()
        .copied()
        .fold(None, |best: Option<ThemeYear>, candidate| match best {
            Some(best) if best.themes >= candidate.themes => Some(best),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{row, star_wars_and_town, table};
    use crate::metrics::licensing::licensed_theme_share;

    #[test]
    fn peak_year_of_the_star_wars_subset() {
        let table = star_wars_and_town();
        let share = licensed_theme_share(&table, "Star Wars").unwrap();
        let peak = peak_year(share.rows.iter().copied()).unwrap();

        assert_eq!(peak.year, 1999);
        assert_eq!(peak.count, 2);
    }

    #[test]
    fn peak_year_ties_go_to_the_earliest_year() {
        let table = table(vec![
            row("1", 2005, "Town", false, None),
            row("2", 2003, "Town", false, None),
        ]);
        assert_eq!(peak_year(table.rows()).unwrap().year, 2003);
    }

    #[test]
    fn peak_year_of_nothing_is_an_error() {
        let rows: Vec<&JoinedRow> = Vec::new();
        assert_eq!(
            peak_year(rows).unwrap_err(),
            MetricError::EmptySubset { metric: "peak year" }
        );
    }

    #[test]
    fn yearly_counts_sum_to_the_row_count() {
        let table = table(vec![
            row("1", 1999, "Star Wars", true, None),
            row("2", 2001, "Town", false, None),
            row("3", 1999, "Town", false, None),
            row("4", 2010, "Ninjago", false, None),
        ]);
        let yearly = sets_per_year(&table);

        assert_eq!(yearly.iter().map(|entry| entry.count).sum::<usize>(), table.len());
        assert!(yearly.windows(2).all(|pair| pair[0].year < pair[1].year));
    }

    #[test]
    fn themes_per_year_counts_distinct_and_new_themes() {
        let table = table(vec![
            row("1", 1999, "Star Wars", true, None),
            row("2", 1999, "Star Wars", true, None),
            row("3", 1999, "Town", false, None),
            row("4", 2000, "Town", false, None),
            row("5", 2000, "Ninjago", false, None),
            row("6", 2000, "Technic", false, None),
        ]);
        let years = themes_per_year(&table);

        assert_eq!(
            years,
            vec![
                ThemeYear {
                    year: 1999,
                    themes: 2,
                    debuts: 2
                },
                ThemeYear {
                    year: 2000,
                    themes: 3,
                    debuts: 2
                },
            ]
        );
        assert_eq!(busiest_theme_year(&years).map(|year| year.year), Some(2000));
        assert_eq!(busiest_theme_year(&[]), None);
    }
}
