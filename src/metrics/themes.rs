//! Parent theme rankings and their evolution.

use std::collections::BTreeMap;

use log::debug;

use crate::data::{columns, JoinedRow, JoinedTable};

use super::stats::rank_counts;
use super::{count_by_theme, require_column, MetricError, ThemeCount, ThemeSeries};

/// The `limit` parent themes with the most sets.
pub fn top_themes(table: &JoinedTable, limit: usize) -> Vec<ThemeCount> {
    rank_themes(table.rows(), limit)
}

pub(crate) fn rank_themes<'a, I>(rows: I, limit: usize) -> Vec<ThemeCount>
where
    I: IntoIterator<Item = &'a JoinedRow>,
{
    rank_counts(count_by_theme(rows), limit)
        .into_iter()
        .map(|(theme, sets)| ThemeCount {
            theme: theme.to_string(),
            sets,
        })
        .collect()
}

/// Yearly set counts of the `limit` largest parent themes, in rank order.
///
/// Themes are selected by their total volume across all years.
pub fn theme_trends(table: &JoinedTable, limit: usize) -> Vec<ThemeSeries<usize>> {
    let mut per_theme: BTreeMap<&str, BTreeMap<i32, usize>> = BTreeMap::new();
    for row in table.rows() {
        *per_theme
            .entry(row.parent_theme.as_str())
            .or_default()
            .entry(row.year)
            .or_insert(0) += 1;
    }

    let selected = top_themes(table, limit);
    debug!(
        "theme trends cover {} of {} parent themes",
        selected.len(),
        per_theme.len()
    );

    selected
        .into_iter()
        .map(|ranked| ThemeSeries {
            points: per_theme
                .remove(ranked.theme.as_str())
                .unwrap_or_default()
                .into_iter()
                .collect(),
            theme: ranked.theme,
        })
        .collect()
}

/// Number of sets of one sub-theme within a parent theme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubthemeCount {
    pub parent_theme: String,
    pub theme_name: String,
    pub sets: usize,
}

/// Sub-theme counts within the `parents` largest parent themes.
///
/// Rows are grouped by parent in rank order, then by count descending and sub-theme name.
/// Sets without a sub-theme are skipped. Requires the `theme_name` column.
pub fn subthemes_of_top_parents(
    table: &JoinedTable,
    parents: usize,
) -> Result<Vec<SubthemeCount>, MetricError> {
    require_column(table, columns::THEME_NAME)?;

    let ranked = top_themes(table, parents);
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for row in table.rows() {
        let Some(theme_name) = row.theme_name.as_deref() else {
            continue;
        };
        if ranked.iter().any(|parent| parent.theme == row.parent_theme) {
            *counts
                .entry((row.parent_theme.as_str(), theme_name))
                .or_insert(0) += 1;
        }
    }

    let mut subthemes: Vec<SubthemeCount> = counts
        .into_iter()
        .map(|((parent_theme, theme_name), sets)| SubthemeCount {
            parent_theme: parent_theme.to_string(),
            theme_name: theme_name.to_string(),
            sets,
        })
        .collect();

    let rank_of = |parent: &str| {
        ranked
            .iter()
            .position(|candidate| candidate.theme == parent)
            .unwrap_or(usize::MAX)
    };
    subthemes.sort_by(|a, b| {
        rank_of(&a.parent_theme)
            .cmp(&rank_of(&b.parent_theme))
            .then(b.sets.cmp(&a.sets))
            .then_with(|| a.theme_name.cmp(&b.theme_name))
    });

    Ok(subthemes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::JoinedTable;
    use crate::metrics::fixtures::{row, table};

    fn catalog() -> JoinedTable {
        let mut rows = Vec::new();
        let mut push = |theme: &str, year: i32, count: usize, sub: Option<&str>| {
            for index in 0..count {
                let mut entry = row(&format!("{theme}-{year}-{index}"), year, theme, false, None);
                entry.theme_name = sub.map(str::to_string);
                rows.push(entry);
            }
        };
        push("Town", 1990, 4, Some("Police"));
        push("Town", 1991, 2, Some("Fire"));
        push("Technic", 1990, 4, Some("Supercar"));
        push("Space", 1991, 3, Some("Blacktron"));
        push("Space", 1992, 1, None);
        push("Castle", 1992, 1, Some("Knights"));
        table(rows)
    }

    #[test]
    fn ranking_is_sorted_and_bounded() {
        let table = catalog();
        for limit in [0, 1, 3, 10] {
            let ranking = top_themes(&table, limit);
            assert!(ranking.len() <= limit);
            assert!(ranking.len() <= 4, "only four distinct themes exist");
            assert!(ranking.windows(2).all(|pair| pair[0].sets >= pair[1].sets));
        }
    }

    #[test]
    fn ranking_ties_are_broken_by_name() {
        let ranking = top_themes(&catalog(), 3);
        let names: Vec<&str> = ranking.iter().map(|entry| entry.theme.as_str()).collect();
        assert_eq!(names, vec!["Town", "Space", "Technic"]);
    }

    #[test]
    fn trends_follow_total_volume() {
        let trends = theme_trends(&catalog(), 2);

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].theme, "Town");
        assert_eq!(trends[0].points, vec![(1990, 4), (1991, 2)]);
        assert_eq!(trends[1].theme, "Space");
        assert_eq!(trends[1].points, vec![(1991, 3), (1992, 1)]);
    }

    #[test]
    fn subthemes_are_grouped_by_parent_rank() {
        let subthemes = subthemes_of_top_parents(&catalog(), 2).unwrap();
        let pairs: Vec<(&str, &str, usize)> = subthemes
            .iter()
            .map(|entry| (entry.parent_theme.as_str(), entry.theme_name.as_str(), entry.sets))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("Town", "Police", 4),
                ("Town", "Fire", 2),
                ("Space", "Blacktron", 3),
            ]
        );
    }

    #[test]
    fn subthemes_require_the_theme_name_column() {
        let table = JoinedTable::new(vec!["set_num".into(), "year".into()], Vec::new());
        assert_eq!(
            subthemes_of_top_parents(&table, 3).unwrap_err(),
            MetricError::Schema {
                column: "theme_name"
            }
        );
    }
}
