use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::records::{SetRecord, ThemeRecord};
use super::table::{columns, joined_columns, JoinedRow, JoinedTable};
use super::{DataSourceError, SourceKind};

/// Reads both sources and returns their inner join on `parent_theme == name`.
pub fn load(
    sets_path: impl AsRef<Path>,
    themes_path: impl AsRef<Path>,
) -> Result<JoinedTable, DataSourceError> {
    let (set_columns, sets) = read_source::<SetRecord>(SourceKind::Sets, sets_path.as_ref())?;
    let (theme_columns, themes) =
        read_source::<ThemeRecord>(SourceKind::Themes, themes_path.as_ref())?;

    let table = join(&sets, &set_columns, &themes, &theme_columns);
    let known: HashSet<&str> = themes.iter().map(|theme| theme.name.as_str()).collect();
    let dropped = sets
        .iter()
        .filter(|set| !known.contains(set.parent_theme.as_str()))
        .count();
    if dropped > 0 {
        warn!("{dropped} sets reference a parent theme missing from the taxonomy and were dropped");
    }
    info!(
        "joined {} sets with {} parent themes into {} rows",
        sets.len(),
        themes.len(),
        table.len()
    );

    Ok(table)
}

/// Inner-joins sets with themes, keeping the sets order.
///
/// A set matches every theme whose name equals its parent theme; sets without a match are
/// dropped. `set_columns` and `theme_columns` are the header rows of the two sources and
/// determine the joined column list.
pub fn join(
    sets: &[SetRecord],
    set_columns: &[String],
    themes: &[ThemeRecord],
    theme_columns: &[String],
) -> JoinedTable {
    let mut by_name: HashMap<&str, Vec<&ThemeRecord>> = HashMap::new();
    for theme in themes {
        by_name.entry(theme.name.as_str()).or_default().push(theme);
    }

    let rows = sets
        .iter()
        .flat_map(|set| {
            by_name
                .get(set.parent_theme.as_str())
                .into_iter()
                .flatten()
                .map(move |theme| JoinedRow::new(set, theme))
        })
        .collect();

    let columns = joined_columns(
        set_columns,
        theme_columns,
        columns::PARENT_THEME,
        columns::NAME,
    );

    JoinedTable::new(columns, rows)
}

fn read_source<T>(kind: SourceKind, path: &Path) -> Result<(Vec<String>, Vec<T>), DataSourceError>
where
    T: DeserializeOwned,
{
    let open_error = |source| DataSourceError::Open {
        kind,
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(open_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(open_error)?
        .iter()
        .map(str::to_owned)
        .collect();

    let missing: Vec<&'static str> = kind
        .required_columns()
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|header| header == *required))
        .collect();
    if !missing.is_empty() {
        return Err(DataSourceError::MissingColumns {
            kind,
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut records = Vec::new();
    for result in reader.deserialize::<T>() {
        let record = result.map_err(|source| DataSourceError::Record {
            kind,
            path: path.to_path_buf(),
            line: source.position().map(|position| position.line()).unwrap_or(0),
            source,
        })?;
        records.push(record);
    }

    debug!("read {} {kind} records from {}", records.len(), path.display());
    Ok((headers, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(set_num: &str, year: i32, parent_theme: &str) -> SetRecord {
        SetRecord {
            set_num: set_num.to_string(),
            name: None,
            year,
            theme_name: None,
            num_parts: Some(100.0),
            parent_theme: parent_theme.to_string(),
        }
    }

    fn theme(name: &str, is_licensed: bool) -> ThemeRecord {
        ThemeRecord {
            id: None,
            name: name.to_string(),
            is_licensed,
        }
    }

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn unmatched_sets_are_dropped() {
        let sets = vec![
            set("1", 1999, "Star Wars"),
            set("2", 2000, "Unknown"),
            set("3", 2001, "Town"),
        ];
        let themes = vec![theme("Star Wars", true), theme("Town", false)];

        let table = join(
            &sets,
            &headers(&["set_num", "year", "parent_theme"]),
            &themes,
            &headers(&["name", "is_licensed"]),
        );

        assert_eq!(table.len(), 2);
        assert!(table
            .rows()
            .iter()
            .all(|row| themes.iter().any(|theme| theme.name == row.parent_theme)));
        assert_eq!(table.rows()[0].set_num, "1");
        assert!(table.rows()[0].is_licensed);
        assert!(!table.rows()[1].is_licensed);
    }

    #[test]
    fn duplicated_theme_names_yield_one_row_each() {
        let sets = vec![set("1", 1999, "Town")];
        let themes = vec![theme("Town", false), theme("Town", true)];

        let table = join(
            &sets,
            &headers(&["set_num", "year", "parent_theme"]),
            &themes,
            &headers(&["name", "is_licensed"]),
        );

        assert_eq!(table.len(), 2);
    }

    #[test]
    fn non_finite_part_counts_are_missing() {
        let mut record = set("1", 1999, "Town");
        record.num_parts = Some(f64::NAN);
        let table = join(
            &[record],
            &headers(&["set_num", "year", "parent_theme", "num_parts"]),
            &[theme("Town", false)],
            &headers(&["name", "is_licensed"]),
        );

        assert_eq!(table.rows()[0].num_parts, None);
        assert!(table.has_column("num_parts"));
    }

    #[test]
    fn missing_required_columns_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let sets = dir.path().join("sets.csv");
        let themes = dir.path().join("themes.csv");
        std::fs::write(&sets, "set_num,name\n1,Town Square\n").unwrap();
        std::fs::write(&themes, "name,is_licensed\nTown,False\n").unwrap();

        match load(&sets, &themes) {
            Err(DataSourceError::MissingColumns { kind, missing, .. }) => {
                assert_eq!(kind, SourceKind::Sets);
                assert_eq!(missing, vec!["year", "parent_theme"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn bad_records_report_their_line() {
        let dir = tempfile::tempdir().unwrap();
        let sets = dir.path().join("sets.csv");
        let themes = dir.path().join("themes.csv");
        std::fs::write(&sets, "set_num,year,parent_theme\n1,1999,Town\n").unwrap();
        std::fs::write(&themes, "name,is_licensed\nTown,False\nSpace,maybe\n").unwrap();

        match load(&sets, &themes) {
            Err(DataSourceError::Record { kind, line, .. }) => {
                assert_eq!(kind, SourceKind::Themes);
                assert_eq!(line, 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_files_fail_to_open() {
        let err = load("does-not-exist/sets.csv", "does-not-exist/themes.csv").unwrap_err();
        assert!(matches!(err, DataSourceError::Open { kind: SourceKind::Sets, .. }));
    }
}
