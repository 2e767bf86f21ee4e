use super::records::{SetRecord, ThemeRecord};

/// Suffix appended to sets columns whose name also appears in the themes source.
pub const SETS_SUFFIX: &str = "_ls";

/// Suffix appended to themes columns whose name also appears in the sets source.
pub const THEMES_SUFFIX: &str = "_pt";

/// Column names of the two sources.
pub mod columns {
    pub const SET_NUM: &str = "set_num";
    pub const NAME: &str = "name";
    pub const YEAR: &str = "year";
    pub const THEME_NAME: &str = "theme_name";
    pub const NUM_PARTS: &str = "num_parts";
    pub const PARENT_THEME: &str = "parent_theme";
    pub const ID: &str = "id";
    pub const IS_LICENSED: &str = "is_licensed";
}

/// Computes the column list of `left ⋈ right`.
///
/// Names present on both sides get [`SETS_SUFFIX`] / [`THEMES_SUFFIX`]. When both join
/// keys share a name the key is kept once, unsuffixed.
pub fn joined_columns(
    left: &[String],
    right: &[String],
    left_key: &str,
    right_key: &str,
) -> Vec<String> {
    let shared_key = left_key == right_key;
    let is_shared_key = |name: &str| shared_key && name == left_key;

    let left_columns = left.iter().map(|name| {
        if !is_shared_key(name.as_str()) && right.contains(name) {
            format!("{name}{SETS_SUFFIX}")
        } else {
            name.clone()
        }
    });

    let right_columns = right
        .iter()
        .filter(|name| !is_shared_key(name.as_str()))
        .map(|name| {
            if left.contains(name) {
                format!("{name}{THEMES_SUFFIX}")
            } else {
                name.clone()
            }
        });

    left_columns.chain(right_columns).collect()
}

/// A set combined with the parent theme it references.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedRow {
    pub set_num: String,
    pub set_name: Option<String>,
    pub year: i32,
    pub theme_name: Option<String>,
    pub num_parts: Option<f64>,
    pub parent_theme: String,
    pub theme_id: Option<u32>,
    pub is_licensed: bool,
}

impl JoinedRow {
    /// Combines a set with its matching theme. Non-finite part counts are treated as missing.
    pub fn new(set: &SetRecord, theme: &ThemeRecord) -> Self {
        Self {
            set_num: set.set_num.clone(),
            set_name: set.name.clone(),
            year: set.year,
            theme_name: set
                .theme_name
                .clone()
                .filter(|name| !name.trim().is_empty()),
            num_parts: set.num_parts.filter(|parts| parts.is_finite()),
            parent_theme: set.parent_theme.clone(),
            theme_id: theme.id,
            is_licensed: theme.is_licensed,
        }
    }
}

/// The inner join of the sets catalog with the parent theme taxonomy.
///
/// The table is built once by the loader and only borrowed afterwards; metrics derive their
/// own filtered or grouped copies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JoinedTable {
    columns: Vec<String>,
    rows: Vec<JoinedRow>,
}

impl JoinedTable {
    /// Creates a table from already joined rows and the joined column list.
    pub fn new(columns: Vec<String>, rows: Vec<JoinedRow>) -> Self {
        Self { columns, rows }
    }

    /// Returns the joined column names, suffixed where the sources collided.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns whether the joined table carries the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Returns all rows in join order.
    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    /// Iterates over rows whose parent theme is licensed.
    pub fn licensed_rows(&self) -> impl Iterator<Item = &JoinedRow> {
        self.rows.iter().filter(|row| row.is_licensed)
    }

    /// Number of joined rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when no set survived the join.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn colliding_columns_get_side_suffixes() {
        let joined = joined_columns(
            &names(&["set_num", "name", "year", "parent_theme"]),
            &names(&["id", "name", "is_licensed"]),
            "parent_theme",
            "name",
        );

        assert_eq!(
            joined,
            names(&[
                "set_num",
                "name_ls",
                "year",
                "parent_theme",
                "id",
                "name_pt",
                "is_licensed"
            ])
        );
    }

    #[test]
    fn shared_join_key_is_kept_once() {
        let joined = joined_columns(
            &names(&["theme", "count"]),
            &names(&["theme", "count"]),
            "theme",
            "theme",
        );

        assert_eq!(joined, names(&["theme", "count_ls", "count_pt"]));
    }
}
