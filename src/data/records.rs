use serde::{Deserialize, Deserializer};

/// One row of the sets catalog.
///
/// Only `set_num`, `year` and `parent_theme` are mandatory; the remaining
/// columns default to `None` when the source does not carry them.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SetRecord {
    pub set_num: String,
    #[serde(default)]
    pub name: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub theme_name: Option<String>,
    #[serde(default)]
    pub num_parts: Option<f64>,
    pub parent_theme: String,
}

/// One row of the parent theme taxonomy.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ThemeRecord {
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    #[serde(deserialize_with = "licensed_flag")]
    pub is_licensed: bool,
}

/// Parses the boolean spellings found in exported datasets (`True`, `false`, `1`, `no`, ...).
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn licensed_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid licensed flag `{raw}`")))
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn accepts_python_and_numeric_spellings() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag(" false "), Some(false));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
    }

    #[test]
    fn rejects_unknown_values() {
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }
}
