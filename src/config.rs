//! Report configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! standard report over `lego_sets.csv` and `parent_themes.csv`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::charts::Figure;
use crate::data::columns;

/// Errors raised while loading or checking a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete report configuration, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
    pub sections: Vec<SectionKind>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            output: OutputConfig::default(),
            analysis: AnalysisConfig::default(),
            sections: SectionKind::DEFAULT_ORDER.to_vec(),
        }
    }
}

/// Paths of the two source CSV files.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub sets: PathBuf,
    pub themes: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sets: PathBuf::from("lego_sets.csv"),
            themes: PathBuf::from("parent_themes.csv"),
        }
    }
}

/// Where the PDF, the chart images and the metric tables go.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub pdf: PathBuf,
    pub image_dir: PathBuf,
    /// When set, every metric table is also written there as CSV.
    pub tables_dir: Option<PathBuf>,
    /// Width of the embedded charts in millimetres.
    pub image_width_mm: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pdf: PathBuf::from("lego_analysis_report.pdf"),
            image_dir: PathBuf::from("images"),
            tables_dir: None,
            image_width_mm: 180.0,
        }
    }
}

/// Tuning knobs of the metrics and charts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Licensed theme whose share and peak year open the report.
    pub focus_theme: String,
    pub top_themes: usize,
    pub top_licensed_themes: usize,
    pub trend_themes: usize,
    pub subtheme_parents: usize,
    pub complexity_themes: usize,
    pub histogram_bins: usize,
    /// Quantile above which the histogram and scatter plots are cut off.
    pub clip_quantile: f64,
    pub fonts_dir: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            focus_theme: "Star Wars".to_string(),
            top_themes: 5,
            top_licensed_themes: 10,
            trend_themes: 5,
            subtheme_parents: 3,
            complexity_themes: 5,
            histogram_bins: 50,
            clip_quantile: 0.95,
            fonts_dir: None,
        }
    }
}

/// One question answered by the report, in the order it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    FocusTheme,
    SetsOverTime,
    TopThemes,
    LicensedShare,
    LicensedThemes,
    ThemeTrends,
    LicenseTrend,
    SizeComparison,
    Subthemes,
    SizeDistribution,
    ThemesPerYear,
    ComplexityTrends,
    PopularityVsComplexity,
}

impl SectionKind {
    /// Report order used when the config names no sections.
    pub const DEFAULT_ORDER: [SectionKind; 13] = [
        SectionKind::FocusTheme,
        SectionKind::SetsOverTime,
        SectionKind::TopThemes,
        SectionKind::LicensedShare,
        SectionKind::LicensedThemes,
        SectionKind::ThemeTrends,
        SectionKind::LicenseTrend,
        SectionKind::SizeComparison,
        SectionKind::Subthemes,
        SectionKind::SizeDistribution,
        SectionKind::ThemesPerYear,
        SectionKind::ComplexityTrends,
        SectionKind::PopularityVsComplexity,
    ];

    /// Heading of the section in the PDF.
    pub fn title(self, analysis: &AnalysisConfig) -> String {
        match self {
            SectionKind::FocusTheme => format!("{} Sets", analysis.focus_theme),
            SectionKind::SetsOverTime => "Set Release Over Time".to_string(),
            SectionKind::TopThemes => {
                format!("Top {} Most Common Parent Themes", analysis.top_themes)
            }
            SectionKind::LicensedShare => "Licensed Sets Percentage".to_string(),
            SectionKind::LicensedThemes => "Licensed Themes with the Most Sets".to_string(),
            SectionKind::ThemeTrends => {
                format!("Set Count Trends for Top {} Themes", analysis.trend_themes)
            }
            SectionKind::LicenseTrend => "Licensed vs Non-Licensed Sets Over Time".to_string(),
            SectionKind::SizeComparison => "Set Size Comparison (Boxplot)".to_string(),
            SectionKind::Subthemes => {
                format!("Sub-themes in Top {} Parent Themes", analysis.subtheme_parents)
            }
            SectionKind::SizeDistribution => "Set Size Distribution Across Sets".to_string(),
            SectionKind::ThemesPerYear => "Highest Number of Themes Introduced".to_string(),
            SectionKind::ComplexityTrends => format!(
                "Average Number of Parts for the Top {} Themes Over Time",
                analysis.complexity_themes
            ),
            SectionKind::PopularityVsComplexity => {
                "Theme Popularity vs. Set Complexity".to_string()
            }
        }
    }

    /// Chart embedded in the section, if any.
    pub fn figure(self) -> Option<Figure> {
        match self {
            SectionKind::FocusTheme => None,
            SectionKind::SetsOverTime => Some(Figure::SetsOverTime),
            SectionKind::TopThemes => Some(Figure::TopThemes),
            SectionKind::LicensedShare => Some(Figure::LicensedShare),
            SectionKind::LicensedThemes => Some(Figure::LicensedThemes),
            SectionKind::ThemeTrends => Some(Figure::ThemeTrends),
            SectionKind::LicenseTrend => Some(Figure::LicenseTrend),
            SectionKind::SizeComparison => Some(Figure::SizeComparison),
            SectionKind::Subthemes => Some(Figure::Subthemes),
            SectionKind::SizeDistribution => Some(Figure::SizeDistribution),
            SectionKind::ThemesPerYear => Some(Figure::ThemesPerYear),
            SectionKind::ComplexityTrends => Some(Figure::ComplexityTrends),
            SectionKind::PopularityVsComplexity => Some(Figure::PopularityVsComplexity),
        }
    }

    /// Joined-table columns the section's metrics read.
    pub fn required_columns(self) -> &'static [&'static str] {
        use columns::{IS_LICENSED, NUM_PARTS, PARENT_THEME, THEME_NAME, YEAR};
        match self {
            SectionKind::FocusTheme => &[PARENT_THEME, IS_LICENSED, YEAR],
            SectionKind::SetsOverTime => &[YEAR],
            SectionKind::TopThemes => &[PARENT_THEME],
            SectionKind::LicensedShare => &[IS_LICENSED],
            SectionKind::LicensedThemes => &[PARENT_THEME, IS_LICENSED],
            SectionKind::ThemeTrends => &[PARENT_THEME, YEAR],
            SectionKind::LicenseTrend => &[YEAR, IS_LICENSED],
            SectionKind::SizeComparison => &[NUM_PARTS, IS_LICENSED],
            SectionKind::Subthemes => &[PARENT_THEME, THEME_NAME],
            SectionKind::SizeDistribution => &[NUM_PARTS],
            SectionKind::ThemesPerYear => &[YEAR, PARENT_THEME],
            SectionKind::ComplexityTrends => &[PARENT_THEME, YEAR, NUM_PARTS],
            SectionKind::PopularityVsComplexity => &[PARENT_THEME, NUM_PARTS],
        }
    }
}

impl ReportConfig {
    /// Rejects values no report can be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("analysis.top_themes", self.analysis.top_themes),
            ("analysis.top_licensed_themes", self.analysis.top_licensed_themes),
            ("analysis.trend_themes", self.analysis.trend_themes),
            ("analysis.subtheme_parents", self.analysis.subtheme_parents),
            ("analysis.complexity_themes", self.analysis.complexity_themes),
            ("analysis.histogram_bins", self.analysis.histogram_bins),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
        }

        let quantile = self.analysis.clip_quantile;
        if !(quantile > 0.0 && quantile <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "analysis.clip_quantile must be in (0, 1], got {quantile}"
            )));
        }

        if !(self.output.image_width_mm.is_finite() && self.output.image_width_mm > 0.0) {
            return Err(ConfigError::Invalid(
                "output.image_width_mm must be positive".to_string(),
            ));
        }

        if self.analysis.focus_theme.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "analysis.focus_theme must not be empty".to_string(),
            ));
        }

        if self.sections.is_empty() {
            return Err(ConfigError::Invalid("sections must not be empty".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.sections.iter().find(|section| !seen.insert(**section)) {
            return Err(ConfigError::Invalid(format!(
                "section {duplicate:?} is listed more than once"
            )));
        }

        Ok(())
    }
}

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<ReportConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ReportConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}
