//! Runs the whole pipeline: load, validate, compute, draw, lay out, write.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::builder::PdfBuilder;
use crate::charts::{self, ChartError};
use crate::config::{AnalysisConfig, ReportConfig, SectionKind};
use crate::data::{self, JoinedTable};
use crate::error::Error;
use crate::fonts;
use crate::metrics::{
    complexity, licensing, releases, themes, LicenseSplit, LicenseYear, MetricError, MetricTable,
    SizeDistribution, SizeGroup, SubthemeCount, Tabular, ThemeComplexity, ThemeCount,
    ThemeSeries, ThemeShare, ThemeYear, YearCount,
};
use crate::model::{Block, ImageBlock, ImageSource, RichParagraph, Section, TableBlock};
use crate::richtext::escape_markup;

/// Running title printed on every page and stored as the PDF title.
pub const REPORT_TITLE: &str = "LEGO Sets Analysis Report";

/// What a finished run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSummary {
    pub pdf: PathBuf,
    pub bytes: usize,
    pub rows: usize,
    pub sections: usize,
    pub images: Vec<PathBuf>,
    pub tables: Vec<PathBuf>,
}

/// A metric table with the file stem it is exported under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedTable {
    pub name: &'static str,
    pub table: MetricTable,
}

/// Metric results of one section.
enum SectionData<'a> {
    FocusTheme {
        share: ThemeShare<'a>,
        peak: YearCount,
    },
    SetsOverTime(Vec<YearCount>),
    TopThemes(Vec<ThemeCount>),
    LicensedShare(LicenseSplit),
    LicensedThemes(Vec<ThemeCount>),
    ThemeTrends(Vec<ThemeSeries<usize>>),
    LicenseTrend(Vec<LicenseYear>),
    SizeComparison(Vec<SizeGroup>),
    Subthemes(Vec<SubthemeCount>),
    SizeDistribution(SizeDistribution<'a>),
    ThemesPerYear {
        years: Vec<ThemeYear>,
        busiest: ThemeYear,
    },
    ComplexityTrends(Vec<ThemeSeries<f64>>),
    PopularityVsComplexity(Vec<ThemeComplexity>),
}

impl<'a> SectionData<'a> {
    fn compute(
        kind: SectionKind,
        analysis: &AnalysisConfig,
        table: &'a JoinedTable,
    ) -> Result<Self, MetricError> {
        let data = match kind {
            SectionKind::FocusTheme => {
                let share = licensing::licensed_theme_share(table, &analysis.focus_theme)?;
                let peak = releases::peak_year(share.rows.iter().copied())?;
                SectionData::FocusTheme { share, peak }
            }
            SectionKind::SetsOverTime => SectionData::SetsOverTime(releases::sets_per_year(table)),
            SectionKind::TopThemes => {
                SectionData::TopThemes(themes::top_themes(table, analysis.top_themes))
            }
            SectionKind::LicensedShare => {
                SectionData::LicensedShare(licensing::licensed_split(table)?)
            }
            SectionKind::LicensedThemes => SectionData::LicensedThemes(
                licensing::top_licensed_themes(table, analysis.top_licensed_themes),
            ),
            SectionKind::ThemeTrends => {
                SectionData::ThemeTrends(themes::theme_trends(table, analysis.trend_themes))
            }
            SectionKind::LicenseTrend => SectionData::LicenseTrend(licensing::license_trend(table)),
            SectionKind::SizeComparison => {
                SectionData::SizeComparison(complexity::size_by_license(table)?)
            }
            SectionKind::Subthemes => SectionData::Subthemes(themes::subthemes_of_top_parents(
                table,
                analysis.subtheme_parents,
            )?),
            SectionKind::SizeDistribution => {
                SectionData::SizeDistribution(complexity::size_distribution(table)?)
            }
            SectionKind::ThemesPerYear => {
                let years = releases::themes_per_year(table);
                let busiest = releases::busiest_theme_year(&years).ok_or(
                    MetricError::EmptySubset {
                        metric: "themes per year",
                    },
                )?;
                SectionData::ThemesPerYear { years, busiest }
            }
            SectionKind::ComplexityTrends => SectionData::ComplexityTrends(
                complexity::complexity_trends(table, analysis.complexity_themes)?,
            ),
            SectionKind::PopularityVsComplexity => SectionData::PopularityVsComplexity(
                complexity::popularity_vs_complexity(table)?,
            ),
        };
        Ok(data)
    }

    fn tables(&self) -> Vec<NamedTable> {
        let named = |name, table| NamedTable { name, table };
        match self {
            SectionData::FocusTheme { share, .. } => vec![named("focus_theme_share", share.to_table())],
            SectionData::SetsOverTime(years) => vec![named("sets_per_year", years.to_table())],
            SectionData::TopThemes(ranking) => vec![named("top_themes", ranking.to_table())],
            SectionData::LicensedShare(split) => vec![named("licensed_split", split.to_table())],
            SectionData::LicensedThemes(ranking) => {
                vec![named("top_licensed_themes", ranking.to_table())]
            }
            SectionData::ThemeTrends(series) => vec![named("theme_trends", series.to_table())],
            SectionData::LicenseTrend(years) => vec![named("license_trend", years.to_table())],
            SectionData::SizeComparison(groups) => {
                vec![named("size_by_license", groups.to_table())]
            }
            SectionData::Subthemes(counts) => vec![named("subthemes", counts.to_table())],
            SectionData::SizeDistribution(distribution) => {
                vec![named("size_distribution", distribution.to_table())]
            }
            SectionData::ThemesPerYear { years, .. } => {
                vec![named("themes_per_year", years.to_table())]
            }
            SectionData::ComplexityTrends(series) => {
                vec![named("complexity_trends", series.to_table())]
            }
            SectionData::PopularityVsComplexity(stats) => {
                vec![named("popularity_vs_complexity", stats.to_table())]
            }
        }
    }

    /// Draws the section chart, if it has one.
    fn render(&self, directory: &Path, analysis: &AnalysisConfig) -> Result<Option<PathBuf>, ChartError> {
        let path = match self {
            SectionData::FocusTheme { .. } => return Ok(None),
            SectionData::SetsOverTime(years) => charts::render_sets_over_time(directory, years)?,
            SectionData::TopThemes(ranking) => charts::render_top_themes(directory, ranking)?,
            SectionData::LicensedShare(split) => charts::render_licensed_share(directory, split)?,
            SectionData::LicensedThemes(ranking) => {
                charts::render_licensed_themes(directory, ranking)?
            }
            SectionData::ThemeTrends(series) => charts::render_theme_trends(directory, series)?,
            SectionData::LicenseTrend(years) => charts::render_license_trend(directory, years)?,
            SectionData::SizeComparison(groups) => {
                charts::render_size_comparison(directory, groups, analysis.clip_quantile)?
            }
            SectionData::Subthemes(counts) => charts::render_subthemes(directory, counts)?,
            SectionData::SizeDistribution(distribution) => charts::render_size_distribution(
                directory,
                distribution,
                analysis.histogram_bins,
                analysis.clip_quantile,
            )?,
            SectionData::ThemesPerYear { years, .. } => {
                charts::render_themes_per_year(directory, years)?
            }
            SectionData::ComplexityTrends(series) => {
                charts::render_complexity_trends(directory, series)?
            }
            SectionData::PopularityVsComplexity(stats) => {
                charts::render_popularity_vs_complexity(directory, stats, analysis.clip_quantile)?
            }
        };
        Ok(Some(path))
    }

    /// Report prose for the section, in `richtext` markup.
    fn paragraphs(&self, analysis: &AnalysisConfig) -> Vec<String> {
        match self {
            SectionData::FocusTheme { share, peak } => {
                let theme = escape_markup(&analysis.focus_theme);
                vec![
                    // `{:?}` keeps one decimal on whole values: 100.0, 33.33.
                    format!(
                        "Percentage of licensed sets that are {}: **{:?}%**.",
                        theme, share.percentage
                    ),
                    format!("Year with the most {} sets released: **{}**.", theme, peak.year),
                ]
            }
            SectionData::LicensedShare(split) => vec![format!(
                "Licensed sets account for **{}%** of all LEGO sets.",
                split.licensed_percent
            )],
            SectionData::ThemesPerYear { busiest, .. } => vec![format!(
                "The highest number of new themes was introduced in: **{}**.",
                busiest.year
            )],
            _ => Vec::new(),
        }
    }

    /// Table shown in the PDF; the full data goes to the CSV export only.
    fn pdf_table(&self) -> Option<MetricTable> {
        match self {
            SectionData::TopThemes(ranking) | SectionData::LicensedThemes(ranking) => {
                Some(ranking.to_table())
            }
            SectionData::SizeComparison(groups) => Some(groups.to_table()),
            _ => None,
        }
    }
}

/// Fails with [`MetricError::Schema`] for the first column a configured section needs
/// but the joined table lacks.
pub fn check_columns(sections: &[SectionKind], table: &JoinedTable) -> Result<(), MetricError> {
    for section in sections {
        if let Some(column) = section
            .required_columns()
            .iter()
            .copied()
            .find(|column| !table.has_column(column))
        {
            return Err(MetricError::Schema { column });
        }
    }
    Ok(())
}

fn compute_sections<'a>(
    config: &ReportConfig,
    table: &'a JoinedTable,
) -> Result<Vec<(SectionKind, SectionData<'a>)>, MetricError> {
    check_columns(&config.sections, table)?;
    config
        .sections
        .iter()
        .map(|kind| {
            let data = SectionData::compute(*kind, &config.analysis, table)?;
            debug!("computed {:?}", kind);
            Ok((*kind, data))
        })
        .collect()
}

/// Metric tables of every configured section, without drawing anything.
pub fn metric_tables(config: &ReportConfig, table: &JoinedTable) -> Result<Vec<NamedTable>, Error> {
    Ok(compute_sections(config, table)?
        .iter()
        .flat_map(|(_, data)| data.tables())
        .collect())
}

/// Writes each table to `<directory>/<name>.csv`.
pub fn export_tables(tables: &[NamedTable], directory: &Path) -> Result<Vec<PathBuf>, Error> {
    fs::create_dir_all(directory).map_err(|source| Error::Table {
        path: directory.to_path_buf(),
        source,
    })?;
    tables
        .iter()
        .map(|named| {
            let path = directory.join(format!("{}.csv", named.name));
            named
                .table
                .write_csv(&path)
                .map_err(|source| Error::Table {
                    path: path.clone(),
                    source,
                })?;
            Ok(path)
        })
        .collect()
}

fn table_block(table: &MetricTable) -> TableBlock {
    TableBlock::new(table.columns().to_vec(), table.rows().to_vec())
}

/// Loads the data, builds every configured section and writes the PDF.
///
/// Column checks and all metrics run before the first chart is drawn, so a data problem
/// leaves no output behind.
pub fn generate_report(config: &ReportConfig) -> Result<ReportSummary, Error> {
    config.validate()?;
    let table = data::load(&config.input.sets, &config.input.themes)?;
    let computed = compute_sections(config, &table)?;

    if computed.iter().any(|(kind, _)| kind.figure().is_some()) {
        let files = fonts::resolve_font_files(config.analysis.fonts_dir.as_deref())
            .map_err(|err| ChartError::Font(err.to_string()))?;
        charts::install_fonts(&files)?;
    }

    let mut builder = PdfBuilder::new()
        .with_title(REPORT_TITLE)
        .with_running_title(REPORT_TITLE)
        .with_fonts_dir(config.analysis.fonts_dir.clone());
    let mut images = Vec::new();

    for (kind, data) in &computed {
        let title = kind.title(&config.analysis);
        info!("section: {}", title);

        let paragraphs = data
            .paragraphs(&config.analysis)
            .iter()
            .map(|text| RichParagraph::from_markup(text).map(Block::Paragraph))
            .collect::<Result<Vec<_>, _>>()?;
        let mut section = Section::new(title).with_blocks(paragraphs);
        if let Some(table) = data.pdf_table() {
            section = section.with_block(Block::table(table_block(&table)));
        }
        if let Some(path) = data.render(&config.output.image_dir, &config.analysis)? {
            section = section.with_block(Block::Image(
                ImageBlock::new(ImageSource::from_path(path))
                    .with_width_mm(config.output.image_width_mm),
            ));
        }
        images.extend(section.image_paths().cloned());
        builder = builder.add_section(section);
    }

    let tables = match &config.output.tables_dir {
        Some(directory) => {
            let named: Vec<NamedTable> = computed.iter().flat_map(|(_, data)| data.tables()).collect();
            export_tables(&named, directory)?
        }
        None => Vec::new(),
    };

    let pdf = builder.render_to_file(&config.output.pdf)?;
    Ok(ReportSummary {
        pdf: config.output.pdf.clone(),
        bytes: pdf.bytes.len(),
        rows: table.len(),
        sections: computed.len(),
        images,
        tables,
    })
}
