use std::path::{Path, PathBuf};

use super::bars::{self, CategoryBars, GroupedBar, GroupedBars, Stack, YearBars};
use super::distribution::{self, BoxPlot, Histogram};
use super::lines::{self, Line, LineChart};
use super::pie::{self, Slice};
use super::scatter::{self, Bubble, BubbleChart};
use super::{draw_figure, palette, ChartError, Figure};
use crate::metrics::stats::quantile;
use crate::metrics::{
    LicenseSplit, LicenseYear, SizeDistribution, SizeGroup, SubthemeCount, ThemeComplexity,
    ThemeCount, ThemeSeries, ThemeYear, YearCount,
};

const LICENSED: &str = "Licensed";
const NOT_LICENSED: &str = "Non-Licensed";

/// Line chart of the number of sets released per year.
pub fn render_sets_over_time(directory: &Path, years: &[YearCount]) -> Result<PathBuf, ChartError> {
    let plot = LineChart {
        title: "Number of LEGO Sets Released Over Time",
        x_desc: "Year",
        y_desc: "Number of Sets",
        lines: vec![Line {
            label: None,
            color: palette::LINE,
            points: years
                .iter()
                .map(|year| (year.year, year.count as f64))
                .collect(),
        }],
        markers: true,
    };
    draw_figure(directory, Figure::SetsOverTime, |root| lines::draw_lines(root, &plot))
}

/// Bar chart of the most common parent themes.
pub fn render_top_themes(directory: &Path, themes: &[ThemeCount]) -> Result<PathBuf, ChartError> {
    let plot = CategoryBars {
        title: "Most Common Parent Themes",
        x_desc: "Parent Theme",
        y_desc: "Number of Sets",
        labels: themes.iter().map(|theme| theme.theme.clone()).collect(),
        values: themes.iter().map(|theme| theme.sets as f64).collect(),
        colors: &palette::PASTEL,
        label_chars: 22,
    };
    draw_figure(directory, Figure::TopThemes, |root| bars::draw_category_bars(root, &plot))
}

/// Pie chart of licensed against non-licensed sets.
pub fn render_licensed_share(directory: &Path, split: &LicenseSplit) -> Result<PathBuf, ChartError> {
    let slices = [
        Slice {
            label: LICENSED.to_string(),
            value: split.licensed as f64,
            color: palette::PIE[0],
        },
        Slice {
            label: NOT_LICENSED.to_string(),
            value: split.unlicensed as f64,
            color: palette::PIE[1],
        },
    ];
    draw_figure(directory, Figure::LicensedShare, |root| {
        pie::draw_pie(root, "Licensed vs Non-Licensed LEGO Sets", &slices)
    })
}

/// Bar chart of the licensed themes with the most sets.
pub fn render_licensed_themes(directory: &Path, themes: &[ThemeCount]) -> Result<PathBuf, ChartError> {
    let plot = CategoryBars {
        title: "Licensed Themes with the Most Sets",
        x_desc: "Theme",
        y_desc: "Number of Sets",
        labels: themes.iter().map(|theme| theme.theme.clone()).collect(),
        values: themes.iter().map(|theme| theme.sets as f64).collect(),
        colors: &palette::OCEAN,
        label_chars: 14,
    };
    draw_figure(directory, Figure::LicensedThemes, |root| bars::draw_category_bars(root, &plot))
}

/// One line per top theme with its yearly set count.
pub fn render_theme_trends(directory: &Path, series: &[ThemeSeries<usize>]) -> Result<PathBuf, ChartError> {
    let plot = LineChart {
        title: "Set Count Trends for Top Themes",
        x_desc: "Year",
        y_desc: "Number of Sets",
        lines: series
            .iter()
            .enumerate()
            .map(|(index, theme)| Line {
                label: Some(theme.theme.clone()),
                color: palette::cycle(&palette::OCEAN, index * 2 + 1),
                points: theme
                    .points
                    .iter()
                    .map(|(year, sets)| (*year, *sets as f64))
                    .collect(),
            })
            .collect(),
        markers: true,
    };
    draw_figure(directory, Figure::ThemeTrends, |root| lines::draw_lines(root, &plot))
}

/// Stacked bars of licensed and non-licensed sets per year.
pub fn render_license_trend(directory: &Path, years: &[LicenseYear]) -> Result<PathBuf, ChartError> {
    let plot = YearBars {
        title: "Licensed vs Non-Licensed Sets Over Time",
        x_desc: "Year",
        y_desc: "Number of Sets",
        years: years.iter().map(|year| year.year).collect(),
        stacks: vec![
            Stack {
                label: LICENSED.to_string(),
                color: palette::STACKED[0],
                values: years.iter().map(|year| year.licensed as f64).collect(),
            },
            Stack {
                label: NOT_LICENSED.to_string(),
                color: palette::STACKED[1],
                values: years.iter().map(|year| year.unlicensed as f64).collect(),
            },
        ],
    };
    draw_figure(directory, Figure::LicenseTrend, |root| bars::draw_year_bars(root, &plot))
}

/// Part count at `clip_quantile` over every set in the groups.
fn size_clip(groups: &[SizeGroup], clip_quantile: f64) -> Option<f64> {
    let parts: Vec<f64> = groups
        .iter()
        .flat_map(|group| group.parts.iter().copied())
        .collect();
    quantile(&parts, clip_quantile)
}

/// Box plot of part counts for non-licensed and licensed sets, `y` cut at `clip_quantile`.
pub fn render_size_comparison(
    directory: &Path,
    groups: &[SizeGroup],
    clip_quantile: f64,
) -> Result<PathBuf, ChartError> {
    let plot = BoxPlot {
        title: "Set Size: Licensed vs Non-Licensed",
        x_desc: "Set Type",
        y_desc: "Number of Parts",
        boxes: groups
            .iter()
            .map(|group| {
                let (label, color) = if group.licensed {
                    (LICENSED, palette::BOXES[1])
                } else {
                    (NOT_LICENSED, palette::BOXES[0])
                };
                (label.to_string(), &group.summary, color)
            })
            .collect(),
        y_max: size_clip(groups, clip_quantile),
    };
    draw_figure(directory, Figure::SizeComparison, |root| distribution::draw_boxes(root, &plot))
}

/// Horizontal bars of sub-theme counts, coloured by parent theme.
pub fn render_subthemes(directory: &Path, counts: &[SubthemeCount]) -> Result<PathBuf, ChartError> {
    let mut parents: Vec<&str> = Vec::new();
    for count in counts {
        if !parents.contains(&count.parent_theme.as_str()) {
            parents.push(&count.parent_theme);
        }
    }

    let plot = GroupedBars {
        title: "Sub-themes in the Top Parent Themes",
        x_desc: "Number of Sets",
        groups: parents
            .iter()
            .enumerate()
            .map(|(index, parent)| (parent.to_string(), palette::cycle(&palette::SUBTHEMES, index)))
            .collect(),
        bars: counts
            .iter()
            .map(|count| GroupedBar {
                label: count.theme_name.clone(),
                value: count.sets as f64,
                group: parents
                    .iter()
                    .position(|parent| *parent == count.parent_theme)
                    .unwrap_or_default(),
            })
            .collect(),
    };
    draw_figure(directory, Figure::Subthemes, |root| bars::draw_grouped_hbars(root, &plot))
}

/// Histogram of part counts with the x axis cut at `clip_quantile`.
pub fn render_size_distribution(
    directory: &Path,
    distribution: &SizeDistribution<'_>,
    bins: usize,
    clip_quantile: f64,
) -> Result<PathBuf, ChartError> {
    let parts = distribution.parts();
    let all_bins = distribution::histogram(&parts, bins);
    let clipped = match quantile(&parts, clip_quantile) {
        Some(clip) if clip > 0.0 => distribution::clip_bins(&all_bins, clip),
        _ => all_bins,
    };

    let plot = Histogram {
        title: "Distribution of Set Sizes",
        x_desc: "Number of Parts",
        y_desc: "Number of Sets",
        bins: clipped,
        color: palette::HISTOGRAM,
    };
    draw_figure(directory, Figure::SizeDistribution, |root| {
        distribution::draw_histogram(root, &plot)
    })
}

/// Bars of the number of distinct themes with releases per year.
pub fn render_themes_per_year(directory: &Path, years: &[ThemeYear]) -> Result<PathBuf, ChartError> {
    let plot = YearBars {
        title: "Number of Themes Released per Year",
        x_desc: "Year",
        y_desc: "Number of Themes",
        years: years.iter().map(|year| year.year).collect(),
        stacks: vec![Stack {
            label: "Themes".to_string(),
            color: palette::THEMES_PER_YEAR,
            values: years.iter().map(|year| year.themes as f64).collect(),
        }],
    };
    draw_figure(directory, Figure::ThemesPerYear, |root| bars::draw_year_bars(root, &plot))
}

/// One line per top theme with its yearly average part count.
pub fn render_complexity_trends(directory: &Path, series: &[ThemeSeries<f64>]) -> Result<PathBuf, ChartError> {
    let plot = LineChart {
        title: "Average Number of Parts for the Top Themes Over Time",
        x_desc: "Year",
        y_desc: "Average Number of Parts",
        lines: series
            .iter()
            .enumerate()
            .map(|(index, theme)| Line {
                label: Some(theme.theme.clone()),
                color: palette::cycle(&palette::TRENDS, index),
                points: theme.points.clone(),
            })
            .collect(),
        markers: true,
    };
    draw_figure(directory, Figure::ComplexityTrends, |root| lines::draw_lines(root, &plot))
}

/// Scatter of theme size against average part count, `y` cut at `clip_quantile`.
pub fn render_popularity_vs_complexity(
    directory: &Path,
    stats: &[ThemeComplexity],
    clip_quantile: f64,
) -> Result<PathBuf, ChartError> {
    let averages: Vec<f64> = stats.iter().filter_map(|theme| theme.avg_parts).collect();
    let y_max = quantile(&averages, clip_quantile).unwrap_or(0.0);

    let plot = BubbleChart {
        title: "Theme Popularity vs. Set Complexity",
        x_desc: "Total Number of Sets",
        y_desc: "Average Number of Parts",
        points: stats
            .iter()
            .filter_map(|theme| {
                let avg_parts = theme.avg_parts?;
                (avg_parts <= y_max).then(|| Bubble {
                    x: theme.total_sets as f64,
                    y: avg_parts,
                    weight: theme.total_sets as f64,
                })
            })
            .collect(),
        y_max,
    };
    draw_figure(directory, Figure::PopularityVsComplexity, |root| {
        scatter::draw_bubbles(root, &plot)
    })
}
