//! PNG charts for the metric results, drawn with `plotters`.
//!
//! Every renderer takes the output directory and the metric it visualises, writes exactly
//! one PNG named after its [`Figure`] and returns the path of the written file.

mod axis;
mod bars;
mod distribution;
mod figures;
mod lines;
mod pie;
mod scatter;

use std::error::Error as StdError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use thiserror::Error;

use crate::fonts::FontFiles;

pub use axis::nice_upper_bound;
pub use figures::{
    render_complexity_trends, render_license_trend, render_licensed_share,
    render_licensed_themes, render_popularity_vs_complexity, render_sets_over_time,
    render_size_comparison, render_size_distribution, render_subthemes, render_theme_trends,
    render_themes_per_year, render_top_themes,
};

/// The charts a report can contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Figure {
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

impl Figure {
    /// Every figure in report order.
    pub const ALL: [Figure; 12] = [
        Figure::SetsOverTime,
        Figure::TopThemes,
        Figure::LicensedShare,
        Figure::LicensedThemes,
        Figure::ThemeTrends,
        Figure::LicenseTrend,
        Figure::SizeComparison,
        Figure::Subthemes,
        Figure::SizeDistribution,
        Figure::ThemesPerYear,
        Figure::ComplexityTrends,
        Figure::PopularityVsComplexity,
    ];

    /// PNG file name the figure is saved under.
    pub fn file_name(self) -> &'static str {
        match self {
            Figure::SetsOverTime => "sets_over_time.png",
            Figure::TopThemes => "top_themes.png",
            Figure::LicensedShare => "licensed_percentage.png",
            Figure::LicensedThemes => "licensed_highest.png",
            Figure::ThemeTrends => "top5_trends.png",
            Figure::LicenseTrend => "licensed_trend.png",
            Figure::SizeComparison => "boxplot_comparison.png",
            Figure::Subthemes => "subthemes_top3.png",
            Figure::SizeDistribution => "distribution_set_sizes.png",
            Figure::ThemesPerYear => "top_new_themes_year.png",
            Figure::ComplexityTrends => "set_complexity_top_themes.png",
            Figure::PopularityVsComplexity => "theme_set_complexity_corr.png",
        }
    }

    /// Path of the figure inside `directory`.
    pub fn path_in(self, directory: &Path) -> PathBuf {
        directory.join(self.file_name())
    }

    /// Canvas size in pixels.
    pub(crate) fn canvas(self) -> (u32, u32) {
        match self {
            Figure::SetsOverTime
            | Figure::LicensedThemes
            | Figure::ThemeTrends
            | Figure::SizeDistribution => (1200, 600),
            Figure::TopThemes => (1000, 400),
            Figure::LicensedShare => (700, 700),
            Figure::LicenseTrend | Figure::ComplexityTrends => (1400, 700),
            Figure::SizeComparison => (800, 600),
            Figure::Subthemes => (1600, 700),
            Figure::ThemesPerYear => (1600, 800),
            Figure::PopularityVsComplexity => (1000, 600),
        }
    }
}

/// Errors raised while rendering a chart to PNG.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to create image directory {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("chart fonts unavailable: {0}")]
    Font(String),
    #[error("failed to draw {}: {message}", path.display())]
    Draw { path: PathBuf, message: String },
}

pub(crate) type DrawResult = Result<(), Box<dyn StdError>>;

pub(crate) type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub(crate) mod palette {
    use plotters::style::RGBColor;

    pub const LINE: RGBColor = RGBColor(0x29, 0x4c, 0x60);
    pub const PIE: [RGBColor; 2] = [RGBColor(0x3a, 0x8a, 0xa5), RGBColor(0xff, 0xc4, 0x9b)];
    pub const PASTEL: [RGBColor; 10] = [
        RGBColor(0xa1, 0xc9, 0xf4),
        RGBColor(0xff, 0xb4, 0x82),
        RGBColor(0x8d, 0xe5, 0xa1),
        RGBColor(0xff, 0x9f, 0x9b),
        RGBColor(0xd0, 0xbb, 0xff),
        RGBColor(0xde, 0xbb, 0x9b),
        RGBColor(0xfa, 0xb0, 0xe4),
        RGBColor(0xcf, 0xcf, 0xcf),
        RGBColor(0xff, 0xfe, 0xa3),
        RGBColor(0xb9, 0xf2, 0xf0),
    ];
    pub const OCEAN: [RGBColor; 10] = [
        RGBColor(0x00, 0x12, 0x19),
        RGBColor(0x00, 0x5f, 0x73),
        RGBColor(0x0a, 0x93, 0x96),
        RGBColor(0x94, 0xd2, 0xbd),
        RGBColor(0xe9, 0xd8, 0xa6),
        RGBColor(0xee, 0x9b, 0x00),
        RGBColor(0xca, 0x67, 0x02),
        RGBColor(0xbb, 0x3e, 0x03),
        RGBColor(0xae, 0x20, 0x12),
        RGBColor(0x9b, 0x22, 0x26),
    ];
    pub const STACKED: [RGBColor; 2] = [RGBColor(0xee, 0x6c, 0x4d), RGBColor(0x98, 0xc1, 0xd9)];
    pub const SUBTHEMES: [RGBColor; 3] = [
        RGBColor(0x21, 0x9e, 0xbc),
        RGBColor(0x02, 0x30, 0x47),
        RGBColor(0xff, 0xb7, 0x03),
    ];
    pub const BOXES: [RGBColor; 2] = [RGBColor(0x98, 0xc1, 0xd9), RGBColor(0xee, 0x6c, 0x4d)];
    pub const HISTOGRAM: RGBColor = RGBColor(0x0f, 0x39, 0x2b);
    pub const THEMES_PER_YEAR: RGBColor = RGBColor(0x15, 0x5e, 0x8d);
    pub const TRENDS: [RGBColor; 5] = [
        RGBColor(0x8e, 0xca, 0xe6),
        RGBColor(0x21, 0x9e, 0xbc),
        RGBColor(0x02, 0x30, 0x47),
        RGBColor(0xff, 0xb7, 0x03),
        RGBColor(0xfb, 0x85, 0x00),
    ];
    pub const COOL: RGBColor = RGBColor(0x3b, 0x4c, 0xc0);
    pub const WARM: RGBColor = RGBColor(0xb4, 0x04, 0x26);

    /// Picks a colour by position, wrapping around the palette.
    pub fn cycle(colors: &[RGBColor], index: usize) -> RGBColor {
        colors[index % colors.len()]
    }

    /// Linear blend between two colours, `t` in `[0, 1]`.
    pub fn blend(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
    }
}

static CHART_FONTS: OnceLock<Result<(), String>> = OnceLock::new();

/// Registers the regular and bold faces with the `plotters` text renderer.
///
/// Only the first call does any work; later calls report the outcome of the first one.
pub fn install_fonts(files: &FontFiles) -> Result<(), ChartError> {
    CHART_FONTS
        .get_or_init(|| register_fonts(files))
        .clone()
        .map_err(ChartError::Font)
}

fn register_fonts(files: &FontFiles) -> Result<(), String> {
    for (style, path) in [
        (FontStyle::Normal, &files.regular),
        (FontStyle::Bold, &files.bold),
    ] {
        let bytes = fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        plotters::style::register_font("sans-serif", style, bytes)
            .map_err(|_| format!("{} is not a usable font", path.display()))?;
    }
    debug!("registered chart font family {}", files.family);
    Ok(())
}

pub(crate) fn title_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, 24.0, FontStyle::Bold)
}

pub(crate) fn text_font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

/// Creates the image directory and returns the output path of `figure`.
pub(crate) fn prepare(directory: &Path, figure: Figure) -> Result<PathBuf, ChartError> {
    fs::create_dir_all(directory).map_err(|source| ChartError::Directory {
        path: directory.to_path_buf(),
        source,
    })?;
    Ok(figure.path_in(directory))
}

/// Runs a drawing routine against a fresh white canvas for `figure`.
pub(crate) fn draw_figure<F>(directory: &Path, figure: Figure, draw: F) -> Result<PathBuf, ChartError>
where
    F: FnOnce(&Canvas<'_>) -> DrawResult,
{
    let path = prepare(directory, figure)?;
    let result = (|| -> DrawResult {
        let root = BitMapBackend::new(&path, figure.canvas()).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            debug!("wrote {}", path.display());
            Ok(path)
        }
        Err(err) => Err(ChartError::Draw {
            message: err.to_string(),
            path,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_file_names_are_unique() {
        let mut names: Vec<_> = Figure::ALL.iter().map(|figure| figure.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Figure::ALL.len());
    }

    #[test]
    fn blend_interpolates_channels() {
        let mid = palette::blend(RGBColor(0, 0, 0), RGBColor(200, 100, 50), 0.5);
        assert_eq!((mid.0, mid.1, mid.2), (100, 50, 25));
        let clamped = palette::blend(RGBColor(0, 0, 0), RGBColor(10, 10, 10), 3.0);
        assert_eq!((clamped.0, clamped.1, clamped.2), (10, 10, 10));
    }
}
