use std::ops::Range;

use plotters::prelude::*;

use super::{axis, text_font, title_font, Canvas, DrawResult};
use crate::metrics::BoxSummary;

pub(crate) struct BoxPlot<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub boxes: Vec<(String, &'a BoxSummary, RGBColor)>,
    /// Top of the value axis; the boxes' largest value when `None`.
    pub y_max: Option<f64>,
}

/// Value axis of a box plot, `0..clip` when a positive clip is given.
pub(crate) fn box_range<'a, I>(summaries: I, clip: Option<f64>) -> Range<f64>
where
    I: IntoIterator<Item = &'a BoxSummary>,
{
    match clip {
        Some(clip) if clip.is_finite() && clip > 0.0 => 0.0..clip,
        _ => axis::value_range(summaries.into_iter().map(|summary| summary.max)),
    }
}

pub(crate) fn draw_boxes(root: &Canvas<'_>, plot: &BoxPlot<'_>) -> DrawResult {
    let count = plot.boxes.len();
    let labels: Vec<String> = plot.boxes.iter().map(|(label, _, _)| label.clone()).collect();
    let label_at = |position: &f64| axis::category_label(&labels, *position);
    let y_range = box_range(plot.boxes.iter().map(|(_, summary, _)| *summary), plot.y_max);
    let top = y_range.end;

    let mut chart = ChartBuilder::on(root)
        .caption(plot.title, title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(axis::category_range(count), y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count + 1)
        .x_label_formatter(&label_at)
        .y_label_formatter(&|value| format!("{:.0}", value))
        .x_desc(plot.x_desc)
        .y_desc(plot.y_desc)
        .label_style(text_font(14.0))
        .axis_desc_style(text_font(16.0))
        .draw()?;

    for (index, (_, summary, color)) in plot.boxes.iter().enumerate() {
        let x = index as f64;
        let half = 0.3;
        let cap = half / 2.0;
        let y = |value: f64| value.min(top);

        chart.draw_series([
            Rectangle::new([(x - half, y(summary.q1)), (x + half, y(summary.q3))], color.filled()),
            Rectangle::new(
                [(x - half, y(summary.q1)), (x + half, y(summary.q3))],
                BLACK.stroke_width(1),
            ),
        ])?;
        chart.draw_series([
            PathElement::new(
                vec![(x - half, y(summary.median)), (x + half, y(summary.median))],
                BLACK.stroke_width(2),
            ),
            PathElement::new(
                vec![(x, y(summary.q3)), (x, y(summary.upper_whisker))],
                BLACK.stroke_width(1),
            ),
            PathElement::new(
                vec![(x, y(summary.q1)), (x, y(summary.lower_whisker))],
                BLACK.stroke_width(1),
            ),
        ])?;
        if summary.upper_whisker <= top {
            chart.draw_series([PathElement::new(
                vec![(x - cap, summary.upper_whisker), (x + cap, summary.upper_whisker)],
                BLACK.stroke_width(1),
            )])?;
        }
        chart.draw_series([PathElement::new(
            vec![(x - cap, y(summary.lower_whisker)), (x + cap, y(summary.lower_whisker))],
            BLACK.stroke_width(1),
        )])?;
        chart.draw_series(
            summary
                .outliers
                .iter()
                .filter(|value| **value <= top)
                .map(|value| Circle::new((x, *value), 3, BLACK.stroke_width(1))),
        )?;
    }

    Ok(())
}

/// One histogram bin, `[left, right)` except for the last bin which also holds `right`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Bin {
    pub left: f64,
    pub right: f64,
    pub count: usize,
}

/// Splits `[min, max]` of the values into `bins` equal-width bins.
pub(crate) fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite = values.iter().copied().filter(|value| value.is_finite());
    let Some((min, max)) = finite.fold(None, |bounds: Option<(f64, f64)>, value| match bounds {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    }) else {
        return Vec::new();
    };

    let bins = bins.max(1);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };
    let mut counts = vec![0usize; bins];
    for value in values.iter().filter(|value| value.is_finite()) {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| Bin {
            left: min + width * index as f64,
            right: min + width * (index + 1) as f64,
            count,
        })
        .collect()
}

/// Keeps the bins starting below `clip`, trimming the last one to end at `clip`.
pub(crate) fn clip_bins(bins: &[Bin], clip: f64) -> Vec<Bin> {
    bins.iter()
        .filter(|bin| bin.left < clip)
        .map(|bin| Bin {
            right: bin.right.min(clip),
            ..*bin
        })
        .collect()
}

pub(crate) struct Histogram<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub bins: Vec<Bin>,
    pub color: RGBColor,
}

pub(crate) fn draw_histogram(root: &Canvas<'_>, plot: &Histogram<'_>) -> DrawResult {
    let x_start = plot.bins.first().map_or(0.0, |bin| bin.left.min(0.0));
    let x_end = plot.bins.last().map_or(1.0, |bin| bin.right).max(x_start + 1.0);

    let mut chart = ChartBuilder::on(root)
        .caption(plot.title, title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            x_start..x_end,
            axis::value_range(plot.bins.iter().map(|bin| bin.count as f64)),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|value| format!("{:.0}", value))
        .y_label_formatter(&|value| format!("{:.0}", value))
        .x_desc(plot.x_desc)
        .y_desc(plot.y_desc)
        .label_style(text_font(14.0))
        .axis_desc_style(text_font(16.0))
        .draw()?;

    let color = plot.color;
    chart.draw_series(plot.bins.iter().map(|bin| {
        Rectangle::new([(bin.left, 0.0), (bin.right, bin.count as f64)], color.filled())
    }))?;
    chart.draw_series(plot.bins.iter().map(|bin| {
        Rectangle::new([(bin.left, 0.0), (bin.right, bin.count as f64)], WHITE.stroke_width(1))
    }))?;

    Ok(())
}
