use plotters::prelude::*;

use super::{axis, palette, text_font, title_font, Canvas, DrawResult};

/// Scatter point whose marker grows and warms with `weight`.
pub(crate) struct Bubble {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

pub(crate) struct BubbleChart<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub points: Vec<Bubble>,
    pub y_max: f64,
}

pub(crate) fn draw_bubbles(root: &Canvas<'_>, plot: &BubbleChart<'_>) -> DrawResult {
    let max_weight = plot
        .points
        .iter()
        .map(|point| point.weight)
        .fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(plot.title, title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            axis::value_range(plot.points.iter().map(|point| point.x)),
            0.0..axis::nice_upper_bound(plot.y_max),
        )?;

    chart
        .configure_mesh()
        .x_label_formatter(&|value| format!("{:.0}", value))
        .y_label_formatter(&|value| format!("{:.0}", value))
        .x_desc(plot.x_desc)
        .y_desc(plot.y_desc)
        .label_style(text_font(14.0))
        .axis_desc_style(text_font(16.0))
        .draw()?;

    chart.draw_series(plot.points.iter().map(|point| {
        let share = if max_weight > 0.0 {
            point.weight / max_weight
        } else {
            0.0
        };
        let radius = 3 + (12.0 * share.sqrt()).round() as i32;
        let color = palette::blend(palette::COOL, palette::WARM, share);
        Circle::new((point.x, point.y), radius, color.mix(0.7).filled())
    }))?;

    Ok(())
}
