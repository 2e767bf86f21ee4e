use plotters::prelude::*;

use super::{axis, text_font, title_font, Canvas, DrawResult};

/// One named polyline over years.
pub(crate) struct Line {
    pub label: Option<String>,
    pub color: RGBColor,
    pub points: Vec<(i32, f64)>,
}

pub(crate) struct LineChart<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub lines: Vec<Line>,
    pub markers: bool,
}

pub(crate) fn draw_lines(root: &Canvas<'_>, plot: &LineChart<'_>) -> DrawResult {
    let x_range = axis::year_range(
        plot.lines
            .iter()
            .flat_map(|line| line.points.iter().map(|(year, _)| *year)),
    );
    let y_range = axis::value_range(
        plot.lines
            .iter()
            .flat_map(|line| line.points.iter().map(|(_, value)| *value)),
    );

    let mut chart = ChartBuilder::on(root)
        .caption(plot.title, title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), y_range)?;

    chart
        .configure_mesh()
        .x_labels(axis::year_label_count(&x_range))
        .x_label_formatter(&axis::year_label)
        .y_label_formatter(&|value| format!("{:.0}", value))
        .x_desc(plot.x_desc)
        .y_desc(plot.y_desc)
        .label_style(text_font(14.0))
        .axis_desc_style(text_font(16.0))
        .draw()?;

    for line in &plot.lines {
        let color = line.color;
        let points: Vec<(f64, f64)> = line
            .points
            .iter()
            .map(|(year, value)| (f64::from(*year), *value))
            .collect();

        let series = chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?;
        if let Some(label) = &line.label {
            series
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        if plot.markers {
            chart.draw_series(
                points
                    .iter()
                    .map(|point| Circle::new(*point, 3, color.filled())),
            )?;
        }
    }

    if plot.lines.iter().any(|line| line.label.is_some()) {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(text_font(14.0))
            .draw()?;
    }

    Ok(())
}
