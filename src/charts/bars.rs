use plotters::prelude::*;

use super::{axis, text_font, title_font, Canvas, DrawResult};

/// Vertical bars, one per named category.
pub(crate) struct CategoryBars<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: &'a [RGBColor],
    pub label_chars: usize,
}

pub(crate) fn draw_category_bars(root: &Canvas<'_>, plot: &CategoryBars<'_>) -> DrawResult {
    let count = plot.labels.len();
    let short: Vec<String> = plot
        .labels
        .iter()
        .map(|label| axis::shorten(label, plot.label_chars))
        .collect();
    let label_at = |position: &f64| axis::category_label(&short, *position);

    let mut chart = ChartBuilder::on(root)
        .caption(plot.title, title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            axis::category_range(count),
            axis::value_range(plot.values.iter().copied()),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count + 1)
        .x_label_formatter(&label_at)
        .y_label_formatter(&|value| format!("{:.0}", value))
        .x_desc(plot.x_desc)
        .y_desc(plot.y_desc)
        .label_style(text_font(13.0))
        .axis_desc_style(text_font(16.0))
        .draw()?;

    chart.draw_series(plot.values.iter().enumerate().map(|(index, value)| {
        let center = index as f64;
        let color = super::palette::cycle(plot.colors, index);
        Rectangle::new([(center - 0.4, 0.0), (center + 0.4, *value)], color.filled())
    }))?;

    Ok(())
}

/// One layer of a stacked year chart.
pub(crate) struct Stack {
    pub label: String,
    pub color: RGBColor,
    pub values: Vec<f64>,
}

/// Bars per year; several stacks are drawn on top of each other.
pub(crate) struct YearBars<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub years: Vec<i32>,
    pub stacks: Vec<Stack>,
}

pub(crate) fn draw_year_bars(root: &Canvas<'_>, plot: &YearBars<'_>) -> DrawResult {
    let totals: Vec<f64> = (0..plot.years.len())
        .map(|index| {
            plot.stacks
                .iter()
                .filter_map(|stack| stack.values.get(index))
                .sum()
        })
        .collect();
    let x_range = axis::year_range(plot.years.iter().copied());

    let mut chart = ChartBuilder::on(root)
        .caption(plot.title, title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), axis::value_range(totals))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(axis::year_label_count(&x_range))
        .x_label_formatter(&axis::year_label)
        .y_label_formatter(&|value| format!("{:.0}", value))
        .x_desc(plot.x_desc)
        .y_desc(plot.y_desc)
        .label_style(text_font(14.0))
        .axis_desc_style(text_font(16.0))
        .draw()?;

    let mut base = vec![0.0; plot.years.len()];
    for stack in &plot.stacks {
        let color = stack.color;
        let bars: Vec<Rectangle<(f64, f64)>> = plot
            .years
            .iter()
            .zip(base.iter_mut())
            .zip(stack.values.iter())
            .map(|((year, bottom), value)| {
                let x = f64::from(*year);
                let top = *bottom + value;
                let bar = Rectangle::new([(x - 0.4, *bottom), (x + 0.4, top)], color.filled());
                *bottom = top;
                bar
            })
            .collect();

        chart
            .draw_series(bars)?
            .label(stack.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x - 6, y - 6), (x + 6, y + 6)], color.filled()));
    }

    if plot.stacks.len() > 1 {
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

/// One horizontal bar belonging to a colour group.
pub(crate) struct GroupedBar {
    pub label: String,
    pub value: f64,
    pub group: usize,
}

/// Horizontal bars coloured by group, listed top to bottom in input order.
pub(crate) struct GroupedBars<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub groups: Vec<(String, RGBColor)>,
    pub bars: Vec<GroupedBar>,
}

pub(crate) fn draw_grouped_hbars(root: &Canvas<'_>, plot: &GroupedBars<'_>) -> DrawResult {
    let count = plot.bars.len();
    // The first bar sits at the top, so categories are laid out in reverse.
    let labels: Vec<String> = plot
        .bars
        .iter()
        .rev()
        .map(|bar| axis::shorten(&bar.label, 34))
        .collect();
    let label_at = |position: &f64| axis::category_label(&labels, *position);

    let mut chart = ChartBuilder::on(root)
        .caption(plot.title, title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(280)
        .build_cartesian_2d(
            axis::value_range(plot.bars.iter().map(|bar| bar.value)),
            axis::category_range(count),
        )?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(count + 1)
        .y_label_formatter(&label_at)
        .x_label_formatter(&|value| format!("{:.0}", value))
        .x_desc(plot.x_desc)
        .label_style(text_font(12.0))
        .axis_desc_style(text_font(16.0))
        .draw()?;

    for (group, (name, color)) in plot.groups.iter().enumerate() {
        let color = *color;
        let bars: Vec<Rectangle<(f64, f64)>> = plot
            .bars
            .iter()
            .enumerate()
            .filter(|(_, bar)| bar.group == group)
            .map(|(index, bar)| {
                let center = (count - 1 - index) as f64;
                Rectangle::new([(0.0, center - 0.4), (bar.value, center + 0.4)], color.filled())
            })
            .collect();

        chart
            .draw_series(bars)?
            .label(name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x - 6, y - 6), (x + 6, y + 6)], color.filled()));
    }

    if !plot.groups.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(text_font(14.0))
            .draw()?;
    }

    Ok(())
}
