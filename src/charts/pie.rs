use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{text_font, title_font, Canvas, DrawResult};

pub(crate) struct Slice {
    pub label: String,
    pub value: f64,
    pub color: RGBColor,
}

/// Pie drawn from the top, counter-clockwise, with name labels outside and percentages inside.
pub(crate) fn draw_pie(root: &Canvas<'_>, title: &str, slices: &[Slice]) -> DrawResult {
    let area = root.titled(title, title_font())?;
    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.32;

    let total: f64 = slices.iter().map(|slice| slice.value.max(0.0)).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let centered = TextStyle::from(text_font(16.0)).pos(Pos::new(HPos::Center, VPos::Center));
    let mut start = 90.0_f64;
    for slice in slices {
        let sweep = slice.value.max(0.0) / total * 360.0;
        if sweep <= 0.0 {
            continue;
        }

        let steps = sweep.ceil() as usize;
        let mut outline = vec![center];
        outline.extend(
            (0..=steps).map(|step| point_at(center, radius, start + sweep * step as f64 / steps as f64)),
        );
        area.draw(&Polygon::new(outline, slice.color.filled()))?;

        let middle = start + sweep / 2.0;
        area.draw(&Text::new(
            slice.label.clone(),
            point_at(center, radius * 1.2, middle),
            centered.clone(),
        ))?;
        area.draw(&Text::new(
            format!("{:.1}%", sweep / 3.6),
            point_at(center, radius * 0.6, middle),
            centered.clone(),
        ))?;
        start += sweep;
    }

    Ok(())
}

fn point_at(center: (i32, i32), radius: f64, degrees: f64) -> (i32, i32) {
    let radians = degrees.to_radians();
    (
        center.0 + (radius * radians.cos()).round() as i32,
        center.1 - (radius * radians.sin()).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_start_at_the_top_and_turn_left() {
        assert_eq!(point_at((100, 100), 10.0, 90.0), (100, 90));
        assert_eq!(point_at((100, 100), 10.0, 180.0), (90, 100));
    }
}
