use std::ops::Range;

/// Smallest "nice" number (1, 2, 2.5 or 5 times a power of ten) that is at least `max`.
///
/// Non-positive or non-finite input yields `1.0` so empty charts still get a usable axis.
pub fn nice_upper_bound(max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .map(|step| step * magnitude)
        .find(|candidate| *candidate >= max)
        .unwrap_or(10.0 * magnitude)
}

/// Value axis starting at zero with a little headroom above the largest value.
pub(crate) fn value_range<I>(values: I) -> Range<f64>
where
    I: IntoIterator<Item = f64>,
{
    let max = values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(0.0, f64::max);
    0.0..nice_upper_bound(max * 1.05)
}

/// Year axis padded by one year on each side.
pub(crate) fn year_range<I>(years: I) -> Range<f64>
where
    I: IntoIterator<Item = i32>,
{
    let (min, max) = years
        .into_iter()
        .fold(None, |bounds: Option<(i32, i32)>, year| match bounds {
            None => Some((year, year)),
            Some((min, max)) => Some((min.min(year), max.max(year))),
        })
        .unwrap_or((0, 0));
    f64::from(min) - 1.0..f64::from(max) + 1.0
}

/// Number of year labels that keeps the axis readable.
pub(crate) fn year_label_count(range: &Range<f64>) -> usize {
    let span = (range.end - range.start).max(1.0) as usize;
    span.clamp(2, 16)
}

/// Axis for `count` categories centred on the integers `0..count`.
pub(crate) fn category_range(count: usize) -> Range<f64> {
    -0.5..count.max(1) as f64 - 0.5
}

/// Label for a categorical tick, empty between categories.
pub(crate) fn category_label(labels: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Shortens long labels so they fit under a bar.
pub(crate) fn shorten(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

/// Formats a year tick without decimals.
pub(crate) fn year_label(value: &f64) -> String {
    if (value - value.round()).abs() > 1e-6 {
        return String::new();
    }
    format!("{:.0}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_bounds_round_up_to_friendly_steps() {
        assert_eq!(nice_upper_bound(0.0), 1.0);
        assert_eq!(nice_upper_bound(f64::NAN), 1.0);
        assert_eq!(nice_upper_bound(7.0), 10.0);
        assert_eq!(nice_upper_bound(11.0), 20.0);
        assert_eq!(nice_upper_bound(21.0), 25.0);
        assert_eq!(nice_upper_bound(26.0), 50.0);
        assert_eq!(nice_upper_bound(100.0), 100.0);
    }

    #[test]
    fn year_range_pads_both_ends() {
        assert_eq!(year_range([1999, 1980, 2021]), 1979.0..2022.0);
        assert_eq!(year_range(std::iter::empty()), -1.0..1.0);
    }

    #[test]
    fn category_labels_only_on_integer_ticks() {
        let labels = vec!["Town".to_string(), "Space".to_string()];
        assert_eq!(category_label(&labels, 1.0), "Space");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(shorten("Town", 10), "Town");
        assert_eq!(shorten("Collectible Minifigures", 12), "Collectible…");
    }
}
