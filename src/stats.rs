//! Descriptive statistics over ΔΔG samples

/// Median of the given values, averaging the two middle values for even counts.
///
/// Returns `None` for an empty sample. NaNs are ignored.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentage (0-100) of `values` strictly less than `threshold`.
///
/// An empty distribution yields 0.
pub fn percent_below(values: &[f64], threshold: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let below = values.iter().filter(|&&v| v < threshold).count();
    below as f64 / values.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN]), None);
    }

    #[test]
    fn test_median_single_and_negative() {
        assert_eq!(median(&[-1.25]), Some(-1.25));
        assert_eq!(median(&[-3.0, -1.0]), Some(-2.0));
    }

    #[test]
    fn test_percent_below_is_strict() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(percent_below(&values, 2.0), 40.0);
        assert_eq!(percent_below(&values, 0.0), 0.0);
        assert_eq!(percent_below(&values, 10.0), 100.0);
    }

    #[test]
    fn test_percent_below_empty() {
        assert_eq!(percent_below(&[], 1.0), 0.0);
    }
}
