//! Fixed-domain frequency histograms of ΔΔG values

use serde::Serialize;

/// Lower bound of the ΔΔG axis (kcal/mol)
pub const DDG_MIN: f64 = -10.0;
/// Upper bound of the ΔΔG axis (kcal/mol)
pub const DDG_MAX: f64 = 100.0;
/// Bin count for the whole-gene distribution
pub const GENE_BINS: usize = 1000;
/// Bin count for the single-variant distribution
pub const VARIANT_BINS: usize = 20;

/// Vertical reference line drawn at a given x value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub x: f64,
    pub label: String,
}

impl Marker {
    /// Marker for the variant median, labelled to two decimal places
    pub fn median(value: f64) -> Self {
        Self {
            x: value,
            label: format!("Variant median: {:.2} kcal/mol", value),
        }
    }
}

/// Equal-width histogram over `[min, max]`
///
/// The upper edge belongs to the last bin. Values outside the domain are
/// tallied in `underflow` / `overflow` and never binned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub title: String,
    pub min: f64,
    pub max: f64,
    pub counts: Vec<u64>,
    pub underflow: u64,
    pub overflow: u64,
    pub marker: Option<Marker>,
}

impl Histogram {
    /// Create an empty histogram with `bins` equal-width bins
    pub fn empty(title: impl Into<String>, min: f64, max: f64, bins: usize) -> Self {
        Self {
            title: title.into(),
            min,
            max,
            counts: vec![0; bins.max(1)],
            underflow: 0,
            overflow: 0,
            marker: None,
        }
    }

    /// Build a histogram from a sample
    pub fn from_values(
        title: impl Into<String>,
        min: f64,
        max: f64,
        bins: usize,
        values: &[f64],
    ) -> Self {
        let mut hist = Self::empty(title, min, max, bins);
        for &value in values {
            hist.add(value);
        }
        hist
    }

    pub fn with_marker(mut self, marker: Option<Marker>) -> Self {
        self.marker = marker;
        self
    }

    /// Add one observation. Non-finite values are ignored.
    pub fn add(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.min {
            self.underflow += 1;
        } else if value > self.max {
            self.overflow += 1;
        } else if let Some(idx) = self.bin_index(value) {
            self.counts[idx] += 1;
        }
    }

    fn bin_index(&self, value: f64) -> Option<usize> {
        let bins = self.counts.len();
        let span = self.max - self.min;
        if span <= 0.0 {
            return None;
        }
        let idx = ((value - self.min) / span * bins as f64).floor() as usize;
        Some(idx.min(bins - 1))
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// Lower edge of bin `idx`
    pub fn bin_start(&self, idx: usize) -> f64 {
        self.min + idx as f64 * self.bin_width()
    }

    /// Number of observations inside the domain
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Merge adjacent bins so that at most `columns` remain, for display
    pub fn rebin(&self, columns: usize) -> Vec<u64> {
        let columns = columns.max(1);
        let bins = self.counts.len();
        if bins <= columns {
            return self.counts.clone();
        }
        let mut merged = vec![0u64; columns];
        for (idx, count) in self.counts.iter().enumerate() {
            merged[idx * columns / bins] += count;
        }
        merged
    }

    /// Position of the marker when the domain is drawn over `columns` cells
    pub fn marker_column(&self, columns: usize) -> Option<usize> {
        let marker = self.marker.as_ref()?;
        if columns == 0 || marker.x < self.min || marker.x > self.max {
            return None;
        }
        let col = ((marker.x - self.min) / (self.max - self.min) * columns as f64).floor() as usize;
        Some(col.min(columns - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_histogram_keeps_domain() {
        let hist = Histogram::from_values("gene", DDG_MIN, DDG_MAX, GENE_BINS, &[]);
        assert_eq!(hist.bin_count(), 1000);
        assert_eq!(hist.min, -10.0);
        assert_eq!(hist.max, 100.0);
        assert!(hist.is_empty());
        assert!(hist.marker.is_none());
    }

    #[test]
    fn test_bin_assignment() {
        let hist = Histogram::from_values(
            "variant",
            DDG_MIN,
            DDG_MAX,
            VARIANT_BINS,
            &[-10.0, -4.0, 0.0, 100.0],
        );
        // width is 5.5
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[1], 2);
        assert_eq!(hist.counts[19], 1);
        assert_eq!(hist.total(), 4);
    }

    #[test]
    fn test_out_of_domain_and_non_finite() {
        let hist = Histogram::from_values(
            "variant",
            DDG_MIN,
            DDG_MAX,
            VARIANT_BINS,
            &[-10.5, 150.0, f64::NAN, f64::INFINITY, 1.0],
        );
        assert_eq!(hist.underflow, 1);
        assert_eq!(hist.overflow, 1);
        assert_eq!(hist.total(), 1);
    }

    #[test]
    fn test_deterministic() {
        let values: Vec<f64> = (0..500).map(|i| (i as f64 * 0.37) % 40.0 - 5.0).collect();
        let a = Histogram::from_values("g", DDG_MIN, DDG_MAX, GENE_BINS, &values);
        let b = Histogram::from_values("g", DDG_MIN, DDG_MAX, GENE_BINS, &values);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rebin_preserves_total() {
        let values = [-9.0, 0.5, 0.6, 12.0, 99.9];
        let hist = Histogram::from_values("g", DDG_MIN, DDG_MAX, GENE_BINS, &values);
        let merged = hist.rebin(60);
        assert_eq!(merged.len(), 60);
        assert_eq!(merged.iter().sum::<u64>(), 5);
        assert_eq!(hist.rebin(2000).len(), 1000);
    }

    #[test]
    fn test_median_marker() {
        let hist = Histogram::empty("g", DDG_MIN, DDG_MAX, GENE_BINS)
            .with_marker(Some(Marker::median(0.6)));
        let marker = hist.marker.as_ref().unwrap();
        assert_eq!(marker.label, "Variant median: 0.60 kcal/mol");
        assert_eq!(hist.marker_column(110), Some(10));
    }
}
