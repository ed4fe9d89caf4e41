//! Variant lookup and statistics engine
//!
//! Resolves a gene to its structures, answers the cascading selector
//! queries from the catalogue, and summarizes ΔΔG values from the fact
//! store: variant median, percentile within the gene, two histograms and
//! an interpretive text.

use anyhow::Result;
use log::debug;
use serde::Serialize;

use crate::catalog::{Catalogue, DropdownOption};
use crate::histogram::{Histogram, Marker, DDG_MAX, DDG_MIN, GENE_BINS, VARIANT_BINS};
use crate::stats::{median, percent_below};
use crate::store::{DdgStore, Variant};
use crate::summary::summary_text;

pub const EMPTY_GENE_TITLE: &str = "Histogram of ΔΔG values for selected gene";
pub const VARIANT_TITLE: &str = "Histogram of ΔΔG values for selected variant";

/// Current state of the four selectors; any of them may be unset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub gene: Option<String>,
    pub residue: Option<i64>,
    pub mut_from: Option<String>,
    pub mut_to: Option<String>,
}

impl Selection {
    pub fn new(gene: &str, residue: i64, mut_from: &str, mut_to: &str) -> Self {
        Self {
            gene: Some(gene.to_string()),
            residue: Some(residue),
            mut_from: Some(mut_from.to_string()),
            mut_to: Some(mut_to.to_string()),
        }
    }

    /// Gene and variant, when every selector holds a value
    pub fn complete(&self) -> Option<(&str, Variant)> {
        let gene = self.gene.as_deref().filter(|g| !g.is_empty())?;
        let residue = self.residue?;
        let mut_from = self.mut_from.as_deref().filter(|m| !m.is_empty())?;
        let mut_to = self.mut_to.as_deref().filter(|m| !m.is_empty())?;
        Some((gene, Variant::new(residue, mut_from, mut_to)))
    }
}

/// Everything the dashboard shows for one selection
#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub gene: Option<String>,
    pub variant: Option<Variant>,
    pub structures: Vec<String>,
    pub median: Option<f64>,
    pub percentile: Option<f64>,
    pub gene_histogram: Histogram,
    pub variant_histogram: Histogram,
    pub text: Option<String>,
}

impl VariantReport {
    /// Report for an incomplete selection: empty histograms, no text
    pub fn empty() -> Self {
        Self {
            gene: None,
            variant: None,
            structures: Vec::new(),
            median: None,
            percentile: None,
            gene_histogram: Histogram::empty(EMPTY_GENE_TITLE, DDG_MIN, DDG_MAX, GENE_BINS),
            variant_histogram: Histogram::empty(VARIANT_TITLE, DDG_MIN, DDG_MAX, VARIANT_BINS),
            text: None,
        }
    }
}

fn gene_title(gene: &str) -> String {
    format!("Histogram of ΔΔG values for {}", gene)
}

/// Lookup engine over a static catalogue and a read-only fact store
pub struct VariantEngine<S> {
    catalogue: Catalogue,
    store: S,
}

impl<S: DdgStore> VariantEngine<S> {
    pub fn new(catalogue: Catalogue, store: S) -> Self {
        Self { catalogue, store }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn gene_options(&self) -> Vec<DropdownOption<String>> {
        self.catalogue.gene_options()
    }

    /// Structure ids for a gene, deduplicated in first-seen order; unknown genes yield none
    pub fn structures_for_gene(&self, gene: &str) -> Vec<String> {
        self.catalogue.structures_for_gene(gene)
    }

    pub fn residue_options(&self, gene: Option<&str>) -> Vec<DropdownOption<i64>> {
        self.catalogue.residue_options(gene)
    }

    pub fn mut_from_options(
        &self,
        gene: Option<&str>,
        residue: Option<i64>,
    ) -> Vec<DropdownOption<String>> {
        self.catalogue.mut_from_options(gene, residue)
    }

    pub fn mut_to_options(
        &self,
        gene: Option<&str>,
        residue: Option<i64>,
        mut_from: Option<&str>,
    ) -> Vec<DropdownOption<String>> {
        self.catalogue.mut_to_options(gene, residue, mut_from)
    }

    /// Median ΔΔG of a variant across structures.
    ///
    /// `None` when either amino acid is unset or no rows match.
    pub fn variant_median(
        &self,
        pdbs: &[String],
        residue: i64,
        mut_from: Option<&str>,
        mut_to: Option<&str>,
    ) -> Result<Option<f64>> {
        let (Some(mut_from), Some(mut_to)) = (mut_from, mut_to) else {
            return Ok(None);
        };
        let values = self
            .store
            .variant_values(pdbs, &Variant::new(residue, mut_from, mut_to))?;
        Ok(median(&values))
    }

    /// Percentage of the whole gene's ΔΔG values strictly below the variant median.
    ///
    /// Returns 0 when the variant has no rows (unlike the median, which is `None`).
    pub fn variant_percentile(
        &self,
        pdbs: &[String],
        residue: i64,
        mut_from: Option<&str>,
        mut_to: Option<&str>,
    ) -> Result<f64> {
        let all = self.store.gene_values(pdbs)?;
        let variant_median = self.variant_median(pdbs, residue, mut_from, mut_to)?;
        Ok(variant_median
            .map(|m| percent_below(&all, m))
            .unwrap_or(0.0))
    }

    /// 1000-bin histogram of every ΔΔG value for the structures, marked at the median
    pub fn gene_histogram(
        &self,
        gene: &str,
        pdbs: &[String],
        variant_median: Option<f64>,
    ) -> Result<Histogram> {
        let values = self.store.gene_values(pdbs)?;
        Ok(build_gene_histogram(gene, &values, variant_median))
    }

    /// 20-bin histogram of the variant's ΔΔG values
    pub fn variant_histogram(&self, pdbs: &[String], variant: &Variant) -> Result<Histogram> {
        let values = self.store.variant_values(pdbs, variant)?;
        Ok(Histogram::from_values(
            VARIANT_TITLE,
            DDG_MIN,
            DDG_MAX,
            VARIANT_BINS,
            &values,
        ))
    }

    /// Full report for a selection, fetching each value set once
    pub fn report(&self, selection: &Selection) -> Result<VariantReport> {
        let Some((gene, variant)) = selection.complete() else {
            return Ok(VariantReport::empty());
        };

        let pdbs = self.structures_for_gene(gene);
        let variant_values = self.store.variant_values(&pdbs, &variant)?;
        let gene_values = self.store.gene_values(&pdbs)?;

        let variant_median = median(&variant_values);
        let percentile = variant_median
            .map(|m| percent_below(&gene_values, m))
            .unwrap_or(0.0);

        debug!(
            "{} {}: {} structures, {} variant rows, {} gene rows",
            gene,
            variant,
            pdbs.len(),
            variant_values.len(),
            gene_values.len()
        );

        Ok(VariantReport {
            gene: Some(gene.to_string()),
            gene_histogram: build_gene_histogram(gene, &gene_values, variant_median),
            variant_histogram: Histogram::from_values(
                VARIANT_TITLE,
                DDG_MIN,
                DDG_MAX,
                VARIANT_BINS,
                &variant_values,
            ),
            text: summary_text(variant_median, percentile),
            median: variant_median,
            percentile: Some(percentile),
            structures: pdbs,
            variant: Some(variant),
        })
    }
}

fn build_gene_histogram(gene: &str, values: &[f64], variant_median: Option<f64>) -> Histogram {
    Histogram::from_values(gene_title(gene), DDG_MIN, DDG_MAX, GENE_BINS, values)
        .with_marker(variant_median.map(Marker::median))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DdgRecord, MemoryStore};

    fn engine(records: Vec<DdgRecord>) -> VariantEngine<MemoryStore> {
        let mut catalogue = Catalogue::default();
        catalogue.add_structure("TP53", "1UOL");
        catalogue.add_structure("TP53", "2FEJ");
        catalogue.set_residues("TP53", vec![100]);
        catalogue.set_mut_from("TP53-100", vec!["A".into()]);
        catalogue.set_mut_to("TP53-100-A", vec!["G".into()]);
        VariantEngine::new(catalogue, MemoryStore::new(records))
    }

    fn pdbs() -> Vec<String> {
        vec!["1UOL".to_string(), "2FEJ".to_string()]
    }

    #[test]
    fn test_median_odd_and_even() {
        let odd = engine(vec![
            DdgRecord::new("1UOL", 100, "A", "G", 1.0),
            DdgRecord::new("2FEJ", 100, "A", "G", 3.0),
            DdgRecord::new("2FEJ", 100, "A", "G", 2.0),
        ]);
        assert_eq!(
            odd.variant_median(&pdbs(), 100, Some("A"), Some("G")).unwrap(),
            Some(2.0)
        );

        let even = engine(vec![
            DdgRecord::new("1UOL", 100, "A", "G", 1.0),
            DdgRecord::new("1UOL", 100, "A", "G", 4.0),
            DdgRecord::new("2FEJ", 100, "A", "G", 3.0),
            DdgRecord::new("2FEJ", 100, "A", "G", 2.0),
        ]);
        assert_eq!(
            even.variant_median(&pdbs(), 100, Some("A"), Some("G")).unwrap(),
            Some(2.5)
        );
    }

    #[test]
    fn test_median_unset_amino_acids() {
        let e = engine(vec![DdgRecord::new("1UOL", 100, "A", "G", 1.0)]);
        assert_eq!(e.variant_median(&pdbs(), 100, None, Some("G")).unwrap(), None);
        assert_eq!(e.variant_median(&pdbs(), 100, Some("A"), None).unwrap(), None);
        assert_eq!(e.variant_median(&[], 7, None, None).unwrap(), None);
    }

    #[test]
    fn test_median_no_rows() {
        let e = engine(vec![DdgRecord::new("1UOL", 100, "A", "G", 1.0)]);
        assert_eq!(
            e.variant_median(&pdbs(), 100, Some("A"), Some("W")).unwrap(),
            None
        );
    }

    #[test]
    fn test_percentile() {
        let e = engine(vec![
            DdgRecord::new("1UOL", 1, "M", "K", 0.0),
            DdgRecord::new("1UOL", 2, "M", "K", 1.0),
            DdgRecord::new("2FEJ", 100, "A", "G", 2.0),
            DdgRecord::new("2FEJ", 3, "M", "K", 3.0),
            DdgRecord::new("2FEJ", 4, "M", "K", 4.0),
        ]);
        assert_eq!(
            e.variant_percentile(&pdbs(), 100, Some("A"), Some("G")).unwrap(),
            40.0
        );
    }

    #[test]
    fn test_percentile_without_variant_rows_is_zero() {
        let e = engine(vec![
            DdgRecord::new("1UOL", 1, "M", "K", 0.0),
            DdgRecord::new("1UOL", 2, "M", "K", 1.0),
        ]);
        assert_eq!(
            e.variant_percentile(&pdbs(), 100, Some("A"), Some("G")).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_gene_histogram_marker() {
        let e = engine(vec![DdgRecord::new("1UOL", 100, "A", "G", 1.0)]);
        let hist = e.gene_histogram("TP53", &pdbs(), Some(1.0)).unwrap();
        assert_eq!(hist.bin_count(), GENE_BINS);
        assert_eq!(hist.total(), 1);
        assert_eq!(hist.title, "Histogram of ΔΔG values for TP53");
        assert_eq!(hist.marker.unwrap().label, "Variant median: 1.00 kcal/mol");

        let unmarked = e.gene_histogram("TP53", &pdbs(), None).unwrap();
        assert!(unmarked.marker.is_none());
    }

    #[test]
    fn test_gene_histogram_empty_structures() {
        let e = engine(vec![DdgRecord::new("1UOL", 100, "A", "G", 1.0)]);
        let hist = e.gene_histogram("NOPE", &[], None).unwrap();
        assert_eq!(hist.bin_count(), GENE_BINS);
        assert_eq!((hist.min, hist.max), (DDG_MIN, DDG_MAX));
        assert!(hist.is_empty());
    }

    #[test]
    fn test_variant_histogram() {
        let e = engine(vec![
            DdgRecord::new("1UOL", 100, "A", "G", 1.0),
            DdgRecord::new("2FEJ", 100, "A", "G", 1.2),
            DdgRecord::new("2FEJ", 100, "A", "V", 9.0),
        ]);
        let hist = e
            .variant_histogram(&pdbs(), &Variant::new(100, "A", "G"))
            .unwrap();
        assert_eq!(hist.bin_count(), VARIANT_BINS);
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn test_report_incomplete_selection() {
        let e = engine(vec![DdgRecord::new("1UOL", 100, "A", "G", 1.0)]);
        let selection = Selection {
            gene: Some("TP53".into()),
            residue: Some(100),
            mut_from: Some("A".into()),
            mut_to: None,
        };
        let report = e.report(&selection).unwrap();
        assert!(report.text.is_none());
        assert!(report.median.is_none());
        assert_eq!(report.gene_histogram.title, EMPTY_GENE_TITLE);
        assert_eq!(report.variant_histogram.bin_count(), VARIANT_BINS);
    }

    #[test]
    fn test_report_complete_selection() {
        let e = engine(vec![
            DdgRecord::new("1UOL", 100, "A", "G", 3.0),
            DdgRecord::new("2FEJ", 100, "A", "G", 4.0),
            DdgRecord::new("2FEJ", 5, "M", "K", -1.0),
            DdgRecord::new("2FEJ", 6, "M", "K", 0.0),
        ]);
        let report = e.report(&Selection::new("TP53", 100, "A", "G")).unwrap();
        assert_eq!(report.median, Some(3.5));
        assert_eq!(report.percentile, Some(75.0));
        assert_eq!(report.structures, pdbs());
        assert!(report.text.unwrap().contains("significantly destabilising"));
        assert_eq!(report.gene_histogram.marker.unwrap().x, 3.5);
    }

    #[test]
    fn test_report_unknown_gene() {
        let e = engine(vec![DdgRecord::new("1UOL", 100, "A", "G", 3.0)]);
        let report = e.report(&Selection::new("BRCA1", 100, "A", "G")).unwrap();
        assert!(report.structures.is_empty());
        assert!(report.median.is_none());
        assert_eq!(report.percentile, Some(0.0));
        assert!(report.text.is_none());
    }
}
