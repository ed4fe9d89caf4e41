//! Read access to the ΔΔG fact table

pub mod import;
pub mod maintenance;
pub mod query;
pub mod schema;
pub mod sqlite;

pub use import::*;
pub use maintenance::*;
pub use sqlite::*;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A point mutation at one residue position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Variant {
    pub residue: i64,
    pub mut_from: String,
    pub mut_to: String,
}

impl Variant {
    pub fn new(residue: i64, mut_from: impl Into<String>, mut_to: impl Into<String>) -> Self {
        Self {
            residue,
            mut_from: mut_from.into(),
            mut_to: mut_to.into(),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.mut_from, self.residue, self.mut_to)
    }
}

/// One row of `ddg_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DdgRecord {
    pub pdb: String,
    pub pdb_residual: i64,
    pub mut_from: String,
    pub mut_to: String,
    pub ddg: Option<f64>,
}

impl DdgRecord {
    pub fn new(pdb: &str, residue: i64, mut_from: &str, mut_to: &str, ddg: f64) -> Self {
        Self {
            pdb: pdb.to_string(),
            pdb_residual: residue,
            mut_from: mut_from.to_string(),
            mut_to: mut_to.to_string(),
            ddg: Some(ddg),
        }
    }

    fn matches(&self, variant: &Variant) -> bool {
        self.pdb_residual == variant.residue
            && self.mut_from == variant.mut_from
            && self.mut_to == variant.mut_to
    }
}

/// Read-only source of ΔΔG values
///
/// Missing `ddg` cells are skipped. An empty structure list yields no values.
pub trait DdgStore {
    /// Every ΔΔG value recorded for the given structures
    fn gene_values(&self, pdbs: &[String]) -> Result<Vec<f64>>;

    /// ΔΔG values for one variant across the given structures
    fn variant_values(&self, pdbs: &[String], variant: &Variant) -> Result<Vec<f64>>;
}

impl<S: DdgStore + ?Sized> DdgStore for &S {
    fn gene_values(&self, pdbs: &[String]) -> Result<Vec<f64>> {
        (**self).gene_values(pdbs)
    }

    fn variant_values(&self, pdbs: &[String], variant: &Variant) -> Result<Vec<f64>> {
        (**self).variant_values(pdbs, variant)
    }
}

impl<S: DdgStore + ?Sized> DdgStore for Arc<S> {
    fn gene_values(&self, pdbs: &[String]) -> Result<Vec<f64>> {
        (**self).gene_values(pdbs)
    }

    fn variant_values(&self, pdbs: &[String], variant: &Variant) -> Result<Vec<f64>> {
        (**self).variant_values(pdbs, variant)
    }
}

/// In-memory store over a fixed set of rows
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<DdgRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<DdgRecord>) -> Self {
        Self { records }
    }

    fn collect<'a>(
        &'a self,
        pdbs: &'a [String],
        filter: impl Fn(&DdgRecord) -> bool + 'a,
    ) -> impl Iterator<Item = f64> + 'a {
        self.records
            .iter()
            .filter(move |r| pdbs.contains(&r.pdb) && filter(r))
            .filter_map(|r| r.ddg)
    }
}

impl DdgStore for MemoryStore {
    fn gene_values(&self, pdbs: &[String]) -> Result<Vec<f64>> {
        Ok(self.collect(pdbs, |_| true).collect())
    }

    fn variant_values(&self, pdbs: &[String], variant: &Variant) -> Result<Vec<f64>> {
        Ok(self.collect(pdbs, |r| r.matches(variant)).collect())
    }
}
