//! Parameterized ΔΔG queries over arbitrarily long structure lists

use rusqlite::ToSql;
use std::collections::HashSet;

use super::schema::{COL_DDG, COL_MUT_FROM, COL_MUT_TO, COL_PDB, COL_RESIDUE, TABLE};
use super::Variant;

/// Upper bound on structure ids bound into one statement
pub const MAX_IN_PARAMS: usize = 500;

/// `?, ?, ?` with `count` placeholders
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// SQL for one chunk of `pdb_count` structure ids, with an equality test per
/// column in `filters`
pub fn ddg_sql(pdb_count: usize, filters: &[&str]) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({})",
        COL_DDG,
        TABLE,
        COL_PDB,
        placeholders(pdb_count)
    );
    for column in filters {
        sql.push_str(&format!(" AND {} = ?", column));
    }
    sql
}

/// A statement and its bound parameters
pub struct BoundQuery<'a> {
    pub sql: String,
    pub params: Vec<&'a dyn ToSql>,
}

/// ΔΔG lookup for a set of structures, optionally restricted to one residue
/// or one variant
///
/// Structure ids are deduplicated (first occurrence wins) and split into
/// chunks of at most [`MAX_IN_PARAMS`]; every id is bound, never inlined.
pub struct DdgQuery<'a> {
    pdbs: Vec<&'a String>,
    filters: Vec<(&'static str, &'a dyn ToSql)>,
}

impl<'a> DdgQuery<'a> {
    pub fn for_structures(pdbs: &'a [String]) -> Self {
        let mut seen = HashSet::with_capacity(pdbs.len());
        let unique: Vec<&'a String> = pdbs.iter().filter(|pdb| seen.insert(*pdb)).collect();
        Self {
            pdbs: unique,
            filters: Vec::new(),
        }
    }

    pub fn residue(mut self, residue: &'a i64) -> Self {
        self.filters.push((COL_RESIDUE, residue as &dyn ToSql));
        self
    }

    pub fn variant(mut self, variant: &'a Variant) -> Self {
        self.filters.push((COL_RESIDUE, &variant.residue as &dyn ToSql));
        self.filters.push((COL_MUT_FROM, &variant.mut_from as &dyn ToSql));
        self.filters.push((COL_MUT_TO, &variant.mut_to as &dyn ToSql));
        self
    }

    pub fn structure_count(&self) -> usize {
        self.pdbs.len()
    }

    /// One bound statement per chunk; empty when there are no structures
    pub fn chunks(&self) -> Vec<BoundQuery<'a>> {
        let columns: Vec<&str> = self.filters.iter().map(|(column, _)| *column).collect();
        self.pdbs
            .chunks(MAX_IN_PARAMS)
            .map(|chunk| {
                let mut params: Vec<&'a dyn ToSql> =
                    chunk.iter().map(|&pdb| pdb as &dyn ToSql).collect();
                params.extend(self.filters.iter().map(|&(_, value)| value));
                BoundQuery {
                    sql: ddg_sql(chunk.len(), &columns),
                    params,
                }
            })
            .collect()
    }
}
