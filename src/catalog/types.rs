use serde::Serialize;
use std::collections::HashMap;

/// One choice offered by a selector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption<T> {
    pub label: String,
    pub value: T,
}

impl<T: ToString> DropdownOption<T> {
    pub fn new(value: T) -> Self {
        Self {
            label: value.to_string(),
            value,
        }
    }
}

/// Lookup key for the source amino-acid catalogue
pub fn residue_key(gene: &str, residue: i64) -> String {
    format!("{}-{}", gene, residue)
}

/// Lookup key for the destination amino-acid catalogue
pub fn mutation_key(gene: &str, residue: i64, mut_from: &str) -> String {
    format!("{}-{}-{}", gene, residue, mut_from)
}

/// Static lookups loaded once at startup
///
/// Selections cascade: gene -> residue -> source -> destination. Unknown
/// keys produce empty option lists.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    /// Genes in first-seen order
    pub(crate) genes: Vec<String>,
    /// Gene -> structure ids, deduplicated in first-seen order
    pub(crate) structures: HashMap<String, Vec<String>>,
    /// Gene -> residue positions
    pub(crate) residues: HashMap<String, Vec<i64>>,
    /// `GENE-RESIDUE` -> source amino acids
    pub(crate) mut_from: HashMap<String, Vec<String>>,
    /// `GENE-RESIDUE-FROM` -> destination amino acids
    pub(crate) mut_to: HashMap<String, Vec<String>>,
}

impl Catalogue {
    /// Register a gene/structure pair, keeping first-seen order and skipping duplicates
    pub fn add_structure(&mut self, gene: impl Into<String>, pdb: impl Into<String>) {
        let gene = gene.into();
        let pdb = pdb.into();

        if !self.structures.contains_key(&gene) {
            self.genes.push(gene.clone());
        }
        let pdbs = self.structures.entry(gene).or_default();
        if !pdbs.contains(&pdb) {
            pdbs.push(pdb);
        }
    }

    pub fn set_residues(&mut self, gene: impl Into<String>, residues: Vec<i64>) {
        self.residues.insert(gene.into(), residues);
    }

    pub fn set_mut_from(&mut self, key: impl Into<String>, codes: Vec<String>) {
        self.mut_from.insert(key.into(), codes);
    }

    pub fn set_mut_to(&mut self, key: impl Into<String>, codes: Vec<String>) {
        self.mut_to.insert(key.into(), codes);
    }

    /// All genes, in the order they first appear in the mapping
    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn gene_options(&self) -> Vec<DropdownOption<String>> {
        self.genes.iter().cloned().map(DropdownOption::new).collect()
    }

    /// Structure ids for a gene; unknown genes yield an empty list
    pub fn structures_for_gene(&self, gene: &str) -> Vec<String> {
        self.structures.get(gene).cloned().unwrap_or_default()
    }

    pub fn residue_options(&self, gene: Option<&str>) -> Vec<DropdownOption<i64>> {
        let Some(gene) = gene.filter(|g| !g.is_empty()) else {
            return Vec::new();
        };
        self.residues
            .get(gene)
            .map(|rs| rs.iter().copied().map(DropdownOption::new).collect())
            .unwrap_or_default()
    }

    pub fn mut_from_options(
        &self,
        gene: Option<&str>,
        residue: Option<i64>,
    ) -> Vec<DropdownOption<String>> {
        match (gene.filter(|g| !g.is_empty()), residue) {
            (Some(gene), Some(residue)) => {
                code_options(self.mut_from.get(&residue_key(gene, residue)))
            }
            _ => Vec::new(),
        }
    }

    pub fn mut_to_options(
        &self,
        gene: Option<&str>,
        residue: Option<i64>,
        mut_from: Option<&str>,
    ) -> Vec<DropdownOption<String>> {
        match (
            gene.filter(|g| !g.is_empty()),
            residue,
            mut_from.filter(|m| !m.is_empty()),
        ) {
            (Some(gene), Some(residue), Some(mut_from)) => {
                code_options(self.mut_to.get(&mutation_key(gene, residue, mut_from)))
            }
            _ => Vec::new(),
        }
    }
}

fn code_options(codes: Option<&Vec<String>>) -> Vec<DropdownOption<String>> {
    codes
        .map(|cs| cs.iter().cloned().map(DropdownOption::new).collect())
        .unwrap_or_default()
}
