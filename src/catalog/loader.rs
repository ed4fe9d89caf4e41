use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::types::Catalogue;
use crate::config::DataPaths;

/// Row of the long-format gene -> structure mapping
#[derive(Debug, Deserialize)]
struct GenePdbRow {
    name_of_gene: String,
    pdb: String,
}

/// A column-oriented CSV: one header per column, ragged values below
type WideTable = Vec<(String, Vec<String>)>;

/// Load all four catalogues from the data directory
pub fn load_catalogue(paths: &DataPaths) -> Result<Catalogue> {
    let mut catalogue = Catalogue::default();

    read_gene_pdbs(open(&paths.gene_pdbs)?, &mut catalogue)
        .with_context(|| format!("Failed to parse {:?}", paths.gene_pdbs))?;

    for (gene, cells) in read_wide(open(&paths.residues)?)
        .with_context(|| format!("Failed to parse {:?}", paths.residues))?
    {
        let residues = cells.iter().filter_map(|c| parse_residue(c)).collect();
        catalogue.set_residues(gene, residues);
    }

    for (key, codes) in read_wide(open(&paths.mut_from)?)
        .with_context(|| format!("Failed to parse {:?}", paths.mut_from))?
    {
        catalogue.set_mut_from(key, codes);
    }

    for (key, codes) in read_wide(open(&paths.mut_to)?)
        .with_context(|| format!("Failed to parse {:?}", paths.mut_to))?
    {
        catalogue.set_mut_to(key, codes);
    }

    info!(
        "Loaded catalogue: {} genes, {} residue lists, {} source keys, {} destination keys",
        catalogue.genes.len(),
        catalogue.residues.len(),
        catalogue.mut_from.len(),
        catalogue.mut_to.len()
    );

    Ok(catalogue)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
    Ok(BufReader::new(file))
}

fn read_gene_pdbs<R: Read>(reader: R, catalogue: &mut Catalogue) -> Result<()> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    for record in csv_reader.deserialize() {
        let row: GenePdbRow = record.context("Failed to read gene/structure row")?;
        if row.name_of_gene.is_empty() || row.pdb.is_empty() {
            continue;
        }
        catalogue.add_structure(row.name_of_gene, row.pdb);
    }

    Ok(())
}

/// Read a wide CSV into its columns, dropping empty cells
fn read_wide<R: Read>(reader: R) -> Result<WideTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut columns: WideTable = csv_reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(|h| (h.to_string(), Vec::new()))
        .collect();

    for record in csv_reader.records() {
        let record = record.context("Failed to read row")?;
        for (idx, cell) in record.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            if let Some((_, values)) = columns.get_mut(idx) {
                values.push(cell.to_string());
            }
        }
    }

    debug!("Read wide table with {} columns", columns.len());
    Ok(columns)
}

/// Residue cells may be written as floats (`12.0`) when columns are ragged
fn parse_residue(cell: &str) -> Option<i64> {
    if let Ok(value) = cell.parse::<i64>() {
        return Some(value);
    }
    let value = cell.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}
