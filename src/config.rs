use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const GENE_PDBS_FILE: &str = "gene_pdbs";
pub const RESIDUES_FILE: &str = "pdb_residual";
pub const MUT_FROM_FILE: &str = "dropdown_pdb_mut_from.csv";
pub const MUT_TO_FILE: &str = "dropdown_pdb_mut_from_to.csv";
pub const DATABASE_FILE: &str = "keogh.db";

/// Locations of the catalogue files and the ΔΔG database
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub gene_pdbs: PathBuf,
    pub residues: PathBuf,
    pub mut_from: PathBuf,
    pub mut_to: PathBuf,
    pub database: PathBuf,
}

impl DataPaths {
    /// Resolve paths from an optional data directory and database override.
    ///
    /// Without a data directory the platform data dir for `ddg-explorer` is used.
    pub fn resolve(data_dir: Option<PathBuf>, database: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        Ok(Self::in_dir(&data_dir, database))
    }

    pub fn in_dir(data_dir: &Path, database: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            gene_pdbs: data_dir.join(GENE_PDBS_FILE),
            residues: data_dir.join(RESIDUES_FILE),
            mut_from: data_dir.join(MUT_FROM_FILE),
            mut_to: data_dir.join(MUT_TO_FILE),
            database: database.unwrap_or_else(|| data_dir.join(DATABASE_FILE)),
        }
    }

    /// Catalogue files that do not exist
    pub fn missing(&self) -> Vec<&Path> {
        [
            &self.gene_pdbs,
            &self.residues,
            &self.mut_from,
            &self.mut_to,
            &self.database,
        ]
        .into_iter()
        .filter(|p| !p.exists())
        .map(|p| p.as_path())
        .collect()
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "ddg-explorer")
        .context("Could not determine data directory")?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_in_dir() {
        let paths = DataPaths::in_dir(Path::new("/data"), None);
        assert_eq!(paths.gene_pdbs, PathBuf::from("/data/gene_pdbs"));
        assert_eq!(paths.mut_to, PathBuf::from("/data/dropdown_pdb_mut_from_to.csv"));
        assert_eq!(paths.database, PathBuf::from("/data/keogh.db"));
    }

    #[test]
    fn test_database_override() {
        let paths = DataPaths::in_dir(Path::new("/data"), Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(paths.database, PathBuf::from("/tmp/other.db"));
        assert_eq!(paths.residues, PathBuf::from("/data/pdb_residual"));
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(GENE_PDBS_FILE), "name_of_gene,pdb\n").unwrap();
        let paths = DataPaths::in_dir(dir.path(), None);
        let missing = paths.missing();
        assert_eq!(missing.len(), 4);
        assert!(!missing.contains(&paths.gene_pdbs.as_path()));
    }
}
