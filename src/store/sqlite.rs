use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::query::DdgQuery;
use super::schema::TABLE;
use super::{DdgStore, Variant};

/// SQLite-backed fact store
///
/// The connection is opened once and only read. It sits behind a mutex so
/// the store can be shared between request handlers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open an existing database read-only
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            bail!("Database not found: {:?}", db_path);
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Self::from_connection(conn)
    }

    /// Wrap an already-open connection, verifying the fact table exists
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [TABLE],
                |row| row.get(0),
            )
            .context("Failed to read database schema")?;

        if found == 0 {
            bail!("Database has no {} table", TABLE);
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))
    }

    fn run(&self, query: DdgQuery<'_>) -> Result<Vec<f64>> {
        let conn = self.lock()?;
        let mut values = Vec::new();

        for bound in query.chunks() {
            let mut stmt = conn
                .prepare_cached(&bound.sql)
                .with_context(|| format!("Failed to prepare: {}", bound.sql))?;
            let rows = stmt
                .query_map(params_from_iter(bound.params.iter()), |row| {
                    row.get::<_, Option<f64>>(0)
                })
                .context("Failed to query ddg values")?;

            for row in rows {
                if let Some(ddg) = row.context("Failed to read ddg value")? {
                    values.push(ddg);
                }
            }
        }

        debug!(
            "Fetched {} ddg values for {} structures",
            values.len(),
            query.structure_count()
        );
        Ok(values)
    }
}

impl DdgStore for SqliteStore {
    fn gene_values(&self, pdbs: &[String]) -> Result<Vec<f64>> {
        self.run(DdgQuery::for_structures(pdbs))
    }

    fn variant_values(&self, pdbs: &[String], variant: &Variant) -> Result<Vec<f64>> {
        self.run(DdgQuery::for_structures(pdbs).variant(variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DdgRecord, DdgWriter};

    fn store(records: &[DdgRecord]) -> SqliteStore {
        let mut writer = DdgWriter::in_memory().unwrap();
        writer.insert_records(records).unwrap();
        SqliteStore::from_connection(writer.into_connection()).unwrap()
    }

    fn pdbs(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(SqliteStore::from_connection(conn).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SqliteStore::open(&dir.path().join("absent.db")).is_err());
    }

    #[test]
    fn test_gene_and_variant_values() {
        let store = store(&[
            DdgRecord::new("1UOL", 100, "A", "G", 0.3),
            DdgRecord::new("2FEJ", 100, "A", "G", 0.9),
            DdgRecord::new("2FEJ", 101, "C", "W", 3.5),
            DdgRecord::new("9XYZ", 100, "A", "G", 50.0),
        ]);
        let ids = pdbs(&["1UOL", "2FEJ"]);

        let mut gene = store.gene_values(&ids).unwrap();
        gene.sort_by(f64::total_cmp);
        assert_eq!(gene, vec![0.3, 0.9, 3.5]);

        let mut variant = store
            .variant_values(&ids, &Variant::new(100, "A", "G"))
            .unwrap();
        variant.sort_by(f64::total_cmp);
        assert_eq!(variant, vec![0.3, 0.9]);

        assert!(store
            .variant_values(&ids, &Variant::new(100, "A", "V"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_null_ddg_skipped() {
        let mut gap = DdgRecord::new("1UOL", 100, "A", "G", 0.0);
        gap.ddg = None;
        let store = store(&[gap, DdgRecord::new("1UOL", 100, "A", "G", 1.5)]);
        assert_eq!(store.gene_values(&pdbs(&["1UOL"])).unwrap(), vec![1.5]);
    }

    #[test]
    fn test_long_structure_lists_are_chunked() {
        let records: Vec<DdgRecord> = (0..1200)
            .map(|i| DdgRecord::new(&format!("P{:04}", i), 1, "A", "G", i as f64))
            .collect();
        let store = store(&records);
        let ids: Vec<String> = records.iter().map(|r| r.pdb.clone()).collect();

        assert_eq!(store.gene_values(&ids).unwrap().len(), 1200);
        assert_eq!(
            store
                .variant_values(&ids, &Variant::new(1, "A", "G"))
                .unwrap()
                .len(),
            1200
        );
    }

    #[test]
    fn test_injection_is_inert() {
        let store = store(&[DdgRecord::new("1UOL", 100, "A", "G", 0.3)]);
        let ids = pdbs(&["1UOL') OR 1=1 --"]);
        assert!(store.gene_values(&ids).unwrap().is_empty());
    }
}
