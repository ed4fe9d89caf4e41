//! Offline maintenance of the fact table: index creation and inspection

use anyhow::{Context, Result};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::time::Instant;

use super::query::DdgQuery;
use super::schema::{COL_DDG, COL_PDB, INDICES, TABLE};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexInfo {
    pub name: String,
    pub sql: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DdgRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Timing of one sample query
#[derive(Debug, Clone, Serialize)]
pub struct ProbeTiming {
    pub description: String,
    pub rows: usize,
    pub elapsed_secs: f64,
}

/// Summary of a ΔΔG database
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseReport {
    pub tables: Vec<String>,
    pub columns: Vec<ColumnInfo>,
    pub row_count: i64,
    pub sample_row: Option<Vec<String>>,
    pub indices: Vec<IndexInfo>,
    pub distinct_structures: i64,
    pub ddg_range: Option<DdgRange>,
    pub probes: Vec<ProbeTiming>,
}

/// Create every recommended index if missing; returns the indices now present
pub fn add_indices(conn: &Connection) -> Result<Vec<IndexInfo>> {
    for index in INDICES {
        conn.execute(&index.create_sql(), [])
            .with_context(|| format!("Failed to create index: {}", index.name))?;
        info!("Index ready: {}", index.name);
    }
    list_indices(conn)
}

/// Indices defined on the fact table
pub fn list_indices(conn: &Connection) -> Result<Vec<IndexInfo>> {
    let mut stmt = conn.prepare(
        "SELECT name, sql FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 ORDER BY name",
    )?;
    let rows = stmt.query_map([TABLE], |row| {
        Ok(IndexInfo {
            name: row.get(0)?,
            sql: row.get(1)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list indices")
}

/// Inspect schema, size and value range; optionally time sample lookups
/// for `probe_pdbs` at `probe_residue`
pub fn inspect(
    conn: &Connection,
    probe_pdbs: &[String],
    probe_residue: i64,
) -> Result<DatabaseReport> {
    let tables = {
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    let columns = {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", TABLE))?;
        let rows = stmt.query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                decl_type: row.get(2)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    let row_count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", TABLE), [], |r| r.get(0))
        .with_context(|| format!("Failed to count rows in {}", TABLE))?;

    let sample_row = sample_row(conn)?;

    let distinct_structures: i64 = conn.query_row(
        &format!("SELECT COUNT(DISTINCT {}) FROM {}", COL_PDB, TABLE),
        [],
        |r| r.get(0),
    )?;

    let (min, max, mean) = conn.query_row(
        &format!("SELECT MIN({0}), MAX({0}), AVG({0}) FROM {1}", COL_DDG, TABLE),
        [],
        |r| {
            Ok((
                r.get::<_, Option<f64>>(0)?,
                r.get::<_, Option<f64>>(1)?,
                r.get::<_, Option<f64>>(2)?,
            ))
        },
    )?;
    let ddg_range = match (min, max, mean) {
        (Some(min), Some(max), Some(mean)) => Some(DdgRange { min, max, mean }),
        _ => None,
    };

    let probes = if probe_pdbs.is_empty() {
        Vec::new()
    } else {
        probe(conn, probe_pdbs, probe_residue)?
    };

    Ok(DatabaseReport {
        tables,
        columns,
        row_count,
        sample_row,
        indices: list_indices(conn)?,
        distinct_structures,
        ddg_range,
        probes,
    })
}

fn sample_row(conn: &Connection) -> Result<Option<Vec<String>>> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT 1", TABLE))?;
    let width = stmt.column_count();
    let mut rows = stmt.query([])?;

    let mut sample = None;
    if let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(display_value(row.get::<_, Value>(idx)?));
        }
        sample = Some(cells);
    }
    Ok(sample)
}

fn probe(conn: &Connection, pdbs: &[String], residue: i64) -> Result<Vec<ProbeTiming>> {
    let plain = time_query(conn, "structure lookup", DdgQuery::for_structures(pdbs))?;
    let filtered = time_query(
        conn,
        &format!("structure + residue {} lookup", residue),
        DdgQuery::for_structures(pdbs).residue(&residue),
    )?;

    Ok(vec![plain, filtered])
}

/// Run every chunk of `query`, counting rows
fn time_query(conn: &Connection, description: &str, query: DdgQuery<'_>) -> Result<ProbeTiming> {
    let start = Instant::now();
    let mut count = 0;

    for bound in query.chunks() {
        let mut stmt = conn
            .prepare(&bound.sql)
            .with_context(|| format!("Failed to prepare: {}", bound.sql))?;
        let mut rows = stmt.query(params_from_iter(bound.params.iter()))?;
        while rows.next()?.is_some() {
            count += 1;
        }
    }

    Ok(ProbeTiming {
        description: description.to_string(),
        rows: count,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

fn display_value(value: Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(t) => t,
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DdgRecord, DdgWriter};

    fn database() -> Connection {
        let mut writer = DdgWriter::in_memory().unwrap();
        writer
            .insert_records(&[
                DdgRecord::new("1UOL", 100, "A", "G", 0.3),
                DdgRecord::new("2FEJ", 100, "A", "G", 0.9),
                DdgRecord::new("2FEJ", 120, "L", "P", 4.2),
            ])
            .unwrap();
        writer.into_connection()
    }

    #[test]
    fn test_add_indices_is_idempotent() {
        let conn = database();
        let first = add_indices(&conn).unwrap();
        let second = add_indices(&conn).unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert!(first.iter().any(|i| i.name == "idx_composite"));
    }

    #[test]
    fn test_inspect() {
        let conn = database();
        let pdbs = vec!["1UOL".to_string(), "2FEJ".to_string()];
        let report = inspect(&conn, &pdbs, 100).unwrap();

        assert_eq!(report.tables, vec!["ddg_info"]);
        assert_eq!(report.columns.len(), 5);
        assert_eq!(report.columns[1].name, "pdb_residual");
        assert_eq!(report.row_count, 3);
        assert_eq!(report.distinct_structures, 2);
        assert_eq!(report.sample_row.as_ref().unwrap()[0], "1UOL");
        assert!(report.indices.is_empty());

        let range = report.ddg_range.unwrap();
        assert_eq!(range.min, 0.3);
        assert_eq!(range.max, 4.2);

        assert_eq!(report.probes.len(), 2);
        assert_eq!(report.probes[0].rows, 3);
        assert_eq!(report.probes[1].rows, 2);
    }

    #[test]
    fn test_inspect_timings_over_long_structure_list() {
        let conn = database();
        // more ids than SQLite binds in one statement
        let mut pdbs: Vec<String> = (0..40_000).map(|i| format!("X{:05}", i)).collect();
        pdbs.push("2FEJ".to_string());
        let report = inspect(&conn, &pdbs, 120).unwrap();

        assert_eq!(report.probes[0].rows, 2);
        assert_eq!(report.probes[1].rows, 1);
    }

    #[test]
    fn test_inspect_empty_table() {
        let conn = DdgWriter::in_memory().unwrap().into_connection();
        let report = inspect(&conn, &[], 1).unwrap();
        assert_eq!(report.row_count, 0);
        assert!(report.sample_row.is_none());
        assert!(report.ddg_range.is_none());
        assert!(report.probes.is_empty());
    }
}
