use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rusqlite::{params, Connection, Transaction};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::maintenance::add_indices;
use super::schema::{create_table_sql, COLUMNS, TABLE};
use super::DdgRecord;

const BATCH_SIZE: usize = 1000;

/// Builds a `ddg_info` table from scratch
pub struct DdgWriter {
    conn: Connection,
}

impl DdgWriter {
    /// Create a new database file. An existing file is replaced only with `force`.
    pub fn create(db_path: &Path, force: bool) -> Result<Self> {
        if db_path.exists() {
            if !force {
                bail!("{:?} already exists (use --force to replace it)", db_path);
            }
            std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        }

        let conn = Connection::open(db_path).context("Failed to create database")?;

        // Optimize for bulk insert
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(&create_table_sql(), [])
            .with_context(|| format!("Failed to create table: {}", TABLE))?;
        Ok(Self { conn })
    }

    /// Insert rows in one transaction
    pub fn insert_records(&mut self, records: &[DdgRecord]) -> Result<u64> {
        let tx = self.conn.transaction()?;
        for batch in records.chunks(BATCH_SIZE) {
            insert_batch(&tx, batch)?;
        }
        tx.commit()?;
        Ok(records.len() as u64)
    }

    /// Import a CSV with a header naming at least the five fact columns
    pub fn import_csv(&mut self, csv_path: &Path, progress: &ProgressBar) -> Result<u64> {
        let file =
            File::open(csv_path).with_context(|| format!("Failed to open: {:?}", csv_path))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let tx = self.conn.transaction()?;
        let mut count: u64 = 0;
        let mut batch: Vec<DdgRecord> = Vec::with_capacity(BATCH_SIZE);

        for (line, record) in reader.deserialize().enumerate() {
            let record: DdgRecord = record
                .with_context(|| format!("Failed to parse row {} of {:?}", line + 2, csv_path))?;
            batch.push(record);

            if batch.len() >= BATCH_SIZE {
                insert_batch(&tx, &batch)?;
                count += batch.len() as u64;
                progress.set_position(count);
                batch.clear();
            }
        }

        // Insert remaining batch
        if !batch.is_empty() {
            insert_batch(&tx, &batch)?;
            count += batch.len() as u64;
        }

        tx.commit()?;
        progress.set_position(count);
        progress.finish_with_message(format!("{}: {} records", TABLE, count));

        Ok(count)
    }

    /// Create the recommended indices and optimize
    pub fn finalize(self) -> Result<Connection> {
        add_indices(&self.conn)?;
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(self.conn)
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

fn insert_sql() -> String {
    let names: Vec<&str> = COLUMNS.iter().map(|(name, _)| *name).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        TABLE,
        names.join(", "),
        super::query::placeholders(names.len())
    )
}

/// Insert a batch of rows into the database
fn insert_batch(tx: &Transaction, batch: &[DdgRecord]) -> Result<()> {
    let mut stmt = tx.prepare_cached(&insert_sql())?;

    for row in batch {
        stmt.execute(params![
            row.pdb,
            row.pdb_residual,
            row.mut_from,
            row.mut_to,
            row.ddg
        ])?;
    }

    Ok(())
}

/// Convert a ΔΔG CSV into an indexed SQLite database with a progress bar.
///
/// The database is built next to `output_db` and moved into place only once
/// the import and indexing succeed; a failed import leaves no output behind.
pub fn import_csv_to_sqlite(csv_path: &Path, output_db: &Path, force: bool) -> Result<u64> {
    if output_db.exists() && !force {
        bail!("{:?} already exists (use --force to replace it)", output_db);
    }

    let line_count = BufReader::new(
        File::open(csv_path).with_context(|| format!("Failed to open: {:?}", csv_path))?,
    )
    .lines()
    .count()
    .saturating_sub(1) as u64;

    let partial = partial_path(output_db);
    let count = match build(csv_path, &partial, line_count) {
        Ok(count) => count,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial) {
                warn!("Failed to remove {:?}: {}", partial, cleanup);
            }
            return Err(e);
        }
    };

    if output_db.exists() {
        fs::remove_file(output_db).context("Failed to remove existing database")?;
    }
    fs::rename(&partial, output_db)
        .with_context(|| format!("Failed to move {:?} to {:?}", partial, output_db))?;

    Ok(count)
}

/// `<name>.partial` beside the target
fn partial_path(output_db: &Path) -> PathBuf {
    let mut name = output_db
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    output_db.with_file_name(name)
}

fn build(csv_path: &Path, db_path: &Path, line_count: u64) -> Result<u64> {
    let mut writer = DdgWriter::create(db_path, true)?;

    let pb = ProgressBar::new(line_count);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("=>-"),
    );
    pb.set_message(TABLE);

    let count = writer.import_csv(csv_path, &pb)?;
    info!("Imported {} rows from {:?}", count, csv_path);

    println!("Creating indices...");
    writer.finalize()?;

    Ok(count)
}
