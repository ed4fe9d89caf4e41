use anyhow::{bail, Context, Result};
use ddg_explorer::{
    catalog::load_catalogue,
    cli::{Cli, Commands, DataArgs},
    config::DataPaths,
    engine::{Selection, VariantEngine, VariantReport},
    histogram::Histogram,
    store::{add_indices, import_csv_to_sqlite, inspect, DatabaseReport, SqliteStore},
    ui::{Dashboard, DashboardApp, Page, NOT_FOUND},
};
use log::{info, warn, LevelFilter};
use rusqlite::{Connection, OpenFlags};
use std::fs::File;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Dashboard {
            data,
            page,
            log_file,
        } => {
            init_logging(match log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Off,
            })?;

            if Page::from_path(&page).is_none() {
                println!("{}", NOT_FOUND);
                return Ok(());
            }

            let engine = open_engine(&data)?;
            let mut dashboard = Dashboard::new(&engine);

            let mut app = DashboardApp::new()?;
            let result = app.run(&mut dashboard);
            app.restore()?;
            result?;
        }

        Commands::Lookup {
            data,
            gene,
            residue,
            mut_from,
            mut_to,
            json,
        } => {
            init_logging(LogTarget::Stderr)?;
            let engine = open_engine(&data)?;
            let report = engine.report(&Selection::new(&gene, residue, &mut_from, &mut_to))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Commands::Options {
            data,
            gene,
            residue,
            mut_from,
        } => {
            init_logging(LogTarget::Stderr)?;
            let engine = open_engine(&data)?;

            let labels: Vec<String> = match (&gene, residue, &mut_from) {
                (None, _, _) => labels(engine.gene_options()),
                (Some(gene), None, _) => labels(engine.residue_options(Some(gene.as_str()))),
                (Some(gene), Some(residue), None) => {
                    labels(engine.mut_from_options(Some(gene.as_str()), Some(residue)))
                }
                (Some(gene), Some(residue), Some(mut_from)) => labels(engine.mut_to_options(
                    Some(gene.as_str()),
                    Some(residue),
                    Some(mut_from.as_str()),
                )),
            };

            if labels.is_empty() {
                println!("(no options)");
            }
            for label in labels {
                println!("{}", label);
            }
        }

        Commands::AddIndices { db } => {
            init_logging(LogTarget::Stderr)?;
            if !db.exists() {
                bail!("Database not found: {:?}", db);
            }

            println!("Adding indices to {:?}...", db);
            let conn = Connection::open(&db)
                .with_context(|| format!("Failed to open database: {:?}", db))?;
            let indices = add_indices(&conn)?;

            println!("\nExisting indices on ddg_info:");
            for index in indices {
                println!("  - {}", index.name);
            }
        }

        Commands::Inspect {
            db,
            probe,
            probe_residue,
            json,
        } => {
            init_logging(LogTarget::Stderr)?;
            let conn = open_read_only(&db)?;
            let report = inspect(&conn, &probe.unwrap_or_default(), probe_residue)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_database_report(&report);
            }
        }

        Commands::Import {
            csv,
            output_db,
            force,
        } => {
            init_logging(LogTarget::Stderr)?;
            let start = Instant::now();

            println!("Importing {:?}...", csv);
            let record_count = import_csv_to_sqlite(&csv, &output_db, force)?;

            let elapsed = start.elapsed();
            println!(
                "\nCreated {:?} ({} records) in {:.1}s",
                output_db,
                record_count,
                elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}

enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

/// The dashboard owns the screen, so it logs to a file or not at all
fn init_logging(target: LogTarget<'_>) -> Result<()> {
    logger_builder(&target, env_logger::Env::default().default_filter_or("info"))?.init();
    Ok(())
}

/// `Off` ignores `RUST_LOG` entirely, module directives included
fn logger_builder(target: &LogTarget<'_>, env: env_logger::Env<'_>) -> Result<env_logger::Builder> {
    let builder = match target {
        LogTarget::Stderr => env_logger::Builder::from_env(env),
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {:?}", path))?;
            let mut builder = env_logger::Builder::from_env(env);
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder
        }
        LogTarget::Off => {
            let mut builder = env_logger::Builder::new();
            builder.filter_level(LevelFilter::Off);
            builder
        }
    };
    Ok(builder)
}

fn open_engine(data: &DataArgs) -> Result<VariantEngine<SqliteStore>> {
    let paths = DataPaths::resolve(data.data_dir.clone(), data.db.clone())?;
    for missing in paths.missing() {
        warn!("Missing data file: {:?}", missing);
    }

    let catalogue = load_catalogue(&paths)?;
    let store = SqliteStore::open(&paths.database)?;
    info!("Opened {:?}", paths.database);

    Ok(VariantEngine::new(catalogue, store))
}

fn open_read_only(db: &Path) -> Result<Connection> {
    if !db.exists() {
        bail!("Database not found: {:?}", db);
    }
    Connection::open_with_flags(db, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open database: {:?}", db))
}

fn labels<T>(options: Vec<ddg_explorer::DropdownOption<T>>) -> Vec<String> {
    options.into_iter().map(|o| o.label).collect()
}

fn print_report(report: &VariantReport) {
    if let (Some(gene), Some(variant)) = (&report.gene, &report.variant) {
        println!("{} {}", gene, variant);
    }
    println!("Structures: {}", report.structures.join(", "));

    match report.median {
        Some(median) => println!("Median ΔΔG: {:.2} kcal/mol", median),
        None => println!("Median ΔΔG: no value"),
    }
    if let Some(percentile) = report.percentile {
        println!("Percentile: {:.0}", percentile);
    }

    println!();
    print_histogram(&report.gene_histogram);
    println!();
    print_histogram(&report.variant_histogram);

    if let Some(text) = &report.text {
        println!("\n{}", text);
    }
}

fn print_histogram(histogram: &Histogram) {
    println!(
        "{} ({} bins, {} values)",
        histogram.title,
        histogram.bin_count(),
        histogram.total()
    );
    if histogram.underflow + histogram.overflow > 0 {
        println!(
            "  outside [{}, {}]: {} below, {} above",
            histogram.min, histogram.max, histogram.underflow, histogram.overflow
        );
    }
    if let Some(marker) = &histogram.marker {
        println!("  {}", marker.label);
    }

    let width = histogram.bin_width();
    for (idx, count) in histogram.counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let start = histogram.bin_start(idx);
        println!("  [{:>8.2}, {:>8.2}) {}", start, start + width, count);
    }
}

fn print_database_report(report: &DatabaseReport) {
    println!("Tables: {}", report.tables.join(", "));

    println!("\nddg_info schema:");
    for col in &report.columns {
        println!("  {} ({})", col.name, col.decl_type);
    }

    println!("\nRow count: {}", report.row_count);
    if let Some(sample) = &report.sample_row {
        println!("\nSample row: ({})", sample.join(", "));
    }

    println!("\nIndices on ddg_info:");
    for index in &report.indices {
        println!("  {}: {}", index.name, index.sql.as_deref().unwrap_or("-"));
    }

    println!("\nUnique PDB entries: {}", report.distinct_structures);
    if let Some(range) = &report.ddg_range {
        println!(
            "DDG range: {:.2} to {:.2} (avg: {:.2})",
            range.min, range.max, range.mean
        );
    }

    for probe in &report.probes {
        println!(
            "\n{}: {} rows in {:.4} seconds",
            probe.description, probe.rows, probe.elapsed_secs
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> env_logger::Env<'static> {
        // unset variable, so the default acts like a RUST_LOG module directive
        env_logger::Env::new()
            .filter("DDG_EXPLORER_UNSET_LOG")
            .default_filter_or("ddg_explorer=debug")
    }

    #[test]
    fn test_off_ignores_env_directives() {
        let logger = logger_builder(&LogTarget::Off, env()).unwrap().build();
        assert_eq!(logger.filter(), LevelFilter::Off);
    }

    #[test]
    fn test_stderr_follows_env() {
        let logger = logger_builder(&LogTarget::Stderr, env()).unwrap().build();
        assert_eq!(logger.filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_file_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.log");
        let logger = logger_builder(&LogTarget::File(&path), env()).unwrap().build();
        assert_eq!(logger.filter(), LevelFilter::Debug);
        assert!(path.exists());
    }
}
