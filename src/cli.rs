use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ddg-explorer")]
#[command(version, about = "Browse precomputed protein stability changes (ΔΔG) by gene and variant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the catalogue files and the ΔΔG database live
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory holding gene_pdbs, pdb_residual, the dropdown CSVs and keogh.db
    #[arg(short, long, env = "DDG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// ΔΔG database path (default: <data-dir>/keogh.db)
    #[arg(long, env = "DDG_DB")]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive terminal dashboard
    Dashboard {
        #[command(flatten)]
        data: DataArgs,

        /// Page to open
        #[arg(long, default_value = "/")]
        page: String,

        /// Write logs to this file while the dashboard is open
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Print median, percentile, histograms and summary for one variant
    Lookup {
        #[command(flatten)]
        data: DataArgs,

        /// Gene name
        gene: String,

        /// Residue position
        #[arg(allow_negative_numbers = true)]
        residue: i64,

        /// Source amino acid
        mut_from: String,

        /// Destination amino acid
        mut_to: String,

        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the next level of choices for a partial selection
    Options {
        #[command(flatten)]
        data: DataArgs,

        /// Gene name (omit to list genes)
        gene: Option<String>,

        /// Residue position
        #[arg(allow_negative_numbers = true)]
        residue: Option<i64>,

        /// Source amino acid
        mut_from: Option<String>,
    },

    /// Create the recommended indices on ddg_info (idempotent)
    AddIndices {
        /// ΔΔG database path
        db: PathBuf,
    },

    /// Show schema, size, indices and value range of a ΔΔG database
    Inspect {
        /// ΔΔG database path
        db: PathBuf,

        /// Time sample lookups for these structures (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        probe: Option<Vec<String>>,

        /// Residue used by the filtered sample lookup
        #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
        probe_residue: i64,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a ΔΔG database from a CSV (pdb,pdb_residual,mut_from,mut_to,ddg)
    Import {
        /// Input CSV file
        csv: PathBuf,

        /// Output SQLite database path
        output_db: PathBuf,

        /// Replace the output database if it exists
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
