//! Layout of the `ddg_info` fact table and its recommended indices

/// Fact table name
pub const TABLE: &str = "ddg_info";

pub const COL_PDB: &str = "pdb";
pub const COL_RESIDUE: &str = "pdb_residual";
pub const COL_MUT_FROM: &str = "mut_from";
pub const COL_MUT_TO: &str = "mut_to";
pub const COL_DDG: &str = "ddg";

/// Columns the application reads, with their SQL types
pub const COLUMNS: &[(&str, &str)] = &[
    (COL_PDB, "TEXT"),
    (COL_RESIDUE, "INTEGER"),
    (COL_MUT_FROM, "TEXT"),
    (COL_MUT_TO, "TEXT"),
    (COL_DDG, "REAL"),
];

/// Index definition
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl IndexDef {
    /// Idempotent CREATE INDEX statement
    pub fn create_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}({})",
            self.name,
            TABLE,
            self.columns.join(", ")
        )
    }
}

/// Single-column indices for each filter plus one composite over all four
pub const INDICES: &[IndexDef] = &[
    IndexDef { name: "idx_pdb", columns: &[COL_PDB] },
    IndexDef { name: "idx_pdb_residual", columns: &[COL_RESIDUE] },
    IndexDef { name: "idx_mut_from", columns: &[COL_MUT_FROM] },
    IndexDef { name: "idx_mut_to", columns: &[COL_MUT_TO] },
    IndexDef {
        name: "idx_composite",
        columns: &[COL_PDB, COL_RESIDUE, COL_MUT_FROM, COL_MUT_TO],
    },
];

/// CREATE TABLE statement for a fresh fact table
pub fn create_table_sql() -> String {
    let columns: Vec<String> = COLUMNS
        .iter()
        .map(|(name, sql_type)| format!("    {} {}", name, sql_type))
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", TABLE, columns.join(",\n"))
}
