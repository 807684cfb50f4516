//! CLI argument definitions using clap derive API

use clap::{Parser, ValueEnum};
use dp_core::{ExclusionRule, WarehouseType};

/// dfprune - find warehouse tables a Dataform project no longer manages
#[derive(Parser, Debug)]
#[command(name = "dfprune")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the compiled Dataform JSON output
    #[arg(short = 'd', long)]
    pub dataform_output_file: String,

    /// Comma-separated table names to ignore
    #[arg(short = 'n', long, env = "BQ_TABLE_NAMES_TO_IGNORE")]
    pub table_names_to_ignore: Option<String>,

    /// Regex of table names to ignore
    #[arg(short = 'r', long, env = "BQ_TABLE_REGEX_TO_IGNORE")]
    pub table_regex_to_ignore: Option<String>,

    /// Delete the unmanaged tables after listing them
    #[arg(short = 'u', long)]
    pub delete_unmanaged_tables: bool,

    /// Delete without asking for confirmation
    #[arg(short = 'a', long)]
    pub auto_approve: bool,

    /// Config file path (default: dfprune.yml if present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the warehouse backend
    #[arg(short, long, value_enum)]
    pub warehouse: Option<WarehouseArg>,

    /// Override the DuckDB database file
    #[arg(long)]
    pub duckdb_path: Option<String>,

    /// Run the Dataform compiler and write its output before auditing
    #[arg(long)]
    pub compile: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Warehouse backends selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseArg {
    /// Google BigQuery REST API
    Bigquery,
    /// Local DuckDB database
    Duckdb,
}

impl From<WarehouseArg> for WarehouseType {
    fn from(arg: WarehouseArg) -> Self {
        match arg {
            WarehouseArg::Bigquery => WarehouseType::BigQuery,
            WarehouseArg::Duckdb => WarehouseType::DuckDb,
        }
    }
}

impl Cli {
    /// Exact-name exclusions from `--table-names-to-ignore`
    pub fn ignored_names(&self) -> Vec<String> {
        self.table_names_to_ignore
            .as_deref()
            .map(ExclusionRule::parse_name_list)
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
