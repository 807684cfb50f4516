//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dp_core::{Config, WarehouseType};
use dp_warehouse::{BigQueryWarehouse, DuckDbWarehouse, Warehouse};
use std::fmt;
use std::path::Path;

use crate::cli::Cli;

/// Process exit code for a run with failed deletions
pub(crate) const EXIT_DELETION_FAILED: i32 = 2;

/// Process exit code for an interrupted run
pub(crate) const EXIT_INTERRUPTED: i32 = 130;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main reports the code without printing this.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the config file, applying the warehouse overrides from the command line.
pub(crate) fn load_config(cli: &Cli, cwd: &Path) -> Result<Config> {
    let mut config = Config::discover(cli.config.as_deref().map(Path::new), cwd)
        .context("Failed to load config")?;

    if let Some(warehouse) = cli.warehouse {
        config.warehouse.warehouse_type = warehouse.into();
    }
    if let Some(ref path) = cli.duckdb_path {
        config.warehouse.warehouse_type = WarehouseType::DuckDb;
        config.warehouse.path = path.clone();
    }
    Ok(config)
}

/// Create the warehouse client described by the config.
pub(crate) fn create_warehouse(config: &Config) -> Result<Box<dyn Warehouse>> {
    let settings = &config.warehouse;
    match settings.warehouse_type {
        WarehouseType::BigQuery => {
            let warehouse =
                BigQueryWarehouse::from_env(&settings.endpoint, &settings.access_token_env)
                    .context("Failed to create BigQuery client")?;
            Ok(Box::new(warehouse))
        }
        WarehouseType::DuckDb => {
            let warehouse = DuckDbWarehouse::new(&settings.path)
                .with_context(|| format!("Failed to open DuckDB database {}", settings.path))?;
            for (alias, path) in &settings.attach {
                warehouse
                    .attach(alias, path)
                    .with_context(|| format!("Failed to attach {} as {}", path, alias))?;
            }
            Ok(Box::new(warehouse))
        }
    }
}

/// Print a section banner
pub(crate) fn print_banner(title: &str) {
    let stars = "*".repeat(29);
    println!("{} {} {}", stars, title, stars);
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
