//! Prune command implementation
//!
//! Lists warehouse tables that the compiled Dataform project does not declare
//! and, when asked to, deletes them.

use anyhow::{Context, Result};
use dp_audit::{audit, AbortSignal, AuditError, DeletionReport, DeletionWorkflow};
use dp_core::UnmanagedSet;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::commands::common::{
    create_warehouse, load_config, print_banner, ExitCode, EXIT_DELETION_FAILED,
    EXIT_INTERRUPTED,
};
use crate::commands::compile;
use crate::commands::console::TerminalConsole;

/// Execute the prune command
pub async fn execute(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let config = load_config(cli, &cwd)?;
    let manifest_path = PathBuf::from(&cli.dataform_output_file);

    if cli.compile {
        println!("Compiling Dataform project...");
        compile::run(&config.compile, &config.compile_dir(&cwd), &manifest_path).await?;
    }

    if !manifest_path.exists() {
        eprintln!("File not found: {}", manifest_path.display());
        return Err(ExitCode(1).into());
    }

    let exclusion =
        config.exclusion_rule(&cli.ignored_names(), cli.table_regex_to_ignore.as_deref());
    let warehouse = create_warehouse(&config)?;
    let abort = AbortSignal::ctrl_c();

    println!("Starting to list unmanaged Dataform tables...");
    let report = match audit(&manifest_path, warehouse.as_ref(), &exclusion, &abort).await {
        Ok(report) => report,
        Err(AuditError::Interrupted { at }) => {
            eprintln!("Interrupted while {}", at);
            return Err(ExitCode(EXIT_INTERRUPTED).into());
        }
        Err(e) => return Err(e).context("Failed to list unmanaged tables"),
    };

    if cli.verbose {
        eprintln!(
            "Inspected {} table(s) across {} project(s); {} declared",
            report.inventory_count(),
            report.manifest.namespace_count(),
            report.declared_count()
        );
    }

    if report.unmanaged.is_empty() {
        println!();
        print_banner("NO UNMANAGED TABLES");
        println!("No unmanaged tables found.");
        return Ok(());
    }
    print_unmanaged(&report.unmanaged)?;

    if !cli.delete_unmanaged_tables {
        return Ok(());
    }

    println!();
    print_banner("DELETION PROCESS");
    println!();
    println!("Starting to delete unmanaged tables...");

    let mut console = TerminalConsole::new();
    let deletion = DeletionWorkflow::new(warehouse.as_ref(), &mut console, &abort)
        .auto_approve(cli.auto_approve)
        .run(&report.unmanaged)
        .await;

    println!("{}", summary_line(&deletion));
    finish(&deletion, &manifest_path)
}

fn print_unmanaged(unmanaged: &UnmanagedSet) -> Result<()> {
    let json = unmanaged
        .to_pretty_json()
        .context("Failed to serialize unmanaged tables")?;
    println!();
    print_banner("UNMANAGED TABLES");
    println!("Unmanaged Tables: {}", json);
    Ok(())
}

/// One-line outcome of a deletion run
pub(crate) fn summary_line(report: &DeletionReport) -> String {
    format!(
        "Deleted {} table(s), skipped {}, failed {}",
        report.deleted_count(),
        report.skipped_count(),
        report.failed_count()
    )
}

/// Map a finished deletion run to the process result
fn finish(report: &DeletionReport, manifest_path: &Path) -> Result<()> {
    if let Some(ref at) = report.aborted_at {
        log::warn!(
            "Run against {} interrupted at {}",
            manifest_path.display(),
            at
        );
        return Err(ExitCode(EXIT_INTERRUPTED).into());
    }
    if report.has_failures() {
        eprintln!(
            "{} table deletion(s) and {} dataset step(s) failed",
            report.failed_count(),
            report.container_failure_count()
        );
        return Err(ExitCode(EXIT_DELETION_FAILED).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "prune_test.rs"]
mod tests;
