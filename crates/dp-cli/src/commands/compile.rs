//! Dataform compiler invocation

use anyhow::{bail, Context, Result};
use dp_core::CompileConfig;
use std::path::Path;

/// Run the configured compiler in `project_dir` and write its stdout to `output`.
pub(crate) async fn run(config: &CompileConfig, project_dir: &Path, output: &Path) -> Result<()> {
    log::debug!(
        "Running {} {} in {}",
        config.command,
        config.args.join(" "),
        project_dir.display()
    );

    let result = tokio::process::Command::new(&config.command)
        .args(&config.args)
        .current_dir(project_dir)
        .output()
        .await
        .with_context(|| format!("Failed to execute '{}', is it installed?", config.command))?;

    if !result.status.success() {
        bail!(
            "'{}' exited with {}: {}",
            config.command,
            result
                .status
                .code()
                .map_or_else(|| "a signal".to_string(), |c| format!("status {}", c)),
            String::from_utf8_lossy(&result.stderr).trim()
        );
    }

    tokio::fs::write(output, &result.stdout)
        .await
        .with_context(|| format!("Failed to write compiler output to {}", output.display()))?;
    log::debug!("Wrote {} bytes to {}", result.stdout.len(), output.display());
    Ok(())
}
