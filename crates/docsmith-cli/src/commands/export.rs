//! Save and export handlers

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use docsmith_core::{Config, Workspace};

use crate::output::Output;

/// Mark the active template saved without exporting it
pub fn save(workspace: &mut Workspace, output: &Output) -> Result<()> {
    let result = workspace.mark_saved();
    output.warn_persist(&result);
    output.success(&format!("Saved {}", workspace.active_template()));
    Ok(())
}

/// Export the active template
///
/// Writing a file marks the template saved; `--stdout` only renders.
pub fn export(
    workspace: &mut Workspace,
    config: &Config,
    out: Option<PathBuf>,
    stdout: bool,
    output: &Output,
) -> Result<()> {
    if stdout {
        let export = workspace
            .render_current()
            .with_context(|| format!("Failed to render template '{}'", workspace.active_template()))?;
        let mut handle = std::io::stdout().lock();
        handle.write_all(export.markdown.as_bytes())?;
        handle.flush()?;
        return Ok(());
    }

    let dir = out.unwrap_or_else(|| config.exports_dir());
    let outcome = workspace.export_current(&dir)?;
    output.warn_persist(&outcome.persist);
    output.print_export(&outcome);
    Ok(())
}
