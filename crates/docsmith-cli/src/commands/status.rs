//! Status command handler

use anyhow::Result;

use docsmith_core::{Config, Workspace};

use crate::output::Output;

/// Show status information
///
/// Probes the backing store first so the storage line reflects this run.
pub fn show(workspace: &mut Workspace, config: &Config, output: &Output) -> Result<()> {
    workspace.check_storage();
    output.print_status(&workspace.status(), config);
    Ok(())
}
