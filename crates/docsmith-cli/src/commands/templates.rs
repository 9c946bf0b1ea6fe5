//! Template catalog and selection

use anyhow::{bail, Result};

use docsmith_core::{template, TemplateId, Workspace};

use crate::output::Output;

/// List the catalog, marking the active and saved templates
pub fn list(workspace: &Workspace, output: &Output) -> Result<()> {
    let store = workspace.store();
    output.print_templates(store.active_template(), &store.saved_template_ids());
    Ok(())
}

/// Make a template active
///
/// Only catalog entries that are available can be selected here, matching
/// what navigation offers.
pub fn activate(workspace: &mut Workspace, id: String, output: &Output) -> Result<()> {
    let id = TemplateId::parse(&id)?;

    match template::lookup(&id) {
        None => bail!(
            "Unknown template: '{}'. Run `docsmith templates` to list them.",
            id
        ),
        Some(info) if !info.is_available() => {
            bail!("Template '{}' ({}) is coming soon", id, info.name)
        }
        Some(info) => {
            let result = workspace.set_active_template(id.clone());
            output.warn_persist(&result);
            output.success(&format!("Now editing {} ({})", id, info.description));
        }
    }

    Ok(())
}
