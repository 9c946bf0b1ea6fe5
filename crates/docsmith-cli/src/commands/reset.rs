//! Reset handlers

use anyhow::{bail, Result};

use docsmith_core::{TemplateId, Workspace};

use crate::editor::confirm;
use crate::output::Output;
use crate::Prompt;

/// Reset one template, or everything with `all`
pub fn reset(
    workspace: &mut Workspace,
    all: bool,
    template: Option<String>,
    yes: bool,
    prompt: Prompt,
    output: &Output,
) -> Result<()> {
    let question = if all {
        "Reset every template and discard all stored records?".to_string()
    } else {
        let id = target(workspace, template.as_deref())?;
        format!("Reset {} to its defaults?", id)
    };

    // Confirm unless told not to
    if !yes && output.should_prompt() {
        if prompt == Prompt::Disabled {
            bail!("Add --yes to confirm the reset");
        }
        if !confirm(&question)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if all {
        let result = workspace.reset_all();
        output.warn_persist(&result);
        output.success("Reset all templates");
    } else {
        let id = target(workspace, template.as_deref())?;
        let result = workspace.reset_template(&id);
        output.warn_persist(&result);
        output.success(&format!("Reset {}", id));
    }

    Ok(())
}

fn target(workspace: &Workspace, template: Option<&str>) -> Result<TemplateId> {
    Ok(match template {
        Some(id) => TemplateId::parse(id)?,
        None => workspace.active_template().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use docsmith_core::{DocumentRecord, MemoryStore, TemplateDefaults};
    use std::sync::Arc;

    fn workspace() -> Workspace {
        let mut workspace =
            Workspace::open_with_backend(Arc::new(MemoryStore::new()), TemplateDefaults::today());
        workspace.update_record("hld".into(), DocumentRecord::empty());
        workspace.update_record("prd".into(), DocumentRecord::empty());
        workspace
    }

    #[test]
    fn test_reset_named_template() {
        let mut workspace = workspace();
        let output = Output::new(OutputFormat::Quiet);

        reset(
            &mut workspace,
            false,
            Some("hld".to_string()),
            true,
            Prompt::Disabled,
            &output,
        )
        .unwrap();

        assert!(!workspace.store().is_saved(&"hld".into()));
        assert!(workspace.store().is_saved(&"prd".into()));
    }

    #[test]
    fn test_reset_all() {
        let mut workspace = workspace();
        let output = Output::new(OutputFormat::Json);

        reset(&mut workspace, true, None, false, Prompt::Disabled, &output).unwrap();

        assert!(workspace.store().saved_template_ids().is_empty());
        assert_eq!(workspace.active_template().as_str(), "prd");
    }

    #[test]
    fn test_human_reset_in_shell_requires_yes() {
        let mut workspace = workspace();
        let output = Output::new(OutputFormat::Human);

        let err = reset(&mut workspace, true, None, false, Prompt::Disabled, &output).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(workspace.store().saved_template_ids().len(), 2);
    }
}
