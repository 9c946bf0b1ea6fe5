//! Record viewing and field edits

use anyhow::{bail, Context, Result};

use docsmith_core::{FieldEdit, TemplateId, Workspace};

use crate::editor;
use crate::output::Output;
use crate::Prompt;

/// Show the active (or another) template's record
pub fn show(workspace: &Workspace, template: Option<String>, output: &Output) -> Result<()> {
    let id = match template {
        Some(id) => TemplateId::parse(&id)?,
        None => workspace.active_template().clone(),
    };

    let record = workspace.record_for(&id);
    output.print_record(&id, &record, workspace.store().is_saved(&id));
    Ok(())
}

/// Set a text field, opening $EDITOR when no value is given
pub fn set(
    workspace: &mut Workspace,
    field: String,
    value: Option<String>,
    prompt: Prompt,
    output: &Output,
) -> Result<()> {
    let value = match value {
        Some(value) => value,
        None if prompt == Prompt::Allowed && editor::is_interactive() => {
            let current = workspace.current_record();
            let text = match current.as_value().get(&field) {
                Some(value) => value
                    .as_str()
                    .with_context(|| format!("Field '{}' is not a text field", field))?
                    .to_string(),
                None => String::new(),
            };
            editor::edit_text(&text)?
        }
        None => bail!("Missing value for '{}'", field),
    };

    apply(workspace, FieldEdit::SetText { field, value }, output)
}

/// Apply an edit to the active template and persist it
pub fn apply(workspace: &mut Workspace, edit: FieldEdit, output: &Output) -> Result<()> {
    let template = workspace.active_template().clone();
    let result = workspace
        .edit(&edit)
        .with_context(|| format!("Cannot edit {}.{}", template, edit.field()))?;

    output.warn_persist(&result);
    output.success(&describe(&template, &edit));
    Ok(())
}

/// One-line summary of an applied edit
fn describe(template: &TemplateId, edit: &FieldEdit) -> String {
    match edit {
        FieldEdit::SetText { field, .. } => format!("Set {}.{}", template, field),
        FieldEdit::AddRow { field } => format!("Added a row to {}.{}", template, field),
        FieldEdit::RemoveRow { field, index } => {
            format!("Removed row {} from {}.{}", index, template, field)
        }
        FieldEdit::SetCell {
            field,
            index,
            column,
            ..
        } => format!("Set {}.{}[{}].{}", template, field, index, column),
        FieldEdit::AddItem { field, .. } => format!("Added an item to {}.{}", template, field),
        FieldEdit::RemoveItem { field, index } => {
            format!("Removed item {} from {}.{}", index, template, field)
        }
        FieldEdit::SetItem { field, index, .. } => {
            format!("Set {}.{}[{}]", template, field, index)
        }
        FieldEdit::AddSectionRow { field, section } => {
            format!("Added a row to {}.{}[{}]", template, field, section)
        }
        FieldEdit::RemoveSectionRow {
            field,
            section,
            index,
        } => format!(
            "Removed row {} from {}.{}[{}]",
            index, template, field, section
        ),
        FieldEdit::SetSectionCell {
            field,
            section,
            index,
            column,
            ..
        } => format!(
            "Set {}.{}[{}][{}].{}",
            template, field, section, index, column
        ),
    }
}
