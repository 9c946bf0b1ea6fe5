//! Field-level record edits
//!
//! Each edit takes the current record and produces the complete next one;
//! the store only ever sees whole records. When the template is known the
//! result is re-parsed against its schema so an edit can never leave a
//! record the exporter would reject.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::{DocumentRecord, Row};
use crate::schema::ExportError;
use crate::template::TemplateKind;

/// Errors applying an edit
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Record is not an object")]
    NotAnObject,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{field}' is not {expected}")]
    WrongKind {
        field: String,
        expected: &'static str,
    },

    #[error("Index {index} is out of range for '{field}' ({len} entries)")]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("Unknown column '{column}' in '{field}'")]
    UnknownColumn { field: String, column: String },

    #[error("No section '{section}' in '{field}'")]
    UnknownSection { field: String, section: String },

    #[error(transparent)]
    Schema(#[from] ExportError),
}

/// One change to one field of a record
///
/// Indexes are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    SetText {
        field: String,
        value: String,
    },

    AddRow {
        field: String,
    },
    RemoveRow {
        field: String,
        index: usize,
    },
    SetCell {
        field: String,
        index: usize,
        column: String,
        value: String,
    },

    AddItem {
        field: String,
        value: String,
    },
    RemoveItem {
        field: String,
        index: usize,
    },
    SetItem {
        field: String,
        index: usize,
        value: String,
    },

    AddSectionRow {
        field: String,
        section: String,
    },
    RemoveSectionRow {
        field: String,
        section: String,
        index: usize,
    },
    SetSectionCell {
        field: String,
        section: String,
        index: usize,
        column: String,
        value: String,
    },
}

impl FieldEdit {
    /// Name of the top-level field this edit touches
    pub fn field(&self) -> &str {
        match self {
            FieldEdit::SetText { field, .. }
            | FieldEdit::AddRow { field }
            | FieldEdit::RemoveRow { field, .. }
            | FieldEdit::SetCell { field, .. }
            | FieldEdit::AddItem { field, .. }
            | FieldEdit::RemoveItem { field, .. }
            | FieldEdit::SetItem { field, .. }
            | FieldEdit::AddSectionRow { field, .. }
            | FieldEdit::RemoveSectionRow { field, .. }
            | FieldEdit::SetSectionCell { field, .. } => field,
        }
    }
}

/// Apply an edit, returning the next record
///
/// `kind` is the template the record belongs to. Without one the edit is
/// applied structurally: text and list items may create missing fields.
pub fn apply(
    record: &DocumentRecord,
    edit: &FieldEdit,
    kind: Option<TemplateKind>,
) -> Result<DocumentRecord, EditError> {
    let mut next = record.clone();
    let fields = next.fields_mut().ok_or(EditError::NotAnObject)?;

    match edit {
        FieldEdit::SetText { field, value } => {
            match fields.get_mut(field) {
                Some(Value::String(text)) => *text = value.clone(),
                Some(_) => return Err(wrong_kind(field, "a text field")),
                None if kind.is_none() => {
                    fields.insert(field.clone(), Value::String(value.clone()));
                }
                None => return Err(EditError::UnknownField(field.clone())),
            }
        }

        FieldEdit::AddRow { field } => {
            let seed = kind.and_then(|kind| seed_row(kind, field));
            let rows = array_mut(fields, field, "a table")?;
            let new_row = match seed {
                Some(seed) => seed,
                None => rows.first().map(blank_like).unwrap_or_default(),
            };
            rows.push(row_value(new_row));
        }
        FieldEdit::RemoveRow { field, index } => {
            let rows = array_mut(fields, field, "a table")?;
            remove_at(rows, field, *index)?;
        }
        FieldEdit::SetCell {
            field,
            index,
            column,
            value,
        } => {
            let rows = array_mut(fields, field, "a table")?;
            set_cell(rows, field, *index, column, value)?;
        }

        FieldEdit::AddItem { field, value } => {
            if kind.is_none() && !fields.contains_key(field) {
                fields.insert(field.clone(), Value::Array(Vec::new()));
            }
            let items = array_mut(fields, field, "a list")?;
            items.push(Value::String(value.clone()));
        }
        FieldEdit::RemoveItem { field, index } => {
            let items = array_mut(fields, field, "a list")?;
            remove_at(items, field, *index)?;
        }
        FieldEdit::SetItem {
            field,
            index,
            value,
        } => {
            let items = array_mut(fields, field, "a list")?;
            let len = items.len();
            match items.get_mut(*index) {
                Some(Value::String(item)) => *item = value.clone(),
                Some(_) => return Err(wrong_kind(field, "a list of text")),
                None => return Err(out_of_range(field, *index, len)),
            }
        }

        FieldEdit::AddSectionRow { field, section } => {
            let seed = kind.and_then(|kind| kind.section_row(field));
            let sections = sections_mut(fields, field)?;
            let new_row = match seed {
                Some(seed) => seed,
                None => sections
                    .values()
                    .filter_map(Value::as_array)
                    .find_map(|rows| rows.first())
                    .map(blank_like)
                    .unwrap_or_default(),
            };
            let rows = sections
                .entry(section.clone())
                .or_insert_with(|| Value::Array(Vec::new()))
                .as_array_mut()
                .ok_or_else(|| wrong_kind(field, "a map of tables"))?;
            rows.push(row_value(new_row));
        }
        FieldEdit::RemoveSectionRow {
            field,
            section,
            index,
        } => {
            let rows = section_rows_mut(fields, field, section)?;
            remove_at(rows, field, *index)?;
        }
        FieldEdit::SetSectionCell {
            field,
            section,
            index,
            column,
            value,
        } => {
            let rows = section_rows_mut(fields, field, section)?;
            set_cell(rows, field, *index, column, value)?;
        }
    }

    if let Some(kind) = kind {
        kind.validate(&next)?;
    }
    Ok(next)
}

/// Columns of the first seeded row of a template's table field
fn seed_row(kind: TemplateKind, field: &str) -> Option<Row> {
    let defaults = kind.default_record(NaiveDate::MIN);
    let first = defaults.fields()?.get(field)?.as_array()?.first()?;
    Some(blank_like(first))
}

/// Same columns as `row`, every cell empty
fn blank_like(row: &Value) -> Row {
    row.as_object()
        .map(|cells| {
            cells
                .keys()
                .map(|column| (column.clone(), String::new()))
                .collect()
        })
        .unwrap_or_default()
}

fn row_value(row: Row) -> Value {
    Value::Object(
        row.into_iter()
            .map(|(column, value)| (column, Value::String(value)))
            .collect(),
    )
}

fn wrong_kind(field: &str, expected: &'static str) -> EditError {
    EditError::WrongKind {
        field: field.to_string(),
        expected,
    }
}

fn out_of_range(field: &str, index: usize, len: usize) -> EditError {
    EditError::IndexOutOfRange {
        field: field.to_string(),
        index,
        len,
    }
}

fn array_mut<'a>(
    fields: &'a mut Map<String, Value>,
    field: &str,
    expected: &'static str,
) -> Result<&'a mut Vec<Value>, EditError> {
    fields
        .get_mut(field)
        .ok_or_else(|| EditError::UnknownField(field.to_string()))?
        .as_array_mut()
        .ok_or_else(|| wrong_kind(field, expected))
}

fn sections_mut<'a>(
    fields: &'a mut Map<String, Value>,
    field: &str,
) -> Result<&'a mut Map<String, Value>, EditError> {
    fields
        .get_mut(field)
        .ok_or_else(|| EditError::UnknownField(field.to_string()))?
        .as_object_mut()
        .ok_or_else(|| wrong_kind(field, "a map of tables"))
}

fn section_rows_mut<'a>(
    fields: &'a mut Map<String, Value>,
    field: &str,
    section: &str,
) -> Result<&'a mut Vec<Value>, EditError> {
    sections_mut(fields, field)?
        .get_mut(section)
        .ok_or_else(|| EditError::UnknownSection {
            field: field.to_string(),
            section: section.to_string(),
        })?
        .as_array_mut()
        .ok_or_else(|| wrong_kind(field, "a map of tables"))
}

fn remove_at(values: &mut Vec<Value>, field: &str, index: usize) -> Result<(), EditError> {
    if index >= values.len() {
        return Err(out_of_range(field, index, values.len()));
    }
    values.remove(index);
    Ok(())
}

fn set_cell(
    rows: &mut [Value],
    field: &str,
    index: usize,
    column: &str,
    value: &str,
) -> Result<(), EditError> {
    let len = rows.len();
    let cells = rows
        .get_mut(index)
        .ok_or_else(|| out_of_range(field, index, len))?
        .as_object_mut()
        .ok_or_else(|| wrong_kind(field, "a table"))?;
    match cells.get_mut(column) {
        Some(cell) => {
            *cell = Value::String(value.to_string());
            Ok(())
        }
        None => Err(EditError::UnknownColumn {
            field: field.to_string(),
            column: column.to_string(),
        }),
    }
}
