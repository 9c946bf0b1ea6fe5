//! Per-template schemas, default records and Markdown exporters
//!
//! The store treats records as opaque JSON. This module is the typed side:
//! each available template has a struct that fixes its field names and
//! kinds, a total default factory, and a deterministic exporter.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::record::{DocumentRecord, Row};
use crate::store::RecordFactory;
use crate::template::{TemplateId, TemplateKind};

mod markdown;

pub mod dbdd;
pub mod hld;
pub mod lld;
pub mod prd;
pub mod prototype;
pub mod srs;

pub use dbdd::DbddRecord;
pub use hld::HldRecord;
pub use lld::LldRecord;
pub use prd::PrdRecord;
pub use prototype::PrototypeRecord;
pub use srs::SrsRecord;

/// Errors turning a record into an export artifact
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Template '{0}' has no exporter")]
    NoExporter(TemplateId),

    #[error("Record for '{template}' does not match its template: {source}")]
    SchemaMismatch {
        template: TemplateId,
        #[source]
        source: serde_json::Error,
    },
}

/// A rendered document, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub markdown: String,
}

/// Typed view of one template's record
pub trait TemplateSchema: Serialize + DeserializeOwned {
    const KIND: TemplateKind;

    /// Total default record; `today` fills the date fields
    fn with_defaults(today: NaiveDate) -> Self;

    /// File name offered for the exported document
    fn export_file_name(&self) -> String;

    fn render_markdown(&self) -> String;

    /// Template for new rows of a keyed section field
    fn section_row(_field: &str) -> Option<Row> {
        None
    }
}

/// File-name stem from a user field, or `fallback` when it is blank
pub(crate) fn file_stem_or(name: &str, fallback: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return fallback.to_string();
    }
    name.chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect()
}

/// Schema structs hold only strings, lists and string-keyed maps, so
/// serializing them does not fail in practice
fn default_typed<T: TemplateSchema>(today: NaiveDate) -> DocumentRecord {
    match DocumentRecord::from_typed(&T::with_defaults(today)) {
        Ok(record) => record,
        Err(e) => {
            warn!("Cannot build default {} record: {}", T::KIND.id(), e);
            DocumentRecord::empty()
        }
    }
}

fn parse<T: TemplateSchema>(record: &DocumentRecord) -> Result<T, ExportError> {
    record
        .to_typed::<T>()
        .map_err(|source| ExportError::SchemaMismatch {
            template: T::KIND.into(),
            source,
        })
}

fn export_typed<T: TemplateSchema>(record: &DocumentRecord) -> Result<Export, ExportError> {
    let typed = parse::<T>(record)?;
    Ok(Export {
        file_name: typed.export_file_name(),
        markdown: typed.render_markdown(),
    })
}

impl TemplateKind {
    /// Default record for this template
    pub fn default_record(self, today: NaiveDate) -> DocumentRecord {
        match self {
            TemplateKind::Prd => default_typed::<PrdRecord>(today),
            TemplateKind::Hld => default_typed::<HldRecord>(today),
            TemplateKind::Lld => default_typed::<LldRecord>(today),
            TemplateKind::Dbdd => default_typed::<DbddRecord>(today),
            TemplateKind::Prototype => default_typed::<PrototypeRecord>(today),
            TemplateKind::Srs => default_typed::<SrsRecord>(today),
        }
    }

    /// Check that a record has exactly this template's shape
    pub fn validate(self, record: &DocumentRecord) -> Result<(), ExportError> {
        match self {
            TemplateKind::Prd => parse::<PrdRecord>(record).map(drop),
            TemplateKind::Hld => parse::<HldRecord>(record).map(drop),
            TemplateKind::Lld => parse::<LldRecord>(record).map(drop),
            TemplateKind::Dbdd => parse::<DbddRecord>(record).map(drop),
            TemplateKind::Prototype => parse::<PrototypeRecord>(record).map(drop),
            TemplateKind::Srs => parse::<SrsRecord>(record).map(drop),
        }
    }

    /// Render a record of this template
    pub fn export(self, record: &DocumentRecord) -> Result<Export, ExportError> {
        match self {
            TemplateKind::Prd => export_typed::<PrdRecord>(record),
            TemplateKind::Hld => export_typed::<HldRecord>(record),
            TemplateKind::Lld => export_typed::<LldRecord>(record),
            TemplateKind::Dbdd => export_typed::<DbddRecord>(record),
            TemplateKind::Prototype => export_typed::<PrototypeRecord>(record),
            TemplateKind::Srs => export_typed::<SrsRecord>(record),
        }
    }

    /// Template for new rows of a keyed section field
    pub fn section_row(self, field: &str) -> Option<Row> {
        match self {
            TemplateKind::Dbdd => DbddRecord::section_row(field),
            _ => None,
        }
    }
}

/// Render any template's record
pub fn export(id: &TemplateId, record: &DocumentRecord) -> Result<Export, ExportError> {
    match id.kind() {
        Some(kind) => kind.export(record),
        None => Err(ExportError::NoExporter(id.clone())),
    }
}

/// Default-record factory for every template id
///
/// Known templates get their full default record; anything else gets an
/// empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateDefaults {
    today: NaiveDate,
}

impl TemplateDefaults {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Defaults dated with the local calendar day
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.today
    }
}

impl RecordFactory for TemplateDefaults {
    fn default_record(&self, id: &TemplateId) -> DocumentRecord {
        match id.kind() {
            Some(kind) => kind.default_record(self.today),
            None => DocumentRecord::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use serde_json::json;

    fn defaults() -> TemplateDefaults {
        TemplateDefaults::new(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
    }

    #[test]
    fn test_default_records_validate_and_export() {
        for kind in TemplateKind::ALL {
            let record = defaults().default_record(&kind.into());
            kind.validate(&record).unwrap();

            let export = kind.export(&record).unwrap();
            assert!(export.file_name.ends_with(".md"), "{}", export.file_name);
            assert!(export.markdown.ends_with('\n'));
        }
    }

    #[test]
    fn test_unknown_template_defaults_to_empty() {
        let record = defaults().default_record(&"brd".into());
        assert_eq!(record, DocumentRecord::empty());
    }

    #[test]
    fn test_export_unknown_template() {
        let err = export(&"brd".into(), &DocumentRecord::empty()).unwrap_err();
        assert!(matches!(err, ExportError::NoExporter(_)));
    }

    #[test]
    fn test_export_rejects_incomplete_record() {
        let record = DocumentRecord::from(json!({ "systemName": "Orders" }));
        let err = export(&"dbdd".into(), &record).unwrap_err();
        assert!(matches!(err, ExportError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("dbdd"));
    }

    #[test]
    fn test_export_rejects_unknown_field() {
        let mut record = defaults().default_record(&"hld".into()).into_value();
        record["bogus"] = json!("x");
        assert!(TemplateKind::Hld
            .validate(&DocumentRecord::from(record))
            .is_err());
    }

    #[test]
    fn test_export_is_byte_for_byte_reproducible() {
        let record = defaults().default_record(&"srs".into());
        assert_eq!(
            export(&"srs".into(), &record).unwrap(),
            export(&"srs".into(), &record).unwrap()
        );
    }

    #[test]
    fn test_store_current_record_uses_template_defaults() {
        let mut store = DocumentStore::new();
        store.set_active_template("dbdd".into());

        let current = store.current_record(&defaults());
        assert_eq!(current.as_value()["systemName"], json!(""));
        assert_eq!(current.as_value()["date"], json!("2024-05-20"));
    }

    #[test]
    fn test_file_stem_or() {
        assert_eq!(file_stem_or("  ", "HLD"), "HLD");
        assert_eq!(file_stem_or("orders/v2", "x"), "orders-v2");
    }

    #[test]
    fn test_version_cannot_escape_export_dir() {
        for kind in TemplateKind::ALL {
            let mut value = defaults().default_record(&kind.into()).into_value();
            let Some(object) = value.as_object_mut() else {
                panic!("default record is not an object");
            };
            if !object.contains_key("version") {
                continue;
            }
            object.insert("version".to_string(), json!("a/../..\\x"));

            let export = kind.export(&DocumentRecord::from(value)).unwrap();
            assert!(!export.file_name.contains('/'), "{}", export.file_name);
            assert!(!export.file_name.contains('\\'), "{}", export.file_name);
        }

        let mut value = defaults().default_record(&"lld".into()).into_value();
        value["version"] = json!("  ");
        let export = TemplateKind::Lld.export(&DocumentRecord::from(value)).unwrap();
        assert_eq!(export.file_name, "lld-module-v1.0.md");
    }
}
