//! Docsmith Core Library
//!
//! This crate provides the core functionality for Docsmith, a local-first
//! builder for structured software design documents (PRD, HLD, LLD, DBDD,
//! prototype and SRS templates) that exports each one as Markdown.
//!
//! # Architecture
//!
//! - **DocumentStore**: in-memory source of truth, one record per template
//! - **PersistenceBridge**: best-effort durable mirror in a key-value store
//! - **Schemas**: typed per-template records, defaults and exporters
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut workspace = Workspace::open(&config)?;
//!
//! workspace.set_active_template("hld".into());
//! workspace.edit(&FieldEdit::SetText {
//!     field: "systemName".into(),
//!     value: "Billing".into(),
//! })?;
//!
//! let outcome = workspace.export_current(&config.exports_dir())?;
//! ```
//!
//! # Modules
//!
//! - `workspace`: store plus mirror (main entry point)
//! - `store`: pure state transitions
//! - `record`: opaque record values
//! - `edit`: field-level edits producing whole records
//! - `schema`: per-template schemas and Markdown export
//! - `template`: template ids and the catalog
//! - `storage`: backing stores, mirror and debounced writer
//! - `status`: derived status signals
//! - `config`: Application configuration

pub mod config;
pub mod edit;
pub mod record;
pub mod schema;
pub mod status;
pub mod storage;
pub mod store;
pub mod template;
pub mod workspace;

pub use config::Config;
pub use edit::{EditError, FieldEdit};
pub use record::{DocumentRecord, Row};
pub use schema::{Export, ExportError, TemplateDefaults};
pub use status::{DataStatus, StatusReport, StorageStatus};
pub use storage::{
    Availability, FileStore, KeyValueStore, MemoryStore, MirrorWriter, NoopStore,
    PersistResult, PersistenceBridge, StorageError,
};
pub use store::{DocumentStore, DocumentStoreState, RecordFactory};
pub use template::{TemplateId, TemplateInfo, TemplateKind, TemplateStatus, CATALOG};
pub use workspace::{ExportOutcome, Workspace};
