//! Storage layer
//!
//! Handles the durable mirror of the document store.
//!
//! ## Architecture
//!
//! - **Backing store**: any `KeyValueStore` (files, memory, or nothing)
//! - **Persistence bridge**: serializes the store into one versioned key
//!   and rehydrates it at startup
//! - **Mirror writer**: debounced background delivery for interactive
//!   sessions
//!
//! The in-memory store is the source of truth. Storage failures are
//! reported, never propagated into store transitions.

pub mod backend;
pub mod error;
pub mod mirror;
pub mod writer;

pub use backend::{FileStore, KeyValueStore, MemoryStore, NoopStore};
pub use error::{StorageError, StorageResult};
pub use mirror::{Availability, PersistResult, PersistenceBridge, MIRROR_KEY, NAMESPACE_PREFIX};
pub use writer::MirrorWriter;
