//! Template identifiers and the template catalog
//!
//! A `TemplateId` is an opaque string key. Any string is accepted as an id;
//! the catalog only knows which ids have a schema and an exporter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template activated on first run and after a full reset
pub const DEFAULT_TEMPLATE: &str = "prd";

/// Errors constructing a template id from user input
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateIdError {
    #[error("Template id must not be empty")]
    Empty,
}

/// Opaque template identifier (e.g. "prd", "hld")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Create an id from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse user input, rejecting blank ids
    pub fn parse(input: &str) -> Result<Self, TemplateIdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TemplateIdError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The known template kind for this id, if any
    pub fn kind(&self) -> Option<TemplateKind> {
        TemplateKind::from_id(&self.0)
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TemplateId {
    type Err = TemplateIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for TemplateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<TemplateKind> for TemplateId {
    fn from(kind: TemplateKind) -> Self {
        Self::new(kind.id())
    }
}

/// Templates that have a schema, a default record and an exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Product requirements document
    Prd,
    /// High-level design
    Hld,
    /// Low-level design
    Lld,
    /// Database design document
    Dbdd,
    /// Product prototype specification
    Prototype,
    /// Software requirements specification
    Srs,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::Prd,
        TemplateKind::Hld,
        TemplateKind::Lld,
        TemplateKind::Dbdd,
        TemplateKind::Prototype,
        TemplateKind::Srs,
    ];

    pub fn id(self) -> &'static str {
        match self {
            TemplateKind::Prd => "prd",
            TemplateKind::Hld => "hld",
            TemplateKind::Lld => "lld",
            TemplateKind::Dbdd => "dbdd",
            TemplateKind::Prototype => "prototype",
            TemplateKind::Srs => "srs",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// Availability of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateStatus {
    Available,
    ComingSoon,
}

/// One entry of the navigation catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub status: TemplateStatus,
}

impl TemplateInfo {
    pub fn is_available(&self) -> bool {
        self.status == TemplateStatus::Available
    }
}

/// All templates shown in navigation, in display order
pub const CATALOG: &[TemplateInfo] = &[
    TemplateInfo {
        id: "prd",
        name: "PRD",
        description: "Product requirements document",
        status: TemplateStatus::Available,
    },
    TemplateInfo {
        id: "hld",
        name: "HLD",
        description: "High-level design specification",
        status: TemplateStatus::Available,
    },
    TemplateInfo {
        id: "lld",
        name: "LLD",
        description: "Low-level design specification",
        status: TemplateStatus::Available,
    },
    TemplateInfo {
        id: "dbdd",
        name: "DBDD",
        description: "Database design document",
        status: TemplateStatus::Available,
    },
    TemplateInfo {
        id: "prototype",
        name: "Prototype",
        description: "Product prototype design document",
        status: TemplateStatus::Available,
    },
    TemplateInfo {
        id: "srs",
        name: "SRS",
        description: "Software requirements specification",
        status: TemplateStatus::Available,
    },
    TemplateInfo {
        id: "brd",
        name: "BRD",
        description: "Business requirements document",
        status: TemplateStatus::ComingSoon,
    },
    TemplateInfo {
        id: "mrd",
        name: "MRD",
        description: "Market requirements document",
        status: TemplateStatus::ComingSoon,
    },
    TemplateInfo {
        id: "project-plan",
        name: "Project plan",
        description: "Project management plan",
        status: TemplateStatus::ComingSoon,
    },
];

/// Look up a catalog entry by id
pub fn lookup(id: &TemplateId) -> Option<&'static TemplateInfo> {
    CATALOG.iter().find(|info| info.id == id.as_str())
}
