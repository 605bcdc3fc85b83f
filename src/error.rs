//! Per-record errors and the warnings collected during a run

use std::fmt::{self, Display};

use thiserror::Error;

use crate::model::EntityKind;

/// Why a single record couldn't be mapped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("row {row}: missing required field \"{field}\" ({context})")]
    MissingField {
        row: usize,
        field: &'static str,
        /// the identifying fields that were present
        context: String,
    },

    /// The same identifier was derived for two different kinds of
    /// entity.  This means the key derivation is broken and the graph
    /// can't be trusted.
    #[error("identifier {id} belongs to a {existing}, can't use it for a {requested}")]
    IdentityCollision {
        id: String,
        existing: EntityKind,
        requested: EntityKind,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingField,
    UnparsableGeneId,
    UnparsablePublicationId,
    MalformedTableLine,
    UnknownOrganism,
}

/// A recoverable problem: a skipped record, a degraded cell or a
/// skipped reference table line
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConversionWarning {
    /// The record index, if the warning is about a record
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub row: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

impl ConversionWarning {
    pub fn new(row: Option<usize>, kind: WarningKind, message: String) -> ConversionWarning {
        ConversionWarning {
            row,
            kind,
            message,
        }
    }
}

impl Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(row) = self.row {
            write!(f, "row {}: {}", row, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}
