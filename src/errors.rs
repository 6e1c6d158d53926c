// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for Vagrantfile generation operations

use thiserror::Error;

use crate::domain::DomainError;
use crate::migration::MigrationFailure;

/// Errors surfaced to the collaborator that owns persistence and transport
///
/// The variants are deliberately coarse: callers map `NotFound` to a
/// not-found response and `Conflict` to a conflict response, everything else
/// is a rejection of the request payload or a local fault.
#[derive(Debug, Error)]
pub enum VagrantfileError {
    /// Malformed entity rejected at construction time
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Name or identity clash
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored record could not be upgraded to a validated project
    #[error("Migration error: {0}")]
    Migration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for Vagrantfile operations
pub type VagrantfileResult<T> = Result<T, VagrantfileError>;

impl VagrantfileError {
    /// Create a not-found error for a project
    pub fn project_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Project",
            id: id.to_string(),
        }
    }

    /// Create a not-found error for any other entity kind
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether this error means the referenced entity is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error is a name or identity clash
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<DomainError> for VagrantfileError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Conflict(msg) => VagrantfileError::Conflict(msg),
            DomainError::NotFound(what) => VagrantfileError::NotFound {
                kind: "Entity",
                id: what,
            },
            other => VagrantfileError::Validation(other.to_string()),
        }
    }
}

impl From<MigrationFailure> for VagrantfileError {
    fn from(err: MigrationFailure) -> Self {
        VagrantfileError::Migration(err.to_string())
    }
}

impl From<serde_json::Error> for VagrantfileError {
    fn from(err: serde_json::Error) -> Self {
        VagrantfileError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for VagrantfileError {
    fn from(err: std::io::Error) -> Self {
        VagrantfileError::Io(err.to_string())
    }
}
