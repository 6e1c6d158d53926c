// Copyright (c) 2025 - Cowboy AI, Inc.
//! Synced Folder Value Object

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ConfigMap;

/// Synced folder validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FolderError {
    #[error("Host path cannot be empty")]
    EmptyHostPath,

    #[error("Guest path cannot be empty")]
    EmptyGuestPath,

    #[error("Guest path must be absolute (start with /): {0}")]
    RelativeGuestPath(String),

    #[error("Guest path cannot contain '..' references: {0}")]
    ParentReference(String),
}

/// Raw synced folder data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncedFolderDraft {
    pub host_path: String,
    pub guest_path: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub options: ConfigMap,
}

/// Host-to-guest directory mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncedFolder {
    pub host_path: String,
    pub guest_path: String,
    pub disabled: bool,
    pub options: ConfigMap,
}

impl SyncedFolder {
    /// Guest directories that usually belong to the guest OS
    pub const SYSTEM_GUEST_PATHS: [&'static str; 5] = ["/etc", "/bin", "/usr", "/var/log", "/tmp"];

    /// Create a synced folder with validation
    ///
    /// # Invariants
    /// - Host path non-empty (trimmed)
    /// - Guest path absolute with no `..` segment
    pub fn new(
        host_path: impl Into<String>,
        guest_path: impl Into<String>,
    ) -> Result<Self, FolderError> {
        Self::from_draft(SyncedFolderDraft {
            host_path: host_path.into(),
            guest_path: guest_path.into(),
            ..Default::default()
        })
    }

    pub fn from_draft(draft: SyncedFolderDraft) -> Result<Self, FolderError> {
        let host_path = draft.host_path.trim().to_string();
        if host_path.is_empty() {
            return Err(FolderError::EmptyHostPath);
        }

        let guest_path = draft.guest_path.trim().to_string();
        if guest_path.is_empty() {
            return Err(FolderError::EmptyGuestPath);
        }
        if !guest_path.starts_with('/') {
            return Err(FolderError::RelativeGuestPath(guest_path));
        }
        if guest_path.split('/').any(|segment| segment == "..") {
            return Err(FolderError::ParentReference(guest_path));
        }

        Ok(Self {
            host_path,
            guest_path,
            disabled: draft.disabled,
            options: draft.options,
        })
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_options(mut self, options: ConfigMap) -> Self {
        self.options = options;
        self
    }

    /// Whether the guest path falls under a directory owned by the guest OS
    pub fn targets_system_directory(&self) -> bool {
        Self::SYSTEM_GUEST_PATHS.iter().any(|p| {
            self.guest_path == *p || self.guest_path.starts_with(&format!("{}/", p))
        })
    }

    pub fn to_draft(&self) -> SyncedFolderDraft {
        SyncedFolderDraft {
            host_path: self.host_path.clone(),
            guest_path: self.guest_path.clone(),
            disabled: self.disabled,
            options: self.options.clone(),
        }
    }
}
