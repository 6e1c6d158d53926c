// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain error aggregate

use thiserror::Error;

use super::{
    FolderError, HostnameError, NameError, NetworkError, PluginError, ProvisionerError,
    TriggerError, VmError,
};

/// Any failure raised while constructing or mutating domain entities
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    Hostname(#[from] HostnameError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Folder(#[from] FolderError),

    #[error(transparent)]
    Provisioner(#[from] ProvisionerError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error(transparent)]
    Vm(#[from] VmError),

    /// Name or identity clash inside a container
    #[error("{0}")]
    Conflict(String),

    /// Item addressed inside a container does not exist
    #[error("{0} not found")]
    NotFound(String),
}
