// Copyright (c) 2025 - Cowboy AI, Inc.
//! Vagrant Environment Domain Models
//!
//! The entity model a Vagrantfile is rendered from. Every entity validates
//! itself on construction; the [`invariants`] module re-scores assembled
//! projects without mutating them.
//!
//! # Value Objects with Invariants
//!
//! - [`NetworkInterface`] - private, public and forwarded-port attachments
//! - [`Netmask`] - dotted-decimal or CIDR prefix
//! - [`Hostname`] - guest hostname
//! - [`VmName`], [`ProjectName`], [`PluginName`] - user chosen identifiers
//! - [`SyncedFolder`] - host-to-guest directory mapping
//! - [`ConfigValue`] / [`ConfigMap`] - ordered, typed option maps
//!
//! # Entities
//!
//! - [`Provisioner`] - VM-scoped shell or configuration-management step
//! - [`PluginConfiguration`] - enabled Vagrant plugin with settings
//! - [`GlobalProvisioner`] / [`GlobalTrigger`] - shared catalog fragments
//! - [`VirtualMachine`] - one guest definition
//! - [`Project`] - root container, owns its VMs

pub mod config_value;
pub mod error;
pub mod global_provisioner;
pub mod global_trigger;
pub mod hostname;
pub mod invariants;
pub mod names;
pub mod network;
pub mod plugin;
pub mod project;
pub mod provisioner;
pub mod synced_folder;
pub mod timestamp;
pub mod virtual_machine;

pub use config_value::{ConfigMap, ConfigValue};
pub use error::DomainError;
pub use global_provisioner::{GlobalProvisioner, RunMode, ShellProvisionerConfig};
pub use global_trigger::{
    GlobalTrigger, OnError, TriggerAction, TriggerConfig, TriggerConfigRecord, TriggerError,
    TriggerTiming,
};
pub use hostname::{Hostname, HostnameError};
pub use invariants::{
    validate_network_interface, validate_project, validate_vagrantfile_syntax, validate_vm,
    ProjectValidation, ValidationReport,
};
pub use names::{check_text_length, NameError, PluginName, ProjectName, VmName};
pub use network::{
    IpAssignment, Netmask, NetworkError, NetworkInterface, NetworkInterfaceDraft, NetworkType,
    Protocol, ValidationOptions,
};
pub use plugin::{PluginConfiguration, PluginDraft, PluginError, PluginScope};
pub use project::{DeploymentStatus, Project, ProjectSummary};
pub use provisioner::{
    Provisioner, ProvisionerDraft, ProvisionerError, ProvisionerType, ShellProvisioner,
    ShellSource,
};
pub use synced_folder::{FolderError, SyncedFolder, SyncedFolderDraft};
pub use virtual_machine::{VirtualMachine, VirtualMachineDraft, VmError};
