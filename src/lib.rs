// Copyright (c) 2025 - Cowboy AI, Inc.
//! Vagrant environments for the Composable Information Machine
//!
//! A validated model of multi-machine Vagrant environments, the rules that
//! decide whether an environment is well formed, and a deterministic renderer
//! that turns it into a `Vagrantfile`.
//!
//! - [`domain`] - entities, value objects and the validation engine
//! - [`projection`] - Vagrantfile rendering
//! - [`store`] - repository and catalog seams with in-memory implementations
//! - [`migration`] - loading stored projects across schema versions
//! - [`service`] - generate/download/validate entry points
//! - [`config`] - environment-driven generator settings

pub mod config;
pub mod domain;
pub mod errors;
pub mod migration;
pub mod projection;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::GeneratorConfig;
pub use domain::{Project, ProjectValidation, ValidationOptions, ValidationReport, VirtualMachine};
pub use errors::{VagrantfileError, VagrantfileResult};
pub use migration::{MigrationFailure, MigrationIssue, StoredProjectRecord};
pub use projection::{GeneratedVagrantfile, GenerationResponse, VagrantfileRenderer};
pub use service::{GenerationService, VagrantfileDownload, VagrantfileService};
