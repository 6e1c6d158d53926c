// Copyright (c) 2025 - Cowboy AI, Inc.
//! Storage Seams
//!
//! Persistence is owned by the surrounding application. The generation core
//! only needs three read paths, each behind a trait:
//!
//! ```text
//! ProjectRepository ──> Project ──┐
//!                                 ├──> VagrantfileRenderer ──> Vagrantfile
//! ProvisionerCatalog ─> by ID  ───┤
//! TriggerCatalog ─────> by ID  ───┘
//! ```
//!
//! Catalog lookups return `None` for unknown IDs; the renderer skips stale
//! references instead of failing.

use uuid::Uuid;

use crate::domain::{GlobalProvisioner, GlobalTrigger, Project, ProjectSummary};
use crate::errors::VagrantfileResult;

pub mod memory;

pub use memory::{InMemoryProjects, InMemoryProvisioners, InMemoryTriggers};

/// Project persistence as seen by the generation service
pub trait ProjectRepository: Send + Sync {
    /// Load a project by ID, `Ok(None)` when it does not exist
    fn get_project(&self, id: &Uuid) -> VagrantfileResult<Option<Project>>;

    /// Insert or replace a project
    fn save_project(&self, project: Project) -> VagrantfileResult<()>;

    /// Remove a project and everything it owns
    ///
    /// Returns whether a project was removed.
    fn delete_project(&self, id: &Uuid) -> VagrantfileResult<bool>;

    /// Summaries of every stored project
    fn list_projects(&self) -> VagrantfileResult<Vec<ProjectSummary>>;
}

/// Lookup of shared provisioners by ID
pub trait ProvisionerCatalog: Send + Sync {
    fn get_provisioner(&self, id: &str) -> Option<GlobalProvisioner>;
}

/// Lookup of shared triggers by ID
pub trait TriggerCatalog: Send + Sync {
    fn get_trigger(&self, id: &str) -> Option<GlobalTrigger>;
}

/// Catalog with no entries
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl ProvisionerCatalog for EmptyCatalog {
    fn get_provisioner(&self, _id: &str) -> Option<GlobalProvisioner> {
        None
    }
}

impl TriggerCatalog for EmptyCatalog {
    fn get_trigger(&self, _id: &str) -> Option<GlobalTrigger> {
        None
    }
}
