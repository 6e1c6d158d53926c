// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-Memory Stores
//!
//! Used by tests and by the `vagrantfile-gen` binary, which loads catalogs
//! from JSON files.

use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use super::{ProjectRepository, ProvisionerCatalog, TriggerCatalog};
use crate::domain::{DomainError, GlobalProvisioner, GlobalTrigger, Project, ProjectSummary};
use crate::errors::{VagrantfileError, VagrantfileResult};

fn poisoned<T>(_: PoisonError<T>) -> VagrantfileError {
    VagrantfileError::Storage("project store lock poisoned".to_string())
}

/// Projects held in insertion order behind a lock
#[derive(Debug, Default)]
pub struct InMemoryProjects {
    projects: RwLock<Vec<Project>>,
}

impl InMemoryProjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, project: Project) -> VagrantfileResult<Self> {
        self.save_project(project)?;
        Ok(self)
    }
}

impl ProjectRepository for InMemoryProjects {
    fn get_project(&self, id: &Uuid) -> VagrantfileResult<Option<Project>> {
        let projects = self.projects.read().map_err(poisoned)?;
        Ok(projects.iter().find(|p| p.id == *id).cloned())
    }

    fn save_project(&self, project: Project) -> VagrantfileResult<()> {
        let mut projects = self.projects.write().map_err(poisoned)?;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project,
            None => projects.push(project),
        }
        Ok(())
    }

    fn delete_project(&self, id: &Uuid) -> VagrantfileResult<bool> {
        let mut projects = self.projects.write().map_err(poisoned)?;
        let before = projects.len();
        projects.retain(|p| p.id != *id);
        Ok(projects.len() != before)
    }

    fn list_projects(&self) -> VagrantfileResult<Vec<ProjectSummary>> {
        let projects = self.projects.read().map_err(poisoned)?;
        Ok(projects.iter().map(Project::summary).collect())
    }
}

/// Entry of a named, ID-keyed catalog
pub trait CatalogEntry: Clone + Send + Sync {
    /// Entity kind used in error messages
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn check(&self) -> Result<(), DomainError>;
}

impl CatalogEntry for GlobalProvisioner {
    const KIND: &'static str = "Provisioner";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), DomainError> {
        self.validate().map_err(DomainError::from)
    }
}

impl CatalogEntry for GlobalTrigger {
    const KIND: &'static str = "Trigger";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), DomainError> {
        self.validate().map_err(DomainError::from)
    }
}

/// Catalog whose entries have unique IDs and unique names
#[derive(Debug, Clone)]
pub struct InMemoryCatalog<T> {
    entries: Vec<T>,
}

impl<T> Default for InMemoryCatalog<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

pub type InMemoryProvisioners = InMemoryCatalog<GlobalProvisioner>;
pub type InMemoryTriggers = InMemoryCatalog<GlobalTrigger>;

impl<T: CatalogEntry> InMemoryCatalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, validating every entry and rejecting clashes
    pub fn from_entries(entries: impl IntoIterator<Item = T>) -> VagrantfileResult<Self> {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    /// Add an entry; a duplicate ID or name is a conflict
    pub fn insert(&mut self, entry: T) -> VagrantfileResult<()> {
        entry.check()?;

        let name = entry.name().trim();
        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.id() == entry.id() || e.name().trim() == name)
        {
            return Err(VagrantfileError::Conflict(format!(
                "{} '{}' already exists (id {})",
                T::KIND,
                existing.name(),
                existing.id()
            )));
        }

        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Replace an existing entry by ID
    pub fn update(&mut self, entry: T) -> VagrantfileResult<()> {
        entry.check()?;

        let name = entry.name().trim();
        if self
            .entries
            .iter()
            .any(|e| e.id() != entry.id() && e.name().trim() == name)
        {
            return Err(VagrantfileError::Conflict(format!(
                "{} '{}' already exists",
                T::KIND,
                name
            )));
        }

        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.id() == entry.id())
            .ok_or_else(|| VagrantfileError::not_found(T::KIND, entry.id()))?;
        *slot = entry;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        self.entries.len() != before
    }

    pub fn list(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProvisionerCatalog for InMemoryCatalog<GlobalProvisioner> {
    fn get_provisioner(&self, id: &str) -> Option<GlobalProvisioner> {
        self.get(id).cloned()
    }
}

impl TriggerCatalog for InMemoryCatalog<GlobalTrigger> {
    fn get_trigger(&self, id: &str) -> Option<GlobalTrigger> {
        self.get(id).cloned()
    }
}
