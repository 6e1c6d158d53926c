// Copyright (c) 2025 - Cowboy AI, Inc.
//! Project Aggregate
//!
//! The root container handed to validation and generation. A project owns
//! its VMs by value; traversal is always project → VM → attachments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{check_text_length, DomainError, PluginConfiguration, ProjectName, VirtualMachine};

/// Whether a project is still being edited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    #[default]
    Draft,
    Ready,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multi-machine environment description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub name: ProjectName,
    pub description: String,
    pub deployment_status: DeploymentStatus,
    pub vms: Vec<VirtualMachine>,
    pub global_plugins: Vec<PluginConfiguration>,
    /// IDs into the provisioner catalog
    pub global_provisioners: Vec<String>,
    /// IDs into the trigger catalog
    pub global_triggers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Schema version of the stored form
    pub version: String,
}

impl Project {
    pub const MAX_DESCRIPTION_LENGTH: usize = 500;

    /// Schema version written by this crate
    pub const SCHEMA_VERSION: &'static str = "1.1.0";

    /// Create an empty draft project
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self, DomainError> {
        let name = ProjectName::new(name)?;
        let description = description.into();
        check_text_length("Description", &description, Self::MAX_DESCRIPTION_LENGTH)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            deployment_status: DeploymentStatus::Draft,
            vms: Vec::new(),
            global_plugins: Vec::new(),
            global_provisioners: Vec::new(),
            global_triggers: Vec::new(),
            created_at: now,
            updated_at: now,
            version: Self::SCHEMA_VERSION.to_string(),
        })
    }

    /// Replace the generated ID, e.g. with one loaded from storage
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    pub fn add_vm(&mut self, vm: VirtualMachine) -> Result<(), DomainError> {
        if self.get_vm(vm.name.as_str()).is_some() {
            return Err(DomainError::Conflict(format!(
                "VM with name '{}' already exists",
                vm.name
            )));
        }
        self.vms.push(vm);
        self.touch();
        Ok(())
    }

    pub fn remove_vm(&mut self, name: &str) -> bool {
        let before = self.vms.len();
        self.vms.retain(|vm| vm.name.as_str() != name);
        let removed = self.vms.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn get_vm(&self, name: &str) -> Option<&VirtualMachine> {
        self.vms.iter().find(|vm| vm.name.as_str() == name)
    }

    pub fn vm_mut(&mut self, name: &str) -> Option<&mut VirtualMachine> {
        self.vms.iter_mut().find(|vm| vm.name.as_str() == name)
    }

    /// Replace the VM called `name` in place, keeping its position
    ///
    /// Renaming onto another VM's name is a conflict.
    pub fn replace_vm(&mut self, name: &str, vm: VirtualMachine) -> Result<(), DomainError> {
        let index = self
            .vms
            .iter()
            .position(|existing| existing.name.as_str() == name)
            .ok_or_else(|| DomainError::NotFound(format!("VM '{}'", name)))?;

        if vm.name.as_str() != name && self.get_vm(vm.name.as_str()).is_some() {
            return Err(DomainError::Conflict(format!(
                "VM with name '{}' already exists",
                vm.name
            )));
        }

        self.vms[index] = vm;
        self.touch();
        Ok(())
    }

    pub fn add_global_plugin(&mut self, plugin: PluginConfiguration) -> Result<(), DomainError> {
        if self.global_plugins.iter().any(|p| p.name == plugin.name) {
            return Err(DomainError::Conflict(format!(
                "Plugin '{}' already configured for project",
                plugin.name
            )));
        }
        self.global_plugins.push(plugin);
        self.touch();
        Ok(())
    }

    pub fn remove_global_plugin(&mut self, name: &str) -> bool {
        let before = self.global_plugins.len();
        self.global_plugins.retain(|p| p.name.as_str() != name);
        let removed = self.global_plugins.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn attach_global_provisioner(&mut self, id: impl Into<String>) -> Result<(), DomainError> {
        let id = id.into();
        if self.global_provisioners.contains(&id) {
            return Err(DomainError::Conflict(format!(
                "Provisioner {} already attached to project",
                id
            )));
        }
        self.global_provisioners.push(id);
        self.touch();
        Ok(())
    }

    pub fn detach_global_provisioner(&mut self, id: &str) -> bool {
        let before = self.global_provisioners.len();
        self.global_provisioners.retain(|p| p != id);
        let removed = self.global_provisioners.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn attach_global_trigger(&mut self, id: impl Into<String>) -> Result<(), DomainError> {
        let id = id.into();
        if self.global_triggers.contains(&id) {
            return Err(DomainError::Conflict(format!(
                "Trigger {} already attached to project",
                id
            )));
        }
        self.global_triggers.push(id);
        self.touch();
        Ok(())
    }

    pub fn detach_global_trigger(&mut self, id: &str) -> bool {
        let before = self.global_triggers.len();
        self.global_triggers.retain(|t| t != id);
        let removed = self.global_triggers.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_deployment_status(&mut self, status: DeploymentStatus) {
        self.deployment_status = status;
        self.touch();
    }

    /// Ready projects are treated as read-only by the owning collaborator
    pub fn is_locked(&self) -> bool {
        self.deployment_status == DeploymentStatus::Ready
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn network_interfaces_count(&self) -> usize {
        self.vms.iter().map(|vm| vm.network_interfaces.len()).sum()
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id,
            name: self.name.to_string(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            vm_count: self.vms.len(),
            deployment_status: self.deployment_status,
        }
    }
}

/// Project overview for list views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub vm_count: usize,
    pub deployment_status: DeploymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PluginScope;

    fn vm(name: &str) -> VirtualMachine {
        VirtualMachine::new(name, "ubuntu/jammy64").unwrap()
    }

    #[test]
    fn test_new_project() {
        let project = Project::new("p1", "").unwrap();
        assert_eq!(project.deployment_status, DeploymentStatus::Draft);
        assert_eq!(project.version, "1.1.0");
        assert!(project.vms.is_empty());
        assert!(!project.is_locked());
    }

    #[test]
    fn test_description_limit() {
        assert!(Project::new("p1", "d".repeat(500)).is_ok());
        assert!(Project::new("p1", "d".repeat(501)).is_err());
    }

    #[test]
    fn test_duplicate_vm_name_is_conflict() {
        let mut project = Project::new("p1", "").unwrap();
        project.add_vm(vm("web")).unwrap();
        let err = project.add_vm(vm("web")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(project.vms.len(), 1);
    }

    #[test]
    fn test_replace_vm_keeps_position() {
        let mut project = Project::new("p1", "").unwrap();
        project.add_vm(vm("web")).unwrap();
        project.add_vm(vm("db")).unwrap();

        project.replace_vm("web", vm("frontend")).unwrap();
        assert_eq!(project.vms[0].name.as_str(), "frontend");

        assert!(matches!(
            project.replace_vm("frontend", vm("db")),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            project.replace_vm("missing", vm("x")),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_vm() {
        let mut project = Project::new("p1", "").unwrap();
        project.add_vm(vm("web")).unwrap();
        assert!(project.remove_vm("web"));
        assert!(!project.remove_vm("web"));
    }

    #[test]
    fn test_attach_references() {
        let mut project = Project::new("p1", "").unwrap();
        project.attach_global_provisioner("prov-1").unwrap();
        assert!(project.attach_global_provisioner("prov-1").is_err());
        project.attach_global_trigger("trig-1").unwrap();
        assert!(project.detach_global_trigger("trig-1"));
        assert!(!project.detach_global_trigger("trig-1"));
        assert!(project.detach_global_provisioner("prov-1"));
    }

    #[test]
    fn test_global_plugins_unique() {
        let mut project = Project::new("p1", "").unwrap();
        let plugin = PluginConfiguration::new("vagrant-hostmanager", PluginScope::Global).unwrap();
        project.add_global_plugin(plugin.clone()).unwrap();
        assert!(project.add_global_plugin(plugin).is_err());
        assert!(project.remove_global_plugin("vagrant-hostmanager"));
    }

    #[test]
    fn test_summary_and_lock() {
        let mut project = Project::new("p1", "demo").unwrap();
        project.add_vm(vm("web")).unwrap();
        project.set_deployment_status(DeploymentStatus::Ready);
        let summary = project.summary();
        assert_eq!(summary.vm_count, 1);
        assert_eq!(summary.deployment_status, DeploymentStatus::Ready);
        assert!(project.is_locked());
    }
}
