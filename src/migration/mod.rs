// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stored Project Migration
//!
//! Persisted projects are read through two tiers:
//!
//! ```text
//! JSON ──> upcast (schema chain) ──> StoredProjectRecord ──> upgrade() ──> Project
//!          loose, any version         loose, latest shape     validated
//! ```
//!
//! [`StoredProjectRecord`] tolerates missing fields and unknown keys. Nothing
//! reaches a [`Project`] without passing the same constructors a caller
//! would use, so a stored record that breaks an invariant fails with every
//! offending path listed instead of loading partially.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::timestamp::parse_timestamp;
use crate::domain::{
    check_text_length, DeploymentStatus, DomainError, NetworkInterface, NetworkInterfaceDraft,
    PluginConfiguration, PluginDraft, Project, ProjectName, Provisioner, ProvisionerDraft,
    SyncedFolder, SyncedFolderDraft, ValidationOptions, VirtualMachine, VmError,
};
use crate::errors::VagrantfileResult;

pub mod upcast;

pub use upcast::{
    project_chain, schema_version, set_schema_version, UpcastError, Upcaster, UpcasterChain,
    LEGACY_VERSION,
};

/// One invariant violation found while upgrading a stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationIssue {
    /// Location inside the record, e.g. `vms[0].network_interfaces[1]`
    pub path: String,
    pub message: String,
}

impl fmt::Display for MigrationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A stored record that could not be turned into a validated project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFailure {
    pub issues: Vec<MigrationIssue>,
}

impl MigrationFailure {
    pub fn single(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            issues: vec![MigrationIssue {
                path: path.into(),
                message: message.to_string(),
            }],
        }
    }

    /// Issue recorded at exactly `path`
    pub fn issue_at(&self, path: &str) -> Option<&MigrationIssue> {
        self.issues.iter().find(|i| i.path == path)
    }
}

impl fmt::Display for MigrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => write!(f, "stored project could not be upgraded"),
            [issue] => write!(f, "{}", issue),
            issues => {
                write!(f, "{} issues: ", issues.len())?;
                for (i, issue) in issues.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for MigrationFailure {}

impl From<UpcastError> for MigrationFailure {
    fn from(err: UpcastError) -> Self {
        let path = match &err {
            UpcastError::InvalidFieldValue { field, .. } => field.clone(),
            UpcastError::UnsupportedVersion { .. } => "version".to_string(),
            UpcastError::TransformationFailed(_) => "record".to_string(),
        };
        Self::single(path, err)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_record_version() -> String {
    "1.0.0".to_string()
}

/// Schema-tolerant project as persisted
///
/// Nested entities stay as raw JSON so a bad element is reported at its own
/// path rather than failing the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProjectRecord {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub deployment_status: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub vms: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub global_plugins: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub global_provisioners: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub global_triggers: Vec<Value>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default = "default_record_version")]
    pub version: String,
}

impl Default for StoredProjectRecord {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            deployment_status: None,
            vms: Vec::new(),
            global_plugins: Vec::new(),
            global_provisioners: Vec::new(),
            global_triggers: Vec::new(),
            created_at: None,
            updated_at: None,
            version: default_record_version(),
        }
    }
}

impl StoredProjectRecord {
    /// Run a stored document through the schema chain and read it
    pub fn from_value(value: Value) -> Result<Self, MigrationFailure> {
        let migrated = project_chain().upcast_to_latest(value)?;
        serde_json::from_value(migrated).map_err(|e| MigrationFailure::single("record", e))
    }
}

/// Schema-tolerant virtual machine inside a stored project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredVmRecord {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "box")]
    pub box_name: Option<String>,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub memory: Option<u32>,

    #[serde(default)]
    pub cpus: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub network_interfaces: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub synced_folders: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub provisioners: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub plugins: Vec<Value>,
}

#[derive(Default)]
struct IssueLog(Vec<MigrationIssue>);

impl IssueLog {
    fn push(&mut self, path: impl Into<String>, message: impl fmt::Display) {
        self.0.push(MigrationIssue {
            path: path.into(),
            message: message.to_string(),
        });
    }

    /// Deserialize `raw` and run it through `build`, logging any failure
    fn build<D, T>(
        &mut self,
        path: &str,
        raw: Value,
        build: impl FnOnce(D) -> Result<T, DomainError>,
    ) -> Option<T>
    where
        D: DeserializeOwned,
    {
        let draft = match serde_json::from_value::<D>(raw) {
            Ok(draft) => draft,
            Err(e) => {
                self.push(path, e);
                return None;
            }
        };
        match build(draft) {
            Ok(entity) => Some(entity),
            Err(e) => {
                self.push(path, e);
                None
            }
        }
    }

    fn check(&mut self, path: &str, result: Result<(), DomainError>) {
        if let Err(e) = result {
            self.push(path, e);
        }
    }
}

fn parse_status(text: &str) -> Option<DeploymentStatus> {
    match text.trim().to_lowercase().as_str() {
        "" | "draft" => Some(DeploymentStatus::Draft),
        "ready" => Some(DeploymentStatus::Ready),
        _ => None,
    }
}

fn vm_field(err: &DomainError) -> &'static str {
    match err {
        DomainError::Name(_) => "name",
        DomainError::Hostname(_) => "hostname",
        DomainError::Vm(VmError::EmptyBox) => "box",
        DomainError::Vm(VmError::InvalidMemory { .. }) => "memory",
        DomainError::Vm(VmError::InvalidCpus { .. }) => "cpus",
        _ => "vm",
    }
}

fn upgrade_vm(
    raw: Value,
    path: &str,
    options: &ValidationOptions,
    issues: &mut IssueLog,
) -> Option<VirtualMachine> {
    let record: StoredVmRecord = match serde_json::from_value(raw) {
        Ok(record) => record,
        Err(e) => {
            issues.push(path, e);
            return None;
        }
    };

    let mut vm = match VirtualMachine::new(
        record.name.unwrap_or_default(),
        record.box_name.unwrap_or_default(),
    )
    .and_then(|vm| {
        vm.with_resources(
            record.memory.unwrap_or(VirtualMachine::DEFAULT_MEMORY),
            record.cpus.unwrap_or(VirtualMachine::DEFAULT_CPUS),
        )
    })
    .and_then(|vm| vm.with_hostname(record.hostname.as_deref()))
    {
        Ok(vm) => Some(vm),
        Err(e) => {
            issues.push(format!("{}.{}", path, vm_field(&e)), e);
            None
        }
    };

    // Attachments are still checked when the VM itself is broken so every
    // failing path is reported in one pass.
    for (j, raw) in record.network_interfaces.into_iter().enumerate() {
        let at = format!("{}.network_interfaces[{}]", path, j);
        let built = issues.build(&at, raw, |draft: NetworkInterfaceDraft| {
            NetworkInterface::new(draft, options).map_err(DomainError::from)
        });
        if let (Some(vm), Some(iface)) = (vm.as_mut(), built) {
            issues.check(&at, vm.add_network_interface(iface));
        }
    }
    for (j, raw) in record.synced_folders.into_iter().enumerate() {
        let at = format!("{}.synced_folders[{}]", path, j);
        let built = issues.build(&at, raw, |draft: SyncedFolderDraft| {
            SyncedFolder::from_draft(draft).map_err(DomainError::from)
        });
        if let (Some(vm), Some(folder)) = (vm.as_mut(), built) {
            issues.check(&at, vm.add_synced_folder(folder));
        }
    }
    for (j, raw) in record.provisioners.into_iter().enumerate() {
        let at = format!("{}.provisioners[{}]", path, j);
        let built = issues.build(&at, raw, |draft: ProvisionerDraft| {
            Provisioner::new(draft).map_err(DomainError::from)
        });
        if let (Some(vm), Some(provisioner)) = (vm.as_mut(), built) {
            vm.add_provisioner(provisioner);
        }
    }
    for (j, raw) in record.plugins.into_iter().enumerate() {
        let at = format!("{}.plugins[{}]", path, j);
        let built = issues.build(&at, raw, |draft: PluginDraft| {
            PluginConfiguration::from_draft(draft).map_err(DomainError::from)
        });
        if let (Some(vm), Some(plugin)) = (vm.as_mut(), built) {
            issues.check(&at, vm.add_plugin(plugin));
        }
    }

    vm
}

fn reference_id(raw: &Value) -> Option<&str> {
    raw.as_str().map(str::trim).filter(|id| !id.is_empty())
}

fn timestamp(issues: &mut IssueLog, path: &str, text: Option<&str>) -> Option<DateTime<Utc>> {
    let text = text?;
    let parsed = parse_timestamp(text);
    if parsed.is_none() {
        issues.push(path, format!("invalid timestamp '{}'", text));
    }
    parsed
}

/// Build a validated project from a stored record
///
/// Every entity goes through its validating constructor and every container
/// through its `add_*`/`attach_*` method. All failures are collected; the
/// result is either a fully valid project or the complete list of issues.
pub fn upgrade(
    record: StoredProjectRecord,
    options: &ValidationOptions,
) -> Result<Project, MigrationFailure> {
    debug!(
        version = %record.version,
        vms = record.vms.len(),
        "Upgrading stored project"
    );

    let mut issues = IssueLog::default();
    let name = record.name.unwrap_or_default();
    let description = record.description.unwrap_or_default();

    if let Err(e) = ProjectName::new(name.as_str()) {
        issues.push("name", e);
    }
    if let Err(e) = check_text_length("Description", &description, Project::MAX_DESCRIPTION_LENGTH)
    {
        issues.push("description", e);
    }
    let mut project = Project::new(name, description).ok();

    if let Some(id) = record.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        match Uuid::parse_str(id) {
            Ok(uuid) => project = project.map(|p| p.with_id(uuid)),
            Err(e) => issues.push("id", e),
        }
    }

    let status = match record.deployment_status.as_deref() {
        None => DeploymentStatus::Draft,
        Some(text) => parse_status(text).unwrap_or_else(|| {
            issues.push("deployment_status", format!("unknown status '{}'", text));
            DeploymentStatus::Draft
        }),
    };

    for (i, raw) in record.vms.into_iter().enumerate() {
        let path = format!("vms[{}]", i);
        let vm = upgrade_vm(raw, &path, options, &mut issues);
        if let (Some(project), Some(vm)) = (project.as_mut(), vm) {
            issues.check(&path, project.add_vm(vm));
        }
    }

    for (i, raw) in record.global_plugins.into_iter().enumerate() {
        let path = format!("global_plugins[{}]", i);
        let built = issues.build(&path, raw, |draft: PluginDraft| {
            PluginConfiguration::from_draft(draft).map_err(DomainError::from)
        });
        if let (Some(project), Some(plugin)) = (project.as_mut(), built) {
            issues.check(&path, project.add_global_plugin(plugin));
        }
    }

    for (i, raw) in record.global_provisioners.iter().enumerate() {
        let path = format!("global_provisioners[{}]", i);
        match (reference_id(raw), project.as_mut()) {
            (None, _) => issues.push(path, "expected a provisioner ID"),
            (Some(id), Some(project)) => issues.check(&path, project.attach_global_provisioner(id)),
            (Some(_), None) => {}
        }
    }

    for (i, raw) in record.global_triggers.iter().enumerate() {
        let path = format!("global_triggers[{}]", i);
        match (reference_id(raw), project.as_mut()) {
            (None, _) => issues.push(path, "expected a trigger ID"),
            (Some(id), Some(project)) => issues.check(&path, project.attach_global_trigger(id)),
            (Some(_), None) => {}
        }
    }

    let created_at = timestamp(&mut issues, "created_at", record.created_at.as_deref());
    let updated_at = timestamp(&mut issues, "updated_at", record.updated_at.as_deref());

    match project {
        Some(mut project) if issues.0.is_empty() => {
            project.set_deployment_status(status);
            let created_at = created_at.unwrap_or(project.created_at);
            let updated_at = updated_at.unwrap_or(created_at.max(project.updated_at));
            project.version = Project::SCHEMA_VERSION.to_string();
            Ok(project.with_timestamps(created_at, updated_at))
        }
        _ => {
            let failure = MigrationFailure { issues: issues.0 };
            warn!(issues = failure.issues.len(), "Stored project failed validation");
            Err(failure)
        }
    }
}

impl Project {
    /// Load a project from its stored JSON form, migrating older schemas
    pub fn from_json(json: &str, options: &ValidationOptions) -> VagrantfileResult<Project> {
        let value: Value = serde_json::from_str(json)?;
        let record = StoredProjectRecord::from_value(value)?;
        Ok(upgrade(record, options)?)
    }

    /// Stored JSON form at the current schema version
    pub fn to_json(&self) -> VagrantfileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> StoredProjectRecord {
        StoredProjectRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_minimal_record_upgrades() {
        let project = upgrade(
            record(json!({"name": "demo", "vms": [{"name": "web", "box": "ubuntu/focal64"}]})),
            &ValidationOptions::default(),
        )
        .unwrap();

        assert_eq!(project.name.as_str(), "demo");
        assert_eq!(project.vms.len(), 1);
        assert_eq!(project.vms[0].memory, VirtualMachine::DEFAULT_MEMORY);
        assert_eq!(project.version, Project::SCHEMA_VERSION);
        assert_eq!(project.deployment_status, DeploymentStatus::Draft);
    }

    #[test]
    fn test_every_failing_path_is_reported() {
        let failure = upgrade(
            record(json!({
                "name": "demo",
                "vms": [{
                    "name": "web",
                    "box": "ubuntu/focal64",
                    "memory": 100,
                    "network_interfaces": [
                        {"type": "private_network", "ip_assignment": "dhcp"},
                        {"type": "private_network", "ip_assignment": "static"}
                    ]
                }],
                "global_provisioners": [42]
            })),
            &ValidationOptions::default(),
        )
        .unwrap_err();

        let paths: Vec<&str> = failure.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "vms[0].memory",
                "vms[0].network_interfaces[1]",
                "global_provisioners[0]"
            ]
        );
    }

    #[test]
    fn test_duplicate_vm_is_a_conflict_issue() {
        let failure = upgrade(
            record(json!({
                "name": "demo",
                "vms": [
                    {"name": "web", "box": "b"},
                    {"name": "web", "box": "b"}
                ]
            })),
            &ValidationOptions::default(),
        )
        .unwrap_err();
        assert!(failure.issue_at("vms[1]").is_some());
    }

    #[test]
    fn test_stored_identity_and_timestamps_are_kept() {
        let id = Uuid::new_v4();
        let project = upgrade(
            record(json!({
                "id": id.to_string(),
                "name": "demo",
                "deployment_status": "ready",
                "created_at": "2025-01-02T03:04:05.000006",
                "updated_at": "2025-02-02T03:04:05Z",
                "last_saved": "2025-02-02T03:04:05Z"
            })),
            &ValidationOptions::default(),
        )
        .unwrap();

        assert_eq!(project.id, id);
        assert!(project.is_locked());
        assert!(project.created_at < project.updated_at);
    }

    #[test]
    fn test_missing_name_is_reported() {
        let failure = upgrade(StoredProjectRecord::default(), &ValidationOptions::default())
            .unwrap_err();
        assert!(failure.issue_at("name").is_some());
    }

    #[test]
    fn test_failure_display_lists_issues() {
        let failure = MigrationFailure {
            issues: vec![
                MigrationIssue {
                    path: "name".into(),
                    message: "Project name cannot be empty".into(),
                },
                MigrationIssue {
                    path: "vms[0].box".into(),
                    message: "Box cannot be empty".into(),
                },
            ],
        };
        assert_eq!(
            failure.to_string(),
            "2 issues: name: Project name cannot be empty; vms[0].box: Box cannot be empty"
        );
    }

    #[test]
    fn test_json_round_trip_preserves_project() {
        let mut project = Project::new("demo", "two tier").unwrap();
        let mut vm = VirtualMachine::new("web", "ubuntu/focal64").unwrap();
        vm.add_network_interface(NetworkInterface::private_static("192.168.56.10", &ValidationOptions::default()).unwrap())
            .unwrap();
        project.add_vm(vm).unwrap();
        project.attach_global_provisioner("p-1").unwrap();

        let json = project.to_json().unwrap();
        let loaded = Project::from_json(&json, &ValidationOptions::default()).unwrap();
        assert_eq!(loaded, project);
    }
}
