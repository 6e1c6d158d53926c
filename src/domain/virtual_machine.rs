// Copyright (c) 2025 - Cowboy AI, Inc.
//! Virtual Machine Entity

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    DomainError, Hostname, NetworkInterface, NetworkInterfaceDraft, PluginConfiguration,
    PluginDraft, Provisioner, ProvisionerDraft, SyncedFolder, SyncedFolderDraft,
    ValidationOptions, VmName,
};

/// Virtual machine validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("VM box cannot be empty")]
    EmptyBox,

    #[error("Memory must be between {min} and {max} MB: {actual}")]
    InvalidMemory { min: u32, max: u32, actual: u32 },

    #[error("CPU count must be between {min} and {max}: {actual}")]
    InvalidCpus { min: u32, max: u32, actual: u32 },
}

/// Raw virtual machine data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachineDraft {
    pub name: String,

    #[serde(rename = "box")]
    pub box_name: String,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default = "default_memory")]
    pub memory: u32,

    #[serde(default = "default_cpus")]
    pub cpus: u32,

    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterfaceDraft>,

    #[serde(default)]
    pub synced_folders: Vec<SyncedFolderDraft>,

    #[serde(default)]
    pub provisioners: Vec<ProvisionerDraft>,

    #[serde(default)]
    pub plugins: Vec<PluginDraft>,
}

fn default_memory() -> u32 {
    VirtualMachine::DEFAULT_MEMORY
}

fn default_cpus() -> u32 {
    VirtualMachine::DEFAULT_CPUS
}

impl VirtualMachineDraft {
    pub fn new(name: impl Into<String>, box_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            box_name: box_name.into(),
            hostname: None,
            memory: VirtualMachine::DEFAULT_MEMORY,
            cpus: VirtualMachine::DEFAULT_CPUS,
            network_interfaces: Vec::new(),
            synced_folders: Vec::new(),
            provisioners: Vec::new(),
            plugins: Vec::new(),
        }
    }

    pub fn resources(mut self, memory: u32, cpus: u32) -> Self {
        self.memory = memory;
        self.cpus = cpus;
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }
}

/// One guest machine definition inside a project
///
/// Owns its interfaces, folders, provisioners and plugins; list order is the
/// order they are rendered in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualMachine {
    pub name: VmName,

    #[serde(rename = "box")]
    pub box_name: String,

    pub hostname: Option<Hostname>,

    pub memory: u32,

    pub cpus: u32,

    pub network_interfaces: Vec<NetworkInterface>,

    pub synced_folders: Vec<SyncedFolder>,

    pub provisioners: Vec<Provisioner>,

    pub plugins: Vec<PluginConfiguration>,
}

impl VirtualMachine {
    pub const MIN_MEMORY: u32 = 512;
    pub const MAX_MEMORY: u32 = 32768;
    pub const DEFAULT_MEMORY: u32 = 1024;
    pub const MIN_CPUS: u32 = 1;
    pub const MAX_CPUS: u32 = 16;
    pub const DEFAULT_CPUS: u32 = 1;

    /// Create a VM with default resources and no attachments
    pub fn new(name: impl Into<String>, box_name: impl Into<String>) -> Result<Self, DomainError> {
        let name = VmName::new(name)?;
        let box_name = check_box(box_name.into())?;
        Ok(Self {
            name,
            box_name,
            hostname: None,
            memory: Self::DEFAULT_MEMORY,
            cpus: Self::DEFAULT_CPUS,
            network_interfaces: Vec::new(),
            synced_folders: Vec::new(),
            provisioners: Vec::new(),
            plugins: Vec::new(),
        })
    }

    /// Build a VM from raw data, validating every nested entity
    ///
    /// Attachments go through the `add_*` methods, so duplicates are
    /// rejected as conflicts.
    pub fn from_draft(
        draft: VirtualMachineDraft,
        options: &ValidationOptions,
    ) -> Result<Self, DomainError> {
        let mut vm = Self::new(draft.name, draft.box_name)?
            .with_resources(draft.memory, draft.cpus)?
            .with_hostname(draft.hostname.as_deref())?;

        for iface in draft.network_interfaces {
            vm.add_network_interface(NetworkInterface::new(iface, options)?)?;
        }
        for folder in draft.synced_folders {
            vm.add_synced_folder(SyncedFolder::from_draft(folder)?)?;
        }
        for provisioner in draft.provisioners {
            vm.add_provisioner(Provisioner::new(provisioner)?);
        }
        for plugin in draft.plugins {
            vm.add_plugin(PluginConfiguration::from_draft(plugin)?)?;
        }
        Ok(vm)
    }

    pub fn with_resources(mut self, memory: u32, cpus: u32) -> Result<Self, DomainError> {
        self.memory = check_memory(memory)?;
        self.cpus = check_cpus(cpus)?;
        Ok(self)
    }

    /// Set the guest hostname; blank input clears it
    pub fn with_hostname(mut self, hostname: Option<&str>) -> Result<Self, DomainError> {
        self.hostname = Hostname::optional(hostname)?;
        Ok(self)
    }

    /// Hostname written into the Vagrantfile
    pub fn effective_hostname(&self) -> &str {
        self.hostname
            .as_ref()
            .map(Hostname::as_str)
            .unwrap_or_else(|| self.name.as_str())
    }

    /// Attach an interface; a second claim on the same static address is a conflict
    pub fn add_network_interface(&mut self, iface: NetworkInterface) -> Result<(), DomainError> {
        if let Some(address) = iface.static_address() {
            if self
                .network_interfaces
                .iter()
                .any(|existing| existing.static_address() == Some(address))
            {
                return Err(DomainError::Conflict(format!(
                    "IP address {} already used by VM '{}'",
                    address, self.name
                )));
            }
        }
        if self.network_interfaces.iter().any(|existing| existing.id == iface.id) {
            return Err(DomainError::Conflict(format!(
                "Network interface {} already attached to VM '{}'",
                iface.id, self.name
            )));
        }
        self.network_interfaces.push(iface);
        Ok(())
    }

    /// Detach an interface by ID; returns whether one was removed
    pub fn remove_network_interface(&mut self, id: &str) -> bool {
        let before = self.network_interfaces.len();
        self.network_interfaces.retain(|iface| iface.id != id);
        self.network_interfaces.len() != before
    }

    pub fn network_interface(&self, id: &str) -> Option<&NetworkInterface> {
        self.network_interfaces.iter().find(|iface| iface.id == id)
    }

    pub fn add_synced_folder(&mut self, folder: SyncedFolder) -> Result<(), DomainError> {
        if self
            .synced_folders
            .iter()
            .any(|existing| existing.guest_path == folder.guest_path)
        {
            return Err(DomainError::Conflict(format!(
                "Guest path {} already synced on VM '{}'",
                folder.guest_path, self.name
            )));
        }
        self.synced_folders.push(folder);
        Ok(())
    }

    pub fn add_provisioner(&mut self, provisioner: Provisioner) {
        self.provisioners.push(provisioner);
    }

    pub fn add_plugin(&mut self, plugin: PluginConfiguration) -> Result<(), DomainError> {
        if self.plugins.iter().any(|existing| existing.name == plugin.name) {
            return Err(DomainError::Conflict(format!(
                "Plugin {} already configured on VM '{}'",
                plugin.name, self.name
            )));
        }
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn remove_plugin(&mut self, name: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|plugin| plugin.name.as_str() != name);
        self.plugins.len() != before
    }

    /// Every static address claimed by this VM, in interface order
    pub fn static_addresses(&self) -> impl Iterator<Item = &str> {
        self.network_interfaces
            .iter()
            .filter_map(NetworkInterface::static_address)
    }

    pub fn to_draft(&self) -> VirtualMachineDraft {
        VirtualMachineDraft {
            name: self.name.to_string(),
            box_name: self.box_name.clone(),
            hostname: self.hostname.as_ref().map(ToString::to_string),
            memory: self.memory,
            cpus: self.cpus,
            network_interfaces: self
                .network_interfaces
                .iter()
                .map(NetworkInterface::to_draft)
                .collect(),
            synced_folders: self.synced_folders.iter().map(SyncedFolder::to_draft).collect(),
            provisioners: self.provisioners.iter().map(Provisioner::to_draft).collect(),
            plugins: self.plugins.iter().map(PluginConfiguration::to_draft).collect(),
        }
    }
}

fn check_box(box_name: String) -> Result<String, VmError> {
    let box_name = box_name.trim().to_string();
    if box_name.is_empty() {
        return Err(VmError::EmptyBox);
    }
    Ok(box_name)
}

/// Check a memory allocation against the supported range
pub fn check_memory(memory: u32) -> Result<u32, VmError> {
    if !(VirtualMachine::MIN_MEMORY..=VirtualMachine::MAX_MEMORY).contains(&memory) {
        return Err(VmError::InvalidMemory {
            min: VirtualMachine::MIN_MEMORY,
            max: VirtualMachine::MAX_MEMORY,
            actual: memory,
        });
    }
    Ok(memory)
}

/// Check a CPU count against the supported range
pub fn check_cpus(cpus: u32) -> Result<u32, VmError> {
    if !(VirtualMachine::MIN_CPUS..=VirtualMachine::MAX_CPUS).contains(&cpus) {
        return Err(VmError::InvalidCpus {
            min: VirtualMachine::MIN_CPUS,
            max: VirtualMachine::MAX_CPUS,
            actual: cpus,
        });
    }
    Ok(cpus)
}
