// Copyright (c) 2025 - Cowboy AI, Inc.
//! Schema Upcasting
//!
//! Stored project documents are migrated as raw JSON before they are read
//! into a [`StoredProjectRecord`](super::StoredProjectRecord). Each upcaster
//! moves a document one schema version forward:
//!
//! ```text
//! stored JSON → schema_version() → 0.0.0 → 1.0.0 → 1.1.0 → StoredProjectRecord
//! ```
//!
//! A document without a `version` field predates versioning and is treated
//! as `0.0.0`.

use serde_json::{json, Map, Value};
use std::fmt;

use super::StoredProjectRecord;

/// Version assigned to documents written before versioning existed
pub const LEGACY_VERSION: &str = "0.0.0";

/// Error raised while migrating a stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpcastError {
    /// The document's version is not one the chain knows how to move forward
    UnsupportedVersion { found: String, latest: String },

    /// JSON transformation failed
    TransformationFailed(String),

    /// Invalid field value that cannot be migrated
    InvalidFieldValue { field: String, reason: String },
}

impl fmt::Display for UpcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpcastError::UnsupportedVersion { found, latest } => {
                write!(
                    f,
                    "Unsupported schema version {}, latest supported is {}",
                    found, latest
                )
            }
            UpcastError::TransformationFailed(msg) => {
                write!(f, "Schema transformation failed: {}", msg)
            }
            UpcastError::InvalidFieldValue { field, reason } => {
                write!(f, "Invalid value in field '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for UpcastError {}

/// Moves a stored document from one schema version to the next
pub trait Upcaster<T>: Send + Sync {
    /// Version this upcaster expects as input
    fn from_version(&self) -> &'static str;

    /// Version this upcaster produces
    fn to_version(&self) -> &'static str;

    /// Transform the document and stamp the new version
    fn upcast(&self, value: Value) -> Result<Value, UpcastError>;

    /// Check the transformed document
    fn validate(&self, _value: &Value) -> Result<(), UpcastError> {
        Ok(())
    }
}

/// Ordered sequence of upcasters
pub struct UpcasterChain<T> {
    upcasters: Vec<Box<dyn Upcaster<T>>>,
}

impl<T> UpcasterChain<T> {
    pub fn new() -> Self {
        Self {
            upcasters: Vec::new(),
        }
    }

    /// Append an upcaster; add them in version order
    pub fn add<U: Upcaster<T> + 'static>(&mut self, upcaster: U) {
        self.upcasters.push(Box::new(upcaster));
    }

    pub fn latest_version(&self) -> Option<&'static str> {
        self.upcasters.last().map(|u| u.to_version())
    }

    /// Migrate a document to the latest version
    ///
    /// A document already at the latest version is returned unchanged.
    pub fn upcast_to_latest(&self, mut value: Value) -> Result<Value, UpcastError> {
        let latest = self.latest_version().unwrap_or(LEGACY_VERSION);
        let mut version = schema_version(&value);

        if version != latest && !self.upcasters.iter().any(|u| u.from_version() == version) {
            return Err(UpcastError::UnsupportedVersion {
                found: version,
                latest: latest.to_string(),
            });
        }

        for upcaster in &self.upcasters {
            if version == upcaster.from_version() {
                value = upcaster.upcast(value)?;
                upcaster.validate(&value)?;
                version = upcaster.to_version().to_string();
            }
        }

        Ok(value)
    }
}

impl<T> Default for UpcasterChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Schema version recorded in a document, [`LEGACY_VERSION`] when absent
pub fn schema_version(value: &Value) -> String {
    match value.get("version").and_then(Value::as_str).map(str::trim) {
        Some(version) if !version.is_empty() => version.to_string(),
        _ => LEGACY_VERSION.to_string(),
    }
}

pub fn set_schema_version(value: &mut Value, version: &str) -> Result<(), UpcastError> {
    object_mut(value)?.insert("version".to_string(), json!(version));
    Ok(())
}

fn object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, UpcastError> {
    value.as_object_mut().ok_or_else(|| {
        UpcastError::TransformationFailed("stored project is not a JSON object".to_string())
    })
}

/// The chain every stored project passes through
pub fn project_chain() -> UpcasterChain<StoredProjectRecord> {
    let mut chain = UpcasterChain::new();
    chain.add(LegacyToV1_0);
    chain.add(V1_0ToV1_1);
    chain
}

/// Pre-versioning documents to `1.0.0`
///
/// Early records stored numbers as strings, enum tags in mixed case and
/// empty strings for unset optionals, and some have no
/// `global_provisioners` list at all.
pub struct LegacyToV1_0;

const NUMERIC_VM_FIELDS: [&str; 2] = ["memory", "cpus"];
const NUMERIC_INTERFACE_FIELDS: [&str; 2] = ["host_port", "guest_port"];
const OPTIONAL_VM_FIELDS: [&str; 1] = ["hostname"];
const OPTIONAL_INTERFACE_FIELDS: [&str; 4] = ["id", "ip_address", "netmask", "bridge"];
const INTERFACE_TAGS: [&str; 3] = ["type", "ip_assignment", "protocol"];

impl Upcaster<StoredProjectRecord> for LegacyToV1_0 {
    fn from_version(&self) -> &'static str {
        LEGACY_VERSION
    }

    fn to_version(&self) -> &'static str {
        "1.0.0"
    }

    fn upcast(&self, mut value: Value) -> Result<Value, UpcastError> {
        let project = object_mut(&mut value)?;
        project
            .entry("global_provisioners")
            .or_insert_with(|| json!([]));
        lowercase_tag(project, "deployment_status");

        if let Some(vms) = project.get_mut("vms").and_then(Value::as_array_mut) {
            for (i, vm) in vms.iter_mut().enumerate() {
                let Some(vm) = vm.as_object_mut() else {
                    continue;
                };
                for field in NUMERIC_VM_FIELDS {
                    coerce_number(vm, field, &format!("vms[{}].{}", i, field))?;
                }
                for field in OPTIONAL_VM_FIELDS {
                    blank_to_null(vm, field);
                }
                upcast_list(vm, "network_interfaces", |iface| {
                    for field in INTERFACE_TAGS {
                        lowercase_tag(iface, field);
                    }
                    for field in OPTIONAL_INTERFACE_FIELDS {
                        blank_to_null(iface, field);
                    }
                });
                upcast_list(vm, "provisioners", |provisioner| {
                    lowercase_tag(provisioner, "type");
                    blank_to_null(provisioner, "script_path");
                    blank_to_null(provisioner, "inline");
                });
                upcast_list(vm, "plugins", |plugin| {
                    lowercase_tag(plugin, "scope");
                    blank_to_null(plugin, "version");
                });

                if let Some(ifaces) = vm.get_mut("network_interfaces").and_then(Value::as_array_mut) {
                    for (j, iface) in ifaces.iter_mut().enumerate() {
                        let Some(iface) = iface.as_object_mut() else {
                            continue;
                        };
                        for field in NUMERIC_INTERFACE_FIELDS {
                            let path = format!("vms[{}].network_interfaces[{}].{}", i, j, field);
                            blank_to_null(iface, field);
                            coerce_number(iface, field, &path)?;
                        }
                    }
                }
            }
        }

        if let Some(plugins) = project.get_mut("global_plugins").and_then(Value::as_array_mut) {
            for plugin in plugins.iter_mut().filter_map(Value::as_object_mut) {
                lowercase_tag(plugin, "scope");
                blank_to_null(plugin, "version");
            }
        }

        set_schema_version(&mut value, self.to_version())?;
        Ok(value)
    }
}

/// `1.0.0` to `1.1.0`: projects gained global trigger references
pub struct V1_0ToV1_1;

impl Upcaster<StoredProjectRecord> for V1_0ToV1_1 {
    fn from_version(&self) -> &'static str {
        "1.0.0"
    }

    fn to_version(&self) -> &'static str {
        "1.1.0"
    }

    fn upcast(&self, mut value: Value) -> Result<Value, UpcastError> {
        object_mut(&mut value)?
            .entry("global_triggers")
            .or_insert_with(|| json!([]));
        set_schema_version(&mut value, self.to_version())?;
        Ok(value)
    }

    fn validate(&self, value: &Value) -> Result<(), UpcastError> {
        match value.get("global_triggers") {
            Some(Value::Array(_)) | Some(Value::Null) => Ok(()),
            _ => Err(UpcastError::InvalidFieldValue {
                field: "global_triggers".to_string(),
                reason: "expected a list of trigger IDs".to_string(),
            }),
        }
    }
}

fn upcast_list(
    object: &mut Map<String, Value>,
    field: &str,
    mut apply: impl FnMut(&mut Map<String, Value>),
) {
    if let Some(items) = object.get_mut(field).and_then(Value::as_array_mut) {
        items.iter_mut().filter_map(Value::as_object_mut).for_each(&mut apply);
    }
}

fn lowercase_tag(object: &mut Map<String, Value>, field: &str) {
    if let Some(Value::String(tag)) = object.get_mut(field) {
        *tag = tag.trim().to_lowercase();
    }
}

fn blank_to_null(object: &mut Map<String, Value>, field: &str) {
    if matches!(object.get(field), Some(Value::String(s)) if s.trim().is_empty()) {
        object.insert(field.to_string(), Value::Null);
    }
}

fn coerce_number(object: &mut Map<String, Value>, field: &str, path: &str) -> Result<(), UpcastError> {
    if let Some(Value::String(text)) = object.get(field) {
        let number: u64 = text.trim().parse().map_err(|_| UpcastError::InvalidFieldValue {
            field: path.to_string(),
            reason: format!("'{}' is not a whole number", text),
        })?;
        object.insert(field.to_string(), json!(number));
    }
    Ok(())
}
