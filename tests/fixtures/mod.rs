// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-vagrantfile
//!
//! Deterministic projects, catalog entries and stored documents. IDs and
//! timestamps are fixed constants so rendered output and stored JSON are
//! reproducible.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use cim_vagrantfile::domain::{
    GlobalProvisioner, GlobalTrigger, NetworkInterface, Project, Protocol, ShellProvisionerConfig,
    TriggerAction, TriggerConfig, TriggerTiming, ValidationOptions, VirtualMachine,
};

pub const PROJECT_ID: &str = "01934f4a-1000-7000-8000-000000001000";
pub const PROVISIONER_ID: &str = "01934f4a-2000-7000-8000-000000002000";
pub const TRIGGER_ID: &str = "01934f4a-3000-7000-8000-000000003000";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn strict() -> ValidationOptions {
    ValidationOptions::default()
}

/// Empty project with fixed identity
pub fn empty_project(name: &str) -> Project {
    Project::new(name, "")
        .expect("Invalid project fixture")
        .with_id(parse_uuid(PROJECT_ID))
        .with_timestamps(fixed_timestamp(), fixed_timestamp())
}

/// `web` on ubuntu/jammy64 with 2048 MB, 2 CPUs and 192.168.33.10
pub fn web_vm() -> VirtualMachine {
    let mut vm = VirtualMachine::new("web", "ubuntu/jammy64")
        .and_then(|vm| vm.with_resources(2048, 2))
        .expect("Invalid VM fixture");
    let mut iface = NetworkInterface::private_static("192.168.33.10", &strict())
        .expect("Invalid interface fixture");
    iface.id = "iface-web-1".to_string();
    vm.add_network_interface(iface).expect("Invalid interface fixture");
    vm
}

/// `db` on ubuntu/jammy64 with a port forward for PostgreSQL
pub fn db_vm() -> VirtualMachine {
    let mut vm = VirtualMachine::new("db", "ubuntu/jammy64").expect("Invalid VM fixture");
    let mut iface = NetworkInterface::forwarded_port(5432, 15432, Protocol::Tcp)
        .expect("Invalid interface fixture");
    iface.id = "iface-db-1".to_string();
    vm.add_network_interface(iface).expect("Invalid interface fixture");
    vm
}

/// Project "p1" holding [`web_vm`]
pub fn web_project() -> Project {
    let mut project = empty_project("p1");
    project.add_vm(web_vm()).expect("Invalid project fixture");
    project
}

/// Project with a web and a database machine
pub fn two_tier_project() -> Project {
    let mut project = empty_project("two-tier");
    project.description = "Web and database tier".to_string();
    project.add_vm(web_vm()).expect("Invalid project fixture");
    project.add_vm(db_vm()).expect("Invalid project fixture");
    project
}

/// Shared inline shell provisioner installing Docker
pub fn docker_provisioner() -> GlobalProvisioner {
    let mut provisioner = GlobalProvisioner::new(
        "Install Docker",
        Some("Docker engine from the distribution packages".to_string()),
        Some(ShellProvisionerConfig::script(
            "apt-get update\napt-get install -y docker.io",
        )),
    )
    .expect("Invalid provisioner fixture");
    provisioner.id = PROVISIONER_ID.to_string();
    provisioner.created_at = fixed_timestamp();
    provisioner.updated_at = fixed_timestamp();
    provisioner
}

/// Shared trigger announcing `vagrant up`
pub fn announce_trigger() -> GlobalTrigger {
    let config = TriggerConfig::new(
        TriggerTiming::After,
        "up",
        TriggerAction::Run("echo up".to_string()),
    )
    .expect("Invalid trigger fixture")
    .with_info("Environment is up");
    let mut trigger = GlobalTrigger::new("Announce", None, config).expect("Invalid trigger fixture");
    trigger.id = TRIGGER_ID.to_string();
    trigger.created_at = fixed_timestamp();
    trigger.updated_at = fixed_timestamp();
    trigger
}

/// Stored document written before schema versioning
pub const LEGACY_PROJECT_JSON: &str = r#"{
    "id": "01934f4a-1000-7000-8000-000000001000",
    "name": "legacy",
    "description": "",
    "deployment_status": "Draft",
    "vms": [
        {
            "name": "web",
            "box": "ubuntu/focal64",
            "hostname": "",
            "memory": "2048",
            "cpus": "2",
            "network_interfaces": [
                {"id": "n1", "type": "Private_Network", "ip_assignment": "Static", "ip_address": "192.168.56.10", "netmask": ""},
                {"id": "n2", "type": "forwarded_port", "host_port": "8080", "guest_port": "80", "protocol": "TCP", "bridge": ""}
            ],
            "synced_folders": [
                {"host_path": "./app", "guest_path": "/srv/app", "disabled": false, "options": {"create": true}}
            ],
            "provisioners": [
                {"type": "Shell", "inline": "echo hello", "script_path": ""}
            ]
        }
    ],
    "created_at": "2024-05-01T09:30:00.123456",
    "updated_at": "2024-05-02T09:30:00.123456",
    "last_saved": "2024-05-02T09:30:00.123456"
}"#;

/// Stored document at schema 1.0.0, before global triggers existed
pub const V1_PROJECT_JSON: &str = r#"{
    "id": "01934f4a-1000-7000-8000-000000001000",
    "name": "v1",
    "version": "1.0.0",
    "vms": [{"name": "app", "box": "debian/bookworm64"}],
    "global_provisioners": ["01934f4a-2000-7000-8000-000000002000"],
    "created_at": "2025-01-01T00:00:00Z",
    "updated_at": "2025-01-01T00:00:00Z"
}"#;
