// Copyright (c) 2025 - Cowboy AI, Inc.
//! Validation Engine Tests
//!
//! Resource boundaries, construction-time rejection and the project-level
//! rules that only the validation pass can see.

mod fixtures;

use cim_vagrantfile::domain::{
    validate_network_interface, validate_project, validate_vm, NetworkError, NetworkInterface,
    NetworkInterfaceDraft, NetworkType, Protocol, SyncedFolder, ValidationOptions, VirtualMachine,
};
use test_case::test_case;

use fixtures::*;

#[test_case(511 => false ; "below minimum memory")]
#[test_case(512 => true ; "minimum memory")]
#[test_case(32768 => true ; "maximum memory")]
#[test_case(32769 => false ; "above maximum memory")]
fn test_memory_boundaries(memory: u32) -> bool {
    VirtualMachine::new("web", "ubuntu/jammy64")
        .and_then(|vm| vm.with_resources(memory, 1))
        .is_ok()
}

#[test_case(0 => false ; "no cpus")]
#[test_case(1 => true ; "minimum cpus")]
#[test_case(16 => true ; "maximum cpus")]
#[test_case(17 => false ; "above maximum cpus")]
fn test_cpu_boundaries(cpus: u32) -> bool {
    VirtualMachine::new("web", "ubuntu/jammy64")
        .and_then(|vm| vm.with_resources(1024, cpus))
        .is_ok()
}

#[test_case("web" => true ; "plain name")]
#[test_case("web-01_a" => true ; "hyphen and underscore")]
#[test_case("1web" => false ; "leading digit")]
#[test_case("web server" => false ; "space")]
#[test_case("" => false ; "empty")]
fn test_vm_name_rules(name: &str) -> bool {
    VirtualMachine::new(name, "ubuntu/jammy64").is_ok()
}

#[test]
fn test_memory_outside_range_is_reported_on_assembled_vm() {
    let mut vm = VirtualMachine::new("web", "ubuntu/jammy64").unwrap();
    vm.memory = 100;
    let report = validate_vm(&vm, &strict());
    assert!(!report.is_valid);
    assert!(report.errors[0].starts_with("Memory must be between 512 and 32768 MB"));
}

#[test]
fn test_duplicate_ip_on_one_vm() {
    let mut vm = web_vm();
    vm.network_interfaces
        .push(NetworkInterface::private_static("192.168.33.10", &strict()).unwrap());

    let report = validate_vm(&vm, &strict());
    assert!(!report.is_valid);
    pretty_assertions::assert_eq!(
        report.errors,
        vec!["Duplicate IP address 192.168.33.10".to_string()]
    );
}

#[test]
fn test_duplicate_guest_path_on_one_vm() {
    let mut vm = web_vm();
    vm.synced_folders.push(SyncedFolder::new("./a", "/srv/app").unwrap());
    vm.synced_folders.push(SyncedFolder::new("./b", "/srv/app").unwrap());

    let report = validate_vm(&vm, &strict());
    pretty_assertions::assert_eq!(report.errors, vec!["Duplicate guest path: /srv/app".to_string()]);
}

#[test]
fn test_static_interface_without_address_is_one_error() {
    let mut vm = web_vm();
    vm.network_interfaces[0].ip_address = None;

    let report = validate_vm(&vm, &strict());
    pretty_assertions::assert_eq!(
        report.errors,
        vec!["Static network interface missing IP address".to_string()]
    );
}

#[test]
fn test_vm_without_interfaces_warns() {
    let vm = VirtualMachine::new("web", "ubuntu/jammy64").unwrap();
    let report = validate_vm(&vm, &strict());
    assert!(report.is_valid);
    assert!(report
        .warnings
        .contains(&"No network interfaces configured".to_string()));
    assert!(!validate_vm(&web_vm(), &strict())
        .warnings
        .contains(&"No network interfaces configured".to_string()));
}

#[test_case(1023 => true ; "just below the low memory line")]
#[test_case(1024 => false ; "at the low memory line")]
fn test_low_memory_warning(memory: u32) -> bool {
    let vm = web_vm().with_resources(memory, 1).unwrap();
    validate_vm(&vm, &strict())
        .warnings
        .contains(&format!("Low memory allocation: {}MB", memory))
}

#[test]
fn test_conflicting_static_ips_across_vms() {
    let mut project = empty_project("clash");
    for name in ["a", "b"] {
        let mut vm = VirtualMachine::new(name, "ubuntu/jammy64").unwrap();
        vm.add_network_interface(NetworkInterface::private_static("10.0.0.5", &strict()).unwrap())
            .unwrap();
        project.add_vm(vm).unwrap();
    }

    let validation = validate_project(&project, &strict());
    assert!(!validation.is_valid());
    pretty_assertions::assert_eq!(
        validation.report.errors,
        vec!["IP address conflict: 10.0.0.5 is used by multiple VMs".to_string()]
    );
}

#[test]
fn test_same_guest_and_host_port_is_a_warning() {
    let iface = NetworkInterface::forwarded_port(80, 80, Protocol::Tcp).unwrap();
    let report = validate_network_interface(&iface, &strict());

    assert!(report.is_valid);
    assert!(report.errors.is_empty());
    assert!(report
        .warnings
        .iter()
        .any(|w| w.starts_with("Guest and host ports are the same")));
    assert!(report
        .suggestions
        .contains(&"Guest and host ports are the same".to_string()));
}

#[test]
fn test_public_address_on_private_network() {
    let err = NetworkInterface::private_static("8.8.8.8", &strict()).unwrap_err();
    assert!(matches!(err, NetworkError::NotPrivateRange(_)));

    let allow = ValidationOptions::allow_public_ips();
    let iface = NetworkInterface::private_static("8.8.8.8", &allow).unwrap();
    let report = validate_network_interface(&iface, &allow);
    assert!(report.is_valid);
    assert!(report.warnings.is_empty());

    // The same interface scored without the override only warns
    let report = validate_network_interface(&iface, &strict());
    assert!(report.is_valid);
    pretty_assertions::assert_eq!(
        report.warnings,
        vec!["Public IP address used in private network".to_string()]
    );
}

#[test]
fn test_header_value_controls_override() {
    assert!(ValidationOptions::from_header_value(Some("true")).allow_public_ips_in_private_networks);
    assert!(ValidationOptions::from_header_value(Some("1")).allow_public_ips_in_private_networks);
    assert!(!ValidationOptions::from_header_value(Some("false")).allow_public_ips_in_private_networks);
    assert!(!ValidationOptions::from_header_value(None).allow_public_ips_in_private_networks);
}

#[test_case("127.0.0.5" ; "loopback")]
#[test_case("224.0.0.5" ; "multicast")]
#[test_case("192.168.1.1" ; "gateway")]
#[test_case("300.1.2.3" ; "malformed")]
fn test_rejected_addresses(address: &str) {
    let allow = ValidationOptions::allow_public_ips();
    assert!(NetworkInterface::private_static(address, &allow).is_err());
}

#[test]
fn test_forwarded_port_requires_both_ports() {
    let mut draft = NetworkInterfaceDraft::new(NetworkType::ForwardedPort);
    draft.guest_port = Some(80);
    pretty_assertions::assert_eq!(
        NetworkInterface::new(draft, &strict()).unwrap_err(),
        NetworkError::MissingPorts
    );
}

#[test]
fn test_duplicate_vm_names_cannot_be_added() {
    let mut project = web_project();
    let err = project.add_vm(web_vm()).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    pretty_assertions::assert_eq!(project.vms.len(), 1);
}

#[test]
fn test_duplicate_vm_names_in_assembled_project() {
    let mut project = web_project();
    let mut clone = web_vm();
    clone.network_interfaces.clear();
    project.vms.push(clone);

    let validation = validate_project(&project, &strict());
    assert!(validation
        .report
        .errors
        .contains(&"Duplicate VM name: web".to_string()));
}

#[test]
fn test_vm_messages_are_prefixed() {
    let validation = validate_project(&web_project(), &strict());
    assert!(validation
        .report
        .warnings
        .contains(&"VM 'web': No provisioners configured".to_string()));
    assert!(validation
        .report
        .suggestions
        .contains(&"VM 'web': No hostname set - it will default to VM name".to_string()));
}

#[test]
fn test_total_resource_limits() {
    let mut project = empty_project("heavy");
    for i in 0..3 {
        let vm = VirtualMachine::new(format!("node{}", i), "ubuntu/jammy64")
            .and_then(|vm| vm.with_resources(12288, 6))
            .unwrap();
        project.add_vm(vm).unwrap();
    }

    let validation = validate_project(&project, &strict());
    assert!(!validation.is_valid());
    assert!(validation
        .report
        .errors
        .iter()
        .any(|e| e.contains("36864MB")));
    assert!(validation
        .report
        .errors
        .iter()
        .any(|e| e.contains("18 CPUs")));
}

#[test]
fn test_validation_serializes_flat() {
    let validation = validate_project(&web_project(), &strict());
    let json = serde_json::to_value(&validation).unwrap();
    pretty_assertions::assert_eq!(json["is_valid"], true);
    pretty_assertions::assert_eq!(json["vm_count"], 1);
    assert!(json["warnings"].is_array());
}
