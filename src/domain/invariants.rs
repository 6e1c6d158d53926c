// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Project Invariants
//!
//! Scores interfaces, VMs and whole projects without touching them. Three
//! granularities exist so an editor can check the piece being changed while
//! generation always re-runs the project-level check.
//!
//! # Outcome Categories
//!
//! - **Errors**: the project should not be deployed as-is; `is_valid` is false
//! - **Warnings**: legal but likely unintended
//! - **Suggestions**: best-practice hints
//!
//! Every check runs; a failing check never hides the result of another one.
//! Entities are re-checked even though their constructors already enforce
//! most rules, because their fields are public and may have been edited.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use super::network::{is_reserved, parse_ipv4};
use super::virtual_machine::{check_cpus, check_memory};
use super::{
    NetworkInterface, NetworkType, Netmask, Project, Provisioner, ShellSource, SyncedFolder,
    ValidationOptions, VirtualMachine,
};

/// Host ports that usually belong to a service already running on the host
pub const WELL_KNOWN_PORTS: [(u16, &str); 5] = [
    (22, "SSH"),
    (80, "HTTP"),
    (443, "HTTPS"),
    (3306, "MySQL"),
    (5432, "PostgreSQL"),
];

/// VM names that say nothing about the machine's role
pub const GENERIC_VM_NAMES: [&str; 5] = ["vm", "test", "box", "server", "machine"];

pub const LOW_MEMORY_WARNING_MB: u32 = 1024;
pub const HIGH_MEMORY_WARNING_MB: u32 = 8192;
pub const HIGH_CPU_WARNING: u32 = 4;
pub const TOTAL_MEMORY_WARNING_MB: u32 = 16384;
pub const TOTAL_MEMORY_LIMIT_MB: u32 = 32768;
pub const TOTAL_CPU_WARNING: u32 = 8;
pub const TOTAL_CPU_LIMIT: u32 = 16;
pub const MANY_VMS: usize = 10;

const STATIC_ADDRESS_REQUIRED: &str = "Static IP assignment requires an IP address";

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn suggestion(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    /// Append another report's messages unchanged
    pub fn merge(&mut self, other: ValidationReport) {
        self.merge_prefixed("", other);
    }

    /// Append another report's messages, each prefixed with `prefix`
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationReport) {
        let prefixed = |messages: Vec<String>| {
            messages
                .into_iter()
                .map(move |m| format!("{}{}", prefix, m))
        };
        for message in prefixed(other.errors) {
            self.error(message);
        }
        self.warnings.extend(prefixed(other.warnings));
        self.suggestions.extend(prefixed(other.suggestions));
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Project-level outcome with the counts clients show in summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectValidation {
    #[serde(flatten)]
    pub report: ValidationReport,
    pub vm_count: usize,
    pub network_interfaces_count: usize,
}

impl ProjectValidation {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid
    }
}

/// Validate one network interface in isolation
///
/// # Rules
/// - Static assignment must carry an address
/// - Addresses are valid IPv4 and not loopback, multicast, reserved or `.1`
/// - Public addresses on `private_network` warn unless overridden
/// - Netmask is dotted-decimal or `/0`-`/32`
/// - Port forwards name both ports; equal ports and well-known host ports warn
pub fn validate_network_interface(
    iface: &NetworkInterface,
    options: &ValidationOptions,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    match iface.ip_address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        None if iface.is_static() => report.error(STATIC_ADDRESS_REQUIRED),
        None => {}
        Some(address) => check_interface_address(iface, address, options, &mut report),
    }

    if Netmask::new(&iface.netmask).is_err() {
        report.error(format!("Invalid netmask: {}", iface.netmask));
    }

    match iface.network_type {
        NetworkType::ForwardedPort => check_forwarded_port(iface, &mut report),
        NetworkType::PublicNetwork if iface.bridge.is_none() => report.warning(
            "Public network has no bridge interface; Vagrant will ask which host interface to use",
        ),
        _ => {}
    }

    report
}

fn check_interface_address(
    iface: &NetworkInterface,
    address: &str,
    options: &ValidationOptions,
    report: &mut ValidationReport,
) {
    let ip = match parse_ipv4(address) {
        Ok(ip) => ip,
        Err(_) => {
            report.error(format!("Invalid IP address format: {}", address));
            return;
        }
    };

    if ip.is_loopback() {
        report.error("Cannot use loopback IP address");
    } else if ip.is_multicast() {
        report.error("Cannot use multicast IP address");
    } else if is_reserved(&ip) {
        report.error("Cannot use reserved IP address");
    }

    if ip.octets()[3] == 1 {
        report.error(format!(
            "IP address {} ends in .1, which is usually the network gateway",
            ip
        ));
    }

    if iface.network_type == NetworkType::PrivateNetwork
        && !ip.is_private()
        && !options.allow_public_ips_in_private_networks
    {
        report.warning("Public IP address used in private network");
    }
}

fn check_forwarded_port(iface: &NetworkInterface, report: &mut ValidationReport) {
    let (guest, host) = match (iface.guest_port, iface.host_port) {
        (Some(guest), Some(host)) => (guest, host),
        _ => {
            report.error("Port forwarding requires both guest and host ports");
            return;
        }
    };

    if guest == host {
        report.suggestion("Guest and host ports are the same");
        report.warning(format!("Guest and host ports are the same ({})", host));
    }

    if let Some((_, service)) = WELL_KNOWN_PORTS.iter().find(|(port, _)| *port == host) {
        report.warning(format!("Host port {} is commonly used by {}", host, service));
    }
}

/// Validate one virtual machine, including each of its interfaces
pub fn validate_vm(vm: &VirtualMachine, options: &ValidationOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    if vm.box_name.trim().is_empty() {
        report.error("VM box cannot be empty");
    }
    if let Err(err) = check_memory(vm.memory) {
        report.error(err.to_string());
    }
    if let Err(err) = check_cpus(vm.cpus) {
        report.error(err.to_string());
    }

    let mut seen_ips = HashSet::new();
    for iface in &vm.network_interfaces {
        match iface.static_address() {
            None if iface.is_static() => report.error("Static network interface missing IP address"),
            Some(address) if !seen_ips.insert(address) => {
                report.error(format!("Duplicate IP address {}", address));
            }
            _ => {}
        }
        let mut iface_report = validate_network_interface(iface, options);
        // Missing static addresses are already reported at VM level
        iface_report.errors.retain(|e| e != STATIC_ADDRESS_REQUIRED);
        report.merge(iface_report);
    }

    for path in duplicate_guest_paths(&vm.synced_folders) {
        report.error(format!("Duplicate guest path: {}", path));
    }
    for folder in &vm.synced_folders {
        if folder.targets_system_directory() {
            report.warning(format!(
                "Synced folder targets system directory: {}",
                folder.guest_path
            ));
        }
    }

    if vm.network_interfaces.is_empty() {
        report.warning("No network interfaces configured");
    }
    if vm.provisioners.is_empty() {
        report.warning("No provisioners configured");
    }
    if vm.memory < LOW_MEMORY_WARNING_MB {
        report.warning(format!("Low memory allocation: {}MB", vm.memory));
    }
    if vm.memory > HIGH_MEMORY_WARNING_MB {
        report.warning("High memory allocation may impact host system");
    }
    if vm.cpus > HIGH_CPU_WARNING {
        report.warning("High CPU allocation may impact host system");
    }

    for provisioner in &vm.provisioners {
        if let Provisioner::Shell(shell) = provisioner {
            if let ShellSource::Inline(script) = &shell.source {
                let length = script.chars().count();
                if length > Provisioner::LONG_INLINE_SCRIPT {
                    report.warning(format!(
                        "Inline shell script is {} characters long; consider a script file",
                        length
                    ));
                }
            }
        }
    }

    if vm.hostname.is_none() {
        report.suggestion("No hostname set - it will default to VM name");
    }

    report
}

/// Validate a whole project
///
/// VM-level messages are prefixed with `VM '<name>': `.
pub fn validate_project(project: &Project, options: &ValidationOptions) -> ProjectValidation {
    let mut report = ValidationReport::new();

    if project.vms.is_empty() {
        report.error("Project must have at least one virtual machine");
    }

    let mut names = HashSet::new();
    for vm in &project.vms {
        if !names.insert(vm.name.as_str()) {
            report.error(format!("Duplicate VM name: {}", vm.name));
        }
        report.merge_prefixed(&format!("VM '{}': ", vm.name), validate_vm(vm, options));
    }

    check_address_conflicts(project, &mut report);
    check_network_overlap(project, &mut report);
    check_total_resources(project, &mut report);

    if project.vms.len() > MANY_VMS {
        report.warning("Project has many VMs - this may impact performance");
    }
    if project.description.trim().is_empty() {
        report.suggestion("Consider adding a project description");
    }
    for vm in &project.vms {
        if GENERIC_VM_NAMES.contains(&vm.name.as_str().to_lowercase().as_str()) {
            report.suggestion(format!(
                "VM '{}' has a generic name - consider a more descriptive name",
                vm.name
            ));
        }
    }

    ProjectValidation {
        report,
        vm_count: project.vms.len(),
        network_interfaces_count: project.network_interfaces_count(),
    }
}

/// Static addresses claimed by two different VMs
fn check_address_conflicts(project: &Project, report: &mut ValidationReport) {
    let mut owners: HashMap<&str, usize> = HashMap::new();
    let mut reported = HashSet::new();

    for (index, vm) in project.vms.iter().enumerate() {
        for address in vm.static_addresses() {
            match owners.get(address) {
                Some(owner) if *owner != index => {
                    if reported.insert(address) {
                        report.error(format!(
                            "IP address conflict: {} is used by multiple VMs",
                            address
                        ));
                    }
                }
                Some(_) => {}
                None => {
                    owners.insert(address, index);
                }
            }
        }
    }
}

/// Distinct private networks that share address space
///
/// Several machines on the same subnet is the normal case and does not warn.
fn check_network_overlap(project: &Project, report: &mut ValidationReport) {
    let mut networks: Vec<(Ipv4Addr, u8)> = Vec::new();
    for iface in project.vms.iter().flat_map(|vm| &vm.network_interfaces) {
        if iface.network_type != NetworkType::PrivateNetwork {
            continue;
        }
        let Some(network) = private_subnet(iface) else {
            continue;
        };
        if !networks.contains(&network) {
            networks.push(network);
        }
    }

    for (i, a) in networks.iter().enumerate() {
        for b in &networks[i + 1..] {
            if overlaps(*a, *b) {
                report.warning(format!(
                    "Overlapping networks detected: {}/{} and {}/{}",
                    a.0, a.1, b.0, b.1
                ));
            }
        }
    }
}

fn private_subnet(iface: &NetworkInterface) -> Option<(Ipv4Addr, u8)> {
    let ip = parse_ipv4(iface.ip_address.as_deref()?).ok()?;
    let prefix = Netmask::new(&iface.netmask).ok()?.prefix_len()?;
    Some((Ipv4Addr::from(u32::from(ip) & prefix_mask(prefix)), prefix))
}

fn prefix_mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p.min(32))),
    }
}

fn overlaps(a: (Ipv4Addr, u8), b: (Ipv4Addr, u8)) -> bool {
    let mask = prefix_mask(a.1.min(b.1));
    u32::from(a.0) & mask == u32::from(b.0) & mask
}

fn check_total_resources(project: &Project, report: &mut ValidationReport) {
    // Fields are public, so totals are summed wide enough never to overflow
    let total_memory: u64 = project.vms.iter().map(|vm| u64::from(vm.memory)).sum();
    let total_cpus: u64 = project.vms.iter().map(|vm| u64::from(vm.cpus)).sum();

    if total_memory > u64::from(TOTAL_MEMORY_LIMIT_MB) {
        report.error(format!(
            "Excessive memory allocation: {}MB may cause host system issues",
            total_memory
        ));
    } else if total_memory > u64::from(TOTAL_MEMORY_WARNING_MB) {
        report.warning(format!(
            "High total memory allocation: {}MB across all VMs",
            total_memory
        ));
    }

    if total_cpus > u64::from(TOTAL_CPU_LIMIT) {
        report.error(format!(
            "Excessive CPU allocation: {} CPUs may cause host system issues",
            total_cpus
        ));
    } else if total_cpus > u64::from(TOTAL_CPU_WARNING) {
        report.warning(format!(
            "High total CPU allocation: {} CPUs across all VMs",
            total_cpus
        ));
    }
}

/// Basic structural checks on rendered Vagrantfile text
///
/// Comment lines and heredoc bodies are skipped; quotes are counted outside
/// backslash escapes; `do` openers must match `end` lines.
pub fn validate_vagrantfile_syntax(content: &str) -> ValidationReport {
    let mut report = ValidationReport::new();

    if content.trim().is_empty() {
        report.error("Vagrantfile content is empty");
        return report;
    }

    if !content.contains("Vagrant.configure") {
        report.error("Vagrantfile missing Vagrant.configure block");
    }
    if !content.contains("config.vm.define") && !content.contains("config.vm.box") {
        report.warning("No VM definitions found in Vagrantfile");
    }

    let mut quotes = 0usize;
    let mut opened = 0usize;
    let mut closed = 0usize;
    let mut heredoc: Option<String> = None;

    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(tag) = &heredoc {
            if trimmed == tag {
                heredoc = None;
            }
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }

        quotes += count_unescaped_quotes(trimmed);
        if opens_block(trimmed) {
            opened += 1;
        }
        if trimmed == "end" {
            closed += 1;
        }
        heredoc = heredoc_tag(trimmed);
    }

    if quotes % 2 != 0 {
        report.error("Unmatched quotes in Vagrantfile");
    }
    if opened != closed {
        report.error(format!(
            "Unbalanced blocks: {} 'do' openers and {} 'end' statements",
            opened, closed
        ));
    }

    report
}

fn count_unescaped_quotes(line: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in line.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => count += 1,
            _ => {}
        }
    }
    count
}

/// Whether the line ends with `do` or `do |params|`
fn opens_block(line: &str) -> bool {
    let mut head = line;
    if let Some(before_last) = head.strip_suffix('|') {
        match before_last.rfind('|') {
            Some(open) => head = before_last[..open].trim_end(),
            None => return false,
        }
    }
    head == "do" || head.ends_with(" do")
}

/// Terminator of a heredoc started on this line, if any
fn heredoc_tag(line: &str) -> Option<String> {
    let start = line.find("<<~").or_else(|| line.find("<<-"))?;
    let tag: String = line[start + 3..]
        .trim_start_matches(|c: char| c == '\'' || c == '"')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    (!tag.is_empty()).then_some(tag)
}

/// Guest paths of a VM's folders that collide, in folder order
pub fn duplicate_guest_paths(folders: &[SyncedFolder]) -> Vec<&str> {
    let mut seen = HashSet::new();
    folders
        .iter()
        .map(|f| f.guest_path.as_str())
        .filter(|path| !seen.insert(*path))
        .collect()
}
