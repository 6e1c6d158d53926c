// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Vagrantfile Rendering
//!
//! Rendering is a pure function of the project and the catalogs. These
//! properties check determinism, that declared literals reach the output
//! unchanged, and that string escaping can always be reversed.

use cim_vagrantfile::domain::{
    validate_vagrantfile_syntax, NetworkInterface, Project, Protocol, Provisioner, ShellSource,
    ValidationOptions, VirtualMachine,
};
use cim_vagrantfile::projection::ruby;
use cim_vagrantfile::projection::VagrantfileRenderer;
use cim_vagrantfile::store::EmptyCatalog;
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Helpers
// ============================================================================

fn render(project: &Project) -> String {
    let catalog = EmptyCatalog;
    VagrantfileRenderer::new(&catalog, &catalog)
        .render(project)
        .content
}

/// Reverse `ruby::quote`, `None` when the literal is not a well-formed
/// double-quoted string
fn unquote(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                '#' => out.push('#'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                _ => return None,
            },
            '"' | '\n' | '\r' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// VM with a valid name and resources inside the accepted range
fn vm(name: String) -> impl Strategy<Value = VirtualMachine> {
    (512u32..=32768, 1u32..=16).prop_map(move |(memory, cpus)| {
        VirtualMachine::new(name.clone(), "ubuntu/jammy64")
            .and_then(|vm| vm.with_resources(memory, cpus))
            .expect("strategy yields valid VMs")
    })
}

/// Project with up to four uniquely named VMs
fn project() -> impl Strategy<Value = Project> {
    prop::collection::btree_set("[a-z][a-z0-9-]{0,12}", 0..4)
        .prop_flat_map(|names: BTreeSet<String>| {
            names.into_iter().map(vm).collect::<Vec<_>>()
        })
        .prop_map(|vms| {
            let mut project = Project::new("prop", "").expect("valid project name");
            for vm in vms {
                project.add_vm(vm).expect("names are unique");
            }
            project
        })
}

/// Private 10.0.0.0/8 address that passes the address rules
fn private_address() -> impl Strategy<Value = String> {
    (0u8..=255, 0u8..=255, 2u8..=254).prop_map(|(b, c, d)| format!("10.{}.{}.{}", b, c, d))
}

/// Script text rich in characters Ruby treats specially
fn script() -> impl Strategy<Value = String> {
    "[a-z \"\\\\#{}$@\n\r]{1,40}"
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Rendering is deterministic
    ///
    /// The same project renders to byte-identical documents.
    #[test]
    fn prop_rendering_is_deterministic(project in project()) {
        prop_assert_eq!(render(&project), render(&project));
    }

    /// Property: Every VM gets exactly one define block
    ///
    /// The document stays structurally balanced whatever the VM count.
    #[test]
    fn prop_one_define_block_per_vm(project in project()) {
        let content = render(&project);
        for vm in &project.vms {
            let define = format!("config.vm.define \"{}\" do |node|", vm.name);
            prop_assert_eq!(content.matches(&define).count(), 1);
        }
        prop_assert!(validate_vagrantfile_syntax(&content).is_valid);
    }

    /// Property: Static addresses are emitted verbatim
    #[test]
    fn prop_static_address_is_verbatim(address in private_address()) {
        let mut vm = VirtualMachine::new("web", "ubuntu/jammy64").unwrap();
        vm.add_network_interface(
            NetworkInterface::private_static(address.as_str(), &ValidationOptions::default()).unwrap(),
        )
        .unwrap();
        let mut project = Project::new("prop", "").unwrap();
        project.add_vm(vm).unwrap();

        let expected = format!("    node.vm.network \"private_network\", ip: \"{}\"\n", address);
        prop_assert!(render(&project).contains(&expected));
    }

    /// Property: Forwarded ports are emitted verbatim
    #[test]
    fn prop_forwarded_ports_are_verbatim(guest in 1u32..=65535, host in 1024u32..=65535) {
        let mut vm = VirtualMachine::new("web", "ubuntu/jammy64").unwrap();
        vm.add_network_interface(NetworkInterface::forwarded_port(guest, host, Protocol::Tcp).unwrap())
            .unwrap();
        let mut project = Project::new("prop", "").unwrap();
        project.add_vm(vm).unwrap();

        let expected = format!(
            "node.vm.network \"forwarded_port\", guest: {}, host: {}, protocol: \"tcp\"",
            guest, host
        );
        prop_assert!(render(&project).contains(&expected));
    }

    /// Property: Quoting is reversible
    ///
    /// A quoted literal is a single line and decodes back to its input.
    #[test]
    fn prop_quote_round_trips(text in script()) {
        let literal = ruby::quote(&text);
        prop_assert!(!literal.contains('\n'));
        prop_assert_eq!(unquote(&literal), Some(text));
    }

    /// Property: Inline scripts cannot break out of their literal
    ///
    /// The provision line is a single line whose inline argument decodes to
    /// exactly the stored script.
    #[test]
    fn prop_inline_script_stays_in_literal(text in script()) {
        prop_assume!(!text.trim().is_empty());

        let provisioner = Provisioner::shell_inline(text).unwrap();
        let stored = match &provisioner {
            Provisioner::Shell(shell) => match &shell.source {
                ShellSource::Inline(script) => script.clone(),
                ShellSource::Path(_) => unreachable!(),
            },
            _ => unreachable!(),
        };

        let mut vm = VirtualMachine::new("web", "ubuntu/jammy64").unwrap();
        vm.add_provisioner(provisioner);
        let mut project = Project::new("prop", "").unwrap();
        project.add_vm(vm).unwrap();
        let content = render(&project);

        let line = content
            .lines()
            .find(|l| l.trim_start().starts_with("node.vm.provision \"shell\", inline: "))
            .expect("provision line");
        let literal = line
            .trim_start()
            .trim_start_matches("node.vm.provision \"shell\", inline: ")
            .trim_end_matches(", privileged: true");
        prop_assert_eq!(unquote(literal), Some(stored));
    }
}
