// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-Entity Rendering Rules
//!
//! Each entity knows how to write itself as Vagrantfile lines relative to a
//! receiver (`config` at the top level, `node` inside a VM block). Lines come
//! back without leading indentation beyond their own nesting; the caller
//! indents them into place.

use crate::domain::{
    GlobalProvisioner, GlobalTrigger, IpAssignment, Netmask, NetworkInterface, NetworkType,
    PluginConfiguration, Provisioner, RunMode, ShellSource, SyncedFolder, VirtualMachine,
};

use super::ruby::{self, comment, hash_pair, heredoc_body, heredoc_open, heredoc_tag, indent, quote};

/// Provider that takes a quoted memory string and the `vb` block variable
pub const VIRTUALBOX: &str = "virtualbox";

/// Defaults for [`RenderContext::heredoc_threshold`]
pub const DEFAULT_HEREDOC_THRESHOLD: usize = 80;

/// Settings shared by every entity rule during one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext<'a> {
    /// Block variable the line is written against
    pub receiver: &'a str,
    /// Provider block name for VM resources
    pub provider: &'a str,
    /// Trigger commands longer than this use a heredoc
    pub heredoc_threshold: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(receiver: &'a str) -> Self {
        Self {
            receiver,
            provider: VIRTUALBOX,
            heredoc_threshold: DEFAULT_HEREDOC_THRESHOLD,
        }
    }

    pub fn with_receiver(self, receiver: &'a str) -> Self {
        Self { receiver, ..self }
    }
}

/// Something that renders into Vagrantfile lines
pub trait VagrantConfig {
    fn vagrant_lines(&self, ctx: &RenderContext<'_>) -> Vec<String>;
}

impl VagrantConfig for NetworkInterface {
    fn vagrant_lines(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let mut args = vec![quote(self.network_type.as_str())];

        match self.network_type {
            NetworkType::ForwardedPort => {
                if let Some(guest) = self.guest_port {
                    args.push(format!("guest: {}", guest));
                }
                if let Some(host) = self.host_port {
                    args.push(format!("host: {}", host));
                }
                args.push(format!("protocol: {}", quote(self.protocol.as_str())));
            }
            NetworkType::PrivateNetwork => match self.ip_assignment {
                IpAssignment::Static => {
                    if let Some(ip) = &self.ip_address {
                        args.push(format!("ip: {}", quote(ip)));
                        if let Some(mask) = non_default_netmask(&self.netmask) {
                            args.push(format!("netmask: {}", quote(&mask)));
                        }
                    }
                }
                IpAssignment::Dhcp => args.push("type: \"dhcp\"".to_string()),
            },
            NetworkType::PublicNetwork => {
                if let Some(bridge) = &self.bridge {
                    args.push(format!("bridge: {}", quote(bridge)));
                }
            }
        }

        vec![format!("{}.vm.network {}", ctx.receiver, args.join(", "))]
    }
}

/// Dotted netmask to emit, or `None` for the Vagrant default
fn non_default_netmask(netmask: &str) -> Option<String> {
    let dotted = match Netmask::new(netmask) {
        Ok(mask) => mask.to_dotted().to_string(),
        Err(_) => netmask.trim().to_string(),
    };
    (dotted != Netmask::DEFAULT).then_some(dotted)
}

impl VagrantConfig for SyncedFolder {
    fn vagrant_lines(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let mut args = vec![quote(&self.host_path), quote(&self.guest_path)];
        if self.disabled {
            args.push("disabled: true".to_string());
        } else {
            args.extend(self.options.iter().map(|(k, v)| hash_pair(k, v)));
        }
        vec![format!("{}.vm.synced_folder {}", ctx.receiver, args.join(", "))]
    }
}

impl VagrantConfig for Provisioner {
    fn vagrant_lines(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let mut args = vec![quote(self.provisioner_type().as_str())];
        match self {
            Provisioner::Shell(shell) => {
                match &shell.source {
                    ShellSource::Path(path) => args.push(format!("path: {}", quote(path))),
                    ShellSource::Inline(script) => args.push(format!("inline: {}", quote(script))),
                }
                if !shell.args.is_empty() {
                    args.push(format!("args: {}", ruby::string_array(&shell.args)));
                }
                args.push(format!("privileged: {}", shell.privileged));
            }
            Provisioner::Ansible(config) | Provisioner::Puppet(config) | Provisioner::Chef(config) => {
                args.extend(config.iter().map(|(k, v)| hash_pair(k, v)));
            }
        }
        vec![format!("{}.vm.provision {}", ctx.receiver, args.join(", "))]
    }
}

impl VagrantConfig for PluginConfiguration {
    fn vagrant_lines(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        if self.config.is_empty() {
            return vec![comment(&format!("Plugin {} enabled", self.name))];
        }

        let mut lines = vec![format!(
            "{}.{} do |plugin|",
            ctx.receiver,
            self.name.config_key()
        )];
        lines.extend(indent(
            self.config
                .iter()
                .map(|(k, v)| format!("plugin.{} = {}", k, ruby::literal(v)))
                .collect(),
            1,
        ));
        lines.push("end".to_string());
        lines
    }
}

impl VagrantConfig for VirtualMachine {
    fn vagrant_lines(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let node = ctx.with_receiver("node");

        let mut body = vec![
            format!("node.vm.box = {}", quote(&self.box_name)),
            format!("node.vm.hostname = {}", quote(self.effective_hostname())),
            String::new(),
        ];
        body.extend(provider_block(self, ctx.provider));

        let sections: [Vec<String>; 4] = [
            render_all(&self.network_interfaces, &node),
            render_all(&self.synced_folders, &node),
            render_all(&self.provisioners, &node),
            render_all(&self.plugins, &node),
        ];
        for section in sections.into_iter().filter(|s| !s.is_empty()) {
            body.push(String::new());
            body.extend(section);
        }

        let mut lines = vec![format!(
            "{}.vm.define {} do |node|",
            ctx.receiver,
            quote(self.name.as_str())
        )];
        lines.extend(indent(body, 1));
        lines.push("end".to_string());
        lines
    }
}

fn provider_block(vm: &VirtualMachine, provider: &str) -> Vec<String> {
    let (var, memory) = if provider == VIRTUALBOX {
        ("vb", quote(&vm.memory.to_string()))
    } else {
        ("provider", vm.memory.to_string())
    };
    vec![
        format!("node.vm.provider {} do |{}|", quote(provider), var),
        format!("{}{}.memory = {}", ruby::INDENT, var, memory),
        format!("{}{}.cpus = {}", ruby::INDENT, var, vm.cpus),
        "end".to_string(),
    ]
}

fn render_all<T: VagrantConfig>(items: &[T], ctx: &RenderContext<'_>) -> Vec<String> {
    items.iter().flat_map(|item| item.vagrant_lines(ctx)).collect()
}

impl VagrantConfig for GlobalProvisioner {
    fn vagrant_lines(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let Some(shell) = &self.shell_config else {
            return Vec::new();
        };

        let mut lines = vec![comment(&format!("Shell provisioner: {}", self.name))];
        if let Some(description) = self.description.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(comment(description));
        }

        let mut args = vec![quote("shell")];
        match shell.script_path() {
            Some(path) => args.push(format!("path: {}", quote(path))),
            None => {
                let variable = format!("${}", self.variable_name());
                let tag = heredoc_tag("SCRIPT", &shell.script);
                lines.push(format!("{} = {}", variable, heredoc_open(&tag)));
                lines.extend(heredoc_body(&shell.script));
                lines.push(tag);
                lines.push(String::new());
                args.push(format!("inline: {}", variable));
            }
        }
        if !shell.privileged {
            args.push("privileged: false".to_string());
        }
        if shell.run != RunMode::Once {
            args.push(format!("run: {}", quote(shell.run.as_str())));
        }

        lines.push(format!("{}.vm.provision {}", ctx.receiver, args.join(", ")));
        lines
    }
}

impl VagrantConfig for GlobalTrigger {
    fn vagrant_lines(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let cfg = &self.trigger_config;

        let mut lines = vec![comment(&format!("Trigger: {}", self.name))];
        if let Some(description) = self.description.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(comment(description));
        }
        lines.push(format!(
            "{}.trigger.{} :{} do |trigger|",
            ctx.receiver,
            cfg.timing.as_str(),
            cfg.stage
        ));

        let mut body = Vec::new();
        for (attribute, value) in [("name", &cfg.name), ("info", &cfg.info), ("warn", &cfg.warn)] {
            if let Some(value) = value {
                body.push(format!("trigger.{} = {}", attribute, quote(value)));
            }
        }

        let command = cfg.action.command();
        let attribute = cfg.action.attribute();
        if command.contains('\n') || command.chars().count() > ctx.heredoc_threshold {
            let tag = heredoc_tag("SHELL", command);
            body.push(format!("trigger.{} = {{ inline: {}", attribute, heredoc_open(&tag)));
            body.extend(heredoc_body(command));
            body.push(tag);
            body.push("}".to_string());
        } else {
            body.push(format!("trigger.{} = {{ inline: {} }}", attribute, quote(command)));
        }
        body.push(format!("trigger.on_error = :{}", cfg.on_error.as_str()));

        lines.extend(indent(body, 1));
        lines.push("end".to_string());
        lines
    }
}
