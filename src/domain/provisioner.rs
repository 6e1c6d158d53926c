// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM-Scoped Provisioners

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ConfigMap;

/// Provisioner validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionerError {
    #[error("Shell provisioner requires either script_path or inline content")]
    MissingShellSource,

    #[error("Shell provisioner cannot have both script_path and inline content")]
    ConflictingShellSources,

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{field} exceeds maximum length of {max} characters: {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Supported provisioner types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionerType {
    Shell,
    Ansible,
    Puppet,
    Chef,
}

impl ProvisionerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Ansible => "ansible",
            Self::Puppet => "puppet",
            Self::Chef => "chef",
        }
    }
}

impl fmt::Display for ProvisionerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a shell provisioner's script comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellSource {
    /// Script file on the host
    Path(String),
    /// Script text embedded in the Vagrantfile
    Inline(String),
}

/// Shell provisioner settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProvisioner {
    pub source: ShellSource,
    pub args: Vec<String>,
    pub privileged: bool,
}

/// Provisioner applied to a single VM
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ProvisionerDraft")]
pub enum Provisioner {
    Shell(ShellProvisioner),
    Ansible(ConfigMap),
    Puppet(ConfigMap),
    Chef(ConfigMap),
}

/// Flat provisioner record as stored and exchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionerDraft {
    #[serde(rename = "type")]
    pub provisioner_type: ProvisionerType,

    #[serde(default)]
    pub script_path: Option<String>,

    #[serde(default)]
    pub inline: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_privileged")]
    pub privileged: bool,

    #[serde(default)]
    pub config: ConfigMap,
}

fn default_privileged() -> bool {
    true
}

impl ProvisionerDraft {
    pub fn new(provisioner_type: ProvisionerType) -> Self {
        Self {
            provisioner_type,
            script_path: None,
            inline: None,
            args: Vec::new(),
            privileged: true,
            config: ConfigMap::new(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Provisioner {
    /// Inline scripts longer than this draw a warning
    pub const LONG_INLINE_SCRIPT: usize = 1000;

    /// Construct a provisioner, enforcing the shell source invariant
    ///
    /// Blank `script_path`/`inline` strings count as absent.
    pub fn new(draft: ProvisionerDraft) -> Result<Self, ProvisionerError> {
        match draft.provisioner_type {
            ProvisionerType::Shell => {
                let source = match (non_blank(draft.script_path), non_blank(draft.inline)) {
                    (Some(_), Some(_)) => return Err(ProvisionerError::ConflictingShellSources),
                    (None, None) => return Err(ProvisionerError::MissingShellSource),
                    (Some(path), None) => ShellSource::Path(path),
                    (None, Some(inline)) => ShellSource::Inline(inline),
                };
                Ok(Self::Shell(ShellProvisioner {
                    source,
                    args: draft.args,
                    privileged: draft.privileged,
                }))
            }
            ProvisionerType::Ansible => Ok(Self::Ansible(draft.config)),
            ProvisionerType::Puppet => Ok(Self::Puppet(draft.config)),
            ProvisionerType::Chef => Ok(Self::Chef(draft.config)),
        }
    }

    /// Shell provisioner running a script file
    pub fn shell_path(path: impl Into<String>) -> Result<Self, ProvisionerError> {
        let mut draft = ProvisionerDraft::new(ProvisionerType::Shell);
        draft.script_path = Some(path.into());
        Self::new(draft)
    }

    /// Shell provisioner running inline script text
    pub fn shell_inline(script: impl Into<String>) -> Result<Self, ProvisionerError> {
        let mut draft = ProvisionerDraft::new(ProvisionerType::Shell);
        draft.inline = Some(script.into());
        Self::new(draft)
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        if let Self::Shell(shell) = &mut self {
            shell.args = args;
        }
        self
    }

    pub fn unprivileged(mut self) -> Self {
        if let Self::Shell(shell) = &mut self {
            shell.privileged = false;
        }
        self
    }

    pub fn provisioner_type(&self) -> ProvisionerType {
        match self {
            Self::Shell(_) => ProvisionerType::Shell,
            Self::Ansible(_) => ProvisionerType::Ansible,
            Self::Puppet(_) => ProvisionerType::Puppet,
            Self::Chef(_) => ProvisionerType::Chef,
        }
    }

    pub fn to_draft(&self) -> ProvisionerDraft {
        let mut draft = ProvisionerDraft::new(self.provisioner_type());
        match self {
            Self::Shell(shell) => {
                match &shell.source {
                    ShellSource::Path(path) => draft.script_path = Some(path.clone()),
                    ShellSource::Inline(inline) => draft.inline = Some(inline.clone()),
                }
                draft.args = shell.args.clone();
                draft.privileged = shell.privileged;
            }
            Self::Ansible(config) | Self::Puppet(config) | Self::Chef(config) => {
                draft.config = config.clone();
            }
        }
        draft
    }
}

impl From<Provisioner> for ProvisionerDraft {
    fn from(value: Provisioner) -> Self {
        value.to_draft()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_requires_exactly_one_source() {
        let mut both = ProvisionerDraft::new(ProvisionerType::Shell);
        both.script_path = Some("bootstrap.sh".into());
        both.inline = Some("echo hi".into());
        assert_eq!(
            Provisioner::new(both),
            Err(ProvisionerError::ConflictingShellSources)
        );

        let neither = ProvisionerDraft::new(ProvisionerType::Shell);
        assert_eq!(
            Provisioner::new(neither),
            Err(ProvisionerError::MissingShellSource)
        );
    }

    #[test]
    fn test_blank_source_counts_as_absent() {
        let mut draft = ProvisionerDraft::new(ProvisionerType::Shell);
        draft.script_path = Some("   ".into());
        draft.inline = Some("apt-get update".into());
        let provisioner = Provisioner::new(draft).unwrap();
        assert!(matches!(
            provisioner,
            Provisioner::Shell(ShellProvisioner {
                source: ShellSource::Inline(_),
                ..
            })
        ));
    }

    #[test]
    fn test_shell_defaults_privileged() {
        let provisioner = Provisioner::shell_path("scripts/bootstrap.sh").unwrap();
        match provisioner {
            Provisioner::Shell(shell) => assert!(shell.privileged),
            other => panic!("unexpected provisioner {:?}", other),
        }
    }

    #[test]
    fn test_config_provisioners_ignore_shell_fields() {
        let mut draft = ProvisionerDraft::new(ProvisionerType::Ansible);
        draft.config = ConfigMap::new().with("playbook", "site.yml");
        let provisioner = Provisioner::new(draft).unwrap();
        assert_eq!(provisioner.provisioner_type(), ProvisionerType::Ansible);
    }

    #[test]
    fn test_serializes_flat() {
        let provisioner = Provisioner::shell_inline("echo hi")
            .unwrap()
            .with_args(vec!["-x".into()]);
        let json = serde_json::to_value(&provisioner).unwrap();
        assert_eq!(json["type"], "shell");
        assert_eq!(json["inline"], "echo hi");
        assert_eq!(json["args"][0], "-x");
        assert_eq!(json["privileged"], true);
    }
}
