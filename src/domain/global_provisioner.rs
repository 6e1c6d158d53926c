// Copyright (c) 2025 - Cowboy AI, Inc.
//! Global Provisioners
//!
//! Reusable shell provisioners stored centrally and referenced from a project
//! by ID. They render at `config.` level, so they apply to every VM.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ProvisionerError;

/// When Vagrant runs a provisioner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Once,
    Always,
    Never,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Always => "always",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shell settings of a global provisioner
///
/// A non-blank `path` wins over `script`; otherwise `script` must be non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellProvisionerConfig {
    #[serde(default)]
    pub script: String,

    #[serde(default = "default_privileged")]
    pub privileged: bool,

    #[serde(default)]
    pub run: RunMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_privileged() -> bool {
    true
}

impl ShellProvisionerConfig {
    /// Inline script configuration
    pub fn script(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            privileged: true,
            run: RunMode::Once,
            path: None,
        }
    }

    /// External script file configuration
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            script: String::new(),
            privileged: true,
            run: RunMode::Once,
            path: Some(path.into()),
        }
    }

    pub fn with_run(mut self, run: RunMode) -> Self {
        self.run = run;
        self
    }

    pub fn unprivileged(mut self) -> Self {
        self.privileged = false;
        self
    }

    /// The script path, when one is set and non-blank
    pub fn script_path(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn validate(&self) -> Result<(), ProvisionerError> {
        if self.script_path().is_none() && self.script.trim().is_empty() {
            return Err(ProvisionerError::MissingShellSource);
        }
        Ok(())
    }
}

/// Named shell provisioner shared across projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalProvisioner {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub shell_config: Option<ShellProvisionerConfig>,
    #[serde(default = "Utc::now", deserialize_with = "super::timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "super::timestamp::lenient")]
    pub updated_at: DateTime<Utc>,
}

impl GlobalProvisioner {
    pub const MAX_NAME_LENGTH: usize = 100;
    pub const MAX_DESCRIPTION_LENGTH: usize = 500;

    /// Create a provisioner with a fresh ID
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        shell_config: Option<ShellProvisionerConfig>,
    ) -> Result<Self, ProvisionerError> {
        let now = Utc::now();
        let provisioner = Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            shell_config,
            created_at: now,
            updated_at: now,
        };
        provisioner.validate()?;
        Ok(provisioner)
    }

    /// Check the invariants a stored provisioner must satisfy
    pub fn validate(&self) -> Result<(), ProvisionerError> {
        if self.name.trim().is_empty() {
            return Err(ProvisionerError::Empty("Provisioner name"));
        }
        check_length("Provisioner name", &self.name, Self::MAX_NAME_LENGTH)?;
        if let Some(description) = &self.description {
            check_length("Description", description, Self::MAX_DESCRIPTION_LENGTH)?;
        }
        if let Some(shell) = &self.shell_config {
            shell.validate()?;
        }
        Ok(())
    }

    /// Ruby global variable holding the inline script
    ///
    /// Lowercases the name and replaces every character other than an ASCII
    /// letter, digit or underscore with `_`.
    pub fn variable_name(&self) -> String {
        let cleaned: String = self
            .name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        format!("provisioner_{}_script", cleaned)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn check_length(field: &'static str, text: &str, max: usize) -> Result<(), ProvisionerError> {
    let actual = text.chars().count();
    if actual > max {
        return Err(ProvisionerError::TooLong { field, max, actual });
    }
    Ok(())
}
