// Copyright (c) 2025 - Cowboy AI, Inc.
//! Vagrant Plugin Configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ConfigMap, NameError, PluginName};

/// Plugin configuration validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error("Version must be a valid semantic version constraint: {0}")]
    InvalidVersion(String),

    #[error("Plugin setting must be a plain identifier: {0}")]
    InvalidConfigKey(String),

    #[error("Plugin {0} cannot carry settings: its config key is not a Ruby identifier")]
    InvalidConfigBlock(String),
}

/// Where a plugin configuration applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginScope {
    Global,
    #[default]
    Vm,
}

/// Raw plugin configuration data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDraft {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default)]
    pub scope: PluginScope,
}

/// Named Vagrant plugin with optional settings
///
/// Invariants:
/// - Name matches `[A-Za-z0-9_-]+`
/// - Version, when present, is a semantic-version constraint
/// - Setting keys are plain identifiers so they can be written as
///   `plugin.<key> = <value>`
/// - A plugin with settings has an identifier config key, since the block is
///   opened as `config.<key> do |plugin|`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginConfiguration {
    pub name: PluginName,
    pub version: Option<String>,
    pub config: ConfigMap,
    pub scope: PluginScope,
}

impl PluginConfiguration {
    /// Create a plugin configuration without settings
    pub fn new(name: impl Into<String>, scope: PluginScope) -> Result<Self, PluginError> {
        Self::from_draft(PluginDraft {
            name: name.into(),
            version: None,
            config: ConfigMap::new(),
            scope,
        })
    }

    pub fn from_draft(draft: PluginDraft) -> Result<Self, PluginError> {
        let name = PluginName::new(draft.name)?;

        let version = match draft.version.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(v) if is_version_constraint(v) => Some(v.to_string()),
            Some(v) => return Err(PluginError::InvalidVersion(v.to_string())),
        };

        if let Some(key) = draft.config.keys().find(|k| !is_identifier(k)) {
            return Err(PluginError::InvalidConfigKey(key.to_string()));
        }
        if !draft.config.is_empty() && !is_identifier(&name.config_key()) {
            return Err(PluginError::InvalidConfigBlock(name.to_string()));
        }

        Ok(Self {
            name,
            version,
            config: draft.config,
            scope: draft.scope,
        })
    }

    pub fn with_version(self, version: impl Into<String>) -> Result<Self, PluginError> {
        let mut draft = self.to_draft();
        draft.version = Some(version.into());
        Self::from_draft(draft)
    }

    pub fn with_config(self, config: ConfigMap) -> Result<Self, PluginError> {
        let mut draft = self.to_draft();
        draft.config = config;
        Self::from_draft(draft)
    }

    pub fn to_draft(&self) -> PluginDraft {
        PluginDraft {
            name: self.name.to_string(),
            version: self.version.clone(),
            config: self.config.clone(),
            scope: self.scope,
        }
    }
}

/// Whether `key` is a Ruby method-name identifier
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Accepts constraints such as `1.2.3`, `~> 0.30.0`, `>= 2.0-beta+build.5`
fn is_version_constraint(constraint: &str) -> bool {
    let rest = constraint.trim_start_matches(|c: char| "~^><= ".contains(c));

    let (rest, build) = match rest.split_once('+') {
        Some((head, build)) => (head, Some(build)),
        None => (rest, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((head, pre)) => (head, Some(pre)),
        None => (rest, None),
    };

    let core_ok = !core.is_empty()
        && core
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    let suffix_ok = |s: Option<&str>| {
        s.map_or(true, |s| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        })
    };

    core_ok && suffix_ok(pre) && suffix_ok(build)
}
