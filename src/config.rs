// Copyright (c) 2025 - Cowboy AI, Inc.
//! Generator Configuration
//!
//! Settings are read from environment variables with defaults:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `VAGRANTFILE_PROVIDER` | `virtualbox` | provider block name |
//! | `VAGRANTFILE_API_VERSION` | `2` | `Vagrant.configure` argument |
//! | `VAGRANTFILE_ALLOW_PUBLIC_PRIVATE_IPS` | `false` | accept public IPs on private networks |
//! | `VAGRANTFILE_HEREDOC_THRESHOLD` | `80` | trigger command length that switches to a heredoc |

use serde::{Deserialize, Serialize};

use crate::domain::ValidationOptions;
use crate::errors::{VagrantfileError, VagrantfileResult};
use crate::projection::entities::{DEFAULT_HEREDOC_THRESHOLD, VIRTUALBOX};
use crate::projection::vagrantfile::DEFAULT_API_VERSION;

pub const PROVIDER_VAR: &str = "VAGRANTFILE_PROVIDER";
pub const API_VERSION_VAR: &str = "VAGRANTFILE_API_VERSION";
pub const ALLOW_PUBLIC_IPS_VAR: &str = "VAGRANTFILE_ALLOW_PUBLIC_PRIVATE_IPS";
pub const HEREDOC_THRESHOLD_VAR: &str = "VAGRANTFILE_HEREDOC_THRESHOLD";

/// Rendering and validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub provider: String,
    pub api_version: String,
    pub validation: ValidationOptions,
    pub heredoc_threshold: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: VIRTUALBOX.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            validation: ValidationOptions::default(),
            heredoc_threshold: DEFAULT_HEREDOC_THRESHOLD,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> VagrantfileResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> VagrantfileResult<Self> {
        let defaults = Self::default();
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match var(PROVIDER_VAR) {
            Some(provider) if is_provider_name(&provider) => provider,
            Some(provider) => {
                return Err(VagrantfileError::Configuration(format!(
                    "{} must be a plain provider name, got '{}'",
                    PROVIDER_VAR, provider
                )))
            }
            None => defaults.provider,
        };

        let api_version = match var(API_VERSION_VAR) {
            Some(version) if version.chars().all(|c| c.is_ascii_digit()) => version,
            Some(version) => {
                return Err(VagrantfileError::Configuration(format!(
                    "{} must be numeric, got '{}'",
                    API_VERSION_VAR, version
                )))
            }
            None => defaults.api_version,
        };

        let allow_public_ips = match var(ALLOW_PUBLIC_IPS_VAR) {
            Some(flag) => parse_flag(ALLOW_PUBLIC_IPS_VAR, &flag)?,
            None => false,
        };

        let heredoc_threshold = match var(HEREDOC_THRESHOLD_VAR) {
            Some(threshold) => threshold.parse().map_err(|_| {
                VagrantfileError::Configuration(format!(
                    "{} must be a whole number, got '{}'",
                    HEREDOC_THRESHOLD_VAR, threshold
                ))
            })?,
            None => defaults.heredoc_threshold,
        };

        Ok(Self {
            provider,
            api_version,
            validation: ValidationOptions {
                allow_public_ips_in_private_networks: allow_public_ips,
            },
            heredoc_threshold,
        })
    }

    pub fn with_validation(mut self, validation: ValidationOptions) -> Self {
        self.validation = validation;
        self
    }
}

fn is_provider_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn parse_flag(name: &str, value: &str) -> VagrantfileResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(VagrantfileError::Configuration(format!(
            "{} must be true or false, got '{}'",
            name, value
        ))),
    }
}
