// Copyright (c) 2025 - Cowboy AI, Inc.
//! Guest Hostname Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Hostname validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostnameError {
    #[error("Hostname is empty")]
    Empty,

    #[error("Hostname exceeds maximum length of {max} characters: {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Hostname can only contain letters, numbers, dots, and hyphens: {0}")]
    InvalidCharacter(char),
}

/// Hostname assigned to a guest machine
///
/// Invariants:
/// - Non-empty after trimming
/// - At most [`Hostname::MAX_LENGTH`] characters
/// - Letters, digits, dots and hyphens only
///
/// # Examples
///
/// ```rust
/// use cim_vagrantfile::domain::Hostname;
///
/// let host = Hostname::new("web.local").unwrap();
/// assert_eq!(host.short_name(), "web");
///
/// assert!(Hostname::new("web_01").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hostname(String);

impl Hostname {
    /// Maximum hostname length accepted for a VM
    pub const MAX_LENGTH: usize = 50;

    /// Create a new hostname with validation
    pub fn new(hostname: impl Into<String>) -> Result<Self, HostnameError> {
        let hostname = hostname.into().trim().to_string();

        if hostname.is_empty() {
            return Err(HostnameError::Empty);
        }

        if hostname.len() > Self::MAX_LENGTH {
            return Err(HostnameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: hostname.len(),
            });
        }

        if let Some(ch) = hostname
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-')
        {
            return Err(HostnameError::InvalidCharacter(ch));
        }

        Ok(Self(hostname))
    }

    /// Parse an optional hostname, treating blank input as unset
    pub fn optional(hostname: Option<&str>) -> Result<Option<Self>, HostnameError> {
        match hostname.map(str::trim) {
            None | Some("") => Ok(None),
            Some(h) => Self::new(h).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First label before the first dot
    pub fn short_name(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Hostname {
    type Error = HostnameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Hostname> for String {
    fn from(value: Hostname) -> Self {
        value.0
    }
}
