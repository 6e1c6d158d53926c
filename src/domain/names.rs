// Copyright (c) 2025 - Cowboy AI, Inc.
//! Name Value Objects
//!
//! Identifiers chosen by the user: VM names, project names and plugin names.
//! Each is validated once on construction and is immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{field} exceeds maximum length of {max} characters: {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{0} can only contain letters, numbers, underscores, and hyphens")]
    InvalidCharacters(&'static str),

    #[error("VM name must start with a letter: {0}")]
    MustStartWithLetter(String),

    #[error("Project name contains invalid characters: {0:?}")]
    InvalidFilenameCharacter(char),

    #[error("Project name cannot start or end with space or dot")]
    InvalidFilenameEdge,
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Virtual machine name, unique within a project
///
/// Invariants: matches `^[A-Za-z][A-Za-z0-9_-]*$` and is at most 50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VmName(String);

impl VmName {
    pub const MAX_LENGTH: usize = 50;

    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();

        let first = name.chars().next().ok_or(NameError::Empty("VM name"))?;

        if name.len() > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                field: "VM name",
                max: Self::MAX_LENGTH,
                actual: name.len(),
            });
        }

        if !name.chars().all(is_identifier_char) {
            return Err(NameError::InvalidCharacters("VM name"));
        }

        if !first.is_ascii_alphabetic() {
            return Err(NameError::MustStartWithLetter(name));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Project name, usable as a filename
///
/// Invariants: non-empty, at most 100 characters, none of `/ \ : * ? " < > |`,
/// and no leading or trailing space or dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectName(String);

impl ProjectName {
    pub const MAX_LENGTH: usize = 100;

    const INVALID_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(NameError::Empty("Project name"));
        }

        if name.chars().count() > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                field: "Project name",
                max: Self::MAX_LENGTH,
                actual: name.chars().count(),
            });
        }

        if let Some(ch) = name.chars().find(|c| Self::INVALID_CHARS.contains(c)) {
            return Err(NameError::InvalidFilenameCharacter(ch));
        }

        let edge = |c: char| c == ' ' || c == '.';
        if name.starts_with(edge) || name.ends_with(edge) {
            return Err(NameError::InvalidFilenameEdge);
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Vagrant plugin name (e.g. `vagrant-vbguest`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginName(String);

impl PluginName {
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into().trim().to_string();

        if name.is_empty() {
            return Err(NameError::Empty("Plugin name"));
        }

        if !name.chars().all(is_identifier_char) {
            return Err(NameError::InvalidCharacters("Plugin name"));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under `config.` that the plugin registers its settings with
    ///
    /// `vagrant-vbguest` becomes `vbguest`; hyphens become underscores.
    pub fn config_key(&self) -> String {
        self.0
            .strip_prefix("vagrant-")
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&self.0)
            .replace('-', "_")
    }
}

/// Check a free-text field against a maximum length
pub fn check_text_length(
    field: &'static str,
    text: &str,
    max: usize,
) -> Result<(), NameError> {
    let actual = text.chars().count();
    if actual > max {
        return Err(NameError::TooLong { field, max, actual });
    }
    Ok(())
}

macro_rules! string_newtype_impls {
    ($($ty:ident),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl AsRef<str> for $ty {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }

            impl TryFrom<String> for $ty {
                type Error = NameError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }

            impl TryFrom<&str> for $ty {
                type Error = NameError;

                fn try_from(value: &str) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.0
                }
            }
        )*
    };
}

string_newtype_impls!(VmName, ProjectName, PluginName);
