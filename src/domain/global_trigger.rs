// Copyright (c) 2025 - Cowboy AI, Inc.
//! Global Triggers
//!
//! Lifecycle hooks run before or after a Vagrant stage, either on the host
//! (`run`) or inside the guest (`run_remote`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::plugin::is_identifier;

/// Trigger validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("Stage cannot be empty")]
    EmptyStage,

    #[error("Stage must be a plain identifier such as up, halt or destroy: {0}")]
    InvalidStage(String),

    #[error("Either 'run' or 'run_remote_inline' must be specified")]
    MissingAction,

    #[error("Cannot specify both 'run' and 'run_remote_inline'")]
    ConflictingActions,

    #[error("Trigger name cannot be empty")]
    EmptyName,

    #[error("{field} exceeds maximum length of {max} characters: {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Before or after the stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTiming {
    Before,
    After,
}

impl TriggerTiming {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for TriggerTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What Vagrant does when the trigger command fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    Halt,
    #[default]
    Continue,
}

impl OnError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Halt => "halt",
            Self::Continue => "continue",
        }
    }
}

/// The command a trigger executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerAction {
    /// Run on the host
    Run(String),
    /// Run inside the guest
    RunRemote(String),
}

impl TriggerAction {
    pub fn command(&self) -> &str {
        match self {
            Self::Run(command) | Self::RunRemote(command) => command,
        }
    }

    /// Vagrant attribute the command is assigned to
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::RunRemote(_) => "run_remote",
        }
    }
}

/// Trigger settings as stored, with the two command fields side by side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfigRecord {
    pub timing: TriggerTiming,
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    #[serde(default, alias = "run_remote", skip_serializing_if = "Option::is_none")]
    pub run_remote_inline: Option<String>,
    #[serde(default)]
    pub on_error: OnError,
}

/// Validated trigger settings
///
/// Invariants:
/// - `stage` is a non-blank identifier (`[A-Za-z0-9_]+`)
/// - Exactly one of `run` / `run_remote` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TriggerConfigRecord", into = "TriggerConfigRecord")]
pub struct TriggerConfig {
    pub timing: TriggerTiming,
    pub stage: String,
    pub name: Option<String>,
    pub info: Option<String>,
    pub warn: Option<String>,
    pub action: TriggerAction,
    pub on_error: OnError,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TriggerConfig {
    pub fn new(
        timing: TriggerTiming,
        stage: impl Into<String>,
        action: TriggerAction,
    ) -> Result<Self, TriggerError> {
        let mut record = TriggerConfigRecord {
            timing,
            stage: stage.into(),
            name: None,
            info: None,
            warn: None,
            run: None,
            run_remote_inline: None,
            on_error: OnError::Continue,
        };
        match action {
            TriggerAction::Run(command) => record.run = Some(command),
            TriggerAction::RunRemote(command) => record.run_remote_inline = Some(command),
        }
        Self::try_from(record)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = present(Some(name.into()));
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = present(Some(info.into()));
        self
    }

    pub fn with_warn(mut self, warn: impl Into<String>) -> Self {
        self.warn = present(Some(warn.into()));
        self
    }

    pub fn halt_on_error(mut self) -> Self {
        self.on_error = OnError::Halt;
        self
    }
}

impl TryFrom<TriggerConfigRecord> for TriggerConfig {
    type Error = TriggerError;

    fn try_from(record: TriggerConfigRecord) -> Result<Self, Self::Error> {
        let stage = record.stage.trim().to_string();
        if stage.is_empty() {
            return Err(TriggerError::EmptyStage);
        }
        if !is_identifier(&stage) {
            return Err(TriggerError::InvalidStage(stage));
        }

        let action = match (present(record.run), present(record.run_remote_inline)) {
            (Some(_), Some(_)) => return Err(TriggerError::ConflictingActions),
            (None, None) => return Err(TriggerError::MissingAction),
            (Some(run), None) => TriggerAction::Run(run),
            (None, Some(remote)) => TriggerAction::RunRemote(remote),
        };

        Ok(Self {
            timing: record.timing,
            stage,
            name: present(record.name),
            info: present(record.info),
            warn: present(record.warn),
            action,
            on_error: record.on_error,
        })
    }
}

impl From<TriggerConfig> for TriggerConfigRecord {
    fn from(config: TriggerConfig) -> Self {
        let (run, run_remote_inline) = match config.action {
            TriggerAction::Run(command) => (Some(command), None),
            TriggerAction::RunRemote(command) => (None, Some(command)),
        };
        Self {
            timing: config.timing,
            stage: config.stage,
            name: config.name,
            info: config.info,
            warn: config.warn,
            run,
            run_remote_inline,
            on_error: config.on_error,
        }
    }
}

/// Named trigger shared across projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalTrigger {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub trigger_config: TriggerConfig,
    #[serde(default = "Utc::now", deserialize_with = "super::timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "super::timestamp::lenient")]
    pub updated_at: DateTime<Utc>,
}

impl GlobalTrigger {
    pub const MAX_NAME_LENGTH: usize = 100;
    pub const MAX_DESCRIPTION_LENGTH: usize = 500;

    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        trigger_config: TriggerConfig,
    ) -> Result<Self, TriggerError> {
        let now = Utc::now();
        let trigger = Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            trigger_config,
            created_at: now,
            updated_at: now,
        };
        trigger.validate()?;
        Ok(trigger)
    }

    /// Check the invariants not already carried by [`TriggerConfig`]
    pub fn validate(&self) -> Result<(), TriggerError> {
        if self.name.trim().is_empty() {
            return Err(TriggerError::EmptyName);
        }
        let too_long = |field, text: &str, max| {
            let actual = text.chars().count();
            (actual > max).then_some(TriggerError::TooLong { field, max, actual })
        };
        if let Some(err) = too_long("Trigger name", &self.name, Self::MAX_NAME_LENGTH) {
            return Err(err);
        }
        if let Some(description) = &self.description {
            if let Some(err) = too_long("Description", description, Self::MAX_DESCRIPTION_LENGTH) {
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_action() {
        let json = r#"{"timing": "before", "stage": "up", "run": "a", "run_remote_inline": "b"}"#;
        let err = serde_json::from_str::<TriggerConfig>(json).unwrap_err();
        assert!(err.to_string().contains("Cannot specify both"));

        let json = r#"{"timing": "before", "stage": "up"}"#;
        assert!(serde_json::from_str::<TriggerConfig>(json).is_err());
    }

    #[test]
    fn test_run_remote_alias() {
        let json = r#"{"timing": "after", "stage": "up", "run_remote": "systemctl restart app"}"#;
        let config: TriggerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.action,
            TriggerAction::RunRemote("systemctl restart app".into())
        );
        assert_eq!(config.on_error, OnError::Continue);
    }

    #[test]
    fn test_stage_rules() {
        let action = || TriggerAction::Run("echo".into());
        assert_eq!(
            TriggerConfig::new(TriggerTiming::Before, " ", action()),
            Err(TriggerError::EmptyStage)
        );
        assert!(matches!(
            TriggerConfig::new(TriggerTiming::Before, "up do", action()),
            Err(TriggerError::InvalidStage(_))
        ));
        assert_eq!(
            TriggerConfig::new(TriggerTiming::Before, "1up", action()),
            Err(TriggerError::InvalidStage("1up".into()))
        );
        let config = TriggerConfig::new(TriggerTiming::Before, " destroy ", action()).unwrap();
        assert_eq!(config.stage, "destroy");
    }

    #[test]
    fn test_serializes_record_shape() {
        let config = TriggerConfig::new(
            TriggerTiming::After,
            "up",
            TriggerAction::RunRemote("uptime".into()),
        )
        .unwrap()
        .halt_on_error();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["run_remote_inline"], "uptime");
        assert_eq!(json["on_error"], "halt");
        assert!(json.get("run").is_none());
    }

    #[test]
    fn test_trigger_name_required() {
        let config =
            TriggerConfig::new(TriggerTiming::Before, "up", TriggerAction::Run("x".into())).unwrap();
        assert_eq!(
            GlobalTrigger::new("", None, config).unwrap_err(),
            TriggerError::EmptyName
        );
    }
}
