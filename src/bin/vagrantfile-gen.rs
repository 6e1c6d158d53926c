// Copyright (c) 2025 - Cowboy AI, Inc.
//! Vagrantfile Generator
//!
//! Reads a stored project (and optionally the shared provisioner and trigger
//! catalogs) from JSON files, validates it and writes the rendered
//! Vagrantfile.
//!
//! Run with: cargo run --bin vagrantfile-gen -- --project project.json
//!
//! Generator settings come from `VAGRANTFILE_*` environment variables, see
//! [`cim_vagrantfile::config`].

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use cim_vagrantfile::domain::{validate_vagrantfile_syntax, GlobalProvisioner, GlobalTrigger};
use cim_vagrantfile::store::{InMemoryProvisioners, InMemoryTriggers};
use cim_vagrantfile::{GeneratorConfig, Project, ValidationOptions, VagrantfileRenderer};

/// Render a stored project into a Vagrantfile
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Stored project JSON file
    #[arg(short, long)]
    project: PathBuf,

    /// JSON array of global provisioners
    #[arg(long)]
    provisioners: Option<PathBuf>,

    /// JSON array of global triggers
    #[arg(long)]
    triggers: Option<PathBuf>,

    /// Output path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Accept public addresses on private networks
    #[arg(long)]
    allow_public_ips: bool,

    /// Print the validation result as JSON instead of rendering
    #[arg(long)]
    validate_only: bool,

    /// Exit with an error when validation fails
    #[arg(long)]
    strict: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = GeneratorConfig::from_env().context("Invalid generator configuration")?;
    if cli.allow_public_ips {
        config = config.with_validation(ValidationOptions::allow_public_ips());
    }
    info!(provider = %config.provider, api_version = %config.api_version, "Configuration loaded");

    let text = fs::read_to_string(&cli.project)
        .with_context(|| format!("Failed to read {}", cli.project.display()))?;
    let project = Project::from_json(&text, &config.validation)
        .with_context(|| format!("Failed to load project from {}", cli.project.display()))?;
    info!(project = %project.name, vms = project.vms.len(), "Project loaded");

    let provisioners = match &cli.provisioners {
        Some(path) => InMemoryProvisioners::from_entries(read_json::<Vec<GlobalProvisioner>>(path)?)
            .with_context(|| format!("Invalid provisioner catalog {}", path.display()))?,
        None => InMemoryProvisioners::new(),
    };
    let triggers = match &cli.triggers {
        Some(path) => InMemoryTriggers::from_entries(read_json::<Vec<GlobalTrigger>>(path)?)
            .with_context(|| format!("Invalid trigger catalog {}", path.display()))?,
        None => InMemoryTriggers::new(),
    };

    let renderer = VagrantfileRenderer::from_config(&provisioners, &triggers, &config);
    let response = renderer.render_with_validation(&project);
    let report = &response.validation.report;

    for message in &report.errors {
        error!("{}", message);
    }
    for message in &report.warnings {
        warn!("{}", message);
    }
    for message in &report.suggestions {
        info!("Suggestion: {}", message);
    }

    if cli.validate_only {
        println!("{}", serde_json::to_string_pretty(&response.validation)?);
    } else {
        let syntax = validate_vagrantfile_syntax(&response.content);
        for message in &syntax.errors {
            error!("Rendered Vagrantfile: {}", message);
        }

        match &cli.output {
            Some(path) => {
                fs::write(path, &response.content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), bytes = response.content.len(), "Vagrantfile written");
            }
            None => print!("{}", response.content),
        }
    }

    if cli.strict && !response.validation.is_valid() {
        bail!(
            "Project '{}' failed validation with {} error(s)",
            project.name,
            report.errors.len()
        );
    }
    Ok(())
}
