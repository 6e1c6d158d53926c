// Copyright (c) 2025 - Cowboy AI, Inc.
//! Document Renderer
//!
//! Lays out a whole Vagrantfile: header comments, the `Vagrant.configure`
//! block, then top-level blocks separated by blank lines in this order:
//!
//! 1. global plugins
//! 2. VM definitions
//! 3. global provisioners, resolved through the provisioner catalog
//! 4. global triggers, resolved through the trigger catalog
//!
//! List order is preserved everywhere. Catalog IDs with no entry are skipped
//! with a warning.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::domain::{validate_project, Project, ProjectValidation, ValidationOptions};
use crate::store::{ProvisionerCatalog, TriggerCatalog};

use super::entities::{RenderContext, VagrantConfig, DEFAULT_HEREDOC_THRESHOLD, VIRTUALBOX};
use super::ruby::{comment, indent, quote};

/// Name the orchestrator looks for
pub const FILENAME: &str = "Vagrantfile";

/// Configuration API version passed to `Vagrant.configure`
pub const DEFAULT_API_VERSION: &str = "2";

/// Rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedVagrantfile {
    pub content: String,
    pub filename: String,
}

/// Rendered document together with the project's validation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResponse {
    pub content: String,
    pub filename: String,
    pub validation: ProjectValidation,
}

/// Renders projects against a pair of catalogs
pub struct VagrantfileRenderer<'a> {
    provisioners: &'a dyn ProvisionerCatalog,
    triggers: &'a dyn TriggerCatalog,
    provider: String,
    api_version: String,
    heredoc_threshold: usize,
    options: ValidationOptions,
}

impl<'a> VagrantfileRenderer<'a> {
    pub fn new(provisioners: &'a dyn ProvisionerCatalog, triggers: &'a dyn TriggerCatalog) -> Self {
        Self {
            provisioners,
            triggers,
            provider: VIRTUALBOX.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            heredoc_threshold: DEFAULT_HEREDOC_THRESHOLD,
            options: ValidationOptions::default(),
        }
    }

    /// Renderer with every setting taken from `config`
    pub fn from_config(
        provisioners: &'a dyn ProvisionerCatalog,
        triggers: &'a dyn TriggerCatalog,
        config: &GeneratorConfig,
    ) -> Self {
        Self::new(provisioners, triggers)
            .with_provider(config.provider.as_str())
            .with_api_version(config.api_version.as_str())
            .with_heredoc_threshold(config.heredoc_threshold)
            .with_validation_options(config.validation)
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_heredoc_threshold(mut self, threshold: usize) -> Self {
        self.heredoc_threshold = threshold;
        self
    }

    /// Options used by [`render_with_validation`](Self::render_with_validation)
    pub fn with_validation_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Render the project
    ///
    /// Rendering never fails. A project without VMs still yields a
    /// configure block; validation is what reports it.
    pub fn render(&self, project: &Project) -> GeneratedVagrantfile {
        debug!(
            project = %project.name,
            vms = project.vms.len(),
            provider = %self.provider,
            "Rendering Vagrantfile"
        );

        let ctx = RenderContext {
            receiver: "config",
            provider: &self.provider,
            heredoc_threshold: self.heredoc_threshold,
        };

        let mut blocks: Vec<Vec<String>> = Vec::new();
        blocks.extend(project.global_plugins.iter().map(|p| p.vagrant_lines(&ctx)));
        blocks.extend(project.vms.iter().map(|vm| vm.vagrant_lines(&ctx)));
        blocks.extend(self.global_provisioner_blocks(project, &ctx));
        blocks.extend(self.global_trigger_blocks(project, &ctx));

        let mut lines = header(project);
        lines.push(String::new());
        lines.push(format!(
            "Vagrant.configure({}) do |config|",
            quote(&self.api_version)
        ));
        for (i, block) in blocks.into_iter().filter(|b| !b.is_empty()).enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(indent(block, 1));
        }
        lines.push("end".to_string());

        let mut content = lines.join("\n");
        content.push('\n');

        info!(
            project = %project.name,
            bytes = content.len(),
            "Generated Vagrantfile"
        );

        GeneratedVagrantfile {
            content,
            filename: FILENAME.to_string(),
        }
    }

    /// Validate and render in one call
    ///
    /// The document is produced even when validation fails; callers decide
    /// what to do with an invalid project.
    pub fn render_with_validation(&self, project: &Project) -> GenerationResponse {
        let validation = validate_project(project, &self.options);
        info!(
            project = %project.name,
            valid = validation.is_valid(),
            errors = validation.report.errors.len(),
            warnings = validation.report.warnings.len(),
            "Validated project"
        );

        let generated = self.render(project);
        GenerationResponse {
            content: generated.content,
            filename: generated.filename,
            validation,
        }
    }

    fn global_provisioner_blocks(
        &self,
        project: &Project,
        ctx: &RenderContext<'_>,
    ) -> Vec<Vec<String>> {
        project
            .global_provisioners
            .iter()
            .filter_map(|id| {
                let found = self.provisioners.get_provisioner(id);
                if found.is_none() {
                    warn!(project = %project.name, provisioner_id = %id, "Skipping unknown global provisioner");
                }
                found
            })
            .map(|provisioner| provisioner.vagrant_lines(ctx))
            .collect()
    }

    fn global_trigger_blocks(&self, project: &Project, ctx: &RenderContext<'_>) -> Vec<Vec<String>> {
        project
            .global_triggers
            .iter()
            .filter_map(|id| {
                let found = self.triggers.get_trigger(id);
                if found.is_none() {
                    warn!(project = %project.name, trigger_id = %id, "Skipping unknown global trigger");
                }
                found
            })
            .map(|trigger| trigger.vagrant_lines(ctx))
            .collect()
    }
}

fn header(project: &Project) -> Vec<String> {
    let mut lines = vec![
        "# -*- mode: ruby -*-".to_string(),
        "# vi: set ft=ruby :".to_string(),
        "#".to_string(),
        comment(&format!("Vagrantfile for project: {}", project.name)),
    ];
    if !project.description.trim().is_empty() {
        lines.push(comment(&project.description));
    }
    lines.push("# Generated by cim-vagrantfile".to_string());
    lines
}
