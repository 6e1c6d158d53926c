// Copyright (c) 2025 - Cowboy AI, Inc.
//! Vagrantfile Generation Service
//!
//! Loads a project from the repository, scores it and renders it against the
//! provisioner and trigger catalogs.
//!
//! ```text
//! project_id → ProjectRepository::get_project → validate_project
//!                                                    ↓
//!                       VagrantfileRenderer::render (catalog lookups)
//!                                                    ↓
//!                                  GenerationResponse / VagrantfileDownload
//! ```
//!
//! Generation always proceeds for an existing project, valid or not. The only
//! hard failure is a project ID the repository does not know.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GeneratorConfig;
use crate::domain::{validate_project, Project, ProjectValidation, ValidationOptions};
use crate::errors::{VagrantfileError, VagrantfileResult};
use crate::projection::{GenerationResponse, VagrantfileRenderer, FILENAME};
use crate::store::{ProjectRepository, ProvisionerCatalog, TriggerCatalog};

/// MIME type of a downloaded Vagrantfile
pub const CONTENT_TYPE: &str = "text/plain";

/// Attachment payload for a Vagrantfile download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VagrantfileDownload {
    pub filename: String,
    pub content_type: String,
    pub content_disposition: String,
    pub body: String,
}

impl VagrantfileDownload {
    fn attachment(body: String) -> Self {
        Self {
            filename: FILENAME.to_string(),
            content_type: CONTENT_TYPE.to_string(),
            content_disposition: format!("attachment; filename={}", FILENAME),
            body,
        }
    }
}

/// Generation entry points offered to the transport layer
pub trait VagrantfileService: Send + Sync {
    /// Validate and render a stored project
    fn generate(&self, project_id: &Uuid) -> VagrantfileResult<GenerationResponse>;

    /// Render a stored project as a file attachment
    fn download(&self, project_id: &Uuid) -> VagrantfileResult<VagrantfileDownload>;

    /// Validate a stored project without rendering it
    fn validate(&self, project_id: &Uuid) -> VagrantfileResult<ProjectValidation>;
}

/// Repository-backed implementation of [`VagrantfileService`]
pub struct GenerationService<R, P, T> {
    repository: R,
    provisioners: P,
    triggers: T,
    config: GeneratorConfig,
}

impl<R, P, T> GenerationService<R, P, T>
where
    R: ProjectRepository,
    P: ProvisionerCatalog,
    T: TriggerCatalog,
{
    pub fn new(repository: R, provisioners: P, triggers: T) -> Self {
        Self {
            repository,
            provisioners,
            triggers,
            config: GeneratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Generate with request-scoped validation options
    ///
    /// The transport layer derives `options` per request, e.g. through
    /// [`ValidationOptions::from_header_value`].
    pub fn generate_with_options(
        &self,
        project_id: &Uuid,
        options: ValidationOptions,
    ) -> VagrantfileResult<GenerationResponse> {
        let project = self.load(project_id)?;
        let response = self
            .renderer()
            .with_validation_options(options)
            .render_with_validation(&project);

        if !response.validation.is_valid() {
            warn!(
                project_id = %project_id,
                errors = response.validation.report.errors.len(),
                "Generated Vagrantfile for a project that failed validation"
            );
        }
        Ok(response)
    }

    fn renderer(&self) -> VagrantfileRenderer<'_> {
        VagrantfileRenderer::from_config(&self.provisioners, &self.triggers, &self.config)
    }

    fn load(&self, project_id: &Uuid) -> VagrantfileResult<Project> {
        debug!(project_id = %project_id, "Loading project");
        self.repository
            .get_project(project_id)?
            .ok_or_else(|| VagrantfileError::project_not_found(project_id))
    }
}

impl<R, P, T> VagrantfileService for GenerationService<R, P, T>
where
    R: ProjectRepository,
    P: ProvisionerCatalog,
    T: TriggerCatalog,
{
    fn generate(&self, project_id: &Uuid) -> VagrantfileResult<GenerationResponse> {
        self.generate_with_options(project_id, self.config.validation)
    }

    fn download(&self, project_id: &Uuid) -> VagrantfileResult<VagrantfileDownload> {
        let project = self.load(project_id)?;
        let generated = self.renderer().render(&project);
        info!(
            project_id = %project_id,
            bytes = generated.content.len(),
            "Prepared Vagrantfile download"
        );
        Ok(VagrantfileDownload::attachment(generated.content))
    }

    fn validate(&self, project_id: &Uuid) -> VagrantfileResult<ProjectValidation> {
        let project = self.load(project_id)?;
        let validation = validate_project(&project, &self.config.validation);
        info!(
            project_id = %project_id,
            valid = validation.is_valid(),
            warnings = validation.report.warnings.len(),
            "Validated project"
        );
        Ok(validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VirtualMachine;
    use crate::store::{EmptyCatalog, InMemoryProjects};

    fn service_with(project: Project) -> GenerationService<InMemoryProjects, EmptyCatalog, EmptyCatalog> {
        let repository = InMemoryProjects::new().with_project(project).unwrap();
        GenerationService::new(repository, EmptyCatalog, EmptyCatalog)
    }

    #[test]
    fn test_missing_project_is_not_found() {
        let service = GenerationService::new(InMemoryProjects::new(), EmptyCatalog, EmptyCatalog);
        let err = service.generate(&Uuid::new_v4()).unwrap_err();
        assert!(err.is_not_found());
        assert!(service.download(&Uuid::new_v4()).unwrap_err().is_not_found());
        assert!(service.validate(&Uuid::new_v4()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_download_headers() {
        let mut project = Project::new("demo", "").unwrap();
        project
            .add_vm(VirtualMachine::new("web", "ubuntu/focal64").unwrap())
            .unwrap();
        let id = project.id;

        let download = service_with(project).download(&id).unwrap();
        assert_eq!(download.filename, "Vagrantfile");
        assert_eq!(download.content_type, "text/plain");
        assert_eq!(download.content_disposition, "attachment; filename=Vagrantfile");
        assert!(download.body.contains("config.vm.define \"web\""));
    }

    #[test]
    fn test_invalid_project_still_generates() {
        let project = Project::new("empty", "").unwrap();
        let id = project.id;

        let response = service_with(project).generate(&id).unwrap();
        assert!(!response.validation.is_valid());
        assert!(response.content.contains("Vagrant.configure"));
    }
}
