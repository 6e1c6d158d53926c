// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Vagrantfile Generation
//!
//! The application seam the transport layer calls. Persistence stays behind
//! [`ProjectRepository`](crate::store::ProjectRepository); the service only
//! reads.
//!
//! # Architecture
//!
//! ```text
//! Client Request
//!     ↓
//! Service Layer (this module)
//!     ↓
//! ProjectRepository → Project
//!     ↓
//! Validation Engine + VagrantfileRenderer
//!     ↓
//! GenerationResponse / VagrantfileDownload / ProjectValidation
//! ```
//!
//! # Example
//!
//! ```rust
//! use cim_vagrantfile::domain::{Project, VirtualMachine};
//! use cim_vagrantfile::service::{GenerationService, VagrantfileService};
//! use cim_vagrantfile::store::{EmptyCatalog, InMemoryProjects};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut project = Project::new("demo", "")?;
//! project.add_vm(VirtualMachine::new("web", "ubuntu/focal64")?)?;
//! let id = project.id;
//!
//! let repository = InMemoryProjects::new().with_project(project)?;
//! let service = GenerationService::new(repository, EmptyCatalog, EmptyCatalog);
//!
//! let response = service.generate(&id)?;
//! assert_eq!(response.filename, "Vagrantfile");
//! # Ok(())
//! # }
//! ```

pub mod generation;

pub use generation::{GenerationService, VagrantfileDownload, VagrantfileService, CONTENT_TYPE};
