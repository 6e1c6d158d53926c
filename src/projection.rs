// Copyright (c) 2025 - Cowboy AI, Inc.

//! Vagrantfile Projection
//!
//! A projection maps a validated [`Project`](crate::domain::Project) onto a
//! Vagrantfile. It is a pure function of its inputs: the same project and the
//! same catalog contents always produce byte-identical text.
//!
//! ```text
//! Project ──────────────┐
//! ProvisionerCatalog ───┼──> VagrantfileRenderer::render() ──> GeneratedVagrantfile
//! TriggerCatalog ───────┘            │
//!                                    └── entities::VagrantConfig per entity
//!                                            └── ruby:: literal helpers
//! ```
//!
//! - [`ruby`] - string escaping and literal forms
//! - [`entities`] - the [`VagrantConfig`](entities::VagrantConfig) rule of
//!   each entity
//! - [`vagrantfile`] - document layout and catalog resolution

pub mod entities;
pub mod ruby;
pub mod vagrantfile;

pub use entities::{RenderContext, VagrantConfig, DEFAULT_HEREDOC_THRESHOLD, VIRTUALBOX};
pub use vagrantfile::{
    GeneratedVagrantfile, GenerationResponse, VagrantfileRenderer, DEFAULT_API_VERSION, FILENAME,
};
