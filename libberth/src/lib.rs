//! Berth - container configuration resolution engine
//!
//! Berth keeps a multi-container application form consistent with image
//! metadata fetched from public or private registries.
//!
//! # Quick Start
//!
//! ```no_run
//! use libberth::{ApplicationForm, Config, EngineContext, HttpResolver, ImageChoice};
//! use std::sync::Arc;
//!
//! # async fn run() -> libberth::Result<()> {
//! let config = Config::default();
//! let resolver = Arc::new(HttpResolver::new(&config)?);
//! let (mut form, _events) = ApplicationForm::new(EngineContext::new(resolver, config));
//!
//! let index = form.add_container();
//! let request = form
//!     .container_mut(index)?
//!     .select_image(ImageChoice::new("nginx"))?;
//! form.resolve(request).await;
//!
//! for container in form.payload()? {
//!     println!("{} ports", container.ports.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Main Types
//!
//! - [`ApplicationForm`] - owns every container and the ingress invariant
//! - [`ContainerOrchestrator`] - one container's image, ports, volumes and
//!   advanced settings
//! - [`RegistryResolver`] - registry seam; [`HttpResolver`] talks to real
//!   registries
//! - [`FormEvent`] - change notifications for the host
//!
//! The registry plumbing (`client`, `hub`, `oci`, `auth`) is public for
//! callers that need it but hidden from the docs.

#![warn(clippy::all)]

/// Returns the libberth crate version.
///
/// # Examples
///
/// ```
/// let version = libberth::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod advanced;
pub mod application;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod ports;
pub mod protocol;
pub mod resolver;
pub mod validator;
pub mod volumes;

pub use application::ApplicationForm;
pub use config::Config;
pub use error::{BerthError, Result};
pub use model::{ContainerConfig, Notice, Password, RegistryCredentials, RegistryMode, Severity};
pub use orchestrator::{ContainerOrchestrator, EngineContext, FormEvent, ImageChoice};
pub use reference::ImageRef;
pub use resolver::{HttpResolver, RegistryResolver, Resolved};

// Registry plumbing
#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod client;
#[doc(hidden)]
pub mod digest;
#[doc(hidden)]
pub mod hub;
#[doc(hidden)]
pub mod oci;
#[doc(hidden)]
pub mod reference;
#[doc(hidden)]
pub mod search;
