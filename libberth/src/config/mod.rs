//! Engine configuration.
//!
//! This module manages engine settings with sensible defaults, loading from
//! an optional YAML file and merging `BERTH_*` environment variables on top.

use crate::error::{Result, BerthError};
use config::{Config as ConfigRs, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub public: PublicRegistry,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub resources: ResourceDefaults,
    #[serde(default)]
    pub ports: Ports,
}

impl Config {
    /// Parses a `Config` from a YAML string layered over the defaults.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(Self::defaults_source()?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder)
    }

    /// Loads a `Config` from an optional file path plus the environment.
    ///
    /// A missing `path` means defaults and environment only. A given path
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigRs::builder().add_source(Self::defaults_source()?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("BERTH")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(builder)
    }

    fn defaults_source() -> Result<ConfigRs> {
        ConfigRs::try_from(&Config::default()).map_err(|e| {
            BerthError::config_with_source("Failed to build default configuration", None, e)
        })
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                BerthError::config_with_source("Failed to deserialize configuration", None, e)
            })
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            max_idle_per_host: default_max_idle_per_host(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_max_idle_per_host() -> usize {
    10
}

/// Public registry endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicRegistry {
    /// Web API used for search and tag listing
    #[serde(default = "default_hub_url")]
    pub hub_url: String,

    /// Distribution API used for manifests and config blobs
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Namespace assumed for unqualified image names
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PublicRegistry {
    fn default() -> Self {
        Self {
            hub_url: default_hub_url(),
            registry_url: default_registry_url(),
            default_namespace: default_namespace(),
            page_size: default_page_size(),
        }
    }
}

fn default_hub_url() -> String {
    "https://hub.docker.com".to_string()
}

fn default_registry_url() -> String {
    "https://registry-1.docker.io".to_string()
}

fn default_namespace() -> String {
    "library".to_string()
}

fn default_page_size() -> usize {
    25
}

/// Platform picked out of multi-platform image indexes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Platform {
    #[serde(default = "default_os")]
    pub os: String,

    #[serde(default = "default_architecture")]
    pub architecture: String,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            os: default_os(),
            architecture: default_architecture(),
        }
    }
}

fn default_os() -> String {
    "linux".to_string()
}

fn default_architecture() -> String {
    "amd64".to_string()
}

/// Documented resource defaults. CPU in millicores, memory in MiB.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceDefaults {
    #[serde(default = "default_cpu_request")]
    pub cpu_request: u32,

    #[serde(default = "default_cpu_limit")]
    pub cpu_limit: u32,

    #[serde(default = "default_mem_request")]
    pub mem_request: u32,

    #[serde(default = "default_mem_limit")]
    pub mem_limit: u32,
}

impl Default for ResourceDefaults {
    fn default() -> Self {
        Self {
            cpu_request: default_cpu_request(),
            cpu_limit: default_cpu_limit(),
            mem_request: default_mem_request(),
            mem_limit: default_mem_limit(),
        }
    }
}

fn default_cpu_request() -> u32 {
    100
}

fn default_cpu_limit() -> u32 {
    500
}

fn default_mem_request() -> u32 {
    128
}

fn default_mem_limit() -> u32 {
    512
}

/// Port handling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Ports {
    #[serde(default)]
    pub null_protocol: NullProtocolPolicy,
}

/// What to do with ports whose protocol is not in the catalogue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NullProtocolPolicy {
    /// Keep the port with no protocol.
    #[default]
    Accept,
    /// Refuse to emit a payload until a protocol is chosen.
    Reject,
}
