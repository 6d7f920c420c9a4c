//! Container configuration data model.
//!
//! These are the typed, serializable shapes the engine edits and emits. The
//! host application persists them; the engine only keeps in-memory
//! projections of them while a container is being edited.

use serde::{Deserialize, Serialize};
use std::fmt;


/// Placeholder shown instead of a stored registry password.
///
/// The server keeps the real secret; rehydrated configurations carry this
/// fixed-length value until the user chooses to re-enter the password.
pub const MASKED_PASSWORD: &str = "********";

/// Tag used when nothing better is known about an image.
pub const DEFAULT_TAG: &str = "latest";

/// A registry password that is either a real secret or the masked placeholder.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Password {
    /// A secret entered during this editing session.
    Plain(String),
    /// The secret is stored server-side and was not re-entered.
    Masked,
}

impl Password {
    /// Returns true if this is the masked placeholder.
    pub fn is_masked(&self) -> bool {
        matches!(self, Password::Masked)
    }

    /// Returns the real secret, if one was supplied.
    pub fn secret(&self) -> Option<&str> {
        match self {
            Password::Plain(secret) => Some(secret),
            Password::Masked => None,
        }
    }

    /// Returns the text a form field should display.
    pub fn display(&self) -> &str {
        MASKED_PASSWORD
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        if value == MASKED_PASSWORD {
            Password::Masked
        } else {
            Password::Plain(value)
        }
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Password::from(value.to_string())
    }
}

impl From<Password> for String {
    fn from(value: Password) -> Self {
        match value {
            Password::Plain(secret) => secret,
            Password::Masked => MASKED_PASSWORD.to_string(),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Password::Plain(_) => f.write_str("Password::Plain(<redacted>)"),
            Password::Masked => f.write_str("Password::Masked"),
        }
    }
}

/// Private registry credential triple as persisted with a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryCredentials {
    pub url: String,
    pub user: String,
    pub password: Password,
}

impl RegistryCredentials {
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: Password) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password,
        }
    }

    /// Returns a copy whose password is replaced by the masked placeholder.
    pub fn masked(&self) -> Self {
        Self {
            password: Password::Masked,
            ..self.clone()
        }
    }
}

/// Which registry an image is resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RegistryMode {
    /// The default public registry; no credentials.
    #[default]
    Public,
    /// A user-supplied registry reached with the given credentials.
    Private(RegistryCredentials),
}

impl RegistryMode {
    pub fn is_private(&self) -> bool {
        matches!(self, RegistryMode::Private(_))
    }

    pub fn credentials(&self) -> Option<&RegistryCredentials> {
        match self {
            RegistryMode::Public => None,
            RegistryMode::Private(credentials) => Some(credentials),
        }
    }
}

/// The image a container runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub registry: RegistryMode,
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

impl Default for ImageSelection {
    fn default() -> Self {
        Self {
            namespace: None,
            name: String::new(),
            tag: default_tag(),
            registry: RegistryMode::Public,
        }
    }
}

impl ImageSelection {
    /// Returns true once an image name has been chosen.
    pub fn is_selected(&self) -> bool {
        !self.name.is_empty()
    }

    /// Key identifying one image:tag selection, scoped by registry.
    pub fn selection_key(&self) -> String {
        let registry = match &self.registry {
            RegistryMode::Public => "public",
            RegistryMode::Private(credentials) => credentials.url.as_str(),
        };
        match &self.namespace {
            Some(namespace) => format!("{}/{}/{}:{}", registry, namespace, self.name, self.tag),
            None => format!("{}/{}:{}", registry, self.name, self.tag),
        }
    }
}

/// Transport protocol entry from the server-provided catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protocol {
    /// Catalogue identity
    pub id: String,
    /// Protocol code, e.g. "TCP"
    pub code: String,
}

/// One exposed container port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortEntry {
    pub name: String,
    #[serde(default)]
    pub container_port: Option<u16>,
    #[serde(default)]
    pub service_port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub is_ingress: bool,
    #[serde(default)]
    pub ingress_host: Option<String>,
    #[serde(default)]
    pub container_index: usize,
    /// Set when an ingress toggle failed for lack of a service port.
    #[serde(skip)]
    pub service_port_invalid: bool,
}

/// Backing storage of a volume mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VolumeSource {
    /// A new volume described inline with the mount.
    Inline {
        #[serde(default, rename = "sizeGb")]
        size_gb: Option<u32>,
    },
    /// A volume that already exists in the project.
    Existing { id: String, name: String },
}

impl Default for VolumeSource {
    fn default() -> Self {
        VolumeSource::Inline { size_gb: None }
    }
}

/// One volume mounted into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
    #[serde(default)]
    pub source: VolumeSource,
    #[serde(default)]
    pub container_index: usize,
}

/// Resource type selector. Only `Cpu` drives behavior today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceType {
    #[default]
    Cpu,
    Gpu,
    Both,
}

/// Resource requests and limits. CPU in millicores, memory in MiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSettings {
    #[serde(default)]
    pub cpu_request: Option<u32>,
    #[serde(default)]
    pub cpu_limit: Option<u32>,
    #[serde(default)]
    pub mem_request: Option<u32>,
    #[serde(default)]
    pub mem_limit: Option<u32>,
    #[serde(default)]
    pub gpu_limit: Option<u32>,
}

/// Start command override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartCommand {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Option<String>,
}

impl StartCommand {
    pub fn is_empty(&self) -> bool {
        self.command.is_none() && self.args.is_none()
    }
}

/// Environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub container_index: usize,
}

/// Firewall rule policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FirewallPolicy {
    #[default]
    Allow,
    Deny,
}

/// Per-container firewall entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallEntry {
    pub cidr: String,
    pub level: String,
    #[serde(default)]
    pub policy: FirewallPolicy,
    pub rule: String,
    #[serde(default)]
    pub container_index: usize,
}

/// One container definition inside an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    pub index: usize,
    #[serde(default)]
    pub image: ImageSelection,
    #[serde(default)]
    pub ports: Vec<PortEntry>,
    #[serde(default)]
    pub volumes: Vec<VolumeMount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<StartCommand>,
    #[serde(default)]
    pub env_vars: Vec<EnvVar>,
    #[serde(default)]
    pub firewall_entries: Vec<FirewallEntry>,
    #[serde(default)]
    pub container_type: ResourceType,
}

impl ContainerConfig {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Credentials persisted with the container; present only in private mode.
    pub fn registry_credentials(&self) -> Option<&RegistryCredentials> {
        self.image.registry.credentials()
    }

    /// Moves the container to `index` and re-tags every owned entry.
    pub fn restamp(&mut self, index: usize) {
        self.index = index;
        self.ports.iter_mut().for_each(|p| p.container_index = index);
        self.volumes.iter_mut().for_each(|v| v.container_index = index);
        self.env_vars.iter_mut().for_each(|e| e.container_index = index);
        self.firewall_entries
            .iter_mut()
            .for_each(|f| f.container_index = index);
    }
}

/// A default port declared by an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredPort {
    pub container_port: u16,
    /// Raw protocol code as declared, e.g. "tcp"
    pub protocol: String,
}

/// Default ports and volume paths an image:tag declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImageDescriptor {
    pub ports: Vec<DeclaredPort>,
    pub volumes: Vec<String>,
}

impl ImageDescriptor {
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty() && self.volumes.is_empty()
    }
}

/// How loudly a notice should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Degraded result; editing continues.
    Info,
    /// Rejected edit the user should correct.
    Warning,
    /// Progress is blocked until the user acts.
    Blocking,
}

/// User-facing message produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_index: Option<usize>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            container_index: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            container_index: None,
        }
    }

    pub fn blocking(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Blocking,
            message: message.into(),
            container_index: None,
        }
    }

    /// Attributes the notice to a container.
    pub fn for_container(mut self, index: usize) -> Self {
        self.container_index = Some(index);
        self
    }
}
