//! Per-container configuration orchestrator.
//!
//! A [`ContainerOrchestrator`] owns the editable projection of one
//! [`ContainerConfig`]: registry mode, image and tag selection, and the port,
//! volume and advanced sub-managers. It drives resolution as two sequential
//! steps, tags then descriptor, each issued as a request carrying a
//! [`SelectionToken`]. Only a response whose token is still current is
//! applied, so the last selection wins regardless of arrival order.
//!
//! Every successful mutation is reported on the form's event channel.

mod request;

pub use request::{
    DescriptorRequest, DescriptorResponse, SelectionToken, TagRequest, TagResponse, TokenSource,
};

use crate::advanced::AdvancedSettings;
use crate::advanced::env::{EnvEdit, EnvExport, EnvImport};
use crate::advanced::firewall::FirewallEdit;
use crate::advanced::resources::ResourceField;
use crate::config::Config;
use crate::error::{BerthError, Result};
use crate::model::{
    ContainerConfig, DEFAULT_TAG, EnvVar, FirewallEntry, FirewallPolicy, ImageSelection,
    MASKED_PASSWORD, Notice, Password, PortEntry, RegistryCredentials, RegistryMode, ResourceType,
    VolumeMount,
};
use crate::ports::{PortEdit, PortManager};
use crate::protocol::ProtocolCatalogue;
use crate::resolver::{ImageSummary, RegistryResolver, Resolved, TagSummary, search_or_empty};
use crate::validator::{CredentialValidator, RegistryCredentialRecord};
use crate::volumes::{ProjectVolumeCatalogue, VolumeEdit, VolumeManager};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// Collaborators shared by every container of a form.
#[derive(Clone)]
pub struct EngineContext {
    pub resolver: Arc<dyn RegistryResolver>,
    pub protocols: Arc<ProtocolCatalogue>,
    pub volumes: Arc<ProjectVolumeCatalogue>,
    pub config: Arc<Config>,
    tokens: TokenSource,
}

impl EngineContext {
    /// Context with the builtin protocol catalogue and no project volumes.
    pub fn new(resolver: Arc<dyn RegistryResolver>, config: Config) -> Self {
        Self {
            resolver,
            protocols: Arc::new(ProtocolCatalogue::builtin()),
            volumes: Arc::new(ProjectVolumeCatalogue::default()),
            config: Arc::new(config),
            tokens: TokenSource::default(),
        }
    }

    pub fn with_protocols(mut self, protocols: Arc<ProtocolCatalogue>) -> Self {
        self.protocols = protocols;
        self
    }

    pub fn with_volumes(mut self, volumes: Arc<ProjectVolumeCatalogue>) -> Self {
        self.volumes = volumes;
        self
    }
}

/// Change notifications sent to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    PortsChanged {
        container_index: usize,
        ports: Vec<PortEntry>,
    },
    VolumesChanged {
        container_index: usize,
        volumes: Vec<VolumeMount>,
    },
    EnvVarsChanged {
        container_index: usize,
        env_vars: Vec<EnvVar>,
    },
    FirewallChanged {
        container_index: usize,
        entries: Vec<FirewallEntry>,
    },
    /// The whole container after any meaningful change.
    ConfigChanged(Box<ContainerConfig>),
    /// Credentials the host should persist.
    CredentialValidated {
        container_index: usize,
        credentials: RegistryCredentials,
    },
    Notice(Notice),
    /// A container was dropped; later containers follow re-indexed.
    ContainerRemoved { container_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Uninitialized,
    /// Saved values are loaded; resolution waits for a credential.
    Restoring,
    Ready,
}

/// An image picked from search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChoice {
    pub namespace: Option<String>,
    pub name: String,
    /// Best-guess tag; `latest` when absent.
    pub tag: Option<String>,
}

impl ImageChoice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            tag: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl From<&ImageSummary> for ImageChoice {
    fn from(summary: &ImageSummary) -> Self {
        Self {
            namespace: summary.namespace.clone(),
            name: summary.name.clone(),
            tag: None,
        }
    }
}

/// Coordinator for one container slot.
pub struct ContainerOrchestrator {
    index: usize,
    ctx: EngineContext,
    events: UnboundedSender<FormEvent>,
    state: OrchestratorState,
    image: ImageSelection,
    tags: Vec<TagSummary>,
    needs_credential: bool,
    reentering_password: bool,
    records: Vec<RegistryCredentialRecord>,
    image_token: Option<SelectionToken>,
    descriptor_token: Option<SelectionToken>,
    ports: PortManager,
    volumes: VolumeManager,
    advanced: AdvancedSettings,
}

impl ContainerOrchestrator {
    pub fn new(index: usize, ctx: EngineContext, events: UnboundedSender<FormEvent>) -> Self {
        let defaults = ctx.config.resources;
        Self {
            index,
            ctx,
            events,
            state: OrchestratorState::Uninitialized,
            image: ImageSelection::default(),
            tags: Vec::new(),
            needs_credential: false,
            reentering_password: false,
            records: Vec::new(),
            image_token: None,
            descriptor_token: None,
            ports: PortManager::new(index),
            volumes: VolumeManager::new(index),
            advanced: AdvancedSettings::new(index, defaults),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn image(&self) -> &ImageSelection {
        &self.image
    }

    pub fn registry_mode(&self) -> &RegistryMode {
        &self.image.registry
    }

    /// Tags offered for the current image.
    pub fn tags(&self) -> &[TagSummary] {
        &self.tags
    }

    /// True while private mode waits for a validated credential.
    pub fn needs_credential(&self) -> bool {
        self.needs_credential
    }

    pub fn ports(&self) -> &PortManager {
        &self.ports
    }

    pub fn volumes(&self) -> &VolumeManager {
        &self.volumes
    }

    pub fn advanced(&self) -> &AdvancedSettings {
        &self.advanced
    }

    pub fn has_ingress(&self) -> bool {
        self.ports.has_ingress()
    }

    /// Replays a saved container.
    ///
    /// In private mode the stored password is masked and nothing is
    /// resolved until [`validate_credentials`](Self::validate_credentials)
    /// succeeds, unless this session already validated the same registry
    /// and user. In public mode a selected image yields its tag request.
    pub fn restore(&mut self, saved: ContainerConfig) -> Option<TagRequest> {
        self.state = OrchestratorState::Restoring;
        self.image_token = None;
        self.descriptor_token = None;
        self.tags.clear();
        self.reentering_password = false;

        self.advanced = AdvancedSettings::from_config(&saved, self.ctx.config.resources);
        self.advanced.set_container_index(self.index);
        self.ports = PortManager::from_entries(self.index, saved.ports);
        self.volumes = VolumeManager::from_entries(self.index, saved.volumes);
        self.image = saved.image;

        if let RegistryMode::Private(stored) = &self.image.registry {
            match self.record_for(&stored.url, &stored.user) {
                Some(record) => {
                    self.image.registry = RegistryMode::Private(record.credentials.clone());
                    self.needs_credential = false;
                }
                None => {
                    self.image.registry = RegistryMode::Private(stored.masked());
                    self.needs_credential = true;
                    info!(container = self.index, "restored private registry; credential required");
                    self.emit_config();
                    return None;
                }
            }
        } else {
            self.needs_credential = false;
        }

        self.state = OrchestratorState::Ready;
        self.emit_config();
        self.image.is_selected().then(|| self.issue_tag_request())
    }

    /// Selects a new image: resets ports and volumes and asks for its tags.
    ///
    /// # Errors
    ///
    /// `CredentialRequired` while private mode has no validated credential.
    pub fn select_image(&mut self, choice: ImageChoice) -> Result<TagRequest> {
        self.require_credential()?;
        if choice.name.trim().is_empty() {
            return Err(BerthError::validation("Image name is required"));
        }

        self.ports.clear();
        self.volumes.clear();
        self.tags.clear();
        self.descriptor_token = None;
        self.image.namespace = choice.namespace.filter(|ns| !ns.is_empty());
        self.image.name = choice.name.trim().to_string();
        self.image.tag = choice
            .tag
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TAG.to_string());
        self.state = OrchestratorState::Ready;

        info!(container = self.index, image = %self.image.name, "image selected");
        self.emit_ports();
        self.emit_volumes();
        self.emit_config();
        Ok(self.issue_tag_request())
    }

    /// Applies a tag listing and settles on a definite tag.
    ///
    /// The current tag wins if listed, then `latest`, then the first tag.
    /// Returns `None` for a stale response.
    pub fn apply_tags(&mut self, response: TagResponse) -> Option<DescriptorRequest> {
        if self.image_token != Some(response.request.token) {
            warn!(container = self.index, image = %response.request.image, "dropping stale tag response");
            return None;
        }
        self.image_token = None;

        let Resolved { value: tags, notice } = response.tags;
        if let Some(notice) = notice {
            self.emit(FormEvent::Notice(notice.for_container(self.index)));
        }

        let has = |name: &str| tags.iter().any(|t| t.name == name);
        let tag = if has(self.image.tag.as_str()) {
            self.image.tag.clone()
        } else if has(DEFAULT_TAG) {
            DEFAULT_TAG.to_string()
        } else {
            tags.first()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| DEFAULT_TAG.to_string())
        };
        debug!(container = self.index, %tag, count = tags.len(), "tags applied");

        self.tags = tags;
        self.image.tag = tag;
        self.emit_config();
        Some(self.issue_descriptor_request())
    }

    /// Changes the tag without resetting ports or volumes.
    pub fn select_tag(&mut self, tag: &str) -> Result<DescriptorRequest> {
        self.require_credential()?;
        if !self.image.is_selected() {
            return Err(BerthError::validation("Select an image before choosing a tag"));
        }
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(BerthError::validation("Tag cannot be empty"));
        }

        self.image_token = None;
        self.image.tag = tag.to_string();
        self.emit_config();
        Ok(self.issue_descriptor_request())
    }

    /// Applies default ports and volumes under the customisation guard.
    ///
    /// Returns whether either list changed; stale responses change nothing.
    pub fn apply_descriptor(&mut self, response: DescriptorResponse) -> bool {
        if self.descriptor_token != Some(response.request.token) {
            warn!(
                container = self.index,
                image = %response.request.image,
                tag = %response.request.tag,
                "dropping stale descriptor response"
            );
            return false;
        }
        self.descriptor_token = None;

        let Resolved {
            value: descriptor,
            notice,
        } = response.descriptor;
        if let Some(notice) = notice {
            self.emit(FormEvent::Notice(notice.for_container(self.index)));
        }

        let key = &response.request.selection_key;
        let ports_changed = self
            .ports
            .apply_default_ports(key, &descriptor, &self.ctx.protocols);
        let volumes_changed = self.volumes.apply_default_volumes(key, &descriptor);

        if ports_changed {
            self.emit_ports();
        }
        if volumes_changed {
            self.emit_volumes();
        }
        if ports_changed || volumes_changed {
            self.emit_config();
        }
        ports_changed || volumes_changed
    }

    /// Runs tags then descriptor for `request` against the context resolver.
    pub async fn resolve(&mut self, request: TagRequest) -> bool {
        let resolver = self.ctx.resolver.clone();
        let tags = request.fetch(resolver.as_ref()).await;
        match self.apply_tags(tags) {
            Some(next) => {
                let descriptor = next.fetch(resolver.as_ref()).await;
                self.apply_descriptor(descriptor)
            }
            None => false,
        }
    }

    /// Fetches and applies the descriptor for a tag change.
    pub async fn resolve_tag(&mut self, tag: &str) -> Result<bool> {
        let request = self.select_tag(tag)?;
        let resolver = self.ctx.resolver.clone();
        let response = request.fetch(resolver.as_ref()).await;
        Ok(self.apply_descriptor(response))
    }

    /// Switches between the public registry and a private one.
    ///
    /// The image selection and the other mode's bookkeeping are cleared.
    /// Private credentials are trusted only if this session already
    /// validated them; otherwise a credential is required before searching.
    pub fn switch_registry_mode(&mut self, mode: RegistryMode) {
        let unchanged = match (&self.image.registry, &mode) {
            (RegistryMode::Public, RegistryMode::Public) => true,
            (RegistryMode::Private(a), RegistryMode::Private(b)) => {
                a.url == b.url && a.user == b.user
            }
            _ => false,
        };
        if unchanged {
            return;
        }

        self.image_token = None;
        self.descriptor_token = None;
        self.tags.clear();
        self.ports.clear();
        self.volumes.clear();
        self.reentering_password = false;

        let registry = match mode {
            RegistryMode::Public => {
                self.needs_credential = false;
                RegistryMode::Public
            }
            RegistryMode::Private(requested) => {
                let validated = self
                    .record_for(&requested.url, &requested.user)
                    .map(|record| record.credentials.clone());
                self.needs_credential = validated.is_none();
                RegistryMode::Private(validated.unwrap_or_else(|| requested.masked()))
            }
        };
        self.image = ImageSelection {
            registry,
            ..ImageSelection::default()
        };
        self.state = OrchestratorState::Ready;

        info!(container = self.index, private = self.image.registry.is_private(), "registry mode switched");
        self.emit_ports();
        self.emit_volumes();
        self.emit_config();
    }

    /// Validates a private registry credential and switches to it.
    ///
    /// On failure nothing changes and a blocking notice is emitted. On
    /// success the record is cached for the session, the credential is
    /// handed to the host, and a tag request is returned when an image is
    /// already selected.
    pub async fn validate_credentials(
        &mut self,
        url: &str,
        user: &str,
        password: Password,
    ) -> Result<Option<TagRequest>> {
        let validator = CredentialValidator::new(self.ctx.resolver.clone());
        let record = match validator.validate(url, user, password, self.index).await {
            Ok(record) => record,
            Err(e) => {
                self.emit(FormEvent::Notice(
                    Notice::blocking(e.to_string()).for_container(self.index),
                ));
                return Err(e);
            }
        };

        let same_registry = matches!(
            &self.image.registry,
            RegistryMode::Private(current) if current.url == record.credentials.url
        );
        if !same_registry {
            self.image = ImageSelection::default();
            self.tags.clear();
            self.ports.clear();
            self.volumes.clear();
            self.emit_ports();
            self.emit_volumes();
        }

        self.records
            .retain(|r| !r.matches(&record.credentials.url, &record.credentials.user));
        self.image.registry = RegistryMode::Private(record.credentials.clone());
        self.records.push(record.clone());
        self.needs_credential = false;
        self.reentering_password = false;
        self.state = OrchestratorState::Ready;

        self.emit(FormEvent::CredentialValidated {
            container_index: self.index,
            credentials: record.credentials,
        });
        self.emit_config();
        Ok(self.image.is_selected().then(|| self.issue_tag_request()))
    }

    /// What the password field shows.
    ///
    /// `None` in public mode, an empty field while the user re-enters the
    /// secret, otherwise the fixed-length placeholder. A secret is never
    /// echoed back.
    pub fn password_field(&self) -> Option<&str> {
        if !self.image.registry.is_private() {
            None
        } else if self.reentering_password {
            Some("")
        } else {
            Some(MASKED_PASSWORD)
        }
    }

    /// Opens the password field for re-entry.
    pub fn reenter_password(&mut self) {
        if self.image.registry.is_private() {
            self.reentering_password = true;
        }
    }

    /// Searches the current registry.
    pub async fn search_images(&self, query: &str) -> Result<Resolved<Vec<ImageSummary>>> {
        self.require_credential()?;
        let mut resolved = search_or_empty(
            self.ctx.resolver.as_ref(),
            query,
            self.image.registry.credentials(),
        )
        .await;
        resolved.notice = resolved.notice.map(|n| n.for_container(self.index));
        Ok(resolved)
    }

    pub fn add_port(&mut self) -> usize {
        let index = self.ports.add_port();
        self.ports_changed();
        index
    }

    pub fn remove_port(&mut self, port: usize) -> Result<PortEntry> {
        let removed = self.ports.remove_port(port)?;
        self.ports_changed();
        Ok(removed)
    }

    pub fn edit_port(&mut self, port: usize, edit: PortEdit) -> Result<()> {
        self.ports.edit_port(port, edit)?;
        self.ports_changed();
        Ok(())
    }

    pub fn begin_edit_port(&mut self, port: usize) -> Result<()> {
        self.ports.begin_edit(port)
    }

    pub fn end_edit_port(&mut self) {
        self.ports.end_edit();
    }

    /// Toggles ingress; rejections are also reported as a warning notice.
    pub fn toggle_ingress(&mut self, port: usize, value: bool, ingress_elsewhere: bool) -> Result<bool> {
        match self.ports.toggle_ingress(port, value, ingress_elsewhere) {
            Ok(changed) => {
                if changed {
                    self.ports_changed();
                }
                Ok(changed)
            }
            Err(e) => {
                if e.is_blocking() {
                    self.emit(FormEvent::Notice(
                        Notice::warning(e.to_string()).for_container(self.index),
                    ));
                }
                Err(e)
            }
        }
    }

    pub fn add_volume(&mut self) -> usize {
        let index = self.volumes.add_volume();
        self.volumes_changed();
        index
    }

    pub fn remove_volume(&mut self, volume: usize) -> Result<VolumeMount> {
        let removed = self.volumes.remove_volume(volume)?;
        self.volumes_changed();
        Ok(removed)
    }

    pub fn edit_volume(&mut self, volume: usize, edit: VolumeEdit) -> Result<()> {
        self.volumes.edit_volume(volume, edit)?;
        self.volumes_changed();
        Ok(())
    }

    /// Attaches an existing project volume from the context catalogue.
    pub fn attach_existing_volume(&mut self, volume: usize, volume_id: &str) -> Result<()> {
        let catalogue = self.ctx.volumes.clone();
        self.volumes.attach_existing(volume, volume_id, &catalogue)?;
        self.volumes_changed();
        Ok(())
    }

    pub fn add_env_var(&mut self, key: &str, value: &str) -> Result<usize> {
        let index = self.advanced.env_mut().add_var(key, value)?;
        self.env_changed();
        Ok(index)
    }

    pub fn remove_env_var(&mut self, var: usize) -> Result<EnvVar> {
        let removed = self.advanced.env_mut().remove_var(var)?;
        self.env_changed();
        Ok(removed)
    }

    pub fn edit_env_var(&mut self, var: usize, edit: EnvEdit) -> Result<()> {
        self.advanced.env_mut().edit_var(var, edit)?;
        self.env_changed();
        Ok(())
    }

    /// Appends variables parsed from a delimited blob.
    pub fn import_env(&mut self, text: &str) -> EnvImport {
        let result = self.advanced.env_mut().import(text);
        if result.skipped > 0 {
            self.emit(FormEvent::Notice(
                Notice::info(format!("{} line(s) could not be imported", result.skipped))
                    .for_container(self.index),
            ));
        }
        if result.added > 0 {
            self.env_changed();
        }
        result
    }

    /// Exports variables with a timestamped filename.
    pub fn export_env(&self) -> EnvExport {
        self.advanced.env().export(Local::now().naive_local())
    }

    pub fn add_firewall_entry(
        &mut self,
        cidr: &str,
        level: &str,
        policy: FirewallPolicy,
        rule: &str,
    ) -> Result<usize> {
        let index = self
            .advanced
            .firewall_mut()
            .add_entry(cidr, level, policy, rule)?;
        self.firewall_changed();
        Ok(index)
    }

    pub fn remove_firewall_entry(&mut self, entry: usize) -> Result<FirewallEntry> {
        let removed = self.advanced.firewall_mut().remove_entry(entry)?;
        self.firewall_changed();
        Ok(removed)
    }

    pub fn edit_firewall_entry(&mut self, entry: usize, edit: FirewallEdit) -> Result<()> {
        self.advanced.firewall_mut().edit_entry(entry, edit)?;
        self.firewall_changed();
        Ok(())
    }

    pub fn attach_resources(&mut self) {
        self.advanced.attach_resources();
        self.emit_config();
    }

    pub fn detach_resources(&mut self) {
        self.advanced.detach_resources();
        self.emit_config();
    }

    /// Sets a resource field from text input.
    pub fn set_resource(&mut self, field: ResourceField, input: &str) -> Result<()> {
        self.advanced.set_resource_input(field, input)?;
        self.emit_config();
        Ok(())
    }

    pub fn set_container_type(&mut self, container_type: ResourceType) {
        self.advanced.set_container_type(container_type);
        self.emit_config();
    }

    pub fn set_start_command(&mut self, command: Option<String>) {
        self.advanced.set_start_command(command);
        self.emit_config();
    }

    pub fn set_start_args(&mut self, args: Option<String>) {
        self.advanced.set_start_args(args);
        self.emit_config();
    }

    /// Moves the container to a new position and re-stamps every entry.
    pub fn set_index(&mut self, index: usize) {
        if index == self.index {
            return;
        }
        self.index = index;
        self.ports.set_container_index(index);
        self.volumes.set_container_index(index);
        self.advanced.set_container_index(index);
        self.emit_config();
    }

    /// The container as it should be persisted.
    pub fn config(&self) -> ContainerConfig {
        let mut config = ContainerConfig::new(self.index);
        config.image = self.image.clone();
        config.ports = self.ports.snapshot();
        config.volumes = self.volumes.snapshot();
        self.advanced.write_to(&mut config);
        config
    }

    /// Checks the container is complete enough to submit.
    pub fn validate(&self) -> Result<()> {
        if !self.image.is_selected() {
            return Err(BerthError::validation(format!(
                "Container {} has no image",
                self.index
            )));
        }
        self.ports.validate(self.ctx.config.ports.null_protocol)?;
        self.volumes.validate()?;
        self.advanced.validate()
    }

    fn require_credential(&self) -> Result<()> {
        if self.needs_credential {
            return Err(BerthError::credential_required(
                "validate the private registry credentials first",
            ));
        }
        Ok(())
    }

    fn record_for(&self, url: &str, user: &str) -> Option<&RegistryCredentialRecord> {
        self.records.iter().find(|r| r.matches(url, user))
    }

    fn issue_tag_request(&mut self) -> TagRequest {
        let token = self.ctx.tokens.next();
        self.image_token = Some(token);
        self.descriptor_token = None;
        TagRequest {
            token,
            container_index: self.index,
            namespace: self.image.namespace.clone(),
            image: self.image.name.clone(),
            current_tag: self.image.tag.clone(),
            credentials: self.image.registry.credentials().cloned(),
        }
    }

    fn issue_descriptor_request(&mut self) -> DescriptorRequest {
        let token = self.ctx.tokens.next();
        self.descriptor_token = Some(token);
        DescriptorRequest {
            token,
            container_index: self.index,
            namespace: self.image.namespace.clone(),
            image: self.image.name.clone(),
            tag: self.image.tag.clone(),
            selection_key: self.image.selection_key(),
            credentials: self.image.registry.credentials().cloned(),
        }
    }

    fn ports_changed(&self) {
        self.emit_ports();
        self.emit_config();
    }

    fn volumes_changed(&self) {
        self.emit_volumes();
        self.emit_config();
    }

    fn env_changed(&self) {
        self.emit(FormEvent::EnvVarsChanged {
            container_index: self.index,
            env_vars: self.advanced.env().snapshot(),
        });
        self.emit_config();
    }

    fn firewall_changed(&self) {
        self.emit(FormEvent::FirewallChanged {
            container_index: self.index,
            entries: self.advanced.firewall().snapshot(),
        });
        self.emit_config();
    }

    fn emit_ports(&self) {
        self.emit(FormEvent::PortsChanged {
            container_index: self.index,
            ports: self.ports.snapshot(),
        });
    }

    fn emit_volumes(&self) {
        self.emit(FormEvent::VolumesChanged {
            container_index: self.index,
            volumes: self.volumes.snapshot(),
        });
    }

    fn emit_config(&self) {
        self.emit(FormEvent::ConfigChanged(Box::new(self.config())));
    }

    fn emit(&self, event: FormEvent) {
        if self.events.send(event).is_err() {
            debug!(container = self.index, "event receiver dropped");
        }
    }
}
