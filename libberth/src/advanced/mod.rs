//! Advanced container settings.
//!
//! Resources, start command, environment variables and firewall entries.
//! Everything here is a pure state transformer: no network calls, and the
//! only failures are rejected field input.

pub mod env;
pub mod firewall;
pub mod resources;

use crate::config::ResourceDefaults;
use crate::error::Result;
use crate::model::{ContainerConfig, ResourceSettings, ResourceType, StartCommand};
use env::EnvManager;
use firewall::FirewallManager;
use resources::ResourceField;
use tracing::debug;

#[cfg(test)]
mod env_tests;

/// Advanced settings of one container.
#[derive(Debug, Clone)]
pub struct AdvancedSettings {
    defaults: ResourceDefaults,
    resources: Option<ResourceSettings>,
    start: Option<StartCommand>,
    container_type: ResourceType,
    env: EnvManager,
    firewall: FirewallManager,
}

impl AdvancedSettings {
    pub fn new(container_index: usize, defaults: ResourceDefaults) -> Self {
        Self {
            defaults,
            resources: None,
            start: None,
            container_type: ResourceType::default(),
            env: EnvManager::new(container_index),
            firewall: FirewallManager::new(container_index),
        }
    }

    /// Rehydrates saved settings. Attached resources get unset fields seeded.
    pub fn from_config(config: &ContainerConfig, defaults: ResourceDefaults) -> Self {
        Self {
            defaults,
            resources: config.resources.map(|r| resources::seed(r, &defaults)),
            start: config.start.clone().filter(|s| !s.is_empty()),
            container_type: config.container_type,
            env: EnvManager::from_entries(config.index, config.env_vars.clone()),
            firewall: FirewallManager::from_entries(config.index, config.firewall_entries.clone()),
        }
    }

    /// Whether the section should start expanded: something differs from
    /// its default.
    pub fn expanded_by_default(&self) -> bool {
        self.resources
            .as_ref()
            .is_some_and(|r| resources::differs_from_defaults(r, &self.defaults))
            || self.start_visible()
            || !self.env.is_empty()
            || self.container_type != ResourceType::default()
    }

    pub fn resources(&self) -> Option<&ResourceSettings> {
        self.resources.as_ref()
    }

    /// The settings that apply, attached or not.
    pub fn effective_resources(&self) -> ResourceSettings {
        self.resources
            .unwrap_or_else(|| resources::default_settings(&self.defaults))
    }

    /// Attaches the resources sub-section, seeded from the defaults.
    pub fn attach_resources(&mut self) -> &ResourceSettings {
        let defaults = self.defaults;
        self.resources
            .get_or_insert_with(|| resources::default_settings(&defaults))
    }

    /// Detaches the sub-section; the defaults apply again.
    pub fn detach_resources(&mut self) {
        self.resources = None;
    }

    /// Sets one field, attaching the sub-section if needed.
    pub fn set_resource(&mut self, field: ResourceField, value: Option<u32>) {
        self.attach_resources();
        if let Some(settings) = self.resources.as_mut() {
            resources::set(settings, field, value);
        }
    }

    /// Parses and sets one field from text input.
    pub fn set_resource_input(&mut self, field: ResourceField, input: &str) -> Result<()> {
        let value = resources::parse_quantity(field, input)?;
        self.set_resource(field, value);
        Ok(())
    }

    pub fn container_type(&self) -> ResourceType {
        self.container_type
    }

    pub fn set_container_type(&mut self, container_type: ResourceType) {
        if container_type != ResourceType::Cpu {
            debug!(?container_type, "resource type recorded; only CPU fields apply");
        }
        self.container_type = container_type;
    }

    pub fn visible_resource_fields(&self) -> &'static [ResourceField] {
        resources::visible_fields(self.container_type)
    }

    pub fn start(&self) -> Option<&StartCommand> {
        self.start.as_ref()
    }

    /// True when a command or arguments are set.
    pub fn start_visible(&self) -> bool {
        self.start.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn set_start_command(&mut self, command: Option<String>) {
        let mut start = self.start.take().unwrap_or_default();
        start.command = command.filter(|c| !c.trim().is_empty());
        self.start = Some(start).filter(|s| !s.is_empty());
    }

    pub fn set_start_args(&mut self, args: Option<String>) {
        let mut start = self.start.take().unwrap_or_default();
        start.args = args.filter(|a| !a.trim().is_empty());
        self.start = Some(start).filter(|s| !s.is_empty());
    }

    pub fn env(&self) -> &EnvManager {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut EnvManager {
        &mut self.env
    }

    pub fn firewall(&self) -> &FirewallManager {
        &self.firewall
    }

    pub fn firewall_mut(&mut self) -> &mut FirewallManager {
        &mut self.firewall
    }

    pub fn set_container_index(&mut self, container_index: usize) {
        self.env.set_container_index(container_index);
        self.firewall.set_container_index(container_index);
    }

    /// Writes these settings into `config`.
    pub fn write_to(&self, config: &mut ContainerConfig) {
        config.resources = self.resources;
        config.start = self.start.clone();
        config.container_type = self.container_type;
        config.env_vars = self.env.snapshot();
        config.firewall_entries = self.firewall.snapshot();
    }

    pub fn validate(&self) -> Result<()> {
        resources::validate(&self.effective_resources())?;
        self.firewall.validate()
    }
}
