//! Port list and ingress rules for one container.
//!
//! [`PortManager`] owns the ordered ports of a single container. It never
//! looks at sibling containers: whether some other container already holds
//! the ingress port is passed in by the caller as a plain flag, derived
//! fresh from the whole application on every call.

use crate::config::NullProtocolPolicy;
use crate::error::{BerthError, IngressConflict, Result};
use crate::model::{ImageDescriptor, PortEntry, Protocol};
use crate::protocol::ProtocolCatalogue;
use tracing::{debug, info};


/// Observable state of a port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortListState {
    Empty,
    Populated,
    /// The entry at this position is being edited.
    Editing(usize),
}

/// A single-field change to a port entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortEdit {
    Name(String),
    ContainerPort(Option<u16>),
    ServicePort(Option<u16>),
    Protocol(Option<Protocol>),
    /// Only allowed on the ingress port.
    IngressHost(Option<String>),
}

/// Ordered ports of one container.
#[derive(Debug, Clone, Default)]
pub struct PortManager {
    container_index: usize,
    ports: Vec<PortEntry>,
    editing: Option<usize>,
    defaults_applied_for: Option<String>,
}

impl PortManager {
    pub fn new(container_index: usize) -> Self {
        Self {
            container_index,
            ..Self::default()
        }
    }

    /// Rehydrates saved ports, stamping them with `container_index`.
    pub fn from_entries(container_index: usize, ports: Vec<PortEntry>) -> Self {
        let mut manager = Self::new(container_index);
        manager.ports = ports;
        manager.set_container_index(container_index);
        manager
    }

    pub fn state(&self) -> PortListState {
        match (self.editing, self.ports.is_empty()) {
            (Some(i), _) => PortListState::Editing(i),
            (None, true) => PortListState::Empty,
            (None, false) => PortListState::Populated,
        }
    }

    pub fn ports(&self) -> &[PortEntry] {
        &self.ports
    }

    pub fn container_index(&self) -> usize {
        self.container_index
    }

    /// The port currently marked as ingress, if any.
    pub fn ingress_port(&self) -> Option<&PortEntry> {
        self.ports.iter().find(|p| p.is_ingress)
    }

    pub fn has_ingress(&self) -> bool {
        self.ingress_port().is_some()
    }

    /// Appends an empty port with the next default name and returns its position.
    pub fn add_port(&mut self) -> usize {
        let name = self.next_default_name();
        self.ports.push(PortEntry {
            name,
            container_port: None,
            service_port: None,
            protocol: None,
            is_ingress: false,
            ingress_host: None,
            container_index: self.container_index,
            service_port_invalid: false,
        });
        self.ports.len() - 1
    }

    pub fn remove_port(&mut self, index: usize) -> Result<PortEntry> {
        self.check_index(index)?;
        let removed = self.ports.remove(index);
        self.editing = match self.editing {
            Some(i) if i == index => None,
            Some(i) if i > index => Some(i - 1),
            other => other,
        };
        Ok(removed)
    }

    /// Applies one field edit.
    ///
    /// # Errors
    ///
    /// `ServicePortRequired` when clearing the service port of the ingress
    /// port, `Validation` when setting a host on a non-ingress port.
    pub fn edit_port(&mut self, index: usize, edit: PortEdit) -> Result<()> {
        self.check_index(index)?;
        let port = &mut self.ports[index];

        match edit {
            PortEdit::Name(name) => port.name = name,
            PortEdit::ContainerPort(value) => port.container_port = value,
            PortEdit::ServicePort(None) if port.is_ingress => {
                return Err(BerthError::ServicePortRequired {
                    port: port.name.clone(),
                });
            }
            PortEdit::ServicePort(value) => {
                port.service_port = value;
                if value.is_some() {
                    port.service_port_invalid = false;
                }
            }
            PortEdit::Protocol(protocol) => port.protocol = protocol,
            PortEdit::IngressHost(host) => {
                if !port.is_ingress && host.is_some() {
                    return Err(BerthError::validation(format!(
                        "Ingress host can only be set on the ingress port, not '{}'",
                        port.name
                    )));
                }
                port.ingress_host = host.filter(|h| !h.trim().is_empty());
            }
        }
        Ok(())
    }

    pub fn begin_edit(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.editing = Some(index);
        Ok(())
    }

    pub fn end_edit(&mut self) {
        self.editing = None;
    }

    /// Turns ingress on or off for the port at `index`.
    ///
    /// Turning it on first clears the port's ingress host, then requires
    /// that no sibling port and no other container (`ingress_elsewhere`)
    /// holds ingress, then requires a service port. A rejected toggle
    /// leaves `is_ingress` false; a missing service port additionally marks
    /// the service port invalid. Turning it off always succeeds and clears
    /// the host.
    ///
    /// Returns whether the entry changed.
    pub fn toggle_ingress(
        &mut self,
        index: usize,
        value: bool,
        ingress_elsewhere: bool,
    ) -> Result<bool> {
        self.check_index(index)?;

        if !value {
            let port = &mut self.ports[index];
            let changed = port.is_ingress || port.ingress_host.is_some();
            port.is_ingress = false;
            port.ingress_host = None;
            return Ok(changed);
        }

        let host_cleared = self.ports[index].ingress_host.take().is_some();

        if let Some(sibling) = self
            .ports
            .iter()
            .enumerate()
            .find(|(j, p)| *j != index && p.is_ingress)
            .map(|(j, _)| j)
        {
            return Err(BerthError::IngressTaken {
                conflict: IngressConflict::SameContainer { port: sibling },
            });
        }
        if ingress_elsewhere {
            return Err(BerthError::IngressTaken {
                conflict: IngressConflict::OtherContainer,
            });
        }

        let port = &mut self.ports[index];
        if port.service_port.is_none() {
            port.is_ingress = false;
            port.service_port_invalid = true;
            return Err(BerthError::ServicePortRequired {
                port: port.name.clone(),
            });
        }

        let changed = !port.is_ingress;
        port.is_ingress = true;
        port.service_port_invalid = false;
        if changed {
            info!(container = self.container_index, port = %port.name, "ingress port set");
        }
        Ok(changed || host_cleared)
    }

    /// Replaces the list with the image's declared ports.
    ///
    /// Fires at most once per `selection_key` and only while the list is
    /// empty; a list the user already filled is left alone. Protocol codes
    /// resolve against `catalogue` or stay unset. Returns whether the list
    /// changed.
    pub fn apply_default_ports(
        &mut self,
        selection_key: &str,
        descriptor: &ImageDescriptor,
        catalogue: &ProtocolCatalogue,
    ) -> bool {
        if self.defaults_applied_for.as_deref() == Some(selection_key) {
            debug!(selection_key, "default ports already applied");
            return false;
        }
        self.defaults_applied_for = Some(selection_key.to_string());

        if !self.ports.is_empty() || descriptor.ports.is_empty() {
            return false;
        }

        self.editing = None;
        self.ports = descriptor
            .ports
            .iter()
            .enumerate()
            .map(|(n, declared)| PortEntry {
                name: default_name(self.container_index, n + 1),
                container_port: Some(declared.container_port),
                service_port: None,
                protocol: catalogue.resolve(&declared.protocol).cloned(),
                is_ingress: false,
                ingress_host: None,
                container_index: self.container_index,
                service_port_invalid: false,
            })
            .collect();
        info!(
            container = self.container_index,
            count = self.ports.len(),
            "default ports applied"
        );
        true
    }

    /// Empties the list and forgets which defaults were applied.
    pub fn clear(&mut self) {
        self.ports.clear();
        self.editing = None;
        self.defaults_applied_for = None;
    }

    pub fn set_container_index(&mut self, container_index: usize) {
        self.container_index = container_index;
        for port in &mut self.ports {
            port.container_index = container_index;
        }
    }

    /// The full list, each entry stamped with the owning container.
    pub fn snapshot(&self) -> Vec<PortEntry> {
        self.ports
            .iter()
            .cloned()
            .map(|mut p| {
                p.container_index = self.container_index;
                p
            })
            .collect()
    }

    /// Checks the list is ready to be submitted.
    pub fn validate(&self, null_protocol: NullProtocolPolicy) -> Result<()> {
        for port in &self.ports {
            if port.container_port.is_none() {
                return Err(BerthError::validation(format!(
                    "Port '{}' needs a container port",
                    port.name
                )));
            }
            if port.is_ingress && port.service_port.is_none() {
                return Err(BerthError::ServicePortRequired {
                    port: port.name.clone(),
                });
            }
            if port.protocol.is_none() && null_protocol == NullProtocolPolicy::Reject {
                return Err(BerthError::validation(format!(
                    "Port '{}' needs a protocol",
                    port.name
                )));
            }
        }
        if self.ports.iter().filter(|p| p.is_ingress).count() > 1 {
            return Err(BerthError::IngressTaken {
                conflict: IngressConflict::SameContainer {
                    port: self.ports.iter().rposition(|p| p.is_ingress).unwrap_or(0),
                },
            });
        }
        Ok(())
    }

    fn next_default_name(&self) -> String {
        let mut n = self.ports.len() + 1;
        loop {
            let name = default_name(self.container_index, n);
            if !self.ports.iter().any(|p| p.name == name) {
                return name;
            }
            n += 1;
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.ports.len() {
            Ok(())
        } else {
            Err(BerthError::out_of_range("port", index, self.ports.len()))
        }
    }
}

/// `"port-<container> <n>"`, with `n` counting from 1.
pub fn default_name(container_index: usize, n: usize) -> String {
    format!("port-{} {}", container_index, n)
}
