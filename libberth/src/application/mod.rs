//! The multi-container application form.
//!
//! Owns one [`ContainerOrchestrator`] per container slot, keeps their
//! indices contiguous, and derives the application-wide ingress state from
//! the current port lists on every read.

use crate::error::{BerthError, IngressConflict, Result};
use crate::model::{ContainerConfig, Notice};
use crate::orchestrator::{
    ContainerOrchestrator, DescriptorRequest, DescriptorResponse, EngineContext, FormEvent,
    TagRequest, TagResponse,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};


pub struct ApplicationForm {
    ctx: EngineContext,
    events: UnboundedSender<FormEvent>,
    containers: Vec<ContainerOrchestrator>,
}

impl ApplicationForm {
    /// Creates an empty form and the receiving end of its event channel.
    pub fn new(ctx: EngineContext) -> (Self, UnboundedReceiver<FormEvent>) {
        let (events, rx) = unbounded_channel();
        let form = Self {
            ctx,
            events,
            containers: Vec::new(),
        };
        (form, rx)
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn containers(&self) -> &[ContainerOrchestrator] {
        &self.containers
    }

    pub fn container(&self, index: usize) -> Result<&ContainerOrchestrator> {
        let len = self.containers.len();
        self.containers
            .get(index)
            .ok_or_else(|| BerthError::out_of_range("containers", index, len))
    }

    pub fn container_mut(&mut self, index: usize) -> Result<&mut ContainerOrchestrator> {
        let len = self.containers.len();
        self.containers
            .get_mut(index)
            .ok_or_else(|| BerthError::out_of_range("containers", index, len))
    }

    /// Appends an empty container and returns its index.
    pub fn add_container(&mut self) -> usize {
        let index = self.containers.len();
        self.containers.push(ContainerOrchestrator::new(
            index,
            self.ctx.clone(),
            self.events.clone(),
        ));
        info!(container = index, "container added");
        index
    }

    /// Replaces the form with saved containers.
    ///
    /// Containers are ordered by their saved index and re-indexed from zero.
    /// Returns the tag requests of every container that can resolve now.
    pub fn restore(&mut self, mut saved: Vec<ContainerConfig>) -> Vec<TagRequest> {
        saved.sort_by_key(|c| c.index);
        self.containers.clear();

        let mut requests = Vec::new();
        for (index, mut config) in saved.into_iter().enumerate() {
            if config.index != index {
                config.restamp(index);
            }
            let mut container =
                ContainerOrchestrator::new(index, self.ctx.clone(), self.events.clone());
            requests.extend(container.restore(config));
            self.containers.push(container);
        }
        info!(containers = self.containers.len(), pending = requests.len(), "application restored");
        requests
    }

    /// Removes a container and shifts the later ones down by one.
    pub fn remove_container(&mut self, index: usize) -> Result<ContainerConfig> {
        let removed = self.container(index)?.config();
        self.containers.remove(index);
        self.emit(FormEvent::ContainerRemoved {
            container_index: index,
        });
        for (i, container) in self.containers.iter_mut().enumerate().skip(index) {
            container.set_index(i);
        }
        info!(container = index, "container removed");
        Ok(removed)
    }

    /// The (container, port) pair that currently holds ingress.
    pub fn ingress_owner(&self) -> Option<(usize, usize)> {
        self.containers.iter().enumerate().find_map(|(ci, c)| {
            c.ports()
                .ports()
                .iter()
                .position(|p| p.is_ingress)
                .map(|pi| (ci, pi))
        })
    }

    /// Whether a container other than `container` holds ingress.
    pub fn ingress_elsewhere(&self, container: usize) -> bool {
        self.containers
            .iter()
            .enumerate()
            .any(|(ci, c)| ci != container && c.has_ingress())
    }

    /// Toggles ingress with the cross-container flag derived here.
    pub fn toggle_ingress(&mut self, container: usize, port: usize, value: bool) -> Result<bool> {
        let elsewhere = self.ingress_elsewhere(container);
        self.container_mut(container)?
            .toggle_ingress(port, value, elsewhere)
    }

    /// Routes a tag response to its container.
    pub fn apply_tags(&mut self, response: TagResponse) -> Option<DescriptorRequest> {
        let index = response.request.container_index;
        match self.containers.get_mut(index) {
            Some(container) => container.apply_tags(response),
            None => {
                warn!(container = index, "tag response for a removed container");
                None
            }
        }
    }

    /// Routes a descriptor response to its container.
    pub fn apply_descriptor(&mut self, response: DescriptorResponse) -> bool {
        let index = response.request.container_index;
        match self.containers.get_mut(index) {
            Some(container) => container.apply_descriptor(response),
            None => {
                warn!(container = index, "descriptor response for a removed container");
                false
            }
        }
    }

    /// Runs one container's tag then descriptor pipeline.
    pub async fn resolve(&mut self, request: TagRequest) -> bool {
        let index = request.container_index;
        match self.containers.get_mut(index) {
            Some(container) => container.resolve(request).await,
            None => false,
        }
    }

    /// Resolves every request in turn; returns how many changed defaults.
    pub async fn resolve_all(&mut self, requests: Vec<TagRequest>) -> usize {
        let mut changed = 0;
        for request in requests {
            if self.resolve(request).await {
                changed += 1;
            }
        }
        changed
    }

    /// Validates every container and returns the finished payload.
    ///
    /// # Errors
    ///
    /// The first container validation error, or `IngressTaken` when more
    /// than one container holds ingress.
    pub fn payload(&self) -> Result<Vec<ContainerConfig>> {
        for container in &self.containers {
            if let Err(e) = container.validate() {
                self.emit(FormEvent::Notice(
                    Notice::blocking(e.to_string()).for_container(container.index()),
                ));
                return Err(e);
            }
        }

        let holders = self.containers.iter().filter(|c| c.has_ingress()).count();
        if holders > 1 {
            return Err(BerthError::IngressTaken {
                conflict: IngressConflict::OtherContainer,
            });
        }

        Ok(self.containers.iter().map(|c| c.config()).collect())
    }

    fn emit(&self, event: FormEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}
