//! In-memory resolver used by unit tests.

use super::{ImageSummary, RegistryResolver, TagSummary};
use crate::error::{BerthError, Result};
use crate::model::{DeclaredPort, ImageDescriptor, RegistryCredentials};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub(crate) struct FakeResolver {
    images: Vec<ImageSummary>,
    tags: HashMap<String, Vec<String>>,
    descriptors: HashMap<String, ImageDescriptor>,
    password: Option<String>,
    calls: AtomicUsize,
}

impl FakeResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_image(mut self, name: &str, tags: &[&str]) -> Self {
        self.images.push(ImageSummary::named(None, name));
        self.tags.insert(
            name.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub(crate) fn with_descriptor(mut self, name: &str, tag: &str, descriptor: ImageDescriptor) -> Self {
        self.descriptors.insert(format!("{}:{}", name, tag), descriptor);
        self
    }

    pub(crate) fn accepting(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Number of resolver calls made so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shorthand for a descriptor with the given ports and volumes.
pub(crate) fn descriptor(ports: &[(u16, &str)], volumes: &[&str]) -> ImageDescriptor {
    ImageDescriptor {
        ports: ports
            .iter()
            .map(|(container_port, protocol)| DeclaredPort {
                container_port: *container_port,
                protocol: protocol.to_string(),
            })
            .collect(),
        volumes: volumes.iter().map(|v| v.to_string()).collect(),
    }
}

#[async_trait]
impl RegistryResolver for FakeResolver {
    async fn search_images(
        &self,
        query: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<ImageSummary>> {
        self.record();
        Ok(self
            .images
            .iter()
            .filter(|image| image.name.contains(query))
            .cloned()
            .collect())
    }

    async fn list_tags(
        &self,
        _namespace: Option<&str>,
        image: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<TagSummary>> {
        self.record();
        self.tags
            .get(image)
            .map(|tags| tags.iter().map(TagSummary::synthetic).collect())
            .ok_or_else(|| BerthError::not_found("image", image))
    }

    async fn image_descriptor(
        &self,
        _namespace: Option<&str>,
        image: &str,
        tag: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<ImageDescriptor> {
        self.record();
        self.descriptors
            .get(&format!("{}:{}", image, tag))
            .cloned()
            .ok_or_else(|| BerthError::network("descriptor unavailable"))
    }

    async fn probe(&self, credentials: &RegistryCredentials) -> Result<()> {
        self.record();
        match (&self.password, credentials.password.secret()) {
            (Some(expected), Some(given)) if expected == given => Ok(()),
            _ => Err(BerthError::authentication("invalid credentials", Some(401))),
        }
    }
}
