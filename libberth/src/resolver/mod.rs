//! Registry resolution: image search, tag listing and image descriptors.
//!
//! [`RegistryResolver`] is the seam the rest of the engine talks to. Callers
//! that must never fail (the orchestrator) go through the `*_or_*` helpers,
//! which turn every error into a [`Notice`] and a usable default.

use crate::auth::Credentials;
use crate::client::{Client, ClientConfig};
use crate::config::Config;
use crate::digest::Digest;
use crate::error::{BerthError, Result};
use crate::hub::HubClient;
use crate::model::{DEFAULT_TAG, ImageDescriptor, Notice, RegistryCredentials};
use crate::oci::{ManifestOrIndex, descriptor_from_config};
use crate::reference::repository_path;
use crate::search;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod tests;

/// Page size requested from `/v2/_catalog`.
const CATALOG_PAGE_SIZE: usize = 100;

/// One image offered by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub stars: u64,
    pub official: bool,
}

impl ImageSummary {
    /// A bare entry, as produced by catalog search.
    pub fn named(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            description: None,
            stars: 0,
            official: false,
        }
    }

    /// `namespace/name`, or just `name` for unqualified images.
    pub fn full_name(&self) -> String {
        repository_path(self.namespace.as_deref(), &self.name, None)
    }
}

/// One tag of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl TagSummary {
    /// A tag known only by name.
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            digest: None,
            last_updated: None,
        }
    }
}

/// Read operations against a public or private registry.
///
/// `credentials` selects the registry: `None` means the public registry,
/// `Some` the private registry at `credentials.url`.
#[async_trait]
pub trait RegistryResolver: Send + Sync {
    /// Empty `query` returns the popular/default set.
    async fn search_images(
        &self,
        query: &str,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<ImageSummary>>;

    async fn list_tags(
        &self,
        namespace: Option<&str>,
        image: &str,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<TagSummary>>;

    /// Declared default ports and volumes of `image:tag`.
    async fn image_descriptor(
        &self,
        namespace: Option<&str>,
        image: &str,
        tag: &str,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<ImageDescriptor>;

    /// Checks that `credentials` grant access to their registry.
    async fn probe(&self, credentials: &RegistryCredentials) -> Result<()>;
}

/// A value that is always usable, plus the notice explaining any fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub notice: Option<Notice>,
}

impl<T> Resolved<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            notice: None,
        }
    }

    pub fn degraded(value: T, notice: Notice) -> Self {
        Self {
            value,
            notice: Some(notice),
        }
    }
}

/// Lists tags, falling back to a single tag when the list is unavailable.
///
/// The fallback tag is `current_tag` when one is set, otherwise `latest`.
pub async fn tags_or_fallback(
    resolver: &dyn RegistryResolver,
    namespace: Option<&str>,
    image: &str,
    current_tag: Option<&str>,
    credentials: Option<&RegistryCredentials>,
) -> Resolved<Vec<TagSummary>> {
    let fallback = current_tag
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TAG)
        .to_string();

    match resolver.list_tags(namespace, image, credentials).await {
        Ok(tags) if !tags.is_empty() => Resolved::ok(tags),
        Ok(_) => {
            debug!(image, "registry returned no tags; using '{}'", fallback);
            Resolved::degraded(
                vec![TagSummary::synthetic(&fallback)],
                Notice::info(format!("No tags listed for {}; using '{}'", image, fallback)),
            )
        }
        Err(e) => {
            warn!(image, error = %e, "tag listing failed");
            Resolved::degraded(
                vec![TagSummary::synthetic(&fallback)],
                Notice::info(format!(
                    "Could not load tags for {}; using '{}'",
                    image, fallback
                )),
            )
        }
    }
}

/// Searches images, falling back to an empty list.
pub async fn search_or_empty(
    resolver: &dyn RegistryResolver,
    query: &str,
    credentials: Option<&RegistryCredentials>,
) -> Resolved<Vec<ImageSummary>> {
    match resolver.search_images(query, credentials).await {
        Ok(images) => Resolved::ok(images),
        Err(e) => {
            warn!(query, error = %e, "image search failed");
            Resolved::degraded(Vec::new(), Notice::info("Image search is unavailable right now"))
        }
    }
}

/// Fetches the image descriptor, falling back to "no defaults".
pub async fn descriptor_or_empty(
    resolver: &dyn RegistryResolver,
    namespace: Option<&str>,
    image: &str,
    tag: &str,
    credentials: Option<&RegistryCredentials>,
) -> Resolved<ImageDescriptor> {
    match resolver
        .image_descriptor(namespace, image, tag, credentials)
        .await
    {
        Ok(descriptor) => Resolved::ok(descriptor),
        Err(e) => {
            warn!(image, tag, error = %e, "image descriptor unavailable");
            Resolved::degraded(
                ImageDescriptor::default(),
                Notice::info(format!(
                    "Default ports and volumes for {}:{} could not be loaded",
                    image, tag
                )),
            )
        }
    }
}

/// [`RegistryResolver`] over HTTP.
///
/// Public images use the Hub web API for search and tags and the public
/// registry's distribution API for descriptors. Private registries use the
/// distribution API throughout.
pub struct HttpResolver {
    hub: HubClient,
    public: Client,
    client_config: ClientConfig,
    default_namespace: String,
    page_size: usize,
    os: String,
    architecture: String,
    private: Mutex<HashMap<(String, String), (Credentials, Client)>>,
}

impl HttpResolver {
    pub fn new(config: &Config) -> Result<Self> {
        let client_config = ClientConfig::from(&config.network);
        let hub = HubClient::new(
            &config.public.hub_url,
            &config.public.default_namespace,
            config.public.page_size,
            &client_config,
        )?;
        let public = Client::with_config(&config.public.registry_url, &client_config, None)?;

        Ok(Self {
            hub,
            public,
            client_config,
            default_namespace: config.public.default_namespace.clone(),
            page_size: config.public.page_size,
            os: config.platform.os.clone(),
            architecture: config.platform.architecture.clone(),
            private: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the cached client for a private registry, rebuilding it when
    /// the credentials changed.
    fn private_client(&self, registry: &RegistryCredentials) -> Result<Client> {
        let credentials = Credentials::from_registry(registry)?;
        let key = (registry.url.clone(), registry.user.clone());

        let mut cache = self
            .private
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((cached, client)) = cache.get(&key)
            && *cached == credentials
        {
            return Ok(client.clone());
        }

        let client =
            Client::with_config(&registry.url, &self.client_config, Some(credentials.clone()))?;
        cache.insert(key, (credentials, client.clone()));
        Ok(client)
    }

    async fn descriptor_from(&self, client: &Client, repository: &str, tag: &str) -> Result<ImageDescriptor> {
        let bytes = client.fetch_manifest(repository, tag).await?;
        let manifest = match ManifestOrIndex::from_bytes(&bytes)? {
            ManifestOrIndex::Manifest(manifest) => manifest,
            index @ ManifestOrIndex::Index(_) => {
                let entry = index
                    .select_platform(&self.os, &self.architecture)
                    .ok_or_else(|| BerthError::not_found("platform manifest", repository))?;
                let digest = entry.digest().to_string();
                debug!(repository, %digest, "resolved platform manifest");

                let bytes = client.fetch_manifest(repository, &digest).await?;
                match ManifestOrIndex::from_bytes(&bytes)? {
                    ManifestOrIndex::Manifest(manifest) => manifest,
                    ManifestOrIndex::Index(_) => {
                        return Err(BerthError::validation(format!(
                            "Nested image index for {}",
                            repository
                        )));
                    }
                }
            }
        };

        let config_digest: Digest = manifest.config().digest().to_string().parse()?;
        let blob = client.fetch_blob(repository, &config_digest).await?;
        Ok(descriptor_from_config(&blob))
    }
}

#[async_trait]
impl RegistryResolver for HttpResolver {
    async fn search_images(
        &self,
        query: &str,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<ImageSummary>> {
        let Some(registry) = credentials else {
            return self.hub.search(query).await;
        };

        let client = self.private_client(registry)?;
        let catalog = client.fetch_catalog(Some(CATALOG_PAGE_SIZE)).await?;
        debug!(registry = %registry.url, entries = catalog.len(), "catalog fetched");

        Ok(search::rank(query, &catalog, self.page_size)
            .into_iter()
            .map(|hit| match hit.value.rsplit_once('/') {
                Some((namespace, name)) => ImageSummary::named(Some(namespace), name),
                None => ImageSummary::named(None, &hit.value),
            })
            .collect())
    }

    async fn list_tags(
        &self,
        namespace: Option<&str>,
        image: &str,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<TagSummary>> {
        let Some(registry) = credentials else {
            return self.hub.tags(namespace, image).await;
        };

        let client = self.private_client(registry)?;
        let tags = client
            .fetch_tags(&repository_path(namespace, image, None))
            .await?;
        Ok(tags.into_iter().map(TagSummary::synthetic).collect())
    }

    async fn image_descriptor(
        &self,
        namespace: Option<&str>,
        image: &str,
        tag: &str,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<ImageDescriptor> {
        match credentials {
            None => {
                let repository =
                    repository_path(namespace, image, Some(&self.default_namespace));
                self.descriptor_from(&self.public, &repository, tag).await
            }
            Some(registry) => {
                let client = self.private_client(registry)?;
                let repository = repository_path(namespace, image, None);
                self.descriptor_from(&client, &repository, tag).await
            }
        }
    }

    async fn probe(&self, credentials: &RegistryCredentials) -> Result<()> {
        let client = self.private_client(credentials)?;
        client.check_version().await?;
        Ok(())
    }
}
