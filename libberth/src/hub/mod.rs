//! Docker Hub web API client.
//!
//! The public registry's distribution API has no search and no catalog, so
//! search and tag listing for public images go through the Hub web API.

use crate::client::{ClientConfig, check_response_status};
use crate::error::{BerthError, Result};
use crate::resolver::{ImageSummary, TagSummary};
use chrono::{DateTime, Utc};
use reqwest::{Client as ReqwestClient, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;


#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

/// Entry of `/v2/search/repositories/`.
#[derive(Debug, Deserialize)]
struct SearchHit {
    repo_name: String,
    #[serde(default)]
    short_description: Option<String>,
    #[serde(default)]
    star_count: u64,
    #[serde(default)]
    is_official: bool,
}

/// Entry of `/v2/repositories/<namespace>/`.
#[derive(Debug, Deserialize)]
struct Repository {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    star_count: u64,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
    #[serde(default)]
    digest: Option<String>,
    #[serde(default)]
    last_updated: Option<String>,
}

/// Client for `hub.docker.com`.
#[derive(Debug, Clone)]
pub struct HubClient {
    http_client: ReqwestClient,
    base_url: String,
    default_namespace: String,
    page_size: usize,
}

impl HubClient {
    pub fn new(
        base_url: &str,
        default_namespace: &str,
        page_size: usize,
        config: &ClientConfig,
    ) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| BerthError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_namespace: default_namespace.to_string(),
            page_size,
        })
    }

    /// Searches public repositories.
    ///
    /// An empty query lists the default namespace (the official images),
    /// which is the popular set offered before anything is typed.
    pub async fn search(&self, query: &str) -> Result<Vec<ImageSummary>> {
        let query = query.trim();
        let page_size = self.page_size.to_string();

        if query.is_empty() {
            let url = self.url(
                &format!("/v2/repositories/{}/", self.default_namespace),
                &[("page_size", page_size.as_str())],
            )?;
            let page: Page<Repository> = self.get_json(url).await?;
            return Ok(page
                .results
                .into_iter()
                .map(|repo| self.summary_from_repository(repo))
                .collect());
        }

        let url = self.url(
            "/v2/search/repositories/",
            &[("query", query), ("page_size", page_size.as_str())],
        )?;
        let page: Page<SearchHit> = self.get_json(url).await?;
        Ok(page
            .results
            .into_iter()
            .map(|hit| self.summary_from_hit(hit))
            .collect())
    }

    /// Lists tags of `namespace/name`, newest first as the Hub orders them.
    pub async fn tags(&self, namespace: Option<&str>, name: &str) -> Result<Vec<TagSummary>> {
        let namespace = namespace.unwrap_or(&self.default_namespace);
        let page_size = self.page_size.to_string();
        let url = self.url(
            &format!("/v2/repositories/{}/{}/tags/", namespace, name),
            &[("page_size", page_size.as_str())],
        )?;

        let page: Page<Tag> = self.get_json(url).await?;
        Ok(page
            .results
            .into_iter()
            .map(|tag| TagSummary {
                name: tag.name,
                digest: tag.digest,
                last_updated: tag
                    .last_updated
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|d| d.with_timezone(&Utc)),
            })
            .collect())
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| BerthError::validation_with_source("Invalid Hub URL", e))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "hub request");
        let response = self.http_client.get(url).send().await.map_err(|e| {
            BerthError::network_with_source(format!("Failed to reach {}", self.base_url), e)
        })?;
        let response = check_response_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| BerthError::validation_with_source("Failed to parse Hub response", e))
    }

    /// Official images live in the default namespace, which stays implicit.
    fn namespace_of(&self, namespace: Option<String>) -> Option<String> {
        namespace.filter(|ns| !ns.is_empty() && *ns != self.default_namespace)
    }

    fn summary_from_repository(&self, repo: Repository) -> ImageSummary {
        let namespace = self.namespace_of(repo.namespace);
        ImageSummary {
            official: namespace.is_none(),
            namespace,
            name: repo.name,
            description: repo.description.filter(|d| !d.is_empty()),
            stars: repo.star_count,
        }
    }

    fn summary_from_hit(&self, hit: SearchHit) -> ImageSummary {
        let (namespace, name) = match hit.repo_name.split_once('/') {
            Some((namespace, name)) => (Some(namespace.to_string()), name.to_string()),
            None => (None, hit.repo_name),
        };
        ImageSummary {
            namespace: self.namespace_of(namespace),
            name,
            description: hit.short_description.filter(|d| !d.is_empty()),
            stars: hit.star_count,
            official: hit.is_official,
        }
    }
}
