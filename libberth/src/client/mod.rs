//! HTTP client for the registry distribution API.
//!
//! A thin reqwest wrapper implementing the endpoints the engine needs:
//! the `/v2/` probe, catalog, tag list, manifests and blobs. Requests that
//! come back `401` with a Bearer challenge are retried once with a token
//! obtained from the challenge's realm.

use crate::auth::{AuthChallenge, Credentials, TokenResponse};
use crate::config::Network;
use crate::digest::Digest;
use crate::error::{Result, BerthError};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, LINK, RETRY_AFTER, WWW_AUTHENTICATE};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;


const MANIFEST_ACCEPT: &str = "application/vnd.oci.image.manifest.v1+json, \
     application/vnd.oci.image.index.v1+json, \
     application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.docker.distribution.manifest.list.v2+json";

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    repositories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Version information returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryVersion {
    /// The Docker-Distribution-API-Version header value, if present.
    pub api_version: Option<String>,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libberth::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_max_idle_per_host(20);
/// assert_eq!(config.timeout_seconds, 60);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
        }
    }
}

impl From<&Network> for ClientConfig {
    fn from(network: &Network) -> Self {
        Self {
            timeout_seconds: network.timeout,
            max_idle_per_host: network.max_idle_per_host,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }
}

/// HTTP client bound to one registry and one set of credentials.
///
/// Clones share the negotiated bearer token.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: ReqwestClient,
    registry_url: String,
    credentials: Option<Credentials>,
    bearer: Arc<Mutex<Option<String>>>,
    timeout_seconds: u64,
}

impl Client {
    /// Creates a client with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libberth::client::Client;
    ///
    /// let client = Client::new("localhost:5000", None).unwrap();
    /// assert_eq!(client.registry_url(), "http://localhost:5000");
    /// ```
    pub fn new(registry_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        Self::with_config(registry_url, &ClientConfig::default(), credentials)
    }

    /// Creates a client with custom timeouts and pooling.
    pub fn with_config(
        registry_url: &str,
        config: &ClientConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let normalized_url = normalize_url(registry_url)?;

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| BerthError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url: normalized_url,
            credentials,
            bearer: Arc::new(Mutex::new(None)),
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Returns the normalized base registry URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Probes `/v2/` to check reachability and credentials.
    ///
    /// # Errors
    ///
    /// `Authentication` when the registry refuses the credentials, `Network`
    /// when it cannot be reached.
    pub async fn check_version(&self) -> Result<RegistryVersion> {
        let url = format!("{}/v2/", self.registry_url);
        let response = self.get(&url, None, None).await?;

        let api_version = response
            .headers()
            .get("Docker-Distribution-API-Version")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(RegistryVersion { api_version })
    }

    /// Fetches repository names from `/v2/_catalog`, following pagination.
    pub async fn fetch_catalog(&self, page_size: Option<usize>) -> Result<Vec<String>> {
        let mut all_repositories = Vec::new();
        let mut url = format!("{}/v2/_catalog", self.registry_url);
        if let Some(n) = page_size {
            url.push_str(&format!("?n={}", n));
        }

        loop {
            let response = self.get(&url, None, Some("registry:catalog:*")).await?;
            let next_path = extract_next_link(response.headers());

            let catalog: CatalogResponse = response.json().await.map_err(|e| {
                BerthError::validation_with_source("Failed to parse catalog response", e)
            })?;
            all_repositories.extend(catalog.repositories.unwrap_or_default());

            match next_path {
                Some(path) => url = format!("{}{}", self.registry_url, path),
                None => break,
            }
        }

        Ok(all_repositories)
    }

    /// Fetches tag names for `repository`, following pagination.
    pub async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>> {
        let mut all_tags = Vec::new();
        let mut url = format!("{}/v2/{}/tags/list", self.registry_url, repository);
        let scope = pull_scope(repository);

        loop {
            let response = self.get(&url, None, Some(&scope)).await?;
            let next_path = extract_next_link(response.headers());

            let tags: TagsResponse = response.json().await.map_err(|e| {
                BerthError::validation_with_source("Failed to parse tags response", e)
            })?;
            all_tags.extend(tags.tags.unwrap_or_default());

            match next_path {
                Some(path) => url = format!("{}{}", self.registry_url, path),
                None => break,
            }
        }

        Ok(all_tags)
    }

    /// Fetches the raw manifest (or index) for a tag or digest.
    pub async fn fetch_manifest(&self, repository: &str, reference: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.registry_url, repository, reference
        );
        let response = self
            .get(&url, Some(MANIFEST_ACCEPT), Some(&pull_scope(repository)))
            .await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BerthError::network_with_source("Failed to read manifest response", e))?;
        Ok(bytes.to_vec())
    }

    /// Fetches a blob and verifies it against `digest`.
    pub async fn fetch_blob(&self, repository: &str, digest: &Digest) -> Result<Vec<u8>> {
        let url = format!("{}/v2/{}/blobs/{}", self.registry_url, repository, digest);
        let response = self.get(&url, None, Some(&pull_scope(repository))).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BerthError::network_with_source("Failed to read blob response", e))?;
        digest.verify(&bytes)?;
        Ok(bytes.to_vec())
    }

    /// GET with authentication, retrying once after a Bearer challenge.
    async fn get(&self, url: &str, accept: Option<&str>, scope: Option<&str>) -> Result<Response> {
        let response = self.send(url, accept).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_response_status(response).await;
        }

        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .and_then(|header| AuthChallenge::parse(header).ok())
            .filter(AuthChallenge::is_bearer);

        let Some(challenge) = challenge else {
            return check_response_status(response).await;
        };

        debug!(realm = %challenge.realm, "negotiating bearer token");
        let token = self.fetch_token(&challenge, scope).await?;
        if let Ok(mut slot) = self.bearer.lock() {
            *slot = Some(token);
        }

        let retry = self.send(url, accept).await?;
        check_response_status(retry).await
    }

    async fn send(&self, url: &str, accept: Option<&str>) -> Result<Response> {
        let mut request = self.http_client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        if let Some(authorization) = self.authorization() {
            request = request.header(AUTHORIZATION, authorization);
        }

        request
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))
    }

    fn authorization(&self) -> Option<String> {
        let token = self
            .bearer
            .lock()
            .map(|slot| slot.clone())
            .unwrap_or_default();
        match token {
            Some(token) => Some(format!("Bearer {}", token)),
            None => self.credentials.as_ref().and_then(|c| c.to_header_value()),
        }
    }

    async fn fetch_token(&self, challenge: &AuthChallenge, scope: Option<&str>) -> Result<String> {
        let url = challenge.token_url(scope)?;
        let mut request = self.http_client.get(url);
        if let Some(basic @ Credentials::Basic { .. }) = &self.credentials
            && let Some(header) = basic.to_header_value()
        {
            request = request.header(AUTHORIZATION, header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))?;
        let response = check_response_status(response).await?;

        let body: TokenResponse = response.json().await.map_err(|e| {
            BerthError::validation_with_source("Failed to parse token response", e)
        })?;
        body.into_token()
            .ok_or_else(|| BerthError::authentication("Token endpoint returned no token", None))
    }

    fn translate_reqwest_error(&self, error: reqwest::Error) -> BerthError {
        if error.is_timeout() {
            BerthError::network(format!(
                "Request to {} timed out after {} seconds",
                self.registry_url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            BerthError::network_with_source(
                format!("Failed to connect to registry at {}", self.registry_url),
                error,
            )
        } else {
            BerthError::network_with_source(
                format!("Network error communicating with {}", self.registry_url),
                error,
            )
        }
    }
}

/// Normalizes a registry URL: adds a scheme and strips trailing slashes.
///
/// Loopback hosts default to `http`, everything else to `https`.
pub fn normalize_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(BerthError::validation("Registry URL cannot be empty"));
    }

    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
        format!("http://{}", url)
    } else {
        format!("https://{}", url)
    };

    Ok(url.trim_end_matches('/').to_string())
}

fn pull_scope(repository: &str) -> String {
    format!("repository:{}:pull", repository)
}

/// Extracts the next page path from a `Link: </v2/...>; rel="next"` header.
fn extract_next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;

    link.split(',')
        .map(str::trim)
        .find(|part| part.contains("rel=\"next\"") || part.contains("rel=next"))
        .and_then(|part| {
            let start = part.find('<')?;
            let end = part.find('>')?;
            (start < end).then(|| part[start + 1..end].to_string())
        })
}

fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Maps a non-success response onto a [`BerthError`].
pub(crate) async fn check_response_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let retry_after = parse_retry_after(response.headers());
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("(unable to read response body)"));

    match status {
        StatusCode::UNAUTHORIZED => Err(BerthError::authentication(
            format!("Authentication required for {}: {}", url, error_body),
            Some(401),
        )),
        StatusCode::FORBIDDEN => Err(BerthError::authentication(
            format!("Access forbidden for {}: {}", url, error_body),
            Some(403),
        )),
        StatusCode::NOT_FOUND => Err(BerthError::not_found("endpoint", &url)),
        StatusCode::TOO_MANY_REQUESTS => Err(BerthError::rate_limit(
            format!("Rate limit exceeded for {}", url),
            retry_after,
        )),
        s if s.is_server_error() => Err(BerthError::server(
            format!("Server error from {}: {}", url, error_body),
            s.as_u16(),
        )),
        _ => Err(BerthError::network(format!(
            "HTTP {} from {}: {}",
            status.as_u16(),
            url,
            error_body
        ))),
    }
}
