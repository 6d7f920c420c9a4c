use super::*;
use crate::model::{Password, Severity};
use mockito::Matcher;
use serde_json::json;
use sha2::{Digest as _, Sha256};

/// Resolver whose every call fails.
struct Offline;

#[async_trait]
impl RegistryResolver for Offline {
    async fn search_images(
        &self,
        _query: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<ImageSummary>> {
        Err(BerthError::network("offline"))
    }

    async fn list_tags(
        &self,
        _namespace: Option<&str>,
        _image: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<TagSummary>> {
        Err(BerthError::network("offline"))
    }

    async fn image_descriptor(
        &self,
        _namespace: Option<&str>,
        _image: &str,
        _tag: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<ImageDescriptor> {
        Err(BerthError::validation("garbage"))
    }

    async fn probe(&self, _credentials: &RegistryCredentials) -> Result<()> {
        Err(BerthError::network("offline"))
    }
}

/// Resolver that answers with empty lists.
struct Empty;

#[async_trait]
impl RegistryResolver for Empty {
    async fn search_images(
        &self,
        _query: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<ImageSummary>> {
        Ok(Vec::new())
    }

    async fn list_tags(
        &self,
        _namespace: Option<&str>,
        _image: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<TagSummary>> {
        Ok(Vec::new())
    }

    async fn image_descriptor(
        &self,
        _namespace: Option<&str>,
        _image: &str,
        _tag: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<ImageDescriptor> {
        Ok(ImageDescriptor::default())
    }

    async fn probe(&self, _credentials: &RegistryCredentials) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_tags_fall_back_to_latest() {
    let resolved = tags_or_fallback(&Offline, None, "nginx", None, None).await;

    assert_eq!(resolved.value, vec![TagSummary::synthetic("latest")]);
    let notice = resolved.notice.unwrap();
    assert_eq!(notice.severity, Severity::Info);
}

#[tokio::test]
async fn test_tags_fall_back_to_current_tag() {
    let resolved = tags_or_fallback(&Offline, None, "nginx", Some("1.25"), None).await;
    assert_eq!(resolved.value, vec![TagSummary::synthetic("1.25")]);
}

#[tokio::test]
async fn test_empty_tag_list_also_falls_back() {
    let resolved = tags_or_fallback(&Empty, None, "nginx", Some(""), None).await;
    assert_eq!(resolved.value, vec![TagSummary::synthetic("latest")]);
    assert!(resolved.notice.is_some());
}

#[tokio::test]
async fn test_search_failure_is_empty_with_notice() {
    let resolved = search_or_empty(&Offline, "nginx", None).await;
    assert!(resolved.value.is_empty());
    assert!(resolved.notice.is_some());

    let resolved = search_or_empty(&Empty, "nginx", None).await;
    assert!(resolved.notice.is_none());
}

#[tokio::test]
async fn test_descriptor_failure_means_no_defaults() {
    let resolved = descriptor_or_empty(&Offline, None, "nginx", "latest", None).await;
    assert!(resolved.value.is_empty());
    assert_eq!(resolved.notice.unwrap().severity, Severity::Info);
}

#[test]
fn test_image_summary_full_name() {
    assert_eq!(ImageSummary::named(None, "nginx").full_name(), "nginx");
    assert_eq!(
        ImageSummary::named(Some("team"), "api").full_name(),
        "team/api"
    );
}

fn config_for(server: &mockito::Server) -> Config {
    let mut config = Config::default();
    config.public.hub_url = server.url();
    config.public.registry_url = server.url();
    config.public.page_size = 10;
    config
}

fn private_credentials(server: &mockito::Server) -> RegistryCredentials {
    RegistryCredentials::new(server.url(), "deploy", Password::Plain("s3cret".into()))
}

#[tokio::test]
async fn test_private_search_ranks_catalog() {
    let mut server = mockito::Server::new_async().await;
    let _catalog = server
        .mock("GET", "/v2/_catalog")
        .match_query(Matcher::Any)
        .match_header("authorization", Matcher::Regex("^Basic ".into()))
        .with_status(200)
        .with_body(r#"{"repositories":["team/api","team/web","tools/apt-cache"]}"#)
        .create_async()
        .await;

    let resolver = HttpResolver::new(&config_for(&server)).unwrap();
    let images = resolver
        .search_images("api", Some(&private_credentials(&server)))
        .await
        .unwrap();

    assert_eq!(images[0].namespace.as_deref(), Some("team"));
    assert_eq!(images[0].name, "api");
}

#[tokio::test]
async fn test_private_search_rejects_masked_password() {
    let server = mockito::Server::new_async().await;
    let resolver = HttpResolver::new(&config_for(&server)).unwrap();
    let masked = RegistryCredentials::new(server.url(), "deploy", Password::Masked);

    let result = resolver.search_images("", Some(&masked)).await;
    assert!(matches!(
        result.unwrap_err(),
        BerthError::CredentialRequired { .. }
    ));
}

#[tokio::test]
async fn test_private_tags() {
    let mut server = mockito::Server::new_async().await;
    let _tags = server
        .mock("GET", "/v2/team/api/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"team/api","tags":["v1","v2"]}"#)
        .create_async()
        .await;

    let resolver = HttpResolver::new(&config_for(&server)).unwrap();
    let tags = resolver
        .list_tags(Some("team"), "api", Some(&private_credentials(&server)))
        .await
        .unwrap();

    assert_eq!(
        tags,
        vec![TagSummary::synthetic("v1"), TagSummary::synthetic("v2")]
    );
}

#[tokio::test]
async fn test_public_descriptor_resolves_index_to_platform() {
    let config_blob = json!({
        "architecture": "amd64",
        "os": "linux",
        "config": {
            "ExposedPorts": {"80/tcp": {}},
            "Volumes": {"/data": {}}
        }
    })
    .to_string();
    let config_digest = format!("sha256:{:x}", Sha256::digest(config_blob.as_bytes()));
    let platform_digest = format!("sha256:{}", "a".repeat(64));

    let index = json!({
        "schemaVersion": 2,
        "mediaType": "application/vnd.oci.image.index.v1+json",
        "manifests": [{
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "digest": platform_digest,
            "size": 100,
            "platform": {"os": "linux", "architecture": "amd64"}
        }]
    });
    let manifest = json!({
        "schemaVersion": 2,
        "mediaType": "application/vnd.oci.image.manifest.v1+json",
        "config": {
            "mediaType": "application/vnd.oci.image.config.v1+json",
            "digest": config_digest,
            "size": config_blob.len()
        },
        "layers": []
    });

    let mut server = mockito::Server::new_async().await;
    let _index = server
        .mock("GET", "/v2/library/nginx/manifests/latest")
        .with_status(200)
        .with_body(index.to_string())
        .create_async()
        .await;
    let _manifest = server
        .mock("GET", format!("/v2/library/nginx/manifests/{}", platform_digest).as_str())
        .with_status(200)
        .with_body(manifest.to_string())
        .create_async()
        .await;
    let _blob = server
        .mock("GET", format!("/v2/library/nginx/blobs/{}", config_digest).as_str())
        .with_status(200)
        .with_body(config_blob)
        .create_async()
        .await;

    let resolver = HttpResolver::new(&config_for(&server)).unwrap();
    let descriptor = resolver
        .image_descriptor(None, "nginx", "latest", None)
        .await
        .unwrap();

    assert_eq!(descriptor.ports.len(), 1);
    assert_eq!(descriptor.ports[0].container_port, 80);
    assert_eq!(descriptor.ports[0].protocol, "tcp");
    assert_eq!(descriptor.volumes, vec!["/data".to_string()]);
}

#[tokio::test]
async fn test_probe_fails_on_rejected_credentials() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/")
        .with_status(401)
        .create_async()
        .await;

    let resolver = HttpResolver::new(&config_for(&server)).unwrap();
    let result = resolver.probe(&private_credentials(&server)).await;
    assert!(matches!(
        result.unwrap_err(),
        BerthError::Authentication { .. }
    ));
}
