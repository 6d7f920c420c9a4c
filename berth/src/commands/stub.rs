//! Canned resolver for command tests.

use async_trait::async_trait;
use libberth::model::{DeclaredPort, ImageDescriptor};
use libberth::resolver::{ImageSummary, TagSummary};
use libberth::{BerthError, RegistryCredentials, RegistryResolver, Result};

/// Knows `nginx` (tags `1.25`, `latest`; port 80/tcp, volume `/data`) and
/// accepts the password `s3cret`.
pub(crate) struct StubResolver;

#[async_trait]
impl RegistryResolver for StubResolver {
    async fn search_images(
        &self,
        query: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<ImageSummary>> {
        let mut official = ImageSummary::named(None, "nginx");
        official.official = true;
        official.stars = 20_000;
        Ok([official, ImageSummary::named(Some("bitnami"), "nginx")]
            .into_iter()
            .filter(|image| image.name.contains(query))
            .collect())
    }

    async fn list_tags(
        &self,
        _namespace: Option<&str>,
        image: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<Vec<TagSummary>> {
        match image {
            "nginx" => Ok(vec![
                TagSummary::synthetic("1.25"),
                TagSummary::synthetic("latest"),
            ]),
            _ => Err(BerthError::not_found("image", image)),
        }
    }

    async fn image_descriptor(
        &self,
        _namespace: Option<&str>,
        image: &str,
        _tag: &str,
        _credentials: Option<&RegistryCredentials>,
    ) -> Result<ImageDescriptor> {
        match image {
            "nginx" => Ok(ImageDescriptor {
                ports: vec![DeclaredPort {
                    container_port: 80,
                    protocol: "tcp".to_string(),
                }],
                volumes: vec!["/data".to_string()],
            }),
            _ => Err(BerthError::network("registry unreachable")),
        }
    }

    async fn probe(&self, credentials: &RegistryCredentials) -> Result<()> {
        match credentials.password.secret() {
            Some("s3cret") => Ok(()),
            _ => Err(BerthError::authentication("invalid credentials", Some(401))),
        }
    }
}
