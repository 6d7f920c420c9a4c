use crate::format::Formattable;
use libberth::model::ImageDescriptor;
use libberth::resolver::{ImageSummary, TagSummary, tags_or_fallback};
use libberth::{ImageRef, Notice, RegistryCredentials, RegistryResolver};
use serde::Serialize;
use tabled::Tabled;
use tabled::{Table, settings::Style};

pub mod handlers;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ImageRow {
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "STARS")]
    pub stars: u64,

    #[tabled(rename = "OFFICIAL")]
    pub official: String,

    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
}

impl From<ImageSummary> for ImageRow {
    fn from(image: ImageSummary) -> Self {
        Self {
            name: image.full_name(),
            stars: image.stars,
            official: if image.official { "yes" } else { "no" }.to_string(),
            description: image.description.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageList {
    pub query: String,
    pub images: Vec<ImageRow>,
}

impl Formattable for ImageList {
    fn format_pretty(&self) -> String {
        if self.images.is_empty() {
            return "No images found".to_string();
        }
        Table::new(&self.images).with(Style::empty()).to_string()
    }
}

/// One tag of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TagRow {
    #[tabled(rename = "TAG")]
    pub tag: String,

    #[tabled(rename = "DIGEST")]
    pub digest: String,

    #[tabled(rename = "UPDATED")]
    pub updated: String,
}

impl From<TagSummary> for TagRow {
    fn from(tag: TagSummary) -> Self {
        Self {
            tag: tag.name,
            digest: tag.digest.map(|d| short_digest(&d)).unwrap_or_default(),
            updated: tag
                .last_updated
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// `sha256:` plus the first 12 hex characters.
fn short_digest(digest: &str) -> String {
    match digest.split_once(':') {
        Some((algorithm, hex)) if hex.len() > 12 => format!("{}:{}", algorithm, &hex[..12]),
        _ => digest.to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct TagList {
    pub image: String,
    pub tags: Vec<TagRow>,
}

impl Formattable for TagList {
    fn format_pretty(&self) -> String {
        Table::new(&self.tags).with(Style::empty()).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct PortRow {
    #[tabled(rename = "PORT")]
    pub port: u16,

    #[tabled(rename = "PROTOCOL")]
    pub protocol: String,
}

/// Declared defaults of one image:tag.
#[derive(Debug, Serialize)]
pub struct ImageInspection {
    pub image: String,
    pub ports: Vec<PortRow>,
    pub volumes: Vec<String>,
}

impl ImageInspection {
    pub fn new(image: String, descriptor: ImageDescriptor) -> Self {
        Self {
            image,
            ports: descriptor
                .ports
                .into_iter()
                .map(|p| PortRow {
                    port: p.container_port,
                    protocol: p.protocol,
                })
                .collect(),
            volumes: descriptor.volumes,
        }
    }
}

impl Formattable for ImageInspection {
    fn format_pretty(&self) -> String {
        let mut output = format!("Image: {}\n", self.image);

        output.push_str("\nPorts:\n");
        if self.ports.is_empty() {
            output.push_str("  none declared\n");
        } else {
            for port in &self.ports {
                output.push_str(&format!("  {}/{}\n", port.port, port.protocol));
            }
        }

        output.push_str("\nVolumes:\n");
        if self.volumes.is_empty() {
            output.push_str("  none declared\n");
        } else {
            for volume in &self.volumes {
                output.push_str(&format!("  {}\n", volume));
            }
        }
        output
    }
}

/// Searches the public registry, or the private one in `credentials`.
pub async fn search(
    resolver: &dyn RegistryResolver,
    query: &str,
    limit: Option<usize>,
    credentials: Option<&RegistryCredentials>,
) -> Result<ImageList, String> {
    let images = resolver
        .search_images(query, credentials)
        .await
        .map_err(|e| e.to_string())?;

    Ok(ImageList {
        query: query.to_string(),
        images: images
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(ImageRow::from)
            .collect(),
    })
}

/// Lists tags; an unavailable listing degrades to one tag plus a notice.
pub async fn tags(
    resolver: &dyn RegistryResolver,
    image: &ImageRef,
    credentials: Option<&RegistryCredentials>,
) -> (TagList, Option<Notice>) {
    let resolved = tags_or_fallback(
        resolver,
        image.namespace(),
        image.name(),
        image.tag(),
        credentials,
    )
    .await;

    let list = TagList {
        image: image.to_string(),
        tags: resolved.value.into_iter().map(TagRow::from).collect(),
    };
    (list, resolved.notice)
}

/// Fetches the declared ports and volumes of an image.
pub async fn inspect(
    resolver: &dyn RegistryResolver,
    image: &ImageRef,
    credentials: Option<&RegistryCredentials>,
) -> Result<ImageInspection, String> {
    let tag = image.tag().unwrap_or(libberth::model::DEFAULT_TAG);
    let descriptor = resolver
        .image_descriptor(image.namespace(), image.name(), tag, credentials)
        .await
        .map_err(|e| e.to_string())?;

    let name = match image.namespace() {
        Some(ns) => format!("{}/{}:{}", ns, image.name(), tag),
        None => format!("{}:{}", image.name(), tag),
    };
    Ok(ImageInspection::new(name, descriptor))
}

#[cfg(test)]
mod tests;
