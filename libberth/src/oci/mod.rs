//! Image manifests and the defaults declared in image configuration.
//!
//! Manifests are parsed with `oci-spec`. Configuration blobs are read
//! loosely instead: registries and build tools encode exposed ports and
//! volumes in several ad-hoc shapes, and a declaration we cannot read must
//! mean "no defaults", never an error.

pub use oci_spec::image::{Descriptor, ImageIndex, ImageManifest};

use crate::error::{Result, BerthError};
use crate::model::{DeclaredPort, ImageDescriptor};
use serde_json::Value;
use tracing::debug;

#[cfg(test)]
mod tests;

/// Upper bound on ports produced by one `"<from>-<to>/<proto>"` range.
const MAX_PORT_RANGE: u32 = 64;

/// Either a single-platform image manifest or a multi-platform image index.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum ManifestOrIndex {
    Manifest(ImageManifest),
    Index(ImageIndex),
}

impl ManifestOrIndex {
    /// Parses manifest bytes, detecting index vs manifest from the media
    /// type or, failing that, from the document's shape.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| BerthError::validation_with_source("Failed to parse manifest JSON", e))?;

        let media_type = value
            .get("mediaType")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let is_index = media_type.contains("index")
            || media_type.contains("list")
            || (media_type.is_empty() && value.get("manifests").is_some());

        if is_index {
            let index: ImageIndex = serde_json::from_value(value).map_err(|e| {
                BerthError::validation_with_source("Failed to parse image index", e)
            })?;
            Ok(ManifestOrIndex::Index(index))
        } else if media_type.contains("manifest") || value.get("config").is_some() {
            let manifest: ImageManifest = serde_json::from_value(value).map_err(|e| {
                BerthError::validation_with_source("Failed to parse image manifest", e)
            })?;
            Ok(ManifestOrIndex::Manifest(manifest))
        } else {
            Err(BerthError::validation(
                "Unable to determine if content is a manifest or index",
            ))
        }
    }

    /// Picks the manifest descriptor for `os`/`arch` out of an index.
    ///
    /// Falls back to the first entry when no platform matches, so single
    /// architecture indexes still resolve.
    pub fn select_platform(&self, os: &str, arch: &str) -> Option<&Descriptor> {
        match self {
            ManifestOrIndex::Manifest(_) => None,
            ManifestOrIndex::Index(index) => index
                .manifests()
                .iter()
                .find(|desc| {
                    desc.platform().as_ref().is_some_and(|p| {
                        p.os().to_string() == os && p.architecture().to_string() == arch
                    })
                })
                .or_else(|| index.manifests().first()),
        }
    }
}

/// Extracts the declared defaults from an image configuration blob.
///
/// Looks at `config` first and then the legacy `container_config`. Any
/// part that cannot be read is treated as empty.
pub fn descriptor_from_config(bytes: &[u8]) -> ImageDescriptor {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "image configuration is not JSON; no defaults");
            return ImageDescriptor::default();
        }
    };

    let section = ["config", "container_config"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find(|section| section.get("ExposedPorts").is_some() || section.get("Volumes").is_some());

    match section {
        Some(section) => ImageDescriptor {
            ports: section
                .get("ExposedPorts")
                .map(parse_exposed_ports)
                .unwrap_or_default(),
            volumes: section.get("Volumes").map(parse_volumes).unwrap_or_default(),
        },
        None => ImageDescriptor::default(),
    }
}

/// Parses exposed port declarations.
///
/// Accepts the `{"80/tcp": {}}` map, an array of `"80/tcp"` strings, or a
/// single whitespace or comma separated string. Protocol defaults to `tcp`.
/// Order of declaration is kept and duplicates are dropped.
pub fn parse_exposed_ports(value: &Value) -> Vec<DeclaredPort> {
    let mut ports: Vec<DeclaredPort> = Vec::new();
    for spec in declaration_keys(value) {
        for port in parse_port_spec(&spec) {
            if !ports.contains(&port) {
                ports.push(port);
            }
        }
    }
    ports
}

/// Parses volume declarations, accepting the same shapes as ports.
pub fn parse_volumes(value: &Value) -> Vec<String> {
    let mut volumes: Vec<String> = Vec::new();
    for path in declaration_keys(value) {
        if path.starts_with('/') && !volumes.contains(&path) {
            volumes.push(path);
        }
    }
    volumes
}

fn declaration_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_string)
            .collect(),
        Value::String(s) => s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Parses `"80"`, `"53/udp"` or `"8000-8002/tcp"`. Malformed specs yield nothing.
fn parse_port_spec(spec: &str) -> Vec<DeclaredPort> {
    let spec = spec.trim();
    let (ports, protocol) = match spec.split_once('/') {
        Some((ports, protocol)) => (ports, protocol.trim()),
        None => (spec, "tcp"),
    };
    if protocol.is_empty() || !protocol.chars().all(|c| c.is_ascii_alphabetic()) {
        return Vec::new();
    }
    let protocol = protocol.to_ascii_lowercase();

    let (start, end) = match ports.split_once('-') {
        Some((start, end)) => match (start.trim().parse::<u16>(), end.trim().parse::<u16>()) {
            (Ok(start), Ok(end)) => (start, end),
            _ => return Vec::new(),
        },
        None => match ports.trim().parse::<u16>() {
            Ok(port) => (port, port),
            Err(_) => return Vec::new(),
        },
    };

    if start == 0 || end < start || u32::from(end - start) >= MAX_PORT_RANGE {
        return Vec::new();
    }

    (start..=end)
        .map(|container_port| DeclaredPort {
            container_port,
            protocol: protocol.clone(),
        })
        .collect()
}
