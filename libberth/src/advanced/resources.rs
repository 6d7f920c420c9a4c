//! Resource requests and limits.

use crate::config::ResourceDefaults;
use crate::error::{BerthError, Result};
use crate::model::{ResourceSettings, ResourceType};
use std::fmt;

/// One numeric field of [`ResourceSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceField {
    CpuRequest,
    CpuLimit,
    MemRequest,
    MemLimit,
    GpuLimit,
}

impl fmt::Display for ResourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceField::CpuRequest => "CPU request",
            ResourceField::CpuLimit => "CPU limit",
            ResourceField::MemRequest => "memory request",
            ResourceField::MemLimit => "memory limit",
            ResourceField::GpuLimit => "GPU limit",
        };
        f.write_str(name)
    }
}

const CPU_FIELDS: &[ResourceField] = &[
    ResourceField::CpuRequest,
    ResourceField::CpuLimit,
    ResourceField::MemRequest,
    ResourceField::MemLimit,
];

/// Fields shown for a resource type.
///
/// GPU and BOTH are accepted but not wired up yet, so every type shows the
/// CPU set.
pub fn visible_fields(_resource_type: ResourceType) -> &'static [ResourceField] {
    CPU_FIELDS
}

/// Settings with every CPU and memory field at its default.
pub fn default_settings(defaults: &ResourceDefaults) -> ResourceSettings {
    ResourceSettings {
        cpu_request: Some(defaults.cpu_request),
        cpu_limit: Some(defaults.cpu_limit),
        mem_request: Some(defaults.mem_request),
        mem_limit: Some(defaults.mem_limit),
        gpu_limit: None,
    }
}

/// Fills unset CPU and memory fields from `defaults`.
pub fn seed(settings: ResourceSettings, defaults: &ResourceDefaults) -> ResourceSettings {
    ResourceSettings {
        cpu_request: settings.cpu_request.or(Some(defaults.cpu_request)),
        cpu_limit: settings.cpu_limit.or(Some(defaults.cpu_limit)),
        mem_request: settings.mem_request.or(Some(defaults.mem_request)),
        mem_limit: settings.mem_limit.or(Some(defaults.mem_limit)),
        gpu_limit: settings.gpu_limit,
    }
}

pub fn differs_from_defaults(settings: &ResourceSettings, defaults: &ResourceDefaults) -> bool {
    seed(*settings, defaults) != default_settings(defaults)
}

pub fn get(settings: &ResourceSettings, field: ResourceField) -> Option<u32> {
    match field {
        ResourceField::CpuRequest => settings.cpu_request,
        ResourceField::CpuLimit => settings.cpu_limit,
        ResourceField::MemRequest => settings.mem_request,
        ResourceField::MemLimit => settings.mem_limit,
        ResourceField::GpuLimit => settings.gpu_limit,
    }
}

pub fn set(settings: &mut ResourceSettings, field: ResourceField, value: Option<u32>) {
    let slot = match field {
        ResourceField::CpuRequest => &mut settings.cpu_request,
        ResourceField::CpuLimit => &mut settings.cpu_limit,
        ResourceField::MemRequest => &mut settings.mem_request,
        ResourceField::MemLimit => &mut settings.mem_limit,
        ResourceField::GpuLimit => &mut settings.gpu_limit,
    };
    *slot = value;
}

/// Parses a field's text input. Blank input unsets the field.
///
/// # Examples
///
/// ```
/// use libberth::advanced::resources::{parse_quantity, ResourceField};
///
/// assert_eq!(parse_quantity(ResourceField::CpuLimit, " 750 ").unwrap(), Some(750));
/// assert_eq!(parse_quantity(ResourceField::CpuLimit, "").unwrap(), None);
/// assert!(parse_quantity(ResourceField::CpuLimit, "1.5").is_err());
/// ```
pub fn parse_quantity(field: ResourceField, input: &str) -> Result<Option<u32>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse::<u32>()
        .map(Some)
        .map_err(|e| BerthError::validation_with_source(format!("Invalid {}: '{}'", field, input), e))
}

/// Requests must not exceed limits.
pub fn validate(settings: &ResourceSettings) -> Result<()> {
    let pairs = [
        (settings.cpu_request, settings.cpu_limit, "CPU"),
        (settings.mem_request, settings.mem_limit, "memory"),
    ];
    for (request, limit, what) in pairs {
        if let (Some(request), Some(limit)) = (request, limit)
            && request > limit
        {
            return Err(BerthError::validation(format!(
                "The {} request ({}) exceeds the {} limit ({})",
                what, request, what, limit
            )));
        }
    }
    Ok(())
}
