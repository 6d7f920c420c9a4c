//! Image name parsing.
//!
//! Selections are made within an already chosen registry, so a reference
//! here is only `[namespace/]name[:tag]`. The namespace is everything before
//! the last slash.

use crate::error::{Result, BerthError};
use std::fmt;
use std::str::FromStr;


/// An image name within a registry, optionally qualified and tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    namespace: Option<String>,
    name: String,
    tag: Option<String>,
}

impl ImageRef {
    pub fn new(namespace: Option<&str>, name: &str, tag: Option<&str>) -> Result<Self> {
        validate_name(name)?;
        if let Some(ns) = namespace {
            validate_name(ns)?;
        }
        if let Some(t) = tag {
            validate_tag(t)?;
        }
        Ok(Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            tag: tag.map(str::to_string),
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Repository path used on the distribution API.
    ///
    /// `default_namespace` applies to unqualified names (the public registry
    /// keeps official images under `library`).
    pub fn repository(&self, default_namespace: Option<&str>) -> String {
        repository_path(self.namespace(), &self.name, default_namespace)
    }
}

/// Joins namespace and name the way the distribution API expects.
pub fn repository_path(namespace: Option<&str>, name: &str, default_namespace: Option<&str>) -> String {
    match namespace.or(default_namespace) {
        Some(ns) if !ns.is_empty() => format!("{}/{}", ns, name),
        _ => name.to_string(),
    }
}

impl FromStr for ImageRef {
    type Err = BerthError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BerthError::validation("Image reference cannot be empty"));
        }

        // A colon only starts a tag when it comes after the last slash.
        let last_slash = s.rfind('/');
        let (path, tag) = match s.rfind(':') {
            Some(colon) if last_slash.is_none_or(|slash| colon > slash) => {
                (&s[..colon], Some(&s[colon + 1..]))
            }
            _ => (s, None),
        };

        let (namespace, name) = match path.rsplit_once('/') {
            Some((ns, name)) => (Some(ns), name),
            None => (None, path),
        };

        Self::new(namespace, name, tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{}/", ns)?;
        }
        f.write_str(&self.name)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.split('/').all(|component| {
            !component.is_empty()
                && component
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-".contains(c))
        });
    if valid {
        Ok(())
    } else {
        Err(BerthError::validation(format!(
            "Invalid image name '{}': use lowercase letters, digits, '.', '_' or '-'",
            name
        )))
    }
}

fn validate_tag(tag: &str) -> Result<()> {
    let valid = !tag.is_empty()
        && tag.len() <= 128
        && !tag.starts_with(['.', '-'])
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._-".contains(c));
    if valid {
        Ok(())
    } else {
        Err(BerthError::validation(format!("Invalid tag '{}'", tag)))
    }
}
