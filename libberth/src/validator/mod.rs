//! Private registry credential validation.

use crate::error::{BerthError, Result};
use crate::model::{Password, RegistryCredentials};
use crate::resolver::RegistryResolver;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};


/// A credential triple the registry has accepted during this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCredentialRecord {
    pub credentials: RegistryCredentials,
    pub container_index: usize,
    pub validated_at: DateTime<Utc>,
}

impl RegistryCredentialRecord {
    /// Returns true if this record was validated for `url` and `user`.
    pub fn matches(&self, url: &str, user: &str) -> bool {
        self.credentials.url == url && self.credentials.user == user
    }
}

/// Validates url/user/password triples against the resolver's probe.
#[derive(Clone)]
pub struct CredentialValidator {
    resolver: Arc<dyn RegistryResolver>,
}

impl CredentialValidator {
    pub fn new(resolver: Arc<dyn RegistryResolver>) -> Self {
        Self { resolver }
    }

    /// Probes the registry with the given credentials.
    ///
    /// Empty fields and masked passwords are refused before any request is
    /// made.
    ///
    /// # Errors
    ///
    /// `Validation` for empty fields, `CredentialRequired` for a masked
    /// password, and whatever the probe returns (`Authentication`,
    /// `Network`, ...) when the registry refuses.
    pub async fn validate(
        &self,
        url: &str,
        user: &str,
        password: Password,
        container_index: usize,
    ) -> Result<RegistryCredentialRecord> {
        let url = url.trim();
        let user = user.trim();
        if url.is_empty() {
            return Err(BerthError::validation("Registry URL is required"));
        }
        if user.is_empty() {
            return Err(BerthError::validation("Registry user is required"));
        }
        match password.secret() {
            None => {
                return Err(BerthError::credential_required(
                    "Re-enter the registry password to validate it",
                ));
            }
            Some("") => return Err(BerthError::validation("Registry password is required")),
            Some(_) => {}
        }

        let credentials = RegistryCredentials::new(url, user, password);
        if let Err(e) = self.resolver.probe(&credentials).await {
            warn!(url, user, error = %e, "credential validation failed");
            return Err(e);
        }

        info!(url, user, container_index, "registry credentials validated");
        Ok(RegistryCredentialRecord {
            credentials,
            container_index,
            validated_at: Utc::now(),
        })
    }
}
