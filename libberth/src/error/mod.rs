//! Error types for Berth
//!
//! This module provides the error type shared by every engine operation.
//! Registry transport failures are normally converted into non-blocking
//! notices by the resolver fallbacks; the variants that reach a caller are
//! the ones that must stop user progress (credentials and ingress rules).

use thiserror::Error;

#[cfg(test)]
mod tests;

/// Where a conflicting ingress port was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressConflict {
    /// Another port of the same container is already the ingress port.
    SameContainer {
        /// Position of the conflicting port in the container's port list
        port: usize,
    },
    /// A port of a sibling container is already the ingress port.
    OtherContainer,
}

/// Main error type for Berth operations
#[derive(Error, Debug)]
pub enum BerthError {
    /// Network-related errors (connection, timeout, DNS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication errors (401, 403, token issues)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Resource not found errors (404, unknown volume ids)
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Rate limiting errors (429)
    #[error("Rate limit: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Server errors (500, 503)
    #[error("Server error (status: {status_code}): {message}")]
    Server { message: String, status_code: u16 },

    /// Validation errors (bad field input, digest mismatch, malformed documents)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, missing settings)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A second port tried to become the application's ingress port.
    #[error("Another port is already set as ingress.")]
    IngressTaken { conflict: IngressConflict },

    /// A port tried to become ingress without an explicit service port.
    #[error("Service port is required before '{port}' can be set as ingress.")]
    ServicePortRequired { port: String },

    /// A private registry operation was attempted without a validated credential.
    #[error("Registry credentials required: {message}")]
    CredentialRequired { message: String },

    /// An entry index did not address an existing entry.
    #[error("{collection} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },
}

/// Result type alias for Berth operations
pub type Result<T> = std::result::Result<T, BerthError>;

impl BerthError {
    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libberth::error::BerthError;
    ///
    /// let err = BerthError::network("connection refused");
    /// assert!(matches!(err, BerthError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libberth::error::BerthError;
    ///
    /// let err = BerthError::authentication("invalid credentials", Some(401));
    /// assert!(matches!(err, BerthError::Authentication { .. }));
    /// ```
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new not found error.
    pub fn not_found<S: Into<String>>(resource_type: S, name: S) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit<S: Into<String>>(message: S, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new server error.
    pub fn server<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libberth::error::BerthError;
    ///
    /// let err = BerthError::validation("container port is required");
    /// assert!(matches!(err, BerthError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an error for a missing registry credential.
    pub fn credential_required<S: Into<String>>(message: S) -> Self {
        Self::CredentialRequired {
            message: message.into(),
        }
    }

    /// Creates an error for an index that does not address an entry.
    pub fn out_of_range(collection: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            collection,
            index,
            len,
        }
    }

    /// Returns true for errors that must stop the user until they act.
    ///
    /// Everything else degrades to a notice and lets editing continue.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::CredentialRequired { .. }
                | Self::IngressTaken { .. }
                | Self::ServicePortRequired { .. }
        )
    }
}
