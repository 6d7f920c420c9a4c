//! Authentication handling for container registries.
//!
//! Supports anonymous access, Basic authentication and the Bearer token
//! flow announced through `WWW-Authenticate` challenges, which both the
//! public registry and most private registries use.

use crate::error::{Result, BerthError};
use crate::model::RegistryCredentials;
use serde::Deserialize;


/// Credentials for registry authentication.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication required (anonymous access)
    Anonymous,

    /// HTTP Basic authentication with username and password
    Basic { username: String, password: String },

    /// Bearer token authentication (OAuth2-style)
    Bearer { token: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => write!(f, "Basic {{ username: {:?} }}", username),
            Self::Bearer { .. } => f.write_str("Bearer"),
        }
    }
}

impl Credentials {
    /// Creates Basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libberth::auth::Credentials;
    ///
    /// let creds = Credentials::basic("username", "password");
    /// assert!(creds.to_header_value().unwrap().starts_with("Basic "));
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates Bearer token credentials.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Builds Basic credentials from a private registry triple.
    ///
    /// A masked password cannot authenticate anything, so it is refused.
    pub fn from_registry(credentials: &RegistryCredentials) -> Result<Self> {
        let secret = credentials.password.secret().ok_or_else(|| {
            BerthError::credential_required(format!(
                "password for {} must be re-entered",
                credentials.url
            ))
        })?;
        Ok(Self::basic(credentials.user.clone(), secret))
    }

    /// Returns the Authorization header value for these credentials.
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => {
                use base64::{Engine as _, engine::general_purpose};
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials);
                Some(format!("Basic {}", encoded))
            }
            Self::Bearer { token } => Some(format!("Bearer {}", token)),
        }
    }
}

/// Information parsed from a WWW-Authenticate header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// The authentication scheme (e.g., "Bearer")
    pub scheme: String,

    /// The authentication realm
    pub realm: String,

    /// The service identifier
    pub service: Option<String>,

    /// The scope being requested
    pub scope: Option<String>,
}

impl AuthChallenge {
    /// Parses a WWW-Authenticate header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use libberth::auth::AuthChallenge;
    ///
    /// let header = r#"Bearer realm="https://auth.example.com/token",service="registry""#;
    /// let challenge = AuthChallenge::parse(header).unwrap();
    /// assert_eq!(challenge.scheme, "Bearer");
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();

        let (scheme, params) = header
            .split_once(' ')
            .ok_or_else(|| BerthError::validation("Invalid WWW-Authenticate header format"))?;

        let mut realm = None;
        let mut service = None;
        let mut scope = None;

        for (key, value) in split_params(params) {
            match key.as_str() {
                "realm" => realm = Some(value),
                "service" => service = Some(value),
                "scope" => scope = Some(value),
                _ => {}
            }
        }

        let realm = realm.ok_or_else(|| {
            BerthError::validation("WWW-Authenticate header missing required 'realm' parameter")
        })?;

        Ok(Self {
            scheme: scheme.to_string(),
            realm,
            service,
            scope,
        })
    }

    /// Returns true if the challenge asks for a bearer token.
    pub fn is_bearer(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("bearer")
    }

    /// Builds the token endpoint URL, preferring the challenge's own scope.
    pub fn token_url(&self, fallback_scope: Option<&str>) -> Result<reqwest::Url> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(service) = &self.service {
            params.push(("service", service));
        }
        if let Some(scope) = self.scope.as_deref().or(fallback_scope) {
            params.push(("scope", scope));
        }

        reqwest::Url::parse_with_params(&self.realm, &params)
            .map_err(|e| BerthError::validation_with_source("Invalid token realm URL", e))
    }
}

/// Splits `key="value",key2="a,b"` honouring commas inside quotes.
fn split_params(params: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in params.chars().chain(std::iter::once(',')) {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => {
                if let Some((key, value)) = current.split_once('=') {
                    pairs.push((
                        key.trim().to_string(),
                        value.trim().trim_matches('"').to_string(),
                    ));
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    pairs
}

/// Body returned by a token endpoint.
///
/// Registries disagree on the field name, so both are accepted.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

impl TokenResponse {
    pub fn into_token(self) -> Option<String> {
        self.token.or(self.access_token).filter(|t| !t.is_empty())
    }
}
