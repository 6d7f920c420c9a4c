use crate::context::AppContext;
use libberth::{HttpResolver, Password, RegistryCredentials};
use std::sync::Arc;

/// Container environment variable import and export
pub mod env;

/// Image search, tags and inspection
pub mod image;

/// Private registry login
pub mod login;

/// Saved application resolution
pub mod resolve;

/// Version command handlers
pub mod version;

/// Private registry flags shared by the image commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RegistryArgs {
    /// Private registry URL (public registry when omitted)
    #[arg(long)]
    pub registry: Option<String>,
    /// Private registry username (will prompt if not provided)
    #[arg(short, long, requires = "registry")]
    pub username: Option<String>,
    /// Private registry password (will prompt if not provided)
    #[arg(long, env = "BERTH_REGISTRY_PASSWORD", hide_env_values = true, requires = "registry")]
    pub password: Option<String>,
}

impl RegistryArgs {
    /// Credentials for `--registry`, prompting for anything missing.
    pub fn credentials(&self) -> Result<Option<RegistryCredentials>, String> {
        let Some(url) = &self.registry else {
            return Ok(None);
        };
        let username = prompt_username(self.username.as_deref())?;
        let password = prompt_password(self.password.as_deref())?;
        Ok(Some(RegistryCredentials::new(
            url.as_str(),
            username,
            Password::Plain(password),
        )))
    }
}

/// Builds the HTTP resolver from the resolved configuration.
pub fn resolver(ctx: &AppContext) -> Result<Arc<HttpResolver>, String> {
    HttpResolver::new(&ctx.config)
        .map(Arc::new)
        .map_err(|e| format!("Failed to create registry client: {}", e))
}

/// Prompt for username if not provided
pub(crate) fn prompt_username(provided_username: Option<&str>) -> Result<String, String> {
    match provided_username {
        Some(username) => Ok(username.to_string()),
        None => {
            print!("Username: ");
            std::io::Write::flush(&mut std::io::stdout())
                .map_err(|e| format!("Failed to flush stdout: {}", e))?;

            let mut username = String::new();
            std::io::stdin()
                .read_line(&mut username)
                .map_err(|e| format!("Failed to read username: {}", e))?;

            Ok(username.trim().to_string())
        }
    }
}

/// Prompt for password if not provided
pub(crate) fn prompt_password(provided_password: Option<&str>) -> Result<String, String> {
    match provided_password {
        Some(password) => Ok(password.to_string()),
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| format!("Failed to read password: {}", e)),
    }
}

#[cfg(test)]
pub(crate) mod stub;
#[cfg(test)]
mod tests;
